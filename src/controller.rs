use super::*;
use crate::effects::contact_form::{ContactFormHandler, SPIN_STYLE};
use crate::effects::counter::{CounterAnimator, CounterTick};
use crate::effects::navbar::NavbarController;
use crate::effects::parallax::ParallaxGlow;
use crate::effects::reveal::RevealAnimator;
use crate::effects::section_highlight::SectionHighlighter;
use crate::effects::smooth_scroll::{AnchorClick, SmoothScroller};
use crate::effects::typing::{TypedKind, TypingEffect};

/// What the page should do with the event that was just dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EventOutcome {
    pub default_prevented: bool,
}

impl EventOutcome {
    fn prevented() -> Self {
        Self {
            default_prevented: true,
        }
    }
}

/// All portfolio page behaviours wired to one page.
///
/// The controller never owns the page or its timers. Every entry point takes
/// the [`PageDom`] and [`TimerHost`] it should act on, and timers scheduled by
/// an effect come back through [`PortfolioEffects::run_task`].
#[derive(Debug, Clone)]
pub struct PortfolioEffects {
    config: EffectsConfig,
    trace: TraceState,
    navbar: NavbarController,
    highlighter: SectionHighlighter,
    reveal: RevealAnimator,
    counters: CounterAnimator,
    scroller: SmoothScroller,
    form: Option<ContactFormHandler>,
    typing: Option<TypingEffect>,
    parallax: ParallaxGlow,
}

impl PortfolioEffects {
    pub fn attach(
        dom: &mut dyn PageDom,
        timers: &mut dyn TimerHost,
        config: EffectsConfig,
    ) -> Result<Self> {
        Self::attach_with_trace(dom, timers, config, TraceState::new())
    }

    /// Resolves every effect against the page and starts the load-time work:
    /// the spinner style, the reveal observer, the delayed counter check and
    /// the typing countdown.
    pub fn attach_with_trace(
        dom: &mut dyn PageDom,
        timers: &mut dyn TimerHost,
        config: EffectsConfig,
        trace: TraceState,
    ) -> Result<Self> {
        let navbar = NavbarController::resolve(dom, &config)?;
        let highlighter = SectionHighlighter::resolve(dom, &config)?;
        let reveal = RevealAnimator::resolve(dom, &config)?;
        let counters = CounterAnimator::resolve(dom, &config)?;
        let form = ContactFormHandler::resolve(dom, &config);
        if form.is_none() {
            trace.line(TraceCategory::Effects, || {
                "[effect] contact form disabled (form or submit button missing)".to_string()
            });
        }
        let typing = TypingEffect::capture(dom, &config)?;

        dom.append_head_style(SPIN_STYLE)?;

        let mut effects = Self {
            scroller: SmoothScroller::new(&config),
            parallax: ParallaxGlow::new(&config),
            config,
            trace,
            navbar,
            highlighter,
            reveal,
            counters,
            form,
            typing,
        };

        effects.reveal.observe(dom)?;
        timers.set_timeout(Task::CounterCheck, effects.config.counter_startup_delay_ms);
        if let Some(typing) = &effects.typing {
            typing.start(timers);
            let len = typing.source().len();
            effects.trace.line(TraceCategory::Effects, || {
                format!("[effect] typing captured source_len={len}")
            });
        }
        effects
            .trace
            .line(TraceCategory::Effects, || "[effect] attached".to_string());
        Ok(effects)
    }

    pub fn config(&self) -> &EffectsConfig {
        &self.config
    }

    pub fn trace(&self) -> &TraceState {
        &self.trace
    }

    pub fn on_scroll(&mut self, dom: &mut dyn PageDom, timers: &mut dyn TimerHost) -> Result<()> {
        let scroll_y = dom.viewport().scroll_y;
        self.trace.line(TraceCategory::Events, || {
            format!("[event] scroll scroll_y={}", format_number(scroll_y))
        });
        self.navbar.on_scroll(dom)?;
        let active = self.highlighter.on_scroll(dom)?;
        self.trace.line(TraceCategory::Effects, || {
            format!(
                "[effect] highlight active={}",
                active.as_deref().unwrap_or("none")
            )
        });
        self.check_counters(dom, timers)
    }

    /// Delivers intersection observer entries for the reveal targets.
    pub fn on_intersections(
        &mut self,
        dom: &mut dyn PageDom,
        entries: &[IntersectionEntry],
    ) -> Result<()> {
        self.trace.line(TraceCategory::Events, || {
            format!("[event] intersection entries={}", entries.len())
        });
        let revealed = self.reveal.apply(dom, entries)?;
        if revealed > 0 {
            self.trace.line(TraceCategory::Effects, || {
                format!("[effect] reveal newly_visible={revealed}")
            });
        }
        Ok(())
    }

    pub fn on_click(&mut self, dom: &mut dyn PageDom, target: NodeId) -> Result<EventOutcome> {
        let mut outcome = EventOutcome::default();

        if self.navbar.is_toggle_click(dom, target) {
            let open = self.navbar.toggle_menu(dom)?;
            self.trace
                .line(TraceCategory::Effects, || format!("[effect] menu open={open}"));
        }

        if self.navbar.menu_link_for(dom, target)?.is_some() {
            self.navbar.close_menu(dom)?;
            self.trace
                .line(TraceCategory::Effects, || "[effect] menu closed by link".to_string());
        }

        match self.scroller.on_click(dom, target)? {
            AnchorClick::NotAnchor => {}
            AnchorClick::Dangling => {
                outcome = EventOutcome::prevented();
                self.trace.line(TraceCategory::Effects, || {
                    "[effect] anchor target missing".to_string()
                });
            }
            AnchorClick::Scrolled(top) => {
                outcome = EventOutcome::prevented();
                self.trace.line(TraceCategory::Effects, || {
                    format!("[effect] smooth scroll top={}", format_number(top))
                });
            }
        }
        self.trace.line(TraceCategory::Events, || {
            format!(
                "[event] click target={} default_prevented={}",
                node_label(dom, target),
                outcome.default_prevented
            )
        });
        Ok(outcome)
    }

    /// `form` is the form being submitted. Only the contact form is handled.
    pub fn on_submit(
        &mut self,
        dom: &mut dyn PageDom,
        timers: &mut dyn TimerHost,
        form: NodeId,
    ) -> Result<EventOutcome> {
        self.trace.line(TraceCategory::Events, || {
            format!("[event] submit form={}", node_label(dom, form))
        });
        let Some(handler) = self.form.as_mut().filter(|handler| handler.form() == form) else {
            return Ok(EventOutcome::default());
        };
        let started = handler.on_submit(dom, timers)?;
        self.trace.line(TraceCategory::Effects, || {
            if started {
                "[effect] form sending".to_string()
            } else {
                "[effect] form submit ignored (in flight)".to_string()
            }
        });
        Ok(EventOutcome::prevented())
    }

    pub fn on_mouse_move(&mut self, dom: &mut dyn PageDom, client_x: f64, client_y: f64) -> Result<()> {
        let moved = self.parallax.on_mouse_move(dom, client_x, client_y)?;
        self.trace.line(TraceCategory::Events, || {
            format!(
                "[event] mousemove x={} y={} glows={moved}",
                format_number(client_x),
                format_number(client_y)
            )
        });
        Ok(())
    }

    /// Runs a timer callback previously scheduled by one of the effects.
    pub fn run_task(
        &mut self,
        task: Task,
        dom: &mut dyn PageDom,
        timers: &mut dyn TimerHost,
    ) -> Result<()> {
        match task {
            Task::CounterCheck => self.check_counters(dom, timers)?,
            Task::CounterTick(index) => match self.counters.tick(index, dom, timers)? {
                CounterTick::Finished(value) => self.trace.line(TraceCategory::Effects, || {
                    format!("[effect] counter {index} finished value={value}")
                }),
                CounterTick::Advanced(_) | CounterTick::Idle => {}
            },
            Task::FormSent => {
                if let Some(form) = self.form.as_mut() {
                    form.on_sent(dom, timers)?;
                    self.trace
                        .line(TraceCategory::Effects, || "[effect] form sent".to_string());
                }
            }
            Task::FormRestore => {
                if let Some(form) = self.form.as_mut() {
                    form.on_restore(dom)?;
                    self.trace
                        .line(TraceCategory::Effects, || "[effect] form restored".to_string());
                }
            }
            Task::TypingStep => {
                if let Some(typing) = self.typing.as_mut() {
                    match typing.step(dom, timers)? {
                        Some(TypedKind::Tag) => {
                            let typed = typing.typed().len();
                            self.trace.line(TraceCategory::Effects, || {
                                format!("[effect] typing tag typed_len={typed}")
                            });
                        }
                        Some(TypedKind::Text | TypedKind::Pending) => {}
                        None => self
                            .trace
                            .line(TraceCategory::Effects, || "[effect] typing done".to_string()),
                    }
                }
            }
            Task::TypingFrame => {
                if let Some(typing) = &self.typing {
                    typing.frame(timers);
                }
            }
        }
        Ok(())
    }

    pub fn is_navbar_scrolled(&self, dom: &dyn PageDom) -> Result<bool> {
        let navbar = dom
            .element_by_id(&self.config.markup.navbar_id)
            .ok_or_else(|| Error::MissingElement(format!("#{}", self.config.markup.navbar_id)))?;
        dom.class_contains(navbar, "scrolled")
    }

    pub fn is_menu_open(&self, dom: &dyn PageDom) -> Result<bool> {
        self.navbar.is_menu_open(dom)
    }

    pub fn active_section(&self) -> Option<&str> {
        self.highlighter.current()
    }

    pub fn revealed_count(&self) -> usize {
        self.reveal.revealed_count()
    }

    pub fn counters_started(&self) -> bool {
        self.counters.started()
    }

    pub fn running_counters(&self) -> usize {
        self.counters.running()
    }

    /// `None` when the page has no usable contact form.
    pub fn form_phase(&self) -> Option<FormPhase> {
        self.form.as_ref().map(ContactFormHandler::phase)
    }

    /// `None` when the page has no code block to type into.
    pub fn typing_finished(&self) -> Option<bool> {
        self.typing.as_ref().map(TypingEffect::is_finished)
    }

    pub fn typed_markup(&self) -> Option<&str> {
        self.typing.as_ref().map(TypingEffect::typed)
    }

    fn check_counters(&mut self, dom: &mut dyn PageDom, timers: &mut dyn TimerHost) -> Result<()> {
        if let Some(running) = self.counters.check(dom, timers)? {
            self.trace.line(TraceCategory::Effects, || {
                format!("[effect] counters started count={running}")
            });
        }
        Ok(())
    }
}

fn node_label(dom: &dyn PageDom, node: NodeId) -> String {
    match dom.attr(node, "id") {
        Some(id) if !id.is_empty() => format!("#{id}"),
        _ => format!("node{}", node.0),
    }
}
