use super::*;

const SNIPPET_MAX_CHARS: usize = 200;
const ACTIVATABLE_CONTROLS: &str = "button, input, select, textarea";

/// Deterministic driver for a portfolio page: an in-memory DOM, a virtual
/// clock and the attached [`PortfolioEffects`].
///
/// Every event and every timer callback is followed by a rendering step
/// that delivers pending intersection observer entries, as a browser would
/// before painting.
///
/// ```
/// use portfolio_effects::PortfolioHarness;
///
/// let html = r#"
///   <nav id="navbar"><button id="navToggle"></button><ul id="navMenu"></ul></nav>
/// "#;
/// let mut h = PortfolioHarness::from_html(html)?;
/// h.scroll_to(120.0)?;
/// h.assert_has_class("#navbar", "scrolled")?;
/// # Ok::<(), portfolio_effects::Error>(())
/// ```
#[derive(Debug)]
pub struct PortfolioHarness {
    dom: MockDom,
    scheduler: VirtualScheduler,
    effects: PortfolioEffects,
    trace: TraceState,
}

impl PortfolioHarness {
    pub fn from_html(html: &str) -> Result<Self> {
        Self::from_html_with_config(html, EffectsConfig::default())
    }

    pub fn from_html_with_config(html: &str, config: EffectsConfig) -> Result<Self> {
        Self::from_dom(MockDom::from_html(html)?, config)
    }

    /// Attaches to a page prepared beforehand, typically one whose layout
    /// boxes were set so the first observer report sees real geometry.
    pub fn from_dom(mut dom: MockDom, config: EffectsConfig) -> Result<Self> {
        let trace = TraceState::new();
        let mut scheduler = VirtualScheduler::with_trace(trace.clone());
        let effects =
            PortfolioEffects::attach_with_trace(&mut dom, &mut scheduler, config, trace.clone())?;
        let mut harness = Self {
            dom,
            scheduler,
            effects,
            trace,
        };
        harness.render()?;
        Ok(harness)
    }

    pub fn dom(&self) -> &MockDom {
        &self.dom
    }

    pub fn effects(&self) -> &PortfolioEffects {
        &self.effects
    }

    pub fn scheduler(&self) -> &VirtualScheduler {
        &self.scheduler
    }

    pub fn trace(&self) -> &TraceState {
        &self.trace
    }

    pub fn enable_trace(&mut self, enabled: bool) {
        self.trace.enable(enabled);
    }

    pub fn set_trace_log_limit(&mut self, max_entries: usize) -> Result<()> {
        self.trace.set_log_limit(max_entries)
    }

    pub fn take_trace_logs(&mut self) -> Vec<String> {
        self.trace.take_logs()
    }

    pub fn select_one(&self, selector: &str) -> Result<NodeId> {
        self.dom.select_one(selector)
    }

    // Page interaction

    /// Resizes the viewport, then renders.
    pub fn set_viewport(&mut self, width: f64, height: f64) -> Result<()> {
        self.dom.set_viewport_size(width, height);
        self.render()
    }

    /// Places an element at document offset `top`. Nothing is fired; the
    /// observers see the new box on the next rendering step.
    pub fn set_layout(&mut self, selector: &str, top: f64, height: f64) -> Result<()> {
        let node = self.select_one(selector)?;
        self.dom.set_layout(node, top, height)
    }

    /// Jumps to `scroll_y` and fires `scroll`.
    pub fn scroll_to(&mut self, scroll_y: f64) -> Result<()> {
        self.dom.set_scroll_y(scroll_y);
        self.effects.on_scroll(&mut self.dom, &mut self.scheduler)?;
        self.render()
    }

    /// Clicks the first element matching `selector`. The click activates
    /// the nearest enclosing control, so a label inside a button acts for
    /// the button. Disabled controls swallow the click. A click that moved
    /// the page fires `scroll`, and a submit button then submits its form
    /// unless the click was prevented.
    pub fn click(&mut self, selector: &str) -> Result<EventOutcome> {
        let target = self.select_one(selector)?;
        let control = self.dom.closest(target, ACTIVATABLE_CONTROLS)?;
        if control.is_some_and(|control| self.is_disabled_control(control)) {
            return Ok(EventOutcome::default());
        }
        let scroll_before = self.dom.viewport().scroll_y;
        let outcome = self.effects.on_click(&mut self.dom, target)?;
        if self.dom.viewport().scroll_y != scroll_before {
            self.effects.on_scroll(&mut self.dom, &mut self.scheduler)?;
        }
        let submitter = control.filter(|control| self.is_submit_button(*control));
        if let Some(submitter) = submitter.filter(|_| !outcome.default_prevented) {
            if let Some(form) = self.form_owner(submitter) {
                self.effects
                    .on_submit(&mut self.dom, &mut self.scheduler, form)?;
            }
        }
        self.render()?;
        Ok(outcome)
    }

    /// Submits the form matching `selector`, or the form owning the matched
    /// control.
    pub fn submit(&mut self, selector: &str) -> Result<EventOutcome> {
        let target = self.select_one(selector)?;
        let form = self
            .form_owner(target)
            .ok_or_else(|| Error::Dom(format!("{selector} is not inside a form")))?;
        let outcome = self
            .effects
            .on_submit(&mut self.dom, &mut self.scheduler, form)?;
        self.render()?;
        Ok(outcome)
    }

    pub fn type_text(&mut self, selector: &str, text: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        if self.is_disabled_control(target) {
            return Ok(());
        }
        self.dom.set_value(target, text)
    }

    pub fn set_checked(&mut self, selector: &str, checked: bool) -> Result<()> {
        let target = self.select_one(selector)?;
        self.dom.set_checked(target, checked)
    }

    pub fn mouse_move(&mut self, client_x: f64, client_y: f64) -> Result<()> {
        self.effects
            .on_mouse_move(&mut self.dom, client_x, client_y)?;
        self.render()
    }

    // Timers

    pub fn now_ms(&self) -> i64 {
        self.scheduler.now_ms()
    }

    pub fn pending_timers(&self) -> Vec<PendingTimer> {
        self.scheduler.pending_timers()
    }

    pub fn clear_timer(&mut self, id: TimerId) -> bool {
        self.scheduler.clear_timer(id)
    }

    pub fn clear_all_timers(&mut self) -> usize {
        self.scheduler.clear_all_timers()
    }

    pub fn set_timer_step_limit(&mut self, max_steps: usize) -> Result<()> {
        self.scheduler.set_timer_step_limit(max_steps)
    }

    pub fn advance_time(&mut self, delta_ms: i64) -> Result<()> {
        if delta_ms < 0 {
            return Err(Error::Timer(
                "advance_time requires non-negative milliseconds".into(),
            ));
        }
        let target = self.scheduler.now_ms().saturating_add(delta_ms);
        self.advance_time_to(target)
    }

    /// Runs every timer due up to `target_ms` in due order, moving the clock
    /// to each timer's due time first, then settles the clock on `target_ms`.
    pub fn advance_time_to(&mut self, target_ms: i64) -> Result<()> {
        let from = self.scheduler.now_ms();
        if target_ms < from {
            return Err(Error::Timer(format!(
                "advance_time_to requires target >= now_ms (target={target_ms}, now_ms={from})"
            )));
        }
        let ran = self.run_timer_queue(Some(target_ms))?;
        self.scheduler.set_now(target_ms)?;
        self.render()?;
        self.trace.line(TraceCategory::Timers, || {
            format!("[timer] advance_to from={from} to={target_ms} ran_due={ran}")
        });
        Ok(())
    }

    pub fn run_due_timers(&mut self) -> Result<usize> {
        let now = self.scheduler.now_ms();
        let ran = self.run_timer_queue(Some(now))?;
        self.trace
            .line(TraceCategory::Timers, || format!("[timer] run_due now_ms={now} ran={ran}"));
        Ok(ran)
    }

    /// Runs the earliest pending timer regardless of its due time.
    pub fn run_next_timer(&mut self) -> Result<bool> {
        let Some(task) = self.scheduler.begin_next(None) else {
            self.trace
                .line(TraceCategory::Timers, || "[timer] run_next none".to_string());
            return Ok(false);
        };
        self.execute(task)?;
        Ok(true)
    }

    /// Runs timers until none are left. Uncleared intervals hit the step
    /// limit and fail.
    pub fn flush(&mut self) -> Result<()> {
        let from = self.scheduler.now_ms();
        let ran = self.run_timer_queue(None)?;
        let to = self.scheduler.now_ms();
        self.trace.line(TraceCategory::Timers, || {
            format!("[timer] flush from={from} to={to} ran={ran}")
        });
        Ok(())
    }

    fn run_timer_queue(&mut self, due_limit: Option<i64>) -> Result<usize> {
        let mut steps = 0usize;
        while self.scheduler.next_task_index(due_limit).is_some() {
            steps += 1;
            if steps > self.scheduler.timer_step_limit() {
                return Err(self.scheduler.step_limit_error(steps, due_limit));
            }
            let Some(task) = self.scheduler.begin_next(due_limit) else {
                break;
            };
            self.execute(task)?;
        }
        Ok(steps)
    }

    fn execute(&mut self, task: Task) -> Result<()> {
        let result = self
            .effects
            .run_task(task, &mut self.dom, &mut self.scheduler);
        self.scheduler.finish();
        result?;
        self.render()
    }

    /// Delivers whatever the intersection observers report for the current
    /// geometry.
    fn render(&mut self) -> Result<()> {
        let entries = self.dom.take_intersections();
        if entries.is_empty() {
            return Ok(());
        }
        self.effects.on_intersections(&mut self.dom, &entries)
    }

    // Assertions

    pub fn assert_text(&self, selector: &str, expected: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.dom.text_content(target);
        self.expect_eq(selector, target, expected, actual)
    }

    pub fn assert_inner_html(&self, selector: &str, expected: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.dom.inner_html(target)?;
        self.expect_eq(selector, target, expected, actual)
    }

    pub fn assert_value(&self, selector: &str, expected: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.dom.value(target)?;
        self.expect_eq(selector, target, expected, actual)
    }

    pub fn assert_checked(&self, selector: &str, expected: bool) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.dom.checked(target)?;
        self.expect_eq(selector, target, &expected.to_string(), actual.to_string())
    }

    /// `expected` empty asserts the property is not set.
    pub fn assert_style(&self, selector: &str, property: &str, expected: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.dom.style(target, property)?;
        self.expect_eq(
            &format!("{selector} style.{property}"),
            target,
            expected,
            actual,
        )
    }

    pub fn assert_has_class(&self, selector: &str, class_name: &str) -> Result<()> {
        self.assert_class(selector, class_name, true)
    }

    pub fn assert_lacks_class(&self, selector: &str, class_name: &str) -> Result<()> {
        self.assert_class(selector, class_name, false)
    }

    pub fn assert_disabled(&self, selector: &str, expected: bool) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.dom.is_disabled(target);
        self.expect_eq(
            &format!("{selector} disabled"),
            target,
            &expected.to_string(),
            actual.to_string(),
        )
    }

    pub fn assert_exists(&self, selector: &str) -> Result<()> {
        let _ = self.select_one(selector)?;
        Ok(())
    }

    pub fn dump_dom(&self, selector: &str) -> Result<String> {
        let target = self.select_one(selector)?;
        Ok(self.dom.outer_html(target))
    }

    fn assert_class(&self, selector: &str, class_name: &str, expected: bool) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.dom.class_contains(target, class_name)?;
        if actual == expected {
            return Ok(());
        }
        let describe = |present: bool| {
            if present {
                format!("class {class_name}")
            } else {
                format!("no class {class_name}")
            }
        };
        Err(Error::AssertionFailed {
            selector: selector.to_string(),
            expected: describe(expected),
            actual: describe(actual),
            dom_snippet: self.node_snippet(target),
        })
    }

    fn expect_eq(&self, selector: &str, target: NodeId, expected: &str, actual: String) -> Result<()> {
        if actual != expected {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: expected.to_string(),
                actual,
                dom_snippet: self.node_snippet(target),
            });
        }
        Ok(())
    }

    fn node_snippet(&self, node: NodeId) -> String {
        truncate_chars(&self.dom.outer_html(node), SNIPPET_MAX_CHARS)
    }

    fn is_disabled_control(&self, node: NodeId) -> bool {
        matches!(
            self.dom.tag_name(node),
            Some("button" | "input" | "select" | "textarea")
        ) && self.dom.is_disabled(node)
    }

    fn is_submit_button(&self, node: NodeId) -> bool {
        let kind = self
            .dom
            .attr(node, "type")
            .map(|value| value.to_ascii_lowercase());
        match self.dom.tag_name(node) {
            Some("button") => kind.is_none_or(|kind| kind == "submit"),
            Some("input") => kind.is_some_and(|kind| kind == "submit"),
            _ => false,
        }
    }

    fn form_owner(&self, node: NodeId) -> Option<NodeId> {
        if self.dom.tag_name(node) == Some("form") {
            return Some(node);
        }
        if let Some(form_id) = self.dom.attr(node, "form") {
            let owner = self.dom.element_by_id(&form_id)?;
            return (self.dom.tag_name(owner) == Some("form")).then_some(owner);
        }
        self.dom.closest(node, "form").ok().flatten()
    }
}

fn truncate_chars(value: &str, max_chars: usize) -> String {
    let mut chars = value.chars();
    let mut out: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        out.push_str("...");
    }
    out
}
