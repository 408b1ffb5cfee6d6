use super::*;

pub(crate) const SENDING_MARKUP: &str = concat!(
    r#"<svg width="20" height="20" viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2" class="spin">"#,
    r#"<path d="M21 12a9 9 0 1 1-6.219-8.56"></path>"#,
    "</svg>",
    "<span>Sending...</span>",
);

pub(crate) const SENT_MARKUP: &str = concat!(
    r#"<svg width="20" height="20" viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2">"#,
    r#"<path d="M20 6L9 17l-5-5"></path>"#,
    "</svg>",
    "<span>Message Sent!</span>",
);

pub(crate) const SPIN_STYLE: &str = "@keyframes spin { from { transform: rotate(0deg); } to { transform: rotate(360deg); } } .spin { animation: spin 1s linear infinite; }";

/// Where the simulated submission currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormPhase {
    #[default]
    Idle,
    Sending,
    Sent,
}

#[derive(Debug, Clone)]
pub(crate) struct ContactFormHandler {
    form: NodeId,
    button: NodeId,
    phase: FormPhase,
    saved_markup: Option<String>,
    sending_delay_ms: i64,
    reset_delay_ms: i64,
    sending_opacity: String,
    sent_background: String,
}

impl ContactFormHandler {
    /// `None` when the page has no contact form or it lacks a submit button.
    pub(crate) fn resolve(dom: &dyn PageDom, config: &EffectsConfig) -> Option<Self> {
        let form = dom.element_by_id(&config.markup.contact_form_id)?;
        let button = dom.element_by_id(&config.markup.submit_button_id)?;
        Some(Self {
            form,
            button,
            phase: FormPhase::Idle,
            saved_markup: None,
            sending_delay_ms: config.form_sending_delay_ms,
            reset_delay_ms: config.form_reset_delay_ms,
            sending_opacity: config.form_sending_opacity.clone(),
            sent_background: config.form_sent_background.clone(),
        })
    }

    pub(crate) fn form(&self) -> NodeId {
        self.form
    }

    pub(crate) fn phase(&self) -> FormPhase {
        self.phase
    }

    /// Returns whether a new submission started.
    pub(crate) fn on_submit(
        &mut self,
        dom: &mut dyn PageDom,
        timers: &mut dyn TimerHost,
    ) -> Result<bool> {
        if self.phase != FormPhase::Idle {
            return Ok(false);
        }
        self.saved_markup = Some(dom.inner_html(self.button)?);
        dom.set_inner_html(self.button, SENDING_MARKUP)?;
        dom.set_disabled(self.button, true)?;
        dom.style_set(self.button, "opacity", &self.sending_opacity)?;
        self.phase = FormPhase::Sending;
        timers.set_timeout(Task::FormSent, self.sending_delay_ms);
        Ok(true)
    }

    pub(crate) fn on_sent(
        &mut self,
        dom: &mut dyn PageDom,
        timers: &mut dyn TimerHost,
    ) -> Result<()> {
        if self.phase != FormPhase::Sending {
            return Ok(());
        }
        dom.set_inner_html(self.button, SENT_MARKUP)?;
        dom.style_set(self.button, "opacity", "1")?;
        dom.style_set(self.button, "background", &self.sent_background)?;
        dom.reset_form(self.form)?;
        self.phase = FormPhase::Sent;
        timers.set_timeout(Task::FormRestore, self.reset_delay_ms);
        Ok(())
    }

    pub(crate) fn on_restore(&mut self, dom: &mut dyn PageDom) -> Result<()> {
        if self.phase != FormPhase::Sent {
            return Ok(());
        }
        let original = self.saved_markup.take().unwrap_or_default();
        dom.set_inner_html(self.button, &original)?;
        dom.set_disabled(self.button, false)?;
        dom.style_set(self.button, "background", "")?;
        self.phase = FormPhase::Idle;
        Ok(())
    }
}
