use std::cell::RefCell;
use std::rc::Rc;

use super::*;

const TRACE_TARGET: &str = "portfolio_effects::trace";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceCategory {
    Events,
    Timers,
    Effects,
}

#[derive(Debug)]
struct TraceInner {
    enabled: bool,
    events: bool,
    timers: bool,
    effects: bool,
    logs: VecDeque<String>,
    log_limit: usize,
    forward_to_log: bool,
}

impl Default for TraceInner {
    fn default() -> Self {
        Self {
            enabled: false,
            events: true,
            timers: true,
            effects: true,
            logs: VecDeque::new(),
            log_limit: 10_000,
            forward_to_log: true,
        }
    }
}

/// Bounded trace log shared by the controller and the timer host.
///
/// Disabled by default. When enabled every line is kept in memory and,
/// unless forwarding is switched off, handed to the `log` facade at debug
/// level. Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct TraceState {
    inner: Rc<RefCell<TraceInner>>,
}

impl TraceState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enable(&self, enabled: bool) {
        self.inner.borrow_mut().enabled = enabled;
    }

    pub fn set_category(&self, category: TraceCategory, enabled: bool) {
        let mut inner = self.inner.borrow_mut();
        match category {
            TraceCategory::Events => inner.events = enabled,
            TraceCategory::Timers => inner.timers = enabled,
            TraceCategory::Effects => inner.effects = enabled,
        }
    }

    pub fn set_forward_to_log(&self, enabled: bool) {
        self.inner.borrow_mut().forward_to_log = enabled;
    }

    pub fn set_log_limit(&self, max_entries: usize) -> Result<()> {
        if max_entries == 0 {
            return Err(Error::Config(
                "trace log limit requires at least 1 entry".into(),
            ));
        }
        let mut inner = self.inner.borrow_mut();
        inner.log_limit = max_entries;
        while inner.logs.len() > max_entries {
            inner.logs.pop_front();
        }
        Ok(())
    }

    pub fn take_logs(&self) -> Vec<String> {
        self.inner.borrow_mut().logs.drain(..).collect()
    }

    fn wants(inner: &TraceInner, category: TraceCategory) -> bool {
        inner.enabled
            && match category {
                TraceCategory::Events => inner.events,
                TraceCategory::Timers => inner.timers,
                TraceCategory::Effects => inner.effects,
            }
    }

    pub(crate) fn line(&self, category: TraceCategory, line: impl FnOnce() -> String) {
        let mut inner = self.inner.borrow_mut();
        if !Self::wants(&inner, category) {
            return;
        }
        let line = line();
        if inner.forward_to_log {
            log::debug!(target: TRACE_TARGET, "{line}");
        }
        if inner.logs.len() >= inner.log_limit {
            inner.logs.pop_front();
        }
        inner.logs.push_back(line);
    }
}
