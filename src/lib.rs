use std::collections::{HashMap, HashSet, VecDeque};
use std::error::Error as StdError;
use std::fmt;

mod config;
mod controller;
mod effects;
mod harness;
mod html;
mod mock_dom;
mod page_dom;
mod scheduler;
mod selector;
mod trace;
#[cfg(target_arch = "wasm32")]
mod web;

pub use config::{EffectsConfig, MarkupContract};
pub use controller::{EventOutcome, PortfolioEffects};
pub use effects::contact_form::FormPhase;
pub use effects::typing::{TypingStep, TypingSteps};
pub use harness::PortfolioHarness;
pub use mock_dom::MockDom;
pub use page_dom::{IntersectionEntry, NodeId, ObserverOptions, PageDom, Rect, Viewport};
pub use scheduler::{PendingTimer, Task, TimerHost, TimerId, VirtualScheduler};
pub use trace::{TraceCategory, TraceState};
#[cfg(target_arch = "wasm32")]
pub use web::start;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    HtmlParse(String),
    UnsupportedSelector(String),
    SelectorNotFound(String),
    MissingElement(String),
    Dom(String),
    Timer(String),
    Config(String),
    Platform(String),
    AssertionFailed {
        selector: String,
        expected: String,
        actual: String,
        dom_snippet: String,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HtmlParse(msg) => write!(f, "html parse error: {msg}"),
            Self::UnsupportedSelector(selector) => write!(f, "unsupported selector: {selector}"),
            Self::SelectorNotFound(selector) => write!(f, "selector not found: {selector}"),
            Self::MissingElement(what) => write!(f, "required element missing: {what}"),
            Self::Dom(msg) => write!(f, "dom error: {msg}"),
            Self::Timer(msg) => write!(f, "timer error: {msg}"),
            Self::Config(msg) => write!(f, "invalid configuration: {msg}"),
            Self::Platform(msg) => write!(f, "platform error: {msg}"),
            Self::AssertionFailed {
                selector,
                expected,
                actual,
                dom_snippet,
            } => write!(
                f,
                "assertion failed for {selector}: expected {expected}, actual {actual}, snippet {dom_snippet}"
            ),
        }
    }
}

impl StdError for Error {}

/// Formats a number the way JavaScript stringifies it for inline styles.
pub(crate) fn format_number(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value == f64::INFINITY {
        return "Infinity".to_string();
    }
    if value == f64::NEG_INFINITY {
        return "-Infinity".to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }
    format!("{value}")
}

/// `parseInt(raw, 10)`: leading whitespace, optional sign, then as many
/// decimal digits as are present.
pub(crate) fn parse_int_prefix(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    let magnitude = digits[..end].parse::<i64>().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

#[cfg(test)]
mod tests;
