use super::*;

pub(crate) mod contact_form;
pub(crate) mod counter;
pub(crate) mod navbar;
pub(crate) mod parallax;
pub(crate) mod reveal;
pub(crate) mod section_highlight;
pub(crate) mod smooth_scroll;
pub(crate) mod typing;
