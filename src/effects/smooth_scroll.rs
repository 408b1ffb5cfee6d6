use super::*;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum AnchorClick {
    NotAnchor,
    Dangling,
    Scrolled(f64),
}

#[derive(Debug, Clone)]
pub(crate) struct SmoothScroller {
    anchors: String,
    navbar_offset_px: f64,
}

impl SmoothScroller {
    pub(crate) fn new(config: &EffectsConfig) -> Self {
        Self {
            anchors: config.markup.in_page_anchors.clone(),
            navbar_offset_px: config.navbar_offset_px,
        }
    }

    pub(crate) fn on_click(&self, dom: &mut dyn PageDom, target: NodeId) -> Result<AnchorClick> {
        let Some(anchor) = dom.closest(target, &self.anchors)? else {
            return Ok(AnchorClick::NotAnchor);
        };
        let href = dom.attr(anchor, "href").unwrap_or_default();
        let fragment = href.strip_prefix('#').unwrap_or_default();
        let Some(destination) = (!fragment.is_empty())
            .then(|| dom.element_by_id(fragment))
            .flatten()
        else {
            return Ok(AnchorClick::Dangling);
        };
        let top = dom.offset_top(destination)? - self.navbar_offset_px;
        dom.scroll_to(top);
        Ok(AnchorClick::Scrolled(top))
    }
}
