use super::*;

const ACTIVE_LINK_CLASS: &str = "active";

/// Marks the navigation link of the section under the lookahead point.
#[derive(Debug, Clone)]
pub(crate) struct SectionHighlighter {
    sections: Vec<NodeId>,
    links: Vec<NodeId>,
    lookahead_px: f64,
    current: Option<String>,
}

impl SectionHighlighter {
    pub(crate) fn resolve(dom: &dyn PageDom, config: &EffectsConfig) -> Result<Self> {
        Ok(Self {
            sections: dom.query_selector_all(&config.markup.sections)?,
            links: dom.query_selector_all(&config.markup.section_links)?,
            lookahead_px: config.highlight_lookahead_px,
            current: None,
        })
    }

    pub(crate) fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub(crate) fn on_scroll(&mut self, dom: &mut dyn PageDom) -> Result<Option<String>> {
        let lookahead = dom.viewport().scroll_y + self.lookahead_px;

        // Later sections win when ranges overlap; a matching section without
        // an id clears the candidate.
        let mut current = None;
        for section in &self.sections {
            let top = dom.offset_top(*section)?;
            let height = dom.offset_height(*section)?;
            if lookahead >= top && lookahead < top + height {
                current = dom.attr(*section, "id");
            }
        }

        for link in &self.links {
            dom.class_remove(*link, ACTIVE_LINK_CLASS)?;
            if current.is_some() && dom.attr(*link, "data-section") == current {
                dom.class_add(*link, ACTIVE_LINK_CLASS)?;
            }
        }

        self.current = current.clone();
        Ok(current)
    }
}
