use super::*;

/// Opaque handle to an element owned by a [`PageDom`] implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub scroll_y: f64,
    pub width: f64,
    pub height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            scroll_y: 0.0,
            width: 1280.0,
            height: 800.0,
        }
    }
}

/// Settings for a viewport-intersection observer. The root is the viewport
/// with its bottom edge pulled up by `bottom_margin_px`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObserverOptions {
    pub bottom_margin_px: f64,
    pub threshold: f64,
}

impl ObserverOptions {
    /// CSS `rootMargin` for these options.
    pub fn root_margin(&self) -> String {
        format!("0px 0px -{}px 0px", format_number(self.bottom_margin_px))
    }
}

/// One observer notification for an observed element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntersectionEntry {
    pub target: NodeId,
    pub is_intersecting: bool,
    pub ratio: f64,
}

/// Everything the effects need from a page: lookups, class list, style,
/// markup, geometry, intersection observation and scrolling.
///
/// Style properties use CSS names (`overflow`, `background`). Setting an
/// empty value removes the property.
pub trait PageDom {
    fn element_by_id(&self, id: &str) -> Option<NodeId>;

    fn query_selector_all(&self, selector: &str) -> Result<Vec<NodeId>>;

    fn query_selector(&self, selector: &str) -> Result<Option<NodeId>> {
        Ok(self.query_selector_all(selector)?.into_iter().next())
    }

    fn closest(&self, node: NodeId, selector: &str) -> Result<Option<NodeId>>;

    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool;

    fn attr(&self, node: NodeId, name: &str) -> Option<String>;

    fn class_contains(&self, node: NodeId, class_name: &str) -> Result<bool>;

    fn class_add(&mut self, node: NodeId, class_name: &str) -> Result<()>;

    fn class_remove(&mut self, node: NodeId, class_name: &str) -> Result<()>;

    /// Returns whether the class is present afterwards.
    fn class_toggle(&mut self, node: NodeId, class_name: &str) -> Result<bool> {
        if self.class_contains(node, class_name)? {
            self.class_remove(node, class_name)?;
            Ok(false)
        } else {
            self.class_add(node, class_name)?;
            Ok(true)
        }
    }

    fn style_set(&mut self, node: NodeId, property: &str, value: &str) -> Result<()>;

    fn inner_html(&self, node: NodeId) -> Result<String>;

    fn set_inner_html(&mut self, node: NodeId, html: &str) -> Result<()>;

    fn set_text_content(&mut self, node: NodeId, text: &str) -> Result<()>;

    fn set_disabled(&mut self, node: NodeId, disabled: bool) -> Result<()>;

    fn reset_form(&mut self, form: NodeId) -> Result<()>;

    fn offset_top(&self, node: NodeId) -> Result<f64>;

    fn offset_height(&self, node: NodeId) -> Result<f64>;

    fn bounding_client_rect(&self, node: NodeId) -> Result<Rect>;

    fn body(&self) -> Result<NodeId>;

    fn append_head_style(&mut self, css: &str) -> Result<()>;

    fn viewport(&self) -> Viewport;

    /// Registers `targets` with a viewport-intersection observer. The page
    /// reports an entry for every target once, then whenever a target's
    /// visible ratio crosses `options.threshold`. Entries are handed to
    /// [`PortfolioEffects::on_intersections`](crate::PortfolioEffects::on_intersections).
    fn observe_intersections(&mut self, targets: &[NodeId], options: ObserverOptions) -> Result<()>;

    /// Smooth-scrolls the window to document offset `top`.
    fn scroll_to(&mut self, top: f64);
}
