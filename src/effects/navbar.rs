use super::*;

const SCROLLED_CLASS: &str = "scrolled";
const TOGGLE_ACTIVE_CLASS: &str = "active";
const MENU_OPEN_CLASS: &str = "open";

#[derive(Debug, Clone)]
pub(crate) struct NavbarController {
    navbar: NodeId,
    toggle: NodeId,
    menu: NodeId,
    menu_links: String,
    scrolled_threshold_px: f64,
}

impl NavbarController {
    pub(crate) fn resolve(dom: &dyn PageDom, config: &EffectsConfig) -> Result<Self> {
        let markup = &config.markup;
        let lookup = |id: &str| {
            dom.element_by_id(id)
                .ok_or_else(|| Error::MissingElement(format!("#{id}")))
        };
        Ok(Self {
            navbar: lookup(&markup.navbar_id)?,
            toggle: lookup(&markup.nav_toggle_id)?,
            menu: lookup(&markup.nav_menu_id)?,
            menu_links: markup.menu_links.clone(),
            scrolled_threshold_px: config.scrolled_threshold_px,
        })
    }

    /// Returns whether the navbar is in its scrolled state afterwards.
    pub(crate) fn on_scroll(&self, dom: &mut dyn PageDom) -> Result<bool> {
        let scrolled = dom.viewport().scroll_y > self.scrolled_threshold_px;
        if scrolled {
            dom.class_add(self.navbar, SCROLLED_CLASS)?;
        } else {
            dom.class_remove(self.navbar, SCROLLED_CLASS)?;
        }
        Ok(scrolled)
    }

    pub(crate) fn is_toggle_click(&self, dom: &dyn PageDom, target: NodeId) -> bool {
        dom.contains(self.toggle, target)
    }

    /// The in-menu link a click landed on, if any.
    pub(crate) fn menu_link_for(&self, dom: &dyn PageDom, target: NodeId) -> Result<Option<NodeId>> {
        let Some(link) = dom.closest(target, &self.menu_links)? else {
            return Ok(None);
        };
        if link != self.menu && dom.contains(self.menu, link) {
            Ok(Some(link))
        } else {
            Ok(None)
        }
    }

    /// Flips the mobile menu and locks page scrolling while it is open.
    /// Returns whether the menu is open afterwards.
    pub(crate) fn toggle_menu(&self, dom: &mut dyn PageDom) -> Result<bool> {
        dom.class_toggle(self.toggle, TOGGLE_ACTIVE_CLASS)?;
        let open = dom.class_toggle(self.menu, MENU_OPEN_CLASS)?;
        let body = dom.body()?;
        dom.style_set(body, "overflow", if open { "hidden" } else { "" })?;
        Ok(open)
    }

    pub(crate) fn close_menu(&self, dom: &mut dyn PageDom) -> Result<()> {
        dom.class_remove(self.toggle, TOGGLE_ACTIVE_CLASS)?;
        dom.class_remove(self.menu, MENU_OPEN_CLASS)?;
        let body = dom.body()?;
        dom.style_set(body, "overflow", "")
    }

    pub(crate) fn is_menu_open(&self, dom: &dyn PageDom) -> Result<bool> {
        dom.class_contains(self.menu, MENU_OPEN_CLASS)
    }
}
