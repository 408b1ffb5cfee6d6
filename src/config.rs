/// Element ids and selectors the effects expect to find on the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupContract {
    pub navbar_id: String,
    pub nav_toggle_id: String,
    pub nav_menu_id: String,
    /// Links that take part in section highlighting.
    pub section_links: String,
    /// Links inside the menu that close it when clicked.
    pub menu_links: String,
    pub sections: String,
    pub in_page_anchors: String,
    pub contact_form_id: String,
    pub submit_button_id: String,
    pub stat_numbers: String,
    pub reveal_targets: String,
    pub stats_block: String,
    pub code_block: String,
    pub glows: String,
}

impl Default for MarkupContract {
    fn default() -> Self {
        Self {
            navbar_id: "navbar".into(),
            nav_toggle_id: "navToggle".into(),
            nav_menu_id: "navMenu".into(),
            section_links: ".nav-link[data-section]".into(),
            menu_links: ".nav-link".into(),
            sections: ".section, .hero".into(),
            in_page_anchors: "a[href^=\"#\"]".into(),
            contact_form_id: "contactForm".into(),
            submit_button_id: "submitBtn".into(),
            stat_numbers: ".stat-number[data-count]".into(),
            reveal_targets: ".animate-on-scroll".into(),
            stats_block: ".hero-stats".into(),
            code_block: ".code-window-body code".into(),
            glows: ".hero-glow".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EffectsConfig {
    pub markup: MarkupContract,
    pub scrolled_threshold_px: f64,
    pub highlight_lookahead_px: f64,
    pub reveal_bottom_margin_px: f64,
    pub reveal_threshold: f64,
    pub counter_duration_ms: i64,
    pub counter_min_step_ms: i64,
    pub counter_startup_delay_ms: i64,
    pub navbar_offset_px: f64,
    pub form_sending_delay_ms: i64,
    pub form_reset_delay_ms: i64,
    pub form_sending_opacity: String,
    pub form_sent_background: String,
    pub typing_start_delay_ms: i64,
    pub typing_step_ms: i64,
    pub parallax_factor: f64,
}

impl Default for EffectsConfig {
    fn default() -> Self {
        Self {
            markup: MarkupContract::default(),
            scrolled_threshold_px: 60.0,
            highlight_lookahead_px: 200.0,
            reveal_bottom_margin_px: 60.0,
            reveal_threshold: 0.1,
            counter_duration_ms: 1500,
            counter_min_step_ms: 50,
            counter_startup_delay_ms: 500,
            navbar_offset_px: 70.0,
            form_sending_delay_ms: 1500,
            form_reset_delay_ms: 3000,
            form_sending_opacity: "0.7".into(),
            form_sent_background: "#16a34a".into(),
            typing_start_delay_ms: 800,
            typing_step_ms: 12,
            parallax_factor: 20.0,
        }
    }
}
