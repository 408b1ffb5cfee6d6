use super::*;

#[test]
fn navbar_gets_scrolled_class_only_past_threshold() -> Result<()> {
    let mut h = PortfolioHarness::from_html(&page(""))?;
    h.assert_lacks_class("#navbar", "scrolled")?;

    h.scroll_to(60.0)?;
    h.assert_lacks_class("#navbar", "scrolled")?;

    h.scroll_to(61.0)?;
    h.assert_has_class("#navbar", "scrolled")?;
    assert!(h.effects().is_navbar_scrolled(h.dom())?);

    h.scroll_to(0.0)?;
    h.assert_lacks_class("#navbar", "scrolled")?;
    Ok(())
}

#[test]
fn toggle_click_opens_and_closes_mobile_menu() -> Result<()> {
    let mut h = PortfolioHarness::from_html(&page(""))?;

    let outcome = h.click("#navToggle")?;
    assert!(!outcome.default_prevented);
    h.assert_has_class("#navToggle", "active")?;
    h.assert_has_class("#navMenu", "open")?;
    h.assert_style("body", "overflow", "hidden")?;

    h.click("#navToggle")?;
    h.assert_lacks_class("#navToggle", "active")?;
    h.assert_lacks_class("#navMenu", "open")?;
    h.assert_style("body", "overflow", "")?;
    Ok(())
}

#[test]
fn click_inside_toggle_counts_as_toggle_click() -> Result<()> {
    let mut h = PortfolioHarness::from_html(&page(""))?;
    h.click("#navToggle .bar")?;
    h.assert_has_class("#navMenu", "open")?;
    assert!(h.effects().is_menu_open(h.dom())?);
    Ok(())
}

#[test]
fn menu_link_click_always_closes_menu() -> Result<()> {
    let mut h = PortfolioHarness::from_html(&page(""))?;
    h.click("#navToggle")?;
    h.assert_has_class("#navMenu", "open")?;

    h.click("#link-blog")?;
    h.assert_lacks_class("#navMenu", "open")?;
    h.assert_lacks_class("#navToggle", "active")?;
    h.assert_style("body", "overflow", "")?;

    // Already closed: stays closed.
    h.click("#link-blog")?;
    h.assert_lacks_class("#navMenu", "open")?;
    Ok(())
}

#[test]
fn links_outside_menu_leave_menu_alone() -> Result<()> {
    let html = page(r#"<footer><a class="nav-link" id="footer-link" href="/cv">CV</a></footer>"#);
    let mut h = PortfolioHarness::from_html(&html)?;
    h.click("#navToggle")?;
    h.click("#footer-link")?;
    h.assert_has_class("#navMenu", "open")?;
    Ok(())
}

#[test]
fn attach_reports_missing_navbar_elements() {
    let err = PortfolioHarness::from_html("<main></main>").expect_err("navbar is required");
    assert_eq!(err, Error::MissingElement("#navbar".into()));

    let html = r#"<nav id="navbar"><button id="navToggle"></button></nav>"#;
    let err = PortfolioHarness::from_html(html).expect_err("menu is required");
    match err {
        Error::MissingElement(what) => assert_eq!(what, "#navMenu"),
        other => panic!("unexpected error: {other:?}"),
    }
}

const SECTIONS: &str = r#"
<header class="hero" id="home"></header>
<section class="section" id="about"></section>
<section class="section" id="work"></section>
"#;

fn sections_harness() -> Result<PortfolioHarness> {
    harness_with_layout(
        SECTIONS,
        &[
            ("#home", 0.0, 600.0),
            ("#about", 600.0, 200.0),
            ("#work", 1400.0, 600.0),
        ],
    )
}

#[test]
fn active_link_follows_section_under_lookahead_point() -> Result<()> {
    let mut h = sections_harness()?;

    h.scroll_to(0.0)?;
    assert_eq!(h.effects().active_section(), Some("home"));
    h.assert_has_class("#link-home", "active")?;

    h.scroll_to(500.0)?;
    assert_eq!(h.effects().active_section(), Some("about"));
    h.assert_has_class("#link-about", "active")?;
    h.assert_lacks_class("#link-home", "active")?;

    h.scroll_to(1300.0)?;
    assert_eq!(h.effects().active_section(), Some("work"));
    h.assert_has_class("#link-work", "active")?;
    h.assert_lacks_class("#link-about", "active")?;
    Ok(())
}

#[test]
fn gap_between_sections_clears_active_link() -> Result<()> {
    let mut h = sections_harness()?;
    h.scroll_to(500.0)?;
    h.assert_has_class("#link-about", "active")?;

    // lookahead at 1200 falls between #about (ends at 800) and #work (starts at 1400)
    h.scroll_to(1000.0)?;
    assert_eq!(h.effects().active_section(), None);
    for link in ["#link-home", "#link-about", "#link-work", "#link-blog"] {
        h.assert_lacks_class(link, "active")?;
    }
    Ok(())
}

#[test]
fn lookahead_range_is_half_open() -> Result<()> {
    let mut h = sections_harness()?;
    // lookahead == 600: the end of #home and the start of #about
    h.scroll_to(400.0)?;
    assert_eq!(h.effects().active_section(), Some("about"));
    Ok(())
}

#[test]
fn later_overlapping_section_wins() -> Result<()> {
    let mut h = harness_with_layout(
        SECTIONS,
        &[
            ("#home", 0.0, 2000.0),
            ("#about", 0.0, 2000.0),
            ("#work", 5000.0, 100.0),
        ],
    )?;
    h.scroll_to(100.0)?;
    assert_eq!(h.effects().active_section(), Some("about"));
    h.assert_lacks_class("#link-home", "active")?;
    h.assert_has_class("#link-about", "active")?;
    Ok(())
}

#[test]
fn matching_section_without_id_highlights_nothing() -> Result<()> {
    let body = r#"
      <section class="section" id="about"></section>
      <section class="section" data-name="anonymous"></section>
    "#;
    let mut h = harness_with_layout(
        body,
        &[
            ("#about", 0.0, 1000.0),
            ("[data-name=anonymous]", 0.0, 1000.0),
        ],
    )?;
    h.scroll_to(0.0)?;
    assert_eq!(h.effects().active_section(), None);
    h.assert_lacks_class("#link-about", "active")?;
    Ok(())
}
