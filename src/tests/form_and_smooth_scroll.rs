use super::*;

const CONTACT: &str = r#"
<section class="section" id="contact">
  <form id="contactForm">
    <input id="name" name="name">
    <input id="email" name="email" value="you@example.com">
    <input id="copy" type="checkbox">
    <textarea id="message" name="message"></textarea>
    <button id="submitBtn" type="submit"><span>Send Message</span></button>
  </form>
  <form id="newsletter"><button id="subscribe">Subscribe</button></form>
</section>
"#;

#[test]
fn submit_plays_sending_sent_idle_sequence() -> Result<()> {
    let mut h = PortfolioHarness::from_html(&page(CONTACT))?;
    assert_eq!(h.effects().form_phase(), Some(FormPhase::Idle));

    h.type_text("#name", "Ada")?;
    h.type_text("#email", "ada@example.com")?;
    h.type_text("#message", "Hello there")?;
    h.set_checked("#copy", true)?;

    h.click("#submitBtn")?;
    assert_eq!(h.effects().form_phase(), Some(FormPhase::Sending));
    h.assert_text("#submitBtn", "Sending...")?;
    h.assert_disabled("#submitBtn", true)?;
    h.assert_style("#submitBtn", "opacity", "0.7")?;
    assert!(h.dump_dom("#submitBtn")?.contains(r#"class="spin""#));
    h.assert_value("#name", "Ada")?;

    h.advance_time(1499)?;
    assert_eq!(h.effects().form_phase(), Some(FormPhase::Sending));

    h.advance_time(1)?;
    assert_eq!(h.effects().form_phase(), Some(FormPhase::Sent));
    h.assert_text("#submitBtn", "Message Sent!")?;
    h.assert_style("#submitBtn", "opacity", "1")?;
    h.assert_style("#submitBtn", "background", "#16a34a")?;
    h.assert_disabled("#submitBtn", true)?;
    h.assert_value("#name", "")?;
    h.assert_value("#email", "you@example.com")?;
    h.assert_value("#message", "")?;
    h.assert_checked("#copy", false)?;

    h.advance_time(2999)?;
    assert_eq!(h.effects().form_phase(), Some(FormPhase::Sent));

    h.advance_time(1)?;
    assert_eq!(h.now_ms(), 4500);
    assert_eq!(h.effects().form_phase(), Some(FormPhase::Idle));
    h.assert_inner_html("#submitBtn", "<span>Send Message</span>")?;
    h.assert_disabled("#submitBtn", false)?;
    h.assert_style("#submitBtn", "background", "")?;
    h.assert_style("#submitBtn", "opacity", "1")?;
    Ok(())
}

#[test]
fn submit_default_is_prevented_for_contact_form_only() -> Result<()> {
    let mut h = PortfolioHarness::from_html(&page(CONTACT))?;
    assert!(h.submit("#contactForm")?.default_prevented);
    assert!(!h.submit("#newsletter")?.default_prevented);
    Ok(())
}

#[test]
fn resubmitting_while_in_flight_is_ignored() -> Result<()> {
    let mut h = PortfolioHarness::from_html(&page(CONTACT))?;
    h.submit("#contactForm")?;
    h.advance_time(500)?;

    // disabled button swallows the click; implicit submission still arrives
    h.click("#submitBtn")?;
    let outcome = h.submit("#name")?;
    assert!(outcome.default_prevented);
    assert_eq!(h.effects().form_phase(), Some(FormPhase::Sending));

    h.advance_time(1000)?;
    assert_eq!(h.effects().form_phase(), Some(FormPhase::Sent));
    h.submit("#contactForm")?;
    assert_eq!(h.effects().form_phase(), Some(FormPhase::Sent));

    h.advance_time(3000)?;
    assert_eq!(h.effects().form_phase(), Some(FormPhase::Idle));
    assert!(h.pending_timers().is_empty());
    Ok(())
}

#[test]
fn form_can_be_submitted_again_after_restore() -> Result<()> {
    let mut h = PortfolioHarness::from_html(&page(CONTACT))?;
    h.click("#submitBtn")?;
    h.advance_time(4500)?;
    h.click("#submitBtn")?;
    assert_eq!(h.effects().form_phase(), Some(FormPhase::Sending));
    h.advance_time(4500)?;
    h.assert_inner_html("#submitBtn", "<span>Send Message</span>")?;
    Ok(())
}

#[test]
fn clicking_the_button_label_submits_the_form() -> Result<()> {
    let mut h = PortfolioHarness::from_html(&page(CONTACT))?;
    let outcome = h.click("#submitBtn span")?;
    assert!(!outcome.default_prevented);
    assert_eq!(h.effects().form_phase(), Some(FormPhase::Sending));

    // the disabled button swallows clicks on its new label
    h.enable_trace(true);
    h.trace().set_forward_to_log(false);
    h.click("#submitBtn span")?;
    let logs = h.take_trace_logs();
    assert!(logs.iter().all(|line| !line.starts_with("[event] click")), "{logs:#?}");
    assert!(logs.iter().all(|line| !line.starts_with("[event] submit")), "{logs:#?}");
    Ok(())
}

#[test]
fn form_without_submit_button_is_left_alone() -> Result<()> {
    let body = r#"<form id="contactForm"><input id="name"><button id="send">Send</button></form>"#;
    let mut h = PortfolioHarness::from_html(&page(body))?;
    assert_eq!(h.effects().form_phase(), None);

    let outcome = h.submit("#contactForm")?;
    assert!(!outcome.default_prevented);
    h.assert_text("#send", "Send")?;
    assert!(h.pending_timers().iter().all(|timer| timer.task != Task::FormSent));
    Ok(())
}

#[test]
fn submit_requires_a_form() -> Result<()> {
    let mut h = PortfolioHarness::from_html(&page(CONTACT))?;
    match h.submit("#navToggle") {
        Err(Error::Dom(msg)) => assert!(msg.contains("not inside a form")),
        other => panic!("unexpected result: {other:?}"),
    }
    Ok(())
}

const ANCHORS: &str = r##"
<a id="to-contact" href="#contact"><span id="to-contact-label">Contact</span></a>
<a id="to-top" href="#home">Top</a>
<a id="to-missing" href="#missing">Missing</a>
<a id="to-nowhere" href="#">Nowhere</a>
<a id="external" href="https://example.com">Elsewhere</a>
<header class="hero" id="home"></header>
<section class="section" id="contact"></section>
"##;

fn anchors_harness() -> Result<PortfolioHarness> {
    harness_with_layout(ANCHORS, &[("#home", 30.0, 600.0), ("#contact", 2000.0, 800.0)])
}

#[test]
fn anchor_click_scrolls_smoothly_below_navbar() -> Result<()> {
    let mut h = anchors_harness()?;
    let outcome = h.click("#to-contact-label")?;
    assert!(outcome.default_prevented);
    assert_eq!(h.dom().scroll_requests(), &[1930.0]);
    assert_eq!(h.dom().viewport().scroll_y, 1930.0);
    // the scroll fires the usual scroll handlers
    h.assert_has_class("#navbar", "scrolled")?;
    assert_eq!(h.effects().active_section(), Some("contact"));
    Ok(())
}

#[test]
fn scroll_target_above_offset_clamps_at_page_top() -> Result<()> {
    let mut h = anchors_harness()?;
    h.click("#to-top")?;
    assert_eq!(h.dom().scroll_requests(), &[-40.0]);
    assert_eq!(h.dom().viewport().scroll_y, 0.0);
    Ok(())
}

#[test]
fn dangling_anchors_are_prevented_without_scrolling() -> Result<()> {
    let mut h = anchors_harness()?;
    assert!(h.click("#to-missing")?.default_prevented);
    assert!(h.click("#to-nowhere")?.default_prevented);
    assert!(h.dom().scroll_requests().is_empty());
    Ok(())
}

#[test]
fn other_clicks_keep_their_default() -> Result<()> {
    let mut h = anchors_harness()?;
    assert!(!h.click("#external")?.default_prevented);
    assert!(!h.click("#contact")?.default_prevented);
    assert!(h.dom().scroll_requests().is_empty());
    Ok(())
}

#[test]
fn menu_anchor_closes_menu_and_scrolls() -> Result<()> {
    let mut h = anchors_harness()?;
    h.click("#navToggle")?;
    let outcome = h.click("#link-home")?;
    assert!(outcome.default_prevented);
    h.assert_lacks_class("#navMenu", "open")?;
    assert_eq!(h.dom().scroll_requests().len(), 1);
    Ok(())
}
