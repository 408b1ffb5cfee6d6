use super::*;
use crate::effects::counter::step_interval_ms;
use crate::mock_dom::intersect;

const CARDS: &str = r#"
<div class="animate-on-scroll" id="card-top"></div>
<div class="animate-on-scroll" id="card-low"></div>
"#;

#[test]
fn elements_on_screen_at_load_are_revealed_immediately() -> Result<()> {
    let h = harness_with_layout(
        CARDS,
        &[("#card-top", 100.0, 200.0), ("#card-low", 1000.0, 400.0)],
    )?;
    h.assert_has_class("#card-top", "visible")?;
    h.assert_lacks_class("#card-low", "visible")?;
    assert_eq!(h.effects().revealed_count(), 1);
    Ok(())
}

#[test]
fn scroll_reveals_once_threshold_is_reached_and_never_hides() -> Result<()> {
    let mut h = harness_with_layout(
        CARDS,
        &[("#card-top", 100.0, 200.0), ("#card-low", 1000.0, 400.0)],
    )?;

    // 30px of 400 inside the root (viewport minus the 60px bottom margin)
    h.scroll_to(290.0)?;
    h.assert_lacks_class("#card-low", "visible")?;

    h.scroll_to(400.0)?;
    h.assert_has_class("#card-low", "visible")?;

    h.scroll_to(0.0)?;
    h.scroll_to(5000.0)?;
    h.assert_has_class("#card-top", "visible")?;
    h.assert_has_class("#card-low", "visible")?;
    assert_eq!(h.effects().revealed_count(), 2);
    Ok(())
}

#[test]
fn initial_pass_reveals_any_overlap() -> Result<()> {
    // 10px of 400 overlap the root: below the threshold, but the first
    // observation reports every intersecting target
    let h = harness_with_layout(CARDS, &[("#card-top", 730.0, 400.0), ("#card-low", 2000.0, 10.0)])?;
    h.assert_has_class("#card-top", "visible")?;
    h.assert_lacks_class("#card-low", "visible")?;
    Ok(())
}

#[test]
fn zero_height_targets_count_when_inside_root() -> Result<()> {
    let h = harness_with_layout(CARDS, &[("#card-top", 0.0, 0.0), ("#card-low", 900.0, 0.0)])?;
    h.assert_has_class("#card-top", "visible")?;
    h.assert_lacks_class("#card-low", "visible")?;
    Ok(())
}

#[test]
fn resize_is_picked_up_by_the_observer() -> Result<()> {
    let mut h = harness_with_layout(
        CARDS,
        &[("#card-top", 100.0, 100.0), ("#card-low", 900.0, 100.0)],
    )?;
    h.assert_lacks_class("#card-low", "visible")?;

    h.set_viewport(1280.0, 1200.0)?;
    h.assert_has_class("#card-low", "visible")?;
    Ok(())
}

#[test]
fn layout_shift_reveals_without_scrolling() -> Result<()> {
    let mut h = harness_with_layout(
        CARDS,
        &[("#card-top", 2000.0, 200.0), ("#card-low", 3000.0, 200.0)],
    )?;
    h.assert_lacks_class("#card-top", "visible")?;

    h.set_layout("#card-top", 100.0, 200.0)?;
    h.advance_time(5000)?;
    h.assert_has_class("#card-top", "visible")?;
    h.assert_lacks_class("#card-low", "visible")?;
    assert_eq!(h.effects().revealed_count(), 1);
    Ok(())
}

#[test]
fn observer_reports_first_check_then_threshold_crossings() -> Result<()> {
    let mut dom = page_dom(CARDS, &[("#card-top", 100.0, 200.0), ("#card-low", 700.0, 400.0)])?;
    let top = dom.select_one("#card-top")?;
    let low = dom.select_one("#card-low")?;
    let options = ObserverOptions {
        bottom_margin_px: 60.0,
        threshold: 0.1,
    };
    assert_eq!(options.root_margin(), "0px 0px -60px 0px");
    dom.observe_intersections(&[top, low], options)?;

    let first = dom.take_intersections();
    assert_eq!(first.len(), 2);
    assert!(first.iter().all(|entry| entry.is_intersecting));
    assert!(dom.take_intersections().is_empty());

    // 60px of 400 visible: still past the threshold
    dom.set_scroll_y(20.0);
    assert!(dom.take_intersections().is_empty());

    dom.set_scroll_y(700.0);
    let crossed = dom.take_intersections();
    assert_eq!(
        crossed.iter().map(|entry| entry.target).collect::<Vec<_>>(),
        vec![top]
    );
    assert!(!crossed[0].is_intersecting);
    Ok(())
}

#[test]
fn entries_for_other_elements_are_ignored() -> Result<()> {
    let mut dom = page_dom(CARDS, &[])?;
    let mut timers = VirtualScheduler::new();
    let mut effects = PortfolioEffects::attach(&mut dom, &mut timers, EffectsConfig::default())?;
    let navbar = dom.select_one("#navbar")?;
    let card = dom.select_one("#card-low")?;

    effects.on_intersections(
        &mut dom,
        &[
            IntersectionEntry {
                target: navbar,
                is_intersecting: true,
                ratio: 1.0,
            },
            IntersectionEntry {
                target: card,
                is_intersecting: false,
                ratio: 0.0,
            },
        ],
    )?;
    assert_eq!(effects.revealed_count(), 0);
    assert!(!dom.class_contains(navbar, "visible")?);

    let entry = IntersectionEntry {
        target: card,
        is_intersecting: true,
        ratio: 0.05,
    };
    effects.on_intersections(&mut dom, &[entry])?;
    effects.on_intersections(&mut dom, &[entry])?;
    assert_eq!(effects.revealed_count(), 1);
    assert!(dom.class_contains(card, "visible")?);
    Ok(())
}

#[test]
fn intersection_ratio_uses_shrunken_root() {
    let rect = Rect {
        top: 700.0,
        left: 0.0,
        width: 100.0,
        height: 100.0,
    };
    let hit = intersect(rect, 800.0, 60.0);
    assert!(hit.is_intersecting);
    assert!((hit.ratio - 0.4).abs() < 1e-9);

    let below = Rect { top: 740.0, ..rect };
    assert!(!intersect(below, 800.0, 60.0).is_intersecting);

    let above = Rect {
        top: -150.0,
        ..rect
    };
    assert_eq!(intersect(above, 800.0, 60.0).ratio, 0.0);
}

const STATS: &str = r#"
<div class="hero-stats">
  <span class="stat-number" id="n100" data-count="100">0</span>
  <span class="stat-number" id="n10" data-count="10">0</span>
  <span class="stat-number" id="n25" data-count="25px">0</span>
  <span class="stat-number" id="nzero" data-count="0">-</span>
  <span class="stat-number" id="nbad" data-count="abc">?</span>
</div>
"#;

#[test]
fn counters_start_after_startup_delay_when_stats_visible() -> Result<()> {
    let mut h = harness_with_layout(STATS, &[(".hero-stats", 100.0, 100.0)])?;

    h.advance_time(499)?;
    assert!(!h.effects().counters_started());
    h.assert_text("#nzero", "-")?;

    h.advance_time(1)?;
    assert!(h.effects().counters_started());
    assert_eq!(h.effects().running_counters(), 3);
    h.assert_text("#nzero", "0")?;
    h.assert_text("#nbad", "?")?;

    let mut intervals = h
        .pending_timers()
        .into_iter()
        .filter_map(|timer| timer.interval_ms)
        .collect::<Vec<_>>();
    intervals.sort_unstable();
    assert_eq!(intervals, vec![50, 60, 150]);
    Ok(())
}

#[test]
fn counters_count_up_in_unit_steps_and_stop_at_target() -> Result<()> {
    let mut h = harness_with_layout(STATS, &[(".hero-stats", 100.0, 100.0)])?;

    h.advance_time_to(550)?;
    h.assert_text("#n100", "1")?;
    h.assert_text("#n10", "0")?;

    h.advance_time_to(650)?;
    h.assert_text("#n100", "3")?;
    h.assert_text("#n10", "1")?;

    h.advance_time_to(2000)?;
    h.assert_text("#n100", "30")?;
    h.assert_text("#n10", "10")?;
    h.assert_text("#n25", "25")?;

    h.advance_time_to(5500)?;
    h.assert_text("#n100", "100")?;
    assert_eq!(h.effects().running_counters(), 0);
    assert!(h.pending_timers().is_empty());

    h.advance_time(10_000)?;
    h.assert_text("#n100", "100")?;
    h.assert_text("#n10", "10")?;
    Ok(())
}

#[test]
fn counters_fire_at_most_once() -> Result<()> {
    let mut h = harness_with_layout(STATS, &[(".hero-stats", 100.0, 100.0)])?;
    h.flush()?;
    h.assert_text("#n10", "10")?;

    h.scroll_to(20.0)?;
    h.scroll_to(0.0)?;
    assert!(h.pending_timers().is_empty());
    h.assert_text("#n10", "10")?;
    Ok(())
}

#[test]
fn scrolling_stats_into_view_starts_counters() -> Result<()> {
    let mut h = harness_with_layout(STATS, &[(".hero-stats", 1000.0, 100.0)])?;
    h.advance_time(600)?;
    assert!(!h.effects().counters_started());

    h.scroll_to(300.0)?;
    assert!(h.effects().counters_started());
    h.advance_time(150)?;
    h.assert_text("#n10", "1")?;
    Ok(())
}

#[test]
fn counters_without_stats_block_never_start() -> Result<()> {
    let body = r#"<span class="stat-number" id="n5" data-count="5">0</span>"#;
    let mut h = harness_with_layout(body, &[("#n5", 0.0, 50.0)])?;
    h.advance_time(5000)?;
    h.scroll_to(100.0)?;
    assert!(!h.effects().counters_started());
    h.assert_text("#n5", "0")?;
    Ok(())
}

#[test]
fn counter_pacing_respects_config() -> Result<()> {
    let config = EffectsConfig {
        counter_duration_ms: 300,
        counter_min_step_ms: 10,
        counter_startup_delay_ms: 0,
        ..EffectsConfig::default()
    };
    let dom = page_dom(STATS, &[(".hero-stats", 0.0, 100.0)])?;
    let mut h = PortfolioHarness::from_dom(dom, config)?;
    h.advance_time(30)?;
    h.assert_text("#n10", "1")?;
    h.advance_time(270)?;
    h.assert_text("#n10", "10")?;
    Ok(())
}

#[test]
fn step_interval_is_duration_over_target_with_floor() {
    assert_eq!(step_interval_ms(100, 1500, 50), 50);
    assert_eq!(step_interval_ms(10, 1500, 50), 150);
    assert_eq!(step_interval_ms(1, 1500, 50), 1500);
    assert_eq!(step_interval_ms(29, 1500, 50), 51);
    assert_eq!(step_interval_ms(31, 1500, 50), 50);
    assert_eq!(step_interval_ms(0, 1500, 50), 50);
}
