use super::*;

#[test]
fn scheduler_orders_by_due_time_then_insertion() {
    let mut scheduler = VirtualScheduler::new();
    let late = scheduler.set_timeout(Task::FormRestore, 30);
    let first = scheduler.set_timeout(Task::FormSent, 10);
    let tie = scheduler.set_timeout(Task::CounterCheck, 10);

    let order = scheduler
        .pending_timers()
        .into_iter()
        .map(|timer| timer.id)
        .collect::<Vec<_>>();
    assert_eq!(order, vec![first, tie, late]);

    assert_eq!(scheduler.begin_next(Some(5)), None);
    assert_eq!(scheduler.begin_next(Some(10)), Some(Task::FormSent));
    scheduler.finish();
    assert_eq!(scheduler.now_ms(), 10);
    assert_eq!(scheduler.begin_next(None), Some(Task::CounterCheck));
    scheduler.finish();
    assert_eq!(scheduler.begin_next(None), Some(Task::FormRestore));
    scheduler.finish();
    assert_eq!(scheduler.now_ms(), 30);
    assert!(scheduler.pending_timers().is_empty());
}

#[test]
fn negative_delays_run_immediately() {
    let mut scheduler = VirtualScheduler::new();
    scheduler.set_timeout(Task::FormSent, -50);
    assert_eq!(scheduler.pending_timers()[0].due_at, 0);
}

#[test]
fn animation_frames_land_on_next_frame_boundary() -> Result<()> {
    let mut scheduler = VirtualScheduler::new();
    scheduler.request_animation_frame(Task::TypingFrame);
    assert_eq!(scheduler.pending_timers()[0].due_at, 16);
    scheduler.clear_all_timers();

    scheduler.set_now(16)?;
    scheduler.request_animation_frame(Task::TypingFrame);
    assert_eq!(scheduler.pending_timers()[0].due_at, 32);
    scheduler.clear_all_timers();

    scheduler.set_frame_interval(10)?;
    scheduler.set_now(25)?;
    scheduler.request_animation_frame(Task::TypingFrame);
    assert_eq!(scheduler.pending_timers()[0].due_at, 30);
    assert!(scheduler.set_frame_interval(0).is_err());
    Ok(())
}

#[test]
fn intervals_requeue_until_cleared_from_inside() {
    let mut scheduler = VirtualScheduler::new();
    let id = scheduler.set_interval(Task::CounterTick(0), 50);

    for expected_now in [50, 100, 150] {
        assert_eq!(scheduler.begin_next(None), Some(Task::CounterTick(0)));
        assert_eq!(scheduler.now_ms(), expected_now);
        scheduler.finish();
    }

    assert_eq!(scheduler.begin_next(None), Some(Task::CounterTick(0)));
    assert!(scheduler.clear_timer(id));
    scheduler.finish();
    assert!(scheduler.pending_timers().is_empty());
    assert!(!scheduler.clear_timer(id));
}

#[test]
fn zero_interval_is_clamped_to_one_millisecond() {
    let mut scheduler = VirtualScheduler::new();
    scheduler.set_interval(Task::CounterTick(3), 0);
    let pending = scheduler.pending_timers();
    assert_eq!(pending[0].interval_ms, Some(1));
    assert_eq!(pending[0].due_at, 1);
}

#[test]
fn clock_cannot_move_backwards() -> Result<()> {
    let mut h = PortfolioHarness::from_html(&page(""))?;
    h.advance_time(100)?;
    assert!(matches!(h.advance_time(-1), Err(Error::Timer(_))));
    match h.advance_time_to(50) {
        Err(Error::Timer(msg)) => assert!(msg.contains("target >= now_ms")),
        other => panic!("unexpected result: {other:?}"),
    }
    assert_eq!(h.now_ms(), 100);
    Ok(())
}

#[test]
fn step_limit_stops_runaway_queues() -> Result<()> {
    let body = r#"<div class="hero-stats"><span class="stat-number" id="n" data-count="100">0</span></div>"#;
    let mut h = harness_with_layout(body, &[(".hero-stats", 0.0, 100.0)])?;
    assert!(matches!(
        h.set_timer_step_limit(0),
        Err(Error::Config(_))
    ));

    h.set_timer_step_limit(5)?;
    match h.flush() {
        Err(Error::Timer(msg)) => {
            assert!(msg.contains("exceeded max task steps"));
            assert!(msg.contains("limit=5"));
            assert!(msg.contains("CounterTick(0)"));
        }
        other => panic!("unexpected result: {other:?}"),
    }
    Ok(())
}

#[test]
fn run_helpers_report_progress() -> Result<()> {
    let mut h = PortfolioHarness::from_html(&page(""))?;
    assert_eq!(h.run_due_timers()?, 0);
    assert!(h.run_next_timer()?);
    assert_eq!(h.now_ms(), 500);
    assert!(!h.run_next_timer()?);
    Ok(())
}

#[test]
fn clearing_a_pending_timer_cancels_its_task() -> Result<()> {
    let body = r#"<form id="contactForm"><button id="submitBtn">Send</button></form>"#;
    let mut h = PortfolioHarness::from_html(&page(body))?;
    h.submit("#contactForm")?;
    let sent = h
        .pending_timers()
        .into_iter()
        .find(|timer| timer.task == Task::FormSent)
        .map(|timer| timer.id)
        .ok_or_else(|| Error::Timer("FormSent not scheduled".into()))?;
    assert!(h.clear_timer(sent));
    h.advance_time(10_000)?;
    assert_eq!(h.effects().form_phase(), Some(FormPhase::Sending));
    Ok(())
}

#[test]
fn trace_is_off_until_enabled() -> Result<()> {
    let mut h = PortfolioHarness::from_html(&page(""))?;
    h.click("#navToggle")?;
    assert!(h.take_trace_logs().is_empty());

    h.enable_trace(true);
    h.click("#navToggle")?;
    h.advance_time(500)?;
    let logs = h.take_trace_logs();
    assert!(
        logs.iter()
            .any(|line| line == "[event] click target=#navToggle default_prevented=false"),
        "{logs:#?}"
    );
    assert!(logs.iter().any(|line| line == "[effect] menu open=false"));
    assert!(logs.iter().any(|line| line.starts_with("[timer] run id=")));
    assert!(logs.iter().any(|line| line.starts_with("[timer] advance_to from=0 to=500")));
    assert!(h.take_trace_logs().is_empty());
    Ok(())
}

#[test]
fn trace_categories_can_be_muted() -> Result<()> {
    let mut h = PortfolioHarness::from_html(&page(""))?;
    h.enable_trace(true);
    h.trace().set_category(TraceCategory::Timers, false);
    h.scroll_to(100.0)?;
    h.advance_time(500)?;
    let logs = h.take_trace_logs();
    assert!(!logs.is_empty());
    assert!(logs.iter().all(|line| !line.starts_with("[timer]")));
    Ok(())
}

#[test]
fn trace_log_limit_keeps_newest_lines() -> Result<()> {
    let mut h = PortfolioHarness::from_html(&page(""))?;
    assert!(matches!(h.set_trace_log_limit(0), Err(Error::Config(_))));

    h.enable_trace(true);
    h.trace().set_forward_to_log(false);
    h.set_trace_log_limit(2)?;
    for scroll_y in [10.0, 20.0, 30.0] {
        h.scroll_to(scroll_y)?;
    }
    let logs = h.take_trace_logs();
    assert_eq!(logs.len(), 2);
    assert_eq!(logs[0], "[event] scroll scroll_y=30");
    assert_eq!(logs[1], "[effect] highlight active=none");
    Ok(())
}

#[test]
fn effects_can_be_driven_without_the_harness() -> Result<()> {
    let mut dom = MockDom::from_html(&page(""))?;
    let mut timers = VirtualScheduler::new();
    let mut effects = PortfolioEffects::attach(&mut dom, &mut timers, EffectsConfig::default())?;

    dom.set_scroll_y(200.0);
    effects.on_scroll(&mut dom, &mut timers)?;
    let navbar = dom.select_one("#navbar")?;
    assert!(dom.class_contains(navbar, "scrolled")?);

    while let Some(task) = timers.begin_next(None) {
        effects.run_task(task, &mut dom, &mut timers)?;
        timers.finish();
    }
    assert_eq!(timers.now_ms(), 500);
    Ok(())
}
