use super::*;

/// Milliseconds between unit increments for a counter heading to `target`.
pub(crate) fn step_interval_ms(target: i64, duration_ms: i64, min_step_ms: i64) -> i64 {
    if target <= 0 {
        return min_step_ms;
    }
    (duration_ms / target).max(min_step_ms)
}

#[derive(Debug, Clone)]
struct CounterState {
    node: NodeId,
    current: i64,
    target: i64,
    timer: Option<TimerId>,
}

#[derive(Debug, Clone)]
pub(crate) struct CounterAnimator {
    stats_block: String,
    numbers: Vec<NodeId>,
    counters: Vec<CounterState>,
    started: bool,
    duration_ms: i64,
    min_step_ms: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CounterTick {
    Advanced(i64),
    Finished(i64),
    Idle,
}

impl CounterAnimator {
    pub(crate) fn resolve(dom: &dyn PageDom, config: &EffectsConfig) -> Result<Self> {
        Ok(Self {
            stats_block: config.markup.stats_block.clone(),
            numbers: dom.query_selector_all(&config.markup.stat_numbers)?,
            counters: Vec::new(),
            started: false,
            duration_ms: config.counter_duration_ms,
            min_step_ms: config.counter_min_step_ms,
        })
    }

    pub(crate) fn started(&self) -> bool {
        self.started
    }

    pub(crate) fn running(&self) -> usize {
        self.counters
            .iter()
            .filter(|counter| counter.timer.is_some())
            .count()
    }

    /// Starts every counter the first time the stats block is on screen.
    /// Returns how many interval timers were started, or `None` when
    /// nothing happened.
    pub(crate) fn check(
        &mut self,
        dom: &mut dyn PageDom,
        timers: &mut dyn TimerHost,
    ) -> Result<Option<usize>> {
        if self.started {
            return Ok(None);
        }
        let Some(stats) = dom.query_selector(&self.stats_block)? else {
            return Ok(None);
        };
        let rect = dom.bounding_client_rect(stats)?;
        if !(rect.top < dom.viewport().height && rect.bottom() > 0.0) {
            return Ok(None);
        }
        self.started = true;

        for node in self.numbers.clone() {
            let Some(target) = dom
                .attr(node, "data-count")
                .and_then(|raw| parse_int_prefix(&raw))
            else {
                continue;
            };
            let mut counter = CounterState {
                node,
                current: 0,
                target,
                timer: None,
            };
            if target <= 0 {
                dom.set_text_content(node, &target.to_string())?;
            } else {
                let index = self.counters.len();
                let step = step_interval_ms(target, self.duration_ms, self.min_step_ms);
                counter.timer = Some(timers.set_interval(Task::CounterTick(index), step));
            }
            self.counters.push(counter);
        }
        Ok(Some(self.running()))
    }

    pub(crate) fn tick(
        &mut self,
        index: usize,
        dom: &mut dyn PageDom,
        timers: &mut dyn TimerHost,
    ) -> Result<CounterTick> {
        let Some(counter) = self.counters.get_mut(index) else {
            return Ok(CounterTick::Idle);
        };
        let Some(timer) = counter.timer else {
            return Ok(CounterTick::Idle);
        };
        counter.current += 1;
        dom.set_text_content(counter.node, &counter.current.to_string())?;
        if counter.current >= counter.target {
            timers.clear_timer(timer);
            counter.timer = None;
            return Ok(CounterTick::Finished(counter.current));
        }
        Ok(CounterTick::Advanced(counter.current))
    }
}
