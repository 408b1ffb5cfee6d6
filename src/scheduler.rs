use super::trace::TraceCategory;
use super::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub i64);

/// Work a timer hands back to [`PortfolioEffects::run_task`](crate::PortfolioEffects::run_task).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    CounterCheck,
    CounterTick(usize),
    FormSent,
    FormRestore,
    TypingStep,
    TypingFrame,
}

/// Timer capabilities the effects schedule through.
pub trait TimerHost {
    fn set_timeout(&mut self, task: Task, delay_ms: i64) -> TimerId;

    fn set_interval(&mut self, task: Task, interval_ms: i64) -> TimerId;

    fn request_animation_frame(&mut self, task: Task) -> TimerId;

    /// Returns whether the timer was still pending or running.
    fn clear_timer(&mut self, id: TimerId) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingTimer {
    pub id: TimerId,
    pub due_at: i64,
    pub order: i64,
    pub interval_ms: Option<i64>,
    pub task: Task,
}

#[derive(Debug, Clone)]
struct ScheduledTask {
    id: TimerId,
    due_at: i64,
    order: i64,
    interval_ms: Option<i64>,
    task: Task,
}

/// Timer queue driven by a virtual clock.
///
/// Nothing runs on its own: the owner pops due tasks with
/// [`VirtualScheduler::begin_next`], runs them, then calls
/// [`VirtualScheduler::finish`] so intervals are requeued unless they were
/// cleared while running.
#[derive(Debug)]
pub struct VirtualScheduler {
    task_queue: Vec<ScheduledTask>,
    now_ms: i64,
    timer_step_limit: usize,
    frame_interval_ms: i64,
    next_timer_id: i64,
    next_task_order: i64,
    running: Option<ScheduledTask>,
    running_timer_canceled: bool,
    trace: TraceState,
}

impl Default for VirtualScheduler {
    fn default() -> Self {
        Self {
            task_queue: Vec::new(),
            now_ms: 0,
            timer_step_limit: 10_000,
            frame_interval_ms: 16,
            next_timer_id: 1,
            next_task_order: 0,
            running: None,
            running_timer_canceled: false,
            trace: TraceState::default(),
        }
    }
}

impl VirtualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_trace(trace: TraceState) -> Self {
        Self {
            trace,
            ..Self::default()
        }
    }

    pub fn now_ms(&self) -> i64 {
        self.now_ms
    }

    pub fn timer_step_limit(&self) -> usize {
        self.timer_step_limit
    }

    pub fn set_timer_step_limit(&mut self, max_steps: usize) -> Result<()> {
        if max_steps == 0 {
            return Err(Error::Config(
                "timer step limit requires at least 1 step".into(),
            ));
        }
        self.timer_step_limit = max_steps;
        Ok(())
    }

    pub fn set_frame_interval(&mut self, frame_interval_ms: i64) -> Result<()> {
        if frame_interval_ms <= 0 {
            return Err(Error::Config(
                "frame interval must be a positive number of milliseconds".into(),
            ));
        }
        self.frame_interval_ms = frame_interval_ms;
        Ok(())
    }

    pub fn pending_timers(&self) -> Vec<PendingTimer> {
        let mut timers = self
            .task_queue
            .iter()
            .map(|task| PendingTimer {
                id: task.id,
                due_at: task.due_at,
                order: task.order,
                interval_ms: task.interval_ms,
                task: task.task,
            })
            .collect::<Vec<_>>();
        timers.sort_by_key(|timer| (timer.due_at, timer.order));
        timers
    }

    pub fn clear_all_timers(&mut self) -> usize {
        let cleared = self.task_queue.len();
        self.task_queue.clear();
        if self.running.is_some() {
            self.running_timer_canceled = true;
        }
        self.trace
            .line(TraceCategory::Timers, || format!("[timer] clear_all cleared={cleared}"));
        cleared
    }

    /// Moves the clock forward to `target_ms` without running anything.
    pub(crate) fn set_now(&mut self, target_ms: i64) -> Result<()> {
        if target_ms < self.now_ms {
            return Err(Error::Timer(format!(
                "advance_time_to requires target >= now_ms (target={target_ms}, now_ms={})",
                self.now_ms
            )));
        }
        self.now_ms = target_ms;
        Ok(())
    }

    pub(crate) fn next_task_index(&self, due_limit: Option<i64>) -> Option<usize> {
        self.task_queue
            .iter()
            .enumerate()
            .filter(|(_, task)| due_limit.is_none_or(|limit| task.due_at <= limit))
            .min_by_key(|(_, task)| (task.due_at, task.order))
            .map(|(idx, _)| idx)
    }

    /// Dequeues the next task due at or before `due_limit` (any task when
    /// `None`), advancing the clock to its due time if it lies ahead.
    pub fn begin_next(&mut self, due_limit: Option<i64>) -> Option<Task> {
        let idx = self.next_task_index(due_limit)?;
        let task = self.task_queue.remove(idx);
        if task.due_at > self.now_ms {
            self.now_ms = task.due_at;
        }
        self.trace.line(TraceCategory::Timers, || {
            format!(
                "[timer] run id={} due_at={} interval_ms={} now_ms={}",
                task.id.0,
                task.due_at,
                describe_interval(task.interval_ms),
                self.now_ms
            )
        });
        let kind = task.task;
        self.running = Some(task);
        self.running_timer_canceled = false;
        Some(kind)
    }

    pub fn finish(&mut self) {
        let Some(task) = self.running.take() else {
            return;
        };
        let canceled = std::mem::take(&mut self.running_timer_canceled);
        let Some(interval_ms) = task.interval_ms else {
            return;
        };
        if canceled {
            return;
        }
        let due_at = task.due_at.saturating_add(interval_ms);
        let order = self.allocate_task_order();
        self.trace.line(TraceCategory::Timers, || {
            format!(
                "[timer] requeue id={} due_at={} interval_ms={}",
                task.id.0, due_at, interval_ms
            )
        });
        self.task_queue.push(ScheduledTask {
            due_at,
            order,
            ..task
        });
    }

    pub(crate) fn step_limit_error(&self, steps: usize, due_limit: Option<i64>) -> Error {
        let due_limit_desc = due_limit
            .map(|value| value.to_string())
            .unwrap_or_else(|| "none".into());

        let next_task_desc = self
            .next_task_index(due_limit)
            .and_then(|idx| self.task_queue.get(idx))
            .map(|task| {
                format!(
                    "id={},due_at={},order={},interval_ms={},task={:?}",
                    task.id.0,
                    task.due_at,
                    task.order,
                    describe_interval(task.interval_ms),
                    task.task
                )
            })
            .unwrap_or_else(|| "none".into());

        Error::Timer(format!(
            "timer run exceeded max task steps (possible uncleared interval): limit={}, steps={steps}, now_ms={}, due_limit={due_limit_desc}, pending_tasks={}, next_task={next_task_desc}",
            self.timer_step_limit,
            self.now_ms,
            self.task_queue.len(),
        ))
    }

    fn allocate_timer_id(&mut self) -> TimerId {
        let id = self.next_timer_id;
        self.next_timer_id += 1;
        TimerId(id)
    }

    fn allocate_task_order(&mut self) -> i64 {
        let order = self.next_task_order;
        self.next_task_order += 1;
        order
    }

    fn push(&mut self, task: Task, due_at: i64, interval_ms: Option<i64>) -> TimerId {
        let id = self.allocate_timer_id();
        let order = self.allocate_task_order();
        self.task_queue.push(ScheduledTask {
            id,
            due_at,
            order,
            interval_ms,
            task,
        });
        id
    }
}

fn describe_interval(interval_ms: Option<i64>) -> String {
    interval_ms
        .map(|value| value.to_string())
        .unwrap_or_else(|| "none".into())
}

impl TimerHost for VirtualScheduler {
    fn set_timeout(&mut self, task: Task, delay_ms: i64) -> TimerId {
        let delay_ms = delay_ms.max(0);
        let due_at = self.now_ms.saturating_add(delay_ms);
        let id = self.push(task, due_at, None);
        self.trace.line(TraceCategory::Timers, || {
            format!(
                "[timer] schedule timeout id={} due_at={due_at} delay_ms={delay_ms} task={task:?}",
                id.0
            )
        });
        id
    }

    fn set_interval(&mut self, task: Task, interval_ms: i64) -> TimerId {
        // Zero-length intervals would spin the virtual clock in place.
        let interval_ms = interval_ms.max(1);
        let due_at = self.now_ms.saturating_add(interval_ms);
        let id = self.push(task, due_at, Some(interval_ms));
        self.trace.line(TraceCategory::Timers, || {
            format!(
                "[timer] schedule interval id={} due_at={due_at} interval_ms={interval_ms} task={task:?}",
                id.0
            )
        });
        id
    }

    fn request_animation_frame(&mut self, task: Task) -> TimerId {
        let frame = self.frame_interval_ms;
        let due_at = (self.now_ms.div_euclid(frame) + 1).saturating_mul(frame);
        let id = self.push(task, due_at, None);
        self.trace.line(TraceCategory::Timers, || {
            format!("[timer] schedule frame id={} due_at={due_at} task={task:?}", id.0)
        });
        id
    }

    fn clear_timer(&mut self, id: TimerId) -> bool {
        let before = self.task_queue.len();
        self.task_queue.retain(|task| task.id != id);
        let removed = before.saturating_sub(self.task_queue.len());
        let running_canceled = self.running.as_ref().is_some_and(|task| task.id == id);
        if running_canceled {
            self.running_timer_canceled = true;
        }
        self.trace.line(TraceCategory::Timers, || {
            format!(
                "[timer] clear id={} removed={removed} running_canceled={running_canceled}",
                id.0
            )
        });
        removed > 0 || running_canceled
    }
}
