//! Periodic task scheduler on a virtual clock
//!
//! The host feeds elapsed wall time into `advance`; the scheduler answers with
//! the task firings that fell due, in firing order. Nothing runs on its own,
//! so every firing happens on the caller's thread between other events.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::consts::MAX_CATCH_UP;

/// Work a session can schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Task {
    /// Fast tick: motion, collisions, render
    Motion,
    /// Slow tick: radius refresh, render
    Resize,
}

/// Handle returned by `schedule_periodic`, used to cancel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskHandle(u64);

#[derive(Debug, Clone)]
struct PeriodicTask {
    handle: TaskHandle,
    task: Task,
    period: Duration,
    next_due: Duration,
}

/// Virtual-clock scheduler
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    now: Duration,
    next_handle: u64,
    tasks: Vec<PeriodicTask>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Fire `task` every `period`, first firing one period from now
    pub fn schedule_periodic(&mut self, task: Task, period: Duration) -> TaskHandle {
        let period = period.max(Duration::from_millis(1));
        let handle = TaskHandle(self.next_handle);
        self.next_handle += 1;
        self.tasks.push(PeriodicTask {
            handle,
            task,
            period,
            next_due: self.now + period,
        });
        handle
    }

    /// Stop a task; its pending firings are dropped. Returns false if unknown.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.handle != handle);
        self.tasks.len() != before
    }

    pub fn is_scheduled(&self, handle: TaskHandle) -> bool {
        self.tasks.iter().any(|t| t.handle == handle)
    }

    /// Number of live periodic tasks
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Move the clock forward and return due firings in time order.
    ///
    /// Ties go to the task scheduled first. A task that fell more than
    /// `MAX_CATCH_UP` periods behind skips the excess instead of bursting.
    pub fn advance(&mut self, elapsed: Duration) -> Vec<Task> {
        let target = self.now + elapsed;
        let mut fired = Vec::new();
        let mut counts = vec![0u32; self.tasks.len()];

        loop {
            let next = self
                .tasks
                .iter()
                .enumerate()
                .filter(|(i, t)| t.next_due <= target && counts[*i] < MAX_CATCH_UP)
                .min_by_key(|(_, t)| t.next_due)
                .map(|(i, _)| i);
            let Some(i) = next else { break };

            let task = &mut self.tasks[i];
            fired.push(task.task);
            task.next_due += task.period;
            counts[i] += 1;
        }

        for task in &mut self.tasks {
            if task.next_due <= target {
                let behind = target - task.next_due;
                let skipped = behind.as_nanos() / task.period.as_nanos() + 1;
                log::debug!("{:?} fell behind, skipping {} firings", task.task, skipped);
                task.next_due += task.period * skipped as u32;
            }
        }

        self.now = target;
        fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FAST: Duration = Duration::from_millis(30);
    const SLOW: Duration = Duration::from_millis(100);

    #[test]
    fn test_fires_once_per_period() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule_periodic(Task::Motion, FAST);
        assert!(scheduler.advance(Duration::from_millis(29)).is_empty());
        assert_eq!(scheduler.advance(Duration::from_millis(1)), vec![Task::Motion]);
        assert_eq!(
            scheduler.advance(Duration::from_millis(60)),
            vec![Task::Motion, Task::Motion]
        );
        assert_eq!(scheduler.now(), Duration::from_millis(90));
    }

    #[test]
    fn test_interleaves_in_time_order() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule_periodic(Task::Motion, FAST);
        scheduler.schedule_periodic(Task::Resize, SLOW);
        let fired = scheduler.advance(Duration::from_millis(120));
        // Motion at 30, 60, 90; Resize at 100; Motion at 120
        assert_eq!(
            fired,
            vec![Task::Motion, Task::Motion, Task::Motion, Task::Resize, Task::Motion]
        );
    }

    #[test]
    fn test_cancel_drops_future_firings() {
        let mut scheduler = Scheduler::new();
        let handle = scheduler.schedule_periodic(Task::Motion, FAST);
        assert!(scheduler.cancel(handle));
        assert!(!scheduler.cancel(handle));
        assert!(!scheduler.is_scheduled(handle));
        assert!(scheduler.advance(Duration::from_secs(1)).is_empty());
    }

    #[test]
    fn test_rescheduling_starts_a_fresh_period() {
        let mut scheduler = Scheduler::new();
        let handle = scheduler.schedule_periodic(Task::Motion, FAST);
        scheduler.advance(Duration::from_millis(20));
        scheduler.cancel(handle);
        scheduler.advance(Duration::from_millis(500));

        scheduler.schedule_periodic(Task::Motion, FAST);
        assert!(scheduler.advance(Duration::from_millis(29)).is_empty());
        assert_eq!(scheduler.advance(Duration::from_millis(1)), vec![Task::Motion]);
    }

    #[test]
    fn test_catch_up_is_capped() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule_periodic(Task::Motion, FAST);
        let fired = scheduler.advance(Duration::from_secs(3));
        assert_eq!(fired.len(), MAX_CATCH_UP as usize);

        // The backlog is gone; the next firing is one period after the skip point
        assert!(scheduler.advance(Duration::from_millis(29)).is_empty());
        assert_eq!(scheduler.advance(Duration::from_millis(1)).len(), 1);
    }
}
