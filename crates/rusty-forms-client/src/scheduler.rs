// File: rusty-forms-client/src/scheduler.rs
// Purpose: Timer collaborator for delayed notifications

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// A deferred unit of work
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Runs a task once after a delay
pub trait Scheduler: Send + Sync {
    fn schedule(&self, delay: Duration, task: Task);
}

/// Schedules onto the current tokio runtime
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioScheduler;

impl Scheduler for TokioScheduler {
    fn schedule(&self, delay: Duration, task: Task) {
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    tokio::time::sleep(delay).await;
                    task();
                });
            }
            Err(_) => {
                tracing::warn!("No tokio runtime available; dropping task scheduled in {:?}", delay);
            }
        }
    }
}

/// Scheduler driven by hand
///
/// Hosts with their own event loop (and tests) call [`ManualScheduler::advance`]
/// to move the clock and run every task that became due.
#[derive(Default)]
pub struct ManualScheduler {
    state: Mutex<ManualState>,
}

#[derive(Default)]
struct ManualState {
    now: Duration,
    pending: Vec<(Duration, Task)>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tasks waiting to run
    pub fn pending(&self) -> usize {
        self.lock().pending.len()
    }

    /// Time elapsed since creation
    pub fn now(&self) -> Duration {
        self.lock().now
    }

    /// Move the clock forward and run due tasks in deadline order.
    /// Returns how many tasks ran.
    pub fn advance(&self, by: Duration) -> usize {
        let due = {
            let mut state = self.lock();
            state.now += by;
            let now = state.now;
            let (mut due, waiting): (Vec<_>, Vec<_>) =
                state.pending.drain(..).partition(|(at, _)| *at <= now);
            state.pending = waiting;
            due.sort_by_key(|(at, _)| *at);
            due
        };

        // Tasks run without the lock held; they may schedule more work.
        let count = due.len();
        for (_, task) in due {
            task();
        }
        count
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ManualState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, task: Task) {
        let mut state = self.lock();
        let at = state.now + delay;
        state.pending.push((at, task));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_manual_scheduler_runs_when_due() {
        let scheduler = ManualScheduler::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        scheduler.schedule(
            Duration::from_millis(1000),
            Box::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );

        assert_eq!(scheduler.advance(Duration::from_millis(999)), 0);
        assert_eq!(scheduler.pending(), 1);
        assert_eq!(scheduler.advance(Duration::from_millis(1)), 1);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(scheduler.pending(), 0);
        assert_eq!(scheduler.now(), Duration::from_millis(1000));
    }

    #[test]
    fn test_manual_scheduler_orders_by_deadline() {
        let scheduler = ManualScheduler::new();
        let order = Arc::new(Mutex::new(Vec::new()));
        for (label, ms) in [("late", 20), ("early", 10)] {
            let order = order.clone();
            scheduler.schedule(
                Duration::from_millis(ms),
                Box::new(move || order.lock().unwrap().push(label)),
            );
        }

        scheduler.advance(Duration::from_millis(50));
        assert_eq!(*order.lock().unwrap(), vec!["early", "late"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_tokio_scheduler_waits_for_delay() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        TokioScheduler.schedule(
            Duration::from_millis(1000),
            Box::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );

        tokio::time::sleep(Duration::from_millis(999)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(2)).await;
        tokio::task::yield_now().await;
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_tokio_scheduler_without_runtime_drops_task() {
        TokioScheduler.schedule(Duration::from_millis(1), Box::new(|| panic!("must not run")));
    }
}
