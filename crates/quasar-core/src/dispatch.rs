// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Main-thread task dispatching.
//!
//! Worker threads hand closures to a [`DispatcherHandle`]; the update
//! pipeline runs them on the main thread within a per-tick time budget.
//! Whatever does not fit in the budget stays queued for the next tick.

use crossbeam_channel::{Receiver, Sender};
use std::time::{Duration, Instant};

/// A unit of work to run on the main thread.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// A cloneable handle for posting tasks to a [`Dispatcher`].
#[derive(Clone)]
pub struct DispatcherHandle {
    sender: Sender<Task>,
}

impl DispatcherHandle {
    /// Queues `task` for the next dispatcher run.
    ///
    /// Returns `false` if the dispatcher has been dropped.
    pub fn post(&self, task: impl FnOnce() + Send + 'static) -> bool {
        self.sender.send(Box::new(task)).is_ok()
    }
}

/// Outcome of one [`Dispatcher::run_pending`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Tasks run during this call.
    pub executed: usize,
    /// Tasks left queued because the budget ran out.
    pub deferred: usize,
}

/// A queue of tasks consumed on the main thread.
pub struct Dispatcher {
    sender: Sender<Task>,
    receiver: Receiver<Task>,
}

impl Dispatcher {
    /// Creates an empty dispatcher.
    pub fn new() -> Self {
        let (sender, receiver) = crossbeam_channel::unbounded();
        Self { sender, receiver }
    }

    /// Returns a handle for posting tasks from any thread.
    pub fn handle(&self) -> DispatcherHandle {
        DispatcherHandle {
            sender: self.sender.clone(),
        }
    }

    /// Queues `task` from the owning thread.
    pub fn post(&self, task: impl FnOnce() + Send + 'static) {
        // The dispatcher owns a receiver, so the channel is always connected.
        let _ = self.sender.send(Box::new(task));
    }

    /// Runs queued tasks in posting order until the queue is empty or
    /// `budget` has elapsed.
    ///
    /// The budget is checked before each task, so a single slow task may
    /// overrun it; a zero budget runs nothing.
    pub fn run_pending(&self, budget: Duration) -> DispatchReport {
        let started = Instant::now();
        let mut executed = 0;

        while started.elapsed() < budget {
            let Ok(task) = self.receiver.try_recv() else {
                break;
            };
            task();
            executed += 1;
        }

        let report = DispatchReport {
            executed,
            deferred: self.receiver.len(),
        };
        if report.deferred > 0 {
            log::trace!(
                "Dispatcher budget of {:?} exhausted, {} task(s) deferred",
                budget,
                report.deferred
            );
        }
        report
    }

    /// Number of queued tasks.
    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    /// Returns `true` if no task is queued.
    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::thread;

    #[test]
    fn test_runs_tasks_in_posting_order() {
        let dispatcher = Dispatcher::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        for i in 0..5 {
            let log = Arc::clone(&log);
            dispatcher.post(move || log.lock().unwrap().push(i));
        }

        let report = dispatcher.run_pending(Duration::from_secs(5));
        assert_eq!(report, DispatchReport { executed: 5, deferred: 0 });
        assert_eq!(*log.lock().unwrap(), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_zero_budget_defers_everything() {
        let dispatcher = Dispatcher::new();
        dispatcher.post(|| {});
        dispatcher.post(|| {});

        let report = dispatcher.run_pending(Duration::ZERO);
        assert_eq!(report, DispatchReport { executed: 0, deferred: 2 });
        assert_eq!(dispatcher.len(), 2);
    }

    #[test]
    fn test_exhausted_budget_defers_remaining_tasks() {
        let dispatcher = Dispatcher::new();
        dispatcher.post(|| thread::sleep(Duration::from_millis(30)));
        dispatcher.post(|| {});
        dispatcher.post(|| {});

        let report = dispatcher.run_pending(Duration::from_millis(10));
        assert_eq!(report.executed, 1);
        assert_eq!(report.deferred, 2);

        let report = dispatcher.run_pending(Duration::from_secs(5));
        assert_eq!(report, DispatchReport { executed: 2, deferred: 0 });
        assert!(dispatcher.is_empty());
    }

    #[test]
    fn test_handle_posts_from_other_thread() {
        let dispatcher = Dispatcher::new();
        let handle = dispatcher.handle();
        let flag = Arc::new(Mutex::new(false));
        let flag_clone = Arc::clone(&flag);

        thread::spawn(move || {
            assert!(handle.post(move || *flag_clone.lock().unwrap() = true));
        })
        .join()
        .unwrap();

        dispatcher.run_pending(Duration::from_secs(5));
        assert!(*flag.lock().unwrap());
    }

    #[test]
    fn test_handle_post_fails_after_drop() {
        let dispatcher = Dispatcher::new();
        let handle = dispatcher.handle();
        drop(dispatcher);
        assert!(!handle.post(|| {}));
    }
}
