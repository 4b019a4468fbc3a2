//! Fixed-rate and one-shot tick driver.
//!
//! One timer thread keeps a deadline heap and hands due tasks to a small pool
//! of workers through a [`ConcurrentQueue`]. A periodic task is put back on the
//! heap only after its previous run returned, so it never overlaps itself.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use crate::collections::ConcurrentQueue;
use crate::error::{Result, ZoneError};

type Callback = Box<dyn Fn() + Send + Sync>;

struct ScheduledTask {
    id: u64,
    period: Option<Duration>,
    cancelled: AtomicBool,
    callback: Callback,
}

impl ScheduledTask {
    fn is_cancelled(&self) -> bool {
        self.cancelled.load(AtomicOrdering::Acquire)
    }
}

/// Cancels the task it was returned for. Dropping the handle does not.
#[derive(Clone)]
pub struct TaskHandle {
    task: Arc<ScheduledTask>,
}

impl TaskHandle {
    pub fn id(&self) -> u64 {
        self.task.id
    }

    /// Stops every future invocation. A run already in progress completes.
    pub fn cancel(&self) {
        self.task.cancelled.store(true, AtomicOrdering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.task.is_cancelled()
    }
}

impl std::fmt::Debug for TaskHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskHandle")
            .field("id", &self.task.id)
            .field("period", &self.task.period)
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

struct Due {
    deadline: Instant,
    task: Arc<ScheduledTask>,
}

struct TimerEntry {
    deadline: Instant,
    seq: u64,
    task: Arc<ScheduledTask>,
}

impl PartialEq for TimerEntry {
    fn eq(&self, other: &Self) -> bool {
        self.deadline == other.deadline && self.seq == other.seq
    }
}

impl Eq for TimerEntry {}

impl PartialOrd for TimerEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimerEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.deadline
            .cmp(&other.deadline)
            .then(self.seq.cmp(&other.seq))
    }
}

#[derive(Default)]
struct TimerState {
    heap: BinaryHeap<Reverse<TimerEntry>>,
    seq: u64,
    shutdown: bool,
}

struct Inner {
    timers: Mutex<TimerState>,
    wakeup: Condvar,
    ready: ConcurrentQueue<Due>,
    next_id: AtomicU64,
}

impl Inner {
    fn enqueue(&self, deadline: Instant, task: Arc<ScheduledTask>) -> bool {
        let mut timers = self.timers.lock();
        if timers.shutdown {
            return false;
        }
        timers.seq += 1;
        let seq = timers.seq;
        timers.heap.push(Reverse(TimerEntry {
            deadline,
            seq,
            task,
        }));
        drop(timers);
        self.wakeup.notify_one();
        true
    }

    fn timer_loop(&self) {
        let mut timers = self.timers.lock();
        loop {
            if timers.shutdown {
                break;
            }
            let next = timers.heap.peek().map(|Reverse(entry)| entry.deadline);
            match next {
                None => self.wakeup.wait(&mut timers),
                Some(deadline) if deadline > Instant::now() => {
                    self.wakeup.wait_until(&mut timers, deadline);
                }
                Some(_) => {
                    if let Some(Reverse(entry)) = timers.heap.pop() {
                        if !entry.task.is_cancelled() {
                            self.ready.push(Due {
                                deadline: entry.deadline,
                                task: entry.task,
                            });
                        }
                    }
                }
            }
        }
        tracing::debug!("scheduler timer thread stopped");
    }

    fn worker_loop(&self) {
        while let Some(due) = self.ready.wait_and_pop() {
            let task = due.task;
            if task.is_cancelled() {
                continue;
            }
            if panic::catch_unwind(AssertUnwindSafe(|| (task.callback)())).is_err() {
                tracing::warn!(task = task.id, "scheduled task panicked");
            }

            let Some(period) = task.period else {
                continue;
            };
            if task.is_cancelled() {
                continue;
            }
            // Fixed rate: keep the cadence, but never schedule into the past.
            let now = Instant::now();
            let next = due.deadline + period;
            self.enqueue(next.max(now), task);
        }
    }
}

pub struct Scheduler {
    inner: Arc<Inner>,
    threads: Mutex<Vec<JoinHandle<()>>>,
}

impl Scheduler {
    /// Spawns the timer thread and `worker_threads` workers (at least one).
    pub fn new(worker_threads: usize) -> std::io::Result<Self> {
        let inner = Arc::new(Inner {
            timers: Mutex::new(TimerState::default()),
            wakeup: Condvar::new(),
            ready: ConcurrentQueue::new(),
            next_id: AtomicU64::new(1),
        });

        let mut threads = Vec::with_capacity(worker_threads.max(1) + 1);
        let timer = Arc::clone(&inner);
        threads.push(
            thread::Builder::new()
                .name("ai-scheduler-timer".to_string())
                .spawn(move || timer.timer_loop())?,
        );
        for i in 0..worker_threads.max(1) {
            let worker = Arc::clone(&inner);
            threads.push(
                thread::Builder::new()
                    .name(format!("ai-scheduler-{i}"))
                    .spawn(move || worker.worker_loop())?,
            );
        }
        tracing::info!(workers = worker_threads.max(1), "scheduler started");

        Ok(Self {
            inner,
            threads: Mutex::new(threads),
        })
    }

    /// Runs `f` after `initial_delay`, then every `period`.
    pub fn schedule_at_fixed_rate<F>(
        &self,
        initial_delay: Duration,
        period: Duration,
        f: F,
    ) -> Result<TaskHandle>
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.submit(initial_delay, Some(period.max(Duration::from_millis(1))), Box::new(f))
    }

    /// Runs `f` once after `delay`.
    pub fn schedule<F>(&self, delay: Duration, f: F) -> Result<TaskHandle>
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.submit(delay, None, Box::new(f))
    }

    fn submit(&self, delay: Duration, period: Option<Duration>, callback: Callback) -> Result<TaskHandle> {
        let task = Arc::new(ScheduledTask {
            id: self.inner.next_id.fetch_add(1, AtomicOrdering::Relaxed),
            period,
            cancelled: AtomicBool::new(false),
            callback,
        });
        if !self.inner.enqueue(Instant::now() + delay, Arc::clone(&task)) {
            return Err(ZoneError::SchedulerStopped);
        }
        tracing::debug!(task = task.id, ?delay, ?period, "task scheduled");
        Ok(TaskHandle { task })
    }

    pub fn is_shut_down(&self) -> bool {
        self.inner.timers.lock().shutdown
    }

    /// Stops all tasks and joins every scheduler thread. Runs in progress
    /// complete first. Idempotent.
    pub fn shutdown(&self) {
        {
            let mut timers = self.inner.timers.lock();
            timers.shutdown = true;
            timers.heap.clear();
        }
        self.inner.wakeup.notify_all();
        self.inner.ready.abort();

        let threads = std::mem::take(&mut *self.threads.lock());
        if threads.is_empty() {
            return;
        }
        let current = thread::current().id();
        for handle in threads {
            if handle.thread().id() == current {
                continue;
            }
            if handle.join().is_err() {
                tracing::warn!("scheduler thread panicked");
            }
        }
        tracing::info!("scheduler stopped");
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let threads = self.threads.lock().len();
        f.debug_struct("Scheduler")
            .field("threads", &threads)
            .field("shut_down", &self.is_shut_down())
            .finish()
    }
}
