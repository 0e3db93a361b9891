use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::trace;

use super::{IntervalTask, Scheduler, TimeoutTask, TimerId};

struct Inner {
    started: Instant,
    next_id: Cell<u64>,
    tasks: RefCell<HashMap<TimerId, JoinHandle<()>>>,
}

impl Inner {
    fn allocate_id(&self) -> TimerId {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        TimerId(id)
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        for (_, handle) in self.tasks.get_mut().drain() {
            handle.abort();
        }
    }
}

/// Scheduler backed by tokio timers.
///
/// Tasks are spawned with `spawn_local`, so this must be used from inside a
/// [`tokio::task::LocalSet`]. Dropping the scheduler aborts every timer it
/// still owns.
pub struct TokioScheduler {
    inner: Rc<Inner>,
}

impl TokioScheduler {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(Inner {
                started: Instant::now(),
                next_id: Cell::new(0),
                tasks: RefCell::new(HashMap::new()),
            }),
        }
    }

    /// Number of timers that have neither fired (timeouts) nor been cancelled.
    pub fn active(&self) -> usize {
        self.inner.tasks.borrow().len()
    }
}

impl Default for TokioScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for TokioScheduler {
    fn set_timeout(&self, delay: Duration, task: TimeoutTask) -> TimerId {
        let id = self.inner.allocate_id();
        let weak: Weak<Inner> = Rc::downgrade(&self.inner);
        let handle = tokio::task::spawn_local(async move {
            tokio::time::sleep(delay).await;
            if let Some(inner) = weak.upgrade() {
                inner.tasks.borrow_mut().remove(&id);
            }
            task();
        });
        self.inner.tasks.borrow_mut().insert(id, handle);
        id
    }

    fn set_interval(&self, period: Duration, task: IntervalTask) -> TimerId {
        let id = self.inner.allocate_id();
        let period = period.max(Duration::from_millis(1));
        let handle = tokio::task::spawn_local(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                task();
            }
        });
        self.inner.tasks.borrow_mut().insert(id, handle);
        id
    }

    fn cancel(&self, id: TimerId) {
        if let Some(handle) = self.inner.tasks.borrow_mut().remove(&id) {
            trace!(?id, "cancelling tokio timer");
            handle.abort();
        }
    }

    fn now(&self) -> Duration {
        self.inner.started.elapsed()
    }
}
