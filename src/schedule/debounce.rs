use std::cell::Cell;
use std::rc::{Rc, Weak};
use std::time::Duration;

use tracing::trace;

use super::{Scheduler, TimerId};

type Action = Rc<dyn Fn()>;

struct DebounceInner {
    scheduler: Rc<dyn Scheduler>,
    wait: Duration,
    action: Action,
    pending: Cell<Option<TimerId>>,
}

/// Collapses bursts of calls into one trailing invocation `wait` after the
/// last call.
///
/// Dropping the debouncer cancels a pending invocation.
pub struct Debouncer {
    inner: Rc<DebounceInner>,
}

impl Debouncer {
    pub fn new<F>(scheduler: Rc<dyn Scheduler>, wait: Duration, action: F) -> Self
    where
        F: Fn() + 'static,
    {
        Self {
            inner: Rc::new(DebounceInner {
                scheduler,
                wait,
                action: Rc::new(action),
                pending: Cell::new(None),
            }),
        }
    }

    pub fn call(&self) {
        self.cancel();

        let weak: Weak<DebounceInner> = Rc::downgrade(&self.inner);
        let id = self.inner.scheduler.set_timeout(
            self.inner.wait,
            Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.pending.set(None);
                    trace!("debounced call firing");
                    (inner.action)();
                }
            }),
        );
        self.inner.pending.set(Some(id));
    }

    pub fn cancel(&self) {
        if let Some(id) = self.inner.pending.take() {
            self.inner.scheduler.cancel(id);
        }
    }

    pub fn is_pending(&self) -> bool {
        self.inner.pending.get().is_some()
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

struct ThrottleInner {
    scheduler: Rc<dyn Scheduler>,
    wait: Duration,
    action: Action,
    last_run: Cell<Option<Duration>>,
    trailing: Cell<Option<TimerId>>,
}

impl ThrottleInner {
    fn run(&self) {
        self.last_run.set(Some(self.scheduler.now()));
        (self.action)();
    }
}

/// Runs at most once per `wait`.
///
/// The first call in a quiet period runs immediately; calls inside the
/// window collapse into one trailing run when the window closes.
pub struct Throttler {
    inner: Rc<ThrottleInner>,
}

impl Throttler {
    pub fn new<F>(scheduler: Rc<dyn Scheduler>, wait: Duration, action: F) -> Self
    where
        F: Fn() + 'static,
    {
        Self {
            inner: Rc::new(ThrottleInner {
                scheduler,
                wait,
                action: Rc::new(action),
                last_run: Cell::new(None),
                trailing: Cell::new(None),
            }),
        }
    }

    pub fn call(&self) {
        let now = self.inner.scheduler.now();
        let window_end = self.inner.last_run.get().map(|last| last + self.inner.wait);

        match window_end {
            Some(end) if now < end => {
                if self.inner.trailing.get().is_some() {
                    return;
                }
                let weak = Rc::downgrade(&self.inner);
                let id = self.inner.scheduler.set_timeout(
                    end - now,
                    Box::new(move || {
                        if let Some(inner) = weak.upgrade() {
                            inner.trailing.set(None);
                            trace!("throttled call firing on trailing edge");
                            inner.run();
                        }
                    }),
                );
                self.inner.trailing.set(Some(id));
            }
            _ => self.inner.run(),
        }
    }

    pub fn cancel(&self) {
        if let Some(id) = self.inner.trailing.take() {
            self.inner.scheduler.cancel(id);
        }
        self.inner.last_run.set(None);
    }
}

impl Drop for Throttler {
    fn drop(&mut self) {
        self.cancel();
    }
}
