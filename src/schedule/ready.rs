use std::cell::{Cell, RefCell};

/// One-shot readiness gate, e.g. "web fonts have loaded".
///
/// Work queued before [`ReadyGate::open`] runs when the gate opens, in the
/// order it was queued; work queued afterwards runs immediately.
#[derive(Default)]
pub struct ReadyGate {
    open: Cell<bool>,
    waiting: RefCell<Vec<Box<dyn FnOnce()>>>,
}

impl ReadyGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.open.get()
    }

    pub fn when_ready<F>(&self, task: F)
    where
        F: FnOnce() + 'static,
    {
        if self.open.get() {
            task();
        } else {
            self.waiting.borrow_mut().push(Box::new(task));
        }
    }

    /// Opens the gate. Opening twice is a no-op.
    pub fn open(&self) {
        if self.open.replace(true) {
            return;
        }
        let waiting = std::mem::take(&mut *self.waiting.borrow_mut());
        for task in waiting {
            task();
        }
    }
}
