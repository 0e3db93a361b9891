use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::time::Duration;

use tracing::debug;

use super::active_set::ActiveSetCoordinator;
use crate::error::{Error, Result};
use crate::schedule::{Scheduler, TimerId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotatorState {
    Stopped,
    Running,
    Paused,
}

impl RotatorState {
    fn name(self) -> &'static str {
        match self {
            Self::Stopped => "stopped",
            Self::Running => "running",
            Self::Paused => "paused",
        }
    }
}

/// The slide that just became current.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideChange {
    pub index: usize,
    pub slide_id: String,
}

/// Callback type for slide changes
pub type SlideChangedCallback = Rc<dyn Fn(&SlideChange)>;

struct Shared {
    scheduler: Rc<dyn Scheduler>,
    delay: Duration,
    state: Cell<RotatorState>,
    current: Cell<usize>,
    timer: Cell<Option<TimerId>>,
    active: RefCell<ActiveSetCoordinator>,
    on_change: RefCell<Option<SlideChangedCallback>>,
    subscribers: RefCell<Vec<flume::Sender<SlideChange>>>,
}

impl Shared {
    fn slide_count(&self) -> usize {
        self.active.borrow().items().len()
    }

    fn start_timer(self: &Rc<Self>) {
        self.cancel_timer();
        let weak: Weak<Shared> = Rc::downgrade(self);
        let id = self.scheduler.set_interval(
            self.delay,
            Rc::new(move || {
                if let Some(shared) = weak.upgrade() {
                    shared.advance();
                }
            }),
        );
        self.timer.set(Some(id));
    }

    fn cancel_timer(&self) {
        if let Some(id) = self.timer.take() {
            self.scheduler.cancel(id);
        }
    }

    fn advance(&self) {
        let count = self.slide_count();
        if count == 0 {
            return;
        }
        self.apply_index((self.current.get() + 1) % count);
    }

    /// The single place an index change is published: markings first, then
    /// the callback, then the event subscribers.
    fn apply_index(&self, index: usize) {
        self.current.set(index);
        let slide_id = {
            let mut active = self.active.borrow_mut();
            active.activate(index);
            active.items().get(index).cloned().unwrap_or_default()
        };
        let change = SlideChange { index, slide_id };

        // Cloned out so the callback may stop or reconfigure the rotator.
        let callback = self.on_change.borrow().clone();
        if let Some(callback) = callback {
            callback(&change);
        }

        self.subscribers
            .borrow_mut()
            .retain(|tx| tx.send(change.clone()).is_ok());
    }
}

/// Cycles an active slide through a fixed list on a timer.
///
/// ```text
/// Stopped --start--> Running --pause--> Paused --resume--> Running
///    ^                  |                  |
///    +------stop--------+-------stop-------+
/// ```
///
/// Rotation is cyclic: after the last slide comes slide 0.
pub struct SlideRotator {
    shared: Rc<Shared>,
}

impl SlideRotator {
    /// Slides are the items of `active`; its links are the navigation links
    /// that follow the current slide.
    pub fn new(
        scheduler: Rc<dyn Scheduler>,
        delay: Duration,
        active: ActiveSetCoordinator,
    ) -> Self {
        Self {
            shared: Rc::new(Shared {
                scheduler,
                delay,
                state: Cell::new(RotatorState::Stopped),
                current: Cell::new(0),
                timer: Cell::new(None),
                active: RefCell::new(active),
                on_change: RefCell::new(None),
                subscribers: RefCell::new(Vec::new()),
            }),
        }
    }

    pub fn on_slide_changed<F>(&self, callback: F)
    where
        F: Fn(&SlideChange) + 'static,
    {
        *self.shared.on_change.borrow_mut() = Some(Rc::new(callback));
    }

    /// Stream of every slide change from now until [`SlideRotator::stop`].
    pub fn subscribe(&self) -> flume::Receiver<SlideChange> {
        let (tx, rx) = flume::unbounded();
        self.shared.subscribers.borrow_mut().push(tx);
        rx
    }

    pub fn state(&self) -> RotatorState {
        self.shared.state.get()
    }

    pub fn is_running(&self) -> bool {
        self.state() == RotatorState::Running
    }

    pub fn is_paused(&self) -> bool {
        self.state() == RotatorState::Paused
    }

    pub fn current_index(&self) -> usize {
        self.shared.current.get()
    }

    pub fn slide_count(&self) -> usize {
        self.shared.slide_count()
    }

    pub fn delay(&self) -> Duration {
        self.shared.delay
    }

    /// Read access to the active markings.
    pub fn with_active<R>(&self, f: impl FnOnce(&ActiveSetCoordinator) -> R) -> R {
        f(&self.shared.active.borrow())
    }

    fn transition_error(&self, op: &'static str) -> Error {
        Error::InvalidTransition {
            op,
            state: self.state().name(),
        }
    }

    /// Starts rotating and marks the current slide right away rather than
    /// after the first interval. With no slides this is a no-op.
    pub fn start(&self) -> Result<()> {
        if self.state() != RotatorState::Stopped {
            return Err(self.transition_error("start"));
        }
        if self.slide_count() == 0 {
            debug!("Slideshow has no slides, staying stopped");
            return Ok(());
        }

        self.shared.state.set(RotatorState::Running);
        self.shared.start_timer();
        debug!(
            slides = self.slide_count(),
            delay_ms = self.shared.delay.as_millis() as u64,
            "Slideshow started"
        );
        self.shared.apply_index(self.current_index());
        Ok(())
    }

    pub fn pause(&self) -> Result<()> {
        if self.state() != RotatorState::Running {
            return Err(self.transition_error("pause"));
        }
        self.shared.cancel_timer();
        self.shared.state.set(RotatorState::Paused);
        debug!(index = self.current_index(), "Slideshow paused");
        Ok(())
    }

    /// Re-marks the current slide (markings may have moved while paused)
    /// and restarts the timer from a full interval.
    pub fn resume(&self) -> Result<()> {
        if self.state() != RotatorState::Paused {
            return Err(self.transition_error("resume"));
        }
        self.shared.state.set(RotatorState::Running);
        self.shared.active.borrow_mut().activate(self.current_index());
        self.shared.start_timer();
        debug!(index = self.current_index(), "Slideshow resumed");
        Ok(())
    }

    /// Cancels the timer and releases the callback and every subscriber.
    pub fn stop(&self) {
        self.shared.cancel_timer();
        self.shared.state.set(RotatorState::Stopped);
        self.shared.on_change.borrow_mut().take();
        self.shared.subscribers.borrow_mut().clear();
        debug!("Slideshow stopped");
    }

    /// Jumps to `index` (wrapped into range) in any state.
    pub fn set_index(&self, index: usize) {
        let count = self.slide_count();
        if count == 0 {
            return;
        }
        self.shared.apply_index(index % count);
    }

    /// Pointer entered something inside the navigation; only the designated
    /// trigger pauses.
    pub fn handle_pointer_over(&self, on_trigger: bool) {
        if on_trigger && self.is_running() {
            let _ = self.pause();
        }
    }

    pub fn handle_pointer_leave(&self) {
        if self.is_paused() {
            let _ = self.resume();
        }
    }
}

impl Drop for SlideRotator {
    fn drop(&mut self) {
        self.shared.cancel_timer();
    }
}
