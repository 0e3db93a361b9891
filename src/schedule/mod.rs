//! Timers for a single-threaded, event-driven host.
//!
//! Everything that waits goes through [`Scheduler`], so controllers can run
//! against a real tokio runtime or against [`ManualScheduler`]'s virtual
//! clock in tests.

pub mod debounce;
pub mod manual;
pub mod ready;
pub mod tokio_driver;

use std::rc::Rc;
use std::time::Duration;

pub use debounce::{Debouncer, Throttler};
pub use manual::ManualScheduler;
pub use ready::ReadyGate;
pub use tokio_driver::TokioScheduler;

/// Debounce window for resize handlers.
pub const RESIZE_DEBOUNCE: Duration = Duration::from_millis(120);

/// Throttle window for scroll handlers.
pub const SCROLL_THROTTLE: Duration = Duration::from_millis(10);

/// Handle to a pending timeout or a live interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub(crate) u64);

pub type TimeoutTask = Box<dyn FnOnce()>;
pub type IntervalTask = Rc<dyn Fn()>;

pub trait Scheduler {
    /// Run `task` once after `delay`.
    fn set_timeout(&self, delay: Duration, task: TimeoutTask) -> TimerId;

    /// Run `task` every `period`, first after one full period.
    fn set_interval(&self, period: Duration, task: IntervalTask) -> TimerId;

    /// Cancel a timer. Unknown or already-fired ids are ignored.
    fn cancel(&self, id: TimerId);

    /// Time elapsed since the scheduler was created.
    fn now(&self) -> Duration;
}
