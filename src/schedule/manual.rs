use std::cell::RefCell;
use std::collections::BTreeMap;
use std::time::Duration;

use super::{IntervalTask, Scheduler, TimeoutTask, TimerId};

/// Shortest interval period accepted; a zero period would never let the
/// clock move forward.
const MIN_PERIOD: Duration = Duration::from_millis(1);

enum Task {
    Once(TimeoutTask),
    Repeat { period: Duration, task: IntervalTask },
}

#[derive(Default)]
struct Inner {
    now: Duration,
    next_id: u64,
    next_seq: u64,
    /// Ordered by due time, then by scheduling order.
    queue: BTreeMap<(Duration, u64), (TimerId, Task)>,
    running: Option<TimerId>,
    running_cancelled: bool,
}

impl Inner {
    fn push(&mut self, due: Duration, id: TimerId, task: Task) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.insert((due, seq), (id, task));
    }

    fn allocate_id(&mut self) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        id
    }
}

/// Virtual clock that only moves when told to.
///
/// Timers fire inside [`ManualScheduler::advance`], in due order, with the
/// clock set to each timer's due time while its task runs. Tasks may schedule
/// or cancel other timers, including themselves.
#[derive(Default)]
pub struct ManualScheduler {
    inner: RefCell<Inner>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves the clock forward by `by`, firing every timer that comes due.
    pub fn advance(&self, by: Duration) {
        let target = self.inner.borrow().now + by;

        loop {
            let (due, id, task) = {
                let mut inner = self.inner.borrow_mut();
                let is_due = inner
                    .queue
                    .first_key_value()
                    .is_some_and(|((due, _), _)| *due <= target);
                if !is_due {
                    inner.now = target;
                    break;
                }
                let Some(((due, _), (id, task))) = inner.queue.pop_first() else {
                    break;
                };
                inner.now = due;
                inner.running = Some(id);
                inner.running_cancelled = false;
                (due, id, task)
            };

            match task {
                Task::Once(task) => task(),
                Task::Repeat { period, task } => {
                    task();
                    let mut inner = self.inner.borrow_mut();
                    if !inner.running_cancelled {
                        inner.push(due + period, id, Task::Repeat { period, task });
                    }
                }
            }

            self.inner.borrow_mut().running = None;
        }
    }

    /// Number of timers still waiting to fire.
    pub fn pending(&self) -> usize {
        self.inner.borrow().queue.len()
    }
}

impl Scheduler for ManualScheduler {
    fn set_timeout(&self, delay: Duration, task: TimeoutTask) -> TimerId {
        let mut inner = self.inner.borrow_mut();
        let id = inner.allocate_id();
        let due = inner.now + delay;
        inner.push(due, id, Task::Once(task));
        id
    }

    fn set_interval(&self, period: Duration, task: IntervalTask) -> TimerId {
        let period = period.max(MIN_PERIOD);
        let mut inner = self.inner.borrow_mut();
        let id = inner.allocate_id();
        let due = inner.now + period;
        inner.push(due, id, Task::Repeat { period, task });
        id
    }

    fn cancel(&self, id: TimerId) {
        let mut inner = self.inner.borrow_mut();
        if inner.running == Some(id) {
            inner.running_cancelled = true;
        }
        inner.queue.retain(|_, (timer, _)| *timer != id);
    }

    fn now(&self) -> Duration {
        self.inner.borrow().now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_timeout_fires_once_when_due() {
        let clock = ManualScheduler::new();
        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);
        clock.set_timeout(
            Duration::from_millis(100),
            Box::new(move || counter.set(counter.get() + 1)),
        );

        clock.advance(Duration::from_millis(99));
        assert_eq!(hits.get(), 0);
        clock.advance(Duration::from_millis(1));
        assert_eq!(hits.get(), 1);
        clock.advance(Duration::from_secs(10));
        assert_eq!(hits.get(), 1);
        assert_eq!(clock.pending(), 0);
    }

    #[test]
    fn test_interval_repeats_and_cancels() {
        let clock = Rc::new(ManualScheduler::new());
        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);
        let id = clock.set_interval(
            Duration::from_millis(50),
            Rc::new(move || counter.set(counter.get() + 1)),
        );

        clock.advance(Duration::from_millis(175));
        assert_eq!(hits.get(), 3);
        assert_eq!(clock.now(), Duration::from_millis(175));

        clock.cancel(id);
        clock.advance(Duration::from_secs(1));
        assert_eq!(hits.get(), 3);
    }

    #[test]
    fn test_interval_can_cancel_itself() {
        let clock = Rc::new(ManualScheduler::new());
        let hits = Rc::new(Cell::new(0));
        let own_id: Rc<Cell<Option<TimerId>>> = Rc::new(Cell::new(None));

        let task = {
            let clock = Rc::clone(&clock);
            let hits = Rc::clone(&hits);
            let own_id = Rc::clone(&own_id);
            Rc::new(move || {
                hits.set(hits.get() + 1);
                if hits.get() == 2 {
                    if let Some(id) = own_id.get() {
                        clock.cancel(id);
                    }
                }
            })
        };
        own_id.set(Some(clock.set_interval(Duration::from_millis(10), task)));

        clock.advance(Duration::from_millis(100));
        assert_eq!(hits.get(), 2);
        assert_eq!(clock.pending(), 0);
    }

    #[test]
    fn test_fires_in_due_order() {
        let clock = ManualScheduler::new();
        let order = Rc::new(RefCell::new(Vec::new()));
        for (label, ms) in [("late", 30u64), ("early", 10), ("middle", 20)] {
            let order = Rc::clone(&order);
            clock.set_timeout(
                Duration::from_millis(ms),
                Box::new(move || order.borrow_mut().push(label)),
            );
        }
        clock.advance(Duration::from_millis(30));
        assert_eq!(*order.borrow(), vec!["early", "middle", "late"]);
    }
}
