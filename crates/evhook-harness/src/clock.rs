#![forbid(unsafe_code)]

//! Virtual millisecond clock for scripting event timelines.
//!
//! Actions are scheduled at absolute virtual times and run in time order;
//! actions scheduled for the same millisecond run in scheduling order. Nothing
//! here reads the wall clock, so a script produces the same sequence on every
//! run.

use std::collections::BTreeMap;
use std::fmt;

type Action = Box<dyn FnOnce()>;

/// Deterministic schedule of closures keyed by virtual time.
#[derive(Default)]
pub struct VirtualClock {
    now_ms: u64,
    seq: u64,
    queue: BTreeMap<(u64, u64), Action>,
}

impl VirtualClock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time.
    #[must_use]
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Actions not yet run.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Run `action` at `at_ms`. Times in the past are clamped to now.
    pub fn schedule_at(&mut self, at_ms: u64, action: impl FnOnce() + 'static) {
        let at = at_ms.max(self.now_ms);
        self.queue.insert((at, self.seq), Box::new(action));
        self.seq += 1;
    }

    /// Run `action` `delay_ms` after now.
    pub fn schedule_in(&mut self, delay_ms: u64, action: impl FnOnce() + 'static) {
        self.schedule_at(self.now_ms.saturating_add(delay_ms), action);
    }

    /// Take the next action due at or before `until_ms`, moving time to it.
    pub fn pop_due(&mut self, until_ms: u64) -> Option<Box<dyn FnOnce()>> {
        let (&(at, _), _) = self.queue.first_key_value()?;
        if at > until_ms {
            return None;
        }
        let ((at, _), action) = self.queue.pop_first()?;
        self.now_ms = at;
        Some(action)
    }

    /// Run every action due up to `until_ms`, then set the time to `until_ms`.
    pub fn advance_to(&mut self, until_ms: u64) {
        while let Some(action) = self.pop_due(until_ms) {
            action();
        }
        self.now_ms = self.now_ms.max(until_ms);
    }
}

impl fmt::Debug for VirtualClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VirtualClock")
            .field("now_ms", &self.now_ms)
            .field("pending", &self.queue.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recorder() -> (Rc<RefCell<Vec<&'static str>>>, impl Fn(&'static str) -> Box<dyn FnOnce()>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let log_clone = Rc::clone(&log);
        let make = move |tag: &'static str| -> Box<dyn FnOnce()> {
            let log = Rc::clone(&log_clone);
            Box::new(move || log.borrow_mut().push(tag))
        };
        (log, make)
    }

    #[test]
    fn runs_in_time_order() {
        let (log, make) = recorder();
        let mut clock = VirtualClock::new();
        clock.schedule_at(10, make("late"));
        clock.schedule_at(5, make("early"));

        clock.advance_to(20);
        assert_eq!(*log.borrow(), vec!["early", "late"]);
        assert_eq!(clock.now_ms(), 20);
    }

    #[test]
    fn same_time_runs_in_schedule_order() {
        let (log, make) = recorder();
        let mut clock = VirtualClock::new();
        clock.schedule_at(3, make("a"));
        clock.schedule_at(3, make("b"));
        clock.advance_to(3);
        assert_eq!(*log.borrow(), vec!["a", "b"]);
    }

    #[test]
    fn pop_due_stops_at_horizon() {
        let (log, make) = recorder();
        let mut clock = VirtualClock::new();
        clock.schedule_at(5, make("five"));
        clock.schedule_at(10, make("ten"));

        let action = clock.pop_due(7).expect("action due at 5");
        action();
        assert_eq!(clock.now_ms(), 5);
        assert!(clock.pop_due(7).is_none());
        assert_eq!(clock.pending(), 1);
        assert_eq!(*log.borrow(), vec!["five"]);
    }

    #[test]
    fn past_times_clamp_to_now() {
        let (log, make) = recorder();
        let mut clock = VirtualClock::new();
        clock.advance_to(50);
        clock.schedule_at(10, make("clamped"));
        clock.schedule_in(5, make("relative"));

        assert!(clock.pop_due(49).is_none());
        clock.advance_to(55);
        assert_eq!(*log.borrow(), vec!["clamped", "relative"]);
    }
}
