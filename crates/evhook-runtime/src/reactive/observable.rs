#![forbid(unsafe_code)]

//! Shared state cell with change notification and version tracking.
//!
//! # Design
//!
//! [`Observable<T>`] keeps a value in `Rc<RefCell<..>>` storage. Every write
//! replaces the value, bumps the version, and notifies live subscribers in
//! registration order. Writes are last-write-wins: the cell never compares or
//! merges values, so an equal write still notifies.
//!
//! Hosts use it as the backing store for `use_state` slots: the setter they
//! hand to hooks writes into the cell, and a subscriber marks the owning
//! component dirty.
//!
//! # Failure Modes
//!
//! - **Re-entrant set**: calling `set()` from inside a subscriber callback
//!   panics (RefCell borrow rules). A subscriber that writes back into its own
//!   cell is a bug in the host.
//! - **Subscriber leak**: holding [`Subscription`] guards forever accumulates
//!   callbacks. Dead weak references are pruned lazily during notification.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::host::StateSetter;

type CallbackRc<T> = Rc<dyn Fn(&T)>;
type CallbackWeak<T> = Weak<dyn Fn(&T)>;

struct ObservableInner<T> {
    value: T,
    version: u64,
    /// Pruned on notify.
    subscribers: Vec<CallbackWeak<T>>,
}

/// A shared, version-tracked value with change notification.
///
/// Cloning an `Observable` yields another handle to the **same** cell.
///
/// # Invariants
///
/// 1. `version` increments by exactly 1 per write that reaches the cell.
/// 2. Subscribers are notified in registration order.
/// 3. A dropped [`Subscription`] is never called again.
pub struct Observable<T> {
    inner: Rc<RefCell<ObservableInner<T>>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Observable")
            .field("value", &inner.value)
            .field("version", &inner.version)
            .field("subscriber_count", &inner.subscribers.len())
            .finish()
    }
}

impl<T: Clone + 'static> Observable<T> {
    /// Create a cell holding `value` at version 0.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(RefCell::new(ObservableInner {
                value,
                version: 0,
                subscribers: Vec::new(),
            })),
        }
    }

    /// Clone of the current value.
    #[must_use]
    pub fn get(&self) -> T {
        self.inner.borrow().value.clone()
    }

    /// Replace the value and notify subscribers.
    ///
    /// # Panics
    ///
    /// Panics if called re-entrantly from within a subscriber callback.
    pub fn set(&self, value: T) {
        {
            let mut inner = self.inner.borrow_mut();
            inner.value = value;
            inner.version += 1;
        }
        self.notify();
    }

    /// Subscribe to writes. The callback receives the new value.
    ///
    /// Dropping the returned guard unsubscribes.
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        let strong: CallbackRc<T> = Rc::new(callback);
        self.inner
            .borrow_mut()
            .subscribers
            .push(Rc::downgrade(&strong));
        Subscription {
            _guard: Box::new(strong),
        }
    }

    /// Number of writes so far.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.borrow().version
    }

    fn notify(&self) {
        let callbacks: Vec<CallbackRc<T>> = {
            let mut inner = self.inner.borrow_mut();
            inner.subscribers.retain(|w| w.strong_count() > 0);
            inner
                .subscribers
                .iter()
                .filter_map(|w| w.upgrade())
                .collect()
        };

        let value = self.get();
        for cb in &callbacks {
            cb(&value);
        }
    }
}

impl<T: Clone + 'static> StateSetter<T> for Observable<T> {
    fn set(&self, value: T) {
        Observable::set(self, value);
    }
}

/// RAII guard for a subscriber callback.
///
/// Dropping it releases the strong `Rc`, so the weak entry in the cell fails
/// to upgrade on the next notification.
pub struct Subscription {
    _guard: Box<dyn std::any::Any>,
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::cell::Cell;

    #[test]
    fn get_set_basic() {
        let obs = Observable::new(42);
        assert_eq!(obs.get(), 42);
        assert_eq!(obs.version(), 0);

        obs.set(99);
        assert_eq!(obs.get(), 99);
        assert_eq!(obs.version(), 1);
    }

    #[test]
    fn equal_write_still_notifies() {
        let obs = Observable::new("undetermined");
        let count = Rc::new(Cell::new(0u32));
        let count_clone = Rc::clone(&count);
        let _sub = obs.subscribe(move |_| count_clone.set(count_clone.get() + 1));

        obs.set("undetermined");
        assert_eq!(count.get(), 1);
        assert_eq!(obs.version(), 1);
    }

    #[test]
    fn subscriber_receives_new_value() {
        let obs = Observable::new(0);
        let last_seen = Rc::new(Cell::new(0));
        let last_clone = Rc::clone(&last_seen);
        let _sub = obs.subscribe(move |val| last_clone.set(*val));

        obs.set(42);
        assert_eq!(last_seen.get(), 42);
    }

    #[test]
    fn subscription_drop_unsubscribes() {
        let obs = Observable::new(0);
        let count = Rc::new(Cell::new(0u32));
        let count_clone = Rc::clone(&count);
        let sub = obs.subscribe(move |_| count_clone.set(count_clone.get() + 1));

        obs.set(1);
        drop(sub);
        obs.set(2);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn surviving_subscriber_still_notified() {
        let obs = Observable::new(0);
        let kept = Rc::new(Cell::new(0u32));
        let kept_clone = Rc::clone(&kept);
        let _s1 = obs.subscribe(move |v| kept_clone.set(*v));
        let s2 = obs.subscribe(|_| {});
        drop(s2);

        obs.set(7);
        assert_eq!(kept.get(), 7);
        obs.set(8);
        assert_eq!(kept.get(), 8);
    }

    #[test]
    fn notification_order_is_registration_order() {
        let obs = Observable::new(0);
        let log = Rc::new(RefCell::new(Vec::new()));

        let log1 = Rc::clone(&log);
        let _s1 = obs.subscribe(move |_| log1.borrow_mut().push('A'));
        let log2 = Rc::clone(&log);
        let _s2 = obs.subscribe(move |_| log2.borrow_mut().push('B'));

        obs.set(1);
        assert_eq!(*log.borrow(), vec!['A', 'B']);
    }

    #[test]
    fn clone_shares_cell() {
        let obs1 = Observable::new(0);
        let obs2 = obs1.clone();
        obs1.set(42);
        assert_eq!(obs2.get(), 42);
        assert_eq!(obs2.version(), 1);
    }

    #[test]
    fn state_setter_writes_through() {
        fn write<S: StateSetter<u8>>(setter: &S, value: u8) {
            setter.set(value);
        }
        let obs = Observable::new(0u8);
        write(&obs, 3);
        assert_eq!(obs.get(), 3);
    }

    proptest! {
        #[test]
        fn last_write_wins(writes in proptest::collection::vec(any::<u16>(), 1..64)) {
            let obs = Observable::new(0u16);
            for w in &writes {
                obs.set(*w);
            }
            prop_assert_eq!(obs.get(), *writes.last().unwrap());
            prop_assert_eq!(obs.version(), writes.len() as u64);
        }
    }
}
