#![forbid(unsafe_code)]

//! Owner-released subscription handles.
//!
//! An [`EventSubscription`] is what an event source returns from
//! `add_listener`. The hook activation that registered the listener owns it
//! exclusively and releases it at deactivation.
//!
//! # Invariants
//!
//! 1. The release callback runs at most once per handle.
//! 2. [`EventSubscription::remove`] consumes the handle, so a second explicit
//!    release does not type-check.
//! 3. Dropping an unreleased handle releases it. Dropping a released handle
//!    does nothing.

use std::fmt;

/// RAII handle for an active listener registration.
///
/// Construct one with [`EventSubscription::new`], passing the closure that
/// detaches the listener from its source.
pub struct EventSubscription {
    release: Option<Box<dyn FnOnce()>>,
}

impl EventSubscription {
    /// Create a handle that runs `release` when removed or dropped.
    #[must_use = "dropping the subscription releases the listener immediately"]
    pub fn new(release: impl FnOnce() + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    /// A handle with nothing to release.
    ///
    /// Useful for sources that never deliver events after the initial state.
    #[must_use]
    pub fn noop() -> Self {
        Self { release: None }
    }

    /// Whether the release callback is still pending.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.release.is_some()
    }

    /// Release the listener now.
    pub fn remove(mut self) {
        self.release_once();
    }

    fn release_once(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for EventSubscription {
    fn drop(&mut self) {
        self.release_once();
    }
}

impl fmt::Debug for EventSubscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventSubscription")
            .field("active", &self.is_active())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn counting() -> (Rc<Cell<u32>>, EventSubscription) {
        let count = Rc::new(Cell::new(0u32));
        let count_clone = Rc::clone(&count);
        let sub = EventSubscription::new(move || count_clone.set(count_clone.get() + 1));
        (count, sub)
    }

    #[test]
    fn remove_releases_once() {
        let (count, sub) = counting();
        assert!(sub.is_active());
        sub.remove();
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn drop_releases_once() {
        let (count, sub) = counting();
        drop(sub);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn not_released_while_held() {
        let (count, sub) = counting();
        assert_eq!(count.get(), 0);
        let _keep = sub;
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn noop_is_inactive() {
        let sub = EventSubscription::noop();
        assert!(!sub.is_active());
        sub.remove();
    }

    #[test]
    fn debug_format() {
        let (_count, sub) = counting();
        let dbg = format!("{sub:?}");
        assert!(dbg.contains("EventSubscription"));
        assert!(dbg.contains("active: true"));
    }
}
