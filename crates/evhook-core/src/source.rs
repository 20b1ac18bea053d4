#![forbid(unsafe_code)]

//! The capability set a hook is built from.
//!
//! [`HookMethods`] is the struct handed to the hook factory. It carries three
//! named fields and nothing else:
//!
//! | Field                     | Meaning                                        |
//! |---------------------------|------------------------------------------------|
//! | `empty_state`             | value shown before any real state arrives      |
//! | `get_initial_state_async` | deferred fetch of the current state            |
//! | `add_listener`            | registers a callback for every later change    |
//!
//! Sources that are naturally a type can implement [`EventSource`] and be
//! turned into a capability set with [`HookMethods::from_source`].
//!
//! Everything here is single-threaded (`Rc`, no `Send` bounds). Listeners are
//! invoked synchronously by the source on the UI thread.

use std::fmt;
use std::rc::Rc;

use futures::future::LocalBoxFuture;

use crate::error::SourceError;
use crate::subscription::EventSubscription;

/// Callback registered with an event source. Receives each new value.
pub type Listener<T> = Rc<dyn Fn(T)>;

/// Future returned by an initial state fetch.
pub type InitialStateFuture<T> = LocalBoxFuture<'static, Result<T, SourceError>>;

/// A source of state-change events with a queryable current state.
pub trait EventSource<T> {
    /// Register `listener` for every subsequent change.
    fn add_listener(&self, listener: Listener<T>) -> EventSubscription;

    /// Fetch the current state. May never resolve.
    fn initial_state(&self) -> InitialStateFuture<T>;
}

/// Capability set consumed by the hook factory.
pub struct HookMethods<T> {
    /// Value used before any real state is available.
    pub empty_state: T,
    /// Deferred operation producing the current state.
    pub get_initial_state_async: Rc<dyn Fn() -> InitialStateFuture<T>>,
    /// Registers a callback invoked on every subsequent state change.
    pub add_listener: Rc<dyn Fn(Listener<T>) -> EventSubscription>,
}

impl<T: 'static> HookMethods<T> {
    /// Build a capability set from its three parts.
    pub fn new(
        empty_state: T,
        get_initial_state_async: impl Fn() -> InitialStateFuture<T> + 'static,
        add_listener: impl Fn(Listener<T>) -> EventSubscription + 'static,
    ) -> Self {
        Self {
            empty_state,
            get_initial_state_async: Rc::new(get_initial_state_async),
            add_listener: Rc::new(add_listener),
        }
    }

    /// Adapt an [`EventSource`] into a capability set.
    pub fn from_source<S: EventSource<T> + 'static>(source: Rc<S>, empty_state: T) -> Self {
        let fetch_source = Rc::clone(&source);
        Self::new(
            empty_state,
            move || fetch_source.initial_state(),
            move |listener| source.add_listener(listener),
        )
    }

    /// Issue one initial state fetch.
    pub fn fetch_initial_state(&self) -> InitialStateFuture<T> {
        (self.get_initial_state_async)()
    }

    /// Register one listener.
    pub fn subscribe(&self, listener: Listener<T>) -> EventSubscription {
        (self.add_listener)(listener)
    }
}

impl<T: Clone> Clone for HookMethods<T> {
    fn clone(&self) -> Self {
        Self {
            empty_state: self.empty_state.clone(),
            get_initial_state_async: Rc::clone(&self.get_initial_state_async),
            add_listener: Rc::clone(&self.add_listener),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for HookMethods<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookMethods")
            .field("empty_state", &self.empty_state)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;
    use futures::executor::block_on;
    use std::cell::{Cell, RefCell};

    struct FixedSource {
        value: u32,
        listeners: RefCell<Vec<Listener<u32>>>,
        released: Rc<Cell<u32>>,
    }

    impl EventSource<u32> for FixedSource {
        fn add_listener(&self, listener: Listener<u32>) -> EventSubscription {
            self.listeners.borrow_mut().push(listener);
            let released = Rc::clone(&self.released);
            EventSubscription::new(move || released.set(released.get() + 1))
        }

        fn initial_state(&self) -> InitialStateFuture<u32> {
            let value = self.value;
            Box::pin(async move { Ok(value) })
        }
    }

    fn fixed(value: u32) -> Rc<FixedSource> {
        Rc::new(FixedSource {
            value,
            listeners: RefCell::new(Vec::new()),
            released: Rc::new(Cell::new(0)),
        })
    }

    #[test]
    fn closures_are_called_through_helpers() {
        let fetches = Rc::new(Cell::new(0u32));
        let fetches_clone = Rc::clone(&fetches);
        let methods = HookMethods::new(
            0u32,
            move || {
                fetches_clone.set(fetches_clone.get() + 1);
                async { Ok::<u32, SourceError>(7) }.boxed_local()
            },
            |_listener| EventSubscription::noop(),
        );

        assert_eq!(methods.empty_state, 0);
        assert_eq!(block_on(methods.fetch_initial_state()).ok(), Some(7));
        assert_eq!(fetches.get(), 1);
        assert!(!methods.subscribe(Rc::new(|_: u32| {})).is_active());
    }

    #[test]
    fn from_source_forwards_both_capabilities() {
        let source = fixed(42);
        let methods = HookMethods::from_source(Rc::clone(&source), 0);

        assert_eq!(block_on(methods.fetch_initial_state()).ok(), Some(42));

        let seen = Rc::new(Cell::new(0u32));
        let seen_clone = Rc::clone(&seen);
        let sub = methods.subscribe(Rc::new(move |v: u32| seen_clone.set(v)));
        assert_eq!(source.listeners.borrow().len(), 1);

        let listener = Rc::clone(&source.listeners.borrow()[0]);
        listener(9);
        assert_eq!(seen.get(), 9);

        sub.remove();
        assert_eq!(source.released.get(), 1);
    }

    #[test]
    fn clone_shares_callbacks() {
        let methods = HookMethods::from_source(fixed(1), 0u32);
        let copy = methods.clone();
        assert!(Rc::ptr_eq(&methods.add_listener, &copy.add_listener));
        assert!(Rc::ptr_eq(
            &methods.get_initial_state_async,
            &copy.get_initial_state_async
        ));
    }

    #[test]
    fn debug_shows_empty_state() {
        let methods = HookMethods::from_source(fixed(1), 5u32);
        let dbg = format!("{methods:?}");
        assert!(dbg.contains("HookMethods"));
        assert!(dbg.contains("empty_state: 5"));
    }
}
