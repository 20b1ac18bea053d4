#![forbid(unsafe_code)]

//! Manually driven event source.
//!
//! [`ManualSource`] implements [`EventSource`] with every outcome in the test's
//! hands: `emit` delivers an event to live listeners synchronously, and each
//! initial state request stays pending until `resolve_initial` or
//! `reject_initial` answers it (oldest request first).
//!
//! It also counts what the hook did to it (subscriptions, releases, initial
//! requests) so tests can check the once-per-activation guarantees.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use evhook_core::{
    EventSource, EventSubscription, HookMethods, InitialStateFuture, Listener, SourceError,
};
use futures::FutureExt;
use futures::channel::oneshot;

/// Counters of what consumers did to a [`ManualSource`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourceStats {
    /// Listeners ever registered.
    pub subscriptions: usize,
    /// Subscriptions released.
    pub releases: usize,
    /// Initial state fetches issued.
    pub initial_requests: usize,
}

type Reply<T> = oneshot::Sender<Result<T, SourceError>>;

struct SourceInner<T> {
    listeners: Vec<(u64, Listener<T>)>,
    next_id: u64,
    pending: VecDeque<Reply<T>>,
    stats: SourceStats,
}

/// Event source driven by the test. Clones share state.
pub struct ManualSource<T> {
    inner: Rc<RefCell<SourceInner<T>>>,
}

impl<T> Clone for ManualSource<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T> Default for ManualSource<T> {
    fn default() -> Self {
        Self {
            inner: Rc::new(RefCell::new(SourceInner {
                listeners: Vec::new(),
                next_id: 0,
                pending: VecDeque::new(),
                stats: SourceStats::default(),
            })),
        }
    }
}

impl<T> fmt::Debug for ManualSource<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("ManualSource")
            .field("listeners", &inner.listeners.len())
            .field("pending_initial", &inner.pending.len())
            .field("stats", &inner.stats)
            .finish()
    }
}

impl<T: Clone + 'static> ManualSource<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Capability set backed by this source.
    pub fn methods(&self, empty_state: T) -> HookMethods<T> {
        HookMethods::from_source(Rc::new(self.clone()), empty_state)
    }

    /// Deliver `event` to every live listener. Returns how many were called.
    pub fn emit(&self, event: T) -> usize {
        let listeners: Vec<Listener<T>> = self
            .inner
            .borrow()
            .listeners
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();
        for listener in &listeners {
            listener(event.clone());
        }
        listeners.len()
    }

    /// Answer the oldest pending initial request with `value`.
    ///
    /// Returns `false` if no request was pending.
    pub fn resolve_initial(&self, value: T) -> bool {
        self.answer(Ok(value))
    }

    /// Fail the oldest pending initial request.
    pub fn reject_initial(&self, err: SourceError) -> bool {
        self.answer(Err(err))
    }

    fn answer(&self, result: Result<T, SourceError>) -> bool {
        let reply = self.inner.borrow_mut().pending.pop_front();
        match reply {
            Some(reply) => {
                // The requester may be gone already; that is its business.
                let _ = reply.send(result);
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn active_listeners(&self) -> usize {
        self.inner.borrow().listeners.len()
    }

    #[must_use]
    pub fn pending_initial(&self) -> usize {
        self.inner.borrow().pending.len()
    }

    #[must_use]
    pub fn stats(&self) -> SourceStats {
        self.inner.borrow().stats
    }
}

impl<T: Clone + 'static> EventSource<T> for ManualSource<T> {
    fn add_listener(&self, listener: Listener<T>) -> EventSubscription {
        let id = {
            let mut inner = self.inner.borrow_mut();
            let id = inner.next_id;
            inner.next_id += 1;
            inner.listeners.push((id, listener));
            inner.stats.subscriptions += 1;
            id
        };
        let weak = Rc::downgrade(&self.inner);
        EventSubscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                let mut inner = inner.borrow_mut();
                inner.listeners.retain(|(lid, _)| *lid != id);
                inner.stats.releases += 1;
            }
        })
    }

    fn initial_state(&self) -> InitialStateFuture<T> {
        let (tx, rx) = oneshot::channel();
        {
            let mut inner = self.inner.borrow_mut();
            inner.pending.push_back(tx);
            inner.stats.initial_requests += 1;
        }
        async move { rx.await.unwrap_or(Err(SourceError::Unavailable)) }.boxed_local()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use std::cell::Cell;

    #[test]
    fn emit_reaches_live_listeners_only() {
        let source = ManualSource::<u32>::new();
        let seen = Rc::new(Cell::new(0u32));
        let seen_clone = Rc::clone(&seen);
        let sub = source.add_listener(Rc::new(move |v: u32| seen_clone.set(v)));

        assert_eq!(source.emit(4), 1);
        assert_eq!(seen.get(), 4);

        sub.remove();
        assert_eq!(source.emit(9), 0);
        assert_eq!(seen.get(), 4);
        assert_eq!(
            source.stats(),
            SourceStats {
                subscriptions: 1,
                releases: 1,
                initial_requests: 0,
            }
        );
    }

    #[test]
    fn initial_requests_answer_oldest_first() {
        let source = ManualSource::<&'static str>::new();
        let first = source.initial_state();
        let second = source.initial_state();
        assert_eq!(source.pending_initial(), 2);

        assert!(source.resolve_initial("granted"));
        assert!(source.reject_initial(SourceError::rejected("nope")));
        assert!(!source.resolve_initial("extra"));

        assert_eq!(block_on(first).ok(), Some("granted"));
        assert!(matches!(block_on(second), Err(SourceError::Rejected(_))));
    }

    #[test]
    fn dropped_request_reads_as_unavailable() {
        let source = ManualSource::<u8>::new();
        let fetch = source.initial_state();
        drop(source);
        assert!(matches!(block_on(fetch), Err(SourceError::Unavailable)));
    }

    #[test]
    fn methods_share_state_with_source() {
        let source = ManualSource::<u8>::new();
        let methods = source.methods(0);
        let _sub = methods.subscribe(Rc::new(|_: u8| {}));
        assert_eq!(source.active_listeners(), 1);
        let _fetch = methods.fetch_initial_state();
        assert_eq!(source.stats().initial_requests, 1);
    }

    #[test]
    fn release_after_source_dropped_is_harmless() {
        let source = ManualSource::<u8>::new();
        let sub = source.add_listener(Rc::new(|_: u8| {}));
        drop(source);
        sub.remove();
    }
}
