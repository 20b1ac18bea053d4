#![forbid(unsafe_code)]

//! Reactive state cells for hosts.
//!
//! - [`Observable`]: a shared, version-tracked value with subscriber
//!   callbacks. Implements [`StateSetter`](crate::host::StateSetter), so a
//!   host can hand it straight to hooks as the write half of `use_state`.
//! - [`Subscription`]: RAII guard that unsubscribes on drop.
//!
//! `Observable<T>` uses `Rc<RefCell<..>>` for single-threaded shared
//! ownership. Subscribers are stored as `Weak` function pointers and cleaned
//! up lazily during notification.

pub mod observable;

pub use observable::{Observable, Subscription};
