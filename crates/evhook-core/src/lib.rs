#![forbid(unsafe_code)]

//! Core: event-source capabilities, subscription handles, and source errors.
//!
//! # Role in evhook
//! `evhook-core` is the contract layer. It defines what a caller hands to the
//! hook factory ([`HookMethods`]) and what an event source gives back when a
//! listener is registered ([`EventSubscription`]). It knows nothing about the
//! UI host; that side lives in `evhook-runtime`.
//!
//! # Primary responsibilities
//! - **HookMethods**: the three-field capability set (empty state, initial
//!   state fetch, listener registration).
//! - **EventSource**: trait form of the same capabilities, for sources that
//!   prefer to be a type rather than a bag of closures.
//! - **EventSubscription**: owner-released handle that releases exactly once.
//! - **SourceError**: failure of the initial state fetch.

pub mod error;
pub mod source;
pub mod subscription;

pub use error::SourceError;
pub use source::{EventSource, HookMethods, InitialStateFuture, Listener};
pub use subscription::EventSubscription;
