#![forbid(unsafe_code)]

//! Runtime: host abstraction and the event-emitter hook factory.
//!
//! # Role in evhook
//! `evhook-runtime` sits between a UI host and an event source. The host lends
//! it a state cell and a mount-bound effect through [`Hooks`]; the source lends
//! it listener registration and an initial state fetch through
//! [`HookMethods`](evhook_core::HookMethods). The hook glues the two together.
//!
//! # Primary responsibilities
//! - **Hooks / StateSetter / EffectCleanup**: the narrow interface a host
//!   implements.
//! - **EventEmitterHook**: subscribe on mount, fetch once, last write wins,
//!   release on unmount.
//! - **HookConfig / RejectionPolicy**: diagnostics knobs.
//! - **Observable**: a ready-made state cell for hosts.
//! - **logging** (feature `logging`): subscriber setup for binaries.

pub mod config;
pub mod hook;
pub mod host;
#[cfg(feature = "logging")]
pub mod logging;
pub mod reactive;

pub use config::{HookConfig, RejectionPolicy};
pub use hook::{
    EventEmitterHook, HookPhase, HookSnapshot, RejectionHandler, UpdateOrigin,
    create_event_emitter_hook, create_event_emitter_hook_with_config, use_event_emitter,
};
pub use host::{EffectCleanup, Hooks, StateSetter};
pub use reactive::{Observable, Subscription};
