#![forbid(unsafe_code)]

//! evhook public facade.
//!
//! Turns any source of change events plus an asynchronous "current value"
//! query into a component-local hook value:
//!
//! ```ignore
//! use evhook::prelude::*;
//!
//! let use_permission = create_event_emitter_hook(HookMethods::from_source(
//!     camera_source,
//!     PermissionResponse::undetermined(),
//! ));
//!
//! fn render(h: &mut impl Hooks) {
//!     let permission = use_permission(h);
//!     // ...
//! }
//! ```
//!
//! The hook starts at the empty state, fetches the initial value once per
//! mount, subscribes once per mount, and releases the subscription on
//! unmount. Whichever of the initial answer and a change event arrives last
//! wins.

#[cfg(feature = "harness")]
pub use evhook_harness as harness;

pub use evhook_core::{
    EventSource, EventSubscription, HookMethods, InitialStateFuture, Listener, SourceError,
};
pub use evhook_runtime::{
    EffectCleanup, EventEmitterHook, HookConfig, HookPhase, HookSnapshot, Hooks,
    RejectionHandler, RejectionPolicy, StateSetter, UpdateOrigin, create_event_emitter_hook,
    create_event_emitter_hook_with_config, use_event_emitter,
};

#[cfg(feature = "logging")]
pub use evhook_runtime::logging::init_tracing;

/// Common imports for hook authors.
pub mod prelude {
    pub use crate::{
        EventEmitterHook, EventSource, EventSubscription, HookConfig, HookMethods, Hooks,
        RejectionPolicy, SourceError, create_event_emitter_hook,
        create_event_emitter_hook_with_config, use_event_emitter,
    };
}
