#![forbid(unsafe_code)]

//! Tracing setup for applications and demos.
//!
//! The hook itself only emits `tracing` events. Installing a subscriber is the
//! application's job; [`init_tracing`] is a convenience for binaries that have
//! no subscriber of their own. `RUST_LOG` overrides `default_directive`.
//!
//! ```ignore
//! evhook_runtime::logging::init_tracing("evhook_runtime=debug")?;
//! ```

use tracing_subscriber::EnvFilter;

/// Error returned when a global subscriber is already installed or the
/// directive does not parse.
pub type InitError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Install a global fmt subscriber filtered by `RUST_LOG`, falling back to
/// `default_directive`.
pub fn init_tracing(default_directive: &str) -> Result<(), InitError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_directive)?,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
}
