#![forbid(unsafe_code)]

//! The two reactive primitives a UI host lends to hooks.
//!
//! A host (the UI framework driving components) implements [`Hooks`] for the
//! context it passes to a component while rendering. Hooks built by this
//! crate need exactly:
//!
//! 1. **A state cell**: [`Hooks::use_state`] returns the current value plus a
//!    [`StateSetter`] whose writes schedule a re-render of the component.
//! 2. **A lifecycle-bound effect**: [`Hooks::use_mount_effect`] runs its setup
//!    once per activation (mount) and the returned [`EffectCleanup`] once per
//!    deactivation (unmount). There is no dependency list; re-renders never
//!    re-run the setup.
//!
//! The setup receives the host's [`LocalSpawn`] executor for futures that
//! must complete on the UI thread. Nothing is requested from the host on
//! later renders.
//!
//! # Host obligations
//!
//! - Calls to `use_state` and `use_mount_effect` are matched to slots by call
//!   order, so components must call hooks unconditionally.
//! - On unmount, call [`EffectCleanup::run`] on every cleanup. Dropping a
//!   cleanup unrun skips its teardown code; only whatever the closure owns is
//!   dropped.
//! - Writes through a setter after the component unmounted must be ignored.
//! - Everything runs on one thread; none of these types are `Send`.

use std::fmt;

use futures::task::LocalSpawn;

/// Write half of a `use_state` slot.
pub trait StateSetter<T>: Clone + 'static {
    /// Replace the slot's value and schedule a re-render.
    fn set(&self, value: T);
}

/// Teardown returned by a mount effect's setup.
#[must_use = "the host must run the cleanup when the component unmounts"]
pub struct EffectCleanup {
    run: Option<Box<dyn FnOnce()>>,
}

impl EffectCleanup {
    /// Cleanup that runs `f`.
    pub fn new(f: impl FnOnce() + 'static) -> Self {
        Self {
            run: Some(Box::new(f)),
        }
    }

    /// Cleanup with nothing to do.
    pub fn none() -> Self {
        Self { run: None }
    }

    /// Run the cleanup. Consumes it, so it runs at most once.
    pub fn run(mut self) {
        if let Some(f) = self.run.take() {
            f();
        }
    }
}

impl fmt::Debug for EffectCleanup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EffectCleanup")
            .field("pending", &self.run.is_some())
            .finish()
    }
}

/// Hook context supplied by the host while a component renders.
pub trait Hooks {
    /// Setter type handed out by [`Hooks::use_state`].
    type Setter<T: Clone + 'static>: StateSetter<T>;

    /// Declare a state slot. `init` runs on the first render of an activation
    /// only; later renders return the slot's current value.
    fn use_state<T: Clone + 'static>(&mut self, init: impl FnOnce() -> T) -> (T, Self::Setter<T>);

    /// Declare an effect tied to mount/unmount. `setup` from the first render
    /// of an activation runs once after that render commits, with the host's
    /// executor; closures passed on later renders are dropped unrun.
    fn use_mount_effect(
        &mut self,
        setup: impl FnOnce(&dyn LocalSpawn) -> EffectCleanup + 'static,
    );
}
