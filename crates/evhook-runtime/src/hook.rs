#![forbid(unsafe_code)]

//! Event-emitter hook factory.
//!
//! [`create_event_emitter_hook`] turns a [`HookMethods`] capability set into a
//! hook a component calls while rendering. The hook returns the latest known
//! value and keeps it current:
//!
//! 1. On mount it holds `empty_state`, issues the initial state fetch once,
//!    and registers exactly one listener.
//! 2. The fetch result and every listener event replace the value and
//!    re-render the component. Whichever arrives last wins; nothing is merged.
//! 3. On unmount the subscription is released exactly once. A fetch still in
//!    flight is not cancelled; its result is dropped when it lands.
//!
//! Remounting repeats the whole setup with a fresh subscription and fetch.
//!
//! # Example
//!
//! ```ignore
//! use evhook_runtime::{create_event_emitter_hook, Hooks};
//!
//! let use_camera_permission = create_event_emitter_hook(HookMethods::from_source(
//!     Rc::clone(&camera),
//!     PermissionResponse::undetermined(),
//! ));
//!
//! fn view<H: Hooks>(hooks: &mut H) -> String {
//!     let permission = use_camera_permission(hooks);
//!     format!("camera: {}", permission.status)
//! }
//! ```
//!
//! # Failure Modes
//!
//! - **Initial fetch rejects**: the value is left as is and the fetch is not
//!   retried. Reported according to [`RejectionPolicy`] and to the handler set
//!   with [`EventEmitterHook::on_rejection`].
//! - **Spawner refuses the fetch**: logged at `warn`; the listener still runs.
//! - **Listener registration or release panics**: unwinds to the host.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use evhook_core::{HookMethods, InitialStateFuture, Listener, SourceError};
use futures::task::{LocalSpawn, LocalSpawnExt};
use tracing::{Instrument, Span, debug, debug_span, trace, warn};

use crate::config::{HookConfig, RejectionPolicy};
use crate::host::{EffectCleanup, Hooks, StateSetter};

/// What last wrote the hook's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOrigin {
    /// Nothing yet; the value is `empty_state`.
    Empty,
    /// The initial state fetch.
    Initial,
    /// A listener event.
    Event,
}

/// Where an active hook is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookPhase {
    /// Subscribed, nothing received yet.
    AwaitingInitial,
    /// Subscribed, at least one value received.
    HasState,
}

/// The hook's local value together with its origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookSnapshot<T> {
    pub value: T,
    pub origin: UpdateOrigin,
}

impl<T> HookSnapshot<T> {
    fn empty(value: T) -> Self {
        Self {
            value,
            origin: UpdateOrigin::Empty,
        }
    }

    #[must_use]
    pub fn phase(&self) -> HookPhase {
        match self.origin {
            UpdateOrigin::Empty => HookPhase::AwaitingInitial,
            UpdateOrigin::Initial | UpdateOrigin::Event => HookPhase::HasState,
        }
    }

    pub fn into_value(self) -> T {
        self.value
    }
}

/// Callback invoked with every failed initial fetch.
pub type RejectionHandler = Rc<dyn Fn(&SourceError)>;

/// A reusable hook bound to one capability set.
///
/// Cheap to clone; clones share the capability set and config.
pub struct EventEmitterHook<T> {
    methods: Rc<HookMethods<T>>,
    config: Rc<HookConfig>,
    on_rejection: Option<RejectionHandler>,
}

impl<T> Clone for EventEmitterHook<T> {
    fn clone(&self) -> Self {
        Self {
            methods: Rc::clone(&self.methods),
            config: Rc::clone(&self.config),
            on_rejection: self.on_rejection.clone(),
        }
    }
}

impl<T> fmt::Debug for EventEmitterHook<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventEmitterHook")
            .field("config", &self.config)
            .field("has_rejection_handler", &self.on_rejection.is_some())
            .finish_non_exhaustive()
    }
}

impl<T: Clone + 'static> EventEmitterHook<T> {
    /// Bind a capability set with the default config.
    #[must_use]
    pub fn new(methods: HookMethods<T>) -> Self {
        Self {
            methods: Rc::new(methods),
            config: Rc::new(HookConfig::default()),
            on_rejection: None,
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: HookConfig) -> Self {
        self.config = Rc::new(config);
        self
    }

    /// Call `handler` whenever an initial fetch fails.
    #[must_use]
    pub fn on_rejection(mut self, handler: impl Fn(&SourceError) + 'static) -> Self {
        self.on_rejection = Some(Rc::new(handler));
        self
    }

    pub fn methods(&self) -> &HookMethods<T> {
        &self.methods
    }

    pub fn config(&self) -> &HookConfig {
        &self.config
    }

    /// Run the hook in the current render and return the live value.
    pub fn call<H: Hooks>(&self, hooks: &mut H) -> T {
        self.snapshot(hooks).into_value()
    }

    /// Like [`call`](Self::call), also reporting where the value came from.
    pub fn snapshot<H: Hooks>(&self, hooks: &mut H) -> HookSnapshot<T> {
        let methods = Rc::clone(&self.methods);
        let (snapshot, setter) =
            hooks.use_state(move || HookSnapshot::empty(methods.empty_state.clone()));

        let hook = self.clone();
        hooks.use_mount_effect(move |spawner| {
            Activation {
                methods: hook.methods,
                config: hook.config,
                on_rejection: hook.on_rejection,
                setter,
            }
            .start(spawner)
        });

        snapshot
    }
}

/// Build a hook from a capability set.
pub fn create_event_emitter_hook<T, H>(methods: HookMethods<T>) -> impl Fn(&mut H) -> T
where
    T: Clone + 'static,
    H: Hooks,
{
    let hook = EventEmitterHook::new(methods);
    move |hooks: &mut H| hook.call(hooks)
}

/// Build a hook from a capability set and an explicit config.
pub fn create_event_emitter_hook_with_config<T, H>(
    methods: HookMethods<T>,
    config: HookConfig,
) -> impl Fn(&mut H) -> T
where
    T: Clone + 'static,
    H: Hooks,
{
    let hook = EventEmitterHook::new(methods).with_config(config);
    move |hooks: &mut H| hook.call(hooks)
}

/// The hook without the factory: subscribe to `methods` for the lifetime of
/// the calling component.
pub fn use_event_emitter<T, H>(hooks: &mut H, methods: &HookMethods<T>) -> T
where
    T: Clone + 'static,
    H: Hooks,
{
    EventEmitterHook::new(methods.clone()).call(hooks)
}

/// Everything one mount needs, moved into the mount effect.
struct Activation<T, S> {
    methods: Rc<HookMethods<T>>,
    config: Rc<HookConfig>,
    on_rejection: Option<RejectionHandler>,
    setter: S,
}

/// Clears the mount's live flag when dropped, whether or not the cleanup ran.
struct LiveGuard(Rc<Cell<bool>>);

impl Drop for LiveGuard {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

impl<T, S> Activation<T, S>
where
    T: Clone + 'static,
    S: StateSetter<HookSnapshot<T>>,
{
    fn start(self, spawner: &dyn LocalSpawn) -> EffectCleanup {
        let span = debug_span!("event_emitter_hook", label = %self.config.label);
        // Cleared on unmount. Writes from this mount are dropped afterwards.
        let live = Rc::new(Cell::new(true));

        span.in_scope(|| debug!("activating"));

        let fetch = self.methods.fetch_initial_state();
        let task = resolve_initial(
            fetch,
            self.setter.clone(),
            Rc::clone(&live),
            Rc::clone(&self.config),
            self.on_rejection.clone(),
        )
        .instrument(span.clone());
        if let Err(err) = spawner.spawn_local(task) {
            span.in_scope(|| warn!(error = %err, "could not spawn initial state fetch"));
        }

        let listener = self.listener(Rc::clone(&live), span.clone());
        let subscription = self.methods.subscribe(listener);
        let guard = LiveGuard(live);

        EffectCleanup::new(move || {
            drop(guard);
            subscription.remove();
            span.in_scope(|| debug!("deactivated, subscription released"));
        })
    }

    fn listener(&self, live: Rc<Cell<bool>>, span: Span) -> Listener<T> {
        let setter = self.setter.clone();
        let trace_events = self.config.trace_events;
        Rc::new(move |event: T| {
            if !live.get() {
                span.in_scope(|| debug!("event after deactivation dropped"));
                return;
            }
            if trace_events {
                span.in_scope(|| trace!("listener event"));
            }
            setter.set(HookSnapshot {
                value: event,
                origin: UpdateOrigin::Event,
            });
        })
    }
}

async fn resolve_initial<T, S>(
    fetch: InitialStateFuture<T>,
    setter: S,
    live: Rc<Cell<bool>>,
    config: Rc<HookConfig>,
    on_rejection: Option<RejectionHandler>,
) where
    S: StateSetter<HookSnapshot<T>>,
{
    match fetch.await {
        Ok(value) if live.get() => {
            debug!("initial state resolved");
            setter.set(HookSnapshot {
                value,
                origin: UpdateOrigin::Initial,
            });
        }
        Ok(_) => debug!("initial state resolved after deactivation, dropped"),
        Err(err) => report_rejection(&config, on_rejection.as_deref(), &err),
    }
}

fn report_rejection(
    config: &HookConfig,
    handler: Option<&dyn Fn(&SourceError)>,
    err: &SourceError,
) {
    if config.rejection == RejectionPolicy::Log {
        warn!(error = %err, "initial state fetch failed, keeping current value");
    }
    if let Some(handler) = handler {
        handler(err);
    }
}
