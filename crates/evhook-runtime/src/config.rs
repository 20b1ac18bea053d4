#![forbid(unsafe_code)]

//! Per-hook configuration.
//!
//! [`HookConfig`] only affects diagnostics. It never changes which values
//! reach the component: events and the initial state are always applied in
//! arrival order, and a rejected initial fetch is never retried.

use std::borrow::Cow;

/// What to do when the initial state fetch fails.
///
/// Either way the current value is kept and the fetch is not retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RejectionPolicy {
    /// Emit a `warn!` event with the hook label and error.
    #[default]
    Log,
    /// Say nothing.
    Silent,
}

/// Configuration for an event-emitter hook.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct HookConfig {
    /// Name recorded on the hook's tracing span.
    pub label: Cow<'static, str>,
    /// Handling of a failed initial fetch.
    pub rejection: RejectionPolicy,
    /// Emit a `trace!` event for every listener delivery.
    pub trace_events: bool,
}

impl Default for HookConfig {
    fn default() -> Self {
        Self {
            label: Cow::Borrowed("event_emitter"),
            rejection: RejectionPolicy::Log,
            trace_events: true,
        }
    }
}

impl HookConfig {
    /// Default config with the given label.
    #[must_use]
    pub fn labeled(label: impl Into<Cow<'static, str>>) -> Self {
        Self::default().with_label(label)
    }

    /// Set the span label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<Cow<'static, str>>) -> Self {
        self.label = label.into();
        self
    }

    /// Set the rejection policy.
    #[must_use]
    pub fn with_rejection(mut self, rejection: RejectionPolicy) -> Self {
        self.rejection = rejection;
        self
    }

    /// Set whether listener deliveries are traced.
    #[must_use]
    pub fn with_trace_events(mut self, enabled: bool) -> Self {
        self.trace_events = enabled;
        self
    }
}
