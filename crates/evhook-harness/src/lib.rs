#![forbid(unsafe_code)]

//! Test harness for evhook hooks.
//!
//! - [`TestComponent`] / [`TestHost`]: a deterministic fake UI host. Setup
//!   runs once per mount, cleanup once per unmount, renders are recorded.
//! - [`ManualSource`]: an event source whose events and initial state answers
//!   are fired by the test.
//! - [`VirtualClock`]: millisecond timeline for scripting those calls.
//!
//! ```ignore
//! let source = ManualSource::new();
//! let use_status = create_event_emitter_hook(source.methods("undetermined"));
//! let mut component = TestComponent::mount(move |h| use_status(h));
//!
//! let mut clock = VirtualClock::new();
//! let s = source.clone();
//! clock.schedule_at(10, move || { s.resolve_initial("granted"); });
//! component.run_clock(&mut clock, 20);
//! assert_eq!(component.frames(), &["undetermined", "granted"]);
//! ```

pub mod clock;
pub mod host;
pub mod source;

pub use clock::VirtualClock;
pub use host::{HostSetter, TestComponent, TestHost};
pub use source::{ManualSource, SourceStats};
