#![cfg_attr(docsrs, feature(doc_cfg))]
//! # charmsim
//!
//! A deterministic event-simulation and capture harness for unit-testing
//! charms.
//!
//! charmsim replays one processing cycle of a charm in-process: the events a
//! previous session deferred, then a triggering event with everything its
//! observers emit, then the framework's `pre_commit` and `commit`. A scoped
//! [`CaptureRecorder`](capture::CaptureRecorder) records what was emitted, in
//! order, so tests can assert on the exact sequence.
//!
//! ## Quick Start
//!
//! ```rust
//! use charmsim::capture::{CaptureConfig, capture_events};
//! use charmsim::*;
//!
//! #[derive(Debug, Default)]
//! struct Foo;
//! impl Event for Foo {}
//!
//! struct MyCharm;
//!
//! impl MyCharm {
//!     fn on_start(fw: &mut Framework<Self>, _event: &Emission) -> Result {
//!         fw.emit("foo")
//!     }
//!
//!     fn on_foo(_fw: &mut Framework<Self>, _event: &Emission) -> Result {
//!         Ok(())
//!     }
//! }
//!
//! impl Charm for MyCharm {
//!     fn new(_meta: &CharmMeta) -> Self {
//!         MyCharm
//!     }
//!
//!     fn declare(registry: &mut Registry<Self>) {
//!         registry
//!             .event::<Foo>("foo")
//!             .observe("start", "on_start", Self::on_start)
//!             .observe("foo", "on_foo", Self::on_foo);
//!     }
//! }
//!
//! fn main() -> Result {
//!     let meta = CharmMeta::new("mycharm");
//!
//!     let recorder = capture_events(CaptureConfig::default());
//!     trigger::<MyCharm>(&State::new(), "start", &meta)?;
//!     let log = recorder.finish()?;
//!
//!     assert_eq!(log.type_names(), ["StartEvent", "Foo"]);
//!     Ok(())
//! }
//! ```
//!
//! ## Core Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Charm`] | Trait for the component under test |
//! | [`Registry`] | Declares custom events and observers |
//! | [`Framework`] | Owns the charm and dispatches events to observers |
//! | [`Emission`] | One event as it passes through dispatch |
//! | [`State`] | Pending (deferred) events carried into a cycle |
//! | [`PendingEvent`] | One deferred event and the observer that deferred it |
//! | [`Dispatcher`] | Runs a trigger cycle |
//! | [`CaptureRecorder`](capture::CaptureRecorder) | Records emissions in a scope |
//!
//! ## Deferred Events
//!
//! An observer can [`defer`](Emission::defer) the event it is handling. The
//! deferral shows up in [`Outcome::deferred`] and, through
//! [`Outcome::output_state`], becomes the next cycle's pending queue. A
//! pending event is redelivered only to the observer that deferred it.
//!
//! ```rust,ignore
//! let state = State::new().with_deferred(PendingEvent::deferred("foo", "on_foo"));
//! let outcome = trigger::<MyCharm>(&state, "start", &meta)?;
//! ```
//!
//! ## Interception
//!
//! Every emission is shown to the interceptors installed on the current
//! thread before any observer runs. [`capture`] is built on it; see
//! [`interception`] for writing your own and [`monitors`] for ready-made
//! ones.
//!
//! ## Features
//!
//! - **`serde`** (default) - JSON loading of [`CharmMeta`], [`State`] and [`Config`], serializable captures
//! - **`recorder`** - Built-in [`JsonLinesRecorder`](monitors::JsonLinesRecorder) interceptor (enables `serde`)
//!
//! ## Examples
//!
//! - `deferred.rs` - Two trigger cycles linked by a deferred event, logged with `tracing`

mod charm;
mod charm_events;
mod config;
mod dispatcher;
mod emission;
mod error;
mod event;
mod event_id;
mod framework;
mod handle;
mod lifecycle;
mod meta;
mod registry;
mod state;

pub mod capture;
pub mod interception;
pub mod monitors;

pub use charm::Charm;
pub use charm_events::{
    CollectMetricsEvent, ConfigChangedEvent, InstallEvent, LeaderElectedEvent,
    LeaderSettingsChangedEvent, RemoveEvent, STANDARD_EVENTS, StartEvent, StopEvent,
    UpdateStatusEvent, UpgradeCharmEvent,
};
pub use config::Config;
pub use dispatcher::{Dispatcher, Outcome, trigger};
pub use emission::Emission;
pub use error::{Error, Misuse};
pub use event::{Event, EventType, Origin};
pub use event_id::EventId;
pub use framework::Framework;
pub use handle::Handle;
pub use lifecycle::{COMMIT, CommitEvent, PRE_COMMIT, PreCommitEvent};
pub use meta::CharmMeta;
pub use registry::{Handler, Registry};
pub use state::{HandlerRef, PendingEvent, State};

/// Convenience alias for `Result<T, charmsim::Error>`.
pub type Result<T = ()> = std::result::Result<T, Error>;
