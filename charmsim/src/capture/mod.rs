//! Scoped capture of the events a trigger cycle emits.
//!
//! A [`CaptureRecorder`] installs an interceptor for the duration of its
//! scope and appends a [`CapturedEvent`] snapshot for every emission that
//! passes its [`CaptureConfig`]. When the scope ends the interceptor is
//! removed and the ordered [`CaptureLog`] is handed back.
//!
//! # Example
//!
//! ```rust,ignore
//! use charmsim::capture::{CaptureConfig, capture_events};
//!
//! let recorder = capture_events(CaptureConfig::default().with_include_framework(true));
//! charmsim::trigger::<MyCharm>(&State::new(), "foo", &meta)?;
//! let log = recorder.finish()?;
//!
//! assert_eq!(log.type_names(), ["Foo", "PreCommitEvent", "CommitEvent"]);
//! assert!(log[0].is::<Foo>());
//!
//! // Or query the log
//! let replayed = log.query().of_type::<Foo>().replayed().count();
//! ```
//!
//! # Note
//!
//! Captured events hold their payload in an `Rc` and are `!Send`. They are
//! meant for the single test thread that produced them.

mod capture_config;
mod capture_log;
mod captured_event;
mod collector;
mod event_query;
mod recorder;

pub use capture_config::CaptureConfig;
pub use capture_log::CaptureLog;
pub use captured_event::CapturedEvent;
pub use event_query::EventQuery;
pub use recorder::{CaptureRecorder, Captured, capture, capture_events};

pub(crate) use collector::Collector;

pub(crate) type EventRecords = std::rc::Rc<Vec<CapturedEvent>>;
