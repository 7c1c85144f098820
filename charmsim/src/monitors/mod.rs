//! Ready-to-use interceptors.
//!
//! Concrete [`Interceptor`](crate::interception::Interceptor) implementations
//! for watching a trigger cycle without writing one yourself.
//!
//! # Available Interceptors
//!
//! - [`Tracer`] - Logs the event flow via the `tracing` crate
//! - [`JsonLinesRecorder`] - Writes emissions to a JSON Lines file (requires `recorder` feature)
//!
//! # Example
//!
//! ```rust
//! use charmsim::{interception, monitors::Tracer};
//!
//! let _guard = interception::install(Tracer);
//! ```

mod tracer;
pub use tracer::Tracer;

#[cfg(feature = "recorder")]
mod recorder;

#[cfg(feature = "recorder")]
#[cfg_attr(docsrs, doc(cfg(feature = "recorder")))]
pub use recorder::JsonLinesRecorder;
