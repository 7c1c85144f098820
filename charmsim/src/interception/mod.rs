//! The low-level hook point on the dispatch path.
//!
//! Every emission is shown to the installed [`Interceptor`]s synchronously,
//! right before the first observer of that event runs. Interceptors only
//! look; they never change delivery order, delivery count or the event
//! itself.
//!
//! Interceptors are installed per thread, on a stack. Each test thread has
//! its own stack, so tests running in parallel never observe each other.
//! Installing returns an [`InterceptorGuard`] that removes the interceptor
//! when dropped, on every exit path including panics.
//!
//! # Example
//!
//! ```rust
//! use charmsim::{Emission, interception::{self, Interceptor}};
//!
//! struct PrintHandles;
//!
//! impl Interceptor for PrintHandles {
//!     fn on_emit(&self, emission: &Emission) {
//!         println!("[emit] {}", emission.handle());
//!     }
//! }
//!
//! let guard = interception::install(PrintHandles);
//! assert_eq!(interception::installed(), 1);
//! drop(guard);
//! assert_eq!(interception::installed(), 0);
//! ```

mod guard;
mod interceptor;
mod stack;

/// Identifier of an installed interceptor, unique per thread.
pub type InterceptorId = u32;

pub use guard::InterceptorGuard;
pub use interceptor::Interceptor;
pub use stack::{install, install_shared, installed};

pub(crate) use stack::notify;
