use crate::{Emission, Error, interception::Interceptor};

/// An interceptor that logs the event flow to the `tracing` crate.
///
/// Log levels:
/// - `trace` - observer finished
/// - `debug` - event emitted, event deferred
/// - `warn` - observer errors
///
/// # Example
///
/// ```rust
/// use charmsim::{interception, monitors::Tracer};
///
/// let guard = interception::install(Tracer);
/// // ... trigger events ...
/// drop(guard);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Tracer;

impl Interceptor for Tracer {
    fn on_emit(&self, emission: &Emission) {
        tracing::debug!(
            event_id = %emission.id(),
            handle = %emission.handle(),
            origin = %emission.origin(),
            replayed = emission.is_replayed(),
            parent_id = ?emission.parent_id(),
            event = ?emission.payload(),
            "event emitted"
        );
    }

    fn on_observed(&self, emission: &Emission, observer: &str) {
        tracing::trace!(
            handle = %emission.handle(),
            observer,
            "event observed"
        );
    }

    fn on_deferred(&self, emission: &Emission, observer: &str) {
        tracing::debug!(
            handle = %emission.handle(),
            observer,
            "event deferred"
        );
    }

    fn on_error(&self, emission: &Emission, observer: &str, error: &Error) {
        tracing::warn!(
            handle = %emission.handle(),
            observer,
            error = %error,
            "observer error"
        );
    }
}
