use crate::{Emission, Error};

/// Trait for observing emissions on the dispatch path.
///
/// All methods have default no-op implementations, so you only need to
/// override the ones you care about. Callbacks run on the dispatching thread,
/// in installation order.
///
/// # Event Lifecycle
///
/// For every emission:
/// 1. **Emit** - before any observer runs
/// 2. **Observed** - once per observer that returned `Ok`
/// 3. **Deferred** - after an observer that deferred the event
/// 4. **Error** - when an observer returns an error; dispatch stops there
///
/// An interceptor that panics is removed and the panic is logged; dispatch
/// carries on as if it had never been installed.
pub trait Interceptor {
    /// Called when an event is about to be dispatched.
    fn on_emit(&self, emission: &Emission) {
        let _e = emission;
    }

    /// Called after `observer` handled the event without error.
    fn on_observed(&self, emission: &Emission, observer: &str) {
        let _e = emission;
        let _o = observer;
    }

    /// Called after `observer` deferred the event to the next cycle.
    fn on_deferred(&self, emission: &Emission, observer: &str) {
        let _e = emission;
        let _o = observer;
    }

    /// Called when `observer` returned an error.
    fn on_error(&self, emission: &Emission, observer: &str, error: &Error) {
        let _e = emission;
        let _o = observer;
        let _r = error;
    }
}
