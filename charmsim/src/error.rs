use std::{fmt, sync::Arc};

/// The single error type for all charmsim operations.
///
/// Every fallible API returns `charmsim::Result<T>` (alias for
/// `Result<T, charmsim::Error>`). Errors fall into three families:
///
/// - **configuration** - malformed state, metadata or declarations, or an
///   unknown event name. Raised before any dispatch begins
///   (see [`Error::is_configuration`]).
/// - **handler** - an error returned by charm code while an event was being
///   observed. Never retried or swallowed (see [`Error::is_handler`]).
/// - **recorder misuse** - a [`CaptureRecorder`](crate::capture::CaptureRecorder)
///   used out of order.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    #[error("Unknown event '{0}'")]
    UnknownEvent(String),

    #[error("Event '{0}' is already declared")]
    DuplicateEvent(String),

    #[error("Event '{0}' is emitted by the framework and cannot be triggered")]
    ReservedEvent(String),

    #[error("No observer '{observer}' is registered for event '{event}'")]
    UnknownObserver { event: String, observer: String },

    #[error("Observer '{observer}' is registered twice for event '{event}'")]
    DuplicateObserver { event: String, observer: String },

    #[error("Event '{event}' expects a {expected} payload, got {found}")]
    PayloadMismatch {
        event: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Invalid charm metadata: {0}")]
    InvalidMeta(String),

    #[error("Observer '{observer}' failed on {handle}: {source}")]
    Handler {
        observer: String,
        handle: String,
        source: Box<Error>,
    },

    #[error("Nested emission depth exceeded the limit of {0}")]
    EmitDepthExceeded(usize),

    #[error("Recorder misuse: {0}")]
    RecorderMisuse(Misuse),

    #[error("External error: {0}")]
    External(#[source] Arc<dyn std::error::Error + Send + Sync>),

    #[error("IO error: {0}")]
    IoError(#[source] Arc<std::io::Error>),

    #[cfg(feature = "serde")]
    #[error("JSON error: {0}")]
    Json(#[source] Arc<serde_json::Error>),
}

impl Error {
    /// Wrap an arbitrary error, typically one raised by charm code.
    pub fn external(e: impl std::error::Error + Send + Sync + 'static) -> Self {
        Error::External(Arc::new(e))
    }

    /// True for errors detected before dispatch: bad metadata, bad state,
    /// bad declarations or an unknown event name.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::UnknownEvent(_)
                | Error::DuplicateEvent(_)
                | Error::ReservedEvent(_)
                | Error::UnknownObserver { .. }
                | Error::DuplicateObserver { .. }
                | Error::InvalidState(_)
                | Error::InvalidMeta(_)
        )
    }

    /// True if the error was raised by charm code while observing an event.
    pub fn is_handler(&self) -> bool {
        matches!(self, Error::Handler { .. })
    }

    /// For handler errors, the error the observer returned.
    pub fn handler_source(&self) -> Option<&Error> {
        match self {
            Error::Handler { source, .. } => Some(source),
            _ => None,
        }
    }

    pub(crate) fn handler(observer: &str, handle: impl fmt::Display, source: Error) -> Self {
        match source {
            already @ Error::Handler { .. } => already,
            source => Error::Handler {
                observer: observer.to_string(),
                handle: handle.to_string(),
                source: Box::new(source),
            },
        }
    }
}

/// Ways a [`CaptureRecorder`](crate::capture::CaptureRecorder) can be used out of order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Misuse {
    /// `start()` on a recorder that already started. Recorders are single-use.
    AlreadyStarted,
    /// `stop()` on a recorder that never started.
    NotStarted,
    /// `stop()` on a recorder that already stopped.
    AlreadyStopped,
    /// The log was read while the scope is still active.
    StillRecording,
}

impl fmt::Display for Misuse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Misuse::AlreadyStarted => write!(f, "recorder already started"),
            Misuse::NotStarted => write!(f, "recorder was never started"),
            Misuse::AlreadyStopped => write!(f, "recorder already stopped"),
            Misuse::StillRecording => write!(f, "capture log read before the scope completed"),
        }
    }
}

impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        use Error::*;
        match (self, other) {
            (UnknownEvent(a), UnknownEvent(b)) => a == b,
            (DuplicateEvent(a), DuplicateEvent(b)) => a == b,
            (ReservedEvent(a), ReservedEvent(b)) => a == b,
            (
                UnknownObserver {
                    event: e1,
                    observer: o1,
                },
                UnknownObserver {
                    event: e2,
                    observer: o2,
                },
            ) => e1 == e2 && o1 == o2,
            (
                DuplicateObserver {
                    event: e1,
                    observer: o1,
                },
                DuplicateObserver {
                    event: e2,
                    observer: o2,
                },
            ) => e1 == e2 && o1 == o2,
            (
                PayloadMismatch {
                    event: e1,
                    expected: x1,
                    found: f1,
                },
                PayloadMismatch {
                    event: e2,
                    expected: x2,
                    found: f2,
                },
            ) => e1 == e2 && x1 == x2 && f1 == f2,
            (InvalidState(a), InvalidState(b)) => a == b,
            (InvalidMeta(a), InvalidMeta(b)) => a == b,
            (
                Handler {
                    observer: o1,
                    handle: h1,
                    source: s1,
                },
                Handler {
                    observer: o2,
                    handle: h2,
                    source: s2,
                },
            ) => o1 == o2 && h1 == h2 && s1 == s2,
            (EmitDepthExceeded(a), EmitDepthExceeded(b)) => a == b,
            (RecorderMisuse(a), RecorderMisuse(b)) => a == b,
            (External(a), External(b)) => Arc::ptr_eq(a, b),
            (IoError(a), IoError(b)) => Arc::ptr_eq(a, b),
            #[cfg(feature = "serde")]
            (Json(a), Json(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Eq for Error {}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::IoError(Arc::new(e))
    }
}

#[cfg(feature = "serde")]
impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Json(Arc::new(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handler_errors_are_wrapped_once() {
        let inner = Error::UnknownEvent("foo".into());
        let wrapped = Error::handler("on_start", "mycharm/on/start[0]", inner.clone());
        let rewrapped = Error::handler("on_install", "mycharm/on/install[1]", wrapped.clone());

        assert_eq!(wrapped, rewrapped);
        assert_eq!(wrapped.handler_source(), Some(&inner));
        assert!(wrapped.is_handler());
        assert!(!wrapped.is_configuration());
    }

    #[test]
    fn configuration_family() {
        assert!(Error::UnknownEvent("x".into()).is_configuration());
        assert!(Error::InvalidState("x".into()).is_configuration());
        assert!(!Error::RecorderMisuse(Misuse::AlreadyStopped).is_configuration());
        assert!(!Error::EmitDepthExceeded(3).is_configuration());
    }

    #[test]
    fn external_errors_compare_by_identity() {
        let a = Error::external(std::io::Error::other("boom"));
        let b = Error::external(std::io::Error::other("boom"));
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }

    #[test]
    fn misuse_display() {
        let err = Error::RecorderMisuse(Misuse::StillRecording);
        assert_eq!(
            err.to_string(),
            "Recorder misuse: capture log read before the scope completed"
        );
    }
}
