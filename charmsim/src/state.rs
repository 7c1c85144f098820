use std::{borrow::Cow, collections::HashSet, fmt, hash};

use crate::{Error, EventId, Result};

/// Opaque routing key naming the observer that deferred an event.
///
/// It is the name the observer was registered under (see
/// [`Registry::observe`](crate::Registry::observe)). The harness never calls
/// it; the framework uses it to redeliver to that observer only.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, hash::Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct HandlerRef(Cow<'static, str>);

impl HandlerRef {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HandlerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for HandlerRef {
    fn from(s: &'static str) -> Self {
        Self(Cow::Borrowed(s))
    }
}

impl From<String> for HandlerRef {
    fn from(s: String) -> Self {
        Self(Cow::Owned(s))
    }
}

/// An event deferred by an observer in a previous session, waiting to be
/// redelivered to that observer.
///
/// Equality is by identity: two deferrals of the same event to the same
/// observer are distinct occurrences. Clones share identity.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PendingEvent {
    #[cfg_attr(feature = "serde", serde(default))]
    id: EventId,
    event_name: Cow<'static, str>,
    handler: HandlerRef,
}

impl PendingEvent {
    /// Record that `handler` deferred the event named `event_name`.
    pub fn deferred(
        event_name: impl Into<Cow<'static, str>>,
        handler: impl Into<HandlerRef>,
    ) -> Self {
        Self {
            id: EventId::new(),
            event_name: event_name.into(),
            handler: handler.into(),
        }
    }

    #[inline]
    pub fn id(&self) -> EventId {
        self.id
    }

    #[inline]
    pub fn event_name(&self) -> &str {
        &self.event_name
    }

    #[inline]
    pub fn handler(&self) -> &HandlerRef {
        &self.handler
    }
}

impl PartialEq for PendingEvent {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for PendingEvent {}

impl hash::Hash for PendingEvent {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for PendingEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} deferred by {}", self.event_name, self.handler)
    }
}

/// The persisted state a trigger cycle starts from.
///
/// Only the deferred-event queue is modelled. Queue order is replay order:
/// the oldest deferral comes first. The dispatcher reads a `State` and never
/// mutates it.
///
/// # Example
///
/// ```rust
/// use charmsim::{PendingEvent, State};
///
/// let state = State::new().with_deferred(PendingEvent::deferred("foo", "on_foo"));
/// assert_eq!(state.deferred().len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct State {
    #[cfg_attr(feature = "serde", serde(default))]
    deferred: Vec<PendingEvent>,
}

impl State {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a state from JSON, e.g.
    /// `{"deferred": [{"event_name": "foo", "handler": "on_foo"}]}`.
    #[cfg(feature = "serde")]
    #[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
    pub fn from_json(json: &str) -> Result<Self> {
        let state: State = serde_json::from_str(json)?;
        state.validate()?;
        Ok(state)
    }

    /// Append a pending event to the back of the queue.
    pub fn with_deferred(mut self, pending: PendingEvent) -> Self {
        self.deferred.push(pending);
        self
    }

    pub fn with_deferred_events(mut self, pending: impl IntoIterator<Item = PendingEvent>) -> Self {
        self.deferred.extend(pending);
        self
    }

    /// Pending events, oldest first.
    pub fn deferred(&self) -> &[PendingEvent] {
        &self.deferred
    }

    /// Structural checks that need no knowledge of the charm: names are
    /// non-empty and no occurrence is queued twice.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::with_capacity(self.deferred.len());
        for pending in &self.deferred {
            if pending.event_name().is_empty() {
                return Err(Error::InvalidState(format!(
                    "pending event {} has an empty event name",
                    pending.id()
                )));
            }
            if pending.handler().as_str().is_empty() {
                return Err(Error::InvalidState(format!(
                    "pending event '{}' has an empty handler reference",
                    pending.event_name()
                )));
            }
            if !seen.insert(pending.id()) {
                return Err(Error::InvalidState(format!(
                    "pending event {} is queued more than once",
                    pending.id()
                )));
            }
        }
        Ok(())
    }
}
