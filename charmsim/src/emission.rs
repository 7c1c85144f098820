use std::{cell::Cell, fmt, rc::Rc};

use crate::{Event, EventId, EventType, Handle, Origin};

/// An event on its way through the dispatch path.
///
/// One `Emission` is built per emitted (or redelivered) event. It is shown to
/// interceptors before any observer runs, then handed to each observer in
/// turn. Observers call [`defer`](Self::defer) to postpone their handling to
/// the next cycle; the flag is reset before every observer.
pub struct Emission {
    id: EventId,
    handle: Handle,
    origin: Origin,
    replayed: bool,
    in_replay: bool,
    parent_id: Option<EventId>,
    payload: Rc<dyn Event>,
    deferred: Cell<bool>,
}

impl Emission {
    pub(crate) fn new(
        handle: Handle,
        origin: Origin,
        replayed: bool,
        parent_id: Option<EventId>,
        payload: Rc<dyn Event>,
    ) -> Self {
        Self {
            id: EventId::new(),
            handle,
            origin,
            replayed,
            in_replay: replayed,
            parent_id,
            payload,
            deferred: Cell::new(false),
        }
    }

    /// Mark the emission as caused, directly or not, by a redelivery.
    pub(crate) fn inherit_replay(mut self, parent_in_replay: bool) -> Self {
        self.in_replay |= parent_in_replay;
        self
    }

    #[inline]
    pub fn id(&self) -> EventId {
        self.id
    }

    #[inline]
    pub fn handle(&self) -> &Handle {
        &self.handle
    }

    /// The declared event name, e.g. `start`.
    #[inline]
    pub fn name(&self) -> &str {
        self.handle.kind()
    }

    #[inline]
    pub fn origin(&self) -> Origin {
        self.origin
    }

    /// True if this is the redelivery of an event deferred in a previous cycle.
    #[inline]
    pub fn is_replayed(&self) -> bool {
        self.replayed
    }

    /// True for a redelivery and for everything its observers emit, at any
    /// depth.
    #[inline]
    pub fn in_replay(&self) -> bool {
        self.in_replay
    }

    /// The emission whose observer emitted this one, if any.
    #[inline]
    pub fn parent_id(&self) -> Option<EventId> {
        self.parent_id
    }

    #[inline]
    pub fn payload(&self) -> &dyn Event {
        self.payload.as_ref()
    }

    pub(crate) fn shared_payload(&self) -> Rc<dyn Event> {
        Rc::clone(&self.payload)
    }

    pub fn is<T: Event>(&self) -> bool {
        self.payload.is::<T>()
    }

    pub fn downcast_ref<T: Event>(&self) -> Option<&T> {
        self.payload.downcast_ref::<T>()
    }

    pub fn event_type(&self) -> EventType {
        self.payload.event_type()
    }

    /// Postpone handling of this event by the current observer until the
    /// next trigger cycle.
    pub fn defer(&self) {
        self.deferred.set(true);
    }

    pub fn is_deferred(&self) -> bool {
        self.deferred.get()
    }

    pub(crate) fn reset_deferred(&self) {
        self.deferred.set(false);
    }
}

impl fmt::Debug for Emission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emission")
            .field("id", &self.id)
            .field("handle", &self.handle.to_string())
            .field("origin", &self.origin)
            .field("replayed", &self.replayed)
            .field("in_replay", &self.in_replay)
            .field("parent_id", &self.parent_id)
            .field("payload", &self.payload)
            .finish()
    }
}

impl fmt::Display for Emission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.handle, self.event_type())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Foo;
    impl Event for Foo {}

    fn emission() -> Emission {
        let handle = Handle::new(Rc::from("mycharm"), Rc::from("foo"), 0);
        Emission::new(handle, Origin::User, false, None, Rc::new(Foo))
    }

    #[test]
    fn defer_flag_round_trip() {
        let e = emission();
        assert!(!e.is_deferred());
        e.defer();
        assert!(e.is_deferred());
        e.reset_deferred();
        assert!(!e.is_deferred());
    }

    #[test]
    fn replay_is_inherited_but_not_reset() {
        let e = emission();
        assert!(!e.in_replay());
        let e = e.inherit_replay(true);
        assert!(e.in_replay());
        assert!(!e.is_replayed());

        let handle = Handle::new(Rc::from("mycharm"), Rc::from("foo"), 1);
        let redelivered = Emission::new(handle, Origin::User, true, None, Rc::new(Foo))
            .inherit_replay(false);
        assert!(redelivered.in_replay());
    }

    #[test]
    fn display_shows_handle_and_type() {
        let e = emission();
        assert_eq!(e.to_string(), "mycharm/on/foo[0] (Foo)");
        assert_eq!(e.name(), "foo");
        assert!(e.is::<Foo>());
    }
}
