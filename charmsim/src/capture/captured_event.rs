use std::{fmt, rc::Rc};

use crate::{Emission, Event, EventId, EventType, Handle, Origin};

/// A snapshot of one emission, as kept in a [`CaptureLog`](crate::capture::CaptureLog).
///
/// Shares the payload with the emission it was taken from; nothing about the
/// event is changed by capturing it.
#[derive(Clone)]
pub struct CapturedEvent {
    id: EventId,
    handle: Handle,
    origin: Origin,
    replayed: bool,
    in_replay: bool,
    parent_id: Option<EventId>,
    event_type: EventType,
    payload: Rc<dyn Event>,
}

impl CapturedEvent {
    /// Returns the unique ID of the emission.
    #[inline]
    pub fn id(&self) -> EventId {
        self.id
    }

    #[inline]
    pub fn handle(&self) -> &Handle {
        &self.handle
    }

    /// The declared event name, e.g. `foo`.
    #[inline]
    pub fn name(&self) -> &str {
        self.handle.kind()
    }

    #[inline]
    pub fn origin(&self) -> Origin {
        self.origin
    }

    /// True if this was the redelivery of a deferred event.
    #[inline]
    pub fn is_replayed(&self) -> bool {
        self.replayed
    }

    /// True for a redelivery and for everything it caused.
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
    pub fn event_type(&self) -> EventType {
        self.event_type
    }

    /// Short run-time type name, e.g. `StartEvent`.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.event_type.name()
    }

    #[inline]
    pub fn payload(&self) -> &dyn Event {
        self.payload.as_ref()
    }

    /// Returns true if the run-time type of the event is `T`.
    pub fn is<T: Event>(&self) -> bool {
        self.payload.is::<T>()
    }

    pub fn downcast_ref<T: Event>(&self) -> Option<&T> {
        self.payload.downcast_ref::<T>()
    }
}

impl From<&Emission> for CapturedEvent {
    fn from(emission: &Emission) -> Self {
        Self {
            id: emission.id(),
            handle: emission.handle().clone(),
            origin: emission.origin(),
            replayed: emission.is_replayed(),
            in_replay: emission.in_replay(),
            parent_id: emission.parent_id(),
            event_type: emission.event_type(),
            payload: emission.shared_payload(),
        }
    }
}

impl PartialEq for CapturedEvent {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for CapturedEvent {}

impl fmt::Debug for CapturedEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapturedEvent")
            .field("id", &self.id)
            .field("handle", &self.handle.to_string())
            .field("type", &self.type_name())
            .field("origin", &self.origin)
            .field("replayed", &self.replayed)
            .field("in_replay", &self.in_replay)
            .field("parent_id", &self.parent_id)
            .field("payload", &self.payload)
            .finish()
    }
}

impl fmt::Display for CapturedEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.type_name(), self.handle)?;
        if self.replayed {
            write!(f, " [replayed]")?;
        }
        Ok(())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for CapturedEvent {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut s = serializer.serialize_struct("CapturedEvent", 7)?;
        s.serialize_field("id", &self.id)?;
        s.serialize_field("handle", &self.handle.to_string())?;
        s.serialize_field("type", self.type_name())?;
        s.serialize_field("origin", &self.origin)?;
        s.serialize_field("replayed", &self.replayed)?;
        s.serialize_field("in_replay", &self.in_replay)?;
        s.serialize_field("parent_id", &self.parent_id)?;
        s.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Foo(u8);
    impl Event for Foo {}

    fn captured(replayed: bool) -> CapturedEvent {
        let handle = Handle::new(Rc::from("mycharm"), Rc::from("foo"), 4);
        let emission = Emission::new(handle, Origin::User, replayed, None, Rc::new(Foo(9)));
        CapturedEvent::from(&emission)
    }

    #[test]
    fn snapshot_mirrors_emission() {
        let event = captured(false);
        assert_eq!(event.name(), "foo");
        assert_eq!(event.type_name(), "Foo");
        assert_eq!(event.origin(), Origin::User);
        assert!(event.is::<Foo>());
        assert_eq!(event.downcast_ref::<Foo>().map(|f| f.0), Some(9));
        assert_eq!(event.handle().key(), 4);
    }

    #[test]
    fn display_marks_replays() {
        assert_eq!(captured(false).to_string(), "Foo (mycharm/on/foo[4])");
        assert_eq!(
            captured(true).to_string(),
            "Foo (mycharm/on/foo[4]) [replayed]"
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serializes_without_payload() {
        let event = captured(true);
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["handle"], "mycharm/on/foo[4]");
        assert_eq!(json["type"], "Foo");
        assert_eq!(json["origin"], "user");
        assert_eq!(json["replayed"], true);
        assert_eq!(json["in_replay"], true);
        assert!(json["parent_id"].is_null());
    }
}
