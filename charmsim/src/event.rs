use std::{
    any::{Any, TypeId},
    fmt, hash,
};

/// Marker trait for event payload types.
///
/// Each event kind a charm can observe is its own Rust type, and that type is
/// the event's run-time type: capture filters, assertions and payload
/// checks all compare [`TypeId`]s. Events declared through
/// [`Registry::event`](crate::Registry::event) must also be `Default`, so the
/// framework can rebuild them by name when redelivering a deferred event.
///
/// # Example
///
/// ```rust
/// use charmsim::Event;
///
/// #[derive(Debug, Default)]
/// struct Foo;
/// impl Event for Foo {}
/// ```
pub trait Event: AsAny + fmt::Debug {}

/// Object-safe access to the concrete type behind a `dyn Event`.
///
/// Implemented for every `'static` type and not nameable outside the crate.
pub trait AsAny: 'static {
    fn as_any(&self) -> &dyn Any;
    fn full_type_name(&self) -> &'static str;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn full_type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

impl dyn Event {
    /// Returns true if the payload is a `T`.
    pub fn is<T: Event>(&self) -> bool {
        <dyn Event as AsAny>::as_any(self).is::<T>()
    }

    /// Returns the payload as a `T`, if that is its type.
    pub fn downcast_ref<T: Event>(&self) -> Option<&T> {
        <dyn Event as AsAny>::as_any(self).downcast_ref::<T>()
    }

    /// Short name of the concrete payload type, e.g. `StartEvent`.
    pub fn type_name(&self) -> &'static str {
        short_type_name(<dyn Event as AsAny>::full_type_name(self))
    }

    /// The [`EventType`] of the concrete payload.
    pub fn event_type(&self) -> EventType {
        EventType {
            id: Any::type_id(<dyn Event as AsAny>::as_any(self)),
            name: <dyn Event>::type_name(self),
        }
    }
}

/// The run-time type of an event, used to filter captures.
///
/// Equality compares the [`TypeId`] only; the name is for display.
#[derive(Debug, Clone, Copy)]
pub struct EventType {
    id: TypeId,
    name: &'static str,
}

impl EventType {
    pub fn of<T: Event>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: short_type_name(std::any::type_name::<T>()),
        }
    }

    /// The type name without its module path, e.g. `StartEvent`.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for EventType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for EventType {}

impl hash::Hash for EventType {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Where an event kind is declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, hash::Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum Origin {
    /// Standard charm events and the charm's own custom events, including
    /// redelivered deferred events.
    User,
    /// The fixed events the framework runs at the end of every cycle
    /// (`pre_commit`, `commit`).
    Framework,
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::User => write!(f, "user"),
            Origin::Framework => write!(f, "framework"),
        }
    }
}

fn short_type_name(full: &'static str) -> &'static str {
    let head = full.split('<').next().unwrap_or(full);
    match head.rfind("::") {
        Some(idx) => &full[idx + 2..],
        None => full,
    }
}
