use std::{fmt, hash};

use uuid::Uuid;

/// Identity of a single event occurrence.
///
/// Every emission gets a fresh id, and so does every
/// [`PendingEvent`](crate::PendingEvent): two deferrals of the same event
/// name are distinct occurrences and never compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, hash::Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct EventId(Uuid);

impl EventId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for EventId {
    fn from(value: Uuid) -> Self {
        EventId(value)
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for EventId {
    fn default() -> Self {
        EventId::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        assert_ne!(EventId::new(), EventId::new());
    }

    #[test]
    fn display_is_hyphenated_uuid() {
        let uuid = Uuid::from_u128(0x1234);
        let id = EventId::from(uuid);
        assert_eq!(id.to_string(), "00000000-0000-0000-0000-000000001234");
    }
}
