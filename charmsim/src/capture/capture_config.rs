use crate::{Emission, Event, EventType, Origin};

/// What a [`CaptureRecorder`](crate::capture::CaptureRecorder) keeps.
///
/// - type filter: when set, only emissions whose run-time type is listed are
///   kept. Default: keep every type.
/// - `include_framework`: keep the `pre_commit`/`commit` tail. Default: false.
/// - `include_deferred`: keep redeliveries of deferred events and everything
///   their observers emit. They still run either way. Default: true.
///
/// # Examples
///
/// ```rust
/// use charmsim::{StartEvent, capture::CaptureConfig};
///
/// let config = CaptureConfig::default()
///     .with_type::<StartEvent>()
///     .with_include_framework(true);
/// assert!(config.include_framework());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureConfig {
    types: Option<Vec<EventType>>,
    include_framework: bool,
    include_deferred: bool,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        CaptureConfig {
            types: None,
            include_framework: false,
            include_deferred: true,
        }
    }
}

impl CaptureConfig {
    /// Keep emissions of type `T`. Can be called repeatedly to keep several
    /// types.
    pub fn with_type<T: Event>(self) -> Self {
        self.with_types([EventType::of::<T>()])
    }

    /// Keep emissions of any of the given types.
    pub fn with_types(mut self, types: impl IntoIterator<Item = EventType>) -> Self {
        let kept = self.types.get_or_insert_with(Vec::new);
        for t in types {
            if !kept.contains(&t) {
                kept.push(t);
            }
        }
        self
    }

    pub fn with_include_framework(mut self, include: bool) -> Self {
        self.include_framework = include;
        self
    }

    pub fn with_include_deferred(mut self, include: bool) -> Self {
        self.include_deferred = include;
        self
    }

    /// The type filter, if one is set.
    pub fn types(&self) -> Option<&[EventType]> {
        self.types.as_deref()
    }

    pub fn include_framework(&self) -> bool {
        self.include_framework
    }

    pub fn include_deferred(&self) -> bool {
        self.include_deferred
    }

    /// Whether an emission belongs in the log.
    pub(crate) fn accepts(&self, emission: &Emission) -> bool {
        if self
            .types
            .as_ref()
            .is_some_and(|types| !types.contains(&emission.event_type()))
        {
            return false;
        }
        if emission.origin() == Origin::Framework && !self.include_framework {
            return false;
        }
        if emission.in_replay() && !self.include_deferred {
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::{CommitEvent, Handle, StartEvent};

    #[derive(Debug, Default)]
    struct Foo;
    impl Event for Foo {}

    fn emission(payload: Rc<dyn Event>, origin: Origin, replayed: bool) -> Emission {
        let handle = Handle::new(Rc::from("mycharm"), Rc::from("x"), 0);
        Emission::new(handle, origin, replayed, None, payload)
    }

    #[test]
    fn default_keeps_user_events_only() {
        let config = CaptureConfig::default();
        assert!(config.accepts(&emission(Rc::new(Foo), Origin::User, false)));
        assert!(config.accepts(&emission(Rc::new(Foo), Origin::User, true)));
        assert!(!config.accepts(&emission(
            Rc::new(CommitEvent),
            Origin::Framework,
            false
        )));
    }

    #[test]
    fn type_filter_applies_to_framework_events_too() {
        let config = CaptureConfig::default()
            .with_type::<Foo>()
            .with_include_framework(true);
        assert!(config.accepts(&emission(Rc::new(Foo), Origin::User, false)));
        assert!(!config.accepts(&emission(Rc::new(StartEvent), Origin::User, false)));
        assert!(!config.accepts(&emission(
            Rc::new(CommitEvent),
            Origin::Framework,
            false
        )));
    }

    #[test]
    fn excluding_deferred_drops_replays() {
        let config = CaptureConfig::default().with_include_deferred(false);
        assert!(config.accepts(&emission(Rc::new(Foo), Origin::User, false)));
        assert!(!config.accepts(&emission(Rc::new(Foo), Origin::User, true)));

        let child = emission(Rc::new(Foo), Origin::User, false).inherit_replay(true);
        assert!(!child.is_replayed());
        assert!(!config.accepts(&child));
    }

    #[test]
    fn types_accumulate_without_duplicates() {
        let config = CaptureConfig::default()
            .with_type::<Foo>()
            .with_type::<StartEvent>()
            .with_type::<Foo>();
        assert_eq!(
            config.types(),
            Some(&[EventType::of::<Foo>(), EventType::of::<StartEvent>()][..])
        );
    }
}
