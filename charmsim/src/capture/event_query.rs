use std::{fmt, rc::Rc};

use crate::{
    Event, EventId, EventType, Origin,
    capture::{CapturedEvent, EventRecords},
};

type Filter = Rc<dyn Fn(&CapturedEvent) -> bool>;

/// A composable query over a [`CaptureLog`](crate::capture::CaptureLog).
///
/// Filters narrow the selection and keep log order; terminal operations
/// inspect what is left.
///
/// # Example
///
/// ```rust,ignore
/// let replayed_foos = log.query()
///     .of_type::<Foo>()
///     .replayed()
///     .count();
/// ```
#[derive(Clone)]
pub struct EventQuery {
    events: EventRecords,
    filters: Vec<Filter>,
}

impl fmt::Debug for EventQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventQuery")
            .field("records", &self.events.len())
            .field("filters", &self.filters.len())
            .finish()
    }
}

impl EventQuery {
    pub(crate) fn new(events: EventRecords) -> Self {
        Self {
            events,
            filters: Vec::new(),
        }
    }

    fn add_filter<F>(&mut self, filter: F)
    where
        F: Fn(&CapturedEvent) -> bool + 'static,
    {
        self.filters.push(Rc::new(filter));
    }

    fn apply_filters(&self) -> impl Iterator<Item = &CapturedEvent> {
        self.events
            .iter()
            .filter(|e| self.filters.iter().all(|f| f(e)))
    }

    // ==================== Terminal Operations ====================

    /// Returns the number of events matching all filters.
    pub fn count(&self) -> usize {
        self.apply_filters().count()
    }

    pub fn is_empty(&self) -> bool {
        self.apply_filters().next().is_none()
    }

    /// Returns true if any events match the filters.
    pub fn exists(&self) -> bool {
        !self.is_empty()
    }

    pub fn first(&self) -> Option<CapturedEvent> {
        self.apply_filters().next().cloned()
    }

    pub fn last(&self) -> Option<CapturedEvent> {
        self.apply_filters().last().cloned()
    }

    /// Returns the nth matching event (0-indexed), if any.
    pub fn nth(&self, index: usize) -> Option<CapturedEvent> {
        self.apply_filters().nth(index).cloned()
    }

    /// Returns all matching events in log order.
    pub fn collect(&self) -> Vec<CapturedEvent> {
        self.apply_filters().cloned().collect()
    }

    /// Returns the type names of matching events in log order.
    pub fn type_names(&self) -> Vec<&'static str> {
        self.apply_filters().map(|e| e.type_name()).collect()
    }

    /// Returns true if all matching events satisfy the predicate.
    ///
    /// Vacuously true when nothing matches.
    pub fn all(&self, predicate: impl Fn(&CapturedEvent) -> bool) -> bool {
        self.apply_filters().all(predicate)
    }

    pub fn any(&self, predicate: impl Fn(&CapturedEvent) -> bool) -> bool {
        self.apply_filters().any(predicate)
    }

    // ==================== Filter Operations ====================

    /// Filter to events whose run-time type is `T`.
    pub fn of_type<T: Event>(mut self) -> Self {
        let ty = EventType::of::<T>();
        self.add_filter(move |e| e.event_type() == ty);
        self
    }

    /// Filter to events declared under `name`.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.add_filter(move |e| e.name() == name);
        self
    }

    pub fn with_origin(mut self, origin: Origin) -> Self {
        self.add_filter(move |e| e.origin() == origin);
        self
    }

    /// Filter to redeliveries of deferred events.
    pub fn replayed(mut self) -> Self {
        self.add_filter(|e| e.is_replayed());
        self
    }

    /// Filter to events emitted for the first time in this cycle.
    pub fn fresh(mut self) -> Self {
        self.add_filter(|e| !e.is_replayed());
        self
    }

    /// Filter to events emitted by observers of the given event.
    pub fn children_of(mut self, id: impl Into<EventId>) -> Self {
        let parent_id = id.into();
        self.add_filter(move |e| e.parent_id() == Some(parent_id));
        self
    }

    /// Filter using a custom predicate.
    pub fn matching<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&CapturedEvent) -> bool + 'static,
    {
        self.add_filter(predicate);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CommitEvent, Emission, Handle, StartEvent};

    #[derive(Debug, Default)]
    struct Foo(i32);
    impl Event for Foo {}

    struct Log {
        records: Vec<CapturedEvent>,
        key: u64,
    }

    impl Log {
        fn new() -> Self {
            Self {
                records: Vec::new(),
                key: 0,
            }
        }

        fn push(
            &mut self,
            name: &str,
            origin: Origin,
            replayed: bool,
            parent: Option<EventId>,
            payload: Rc<dyn Event>,
        ) -> EventId {
            let owner = match origin {
                Origin::User => "mycharm",
                Origin::Framework => "framework",
            };
            let handle = Handle::new(Rc::from(owner), Rc::from(name), self.key);
            self.key += 1;
            let emission = Emission::new(handle, origin, replayed, parent, payload);
            self.records.push(CapturedEvent::from(&emission));
            emission.id()
        }

        fn query(self) -> EventQuery {
            EventQuery::new(Rc::new(self.records))
        }
    }

    /// foo (replayed), start, foo (child of start), commit
    fn sample() -> (EventQuery, EventId) {
        let mut log = Log::new();
        log.push("foo", Origin::User, true, None, Rc::new(Foo(1)));
        let start = log.push("start", Origin::User, false, None, Rc::new(StartEvent));
        log.push("foo", Origin::User, false, Some(start), Rc::new(Foo(2)));
        log.push("commit", Origin::Framework, false, None, Rc::new(CommitEvent));
        (log.query(), start)
    }

    #[test]
    fn count_returns_total_entries() {
        let (query, _) = sample();
        assert_eq!(query.count(), 4);
        assert!(query.exists());
    }

    #[test]
    fn is_empty_for_empty_records() {
        let query = EventQuery::new(Rc::new(Vec::new()));
        assert!(query.is_empty());
        assert!(query.first().is_none());
        assert!(query.all(|_| false));
    }

    #[test]
    fn of_type_keeps_log_order() {
        let (query, _) = sample();
        let foos = query.of_type::<Foo>().collect();
        let values: Vec<_> = foos
            .iter()
            .filter_map(|e| e.downcast_ref::<Foo>().map(|f| f.0))
            .collect();
        assert_eq!(values, [1, 2]);
    }

    #[test]
    fn replayed_and_fresh_partition_the_log() {
        let (query, _) = sample();
        assert_eq!(query.clone().replayed().count(), 1);
        assert_eq!(query.clone().fresh().count(), 3);
        assert_eq!(
            query.replayed().first().and_then(|e| e.downcast_ref::<Foo>().map(|f| f.0)),
            Some(1)
        );
    }

    #[test]
    fn children_of_follows_parent_id() {
        let (query, start) = sample();
        let children = query.children_of(start);
        assert_eq!(children.type_names(), ["Foo"]);
    }

    #[test]
    fn origin_and_name_filters_chain() {
        let (query, _) = sample();
        assert_eq!(
            query.clone().with_origin(Origin::Framework).type_names(),
            ["CommitEvent"]
        );
        assert_eq!(query.clone().named("foo").count(), 2);
        assert_eq!(query.named("foo").fresh().count(), 1);
    }

    #[test]
    fn first_last_nth() {
        let (query, _) = sample();
        assert_eq!(query.first().map(|e| e.type_name()), Some("Foo"));
        assert_eq!(query.last().map(|e| e.type_name()), Some("CommitEvent"));
        assert_eq!(query.nth(1).map(|e| e.type_name()), Some("StartEvent"));
        assert!(query.nth(4).is_none());
    }

    #[test]
    fn matching_and_predicates() {
        let (query, _) = sample();
        let big = query
            .clone()
            .matching(|e| e.downcast_ref::<Foo>().is_some_and(|f| f.0 > 1));
        assert_eq!(big.count(), 1);
        assert!(query.any(|e| e.is::<StartEvent>()));
        assert!(!query.all(|e| e.is::<Foo>()));
    }
}
