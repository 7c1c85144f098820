use std::{fmt, ops::Deref, rc::Rc};

use crate::capture::{CapturedEvent, EventQuery, EventRecords};

/// The ordered events observed during one capture scope.
///
/// Derefs to `[CapturedEvent]`, so indexing, `len()` and `iter()` work as on
/// a slice. Cloning is cheap; clones share the same records.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct CaptureLog {
    records: EventRecords,
}

impl CaptureLog {
    pub(crate) fn new(records: Vec<CapturedEvent>) -> Self {
        Self {
            records: Rc::new(records),
        }
    }

    /// Short run-time type names in log order, e.g. `["StartEvent", "Foo"]`.
    pub fn type_names(&self) -> Vec<&'static str> {
        self.records.iter().map(|e| e.type_name()).collect()
    }

    /// Declared event names in log order, e.g. `["start", "foo"]`.
    pub fn names(&self) -> Vec<&str> {
        self.records.iter().map(|e| e.name()).collect()
    }

    /// Start a fluent query over the log.
    pub fn query(&self) -> EventQuery {
        EventQuery::new(self.records.clone())
    }

    pub fn into_vec(self) -> Vec<CapturedEvent> {
        Rc::unwrap_or_clone(self.records)
    }
}

impl Deref for CaptureLog {
    type Target = [CapturedEvent];

    fn deref(&self) -> &Self::Target {
        &self.records
    }
}

impl<'a> IntoIterator for &'a CaptureLog {
    type Item = &'a CapturedEvent;
    type IntoIter = std::slice::Iter<'a, CapturedEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl fmt::Debug for CaptureLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.records.iter()).finish()
    }
}

impl fmt::Display for CaptureLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.type_names().join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Emission, Event, Handle, Origin};

    #[derive(Debug, Default)]
    struct Foo;
    impl Event for Foo {}

    #[derive(Debug, Default)]
    struct Bar;
    impl Event for Bar {}

    fn entry(name: &str, key: u64, payload: Rc<dyn Event>) -> CapturedEvent {
        let handle = Handle::new(Rc::from("mycharm"), Rc::from(name), key);
        CapturedEvent::from(&Emission::new(handle, Origin::User, false, None, payload))
    }

    fn log() -> CaptureLog {
        CaptureLog::new(vec![
            entry("foo", 0, Rc::new(Foo)),
            entry("bar", 1, Rc::new(Bar)),
        ])
    }

    #[test]
    fn slice_access() {
        let log = log();
        assert_eq!(log.len(), 2);
        assert!(log[0].is::<Foo>());
        assert!(log[1].is::<Bar>());
        assert_eq!(log.iter().count(), 2);
        assert_eq!((&log).into_iter().count(), 2);
    }

    #[test]
    fn names_and_types_in_order() {
        let log = log();
        assert_eq!(log.names(), ["foo", "bar"]);
        assert_eq!(log.type_names(), ["Foo", "Bar"]);
        assert_eq!(log.to_string(), "[Foo, Bar]");
    }

    #[test]
    fn empty_by_default() {
        let log = CaptureLog::default();
        assert!(log.is_empty());
        assert!(log.into_vec().is_empty());
    }
}
