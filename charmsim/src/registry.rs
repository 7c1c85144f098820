use std::{borrow::Cow, fmt, rc::Rc};

use crate::{
    Emission, Error, Event, EventType, Framework, Origin, Result, charm_events, lifecycle,
};

/// Signature of an observer: a plain function over the framework that owns
/// the charm, receiving the event being delivered.
///
/// The handler reaches its charm through [`Framework::charm_mut`] and emits
/// follow-up events through [`Framework::emit`].
pub type Handler<C> = fn(&mut Framework<C>, &Emission) -> Result<()>;

/// A declared event kind: its name, origin and how to build its payload.
#[derive(Clone)]
pub(crate) struct EventSource {
    name: Rc<str>,
    origin: Origin,
    event_type: EventType,
    build: fn() -> Rc<dyn Event>,
}

fn build_default<T: Event + Default>() -> Rc<dyn Event> {
    Rc::new(T::default())
}

impl EventSource {
    pub(crate) fn new<T: Event + Default>(name: &str, origin: Origin) -> Self {
        Self {
            name: Rc::from(name),
            origin,
            event_type: EventType::of::<T>(),
            build: build_default::<T>,
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn shared_name(&self) -> Rc<str> {
        Rc::clone(&self.name)
    }

    pub(crate) fn origin(&self) -> Origin {
        self.origin
    }

    pub(crate) fn event_type(&self) -> EventType {
        self.event_type
    }

    pub(crate) fn build(&self) -> Rc<dyn Event> {
        (self.build)()
    }
}

impl fmt::Debug for EventSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventSource")
            .field("name", &self.name)
            .field("origin", &self.origin)
            .field("event_type", &self.event_type)
            .finish()
    }
}

/// A handler bound to one event name under a routing name.
pub(crate) struct Observer<C> {
    event: Rc<str>,
    name: Cow<'static, str>,
    handler: Handler<C>,
}

impl<C> Observer<C> {
    pub(crate) fn event(&self) -> &str {
        &self.event
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn handler(&self) -> Handler<C> {
        self.handler
    }
}

impl<C> fmt::Debug for Observer<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observer")
            .field("event", &self.event)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Declarations a charm makes in [`Charm::declare`](crate::Charm::declare):
/// its custom event sources and the observers bound to events.
///
/// Standard charm events (`start`, `install`, ...) and the lifecycle events
/// (`pre_commit`, `commit`) are declared up front. Mistakes are collected and
/// reported when the framework is built, before anything is dispatched.
///
/// # Example
///
/// ```rust,ignore
/// fn declare(registry: &mut Registry<Self>) {
///     registry
///         .event::<Foo>("foo")
///         .observe("start", "on_start", Self::on_start)
///         .observe("foo", "on_foo", Self::on_foo);
/// }
/// ```
pub struct Registry<C> {
    sources: Vec<EventSource>,
    observers: Vec<Observer<C>>,
    errors: Vec<Error>,
}

impl<C> Registry<C> {
    pub(crate) fn new() -> Self {
        let mut sources = charm_events::standard_sources();
        sources.extend(lifecycle::lifecycle_sources());
        Self {
            sources,
            observers: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Declare a custom event source on the charm.
    pub fn event<T: Event + Default>(&mut self, name: &str) -> &mut Self {
        if self.source(name).is_some() {
            self.errors.push(Error::DuplicateEvent(name.to_string()));
        } else {
            self.sources.push(EventSource::new::<T>(name, Origin::User));
        }
        self
    }

    /// Bind `handler` to `event` under the routing name `name`.
    ///
    /// The name is what a [`PendingEvent`](crate::PendingEvent) refers to when
    /// it is redelivered, so it must be unique per event.
    pub fn observe(
        &mut self,
        event: &str,
        name: impl Into<Cow<'static, str>>,
        handler: Handler<C>,
    ) -> &mut Self {
        let name = name.into();
        let Some(source) = self.source(event) else {
            self.errors.push(Error::UnknownEvent(event.to_string()));
            return self;
        };
        let event = source.shared_name();
        if self
            .observers
            .iter()
            .any(|o| o.event() == &*event && o.name() == name)
        {
            self.errors.push(Error::DuplicateObserver {
                event: event.to_string(),
                observer: name.into_owned(),
            });
            return self;
        }
        self.observers.push(Observer {
            event,
            name,
            handler,
        });
        self
    }

    fn source(&self, name: &str) -> Option<&EventSource> {
        self.sources.iter().find(|s| s.name() == name)
    }

    /// Names of every declared event, standard ones included.
    pub fn event_names(&self) -> impl Iterator<Item = &str> {
        self.sources.iter().map(|s| s.name())
    }

    pub(crate) fn finish(mut self) -> Result<Declarations<C>> {
        if !self.errors.is_empty() {
            return Err(self.errors.swap_remove(0));
        }
        Ok(Declarations {
            sources: self.sources.into(),
            observers: self.observers.into(),
        })
    }
}

impl<C> fmt::Debug for Registry<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("sources", &self.sources.len())
            .field("observers", &self.observers)
            .field("errors", &self.errors)
            .finish()
    }
}

/// Frozen, validated declarations shared by a framework instance.
pub(crate) struct Declarations<C> {
    pub(crate) sources: Rc<[EventSource]>,
    pub(crate) observers: Rc<[Observer<C>]>,
}

impl<C> Declarations<C> {
    pub(crate) fn source(&self, name: &str) -> Result<&EventSource> {
        self.sources
            .iter()
            .find(|s| s.name() == name)
            .ok_or_else(|| Error::UnknownEvent(name.to_string()))
    }

    pub(crate) fn has_observer(&self, event: &str, name: &str) -> bool {
        self.observers
            .iter()
            .any(|o| o.event() == event && o.name() == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Foo;
    impl Event for Foo {}

    struct Noop;

    fn on_any(_fw: &mut Framework<Noop>, _e: &Emission) -> Result<()> {
        Ok(())
    }

    #[test]
    fn standard_and_lifecycle_events_are_predeclared() {
        let registry = Registry::<Noop>::new();
        let names: Vec<_> = registry.event_names().collect();
        assert!(names.contains(&"start"));
        assert!(names.contains(&"pre_commit"));
        assert!(names.contains(&"commit"));
    }

    #[test]
    fn custom_events_and_observers() {
        let mut registry = Registry::<Noop>::new();
        registry
            .event::<Foo>("foo")
            .observe("foo", "on_foo", on_any)
            .observe("start", "on_start", on_any);

        let declared = registry.finish().unwrap();
        assert!(declared.has_observer("foo", "on_foo"));
        assert!(declared.has_observer("start", "on_start"));
        assert!(!declared.has_observer("start", "on_foo"));
        assert_eq!(declared.source("foo").unwrap().origin(), Origin::User);
        assert_eq!(
            declared.source("commit").unwrap().origin(),
            Origin::Framework
        );
    }

    #[test]
    fn observing_unknown_event_fails_on_finish() {
        let mut registry = Registry::<Noop>::new();
        registry.observe("nope", "on_nope", on_any);
        assert_eq!(
            registry.finish().err(),
            Some(Error::UnknownEvent("nope".into()))
        );
    }

    #[test]
    fn duplicate_declarations_fail_on_finish() {
        let mut registry = Registry::<Noop>::new();
        registry.event::<Foo>("start");
        assert_eq!(
            registry.finish().err(),
            Some(Error::DuplicateEvent("start".into()))
        );

        let mut registry = Registry::<Noop>::new();
        registry
            .observe("start", "on_start", on_any)
            .observe("start", "on_start", on_any);
        assert_eq!(
            registry.finish().err(),
            Some(Error::DuplicateObserver {
                event: "start".into(),
                observer: "on_start".into(),
            })
        );
    }
}
