use std::{fmt, rc::Rc};

use crate::{
    Charm, CharmMeta, Config, Emission, Error, Event, EventId, EventType, Handle, HandlerRef,
    Origin, PendingEvent, Result, interception, lifecycle,
    registry::{Declarations, EventSource, Observer, Registry},
};

/// The event framework that owns a charm for one trigger cycle.
///
/// It keeps the charm's declarations, assigns handles, runs the
/// interception point ahead of every delivery and records the notices
/// observers defer. Observers receive `&mut Framework<C>` and use it to
/// reach the charm ([`charm_mut`](Self::charm_mut)) and to emit events
/// ([`emit`](Self::emit)).
///
/// Emission is synchronous and depth first: when an observer emits, the new
/// event and everything it causes is fully dispatched before `emit` returns.
pub struct Framework<C> {
    charm: C,
    meta: CharmMeta,
    owner: Rc<str>,
    framework_owner: Rc<str>,
    declarations: Declarations<C>,
    max_emit_depth: usize,
    next_key: u64,
    causes: Vec<Cause>,
    notices: Vec<PendingEvent>,
}

/// An emission whose observers are running.
#[derive(Debug, Clone, Copy)]
struct Cause {
    id: EventId,
    in_replay: bool,
}

impl<C: Charm> Framework<C> {
    /// Validate the metadata and the charm's declarations, then build the
    /// charm.
    pub(crate) fn new(meta: &CharmMeta, config: &Config) -> Result<Self> {
        meta.validate()?;
        let mut registry = Registry::new();
        C::declare(&mut registry);
        let declarations = registry.finish()?;
        Ok(Self {
            charm: C::new(meta),
            meta: meta.clone(),
            owner: Rc::from(meta.name()),
            framework_owner: Rc::from(lifecycle::FRAMEWORK_OWNER),
            declarations,
            max_emit_depth: config.max_emit_depth(),
            next_key: 0,
            causes: Vec::new(),
            notices: Vec::new(),
        })
    }
}

impl<C> Framework<C> {
    #[inline]
    pub fn charm(&self) -> &C {
        &self.charm
    }

    #[inline]
    pub fn charm_mut(&mut self) -> &mut C {
        &mut self.charm
    }

    #[inline]
    pub fn meta(&self) -> &CharmMeta {
        &self.meta
    }

    /// Notices deferred so far in this cycle, in the order they were deferred.
    pub fn deferred(&self) -> &[PendingEvent] {
        &self.notices
    }

    /// Emit the event declared under `name` with its default payload.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownEvent`] for an undeclared name,
    /// [`Error::ReservedEvent`] for `pre_commit`/`commit`, or the first
    /// error returned by an observer.
    pub fn emit(&mut self, name: &str) -> Result<()> {
        let source = self.user_source(name)?.clone();
        let payload = source.build();
        self.fire(&source, payload, None)
    }

    /// Emit the event declared under `name` with a caller-built payload.
    ///
    /// # Errors
    ///
    /// As [`emit`](Self::emit), plus [`Error::PayloadMismatch`] when `T` is
    /// not the type the event was declared with.
    pub fn emit_with<T: Event>(&mut self, name: &str, payload: T) -> Result<()> {
        let source = self.user_source(name)?.clone();
        let found = EventType::of::<T>();
        if source.event_type() != found {
            return Err(Error::PayloadMismatch {
                event: name.to_string(),
                expected: source.event_type().name(),
                found: found.name(),
            });
        }
        self.fire(&source, Rc::new(payload), None)
    }

    fn user_source(&self, name: &str) -> Result<&EventSource> {
        let source = self.declarations.source(name)?;
        if source.origin() == Origin::Framework {
            return Err(Error::ReservedEvent(name.to_string()));
        }
        Ok(source)
    }

    pub(crate) fn check_trigger(&self, name: &str) -> Result<()> {
        self.user_source(name).map(|_| ())
    }

    pub(crate) fn check_redelivery(&self, pending: &PendingEvent) -> Result<()> {
        let name = pending.event_name();
        self.user_source(name)?;
        if !self
            .declarations
            .has_observer(name, pending.handler().as_str())
        {
            return Err(Error::UnknownObserver {
                event: name.to_string(),
                observer: pending.handler().to_string(),
            });
        }
        Ok(())
    }

    /// Rebuild a deferred event and deliver it to the observer that
    /// deferred it, and to no other.
    pub(crate) fn redeliver(&mut self, pending: &PendingEvent) -> Result<()> {
        self.check_redelivery(pending)?;
        let source = self.declarations.source(pending.event_name())?.clone();
        let payload = source.build();
        tracing::debug!(
            pending_id = %pending.id(),
            event = pending.event_name(),
            observer = %pending.handler(),
            "redelivering deferred event"
        );
        self.fire(&source, payload, Some(pending.handler()))
    }

    /// Run the lifecycle tail: `pre_commit`, then `commit`.
    pub(crate) fn commit(&mut self) -> Result<()> {
        for name in [lifecycle::PRE_COMMIT, lifecycle::COMMIT] {
            let source = self.declarations.source(name)?.clone();
            let payload = source.build();
            self.fire(&source, payload, None)?;
        }
        Ok(())
    }

    fn fire(
        &mut self,
        source: &EventSource,
        payload: Rc<dyn Event>,
        target: Option<&HandlerRef>,
    ) -> Result<()> {
        if self.causes.len() >= self.max_emit_depth {
            return Err(Error::EmitDepthExceeded(self.max_emit_depth));
        }

        let owner = match source.origin() {
            Origin::User => Rc::clone(&self.owner),
            Origin::Framework => Rc::clone(&self.framework_owner),
        };
        let handle = Handle::new(owner, source.shared_name(), self.next_key);
        self.next_key += 1;

        let parent = self.causes.last().copied();
        let emission = Emission::new(
            handle,
            source.origin(),
            target.is_some(),
            parent.map(|c| c.id),
            payload,
        )
        .inherit_replay(parent.is_some_and(|c| c.in_replay));
        tracing::debug!(
            handle = %emission.handle(),
            event_type = %emission.event_type(),
            origin = %emission.origin(),
            replayed = emission.is_replayed(),
            "event emitted"
        );
        interception::notify(|i| i.on_emit(&emission));

        let observers = Rc::clone(&self.declarations.observers);
        self.causes.push(Cause {
            id: emission.id(),
            in_replay: emission.in_replay(),
        });
        let result = self.deliver(&emission, &observers, target);
        self.causes.pop();
        result
    }

    fn deliver(
        &mut self,
        emission: &Emission,
        observers: &[Observer<C>],
        target: Option<&HandlerRef>,
    ) -> Result<()> {
        let selected = observers.iter().filter(|o| {
            o.event() == emission.name() && target.is_none_or(|t| t.as_str() == o.name())
        });

        for observer in selected {
            emission.reset_deferred();
            tracing::trace!(
                observer = observer.name(),
                handle = %emission.handle(),
                "observer invoked"
            );

            if let Err(e) = (observer.handler())(self, emission) {
                if !e.is_handler() {
                    tracing::warn!(
                        observer = observer.name(),
                        handle = %emission.handle(),
                        error = %e,
                        "observer failed"
                    );
                    interception::notify(|i| i.on_error(emission, observer.name(), &e));
                }
                return Err(Error::handler(observer.name(), emission.handle(), e));
            }
            interception::notify(|i| i.on_observed(emission, observer.name()));

            if emission.is_deferred() {
                tracing::debug!(
                    observer = observer.name(),
                    handle = %emission.handle(),
                    "event deferred"
                );
                interception::notify(|i| i.on_deferred(emission, observer.name()));
                self.notices.push(PendingEvent::deferred(
                    emission.name().to_string(),
                    observer.name().to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Number of emissions made so far, replayed and lifecycle ones included.
    pub fn emitted(&self) -> u64 {
        self.next_key
    }

    pub(crate) fn into_parts(self) -> (C, Vec<PendingEvent>, u64) {
        (self.charm, self.notices, self.next_key)
    }
}

impl<C> fmt::Debug for Framework<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Framework")
            .field("meta", &self.meta)
            .field("sources", &self.declarations.sources.len())
            .field("observers", &self.declarations.observers.len())
            .field("next_key", &self.next_key)
            .field("depth", &self.causes.len())
            .field("notices", &self.notices)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::{StartEvent, interception::Interceptor};

    #[derive(Debug, Default)]
    struct Foo;
    impl Event for Foo {}

    #[derive(Debug, Default)]
    struct Bar(u32);
    impl Event for Bar {}

    #[derive(Default)]
    struct Sensor {
        calls: Vec<String>,
        bar_seen: Option<u32>,
    }

    impl Sensor {
        fn on_start(fw: &mut Framework<Self>, _e: &Emission) -> Result<()> {
            fw.charm_mut().calls.push("on_start".into());
            fw.emit("foo")?;
            fw.charm_mut().calls.push("on_start:after".into());
            Ok(())
        }

        fn on_foo(fw: &mut Framework<Self>, _e: &Emission) -> Result<()> {
            fw.charm_mut().calls.push("on_foo".into());
            Ok(())
        }

        fn on_foo_again(fw: &mut Framework<Self>, e: &Emission) -> Result<()> {
            fw.charm_mut().calls.push("on_foo_again".into());
            e.defer();
            Ok(())
        }

        fn on_bar(fw: &mut Framework<Self>, e: &Emission) -> Result<()> {
            fw.charm_mut().bar_seen = e.downcast_ref::<Bar>().map(|b| b.0);
            Ok(())
        }

        fn on_install(fw: &mut Framework<Self>, _e: &Emission) -> Result<()> {
            fw.emit("install")
        }
    }

    impl Charm for Sensor {
        fn new(_meta: &CharmMeta) -> Self {
            Sensor::default()
        }

        fn declare(registry: &mut Registry<Self>) {
            registry
                .event::<Foo>("foo")
                .event::<Bar>("bar")
                .observe("start", "on_start", Self::on_start)
                .observe("foo", "on_foo", Self::on_foo)
                .observe("foo", "on_foo_again", Self::on_foo_again)
                .observe("bar", "on_bar", Self::on_bar)
                .observe("install", "on_install", Self::on_install);
        }
    }

    struct Handles(RefCell<Vec<(String, Option<EventId>, EventId)>>);

    impl Interceptor for Handles {
        fn on_emit(&self, emission: &Emission) {
            self.0.borrow_mut().push((
                emission.handle().to_string(),
                emission.parent_id(),
                emission.id(),
            ));
        }
    }

    fn framework() -> Framework<Sensor> {
        Framework::new(&CharmMeta::new("sensor"), &Config::default()).unwrap()
    }

    #[test]
    fn nested_emission_completes_before_emit_returns() {
        let mut fw = framework();
        fw.emit("start").unwrap();
        assert_eq!(
            fw.charm().calls,
            ["on_start", "on_foo", "on_foo_again", "on_start:after"]
        );
    }

    #[test]
    fn handles_and_parents_follow_causality() {
        let handles = std::rc::Rc::new(Handles(RefCell::new(Vec::new())));
        let _guard = interception::install_shared(handles.clone());

        let mut fw = framework();
        fw.emit("start").unwrap();

        let seen = handles.0.borrow();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].0, "sensor/on/start[0]");
        assert_eq!(seen[0].1, None);
        assert_eq!(seen[1].0, "sensor/on/foo[1]");
        assert_eq!(seen[1].1, Some(seen[0].2));
    }

    #[test]
    fn deferral_is_recorded_per_observer() {
        let mut fw = framework();
        fw.emit("foo").unwrap();
        assert_eq!(fw.deferred().len(), 1);
        assert_eq!(fw.deferred()[0].event_name(), "foo");
        assert_eq!(fw.deferred()[0].handler().as_str(), "on_foo_again");
    }

    #[test]
    fn redelivery_targets_one_observer() {
        let mut fw = framework();
        let pending = PendingEvent::deferred("foo", "on_foo");
        fw.redeliver(&pending).unwrap();
        assert_eq!(fw.charm().calls, ["on_foo"]);
        assert!(fw.deferred().is_empty());
    }

    struct Replays(RefCell<Vec<(String, bool, bool)>>);

    impl Interceptor for Replays {
        fn on_emit(&self, emission: &Emission) {
            self.0.borrow_mut().push((
                emission.name().to_string(),
                emission.is_replayed(),
                emission.in_replay(),
            ));
        }
    }

    #[test]
    fn emissions_caused_by_a_redelivery_are_in_replay() {
        let seen = std::rc::Rc::new(Replays(RefCell::new(Vec::new())));
        let _guard = interception::install_shared(seen.clone());

        let mut fw = framework();
        fw.redeliver(&PendingEvent::deferred("start", "on_start"))
            .unwrap();
        fw.emit("start").unwrap();

        assert_eq!(
            *seen.0.borrow(),
            [
                ("start".to_string(), true, true),
                ("foo".to_string(), false, true),
                ("start".to_string(), false, false),
                ("foo".to_string(), false, false),
            ]
        );
    }

    #[test]
    fn redelivery_to_unknown_observer_fails() {
        let mut fw = framework();
        let pending = PendingEvent::deferred("foo", "on_missing");
        assert_eq!(
            fw.redeliver(&pending),
            Err(Error::UnknownObserver {
                event: "foo".into(),
                observer: "on_missing".into(),
            })
        );
        assert_eq!(fw.emitted(), 0);
    }

    #[test]
    fn lifecycle_events_are_reserved() {
        let mut fw = framework();
        assert_eq!(fw.emit("commit"), Err(Error::ReservedEvent("commit".into())));
        assert_eq!(
            fw.emit("pre_commit"),
            Err(Error::ReservedEvent("pre_commit".into()))
        );
        assert_eq!(fw.emit("nope"), Err(Error::UnknownEvent("nope".into())));
    }

    #[test]
    fn commit_runs_both_lifecycle_events() {
        let mut fw = framework();
        fw.commit().unwrap();
        assert_eq!(fw.emitted(), 2);
    }

    #[test]
    fn emit_with_checks_payload_type() {
        let mut fw = framework();
        fw.emit_with("bar", Bar(42)).unwrap();
        assert_eq!(fw.charm().bar_seen, Some(42));

        assert_eq!(
            fw.emit_with("bar", StartEvent),
            Err(Error::PayloadMismatch {
                event: "bar".into(),
                expected: "Bar",
                found: "StartEvent",
            })
        );
    }

    #[test]
    fn runaway_emission_hits_depth_limit() {
        let config = Config::default().with_max_emit_depth(8);
        let mut fw = Framework::<Sensor>::new(&CharmMeta::new("sensor"), &config).unwrap();

        let err = fw.emit("install").unwrap_err();
        assert!(err.is_handler());
        assert_eq!(err.handler_source(), Some(&Error::EmitDepthExceeded(8)));
    }

    #[test]
    fn invalid_meta_is_rejected() {
        let result = Framework::<Sensor>::new(&CharmMeta::new("Sensor"), &Config::default());
        assert!(matches!(result, Err(Error::InvalidMeta(_))));
    }
}
