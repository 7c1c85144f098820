use std::fmt;

use crate::{Charm, CharmMeta, Config, Framework, PendingEvent, Result, State};

/// Runs trigger cycles against a fresh charm instance.
///
/// One cycle is, in fixed order:
///
/// 1. every pending event of the input [`State`], oldest first, redelivered
///    to the observer that deferred it (skipped when
///    [`Config::include_deferred`] is false),
/// 2. the triggering event, with everything its observers emit dispatched
///    depth first,
/// 3. `pre_commit`, then `commit`.
///
/// The metadata, the state, the charm's declarations and every event name
/// involved are validated before the first observer runs. Observer errors
/// are not caught; they end the cycle and are returned as
/// [`Error::Handler`](crate::Error::Handler).
#[derive(Debug, Clone, Default)]
pub struct Dispatcher {
    config: Config,
}

impl Dispatcher {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Build a `C` from `meta` and run one trigger cycle of `event` on it.
    ///
    /// # Errors
    ///
    /// A configuration error (see [`Error::is_configuration`]) if anything
    /// is malformed, before any dispatch. Otherwise the first observer
    /// failure.
    ///
    /// [`Error::is_configuration`]: crate::Error::is_configuration
    pub fn trigger<C: Charm>(
        &self,
        state: &State,
        event: &str,
        meta: &CharmMeta,
    ) -> Result<Outcome<C>> {
        state.validate()?;
        let mut framework = Framework::<C>::new(meta, &self.config)?;
        framework.check_trigger(event)?;
        for pending in state.deferred() {
            framework.check_redelivery(pending)?;
        }

        let span = tracing::debug_span!(
            "trigger",
            charm = meta.name(),
            event,
            pending = state.deferred().len()
        );
        let _entered = span.enter();

        if self.config.include_deferred() {
            for pending in state.deferred() {
                framework.redeliver(pending)?;
            }
        } else if !state.deferred().is_empty() {
            tracing::debug!(
                skipped = state.deferred().len(),
                "deferred events not replayed"
            );
        }

        framework.emit(event)?;
        framework.commit()?;

        let (charm, deferred, emitted) = framework.into_parts();
        tracing::debug!(emitted, deferred = deferred.len(), "trigger cycle complete");
        Ok(Outcome {
            charm,
            deferred,
            emitted,
        })
    }
}

/// Run one trigger cycle with the default [`Config`].
///
/// # Example
///
/// ```rust
/// use charmsim::{Charm, CharmMeta, State};
///
/// struct Quiet;
///
/// impl Charm for Quiet {
///     fn new(_meta: &CharmMeta) -> Self {
///         Quiet
///     }
/// }
///
/// let outcome = charmsim::trigger::<Quiet>(&State::new(), "start", &CharmMeta::new("quiet"))?;
/// // start, pre_commit, commit
/// assert_eq!(outcome.emitted(), 3);
/// # Ok::<(), charmsim::Error>(())
/// ```
pub fn trigger<C: Charm>(state: &State, event: &str, meta: &CharmMeta) -> Result<Outcome<C>> {
    Dispatcher::default().trigger(state, event, meta)
}

/// What a completed trigger cycle left behind.
pub struct Outcome<C> {
    charm: C,
    deferred: Vec<PendingEvent>,
    emitted: u64,
}

impl<C> Outcome<C> {
    /// The charm after the cycle.
    #[inline]
    pub fn charm(&self) -> &C {
        &self.charm
    }

    #[inline]
    pub fn charm_mut(&mut self) -> &mut C {
        &mut self.charm
    }

    pub fn into_charm(self) -> C {
        self.charm
    }

    /// Events deferred during this cycle, including ones deferred again on
    /// redelivery.
    pub fn deferred(&self) -> &[PendingEvent] {
        &self.deferred
    }

    /// The state for the next cycle: this cycle's deferrals as its pending
    /// queue.
    pub fn output_state(&self) -> State {
        State::new().with_deferred_events(self.deferred.iter().cloned())
    }

    /// Number of emissions the cycle made, replayed and lifecycle ones
    /// included.
    #[inline]
    pub fn emitted(&self) -> u64 {
        self.emitted
    }
}

impl<C> fmt::Debug for Outcome<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Outcome")
            .field("charm", &std::any::type_name::<C>())
            .field("deferred", &self.deferred)
            .field("emitted", &self.emitted)
            .finish()
    }
}
