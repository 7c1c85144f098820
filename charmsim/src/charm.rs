use crate::{CharmMeta, Registry};

/// Trait implemented by the component under test.
///
/// A charm is built from its metadata and declares, once per framework
/// instance, the custom events it can emit and the observers bound to
/// events. Observers are plain functions taking the
/// [`Framework`](crate::Framework) that owns the charm, so they can reach the
/// charm and emit further events in the same call.
///
/// # Example
///
/// ```rust
/// use charmsim::{Charm, CharmMeta, Emission, Event, Framework, Registry, Result};
///
/// #[derive(Debug, Default)]
/// struct Foo;
/// impl Event for Foo {}
///
/// struct MyCharm {
///     started: bool,
/// }
///
/// impl MyCharm {
///     fn on_start(fw: &mut Framework<Self>, _event: &Emission) -> Result<()> {
///         fw.charm_mut().started = true;
///         fw.emit("foo")
///     }
/// }
///
/// impl Charm for MyCharm {
///     fn new(_meta: &CharmMeta) -> Self {
///         MyCharm { started: false }
///     }
///
///     fn declare(registry: &mut Registry<Self>) {
///         registry
///             .event::<Foo>("foo")
///             .observe("start", "on_start", Self::on_start);
///     }
/// }
/// ```
pub trait Charm: Sized + 'static {
    /// Build the charm instance for one trigger cycle.
    fn new(meta: &CharmMeta) -> Self;

    /// Declare custom events and observers.
    ///
    /// The default declares nothing, leaving a charm that observes no events.
    fn declare(registry: &mut Registry<Self>) {
        let _ = registry;
    }
}
