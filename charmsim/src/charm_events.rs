//! Standard events every charm can observe without declaring them.

use crate::{Event, Origin, registry::EventSource};

macro_rules! charm_events {
    ($($(#[$doc:meta])* $ty:ident => $name:literal,)+) => {
        $(
            $(#[$doc])*
            #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
            pub struct $ty;

            impl Event for $ty {}
        )+

        /// Sources for every standard charm event, in declaration order.
        pub(crate) fn standard_sources() -> Vec<EventSource> {
            vec![$(EventSource::new::<$ty>($name, Origin::User),)+]
        }

        /// Names of the standard charm events.
        pub const STANDARD_EVENTS: &[&str] = &[$($name,)+];
    };
}

charm_events! {
    /// The charm is being installed.
    InstallEvent => "install",
    /// The charm's unit has started.
    StartEvent => "start",
    /// The charm's unit is stopping.
    StopEvent => "stop",
    /// The charm is being removed.
    RemoveEvent => "remove",
    ConfigChangedEvent => "config_changed",
    /// Periodic status check.
    UpdateStatusEvent => "update_status",
    UpgradeCharmEvent => "upgrade_charm",
    LeaderElectedEvent => "leader_elected",
    LeaderSettingsChangedEvent => "leader_settings_changed",
    CollectMetricsEvent => "collect_metrics",
}
