//! The fixed events the framework runs once at the end of every cycle.

use crate::{Event, Origin, registry::EventSource};

/// Name of the first lifecycle event.
pub const PRE_COMMIT: &str = "pre_commit";
/// Name of the last lifecycle event.
pub const COMMIT: &str = "commit";

/// Owner segment of lifecycle event handles.
pub(crate) const FRAMEWORK_OWNER: &str = "framework";

/// Runs after the triggering event and everything it caused.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct PreCommitEvent;

impl Event for PreCommitEvent {}

/// Always the last event of a cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct CommitEvent;

impl Event for CommitEvent {}

pub(crate) fn lifecycle_sources() -> Vec<EventSource> {
    vec![
        EventSource::new::<PreCommitEvent>(PRE_COMMIT, Origin::Framework),
        EventSource::new::<CommitEvent>(COMMIT, Origin::Framework),
    ]
}
