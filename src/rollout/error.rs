// ABOUTME: Error returned when a rollout cannot restore a consistent state.
// ABOUTME: Carries the rollback failure message and the component it is attributed to.

use crate::component::{ComponentError, ComponentErrorKind, Phase};
use crate::types::ComponentName;

/// A rollback failed while recovering from a deploy or verify failure.
///
/// `component` is the component whose failure started the rollback, i.e. the
/// last entry of the rollback list, not necessarily the component whose undo
/// failed. The message is the undo error's message, unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct RolloutError {
    message: String,
    component: ComponentName,
    phase: Phase,
    kind: ComponentErrorKind,
}

impl RolloutError {
    pub(crate) fn rollback_failed(
        component: &ComponentName,
        phase: Phase,
        source: &ComponentError,
    ) -> Self {
        Self {
            message: source.to_string(),
            component: component.clone(),
            phase,
            kind: source.kind(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// The component the failure is attributed to.
    pub fn component(&self) -> &ComponentName {
        &self.component
    }

    /// The operation whose failure triggered the rollback.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Kind of the undo error that stopped the rollback.
    pub fn kind(&self) -> ComponentErrorKind {
        self.kind
    }
}
