// ABOUTME: The capability contract every rollout component fulfils.
// ABOUTME: Exports the Component trait, its error type, and the shell-backed implementation.

mod error;
mod shell;

pub use error::{
    ComponentError, ComponentErrorKind, ExitSnafu, FailedSnafu, SpawnSnafu, TimeoutSnafu,
};
pub use shell::{DEFAULT_SHELL, DEFAULT_TIMEOUT, ShellComponent, ShellComponentBuilder};

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::types::ComponentName;

/// The operation a component is asked to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Deploy,
    Verify,
    Undo,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Deploy => "deploy",
            Phase::Verify => "verify",
            Phase::Undo => "undo",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A forward step whose failure triggers a rollback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailedStep {
    Deploy,
    Verify,
}

impl FailedStep {
    pub fn phase(&self) -> Phase {
        match self {
            FailedStep::Deploy => Phase::Deploy,
            FailedStep::Verify => Phase::Verify,
        }
    }
}

impl fmt::Display for FailedStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.phase().fmt(f)
    }
}

/// An independently deployable unit driven by the orchestrator.
///
/// The orchestrator never looks inside a component; it only calls these four
/// operations. `verify` is only called after `deploy`. `undo` must tolerate a
/// component left in a deploy-failed or verify-failed state.
#[async_trait]
pub trait Component: Send + Sync {
    /// Stable, unique name used for error attribution.
    fn name(&self) -> &ComponentName;

    /// Bring the component to its target version.
    async fn deploy(&self) -> Result<(), ComponentError>;

    /// Check health after a deploy.
    async fn verify(&self) -> Result<(), ComponentError>;

    /// Revert the last deploy.
    async fn undo(&self) -> Result<(), ComponentError>;
}

#[async_trait]
impl<T: Component + ?Sized> Component for &T {
    fn name(&self) -> &ComponentName {
        (**self).name()
    }

    async fn deploy(&self) -> Result<(), ComponentError> {
        (**self).deploy().await
    }

    async fn verify(&self) -> Result<(), ComponentError> {
        (**self).verify().await
    }

    async fn undo(&self) -> Result<(), ComponentError> {
        (**self).undo().await
    }
}

#[async_trait]
impl<T: Component + ?Sized> Component for Box<T> {
    fn name(&self) -> &ComponentName {
        (**self).name()
    }

    async fn deploy(&self) -> Result<(), ComponentError> {
        (**self).deploy().await
    }

    async fn verify(&self) -> Result<(), ComponentError> {
        (**self).verify().await
    }

    async fn undo(&self) -> Result<(), ComponentError> {
        (**self).undo().await
    }
}

#[async_trait]
impl<T: Component + ?Sized> Component for Arc<T> {
    fn name(&self) -> &ComponentName {
        (**self).name()
    }

    async fn deploy(&self) -> Result<(), ComponentError> {
        (**self).deploy().await
    }

    async fn verify(&self) -> Result<(), ComponentError> {
        (**self).verify().await
    }

    async fn undo(&self) -> Result<(), ComponentError> {
        (**self).undo().await
    }
}
