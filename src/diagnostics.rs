// ABOUTME: Diagnostics accumulator for non-fatal warnings during a rollout.
// ABOUTME: Collects absorbed failures and housekeeping problems that don't fail the run.

use crate::component::FailedStep;
use crate::types::ComponentName;

/// Collects non-fatal warnings during rollout operations.
#[derive(Debug, Default)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    /// Record a warning, auto-logging it via tracing.
    pub fn warn(&mut self, warning: Warning) {
        tracing::warn!("{}", warning.message);
        self.warnings.push(warning);
    }

    /// Get all collected warnings.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Check if any warnings were collected.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Warnings for deploy or verify failures that a clean rollback absorbed.
    pub fn absorbed_failures(&self) -> impl Iterator<Item = &Warning> {
        self.warnings.iter().filter(|w| w.kind.is_absorbed_failure())
    }
}

/// A non-fatal warning collected during a rollout.
#[derive(Debug, Clone)]
pub struct Warning {
    pub kind: WarningKind,
    pub component: Option<ComponentName>,
    pub message: String,
}

impl Warning {
    /// A deploy or verify failure followed by a successful rollback.
    pub fn absorbed(
        component: &ComponentName,
        step: FailedStep,
        message: impl Into<String>,
    ) -> Self {
        let kind = match step {
            FailedStep::Deploy => WarningKind::DeployAbsorbed,
            FailedStep::Verify => WarningKind::VerifyAbsorbed,
        };
        Self {
            kind,
            component: Some(component.clone()),
            message: message.into(),
        }
    }

    /// Create a lock release warning.
    pub fn lock_release(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::LockRelease,
            component: None,
            message: message.into(),
        }
    }

    /// Create a non-fatal hook failure warning.
    pub fn hook(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::Hook,
            component: None,
            message: message.into(),
        }
    }
}

/// Categories of warnings that can occur during a rollout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    /// Deploy failed, rollback succeeded, rollout carried on.
    DeployAbsorbed,
    /// Verify failed, rollback succeeded, rollout carried on.
    VerifyAbsorbed,
    /// Failed to release rollout lock (lock file may remain).
    LockRelease,
    /// A post-rollout or on-error hook failed.
    Hook,
}

impl WarningKind {
    pub fn is_absorbed_failure(&self) -> bool {
        matches!(self, WarningKind::DeployAbsorbed | WarningKind::VerifyAbsorbed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostics_starts_empty() {
        let diag = Diagnostics::default();
        assert!(!diag.has_warnings());
        assert!(diag.warnings().is_empty());
    }

    #[test]
    fn diagnostics_collects_warnings() {
        let mut diag = Diagnostics::default();
        let name = ComponentName::new("cache").unwrap();

        diag.warn(Warning::absorbed(&name, FailedStep::Deploy, "deploy failed"));
        diag.warn(Warning::lock_release("failed to remove lock file"));

        assert!(diag.has_warnings());
        assert_eq!(diag.warnings().len(), 2);
        assert_eq!(diag.absorbed_failures().count(), 1);
    }

    #[test]
    fn warning_constructors_set_correct_kind() {
        let name = ComponentName::new("cache").unwrap();

        let deploy = Warning::absorbed(&name, FailedStep::Deploy, "test");
        assert_eq!(deploy.kind, WarningKind::DeployAbsorbed);
        assert_eq!(deploy.component, Some(name.clone()));

        let verify = Warning::absorbed(&name, FailedStep::Verify, "test");
        assert_eq!(verify.kind, WarningKind::VerifyAbsorbed);

        assert_eq!(Warning::lock_release("test").kind, WarningKind::LockRelease);
        assert_eq!(Warning::hook("test").kind, WarningKind::Hook);
    }
}
