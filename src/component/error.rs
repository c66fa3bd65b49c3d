// ABOUTME: Component operation error types with SNAFU pattern.
// ABOUTME: Distinguishes spawn, exit, timeout, and free-form failures.

use std::time::Duration;

use snafu::Snafu;

use super::Phase;
use crate::types::ComponentName;

/// Failure of a single deploy, verify, or undo call.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ComponentError {
    #[snafu(display("failed to start {phase} for {component}: {source}"))]
    Spawn {
        component: ComponentName,
        phase: Phase,
        source: std::io::Error,
    },

    #[snafu(display(
        "{phase} for {component} exited with {}{}",
        exit_description(*code),
        stderr_suffix(stderr)
    ))]
    Exit {
        component: ComponentName,
        phase: Phase,
        code: Option<i32>,
        stderr: String,
    },

    #[snafu(display("{phase} for {component} timed out after {after:?}"))]
    Timeout {
        component: ComponentName,
        phase: Phase,
        after: Duration,
    },

    #[snafu(display("{message}"))]
    Failed { message: String },
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentErrorKind {
    /// The operation could not be started at all.
    Spawn,
    /// The operation ran and reported failure.
    Exit,
    /// The operation exceeded its deadline.
    Timeout,
    /// Implementation-defined failure.
    Failed,
}

impl ComponentError {
    /// Free-form failure for implementations that are not process based.
    pub fn failed(message: impl Into<String>) -> Self {
        ComponentError::Failed {
            message: message.into(),
        }
    }

    /// Returns the error kind for programmatic handling.
    pub fn kind(&self) -> ComponentErrorKind {
        match self {
            ComponentError::Spawn { .. } => ComponentErrorKind::Spawn,
            ComponentError::Exit { .. } => ComponentErrorKind::Exit,
            ComponentError::Timeout { .. } => ComponentErrorKind::Timeout,
            ComponentError::Failed { .. } => ComponentErrorKind::Failed,
        }
    }
}

fn exit_description(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "no exit code (killed by signal)".to_string(),
    }
}

fn stderr_suffix(stderr: &str) -> String {
    if stderr.is_empty() {
        String::new()
    } else {
        format!(": {stderr}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name() -> ComponentName {
        ComponentName::new("db").unwrap()
    }

    #[test]
    fn failed_displays_message_verbatim() {
        let err = ComponentError::failed("disk full");
        assert_eq!(err.to_string(), "disk full");
        assert_eq!(err.kind(), ComponentErrorKind::Failed);
    }

    #[test]
    fn exit_includes_code_and_stderr() {
        let err = ComponentError::Exit {
            component: name(),
            phase: Phase::Undo,
            code: Some(3),
            stderr: "no snapshot".to_string(),
        };
        assert_eq!(err.to_string(), "undo for db exited with exit code 3: no snapshot");
        assert_eq!(err.kind(), ComponentErrorKind::Exit);
    }

    #[test]
    fn exit_without_stderr_or_code() {
        let err = ComponentError::Exit {
            component: name(),
            phase: Phase::Deploy,
            code: None,
            stderr: String::new(),
        };
        assert_eq!(
            err.to_string(),
            "deploy for db exited with no exit code (killed by signal)"
        );
    }

    #[test]
    fn timeout_kind() {
        let err = ComponentError::Timeout {
            component: name(),
            phase: Phase::Verify,
            after: Duration::from_secs(2),
        };
        assert_eq!(err.kind(), ComponentErrorKind::Timeout);
        assert_eq!(err.to_string(), "verify for db timed out after 2s");
    }
}
