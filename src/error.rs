// ABOUTME: Application-wide error types for marshal.
// ABOUTME: Uses thiserror for ergonomic error handling.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::component::ComponentError;
use crate::rollout::RolloutError;
use crate::types::ComponentName;

#[derive(Debug, Error)]
pub enum Error {
    #[error("file already exists: {0}")]
    AlreadyExists(PathBuf),

    #[error("configuration file not found in {0}")]
    ConfigNotFound(PathBuf),

    #[error("unknown destination: {0}")]
    UnknownDestination(String),

    #[error(
        "missing required environment variable {var} (referenced by {key}{})",
        component_suffix(.component)
    )]
    MissingEnvVar {
        key: String,
        var: String,
        component: Option<ComponentName>,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("duplicate component name in rollout: {0}")]
    DuplicateComponent(String),

    #[error("rollout lock held by {holder} (pid {pid}) since {started_at}; use --force to break it")]
    LockHeld {
        holder: String,
        pid: u32,
        started_at: DateTime<Utc>,
    },

    #[error("lock error: {0}")]
    Lock(String),

    #[error("hook failed: {0}")]
    Hook(String),

    #[error("rollback failed for {}: {}", .0.component(), .0)]
    Rollout(#[from] RolloutError),

    #[error("rollback stopped: {0}")]
    Rollback(#[from] ComponentError),

    #[error("{0} component failure(s) absorbed by rollback")]
    AbsorbedFailures(usize),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

fn component_suffix(component: &Option<ComponentName>) -> String {
    match component {
        Some(name) => format!(" in component {name}"),
        None => String::new(),
    }
}
