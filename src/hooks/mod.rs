// ABOUTME: Hooks system for rollout lifecycle events.
// ABOUTME: Discovers and executes scripts at pre-rollout, post-rollout, and on-error points.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

use crate::config::Config;
use crate::lock::STATE_DIR;
use crate::rollout::RolloutError;
use crate::types::ComponentName;

/// Hook execution points in the rollout lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookPoint {
    /// Before any component is touched. Failure aborts the rollout.
    PreRollout,
    /// After the rollout returned success. Failure logs warning.
    PostRollout,
    /// After the rollout returned a failure. Failure logs warning.
    OnError,
}

impl HookPoint {
    /// Get the hook filename for this point.
    pub fn filename(&self) -> &'static str {
        match self {
            HookPoint::PreRollout => "pre-rollout",
            HookPoint::PostRollout => "post-rollout",
            HookPoint::OnError => "on-error",
        }
    }

    /// Whether failure at this hook point should abort the rollout.
    pub fn is_fatal(&self) -> bool {
        matches!(self, HookPoint::PreRollout)
    }
}

/// Context passed to hooks via environment variables.
#[derive(Debug, Clone)]
pub struct HookContext {
    pub rollout: ComponentName,
    pub components: Vec<ComponentName>,
    pub host: String,
    pub destination: Option<String>,
    pub failed_component: Option<ComponentName>,
}

impl HookContext {
    pub fn new(config: &Config) -> Self {
        Self {
            rollout: config.name.clone(),
            components: config.component_names(),
            host: gethostname::gethostname().to_string_lossy().into_owned(),
            destination: config.destination.clone(),
            failed_component: None,
        }
    }

    /// Attach the component a failed rollout was attributed to.
    pub fn with_failure(mut self, error: &RolloutError) -> Self {
        self.failed_component = Some(error.component().clone());
        self
    }

    /// Convert context to environment variables.
    pub fn to_env(&self) -> HashMap<String, String> {
        let mut env = HashMap::new();
        env.insert("MARSHAL_ROLLOUT".to_string(), self.rollout.to_string());
        env.insert(
            "MARSHAL_COMPONENTS".to_string(),
            self.components
                .iter()
                .map(ComponentName::as_str)
                .collect::<Vec<_>>()
                .join(","),
        );
        env.insert("MARSHAL_HOST".to_string(), self.host.clone());
        if let Some(ref dest) = self.destination {
            env.insert("MARSHAL_DESTINATION".to_string(), dest.clone());
        }
        if let Some(ref failed) = self.failed_component {
            env.insert("MARSHAL_FAILED_COMPONENT".to_string(), failed.to_string());
        }
        env
    }
}

/// Result of running a hook.
#[derive(Debug)]
pub struct HookResult {
    pub success: bool,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

/// Discovers and runs hooks from a project directory.
pub struct HookRunner {
    hooks_dir: PathBuf,
}

impl HookRunner {
    /// Create a new hook runner looking for hooks in the given project directory.
    pub fn new(project_dir: &Path) -> Self {
        Self {
            hooks_dir: project_dir.join(STATE_DIR).join("hooks"),
        }
    }

    fn hook_path(&self, point: HookPoint) -> PathBuf {
        self.hooks_dir.join(point.filename())
    }

    /// Run a hook if it exists.
    ///
    /// Returns None if the hook doesn't exist, or Some(HookResult) if it was run.
    pub async fn run(&self, point: HookPoint, context: &HookContext) -> Option<HookResult> {
        let hook_path = self.hook_path(point);

        if !hook_path.is_file() {
            return None;
        }

        tracing::info!("Running {} hook: {}", point.filename(), hook_path.display());

        let output = Command::new(&hook_path)
            .envs(context.to_env())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await;

        match output {
            Ok(output) => {
                let result = HookResult {
                    success: output.status.success(),
                    exit_code: output.status.code(),
                    stdout: String::from_utf8_lossy(&output.stdout).to_string(),
                    stderr: String::from_utf8_lossy(&output.stderr).to_string(),
                };

                if result.success {
                    tracing::info!("{} hook completed successfully", point.filename());
                } else {
                    tracing::warn!(
                        "{} hook failed with exit code {:?}",
                        point.filename(),
                        result.exit_code
                    );
                }

                Some(result)
            }
            Err(e) => {
                tracing::error!("Failed to execute {} hook: {}", point.filename(), e);
                Some(HookResult {
                    success: false,
                    exit_code: None,
                    stdout: String::new(),
                    stderr: e.to_string(),
                })
            }
        }
    }
}
