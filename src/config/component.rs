// ABOUTME: Per-component configuration: commands, timeout, working directory, env.
// ABOUTME: Builds ShellComponent instances from the merged configuration.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::{Config, EnvValue, resolve_env_map};
use crate::component::ShellComponent;
use crate::error::{Error, Result};
use crate::types::ComponentName;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComponentConfig {
    pub name: ComponentName,

    pub deploy: String,

    #[serde(default)]
    pub verify: Option<String>,

    pub undo: String,

    #[serde(default, with = "humantime_serde")]
    pub timeout: Option<Duration>,

    #[serde(default)]
    pub workdir: Option<PathBuf>,

    #[serde(default)]
    pub env: HashMap<String, EnvValue>,
}

impl ComponentConfig {
    pub(crate) fn validate(&self) -> Result<()> {
        if self.deploy.trim().is_empty() {
            return Err(Error::InvalidConfig(format!(
                "component {}: deploy command cannot be empty",
                self.name
            )));
        }
        if self.undo.trim().is_empty() {
            return Err(Error::InvalidConfig(format!(
                "component {}: undo command cannot be empty",
                self.name
            )));
        }
        if self.verify.as_deref().is_some_and(|v| v.trim().is_empty()) {
            return Err(Error::InvalidConfig(format!(
                "component {}: verify command cannot be empty (omit it instead)",
                self.name
            )));
        }
        if self.timeout.is_some_and(|t| t.is_zero()) {
            return Err(Error::InvalidConfig(format!(
                "component {}: timeout must be positive",
                self.name
            )));
        }
        Ok(())
    }

    /// Effective timeout given the rollout-wide default.
    pub fn effective_timeout(&self, config: &Config) -> Duration {
        self.timeout.unwrap_or(config.timeout)
    }

    pub(crate) fn build(
        &self,
        config: &Config,
        base_env: &HashMap<String, String>,
        project_dir: &Path,
    ) -> Result<ShellComponent> {
        let mut env = base_env.clone();
        env.extend(resolve_env_map(&self.env, Some(&self.name))?);

        let workdir = match self.workdir {
            Some(ref dir) => project_dir.join(dir),
            None => project_dir.to_path_buf(),
        };

        let mut builder =
            ShellComponent::builder(self.name.clone(), self.deploy.clone(), self.undo.clone())
                .shell(config.shell.clone())
                .workdir(workdir)
                .env(env)
                .timeout(self.effective_timeout(config));

        if let Some(ref verify) = self.verify {
            builder = builder.verify(verify.clone());
        }

        Ok(builder.build())
    }

    pub(crate) fn template(name: &str) -> Result<Self> {
        Ok(ComponentConfig {
            name: super::parse_name(name)?,
            deploy: format!("./deploy/{name}/up.sh"),
            verify: Some(format!("./deploy/{name}/check.sh")),
            undo: format!("./deploy/{name}/down.sh"),
            timeout: None,
            workdir: None,
            env: HashMap::new(),
        })
    }
}
