// ABOUTME: Configuration types and parsing for marshal.yml.
// ABOUTME: Handles YAML parsing, env var interpolation, destination merging, and component building.

mod component;
mod deserialize;
mod env_value;
mod init;

pub use component::ComponentConfig;
pub use env_value::{EnvValue, resolve_env_map};
pub use init::init_config;

use crate::component::ShellComponent;
use crate::error::{Error, Result};
use crate::types::ComponentName;
use deserialize::deserialize_components;
use nonempty::NonEmpty;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::time::Duration;

pub const CONFIG_FILENAME: &str = "marshal.yml";
pub const CONFIG_FILENAME_ALT: &str = "marshal.yaml";
pub const CONFIG_FILENAME_DIR: &str = ".marshal/config.yml";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub name: ComponentName,

    #[serde(default = "default_shell")]
    pub shell: String,

    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,

    #[serde(default)]
    pub env: HashMap<String, EnvValue>,

    #[serde(deserialize_with = "deserialize_components")]
    pub components: NonEmpty<ComponentConfig>,

    #[serde(default)]
    pub destinations: HashMap<String, Destination>,

    /// Destination merged in by [`Config::for_destination`].
    #[serde(skip)]
    pub destination: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Destination {
    #[serde(default)]
    pub env: HashMap<String, EnvValue>,

    #[serde(default, with = "humantime_serde")]
    pub timeout: Option<Duration>,
}

fn default_shell() -> String {
    crate::component::DEFAULT_SHELL.to_string()
}

fn default_timeout() -> Duration {
    crate::component::DEFAULT_TIMEOUT
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn discover(dir: &Path) -> Result<Self> {
        let candidates = [
            dir.join(CONFIG_FILENAME),
            dir.join(CONFIG_FILENAME_ALT),
            dir.join(CONFIG_FILENAME_DIR),
        ];

        for path in &candidates {
            if path.exists() {
                tracing::debug!("Loading configuration from {}", path.display());
                return Self::load(path);
            }
        }

        Err(Error::ConfigNotFound(dir.to_path_buf()))
    }

    /// Reject configurations the orchestrator would run but should not.
    ///
    /// The orchestrator does not check for duplicate names; the config layer
    /// does, since error attribution relies on names being unique.
    pub fn validate(&self) -> Result<()> {
        if self.shell.trim().is_empty() {
            return Err(Error::InvalidConfig("shell cannot be empty".to_string()));
        }

        if self.timeout.is_zero() {
            return Err(Error::InvalidConfig("timeout must be positive".to_string()));
        }

        let mut seen = HashSet::new();
        for component in &self.components {
            if !seen.insert(component.name.as_str()) {
                return Err(Error::DuplicateComponent(component.name.to_string()));
            }
            component.validate()?;
        }

        Ok(())
    }

    pub fn for_destination(&self, name: &str) -> Result<Config> {
        let dest = self
            .destinations
            .get(name)
            .ok_or_else(|| Error::UnknownDestination(name.to_string()))?;

        let mut merged = self.clone();

        // Deep merge env
        for (k, v) in &dest.env {
            merged.env.insert(k.clone(), v.clone());
        }

        // Override default timeout if specified
        if let Some(timeout) = dest.timeout {
            merged.timeout = timeout;
        }

        merged.destination = Some(name.to_string());
        merged.validate()?;
        Ok(merged)
    }

    /// Component names in rollout order.
    pub fn component_names(&self) -> Vec<ComponentName> {
        self.components.iter().map(|c| c.name.clone()).collect()
    }

    /// Build the runnable components, in rollout order.
    ///
    /// Environment references are resolved here, against the current process
    /// environment. Relative working directories resolve against `project_dir`.
    pub fn build_components(&self, project_dir: &Path) -> Result<Vec<ShellComponent>> {
        let base_env = resolve_env_map(&self.env, None)?;

        self.components
            .iter()
            .map(|c| c.build(self, &base_env, project_dir))
            .collect()
    }

    /// Starter configuration for `marshal init`.
    pub fn template(name: &str) -> Result<Self> {
        Ok(Config {
            name: parse_name(name)?,
            shell: default_shell(),
            timeout: default_timeout(),
            env: HashMap::new(),
            components: NonEmpty {
                head: ComponentConfig::template("database")?,
                tail: vec![ComponentConfig::template("api")?],
            },
            destinations: HashMap::new(),
            destination: None,
        })
    }
}

pub(crate) fn parse_name(name: &str) -> Result<ComponentName> {
    ComponentName::new(name)
        .map_err(|e| Error::InvalidConfig(format!("invalid name '{name}': {e}")))
}
