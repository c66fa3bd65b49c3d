// ABOUTME: Environment values handed to component commands.
// ABOUTME: Literals or references into the invoking process environment, with optional defaults.

use crate::error::{Error, Result};
use crate::types::ComponentName;
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum EnvValue {
    Literal(String),
    FromEnv {
        #[serde(rename = "env")]
        var: String,
        #[serde(default)]
        default: Option<String>,
    },
}

impl EnvValue {
    /// Resolve against the process environment.
    ///
    /// Returns None only for a reference whose variable is unset and has no default.
    pub fn resolve(&self) -> Option<String> {
        match self {
            EnvValue::Literal(s) => Some(s.clone()),
            EnvValue::FromEnv { var, default } => {
                std::env::var(var).ok().or_else(|| default.clone())
            }
        }
    }

    /// Name of the referenced process variable, if any.
    pub fn referenced_var(&self) -> Option<&str> {
        match self {
            EnvValue::Literal(_) => None,
            EnvValue::FromEnv { var, .. } => Some(var),
        }
    }
}

/// Resolve a whole env block. `component` is the owner of the block, or
/// None for the rollout-wide env; it is reported when a variable is missing.
pub fn resolve_env_map(
    map: &HashMap<String, EnvValue>,
    component: Option<&ComponentName>,
) -> Result<HashMap<String, String>> {
    map.iter()
        .map(|(key, value)| {
            value
                .resolve()
                .map(|resolved| (key.clone(), resolved))
                .ok_or_else(|| Error::MissingEnvVar {
                    key: key.clone(),
                    var: value.referenced_var().unwrap_or_default().to_string(),
                    component: component.cloned(),
                })
        })
        .collect()
}
