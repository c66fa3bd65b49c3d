// ABOUTME: Validated identifier for components and rollouts.
// ABOUTME: Restricts names to a filesystem and env-var friendly character set.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const MAX_LEN: usize = 63;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ComponentNameError {
    #[error("component name cannot be empty")]
    Empty,

    #[error("component name exceeds maximum length of 63 characters")]
    TooLong,

    #[error("component name cannot start with '{0}'")]
    BadStart(char),

    #[error("component name cannot end with '{0}'")]
    BadEnd(char),

    #[error("component name must be lowercase")]
    NotLowercase,

    #[error("invalid character in component name: '{0}'")]
    InvalidChar(char),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentName(String);

impl ComponentName {
    pub fn new(value: &str) -> Result<Self, ComponentNameError> {
        if value.is_empty() {
            return Err(ComponentNameError::Empty);
        }

        if value.len() > MAX_LEN {
            return Err(ComponentNameError::TooLong);
        }

        for c in value.chars() {
            if c.is_ascii_uppercase() {
                return Err(ComponentNameError::NotLowercase);
            }
            if !c.is_ascii_lowercase() && !c.is_ascii_digit() && c != '-' && c != '_' {
                return Err(ComponentNameError::InvalidChar(c));
            }
        }

        // Only separators remain to reject at the edges.
        if let Some(first @ ('-' | '_')) = value.chars().next() {
            return Err(ComponentNameError::BadStart(first));
        }
        if let Some(last @ ('-' | '_')) = value.chars().last() {
            return Err(ComponentNameError::BadEnd(last));
        }

        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ComponentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ComponentName {
    type Err = ComponentNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for ComponentName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for ComponentName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ComponentName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        ComponentName::new(&s).map_err(serde::de::Error::custom)
    }
}
