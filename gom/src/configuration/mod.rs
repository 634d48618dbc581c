//! Logic for loading configuration in to an object model
use std::num::NonZeroUsize;
use std::str::FromStr;

use displaydoc::Display;
use schemars::JsonSchema;
use schemars::schema::RootSchema;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

/// Configuration error.
#[derive(Debug, Error, Display)]
#[non_exhaustive]
pub enum ConfigurationError {
    /// could not deserialize configuration: {0}
    DeserializeConfigError(serde_yaml::Error),
}

/// Configuration of the field wirings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields, default)]
pub struct Configuration {
    /// Request coalescing for batched fields
    pub batching: Batching,
}

#[buildstructor::buildstructor]
impl Configuration {
    #[builder]
    pub fn new(batching: Option<Batching>) -> Self {
        Self {
            batching: batching.unwrap_or_default(),
        }
    }

    /// JSON schema of the configuration file.
    pub fn schema() -> RootSchema {
        schemars::schema_for!(Configuration)
    }
}

/// Parse configuration from a string in YAML syntax
impl FromStr for Configuration {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(s).map_err(ConfigurationError::DeserializeConfigError)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields, default)]
pub struct Batching {
    /// Maximum number of argument groups of one batched field resolved at the same time during
    /// a dispatch window. Unbounded when absent.
    pub max_concurrent_groups: Option<NonZeroUsize>,
}

#[buildstructor::buildstructor]
impl Batching {
    #[builder]
    pub fn new(max_concurrent_groups: Option<NonZeroUsize>) -> Self {
        Self {
            max_concurrent_groups,
        }
    }
}
