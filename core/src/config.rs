//! Client configuration.
//!
//! Values come from a JSON document or from `TODO_*` environment variables;
//! anything unset falls back to the defaults below.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::coordinator::CoordinatorConfig;

pub const ENV_API_URL: &str = "TODO_API_URL";
pub const ENV_USER: &str = "TODO_USER";
pub const ENV_SERIALIZE_INTENTS: &str = "TODO_SERIALIZE_INTENTS";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the todo service.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Name of the user selected last time, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remembered_user: Option<String>,

    /// Handle one intent at a time instead of letting them overlap.
    #[serde(default)]
    pub serialize_intents: bool,
}

fn default_api_url() -> String {
    "http://127.0.0.1:3000".into()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            remembered_user: None,
            serialize_intents: false,
        }
    }
}

impl ClientConfig {
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// The JSON document `from_json` reads back.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.is_empty()) {
            config.api_url = url;
        }
        config.remembered_user = lookup(ENV_USER).filter(|v| !v.is_empty());
        if let Some(raw) = lookup(ENV_SERIALIZE_INTENTS) {
            config.serialize_intents = parse_flag(ENV_SERIALIZE_INTENTS, &raw)?;
        }
        Ok(config)
    }

    pub fn coordinator_config(&self) -> CoordinatorConfig {
        CoordinatorConfig {
            remembered_user: self.remembered_user.clone(),
            serialize_intents: self.serialize_intents,
        }
    }
}

fn parse_flag(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "" | "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: raw.to_string(),
        }),
    }
}
