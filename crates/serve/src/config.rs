// SPDX-License-Identifier: MIT

//! `config.json`: operator/broker runtime flags and run defaults.
//!
//! Store paths are fixed (see [`foreman_store::StorePaths`]); everything
//! configurable here is behavior, not layout. A missing file falls back to
//! built-in defaults rather than failing startup.

use crate::error::ServeResult;
use foreman_broker::BrokerConfig as RuntimeBrokerConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OperatorConfig {
    pub enabled: bool,
    pub enabled_channels: HashSet<String>,
    pub run_triggers_enabled: bool,
    pub max_sessions: usize,
    pub session_ttl_ms: u64,
    pub turn_timeout_ms: u64,
}

impl Default for OperatorConfig {
    fn default() -> Self {
        let defaults = RuntimeBrokerConfig::default();
        Self {
            enabled: defaults.enabled,
            enabled_channels: defaults.enabled_channels,
            run_triggers_enabled: defaults.run_triggers_enabled,
            max_sessions: defaults.max_sessions,
            session_ttl_ms: defaults.session_ttl.as_millis() as u64,
            turn_timeout_ms: defaults.turn_timeout.as_millis() as u64,
        }
    }
}

impl OperatorConfig {
    pub fn into_broker_config(self) -> RuntimeBrokerConfig {
        RuntimeBrokerConfig {
            enabled: self.enabled,
            enabled_channels: self.enabled_channels,
            run_triggers_enabled: self.run_triggers_enabled,
            max_sessions: self.max_sessions,
            session_ttl: Duration::from_millis(self.session_ttl_ms),
            turn_timeout: Duration::from_millis(self.turn_timeout_ms),
        }
    }
}

/// Defaults applied to a `run` request that doesn't specify them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunDefaults {
    pub provider: String,
    pub model: String,
    pub reasoning: String,
    pub max_steps: u32,
}

impl Default for RunDefaults {
    fn default() -> Self {
        Self {
            provider: "mock".to_string(),
            model: "mock-1".to_string(),
            reasoning: "standard".to_string(),
            max_steps: foreman_scheduler::DEFAULT_MAX_STEPS,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceConfig {
    pub operator: OperatorConfig,
    pub run_defaults: RunDefaults,
}

impl WorkspaceConfig {
    /// Load `path`; a missing file yields built-in defaults. A malformed
    /// file is still an error, since unlike discovery it indicates a
    /// workspace the operator actually intended to configure.
    pub fn load_or_default(path: impl AsRef<Path>) -> ServeResult<Self> {
        match std::fs::read_to_string(path) {
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(err.into()),
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> ServeResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load the workspace's effective configuration. `foreman.toml` at the
    /// repo root (checked-in, field-by-field) supplies the starting
    /// defaults; once `config.json` exists (written by `fm control
    /// operator`) it is the authoritative, fully-specified state and wins
    /// outright.
    pub fn load_layered(repo_root: impl AsRef<Path>, config_path: impl AsRef<Path>) -> ServeResult<Self> {
        let overrides = foreman_core::toml_defaults::load(repo_root.as_ref().join("foreman.toml"))?;
        let mut config = Self::default();
        if let Some(enabled) = overrides.operator.enabled {
            config.operator.enabled = enabled;
        }
        if let Some(run_triggers_enabled) = overrides.operator.run_triggers_enabled {
            config.operator.run_triggers_enabled = run_triggers_enabled;
        }
        if let Some(channels) = overrides.operator.enabled_channels {
            config.operator.enabled_channels = channels.into_iter().collect();
        }
        if let Some(provider) = overrides.run_defaults.provider {
            config.run_defaults.provider = provider;
        }
        if let Some(model) = overrides.run_defaults.model {
            config.run_defaults.model = model;
        }
        if let Some(reasoning) = overrides.run_defaults.reasoning {
            config.run_defaults.reasoning = reasoning;
        }

        match std::fs::read_to_string(config_path) {
            Ok(contents) => config = serde_json::from_str(&contents)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => return Err(err.into()),
        }
        Ok(config)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
