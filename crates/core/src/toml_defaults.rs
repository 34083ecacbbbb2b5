// SPDX-License-Identifier: MIT

//! Optional `foreman.toml` at the repo root: operator/run-default
//! overrides meant to be checked into version control, layered beneath
//! the mutable `config.json` the CLI writes.

use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct TomlOverrides {
    pub operator: OperatorOverrides,
    pub run_defaults: RunDefaultsOverrides,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct OperatorOverrides {
    pub enabled: Option<bool>,
    pub run_triggers_enabled: Option<bool>,
    pub enabled_channels: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RunDefaultsOverrides {
    pub provider: Option<String>,
    pub model: Option<String>,
    pub reasoning: Option<String>,
}

/// Read `path`. A missing file yields an all-`None` override set, same as
/// a missing `config.json`; a malformed file is an error.
pub fn load(path: impl AsRef<Path>) -> std::io::Result<TomlOverrides> {
    match std::fs::read_to_string(path) {
        Ok(contents) => toml::from_str(&contents).map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e)),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(TomlOverrides::default()),
        Err(err) => Err(err),
    }
}

#[cfg(test)]
#[path = "toml_defaults_tests.rs"]
mod tests;
