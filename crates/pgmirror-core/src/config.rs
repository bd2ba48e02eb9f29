// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Mirror configuration loading from a JSON file.
//!
//! The file format matches the original tool:
//!
//! ```json
//! {
//!   "source": { "host": "...", "port": 5432, "database": "...",
//!               "user": "...", "password": "..." },
//!   "target": { "host": "...", "port": 5432, "user": "...", "password": "..." },
//!   "options": { "parallel_jobs": 4, "drop_existing": false }
//! }
//! ```
//!
//! `options` is optional; CLI flags may override it after loading.

use std::path::Path;

use serde::Deserialize;

/// Connection coordinates for one PostgreSQL server.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
}

/// The source server plus the database to dump.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    #[serde(flatten)]
    pub server: ServerConfig,
    pub database: String,
}

/// Tunables for the mirror run.
#[derive(Debug, Clone, Deserialize)]
pub struct MirrorOptions {
    /// Parallel worker jobs handed to pg_restore (`-j`).
    #[serde(default = "default_parallel_jobs")]
    pub parallel_jobs: u32,
    /// Recreate the target database if it already exists.
    #[serde(default)]
    pub drop_existing: bool,
}

impl Default for MirrorOptions {
    fn default() -> Self {
        Self {
            parallel_jobs: default_parallel_jobs(),
            drop_existing: false,
        }
    }
}

fn default_parallel_jobs() -> u32 {
    4
}

/// Full configuration for one mirror run.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MirrorConfig {
    pub source: SourceConfig,
    pub target: ServerConfig,
    #[serde(default)]
    pub options: MirrorOptions,
}

impl MirrorConfig {
    /// Reject configurations that would only fail later with a confusing
    /// tool error.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.source.server.host.is_empty() {
            return Err(ConfigError::Invalid("source.host must not be empty"));
        }
        if self.source.database.is_empty() {
            return Err(ConfigError::Invalid("source.database must not be empty"));
        }
        if self.source.server.user.is_empty() {
            return Err(ConfigError::Invalid("source.user must not be empty"));
        }
        if self.target.host.is_empty() {
            return Err(ConfigError::Invalid("target.host must not be empty"));
        }
        if self.target.user.is_empty() {
            return Err(ConfigError::Invalid("target.user must not be empty"));
        }
        if self.options.parallel_jobs == 0 {
            return Err(ConfigError::Invalid(
                "options.parallel_jobs must be at least 1",
            ));
        }
        Ok(())
    }
}

/// Load and validate a mirror configuration file.
pub fn load_config(path: &Path) -> Result<MirrorConfig, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
        path: path.display().to_string(),
        source: e,
    })?;

    let config: MirrorConfig = serde_json::from_str(&raw).map_err(|e| ConfigError::Parse {
        path: path.display().to_string(),
        source: e,
    })?;

    config.validate()?;
    Ok(config)
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("config file {path} is not valid: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
}
