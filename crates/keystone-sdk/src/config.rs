// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Framework configuration, loadable from JSON.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Errors raised while loading a [`FrameworkConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config file '{}'", path.display())]
    Io {
        /// The file that was requested.
        path: PathBuf,
        /// The underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The contents are not a valid configuration.
    #[error("invalid framework config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// What the framework does when an update callback fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Stop the frame loop; further ticks are rejected.
    #[default]
    Halt,
    /// Abandon the rest of the failing frame and keep running.
    SkipFrame,
}

/// When and whether the profile phase runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfilingConfig {
    /// Run the profile phase at all.
    pub enabled: bool,
    /// Minimum frame time between two profile passes, in milliseconds.
    pub interval_ms: u64,
}

impl ProfilingConfig {
    /// The interval as a [`Duration`].
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl Default for ProfilingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_ms: 1000,
        }
    }
}

/// Top-level framework settings.
///
/// Every field has a default, so a partial JSON document (or `{}`) is a
/// valid configuration.
///
/// ```rust
/// use keystone_sdk::config::{FailurePolicy, FrameworkConfig};
///
/// let config = FrameworkConfig::from_json_str(r#"{ "failure_policy": "skip_frame" }"#).unwrap();
/// assert_eq!(config.failure_policy, FailurePolicy::SkipFrame);
/// assert_eq!(config.log_filter, "info");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameworkConfig {
    /// Default `env_logger` filter; `RUST_LOG` overrides it.
    pub log_filter: String,
    /// Reaction to a failing update callback.
    pub failure_policy: FailurePolicy,
    /// Profile phase settings.
    pub profiling: ProfilingConfig,
    /// Upper bound applied to measured frame deltas, in milliseconds.
    pub max_frame_delta_ms: u64,
}

impl Default for FrameworkConfig {
    fn default() -> Self {
        Self {
            log_filter: "info".to_owned(),
            failure_policy: FailurePolicy::default(),
            profiling: ProfilingConfig::default(),
            max_frame_delta_ms: 250,
        }
    }
}

impl FrameworkConfig {
    /// Parses a configuration from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&contents)?;
        log::debug!("Loaded framework config from '{}'", path.display());
        Ok(config)
    }

    /// Serializes the configuration as pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// The frame delta clamp as a [`Duration`].
    pub fn max_frame_delta(&self) -> Duration {
        Duration::from_millis(self.max_frame_delta_ms)
    }
}
