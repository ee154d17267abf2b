// AuditCrab - GPL-3.0-or-later
// This file is part of AuditCrab.
//
// Copyright (C) 2026 Daniel Freiermuth
//
// AuditCrab is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// AuditCrab is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with AuditCrab.  If not, see <https://www.gnu.org/licenses/>.

use crate::anomaly::decision::DEFAULT_CONTAMINATION;
use crate::anomaly::features::DEFAULT_ATTACK_KEYWORDS;
use crate::anomaly::forest::{EnsembleParams, DEFAULT_NUM_TREES, DEFAULT_SEED};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// Analysis parameters supplied by the deployment context
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Expected anomalous fraction; non-numeric values are ignored
    #[serde(
        deserialize_with = "lenient_fraction",
        skip_serializing_if = "Option::is_none"
    )]
    pub contamination: Option<f64>,

    pub num_trees: usize,

    pub seed: u64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub subsample_size: Option<usize>,

    /// Case-insensitive keywords that mark a message as a possible attack
    pub attack_keywords: Vec<String>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            contamination: None,
            num_trees: DEFAULT_NUM_TREES,
            seed: DEFAULT_SEED,
            subsample_size: None,
            attack_keywords: DEFAULT_ATTACK_KEYWORDS
                .iter()
                .map(|k| (*k).to_string())
                .collect(),
        }
    }
}

fn lenient_fraction<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::Number(n) => Ok(n.as_f64()),
        other => {
            tracing::warn!(
                "Ignoring non-numeric contamination {other}, using {DEFAULT_CONTAMINATION}"
            );
            Ok(None)
        }
    }
}

/// Decode `key`, treating null as absent and warning on a value of the wrong type
fn field<T: DeserializeOwned>(fields: &Map<String, Value>, key: &str) -> Option<T> {
    match fields.get(key)? {
        Value::Null => None,
        value => match T::deserialize(value) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                tracing::warn!("Ignoring config field {key:?} ({value}): {e}, using the default");
                None
            }
        },
    }
}

impl AnalysisConfig {
    /// Get the path to the default config file
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("auditcrab").join("config.json"))
    }

    /// Load config from the default location, returning defaults if not found
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => {
                tracing::info!("No config directory available, using defaults");
                Self::default()
            }
        }
    }

    /// Load config from `path`. A missing or undecodable file yields defaults;
    /// a single field of the wrong type falls back to its own default.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            tracing::info!("No config found at {path:?}, using defaults");
            return Self::default();
        }

        tracing::info!("Loading config from {path:?}");
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                tracing::warn!("Failed to read config {path:?}: {e}, using defaults");
                return Self::default();
            }
        };

        let fields = match serde_json::from_str::<Value>(&contents) {
            Ok(Value::Object(fields)) => fields,
            Ok(other) => {
                tracing::warn!("Config {path:?} is not a JSON object ({other}), using defaults");
                return Self::default();
            }
            Err(e) => {
                tracing::warn!("Failed to parse config {path:?}: {e}, using defaults");
                return Self::default();
            }
        };

        let config = Self::from_fields(&fields);
        tracing::info!(
            "Loaded config: contamination {}, {} trees, seed {}",
            config.contamination(),
            config.num_trees,
            config.seed
        );
        config
    }

    /// Decode each known field on its own so one bad value only resets itself
    fn from_fields(fields: &Map<String, Value>) -> Self {
        let defaults = Self::default();
        for key in fields.keys() {
            if !matches!(
                key.as_str(),
                "contamination" | "num_trees" | "seed" | "subsample_size" | "attack_keywords"
            ) {
                tracing::debug!("Ignoring unknown config field {key:?}");
            }
        }

        let contamination = fields
            .get("contamination")
            .cloned()
            .and_then(|value| lenient_fraction(value).ok().flatten());

        Self {
            contamination,
            num_trees: field(fields, "num_trees").unwrap_or(defaults.num_trees),
            seed: field(fields, "seed").unwrap_or(defaults.seed),
            subsample_size: field(fields, "subsample_size").or(defaults.subsample_size),
            attack_keywords: field(fields, "attack_keywords").unwrap_or(defaults.attack_keywords),
        }
    }

    /// Configured contamination, or the documented default when absent
    #[must_use]
    pub fn contamination(&self) -> f64 {
        self.contamination.unwrap_or(DEFAULT_CONTAMINATION)
    }

    #[must_use]
    pub const fn ensemble_params(&self) -> EnsembleParams {
        EnsembleParams {
            num_trees: self.num_trees,
            subsample_size: self.subsample_size,
            seed: self.seed,
        }
    }
}
