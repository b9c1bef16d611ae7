// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bridge configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::Result;

/// Runtime settings for the bridge and the in-memory native service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// `tracing` filter used when `RUST_LOG` is not set.
    pub log_filter: String,
    /// Worker threads for the in-memory native service's completion runtime.
    pub native_worker_threads: usize,
    /// Artificial delay before the in-memory service fires a completion.
    pub simulated_latency_ms: u64,
    /// Error delivered when an image load yields neither image nor error.
    pub image_unavailable_message: String,
    /// Error delivered when a native completion handler is dropped unfired.
    pub dropped_completion_message: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            log_filter: "info".into(),
            native_worker_threads: 2,
            simulated_latency_ms: 5,
            image_unavailable_message: "could not load image".into(),
            dropped_completion_message: "native completion handler was dropped without firing"
                .into(),
        }
    }
}

impl BridgeConfig {
    /// Read a JSON config file. Missing fields take their defaults.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&data)?;
        debug!(filter = %config.log_filter, "config loaded");
        Ok(config)
    }

    /// Read a config file, falling back to defaults if it is absent or bad.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path.as_ref()) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(
                    path = %path.as_ref().display(),
                    error = %e,
                    "config unreadable, using defaults"
                );
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_fills_defaults() {
        let config: BridgeConfig =
            serde_json::from_str(r#"{ "simulated_latency_ms": 0 }"#).expect("parse");
        assert_eq!(config.simulated_latency_ms, 0);
        assert_eq!(config.log_filter, "info");
        assert_eq!(config.native_worker_threads, 2);
    }

    #[test]
    fn load_round_trips_through_a_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("kitbridge.json");
        let config = BridgeConfig {
            log_filter: "debug".into(),
            ..Default::default()
        };
        std::fs::write(&path, serde_json::to_string_pretty(&config).expect("json"))
            .expect("write");

        assert_eq!(BridgeConfig::load(&path).expect("load"), config);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = BridgeConfig::load_or_default("/nonexistent/kitbridge.json");
        assert_eq!(config, BridgeConfig::default());
    }
}
