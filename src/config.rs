//! Run configuration loaded from JSON

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::DEFAULT_CATALOG_URL;
use crate::simulation::{ClockRange, LaunchProfile, OrbitParams};

/// Trail length used by the globe views
pub const DEFAULT_HISTORY_CAP: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    /// Simulated seconds per wall second
    pub multiplier: f64,
    /// Wall seconds per tick
    pub step_seconds: f64,
    /// Simulated seconds after which the range policy applies
    pub stop_after_seconds: Option<f64>,
    pub range: ClockRange,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            multiplier: 60.0,
            step_seconds: 1.0 / 30.0,
            stop_after_seconds: None,
            range: ClockRange::Unbounded,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LiveConfig {
    pub catalog_url: String,
    /// Read the catalog from disk instead of fetching it
    pub catalog_file: Option<PathBuf>,
    pub refresh_interval_ms: u64,
    pub max_in_flight: usize,
    pub history_cap: Option<usize>,
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self {
            catalog_url: DEFAULT_CATALOG_URL.to_string(),
            catalog_file: None,
            refresh_interval_ms: 1000,
            max_in_flight: 8,
            history_cap: Some(DEFAULT_HISTORY_CAP),
        }
    }
}

impl LiveConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub clock: ClockConfig,
    /// Single-body orbit
    pub orbit: OrbitParams,
    pub launch: LaunchProfile,
    /// `null` keeps the whole trail
    pub history_cap: Option<usize>,
    pub live: LiveConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            clock: ClockConfig::default(),
            orbit: OrbitParams::default(),
            launch: LaunchProfile::default(),
            history_cap: Some(DEFAULT_HISTORY_CAP),
            live: LiveConfig::default(),
        }
    }
}

impl SimConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.clock.multiplier.is_finite() || self.clock.multiplier < 0.0 {
            return Err(anyhow!("clock.multiplier must be >= 0"));
        }
        if !self.clock.step_seconds.is_finite() || self.clock.step_seconds <= 0.0 {
            return Err(anyhow!("clock.step_seconds must be > 0"));
        }
        if let Some(stop) = self.clock.stop_after_seconds {
            if !stop.is_finite() || stop <= 0.0 {
                return Err(anyhow!("clock.stop_after_seconds must be > 0"));
            }
        }
        self.orbit.validate().context("invalid orbit")?;
        self.launch.validate().context("invalid launch profile")?;
        if self.live.refresh_interval_ms == 0 {
            return Err(anyhow!("live.refresh_interval_ms must be > 0"));
        }
        if self.live.max_in_flight == 0 {
            return Err(anyhow!("live.max_in_flight must be > 0"));
        }
        Ok(())
    }
}

/// Load and validate a configuration file
pub fn load_config(path: impl AsRef<Path>) -> Result<SimConfig> {
    let path = path.as_ref();
    log::info!("Loading configuration from {:?}", path);

    let file =
        File::open(path).with_context(|| format!("Failed to open config file: {:?}", path))?;
    let reader = BufReader::new(file);
    let config: SimConfig = serde_json::from_reader(reader)
        .with_context(|| format!("Failed to parse config JSON: {:?}", path))?;

    config.validate()?;
    Ok(config)
}

/// Load `path` if given, defaults otherwise
pub fn load_or_default(path: Option<&Path>) -> Result<SimConfig> {
    match path {
        Some(path) => load_config(path),
        None => Ok(SimConfig::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = SimConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.history_cap, Some(100));
        assert_eq!(config.clock.multiplier, 60.0);
    }

    #[test]
    fn test_partial_file_merges_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{ "history_cap": null, "launch": { "t1": 20.0 }, "clock": { "range": "loop-stop" } }"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.history_cap, None);
        assert_eq!(config.launch.t1, 20.0);
        assert_eq!(config.launch.t2, LaunchProfile::default().t2);
        assert_eq!(config.clock.range, ClockRange::LoopStop);
        assert_eq!(config.live.max_in_flight, 8);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "launch": { "t1": 90.0, "t2": 60.0 } }"#).unwrap();
        assert!(load_config(&path).is_err());

        let mut config = SimConfig::default();
        config.live.max_in_flight = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file_is_error() {
        assert!(load_config("/nonexistent/launchtrack.json").is_err());
        assert!(load_or_default(None).is_ok());
    }
}
