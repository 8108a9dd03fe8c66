//! Scanner configuration file
//!
//! Stored as pretty-printed JSON. A missing file is created with defaults on
//! first load so a fresh install runs without setup:
//!
//! ```json
//! {
//!   "scanner_frequencies": [{ "freq": "154.8000", "description": "Police Dispatch" }, ...],
//!   "location": { "latitude": 40.7128, "longitude": -74.006, "name": "Default Location" },
//!   "monitoring": { "mac_scan_interval": 30, "scanner_scan_interval": 5, "log_retention_days": 365 }
//! }
//! ```

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use scanwatch_core::Position;
use serde::{Deserialize, Serialize};

use crate::{ConnectorError, ConnectorResult};

/// One monitored scanner channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrequencyConfig {
    /// MHz, kept as text so "154.8000" round-trips exactly
    pub freq: String,
    pub description: String,
}

impl FrequencyConfig {
    fn new(freq: &str, description: &str) -> Self {
        Self {
            freq: freq.to_string(),
            description: description.to_string(),
        }
    }
}

/// Where the monitoring station sits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationConfig {
    pub latitude: f64,
    pub longitude: f64,
    pub name: String,
}

impl LocationConfig {
    pub fn position(&self) -> Position {
        Position::new(self.latitude, self.longitude)
    }
}

/// Polling cadence, all in seconds except retention
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub mac_scan_interval: u64,
    pub scanner_scan_interval: u64,
    pub log_retention_days: i64,
}

/// Full `config.json` contents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScannerConfig {
    pub scanner_frequencies: Vec<FrequencyConfig>,
    pub location: LocationConfig,
    pub monitoring: MonitoringConfig,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            scanner_frequencies: vec![
                FrequencyConfig::new("154.8000", "Police Dispatch"),
                FrequencyConfig::new("155.7750", "Police Tactical"),
                FrequencyConfig::new("460.2250", "Police Admin"),
            ],
            location: LocationConfig {
                latitude: 40.7128,
                longitude: -74.0060,
                name: "Default Location".to_string(),
            },
            monitoring: MonitoringConfig {
                mac_scan_interval: 30,
                scanner_scan_interval: 5,
                log_retention_days: 365,
            },
        }
    }
}

impl ScannerConfig {
    /// Read `path`, or write the defaults there and return them
    pub fn load_or_create(path: impl AsRef<Path>) -> ConnectorResult<Self> {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(text) => {
                let config: Self =
                    serde_json::from_str(&text).map_err(|e| ConnectorError::json(path, e))?;
                config.validate()?;
                log::debug!("Loaded configuration from {}", path.display());
                Ok(config)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                let config = Self::default();
                config.save(path)?;
                log::info!("Created default configuration at {}", path.display());
                Ok(config)
            }
            Err(e) => Err(ConnectorError::io(path, e)),
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> ConnectorResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| ConnectorError::io(parent, e))?;
        }
        let text = serde_json::to_string_pretty(self).map_err(|e| ConnectorError::json(path, e))?;
        fs::write(path, text).map_err(|e| ConnectorError::io(path, e))
    }

    /// Check the station location and intervals
    pub fn validate(&self) -> ConnectorResult<()> {
        self.location.position().validate()?;
        if self.monitoring.log_retention_days < 0 {
            return Err(ConnectorError::ConfigError(
                "log_retention_days must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}
