//! Host-side plumbing for Scanwatch
//!
//! ## Overview
//!
//! `scanwatch-core` never touches the filesystem or a radio. This crate holds
//! everything around it:
//!
//! | Module        | Concern                                                 |
//! |---------------|---------------------------------------------------------|
//! | [`config`]    | `config.json` with scanner frequencies and intervals    |
//! | [`storage`]   | JSON files under `logs/` and `data/`                    |
//! | [`simulated`] | Stand-in scanner and MAC sources                        |
//! | [`monitor`]   | The polling loop wiring sources, engine and storage     |
//!
//! ## Observation Sources
//!
//! A source is anything that can be polled for a batch of observations.
//! Real SDR or network scanners plug in behind [`ObservationSource`]; the
//! simulated ones return fixed data so the pipeline can be exercised end to
//! end.
//!
//! ```text
//! ObservationSource<Observation = IncidentRecord>  ──┐
//!                                                    ├─► Monitor::cycle ─► DataDir
//! ObservationSource<Observation = MacDetection>    ──┘        │
//!                                                             ├─► IncidentAggregator
//!                                                             └─► SignalStore ─► Triangulator
//! ```
//!
//! ## Example Usage
//!
//! ```no_run
//! use scanwatch_connectors::{config::ScannerConfig, monitor::Monitor, storage::DataDir};
//!
//! let config = ScannerConfig::load_or_create("config.json")?;
//! let data = DataDir::new(".");
//! let mut monitor = Monitor::new(config, data)?;
//! monitor.run(Some(3))?;
//! # Ok::<(), scanwatch_connectors::ConnectorError>(())
//! ```

pub mod config;
pub mod monitor;
pub mod simulated;
pub mod storage;

use std::path::PathBuf;

use scanwatch_core::{CoreError, Timestamp, ValidationError};
use thiserror::Error;

// Re-export common types
pub use config::ScannerConfig;
pub use monitor::{CycleSummary, Monitor};
pub use simulated::{MacDetection, SimulatedMacScanner, SimulatedScanner};
pub use storage::DataDir;

/// Common connector errors
#[derive(Debug, Error)]
pub enum ConnectorError {
    /// Filesystem access failed
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A file held JSON that does not match the expected shape
    #[error("Malformed JSON in {}: {source}", path.display())]
    Serialization {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Source '{source_name}' failed: {reason}")]
    SourceFailed { source_name: String, reason: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl ConnectorError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Serialization {
            path: path.into(),
            source,
        }
    }
}

/// Result alias for connector operations
pub type ConnectorResult<T> = Result<T, ConnectorError>;

/// Anything that can be polled for a batch of observations
pub trait ObservationSource {
    type Observation;

    /// Short name used in logs and errors
    fn name(&self) -> &str;

    /// Collect whatever has been observed; `now` stamps the batch
    fn poll(&mut self, now: Timestamp) -> ConnectorResult<Vec<Self::Observation>>;
}

impl<S: ObservationSource + ?Sized> ObservationSource for Box<S> {
    type Observation = S::Observation;

    fn name(&self) -> &str {
        (**self).name()
    }

    fn poll(&mut self, now: Timestamp) -> ConnectorResult<Vec<Self::Observation>> {
        (**self).poll(now)
    }
}
