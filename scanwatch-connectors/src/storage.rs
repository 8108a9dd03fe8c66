//! JSON file persistence
//!
//! ## Layout
//!
//! ```text
//! <root>/
//!   logs/
//!     detection_<secs>_<mac>.json         one MAC detection
//!     triangulation_<mac>_<secs>.json     estimate + readings + analysis
//!   data/
//!     incidents/<incident_id>.json        one incident as heard
//!     officers/<officer_id>.json          full OfficerHistory
//!     patterns/accountability_report_<secs>.json
//! ```
//!
//! Ids are percent-encoded into file names, so two distinct ids never
//! share a file.
//!
//! Every file is pretty-printed JSON and overwritten in place. There are no
//! durability guarantees: a crash mid-write can leave a truncated file,
//! which later loads report as [`ConnectorError::Serialization`].

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use scanwatch_core::{
    AccountabilityReport, IncidentRecord, OfficerHistory, Timestamp, TriangulationLog,
};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::simulated::MacDetection;
use crate::{ConnectorError, ConnectorResult};

const LOGS: &str = "logs";
const INCIDENTS: &str = "data/incidents";
const OFFICERS: &str = "data/officers";
const PATTERNS: &str = "data/patterns";

/// Root of the on-disk layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataDir {
    root: PathBuf,
}

impl DataDir {
    /// Layout rooted at `root`; nothing is created until the first write
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Detection and triangulation logs
    pub fn logs_dir(&self) -> PathBuf {
        self.root.join(LOGS)
    }

    pub fn incidents_dir(&self) -> PathBuf {
        self.root.join(INCIDENTS)
    }

    pub fn officers_dir(&self) -> PathBuf {
        self.root.join(OFFICERS)
    }

    pub fn patterns_dir(&self) -> PathBuf {
        self.root.join(PATTERNS)
    }

    /// Create every directory of the layout
    pub fn ensure_layout(&self) -> ConnectorResult<()> {
        for dir in [LOGS, INCIDENTS, OFFICERS, PATTERNS] {
            let path = self.root.join(dir);
            fs::create_dir_all(&path).map_err(|e| ConnectorError::io(&path, e))?;
        }
        Ok(())
    }

    /// Where the incident with `incident_id` is stored
    pub fn incident_path(&self, incident_id: &str) -> PathBuf {
        self.incidents_dir().join(format!("{}.json", file_stem(incident_id)))
    }

    /// Write an incident under its id
    pub fn save_incident(&self, incident: &IncidentRecord) -> ConnectorResult<PathBuf> {
        let id = incident.incident_id.as_deref().ok_or_else(|| {
            ConnectorError::ConfigError("incident has no incident_id".to_string())
        })?;
        let path = self.incident_path(id);
        write_json(&path, incident)?;
        Ok(path)
    }

    /// Where the history of `officer_id` is stored
    pub fn officer_path(&self, officer_id: &str) -> PathBuf {
        self.officers_dir().join(format!("{}.json", file_stem(officer_id)))
    }

    /// `None` when the officer has never been persisted
    pub fn load_officer_history(&self, officer_id: &str) -> ConnectorResult<Option<OfficerHistory>> {
        read_json(&self.officer_path(officer_id))
    }

    /// Overwrite the officer's history file
    pub fn save_officer_history(&self, history: &OfficerHistory) -> ConnectorResult<PathBuf> {
        let path = self.officer_path(&history.officer_id);
        write_json(&path, history)?;
        Ok(path)
    }

    /// Every persisted history, ordered by file name
    pub fn load_all_officer_histories(&self) -> ConnectorResult<Vec<OfficerHistory>> {
        let dir = self.officers_dir();
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(ConnectorError::io(&dir, e)),
        };

        let mut paths = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| ConnectorError::io(&dir, e))?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                paths.push(path);
            }
        }
        paths.sort();

        let mut histories = Vec::with_capacity(paths.len());
        for path in paths {
            if let Some(history) = read_json(&path)? {
                histories.push(history);
            }
        }
        Ok(histories)
    }

    /// Assemble a report from persisted histories
    ///
    /// An officer with no file yields a report with no entries.
    pub fn build_report(&self, generated_at: Timestamp, officer_id: Option<&str>) -> ConnectorResult<AccountabilityReport> {
        let histories: Vec<OfficerHistory> = match officer_id {
            Some(id) => self.load_officer_history(id)?.into_iter().collect(),
            None => self.load_all_officer_histories()?,
        };
        Ok(AccountabilityReport::from_histories(generated_at, &histories))
    }

    /// Write under `accountability_report_<secs>.json`
    pub fn save_report(&self, report: &AccountabilityReport) -> ConnectorResult<PathBuf> {
        let path = self.patterns_dir().join(format!(
            "accountability_report_{}.json",
            report.generated_at.timestamp()
        ));
        write_json(&path, report)?;
        Ok(path)
    }

    /// Write one estimate with its readings and analysis
    pub fn save_triangulation_log(&self, log: &TriangulationLog) -> ConnectorResult<PathBuf> {
        let estimate = &log.triangulation_result;
        let path = self.logs_dir().join(format!(
            "triangulation_{}_{}.json",
            file_stem(&estimate.device_id),
            estimate.timestamp.timestamp()
        ));
        write_json(&path, log)?;
        Ok(path)
    }

    /// Write one MAC detection
    pub fn save_detection(&self, detection: &MacDetection) -> ConnectorResult<PathBuf> {
        let path = self.logs_dir().join(format!(
            "detection_{}_{}.json",
            detection.timestamp.timestamp(),
            file_stem(&detection.mac)
        ));
        write_json(&path, detection)?;
        Ok(path)
    }
}

/// Ids become file names
///
/// `[A-Za-z0-9_-]` passes through; every other UTF-8 byte becomes `%XX`.
/// The mapping is reversible, so `12:3`, `12/3` and `12-3` stay apart.
fn file_stem(id: &str) -> String {
    let mut stem = String::with_capacity(id.len());
    for byte in id.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
            stem.push(char::from(byte));
        } else {
            stem.push_str(&format!("%{byte:02X}"));
        }
    }
    stem
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> ConnectorResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| ConnectorError::io(parent, e))?;
    }
    let text = serde_json::to_string_pretty(value).map_err(|e| ConnectorError::json(path, e))?;
    fs::write(path, text).map_err(|e| ConnectorError::io(path, e))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> ConnectorResult<Option<T>> {
    match fs::read_to_string(path) {
        Ok(text) => serde_json::from_str(&text)
            .map(Some)
            .map_err(|e| ConnectorError::json(path, e)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(ConnectorError::io(path, e)),
    }
}
