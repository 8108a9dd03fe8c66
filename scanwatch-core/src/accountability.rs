//! Incident History Aggregation and Accountability Flags
//!
//! ## Overview
//!
//! Every incident heard on the scanner that names an officer is appended to
//! that officer's [`OfficerHistory`]. After each append the history's
//! [`PatternSummary`] is rebuilt from scratch and the flag rules run:
//!
//! ```text
//! record_incident(incident)
//!     │
//!     ├─ officer_id missing/blank ──► IncidentDropped, no history touched
//!     │
//!     ├─ history = histories[officer_id] (created empty on first sight)
//!     ├─ history.incidents.push(incident)
//!     ├─ history.patterns = PatternSummary::from_incidents(.., now)
//!     └─ total_incidents > 50 ──► push high_activity flag
//! ```
//!
//! ## Pattern Summary
//!
//! | Field                  | Meaning                                            |
//! |------------------------|----------------------------------------------------|
//! | `total_incidents`      | length of the history                              |
//! | `incident_type_counts` | type → count, only for types that occur            |
//! | `recent_activity`      | incidents whose age in whole days is at most 30    |
//!
//! The summary is a pure function of the incident list and "now", so it can
//! always be rebuilt from a persisted history.
//!
//! ## Flag Accumulation
//!
//! Flags are append-only. Under the default [`FlagMode::EveryRecord`] a
//! `high_activity` flag is appended on *every* record while the officer is
//! over the threshold: the 51st incident adds one flag, the 52nd a second,
//! and so on. Hosts that want a single marker per officer can select
//! [`FlagMode::OncePerKind`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::constants::accountability::{
    HIGH_ACTIVITY_DESCRIPTION, HIGH_ACTIVITY_THRESHOLD, RECENT_ACTIVITY_WINDOW_DAYS,
};
use crate::events::{CoreEvent, EventSink, LogSink};
use crate::time::{whole_days_between, SystemTime, TimeSource, Timestamp};

/// A transmission attributed (or not) to an officer
///
/// Only `officer_id`, `incident_type` and `timestamp` drive aggregation; the
/// remaining fields are carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncidentRecord {
    /// When the transmission was heard
    pub timestamp: Timestamp,

    /// Officer named in the transmission; blank counts as absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub officer_id: Option<String>,

    /// Category such as "traffic_stop"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incident_type: Option<String>,

    /// Assigned by whoever persists the incident
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incident_id: Option<String>,

    /// Scanner frequency in MHz, as displayed (e.g. "154.8000")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<String>,

    /// Channel label (e.g. "Police Dispatch")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,

    /// Transcribed transmission text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transmission: Option<String>,

    /// Free-text location mentioned in the transmission
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    /// Received strength in dBm
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signal_strength: Option<f64>,
}

impl IncidentRecord {
    /// Bare record with only a timestamp
    pub fn new(timestamp: Timestamp) -> Self {
        Self {
            timestamp,
            officer_id: None,
            incident_type: None,
            incident_id: None,
            frequency: None,
            channel: None,
            transmission: None,
            location: None,
            signal_strength: None,
        }
    }

    /// Attribute to `officer_id`
    pub fn with_officer(mut self, officer_id: impl Into<String>) -> Self {
        self.officer_id = Some(officer_id.into());
        self
    }

    /// Set the incident category
    pub fn with_type(mut self, incident_type: impl Into<String>) -> Self {
        self.incident_type = Some(incident_type.into());
        self
    }

    /// Officer id if present and non-blank
    pub fn attributed_officer(&self) -> Option<&str> {
        self.officer_id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
    }
}

/// Statistics derived from an officer's incidents
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternSummary {
    /// Length of the history
    pub total_incidents: usize,
    /// Type → count, only for types that occur
    pub incident_type_counts: BTreeMap<String, usize>,
    /// Incidents inside the recent-activity window
    pub recent_activity: usize,
}

impl PatternSummary {
    /// Rebuild the summary from the full incident list
    pub fn from_incidents(incidents: &[IncidentRecord], now: Timestamp, window_days: i64) -> Self {
        let mut incident_type_counts = BTreeMap::new();
        for kind in incidents
            .iter()
            .filter_map(|inc| inc.incident_type.as_deref())
            .filter(|kind| !kind.is_empty())
        {
            *incident_type_counts.entry(kind.to_string()).or_insert(0) += 1;
        }

        let recent_activity = incidents
            .iter()
            .filter(|inc| whole_days_between(inc.timestamp, now) <= window_days)
            .count();

        Self {
            total_incidents: incidents.len(),
            incident_type_counts,
            recent_activity,
        }
    }
}

/// Kinds of accountability flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagKind {
    /// Incident count above the activity threshold
    HighActivity,
}

impl FlagKind {
    /// Serialized name
    pub const fn as_str(&self) -> &'static str {
        match self {
            FlagKind::HighActivity => "high_activity",
        }
    }
}

/// A raised flag; never removed once recorded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountabilityFlag {
    /// What was detected
    pub flag: FlagKind,
    /// When the flag was raised
    pub timestamp: Timestamp,
    /// Human-readable explanation
    pub description: String,
}

/// Everything known about one officer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfficerHistory {
    /// Officer this history belongs to
    pub officer_id: String,
    /// Arrival order
    pub incidents: Vec<IncidentRecord>,
    /// Rebuilt after every append
    #[serde(default)]
    pub patterns: PatternSummary,
    /// Append-only
    #[serde(default)]
    pub accountability_flags: Vec<AccountabilityFlag>,
}

impl OfficerHistory {
    /// Empty history
    pub fn new(officer_id: impl Into<String>) -> Self {
        Self {
            officer_id: officer_id.into(),
            incidents: Vec::new(),
            patterns: PatternSummary::default(),
            accountability_flags: Vec::new(),
        }
    }

    /// Flags of one kind, oldest first
    pub fn flags_of(&self, kind: FlagKind) -> impl Iterator<Item = &AccountabilityFlag> {
        self.accountability_flags.iter().filter(move |f| f.flag == kind)
    }

    /// True if any flag of `kind` was ever raised
    pub fn has_flag(&self, kind: FlagKind) -> bool {
        self.flags_of(kind).next().is_some()
    }
}

/// How repeated threshold crossings are recorded
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FlagMode {
    /// Append a flag on every record while the threshold holds
    #[default]
    EveryRecord,
    /// Append at most one flag of each kind per officer
    OncePerKind,
}

/// Thresholds for pattern analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountabilityPolicy {
    /// Flag when the incident count is strictly above this
    pub high_activity_threshold: usize,
    /// Inclusive recent-activity window in whole days
    pub recent_window_days: i64,
    /// Whether flags repeat while over the threshold
    pub flag_mode: FlagMode,
}

impl Default for AccountabilityPolicy {
    fn default() -> Self {
        Self {
            high_activity_threshold: HIGH_ACTIVITY_THRESHOLD,
            recent_window_days: RECENT_ACTIVITY_WINDOW_DAYS,
            flag_mode: FlagMode::EveryRecord,
        }
    }
}

/// Per-officer incident aggregator
pub struct IncidentAggregator<C: TimeSource = SystemTime> {
    histories: BTreeMap<String, OfficerHistory>,
    policy: AccountabilityPolicy,
    clock: C,
    sink: Box<dyn EventSink>,
}

impl IncidentAggregator<SystemTime> {
    /// Aggregator on the system clock, logging through `log`
    pub fn new() -> Self {
        Self::with_clock(SystemTime)
    }
}

impl Default for IncidentAggregator<SystemTime> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: TimeSource> IncidentAggregator<C> {
    /// Empty aggregator on `clock` with the default policy
    pub fn with_clock(clock: C) -> Self {
        Self {
            histories: BTreeMap::new(),
            policy: AccountabilityPolicy::default(),
            clock,
            sink: Box::new(LogSink),
        }
    }

    /// Replace the thresholds
    pub fn with_policy(mut self, policy: AccountabilityPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Replace the event sink
    pub fn with_sink(mut self, sink: Box<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Active thresholds
    pub fn policy(&self) -> &AccountabilityPolicy {
        &self.policy
    }

    /// Append an incident to its officer's history and re-run analysis
    ///
    /// Returns `None`, leaving every history untouched, when the incident
    /// names no officer.
    pub fn record_incident(&mut self, incident: IncidentRecord) -> Option<&OfficerHistory> {
        let Some(officer_id) = incident.attributed_officer().map(str::to_string) else {
            self.sink.emit(CoreEvent::IncidentDropped {
                incident_type: incident.incident_type,
            });
            return None;
        };

        let now = self.clock.now();
        let policy = self.policy;

        let history = self
            .histories
            .entry(officer_id.clone())
            .or_insert_with(|| OfficerHistory::new(officer_id.clone()));

        history.incidents.push(incident);
        history.patterns =
            PatternSummary::from_incidents(&history.incidents, now, policy.recent_window_days);

        let mut raised = None;
        if history.patterns.total_incidents > policy.high_activity_threshold {
            let already = history.has_flag(FlagKind::HighActivity);
            if policy.flag_mode == FlagMode::EveryRecord || !already {
                let flag = AccountabilityFlag {
                    flag: FlagKind::HighActivity,
                    timestamp: now,
                    description: HIGH_ACTIVITY_DESCRIPTION.to_string(),
                };
                history.accountability_flags.push(flag.clone());
                raised = Some(flag);
            }
        }

        let total_incidents = history.patterns.total_incidents;
        self.sink.emit(CoreEvent::IncidentRecorded {
            officer_id: officer_id.clone(),
            total_incidents,
        });
        if let Some(flag) = raised {
            self.sink.emit(CoreEvent::FlagRaised {
                officer_id: officer_id.clone(),
                flag,
            });
        }

        self.histories.get(&officer_id)
    }

    /// Seed or replace a history, e.g. one loaded from storage
    ///
    /// The stored patterns are kept as-is until the next record for that
    /// officer rebuilds them.
    pub fn restore(&mut self, history: OfficerHistory) -> Option<OfficerHistory> {
        self.histories.insert(history.officer_id.clone(), history)
    }

    /// History for one officer, if any incident was attributed
    pub fn history(&self, officer_id: &str) -> Option<&OfficerHistory> {
        self.histories.get(officer_id)
    }

    /// True if the officer has a history
    pub fn contains(&self, officer_id: &str) -> bool {
        self.histories.contains_key(officer_id)
    }

    /// Histories ordered by officer id
    pub fn histories(&self) -> impl Iterator<Item = &OfficerHistory> {
        self.histories.values()
    }

    /// Officers with a history
    pub fn officer_count(&self) -> usize {
        self.histories.len()
    }

    /// Patterns for `officer_id` recomputed against the current clock
    pub fn current_patterns(&self, officer_id: &str) -> Option<PatternSummary> {
        self.histories.get(officer_id).map(|h| {
            PatternSummary::from_incidents(&h.incidents, self.clock.now(), self.policy.recent_window_days)
        })
    }

    /// Clock used for windows and flag timestamps
    pub fn clock(&self) -> &C {
        &self.clock
    }
}
