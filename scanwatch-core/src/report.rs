//! Accountability report assembly
//!
//! A report is a snapshot of one or all officer histories, keyed by officer
//! id. Writing it anywhere is up to the caller.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::accountability::{FlagKind, IncidentAggregator, OfficerHistory};
use crate::time::{TimeSource, Timestamp};

/// Value of `report_type` for accountability summaries
pub const ACCOUNTABILITY_SUMMARY: &str = "accountability_summary";

/// Snapshot of officer histories
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountabilityReport {
    /// When the snapshot was taken
    pub generated_at: Timestamp,
    /// Always [`ACCOUNTABILITY_SUMMARY`]
    pub report_type: String,
    /// Histories keyed by officer id
    pub officers: BTreeMap<String, OfficerHistory>,
}

impl AccountabilityReport {
    /// Build from any set of histories; later duplicates of an id win
    pub fn from_histories<'a>(
        generated_at: Timestamp,
        histories: impl IntoIterator<Item = &'a OfficerHistory>,
    ) -> Self {
        let officers = histories
            .into_iter()
            .map(|h| (h.officer_id.clone(), h.clone()))
            .collect();

        Self {
            generated_at,
            report_type: ACCOUNTABILITY_SUMMARY.to_string(),
            officers,
        }
    }

    /// Officers included
    pub fn officer_count(&self) -> usize {
        self.officers.len()
    }

    /// Incidents across every included officer
    pub fn total_incidents(&self) -> usize {
        self.officers.values().map(|h| h.incidents.len()).sum()
    }

    /// Officers carrying at least one flag of `kind`
    pub fn flagged_officers(&self, kind: FlagKind) -> Vec<&str> {
        self.officers
            .values()
            .filter(|h| h.has_flag(kind))
            .map(|h| h.officer_id.as_str())
            .collect()
    }
}

impl<C: TimeSource> IncidentAggregator<C> {
    /// Report on one officer, or on everyone when `officer_id` is `None`
    ///
    /// An unknown officer yields a report with no entries.
    pub fn generate_report(&self, officer_id: Option<&str>) -> AccountabilityReport {
        let generated_at = self.clock().now();
        match officer_id {
            Some(id) => AccountabilityReport::from_histories(generated_at, self.history(id)),
            None => AccountabilityReport::from_histories(generated_at, self.histories()),
        }
    }
}
