//! Polling loop tying sources, engine and storage together
//!
//! ## One Cycle
//!
//! ```text
//! scanner.poll(now)
//!     └─ per incident: assign incident_<secs>[_<n>] id ─► save incident
//!                      load officer file if not yet in memory
//!                      record_incident ─► save officer history
//!
//! mac_scanner.poll(now)            (at most once per mac_scan_interval)
//!     └─ per detection: save detection
//!                       add_reading at the station location
//!     └─ per device seen: triangulate ─► save triangulation log
//!
//! prune readings older than log_retention_days
//! ```
//!
//! [`Monitor::run`] repeats cycles, sleeping `scanner_scan_interval` seconds
//! between them when running on the wall clock.

use std::path::PathBuf;

use chrono::Duration;
use scanwatch_core::{
    AccountabilityReport, EventSink, IncidentAggregator, IncidentRecord, SignalStore, SystemTime,
    TimeSource, Timestamp, TriangulationEstimate, Triangulator,
};

use crate::config::ScannerConfig;
use crate::simulated::{MacDetection, SimulatedMacScanner, SimulatedScanner};
use crate::storage::DataDir;
use crate::{ConnectorResult, ObservationSource};

/// What a single cycle did
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CycleSummary {
    /// Incidents saved and recorded
    pub incidents: usize,
    /// MAC detections stored as readings
    pub detections: usize,
    /// One per device that could be triangulated
    pub estimates: Vec<TriangulationEstimate>,
    /// Readings dropped by the retention window
    pub pruned: usize,
}

/// Scanner monitor
pub struct Monitor<S = SimulatedScanner, M = SimulatedMacScanner, C = SystemTime>
where
    C: TimeSource,
{
    config: ScannerConfig,
    data: DataDir,
    scanner: S,
    mac_scanner: M,
    store: SignalStore<C>,
    aggregator: IncidentAggregator<C>,
    triangulator: Triangulator,
    clock: C,
    last_mac_scan: Option<Timestamp>,
}

impl Monitor {
    /// Simulated sources on the system clock
    pub fn new(config: ScannerConfig, data: DataDir) -> ConnectorResult<Self> {
        Self::with_sources(
            config,
            data,
            SimulatedScanner::new(),
            SimulatedMacScanner::new(),
            SystemTime,
        )
    }
}

impl<S, M, C> Monitor<S, M, C>
where
    S: ObservationSource<Observation = IncidentRecord>,
    M: ObservationSource<Observation = MacDetection>,
    C: TimeSource + Clone,
{
    /// Validate the config and prepare the data directory
    pub fn with_sources(
        config: ScannerConfig,
        data: DataDir,
        scanner: S,
        mac_scanner: M,
        clock: C,
    ) -> ConnectorResult<Self> {
        config.validate()?;
        data.ensure_layout()?;

        Ok(Self {
            store: SignalStore::with_clock(clock.clone()),
            aggregator: IncidentAggregator::with_clock(clock.clone()),
            triangulator: Triangulator::default(),
            config,
            data,
            scanner,
            mac_scanner,
            clock,
            last_mac_scan: None,
        })
    }

    /// Route store and aggregator events somewhere other than `log`
    pub fn with_sinks(mut self, store_sink: Box<dyn EventSink>, aggregator_sink: Box<dyn EventSink>) -> Self {
        self.store = self.store.with_sink(store_sink);
        self.aggregator = self.aggregator.with_sink(aggregator_sink);
        self
    }

    pub fn with_triangulator(mut self, triangulator: Triangulator) -> Self {
        self.triangulator = triangulator;
        self
    }

    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

    pub fn data(&self) -> &DataDir {
        &self.data
    }

    pub fn store(&self) -> &SignalStore<C> {
        &self.store
    }

    pub fn aggregator(&self) -> &IncidentAggregator<C> {
        &self.aggregator
    }

    /// Poll both sources once
    pub fn cycle(&mut self) -> ConnectorResult<CycleSummary> {
        let now = self.clock.now();
        let mut summary = CycleSummary::default();

        for mut incident in self.scanner.poll(now)? {
            if incident.incident_id.is_none() {
                incident.incident_id = Some(self.next_incident_id(now));
            }
            self.data.save_incident(&incident)?;
            log::info!(
                "Logged incident {}",
                incident.incident_id.as_deref().unwrap_or_default()
            );
            self.record(incident)?;
            summary.incidents += 1;
        }

        if self.mac_scan_due(now) {
            self.last_mac_scan = Some(now);
            let detections = self.mac_scanner.poll(now)?;
            let station = self.config.location.position();

            let mut devices: Vec<&str> = Vec::new();
            for detection in &detections {
                self.data.save_detection(detection)?;
                self.store.add_reading(
                    &detection.mac,
                    detection.signal_strength,
                    station,
                    Some(detection.timestamp),
                )?;
                if !devices.contains(&detection.mac.as_str()) {
                    devices.push(&detection.mac);
                }
            }
            summary.detections = detections.len();

            for device in devices {
                if let Some(estimate) = self.triangulator.triangulate_position(&self.store, device) {
                    let entry = self.triangulator.triangulation_log(&self.store, &estimate);
                    self.data.save_triangulation_log(&entry)?;
                    summary.estimates.push(estimate);
                }
            }
        }

        if let Some(cutoff) = Duration::try_days(self.config.monitoring.log_retention_days)
            .and_then(|window| now.checked_sub_signed(window))
        {
            summary.pruned = self.store.prune_before(cutoff);
        }

        Ok(summary)
    }

    /// Run `cycles` cycles, or forever when `None`; returns cycles completed
    pub fn run(&mut self, cycles: Option<u64>) -> ConnectorResult<u64> {
        let interval = std::time::Duration::from_secs(self.config.monitoring.scanner_scan_interval);
        log::info!(
            "Monitoring {} frequencies from {}",
            self.config.scanner_frequencies.len(),
            self.config.location.name
        );

        let mut completed = 0;
        while cycles.map_or(true, |n| completed < n) {
            let summary = self.cycle()?;
            completed += 1;
            log::debug!(
                "Cycle {completed}: {} incidents, {} detections, {} estimates",
                summary.incidents,
                summary.detections,
                summary.estimates.len()
            );

            let more = cycles.map_or(true, |n| completed < n);
            if more && self.clock.is_wall_clock() {
                std::thread::sleep(interval);
            }
        }
        Ok(completed)
    }

    /// Build a report from persisted histories and save it under `data/patterns`
    pub fn generate_report(&self, officer_id: Option<&str>) -> ConnectorResult<(AccountabilityReport, PathBuf)> {
        let report = self.data.build_report(self.clock.now(), officer_id)?;
        let path = self.data.save_report(&report)?;
        Ok((report, path))
    }

    fn record(&mut self, incident: IncidentRecord) -> ConnectorResult<()> {
        if let Some(officer_id) = incident.attributed_officer() {
            if !self.aggregator.contains(officer_id) {
                if let Some(history) = self.data.load_officer_history(officer_id)? {
                    self.aggregator.restore(history);
                }
            }
        }

        if let Some(history) = self.aggregator.record_incident(incident) {
            self.data.save_officer_history(history)?;
        }
        Ok(())
    }

    /// `incident_<secs>`, or `incident_<secs>_<n>` with the smallest free `n`
    ///
    /// Checks the incidents directory, so ids stay unique within a batch and
    /// across restarts that land on the same second.
    fn next_incident_id(&self, now: Timestamp) -> String {
        let base = format!("incident_{}", now.timestamp());
        if !self.data.incident_path(&base).exists() {
            return base;
        }
        (1u64..)
            .map(|n| format!("{base}_{n}"))
            .find(|id| !self.data.incident_path(id).exists())
            .unwrap_or(base)
    }

    fn mac_scan_due(&self, now: Timestamp) -> bool {
        let interval = i64::try_from(self.config.monitoring.mac_scan_interval).unwrap_or(i64::MAX);
        self.last_mac_scan
            .map_or(true, |last| (now - last).num_seconds() >= interval)
    }
}
