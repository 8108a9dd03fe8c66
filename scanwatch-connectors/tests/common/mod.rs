//! Shared fixtures for connector integration tests

#![allow(dead_code)]

use scanwatch_connectors::{
    ConnectorError, ConnectorResult, DataDir, Monitor, ObservationSource, ScannerConfig,
    SimulatedMacScanner, SimulatedScanner,
};
use scanwatch_core::{FixedTime, IncidentRecord, NullSink, Timestamp};

pub const EPOCH: &str = "2024-09-15T14:30:00Z";

pub fn clock() -> FixedTime {
    FixedTime::at(EPOCH).expect("fixture epoch parses")
}

pub type TestMonitor<'a> = Monitor<SimulatedScanner, SimulatedMacScanner, &'a FixedTime>;

pub fn simulated_monitor<'a>(data: &DataDir, clock: &'a FixedTime) -> TestMonitor<'a> {
    Monitor::with_sources(
        ScannerConfig::default(),
        data.clone(),
        SimulatedScanner::new(),
        SimulatedMacScanner::new(),
        clock,
    )
    .expect("default config is valid")
    .with_sinks(Box::new(NullSink), Box::new(NullSink))
}

/// Scanner that replays a script of incidents, one batch per poll
pub struct ScriptedScanner {
    pub batches: Vec<Vec<IncidentRecord>>,
}

impl ObservationSource for ScriptedScanner {
    type Observation = IncidentRecord;

    fn name(&self) -> &str {
        "scripted"
    }

    fn poll(&mut self, now: Timestamp) -> ConnectorResult<Vec<IncidentRecord>> {
        if self.batches.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self
            .batches
            .remove(0)
            .into_iter()
            .map(|mut incident| {
                incident.timestamp = now;
                incident
            })
            .collect())
    }
}

/// Scanner whose radio is unplugged
pub struct DeadScanner;

impl ObservationSource for DeadScanner {
    type Observation = IncidentRecord;

    fn name(&self) -> &str {
        "dead"
    }

    fn poll(&mut self, _now: Timestamp) -> ConnectorResult<Vec<IncidentRecord>> {
        Err(ConnectorError::SourceFailed {
            source_name: self.name().to_string(),
            reason: "no SDR attached".to_string(),
        })
    }
}
