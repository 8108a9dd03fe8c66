//! Shared fixtures for core integration tests
//!
//! Provides:
//! - A pinned clock so windows and timestamps are exact
//! - The three-station scenario used throughout the docs
//! - Incident builders for officer histories

#![allow(dead_code)]

use chrono::Duration;
use scanwatch_core::{
    FixedTime, IncidentRecord, NullSink, Position, SignalStore, Timestamp,
};

/// Device heard by every station in the reference scenario
pub const POLICE_RADIO: &str = "00:1A:2B:3C:4D:5E";

/// Second device seen by the MAC scanner
pub const POLICE_VEHICLE: &str = "AA:BB:CC:DD:EE:FF";

/// Station readings: (dBm, sensor position)
pub const STATIONS: [(f64, Position); 3] = [
    (-45.0, Position::new(40.7128, -74.0060)),
    (-60.0, Position::new(40.7130, -74.0058)),
    (-55.0, Position::new(40.7126, -74.0062)),
];

pub const EPOCH: &str = "2024-09-15T14:30:00Z";

pub fn clock() -> FixedTime {
    FixedTime::at(EPOCH).expect("fixture epoch parses")
}

/// Store on `clock` with the three station readings for `device`
pub fn station_store<'a>(clock: &'a FixedTime, device: &str) -> SignalStore<&'a FixedTime> {
    let mut store = SignalStore::with_clock(clock).with_sink(Box::new(NullSink));
    for (dbm, position) in STATIONS {
        store
            .add_reading(device, dbm, position, None)
            .expect("station reading is valid");
    }
    store
}

pub fn incident_at(timestamp: Timestamp, officer: &str, kind: &str) -> IncidentRecord {
    IncidentRecord::new(timestamp).with_officer(officer).with_type(kind)
}

/// `count` incidents spaced one minute apart, newest at `end`
pub fn incident_series(end: Timestamp, officer: &str, kind: &str, count: usize) -> Vec<IncidentRecord> {
    (0..count)
        .rev()
        .map(|i| incident_at(end - Duration::minutes(i as i64), officer, kind))
        .collect()
}

pub fn assert_between(value: f64, a: f64, b: f64) {
    let (lo, hi) = if a < b { (a, b) } else { (b, a) };
    assert!(value > lo && value < hi, "{value} not strictly inside ({lo}, {hi})");
}
