//! Signal Reading Store
//!
//! ## Overview
//!
//! An append-only log of every signal observation the engine has seen. The
//! store does not index by device: readings sit in one sequence in arrival
//! order and [`readings_for`](SignalStore::readings_for) filters at query
//! time. Triangulation reads from here.
//!
//! ## Lifecycle of a Reading
//!
//! ```text
//! add_reading(id, dBm, sensor position, ts?)
//!     │
//!     ├─ validate (id, dBm, lat/lon)           → ValidationError
//!     ├─ ts.unwrap_or(clock.now())
//!     ├─ estimated_distance = estimate_distance(dBm)
//!     ├─ push onto the sequence (duplicates kept)
//!     └─ apply retention policy (unbounded by default)
//! ```
//!
//! A [`SignalReading`] exposes its fields through getters only. Once stored,
//! its distance is never recomputed.
//!
//! ## Retention
//!
//! By default nothing is evicted and memory grows with every reading. Long
//! running hosts can bound the store with a [`RetentionPolicy`] or call
//! [`prune_before`](SignalStore::prune_before) periodically.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::distance::estimate_distance;
use crate::errors::{Axis, ValidationError, ValidationResult};
use crate::events::{CoreEvent, EventSink, LogSink};
use crate::time::{SystemTime, TimeSource, Timestamp};

/// Sensor location in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Degrees north, in [-90, 90]
    pub latitude: f64,
    /// Degrees east, in [-180, 180]
    pub longitude: f64,
}

impl Position {
    /// Unvalidated position; see [`validate`](Self::validate)
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Reject non-finite or out-of-range coordinates
    pub fn validate(&self) -> ValidationResult<()> {
        check_axis(Axis::Latitude, self.latitude, 90.0)?;
        check_axis(Axis::Longitude, self.longitude, 180.0)
    }
}

impl From<(f64, f64)> for Position {
    fn from((latitude, longitude): (f64, f64)) -> Self {
        Self::new(latitude, longitude)
    }
}

fn check_axis(axis: Axis, value: f64, limit: f64) -> ValidationResult<()> {
    if value.is_finite() && (-limit..=limit).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::InvalidCoordinate {
            axis,
            value,
            min: -limit,
            max: limit,
        })
    }
}

/// A single signal-strength observation
///
/// `position` is where the *sensor* stood, not the device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalReading {
    device_id: String,
    signal_strength: f64,
    position: Position,
    timestamp: Timestamp,
    estimated_distance: f64,
}

impl SignalReading {
    /// Observed device (typically a MAC address)
    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// Received strength in dBm
    pub fn signal_strength(&self) -> f64 {
        self.signal_strength
    }

    /// Sensor location at observation time
    pub fn position(&self) -> Position {
        self.position
    }

    /// Observation instant
    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    /// Meters, fixed at insertion time
    pub fn estimated_distance(&self) -> f64 {
        self.estimated_distance
    }
}

/// Bounds on how much history the store keeps
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetentionPolicy {
    /// Keep at most this many readings; the oldest arrivals go first
    ///
    /// Private so a zero capacity can only be rejected, never built.
    max_readings: Option<usize>,
}

impl RetentionPolicy {
    /// Keep everything
    pub const fn unbounded() -> Self {
        Self { max_readings: None }
    }

    /// Keep the most recent `max` arrivals
    pub fn max_readings(max: usize) -> ValidationResult<Self> {
        if max == 0 {
            return Err(ValidationError::InvalidConfig {
                reason: "max_readings must be at least 1",
            });
        }
        Ok(Self { max_readings: Some(max) })
    }

    /// Capacity, or `None` when unbounded
    pub fn limit(&self) -> Option<usize> {
        self.max_readings
    }
}

/// Append-only collection of signal readings
pub struct SignalStore<C: TimeSource = SystemTime> {
    readings: VecDeque<SignalReading>,
    clock: C,
    retention: RetentionPolicy,
    sink: Box<dyn EventSink>,
}

impl SignalStore<SystemTime> {
    /// Store on the system clock, logging through `log`
    pub fn new() -> Self {
        Self::with_clock(SystemTime)
    }
}

impl Default for SignalStore<SystemTime> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: TimeSource> SignalStore<C> {
    /// Empty, unbounded store on `clock`, logging through `log`
    pub fn with_clock(clock: C) -> Self {
        Self {
            readings: VecDeque::new(),
            clock,
            retention: RetentionPolicy::unbounded(),
            sink: Box::new(LogSink),
        }
    }

    /// Replace the event sink
    pub fn with_sink(mut self, sink: Box<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Apply `retention`, evicting immediately if already over capacity
    pub fn with_retention(mut self, retention: RetentionPolicy) -> Self {
        self.retention = retention;
        self.enforce_retention();
        self
    }

    /// Validate, annotate and append a reading
    ///
    /// `timestamp` defaults to the store clock's current instant.
    pub fn add_reading(
        &mut self,
        device_id: &str,
        signal_strength: f64,
        position: impl Into<Position>,
        timestamp: Option<Timestamp>,
    ) -> ValidationResult<&SignalReading> {
        let position = position.into();

        if device_id.trim().is_empty() {
            return Err(ValidationError::EmptyIdentifier { field: "device_id" });
        }
        if !signal_strength.is_finite() {
            return Err(ValidationError::InvalidSignalStrength { value: signal_strength });
        }
        position.validate()?;

        let reading = SignalReading {
            device_id: device_id.to_string(),
            signal_strength,
            position,
            timestamp: timestamp.unwrap_or_else(|| self.clock.now()),
            estimated_distance: estimate_distance(signal_strength),
        };

        self.sink.emit(CoreEvent::ReadingRecorded {
            device_id: reading.device_id.clone(),
            estimated_distance: reading.estimated_distance,
            timestamp: reading.timestamp,
        });

        self.readings.push_back(reading);
        self.enforce_retention();

        // A capacity of at least one keeps the new reading at the back
        self.readings
            .back()
            .ok_or(ValidationError::InvalidConfig { reason: "store dropped the new reading" })
    }

    /// All readings in arrival order
    pub fn readings(&self) -> impl Iterator<Item = &SignalReading> {
        self.readings.iter()
    }

    /// Readings for one device in arrival order
    pub fn readings_for<'a>(&'a self, device_id: &'a str) -> impl Iterator<Item = &'a SignalReading> + 'a {
        self.readings.iter().filter(move |r| r.device_id == device_id)
    }

    /// Distinct device ids in first-seen order
    pub fn device_ids(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for reading in &self.readings {
            if !seen.contains(&reading.device_id.as_str()) {
                seen.push(&reading.device_id);
            }
        }
        seen
    }

    /// Total readings across all devices
    pub fn len(&self) -> usize {
        self.readings.len()
    }

    /// True when no reading is stored
    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Drop every reading timestamped before `cutoff`, returning how many went
    pub fn prune_before(&mut self, cutoff: Timestamp) -> usize {
        let before = self.readings.len();
        self.readings.retain(|r| r.timestamp >= cutoff);
        let removed = before - self.readings.len();
        if removed > 0 {
            self.sink.emit(CoreEvent::ReadingsEvicted { count: removed });
        }
        removed
    }

    /// Clock used for default timestamps
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Current instant according to the store clock
    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    pub(crate) fn emit(&self, event: CoreEvent) {
        self.sink.emit(event);
    }

    fn enforce_retention(&mut self) {
        let Some(max) = self.retention.max_readings else {
            return;
        };

        let excess = self.readings.len().saturating_sub(max);
        if excess > 0 {
            self.readings.drain(..excess);
            self.sink.emit(CoreEvent::ReadingsEvicted { count: excess });
        }
    }
}
