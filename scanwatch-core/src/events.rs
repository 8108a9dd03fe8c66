//! Engine Events and Sinks
//!
//! ## Overview
//!
//! The store, triangulator and aggregator never write to a process-wide
//! logger. Each one holds an [`EventSink`] and reports what it did as a
//! [`CoreEvent`]. The host decides where those go:
//!
//! ```text
//! SignalStore ─┐
//! Triangulator ┼─► EventSink ─► LogSink    → `log` facade
//! Aggregator ──┘              ├► MemorySink → inspected by tests / reports
//!                             └► NullSink   → discarded
//! ```
//!
//! [`LogSink`] is the default, so an engine built with `new()` logs the same
//! lines a hand-wired logger would.
//!
//! ## Usage Example
//!
//! ```rust
//! use scanwatch_core::events::{CoreEvent, MemorySink};
//! use scanwatch_core::{Position, SignalStore};
//!
//! let sink = MemorySink::new();
//! let mut store = SignalStore::new().with_sink(Box::new(sink.clone()));
//! store.add_reading("AA:BB:CC:DD:EE:FF", -60.0, Position::new(40.7, -74.0), None)?;
//!
//! assert!(matches!(sink.events()[0], CoreEvent::ReadingRecorded { .. }));
//! # Ok::<(), scanwatch_core::ValidationError>(())
//! ```

use std::sync::{Arc, Mutex};

use crate::accountability::AccountabilityFlag;
use crate::time::Timestamp;
use crate::triangulation::TriangulationEstimate;

/// Why a triangulation produced no estimate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Fewer readings than the configured minimum
    InsufficientData {
        /// Readings required
        required: usize,
        /// Readings stored for the device
        available: usize,
    },
    /// Weights summed to zero
    ZeroWeight,
}

/// Everything the engine reports about its own activity
#[derive(Debug, Clone, PartialEq)]
pub enum CoreEvent {
    /// A signal reading was stored
    ReadingRecorded {
        /// Device the reading belongs to
        device_id: String,
        /// Meters, as annotated at insertion
        estimated_distance: f64,
        /// Observation instant
        timestamp: Timestamp,
    },

    /// Readings were evicted by the retention policy
    ReadingsEvicted {
        /// Readings removed
        count: usize,
    },

    /// A position estimate was produced
    PositionEstimated(TriangulationEstimate),

    /// Triangulation was requested but not possible
    TriangulationSkipped {
        /// Device that was queried
        device_id: String,
        /// Why no estimate was produced
        reason: SkipReason,
    },

    /// An incident was appended to an officer's history
    IncidentRecorded {
        /// Officer the incident was attributed to
        officer_id: String,
        /// History length after the append
        total_incidents: usize,
    },

    /// An incident had no officer and was not aggregated
    IncidentDropped {
        /// Type of the dropped incident, if it had one
        incident_type: Option<String>,
    },

    /// An accountability flag was raised
    FlagRaised {
        /// Flagged officer
        officer_id: String,
        /// The flag as appended to the history
        flag: AccountabilityFlag,
    },
}

/// Destination for engine events
///
/// Takes `&self` so read-only queries (triangulation over a shared store)
/// can still report; sinks that buffer use interior mutability.
pub trait EventSink: Send + Sync {
    /// Accept one event
    fn emit(&self, event: CoreEvent);
}

/// Forwards events to the `log` facade
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl EventSink for LogSink {
    fn emit(&self, event: CoreEvent) {
        match event {
            CoreEvent::ReadingRecorded { device_id, estimated_distance, .. } => {
                log::info!("Logged signal reading: {device_id} (~{estimated_distance:.1} m)");
            }
            CoreEvent::ReadingsEvicted { count } => {
                log::debug!("Retention policy evicted {count} readings");
            }
            CoreEvent::PositionEstimated(estimate) => {
                log::info!(
                    "Triangulated {}: {:.6}, {:.6} (confidence {:.2}, {} readings)",
                    estimate.device_id,
                    estimate.estimated_latitude,
                    estimate.estimated_longitude,
                    estimate.confidence,
                    estimate.readings_used,
                );
            }
            CoreEvent::TriangulationSkipped { device_id, reason } => match reason {
                SkipReason::InsufficientData { required, available } => {
                    log::debug!("Cannot triangulate {device_id}: need {required} readings, have {available}");
                }
                SkipReason::ZeroWeight => {
                    log::warn!("Cannot triangulate {device_id}: readings carry no weight");
                }
            },
            CoreEvent::IncidentRecorded { officer_id, total_incidents } => {
                log::info!("Updated pattern analysis for officer {officer_id} ({total_incidents} incidents)");
            }
            CoreEvent::IncidentDropped { incident_type } => {
                log::debug!(
                    "Dropped unattributed incident ({})",
                    incident_type.as_deref().unwrap_or("untyped")
                );
            }
            CoreEvent::FlagRaised { officer_id, flag } => {
                log::warn!("Officer {officer_id} flagged {}: {}", flag.flag.as_str(), flag.description);
            }
        }
    }
}

/// Discards every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: CoreEvent) {}
}

/// Collects events in a shared buffer
///
/// Clones share the same buffer, so keep one handle and give the engine
/// another.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    events: Arc<Mutex<Vec<CoreEvent>>>,
}

impl MemorySink {
    /// Empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything emitted so far
    pub fn events(&self) -> Vec<CoreEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Number of events collected
    pub fn len(&self) -> usize {
        match self.events.lock() {
            Ok(events) => events.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    /// True when nothing has been emitted since the last clear
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop everything collected so far
    pub fn clear(&self) {
        match self.events.lock() {
            Ok(mut events) => events.clear(),
            Err(poisoned) => poisoned.into_inner().clear(),
        }
    }
}

impl EventSink for MemorySink {
    fn emit(&self, event: CoreEvent) {
        match self.events.lock() {
            Ok(mut events) => events.push(event),
            Err(poisoned) => poisoned.into_inner().push(event),
        }
    }
}

impl<S: EventSink + ?Sized> EventSink for Box<S> {
    fn emit(&self, event: CoreEvent) {
        (**self).emit(event)
    }
}
