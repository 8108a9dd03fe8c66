//! Weighted-Average Position Estimation
//!
//! ## Overview
//!
//! Given several sensors that heard the same device, the device is probably
//! closest to the sensor that heard it loudest. The estimator takes the most
//! recent readings for a device and averages the *sensor* positions, each
//! weighted by the inverse of its estimated distance:
//!
//! ```text
//! w_i   = 1 / max(d_i, 1 m)
//! lat   = Σ w_i·lat_i / Σ w_i
//! lon   = Σ w_i·lon_i / Σ w_i
//! conf  = min(n / 3, 1)
//! ```
//!
//! This is not trilateration. The result always lies inside the bounding box
//! of the contributing sensors, and confidence only reflects how many
//! readings took part.
//!
//! ## Selection
//!
//! 1. Keep readings whose `device_id` matches exactly.
//! 2. Fewer than `min_readings` (3) → no estimate.
//! 3. Order newest first; equal timestamps keep the later arrival first.
//! 4. Take up to `max_readings` (3).
//!
//! ## Usage Example
//!
//! ```rust
//! use scanwatch_core::{Position, SignalStore, Triangulator};
//!
//! let mut store = SignalStore::new();
//! let mac = "00:1A:2B:3C:4D:5E";
//! store.add_reading(mac, -45.0, Position::new(40.7128, -74.0060), None)?;
//! store.add_reading(mac, -60.0, Position::new(40.7130, -74.0058), None)?;
//! store.add_reading(mac, -55.0, Position::new(40.7126, -74.0062), None)?;
//!
//! let estimate = Triangulator::default().triangulate_position(&store, mac).unwrap();
//! assert_eq!(estimate.readings_used, 3);
//! assert_eq!(estimate.confidence, 1.0);
//! # Ok::<(), scanwatch_core::ValidationError>(())
//! ```

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::constants::signal::{
    FULL_CONFIDENCE_READINGS, MIN_WEIGHT_DISTANCE_M, TRIANGULATION_READINGS,
};
use crate::errors::{ValidationError, ValidationResult};
use crate::events::{CoreEvent, SkipReason};
use crate::store::{SignalReading, SignalStore};
use crate::time::{TimeSource, Timestamp};

/// Label recorded in triangulation logs
pub const TRIANGULATION_METHOD: &str = "weighted_average_rssi";

/// Configuration for triangulation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriangulationConfig {
    /// Minimum readings for the device before an estimate is attempted
    pub min_readings: usize,
    /// Most recent readings that take part in the estimate
    pub max_readings: usize,
    /// Reading count at which confidence reaches 1.0
    pub full_confidence_readings: usize,
    /// Floor applied to distances before inverting into weights (meters)
    pub min_weight_distance_m: f64,
}

impl Default for TriangulationConfig {
    fn default() -> Self {
        Self {
            min_readings: TRIANGULATION_READINGS,
            max_readings: TRIANGULATION_READINGS,
            full_confidence_readings: FULL_CONFIDENCE_READINGS,
            min_weight_distance_m: MIN_WEIGHT_DISTANCE_M,
        }
    }
}

impl TriangulationConfig {
    /// Accept as few as `min_readings`, reporting proportionally lower confidence
    pub fn relaxed(min_readings: usize) -> ValidationResult<Self> {
        let config = Self {
            min_readings,
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject zero counts, a window smaller than the minimum, or a non-positive floor
    pub fn validate(&self) -> ValidationResult<()> {
        if self.min_readings == 0 {
            return Err(ValidationError::InvalidConfig {
                reason: "min_readings must be at least 1",
            });
        }
        if self.max_readings < self.min_readings {
            return Err(ValidationError::InvalidConfig {
                reason: "max_readings must not be below min_readings",
            });
        }
        if self.full_confidence_readings == 0 {
            return Err(ValidationError::InvalidConfig {
                reason: "full_confidence_readings must be at least 1",
            });
        }
        if !(self.min_weight_distance_m.is_finite() && self.min_weight_distance_m > 0.0) {
            return Err(ValidationError::InvalidConfig {
                reason: "min_weight_distance_m must be positive",
            });
        }
        Ok(())
    }
}

/// Estimated device location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriangulationEstimate {
    /// Device the estimate is for
    pub device_id: String,
    /// Weighted mean of sensor latitudes
    pub estimated_latitude: f64,
    /// Weighted mean of sensor longitudes
    pub estimated_longitude: f64,
    /// In [0, 1]; reflects reading count only
    pub confidence: f64,
    /// Readings that contributed (at most `max_readings`)
    pub readings_used: usize,
    /// When the estimate was computed
    pub timestamp: Timestamp,
}

/// Summary block of a [`TriangulationLog`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriangulationAnalysis {
    /// Readings stored for the device, not just those used
    pub total_readings: usize,
    /// Always [`TRIANGULATION_METHOD`]
    pub triangulation_method: String,
    /// Coarse qualitative accuracy label
    pub accuracy_estimate: String,
}

/// Estimate together with the evidence behind it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriangulationLog {
    /// The estimate being logged
    pub triangulation_result: TriangulationEstimate,
    /// Every stored reading for the device, in arrival order
    pub signal_readings: Vec<SignalReading>,
    /// Summary of the above
    pub analysis: TriangulationAnalysis,
}

/// Weighted-average triangulator
#[derive(Debug, Clone, Default)]
pub struct Triangulator {
    config: TriangulationConfig,
}

impl Triangulator {
    /// Triangulator with a validated `config`
    pub fn new(config: TriangulationConfig) -> ValidationResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Active configuration
    pub fn config(&self) -> &TriangulationConfig {
        &self.config
    }

    /// Estimate a device's position from the readings in `store`
    ///
    /// Returns `None` when the device has too few readings. The outcome is
    /// reported to the store's event sink either way.
    pub fn triangulate_position<C: TimeSource>(
        &self,
        store: &SignalStore<C>,
        device_id: &str,
    ) -> Option<TriangulationEstimate> {
        let outcome = self.estimate(store.readings_for(device_id), device_id, store.now());

        match outcome {
            Ok(estimate) => {
                store.emit(CoreEvent::PositionEstimated(estimate.clone()));
                Some(estimate)
            }
            Err(reason) => {
                store.emit(CoreEvent::TriangulationSkipped {
                    device_id: device_id.to_string(),
                    reason,
                });
                None
            }
        }
    }

    /// Build a log entry for `estimate` from every reading of its device
    pub fn triangulation_log<C: TimeSource>(
        &self,
        store: &SignalStore<C>,
        estimate: &TriangulationEstimate,
    ) -> TriangulationLog {
        let signal_readings: Vec<SignalReading> =
            store.readings_for(&estimate.device_id).cloned().collect();

        TriangulationLog {
            triangulation_result: estimate.clone(),
            analysis: TriangulationAnalysis {
                total_readings: signal_readings.len(),
                triangulation_method: TRIANGULATION_METHOD.to_string(),
                accuracy_estimate: "medium".to_string(),
            },
            signal_readings,
        }
    }

    /// Pure estimation over an already-filtered set of readings
    ///
    /// `readings` must be in arrival order; it is not re-filtered.
    pub fn estimate<'a>(
        &self,
        readings: impl IntoIterator<Item = &'a SignalReading>,
        device_id: &str,
        now: Timestamp,
    ) -> Result<TriangulationEstimate, SkipReason> {
        let mut candidates: Vec<(usize, &SignalReading)> = readings.into_iter().enumerate().collect();

        if candidates.len() < self.config.min_readings {
            return Err(SkipReason::InsufficientData {
                required: self.config.min_readings,
                available: candidates.len(),
            });
        }

        candidates.sort_by(|(ai, a), (bi, b)| newest_first(a, *ai, b, *bi));
        candidates.truncate(self.config.max_readings);

        let mut total_weight = 0.0;
        let mut weighted_lat = 0.0;
        let mut weighted_lon = 0.0;

        for (_, reading) in &candidates {
            let weight = 1.0 / reading.estimated_distance().max(self.config.min_weight_distance_m);
            let position = reading.position();

            weighted_lat += position.latitude * weight;
            weighted_lon += position.longitude * weight;
            total_weight += weight;
        }

        // Unreachable with a positive distance floor, kept as a guard
        if total_weight == 0.0 {
            return Err(SkipReason::ZeroWeight);
        }

        let readings_used = candidates.len();
        let confidence =
            (readings_used as f64 / self.config.full_confidence_readings as f64).min(1.0);

        Ok(TriangulationEstimate {
            device_id: device_id.to_string(),
            estimated_latitude: weighted_lat / total_weight,
            estimated_longitude: weighted_lon / total_weight,
            confidence,
            readings_used,
            timestamp: now,
        })
    }
}

/// Descending by timestamp, then by arrival index
fn newest_first(a: &SignalReading, a_idx: usize, b: &SignalReading, b_idx: usize) -> Ordering {
    b.timestamp()
        .cmp(&a.timestamp())
        .then_with(|| b_idx.cmp(&a_idx))
}
