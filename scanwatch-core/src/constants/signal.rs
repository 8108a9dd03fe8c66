//! Signal Model and Triangulation Parameters
//!
//! The distance model is deliberately uncalibrated: a fixed 0 dBm reference
//! transmit power and a free-space path-loss exponent of 2.

// ===== PATH-LOSS MODEL =====

/// Distance reported when the received strength is zero or positive (meters).
///
/// A non-negative dBm value means the transmitter is effectively on top of
/// the sensor, or the reading is outside what the model can describe.
pub const COLOCATED_DISTANCE_M: f64 = 1.0;

/// Upper bound on any estimated distance (meters).
///
/// Beyond ~1 km the free-space assumption is meaningless in an urban
/// environment; a -100 dBm reading would otherwise report 100 km.
pub const MAX_ESTIMATED_DISTANCE_M: f64 = 1000.0;

/// Divisor applied to the attenuation in the exponent.
///
/// Log-distance path loss: `d = 10^((P_tx - RSSI) / (10 * n))`.
/// With `P_tx = 0 dBm` and `n = 2`:
/// ```text
/// d = 10^(-RSSI / 20)
/// -20 dBm →   10 m
/// -40 dBm →  100 m
/// -60 dBm → 1000 m (cap)
/// ```
pub const PATH_LOSS_DIVISOR_DB: f64 = 20.0;

// ===== TRIANGULATION =====

/// Distance floor applied before inverting into a weight (meters).
///
/// Keeps `1 / d` at most 1.0 so a co-located sensor cannot swamp the others.
pub const MIN_WEIGHT_DISTANCE_M: f64 = 1.0;

/// Number of readings required for, and used by, a triangulation.
pub const TRIANGULATION_READINGS: usize = 3;

/// Reading count at which confidence saturates at 1.0.
///
/// `confidence = min(readings_used / FULL_CONFIDENCE_READINGS, 1.0)`
pub const FULL_CONFIDENCE_READINGS: usize = 3;
