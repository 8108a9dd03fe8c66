//! RSSI to distance conversion
//!
//! Approximates free-space attenuation with a fixed reference power. The
//! numbers are not calibrated against any radio; they only need to rank
//! sensors by proximity for the weighted average in
//! [`triangulation`](crate::triangulation).

use crate::constants::signal::{
    COLOCATED_DISTANCE_M, MAX_ESTIMATED_DISTANCE_M, PATH_LOSS_DIVISOR_DB,
};

/// Estimate distance in meters from a received signal strength in dBm.
///
/// Always returns a value in `(0, 1000]`, for any input including NaN and
/// infinities.
///
/// ```rust
/// use scanwatch_core::distance::estimate_distance;
///
/// assert_eq!(estimate_distance(-20.0), 10.0);
/// assert_eq!(estimate_distance(-100.0), 1000.0);
/// assert_eq!(estimate_distance(3.0), 1.0);
/// ```
pub fn estimate_distance(signal_strength: f64) -> f64 {
    if signal_strength >= 0.0 {
        return COLOCATED_DISTANCE_M;
    }

    let distance = 10f64.powf(-signal_strength / PATH_LOSS_DIVISOR_DB);

    // f64::min ignores a NaN operand, so a NaN input lands on the cap
    distance.min(MAX_ESTIMATED_DISTANCE_M)
}
