//! Constants for Scanwatch Core
//!
//! Every numeric threshold the engine uses lives here, with the reasoning
//! behind the value next to it.
//!
//! ## Organization
//!
//! - **Signal**: path-loss model and triangulation parameters
//! - **Accountability**: incident windows and flag thresholds

/// Path-loss model and triangulation parameters.
pub mod signal;

/// Incident window and accountability flag thresholds.
pub mod accountability;

pub use signal::{
    COLOCATED_DISTANCE_M, MAX_ESTIMATED_DISTANCE_M, PATH_LOSS_DIVISOR_DB,
    MIN_WEIGHT_DISTANCE_M, TRIANGULATION_READINGS, FULL_CONFIDENCE_READINGS,
};

pub use accountability::{
    HIGH_ACTIVITY_THRESHOLD, RECENT_ACTIVITY_WINDOW_DAYS, HIGH_ACTIVITY_DESCRIPTION,
};
