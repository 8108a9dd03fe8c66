//! Error Types for Observation and Incident Input
//!
//! ## Design Philosophy
//!
//! Most of what the engine computes cannot fail. A triangulation with too few
//! readings is an ordinary outcome and comes back as `None`; an incident with
//! no officer attached is dropped. Errors are reserved for input that would
//! otherwise poison the arithmetic:
//!
//! - A NaN signal strength produces a NaN weight, and a NaN weight turns every
//!   later estimate for that device into NaN.
//! - A latitude of 4071.28 (a missing decimal point) drags the weighted mean
//!   kilometres away while still looking like a number.
//!
//! Both are rejected at the store boundary so a stored reading is always
//! usable.
//!
//! ## Error Categories
//!
//! ### Input Validation
//! - `EmptyIdentifier`: a device or officer id was blank
//! - `InvalidSignalStrength`: NaN or infinite dBm value
//! - `InvalidCoordinate`: non-finite or out-of-range latitude/longitude
//! - `InvalidTimestamp`: string could not be parsed as RFC 3339
//!
//! ### Configuration
//! - `InvalidConfig`: inconsistent triangulation or retention settings
//!
//! ### Shared Access
//! - `CoreError::LockPoisoned`: a writer panicked while holding a [`Shared`] lock
//!
//! [`Shared`]: crate::sync::Shared
//!
//! ## Handling Strategy
//!
//! ```rust
//! use scanwatch_core::{Position, SignalStore, ValidationError};
//!
//! let mut store = SignalStore::new();
//! match store.add_reading("00:1A:2B:3C:4D:5E", f64::NAN, Position::new(40.7128, -74.0060), None) {
//!     Ok(reading) => println!("stored, ~{:.1} m", reading.estimated_distance()),
//!     Err(ValidationError::InvalidSignalStrength { .. }) => {
//!         // Scanner produced garbage - drop the sample
//!     }
//!     Err(other) => eprintln!("rejected: {other}"),
//! }
//! ```

use thiserror::Error;

/// Result type for input validation
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Which coordinate axis failed validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// North/south, valid range [-90, 90]
    Latitude,
    /// East/west, valid range [-180, 180]
    Longitude,
}

impl core::fmt::Display for Axis {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Axis::Latitude => f.write_str("latitude"),
            Axis::Longitude => f.write_str("longitude"),
        }
    }
}

/// Input validation errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Identifier was empty or whitespace only
    #[error("Empty identifier: {field}")]
    EmptyIdentifier {
        /// Name of the field that was blank (e.g. "device_id")
        field: &'static str,
    },

    /// Signal strength is not a finite number
    #[error("Invalid signal strength: {value} dBm")]
    InvalidSignalStrength {
        /// The rejected reading
        value: f64,
    },

    /// Coordinate is not finite or lies outside its axis range
    #[error("Invalid {axis}: {value} outside [{min}, {max}]")]
    InvalidCoordinate {
        /// Axis that failed
        axis: Axis,
        /// The rejected value
        value: f64,
        /// Lower bound for the axis
        min: f64,
        /// Upper bound for the axis
        max: f64,
    },

    /// Timestamp string could not be parsed
    #[error("Invalid timestamp {input:?}: {reason}")]
    InvalidTimestamp {
        /// Raw input as received
        input: String,
        /// Parser message
        reason: String,
    },

    /// Engine configuration is inconsistent
    #[error("Invalid configuration: {reason}")]
    InvalidConfig {
        /// Which constraint was violated
        reason: &'static str,
    },
}

/// Errors from the shared-access wrapper
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// Input was rejected
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A writer panicked while holding the lock
    #[error("Lock poisoned: {0}")]
    LockPoisoned(&'static str),
}
