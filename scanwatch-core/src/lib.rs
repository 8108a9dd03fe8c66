//! Position estimation and incident pattern analysis for Scanwatch
//!
//! Turns wireless signal observations into device position estimates and
//! scanner incidents into per-officer accountability summaries.
//!
//! Key properties:
//! - No I/O: callers push observations in and pull estimates/reports out
//! - Every "now" comes from an injected [`TimeSource`]
//! - Activity is reported to an injected [`EventSink`], never a global logger
//!
//! ```no_run
//! use scanwatch_core::{IncidentAggregator, IncidentRecord, Position, SignalStore, Triangulator};
//!
//! let mut store = SignalStore::new();
//! store.add_reading("00:1A:2B:3C:4D:5E", -45.0, Position::new(40.7128, -74.0060), None)?;
//! // ... two more stations ...
//! if let Some(fix) = Triangulator::default().triangulate_position(&store, "00:1A:2B:3C:4D:5E") {
//!     println!("{:.6}, {:.6}", fix.estimated_latitude, fix.estimated_longitude);
//! }
//!
//! let mut officers = IncidentAggregator::new();
//! officers.record_incident(IncidentRecord::new(chrono::Utc::now()).with_officer("123").with_type("traffic_stop"));
//! # Ok::<(), scanwatch_core::ValidationError>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod accountability;
pub mod constants;
pub mod distance;
pub mod errors;
pub mod events;
pub mod report;
pub mod store;
pub mod sync;
pub mod time;
pub mod triangulation;

// Public API
pub use accountability::{
    AccountabilityFlag, AccountabilityPolicy, FlagKind, FlagMode, IncidentAggregator,
    IncidentRecord, OfficerHistory, PatternSummary,
};
pub use distance::estimate_distance;
pub use errors::{CoreError, ValidationError, ValidationResult};
pub use events::{CoreEvent, EventSink, LogSink, MemorySink, NullSink};
pub use report::AccountabilityReport;
pub use store::{Position, RetentionPolicy, SignalReading, SignalStore};
pub use time::{FixedTime, SystemTime, TimeSource, Timestamp};
pub use triangulation::{TriangulationConfig, TriangulationEstimate, TriangulationLog, Triangulator};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
