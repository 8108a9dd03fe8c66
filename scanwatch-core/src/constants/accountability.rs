//! Accountability Thresholds
//!
//! Windows and limits used when summarising an officer's incident history.

/// Width of the recent-activity window in whole days.
///
/// Inclusive: an incident exactly 30 days old still counts as recent.
pub const RECENT_ACTIVITY_WINDOW_DAYS: i64 = 30;

/// Incident count above which a `high_activity` flag is raised.
///
/// Strictly greater than: the 51st incident is the first to flag.
pub const HIGH_ACTIVITY_THRESHOLD: usize = 50;

/// Description attached to `high_activity` flags.
pub const HIGH_ACTIVITY_DESCRIPTION: &str = "Officer has unusually high incident count";
