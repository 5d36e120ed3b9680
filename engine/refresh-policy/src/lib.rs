//! # Refresh Policy
//!
//! Decides whether previously fetched fantasy baseball data is worth
//! re-fetching, balancing freshness against hammering upstream sources for
//! data that never changes.
//!
//! The policy is pure time-window arithmetic: recent data always refreshes,
//! stats inside the correction window refresh at most once a day, anything
//! not fetched since the last scheduled batch run is stale, and data past
//! the archive threshold is left alone. This is distinct from change
//! detection, which runs after a fetch; the refresh decision runs before.

pub mod config;
pub mod policy;
pub mod schedule;

#[cfg(test)]
mod tests;

pub use config::RefreshConfig;
pub use policy::{DataType, RefreshDecision, RefreshPolicy, RefreshReason};
pub use schedule::UpdateSchedule;

/// Data dated within this many days of now is always worth re-fetching.
pub const DEFAULT_FORCE_REFRESH_DAYS: i64 = 3;

/// Days during which upstream stat corrections can still land.
pub const DEFAULT_STAT_CORRECTION_DAYS: i64 = 7;

/// Data older than this rarely changes; treat it as stable.
pub const DEFAULT_ARCHIVE_THRESHOLD_DAYS: i64 = 30;

/// Minimum hours between re-fetches inside the correction window.
pub const DEFAULT_CORRECTION_REFETCH_HOURS: i64 = 24;

/// Daily batch anchor times (local), "HH:MM".
pub const DEFAULT_UPDATE_ANCHORS: [&str; 3] = ["06:00", "13:00", "22:00"];
