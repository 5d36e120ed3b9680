//! Configuration for refresh decisions.
//!
//! Defaults match the production batch cadence; individual fields can be
//! overridden from the environment. A malformed override keeps the default
//! rather than failing startup.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::{
    DEFAULT_ARCHIVE_THRESHOLD_DAYS, DEFAULT_CORRECTION_REFETCH_HOURS, DEFAULT_FORCE_REFRESH_DAYS,
    DEFAULT_STAT_CORRECTION_DAYS, DEFAULT_UPDATE_ANCHORS,
};

/// Tunable refresh windows. All day counts compare against the record's
/// data date; the refetch gap compares against its last-fetch timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefreshConfig {
    pub force_refresh_days: i64,
    pub stat_correction_days: i64,
    pub archive_threshold_days: i64,
    pub correction_refetch_hours: i64,
    /// Daily batch anchor times, "HH:MM" local.
    pub update_anchors: Vec<String>,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            force_refresh_days: DEFAULT_FORCE_REFRESH_DAYS,
            stat_correction_days: DEFAULT_STAT_CORRECTION_DAYS,
            archive_threshold_days: DEFAULT_ARCHIVE_THRESHOLD_DAYS,
            correction_refetch_hours: DEFAULT_CORRECTION_REFETCH_HOURS,
            update_anchors: DEFAULT_UPDATE_ANCHORS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl RefreshConfig {
    /// Load configuration from environment variables, starting from defaults.
    pub fn from_env() -> anyhow::Result<Self> {
        let mut config = Self::default();

        if let Ok(raw) = std::env::var("REFRESH_FORCE_REFRESH_DAYS") {
            config.force_refresh_days =
                parse_override("REFRESH_FORCE_REFRESH_DAYS", &raw, config.force_refresh_days);
        }
        if let Ok(raw) = std::env::var("REFRESH_STAT_CORRECTION_DAYS") {
            config.stat_correction_days =
                parse_override("REFRESH_STAT_CORRECTION_DAYS", &raw, config.stat_correction_days);
        }
        if let Ok(raw) = std::env::var("REFRESH_ARCHIVE_THRESHOLD_DAYS") {
            config.archive_threshold_days = parse_override(
                "REFRESH_ARCHIVE_THRESHOLD_DAYS",
                &raw,
                config.archive_threshold_days,
            );
        }
        if let Ok(raw) = std::env::var("REFRESH_CORRECTION_REFETCH_HOURS") {
            config.correction_refetch_hours = parse_override(
                "REFRESH_CORRECTION_REFETCH_HOURS",
                &raw,
                config.correction_refetch_hours,
            );
        }
        if let Ok(raw) = std::env::var("REFRESH_UPDATE_ANCHORS") {
            let anchors: Vec<String> = raw
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            if !anchors.is_empty() {
                config.update_anchors = anchors;
            }
        }

        Ok(config)
    }

    /// Parsed anchor times, sorted. Unparseable entries are skipped; if none
    /// parse, the defaults apply.
    pub fn anchor_times(&self) -> Vec<NaiveTime> {
        let mut times: Vec<NaiveTime> = self
            .update_anchors
            .iter()
            .filter_map(|raw| match NaiveTime::parse_from_str(raw, "%H:%M") {
                Ok(t) => Some(t),
                Err(_) => {
                    tracing::warn!(anchor = %raw, "unparseable anchor time, skipping");
                    None
                }
            })
            .collect();
        if times.is_empty() {
            times = default_anchor_times();
        }
        times.sort();
        times
    }
}

pub(crate) fn default_anchor_times() -> Vec<NaiveTime> {
    DEFAULT_UPDATE_ANCHORS
        .iter()
        .filter_map(|raw| NaiveTime::parse_from_str(raw, "%H:%M").ok())
        .collect()
}

fn parse_override(name: &str, raw: &str, default: i64) -> i64 {
    match raw.trim().parse() {
        Ok(value) => value,
        Err(_) => {
            tracing::warn!(%name, %raw, "unparseable refresh override, keeping default");
            default
        }
    }
}
