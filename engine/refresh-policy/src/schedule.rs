//! Daily anchor schedule for batch staleness checks.
//!
//! Upstream data lands in scheduled batch runs, not continuously. Staleness
//! is therefore anchored to the most recent batch time rather than to a
//! rolling interval: anything fetched before the latest anchor may be
//! missing that batch's output.

use chrono::{DateTime, Duration, Local, NaiveDateTime, NaiveTime, TimeZone, Utc};

use crate::config::default_anchor_times;

/// The fixed local times of day the upstream batch jobs run.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateSchedule {
    anchors: Vec<NaiveTime>,
}

impl Default for UpdateSchedule {
    fn default() -> Self {
        Self::new(default_anchor_times())
    }
}

impl UpdateSchedule {
    /// Build a schedule from anchor times. Anchors are sorted and deduped;
    /// an empty list falls back to the defaults.
    pub fn new(mut anchors: Vec<NaiveTime>) -> Self {
        if anchors.is_empty() {
            anchors = default_anchor_times();
        }
        anchors.sort();
        anchors.dedup();
        Self { anchors }
    }

    pub fn anchors(&self) -> &[NaiveTime] {
        &self.anchors
    }

    /// The most recent anchor instant not after `now`. Before the first
    /// anchor of the day this is the prior day's last anchor.
    pub fn last_update_before(&self, now: DateTime<Local>) -> DateTime<Local> {
        let today = now.date_naive();
        for anchor in self.anchors.iter().rev() {
            let candidate = resolve_local(today.and_time(*anchor));
            if candidate <= now {
                return candidate;
            }
        }
        let yesterday = today - Duration::days(1);
        let last = self.anchors.last().copied().unwrap_or(NaiveTime::MIN);
        resolve_local(yesterday.and_time(last))
    }
}

/// Resolve a naive local timestamp. Ambiguous times (DST fall-back) take the
/// earlier instant; nonexistent times (DST spring-forward gap) fall back to
/// the same wall-clock reading interpreted as UTC.
fn resolve_local(naive: NaiveDateTime) -> DateTime<Local> {
    match Local.from_local_datetime(&naive).earliest() {
        Some(dt) => dt,
        None => Utc.from_utc_datetime(&naive).with_timezone(&Local),
    }
}
