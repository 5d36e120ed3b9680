//! Refresh decision rules.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::config::RefreshConfig;
use crate::schedule::UpdateSchedule;

/// Kind of record a refresh decision is being made for. Only stats get the
/// correction-window treatment; lineups and transactions are final once set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Lineup,
    Stats,
    Transaction,
}

impl FromStr for DataType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lineup" | "lineups" => Ok(Self::Lineup),
            "stat" | "stats" => Ok(Self::Stats),
            "transaction" | "transactions" => Ok(Self::Transaction),
            other => Err(anyhow::anyhow!("unknown data type: {other}")),
        }
    }
}

/// Why a refresh decision came out the way it did. Serialized snake_case so
/// callers can persist or log it directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshReason {
    ForceRefresh,
    NewData,
    RecentData,
    StatCorrectionWindow,
    StaleData,
    ArchiveData,
    UpToDate,
}

impl RefreshReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ForceRefresh => "force_refresh",
            Self::NewData => "new_data",
            Self::RecentData => "recent_data",
            Self::StatCorrectionWindow => "stat_correction_window",
            Self::StaleData => "stale_data",
            Self::ArchiveData => "archive_data",
            Self::UpToDate => "up_to_date",
        }
    }
}

impl fmt::Display for RefreshReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The answer to "is this record worth re-fetching right now?".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshDecision {
    pub should_refresh: bool,
    pub reason: RefreshReason,
}

impl RefreshDecision {
    fn go(reason: RefreshReason) -> Self {
        Self { should_refresh: true, reason }
    }

    fn skip(reason: RefreshReason) -> Self {
        Self { should_refresh: false, reason }
    }
}

/// Stateless refresh decider over a config and its anchor schedule.
#[derive(Debug, Clone)]
pub struct RefreshPolicy {
    config: RefreshConfig,
    schedule: UpdateSchedule,
}

impl Default for RefreshPolicy {
    fn default() -> Self {
        Self::new(RefreshConfig::default())
    }
}

impl RefreshPolicy {
    pub fn new(config: RefreshConfig) -> Self {
        let schedule = UpdateSchedule::new(config.anchor_times());
        Self { config, schedule }
    }

    pub fn config(&self) -> &RefreshConfig {
        &self.config
    }

    pub fn schedule(&self) -> &UpdateSchedule {
        &self.schedule
    }

    /// Decide whether `data_date`'s record should be re-fetched, evaluated
    /// at the current wall-clock time.
    pub fn should_refresh(
        &self,
        data_date: NaiveDate,
        data_type: DataType,
        last_fetched: Option<DateTime<Utc>>,
        force: bool,
    ) -> RefreshDecision {
        self.should_refresh_at(Local::now(), data_date, data_type, last_fetched, force)
    }

    /// Same decision with an explicit evaluation time, for tests and replay.
    pub fn should_refresh_at(
        &self,
        now: DateTime<Local>,
        data_date: NaiveDate,
        data_type: DataType,
        last_fetched: Option<DateTime<Utc>>,
        force: bool,
    ) -> RefreshDecision {
        let decision = self.evaluate(now, data_date, data_type, last_fetched, force);
        tracing::trace!(
            %data_date,
            ?data_type,
            reason = %decision.reason,
            refresh = decision.should_refresh,
            "refresh decision"
        );
        decision
    }

    // Rule order matters: the first matching rule wins. In particular the
    // staleness check runs before the archive check, so archive_data only
    // applies to records already fetched after the latest anchor.
    fn evaluate(
        &self,
        now: DateTime<Local>,
        data_date: NaiveDate,
        data_type: DataType,
        last_fetched: Option<DateTime<Utc>>,
        force: bool,
    ) -> RefreshDecision {
        if force {
            return RefreshDecision::go(RefreshReason::ForceRefresh);
        }
        let last_fetched = match last_fetched {
            None => return RefreshDecision::go(RefreshReason::NewData),
            Some(ts) => ts,
        };

        // Calendar-day age; future-dated records count as recent.
        let days_old = (now.date_naive() - data_date).num_days();
        if days_old <= self.config.force_refresh_days {
            return RefreshDecision::go(RefreshReason::RecentData);
        }

        if data_type == DataType::Stats
            && days_old <= self.config.stat_correction_days
            && now.with_timezone(&Utc) - last_fetched
                >= Duration::hours(self.config.correction_refetch_hours)
        {
            return RefreshDecision::go(RefreshReason::StatCorrectionWindow);
        }

        if last_fetched.with_timezone(&Local) < self.schedule.last_update_before(now) {
            return RefreshDecision::go(RefreshReason::StaleData);
        }

        if days_old > self.config.archive_threshold_days {
            return RefreshDecision::skip(RefreshReason::ArchiveData);
        }

        RefreshDecision::skip(RefreshReason::UpToDate)
    }
}
