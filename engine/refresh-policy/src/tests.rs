//! Decision-matrix tests for the refresh rules.
//!
//! All cases pin the evaluation time to 2025-08-15 12:00 local with the
//! default anchors (06:00, 13:00, 22:00), so the latest anchor is 06:00
//! on the evaluation day.

use chrono::{DateTime, Duration, Local, NaiveDate, TimeZone, Utc};

use crate::{DataType, RefreshPolicy, RefreshReason};

fn local(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Local> {
    let naive = NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, min, 0)
        .unwrap();
    Local
        .from_local_datetime(&naive)
        .earliest()
        .expect("valid local time")
}

fn now() -> DateTime<Local> {
    local(2025, 8, 15, 12, 0)
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn fetched_at(y: i32, m: u32, d: u32, h: u32, min: u32) -> Option<DateTime<Utc>> {
    Some(local(y, m, d, h, min).with_timezone(&Utc))
}

mod decision_rules {
    use super::*;

    #[test]
    fn force_wins_over_everything() {
        let policy = RefreshPolicy::default();
        let decision = policy.should_refresh_at(
            now(),
            date(2020, 1, 1),
            DataType::Lineup,
            fetched_at(2025, 8, 15, 11, 0),
            true,
        );
        assert!(decision.should_refresh);
        assert_eq!(decision.reason, RefreshReason::ForceRefresh);
    }

    #[test]
    fn never_fetched_is_new_data() {
        let policy = RefreshPolicy::default();
        let decision =
            policy.should_refresh_at(now(), date(2020, 1, 1), DataType::Transaction, None, false);
        assert!(decision.should_refresh);
        assert_eq!(decision.reason, RefreshReason::NewData);
    }

    #[test]
    fn one_day_old_is_recent() {
        let policy = RefreshPolicy::default();
        let decision = policy.should_refresh_at(
            now(),
            date(2025, 8, 14),
            DataType::Lineup,
            fetched_at(2025, 8, 14, 12, 0),
            false,
        );
        assert!(decision.should_refresh);
        assert_eq!(decision.reason, RefreshReason::RecentData);
    }

    #[test]
    fn stats_in_correction_window_refetch_after_a_day() {
        let policy = RefreshPolicy::default();
        // 6 days old, last fetched 26 hours ago.
        let decision = policy.should_refresh_at(
            now(),
            date(2025, 8, 9),
            DataType::Stats,
            fetched_at(2025, 8, 14, 10, 0),
            false,
        );
        assert!(decision.should_refresh);
        assert_eq!(decision.reason, RefreshReason::StatCorrectionWindow);
    }

    #[test]
    fn correction_window_is_stats_only() {
        let policy = RefreshPolicy::default();
        // Same timing as above but for a lineup: the correction rule is
        // skipped, and a fetch older than the 06:00 anchor is stale.
        let decision = policy.should_refresh_at(
            now(),
            date(2025, 8, 9),
            DataType::Lineup,
            fetched_at(2025, 8, 14, 10, 0),
            false,
        );
        assert!(decision.should_refresh);
        assert_eq!(decision.reason, RefreshReason::StaleData);
    }

    #[test]
    fn fetched_before_latest_anchor_is_stale() {
        let policy = RefreshPolicy::default();
        // 8 days old (outside the correction window), fetched at 05:00,
        // one hour before the morning batch.
        let decision = policy.should_refresh_at(
            now(),
            date(2025, 8, 7),
            DataType::Stats,
            fetched_at(2025, 8, 15, 5, 0),
            false,
        );
        assert!(decision.should_refresh);
        assert_eq!(decision.reason, RefreshReason::StaleData);
    }

    #[test]
    fn old_data_fetched_after_anchor_is_archived() {
        let policy = RefreshPolicy::default();
        let decision = policy.should_refresh_at(
            now(),
            date(2025, 6, 1),
            DataType::Lineup,
            fetched_at(2025, 8, 15, 7, 0),
            false,
        );
        assert!(!decision.should_refresh);
        assert_eq!(decision.reason, RefreshReason::ArchiveData);
    }

    #[test]
    fn staleness_beats_archive() {
        let policy = RefreshPolicy::default();
        // Well past the archive threshold, but the fetch predates the
        // latest anchor: the stale rule is checked first and wins.
        let decision = policy.should_refresh_at(
            now(),
            date(2025, 6, 1),
            DataType::Lineup,
            fetched_at(2025, 8, 14, 23, 0),
            false,
        );
        assert!(decision.should_refresh);
        assert_eq!(decision.reason, RefreshReason::StaleData);
    }

    #[test]
    fn mid_age_data_fetched_after_anchor_is_up_to_date() {
        let policy = RefreshPolicy::default();
        // 16 days old: past all refresh windows, not yet archived.
        let decision = policy.should_refresh_at(
            now(),
            date(2025, 7, 30),
            DataType::Lineup,
            fetched_at(2025, 8, 15, 7, 0),
            false,
        );
        assert!(!decision.should_refresh);
        assert_eq!(decision.reason, RefreshReason::UpToDate);
    }

    #[test]
    fn future_dated_records_count_as_recent() {
        let policy = RefreshPolicy::default();
        let decision = policy.should_refresh_at(
            now(),
            date(2025, 8, 20),
            DataType::Lineup,
            fetched_at(2025, 8, 15, 7, 0),
            false,
        );
        assert!(decision.should_refresh);
        assert_eq!(decision.reason, RefreshReason::RecentData);
    }
}

mod boundaries {
    use super::*;

    #[test]
    fn exactly_three_days_is_recent_four_is_not() {
        let policy = RefreshPolicy::default();
        let at_limit = policy.should_refresh_at(
            now(),
            date(2025, 8, 12),
            DataType::Lineup,
            fetched_at(2025, 8, 15, 7, 0),
            false,
        );
        assert_eq!(at_limit.reason, RefreshReason::RecentData);

        let past_limit = policy.should_refresh_at(
            now(),
            date(2025, 8, 11),
            DataType::Lineup,
            fetched_at(2025, 8, 15, 7, 0),
            false,
        );
        assert_eq!(past_limit.reason, RefreshReason::UpToDate);
    }

    #[test]
    fn correction_refetch_gap_is_inclusive_at_24_hours() {
        let policy = RefreshPolicy::default();
        let exactly = Some((now() - Duration::hours(24)).with_timezone(&Utc));
        let decision =
            policy.should_refresh_at(now(), date(2025, 8, 9), DataType::Stats, exactly, false);
        assert_eq!(decision.reason, RefreshReason::StatCorrectionWindow);

        // Fetched this morning, after the 06:00 anchor: the 24-hour gap is
        // not reached and no other rule fires.
        let this_morning = Some((now() - Duration::hours(5)).with_timezone(&Utc));
        let decision = policy.should_refresh_at(
            now(),
            date(2025, 8, 9),
            DataType::Stats,
            this_morning,
            false,
        );
        assert_eq!(decision.reason, RefreshReason::UpToDate);

        // A short gap does not suppress staleness: fetched 23 hours ago is
        // before the latest anchor, so the stale rule still fires.
        let just_under = Some((now() - Duration::hours(23)).with_timezone(&Utc));
        let decision =
            policy.should_refresh_at(now(), date(2025, 8, 9), DataType::Stats, just_under, false);
        assert_eq!(decision.reason, RefreshReason::StaleData);
    }

    #[test]
    fn seventh_day_is_in_correction_window_eighth_is_not() {
        let policy = RefreshPolicy::default();
        let day_seven = policy.should_refresh_at(
            now(),
            date(2025, 8, 8),
            DataType::Stats,
            fetched_at(2025, 8, 13, 12, 0),
            false,
        );
        assert_eq!(day_seven.reason, RefreshReason::StatCorrectionWindow);

        // One day older, same 2-day-old fetch: no correction rule, and the
        // fetch predates the latest anchor.
        let day_eight = policy.should_refresh_at(
            now(),
            date(2025, 8, 7),
            DataType::Stats,
            fetched_at(2025, 8, 13, 12, 0),
            false,
        );
        assert_eq!(day_eight.reason, RefreshReason::StaleData);
    }

    #[test]
    fn archive_threshold_is_exclusive_at_30_days() {
        let policy = RefreshPolicy::default();
        let at_limit = policy.should_refresh_at(
            now(),
            date(2025, 7, 16),
            DataType::Lineup,
            fetched_at(2025, 8, 15, 7, 0),
            false,
        );
        assert_eq!(at_limit.reason, RefreshReason::UpToDate);

        let past_limit = policy.should_refresh_at(
            now(),
            date(2025, 7, 15),
            DataType::Lineup,
            fetched_at(2025, 8, 15, 7, 0),
            false,
        );
        assert_eq!(past_limit.reason, RefreshReason::ArchiveData);
    }
}

mod reasons {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn reason_strings_match_storage_format() {
        assert_eq!(RefreshReason::ForceRefresh.as_str(), "force_refresh");
        assert_eq!(RefreshReason::NewData.as_str(), "new_data");
        assert_eq!(RefreshReason::RecentData.as_str(), "recent_data");
        assert_eq!(
            RefreshReason::StatCorrectionWindow.as_str(),
            "stat_correction_window"
        );
        assert_eq!(RefreshReason::StaleData.as_str(), "stale_data");
        assert_eq!(RefreshReason::ArchiveData.as_str(), "archive_data");
        assert_eq!(RefreshReason::UpToDate.as_str(), "up_to_date");
        assert_eq!(RefreshReason::UpToDate.to_string(), "up_to_date");
    }

    #[test]
    fn data_types_parse_from_strings() {
        assert_eq!(DataType::from_str("stats").unwrap(), DataType::Stats);
        assert_eq!(DataType::from_str("Lineup").unwrap(), DataType::Lineup);
        assert_eq!(
            DataType::from_str("transactions").unwrap(),
            DataType::Transaction
        );
        assert!(DataType::from_str("scores").is_err());
    }
}
