//! End-to-end check of the collector flow: read stored state, make a refresh
//! decision, fetch (simulated), fingerprint, detect changes, write back.
//!
//! The real collector talks to the fantasy and MLB APIs and a Postgres
//! replica; here both ends are simulated so the flow can run anywhere. The
//! evaluation clock is pinned so every decision is deterministic.

use std::collections::HashMap;

use anyhow::ensure;
use chrono::{DateTime, Duration, Local, NaiveDate, TimeZone, Utc};
use serde_json::{json, Value};

use change_tracker::{
    detect_change, diff_lineups, diff_stats, fingerprint_lineup, fingerprint_stats,
    fingerprint_transaction, ChangeType, Lineup, StatLine, Transaction,
};
use refresh_policy::{DataType, RefreshPolicy, RefreshReason};

/// What the real pipeline keeps per record: the content hash and when the
/// record was last fetched from upstream.
struct StoredRecord {
    content_hash: String,
    last_fetched: DateTime<Utc>,
}

#[derive(Default)]
struct MemoryStore {
    records: HashMap<String, StoredRecord>,
}

impl MemoryStore {
    fn content_hash(&self, key: &str) -> Option<&str> {
        self.records.get(key).map(|r| r.content_hash.as_str())
    }

    fn last_fetched(&self, key: &str) -> Option<DateTime<Utc>> {
        self.records.get(key).map(|r| r.last_fetched)
    }

    fn put(&mut self, key: &str, content_hash: String, last_fetched: DateTime<Utc>) {
        self.records.insert(
            key.to_string(),
            StoredRecord {
                content_hash,
                last_fetched,
            },
        );
    }
}

/// Pinned evaluation time: 2025-08-15 12:00 local. The latest batch anchor
/// before it is 06:00 the same day.
fn now_local() -> DateTime<Local> {
    let naive = NaiveDate::from_ymd_opt(2025, 8, 15)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap();
    Local
        .from_local_datetime(&naive)
        .earliest()
        .expect("valid local time")
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// Simulated upstream responses. Shapes match what the fantasy and MLB APIs
// actually return: string player keys on the fantasy side, numeric ids on
// the MLB side, display fields mixed in.

async fn fetch_lineup_initial() -> Value {
    json!({
        "date": "2025-08-14",
        "team_key": "431.l.1234.t.5",
        "players": [
            {"player_id": "431.p.8967", "position": "SS"},
            {"player_id": "431.p.9001", "position": "1B"},
            {"player_id": "431.p.7163", "position": "OF"},
        ]
    })
}

async fn fetch_lineup_reordered() -> Value {
    // Same roster, different order, display names attached.
    json!({
        "team_key": "431.l.1234.t.5",
        "date": "2025-08-14",
        "players": [
            {"player_id": "431.p.7163", "position": "OF", "name": "Jackson Merrill"},
            {"player_id": "431.p.9001", "position": "1B", "name": "Vinnie Pasquantino"},
            {"player_id": "431.p.8967", "position": "SS", "name": "Bobby Witt Jr."},
        ]
    })
}

async fn fetch_lineup_after_move() -> Value {
    // 9001 slides to 3B and the outfielder is swapped out.
    json!({
        "date": "2025-08-14",
        "team_key": "431.l.1234.t.5",
        "players": [
            {"player_id": "431.p.8967", "position": "SS"},
            {"player_id": "431.p.9001", "position": "3B"},
            {"player_id": "431.p.5498", "position": "OF"},
        ]
    })
}

async fn fetch_stat_line(corrected: bool) -> Value {
    // MLB scoring change: a hit initially ruled an error.
    let (hits, avg) = if corrected { (3, 0.75) } else { (2, 0.5) };
    json!({
        "player_id": 660271,
        "date": "2025-08-09",
        "stats": {"AB": 4, "H": hits, "HR": 1, "RBI": 2, "AVG": avg}
    })
}

async fn fetch_transaction() -> Value {
    json!({
        "transaction_id": "431.l.1234.tr.88",
        "type": "add",
        "player_id": "431.p.5498",
        "team_key": "431.l.1234.t.5",
        "date": "2025-08-14"
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    println!("🚀 Starting collector flow integration test");

    let now = now_local();
    let policy = RefreshPolicy::default();
    let mut store = MemoryStore::default();

    // Test 1: first sight of a lineup
    println!("\n📋 Test 1: First sight of a lineup...");
    let lineup_key = "lineup:431.l.1234.t.5:2025-08-14";
    let decision = policy.should_refresh_at(
        now,
        date(2025, 8, 14),
        DataType::Lineup,
        store.last_fetched(lineup_key),
        false,
    );
    ensure!(decision.should_refresh, "unseen lineup must refresh");
    ensure!(decision.reason == RefreshReason::NewData, "expected new_data, got {}", decision.reason);

    let lineup = Lineup::from_value(&fetch_lineup_initial().await);
    let detection = detect_change(store.content_hash(lineup_key), &lineup, fingerprint_lineup);
    ensure!(detection.change_type == Some(ChangeType::New), "first sighting must be new");
    store.put(lineup_key, detection.fingerprint, now.with_timezone(&Utc));
    println!("✅ Stored new lineup ({} players)", lineup.players.len());

    // Test 2: re-fetch returns the same roster in a different shape
    println!("\n🔁 Test 2: Reordered re-fetch with display fields...");
    let decision = policy.should_refresh_at(
        now,
        date(2025, 8, 14),
        DataType::Lineup,
        store.last_fetched(lineup_key),
        false,
    );
    ensure!(decision.reason == RefreshReason::RecentData, "1-day-old data refreshes as recent");

    let refetched = Lineup::from_value(&fetch_lineup_reordered().await);
    let detection = detect_change(store.content_hash(lineup_key), &refetched, fingerprint_lineup);
    ensure!(!detection.changed, "cosmetic differences must not register as a change");
    println!("✅ Fingerprint unchanged, write skipped");

    // Test 3: an actual roster move
    println!("\n🔄 Test 3: Roster move...");
    let moved = Lineup::from_value(&fetch_lineup_after_move().await);
    let detection = detect_change(store.content_hash(lineup_key), &moved, fingerprint_lineup);
    ensure!(detection.change_type == Some(ChangeType::Modified), "roster move must be modified");

    let diff = diff_lineups(&lineup, &moved);
    println!("   Roster diff: {}", diff.summary());
    ensure!(diff.players_added == vec!["431.p.5498".to_string()], "expected 5498 added");
    ensure!(diff.players_removed == vec!["431.p.7163".to_string()], "expected 7163 removed");
    ensure!(diff.position_changes.contains_key("431.p.9001"), "expected 9001 position change");
    store.put(lineup_key, detection.fingerprint, now.with_timezone(&Utc));
    println!("✅ Modification detected and stored");

    // Test 4: stat correction window
    println!("\n📊 Test 4: Retroactive stat correction...");
    let stats_key = "stats:660271:2025-08-09";
    let first_fetch = now.with_timezone(&Utc) - Duration::hours(26);
    let initial = StatLine::from_value(&fetch_stat_line(false).await);
    let detection = detect_change(store.content_hash(stats_key), &initial, fingerprint_stats);
    store.put(stats_key, detection.fingerprint, first_fetch);

    let decision = policy.should_refresh_at(
        now,
        date(2025, 8, 9),
        DataType::Stats,
        store.last_fetched(stats_key),
        false,
    );
    ensure!(decision.should_refresh, "stats in the correction window must refresh");
    ensure!(
        decision.reason == RefreshReason::StatCorrectionWindow,
        "expected stat_correction_window, got {}",
        decision.reason
    );

    let corrected = StatLine::from_value(&fetch_stat_line(true).await);
    let detection = detect_change(store.content_hash(stats_key), &corrected, fingerprint_stats);
    ensure!(detection.change_type == Some(ChangeType::Modified), "correction must be modified");

    let deltas = diff_stats(&initial, &corrected);
    for (stat, delta) in &deltas {
        println!(
            "   {} {:?} -> {:?} (delta {:?})",
            stat, delta.old, delta.new, delta.difference
        );
    }
    ensure!(deltas.contains_key("H"), "hits correction must appear in the diff");
    ensure!(deltas["H"].difference == Some(1.0), "hits delta must be +1");
    ensure!(!deltas.contains_key("AB"), "unchanged stats must not appear in the diff");
    store.put(stats_key, detection.fingerprint, now.with_timezone(&Utc));
    println!("✅ Correction detected with {} changed stats", deltas.len());

    // Test 5: transaction flow
    println!("\n💱 Test 5: Transaction first sight...");
    let txn_key = "txn:431.l.1234.tr.88";
    let txn = Transaction::from_value(&fetch_transaction().await);
    let detection = detect_change(store.content_hash(txn_key), &txn, fingerprint_transaction);
    ensure!(detection.change_type == Some(ChangeType::New), "unseen transaction must be new");
    ensure!(detection.fingerprint.len() == 64, "fingerprint must be a sha256 hex digest");
    store.put(txn_key, detection.fingerprint.clone(), now.with_timezone(&Utc));

    // Re-detect with an explicit "completed" status: the default must match.
    let mut explicit = txn.clone();
    explicit.status = Some("completed".to_string());
    let detection = detect_change(store.content_hash(txn_key), &explicit, fingerprint_transaction);
    ensure!(!detection.changed, "default status must hash like explicit completed");
    println!("✅ Transaction stored and stable");

    // Test 6: refresh decision sweep across record ages
    println!("\n⏱️  Test 6: Refresh decision sweep...");
    let yesterday_evening = Some(
        (now - Duration::hours(13)).with_timezone(&Utc), // 2025-08-14 23:00
    );
    let after_anchor = Some(
        (now - Duration::hours(5)).with_timezone(&Utc), // 2025-08-15 07:00
    );
    let sweep = [
        ("recent lineup", date(2025, 8, 14), DataType::Lineup, yesterday_evening, false, true, RefreshReason::RecentData),
        ("archived lineup", date(2025, 6, 1), DataType::Lineup, after_anchor, false, false, RefreshReason::ArchiveData),
        ("stale archive", date(2025, 6, 1), DataType::Lineup, yesterday_evening, false, true, RefreshReason::StaleData),
        ("settled transaction", date(2025, 7, 30), DataType::Transaction, after_anchor, false, false, RefreshReason::UpToDate),
        ("forced anything", date(2024, 4, 1), DataType::Stats, after_anchor, true, true, RefreshReason::ForceRefresh),
        ("never fetched", date(2024, 4, 1), DataType::Stats, None, false, true, RefreshReason::NewData),
    ];
    for (label, data_date, data_type, last_fetched, force, expect_refresh, expect_reason) in sweep {
        let decision = policy.should_refresh_at(now, data_date, data_type, last_fetched, force);
        println!(
            "   {label}: refresh={} reason={}",
            decision.should_refresh, decision.reason
        );
        ensure!(
            decision.should_refresh == expect_refresh && decision.reason == expect_reason,
            "{label}: expected ({expect_refresh}, {expect_reason}), got ({}, {})",
            decision.should_refresh,
            decision.reason
        );
    }
    println!("✅ All decisions match the policy");

    println!("\n🎉 Collector flow integration test passed");
    Ok(())
}
