//! SHA-256 content fingerprints over canonicalized record projections.
//!
//! A fingerprint covers only the semantically meaningful fields of a record,
//! so a re-fetch that differs in display fields, key order, player order, or
//! float noise hashes to the same digest and is never mistaken for a change.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sha2::{Digest, Sha256};

use crate::canonical::{canonical_string, normalize};
use crate::models::{Lineup, StatLine, Transaction};
use crate::{DEFAULT_LINEUP_STATUS, DEFAULT_TRANSACTION_STATUS};

/// Lowercase hex SHA-256 of a string.
pub fn sha256_hex(input: &str) -> String {
    hex::encode(Sha256::digest(input.as_bytes()))
}

/// Fingerprint an arbitrary mapping: canonicalize, serialize, hash.
pub fn fingerprint(value: &Value) -> String {
    sha256_hex(&canonical_string(&normalize(value)))
}

/// Fingerprint a lineup. Projects date, team key, and per-player
/// (id, position, status); players are ordered by player id during
/// normalization, so caller-side ordering is irrelevant.
pub fn fingerprint_lineup(lineup: &Lineup) -> String {
    let players: Vec<Value> = lineup
        .players
        .iter()
        .map(|slot| {
            json!({
                "player_id": slot.player_id,
                "position": slot.position,
                "status": slot.status.as_deref().unwrap_or(DEFAULT_LINEUP_STATUS),
            })
        })
        .collect();
    fingerprint(&json!({
        "date": lineup.date,
        "team_key": lineup.team_key,
        "players": players,
    }))
}

/// Fingerprint a stat line. Projects player id, date, and the stat mapping
/// (stat names hash in sorted order).
pub fn fingerprint_stats(stat_line: &StatLine) -> String {
    fingerprint(&json!({
        "player_id": stat_line.player_id,
        "date": stat_line.date,
        "stats": stat_line.stats,
    }))
}

/// Fingerprint a transaction. Projects the six identifying fields; status
/// defaults to "completed" when absent.
pub fn fingerprint_transaction(txn: &Transaction) -> String {
    fingerprint(&json!({
        "transaction_id": txn.transaction_id,
        "type": txn.kind,
        "player_id": txn.player_id,
        "team_key": txn.team_key,
        "date": txn.date,
        "status": txn.status.as_deref().unwrap_or(DEFAULT_TRANSACTION_STATUS),
    }))
}

/// How a record differs from its previously stored version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    New,
    Modified,
}

/// Outcome of a change check. `changed == false` means the stored copy is
/// identical and the write can be skipped.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeDetection {
    pub changed: bool,
    pub fingerprint: String,
    pub change_type: Option<ChangeType>,
}

/// Compare a record against its previously stored fingerprint. This is the
/// sole decision point for whether a record is worth persisting.
pub fn detect_change<T, F>(existing: Option<&str>, record: &T, fingerprint_fn: F) -> ChangeDetection
where
    F: Fn(&T) -> String,
{
    let fingerprint = fingerprint_fn(record);
    match existing {
        None => {
            tracing::debug!(fingerprint = %fingerprint, "first sighting of record");
            ChangeDetection {
                changed: true,
                fingerprint,
                change_type: Some(ChangeType::New),
            }
        }
        Some(prev) if prev != fingerprint => {
            tracing::debug!(old = %prev, new = %fingerprint, "record content changed");
            ChangeDetection {
                changed: true,
                fingerprint,
                change_type: Some(ChangeType::Modified),
            }
        }
        Some(_) => {
            tracing::trace!(fingerprint = %fingerprint, "record content unchanged");
            ChangeDetection {
                changed: false,
                fingerprint,
                change_type: None,
            }
        }
    }
}
