//! Record models for the three tracked kinds: lineups, stat lines, and
//! transactions.
//!
//! Partial-record policy: every projected field is optional and deserializes
//! leniently. An incomplete upstream payload still yields a usable record (and
//! a fingerprint of whatever was present) rather than an error. Display-only
//! fields such as player names are not modeled, so they can never reach a
//! fingerprint.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One fantasy team's roster for one date.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Lineup {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub team_key: Option<String>,
    #[serde(default)]
    pub players: Vec<LineupSlot>,
}

/// A single roster slot within a lineup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LineupSlot {
    #[serde(default, deserialize_with = "lenient_id")]
    pub player_id: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    /// Roster status; fingerprinted as "active" when absent.
    #[serde(default)]
    pub status: Option<String>,
}

/// One player's statistics for one date. Stat values are numeric in practice
/// but carried opaquely so an odd upstream value never breaks parsing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatLine {
    #[serde(default, deserialize_with = "lenient_id")]
    pub player_id: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub stats: BTreeMap<String, Value>,
}

/// A league transaction (add, drop, trade leg, waiver claim).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(default, deserialize_with = "lenient_id")]
    pub transaction_id: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "lenient_id")]
    pub player_id: Option<String>,
    #[serde(default)]
    pub team_key: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    /// Fingerprinted as "completed" when absent.
    #[serde(default)]
    pub status: Option<String>,
}

impl Lineup {
    /// Lenient parse from a raw payload; anything unusable becomes the
    /// empty record.
    pub fn from_value(value: &Value) -> Self {
        serde_json::from_value(value.clone()).unwrap_or_default()
    }
}

impl StatLine {
    pub fn from_value(value: &Value) -> Self {
        serde_json::from_value(value.clone()).unwrap_or_default()
    }
}

impl Transaction {
    pub fn from_value(value: &Value) -> Self {
        serde_json::from_value(value.clone()).unwrap_or_default()
    }
}

/// Identifiers arrive as strings from the fantasy API and as numbers from the
/// MLB stats API; both become strings here.
fn lenient_id<'de, D>(de: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(de)?;
    Ok(value.and_then(|v| match v {
        Value::Null => None,
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }))
}
