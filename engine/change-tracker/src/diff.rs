//! Human-readable differences between successive record versions.
//!
//! Change detection itself is fingerprint-based; these diffs exist so the
//! collector can log what actually moved when a fingerprint flips.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use serde_json::Value;

use crate::canonical::round6;
use crate::models::{Lineup, LineupSlot, StatLine};

/// Roster-level difference between two versions of a lineup.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LineupDiff {
    pub players_added: Vec<String>,
    pub players_removed: Vec<String>,
    pub position_changes: BTreeMap<String, PositionChange>,
}

/// Before/after position for a player present in both versions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionChange {
    pub old: Option<String>,
    pub new: Option<String>,
}

impl LineupDiff {
    pub fn is_empty(&self) -> bool {
        self.players_added.is_empty()
            && self.players_removed.is_empty()
            && self.position_changes.is_empty()
    }

    /// One-line rendering for change logs.
    pub fn summary(&self) -> String {
        if self.is_empty() {
            return "no roster changes".to_string();
        }
        let mut parts = Vec::new();
        if !self.players_added.is_empty() {
            parts.push(format!("added {}", self.players_added.join(", ")));
        }
        if !self.players_removed.is_empty() {
            parts.push(format!("removed {}", self.players_removed.join(", ")));
        }
        for (player_id, change) in &self.position_changes {
            parts.push(format!(
                "{} {} -> {}",
                player_id,
                change.old.as_deref().unwrap_or("-"),
                change.new.as_deref().unwrap_or("-"),
            ));
        }
        parts.join("; ")
    }
}

/// Compare two lineups by player-id set, plus a position check for players
/// present in both. Output ordering is deterministic (sorted by player id).
pub fn diff_lineups(old: &Lineup, new: &Lineup) -> LineupDiff {
    let old_slots = slots_by_id(&old.players);
    let new_slots = slots_by_id(&new.players);

    let mut diff = LineupDiff::default();
    for (player_id, new_slot) in &new_slots {
        match old_slots.get(player_id) {
            None => diff.players_added.push((*player_id).to_string()),
            Some(old_slot) if old_slot.position != new_slot.position => {
                diff.position_changes.insert(
                    (*player_id).to_string(),
                    PositionChange {
                        old: old_slot.position.clone(),
                        new: new_slot.position.clone(),
                    },
                );
            }
            Some(_) => {}
        }
    }
    for player_id in old_slots.keys() {
        if !new_slots.contains_key(player_id) {
            diff.players_removed.push((*player_id).to_string());
        }
    }
    diff
}

fn slots_by_id(players: &[LineupSlot]) -> BTreeMap<&str, &LineupSlot> {
    players
        .iter()
        .filter_map(|slot| slot.player_id.as_deref().map(|id| (id, slot)))
        .collect()
}

/// Old value, new value, and numeric delta for one changed stat.
/// `difference` is `None` unless both sides are numeric.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatDelta {
    pub old: Option<Value>,
    pub new: Option<Value>,
    pub difference: Option<f64>,
}

/// Per-stat differences over the union of both sides' stat names. Values
/// equal after 6-decimal rounding (the fingerprint precision) are skipped,
/// so a diff never disagrees with the fingerprint.
pub fn diff_stats(old: &StatLine, new: &StatLine) -> BTreeMap<String, StatDelta> {
    let mut names: BTreeSet<&String> = old.stats.keys().collect();
    names.extend(new.stats.keys());

    let mut out = BTreeMap::new();
    for name in names {
        let old_value = old.stats.get(name);
        let new_value = new.stats.get(name);
        if stat_values_equal(old_value, new_value) {
            continue;
        }
        let difference = match (
            old_value.and_then(Value::as_f64),
            new_value.and_then(Value::as_f64),
        ) {
            (Some(a), Some(b)) => Some(round6(b - a)),
            _ => None,
        };
        out.insert(
            name.clone(),
            StatDelta {
                old: old_value.cloned(),
                new: new_value.cloned(),
                difference,
            },
        );
    }
    out
}

fn stat_values_equal(a: Option<&Value>, b: Option<&Value>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => round6(x) == round6(y),
            _ => a == b,
        },
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn lineup(players: &[(&str, &str)]) -> Lineup {
        Lineup {
            date: Some("2025-08-09".to_string()),
            team_key: Some("431.l.1234.t.5".to_string()),
            players: players
                .iter()
                .map(|(id, pos)| LineupSlot {
                    player_id: Some((*id).to_string()),
                    position: Some((*pos).to_string()),
                    status: None,
                })
                .collect(),
        }
    }

    fn stat_line(stats: &[(&str, Value)]) -> StatLine {
        StatLine {
            player_id: Some("660271".to_string()),
            date: Some("2025-08-09".to_string()),
            stats: stats
                .iter()
                .map(|(name, value)| ((*name).to_string(), value.clone()))
                .collect(),
        }
    }

    #[test]
    fn added_removed_and_unchanged() {
        let old = lineup(&[("1", "SS"), ("2", "1B")]);
        let new = lineup(&[("2", "1B"), ("3", "OF")]);
        let diff = diff_lineups(&old, &new);
        assert_eq!(diff.players_added, vec!["3"]);
        assert_eq!(diff.players_removed, vec!["1"]);
        assert!(diff.position_changes.is_empty());
    }

    #[test]
    fn position_swap_is_reported() {
        let old = lineup(&[("1", "SS"), ("2", "1B")]);
        let new = lineup(&[("1", "2B"), ("2", "1B")]);
        let diff = diff_lineups(&old, &new);
        assert!(diff.players_added.is_empty());
        assert!(diff.players_removed.is_empty());
        assert_eq!(
            diff.position_changes.get("1"),
            Some(&PositionChange {
                old: Some("SS".to_string()),
                new: Some("2B".to_string()),
            })
        );
    }

    #[test]
    fn identical_lineups_diff_empty() {
        let a = lineup(&[("1", "SS")]);
        let diff = diff_lineups(&a, &a.clone());
        assert!(diff.is_empty());
        assert_eq!(diff.summary(), "no roster changes");
    }

    #[test]
    fn summary_reads_naturally() {
        let old = lineup(&[("1", "SS"), ("2", "1B")]);
        let new = lineup(&[("2", "3B"), ("4", "OF")]);
        let summary = diff_lineups(&old, &new).summary();
        assert_eq!(summary, "added 4; removed 1; 2 1B -> 3B");
    }

    #[test]
    fn stat_delta_reports_numeric_difference() {
        let old = stat_line(&[("H", json!(2)), ("AB", json!(4))]);
        let new = stat_line(&[("H", json!(3)), ("AB", json!(4))]);
        let diff = diff_stats(&old, &new);
        assert_eq!(diff.len(), 1);
        let delta = &diff["H"];
        assert_eq!(delta.old, Some(json!(2)));
        assert_eq!(delta.new, Some(json!(3)));
        assert_eq!(delta.difference, Some(1.0));
    }

    #[test]
    fn stat_missing_on_one_side_has_no_numeric_delta() {
        let old = stat_line(&[]);
        let new = stat_line(&[("HR", json!(1))]);
        let diff = diff_stats(&old, &new);
        let delta = &diff["HR"];
        assert_eq!(delta.old, None);
        assert_eq!(delta.new, Some(json!(1)));
        assert_eq!(delta.difference, None);
    }

    #[test]
    fn non_numeric_stat_has_no_delta() {
        let old = stat_line(&[("note", json!("active"))]);
        let new = stat_line(&[("note", json!("suspended"))]);
        let delta = &diff_stats(&old, &new)["note"];
        assert_eq!(delta.difference, None);
    }

    #[test]
    fn float_noise_is_not_a_stat_change() {
        let old = stat_line(&[("AVG", json!(0.3))]);
        let new = stat_line(&[("AVG", json!(0.3000000004))]);
        assert!(diff_stats(&old, &new).is_empty());
    }

    #[test]
    fn int_and_float_of_same_value_are_equal() {
        let old = stat_line(&[("H", json!(2))]);
        let new = stat_line(&[("H", json!(2.0))]);
        assert!(diff_stats(&old, &new).is_empty());
    }
}
