//! # Change Tracker
//!
//! Content fingerprinting and change detection for fantasy baseball records.
//!
//! The collector re-fetches lineups, stat lines, and transactions far more
//! often than they actually change. This crate gives it a cheap answer to
//! "did anything change?": each record kind has a deterministic SHA-256
//! fingerprint over its semantically meaningful fields, computed from a
//! canonicalized projection so that key order, player order, float noise,
//! and display-only fields never register as changes.
//!
//! Everything here is a pure function over record data: no I/O, no shared
//! state, safe to call from any number of concurrent tasks. Malformed or
//! partial input degrades to fingerprints of whatever was present; nothing
//! in this crate returns an error.

pub mod canonical;
pub mod diff;
pub mod fingerprint;
pub mod models;

pub use canonical::{canonical_string, normalize, IDENTITY_KEYS};
pub use diff::{diff_lineups, diff_stats, LineupDiff, PositionChange, StatDelta};
pub use fingerprint::{
    detect_change, fingerprint, fingerprint_lineup, fingerprint_stats, fingerprint_transaction,
    sha256_hex, ChangeDetection, ChangeType,
};
pub use models::{Lineup, LineupSlot, StatLine, Transaction};

/// Roster status assumed when a lineup slot carries none.
pub const DEFAULT_LINEUP_STATUS: &str = "active";

/// Transaction status assumed when a transaction carries none.
pub const DEFAULT_TRANSACTION_STATUS: &str = "completed";
