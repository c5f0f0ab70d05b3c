use chrono::{DateTime, Utc};
use similar::TextDiff;

use crate::report::{ChangeResult, SiteStatus};
use crate::snapshot::Snapshot;

pub const STRUCTURE_WEIGHT: f64 = 0.4;
pub const CONTENT_WEIGHT: f64 = 0.4;
pub const METADATA_WEIGHT: f64 = 0.2;

/// Percentage difference between two markup strings, in `[0, 100]`.
///
/// 0 means identical, 100 means nothing in common. The measure is
/// `(1 - ratio) * 100`, where `ratio` is the longest-common-subsequence
/// similarity over characters.
pub fn markup_change_pct(old: &str, new: &str) -> f64 {
    if old.is_empty() && new.is_empty() {
        return 0.0;
    }
    if old.is_empty() || new.is_empty() {
        // A page appearing from, or collapsing to, nothing is total change.
        return 100.0;
    }
    let ratio = f64::from(TextDiff::from_chars(old, new).ratio());
    ((1.0 - ratio) * 100.0).clamp(0.0, 100.0)
}

/// Weighted overall change across the three category percentages.
pub fn overall_change_pct(structure: f64, content: f64, metadata: f64) -> f64 {
    structure * STRUCTURE_WEIGHT + content * CONTENT_WEIGHT + metadata * METADATA_WEIGHT
}

/// Compares a fresh capture against the previous one, if any.
///
/// The caller fills in `anomaly_score` once a scorer has run; detection
/// itself never waits on scoring.
pub fn detect_change(
    previous: Option<&Snapshot>,
    current: &Snapshot,
    now: DateTime<Utc>,
) -> ChangeResult {
    let previous = match previous {
        None => return ChangeResult::baseline(now),
        Some(prev) => prev,
    };
    let pct = if previous.content_hash == current.content_hash {
        // Identical raw markup normalizes identically; skip the diff.
        0.0
    } else {
        markup_change_pct(&previous.structural_markup, &current.structural_markup)
    };
    ChangeResult {
        status: SiteStatus::Available,
        structure_pct: Some(pct),
        content_pct: Some(pct),
        metadata_pct: Some(pct),
        overall_pct: Some(overall_change_pct(pct, pct, pct)),
        anomaly_score: 0.0,
        computed_at: now,
    }
}
