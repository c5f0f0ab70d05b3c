use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::report::SiteStatus;

/// One normalized capture of a page.
///
/// A fetch always produces a fresh snapshot; nothing mutates an existing
/// one, so two captures can safely be compared at any time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// Markup exactly as fetched (or rendered).
    pub raw_markup: String,
    /// Trimmed text nodes joined with newlines, scripts and styles removed.
    pub visible_text: String,
    /// The cleaned markup tree, serialized deterministically.
    pub structural_markup: String,
    /// `meta[name]` to `content`, sorted by name.
    pub metadata: BTreeMap<String, String>,
    /// SHA-256 of the raw markup, hex-encoded.
    pub content_hash: String,
    pub captured_at: DateTime<Utc>,
}

/// Everything the monitor remembers about one site between checks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiteState {
    pub previous: Option<Snapshot>,
    pub last_status: Option<SiteStatus>,
    pub last_notified_at: Option<DateTime<Utc>>,
}
