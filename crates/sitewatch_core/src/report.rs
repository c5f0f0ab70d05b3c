use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Outcome classification for one check of one site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SiteStatus {
    /// First successful capture; nothing to compare against yet.
    Baseline,
    /// Fetched and compared against the previous capture.
    Available,
    /// The site could not be fetched.
    Unavailable,
}

impl SiteStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SiteStatus::Baseline => "baseline",
            SiteStatus::Available => "available",
            SiteStatus::Unavailable => "unavailable",
        }
    }
}

impl fmt::Display for SiteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of comparing a fresh capture against the previous one.
///
/// Percentages are `None` when the site was unavailable: an unreachable
/// site has no difference measurement, which is not the same as measuring
/// zero change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangeResult {
    pub status: SiteStatus,
    pub structure_pct: Option<f64>,
    pub content_pct: Option<f64>,
    pub metadata_pct: Option<f64>,
    pub overall_pct: Option<f64>,
    /// Anomaly score in `[0, 1]`; stays 0 until a scorer has run.
    pub anomaly_score: f32,
    pub computed_at: DateTime<Utc>,
}

impl ChangeResult {
    /// Result for a first capture: comparison fields all read "no change".
    pub fn baseline(now: DateTime<Utc>) -> Self {
        Self {
            status: SiteStatus::Baseline,
            structure_pct: Some(0.0),
            content_pct: Some(0.0),
            metadata_pct: Some(0.0),
            overall_pct: Some(0.0),
            anomaly_score: 0.0,
            computed_at: now,
        }
    }

    /// Result for a failed fetch: comparison fields are absent.
    pub fn unavailable(now: DateTime<Utc>) -> Self {
        Self {
            status: SiteStatus::Unavailable,
            structure_pct: None,
            content_pct: None,
            metadata_pct: None,
            overall_pct: None,
            anomaly_score: 0.0,
            computed_at: now,
        }
    }
}

/// Per-site record handed to consumers after every check.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SiteReport {
    pub site: String,
    pub status: SiteStatus,
    pub structure_pct: Option<f64>,
    pub content_pct: Option<f64>,
    pub metadata_pct: Option<f64>,
    pub overall_pct: Option<f64>,
    /// Anomaly score as a percentage, rounded to two decimals.
    pub anomaly_pct: Option<f64>,
    pub updated_at: DateTime<Utc>,
}

impl SiteReport {
    pub fn from_change(site: impl Into<String>, change: &ChangeResult) -> Self {
        let anomaly_pct = match change.status {
            SiteStatus::Unavailable => None,
            SiteStatus::Baseline | SiteStatus::Available => {
                Some(round2(f64::from(change.anomaly_score) * 100.0))
            }
        };
        Self {
            site: site.into(),
            status: change.status,
            structure_pct: change.structure_pct.map(round2),
            content_pct: change.content_pct.map(round2),
            metadata_pct: change.metadata_pct.map(round2),
            overall_pct: change.overall_pct.map(round2),
            anomaly_pct,
            updated_at: change.computed_at,
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// How urgent a notification is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// A site stopped answering.
    Warning,
    /// A suspected defacement.
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Warning => "warning",
            Severity::Critical => "critical",
        })
    }
}

/// One alert produced by the notification policy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotificationEvent {
    pub site: String,
    pub severity: Severity,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Counters accumulated over one monitoring cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CycleStats {
    pub sites: usize,
    pub unavailable: usize,
    pub notifications: usize,
}
