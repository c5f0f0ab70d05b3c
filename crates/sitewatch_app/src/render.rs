//! Plain-text rendering of monitor events for the terminal.

use sitewatch_core::{CycleStats, SiteReport, SiteStatus};
use sitewatch_engine::DiffArtifact;

const SITE_WIDTH: usize = 42;

pub fn header() -> String {
    format!(
        "{:<width$} {:>11} {:>9} {:>9} {:>9} {:>9} {:>9}",
        "site",
        "status",
        "struct",
        "content",
        "meta",
        "overall",
        "anomaly",
        width = SITE_WIDTH
    )
}

pub fn cycle_started(cycle: u64, sites: usize) -> String {
    let now = chrono::Local::now();
    format!(
        "-- {} cycle {cycle}: checking {sites} site(s)",
        now.format("%H:%M:%S")
    )
}

pub fn report_row(report: &SiteReport) -> String {
    format!(
        "{:<width$} {:>11} {:>9} {:>9} {:>9} {:>9} {:>9}",
        shorten(&report.site, SITE_WIDTH),
        status_label(report.status),
        pct_cell(report.structure_pct),
        pct_cell(report.content_pct),
        pct_cell(report.metadata_pct),
        pct_cell(report.overall_pct),
        pct_cell(report.anomaly_pct),
        width = SITE_WIDTH
    )
}

/// One-line note for a comparison worth a human look; `None` when nothing
/// changed.
pub fn diff_note(artifact: &DiffArtifact) -> Option<String> {
    let overall = artifact.change.overall_pct?;
    if overall <= 0.0 {
        return None;
    }
    Some(format!(
        "   {} changed {:.1}% ({} -> {} bytes)",
        shorten(&artifact.site, SITE_WIDTH),
        overall,
        artifact.old_markup.len(),
        artifact.new_markup.len()
    ))
}

pub fn cycle_summary(cycle: u64, stats: &CycleStats) -> String {
    format!(
        "-- cycle {cycle}: {} checked, {} unavailable, {} notification(s)",
        stats.sites, stats.unavailable, stats.notifications
    )
}

fn status_label(status: SiteStatus) -> &'static str {
    match status {
        SiteStatus::Baseline => "baseline",
        SiteStatus::Available => "ok",
        SiteStatus::Unavailable => "DOWN",
    }
}

fn pct_cell(value: Option<f64>) -> String {
    match value {
        Some(pct) => format!("{pct:.1}%"),
        None => "-".to_string(),
    }
}

fn shorten(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(limit.saturating_sub(3)).collect();
    cut.push_str("...");
    cut
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use sitewatch_core::ChangeResult;

    use super::*;

    fn report(status: SiteStatus, overall: Option<f64>) -> SiteReport {
        SiteReport {
            site: "https://example.org".to_string(),
            status,
            structure_pct: overall,
            content_pct: overall,
            metadata_pct: overall,
            overall_pct: overall,
            anomaly_pct: overall,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn available_row_shows_percentages() {
        let row = report_row(&report(SiteStatus::Available, Some(12.5)));
        assert!(row.contains("ok"));
        assert!(row.contains("12.5%"));
    }

    #[test]
    fn unavailable_row_shows_dashes() {
        let row = report_row(&report(SiteStatus::Unavailable, None));
        assert!(row.contains("DOWN"));
        assert!(row.contains('-'));
    }

    #[test]
    fn long_site_names_are_shortened() {
        let mut long = report(SiteStatus::Baseline, Some(0.0));
        long.site = format!("https://{}.example.org", "a".repeat(80));
        let row = report_row(&long);
        assert!(row.contains("..."));
        assert!(!row.contains(&"a".repeat(80)));
    }

    #[test]
    fn quiet_diff_renders_nothing() {
        let artifact = DiffArtifact {
            site: "https://example.org".to_string(),
            old_markup: "<p>a</p>".to_string(),
            new_markup: "<p>a</p>".to_string(),
            change: ChangeResult::baseline(Utc::now()),
        };
        assert_eq!(diff_note(&artifact), None);
    }

    #[test]
    fn changed_diff_renders_the_byte_sizes() {
        let mut change = ChangeResult::baseline(Utc::now());
        change.overall_pct = Some(40.0);
        let artifact = DiffArtifact {
            site: "https://example.org".to_string(),
            old_markup: "<p>a</p>".to_string(),
            new_markup: "<p>a longer body</p>".to_string(),
            change,
        };
        let note = diff_note(&artifact).expect("a note for a real change");
        assert!(note.contains("40.0%"));
        assert!(note.contains("8 -> 20 bytes"));
    }
}
