use std::sync::Arc;

use chrono::Utc;
use sitewatch_core::{
    decide, detect_change, ChangeResult, MonitorSettings, NotificationEvent, SiteReport, SiteSpec,
    SiteStatus, Snapshot,
};
use sitewatch_logging::watch_warn;

use crate::fetch::PageFetcher;
use crate::normalize::{content_hash, normalize};
use crate::notify::NotificationSink;
use crate::score::AnomalyScorer;
use crate::store::SnapshotStore;

/// Everything one site check produced.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckOutcome {
    pub report: SiteReport,
    /// Present when a real comparison happened, that is when a previous
    /// capture existed.
    pub diff: Option<DiffArtifact>,
    /// True when this check emitted a notification.
    pub notified: bool,
}

/// Raw material for an external diff report: both captures plus the result.
#[derive(Debug, Clone, PartialEq)]
pub struct DiffArtifact {
    pub site: String,
    pub old_markup: String,
    pub new_markup: String,
    pub change: ChangeResult,
}

/// Checks one site end to end: fetch, normalize, compare, score, decide,
/// commit, notify.
pub struct SitePipeline {
    fetcher: Arc<dyn PageFetcher>,
    scorer: Arc<dyn AnomalyScorer>,
    sinks: Vec<Arc<dyn NotificationSink>>,
    store: Arc<SnapshotStore>,
    settings: MonitorSettings,
}

impl SitePipeline {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        scorer: Arc<dyn AnomalyScorer>,
        sinks: Vec<Arc<dyn NotificationSink>>,
        store: Arc<SnapshotStore>,
        settings: MonitorSettings,
    ) -> Self {
        Self {
            fetcher,
            scorer,
            sinks,
            store,
            settings,
        }
    }

    /// Never fails: fetch problems become the `unavailable` status, so one
    /// bad site cannot poison a cycle.
    pub async fn check_site(&self, site: &SiteSpec) -> CheckOutcome {
        let cell = self.store.entry(&site.url).await;
        let mut state = cell.lock().await;

        let fetched = self.fetcher.fetch_page(site).await;
        let now = Utc::now();
        match fetched {
            Err(err) => {
                watch_warn!("fetch failed for {}: {}", site.url, err);
                let change = ChangeResult::unavailable(now);
                let event = decide(
                    &site.url,
                    &change,
                    &state,
                    self.settings.anomaly_threshold,
                    self.settings.notification_cooldown,
                    now,
                );
                state.last_status = Some(SiteStatus::Unavailable);
                let notified = event.is_some();
                if let Some(event) = event {
                    state.last_notified_at = Some(now);
                    self.dispatch(event);
                }
                CheckOutcome {
                    report: SiteReport::from_change(&site.url, &change),
                    diff: None,
                    notified,
                }
            }
            Ok(page) => {
                let normalized = normalize(&page.body, site.selector.as_deref());
                let snapshot = Snapshot {
                    content_hash: content_hash(&page.body),
                    raw_markup: page.body,
                    visible_text: normalized.visible_text,
                    structural_markup: normalized.structural_markup,
                    metadata: normalized.metadata,
                    captured_at: now,
                };
                let mut change = detect_change(state.previous.as_ref(), &snapshot, now);
                change.anomaly_score = self.score_text(&snapshot.visible_text).await;
                let event = decide(
                    &site.url,
                    &change,
                    &state,
                    self.settings.anomaly_threshold,
                    self.settings.notification_cooldown,
                    now,
                );
                let diff = state.previous.as_ref().map(|previous| DiffArtifact {
                    site: site.url.clone(),
                    old_markup: previous.raw_markup.clone(),
                    new_markup: snapshot.raw_markup.clone(),
                    change: change.clone(),
                });
                let report = SiteReport::from_change(&site.url, &change);
                state.previous = Some(snapshot);
                state.last_status = Some(change.status);
                let notified = event.is_some();
                if let Some(event) = event {
                    state.last_notified_at = Some(now);
                    self.dispatch(event);
                }
                CheckOutcome {
                    report,
                    diff,
                    notified,
                }
            }
        }
    }

    /// Runs the scorer on the blocking pool; scorer trouble degrades to a
    /// zero score rather than failing the check.
    async fn score_text(&self, visible_text: &str) -> f32 {
        let scorer = Arc::clone(&self.scorer);
        let text = visible_text.to_owned();
        match tokio::task::spawn_blocking(move || scorer.score(&text)).await {
            Ok(Ok(score)) if score.is_finite() => score.clamp(0.0, 1.0),
            Ok(Ok(score)) => {
                watch_warn!("anomaly scorer returned {}, treating as 0", score);
                0.0
            }
            Ok(Err(err)) => {
                watch_warn!("anomaly scorer failed: {}", err);
                0.0
            }
            Err(err) => {
                watch_warn!("anomaly scorer task failed: {}", err);
                0.0
            }
        }
    }

    /// Hands the event to every sink on its own task; delivery never
    /// blocks the pipeline.
    fn dispatch(&self, event: NotificationEvent) {
        for sink in &self.sinks {
            let sink = Arc::clone(sink);
            let event = event.clone();
            tokio::spawn(async move {
                if let Err(err) = sink.send(&event).await {
                    watch_warn!("sink {} failed for {}: {}", sink.name(), event.site, err);
                }
            });
        }
    }
}
