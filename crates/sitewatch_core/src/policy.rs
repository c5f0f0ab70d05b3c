use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::report::{ChangeResult, NotificationEvent, Severity, SiteStatus};
use crate::snapshot::SiteState;

/// Decides whether a check outcome warrants a notification.
///
/// Pure: the clock is a parameter and the caller owns the state update.
/// Availability-loss alerts fire on the transition into `Unavailable` and
/// ignore the cooldown; anomaly alerts respect it.
pub fn decide(
    site: &str,
    change: &ChangeResult,
    state: &SiteState,
    anomaly_threshold: f32,
    cooldown: Duration,
    now: DateTime<Utc>,
) -> Option<NotificationEvent> {
    if change.status == SiteStatus::Unavailable {
        return match state.last_status {
            Some(SiteStatus::Baseline) | Some(SiteStatus::Available) => Some(NotificationEvent {
                site: site.to_owned(),
                severity: Severity::Warning,
                message: format!("site {site} is unreachable"),
                timestamp: now,
            }),
            // Already down, or never seen up: nothing to announce.
            Some(SiteStatus::Unavailable) | None => None,
        };
    }
    if change.anomaly_score > anomaly_threshold && !within_cooldown(state, cooldown, now) {
        let pct = f64::from(change.anomaly_score) * 100.0;
        return Some(NotificationEvent {
            site: site.to_owned(),
            severity: Severity::Critical,
            message: format!("suspicious change detected on {site} (anomaly {pct:.0}%)"),
            timestamp: now,
        });
    }
    None
}

fn within_cooldown(state: &SiteState, cooldown: Duration, now: DateTime<Utc>) -> bool {
    let Some(last) = state.last_notified_at else {
        return false;
    };
    match now.signed_duration_since(last).to_std() {
        Ok(elapsed) => elapsed < cooldown,
        // The stored time is in the future; stay inside the window.
        Err(_) => true,
    }
}
