//! Sitewatch core: pure change-detection domain, no IO.
mod diff;
mod policy;
mod report;
mod settings;
mod site;
mod snapshot;

pub use diff::{
    detect_change, markup_change_pct, overall_change_pct, CONTENT_WEIGHT, METADATA_WEIGHT,
    STRUCTURE_WEIGHT,
};
pub use policy::decide;
pub use report::{ChangeResult, CycleStats, NotificationEvent, Severity, SiteReport, SiteStatus};
pub use settings::{MonitorSettings, MIN_CHECK_INTERVAL};
pub use site::{canonical_url, FetchMode, SiteSpec, SiteUrlError};
pub use snapshot::{SiteState, Snapshot};
