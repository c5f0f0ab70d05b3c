use std::collections::HashMap;
use std::sync::Arc;

use sitewatch_core::SiteState;
use tokio::sync::Mutex;

/// Per-site monitoring state, one async lock per site.
///
/// Holding a site's lock across fetch-compare-commit gives each site a
/// single writer: concurrent checks of different sites proceed freely,
/// duplicate checks of the same site serialize. Constructed per session;
/// nothing survives a monitor restart.
#[derive(Default)]
pub struct SnapshotStore {
    sites: Mutex<HashMap<String, Arc<Mutex<SiteState>>>>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the state cell for `site`, creating an empty one on first
    /// sight.
    pub async fn entry(&self, site: &str) -> Arc<Mutex<SiteState>> {
        let mut sites = self.sites.lock().await;
        sites
            .entry(site.to_owned())
            .or_insert_with(|| Arc::new(Mutex::new(SiteState::default())))
            .clone()
    }
}
