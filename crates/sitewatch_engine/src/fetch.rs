use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use sitewatch_core::{FetchMode, MonitorSettings, SiteSpec};
use sitewatch_logging::{watch_debug, watch_warn};

use crate::render::DynamicRenderer;
use crate::retry::{retry_with_backoff, RetryPolicy};

/// Framework markers whose presence flags a page as client-rendered.
pub const DYNAMIC_MARKERS: [&str; 4] = ["react", "angular", "vue", "svelte"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    pub body: String,
    /// URL after redirects.
    pub final_url: String,
    /// True when the body came out of a browser render rather than the raw
    /// HTTP response.
    pub rendered: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchError {
    pub kind: FetchFailure,
    pub message: String,
}

impl FetchError {
    pub(crate) fn new(kind: FetchFailure, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for FetchError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchFailure {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    Network,
    ClientBuild,
}

impl fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchFailure::InvalidUrl => write!(f, "invalid url"),
            FetchFailure::HttpStatus(code) => write!(f, "http status {code}"),
            FetchFailure::Timeout => write!(f, "timeout"),
            FetchFailure::Network => write!(f, "network error"),
            FetchFailure::ClientBuild => write!(f, "http client build failed"),
        }
    }
}

/// Produces the markup for one site, however many tiers that takes.
#[async_trait::async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_page(&self, site: &SiteSpec) -> Result<FetchedPage, FetchError>;
}

/// Scans a static body for client-rendered-framework markers.
pub fn looks_client_rendered(body: &str) -> bool {
    let lower = body.to_lowercase();
    DYNAMIC_MARKERS.iter().any(|marker| lower.contains(marker))
}

/// Static-first fetcher with an optional browser-render tier.
///
/// The static tier always runs first; its failure makes the site
/// unavailable without consulting the browser. The dynamic tier only
/// upgrades a static success and never downgrades one: when rendering
/// fails, the static body is kept.
pub struct TieredFetcher {
    client: reqwest::Client,
    renderer: Option<Arc<dyn DynamicRenderer>>,
    retry: RetryPolicy,
    dynamic_timeout: Duration,
}

impl TieredFetcher {
    pub fn new(
        settings: &MonitorSettings,
        renderer: Option<Arc<dyn DynamicRenderer>>,
    ) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(settings.fetch_timeout)
            .user_agent(settings.user_agent.clone())
            .build()
            .map_err(|err| FetchError::new(FetchFailure::ClientBuild, err.to_string()))?;
        Ok(Self {
            client,
            renderer,
            retry: RetryPolicy {
                attempts: settings.attempts,
                initial_delay: settings.retry_delay,
                backoff_factor: settings.backoff_factor,
            },
            dynamic_timeout: settings.dynamic_fetch_timeout,
        })
    }

    async fn fetch_static(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let parsed = reqwest::Url::parse(url)
            .map_err(|err| FetchError::new(FetchFailure::InvalidUrl, err.to_string()))?;
        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::new(
                FetchFailure::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }
        let final_url = response.url().to_string();
        let body = response.text().await.map_err(map_reqwest_error)?;
        Ok(FetchedPage {
            body,
            final_url,
            rendered: false,
        })
    }

    /// Upgrades a static capture through the browser, keeping the static
    /// body when no renderer is configured or rendering keeps failing.
    async fn render_dynamic(&self, url: &str, fallback: FetchedPage) -> FetchedPage {
        let Some(renderer) = self.renderer.as_ref() else {
            watch_debug!("no renderer available for {}, keeping static body", url);
            return fallback;
        };
        let attempt = retry_with_backoff(&self.retry, || {
            renderer.render(url, self.dynamic_timeout)
        })
        .await;
        match attempt {
            Ok(body) => {
                watch_debug!("rendered {} in a browser ({} bytes)", url, body.len());
                FetchedPage {
                    body,
                    final_url: fallback.final_url,
                    rendered: true,
                }
            }
            Err(err) => {
                watch_warn!("dynamic render failed for {}, keeping static body: {}", url, err);
                fallback
            }
        }
    }
}

#[async_trait::async_trait]
impl PageFetcher for TieredFetcher {
    async fn fetch_page(&self, site: &SiteSpec) -> Result<FetchedPage, FetchError> {
        let page = retry_with_backoff(&self.retry, || self.fetch_static(&site.url)).await?;
        match site.mode {
            FetchMode::Static => Ok(page),
            FetchMode::Dynamic => Ok(self.render_dynamic(&site.url, page).await),
            FetchMode::Auto => {
                if looks_client_rendered(&page.body) {
                    watch_debug!("{} looks client-rendered, trying a browser pass", site.url);
                    Ok(self.render_dynamic(&site.url, page).await)
                } else {
                    Ok(page)
                }
            }
        }
    }
}

fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        return FetchError::new(FetchFailure::Timeout, err.to_string());
    }
    FetchError::new(FetchFailure::Network, err.to_string())
}
