//! Sitewatch engine: fetch, normalize, diff and notify pipeline.
mod fetch;
mod monitor;
mod normalize;
mod notify;
mod pipeline;
mod render;
mod retry;
mod score;
mod store;

pub use fetch::{
    looks_client_rendered, FetchError, FetchFailure, FetchedPage, PageFetcher, TieredFetcher,
    DYNAMIC_MARKERS,
};
pub use monitor::{MonitorEvent, MonitorHandle, RunState};
pub use normalize::{content_hash, normalize, NormalizedPage};
pub use notify::{LogSink, NotificationSink, SinkError, WebhookSink};
pub use pipeline::{CheckOutcome, DiffArtifact, SitePipeline};
#[cfg(feature = "headless")]
pub use render::ChromiumRenderer;
pub use render::{DynamicRenderer, RenderError};
pub use retry::{retry_with_backoff, RetryPolicy};
pub use score::{AnomalyScorer, MarkerScorer, ScoreError};
pub use store::SnapshotStore;
