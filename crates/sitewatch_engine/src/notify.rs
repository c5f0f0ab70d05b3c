use std::time::Duration;

use sitewatch_core::{NotificationEvent, Severity};
use sitewatch_logging::{watch_error, watch_warn};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SinkError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("endpoint rejected the notification: {0}")]
    Rejected(String),
}

/// Delivers one notification to one destination.
#[async_trait::async_trait]
pub trait NotificationSink: Send + Sync {
    /// Short destination name for log lines.
    fn name(&self) -> &str;
    async fn send(&self, event: &NotificationEvent) -> Result<(), SinkError>;
}

/// Sink that only writes the notification to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

#[async_trait::async_trait]
impl NotificationSink for LogSink {
    fn name(&self) -> &str {
        "log"
    }

    async fn send(&self, event: &NotificationEvent) -> Result<(), SinkError> {
        match event.severity {
            Severity::Warning => watch_warn!("{}: {}", event.site, event.message),
            Severity::Critical => watch_error!("{}: {}", event.site, event.message),
        }
        Ok(())
    }
}

/// POSTs the serialized notification to a configured endpoint.
pub struct WebhookSink {
    endpoint: String,
    client: reqwest::Client,
}

impl WebhookSink {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, SinkError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| SinkError::Transport(err.to_string()))?;
        Ok(Self {
            endpoint: endpoint.into(),
            client,
        })
    }
}

#[async_trait::async_trait]
impl NotificationSink for WebhookSink {
    fn name(&self) -> &str {
        "webhook"
    }

    async fn send(&self, event: &NotificationEvent) -> Result<(), SinkError> {
        let body = serde_json::to_string(event)
            .map_err(|err| SinkError::Transport(err.to_string()))?;
        let response = self
            .client
            .post(&self.endpoint)
            .header("content-type", "application/json")
            .body(body)
            .send()
            .await
            .map_err(|err| SinkError::Transport(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(SinkError::Rejected(status.to_string()));
        }
        Ok(())
    }
}
