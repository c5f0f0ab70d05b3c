use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("browser error: {0}")]
    Browser(String),
    #[error("render timed out after {0:?}")]
    Timeout(Duration),
}

/// Renders a page the way a browser would, scripts included.
#[async_trait::async_trait]
pub trait DynamicRenderer: Send + Sync {
    async fn render(&self, url: &str, timeout: Duration) -> Result<String, RenderError>;
}

#[cfg(feature = "headless")]
pub use chromium::ChromiumRenderer;

#[cfg(feature = "headless")]
mod chromium {
    use std::time::Duration;

    use chromiumoxide::browser::{Browser, BrowserConfig};
    use futures_util::StreamExt;
    use sitewatch_logging::watch_debug;

    use super::{DynamicRenderer, RenderError};

    /// Pause after navigation settles, giving client scripts a beat to
    /// finish filling the DOM.
    const SETTLE_DELAY: Duration = Duration::from_millis(500);

    /// Headless-Chromium renderer.
    ///
    /// Launches a fresh browser per render; monitoring cadences are slow
    /// enough that a pooled browser is not worth the lifecycle bookkeeping.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct ChromiumRenderer;

    #[async_trait::async_trait]
    impl DynamicRenderer for ChromiumRenderer {
        async fn render(&self, url: &str, timeout: Duration) -> Result<String, RenderError> {
            let config = BrowserConfig::builder()
                .build()
                .map_err(RenderError::Browser)?;
            let (mut browser, mut handler) = Browser::launch(config)
                .await
                .map_err(|err| RenderError::Browser(err.to_string()))?;
            // The handler stream must be polled for the browser to make
            // progress at all.
            let driver = tokio::spawn(async move { while handler.next().await.is_some() {} });

            let outcome = tokio::time::timeout(timeout, async {
                let page = browser.new_page(url).await?;
                page.wait_for_navigation().await?;
                tokio::time::sleep(SETTLE_DELAY).await;
                page.content().await
            })
            .await;

            if let Err(err) = browser.close().await {
                watch_debug!("browser close failed: {}", err);
            }
            driver.abort();

            match outcome {
                Err(_) => Err(RenderError::Timeout(timeout)),
                Ok(Ok(markup)) => Ok(markup),
                Ok(Err(err)) => Err(RenderError::Browser(err.to_string())),
            }
        }
    }
}
