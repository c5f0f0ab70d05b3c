use thiserror::Error;
use url::Url;

/// How a site's markup should be obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchMode {
    /// Static fetch first, falling back to a browser render when the page
    /// looks client-rendered.
    #[default]
    Auto,
    /// Plain HTTP fetch only.
    Static,
    /// Always render in a browser.
    Dynamic,
}

/// One monitored site: canonical URL plus capture options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteSpec {
    pub url: String,
    /// Optional CSS selector narrowing the comparison to one page region.
    pub selector: Option<String>,
    pub mode: FetchMode,
}

impl SiteSpec {
    pub fn new(url: &str) -> Result<Self, SiteUrlError> {
        Ok(Self {
            url: canonical_url(url)?,
            selector: None,
            mode: FetchMode::Auto,
        })
    }

    pub fn with_selector(mut self, selector: impl Into<String>) -> Self {
        self.selector = Some(selector.into());
        self
    }

    pub fn with_mode(mut self, mode: FetchMode) -> Self {
        self.mode = mode;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SiteUrlError {
    #[error("empty url")]
    Empty,
    #[error("invalid url {0:?}: {1}")]
    Invalid(String, String),
    #[error("unsupported scheme {0:?}")]
    UnsupportedScheme(String),
}

/// Canonical form used as the identity of a site everywhere in the system.
///
/// Bare hosts get an https scheme, the host is lowercased, and a single
/// trailing slash is stripped, so `Example.com` and `https://example.com/`
/// name the same site.
pub fn canonical_url(input: &str) -> Result<String, SiteUrlError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(SiteUrlError::Empty);
    }
    let candidate = if trimmed.contains("://") {
        trimmed.to_owned()
    } else {
        format!("https://{trimmed}")
    };
    let parsed = Url::parse(&candidate)
        .map_err(|err| SiteUrlError::Invalid(trimmed.to_owned(), err.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => {}
        other => return Err(SiteUrlError::UnsupportedScheme(other.to_owned())),
    }
    let mut canonical = parsed.to_string();
    if canonical.ends_with('/') {
        canonical.pop();
    }
    Ok(canonical)
}
