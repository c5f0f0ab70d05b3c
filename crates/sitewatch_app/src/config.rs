//! RON configuration for the sitewatch binary.
//!
//! Every tuning knob is optional and falls back to the engine defaults;
//! only the site list is meaningful to provide.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use sitewatch_core::{FetchMode, MonitorSettings, SiteSpec, SiteUrlError};
use sitewatch_logging::watch_warn;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot parse {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },
    #[error("site entry {index}: {source}")]
    Site {
        index: usize,
        #[source]
        source: SiteUrlError,
    },
}

/// Validated configuration, ready to hand to the monitor.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub settings: MonitorSettings,
    pub sites: Vec<SiteSpec>,
    pub webhook: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
struct ConfigFile {
    check_interval_secs: u64,
    fetch_timeout_secs: u64,
    dynamic_fetch_timeout_secs: u64,
    attempts: u32,
    retry_delay_secs: u64,
    backoff_factor: f64,
    anomaly_threshold: f32,
    notification_cooldown_secs: u64,
    max_concurrency: usize,
    user_agent: Option<String>,
    webhook_url: Option<String>,
    sites: Vec<SiteEntry>,
}

impl Default for ConfigFile {
    fn default() -> Self {
        let defaults = MonitorSettings::default();
        Self {
            check_interval_secs: defaults.check_interval.as_secs(),
            fetch_timeout_secs: defaults.fetch_timeout.as_secs(),
            dynamic_fetch_timeout_secs: defaults.dynamic_fetch_timeout.as_secs(),
            attempts: defaults.attempts,
            retry_delay_secs: defaults.retry_delay.as_secs(),
            backoff_factor: defaults.backoff_factor,
            anomaly_threshold: defaults.anomaly_threshold,
            notification_cooldown_secs: defaults.notification_cooldown.as_secs(),
            max_concurrency: defaults.max_concurrency,
            user_agent: None,
            webhook_url: None,
            sites: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SiteEntry {
    url: String,
    #[serde(default)]
    selector: Option<String>,
    #[serde(default)]
    mode: ModeEntry,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
enum ModeEntry {
    #[default]
    Auto,
    Static,
    Dynamic,
}

impl From<ModeEntry> for FetchMode {
    fn from(mode: ModeEntry) -> Self {
        match mode {
            ModeEntry::Auto => FetchMode::Auto,
            ModeEntry::Static => FetchMode::Static,
            ModeEntry::Dynamic => FetchMode::Dynamic,
        }
    }
}

pub fn load(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let file: ConfigFile = ron::from_str(&content).map_err(|err| ConfigError::Parse {
        path: path.to_path_buf(),
        message: err.to_string(),
    })?;
    build(file)
}

/// Starter configuration with one example site, in the accepted syntax.
pub fn template() -> String {
    let example = ConfigFile {
        sites: vec![SiteEntry {
            url: "https://www.example.org".to_string(),
            selector: None,
            mode: ModeEntry::Auto,
        }],
        ..ConfigFile::default()
    };
    let pretty = ron::ser::PrettyConfig::new();
    ron::ser::to_string_pretty(&example, pretty).unwrap_or_default()
}

fn build(file: ConfigFile) -> Result<AppConfig, ConfigError> {
    let defaults = MonitorSettings::default();
    let settings = MonitorSettings {
        check_interval: Duration::from_secs(file.check_interval_secs),
        fetch_timeout: Duration::from_secs(file.fetch_timeout_secs),
        dynamic_fetch_timeout: Duration::from_secs(file.dynamic_fetch_timeout_secs),
        attempts: file.attempts,
        retry_delay: Duration::from_secs(file.retry_delay_secs),
        backoff_factor: file.backoff_factor,
        anomaly_threshold: file.anomaly_threshold,
        notification_cooldown: Duration::from_secs(file.notification_cooldown_secs),
        max_concurrency: file.max_concurrency,
        user_agent: file.user_agent.unwrap_or(defaults.user_agent),
    };

    let mut sites: Vec<SiteSpec> = Vec::new();
    for (index, entry) in file.sites.into_iter().enumerate() {
        let mut spec =
            SiteSpec::new(&entry.url).map_err(|source| ConfigError::Site { index, source })?;
        if let Some(selector) = entry.selector {
            spec = spec.with_selector(selector);
        }
        spec = spec.with_mode(entry.mode.into());
        if sites.iter().any(|existing| existing.url == spec.url) {
            watch_warn!("duplicate site {} ignored", spec.url);
            continue;
        }
        sites.push(spec);
    }

    Ok(AppConfig {
        settings,
        sites,
        webhook: file.webhook_url,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_config(dir: &tempfile::TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("sitewatch.ron");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn full_config_round_trips_every_field() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = write_config(
            &dir,
            r##"(
                check_interval_secs: 60,
                fetch_timeout_secs: 5,
                dynamic_fetch_timeout_secs: 15,
                attempts: 2,
                retry_delay_secs: 1,
                backoff_factor: 1.5,
                anomaly_threshold: 0.4,
                notification_cooldown_secs: 600,
                max_concurrency: 2,
                user_agent: Some("sitewatch-test/1.0"),
                webhook_url: Some("https://hooks.example.org/defacement"),
                sites: [
                    (url: "example.org", selector: Some("#content"), mode: Dynamic),
                    (url: "https://two.example.org/"),
                ],
            )"##,
        );

        let config = load(&path).unwrap();

        assert_eq!(config.settings.check_interval, Duration::from_secs(60));
        assert_eq!(config.settings.fetch_timeout, Duration::from_secs(5));
        assert_eq!(config.settings.attempts, 2);
        assert_eq!(config.settings.anomaly_threshold, 0.4);
        assert_eq!(config.settings.user_agent, "sitewatch-test/1.0");
        assert_eq!(
            config.webhook.as_deref(),
            Some("https://hooks.example.org/defacement")
        );

        assert_eq!(config.sites.len(), 2);
        assert_eq!(config.sites[0].url, "https://example.org");
        assert_eq!(config.sites[0].selector.as_deref(), Some("#content"));
        assert_eq!(config.sites[0].mode, FetchMode::Dynamic);
        assert_eq!(config.sites[1].url, "https://two.example.org");
        assert_eq!(config.sites[1].mode, FetchMode::Auto);
    }

    #[test]
    fn omitted_fields_fall_back_to_engine_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = write_config(&dir, r#"(sites: [(url: "example.org")])"#);

        let config = load(&path).unwrap();

        assert_eq!(config.settings, MonitorSettings::default());
        assert_eq!(config.webhook, None);
        assert_eq!(config.sites.len(), 1);
    }

    #[test]
    fn bad_site_url_is_reported_with_its_index() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = write_config(
            &dir,
            r#"(sites: [(url: "one.example.org"), (url: "ftp://files.example.org")])"#,
        );

        let err = load(&path).unwrap_err();

        match err {
            ConfigError::Site { index, source } => {
                assert_eq!(index, 1);
                assert!(matches!(source, SiteUrlError::UnsupportedScheme(_)));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn duplicate_sites_collapse_to_one_entry() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = write_config(
            &dir,
            r#"(sites: [(url: "example.org"), (url: "https://example.org/")])"#,
        );

        let config = load(&path).unwrap();

        assert_eq!(config.sites.len(), 1);
        assert_eq!(config.sites[0].url, "https://example.org");
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nope.ron");

        let err = load(&path).unwrap_err();

        match err {
            ConfigError::Read { source, .. } => {
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn invalid_syntax_is_a_parse_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = write_config(&dir, "this is not ron");

        assert!(matches!(load(&path).unwrap_err(), ConfigError::Parse { .. }));
    }

    #[test]
    fn template_loads_cleanly() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = write_config(&dir, &template());

        let config = load(&path).unwrap();

        assert_eq!(config.sites.len(), 1);
        assert_eq!(config.settings, MonitorSettings::default());
    }
}
