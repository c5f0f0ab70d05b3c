use std::time::Duration;

/// Lower bound on the cycle interval.
pub const MIN_CHECK_INTERVAL: Duration = Duration::from_secs(1);

/// Tunable knobs for a monitoring run.
///
/// Passed explicitly to the engine; nothing reads configuration from
/// global state.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorSettings {
    /// Pause between the end of one cycle and the start of the next.
    pub check_interval: Duration,
    /// Timeout for one static fetch attempt.
    pub fetch_timeout: Duration,
    /// Timeout for one browser render.
    pub dynamic_fetch_timeout: Duration,
    /// Total fetch attempts per check; 1 means no retries.
    pub attempts: u32,
    /// Delay before the first retry.
    pub retry_delay: Duration,
    /// Multiplier applied to the delay after each failed attempt.
    pub backoff_factor: f64,
    /// Anomaly scores strictly above this trigger a suspicion notification.
    pub anomaly_threshold: f32,
    /// Minimum spacing between anomaly notifications per site.
    pub notification_cooldown: Duration,
    /// How many sites may be checked concurrently within one cycle.
    pub max_concurrency: usize,
    pub user_agent: String,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            check_interval: Duration::from_secs(300),
            fetch_timeout: Duration::from_secs(10),
            dynamic_fetch_timeout: Duration::from_secs(20),
            attempts: 3,
            retry_delay: Duration::from_secs(1),
            backoff_factor: 2.0,
            anomaly_threshold: 0.5,
            notification_cooldown: Duration::from_secs(3600),
            max_concurrency: 4,
            user_agent: concat!("sitewatch/", env!("CARGO_PKG_VERSION")).to_owned(),
        }
    }
}

impl MonitorSettings {
    /// Interval actually used by the scheduler, clamped to the floor.
    pub fn effective_interval(&self) -> Duration {
        self.check_interval.max(MIN_CHECK_INTERVAL)
    }
}
