//! Sync orchestrator configuration.
//!
//! Read-only to consumers; set at orchestrator construction from
//! environment variables or explicit values.

use crate::error::{SyncError, SyncResult};

/// Default sync interval: 5 minutes.
pub const DEFAULT_INTERVAL_SECS: u64 = 300;

/// Default per-request timeout: 30 seconds. Every network call is bounded;
/// a timeout is a cycle failure, not a crash.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Client-side sync configuration.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Base URL of the session gateway (e.g. "http://localhost:8080").
    pub server_url: String,

    /// Seconds between periodic sync attempts.
    pub interval_secs: u64,

    /// Bounded timeout applied to every gateway call.
    pub request_timeout_secs: u64,

    /// Client-chosen stable device identifier sent on register/login.
    pub device_id: String,

    /// Human-readable device name, if any.
    pub device_name: Option<String>,
}

impl SyncConfig {
    /// Creates a config from explicit values with default timings.
    pub fn new(server_url: impl Into<String>, device_id: impl Into<String>) -> Self {
        SyncConfig {
            server_url: server_url.into(),
            interval_secs: DEFAULT_INTERVAL_SECS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            device_id: device_id.into(),
            device_name: None,
        }
    }

    /// Creates a config from environment variables or provided values.
    ///
    /// `QUILL_SERVER_URL` and `QUILL_SYNC_INTERVAL_SECS` back the optional
    /// parameters; the device identity is always explicit.
    pub fn from_env_or(
        server_url: Option<String>,
        device_id: String,
        device_name: Option<String>,
    ) -> Self {
        let server_url = server_url
            .or_else(|| std::env::var("QUILL_SERVER_URL").ok())
            .unwrap_or_else(|| "http://localhost:8080".to_string());

        let interval_secs = std::env::var("QUILL_SYNC_INTERVAL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_INTERVAL_SECS);

        SyncConfig {
            server_url,
            interval_secs,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            device_id,
            device_name,
        }
    }

    /// Overrides the sync interval.
    pub fn interval_secs(mut self, secs: u64) -> Self {
        self.interval_secs = secs;
        self
    }

    /// Overrides the request timeout.
    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }

    /// Sets the device name.
    pub fn device_name(mut self, name: impl Into<String>) -> Self {
        self.device_name = Some(name.into());
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> SyncResult<()> {
        url::Url::parse(&self.server_url)
            .map_err(|e| SyncError::InvalidConfig(format!("server_url: {}", e)))?;

        if self.device_id.trim().is_empty() {
            return Err(SyncError::InvalidConfig("device_id is required".into()));
        }

        if self.interval_secs == 0 {
            return Err(SyncError::InvalidConfig(
                "interval_secs must be positive".into(),
            ));
        }

        Ok(())
    }
}
