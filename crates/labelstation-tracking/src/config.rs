//! Tracking service client configuration.

use crate::error::{Result, TrackingError};
use url::Url;

/// Default request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Where and how to reach the tracking service.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackingConfig {
    /// Service root, e.g. `http://tracking.local:8080/`.
    pub base_url: Url,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl TrackingConfig {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Parse a base URL, rejecting anything that cannot carry a path.
    pub fn parse(base_url: &str) -> Result<Self> {
        let url = Url::parse(base_url)
            .map_err(|e| TrackingError::config(format!("invalid tracking URL {base_url:?}: {e}")))?;
        if url.cannot_be_a_base() {
            return Err(TrackingError::config(format!(
                "tracking URL {base_url:?} cannot be used as a base"
            )));
        }
        Ok(Self::new(url))
    }

    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `LABELSTATION_TRACKING_URL` (unset means no tracking service)
    /// - `LABELSTATION_TRACKING_TIMEOUT_SECS` (default: 10)
    pub fn from_env() -> Result<Option<Self>> {
        let Ok(base_url) = std::env::var("LABELSTATION_TRACKING_URL") else {
            return Ok(None);
        };
        if base_url.trim().is_empty() {
            return Ok(None);
        }

        let timeout_secs = match std::env::var("LABELSTATION_TRACKING_TIMEOUT_SECS") {
            Ok(raw) => raw.parse().map_err(|_| {
                TrackingError::config(format!("LABELSTATION_TRACKING_TIMEOUT_SECS: {raw:?}"))
            })?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Some(Self::parse(base_url.trim())?.with_timeout_secs(timeout_secs)))
    }
}
