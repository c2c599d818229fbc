//! Typed HTTP client for the scan tracking service.
//!
//! | Method | Path | Operation |
//! |--------|------|-----------|
//! | GET | `/api/v1/devices/{barcode}` | Device record, 404 when unknown |
//! | GET | `/api/v1/devices?limit=&window_minutes=` | Recent devices, newest first |

use crate::config::TrackingConfig;
use crate::error::{Result, TrackingError};
use crate::source::ConfirmationSource;
use crate::types::{ScanConfirmation, TrackedDevice};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;
use url::Url;

const API_PREFIX: [&str; 2] = ["api", "v1"];

#[derive(Debug, Clone)]
pub struct TrackingClient {
    http: reqwest::Client,
    base_url: Url,
}

impl TrackingClient {
    pub fn new(config: TrackingConfig) -> Result<Self> {
        if config.base_url.cannot_be_a_base() {
            return Err(TrackingError::config(format!(
                "tracking URL {} cannot be used as a base",
                config.base_url
            )));
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TrackingError::Http {
                endpoint: "client_init".into(),
                source: e,
            })?;

        Ok(Self {
            http,
            base_url: config.base_url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `{base_url}/api/v1/<segments>`, each segment percent-encoded.
    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| TrackingError::config("tracking URL cannot be used as a base"))?
            .pop_if_empty()
            .extend(API_PREFIX)
            .extend(segments);
        Ok(url)
    }

    /// Fetch the record for `barcode`; `None` when the service has none.
    pub async fn get_device(&self, barcode: &str) -> Result<Option<TrackedDevice>> {
        let endpoint = format!("GET /devices/{barcode}");
        let url = self.url(&["devices", barcode])?;

        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| TrackingError::Http {
                endpoint: endpoint.clone(),
                source: e,
            })?;

        if resp.status() == StatusCode::NOT_FOUND {
            debug!(barcode, "Tracking service has no record");
            return Ok(None);
        }

        decode(endpoint, resp).await.map(Some)
    }

    /// List devices issued within the last `window_minutes`.
    pub async fn list_devices(&self, limit: u32, window_minutes: u32) -> Result<Vec<TrackedDevice>> {
        let endpoint = "GET /devices".to_string();
        let mut url = self.url(&["devices"])?;
        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string())
            .append_pair("window_minutes", &window_minutes.to_string());

        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| TrackingError::Http {
                endpoint: endpoint.clone(),
                source: e,
            })?;

        decode(endpoint, resp).await
    }
}

async fn decode<T: DeserializeOwned>(endpoint: String, resp: reqwest::Response) -> Result<T> {
    if !resp.status().is_success() {
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        return Err(TrackingError::Status {
            endpoint,
            status,
            body,
        });
    }

    resp.json()
        .await
        .map_err(|e| TrackingError::Deserialization {
            endpoint,
            source: e,
        })
}

impl ConfirmationSource for TrackingClient {
    async fn check_status(&self, barcode: &str) -> Result<ScanConfirmation> {
        Ok(match self.get_device(barcode).await? {
            Some(device) => ScanConfirmation::from_device(&device),
            None => ScanConfirmation::unknown(),
        })
    }

    async fn list_recent(&self, limit: u32, window_minutes: u32) -> Result<Vec<TrackedDevice>> {
        self.list_devices(limit, window_minutes).await
    }
}
