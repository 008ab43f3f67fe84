//! Data access for the display: five independent reads of the backend.

use std::future::Future;
use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::config::FETCH_TIMEOUT_SECS;
use crate::display::engine::PollBatch;
use crate::error::FetchError;
use crate::types::{BannerSettings, DisplaySettings, MediaItem, PromoImage, RateSnapshot};

/// Where the display gets its data. `Ok(None)` means the backend legitimately
/// has nothing; `Err` means the read itself failed.
pub trait SignageSource {
    fn current_rates(&self) -> impl Future<Output = Result<Option<RateSnapshot>, FetchError>> + Send;
    fn display_settings(&self) -> impl Future<Output = Result<Option<DisplaySettings>, FetchError>> + Send;
    fn active_media(&self) -> impl Future<Output = Result<Vec<MediaItem>, FetchError>> + Send;
    fn active_promos(&self) -> impl Future<Output = Result<Vec<PromoImage>, FetchError>> + Send;
    fn banner(&self) -> impl Future<Output = Result<Option<BannerSettings>, FetchError>> + Send;
}

/// Run all five reads concurrently. A failure in one never cancels the others.
pub async fn poll_all<S: SignageSource + Sync>(source: &S) -> PollBatch {
    let (rates, settings, media, promos, banner) = tokio::join!(
        source.current_rates(),
        source.display_settings(),
        source.active_media(),
        source.active_promos(),
        source.banner(),
    );
    PollBatch { rates, settings, media, promos, banner }
}

// ---------------------------------------------------------------------------
// HTTP implementation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct HttpSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSource {
    pub fn new(base_url: impl Into<String>) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
            .build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self { client, base_url: base_url.into().trim_end_matches('/').to_string() }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, FetchError> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self.client.get(&url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(FetchError::Status {
                status: status.as_u16(),
                message: error_message(status.as_u16(), &body),
            });
        }
        let bytes = resp.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

impl SignageSource for HttpSource {
    async fn current_rates(&self) -> Result<Option<RateSnapshot>, FetchError> {
        self.get_json("/api/rates/current").await
    }

    async fn display_settings(&self) -> Result<Option<DisplaySettings>, FetchError> {
        let body: serde_json::Value = self.get_json("/api/settings/display").await?;
        settings_from_body(body)
    }

    async fn active_media(&self) -> Result<Vec<MediaItem>, FetchError> {
        self.get_json("/api/media?active=true").await
    }

    async fn active_promos(&self) -> Result<Vec<PromoImage>, FetchError> {
        self.get_json("/api/promo?active=true").await
    }

    async fn banner(&self) -> Result<Option<BannerSettings>, FetchError> {
        self.get_json("/api/banner").await
    }
}

/// The backend answers `{}` when no settings row exists.
fn settings_from_body(body: serde_json::Value) -> Result<Option<DisplaySettings>, FetchError> {
    match &body {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::Object(map) if map.is_empty() => Ok(None),
        _ => Ok(Some(serde_json::from_value(body)?)),
    }
}

/// Message for a non-2xx response: the JSON `message` field, else the raw
/// body, else a generic status line.
pub fn error_message(status: u16, body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(message) = json.get("message").and_then(|m| m.as_str()) {
            return message.to_string();
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        format!("HTTP error! status: {status}")
    } else {
        trimmed.to_string()
    }
}
