use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::time::interval;
use tracing::{error, info, warn};

use crate::config::{PusherConfig, FETCH_TIMEOUT_SECS};
use crate::error::{AppError, Result};
use crate::types::SaleRates;

/// Body posted to the webhook.
#[derive(Debug, Serialize)]
pub struct PushPayload<'a> {
    #[serde(flatten)]
    pub rates: &'a SaleRates,
    pub source: &'static str,
    pub pushed_at: DateTime<Utc>,
}

impl<'a> PushPayload<'a> {
    pub fn new(rates: &'a SaleRates, pushed_at: DateTime<Utc>) -> Self {
        Self { rates, source: "tv-display", pushed_at }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    Pushed,
    /// No active snapshot yet.
    NothingToPush,
}

pub struct RatePusher {
    cfg: PusherConfig,
    client: reqwest::Client,
}

impl RatePusher {
    pub fn new(cfg: PusherConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
            .build()?;
        Ok(Self { cfg, client })
    }

    pub async fn run(self) {
        let mut ticker = interval(Duration::from_secs(self.cfg.interval_secs));
        loop {
            ticker.tick().await;
            match self.push_once().await {
                Ok(PushOutcome::Pushed) => {}
                Ok(PushOutcome::NothingToPush) => warn!("No active rates to push yet"),
                Err(e) => error!("Rate push failed: {e}"),
            }
        }
    }

    pub async fn push_once(&self) -> Result<PushOutcome> {
        let url = format!("{}/api/rates/sale", self.cfg.local_base_url);
        let resp = self.client.get(&url).send().await?.error_for_status()?;
        let Some(rates) = resp.json::<Option<SaleRates>>().await? else {
            return Ok(PushOutcome::NothingToPush);
        };

        let payload = PushPayload::new(&rates, Utc::now());
        let resp = self.client.post(&self.cfg.webhook_url).json(&payload).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AppError::Internal(format!("webhook answered {status}: {}", body.trim())));
        }

        info!(
            event = "RATES_PUSHED",
            gold_24k_sale = rates.gold_24k_sale,
            silver_per_kg_sale = rates.silver_per_kg_sale,
            status = status.as_u16(),
            "Pushed sale rates to webhook",
        );
        Ok(PushOutcome::Pushed)
    }
}
