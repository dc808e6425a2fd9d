//! HTTP client for the prediction service.

use std::time::Duration;

use anyhow::Context;
use serde::Serialize;
use tracing::debug;

use crate::config::ServiceCfg;
use crate::error::FetchError;
use crate::types::RawEntry;

/// Request body the service expects on its predict endpoint.
#[derive(Debug, Serialize)]
struct PredictRequest<'a> {
    ticker: &'a str,
    start: &'a str,
}

/// Thin wrapper over reqwest for the one endpoint this app talks to.
#[derive(Debug, Clone)]
pub struct PredictClient {
    http: reqwest::Client,
    endpoint: String,
}

impl PredictClient {
    pub fn new(cfg: &ServiceCfg) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_sec))
            .build()
            .context("build prediction service client")?;
        Ok(Self {
            http,
            endpoint: cfg.endpoint.clone(),
        })
    }

    /// POST the submitted selection, returning the raw entry series.
    ///
    /// Non-2xx statuses map to `Http` without reading the body; a 2xx
    /// body that is not a JSON array of entries maps to `Decode`.
    pub async fn fetch(&self, ticker: &str, start: &str) -> Result<Vec<RawEntry>, FetchError> {
        debug!(ticker, start, "requesting predictions");
        let resp = self
            .http
            .post(&self.endpoint)
            .json(&PredictRequest { ticker, start })
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    FetchError::Timeout
                } else {
                    FetchError::Transport(e)
                }
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Http {
                status: status.as_u16(),
            });
        }

        resp.json::<Vec<RawEntry>>().await.map_err(FetchError::Decode)
    }
}
