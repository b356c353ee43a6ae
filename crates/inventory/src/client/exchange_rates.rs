use crate::{
    abstract_trait::currency::{RateProviderError, RateProviderTrait},
    domain::response::currency::ExchangeRatesPayload,
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};

/// Currencies requested from the provider. Only the tracked subset is stored.
pub const REQUESTED_SYMBOLS: &str =
    "GHS,XOF,TZS,NGN,USD,LRD,GMD,CVE,GNF,MRU,XAF,CDF,AOA,RWF,BIF,STN,ZAR,NAD,BWP,KES";

#[derive(Debug, Clone)]
pub struct ExchangeRatesConfig {
    pub api_url: String,
    pub access_key: String,
    pub timeout: Duration,
}

/// Client for an exchangeratesapi.io style `latest` endpoint.
#[derive(Clone)]
pub struct ExchangeRatesClient {
    config: ExchangeRatesConfig,
    client: Client,
}

impl ExchangeRatesClient {
    pub fn new(config: ExchangeRatesConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .context("Failed to build exchange-rate HTTP client")?;

        info!(
            "💱 Exchange-rate provider at {} (timeout {:?})",
            config.api_url, config.timeout
        );

        Ok(Self { config, client })
    }
}

#[async_trait]
impl RateProviderTrait for ExchangeRatesClient {
    async fn fetch_latest(&self) -> Result<ExchangeRatesPayload, RateProviderError> {
        debug!("Requesting latest rates from {}", self.config.api_url);

        let response = self
            .client
            .get(&self.config.api_url)
            .query(&[
                ("access_key", self.config.access_key.as_str()),
                ("symbols", REQUESTED_SYMBOLS),
            ])
            .send()
            .await
            .map_err(|e| RateProviderError::Request(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RateProviderError::Status(status.as_u16()));
        }

        response
            .json::<ExchangeRatesPayload>()
            .await
            .map_err(|e| RateProviderError::Decode(e.without_url().to_string()))
    }
}
