use crate::domain::response::currency::ExchangeRatesPayload;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

pub type DynRateProvider = Arc<dyn RateProviderTrait + Send + Sync>;

#[derive(Debug, Error)]
pub enum RateProviderError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("provider answered with status {0}")]
    Status(u16),

    #[error("undecodable response: {0}")]
    Decode(String),
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RateProviderTrait {
    async fn fetch_latest(&self) -> Result<ExchangeRatesPayload, RateProviderError>;
}
