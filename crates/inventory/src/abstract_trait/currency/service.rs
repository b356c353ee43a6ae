use crate::{
    domain::response::{ApiResponse, currency::CurrencyRatesResponse},
    model::CurrencyRates,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::errors::ServiceError;
use std::sync::Arc;

pub type DynCurrencyService = Arc<dyn CurrencyServiceTrait + Send + Sync>;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CurrencyServiceTrait {
    /// Current rates, refreshed from the provider first when older than the
    /// freshness window at `now`.
    async fn read(&self, now: DateTime<Utc>) -> Result<CurrencyRates, ServiceError>;
    /// Stored rates without touching the provider.
    async fn stored(&self) -> Result<CurrencyRates, ServiceError>;
    /// Inserts the singleton record. Fails once it exists.
    async fn create(&self) -> Result<CurrencyRates, ServiceError>;
    async fn current_rates(&self) -> Result<ApiResponse<CurrencyRatesResponse>, ServiceError>;
}
