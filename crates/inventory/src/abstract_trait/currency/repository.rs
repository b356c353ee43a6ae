use crate::model::CurrencyRates;
use async_trait::async_trait;
use shared::errors::RepositoryError;
use std::sync::Arc;

pub type DynCurrencyRatesRepository = Arc<dyn CurrencyRatesRepositoryTrait + Send + Sync>;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CurrencyRatesRepositoryTrait {
    async fn find(&self) -> Result<Option<CurrencyRates>, RepositoryError>;
    /// Fails with `AlreadyExists` once the singleton row is present.
    async fn create(&self, rates: &CurrencyRates) -> Result<CurrencyRates, RepositoryError>;
    async fn update(&self, rates: &CurrencyRates) -> Result<CurrencyRates, RepositoryError>;
}
