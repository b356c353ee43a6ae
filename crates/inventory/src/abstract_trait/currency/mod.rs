mod provider;
mod repository;
mod service;

pub use self::provider::{DynRateProvider, RateProviderError, RateProviderTrait};
pub use self::repository::{CurrencyRatesRepositoryTrait, DynCurrencyRatesRepository};
pub use self::service::{CurrencyServiceTrait, DynCurrencyService};

#[cfg(test)]
pub use self::provider::MockRateProviderTrait;
#[cfg(test)]
pub use self::repository::MockCurrencyRatesRepositoryTrait;
#[cfg(test)]
pub use self::service::MockCurrencyServiceTrait;
