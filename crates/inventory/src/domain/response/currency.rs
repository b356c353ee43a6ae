use crate::model::CurrencyRates;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct CurrencyRatesResponse {
    /// Tracked currencies keyed by ISO code.
    pub rates: BTreeMap<String, f64>,
    pub currency_rate_timestamp: String,
}

impl From<&CurrencyRates> for CurrencyRatesResponse {
    fn from(value: &CurrencyRates) -> Self {
        Self {
            rates: value.rates(),
            currency_rate_timestamp: value.currency_rate_timestamp.to_rfc3339(),
        }
    }
}

/// Body returned by the exchange-rate provider. Only the fields the cache
/// relies on are decoded.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct ExchangeRatesPayload {
    pub success: Option<bool>,
    pub timestamp: Option<i64>,
    pub base: Option<String>,
    pub rates: Option<HashMap<String, f64>>,
}

impl ExchangeRatesPayload {
    /// The rates, provided the payload reports success.
    pub fn into_rates(self) -> Option<HashMap<String, f64>> {
        match self.success {
            Some(true) => self.rates,
            _ => None,
        }
    }
}
