mod exchange_rates;

pub use self::exchange_rates::{ExchangeRatesClient, ExchangeRatesConfig, REQUESTED_SYMBOLS};
