use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::{BTreeMap, HashMap};

/// Currencies persisted locally, in the order they are reported.
pub const TRACKED_CURRENCIES: [&str; 7] = ["GHS", "TZS", "XOF", "NGN", "XAF", "EUR", "USD"];

/// The singleton exchange-rate record. Multipliers are relative to the
/// provider's base currency.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct CurrencyRates {
    pub id: i32,
    pub currency_rate_timestamp: DateTime<Utc>,
    pub ghs: f64,
    pub tzs: f64,
    pub xof: f64,
    pub xaf: f64,
    pub ngn: f64,
    pub eur: f64,
    pub usd: f64,
}

impl CurrencyRates {
    pub fn freshness_window() -> Duration {
        Duration::hours(1)
    }

    /// A record that has never been refreshed: every multiplier is 1.0 and the
    /// timestamp is the Unix epoch, so the first read is already stale.
    pub fn unrefreshed() -> Self {
        Self {
            id: 0,
            currency_rate_timestamp: DateTime::<Utc>::UNIX_EPOCH,
            ghs: 1.0,
            tzs: 1.0,
            xof: 1.0,
            xaf: 1.0,
            ngn: 1.0,
            eur: 1.0,
            usd: 1.0,
        }
    }

    /// True once `now` is more than the freshness window past the last refresh.
    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        self.currency_rate_timestamp + Self::freshness_window() < now
    }

    pub fn rate(&self, code: &str) -> Option<f64> {
        match code {
            "GHS" => Some(self.ghs),
            "TZS" => Some(self.tzs),
            "XOF" => Some(self.xof),
            "NGN" => Some(self.ngn),
            "XAF" => Some(self.xaf),
            "EUR" => Some(self.eur),
            "USD" => Some(self.usd),
            _ => None,
        }
    }

    fn rate_mut(&mut self, code: &str) -> Option<&mut f64> {
        match code {
            "GHS" => Some(&mut self.ghs),
            "TZS" => Some(&mut self.tzs),
            "XOF" => Some(&mut self.xof),
            "NGN" => Some(&mut self.ngn),
            "XAF" => Some(&mut self.xaf),
            "EUR" => Some(&mut self.eur),
            "USD" => Some(&mut self.usd),
            _ => None,
        }
    }

    /// The tracked subset keyed by upper-case ISO code.
    pub fn rates(&self) -> BTreeMap<String, f64> {
        TRACKED_CURRENCIES
            .iter()
            .filter_map(|code| self.rate(code).map(|rate| (code.to_string(), rate)))
            .collect()
    }

    /// Overwrites every tracked currency present in `fetched` and stamps the
    /// record with `now`. Tracked currencies absent from `fetched` keep their
    /// previous value.
    pub fn apply_refresh(&mut self, fetched: &HashMap<String, f64>, now: DateTime<Utc>) {
        for code in TRACKED_CURRENCIES {
            if let Some(rate) = fetched.get(code)
                && let Some(slot) = self.rate_mut(code)
            {
                *slot = *rate;
            }
        }
        self.currency_rate_timestamp = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, hour, minute, 0).unwrap()
    }

    fn record(refreshed: DateTime<Utc>) -> CurrencyRates {
        CurrencyRates {
            id: 1,
            currency_rate_timestamp: refreshed,
            ghs: 12.0,
            ..CurrencyRates::unrefreshed()
        }
    }

    #[test]
    fn staleness_starts_strictly_after_one_hour() {
        let rates = record(at(10, 0));

        assert!(!rates.is_stale(at(10, 30)));
        assert!(!rates.is_stale(at(11, 0)));
        assert!(rates.is_stale(at(11, 1)));
    }

    #[test]
    fn unrefreshed_record_is_stale_immediately() {
        assert!(CurrencyRates::unrefreshed().is_stale(at(0, 0)));
    }

    #[test]
    fn rates_cover_exactly_the_tracked_subset() {
        let rates = record(at(10, 0)).rates();

        assert_eq!(rates.len(), TRACKED_CURRENCIES.len());
        assert_eq!(rates["GHS"], 12.0);
        assert_eq!(rates["USD"], 1.0);
    }

    #[test]
    fn refresh_keeps_missing_currencies_and_ignores_extras() {
        let mut rates = record(at(10, 0));
        let fetched = HashMap::from([
            ("GHS".to_string(), 12.5),
            ("KES".to_string(), 129.0),
        ]);

        rates.apply_refresh(&fetched, at(11, 30));

        assert_eq!(rates.ghs, 12.5);
        assert_eq!(rates.usd, 1.0);
        assert_eq!(rates.currency_rate_timestamp, at(11, 30));
        assert!(!rates.rates().contains_key("KES"));
    }
}
