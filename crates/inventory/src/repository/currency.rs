use crate::{abstract_trait::currency::CurrencyRatesRepositoryTrait, model::CurrencyRates};
use async_trait::async_trait;
use shared::{config::ConnectionPool, errors::RepositoryError};
use tracing::{error, info};

const RATE_COLUMNS: &str = "id, currency_rate_timestamp, ghs, tzs, xof, xaf, ngn, eur, usd";

#[derive(Clone)]
pub struct CurrencyRatesRepository {
    db: ConnectionPool,
}

impl CurrencyRatesRepository {
    pub fn new(db: ConnectionPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CurrencyRatesRepositoryTrait for CurrencyRatesRepository {
    async fn find(&self) -> Result<Option<CurrencyRates>, RepositoryError> {
        let sql = format!("SELECT {RATE_COLUMNS} FROM currency_rates WHERE singleton");
        sqlx::query_as::<_, CurrencyRates>(&sql)
            .fetch_optional(&self.db)
            .await
            .map_err(|e| {
                error!("❌ Failed to load currency rates: {e:?}");
                RepositoryError::from(e)
            })
    }

    async fn create(&self, rates: &CurrencyRates) -> Result<CurrencyRates, RepositoryError> {
        info!("💱 Creating the currency rates record");

        let sql = format!(
            r#"
            INSERT INTO currency_rates
                (singleton, currency_rate_timestamp, ghs, tzs, xof, xaf, ngn, eur, usd)
            VALUES (TRUE, $1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {RATE_COLUMNS}
            "#
        );

        sqlx::query_as::<_, CurrencyRates>(&sql)
            .bind(rates.currency_rate_timestamp)
            .bind(rates.ghs)
            .bind(rates.tzs)
            .bind(rates.xof)
            .bind(rates.xaf)
            .bind(rates.ngn)
            .bind(rates.eur)
            .bind(rates.usd)
            .fetch_one(&self.db)
            .await
            .map_err(RepositoryError::from)
    }

    async fn update(&self, rates: &CurrencyRates) -> Result<CurrencyRates, RepositoryError> {
        let sql = format!(
            r#"
            UPDATE currency_rates SET
                currency_rate_timestamp = $1,
                ghs = $2, tzs = $3, xof = $4, xaf = $5, ngn = $6, eur = $7, usd = $8
            WHERE singleton
            RETURNING {RATE_COLUMNS}
            "#
        );

        sqlx::query_as::<_, CurrencyRates>(&sql)
            .bind(rates.currency_rate_timestamp)
            .bind(rates.ghs)
            .bind(rates.tzs)
            .bind(rates.xof)
            .bind(rates.xaf)
            .bind(rates.ngn)
            .bind(rates.eur)
            .bind(rates.usd)
            .fetch_optional(&self.db)
            .await
            .map_err(|e| {
                error!("❌ Failed to persist currency rates: {e:?}");
                RepositoryError::from(e)
            })?
            .ok_or(RepositoryError::NotFound)
    }
}
