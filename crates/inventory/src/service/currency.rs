use crate::{
    abstract_trait::currency::{
        CurrencyServiceTrait, DynCurrencyRatesRepository, DynRateProvider,
    },
    domain::response::{ApiResponse, currency::CurrencyRatesResponse},
    model::CurrencyRates,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use opentelemetry::KeyValue;
use prometheus_client::registry::Registry;
use shared::{
    errors::{RepositoryError, ServiceError},
    utils::{Method, Metrics, OperationTracer},
};
use tokio::sync::Mutex;
use tracing::{error, info, warn};

/// Process-wide cache of the singleton exchange-rate record.
///
/// The mutex is held across a refresh, so concurrent stale reads in one
/// process trigger a single provider call.
pub struct CurrencyService {
    repository: DynCurrencyRatesRepository,
    provider: DynRateProvider,
    cached: Mutex<Option<CurrencyRates>>,
    tracer: OperationTracer,
}

impl CurrencyService {
    pub fn new(
        repository: DynCurrencyRatesRepository,
        provider: DynRateProvider,
        registry: &mut Registry,
    ) -> Self {
        let metrics = Metrics::new();
        metrics.register(registry, "currency_service", "CurrencyService");

        Self {
            repository,
            provider,
            cached: Mutex::new(None),
            tracer: OperationTracer::new("currency-service", metrics),
        }
    }

    /// Returns the cached record, loading it on first use. A missing row is
    /// created unrefreshed; losing that insert race reloads the winner's row.
    async fn load(&self, slot: &mut Option<CurrencyRates>) -> Result<CurrencyRates, ServiceError> {
        if let Some(rates) = slot {
            return Ok(rates.clone());
        }

        let rates = match self.repository.find().await? {
            Some(rates) => rates,
            None => {
                info!("💱 No currency rates stored yet, creating the record");
                match self.repository.create(&CurrencyRates::unrefreshed()).await {
                    Ok(rates) => rates,
                    Err(RepositoryError::AlreadyExists(_)) => {
                        self.repository.find().await?.ok_or_else(|| {
                            ServiceError::Internal("currency rates record vanished".into())
                        })?
                    }
                    Err(e) => return Err(e.into()),
                }
            }
        };

        *slot = Some(rates.clone());
        Ok(rates)
    }

    /// One provider call. Any failure leaves `current` untouched.
    async fn refresh(&self, current: CurrencyRates, now: DateTime<Utc>) -> CurrencyRates {
        let payload = match self.provider.fetch_latest().await {
            Ok(payload) => payload,
            Err(e) => {
                warn!("⚠️ Exchange-rate refresh failed, serving stored rates: {e}");
                return current;
            }
        };

        let Some(fetched) = payload.into_rates() else {
            warn!("⚠️ Exchange-rate provider reported failure, serving stored rates");
            return current;
        };

        let mut next = current;
        next.apply_refresh(&fetched, now);

        if let Err(e) = self.repository.update(&next).await {
            error!("❌ Failed to persist refreshed currency rates: {e}");
        } else {
            info!("💱 Currency rates refreshed at {now}");
        }

        next
    }
}

#[async_trait]
impl CurrencyServiceTrait for CurrencyService {
    async fn read(&self, now: DateTime<Utc>) -> Result<CurrencyRates, ServiceError> {
        let ctx = self.tracer.start(
            "ReadCurrencyRates",
            vec![KeyValue::new("component", "currency")],
        );

        let mut slot = self.cached.lock().await;

        let rates = match self.load(&mut slot).await {
            Ok(rates) => rates,
            Err(e) => {
                self.tracer.error(&ctx, Method::Get, &e.to_string());
                return Err(e);
            }
        };

        if !rates.is_stale(now) {
            self.tracer.success(&ctx, Method::Get, "Currency rates are fresh");
            return Ok(rates);
        }

        let rates = self.refresh(rates, now).await;
        *slot = Some(rates.clone());

        self.tracer
            .success(&ctx, Method::Get, "Currency rates read after refresh attempt");
        Ok(rates)
    }

    async fn stored(&self) -> Result<CurrencyRates, ServiceError> {
        let mut slot = self.cached.lock().await;
        self.load(&mut slot).await
    }

    async fn create(&self) -> Result<CurrencyRates, ServiceError> {
        let ctx = self.tracer.start(
            "CreateCurrencyRates",
            vec![KeyValue::new("component", "currency")],
        );

        let mut slot = self.cached.lock().await;

        match self.repository.create(&CurrencyRates::unrefreshed()).await {
            Ok(rates) => {
                *slot = Some(rates.clone());
                self.tracer
                    .success(&ctx, Method::Post, "Currency rates record created");
                Ok(rates)
            }
            Err(RepositoryError::AlreadyExists(_)) => {
                let msg = "there can be only one CurrencyRates instance";
                self.tracer.error(&ctx, Method::Post, msg);
                Err(ServiceError::validation(msg))
            }
            Err(e) => {
                self.tracer.error(&ctx, Method::Post, &e.to_string());
                Err(e.into())
            }
        }
    }

    async fn current_rates(&self) -> Result<ApiResponse<CurrencyRatesResponse>, ServiceError> {
        let rates = self.read(Utc::now()).await?;

        Ok(ApiResponse::success(
            "Currency rates retrieved successfully",
            CurrencyRatesResponse::from(&rates),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        abstract_trait::currency::{
            MockCurrencyRatesRepositoryTrait, MockRateProviderTrait, RateProviderError,
        },
        domain::response::currency::ExchangeRatesPayload,
    };
    use chrono::{Duration, TimeZone};
    use std::{collections::HashMap, sync::Arc};

    fn refreshed_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap()
    }

    fn stored_rates() -> CurrencyRates {
        CurrencyRates {
            id: 1,
            currency_rate_timestamp: refreshed_at(),
            ghs: 12.0,
            ngn: 1500.0,
            ..CurrencyRates::unrefreshed()
        }
    }

    fn service(
        repository: MockCurrencyRatesRepositoryTrait,
        provider: MockRateProviderTrait,
    ) -> CurrencyService {
        CurrencyService::new(
            Arc::new(repository),
            Arc::new(provider),
            &mut Registry::default(),
        )
    }

    fn repository_with(rates: CurrencyRates) -> MockCurrencyRatesRepositoryTrait {
        let mut repository = MockCurrencyRatesRepositoryTrait::new();
        repository
            .expect_find()
            .returning(move || Ok(Some(rates.clone())));
        repository
    }

    #[tokio::test]
    async fn fresh_record_is_served_without_network() {
        let mut repository = repository_with(stored_rates());
        repository.expect_update().times(0);
        let mut provider = MockRateProviderTrait::new();
        provider.expect_fetch_latest().times(0);

        let service = service(repository, provider);
        let rates = service
            .read(refreshed_at() + Duration::minutes(30))
            .await
            .unwrap();

        assert_eq!(rates, stored_rates());
    }

    #[tokio::test]
    async fn stale_record_failure_serves_stored_values() {
        let mut repository = repository_with(stored_rates());
        repository.expect_update().times(0);
        let mut provider = MockRateProviderTrait::new();
        provider
            .expect_fetch_latest()
            .times(1)
            .returning(|| Err(RateProviderError::Request("connection refused".into())));

        let service = service(repository, provider);
        let rates = service
            .read(refreshed_at() + Duration::hours(2))
            .await
            .unwrap();

        assert_eq!(rates.ghs, 12.0);
        assert_eq!(rates.currency_rate_timestamp, refreshed_at());
    }

    #[tokio::test]
    async fn stale_record_success_overwrites_and_persists() {
        let now = refreshed_at() + Duration::hours(2);

        let mut repository = repository_with(stored_rates());
        repository
            .expect_update()
            .times(1)
            .withf(move |rates| rates.ghs == 12.5 && rates.currency_rate_timestamp == now)
            .returning(|rates| Ok(rates.clone()));
        let mut provider = MockRateProviderTrait::new();
        provider.expect_fetch_latest().times(1).returning(|| {
            Ok(ExchangeRatesPayload {
                success: Some(true),
                rates: Some(HashMap::from([
                    ("GHS".to_string(), 12.5),
                    ("KES".to_string(), 129.0),
                ])),
                ..Default::default()
            })
        });

        let service = service(repository, provider);
        let rates = service.read(now).await.unwrap();

        assert_eq!(rates.ghs, 12.5);
        assert_eq!(rates.ngn, 1500.0);
        assert_eq!(rates.currency_rate_timestamp, now);
        assert!(!rates.rates().contains_key("KES"));
    }

    #[tokio::test]
    async fn missing_success_flag_counts_as_failure() {
        let mut repository = repository_with(stored_rates());
        repository.expect_update().times(0);
        let mut provider = MockRateProviderTrait::new();
        provider.expect_fetch_latest().times(1).returning(|| {
            Ok(ExchangeRatesPayload {
                success: None,
                rates: Some(HashMap::from([("GHS".to_string(), 99.0)])),
                ..Default::default()
            })
        });

        let service = service(repository, provider);
        let rates = service
            .read(refreshed_at() + Duration::hours(2))
            .await
            .unwrap();

        assert_eq!(rates.ghs, 12.0);
    }

    #[tokio::test]
    async fn persist_failure_still_serves_fresh_values() {
        let now = refreshed_at() + Duration::hours(2);

        let mut repository = repository_with(stored_rates());
        repository
            .expect_update()
            .times(1)
            .returning(|_| Err(RepositoryError::Custom("disk full".into())));
        let mut provider = MockRateProviderTrait::new();
        provider.expect_fetch_latest().times(1).returning(|| {
            Ok(ExchangeRatesPayload {
                success: Some(true),
                rates: Some(HashMap::from([("GHS".to_string(), 13.0)])),
                ..Default::default()
            })
        });

        let service = service(repository, provider);
        let first = service.read(now).await.unwrap();
        // The refreshed copy is kept in process, so a second read is fresh.
        let second = service.read(now + Duration::minutes(5)).await.unwrap();

        assert_eq!(first.ghs, 13.0);
        assert_eq!(second, first);
    }

    #[tokio::test]
    async fn first_access_creates_an_unrefreshed_record() {
        let mut repository = MockCurrencyRatesRepositoryTrait::new();
        repository.expect_find().times(1).returning(|| Ok(None));
        repository
            .expect_create()
            .times(1)
            .withf(|rates| rates.currency_rate_timestamp == DateTime::<Utc>::UNIX_EPOCH)
            .returning(|rates| Ok(CurrencyRates { id: 1, ..rates.clone() }));
        let provider = MockRateProviderTrait::new();

        let service = service(repository, provider);
        let rates = service.stored().await.unwrap();

        assert_eq!(rates.id, 1);
        assert_eq!(rates.ghs, 1.0);
        assert!(rates.is_stale(Utc::now()));
    }

    #[tokio::test]
    async fn second_create_is_a_validation_failure() {
        let mut repository = MockCurrencyRatesRepositoryTrait::new();
        repository
            .expect_create()
            .times(1)
            .returning(|_| Err(RepositoryError::AlreadyExists("currency_rates_singleton_key".into())));
        let provider = MockRateProviderTrait::new();

        let service = service(repository, provider);
        let err = service.create().await.unwrap_err();

        match err {
            ServiceError::Validation(messages) => {
                assert_eq!(messages, vec!["there can be only one CurrencyRates instance"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn overlapping_stale_reads_fetch_once() {
        let now = refreshed_at() + Duration::hours(2);

        let mut repository = repository_with(stored_rates());
        repository
            .expect_update()
            .times(1)
            .returning(|rates| Ok(rates.clone()));
        let mut provider = MockRateProviderTrait::new();
        provider.expect_fetch_latest().times(1).returning(|| {
            Ok(ExchangeRatesPayload {
                success: Some(true),
                rates: Some(HashMap::from([("USD".to_string(), 1.08)])),
                ..Default::default()
            })
        });

        let service = Arc::new(service(repository, provider));
        let (a, b) = tokio::join!(service.read(now), service.read(now));

        assert_eq!(a.unwrap().usd, 1.08);
        assert_eq!(b.unwrap().usd, 1.08);
    }
}
