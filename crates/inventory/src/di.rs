use crate::{
    abstract_trait::{
        category::{DynCategoryRepository, DynCategoryService},
        company::DynCompanyRepository,
        currency::{DynCurrencyRatesRepository, DynCurrencyService, DynRateProvider},
        listing::{DynListingRepository, DynListingService},
        product::{
            repository::{DynProductCommandRepository, DynProductQueryRepository},
            service::{DynProductCommandService, DynProductQueryService},
        },
        storage::DynFileStorage,
    },
    client::{ExchangeRatesClient, ExchangeRatesConfig},
    config::myconfig::Config,
    domain::response::media::MediaUrls,
    repository::{
        CategoryRepository, CompanyRepository, CurrencyRatesRepository, ListingRepository,
        ProductCommandRepository, ProductQueryRepository,
    },
    service::{
        CategoryService, CurrencyService, ListingService, ProductCommandService,
        ProductQueryService,
    },
    storage::LocalFileStorage,
};
use anyhow::{Context, Result};
use prometheus_client::registry::Registry;
use shared::config::ConnectionPool;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct DependenciesInject {
    pub product_query: DynProductQueryService,
    pub product_command: DynProductCommandService,
    pub category: DynCategoryService,
    pub currency: DynCurrencyService,
    pub listing: DynListingService,
}

impl std::fmt::Debug for DependenciesInject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DependenciesInject")
            .field("product_query", &"DynProductQueryService")
            .field("product_command", &"DynProductCommandService")
            .field("category", &"DynCategoryService")
            .field("currency", &"DynCurrencyService")
            .field("listing", &"DynListingService")
            .finish()
    }
}

impl DependenciesInject {
    pub async fn new(
        pool: ConnectionPool,
        config: &Config,
        registry: Arc<Mutex<Registry>>,
    ) -> Result<Self> {
        let mut registry = registry.lock().await;

        let product_query_repo: DynProductQueryRepository =
            Arc::new(ProductQueryRepository::new(pool.clone()));
        let product_command_repo: DynProductCommandRepository =
            Arc::new(ProductCommandRepository::new(pool.clone()));
        let category_repo: DynCategoryRepository = Arc::new(CategoryRepository::new(pool.clone()));
        let company_repo: DynCompanyRepository = Arc::new(CompanyRepository::new(pool.clone()));
        let rates_repo: DynCurrencyRatesRepository =
            Arc::new(CurrencyRatesRepository::new(pool.clone()));
        let listing_repo: DynListingRepository = Arc::new(ListingRepository::new(pool));

        let provider: DynRateProvider = Arc::new(
            ExchangeRatesClient::new(ExchangeRatesConfig {
                api_url: config.exchange_rate_api_url.clone(),
                access_key: config.exchange_rate_api_key.clone(),
                timeout: config.exchange_rate_timeout,
            })
            .context("Failed to build the exchange-rate client")?,
        );

        let storage: DynFileStorage = Arc::new(LocalFileStorage::new(&config.media_root));
        let media = MediaUrls::new(&config.public_base_url);

        let currency: DynCurrencyService =
            Arc::new(CurrencyService::new(rates_repo, provider, &mut registry));

        let product_query: DynProductQueryService = Arc::new(ProductQueryService::new(
            product_query_repo.clone(),
            product_command_repo.clone(),
            company_repo.clone(),
            currency.clone(),
            media.clone(),
            &mut registry,
        ));

        let product_command: DynProductCommandService = Arc::new(ProductCommandService::new(
            product_query_repo.clone(),
            product_command_repo,
            category_repo.clone(),
            company_repo.clone(),
            currency.clone(),
            storage.clone(),
            media.clone(),
            &mut registry,
        ));

        let category: DynCategoryService = Arc::new(CategoryService::new(
            category_repo,
            company_repo.clone(),
            storage,
            media,
            &mut registry,
        ));

        let listing: DynListingService = Arc::new(ListingService::new(
            listing_repo,
            product_query_repo,
            company_repo,
            &mut registry,
        ));

        Ok(Self {
            product_query,
            product_command,
            category,
            currency,
            listing,
        })
    }
}
