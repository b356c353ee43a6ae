mod command;
mod query;

pub use self::command::ProductCommandService;
pub use self::query::ProductQueryService;

use crate::{
    abstract_trait::{
        company::DynCompanyRepository, currency::DynCurrencyService,
        product::repository::DynProductQueryRepository,
    },
    domain::response::{media::MediaUrls, product::ProductResponse},
    model::{Company, Product},
};
use shared::errors::ServiceError;
use std::collections::BTreeMap;
use tracing::warn;

/// Turns product rows into outbound payloads: related rows, absolute media
/// URLs and the stored currency rates.
#[derive(Clone)]
pub(crate) struct ProductPresenter {
    query: DynProductQueryRepository,
    currency: DynCurrencyService,
    media: MediaUrls,
}

impl ProductPresenter {
    pub(crate) fn new(
        query: DynProductQueryRepository,
        currency: DynCurrencyService,
        media: MediaUrls,
    ) -> Self {
        Self {
            query,
            currency,
            media,
        }
    }

    async fn rates(&self) -> BTreeMap<String, f64> {
        match self.currency.stored().await {
            Ok(rates) => rates.rates(),
            Err(e) => {
                warn!("⚠️ Currency rates unavailable for product payloads: {e}");
                BTreeMap::new()
            }
        }
    }

    pub(crate) async fn present(
        &self,
        products: Vec<Product>,
    ) -> Result<Vec<ProductResponse>, ServiceError> {
        if products.is_empty() {
            return Ok(Vec::new());
        }

        let rates = self.rates().await;
        let details = self.query.load_details(products).await?;

        Ok(details
            .into_iter()
            .map(|d| ProductResponse::build(d, &self.media, &rates))
            .collect())
    }

    pub(crate) async fn present_one(&self, product: Product) -> Result<ProductResponse, ServiceError> {
        self.present(vec![product])
            .await?
            .pop()
            .ok_or_else(ServiceError::not_found)
    }
}

/// Resolves the caller's company and checks product ownership.
#[derive(Clone)]
pub(crate) struct SellerGuard {
    companies: DynCompanyRepository,
}

impl SellerGuard {
    pub(crate) fn new(companies: DynCompanyRepository) -> Self {
        Self { companies }
    }

    pub(crate) async fn company_of(&self, user_id: i64) -> Result<Company, ServiceError> {
        self.companies
            .find_by_user(user_id)
            .await?
            .ok_or_else(|| ServiceError::Forbidden("account has no seller company".into()))
    }

    pub(crate) async fn ensure_owner(
        &self,
        user_id: i64,
        product: &Product,
    ) -> Result<Company, ServiceError> {
        let company = self.company_of(user_id).await?;
        if product.seller_id != Some(company.company_id) {
            return Err(ServiceError::Forbidden(
                "only the seller may change this product".into(),
            ));
        }
        Ok(company)
    }
}
