use crate::{
    abstract_trait::{
        company::DynCompanyRepository,
        listing::{DynListingRepository, ListingServiceTrait},
        product::repository::DynProductQueryRepository,
    },
    domain::{
        requests::listing::UpsertListingRequest,
        response::{ApiResponse, listing::ListingResponse},
    },
    model::Product,
    service::SellerGuard,
};
use async_trait::async_trait;
use opentelemetry::KeyValue;
use prometheus_client::registry::Registry;
use shared::{
    errors::ServiceError,
    utils::{Method, Metrics, OperationTracer},
};

/// Certification, sample, payment and trading details shown on a product
/// listing page.
#[derive(Clone)]
pub struct ListingService {
    listings: DynListingRepository,
    products: DynProductQueryRepository,
    sellers: SellerGuard,
    tracer: OperationTracer,
}

impl ListingService {
    pub fn new(
        listings: DynListingRepository,
        products: DynProductQueryRepository,
        companies: DynCompanyRepository,
        registry: &mut Registry,
    ) -> Self {
        let metrics = Metrics::new();
        metrics.register(registry, "listing_service", "ListingService");

        Self {
            listings,
            products,
            sellers: SellerGuard::new(companies),
            tracer: OperationTracer::new("listing-service", metrics),
        }
    }

    async fn product(&self, product_id: i32) -> Result<Product, ServiceError> {
        self.products
            .find_by_id(product_id)
            .await?
            .ok_or_else(ServiceError::not_found)
    }
}

#[async_trait]
impl ListingServiceTrait for ListingService {
    async fn find_listing(
        &self,
        product_id: i32,
    ) -> Result<ApiResponse<ListingResponse>, ServiceError> {
        let ctx = self.tracer.start(
            "FindListing",
            vec![KeyValue::new("product.id", product_id as i64)],
        );

        let result: Result<ApiResponse<ListingResponse>, ServiceError> = async {
            self.product(product_id).await?;
            let listing = self.listings.find(product_id).await?;
            Ok(ApiResponse::success(
                "Listing retrieved successfully",
                ListingResponse::from(listing),
            ))
        }
        .await;

        match &result {
            Ok(_) => self.tracer.success(
                &ctx,
                Method::Get,
                &format!("Listing of product {product_id} retrieved"),
            ),
            Err(e) => self.tracer.error(&ctx, Method::Get, &e.to_string()),
        }
        result
    }

    async fn upsert_listing(
        &self,
        user_id: i64,
        product_id: i32,
        req: &UpsertListingRequest,
    ) -> Result<ApiResponse<ListingResponse>, ServiceError> {
        let ctx = self.tracer.start(
            "UpsertListing",
            vec![
                KeyValue::new("product.id", product_id as i64),
                KeyValue::new("user_id", user_id),
            ],
        );

        let result: Result<ApiResponse<ListingResponse>, ServiceError> = async {
            let product = self.product(product_id).await?;
            self.sellers.ensure_owner(user_id, &product).await?;
            let listing = self.listings.upsert(product_id, req).await?;
            Ok(ApiResponse::success(
                "Listing saved successfully",
                ListingResponse::from(listing),
            ))
        }
        .await;

        match &result {
            Ok(_) => self.tracer.success(
                &ctx,
                Method::Put,
                &format!("Listing of product {product_id} saved"),
            ),
            Err(e) => self.tracer.error(&ctx, Method::Put, &e.to_string()),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        abstract_trait::{
            company::MockCompanyRepositoryTrait, listing::MockListingRepositoryTrait,
            product::repository::MockProductQueryRepositoryTrait,
        },
        model::{ProductListing, TradingAreas},
        service::product::fixtures,
    };
    use std::sync::Arc;

    #[tokio::test]
    async fn seller_can_save_trading_areas() {
        let mut listings = MockListingRepositoryTrait::new();
        listings
            .expect_upsert()
            .times(1)
            .returning(|product_id, req| {
                Ok(ProductListing {
                    product_id,
                    trading_areas: req.trading_areas.clone(),
                    ..Default::default()
                })
            });
        let mut products = MockProductQueryRepositoryTrait::new();
        products
            .expect_find_by_id()
            .returning(|id| Ok(Some(fixtures::product(id, Some(3)))));
        let mut companies = MockCompanyRepositoryTrait::new();
        companies
            .expect_find_by_user()
            .returning(|_| Ok(Some(fixtures::company(3, 30))));

        let service = ListingService::new(
            Arc::new(listings),
            Arc::new(products),
            Arc::new(companies),
            &mut Registry::default(),
        );

        let req = UpsertListingRequest {
            trading_areas: Some(TradingAreas {
                domestic: true,
                international: false,
            }),
            ..Default::default()
        };
        let response = service.upsert_listing(30, 11, &req).await.unwrap();

        assert_eq!(response.data.product_id, 11);
        assert!(response.data.trading_areas.unwrap().domestic);
        assert!(response.data.certification.is_none());
    }

    #[tokio::test]
    async fn listing_of_missing_product_is_not_found() {
        let mut products = MockProductQueryRepositoryTrait::new();
        products.expect_find_by_id().returning(|_| Ok(None));

        let service = ListingService::new(
            Arc::new(MockListingRepositoryTrait::new()),
            Arc::new(products),
            Arc::new(MockCompanyRepositoryTrait::new()),
            &mut Registry::default(),
        );

        let err = service.find_listing(5).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Repo(shared::errors::RepositoryError::NotFound)
        ));
    }
}
