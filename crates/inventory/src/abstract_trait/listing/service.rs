use crate::domain::{
    requests::listing::UpsertListingRequest,
    response::{ApiResponse, listing::ListingResponse},
};
use async_trait::async_trait;
use shared::errors::ServiceError;
use std::sync::Arc;

pub type DynListingService = Arc<dyn ListingServiceTrait + Send + Sync>;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ListingServiceTrait {
    async fn find_listing(
        &self,
        product_id: i32,
    ) -> Result<ApiResponse<ListingResponse>, ServiceError>;
    async fn upsert_listing(
        &self,
        user_id: i64,
        product_id: i32,
        req: &UpsertListingRequest,
    ) -> Result<ApiResponse<ListingResponse>, ServiceError>;
}
