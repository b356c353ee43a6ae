use crate::{domain::requests::listing::UpsertListingRequest, model::ProductListing};
use async_trait::async_trait;
use shared::errors::RepositoryError;
use std::sync::Arc;

pub type DynListingRepository = Arc<dyn ListingRepositoryTrait + Send + Sync>;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ListingRepositoryTrait {
    async fn find(&self, product_id: i32) -> Result<ProductListing, RepositoryError>;
    /// Writes the sections present in `req`, leaving the others untouched.
    async fn upsert(
        &self,
        product_id: i32,
        req: &UpsertListingRequest,
    ) -> Result<ProductListing, RepositoryError>;
}
