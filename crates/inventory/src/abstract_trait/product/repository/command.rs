use crate::{
    domain::requests::product::{NewProduct, ProductAttachments, ProductChanges},
    model::Product,
};
use async_trait::async_trait;
use shared::errors::RepositoryError;
use std::sync::Arc;

pub type DynProductCommandRepository = Arc<dyn ProductCommandRepositoryTrait + Send + Sync>;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductCommandRepositoryTrait {
    async fn create_product(
        &self,
        product: &NewProduct,
        attachments: &ProductAttachments,
    ) -> Result<Product, RepositoryError>;
    async fn update_product(
        &self,
        changes: &ProductChanges,
        attachments: &ProductAttachments,
    ) -> Result<Product, RepositoryError>;
    async fn set_active(&self, id: i32, is_active: bool) -> Result<Product, RepositoryError>;
    /// Stores one view event and returns the product's new view count.
    async fn record_view(&self, product_id: i32, ip: &str) -> Result<i32, RepositoryError>;
}
