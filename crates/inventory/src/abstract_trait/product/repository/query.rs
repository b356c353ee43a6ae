use crate::{
    domain::requests::product::{CountProductsQuery, FindAllProducts},
    model::{Product, ProductDetails},
};
use async_trait::async_trait;
use shared::errors::RepositoryError;
use std::sync::Arc;

pub type DynProductQueryRepository = Arc<dyn ProductQueryRepositoryTrait + Send + Sync>;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductQueryRepositoryTrait {
    /// Active products only. A category filter covers the whole subtree.
    async fn search(&self, req: &FindAllProducts)
    -> Result<(Vec<Product>, i64), RepositoryError>;
    async fn find_by_seller(
        &self,
        seller_id: i32,
        req: &FindAllProducts,
    ) -> Result<(Vec<Product>, i64), RepositoryError>;
    async fn find_by_id(&self, id: i32) -> Result<Option<Product>, RepositoryError>;
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Product>, RepositoryError>;
    async fn count(&self, req: &CountProductsQuery) -> Result<i64, RepositoryError>;
    async fn slug_exists(&self, slug: &str) -> Result<bool, RepositoryError>;
    /// Loads categories, images, documents and seller for each product,
    /// preserving order.
    async fn load_details(
        &self,
        products: Vec<Product>,
    ) -> Result<Vec<ProductDetails>, RepositoryError>;
}
