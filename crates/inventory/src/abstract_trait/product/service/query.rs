use crate::domain::{
    requests::product::{CountProductsQuery, FindAllProducts},
    response::{
        ApiResponse, ApiResponsePagination,
        product::{ProductCountResponse, ProductResponse},
    },
};
use async_trait::async_trait;
use shared::errors::ServiceError;
use std::sync::Arc;

pub type DynProductQueryService = Arc<dyn ProductQueryServiceTrait + Send + Sync>;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductQueryServiceTrait {
    async fn find_all(
        &self,
        req: &FindAllProducts,
    ) -> Result<ApiResponsePagination<Vec<ProductResponse>>, ServiceError>;
    /// Products of the company owned by `user_id`, active or not.
    async fn find_my_products(
        &self,
        user_id: i64,
        req: &FindAllProducts,
    ) -> Result<ApiResponsePagination<Vec<ProductResponse>>, ServiceError>;
    /// Records a view from `ip` before returning the product.
    async fn view_product(
        &self,
        slug: &str,
        ip: &str,
    ) -> Result<ApiResponse<ProductResponse>, ServiceError>;
    async fn count(
        &self,
        req: &CountProductsQuery,
    ) -> Result<ApiResponse<ProductCountResponse>, ServiceError>;
}
