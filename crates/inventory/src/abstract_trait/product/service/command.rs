use crate::domain::{
    requests::product::{CreateProductRequest, UpdateProductRequest},
    response::{ApiResponse, product::ProductResponse},
};
use async_trait::async_trait;
use shared::errors::ServiceError;
use std::sync::Arc;

pub type DynProductCommandService = Arc<dyn ProductCommandServiceTrait + Send + Sync>;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductCommandServiceTrait {
    async fn create_product(
        &self,
        user_id: i64,
        req: &CreateProductRequest,
    ) -> Result<ApiResponse<ProductResponse>, ServiceError>;
    async fn update_product(
        &self,
        user_id: i64,
        req: &UpdateProductRequest,
    ) -> Result<ApiResponse<ProductResponse>, ServiceError>;
    async fn set_active(
        &self,
        user_id: i64,
        id: i32,
        is_active: bool,
    ) -> Result<ApiResponse<ProductResponse>, ServiceError>;
}
