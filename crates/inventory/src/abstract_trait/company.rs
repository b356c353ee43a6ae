use crate::model::Company;
use async_trait::async_trait;
use shared::errors::RepositoryError;
use std::sync::Arc;

pub type DynCompanyRepository = Arc<dyn CompanyRepositoryTrait + Send + Sync>;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompanyRepositoryTrait {
    /// The company an account acts as, if it owns one.
    async fn find_by_user(&self, user_id: i64) -> Result<Option<Company>, RepositoryError>;
    async fn find_existing_ids(&self, ids: &[i32]) -> Result<Vec<i32>, RepositoryError>;
}
