use crate::{abstract_trait::company::CompanyRepositoryTrait, model::Company};
use async_trait::async_trait;
use shared::{config::ConnectionPool, errors::RepositoryError};
use tracing::error;

#[derive(Clone)]
pub struct CompanyRepository {
    db: ConnectionPool,
}

impl CompanyRepository {
    pub fn new(db: ConnectionPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CompanyRepositoryTrait for CompanyRepository {
    async fn find_by_user(&self, user_id: i64) -> Result<Option<Company>, RepositoryError> {
        sqlx::query_as::<_, Company>(
            "SELECT company_id, user_id, company_name, about FROM companies WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await
        .map_err(|e| {
            error!("❌ Failed to resolve company of user {user_id}: {e:?}");
            RepositoryError::from(e)
        })
    }

    async fn find_existing_ids(&self, ids: &[i32]) -> Result<Vec<i32>, RepositoryError> {
        sqlx::query_scalar::<_, i32>("SELECT company_id FROM companies WHERE company_id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.db)
            .await
            .map_err(RepositoryError::from)
    }
}
