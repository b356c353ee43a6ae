use crate::{
    domain::requests::category::{CategoryChanges, FindAllCategories, NewCategory},
    model::Category,
};
use async_trait::async_trait;
use shared::errors::RepositoryError;
use std::{collections::HashMap, sync::Arc};

pub type DynCategoryRepository = Arc<dyn CategoryRepositoryTrait + Send + Sync>;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CategoryRepositoryTrait {
    /// Ordered by materialized path, so parents come before their children.
    async fn find_all(
        &self,
        req: &FindAllCategories,
    ) -> Result<(Vec<Category>, i64), RepositoryError>;
    async fn find_by_id(&self, id: i32) -> Result<Option<Category>, RepositoryError>;
    /// The subset of `ids` that exist.
    async fn find_existing_ids(&self, ids: &[i32]) -> Result<Vec<i32>, RepositoryError>;
    async fn slug_exists(&self, slug: &str) -> Result<bool, RepositoryError>;
    async fn create(&self, category: &NewCategory) -> Result<Category, RepositoryError>;
    /// Applies `changes`, moving the whole subtree when the parent changes.
    async fn update(&self, changes: &CategoryChanges) -> Result<Category, RepositoryError>;
    async fn delete(&self, id: i32) -> Result<(), RepositoryError>;
    /// Owning company ids per category.
    async fn companies_of(
        &self,
        category_ids: &[i32],
    ) -> Result<HashMap<i32, Vec<i32>>, RepositoryError>;
}
