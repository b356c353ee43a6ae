mod repository;
mod service;

pub use self::repository::{CategoryRepositoryTrait, DynCategoryRepository};
pub use self::service::{CategoryServiceTrait, DynCategoryService};

#[cfg(test)]
pub use self::repository::MockCategoryRepositoryTrait;
#[cfg(test)]
pub use self::service::MockCategoryServiceTrait;
