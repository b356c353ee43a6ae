use crate::{
    abstract_trait::{
        category::{CategoryServiceTrait, DynCategoryRepository},
        company::DynCompanyRepository,
        storage::DynFileStorage,
    },
    domain::{
        category_path::can_reparent,
        requests::{
            category::{
                CategoryChanges, CreateCategoryRequest, FindAllCategories, NewCategory,
                ParentChange, UpdateCategoryRequest,
            },
            page_window,
        },
        response::{
            ApiResponse, ApiResponsePagination, Pagination, category::CategoryResponse,
            media::MediaUrls,
        },
    },
    model::Category,
    storage::{CATEGORY_FILES, discard},
};
use async_trait::async_trait;
use opentelemetry::KeyValue;
use prometheus_client::registry::Registry;
use shared::{
    errors::{RepositoryError, ServiceError},
    utils::{DecodedFile, Method, Metrics, OperationTracer, slug_candidate, slugify},
};
use std::collections::BTreeSet;
use tracing::warn;

/// Unique constraint on `categories.slug`.
const SLUG_CONSTRAINT: &str = "categories_slug_key";
/// Concurrent inserts that may take a free slug before we give up.
const MAX_SLUG_RACES: u32 = 5;

#[derive(Clone)]
pub struct CategoryService {
    repository: DynCategoryRepository,
    companies: DynCompanyRepository,
    storage: DynFileStorage,
    media: MediaUrls,
    tracer: OperationTracer,
}

impl CategoryService {
    pub fn new(
        repository: DynCategoryRepository,
        companies: DynCompanyRepository,
        storage: DynFileStorage,
        media: MediaUrls,
        registry: &mut Registry,
    ) -> Self {
        let metrics = Metrics::new();
        metrics.register(registry, "category_service", "CategoryService");

        Self {
            repository,
            companies,
            storage,
            media,
            tracer: OperationTracer::new("category-service", metrics),
        }
    }

    async fn respond(&self, category: Category) -> Result<CategoryResponse, ServiceError> {
        let mut companies = self
            .repository
            .companies_of(&[category.category_id])
            .await?;
        let owned = companies.remove(&category.category_id).unwrap_or_default();
        Ok(CategoryResponse::build(category, owned, &self.media))
    }

    async fn resolve_companies(&self, ids: &[i32]) -> Result<Vec<i32>, ServiceError> {
        let wanted: Vec<i32> = ids.iter().copied().collect::<BTreeSet<_>>().into_iter().collect();
        if wanted.is_empty() {
            return Ok(wanted);
        }

        let existing: BTreeSet<i32> = self
            .companies
            .find_existing_ids(&wanted)
            .await?
            .into_iter()
            .collect();

        if let Some(missing) = wanted.iter().find(|id| !existing.contains(id)) {
            return Err(ServiceError::validation(format!(
                "companies: company {missing} does not exist"
            )));
        }
        Ok(wanted)
    }

    async fn store_image(&self, payload: Option<&str>) -> Result<Option<String>, ServiceError> {
        match payload {
            Some(payload) => {
                let file = DecodedFile::decode("category_image", payload)?;
                Ok(Some(self.storage.save(CATEGORY_FILES, &file).await?))
            }
            None => Ok(None),
        }
    }

    async fn free_slug(&self, base: &str, mut attempt: u32) -> Result<(String, u32), ServiceError> {
        loop {
            let candidate = slug_candidate(base, attempt);
            if !self.repository.slug_exists(&candidate).await? {
                return Ok((candidate, attempt));
            }
            attempt += 1;
        }
    }

    /// Inserts under the first free slug, retrying when a concurrent insert
    /// claims it first.
    async fn insert(&self, mut category: NewCategory) -> Result<Category, ServiceError> {
        let base = slugify(&category.name);
        let mut attempt = 1;

        for _ in 0..MAX_SLUG_RACES {
            let (slug, taken_at) = self.free_slug(&base, attempt).await?;
            category.slug = slug;

            match self.repository.create(&category).await {
                Err(RepositoryError::AlreadyExists(constraint)) if constraint == SLUG_CONSTRAINT => {
                    warn!("⚠️ Slug {} was taken concurrently, retrying", category.slug);
                    attempt = taken_at + 1;
                }
                result => return Ok(result?),
            }
        }

        Err(RepositoryError::Conflict(format!("no free slug for {:?}", category.name)).into())
    }

    async fn existing_parent(&self, parent_id: i32) -> Result<Category, ServiceError> {
        self.repository
            .find_by_id(parent_id)
            .await?
            .ok_or_else(|| {
                ServiceError::validation(format!("parent_id: category {parent_id} does not exist"))
            })
    }

    async fn create(&self, req: &CreateCategoryRequest) -> Result<CategoryResponse, ServiceError> {
        if let Some(parent_id) = req.parent_id {
            self.existing_parent(parent_id).await?;
        }
        let companies = self.resolve_companies(&req.companies).await?;
        let category_image = self.store_image(req.category_image.as_deref()).await?;

        let category = NewCategory {
            name: req.name.trim().to_string(),
            slug: String::new(),
            is_active: req.is_active.unwrap_or(true),
            parent_id: req.parent_id,
            description: req.description.clone(),
            category_image: category_image.clone(),
            companies: companies.clone(),
        };

        let created = match self.insert(category).await {
            Ok(created) => created,
            Err(e) => {
                discard(&self.storage, category_image.as_slice()).await;
                return Err(e);
            }
        };
        Ok(CategoryResponse::build(created, companies, &self.media))
    }

    async fn update(&self, req: &UpdateCategoryRequest) -> Result<CategoryResponse, ServiceError> {
        let current = self
            .repository
            .find_by_id(req.id)
            .await?
            .ok_or_else(ServiceError::not_found)?;

        let parent = match (req.detach_parent, req.parent_id) {
            (true, _) => ParentChange::Detach,
            (false, None) => ParentChange::Keep,
            (false, Some(parent_id)) if Some(parent_id) == current.parent_id => ParentChange::Keep,
            (false, Some(parent_id)) => {
                let parent = self.existing_parent(parent_id).await?;
                if !can_reparent(current.category_id, parent_id, &parent.path) {
                    return Err(ServiceError::validation(
                        "parent_id: a category cannot be moved under itself or its descendants",
                    ));
                }
                ParentChange::MoveTo(parent_id)
            }
        };

        let companies = match &req.companies {
            Some(ids) => Some(self.resolve_companies(ids).await?),
            None => None,
        };
        let category_image = self.store_image(req.category_image.as_deref()).await?;

        let changes = CategoryChanges {
            id: current.category_id,
            name: req.name.as_ref().map(|n| n.trim().to_string()),
            is_active: req.is_active,
            parent,
            description: req.description.clone(),
            category_image: category_image.clone(),
            companies,
        };

        let updated = match self.repository.update(&changes).await {
            Ok(updated) => updated,
            Err(e) => {
                discard(&self.storage, category_image.as_slice()).await;
                return Err(e.into());
            }
        };
        self.respond(updated).await
    }
}

#[async_trait]
impl CategoryServiceTrait for CategoryService {
    async fn find_all(
        &self,
        req: &FindAllCategories,
    ) -> Result<ApiResponsePagination<Vec<CategoryResponse>>, ServiceError> {
        let ctx = self.tracer.start(
            "FindAllCategories",
            vec![
                KeyValue::new("component", "category"),
                KeyValue::new("search", req.search.clone()),
            ],
        );

        let result: Result<ApiResponsePagination<Vec<CategoryResponse>>, ServiceError> = async {
            let (categories, total) = self.repository.find_all(req).await?;
            let ids: Vec<i32> = categories.iter().map(|c| c.category_id).collect();
            let mut companies = self.repository.companies_of(&ids).await?;

            let data: Vec<CategoryResponse> = categories
                .into_iter()
                .map(|c| {
                    let owned = companies.remove(&c.category_id).unwrap_or_default();
                    CategoryResponse::build(c, owned, &self.media)
                })
                .collect();

            let (page, page_size) = page_window(req.page, req.page_size);
            Ok(ApiResponsePagination::success(
                "Categories retrieved successfully",
                data,
                Pagination::new(page, page_size, total),
            ))
        }
        .await;

        match &result {
            Ok(res) => self.tracer.success(
                &ctx,
                Method::Get,
                &format!("Found {} categories", res.data.len()),
            ),
            Err(e) => self.tracer.error(&ctx, Method::Get, &e.to_string()),
        }
        result
    }

    async fn create_category(
        &self,
        req: &CreateCategoryRequest,
    ) -> Result<ApiResponse<CategoryResponse>, ServiceError> {
        let ctx = self.tracer.start(
            "CreateCategory",
            vec![
                KeyValue::new("component", "category"),
                KeyValue::new("category.name", req.name.clone()),
            ],
        );

        match self.create(req).await {
            Ok(category) => {
                self.tracer.success(
                    &ctx,
                    Method::Post,
                    &format!("Category created at {}", category.path),
                );
                Ok(ApiResponse::success("Category created successfully", category))
            }
            Err(e) => {
                self.tracer.error(&ctx, Method::Post, &e.to_string());
                Err(e)
            }
        }
    }

    async fn update_category(
        &self,
        req: &UpdateCategoryRequest,
    ) -> Result<ApiResponse<CategoryResponse>, ServiceError> {
        let ctx = self.tracer.start(
            "UpdateCategory",
            vec![
                KeyValue::new("component", "category"),
                KeyValue::new("category.id", req.id as i64),
            ],
        );

        match self.update(req).await {
            Ok(category) => {
                self.tracer
                    .success(&ctx, Method::Put, &format!("Category {} updated", req.id));
                Ok(ApiResponse::success("Category updated successfully", category))
            }
            Err(e) => {
                self.tracer.error(&ctx, Method::Put, &e.to_string());
                Err(e)
            }
        }
    }

    async fn delete_category(&self, id: i32) -> Result<(), ServiceError> {
        let ctx = self.tracer.start(
            "DeleteCategory",
            vec![
                KeyValue::new("component", "category"),
                KeyValue::new("category.id", id as i64),
            ],
        );

        match self.repository.delete(id).await {
            Ok(()) => {
                self.tracer
                    .success(&ctx, Method::Delete, &format!("Category {id} deleted"));
                Ok(())
            }
            Err(e) => {
                self.tracer.error(&ctx, Method::Delete, &e.to_string());
                Err(e.into())
            }
        }
    }
}
