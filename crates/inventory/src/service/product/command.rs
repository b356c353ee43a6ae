use crate::{
    abstract_trait::{
        category::DynCategoryRepository,
        company::DynCompanyRepository,
        currency::DynCurrencyService,
        product::{
            repository::{DynProductCommandRepository, DynProductQueryRepository},
            service::ProductCommandServiceTrait,
        },
        storage::DynFileStorage,
    },
    domain::{
        requests::product::{
            CreateProductRequest, DocumentUpload, NewDocument, NewProduct, ProductAttachments,
            ProductChanges, UpdateProductRequest,
        },
        response::{ApiResponse, media::MediaUrls, product::ProductResponse},
    },
    model::Product,
    service::{ProductPresenter, SellerGuard},
    storage::{PRODUCT_FILES, discard},
};
use async_trait::async_trait;
use opentelemetry::KeyValue;
use prometheus_client::registry::Registry;
use rust_decimal::Decimal;
use shared::{
    errors::{RepositoryError, ServiceError},
    utils::{DecodedFile, Method, Metrics, OperationTracer, slug_candidate, slugify},
};
use std::collections::BTreeSet;
use tracing::{info, warn};

/// Files decoded from a request, not yet written to storage.
struct PendingUploads {
    brochure: Option<DecodedFile>,
    images: Vec<DecodedFile>,
    documents: Vec<(Option<String>, DecodedFile)>,
}

impl PendingUploads {
    /// Decodes every payload up front so a bad file rejects the request
    /// before anything is stored.
    fn decode(
        brochure: Option<&str>,
        images: &[String],
        documents: &[DocumentUpload],
    ) -> Result<Self, ServiceError> {
        let brochure = brochure
            .map(|payload| DecodedFile::decode("brochure", payload))
            .transpose()?;

        let images = images
            .iter()
            .enumerate()
            .map(|(i, payload)| DecodedFile::decode(&format!("images[{i}]"), payload))
            .collect::<Result<Vec<_>, _>>()?;

        let documents = documents
            .iter()
            .enumerate()
            .map(|(i, doc)| {
                let mut file = DecodedFile::decode(&format!("documents[{i}].file"), &doc.file)?;
                let name = doc
                    .name
                    .as_deref()
                    .map(str::trim)
                    .filter(|name| !name.is_empty());
                if let Some(name) = name {
                    if name.contains(['/', '\\']) || name == "." || name == ".." {
                        return Err(ServiceError::validation(format!(
                            "documents[{i}].name: must not contain path separators"
                        )));
                    }
                    file.file_name = name.to_string();
                }
                Ok((name.map(str::to_string), file))
            })
            .collect::<Result<Vec<_>, ServiceError>>()?;

        Ok(Self {
            brochure,
            images,
            documents,
        })
    }
}

/// Relative paths of stored uploads.
struct StoredUploads {
    brochure: Option<String>,
    image_paths: Vec<String>,
    documents: Vec<NewDocument>,
}

impl StoredUploads {
    fn paths(&self) -> Vec<String> {
        self.brochure
            .iter()
            .chain(&self.image_paths)
            .chain(self.documents.iter().map(|d| &d.file))
            .cloned()
            .collect()
    }
}

/// Unique constraint on `products.slug`.
const SLUG_CONSTRAINT: &str = "products_slug_key";
/// Concurrent inserts that may take a free slug before we give up.
const MAX_SLUG_RACES: u32 = 5;

#[derive(Clone)]
pub struct ProductCommandService {
    query: DynProductQueryRepository,
    command: DynProductCommandRepository,
    categories: DynCategoryRepository,
    storage: DynFileStorage,
    sellers: SellerGuard,
    presenter: ProductPresenter,
    tracer: OperationTracer,
}

impl ProductCommandService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        query: DynProductQueryRepository,
        command: DynProductCommandRepository,
        categories: DynCategoryRepository,
        companies: DynCompanyRepository,
        currency: DynCurrencyService,
        storage: DynFileStorage,
        media: MediaUrls,
        registry: &mut Registry,
    ) -> Self {
        let metrics = Metrics::new();
        metrics.register(registry, "product_command_service", "ProductCommandService");

        Self {
            presenter: ProductPresenter::new(query.clone(), currency, media),
            query,
            command,
            categories,
            storage,
            sellers: SellerGuard::new(companies),
            tracer: OperationTracer::new("product-command-service", metrics),
        }
    }

    /// Deduplicated ids, all of which must exist.
    async fn resolve_categories(&self, ids: &[i32]) -> Result<Vec<i32>, ServiceError> {
        let wanted: BTreeSet<i32> = ids.iter().copied().collect();
        if wanted.is_empty() {
            return Ok(Vec::new());
        }

        let wanted: Vec<i32> = wanted.into_iter().collect();
        let existing: BTreeSet<i32> = self
            .categories
            .find_existing_ids(&wanted)
            .await?
            .into_iter()
            .collect();

        let unknown: Vec<String> = wanted
            .iter()
            .filter(|id| !existing.contains(id))
            .map(|id| id.to_string())
            .collect();

        if !unknown.is_empty() {
            return Err(ServiceError::validation(format!(
                "categories: unknown category ids {}",
                unknown.join(", ")
            )));
        }

        Ok(wanted)
    }

    /// First free candidate from `attempt` on, with the attempt it came from.
    async fn free_slug(&self, base: &str, mut attempt: u32) -> Result<(String, u32), ServiceError> {
        loop {
            let candidate = slug_candidate(base, attempt);
            if !self.query.slug_exists(&candidate).await? {
                return Ok((candidate, attempt));
            }
            attempt += 1;
        }
    }

    /// Inserts under the first free slug, moving on to the next candidate
    /// when a concurrent insert claims it first.
    async fn insert(
        &self,
        mut product: NewProduct,
        attachments: &ProductAttachments,
    ) -> Result<Product, ServiceError> {
        let base = slugify(&product.name);
        let mut attempt = 1;

        for _ in 0..MAX_SLUG_RACES {
            let (slug, taken_at) = self.free_slug(&base, attempt).await?;
            product.slug = slug;

            match self.command.create_product(&product, attachments).await {
                Err(RepositoryError::AlreadyExists(constraint)) if constraint == SLUG_CONSTRAINT => {
                    warn!("⚠️ Slug {} was taken concurrently, retrying", product.slug);
                    attempt = taken_at + 1;
                }
                result => return Ok(result?),
            }
        }

        Err(RepositoryError::Conflict(format!("no free slug for {:?}", product.name)).into())
    }

    async fn store(&self, uploads: PendingUploads) -> Result<StoredUploads, ServiceError> {
        let brochure = match &uploads.brochure {
            Some(file) => Some(self.storage.save(PRODUCT_FILES, file).await?),
            None => None,
        };

        let mut image_paths = Vec::with_capacity(uploads.images.len());
        for image in &uploads.images {
            image_paths.push(self.storage.save(PRODUCT_FILES, image).await?);
        }

        let mut documents = Vec::with_capacity(uploads.documents.len());
        for (name, file) in &uploads.documents {
            let path = self.storage.save(PRODUCT_FILES, file).await?;
            documents.push(NewDocument {
                name: Some(name.clone().unwrap_or_else(|| file.file_name.clone())),
                file: path,
            });
        }

        Ok(StoredUploads {
            brochure,
            image_paths,
            documents,
        })
    }

    async fn create(
        &self,
        user_id: i64,
        req: &CreateProductRequest,
    ) -> Result<ProductResponse, ServiceError> {
        let company = self.sellers.company_of(user_id).await?;
        let category_ids = self.resolve_categories(&req.categories).await?;
        let uploads = PendingUploads::decode(req.brochure.as_deref(), &req.images, &req.documents)?;

        let stored = self.store(uploads).await?;
        let written = stored.paths();

        let product = NewProduct {
            name: req.name.trim().to_string(),
            seller_id: Some(company.company_id),
            slug: String::new(),
            sku: req.sku.clone(),
            description: req.description.clone(),
            is_active: req.is_active.unwrap_or(true),
            weight: req.weight.clone(),
            cost: req.cost.unwrap_or(Decimal::ZERO),
            brochure: stored.brochure,
            unit: req.unit.clone(),
        };
        let attachments = ProductAttachments {
            category_ids: Some(category_ids),
            image_paths: stored.image_paths,
            documents: stored.documents,
        };

        let created = match self.insert(product, &attachments).await {
            Ok(created) => created,
            Err(e) => {
                discard(&self.storage, &written).await;
                return Err(e);
            }
        };
        info!(
            "🆕 Company {} listed product {}",
            company.company_id, created.slug
        );

        self.presenter.present_one(created).await
    }

    async fn update(
        &self,
        user_id: i64,
        req: &UpdateProductRequest,
    ) -> Result<ProductResponse, ServiceError> {
        let product = self
            .query
            .find_by_id(req.id)
            .await?
            .ok_or_else(ServiceError::not_found)?;
        self.sellers.ensure_owner(user_id, &product).await?;

        let category_ids = match &req.categories {
            Some(ids) => Some(self.resolve_categories(ids).await?),
            None => None,
        };
        let uploads = PendingUploads::decode(req.brochure.as_deref(), &req.images, &req.documents)?;
        let stored = self.store(uploads).await?;
        let written = stored.paths();

        let changes = ProductChanges {
            id: product.product_id,
            name: req.name.as_ref().map(|n| n.trim().to_string()),
            sku: req.sku.clone(),
            description: req.description.clone(),
            is_active: req.is_active,
            weight: req.weight.clone(),
            cost: req.cost,
            brochure: stored.brochure,
            unit: req.unit.clone(),
        };
        let attachments = ProductAttachments {
            category_ids,
            image_paths: stored.image_paths,
            documents: stored.documents,
        };

        let updated = match self.command.update_product(&changes, &attachments).await {
            Ok(updated) => updated,
            Err(e) => {
                discard(&self.storage, &written).await;
                return Err(e.into());
            }
        };
        self.presenter.present_one(updated).await
    }

    async fn toggle(
        &self,
        user_id: i64,
        id: i32,
        is_active: bool,
    ) -> Result<ProductResponse, ServiceError> {
        let product = self
            .query
            .find_by_id(id)
            .await?
            .ok_or_else(ServiceError::not_found)?;
        self.sellers.ensure_owner(user_id, &product).await?;

        let product = if product.is_active == is_active {
            product
        } else {
            self.command.set_active(id, is_active).await?
        };

        self.presenter.present_one(product).await
    }
}

#[async_trait]
impl ProductCommandServiceTrait for ProductCommandService {
    async fn create_product(
        &self,
        user_id: i64,
        req: &CreateProductRequest,
    ) -> Result<ApiResponse<ProductResponse>, ServiceError> {
        let ctx = self.tracer.start(
            "CreateProduct",
            vec![
                KeyValue::new("component", "product"),
                KeyValue::new("product.name", req.name.clone()),
                KeyValue::new("user_id", user_id),
            ],
        );

        match self.create(user_id, req).await {
            Ok(product) => {
                self.tracer.success(
                    &ctx,
                    Method::Post,
                    &format!("Product created: {}", product.slug),
                );
                Ok(ApiResponse::success("Product created successfully", product))
            }
            Err(e) => {
                self.tracer.error(&ctx, Method::Post, &e.to_string());
                Err(e)
            }
        }
    }

    async fn update_product(
        &self,
        user_id: i64,
        req: &UpdateProductRequest,
    ) -> Result<ApiResponse<ProductResponse>, ServiceError> {
        let ctx = self.tracer.start(
            "UpdateProduct",
            vec![
                KeyValue::new("component", "product"),
                KeyValue::new("product.id", req.id as i64),
                KeyValue::new("user_id", user_id),
            ],
        );

        match self.update(user_id, req).await {
            Ok(product) => {
                self.tracer
                    .success(&ctx, Method::Put, &format!("Product {} updated", req.id));
                Ok(ApiResponse::success("Product updated successfully", product))
            }
            Err(e) => {
                self.tracer.error(&ctx, Method::Put, &e.to_string());
                Err(e)
            }
        }
    }

    async fn set_active(
        &self,
        user_id: i64,
        id: i32,
        is_active: bool,
    ) -> Result<ApiResponse<ProductResponse>, ServiceError> {
        let ctx = self.tracer.start(
            if is_active { "EnableProduct" } else { "DisableProduct" },
            vec![
                KeyValue::new("component", "product"),
                KeyValue::new("product.id", id as i64),
            ],
        );

        match self.toggle(user_id, id, is_active).await {
            Ok(product) => {
                let message = if is_active {
                    "Product enabled successfully"
                } else {
                    "Product disabled successfully"
                };
                self.tracer.success(&ctx, Method::Post, message);
                Ok(ApiResponse::success(message, product))
            }
            Err(e) => {
                self.tracer.error(&ctx, Method::Post, &e.to_string());
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        abstract_trait::{
            category::MockCategoryRepositoryTrait,
            company::MockCompanyRepositoryTrait,
            currency::MockCurrencyServiceTrait,
            product::repository::{
                MockProductCommandRepositoryTrait, MockProductQueryRepositoryTrait,
            },
            storage::MockFileStorageTrait,
        },
        service::product::fixtures,
    };
    use std::sync::Arc;

    struct Mocks {
        query: MockProductQueryRepositoryTrait,
        command: MockProductCommandRepositoryTrait,
        categories: MockCategoryRepositoryTrait,
        companies: MockCompanyRepositoryTrait,
        storage: MockFileStorageTrait,
    }

    impl Mocks {
        fn new() -> Self {
            let mut query = MockProductQueryRepositoryTrait::new();
            query
                .expect_load_details()
                .returning(|products| Ok(fixtures::details(products)));
            let mut companies = MockCompanyRepositoryTrait::new();
            companies
                .expect_find_by_user()
                .returning(|user_id| Ok((user_id == 30).then(|| fixtures::company(3, 30))));

            Self {
                query,
                command: MockProductCommandRepositoryTrait::new(),
                categories: MockCategoryRepositoryTrait::new(),
                companies,
                storage: MockFileStorageTrait::new(),
            }
        }

        fn build(self) -> ProductCommandService {
            let mut currency = MockCurrencyServiceTrait::new();
            currency.expect_stored().returning(|| Ok(fixtures::rates()));

            ProductCommandService::new(
                Arc::new(self.query),
                Arc::new(self.command),
                Arc::new(self.categories),
                Arc::new(self.companies),
                Arc::new(currency),
                Arc::new(self.storage),
                MediaUrls::new("http://localhost:8080"),
                &mut Registry::default(),
            )
        }
    }

    fn create_request() -> CreateProductRequest {
        CreateProductRequest {
            name: "Cocoa beans".into(),
            sku: None,
            description: "Fermented and sun dried".into(),
            categories: vec![4, 4, 9],
            is_active: None,
            weight: None,
            cost: None,
            brochure: None,
            images: vec![],
            documents: vec![],
            unit: Some("ton".into()),
        }
    }

    #[tokio::test]
    async fn create_picks_next_free_slug_and_owner_company() {
        let mut mocks = Mocks::new();
        mocks
            .categories
            .expect_find_existing_ids()
            .returning(|ids| Ok(ids.to_vec()));
        mocks
            .query
            .expect_slug_exists()
            .returning(|slug| Ok(slug.to_string() != "cocoa-beans-3"));
        mocks
            .command
            .expect_create_product()
            .times(1)
            .withf(|product, attachments| {
                product.slug == "cocoa-beans-3"
                    && product.seller_id == Some(3)
                    && product.cost == Decimal::ZERO
                    && attachments.category_ids == Some(vec![4, 9])
            })
            .returning(|product, _| {
                let mut created = fixtures::product(11, product.seller_id);
                created.slug = product.slug.clone();
                Ok(created)
            });

        let response = mocks
            .build()
            .create_product(30, &create_request())
            .await
            .unwrap();

        assert_eq!(response.data.slug, "cocoa-beans-3");
    }

    #[tokio::test]
    async fn unknown_categories_are_rejected() {
        let mut mocks = Mocks::new();
        mocks
            .categories
            .expect_find_existing_ids()
            .returning(|_| Ok(vec![4]));
        mocks.command.expect_create_product().times(0);

        let err = mocks
            .build()
            .create_product(30, &create_request())
            .await
            .unwrap_err();

        match err {
            ServiceError::Validation(messages) => {
                assert_eq!(messages, vec!["categories: unknown category ids 9"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_brochure_names_the_field() {
        let mut mocks = Mocks::new();
        mocks
            .categories
            .expect_find_existing_ids()
            .returning(|ids| Ok(ids.to_vec()));
        mocks.storage.expect_save().times(0);

        let mut req = create_request();
        req.brochure = Some("data:application/pdf;base64,@@@".into());

        let err = mocks.build().create_product(30, &req).await.unwrap_err();

        match err {
            ServiceError::Validation(messages) => {
                assert!(messages[0].starts_with("brochure: "), "{messages:?}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn only_the_seller_may_edit() {
        let mut mocks = Mocks::new();
        mocks
            .query
            .expect_find_by_id()
            .returning(|id| Ok(Some(fixtures::product(id, Some(8)))));
        mocks.command.expect_update_product().times(0);

        let req = UpdateProductRequest {
            id: 11,
            name: Some("Renamed".into()),
            sku: None,
            description: None,
            categories: None,
            is_active: None,
            weight: None,
            cost: None,
            brochure: None,
            images: vec![],
            documents: vec![],
            unit: None,
        };

        let err = mocks.build().update_product(30, &req).await.unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));
    }

    #[tokio::test]
    async fn disabling_twice_is_idempotent() {
        let mut mocks = Mocks::new();
        mocks.query.expect_find_by_id().returning(|id| {
            let mut product = fixtures::product(id, Some(3));
            product.is_active = false;
            Ok(Some(product))
        });
        mocks.command.expect_set_active().times(0);

        let response = mocks.build().set_active(30, 11, false).await.unwrap();
        assert!(!response.data.is_active);
    }

    #[tokio::test]
    async fn missing_product_is_not_found() {
        let mut mocks = Mocks::new();
        mocks.query.expect_find_by_id().returning(|_| Ok(None));

        let err = mocks.build().set_active(30, 404, true).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Repo(shared::errors::RepositoryError::NotFound)
        ));
    }

    #[tokio::test]
    async fn slug_claimed_between_check_and_insert_moves_to_next_candidate() {
        let mut mocks = Mocks::new();
        mocks
            .categories
            .expect_find_existing_ids()
            .returning(|ids| Ok(ids.to_vec()));
        mocks.query.expect_slug_exists().returning(|_| Ok(false));
        mocks
            .command
            .expect_create_product()
            .times(1)
            .withf(|product, _| product.slug == "cocoa-beans")
            .returning(|_, _| Err(RepositoryError::AlreadyExists("products_slug_key".into())));
        mocks
            .command
            .expect_create_product()
            .times(1)
            .withf(|product, _| product.slug == "cocoa-beans-2")
            .returning(|product, _| {
                let mut created = fixtures::product(12, product.seller_id);
                created.slug = product.slug.clone();
                Ok(created)
            });

        let response = mocks
            .build()
            .create_product(30, &create_request())
            .await
            .unwrap();

        assert_eq!(response.data.slug, "cocoa-beans-2");
    }

    #[tokio::test]
    async fn failed_insert_removes_stored_uploads() {
        let mut mocks = Mocks::new();
        mocks
            .categories
            .expect_find_existing_ids()
            .returning(|ids| Ok(ids.to_vec()));
        mocks.query.expect_slug_exists().returning(|_| Ok(false));
        mocks
            .storage
            .expect_save()
            .times(1)
            .returning(|prefix, file| Ok(format!("{prefix}/{}", file.file_name)));
        mocks
            .command
            .expect_create_product()
            .returning(|_, _| Err(RepositoryError::ForeignKey("products_seller_id_fkey".into())));
        mocks
            .storage
            .expect_remove()
            .times(1)
            .withf(|path| path.to_string() == "user_main/pod.png")
            .returning(|_| Ok(()));

        let mut req = create_request();
        req.images = vec!["data:image/png;name=pod.png;base64,aGVsbG8=".into()];

        let err = mocks.build().create_product(30, &req).await.unwrap_err();

        assert!(matches!(err, ServiceError::Repo(RepositoryError::ForeignKey(_))));
    }
}
