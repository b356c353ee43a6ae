use crate::{
    abstract_trait::{
        company::DynCompanyRepository,
        currency::DynCurrencyService,
        product::{
            repository::{DynProductCommandRepository, DynProductQueryRepository},
            service::ProductQueryServiceTrait,
        },
    },
    domain::{
        requests::{
            page_window,
            product::{CountProductsQuery, FindAllProducts},
        },
        response::{
            ApiResponse, ApiResponsePagination, Pagination,
            media::MediaUrls,
            product::{ProductCountResponse, ProductResponse},
        },
    },
    model::Product,
    service::{ProductPresenter, SellerGuard},
};
use async_trait::async_trait;
use opentelemetry::KeyValue;
use prometheus_client::registry::Registry;
use shared::{
    errors::ServiceError,
    utils::{Method, Metrics, OperationTracer},
};
use tracing::info;

#[derive(Clone)]
pub struct ProductQueryService {
    query: DynProductQueryRepository,
    command: DynProductCommandRepository,
    sellers: SellerGuard,
    presenter: ProductPresenter,
    tracer: OperationTracer,
}

impl ProductQueryService {
    pub fn new(
        query: DynProductQueryRepository,
        command: DynProductCommandRepository,
        companies: DynCompanyRepository,
        currency: DynCurrencyService,
        media: MediaUrls,
        registry: &mut Registry,
    ) -> Self {
        let metrics = Metrics::new();
        metrics.register(registry, "product_query_service", "ProductQueryService");

        Self {
            presenter: ProductPresenter::new(query.clone(), currency, media),
            query,
            command,
            sellers: SellerGuard::new(companies),
            tracer: OperationTracer::new("product-query-service", metrics),
        }
    }

    async fn paginate(
        &self,
        req: &FindAllProducts,
        found: Result<(Vec<Product>, i64), ServiceError>,
        message: &str,
    ) -> Result<ApiResponsePagination<Vec<ProductResponse>>, ServiceError> {
        let (products, total) = found?;
        let (page, page_size) = page_window(req.page, req.page_size);
        let data = self.presenter.present(products).await?;

        Ok(ApiResponsePagination::success(
            message,
            data,
            Pagination::new(page, page_size, total),
        ))
    }
}

#[async_trait]
impl ProductQueryServiceTrait for ProductQueryService {
    async fn find_all(
        &self,
        req: &FindAllProducts,
    ) -> Result<ApiResponsePagination<Vec<ProductResponse>>, ServiceError> {
        let ctx = self.tracer.start(
            "FindAllProducts",
            vec![
                KeyValue::new("component", "product"),
                KeyValue::new("search", req.search.clone()),
                KeyValue::new("page", req.page as i64),
            ],
        );

        let found = self.query.search(req).await.map_err(ServiceError::from);
        let result = self
            .paginate(req, found, "Products retrieved successfully")
            .await;

        match &result {
            Ok(res) => self.tracer.success(
                &ctx,
                Method::Get,
                &format!("Found {} products", res.data.len()),
            ),
            Err(e) => self.tracer.error(&ctx, Method::Get, &e.to_string()),
        }
        result
    }

    async fn find_my_products(
        &self,
        user_id: i64,
        req: &FindAllProducts,
    ) -> Result<ApiResponsePagination<Vec<ProductResponse>>, ServiceError> {
        let ctx = self.tracer.start(
            "FindMyProducts",
            vec![
                KeyValue::new("component", "product"),
                KeyValue::new("user_id", user_id),
            ],
        );

        let result: Result<ApiResponsePagination<Vec<ProductResponse>>, ServiceError> = async {
            let company = self.sellers.company_of(user_id).await?;
            let found = self
                .query
                .find_by_seller(company.company_id, req)
                .await
                .map_err(ServiceError::from);
            self.paginate(req, found, "Your products retrieved successfully")
                .await
        }
        .await;

        match &result {
            Ok(res) => self.tracer.success(
                &ctx,
                Method::Get,
                &format!("Found {} products of user {user_id}", res.data.len()),
            ),
            Err(e) => self.tracer.error(&ctx, Method::Get, &e.to_string()),
        }
        result
    }

    async fn view_product(
        &self,
        slug: &str,
        ip: &str,
    ) -> Result<ApiResponse<ProductResponse>, ServiceError> {
        let ctx = self.tracer.start(
            "ViewProduct",
            vec![
                KeyValue::new("component", "product"),
                KeyValue::new("slug", slug.to_string()),
            ],
        );

        let result: Result<ApiResponse<ProductResponse>, ServiceError> = async {
            let mut product = self
                .query
                .find_by_slug(slug)
                .await?
                .filter(|p| p.is_active)
                .ok_or_else(ServiceError::not_found)?;

            product.views = self.command.record_view(product.product_id, ip).await?;
            info!("👁️ Product {} viewed from {ip}", product.slug);

            let data = self.presenter.present_one(product).await?;
            Ok(ApiResponse::success("Product retrieved successfully", data))
        }
        .await;

        match &result {
            Ok(_) => self
                .tracer
                .success(&ctx, Method::Get, &format!("Product {slug} viewed")),
            Err(e) => self.tracer.error(&ctx, Method::Get, &e.to_string()),
        }
        result
    }

    async fn count(
        &self,
        req: &CountProductsQuery,
    ) -> Result<ApiResponse<ProductCountResponse>, ServiceError> {
        let ctx = self
            .tracer
            .start("CountProducts", vec![KeyValue::new("component", "product")]);

        match self.query.count(req).await {
            Ok(total) => {
                self.tracer
                    .success(&ctx, Method::Get, &format!("Counted {total} products"));
                Ok(ApiResponse::success(
                    "Products counted successfully",
                    ProductCountResponse { total },
                ))
            }
            Err(e) => {
                self.tracer.error(&ctx, Method::Get, &e.to_string());
                Err(e.into())
            }
        }
    }
}
