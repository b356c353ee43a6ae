use crate::{
    abstract_trait::product::service::{DynProductCommandService, DynProductQueryService},
    domain::{
        requests::product::{
            CountProductsQuery, CreateProductRequest, FindAllProducts, ProductIdRequest,
            UpdateProductRequest,
        },
        response::{
            ApiResponse, ApiResponsePagination,
            product::{ProductCountResponse, ProductResponse},
        },
    },
    middleware::{client_ip::ClientIp, jwt::auth_middleware, validate::SimpleValidatedJson},
    state::AppState,
};
use axum::{
    Json,
    extract::{Extension, Path, Query},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post, put},
};
use shared::errors::HttpError;
use std::sync::Arc;
use utoipa_axum::router::OpenApiRouter;

#[utoipa::path(
    get,
    path = "/api/inventory/products",
    tag = "Product",
    params(FindAllProducts),
    responses(
        (status = 200, description = "Active products matching the search", body = ApiResponsePagination<Vec<ProductResponse>>),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_products(
    Extension(service): Extension<DynProductQueryService>,
    Query(params): Query<FindAllProducts>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.find_all(&params).await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    get,
    path = "/api/inventory/products/{product}",
    tag = "Product",
    params(("product" = String, Path, description = "Product slug")),
    responses(
        (status = 200, description = "Product detail; the view is counted", body = ApiResponse<ProductResponse>),
        (status = 404, description = "Product not found or inactive"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn view_product(
    Extension(service): Extension<DynProductQueryService>,
    ClientIp(ip): ClientIp,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.view_product(&slug, &ip).await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    get,
    path = "/api/inventory/total-products",
    tag = "Product",
    params(CountProductsQuery),
    responses(
        (status = 200, description = "Number of matching products", body = ApiResponse<ProductCountResponse>),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn count_products(
    Extension(service): Extension<DynProductQueryService>,
    Query(params): Query<CountProductsQuery>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.count(&params).await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    post,
    path = "/api/inventory/create-product",
    tag = "Product",
    security(("bearer_auth" = [])),
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created", body = ApiResponse<ProductResponse>),
        (status = 400, description = "Invalid payload"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller has no seller company"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn create_product(
    Extension(service): Extension<DynProductCommandService>,
    Extension(user_id): Extension<i64>,
    SimpleValidatedJson(body): SimpleValidatedJson<CreateProductRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.create_product(user_id, &body).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

#[utoipa::path(
    put,
    path = "/api/inventory/edit-product",
    tag = "Product",
    security(("bearer_auth" = [])),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Product updated", body = ApiResponse<ProductResponse>),
        (status = 400, description = "Invalid payload"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller is not the seller"),
        (status = 404, description = "Product not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn update_product(
    Extension(service): Extension<DynProductCommandService>,
    Extension(user_id): Extension<i64>,
    SimpleValidatedJson(body): SimpleValidatedJson<UpdateProductRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.update_product(user_id, &body).await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    post,
    path = "/api/inventory/disable-product",
    tag = "Product",
    security(("bearer_auth" = [])),
    request_body = ProductIdRequest,
    responses(
        (status = 200, description = "Product is inactive", body = ApiResponse<ProductResponse>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller is not the seller"),
        (status = 404, description = "Product not found")
    )
)]
pub async fn disable_product(
    Extension(service): Extension<DynProductCommandService>,
    Extension(user_id): Extension<i64>,
    SimpleValidatedJson(body): SimpleValidatedJson<ProductIdRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.set_active(user_id, body.id, false).await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    post,
    path = "/api/inventory/enable-product",
    tag = "Product",
    security(("bearer_auth" = [])),
    request_body = ProductIdRequest,
    responses(
        (status = 200, description = "Product is active", body = ApiResponse<ProductResponse>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller is not the seller"),
        (status = 404, description = "Product not found")
    )
)]
pub async fn enable_product(
    Extension(service): Extension<DynProductCommandService>,
    Extension(user_id): Extension<i64>,
    SimpleValidatedJson(body): SimpleValidatedJson<ProductIdRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.set_active(user_id, body.id, true).await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    get,
    path = "/api/inventory/my-products",
    tag = "Product",
    security(("bearer_auth" = [])),
    params(FindAllProducts),
    responses(
        (status = 200, description = "Caller's products, active and inactive", body = ApiResponsePagination<Vec<ProductResponse>>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller has no seller company")
    )
)]
pub async fn get_my_products(
    Extension(service): Extension<DynProductQueryService>,
    Extension(user_id): Extension<i64>,
    Query(params): Query<FindAllProducts>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.find_my_products(user_id, &params).await?;
    Ok((StatusCode::OK, Json(response)))
}

pub fn product_routes(app_state: Arc<AppState>) -> OpenApiRouter {
    let protected = OpenApiRouter::new()
        .route("/api/inventory/create-product", post(create_product))
        .route("/api/inventory/edit-product", put(update_product))
        .route("/api/inventory/disable-product", post(disable_product))
        .route("/api/inventory/enable-product", post(enable_product))
        .route("/api/inventory/my-products", get(get_my_products))
        .route_layer(middleware::from_fn(auth_middleware));

    OpenApiRouter::new()
        .route("/api/inventory/products", get(get_products))
        .route("/api/inventory/products/{product}", get(view_product))
        .route("/api/inventory/total-products", get(count_products))
        .merge(protected)
        .layer(Extension(app_state.di_container.product_query.clone()))
        .layer(Extension(app_state.di_container.product_command.clone()))
        .layer(Extension(app_state.jwt_config.clone()))
}

#[cfg(test)]
mod tests {
    use crate::{
        domain::response::{
            ApiResponse, ApiResponsePagination, Pagination, product::ProductResponse,
        },
        handler::test_support::{Services, bearer, get, json_request, send},
    };
    use rust_decimal::Decimal;
    use serde_json::json;
    use shared::errors::ServiceError;
    use std::collections::BTreeMap;

    fn sample(id: i32, is_active: bool) -> ProductResponse {
        ProductResponse {
            id,
            name: "Cocoa Beans".into(),
            slug: "cocoa-beans".into(),
            sku: None,
            description: "Fermented grade A beans".into(),
            categories: vec!["Agriculture".into()],
            is_active,
            created_at: "2026-01-05T10:00:00+00:00".into(),
            updated_at: "2026-01-05T10:00:00+00:00".into(),
            weight: None,
            cost: Decimal::new(125000, 2),
            brochure: String::new(),
            images: vec![],
            documents: vec![],
            views: 3,
            unit: Some("ton".into()),
            seller: "Accra Traders".into(),
            about_company: String::new(),
            rates: BTreeMap::from([("GHS".to_string(), 12.0)]),
        }
    }

    #[tokio::test]
    async fn search_is_public_and_paginated() {
        let mut services = Services::default();
        services
            .product_query
            .expect_find_all()
            .withf(|req| req.search == "cocoa" && req.page == 2)
            .returning(|_| {
                Ok(ApiResponsePagination::success(
                    "Products retrieved successfully",
                    vec![sample(1, true)],
                    Pagination::new(2, 10, 11),
                ))
            });

        let (status, body) = send(
            services.app(),
            get("/api/inventory/products?search=cocoa&page=2&page_size=10", None),
        )
        .await;

        assert_eq!(status, 200);
        assert_eq!(body["data"][0]["cost"], "1250.00");
        assert_eq!(body["pagination"]["total_pages"], 2);
    }

    #[tokio::test]
    async fn detail_forwards_client_ip() {
        let mut services = Services::default();
        services
            .product_query
            .expect_view_product()
            .withf(|slug, ip| slug.to_string() == "cocoa-beans" && ip.to_string() == "198.51.100.4")
            .times(1)
            .returning(|_, _| Ok(ApiResponse::success("Product retrieved", sample(1, true))));

        let req = axum::http::Request::builder()
            .uri("/api/inventory/products/cocoa-beans")
            .header("x-forwarded-for", "198.51.100.4, 10.0.0.1")
            .body(axum::body::Body::empty())
            .unwrap();
        let (status, body) = send(services.app(), req).await;

        assert_eq!(status, 200);
        assert_eq!(body["data"]["views"], 3);
    }

    #[tokio::test]
    async fn missing_product_is_404() {
        let mut services = Services::default();
        services
            .product_query
            .expect_view_product()
            .returning(|_, _| Err(ServiceError::not_found()));

        let (status, body) = send(services.app(), get("/api/inventory/products/gone", None)).await;

        assert_eq!(status, 404);
        assert_eq!(body["status"], "error");
    }

    #[tokio::test]
    async fn create_requires_token() {
        let (status, _) = send(
            Services::default().app(),
            json_request(
                "POST",
                "/api/inventory/create-product",
                None,
                json!({"name": "Cocoa", "description": "Beans"}),
            ),
        )
        .await;

        assert_eq!(status, 401);
    }

    #[tokio::test]
    async fn disable_passes_caller_and_flag() {
        let mut services = Services::default();
        services
            .product_command
            .expect_set_active()
            .withf(|user_id, id, is_active| *user_id == 42 && *id == 9 && !*is_active)
            .times(1)
            .returning(|_, id, _| Ok(ApiResponse::success("Product disabled", sample(id, false))));

        let (status, body) = send(
            services.app(),
            json_request(
                "POST",
                "/api/inventory/disable-product",
                Some(bearer(42)),
                json!({"id": 9}),
            ),
        )
        .await;

        assert_eq!(status, 200);
        assert_eq!(body["data"]["is_active"], false);
    }

    #[tokio::test]
    async fn editing_someone_elses_product_is_403() {
        let mut services = Services::default();
        services
            .product_command
            .expect_update_product()
            .returning(|_, _| Err(ServiceError::Forbidden("not your product".into())));

        let (status, _) = send(
            services.app(),
            json_request(
                "PUT",
                "/api/inventory/edit-product",
                Some(bearer(7)),
                json!({"id": 3, "name": "Renamed"}),
            ),
        )
        .await;

        assert_eq!(status, 403);
    }
}
