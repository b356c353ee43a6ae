use crate::{
    abstract_trait::category::DynCategoryService,
    domain::{
        requests::category::{CreateCategoryRequest, FindAllCategories, UpdateCategoryRequest},
        response::{ApiResponse, ApiResponsePagination, category::CategoryResponse},
    },
    middleware::{jwt::auth_middleware, validate::SimpleValidatedJson},
    state::AppState,
};
use axum::{
    Json,
    extract::{Extension, Path, Query},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use serde_json::json;
use shared::errors::HttpError;
use std::sync::Arc;
use utoipa_axum::router::OpenApiRouter;

#[utoipa::path(
    get,
    path = "/api/inventory/categories",
    tag = "Category",
    params(FindAllCategories),
    responses(
        (status = 200, description = "Categories in tree order", body = ApiResponsePagination<Vec<CategoryResponse>>),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_categories(
    Extension(service): Extension<DynCategoryService>,
    Query(params): Query<FindAllCategories>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.find_all(&params).await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    post,
    path = "/api/inventory/create-category",
    tag = "Category",
    security(("bearer_auth" = [])),
    request_body = CreateCategoryRequest,
    responses(
        (status = 201, description = "Category created", body = ApiResponse<CategoryResponse>),
        (status = 400, description = "Invalid payload or unknown parent"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn create_category(
    Extension(service): Extension<DynCategoryService>,
    SimpleValidatedJson(body): SimpleValidatedJson<CreateCategoryRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.create_category(&body).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

#[utoipa::path(
    put,
    path = "/api/inventory/edit-category",
    tag = "Category",
    security(("bearer_auth" = [])),
    request_body = UpdateCategoryRequest,
    responses(
        (status = 200, description = "Category updated", body = ApiResponse<CategoryResponse>),
        (status = 400, description = "Invalid payload or cyclic parent"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Category not found")
    )
)]
pub async fn update_category(
    Extension(service): Extension<DynCategoryService>,
    SimpleValidatedJson(body): SimpleValidatedJson<UpdateCategoryRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.update_category(&body).await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    delete,
    path = "/api/inventory/delete-category/{id}",
    tag = "Category",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Category deleted", body = serde_json::Value),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Category not found"),
        (status = 409, description = "Category still has subcategories")
    )
)]
pub async fn delete_category(
    Extension(service): Extension<DynCategoryService>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, HttpError> {
    service.delete_category(id).await?;

    Ok((
        StatusCode::OK,
        Json(json!({
            "status": "success",
            "message": "Category deleted successfully"
        })),
    ))
}

pub fn category_routes(app_state: Arc<AppState>) -> OpenApiRouter {
    let protected = OpenApiRouter::new()
        .route("/api/inventory/create-category", post(create_category))
        .route("/api/inventory/edit-category", put(update_category))
        .route("/api/inventory/delete-category/{id}", delete(delete_category))
        .route_layer(middleware::from_fn(auth_middleware));

    OpenApiRouter::new()
        .route("/api/inventory/categories", get(get_categories))
        .merge(protected)
        .layer(Extension(app_state.di_container.category.clone()))
        .layer(Extension(app_state.jwt_config.clone()))
}

#[cfg(test)]
mod tests {
    use crate::{
        domain::response::{ApiResponse, category::CategoryResponse},
        handler::test_support::{Services, bearer, json_request, send},
    };
    use serde_json::json;
    use shared::errors::{RepositoryError, ServiceError};

    fn sample() -> CategoryResponse {
        CategoryResponse {
            id: 4,
            name: "Grains".into(),
            slug: "grains".into(),
            is_active: true,
            parent: Some(1),
            description: String::new(),
            category_image: String::new(),
            path: "/1/4/".into(),
            depth: 1,
            companies: vec![],
            created_at: "2026-01-05T10:00:00+00:00".into(),
            updated_at: "2026-01-05T10:00:00+00:00".into(),
        }
    }

    #[tokio::test]
    async fn create_returns_created() {
        let mut services = Services::default();
        services
            .category
            .expect_create_category()
            .withf(|req| req.name == "Grains" && req.parent_id == Some(1))
            .returning(|_| Ok(ApiResponse::success("Category created", sample())));

        let (status, body) = send(
            services.app(),
            json_request(
                "POST",
                "/api/inventory/create-category",
                Some(bearer(1)),
                json!({"name": "Grains", "parent_id": 1}),
            ),
        )
        .await;

        assert_eq!(status, 201);
        assert_eq!(body["data"]["path"], "/1/4/");
    }

    #[tokio::test]
    async fn empty_name_is_rejected_before_the_service() {
        let (status, body) = send(
            Services::default().app(),
            json_request(
                "POST",
                "/api/inventory/create-category",
                Some(bearer(1)),
                json!({"name": ""}),
            ),
        )
        .await;

        assert_eq!(status, 400);
        assert_eq!(body["status"], "error");
        assert!(body["details"]["name"].is_array());
    }

    #[tokio::test]
    async fn deleting_a_parent_is_409() {
        let mut services = Services::default();
        services.category.expect_delete_category().returning(|_| {
            Err(ServiceError::Repo(RepositoryError::Conflict(
                "category still has subcategories".into(),
            )))
        });

        let mut req = json_request(
            "DELETE",
            "/api/inventory/delete-category/1",
            Some(bearer(1)),
            json!({}),
        );
        *req.body_mut() = axum::body::Body::empty();
        let (status, body) = send(services.app(), req).await;

        assert_eq!(status, 409);
        assert_eq!(body["message"], "category still has subcategories");
    }

    #[tokio::test]
    async fn delete_reports_success() {
        let mut services = Services::default();
        services
            .category
            .expect_delete_category()
            .withf(|id| *id == 6)
            .returning(|_| Ok(()));

        let mut req = json_request(
            "DELETE",
            "/api/inventory/delete-category/6",
            Some(bearer(1)),
            json!({}),
        );
        *req.body_mut() = axum::body::Body::empty();
        let (status, body) = send(services.app(), req).await;

        assert_eq!(status, 200);
        assert_eq!(body["status"], "success");
    }
}
