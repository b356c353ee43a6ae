use crate::{
    abstract_trait::listing::DynListingService,
    domain::{
        requests::listing::UpsertListingRequest,
        response::{ApiResponse, listing::ListingResponse},
    },
    middleware::{jwt::auth_middleware, validate::SimpleValidatedJson},
    state::AppState,
};
use axum::{
    Json,
    extract::{Extension, Path},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, put},
};
use shared::errors::HttpError;
use std::sync::Arc;
use utoipa_axum::router::OpenApiRouter;

#[utoipa::path(
    get,
    path = "/api/inventory/products/{product}/listing",
    tag = "Listing",
    params(("product" = i32, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Listing metadata", body = ApiResponse<ListingResponse>),
        (status = 404, description = "Product not found")
    )
)]
pub async fn get_listing(
    Extension(service): Extension<DynListingService>,
    Path(product_id): Path<i32>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.find_listing(product_id).await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    put,
    path = "/api/inventory/products/{product}/listing",
    tag = "Listing",
    security(("bearer_auth" = [])),
    params(("product" = i32, Path, description = "Product ID")),
    request_body = UpsertListingRequest,
    responses(
        (status = 200, description = "Listing metadata saved", body = ApiResponse<ListingResponse>),
        (status = 400, description = "Invalid payload"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller is not the seller"),
        (status = 404, description = "Product not found")
    )
)]
pub async fn upsert_listing(
    Extension(service): Extension<DynListingService>,
    Extension(user_id): Extension<i64>,
    Path(product_id): Path<i32>,
    SimpleValidatedJson(body): SimpleValidatedJson<UpsertListingRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.upsert_listing(user_id, product_id, &body).await?;
    Ok((StatusCode::OK, Json(response)))
}

pub fn listing_routes(app_state: Arc<AppState>) -> OpenApiRouter {
    // Reads are public; only the PUT goes through the token check.
    OpenApiRouter::new()
        .route(
            "/api/inventory/products/{product}/listing",
            get(get_listing).merge(
                put(upsert_listing).route_layer(middleware::from_fn(auth_middleware)),
            ),
        )
        .layer(Extension(app_state.di_container.listing.clone()))
        .layer(Extension(app_state.jwt_config.clone()))
}

#[cfg(test)]
mod tests {
    use crate::{
        domain::response::{ApiResponse, listing::ListingResponse},
        handler::test_support::{Services, bearer, get, json_request, send},
        model::TradingAreas,
    };
    use serde_json::json;

    #[tokio::test]
    async fn reading_a_listing_is_public() {
        let mut services = Services::default();
        services
            .listing
            .expect_find_listing()
            .withf(|id| *id == 12)
            .returning(|id| {
                Ok(ApiResponse::success(
                    "Listing retrieved",
                    ListingResponse {
                        product_id: id,
                        ..Default::default()
                    },
                ))
            });

        let (status, body) = send(services.app(), get("/api/inventory/products/12/listing", None)).await;

        assert_eq!(status, 200);
        assert_eq!(body["data"]["product_id"], 12);
        assert!(body["data"]["certification"].is_null());
    }

    #[tokio::test]
    async fn writing_a_listing_needs_a_token() {
        let (status, _) = send(
            Services::default().app(),
            json_request(
                "PUT",
                "/api/inventory/products/12/listing",
                None,
                json!({"trading_areas": {"domestic": true, "international": false}}),
            ),
        )
        .await;

        assert_eq!(status, 401);
    }

    #[tokio::test]
    async fn upsert_forwards_sections() {
        let mut services = Services::default();
        services
            .listing
            .expect_upsert_listing()
            .withf(|user_id, product_id, req| {
                *user_id == 5
                    && *product_id == 12
                    && req.trading_areas
                        == Some(TradingAreas {
                            domestic: true,
                            international: false,
                        })
            })
            .returning(|_, product_id, req| {
                Ok(ApiResponse::success(
                    "Listing saved",
                    ListingResponse {
                        product_id,
                        trading_areas: req.trading_areas.clone(),
                        ..Default::default()
                    },
                ))
            });

        let (status, body) = send(
            services.app(),
            json_request(
                "PUT",
                "/api/inventory/products/12/listing",
                Some(bearer(5)),
                json!({"trading_areas": {"domestic": true, "international": false}}),
            ),
        )
        .await;

        assert_eq!(status, 200);
        assert_eq!(body["data"]["trading_areas"]["domestic"], true);
    }
}
