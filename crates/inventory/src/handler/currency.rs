use crate::{
    abstract_trait::currency::DynCurrencyService,
    domain::response::{ApiResponse, currency::CurrencyRatesResponse},
    state::AppState,
};
use axum::{
    Json,
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use shared::errors::HttpError;
use std::sync::Arc;
use utoipa_axum::router::OpenApiRouter;

#[utoipa::path(
    get,
    path = "/api/inventory/currency-rates",
    tag = "Currency",
    responses(
        (status = 200, description = "Tracked exchange rates, refreshed when older than an hour", body = ApiResponse<CurrencyRatesResponse>),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_currency_rates(
    Extension(service): Extension<DynCurrencyService>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.current_rates().await?;
    Ok((StatusCode::OK, Json(response)))
}

pub fn currency_routes(app_state: Arc<AppState>) -> OpenApiRouter {
    OpenApiRouter::new()
        .route("/api/inventory/currency-rates", get(get_currency_rates))
        .layer(Extension(app_state.di_container.currency.clone()))
}

#[cfg(test)]
mod tests {
    use crate::{
        domain::response::{ApiResponse, currency::CurrencyRatesResponse},
        handler::test_support::{Services, get, send},
    };
    use shared::errors::ServiceError;
    use std::collections::BTreeMap;

    #[tokio::test]
    async fn returns_rates_without_auth() {
        let mut services = Services::default();
        services.currency.expect_current_rates().times(1).returning(|| {
            Ok(ApiResponse::success(
                "Currency rates retrieved successfully",
                CurrencyRatesResponse {
                    rates: BTreeMap::from([("GHS".to_string(), 12.5), ("NGN".to_string(), 1650.0)]),
                    currency_rate_timestamp: "2026-10-18T09:00:00+00:00".into(),
                },
            ))
        });

        let (status, body) = send(services.app(), get("/api/inventory/currency-rates", None)).await;

        assert_eq!(status, 200);
        assert_eq!(body["data"]["rates"]["GHS"], 12.5);
    }

    #[tokio::test]
    async fn storage_failure_is_500() {
        let mut services = Services::default();
        services
            .currency
            .expect_current_rates()
            .returning(|| Err(ServiceError::Internal("Failed to load currency rates".into())));

        let (status, _) = send(services.app(), get("/api/inventory/currency-rates", None)).await;

        assert_eq!(status, 500);
    }
}
