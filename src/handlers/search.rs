use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::errors::ServiceError;
use crate::handlers::extract::ApiQuery;
use crate::models::{GeoPoint, MedicineOffer};
use crate::services::ranking::{CompareSort, OfferFilter, PriceComparison, SortBy};
use crate::{ApiResponse, ApiResult, AppState};

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct SearchQuery {
    /// Medicine name prefix (case-sensitive)
    #[serde(default)]
    pub q: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    #[serde(default)]
    pub sort: SortBy,
    #[serde(default)]
    pub in_stock_only: bool,
    #[serde(default)]
    pub open_now: bool,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct CompareQuery {
    #[serde(default)]
    pub q: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    #[serde(default)]
    pub sort: CompareSort,
}

/// Caller position from the query string. Both halves or neither.
fn caller_location(lat: Option<f64>, lng: Option<f64>) -> Result<Option<GeoPoint>, ServiceError> {
    match (lat, lng) {
        (Some(lat), Some(lng)) => Ok(Some(GeoPoint::new(lat, lng))),
        (None, None) => Ok(None),
        _ => Err(ServiceError::ValidationError(
            "lat and lng must be supplied together".into(),
        )),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/medicines/search",
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching offers at verified pharmacies", body = [MedicineOffer],
            headers(("X-Request-Id" = String, description = "Unique request id"))
        ),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "search"
)]
pub async fn search_medicines(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<SearchQuery>,
) -> ApiResult<Vec<MedicineOffer>> {
    let location = caller_location(query.lat, query.lng)?;
    let filter = OfferFilter {
        in_stock_only: query.in_stock_only,
        open_now: query.open_now,
    };
    let offers = state
        .services
        .search
        .search_ranked(&query.q, location, &filter, query.sort)
        .await?;
    Ok(Json(ApiResponse::success(offers)))
}

#[utoipa::path(
    get,
    path = "/api/v1/medicines/compare",
    params(CompareQuery),
    responses(
        (status = 200, description = "Price comparison across pharmacies", body = PriceComparison,
            headers(("X-Request-Id" = String, description = "Unique request id"))
        ),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "search"
)]
pub async fn compare_prices(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<CompareQuery>,
) -> ApiResult<PriceComparison> {
    let location = caller_location(query.lat, query.lng)?;
    let comparison = state
        .services
        .search
        .compare_prices(&query.q, location, query.sort)
        .await?;
    Ok(Json(ApiResponse::success(comparison)))
}
