//! Public pharmacy pages and the signed-in pharmacy's own profile and stock.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::entities::pharmacy;
use crate::errors::ServiceError;
use crate::handlers::extract::{ApiJson, ApiPath, ApiQuery};
use crate::services::inventory::{InventoryItemInput, PharmacyDashboard, StockListQuery, StockRow};
use crate::services::pharmacies::PharmacyProfileUpdate;
use crate::{ApiResponse, ApiResult, AppState};

#[utoipa::path(
    get,
    path = "/api/v1/pharmacies/{id}",
    params(("id" = Uuid, Path, description = "Pharmacy ID")),
    responses(
        (status = 200, description = "Verified pharmacy returned", body = pharmacy::Model),
        (status = 404, description = "Not found or not verified", body = crate::errors::ErrorResponse)
    ),
    tag = "pharmacies"
)]
pub async fn get_public_pharmacy(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<pharmacy::Model> {
    let profile = state.services.pharmacies.public_profile(id).await?;
    Ok(Json(ApiResponse::success(profile)))
}

#[utoipa::path(
    get,
    path = "/api/v1/pharmacy/profile",
    responses(
        (status = 200, description = "Own pharmacy profile", body = pharmacy::Model),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "pharmacy"
)]
pub async fn get_profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<pharmacy::Model> {
    let profile = state.services.pharmacies.get_profile(user.user_id).await?;
    Ok(Json(ApiResponse::success(profile)))
}

#[utoipa::path(
    put,
    path = "/api/v1/pharmacy/profile",
    request_body = PharmacyProfileUpdate,
    responses(
        (status = 200, description = "Profile updated", body = pharmacy::Model),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "pharmacy"
)]
pub async fn update_profile(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(payload): ApiJson<PharmacyProfileUpdate>,
) -> ApiResult<pharmacy::Model> {
    let profile = state
        .services
        .pharmacies
        .update_profile(user.user_id, payload)
        .await?;
    Ok(Json(ApiResponse::success(profile)))
}

#[utoipa::path(
    get,
    path = "/api/v1/pharmacy/dashboard",
    responses(
        (status = 200, description = "Stock counts and verification status", body = PharmacyDashboard),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "pharmacy"
)]
pub async fn dashboard(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<PharmacyDashboard> {
    let dashboard = state.services.inventory.dashboard(user.user_id).await?;
    Ok(Json(ApiResponse::success(dashboard)))
}

#[utoipa::path(
    get,
    path = "/api/v1/pharmacy/inventory",
    params(StockListQuery),
    responses(
        (status = 200, description = "Own stock lines", body = [StockRow]),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "pharmacy"
)]
pub async fn list_inventory(
    State(state): State<AppState>,
    user: AuthUser,
    ApiQuery(query): ApiQuery<StockListQuery>,
) -> ApiResult<Vec<StockRow>> {
    let rows = state
        .services
        .inventory
        .list_inventory(user.user_id, query.filter)
        .await?;
    Ok(Json(ApiResponse::success(rows)))
}

#[utoipa::path(
    post,
    path = "/api/v1/pharmacy/inventory",
    request_body = InventoryItemInput,
    responses(
        (status = 201, description = "Stock line created", body = StockRow),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "pharmacy"
)]
pub async fn create_item(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(payload): ApiJson<InventoryItemInput>,
) -> Result<(StatusCode, Json<ApiResponse<StockRow>>), ServiceError> {
    let row = state
        .services
        .inventory
        .add_item(user.user_id, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(row))))
}

#[utoipa::path(
    put,
    path = "/api/v1/pharmacy/inventory/{id}",
    params(("id" = Uuid, Path, description = "Inventory item ID")),
    request_body = InventoryItemInput,
    responses(
        (status = 200, description = "Stock line updated", body = StockRow),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "pharmacy"
)]
pub async fn update_item(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<InventoryItemInput>,
) -> ApiResult<StockRow> {
    let row = state
        .services
        .inventory
        .update_item(user.user_id, id, payload)
        .await?;
    Ok(Json(ApiResponse::success(row)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/pharmacy/inventory/{id}",
    params(("id" = Uuid, Path, description = "Inventory item ID")),
    responses(
        (status = 204, description = "Stock line deleted"),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "pharmacy"
)]
pub async fn delete_item(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, ServiceError> {
    state
        .services
        .inventory
        .delete_item(user.user_id, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
