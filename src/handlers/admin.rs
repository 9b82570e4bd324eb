use axum::extract::State;
use axum::Json;
use tracing::info;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::entities::pharmacy;
use crate::handlers::extract::{ApiJson, ApiPath, ApiQuery};
use crate::services::pharmacies::{PharmacyStatusQuery, VerifyPharmacyRequest};
use crate::{ApiResponse, ApiResult, AppState};

#[utoipa::path(
    get,
    path = "/api/v1/admin/pharmacies",
    params(PharmacyStatusQuery),
    responses(
        (status = 200, description = "Pharmacies in the requested status (pending by default)", body = [pharmacy::Model]),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "admin"
)]
pub async fn list_pharmacies(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<PharmacyStatusQuery>,
) -> ApiResult<Vec<pharmacy::Model>> {
    let status = query.status.unwrap_or_default();
    let pharmacies = state.services.pharmacies.pharmacies_by_status(status).await?;
    Ok(Json(ApiResponse::success(pharmacies)))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/pharmacies/{id}/verify",
    params(("id" = Uuid, Path, description = "Pharmacy ID")),
    request_body = VerifyPharmacyRequest,
    responses(
        (status = 200, description = "Verification recorded", body = pharmacy::Model),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Pharmacy already has a different final status", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "admin"
)]
pub async fn verify_pharmacy(
    State(state): State<AppState>,
    admin: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<VerifyPharmacyRequest>,
) -> ApiResult<pharmacy::Model> {
    info!(admin_id = %admin.user_id, pharmacy_id = %id, decision = ?payload.status, "verification requested");
    let profile = state
        .services
        .pharmacies
        .verify_pharmacy(id, payload.status)
        .await?;
    Ok(Json(ApiResponse::success(profile)))
}
