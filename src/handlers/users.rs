//! Personal-user endpoints: own profile and saved medicines.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::entities::{patient, saved_medicine};
use crate::errors::ServiceError;
use crate::handlers::extract::{ApiJson, ApiPath};
use crate::services::patients::{PatientProfileUpdate, SaveMedicineRequest};
use crate::{ApiResponse, ApiResult, AppState};

#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    responses(
        (status = 200, description = "Own profile", body = patient::Model),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn get_me(State(state): State<AppState>, user: AuthUser) -> ApiResult<patient::Model> {
    let profile = state.services.patients.get_profile(user.user_id).await?;
    Ok(Json(ApiResponse::success(profile)))
}

#[utoipa::path(
    put,
    path = "/api/v1/users/me",
    request_body = PatientProfileUpdate,
    responses(
        (status = 200, description = "Profile updated", body = patient::Model),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn update_me(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(payload): ApiJson<PatientProfileUpdate>,
) -> ApiResult<patient::Model> {
    let profile = state
        .services
        .patients
        .update_profile(user.user_id, payload)
        .await?;
    Ok(Json(ApiResponse::success(profile)))
}

#[utoipa::path(
    get,
    path = "/api/v1/users/me/saved",
    responses(
        (status = 200, description = "Saved medicines, newest first", body = [saved_medicine::Model])
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn list_saved(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Vec<saved_medicine::Model>> {
    let saved = state.services.patients.list_saved(user.user_id).await?;
    Ok(Json(ApiResponse::success(saved)))
}

#[utoipa::path(
    post,
    path = "/api/v1/users/me/saved",
    request_body = SaveMedicineRequest,
    responses(
        (status = 201, description = "Medicine saved", body = saved_medicine::Model),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn save_medicine(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(payload): ApiJson<SaveMedicineRequest>,
) -> Result<(StatusCode, Json<ApiResponse<saved_medicine::Model>>), ServiceError> {
    let saved = state.services.patients.save(user.user_id, payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(saved))))
}

#[utoipa::path(
    delete,
    path = "/api/v1/users/me/saved/{id}",
    params(("id" = Uuid, Path, description = "Saved medicine ID")),
    responses(
        (status = 204, description = "Removed"),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn remove_saved(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, ServiceError> {
    state.services.patients.remove_saved(user.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
