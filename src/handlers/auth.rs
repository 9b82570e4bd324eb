//! Sign-up, sign-in and session endpoints mounted under `/auth`.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;
use utoipa::ToSchema;

use crate::auth::{user, AccessToken, AuthRouterExt, AuthUser};
use crate::errors::ServiceError;
use crate::handlers::extract::ApiJson;
use crate::models::AppUser;
use crate::services::accounts::{LoginRequest, RegisterPersonalRequest, RegisterPharmacyRequest};
use crate::{ApiResponse, ApiResult, AppState};

/// A freshly issued token together with the resolved user.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthSession {
    #[serde(flatten)]
    pub token: AccessToken,
    pub user: AppUser,
}

fn issue_session(
    state: &AppState,
    account: &user::Model,
    user: AppUser,
) -> Result<AuthSession, ServiceError> {
    let token = state.auth.generate_token(account)?;
    Ok(AuthSession { token, user })
}

pub fn auth_routes() -> Router<AppState> {
    let public = Router::new()
        .route("/register/personal", post(register_personal))
        .route("/register/pharmacy", post(register_pharmacy))
        .route("/login", post(login));

    let session = Router::new()
        .route("/logout", post(logout))
        .route("/me", get(me))
        .with_auth();

    public.merge(session)
}

#[utoipa::path(
    post,
    path = "/auth/register/personal",
    request_body = RegisterPersonalRequest,
    responses(
        (status = 201, description = "Personal account created", body = AuthSession),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 409, description = "Email already registered", body = crate::errors::ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn register_personal(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RegisterPersonalRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AuthSession>>), ServiceError> {
    let (account, user) = state.services.accounts.register_personal(payload).await?;
    let session = issue_session(&state, &account, user)?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(session))))
}

#[utoipa::path(
    post,
    path = "/auth/register/pharmacy",
    request_body = RegisterPharmacyRequest,
    responses(
        (status = 201, description = "Pharmacy account created, pending verification", body = AuthSession),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 409, description = "Email already registered", body = crate::errors::ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn register_pharmacy(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RegisterPharmacyRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AuthSession>>), ServiceError> {
    let (account, user) = state.services.accounts.register_pharmacy(payload).await?;
    let session = issue_session(&state, &account, user)?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(session))))
}

#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = AuthSession),
        (status = 401, description = "Invalid email or password", body = crate::errors::ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> ApiResult<AuthSession> {
    let accounts = &state.services.accounts;
    let account = accounts.authenticate(&payload).await?;
    let user = accounts.resolve(account.clone()).await?;
    info!(user_id = %user.id(), email = %user.email(), role = %account.role, "signed in");
    let session = issue_session(&state, &account, user)?;
    Ok(Json(ApiResponse::success(session)))
}

#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 200, description = "Token revoked"),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "auth"
)]
pub async fn logout(State(state): State<AppState>, user: AuthUser) -> ApiResult<Value> {
    state.auth.revoke(&user.token_id, user.expires_at).await;
    info!(user_id = %user.user_id, "signed out");
    Ok(Json(ApiResponse::success(
        json!({ "message": "Successfully logged out" }),
    )))
}

#[utoipa::path(
    get,
    path = "/auth/me",
    responses(
        (status = 200, description = "Current user", body = AppUser),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "auth"
)]
pub async fn me(State(state): State<AppState>, user: AuthUser) -> ApiResult<AppUser> {
    let current = state.services.accounts.current_user(user.user_id).await?;
    Ok(Json(ApiResponse::success(current)))
}
