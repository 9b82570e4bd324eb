//! MedFinder API Library
//!
//! Medicine availability lookup across verified pharmacies, with pharmacy
//! inventory management, administrator verification and personal accounts.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod health;
pub mod middleware_helpers;
pub mod migrator;
pub mod models;
pub mod openapi;
pub mod repositories;
pub mod services;
pub mod tracing;

use axum::{
    extract::State,
    response::Json,
    routing::{get, post, put},
    Extension, Router,
};
use chrono::Utc;
use http::HeaderValue;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
};
use utoipa::ToSchema;

use crate::auth::{AuthRouterExt, AuthService, UserRole};

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub event_sender: events::EventSender,
    pub auth: Arc<AuthService>,
    pub services: handlers::AppServices,
}

impl AppState {
    /// Builds every service over one shared connection pool.
    pub fn build(
        db: Arc<DatabaseConnection>,
        config: config::AppConfig,
        event_sender: events::EventSender,
    ) -> Self {
        let auth = Arc::new(AuthService::new(auth::AuthConfig::from(&config)));
        let services =
            handlers::AppServices::new(db.clone(), event_sender.clone(), config.search_pharmacy_fanout);
        Self {
            db,
            config,
            event_sender,
            auth,
            services,
        }
    }
}

// Common response wrappers
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub errors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResponseMeta>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct ResponseMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub timestamp: String,
}

impl ResponseMeta {
    fn capture() -> Self {
        Self {
            request_id: crate::tracing::current_request_id().map(|rid| rid.as_str().to_string()),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            errors: None,
            meta: Some(ResponseMeta::capture()),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message),
            errors: None,
            meta: Some(ResponseMeta::capture()),
        }
    }

    pub fn validation_errors(errors: Vec<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some("Validation failed".to_string()),
            errors: Some(errors),
            meta: Some(ResponseMeta::capture()),
        }
    }
}

#[cfg(test)]
mod response_tests {
    use super::*;
    use chrono::DateTime;

    #[tokio::test]
    async fn success_response_includes_request_metadata() {
        let response =
            crate::tracing::scope_request_id(crate::tracing::RequestId::new("meta-123"), async {
                ApiResponse::success("ok")
            })
            .await;

        let meta = response.meta.expect("metadata expected");
        assert_eq!(meta.request_id.as_deref(), Some("meta-123"));
        DateTime::parse_from_rfc3339(&meta.timestamp).expect("timestamp should parse");
    }

    #[tokio::test]
    async fn error_response_includes_request_metadata() {
        let response =
            crate::tracing::scope_request_id(crate::tracing::RequestId::new("meta-err"), async {
                ApiResponse::<()>::error("oops".into())
            })
            .await;

        let meta = response.meta.expect("metadata expected");
        assert_eq!(meta.request_id.as_deref(), Some("meta-err"));
        assert!(!meta.timestamp.is_empty());
    }

    #[tokio::test]
    async fn validation_errors_response_outside_request_has_no_id() {
        let response = ApiResponse::<()>::validation_errors(vec!["q: must not be blank".into()]);

        assert!(!response.success);
        assert_eq!(response.errors.as_ref().map(Vec::len), Some(1));
        let meta = response.meta.expect("metadata expected");
        assert_eq!(meta.request_id, None);
        DateTime::parse_from_rfc3339(&meta.timestamp).expect("timestamp should parse");
    }
}

/// Standard API result type for JSON responses
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, errors::ServiceError>;

/// Versioned API: public search plus role-gated areas.
pub fn api_v1_routes() -> Router<AppState> {
    let public = Router::new()
        .route("/status", get(api_status))
        .route("/health", get(health_check))
        .route("/medicines/search", get(handlers::search::search_medicines))
        .route("/medicines/compare", get(handlers::search::compare_prices))
        .route(
            "/pharmacies/:id",
            get(handlers::pharmacies::get_public_pharmacy),
        );

    let personal = Router::new()
        .route(
            "/users/me",
            get(handlers::users::get_me).put(handlers::users::update_me),
        )
        .route(
            "/users/me/saved",
            get(handlers::users::list_saved).post(handlers::users::save_medicine),
        )
        .route(
            "/users/me/saved/:id",
            axum::routing::delete(handlers::users::remove_saved),
        )
        .with_role(UserRole::Personal);

    let pharmacy = Router::new()
        .route(
            "/pharmacy/profile",
            get(handlers::pharmacies::get_profile).put(handlers::pharmacies::update_profile),
        )
        .route("/pharmacy/dashboard", get(handlers::pharmacies::dashboard))
        .route(
            "/pharmacy/inventory",
            get(handlers::pharmacies::list_inventory).post(handlers::pharmacies::create_item),
        )
        .route(
            "/pharmacy/inventory/:id",
            put(handlers::pharmacies::update_item).delete(handlers::pharmacies::delete_item),
        )
        .with_role(UserRole::Pharmacy);

    let admin = Router::new()
        .route("/admin/pharmacies", get(handlers::admin::list_pharmacies))
        .route(
            "/admin/pharmacies/:id/verify",
            post(handlers::admin::verify_pharmacy),
        )
        .with_role(UserRole::Admin);

    public.merge(personal).merge(pharmacy).merge(admin)
}

/// CORS policy from configuration. `None` when neither explicit origins nor
/// a permissive override is configured.
pub fn cors_layer(cfg: &config::AppConfig) -> Option<CorsLayer> {
    let configured_origins: Option<Vec<HeaderValue>> = cfg
        .cors_allowed_origins
        .as_ref()
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .filter_map(|origin| HeaderValue::from_str(origin).ok())
                .collect::<Vec<_>>()
        })
        .filter(|origins| !origins.is_empty());

    if let Some(origins) = configured_origins {
        Some(
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods(Any)
                .allow_headers(Any),
        )
    } else if cfg.should_allow_permissive_cors() {
        ::tracing::info!(
            "Using permissive CORS because explicit origins were not configured ({})",
            if cfg.is_development() {
                "development environment"
            } else {
                "explicit override enabled"
            }
        );
        Some(CorsLayer::permissive())
    } else {
        None
    }
}

/// The complete HTTP application: status, `/health`, `/auth`, `/api/v1`
/// and Swagger UI, with the shared middleware stack applied.
pub fn app_router(state: AppState, cors: CorsLayer) -> Router {
    let auth = state.auth.clone();
    Router::<AppState>::new()
        .route("/", get(|| async { "medfinder-api up" }))
        .nest("/api/v1", api_v1_routes())
        .nest("/auth", handlers::auth::auth_routes())
        .nest("/health", health::health_routes())
        .merge(openapi::swagger_ui())
        // HTTP tracing layer for consistent request/response telemetry
        .layer(crate::tracing::configure_http_tracing())
        .layer(CompressionLayer::new())
        .layer(cors)
        // AuthService must be in request extensions before auth middleware runs
        .layer(Extension(auth))
        // Ensure every request carries a request id for traceability
        .layer(axum::middleware::from_fn(
            middleware_helpers::request_id_middleware,
        ))
        .with_state(state)
}

async fn api_status(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Value>>, errors::ServiceError> {
    let status_data = json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "git": option_env!("GIT_HASH").unwrap_or("unknown"),
        "service": "medfinder-api",
        "timestamp": Utc::now().to_rfc3339(),
        "environment": state.config.environment,
    });

    Ok(Json(ApiResponse::success(status_data)))
}

async fn health_check(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Value>>, errors::ServiceError> {
    let health = health::check_dependencies(&state.db).await;
    let health_data = json!({
        "status": if health.status == health::HealthStatus::Up { "healthy" } else { "unhealthy" },
        "checks": health.details,
        "timestamp": health.timestamp.to_rfc3339(),
    });

    Ok(Json(ApiResponse::success(health_data)))
}

/// Convenience re-exports for binaries and integration tests.
pub mod prelude {
    pub use crate::auth::{AuthRouterExt, AuthService, AuthUser, UserRole};
    pub use crate::config::AppConfig;
    pub use crate::errors::{ErrorResponse, ServiceError};
    pub use crate::models::{AppUser, GeoPoint, MedicineOffer, StockStatus};
    pub use crate::{ApiResponse, ApiResult, AppState};
}
