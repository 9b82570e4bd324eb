#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use medfinder_api::{
    config::{AppConfig, DEV_DEFAULT_JWT_SECRET},
    db, events, AppState,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

pub const PASSWORD: &str = "correct-horse-battery";
pub const ADMIN_EMAIL: &str = "admin@medfinder.test";

/// Helper harness running the real router over an in-memory SQLite database.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        let mut cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            DEV_DEFAULT_JWT_SECRET.to_string(),
            3600,
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        // One connection so every query sees the same in-memory database.
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let (event_sender, event_rx) = events::channel(256);
        let event_task = tokio::spawn(events::process_events(event_rx));

        let state = AppState::build(Arc::new(pool), cfg, event_sender);
        let router = medfinder_api::app_router(state.clone(), CorsLayer::permissive());

        Self {
            router,
            state,
            _event_task: event_task,
        }
    }

    /// Send a request against the router with an optional bearer token.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(tok) = token {
            builder = builder.header("authorization", format!("Bearer {}", tok));
        }

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Sends a request and returns the status with the decoded JSON body.
    pub async fn call(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> (StatusCode, Value) {
        let response = self.request(method, uri, body, token).await;
        let status = response.status();
        (status, json_body(response).await)
    }

    /// Registers a pharmacy and returns its id and access token.
    pub async fn register_pharmacy(
        &self,
        email: &str,
        name: &str,
        location: Option<(f64, f64)>,
    ) -> (Uuid, String) {
        let location = location.map(|(lat, lng)| json!({ "lat": lat, "lng": lng }));
        let (status, body) = self
            .call(
                Method::POST,
                "/auth/register/pharmacy",
                Some(json!({
                    "email": email,
                    "password": PASSWORD,
                    "pharmacy_name": name,
                    "license_id": format!("LIC-{}", name.len()),
                    "owner_name": "Test Owner",
                    "phone": "+94 11 234 5678",
                    "address": "1 Test Road",
                    "city": "Colombo",
                    "district": "Colombo 03",
                    "location": location,
                    "opening_hours": "Open 24 hours",
                })),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "pharmacy registration: {body}");
        session_of(&body)
    }

    /// Registers a personal account and returns its id and access token.
    pub async fn register_personal(&self, email: &str) -> (Uuid, String) {
        let (status, body) = self
            .call(
                Method::POST,
                "/auth/register/personal",
                Some(json!({
                    "email": email,
                    "password": PASSWORD,
                    "full_name": "Test Patient",
                })),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "personal registration: {body}");
        session_of(&body)
    }

    /// Provisions the administrator account and signs in as it.
    pub async fn admin_token(&self) -> String {
        self.state
            .services
            .accounts
            .ensure_admin(ADMIN_EMAIL, PASSWORD)
            .await
            .expect("provision admin");
        self.login(ADMIN_EMAIL, PASSWORD).await
    }

    pub async fn login(&self, email: &str, password: &str) -> String {
        let (status, body) = self
            .call(
                Method::POST,
                "/auth/login",
                Some(json!({ "email": email, "password": password })),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login: {body}");
        body["data"]["access_token"]
            .as_str()
            .expect("access token")
            .to_string()
    }

    /// Moves a pharmacy out of `pending` through the admin endpoint.
    pub async fn set_verification(
        &self,
        admin_token: &str,
        pharmacy_id: Uuid,
        status: &str,
    ) -> (StatusCode, Value) {
        self.call(
            Method::POST,
            &format!("/api/v1/admin/pharmacies/{pharmacy_id}/verify"),
            Some(json!({ "status": status })),
            Some(admin_token),
        )
        .await
    }

    /// Adds a stock line as the given pharmacy and returns the created row.
    pub async fn add_item(&self, token: &str, name: &str, price: &str, stock: i32) -> Value {
        let (status, body) = self
            .call(
                Method::POST,
                "/api/v1/pharmacy/inventory",
                Some(json!({
                    "medicine_name": name,
                    "price": price,
                    "stock": stock,
                })),
                Some(token),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "add item: {body}");
        body["data"].clone()
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self._event_task.abort();
    }
}

pub async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read response body");
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&bytes).expect("response body is JSON")
}

fn session_of(body: &Value) -> (Uuid, String) {
    let data = &body["data"];
    let id = data["user"]["profile"]["id"]
        .as_str()
        .and_then(|s| Uuid::parse_str(s).ok())
        .expect("profile id");
    let token = data["access_token"]
        .as_str()
        .expect("access token")
        .to_string();
    (id, token)
}
