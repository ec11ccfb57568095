#![allow(dead_code)]

use axum::body::Body;
use axum::http::StatusCode;
use housing_api::app::{AppState, build_router};
use housing_api::service::{RecordService, ServiceOptions};
use housing_api::store::memory::InMemoryStore;
use housing_authz::{TokenIssuer, TokenVerifier};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

use crate::http_helpers::json_request;

pub type TestApp = axum::routing::RouterIntoService<Body, ()>;

pub const SECRET: &[u8] = b"http-test-secret";
pub const ISSUER: &str = "housing-api";
pub const PASSWORD: &str = "correct-horse-battery";

pub fn app() -> TestApp {
    app_with(ServiceOptions::default())
}

pub fn app_with(options: ServiceOptions) -> TestApp {
    let state = AppState {
        service: RecordService::new(Arc::new(InMemoryStore::new()), options),
        issuer: issuer(),
        verifier: TokenVerifier::new(SECRET, ISSUER, 0).expect("verifier"),
    };
    build_router(state).into_service()
}

pub fn issuer() -> TokenIssuer {
    TokenIssuer::new(SECRET, ISSUER, Duration::from_secs(300)).expect("issuer")
}

pub async fn read_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}

/// Registers an account anonymously and returns its id.
pub async fn register(app: &TestApp, username: &str, role: &str) -> i64 {
    let request = json_request(
        "POST",
        "/api/users",
        serde_json::json!({
            "username": username,
            "email": format!("{username}@example.com"),
            "role": role,
            "password": PASSWORD
        }),
    );
    let response = app.clone().oneshot(request).await.expect("register");
    assert_eq!(response.status(), StatusCode::CREATED, "register {username}");
    read_json(response).await["id"].as_i64().expect("user id")
}

pub async fn login(app: &TestApp, username: &str) -> String {
    let request = json_request(
        "POST",
        "/api/auth/token",
        serde_json::json!({ "username": username, "password": PASSWORD }),
    );
    let response = app.clone().oneshot(request).await.expect("login");
    assert_eq!(response.status(), StatusCode::OK, "login {username}");
    read_json(response).await["access_token"]
        .as_str()
        .expect("token")
        .to_string()
}

/// Registers and logs in, returning the user id and a bearer token.
pub async fn signup(app: &TestApp, username: &str, role: &str) -> (i64, String) {
    let id = register(app, username, role).await;
    let token = login(app, username).await;
    (id, token)
}
