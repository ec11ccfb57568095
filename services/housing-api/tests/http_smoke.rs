mod common;

use axum::http::StatusCode;
use common::{PASSWORD, app, login, read_json, register, signup};
use http_helpers::{anonymous_request, authed_json_request, authed_request, json_request};
use tower::ServiceExt;

#[tokio::test]
async fn health_reports_memory_backend() {
    let app = app();
    let response = app
        .clone()
        .oneshot(anonymous_request("GET", "/api/health"))
        .await
        .expect("health");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json(response).await;
    assert_eq!(payload["status"], "ok");
    assert_eq!(payload["storage"], "memory");
    assert_eq!(payload["durable"], false);
}

#[tokio::test]
async fn openapi_document_is_served() {
    let app = app();
    let response = app
        .clone()
        .oneshot(anonymous_request("GET", "/api/openapi.json"))
        .await
        .expect("openapi");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json(response).await;
    assert!(payload["paths"]["/api/forum-posts/{id}"].is_object());
}

#[tokio::test]
async fn register_login_and_me() {
    let app = app();
    let id = register(&app, "alice", "tenant").await;
    let token = login(&app, "alice").await;

    let response = app
        .clone()
        .oneshot(authed_request("GET", "/api/auth/me", &token))
        .await
        .expect("me");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json(response).await;
    assert_eq!(payload["id"], id);
    assert_eq!(payload["username"], "alice");
    assert_eq!(payload["role"], "tenant");
    assert!(payload.get("password").is_none());
    assert!(payload.get("password_hash").is_none());
}

#[tokio::test]
async fn token_response_carries_user_and_expiry() {
    let app = app();
    register(&app, "bob", "landlord").await;
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/token",
            serde_json::json!({ "username": "bob", "password": PASSWORD }),
        ))
        .await
        .expect("login");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json(response).await;
    assert_eq!(payload["token_type"], "Bearer");
    assert_eq!(payload["expires_in"], 300);
    assert_eq!(payload["user"]["username"], "bob");
}

#[tokio::test]
async fn wrong_password_and_unknown_user_look_the_same() {
    let app = app();
    register(&app, "carol", "tenant").await;

    let wrong = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/token",
            serde_json::json!({ "username": "carol", "password": "nope" }),
        ))
        .await
        .expect("wrong password");
    let unknown = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/token",
            serde_json::json!({ "username": "nobody", "password": "nope" }),
        ))
        .await
        .expect("unknown user");
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(read_json(wrong).await, read_json(unknown).await);
}

#[tokio::test]
async fn me_requires_a_token() {
    let app = app();
    let response = app
        .clone()
        .oneshot(anonymous_request("GET", "/api/auth/me"))
        .await
        .expect("me");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(read_json(response).await["code"], "unauthorized");
}

#[tokio::test]
async fn invalid_token_is_rejected_even_on_registration() {
    let app = app();
    let response = app
        .clone()
        .oneshot(authed_json_request(
            "POST",
            "/api/users",
            "not-a-token",
            serde_json::json!({
                "username": "mallory",
                "email": "mallory@example.com",
                "role": "tenant",
                "password": PASSWORD
            }),
        ))
        .await
        .expect("register");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn token_for_deleted_user_stops_working() {
    let app = app();
    let (_, admin) = signup(&app, "root", "administrator").await;
    let (dave, dave_token) = signup(&app, "dave", "tenant").await;

    let response = app
        .clone()
        .oneshot(authed_request("DELETE", &format!("/api/users/{dave}"), &admin))
        .await
        .expect("delete");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .clone()
        .oneshot(authed_request("GET", "/api/forum-posts", &dave_token))
        .await
        .expect("list");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn role_changes_apply_to_existing_tokens() {
    let app = app();
    let (_, admin) = signup(&app, "root", "administrator").await;
    let (erin, erin_token) = signup(&app, "erin", "tenant").await;

    let create = serde_json::json!({
        "address": "1 Main St",
        "city": "Halifax",
        "province": "NS",
        "rental_price": "900.00"
    });
    let response = app
        .clone()
        .oneshot(authed_json_request("POST", "/api/properties", &erin_token, create.clone()))
        .await
        .expect("tenant create");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .clone()
        .oneshot(authed_json_request(
            "PATCH",
            &format!("/api/users/{erin}"),
            &admin,
            serde_json::json!({ "role": "landlord" }),
        ))
        .await
        .expect("promote");
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(authed_json_request("POST", "/api/properties", &erin_token, create))
        .await
        .expect("landlord create");
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn malformed_json_is_a_validation_error() {
    let app = app();
    let (_, token) = signup(&app, "frank", "landlord").await;
    let request = axum::http::Request::builder()
        .method("POST")
        .uri("/api/properties")
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {token}"))
        .body(axum::body::Body::from("{\"address\": "))
        .expect("request");
    let response = app.clone().oneshot(request).await.expect("create");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(read_json(response).await["code"], "validation_error");
}

#[tokio::test]
async fn unknown_choice_value_is_a_validation_error() {
    let app = app();
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/users",
            serde_json::json!({
                "username": "grace",
                "email": "grace@example.com",
                "role": "superuser",
                "password": PASSWORD
            }),
        ))
        .await
        .expect("register");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(read_json(response).await["code"], "validation_error");
}

#[tokio::test]
async fn malformed_body_from_anonymous_caller_is_unauthorized() {
    let app = app();
    let request = axum::http::Request::builder()
        .method("POST")
        .uri("/api/properties")
        .header("content-type", "application/json")
        .body(axum::body::Body::from("not json"))
        .expect("request");
    let response = app.clone().oneshot(request).await.expect("create");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn non_numeric_id_is_not_found() {
    let app = app();
    let (_, token) = signup(&app, "heidi", "tenant").await;
    let response = app
        .clone()
        .oneshot(authed_request("GET", "/api/properties/abc", &token))
        .await
        .expect("get");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(read_json(response).await["code"], "not_found");
}

#[tokio::test]
async fn duplicate_username_is_a_validation_error() {
    let app = app();
    register(&app, "ivan", "tenant").await;
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/users",
            serde_json::json!({
                "username": "ivan",
                "email": "ivan2@example.com",
                "role": "tenant",
                "password": PASSWORD
            }),
        ))
        .await
        .expect("register");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
