mod common;

use axum::http::StatusCode;
use common::{TestApp, app, app_with, read_json, register, signup};
use housing_api::service::ServiceOptions;
use http_helpers::{anonymous_request, authed_json_request, authed_request};
use tower::ServiceExt;

async fn create(app: &TestApp, token: &str, uri: &str, body: serde_json::Value) -> serde_json::Value {
    let response = app
        .clone()
        .oneshot(authed_json_request("POST", uri, token, body))
        .await
        .expect("create");
    assert_eq!(response.status(), StatusCode::CREATED, "create {uri}");
    read_json(response).await
}

async fn status_of(app: &TestApp, method: &str, uri: &str, token: &str) -> StatusCode {
    app.clone()
        .oneshot(authed_request(method, uri, token))
        .await
        .expect("request")
        .status()
}

async fn list_ids(app: &TestApp, uri: &str, token: &str) -> Vec<i64> {
    let response = app
        .clone()
        .oneshot(authed_request("GET", uri, token))
        .await
        .expect("list");
    assert_eq!(response.status(), StatusCode::OK, "list {uri}");
    read_json(response).await["items"]
        .as_array()
        .expect("items")
        .iter()
        .map(|item| item["id"].as_i64().expect("id"))
        .collect()
}

fn property(address: &str) -> serde_json::Value {
    serde_json::json!({
        "address": address,
        "city": "Toronto",
        "province": "ON",
        "description": "Two bedroom",
        "rental_price": "1250.00"
    })
}

fn agreement(property: i64, tenant: i64) -> serde_json::Value {
    serde_json::json!({
        "property": property,
        "tenant": tenant,
        "start_date": "2025-01-01",
        "end_date": "2025-12-31",
        "terms_and_conditions": "Standard lease"
    })
}

#[tokio::test]
async fn anonymous_can_register_but_not_list_users() {
    let app = app();
    register(&app, "newcomer", "tenant").await;
    let response = app
        .clone()
        .oneshot(anonymous_request("GET", "/api/users"))
        .await
        .expect("list");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let (_, tenant) = signup(&app, "tenant1", "tenant").await;
    assert_eq!(status_of(&app, "GET", "/api/users", &tenant).await, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn property_landlord_is_always_the_caller() {
    let app = app();
    let (landlord, token) = signup(&app, "lana", "landlord").await;
    let (other, _) = signup(&app, "otto", "landlord").await;

    let mut body = property("10 King St");
    body["landlord"] = serde_json::json!(other);
    let created = create(&app, &token, "/api/properties", body).await;
    assert_eq!(created["landlord"], landlord);
    assert_eq!(created["rental_price"], "1250.00");

    let response = app
        .clone()
        .oneshot(authed_json_request(
            "PATCH",
            &format!("/api/properties/{}", created["id"]),
            &token,
            serde_json::json!({ "landlord": other, "city": "Ottawa" }),
        ))
        .await
        .expect("patch");
    assert_eq!(response.status(), StatusCode::OK);
    let patched = read_json(response).await;
    assert_eq!(patched["landlord"], landlord);
    assert_eq!(patched["city"], "Ottawa");
}

#[tokio::test]
async fn tenants_cannot_write_properties_but_can_read_them() {
    let app = app();
    let (_, landlord) = signup(&app, "lana", "landlord").await;
    let (_, tenant) = signup(&app, "tina", "tenant").await;
    let created = create(&app, &landlord, "/api/properties", property("5 Elm St")).await;
    let uri = format!("/api/properties/{}", created["id"]);

    assert_eq!(status_of(&app, "GET", &uri, &tenant).await, StatusCode::OK);
    assert_eq!(status_of(&app, "DELETE", &uri, &tenant).await, StatusCode::FORBIDDEN);
    assert_eq!(status_of(&app, "GET", &uri, &landlord).await, StatusCode::OK);
}

#[tokio::test]
async fn tenant_sees_only_own_agreements() {
    let app = app();
    let (_, landlord) = signup(&app, "lana", "landlord").await;
    let (t1, t1_token) = signup(&app, "tenant1", "tenant").await;
    let (t2, t2_token) = signup(&app, "tenant2", "tenant").await;
    let house = create(&app, &landlord, "/api/properties", property("1 Oak St")).await;
    let house = house["id"].as_i64().expect("id");

    let first = create(&app, &landlord, "/api/rental-agreements", agreement(house, t1)).await;
    let second = create(&app, &landlord, "/api/rental-agreements", agreement(house, t2)).await;
    let first = first["id"].as_i64().expect("id");
    let second = second["id"].as_i64().expect("id");

    assert_eq!(list_ids(&app, "/api/rental-agreements", &t1_token).await, vec![first]);
    assert_eq!(list_ids(&app, "/api/rental-agreements", &t2_token).await, vec![second]);
    assert_eq!(
        list_ids(&app, "/api/rental-agreements", &landlord).await,
        vec![second, first]
    );
    assert_eq!(
        status_of(&app, "GET", &format!("/api/rental-agreements/{second}"), &t1_token).await,
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn foreign_landlord_gets_not_found_for_agreement_detail() {
    let app = app();
    let (_, owner) = signup(&app, "owner", "landlord").await;
    let (_, stranger) = signup(&app, "stranger", "landlord").await;
    let (tenant, _) = signup(&app, "tenant", "tenant").await;
    let house = create(&app, &owner, "/api/properties", property("9 Pine St")).await;
    let lease = create(
        &app,
        &owner,
        "/api/rental-agreements",
        agreement(house["id"].as_i64().expect("id"), tenant),
    )
    .await;
    let uri = format!("/api/rental-agreements/{}", lease["id"]);

    for method in ["GET", "DELETE"] {
        let response = app
            .clone()
            .oneshot(authed_request(method, &uri, &stranger))
            .await
            .expect("request");
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{method}");
        assert_eq!(read_json(response).await["code"], "not_found");
    }
    assert_eq!(status_of(&app, "GET", &uri, &owner).await, StatusCode::OK);
}

#[tokio::test]
async fn agreement_dates_must_be_ordered() {
    let app = app();
    let (_, landlord) = signup(&app, "lana", "landlord").await;
    let (tenant, _) = signup(&app, "tina", "tenant").await;
    let house = create(&app, &landlord, "/api/properties", property("3 Birch St")).await;
    let mut body = agreement(house["id"].as_i64().expect("id"), tenant);
    body["start_date"] = serde_json::json!("2026-01-01");
    body["end_date"] = serde_json::json!("2025-01-01");

    let response = app
        .clone()
        .oneshot(authed_json_request("POST", "/api/rental-agreements", &landlord, body))
        .await
        .expect("create");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn strict_ownership_blocks_tenant_agreement_edits() {
    let app = app_with(ServiceOptions {
        strict_ownership: true,
        ..ServiceOptions::default()
    });
    let (_, landlord) = signup(&app, "lana", "landlord").await;
    let (tenant, tenant_token) = signup(&app, "tina", "tenant").await;
    let house = create(&app, &landlord, "/api/properties", property("4 Cedar St")).await;
    let lease = create(
        &app,
        &landlord,
        "/api/rental-agreements",
        agreement(house["id"].as_i64().expect("id"), tenant),
    )
    .await;

    let response = app
        .clone()
        .oneshot(authed_json_request(
            "PATCH",
            &format!("/api/rental-agreements/{}", lease["id"]),
            &tenant_token,
            serde_json::json!({ "terms_and_conditions": "No rent" }),
        ))
        .await
        .expect("patch");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn support_ticket_visibility_scenario() {
    let app = app();
    let (_, admin) = signup(&app, "root", "administrator").await;
    let (_, t1) = signup(&app, "tenant1", "tenant").await;
    let (_, t2) = signup(&app, "tenant2", "tenant").await;

    let admin_ticket = create(
        &app,
        &admin,
        "/api/support-tickets",
        serde_json::json!({ "title": "Audit", "description": "Quarterly audit", "status": "new" }),
    )
    .await;
    assert_eq!(admin_ticket["status"], "new");
    let own_ticket = create(
        &app,
        &t1,
        "/api/support-tickets",
        serde_json::json!({ "title": "Leak", "description": "Kitchen sink" }),
    )
    .await;
    let own_id = own_ticket["id"].as_i64().expect("id");
    let admin_id = admin_ticket["id"].as_i64().expect("id");

    assert_eq!(list_ids(&app, "/api/support-tickets", &t1).await, vec![own_id]);
    assert!(list_ids(&app, "/api/support-tickets", &t2).await.is_empty());
    assert_eq!(
        list_ids(&app, "/api/support-tickets", &admin).await,
        vec![own_id, admin_id]
    );
    assert_eq!(
        status_of(&app, "GET", &format!("/api/support-tickets/{own_id}"), &t2).await,
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn resources_are_admin_writable_and_readable_by_all() {
    let app = app();
    let (_, admin) = signup(&app, "root", "administrator").await;
    let (_, tenant) = signup(&app, "tina", "tenant").await;
    let body = serde_json::json!({
        "title": "Know your rights",
        "type": "guide",
        "url": "https://example.org/rights",
        "language": "en"
    });

    let response = app
        .clone()
        .oneshot(authed_json_request("POST", "/api/resources", &tenant, body.clone()))
        .await
        .expect("tenant create");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let created = create(&app, &admin, "/api/resources", body).await;
    assert_eq!(created["type"], "guide");
    assert_eq!(list_ids(&app, "/api/resources", &tenant).await.len(), 1);
}

#[tokio::test]
async fn updates_keep_created_at_and_advance_updated_at() {
    let app = app();
    let (_, admin) = signup(&app, "root", "administrator").await;
    let created = create(
        &app,
        &admin,
        "/api/resources",
        serde_json::json!({
            "title": "Budgeting",
            "type": "video",
            "url": "https://example.org/budget",
            "language": "fr"
        }),
    )
    .await;

    let response = app
        .clone()
        .oneshot(authed_json_request(
            "PUT",
            &format!("/api/resources/{}", created["id"]),
            &admin,
            serde_json::json!({
                "title": "Budgeting 101",
                "type": "video",
                "url": "https://example.org/budget",
                "language": "fr"
            }),
        ))
        .await
        .expect("put");
    assert_eq!(response.status(), StatusCode::OK);
    let updated = read_json(response).await;
    assert_eq!(updated["title"], "Budgeting 101");
    assert_eq!(updated["created_at"], created["created_at"]);

    let before: chrono::DateTime<chrono::Utc> =
        serde_json::from_value(created["updated_at"].clone()).expect("before");
    let after: chrono::DateTime<chrono::Utc> =
        serde_json::from_value(updated["updated_at"].clone()).expect("after");
    assert!(after > before);
}

#[tokio::test]
async fn deleting_a_user_cascades_to_their_records() {
    let app = app();
    let (_, admin) = signup(&app, "root", "administrator").await;
    let (landlord_id, landlord) = signup(&app, "lana", "landlord").await;
    let (tenant, _) = signup(&app, "tina", "tenant").await;
    let house = create(&app, &landlord, "/api/properties", property("8 Maple St")).await;
    create(
        &app,
        &landlord,
        "/api/rental-agreements",
        agreement(house["id"].as_i64().expect("id"), tenant),
    )
    .await;
    create(
        &app,
        &landlord,
        "/api/forum-posts",
        serde_json::json!({ "title": "Hello", "content": "New landlord here" }),
    )
    .await;
    create(
        &app,
        &landlord,
        "/api/support-tickets",
        serde_json::json!({ "title": "Billing", "description": "Invoice missing" }),
    )
    .await;

    assert_eq!(
        status_of(&app, "DELETE", &format!("/api/users/{landlord_id}"), &admin).await,
        StatusCode::NO_CONTENT
    );

    for uri in [
        "/api/properties",
        "/api/rental-agreements",
        "/api/forum-posts",
        "/api/support-tickets",
    ] {
        assert!(list_ids(&app, uri, &admin).await.is_empty(), "{uri}");
    }
}
