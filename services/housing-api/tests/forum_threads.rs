mod common;

use axum::http::StatusCode;
use common::{TestApp, app, app_with, read_json, signup};
use housing_api::service::ServiceOptions;
use http_helpers::{authed_json_request, authed_request};
use tower::ServiceExt;

async fn post(app: &TestApp, token: &str, title: &str, parent: Option<i64>) -> i64 {
    let response = app
        .clone()
        .oneshot(authed_json_request(
            "POST",
            "/api/forum-posts",
            token,
            serde_json::json!({ "title": title, "content": "...", "parent_post": parent }),
        ))
        .await
        .expect("post");
    assert_eq!(response.status(), StatusCode::CREATED, "post {title}");
    read_json(response).await["id"].as_i64().expect("id")
}

async fn thread(app: &TestApp, token: &str, id: i64) -> serde_json::Value {
    let response = app
        .clone()
        .oneshot(authed_request("GET", &format!("/api/forum-posts/{id}"), token))
        .await
        .expect("get");
    assert_eq!(response.status(), StatusCode::OK);
    read_json(response).await
}

fn reply_titles(node: &serde_json::Value) -> Vec<String> {
    node["replies"]
        .as_array()
        .expect("replies")
        .iter()
        .map(|reply| reply["title"].as_str().expect("title").to_string())
        .collect()
}

#[tokio::test]
async fn replies_nest_newest_first() {
    let app = app();
    let (author, token) = signup(&app, "poster", "tenant").await;
    let root = post(&app, &token, "root", None).await;
    let older = post(&app, &token, "older", Some(root)).await;
    post(&app, &token, "newer", Some(root)).await;
    post(&app, &token, "nested", Some(older)).await;

    let view = thread(&app, &token, root).await;
    assert_eq!(view["user"], author);
    assert_eq!(reply_titles(&view), vec!["newer", "older"]);
    assert_eq!(reply_titles(&view["replies"][1]), vec!["nested"]);
    assert_eq!(view["replies"][1]["replies"][0]["replies"], serde_json::json!([]));
}

#[tokio::test]
async fn post_without_replies_has_empty_sequence() {
    let app = app();
    let (_, token) = signup(&app, "poster", "tenant").await;
    let lonely = post(&app, &token, "lonely", None).await;
    let view = thread(&app, &token, lonely).await;
    assert_eq!(view["replies"], serde_json::json!([]));
    assert!(view.get("truncated").is_none());
}

#[tokio::test]
async fn list_returns_threads_with_replies() {
    let app = app();
    let (_, token) = signup(&app, "poster", "landlord").await;
    let root = post(&app, &token, "root", None).await;
    post(&app, &token, "reply", Some(root)).await;

    let response = app
        .clone()
        .oneshot(authed_request("GET", "/api/forum-posts", &token))
        .await
        .expect("list");
    assert_eq!(response.status(), StatusCode::OK);
    let items = read_json(response).await["items"].clone();
    let root_view = items
        .as_array()
        .expect("items")
        .iter()
        .find(|item| item["id"] == root)
        .cloned()
        .expect("root in list");
    assert_eq!(reply_titles(&root_view), vec!["reply"]);
}

#[tokio::test]
async fn deep_threads_are_truncated_at_the_cap() {
    let app = app_with(ServiceOptions {
        forum_max_depth: 2,
        ..ServiceOptions::default()
    });
    let (_, token) = signup(&app, "poster", "tenant").await;
    let root = post(&app, &token, "level0", None).await;
    let one = post(&app, &token, "level1", Some(root)).await;
    let two = post(&app, &token, "level2", Some(one)).await;
    post(&app, &token, "level3", Some(two)).await;

    let view = thread(&app, &token, root).await;
    let deepest = &view["replies"][0]["replies"][0];
    assert_eq!(deepest["title"], "level2");
    assert_eq!(deepest["replies"], serde_json::json!([]));
    assert_eq!(deepest["truncated"], true);
}

#[tokio::test]
async fn reparenting_under_own_descendant_is_rejected() {
    let app = app();
    let (_, token) = signup(&app, "poster", "tenant").await;
    let root = post(&app, &token, "root", None).await;
    let child = post(&app, &token, "child", Some(root)).await;

    let response = app
        .clone()
        .oneshot(authed_json_request(
            "PATCH",
            &format!("/api/forum-posts/{root}"),
            &token,
            serde_json::json!({ "parent_post": child }),
        ))
        .await
        .expect("patch");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(read_json(response).await["code"], "validation_error");
}

#[tokio::test]
async fn reply_to_missing_post_is_rejected() {
    let app = app();
    let (_, token) = signup(&app, "poster", "tenant").await;
    let response = app
        .clone()
        .oneshot(authed_json_request(
            "POST",
            "/api/forum-posts",
            &token,
            serde_json::json!({ "title": "orphan", "content": "...", "parent_post": 999 }),
        ))
        .await
        .expect("post");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn strict_ownership_limits_edits_to_the_author() {
    let app = app_with(ServiceOptions {
        strict_ownership: true,
        ..ServiceOptions::default()
    });
    let (_, author) = signup(&app, "author", "tenant").await;
    let (_, other) = signup(&app, "other", "tenant").await;
    let (_, admin) = signup(&app, "root", "administrator").await;
    let id = post(&app, &author, "mine", None).await;
    let uri = format!("/api/forum-posts/{id}");

    let response = app
        .clone()
        .oneshot(authed_request("DELETE", &uri, &other))
        .await
        .expect("delete");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .clone()
        .oneshot(authed_request("DELETE", &uri, &admin))
        .await
        .expect("delete");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn permissive_mode_lets_any_user_edit_a_post() {
    let app = app();
    let (author_id, author) = signup(&app, "author", "tenant").await;
    let (_, other) = signup(&app, "other", "landlord").await;
    let id = post(&app, &author, "open", None).await;

    let response = app
        .clone()
        .oneshot(authed_json_request(
            "PATCH",
            &format!("/api/forum-posts/{id}"),
            &other,
            serde_json::json!({ "content": "edited", "user": 12345 }),
        ))
        .await
        .expect("patch");
    assert_eq!(response.status(), StatusCode::OK);
    let view = read_json(response).await;
    assert_eq!(view["content"], "edited");
    assert_eq!(view["user"], author_id);
}
