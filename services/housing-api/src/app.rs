//! Housing HTTP application wiring.
//!
//! # Purpose
//! Builds the Axum router, configures middleware, and defines the shared
//! application state injected into handlers.
//!
//! # Notes
//! This module centralizes route composition to keep `main` small and testable.
use crate::api;
use crate::api::openapi::ApiDoc;
use crate::auth;
use crate::observability;
use crate::service::RecordService;
use axum::Router;
use axum::routing::{get, post};
use housing_authz::{TokenIssuer, TokenVerifier};
use tower_http::trace::TraceLayer;
use tracing_opentelemetry::OpenTelemetrySpanExt;
use utoipa::OpenApi;

#[derive(Clone)]
pub struct AppState {
    pub service: RecordService,
    pub issuer: TokenIssuer,
    pub verifier: TokenVerifier,
}

pub fn build_router(state: AppState) -> Router {
    let trace_layer =
        TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
            let parent = observability::trace_context_from_headers(request.headers());
            let span = tracing::info_span!(
                "http.request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version()
            );
            span.set_parent(parent);
            span
        });

    Router::new()
        .route("/api/health", get(api::system::health))
        .route("/api/auth/token", post(auth::login::issue_token))
        .route("/api/auth/me", get(auth::login::me))
        .route(
            "/api/users",
            get(api::users::list_users).post(api::users::create_user),
        )
        .route(
            "/api/users/:id",
            get(api::users::get_user)
                .put(api::users::replace_user)
                .patch(api::users::patch_user)
                .delete(api::users::delete_user),
        )
        .route(
            "/api/properties",
            get(api::properties::list_properties).post(api::properties::create_property),
        )
        .route(
            "/api/properties/:id",
            get(api::properties::get_property)
                .put(api::properties::replace_property)
                .patch(api::properties::patch_property)
                .delete(api::properties::delete_property),
        )
        .route(
            "/api/rental-agreements",
            get(api::rental_agreements::list_rental_agreements)
                .post(api::rental_agreements::create_rental_agreement),
        )
        .route(
            "/api/rental-agreements/:id",
            get(api::rental_agreements::get_rental_agreement)
                .put(api::rental_agreements::replace_rental_agreement)
                .patch(api::rental_agreements::patch_rental_agreement)
                .delete(api::rental_agreements::delete_rental_agreement),
        )
        .route(
            "/api/resources",
            get(api::resources::list_resources).post(api::resources::create_resource),
        )
        .route(
            "/api/resources/:id",
            get(api::resources::get_resource)
                .put(api::resources::replace_resource)
                .patch(api::resources::patch_resource)
                .delete(api::resources::delete_resource),
        )
        .route(
            "/api/forum-posts",
            get(api::forum_posts::list_forum_posts).post(api::forum_posts::create_forum_post),
        )
        .route(
            "/api/forum-posts/:id",
            get(api::forum_posts::get_forum_post)
                .put(api::forum_posts::replace_forum_post)
                .patch(api::forum_posts::patch_forum_post)
                .delete(api::forum_posts::delete_forum_post),
        )
        .route(
            "/api/support-tickets",
            get(api::support_tickets::list_support_tickets)
                .post(api::support_tickets::create_support_ticket),
        )
        .route(
            "/api/support-tickets/:id",
            get(api::support_tickets::get_support_ticket)
                .put(api::support_tickets::replace_support_ticket)
                .patch(api::support_tickets::patch_support_ticket)
                .delete(api::support_tickets::delete_support_ticket),
        )
        .merge(
            utoipa_swagger_ui::SwaggerUi::new("/docs").url("/api/openapi.json", ApiDoc::openapi()),
        )
        .layer(trace_layer)
        .with_state(state)
}
