//! OpenAPI schema aggregation for the housing API.
//!
//! # Purpose
//! Collects all routes and schema types into a single OpenAPI document served
//! at `/api/openapi.json` and rendered by Swagger UI at `/docs`.
use crate::api::{
    forum_posts, properties, rental_agreements, resources, support_tickets, system,
    types::{
        ErrorResponse, ForumThreadListResponse, HealthStatus, LoginRequest, PropertyListResponse,
        RentalAgreementListResponse, ResourceListResponse, SupportTicketListResponse,
        TokenResponse, UserListResponse,
    },
    users,
};
use crate::auth::login;
use crate::model::{
    ForumPost, ForumPostPatch, ForumPostWrite, ForumThread, Property, PropertyPatch,
    PropertyWrite, RentalAgreement, RentalAgreementPatch, RentalAgreementWrite, Resource,
    ResourceKind, ResourcePatch, ResourceWrite, SupportTicket, SupportTicketPatch,
    SupportTicketWrite, TicketStatus, User, UserPatch, UserWrite,
};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "housing-api",
        version = "v1",
        description = "Housing management HTTP API"
    ),
    paths(
        system::health,
        login::issue_token,
        login::me,
        users::list_users,
        users::create_user,
        users::get_user,
        users::replace_user,
        users::patch_user,
        users::delete_user,
        properties::list_properties,
        properties::create_property,
        properties::get_property,
        properties::replace_property,
        properties::patch_property,
        properties::delete_property,
        rental_agreements::list_rental_agreements,
        rental_agreements::create_rental_agreement,
        rental_agreements::get_rental_agreement,
        rental_agreements::replace_rental_agreement,
        rental_agreements::patch_rental_agreement,
        rental_agreements::delete_rental_agreement,
        resources::list_resources,
        resources::create_resource,
        resources::get_resource,
        resources::replace_resource,
        resources::patch_resource,
        resources::delete_resource,
        forum_posts::list_forum_posts,
        forum_posts::create_forum_post,
        forum_posts::get_forum_post,
        forum_posts::replace_forum_post,
        forum_posts::patch_forum_post,
        forum_posts::delete_forum_post,
        support_tickets::list_support_tickets,
        support_tickets::create_support_ticket,
        support_tickets::get_support_ticket,
        support_tickets::replace_support_ticket,
        support_tickets::patch_support_ticket,
        support_tickets::delete_support_ticket
    ),
    components(schemas(
        ErrorResponse,
        HealthStatus,
        LoginRequest,
        TokenResponse,
        User,
        UserWrite,
        UserPatch,
        UserListResponse,
        Property,
        PropertyWrite,
        PropertyPatch,
        PropertyListResponse,
        RentalAgreement,
        RentalAgreementWrite,
        RentalAgreementPatch,
        RentalAgreementListResponse,
        Resource,
        ResourceKind,
        ResourceWrite,
        ResourcePatch,
        ResourceListResponse,
        ForumPost,
        ForumThread,
        ForumPostWrite,
        ForumPostPatch,
        ForumThreadListResponse,
        SupportTicket,
        TicketStatus,
        SupportTicketWrite,
        SupportTicketPatch,
        SupportTicketListResponse
    )),
    tags(
        (name = "system", description = "Health endpoints"),
        (name = "auth", description = "Login and current account"),
        (name = "users", description = "User accounts"),
        (name = "properties", description = "Property listings"),
        (name = "rental-agreements", description = "Rental agreements"),
        (name = "resources", description = "Educational resources"),
        (name = "forum-posts", description = "Threaded forum"),
        (name = "support-tickets", description = "Support tickets")
    )
)]
pub struct ApiDoc;
