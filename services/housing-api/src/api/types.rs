//! HTTP API request/response types.
//!
//! # Purpose
//! Payload shapes shared across handlers that are not record types
//! themselves: error bodies, list envelopes, login, and health.
use crate::model::{ForumThread, Property, RentalAgreement, Resource, SupportTicket, User};
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    pub request_id: Option<String>,
}

// List endpoints wrap their records as `{ "items": [...] }`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserListResponse {
    pub items: Vec<User>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PropertyListResponse {
    pub items: Vec<Property>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RentalAgreementListResponse {
    pub items: Vec<RentalAgreement>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ResourceListResponse {
    pub items: Vec<Resource>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ForumThreadListResponse {
    pub items: Vec<ForumThread>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SupportTicketListResponse {
    pub items: Vec<SupportTicket>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct HealthStatus {
    pub status: String,
    pub storage: String,
    pub durable: bool,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
    pub user: User,
}
