//! User accounts.
use crate::model::{Role, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// Public view of an account. The password hash never appears here.
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[schema(value_type = String, example = "tenant")]
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body for `POST /users` and `PUT /users/{id}`.
#[derive(Deserialize, ToSchema, Clone)]
pub struct UserWrite {
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[schema(value_type = String, example = "tenant")]
    pub role: Role,
    /// Write-only. Required on create.
    #[serde(default)]
    pub password: Option<String>,
}

/// Body for `PATCH /users/{id}`.
#[derive(Deserialize, ToSchema, Clone, Default)]
pub struct UserPatch {
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[schema(value_type = Option<String>)]
    pub role: Option<Role>,
    pub password: Option<String>,
}

impl From<UserWrite> for UserPatch {
    fn from(write: UserWrite) -> Self {
        Self {
            username: Some(write.username),
            email: Some(write.email),
            first_name: Some(write.first_name),
            last_name: Some(write.last_name),
            role: Some(write.role),
            password: write.password,
        }
    }
}

impl fmt::Debug for UserWrite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserWrite")
            .field("username", &self.username)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for UserPatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserPatch")
            .field("username", &self.username)
            .field("role", &self.role)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish_non_exhaustive()
    }
}

/// Store insert shape; the password is already hashed.
#[derive(Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub password_hash: String,
}

/// Store update shape; `None` leaves a column untouched.
#[derive(Clone, Default)]
pub struct UserUpdate {
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Option<Role>,
    pub password_hash: Option<String>,
}

/// Account plus its stored hash, used only by login.
#[derive(Clone)]
pub struct UserCredentials {
    pub user: User,
    pub password_hash: String,
}
