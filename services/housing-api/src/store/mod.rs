//! Entity store contract.
//!
//! # Purpose
//! Durable, queryable storage for the six record types with referential
//! cascades. Backends are injected as `Arc<dyn HousingStore>`; nothing here is
//! global.
//!
//! # Key invariants
//! - Ids are allocated by the store; `created_at` is set once and
//!   `updated_at` strictly increases on every successful update.
//! - Lists are ordered newest first (`created_at DESC, id DESC`).
//! - Every method is atomic: cascades are either fully applied or not at all.
//! - Scoped methods treat records outside the [`Scope`] exactly like missing
//!   records.
//! - Cross-record invariants (agreement date order, acyclic reply chains) are
//!   checked against the same state the write is applied to.
use crate::model::{
    ForumPost, ForumPostPatch, NewForumPost, NewProperty, NewRentalAgreement, NewResource,
    NewSupportTicket, NewUser, Property, PropertyPatch, RecordId, RentalAgreement,
    RentalAgreementPatch, Resource, ResourcePatch, SupportTicket, SupportTicketPatch, User,
    UserCredentials, UserId, UserUpdate,
};
use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use housing_authz::Scope;
use thiserror::Error;

pub mod memory;
pub mod postgres;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    /// A referenced record does not exist or a column value is unusable.
    #[error("invalid: {0}")]
    Invalid(String),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Unexpected(err.into())
    }
}

impl From<sqlx::migrate::MigrateError> for StoreError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        StoreError::Unexpected(err.into())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait HousingStore: Send + Sync {
    async fn create_user(&self, user: NewUser) -> StoreResult<User>;
    async fn get_user(&self, id: UserId) -> StoreResult<User>;
    async fn find_credentials(&self, username: &str) -> StoreResult<Option<UserCredentials>>;
    async fn list_users(&self) -> StoreResult<Vec<User>>;
    async fn update_user(&self, id: UserId, update: UserUpdate) -> StoreResult<User>;
    /// Removes the user and everything that references it.
    async fn delete_user(&self, id: UserId) -> StoreResult<()>;

    async fn create_property(&self, property: NewProperty) -> StoreResult<Property>;
    async fn get_property(&self, id: RecordId) -> StoreResult<Property>;
    async fn list_properties(&self) -> StoreResult<Vec<Property>>;
    async fn update_property(&self, id: RecordId, patch: PropertyPatch) -> StoreResult<Property>;
    async fn delete_property(&self, id: RecordId) -> StoreResult<()>;

    async fn create_rental_agreement(
        &self,
        agreement: NewRentalAgreement,
    ) -> StoreResult<RentalAgreement>;
    async fn get_rental_agreement(&self, id: RecordId, scope: &Scope)
    -> StoreResult<RentalAgreement>;
    async fn list_rental_agreements(&self, scope: &Scope) -> StoreResult<Vec<RentalAgreement>>;
    async fn update_rental_agreement(
        &self,
        id: RecordId,
        scope: &Scope,
        patch: RentalAgreementPatch,
    ) -> StoreResult<RentalAgreement>;
    async fn delete_rental_agreement(&self, id: RecordId, scope: &Scope) -> StoreResult<()>;

    async fn create_resource(&self, resource: NewResource) -> StoreResult<Resource>;
    async fn get_resource(&self, id: RecordId) -> StoreResult<Resource>;
    async fn list_resources(&self) -> StoreResult<Vec<Resource>>;
    async fn update_resource(&self, id: RecordId, patch: ResourcePatch) -> StoreResult<Resource>;
    async fn delete_resource(&self, id: RecordId) -> StoreResult<()>;

    async fn create_forum_post(&self, post: NewForumPost) -> StoreResult<ForumPost>;
    async fn get_forum_post(&self, id: RecordId) -> StoreResult<ForumPost>;
    async fn list_forum_posts(&self) -> StoreResult<Vec<ForumPost>>;
    /// Direct replies of every id in `parents`, newest first.
    async fn list_replies(&self, parents: &[RecordId]) -> StoreResult<Vec<ForumPost>>;
    /// Rejects a new parent that is missing, the post itself, or one of its
    /// replies.
    async fn update_forum_post(&self, id: RecordId, patch: ForumPostPatch)
    -> StoreResult<ForumPost>;
    /// Removes the post and all of its descendant replies.
    async fn delete_forum_post(&self, id: RecordId) -> StoreResult<()>;

    async fn create_support_ticket(&self, ticket: NewSupportTicket) -> StoreResult<SupportTicket>;
    async fn get_support_ticket(&self, id: RecordId, scope: &Scope) -> StoreResult<SupportTicket>;
    async fn list_support_tickets(&self, scope: &Scope) -> StoreResult<Vec<SupportTicket>>;
    async fn update_support_ticket(
        &self,
        id: RecordId,
        scope: &Scope,
        patch: SupportTicketPatch,
    ) -> StoreResult<SupportTicket>;
    async fn delete_support_ticket(&self, id: RecordId, scope: &Scope) -> StoreResult<()>;

    async fn health_check(&self) -> StoreResult<()>;
    fn is_durable(&self) -> bool;
    fn backend_name(&self) -> &'static str;
}

pub(crate) fn check_date_order(start: NaiveDate, end: NaiveDate) -> StoreResult<()> {
    if start > end {
        return Err(StoreError::Invalid(
            "end_date: must not be before start_date".to_string(),
        ));
    }
    Ok(())
}

pub(crate) fn missing_parent(parent: RecordId) -> StoreError {
    StoreError::Invalid(format!("parent_post: forum post {parent} does not exist"))
}

pub(crate) fn reply_cycle() -> StoreError {
    StoreError::Invalid(
        "parent_post: a post cannot reply to itself or its own replies".to_string(),
    )
}

/// Next `updated_at` for a record last touched at `previous`.
pub(crate) fn touch(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    if now > previous {
        now
    } else {
        previous + Duration::microseconds(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touch_is_strictly_increasing() {
        let future = Utc::now() + Duration::seconds(30);
        assert!(touch(future) > future);
        let past = Utc::now() - Duration::seconds(30);
        assert!(touch(past) > past);
    }

    #[test]
    fn date_order_allows_single_day_agreements() {
        let day = NaiveDate::from_ymd_opt(2025, 6, 1).expect("date");
        let later = NaiveDate::from_ymd_opt(2025, 6, 2).expect("date");
        assert!(check_date_order(day, day).is_ok());
        assert!(check_date_order(day, later).is_ok());
        assert!(matches!(
            check_date_order(later, day),
            Err(StoreError::Invalid(_))
        ));
    }
}
