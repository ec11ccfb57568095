//! Record service.
//!
//! # Purpose
//! One entry point per record operation. Each operation checks the role table,
//! applies the actor's visible scope, stamps server-owned fields, validates
//! input, and then calls the store.
//!
//! # Key invariants
//! - Authorization runs before any store access, so denied requests reveal
//!   nothing about existing records.
//! - Records outside the actor's scope are reported as NotFound for reads,
//!   updates, and deletes alike.
//! - Ownership fields (`landlord`, `user`) come from the actor, never from the
//!   payload.
use crate::store::{HousingStore, StoreError};
use housing_authz::{Action, Actor, Decision, EntityKind, Scope, UserId, evaluate, visible_scope};
use std::sync::Arc;
use thiserror::Error;

mod forum_posts;
mod properties;
mod rental_agreements;
mod resources;
mod support_tickets;
mod users;
pub mod validate;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("authentication required")]
    Unauthorized,
    #[error("permission denied")]
    Forbidden,
    #[error("{0} not found")]
    NotFound(String),
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(what) => ServiceError::NotFound(what),
            StoreError::Conflict(message) | StoreError::Invalid(message) => {
                ServiceError::Validation(message)
            }
            other @ StoreError::Unexpected(_) => ServiceError::Store(other),
        }
    }
}

impl From<anyhow::Error> for ServiceError {
    fn from(err: anyhow::Error) -> Self {
        ServiceError::Store(StoreError::Unexpected(err))
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, Clone, Copy)]
pub struct ServiceOptions {
    /// Reply levels expanded below a forum post before a node is marked
    /// truncated.
    pub forum_max_depth: usize,
    /// Restrict forum post and rental agreement writes to their owners.
    pub strict_ownership: bool,
}

impl Default for ServiceOptions {
    fn default() -> Self {
        Self {
            forum_max_depth: crate::config::DEFAULT_FORUM_MAX_DEPTH,
            strict_ownership: false,
        }
    }
}

#[derive(Clone)]
pub struct RecordService {
    store: Arc<dyn HousingStore + Send + Sync>,
    options: ServiceOptions,
}

impl RecordService {
    pub fn new(store: Arc<dyn HousingStore + Send + Sync>, options: ServiceOptions) -> Self {
        Self { store, options }
    }

    pub fn options(&self) -> ServiceOptions {
        self.options
    }

    pub fn backend_name(&self) -> &'static str {
        self.store.backend_name()
    }

    pub fn is_durable(&self) -> bool {
        self.store.is_durable()
    }

    pub async fn health_check(&self) -> ServiceResult<()> {
        Ok(self.store.health_check().await?)
    }

    /// Role-table check. Counts every denial.
    pub fn authorize(
        &self,
        actor: &Actor,
        entity: EntityKind,
        action: Action,
    ) -> ServiceResult<()> {
        let decision = evaluate(actor, entity, action);
        if decision.is_allowed() {
            return Ok(());
        }
        count_denial(entity, action);
        tracing::debug!(
            entity = entity.as_str(),
            action = action.as_str(),
            user_id = actor.user_id(),
            ?decision,
            "access denied"
        );
        match decision {
            Decision::Unauthenticated => Err(ServiceError::Unauthorized),
            Decision::Forbidden | Decision::Allow => Err(ServiceError::Forbidden),
        }
    }

    /// Authorizes and returns the scope the action operates within.
    fn scope_for(&self, actor: &Actor, entity: EntityKind, action: Action) -> ServiceResult<Scope> {
        self.authorize(actor, entity, action)?;
        Ok(visible_scope(actor, entity))
    }
}

fn count_denial(entity: EntityKind, action: Action) {
    metrics::counter!(
        "housing_access_denied_total",
        "entity" => entity.as_str(),
        "action" => action.as_str()
    )
    .increment(1);
}

/// Denial raised by an ownership rule rather than the role table.
fn not_owner(entity: EntityKind, action: Action) -> ServiceError {
    count_denial(entity, action);
    ServiceError::Forbidden
}

/// Id of an actor that already passed a gated check.
fn acting_user(actor: &Actor) -> ServiceResult<UserId> {
    actor.user_id().ok_or(ServiceError::Unauthorized)
}

fn record_created(entity: EntityKind) {
    metrics::counter!("housing_records_created_total", "entity" => entity.as_str()).increment(1);
}

fn record_updated(entity: EntityKind) {
    metrics::counter!("housing_records_updated_total", "entity" => entity.as_str()).increment(1);
}

fn record_deleted(entity: EntityKind) {
    metrics::counter!("housing_records_deleted_total", "entity" => entity.as_str()).increment(1);
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::model::{NewUser, Role, User};
    use crate::store::memory::InMemoryStore;

    pub fn service() -> RecordService {
        service_with(ServiceOptions::default())
    }

    pub fn service_with(options: ServiceOptions) -> RecordService {
        RecordService::new(Arc::new(InMemoryStore::new()), options)
    }

    /// Inserts a user directly and returns it with a matching actor.
    pub async fn seed_user(service: &RecordService, username: &str, role: Role) -> (User, Actor) {
        let user = service
            .store
            .create_user(NewUser {
                username: username.to_string(),
                email: format!("{username}@example.com"),
                first_name: String::new(),
                last_name: String::new(),
                role,
                password_hash: crate::auth::password::UNUSABLE_PASSWORD.to_string(),
            })
            .await
            .expect("seed user");
        let actor = Actor::user(user.id, Some(user.role));
        (user, actor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_map_to_service_errors() {
        assert!(matches!(
            ServiceError::from(StoreError::NotFound("x".into())),
            ServiceError::NotFound(_)
        ));
        assert!(matches!(
            ServiceError::from(StoreError::Conflict("x".into())),
            ServiceError::Validation(_)
        ));
        assert!(matches!(
            ServiceError::from(StoreError::Invalid("x".into())),
            ServiceError::Validation(_)
        ));
        assert!(matches!(
            ServiceError::from(StoreError::Unexpected(anyhow::anyhow!("boom"))),
            ServiceError::Store(_)
        ));
    }

    #[test]
    fn authorize_distinguishes_anonymous_from_roleless() {
        let service = test_support::service();
        let err = service
            .authorize(&Actor::Anonymous, EntityKind::Property, Action::Read)
            .expect_err("anonymous");
        assert!(matches!(err, ServiceError::Unauthorized));
        let err = service
            .authorize(&Actor::user(1, None), EntityKind::Property, Action::Read)
            .expect_err("roleless");
        assert!(matches!(err, ServiceError::Forbidden));
    }
}
