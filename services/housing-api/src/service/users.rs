//! Accounts, registration, and login.
use super::{
    RecordService, ServiceError, ServiceResult, acting_user, record_created, record_deleted,
    record_updated, validate,
};
use crate::auth::password;
use crate::model::{NewUser, User, UserId, UserPatch, UserUpdate, UserWrite};
use crate::store::StoreError;
use housing_authz::{Action, Actor, EntityKind};

const ENTITY: EntityKind = EntityKind::User;

fn username_taken(err: StoreError) -> ServiceError {
    match err {
        StoreError::Conflict(_) => ServiceError::Validation("username: already exists".into()),
        other => other.into(),
    }
}

async fn hash_off_thread(password: String) -> ServiceResult<String> {
    let hash = tokio::task::spawn_blocking(move || password::hash_password(&password))
        .await
        .map_err(|err| anyhow::anyhow!("password hashing task failed: {err}"))??;
    Ok(hash)
}

async fn verify_off_thread(password: String, hash: String) -> ServiceResult<bool> {
    tokio::task::spawn_blocking(move || password::verify_password(&password, &hash))
        .await
        .map_err(|err| anyhow::anyhow!("password verification task failed: {err}").into())
}

fn check_patch(patch: &UserPatch) -> ServiceResult<()> {
    if let Some(username) = &patch.username {
        validate::username(username)?;
    }
    if let Some(email) = &patch.email {
        validate::email(email)?;
    }
    if let Some(first_name) = &patch.first_name {
        validate::at_most("first_name", first_name, validate::NAME_MAX)?;
    }
    if let Some(last_name) = &patch.last_name {
        validate::at_most("last_name", last_name, validate::NAME_MAX)?;
    }
    if let Some(password) = &patch.password {
        validate::password(password)?;
    }
    Ok(())
}

impl RecordService {
    /// Self-registration. Open to anonymous callers.
    pub async fn create_user(&self, actor: &Actor, write: UserWrite) -> ServiceResult<User> {
        self.authorize(actor, ENTITY, Action::Create)?;
        validate::username(&write.username)?;
        validate::email(&write.email)?;
        validate::at_most("first_name", &write.first_name, validate::NAME_MAX)?;
        validate::at_most("last_name", &write.last_name, validate::NAME_MAX)?;
        let password = write
            .password
            .ok_or_else(|| ServiceError::Validation("password: is required".into()))?;
        validate::password(&password)?;

        let password_hash = hash_off_thread(password).await?;
        let user = self
            .store
            .create_user(NewUser {
                username: write.username,
                email: write.email,
                first_name: write.first_name,
                last_name: write.last_name,
                role: write.role,
                password_hash,
            })
            .await
            .map_err(username_taken)?;
        record_created(ENTITY);
        tracing::info!(user_id = user.id, role = %user.role, "user registered");
        Ok(user)
    }

    pub async fn list_users(&self, actor: &Actor) -> ServiceResult<Vec<User>> {
        self.authorize(actor, ENTITY, Action::Read)?;
        Ok(self.store.list_users().await?)
    }

    pub async fn get_user(&self, actor: &Actor, id: UserId) -> ServiceResult<User> {
        self.authorize(actor, ENTITY, Action::Read)?;
        Ok(self.store.get_user(id).await?)
    }

    pub async fn update_user(
        &self,
        actor: &Actor,
        id: UserId,
        patch: UserPatch,
    ) -> ServiceResult<User> {
        self.authorize(actor, ENTITY, Action::Update)?;
        check_patch(&patch)?;
        let password_hash = match patch.password {
            Some(password) => Some(hash_off_thread(password).await?),
            None => None,
        };
        let user = self
            .store
            .update_user(
                id,
                UserUpdate {
                    username: patch.username,
                    email: patch.email,
                    first_name: patch.first_name,
                    last_name: patch.last_name,
                    role: patch.role,
                    password_hash,
                },
            )
            .await
            .map_err(username_taken)?;
        record_updated(ENTITY);
        Ok(user)
    }

    /// Removes the account and every record that references it.
    pub async fn delete_user(&self, actor: &Actor, id: UserId) -> ServiceResult<()> {
        self.authorize(actor, ENTITY, Action::Delete)?;
        self.store.delete_user(id).await?;
        record_deleted(ENTITY);
        tracing::info!(user_id = id, deleted_by = actor.user_id(), "user deleted");
        Ok(())
    }

    /// The caller's own account. A token for a deleted account is not a
    /// credential anymore.
    pub async fn current_user(&self, actor: &Actor) -> ServiceResult<User> {
        let id = acting_user(actor)?;
        match self.store.get_user(id).await {
            Ok(user) => Ok(user),
            Err(StoreError::NotFound(_)) => Err(ServiceError::Unauthorized),
            Err(err) => Err(err.into()),
        }
    }

    /// Checks a username/password pair. Unknown users and wrong passwords are
    /// indistinguishable to the caller.
    pub async fn authenticate(&self, username: &str, password: &str) -> ServiceResult<User> {
        let credentials = self.store.find_credentials(username).await?;
        let verified = match credentials {
            Some(credentials) => {
                let ok =
                    verify_off_thread(password.to_string(), credentials.password_hash).await?;
                ok.then_some(credentials.user)
            }
            None => None,
        };
        let outcome = if verified.is_some() { "success" } else { "failure" };
        metrics::counter!("housing_logins_total", "outcome" => outcome).increment(1);
        verified.ok_or(ServiceError::Unauthorized)
    }
}
