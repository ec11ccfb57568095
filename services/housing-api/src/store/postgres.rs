//! Postgres-backed implementation of the housing store.
//!
//! # Key invariants
//! - Foreign keys are declared `ON DELETE CASCADE`, so deleting a user,
//!   property, or forum post removes its dependents in the same statement.
//! - Multi-statement mutations run inside one transaction. Re-parenting a
//!   forum post also locks `forum_posts` against other re-parents.
//! - `updated_at` is refreshed with `GREATEST(now(), updated_at + 1µs)` so it
//!   strictly increases even when two updates share a transaction timestamp.
//! - Scopes become a fixed predicate over two bound parameters (scope kind and
//!   user id). No SQL is assembled at runtime.
//!
//! # Operational notes
//! Migrations under `./migrations` run at connect time, before the API binds.
//! Database URLs may contain credentials and are never logged.
use super::{
    HousingStore, StoreError, StoreResult, check_date_order, missing_parent, reply_cycle,
};
use crate::config::PostgresConfig;
use crate::model::{
    ForumPost, ForumPostPatch, NewForumPost, NewProperty, NewRentalAgreement, NewResource,
    NewSupportTicket, NewUser, Property, PropertyPatch, RecordId, RentalAgreement,
    RentalAgreementPatch, RentalPrice, Resource, ResourceKind, ResourcePatch, Role, SupportTicket,
    SupportTicketPatch, TicketStatus, User, UserCredentials, UserId, UserUpdate,
};
use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use housing_authz::Scope;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{FromRow, PgPool};
use std::str::FromStr;
use std::time::Duration;

pub struct PostgresStore {
    pool: PgPool,
}

#[derive(Debug, Clone, FromRow)]
struct DbUser {
    id: i64,
    username: String,
    email: String,
    first_name: String,
    last_name: String,
    role: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
struct DbUserCredentials {
    #[sqlx(flatten)]
    user: DbUser,
    password_hash: String,
}

#[derive(Debug, Clone, FromRow)]
struct DbProperty {
    id: i64,
    landlord_id: i64,
    address: String,
    city: String,
    province: String,
    description: String,
    rental_price_cents: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
struct DbRentalAgreement {
    id: i64,
    property_id: i64,
    tenant_id: i64,
    start_date: NaiveDate,
    end_date: NaiveDate,
    terms_and_conditions: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
struct DbResource {
    id: i64,
    title: String,
    kind: String,
    url: String,
    language: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
struct DbForumPost {
    id: i64,
    user_id: i64,
    title: String,
    content: String,
    parent_post_id: Option<i64>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
struct DbSupportTicket {
    id: i64,
    user_id: i64,
    title: String,
    description: String,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PostgresStore {
    /// Connects, runs pending migrations, and primes the user gauge.
    pub async fn connect(pg: &PostgresConfig) -> StoreResult<Self> {
        let connect_options = PgConnectOptions::from_str(&pg.url)?;
        let connect = PgPoolOptions::new()
            .max_connections(pg.max_connections)
            .acquire_timeout(Duration::from_millis(pg.acquire_timeout_ms))
            .connect_with(connect_options);
        let pool = tokio::time::timeout(Duration::from_millis(pg.connect_timeout_ms), connect)
            .await
            .map_err(|_| {
                StoreError::Unexpected(anyhow!(
                    "postgres connect timed out after {}ms",
                    pg.connect_timeout_ms
                ))
            })??;

        sqlx::migrate!("./migrations").run(&pool).await?;

        let store = Self { pool };
        store.refresh_counts().await?;
        Ok(store)
    }

    async fn refresh_counts(&self) -> StoreResult<()> {
        let users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        metrics::gauge!("housing_users_total").set(users as f64);
        Ok(())
    }
}

#[async_trait]
impl HousingStore for PostgresStore {
    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        let row: DbUser = sqlx::query_as(
            r#"INSERT INTO users (username, email, first_name, last_name, role, password_hash)
               VALUES ($1, $2, $3, $4, $5, $6)
               RETURNING id, username, email, first_name, last_name, role, created_at, updated_at"#,
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.role.as_str())
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(write_error)?;
        self.refresh_counts().await?;
        user_from_db(row)
    }

    async fn get_user(&self, id: UserId) -> StoreResult<User> {
        let row: Option<DbUser> = sqlx::query_as(
            r#"SELECT id, username, email, first_name, last_name, role, created_at, updated_at
               FROM users WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.ok_or_else(|| not_found("user", id))
            .and_then(user_from_db)
    }

    async fn find_credentials(&self, username: &str) -> StoreResult<Option<UserCredentials>> {
        let row: Option<DbUserCredentials> = sqlx::query_as(
            r#"SELECT id, username, email, first_name, last_name, role, created_at, updated_at,
                      password_hash
               FROM users WHERE username = $1"#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        row.map(|row| {
            Ok(UserCredentials {
                user: user_from_db(row.user)?,
                password_hash: row.password_hash,
            })
        })
        .transpose()
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let rows: Vec<DbUser> = sqlx::query_as(
            r#"SELECT id, username, email, first_name, last_name, role, created_at, updated_at
               FROM users ORDER BY created_at DESC, id DESC"#,
        )
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(user_from_db).collect()
    }

    async fn update_user(&self, id: UserId, update: UserUpdate) -> StoreResult<User> {
        let row: Option<DbUser> = sqlx::query_as(
            r#"UPDATE users SET
                   username = COALESCE($2, username),
                   email = COALESCE($3, email),
                   first_name = COALESCE($4, first_name),
                   last_name = COALESCE($5, last_name),
                   role = COALESCE($6, role),
                   password_hash = COALESCE($7, password_hash),
                   updated_at = GREATEST(now(), updated_at + interval '1 microsecond')
               WHERE id = $1
               RETURNING id, username, email, first_name, last_name, role, created_at, updated_at"#,
        )
        .bind(id)
        .bind(update.username)
        .bind(update.email)
        .bind(update.first_name)
        .bind(update.last_name)
        .bind(update.role.map(Role::as_str))
        .bind(update.password_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(write_error)?;
        row.ok_or_else(|| not_found("user", id))
            .and_then(user_from_db)
    }

    async fn delete_user(&self, id: UserId) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(not_found("user", id));
        }
        self.refresh_counts().await?;
        Ok(())
    }

    async fn create_property(&self, property: NewProperty) -> StoreResult<Property> {
        let row: DbProperty = sqlx::query_as(
            r#"INSERT INTO properties
                   (landlord_id, address, city, province, description, rental_price_cents)
               VALUES ($1, $2, $3, $4, $5, $6)
               RETURNING id, landlord_id, address, city, province, description,
                         rental_price_cents, created_at, updated_at"#,
        )
        .bind(property.landlord)
        .bind(&property.address)
        .bind(&property.city)
        .bind(&property.province)
        .bind(&property.description)
        .bind(property.rental_price.cents())
        .fetch_one(&self.pool)
        .await
        .map_err(write_error)?;
        property_from_db(row)
    }

    async fn get_property(&self, id: RecordId) -> StoreResult<Property> {
        let row: Option<DbProperty> = sqlx::query_as(
            r#"SELECT id, landlord_id, address, city, province, description,
                      rental_price_cents, created_at, updated_at
               FROM properties WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.ok_or_else(|| not_found("property", id))
            .and_then(property_from_db)
    }

    async fn list_properties(&self) -> StoreResult<Vec<Property>> {
        let rows: Vec<DbProperty> = sqlx::query_as(
            r#"SELECT id, landlord_id, address, city, province, description,
                      rental_price_cents, created_at, updated_at
               FROM properties ORDER BY created_at DESC, id DESC"#,
        )
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(property_from_db).collect()
    }

    async fn update_property(&self, id: RecordId, patch: PropertyPatch) -> StoreResult<Property> {
        let row: Option<DbProperty> = sqlx::query_as(
            r#"UPDATE properties SET
                   address = COALESCE($2, address),
                   city = COALESCE($3, city),
                   province = COALESCE($4, province),
                   description = COALESCE($5, description),
                   rental_price_cents = COALESCE($6, rental_price_cents),
                   updated_at = GREATEST(now(), updated_at + interval '1 microsecond')
               WHERE id = $1
               RETURNING id, landlord_id, address, city, province, description,
                         rental_price_cents, created_at, updated_at"#,
        )
        .bind(id)
        .bind(patch.address)
        .bind(patch.city)
        .bind(patch.province)
        .bind(patch.description)
        .bind(patch.rental_price.map(RentalPrice::cents))
        .fetch_optional(&self.pool)
        .await
        .map_err(write_error)?;
        row.ok_or_else(|| not_found("property", id))
            .and_then(property_from_db)
    }

    async fn delete_property(&self, id: RecordId) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM properties WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(not_found("property", id));
        }
        Ok(())
    }

    async fn create_rental_agreement(
        &self,
        agreement: NewRentalAgreement,
    ) -> StoreResult<RentalAgreement> {
        let row: DbRentalAgreement = sqlx::query_as(
            r#"INSERT INTO rental_agreements
                   (property_id, tenant_id, start_date, end_date, terms_and_conditions)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING id, property_id, tenant_id, start_date, end_date,
                         terms_and_conditions, created_at, updated_at"#,
        )
        .bind(agreement.property)
        .bind(agreement.tenant)
        .bind(agreement.start_date)
        .bind(agreement.end_date)
        .bind(&agreement.terms_and_conditions)
        .fetch_one(&self.pool)
        .await
        .map_err(write_error)?;
        Ok(agreement_from_db(row))
    }

    async fn get_rental_agreement(
        &self,
        id: RecordId,
        scope: &Scope,
    ) -> StoreResult<RentalAgreement> {
        let (kind, user) = scope_params(scope);
        let row: Option<DbRentalAgreement> = sqlx::query_as(
            r#"SELECT ra.id, ra.property_id, ra.tenant_id, ra.start_date, ra.end_date,
                      ra.terms_and_conditions, ra.created_at, ra.updated_at
               FROM rental_agreements ra
               JOIN properties p ON p.id = ra.property_id
               WHERE ra.id = $1
                 AND ($2 = 'all'
                      OR ($2 = 'tenant' AND ra.tenant_id = $3)
                      OR ($2 = 'landlord' AND p.landlord_id = $3))"#,
        )
        .bind(id)
        .bind(kind)
        .bind(user)
        .fetch_optional(&self.pool)
        .await?;
        row.map(agreement_from_db)
            .ok_or_else(|| not_found("rental agreement", id))
    }

    async fn list_rental_agreements(&self, scope: &Scope) -> StoreResult<Vec<RentalAgreement>> {
        let (kind, user) = scope_params(scope);
        let rows: Vec<DbRentalAgreement> = sqlx::query_as(
            r#"SELECT ra.id, ra.property_id, ra.tenant_id, ra.start_date, ra.end_date,
                      ra.terms_and_conditions, ra.created_at, ra.updated_at
               FROM rental_agreements ra
               JOIN properties p ON p.id = ra.property_id
               WHERE $1 = 'all'
                  OR ($1 = 'tenant' AND ra.tenant_id = $2)
                  OR ($1 = 'landlord' AND p.landlord_id = $2)
               ORDER BY ra.created_at DESC, ra.id DESC"#,
        )
        .bind(kind)
        .bind(user)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(agreement_from_db).collect())
    }

    async fn update_rental_agreement(
        &self,
        id: RecordId,
        scope: &Scope,
        patch: RentalAgreementPatch,
    ) -> StoreResult<RentalAgreement> {
        let (kind, user) = scope_params(scope);
        let mut tx = self.pool.begin().await?;
        let locked: Option<(NaiveDate, NaiveDate)> = sqlx::query_as(
            r#"SELECT ra.start_date, ra.end_date
               FROM rental_agreements ra
               JOIN properties p ON p.id = ra.property_id
               WHERE ra.id = $1
                 AND ($2 = 'all'
                      OR ($2 = 'tenant' AND ra.tenant_id = $3)
                      OR ($2 = 'landlord' AND p.landlord_id = $3))
               FOR UPDATE OF ra"#,
        )
        .bind(id)
        .bind(kind)
        .bind(user)
        .fetch_optional(&mut *tx)
        .await?;
        let Some((start_date, end_date)) = locked else {
            return Err(not_found("rental agreement", id));
        };
        check_date_order(
            patch.start_date.unwrap_or(start_date),
            patch.end_date.unwrap_or(end_date),
        )?;

        let row: DbRentalAgreement = sqlx::query_as(
            r#"UPDATE rental_agreements SET
                   property_id = COALESCE($2, property_id),
                   tenant_id = COALESCE($3, tenant_id),
                   start_date = COALESCE($4, start_date),
                   end_date = COALESCE($5, end_date),
                   terms_and_conditions = COALESCE($6, terms_and_conditions),
                   updated_at = GREATEST(now(), updated_at + interval '1 microsecond')
               WHERE id = $1
               RETURNING id, property_id, tenant_id, start_date, end_date,
                         terms_and_conditions, created_at, updated_at"#,
        )
        .bind(id)
        .bind(patch.property)
        .bind(patch.tenant)
        .bind(patch.start_date)
        .bind(patch.end_date)
        .bind(patch.terms_and_conditions)
        .fetch_one(&mut *tx)
        .await
        .map_err(write_error)?;
        tx.commit().await?;
        Ok(agreement_from_db(row))
    }

    async fn delete_rental_agreement(&self, id: RecordId, scope: &Scope) -> StoreResult<()> {
        let (kind, user) = scope_params(scope);
        let result = sqlx::query(
            r#"DELETE FROM rental_agreements ra
               USING properties p
               WHERE p.id = ra.property_id
                 AND ra.id = $1
                 AND ($2 = 'all'
                      OR ($2 = 'tenant' AND ra.tenant_id = $3)
                      OR ($2 = 'landlord' AND p.landlord_id = $3))"#,
        )
        .bind(id)
        .bind(kind)
        .bind(user)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(not_found("rental agreement", id));
        }
        Ok(())
    }

    async fn create_resource(&self, resource: NewResource) -> StoreResult<Resource> {
        let row: DbResource = sqlx::query_as(
            r#"INSERT INTO resources (title, kind, url, language)
               VALUES ($1, $2, $3, $4)
               RETURNING id, title, kind, url, language, created_at, updated_at"#,
        )
        .bind(&resource.title)
        .bind(resource.kind.as_str())
        .bind(&resource.url)
        .bind(&resource.language)
        .fetch_one(&self.pool)
        .await
        .map_err(write_error)?;
        resource_from_db(row)
    }

    async fn get_resource(&self, id: RecordId) -> StoreResult<Resource> {
        let row: Option<DbResource> = sqlx::query_as(
            r#"SELECT id, title, kind, url, language, created_at, updated_at
               FROM resources WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.ok_or_else(|| not_found("resource", id))
            .and_then(resource_from_db)
    }

    async fn list_resources(&self) -> StoreResult<Vec<Resource>> {
        let rows: Vec<DbResource> = sqlx::query_as(
            r#"SELECT id, title, kind, url, language, created_at, updated_at
               FROM resources ORDER BY created_at DESC, id DESC"#,
        )
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(resource_from_db).collect()
    }

    async fn update_resource(&self, id: RecordId, patch: ResourcePatch) -> StoreResult<Resource> {
        let row: Option<DbResource> = sqlx::query_as(
            r#"UPDATE resources SET
                   title = COALESCE($2, title),
                   kind = COALESCE($3, kind),
                   url = COALESCE($4, url),
                   language = COALESCE($5, language),
                   updated_at = GREATEST(now(), updated_at + interval '1 microsecond')
               WHERE id = $1
               RETURNING id, title, kind, url, language, created_at, updated_at"#,
        )
        .bind(id)
        .bind(patch.title)
        .bind(patch.kind.map(ResourceKind::as_str))
        .bind(patch.url)
        .bind(patch.language)
        .fetch_optional(&self.pool)
        .await
        .map_err(write_error)?;
        row.ok_or_else(|| not_found("resource", id))
            .and_then(resource_from_db)
    }

    async fn delete_resource(&self, id: RecordId) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM resources WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(not_found("resource", id));
        }
        Ok(())
    }

    async fn create_forum_post(&self, post: NewForumPost) -> StoreResult<ForumPost> {
        let row: DbForumPost = sqlx::query_as(
            r#"INSERT INTO forum_posts (user_id, title, content, parent_post_id)
               VALUES ($1, $2, $3, $4)
               RETURNING id, user_id, title, content, parent_post_id, created_at, updated_at"#,
        )
        .bind(post.user)
        .bind(&post.title)
        .bind(&post.content)
        .bind(post.parent_post)
        .fetch_one(&self.pool)
        .await
        .map_err(write_error)?;
        Ok(post_from_db(row))
    }

    async fn get_forum_post(&self, id: RecordId) -> StoreResult<ForumPost> {
        let row: Option<DbForumPost> = sqlx::query_as(
            r#"SELECT id, user_id, title, content, parent_post_id, created_at, updated_at
               FROM forum_posts WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(post_from_db)
            .ok_or_else(|| not_found("forum post", id))
    }

    async fn list_forum_posts(&self) -> StoreResult<Vec<ForumPost>> {
        let rows: Vec<DbForumPost> = sqlx::query_as(
            r#"SELECT id, user_id, title, content, parent_post_id, created_at, updated_at
               FROM forum_posts ORDER BY created_at DESC, id DESC"#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(post_from_db).collect())
    }

    async fn list_replies(&self, parents: &[RecordId]) -> StoreResult<Vec<ForumPost>> {
        if parents.is_empty() {
            return Ok(Vec::new());
        }
        let rows: Vec<DbForumPost> = sqlx::query_as(
            r#"SELECT id, user_id, title, content, parent_post_id, created_at, updated_at
               FROM forum_posts WHERE parent_post_id = ANY($1)
               ORDER BY created_at DESC, id DESC"#,
        )
        .bind(parents)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(post_from_db).collect())
    }

    async fn update_forum_post(
        &self,
        id: RecordId,
        patch: ForumPostPatch,
    ) -> StoreResult<ForumPost> {
        let mut tx = self.pool.begin().await?;
        if let Some(Some(parent)) = patch.parent_post {
            // Re-parents run one at a time; the walk sees earlier ones committed.
            sqlx::query("LOCK TABLE forum_posts IN SHARE ROW EXCLUSIVE MODE")
                .execute(&mut *tx)
                .await?;
            let ancestors: Vec<i64> = sqlx::query_scalar(
                r#"WITH RECURSIVE ancestors (id, parent_post_id) AS (
                       SELECT id, parent_post_id FROM forum_posts WHERE id = $1
                       UNION
                       SELECT f.id, f.parent_post_id
                       FROM forum_posts f
                       JOIN ancestors a ON f.id = a.parent_post_id
                   )
                   SELECT id FROM ancestors"#,
            )
            .bind(parent)
            .fetch_all(&mut *tx)
            .await?;
            if ancestors.is_empty() {
                return Err(missing_parent(parent));
            }
            if ancestors.contains(&id) {
                return Err(reply_cycle());
            }
        }

        let row: Option<DbForumPost> = sqlx::query_as(
            r#"UPDATE forum_posts SET
                   title = COALESCE($2, title),
                   content = COALESCE($3, content),
                   parent_post_id = CASE WHEN $4 THEN $5 ELSE parent_post_id END,
                   updated_at = GREATEST(now(), updated_at + interval '1 microsecond')
               WHERE id = $1
               RETURNING id, user_id, title, content, parent_post_id, created_at, updated_at"#,
        )
        .bind(id)
        .bind(patch.title)
        .bind(patch.content)
        .bind(patch.parent_post.is_some())
        .bind(patch.parent_post.flatten())
        .fetch_optional(&mut *tx)
        .await
        .map_err(write_error)?;
        let Some(row) = row else {
            return Err(not_found("forum post", id));
        };
        tx.commit().await?;
        Ok(post_from_db(row))
    }

    async fn delete_forum_post(&self, id: RecordId) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM forum_posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(not_found("forum post", id));
        }
        Ok(())
    }

    async fn create_support_ticket(&self, ticket: NewSupportTicket) -> StoreResult<SupportTicket> {
        let row: DbSupportTicket = sqlx::query_as(
            r#"INSERT INTO support_tickets (user_id, title, description, status)
               VALUES ($1, $2, $3, $4)
               RETURNING id, user_id, title, description, status, created_at, updated_at"#,
        )
        .bind(ticket.user)
        .bind(&ticket.title)
        .bind(&ticket.description)
        .bind(ticket.status.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(write_error)?;
        ticket_from_db(row)
    }

    async fn get_support_ticket(&self, id: RecordId, scope: &Scope) -> StoreResult<SupportTicket> {
        let (kind, user) = scope_params(scope);
        let row: Option<DbSupportTicket> = sqlx::query_as(
            r#"SELECT id, user_id, title, description, status, created_at, updated_at
               FROM support_tickets
               WHERE id = $1 AND ($2 = 'all' OR ($2 = 'owner' AND user_id = $3))"#,
        )
        .bind(id)
        .bind(kind)
        .bind(user)
        .fetch_optional(&self.pool)
        .await?;
        row.ok_or_else(|| not_found("support ticket", id))
            .and_then(ticket_from_db)
    }

    async fn list_support_tickets(&self, scope: &Scope) -> StoreResult<Vec<SupportTicket>> {
        let (kind, user) = scope_params(scope);
        let rows: Vec<DbSupportTicket> = sqlx::query_as(
            r#"SELECT id, user_id, title, description, status, created_at, updated_at
               FROM support_tickets
               WHERE $1 = 'all' OR ($1 = 'owner' AND user_id = $2)
               ORDER BY created_at DESC, id DESC"#,
        )
        .bind(kind)
        .bind(user)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(ticket_from_db).collect()
    }

    async fn update_support_ticket(
        &self,
        id: RecordId,
        scope: &Scope,
        patch: SupportTicketPatch,
    ) -> StoreResult<SupportTicket> {
        let (kind, user) = scope_params(scope);
        let row: Option<DbSupportTicket> = sqlx::query_as(
            r#"UPDATE support_tickets SET
                   title = COALESCE($4, title),
                   description = COALESCE($5, description),
                   status = COALESCE($6, status),
                   updated_at = GREATEST(now(), updated_at + interval '1 microsecond')
               WHERE id = $1 AND ($2 = 'all' OR ($2 = 'owner' AND user_id = $3))
               RETURNING id, user_id, title, description, status, created_at, updated_at"#,
        )
        .bind(id)
        .bind(kind)
        .bind(user)
        .bind(patch.title)
        .bind(patch.description)
        .bind(patch.status.map(TicketStatus::as_str))
        .fetch_optional(&self.pool)
        .await
        .map_err(write_error)?;
        row.ok_or_else(|| not_found("support ticket", id))
            .and_then(ticket_from_db)
    }

    async fn delete_support_ticket(&self, id: RecordId, scope: &Scope) -> StoreResult<()> {
        let (kind, user) = scope_params(scope);
        let result = sqlx::query(
            r#"DELETE FROM support_tickets
               WHERE id = $1 AND ($2 = 'all' OR ($2 = 'owner' AND user_id = $3))"#,
        )
        .bind(id)
        .bind(kind)
        .bind(user)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(not_found("support ticket", id));
        }
        Ok(())
    }

    async fn health_check(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    fn is_durable(&self) -> bool {
        true
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}

/// Bound parameters for the scope predicate: a kind tag and a user id.
fn scope_params(scope: &Scope) -> (&'static str, i64) {
    match *scope {
        Scope::All => ("all", 0),
        Scope::Nothing => ("nothing", 0),
        Scope::OwnedBy(user) => ("owner", user),
        Scope::TenantIs(user) => ("tenant", user),
        Scope::LandlordIs(user) => ("landlord", user),
    }
}

fn not_found(kind: &str, id: i64) -> StoreError {
    StoreError::NotFound(format!("{kind} {id}"))
}

fn database_code(err: &sqlx::Error) -> Option<String> {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().map(|code| code.into_owned()),
        _ => None,
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    database_code(err).as_deref() == Some("23505")
}

fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    database_code(err).as_deref() == Some("23503")
}

fn is_check_violation(err: &sqlx::Error) -> bool {
    database_code(err).as_deref() == Some("23514")
}

fn write_error(err: sqlx::Error) -> StoreError {
    let constraint = match &err {
        sqlx::Error::Database(db_err) => db_err.constraint().unwrap_or("unknown").to_string(),
        _ => String::new(),
    };
    if is_unique_violation(&err) {
        StoreError::Conflict(format!("unique constraint {constraint} violated"))
    } else if is_foreign_key_violation(&err) {
        StoreError::Invalid(format!("referenced record does not exist ({constraint})"))
    } else if is_check_violation(&err) {
        StoreError::Invalid(format!("check constraint {constraint} violated"))
    } else {
        StoreError::Unexpected(err.into())
    }
}

fn user_from_db(row: DbUser) -> StoreResult<User> {
    let role = Role::parse(&row.role)
        .ok_or_else(|| StoreError::Unexpected(anyhow!("unknown role in users.role: {}", row.role)))?;
    Ok(User {
        id: row.id,
        username: row.username,
        email: row.email,
        first_name: row.first_name,
        last_name: row.last_name,
        role,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

fn property_from_db(row: DbProperty) -> StoreResult<Property> {
    let rental_price = RentalPrice::from_cents(row.rental_price_cents)
        .map_err(|err| StoreError::Unexpected(anyhow!("properties.rental_price_cents: {err}")))?;
    Ok(Property {
        id: row.id,
        landlord: row.landlord_id,
        address: row.address,
        city: row.city,
        province: row.province,
        description: row.description,
        rental_price,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

fn agreement_from_db(row: DbRentalAgreement) -> RentalAgreement {
    RentalAgreement {
        id: row.id,
        property: row.property_id,
        tenant: row.tenant_id,
        start_date: row.start_date,
        end_date: row.end_date,
        terms_and_conditions: row.terms_and_conditions,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

fn resource_from_db(row: DbResource) -> StoreResult<Resource> {
    let kind = ResourceKind::parse(&row.kind).ok_or_else(|| {
        StoreError::Unexpected(anyhow!("unknown resource kind in resources.kind: {}", row.kind))
    })?;
    Ok(Resource {
        id: row.id,
        title: row.title,
        kind,
        url: row.url,
        language: row.language,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

fn post_from_db(row: DbForumPost) -> ForumPost {
    ForumPost {
        id: row.id,
        user: row.user_id,
        title: row.title,
        content: row.content,
        parent_post: row.parent_post_id,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

fn ticket_from_db(row: DbSupportTicket) -> StoreResult<SupportTicket> {
    let status = TicketStatus::parse(&row.status).ok_or_else(|| {
        StoreError::Unexpected(anyhow!(
            "unknown ticket status in support_tickets.status: {}",
            row.status
        ))
    })?;
    Ok(SupportTicket {
        id: row.id,
        user: row.user_id,
        title: row.title,
        description: row.description,
        status,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_params_tag_each_variant() {
        assert_eq!(scope_params(&Scope::All), ("all", 0));
        assert_eq!(scope_params(&Scope::Nothing), ("nothing", 0));
        assert_eq!(scope_params(&Scope::OwnedBy(3)), ("owner", 3));
        assert_eq!(scope_params(&Scope::TenantIs(4)), ("tenant", 4));
        assert_eq!(scope_params(&Scope::LandlordIs(5)), ("landlord", 5));
    }

    #[test]
    fn unknown_role_rows_are_unexpected() {
        let row = DbUser {
            id: 1,
            username: "x".to_string(),
            email: "x@example.com".to_string(),
            first_name: String::new(),
            last_name: String::new(),
            role: "superuser".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(matches!(user_from_db(row), Err(StoreError::Unexpected(_))));
    }

    #[test]
    fn non_database_errors_are_unexpected() {
        let err = write_error(sqlx::Error::RowNotFound);
        assert!(matches!(err, StoreError::Unexpected(_)));
    }
}
