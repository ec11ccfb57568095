//! In-memory implementation of the housing store.
//!
//! # Purpose
//! Implements [`HousingStore`] with `BTreeMap`s behind a single
//! `tokio::sync::RwLock`. Used for local development, tests, and deployments
//! that do not need durability.
//!
//! # Durability and consistency
//! - **Not durable**: all state is lost on process restart.
//! - All tables share one lock, so cascading deletes and foreign-key checks
//!   observe and mutate a consistent snapshot.
//!
//! # Performance characteristics
//! Cascades and scoped queries scan whole tables. Fine for dev-sized data.
use super::{
    HousingStore, StoreError, StoreResult, check_date_order, missing_parent, reply_cycle, touch,
};
use crate::model::{
    ForumPost, ForumPostPatch, NewForumPost, NewProperty, NewRentalAgreement, NewResource,
    NewSupportTicket, NewUser, Property, PropertyPatch, RecordId, RentalAgreement,
    RentalAgreementPatch, Resource, ResourcePatch, SupportTicket, SupportTicketPatch, User,
    UserCredentials, UserId, UserUpdate,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use housing_authz::{Owned, RecordOwners, Scope};
use std::collections::{BTreeMap, BTreeSet};
use tokio::sync::RwLock;

struct StoredUser {
    user: User,
    password_hash: String,
}

#[derive(Default)]
struct Tables {
    next_id: BTreeMap<&'static str, i64>,
    users: BTreeMap<UserId, StoredUser>,
    properties: BTreeMap<RecordId, Property>,
    rental_agreements: BTreeMap<RecordId, RentalAgreement>,
    resources: BTreeMap<RecordId, Resource>,
    forum_posts: BTreeMap<RecordId, ForumPost>,
    support_tickets: BTreeMap<RecordId, SupportTicket>,
}

impl Tables {
    fn allocate(&mut self, table: &'static str) -> i64 {
        let next = self.next_id.entry(table).or_insert(0);
        *next += 1;
        *next
    }

    fn require_user(&self, id: UserId, field: &str) -> StoreResult<()> {
        if self.users.contains_key(&id) {
            Ok(())
        } else {
            Err(StoreError::Invalid(format!("{field}: user {id} does not exist")))
        }
    }

    fn require_property(&self, id: RecordId) -> StoreResult<()> {
        if self.properties.contains_key(&id) {
            Ok(())
        } else {
            Err(StoreError::Invalid(format!(
                "property: property {id} does not exist"
            )))
        }
    }

    fn require_unique_username(&self, username: &str, except: Option<UserId>) -> StoreResult<()> {
        let taken = self
            .users
            .values()
            .any(|stored| stored.user.username == username && Some(stored.user.id) != except);
        if taken {
            Err(StoreError::Conflict(format!(
                "username {username} is already taken"
            )))
        } else {
            Ok(())
        }
    }

    fn agreement_owners(&self, agreement: &RentalAgreement) -> RecordOwners {
        RecordOwners {
            user: None,
            tenant: Some(agreement.tenant),
            landlord: self
                .properties
                .get(&agreement.property)
                .map(|property| property.landlord),
        }
    }

    fn scoped_agreement(&self, id: RecordId, scope: &Scope) -> StoreResult<&RentalAgreement> {
        self.rental_agreements
            .get(&id)
            .filter(|agreement| scope.admits(&self.agreement_owners(agreement)))
            .ok_or_else(|| not_found("rental agreement", id))
    }

    fn scoped_ticket(&self, id: RecordId, scope: &Scope) -> StoreResult<&SupportTicket> {
        self.support_tickets
            .get(&id)
            .filter(|ticket| scope.admits(&ticket.owners()))
            .ok_or_else(|| not_found("support ticket", id))
    }

    /// Ids of `roots` plus every reply reachable from them.
    fn post_subtree(&self, roots: impl IntoIterator<Item = RecordId>) -> BTreeSet<RecordId> {
        let mut seen: BTreeSet<RecordId> = BTreeSet::new();
        let mut frontier: Vec<RecordId> = roots.into_iter().collect();
        while let Some(id) = frontier.pop() {
            if !seen.insert(id) {
                continue;
            }
            frontier.extend(
                self.forum_posts
                    .values()
                    .filter(|post| post.parent_post == Some(id))
                    .map(|post| post.id),
            );
        }
        seen
    }

    /// Fails if `id` would become its own ancestor under `parent`.
    fn check_reparent(&self, id: RecordId, parent: RecordId) -> StoreResult<()> {
        if !self.forum_posts.contains_key(&parent) {
            return Err(missing_parent(parent));
        }
        let mut seen: BTreeSet<RecordId> = BTreeSet::new();
        let mut current = Some(parent);
        while let Some(ancestor) = current {
            if ancestor == id {
                return Err(reply_cycle());
            }
            if !seen.insert(ancestor) {
                break;
            }
            current = self
                .forum_posts
                .get(&ancestor)
                .and_then(|post| post.parent_post);
        }
        Ok(())
    }

    fn remove_posts(&mut self, roots: impl IntoIterator<Item = RecordId>) {
        for id in self.post_subtree(roots) {
            self.forum_posts.remove(&id);
        }
    }

    fn remove_properties(&mut self, ids: &BTreeSet<RecordId>) {
        self.properties.retain(|id, _| !ids.contains(id));
        self.rental_agreements
            .retain(|_, agreement| !ids.contains(&agreement.property));
    }

    fn publish_user_count(&self) {
        metrics::gauge!("housing_users_total").set(self.users.len() as f64);
    }
}

fn not_found(kind: &str, id: i64) -> StoreError {
    StoreError::NotFound(format!("{kind} {id}"))
}

/// Newest first, ties broken by descending id.
fn newest_first<'a, T, I>(records: I, key: fn(&T) -> (DateTime<Utc>, i64)) -> Vec<T>
where
    T: Clone + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let mut items: Vec<T> = records.into_iter().cloned().collect();
    items.sort_by(|a, b| key(b).cmp(&key(a)));
    items
}

#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HousingStore for InMemoryStore {
    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        let mut tables = self.tables.write().await;
        tables.require_unique_username(&user.username, None)?;
        let id = tables.allocate("users");
        let now = Utc::now();
        let created = User {
            id,
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            role: user.role,
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(
            id,
            StoredUser {
                user: created.clone(),
                password_hash: user.password_hash,
            },
        );
        tables.publish_user_count();
        Ok(created)
    }

    async fn get_user(&self, id: UserId) -> StoreResult<User> {
        let tables = self.tables.read().await;
        tables
            .users
            .get(&id)
            .map(|stored| stored.user.clone())
            .ok_or_else(|| not_found("user", id))
    }

    async fn find_credentials(&self, username: &str) -> StoreResult<Option<UserCredentials>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|stored| stored.user.username == username)
            .map(|stored| UserCredentials {
                user: stored.user.clone(),
                password_hash: stored.password_hash.clone(),
            }))
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let tables = self.tables.read().await;
        Ok(newest_first(
            tables.users.values().map(|stored| &stored.user),
            |user| (user.created_at, user.id),
        ))
    }

    async fn update_user(&self, id: UserId, update: UserUpdate) -> StoreResult<User> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&id) {
            return Err(not_found("user", id));
        }
        if let Some(username) = update.username.as_deref() {
            tables.require_unique_username(username, Some(id))?;
        }
        let stored = tables
            .users
            .get_mut(&id)
            .ok_or_else(|| not_found("user", id))?;
        let user = &mut stored.user;
        if let Some(username) = update.username {
            user.username = username;
        }
        if let Some(email) = update.email {
            user.email = email;
        }
        if let Some(first_name) = update.first_name {
            user.first_name = first_name;
        }
        if let Some(last_name) = update.last_name {
            user.last_name = last_name;
        }
        if let Some(role) = update.role {
            user.role = role;
        }
        if let Some(password_hash) = update.password_hash {
            stored.password_hash = password_hash;
        }
        stored.user.updated_at = touch(stored.user.updated_at);
        Ok(stored.user.clone())
    }

    async fn delete_user(&self, id: UserId) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if tables.users.remove(&id).is_none() {
            return Err(not_found("user", id));
        }
        let owned_properties: BTreeSet<RecordId> = tables
            .properties
            .values()
            .filter(|property| property.landlord == id)
            .map(|property| property.id)
            .collect();
        tables.remove_properties(&owned_properties);
        tables
            .rental_agreements
            .retain(|_, agreement| agreement.tenant != id);
        let authored: Vec<RecordId> = tables
            .forum_posts
            .values()
            .filter(|post| post.user == id)
            .map(|post| post.id)
            .collect();
        tables.remove_posts(authored);
        tables.support_tickets.retain(|_, ticket| ticket.user != id);
        tables.publish_user_count();
        Ok(())
    }

    async fn create_property(&self, property: NewProperty) -> StoreResult<Property> {
        let mut tables = self.tables.write().await;
        tables.require_user(property.landlord, "landlord")?;
        let id = tables.allocate("properties");
        let now = Utc::now();
        let created = Property {
            id,
            landlord: property.landlord,
            address: property.address,
            city: property.city,
            province: property.province,
            description: property.description,
            rental_price: property.rental_price,
            created_at: now,
            updated_at: now,
        };
        tables.properties.insert(id, created.clone());
        Ok(created)
    }

    async fn get_property(&self, id: RecordId) -> StoreResult<Property> {
        let tables = self.tables.read().await;
        tables
            .properties
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found("property", id))
    }

    async fn list_properties(&self) -> StoreResult<Vec<Property>> {
        let tables = self.tables.read().await;
        Ok(newest_first(tables.properties.values(), |property| {
            (property.created_at, property.id)
        }))
    }

    async fn update_property(&self, id: RecordId, patch: PropertyPatch) -> StoreResult<Property> {
        let mut tables = self.tables.write().await;
        let property = tables
            .properties
            .get_mut(&id)
            .ok_or_else(|| not_found("property", id))?;
        if let Some(address) = patch.address {
            property.address = address;
        }
        if let Some(city) = patch.city {
            property.city = city;
        }
        if let Some(province) = patch.province {
            property.province = province;
        }
        if let Some(description) = patch.description {
            property.description = description;
        }
        if let Some(rental_price) = patch.rental_price {
            property.rental_price = rental_price;
        }
        property.updated_at = touch(property.updated_at);
        Ok(property.clone())
    }

    async fn delete_property(&self, id: RecordId) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if !tables.properties.contains_key(&id) {
            return Err(not_found("property", id));
        }
        tables.remove_properties(&BTreeSet::from([id]));
        Ok(())
    }

    async fn create_rental_agreement(
        &self,
        agreement: NewRentalAgreement,
    ) -> StoreResult<RentalAgreement> {
        let mut tables = self.tables.write().await;
        tables.require_property(agreement.property)?;
        tables.require_user(agreement.tenant, "tenant")?;
        let id = tables.allocate("rental_agreements");
        let now = Utc::now();
        let created = RentalAgreement {
            id,
            property: agreement.property,
            tenant: agreement.tenant,
            start_date: agreement.start_date,
            end_date: agreement.end_date,
            terms_and_conditions: agreement.terms_and_conditions,
            created_at: now,
            updated_at: now,
        };
        tables.rental_agreements.insert(id, created.clone());
        Ok(created)
    }

    async fn get_rental_agreement(
        &self,
        id: RecordId,
        scope: &Scope,
    ) -> StoreResult<RentalAgreement> {
        let tables = self.tables.read().await;
        tables.scoped_agreement(id, scope).cloned()
    }

    async fn list_rental_agreements(&self, scope: &Scope) -> StoreResult<Vec<RentalAgreement>> {
        let tables = self.tables.read().await;
        Ok(newest_first(
            tables
                .rental_agreements
                .values()
                .filter(|agreement| scope.admits(&tables.agreement_owners(agreement))),
            |agreement| (agreement.created_at, agreement.id),
        ))
    }

    async fn update_rental_agreement(
        &self,
        id: RecordId,
        scope: &Scope,
        patch: RentalAgreementPatch,
    ) -> StoreResult<RentalAgreement> {
        let mut tables = self.tables.write().await;
        tables.scoped_agreement(id, scope)?;
        if let Some(property) = patch.property {
            tables.require_property(property)?;
        }
        if let Some(tenant) = patch.tenant {
            tables.require_user(tenant, "tenant")?;
        }
        let agreement = tables
            .rental_agreements
            .get_mut(&id)
            .ok_or_else(|| not_found("rental agreement", id))?;
        check_date_order(
            patch.start_date.unwrap_or(agreement.start_date),
            patch.end_date.unwrap_or(agreement.end_date),
        )?;
        if let Some(property) = patch.property {
            agreement.property = property;
        }
        if let Some(tenant) = patch.tenant {
            agreement.tenant = tenant;
        }
        if let Some(start_date) = patch.start_date {
            agreement.start_date = start_date;
        }
        if let Some(end_date) = patch.end_date {
            agreement.end_date = end_date;
        }
        if let Some(terms) = patch.terms_and_conditions {
            agreement.terms_and_conditions = terms;
        }
        agreement.updated_at = touch(agreement.updated_at);
        Ok(agreement.clone())
    }

    async fn delete_rental_agreement(&self, id: RecordId, scope: &Scope) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        tables.scoped_agreement(id, scope)?;
        tables.rental_agreements.remove(&id);
        Ok(())
    }

    async fn create_resource(&self, resource: NewResource) -> StoreResult<Resource> {
        let mut tables = self.tables.write().await;
        let id = tables.allocate("resources");
        let now = Utc::now();
        let created = Resource {
            id,
            title: resource.title,
            kind: resource.kind,
            url: resource.url,
            language: resource.language,
            created_at: now,
            updated_at: now,
        };
        tables.resources.insert(id, created.clone());
        Ok(created)
    }

    async fn get_resource(&self, id: RecordId) -> StoreResult<Resource> {
        let tables = self.tables.read().await;
        tables
            .resources
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found("resource", id))
    }

    async fn list_resources(&self) -> StoreResult<Vec<Resource>> {
        let tables = self.tables.read().await;
        Ok(newest_first(tables.resources.values(), |resource| {
            (resource.created_at, resource.id)
        }))
    }

    async fn update_resource(&self, id: RecordId, patch: ResourcePatch) -> StoreResult<Resource> {
        let mut tables = self.tables.write().await;
        let resource = tables
            .resources
            .get_mut(&id)
            .ok_or_else(|| not_found("resource", id))?;
        if let Some(title) = patch.title {
            resource.title = title;
        }
        if let Some(kind) = patch.kind {
            resource.kind = kind;
        }
        if let Some(url) = patch.url {
            resource.url = url;
        }
        if let Some(language) = patch.language {
            resource.language = language;
        }
        resource.updated_at = touch(resource.updated_at);
        Ok(resource.clone())
    }

    async fn delete_resource(&self, id: RecordId) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        tables
            .resources
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| not_found("resource", id))
    }

    async fn create_forum_post(&self, post: NewForumPost) -> StoreResult<ForumPost> {
        let mut tables = self.tables.write().await;
        tables.require_user(post.user, "user")?;
        if let Some(parent) = post.parent_post {
            if !tables.forum_posts.contains_key(&parent) {
                return Err(missing_parent(parent));
            }
        }
        let id = tables.allocate("forum_posts");
        let now = Utc::now();
        let created = ForumPost {
            id,
            user: post.user,
            title: post.title,
            content: post.content,
            parent_post: post.parent_post,
            created_at: now,
            updated_at: now,
        };
        tables.forum_posts.insert(id, created.clone());
        Ok(created)
    }

    async fn get_forum_post(&self, id: RecordId) -> StoreResult<ForumPost> {
        let tables = self.tables.read().await;
        tables
            .forum_posts
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found("forum post", id))
    }

    async fn list_forum_posts(&self) -> StoreResult<Vec<ForumPost>> {
        let tables = self.tables.read().await;
        Ok(newest_first(tables.forum_posts.values(), |post| {
            (post.created_at, post.id)
        }))
    }

    async fn list_replies(&self, parents: &[RecordId]) -> StoreResult<Vec<ForumPost>> {
        let tables = self.tables.read().await;
        Ok(newest_first(
            tables.forum_posts.values().filter(|post| {
                post.parent_post
                    .is_some_and(|parent| parents.contains(&parent))
            }),
            |post| (post.created_at, post.id),
        ))
    }

    async fn update_forum_post(
        &self,
        id: RecordId,
        patch: ForumPostPatch,
    ) -> StoreResult<ForumPost> {
        let mut tables = self.tables.write().await;
        if !tables.forum_posts.contains_key(&id) {
            return Err(not_found("forum post", id));
        }
        if let Some(Some(parent)) = patch.parent_post {
            tables.check_reparent(id, parent)?;
        }
        let post = tables
            .forum_posts
            .get_mut(&id)
            .ok_or_else(|| not_found("forum post", id))?;
        if let Some(title) = patch.title {
            post.title = title;
        }
        if let Some(content) = patch.content {
            post.content = content;
        }
        if let Some(parent_post) = patch.parent_post {
            post.parent_post = parent_post;
        }
        post.updated_at = touch(post.updated_at);
        Ok(post.clone())
    }

    async fn delete_forum_post(&self, id: RecordId) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if !tables.forum_posts.contains_key(&id) {
            return Err(not_found("forum post", id));
        }
        tables.remove_posts([id]);
        Ok(())
    }

    async fn create_support_ticket(&self, ticket: NewSupportTicket) -> StoreResult<SupportTicket> {
        let mut tables = self.tables.write().await;
        tables.require_user(ticket.user, "user")?;
        let id = tables.allocate("support_tickets");
        let now = Utc::now();
        let created = SupportTicket {
            id,
            user: ticket.user,
            title: ticket.title,
            description: ticket.description,
            status: ticket.status,
            created_at: now,
            updated_at: now,
        };
        tables.support_tickets.insert(id, created.clone());
        Ok(created)
    }

    async fn get_support_ticket(&self, id: RecordId, scope: &Scope) -> StoreResult<SupportTicket> {
        let tables = self.tables.read().await;
        tables.scoped_ticket(id, scope).cloned()
    }

    async fn list_support_tickets(&self, scope: &Scope) -> StoreResult<Vec<SupportTicket>> {
        let tables = self.tables.read().await;
        Ok(newest_first(
            tables
                .support_tickets
                .values()
                .filter(|ticket| scope.admits(&ticket.owners())),
            |ticket| (ticket.created_at, ticket.id),
        ))
    }

    async fn update_support_ticket(
        &self,
        id: RecordId,
        scope: &Scope,
        patch: SupportTicketPatch,
    ) -> StoreResult<SupportTicket> {
        let mut tables = self.tables.write().await;
        tables.scoped_ticket(id, scope)?;
        let ticket = tables
            .support_tickets
            .get_mut(&id)
            .ok_or_else(|| not_found("support ticket", id))?;
        if let Some(title) = patch.title {
            ticket.title = title;
        }
        if let Some(description) = patch.description {
            ticket.description = description;
        }
        if let Some(status) = patch.status {
            ticket.status = status;
        }
        ticket.updated_at = touch(ticket.updated_at);
        Ok(ticket.clone())
    }

    async fn delete_support_ticket(&self, id: RecordId, scope: &Scope) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        tables.scoped_ticket(id, scope)?;
        tables.support_tickets.remove(&id);
        Ok(())
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }

    fn is_durable(&self) -> bool {
        false
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
