//! Visible-set rules.
//!
//! # Purpose
//! Maps an actor and entity kind to the [`Scope`] of records the actor may
//! see. Stores translate a scope into a query predicate; in-memory callers can
//! filter directly with [`derive_visible_set`].
//!
//! # Key invariants
//! - Administrators see everything.
//! - Rental agreements: landlords see agreements on their own properties,
//!   tenants see agreements naming them as tenant.
//! - Support tickets: non-administrators see only their own tickets.
//! - Anonymous actors and actors without a recognized role see nothing.
use crate::{Actor, EntityKind, Role, UserId};

/// Subset of records of one kind visible to an actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    All,
    Nothing,
    /// Records whose owning `user` is the given id.
    OwnedBy(UserId),
    /// Records whose `tenant` is the given id.
    TenantIs(UserId),
    /// Records whose (possibly indirect) `landlord` is the given id.
    LandlordIs(UserId),
}

/// Ownership facts about a single record, as far as visibility cares.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecordOwners {
    pub user: Option<UserId>,
    pub tenant: Option<UserId>,
    pub landlord: Option<UserId>,
}

/// Records that can report their owners for scope filtering.
pub trait Owned {
    fn owners(&self) -> RecordOwners;
}

impl Scope {
    pub fn admits(&self, owners: &RecordOwners) -> bool {
        match self {
            Scope::All => true,
            Scope::Nothing => false,
            Scope::OwnedBy(id) => owners.user == Some(*id),
            Scope::TenantIs(id) => owners.tenant == Some(*id),
            Scope::LandlordIs(id) => owners.landlord == Some(*id),
        }
    }
}

pub fn visible_scope(actor: &Actor, entity: EntityKind) -> Scope {
    let (Some(user_id), Some(role)) = (actor.user_id(), actor.role()) else {
        return Scope::Nothing;
    };
    match (entity, role) {
        (_, Role::Administrator) => Scope::All,
        (EntityKind::RentalAgreement, Role::Landlord) => Scope::LandlordIs(user_id),
        (EntityKind::RentalAgreement, Role::Tenant) => Scope::TenantIs(user_id),
        (EntityKind::SupportTicket, _) => Scope::OwnedBy(user_id),
        // Whether non-admins may see users at all is the role table's call.
        (EntityKind::User, _)
        | (EntityKind::Property, _)
        | (EntityKind::Resource, _)
        | (EntityKind::ForumPost, _) => Scope::All,
    }
}

/// Filter `records` down to the subset `actor` may see, preserving order.
pub fn derive_visible_set<T, I>(actor: &Actor, entity: EntityKind, records: I) -> Vec<T>
where
    T: Owned,
    I: IntoIterator<Item = T>,
{
    let scope = visible_scope(actor, entity);
    records
        .into_iter()
        .filter(|record| scope.admits(&record.owners()))
        .collect()
}
