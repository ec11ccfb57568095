//! Static role table for every (entity, action) pair.
//!
//! # Purpose
//! Replaces per-endpoint permission checks with one exhaustive table that the
//! record service consults before touching the store.
//!
//! # Key invariants
//! - Only `User/Create` is open to anonymous actors (self-registration).
//! - Authenticated actors without a recognized role are denied every gated
//!   action, including reads.
//! - The table says nothing about *which* records are visible; see
//!   [`crate::visible_scope`] for that.
use crate::{Action, Actor, EntityKind, Role};

const ADMIN_ONLY: &[Role] = &[Role::Administrator];
const LANDLORD_OR_ADMIN: &[Role] = &[Role::Landlord, Role::Administrator];

/// Outcome of a policy evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    /// No credential was presented for an action that needs one.
    Unauthenticated,
    /// A credential was presented but the role table denies the action.
    Forbidden,
}

impl Decision {
    pub fn is_allowed(self) -> bool {
        matches!(self, Decision::Allow)
    }
}

#[derive(Debug, Clone, Copy)]
enum Requirement {
    Anyone,
    AnyRole,
    OneOf(&'static [Role]),
}

fn requirement(entity: EntityKind, action: Action) -> Requirement {
    match (entity, action) {
        (EntityKind::User, Action::Create) => Requirement::Anyone,
        (EntityKind::User, _) => Requirement::OneOf(ADMIN_ONLY),
        (EntityKind::Property, Action::Read) => Requirement::AnyRole,
        (EntityKind::Property, _) => Requirement::OneOf(LANDLORD_OR_ADMIN),
        (EntityKind::RentalAgreement, _) => Requirement::AnyRole,
        (EntityKind::Resource, Action::Read) => Requirement::AnyRole,
        (EntityKind::Resource, _) => Requirement::OneOf(ADMIN_ONLY),
        (EntityKind::ForumPost, _) => Requirement::AnyRole,
        (EntityKind::SupportTicket, _) => Requirement::AnyRole,
    }
}

/// Decide whether `actor` may perform `action` on records of kind `entity`.
pub fn evaluate(actor: &Actor, entity: EntityKind, action: Action) -> Decision {
    let requirement = requirement(entity, action);
    if matches!(requirement, Requirement::Anyone) {
        return Decision::Allow;
    }
    if !actor.is_authenticated() {
        return Decision::Unauthenticated;
    }
    let Some(role) = actor.role() else {
        return Decision::Forbidden;
    };
    match requirement {
        Requirement::Anyone | Requirement::AnyRole => Decision::Allow,
        Requirement::OneOf(roles) if roles.contains(&role) => Decision::Allow,
        Requirement::OneOf(_) => Decision::Forbidden,
    }
}

/// Boolean view of [`evaluate`].
pub fn permits(actor: &Actor, entity: EntityKind, action: Action) -> bool {
    evaluate(actor, entity, action).is_allowed()
}
