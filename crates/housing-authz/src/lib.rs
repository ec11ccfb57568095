//! Housing authn/authz primitives shared by the API service and its tests.
//!
//! # Purpose
//! Holds the access policy for every record type (a fixed table of
//! role x entity x action decisions), the visible-set scoping rules, and the
//! bearer-token issuer/verifier used to authenticate actors.
//!
//! # How it fits
//! The record service asks [`evaluate`] whether an actor may perform an action
//! and asks [`visible_scope`] which subset of records the actor may see. Stores
//! apply the returned [`Scope`] inside their queries.
//!
//! # Key invariants
//! - Every decision is a pure function of the actor and the entity/action pair.
//! - Unknown or missing roles fail closed.
//! - Tokens are HS256 only; other algorithms are rejected.
//!
//! # Examples
//! ```rust
//! use housing_authz::{Action, Actor, EntityKind, Role, evaluate};
//!
//! let landlord = Actor::user(7, Some(Role::Landlord));
//! assert!(evaluate(&landlord, EntityKind::Property, Action::Create).is_allowed());
//! assert!(!evaluate(&landlord, EntityKind::Resource, Action::Delete).is_allowed());
//! ```

mod action;
mod actor;
mod errors;
mod policy;
mod role;
mod scope;
mod token;

pub use action::{Action, EntityKind};
pub use actor::{Actor, UserId};
pub use errors::{AuthzError, AuthzResult};
pub use policy::{Decision, evaluate, permits};
pub use role::Role;
pub use scope::{Owned, RecordOwners, Scope, derive_visible_set, visible_scope};
pub use token::{HousingClaims, TokenIssuer, TokenVerifier};
