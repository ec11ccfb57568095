//! Housing data model.
//!
//! # Purpose
//! Re-exports the six record types, their write/patch payloads, and the
//! store-facing insert/update shapes used by the service and store layers.
mod forum_post;
mod money;
mod property;
mod rental_agreement;
mod resource;
mod support_ticket;
mod user;

pub use forum_post::{ForumPost, ForumPostPatch, ForumPostWrite, ForumThread, NewForumPost};
pub use money::RentalPrice;
pub use property::{NewProperty, Property, PropertyPatch, PropertyWrite};
pub use rental_agreement::{
    NewRentalAgreement, RentalAgreement, RentalAgreementPatch, RentalAgreementWrite,
};
pub use resource::{NewResource, Resource, ResourceKind, ResourcePatch, ResourceWrite};
pub use support_ticket::{
    NewSupportTicket, SupportTicket, SupportTicketPatch, SupportTicketWrite, TicketStatus,
};
pub use user::{NewUser, User, UserCredentials, UserPatch, UserUpdate, UserWrite};

pub use housing_authz::{Role, UserId};

pub type RecordId = i64;

/// Distinguishes an absent field (`None`) from an explicit `null`
/// (`Some(None)`) in patch payloads.
pub(crate) fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: serde::Deserialize<'de>,
{
    <Option<T> as serde::Deserialize>::deserialize(deserializer).map(Some)
}
