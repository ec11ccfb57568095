//! Support tickets.
use crate::model::{RecordId, UserId};
use chrono::{DateTime, Utc};
use housing_authz::{Owned, RecordOwners};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    #[default]
    New,
    InProgress,
    Resolved,
    Closed,
}

impl TicketStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TicketStatus::New => "new",
            TicketStatus::InProgress => "in_progress",
            TicketStatus::Resolved => "resolved",
            TicketStatus::Closed => "closed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "new" => Some(TicketStatus::New),
            "in_progress" => Some(TicketStatus::InProgress),
            "resolved" => Some(TicketStatus::Resolved),
            "closed" => Some(TicketStatus::Closed),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq)]
pub struct SupportTicket {
    pub id: RecordId,
    /// Set from the creating actor; never client supplied.
    pub user: UserId,
    pub title: String,
    pub description: String,
    pub status: TicketStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Owned for SupportTicket {
    fn owners(&self) -> RecordOwners {
        RecordOwners {
            user: Some(self.user),
            ..RecordOwners::default()
        }
    }
}

/// Body for `POST` and `PUT`. Status transitions are unconstrained.
#[derive(Debug, Deserialize, ToSchema, Clone)]
pub struct SupportTicketWrite {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub status: TicketStatus,
}

#[derive(Debug, Deserialize, ToSchema, Clone, Default)]
pub struct SupportTicketPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TicketStatus>,
}

impl From<SupportTicketWrite> for SupportTicketPatch {
    fn from(write: SupportTicketWrite) -> Self {
        Self {
            title: Some(write.title),
            description: Some(write.description),
            status: Some(write.status),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewSupportTicket {
    pub user: UserId,
    pub title: String,
    pub description: String,
    pub status: TicketStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_defaults_to_new() {
        let write: SupportTicketWrite =
            serde_json::from_str(r#"{"title":"Leak","description":"Kitchen sink"}"#)
                .expect("write");
        assert_eq!(write.status, TicketStatus::New);
    }

    #[test]
    fn status_strings_roundtrip() {
        for status in [
            TicketStatus::New,
            TicketStatus::InProgress,
            TicketStatus::Resolved,
            TicketStatus::Closed,
        ] {
            assert_eq!(TicketStatus::parse(status.as_str()), Some(status));
            let json = serde_json::to_string(&status).expect("json");
            assert_eq!(json, format!("\"{}\"", status.as_str()));
        }
        assert_eq!(TicketStatus::parse("reopened"), None);
    }
}
