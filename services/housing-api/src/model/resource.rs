//! Educational resources.
use crate::model::RecordId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Document,
    Video,
    Guide,
    Template,
}

impl ResourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceKind::Document => "document",
            ResourceKind::Video => "video",
            ResourceKind::Guide => "guide",
            ResourceKind::Template => "template",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "document" => Some(ResourceKind::Document),
            "video" => Some(ResourceKind::Video),
            "guide" => Some(ResourceKind::Guide),
            "template" => Some(ResourceKind::Template),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq)]
pub struct Resource {
    pub id: RecordId,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: ResourceKind,
    pub url: String,
    pub language: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema, Clone)]
pub struct ResourceWrite {
    pub title: String,
    #[serde(rename = "type")]
    pub kind: ResourceKind,
    pub url: String,
    pub language: String,
}

#[derive(Debug, Deserialize, ToSchema, Clone, Default)]
pub struct ResourcePatch {
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<ResourceKind>,
    pub url: Option<String>,
    pub language: Option<String>,
}

impl From<ResourceWrite> for ResourcePatch {
    fn from(write: ResourceWrite) -> Self {
        Self {
            title: Some(write.title),
            kind: Some(write.kind),
            url: Some(write.url),
            language: Some(write.language),
        }
    }
}

pub type NewResource = ResourceWrite;
