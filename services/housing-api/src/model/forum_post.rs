//! Forum posts and nested reply threads.
use crate::model::{RecordId, UserId, double_option};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq)]
pub struct ForumPost {
    pub id: RecordId,
    /// Set from the creating actor; never client supplied.
    pub user: UserId,
    pub title: String,
    pub content: String,
    pub parent_post: Option<RecordId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A post with its replies attached, newest first at every level.
///
/// `truncated` marks a node whose replies exist but were not expanded, either
/// because the depth cap was reached or because the reply chain loops back
/// on itself.
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq)]
pub struct ForumThread {
    #[serde(flatten)]
    pub post: ForumPost,
    pub replies: Vec<ForumThread>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub truncated: bool,
}

#[derive(Debug, Deserialize, ToSchema, Clone)]
pub struct ForumPostWrite {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub parent_post: Option<RecordId>,
}

#[derive(Debug, Deserialize, ToSchema, Clone, Default)]
pub struct ForumPostPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    /// Absent leaves the parent untouched; `null` detaches the post.
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<i64>)]
    pub parent_post: Option<Option<RecordId>>,
}

impl From<ForumPostWrite> for ForumPostPatch {
    fn from(write: ForumPostWrite) -> Self {
        Self {
            title: Some(write.title),
            content: Some(write.content),
            parent_post: Some(write.parent_post),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewForumPost {
    pub user: UserId,
    pub title: String,
    pub content: String,
    pub parent_post: Option<RecordId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_distinguishes_absent_and_null_parent() {
        let absent: ForumPostPatch = serde_json::from_str(r#"{"title":"t"}"#).expect("absent");
        assert_eq!(absent.parent_post, None);
        let null: ForumPostPatch = serde_json::from_str(r#"{"parent_post":null}"#).expect("null");
        assert_eq!(null.parent_post, Some(None));
        let set: ForumPostPatch = serde_json::from_str(r#"{"parent_post":4}"#).expect("set");
        assert_eq!(set.parent_post, Some(Some(4)));
    }

    #[test]
    fn thread_flattens_post_fields() {
        let now = Utc::now();
        let thread = ForumThread {
            post: ForumPost {
                id: 1,
                user: 2,
                title: "Welcome".to_string(),
                content: "Hi".to_string(),
                parent_post: None,
                created_at: now,
                updated_at: now,
            },
            replies: Vec::new(),
            truncated: false,
        };
        let json = serde_json::to_value(&thread).expect("json");
        assert_eq!(json["id"], 1);
        assert_eq!(json["replies"], serde_json::json!([]));
        assert!(json.get("truncated").is_none());
    }
}
