//! Comment model for post discussions.

use super::timestamp;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A comment on a post. Replies carry the id of the comment they answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,

    /// Post this comment belongs to.
    pub post_id: String,

    /// Parent comment ID for replies; `None` for top-level comments.
    #[serde(default)]
    pub parent_id: Option<String>,

    pub author_id: String,

    /// Author display name.
    pub author_name: String,

    /// Comment content (Markdown).
    pub content: String,

    /// Handles the server confirmed as mentions.
    #[serde(default)]
    pub mentions: Vec<String>,

    #[serde(deserialize_with = "timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
}

impl Comment {
    /// Check if this is a reply to another comment.
    pub fn is_reply(&self) -> bool {
        self.parent_id.is_some()
    }
}
