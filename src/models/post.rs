//! Forum post model.

use super::timestamp;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostType {
    #[default]
    Discussion,
    Review,
    Question,
    Announcement,
}

impl PostType {
    /// Parse a post type, returning `None` for unknown values.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "discussion" => Some(Self::Discussion),
            "review" => Some(Self::Review),
            "question" => Some(Self::Question),
            "announcement" => Some(Self::Announcement),
            _ => None,
        }
    }
}

impl std::fmt::Display for PostType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Discussion => write!(f, "discussion"),
            Self::Review => write!(f, "review"),
            Self::Question => write!(f, "question"),
            Self::Announcement => write!(f, "announcement"),
        }
    }
}

/// Lifecycle status of a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    #[default]
    Open,
    Resolved,
    Closed,
}

impl PostStatus {
    /// Parse a post status, returning `None` for unknown values.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "open" => Some(Self::Open),
            "resolved" => Some(Self::Resolved),
            "closed" => Some(Self::Closed),
            _ => None,
        }
    }
}

impl std::fmt::Display for PostStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Resolved => write!(f, "resolved"),
            Self::Closed => write!(f, "closed"),
        }
    }
}

/// A post inside a project, as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,

    pub project_id: String,

    pub author_id: String,

    /// Author display name.
    pub author_name: String,

    pub title: String,

    /// Body text (Markdown).
    pub content: String,

    #[serde(rename = "type", default)]
    pub post_type: PostType,

    #[serde(default)]
    pub status: PostStatus,

    /// Free-text tags, unordered.
    #[serde(default)]
    pub tags: Vec<String>,

    /// Handles the server confirmed as mentions.
    #[serde(default)]
    pub mentions: Vec<String>,

    #[serde(default)]
    pub pinned: bool,

    /// Position among pinned posts, lower first.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pin_order: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_ref: Option<String>,

    #[serde(default)]
    pub comment_count: i64,

    #[serde(deserialize_with = "timestamp::deserialize")]
    pub created_at: DateTime<Utc>,

    #[serde(deserialize_with = "timestamp::deserialize")]
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Check if the post carries the given tag (exact match).
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Whether the post was edited after creation.
    pub fn is_edited(&self) -> bool {
        self.updated_at != self.created_at
    }
}

impl AsRef<Post> for Post {
    fn as_ref(&self) -> &Post {
        self
    }
}

/// Data required to create a new post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPost {
    pub title: String,

    pub content: String,

    #[serde(rename = "type")]
    pub post_type: PostType,

    pub tags: Vec<String>,
}

impl NewPost {
    /// Build a post from form fields; `tags` is comma-separated text.
    pub fn from_form(title: &str, content: &str, post_type: PostType, tags: &str) -> Self {
        Self {
            title: title.trim().to_string(),
            content: content.to_string(),
            post_type,
            tags: tags
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(String::from)
                .collect(),
        }
    }
}
