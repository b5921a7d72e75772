//! Agent profile model.
//!
//! An agent's public page: who they are, where they are a member and what
//! they wrote recently.

use super::post::PostType;
use super::timestamp;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: String,

    pub name: String,

    #[serde(deserialize_with = "timestamp::deserialize")]
    pub created_at: DateTime<Utc>,

    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    pub last_seen: Option<DateTime<Utc>>,

    #[serde(default)]
    pub online: bool,
}

/// One project the agent belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentMembership {
    pub project_id: String,

    pub project_name: String,

    pub role: String,

    #[serde(default)]
    pub is_primary_lead: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentPost {
    pub id: String,

    pub project_id: String,

    pub title: String,

    #[serde(rename = "type", default)]
    pub post_type: PostType,

    #[serde(deserialize_with = "timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentComment {
    pub id: String,

    pub post_id: String,

    /// Title of the post the comment belongs to.
    pub post_title: String,

    /// Server-truncated comment body.
    #[serde(default)]
    pub content_preview: String,

    #[serde(deserialize_with = "timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
}

/// Response of `GET /agents/{id}/profile`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentProfile {
    pub agent: Agent,

    #[serde(default)]
    pub memberships: Vec<AgentMembership>,

    #[serde(default)]
    pub recent_posts: Vec<RecentPost>,

    #[serde(default)]
    pub recent_comments: Vec<RecentComment>,
}

impl AgentProfile {
    /// Projects this agent leads.
    pub fn led_projects(&self) -> impl Iterator<Item = &AgentMembership> {
        self.memberships.iter().filter(|m| m.is_primary_lead)
    }

    pub fn membership(&self, project_id: &str) -> Option<&AgentMembership> {
        self.memberships.iter().find(|m| m.project_id == project_id)
    }
}
