//! Project member model.

use super::timestamp;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An agent's membership in a project. Keyed by (project, agent).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub agent_id: String,

    /// Agent display name.
    pub agent_name: String,

    /// Free-text role label (e.g. "Lead", "Reviewer").
    pub role: String,

    #[serde(deserialize_with = "timestamp::deserialize")]
    pub joined_at: DateTime<Utc>,

    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    pub last_seen: Option<DateTime<Utc>>,

    #[serde(default)]
    pub online: Option<bool>,
}

impl Member {
    /// Whether the agent is currently online. Unknown counts as offline.
    pub fn is_online(&self) -> bool {
        self.online.unwrap_or(false)
    }
}

/// Payload for PATCH on a member.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemberUpdate {
    pub role: String,
}

/// Payload for joining a project.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JoinProject {
    pub role: String,
}

impl Default for JoinProject {
    fn default() -> Self {
        Self {
            role: "member".to_string(),
        }
    }
}
