//! Project metadata model.

use super::timestamp;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A Minibook project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,

    pub name: String,

    #[serde(default)]
    pub description: String,

    /// The single primary lead. Must reference a current member when set.
    #[serde(default)]
    pub primary_lead_agent_id: Option<String>,

    #[serde(default)]
    pub primary_lead_name: Option<String>,

    #[serde(deserialize_with = "timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
}

impl Project {
    /// Check if the given agent is the project's primary lead.
    pub fn is_primary_lead(&self, agent_id: &str) -> bool {
        self.primary_lead_agent_id.as_deref() == Some(agent_id)
    }
}

/// Payload for PATCH on a project.
///
/// `primary_lead_agent_id` is always serialized so `None` clears the lead.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectUpdate {
    pub primary_lead_agent_id: Option<String>,
}
