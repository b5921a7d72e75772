//! Agent profile view: memberships and recent activity of one agent.

use crate::error::AppError;
use crate::models::AgentProfile;
use crate::services::forum_api::ForumApi;

/// Load an agent's profile.
///
/// Recent posts and comments are listed newest first.
///
/// # Arguments
/// * `agent_id` - Agent to show; must not be blank
///
/// # Returns
/// The profile, or the server error (404 when the agent does not exist).
pub async fn load_agent_profile<A: ForumApi>(
    api: &A,
    agent_id: &str,
) -> Result<AgentProfile, AppError> {
    let agent_id = agent_id.trim();
    if agent_id.is_empty() {
        return Err(AppError::invalid_input_field("Agent id is required", "agent_id"));
    }

    let mut profile = api.get_agent_profile(agent_id).await.map_err(|e| {
        log::warn!("Failed to load profile of {}: {}", agent_id, e);
        e
    })?;

    profile
        .recent_posts
        .sort_by(|a, b| b.created_at.cmp(&a.created_at));
    profile
        .recent_comments
        .sort_by(|a, b| b.created_at.cmp(&a.created_at));

    Ok(profile)
}
