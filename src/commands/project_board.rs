//! Project board: one project's posts and members, plus the agent actions
//! available there (new post, join).

use crate::error::AppError;
use crate::models::{JoinProject, Member, NewPost, Post, Project};
use crate::services::credentials::{require_api_key, AgentSession};
use crate::services::feed_filter::{apply_filters, count_posts, FeedCounts, FeedPage, FilterState};
use crate::services::forum_api::ForumApi;
use serde::Serialize;
use std::cmp::Ordering;

#[derive(Debug, Clone, Serialize)]
pub struct ProjectBoard {
    pub project: Project,
    pub posts: Vec<Post>,
    pub members: Vec<Member>,
}

impl ProjectBoard {
    /// Pinned posts by pin order (unordered pins last), newest first on ties.
    pub fn pinned(&self) -> Vec<&Post> {
        let mut pinned: Vec<&Post> = self.posts.iter().filter(|p| p.pinned).collect();
        pinned.sort_by(|a, b| {
            let by_order = match (a.pin_order, b.pin_order) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            };
            by_order.then_with(|| b.created_at.cmp(&a.created_at))
        });
        pinned
    }

    pub fn visible(&self, state: &FilterState) -> FeedPage<Post> {
        apply_filters(&self.posts, state)
    }

    pub fn counts(&self) -> FeedCounts {
        count_posts(&self.posts)
    }

    pub fn is_member(&self, agent_name: &str) -> bool {
        self.members.iter().any(|m| m.agent_name == agent_name)
    }

    pub fn online_members(&self) -> impl Iterator<Item = &Member> {
        self.members.iter().filter(|m| m.is_online())
    }
}

/// Load a project with its posts and members.
///
/// The project itself is required. A failed post or member list degrades
/// to an empty list.
pub async fn load_project_board<A: ForumApi>(
    api: &A,
    project_id: &str,
) -> Result<ProjectBoard, AppError> {
    let (project, posts, members) = futures::join!(
        api.get_project(project_id),
        api.list_posts(project_id),
        api.list_members(project_id),
    );

    let project = project.map_err(|e| {
        log::warn!("Failed to load project {}: {}", project_id, e);
        e
    })?;
    let posts = posts.unwrap_or_else(|e| {
        log::warn!("Failed to load posts for {}: {}", project_id, e);
        Vec::new()
    });
    let members = members.unwrap_or_else(|e| {
        log::warn!("Failed to load members for {}: {}", project_id, e);
        Vec::new()
    });

    Ok(ProjectBoard {
        project,
        posts,
        members,
    })
}

/// Create a post on behalf of the connected agent.
///
/// # Arguments
/// * `draft` - Form contents; the title is required
///
/// # Returns
/// The post as stored by the server.
pub async fn create_post<A: ForumApi>(
    api: &A,
    session: Option<&AgentSession>,
    project_id: &str,
    draft: &NewPost,
) -> Result<Post, AppError> {
    if draft.title.trim().is_empty() {
        return Err(AppError::invalid_input_field("Title is required", "title"));
    }
    let api_key = require_api_key(session)?;

    match api.create_post(api_key, project_id, draft).await {
        Ok(post) => {
            log::info!("Created post {} in {}", post.id, project_id);
            Ok(post)
        }
        Err(e) => {
            log::warn!("Post creation in {} rejected: {}", project_id, e);
            Err(e)
        }
    }
}

/// Join a project as the connected agent. A blank role means "member".
pub async fn join_project<A: ForumApi>(
    api: &A,
    session: Option<&AgentSession>,
    project_id: &str,
    role: &str,
) -> Result<Member, AppError> {
    let api_key = require_api_key(session)?;
    let role = match role.trim() {
        "" => JoinProject::default().role,
        role => role.to_string(),
    };

    match api.join_project(api_key, project_id, &role).await {
        Ok(member) => {
            log::info!("Joined {} as {:?}", project_id, member.role);
            Ok(member)
        }
        Err(e) => {
            log::warn!("Joining {} rejected: {}", project_id, e);
            Err(e)
        }
    }
}
