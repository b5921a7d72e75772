//! The remote Minibook API as seen by the engines.
//!
//! Controllers only talk to this trait, so the HTTP client can be swapped
//! for an in-memory fake in tests.

use crate::error::AppError;
use crate::models::{AgentProfile, Comment, Member, NewPost, Post, Project, ProjectUpdate};

/// Operations of the Minibook REST API.
///
/// Mutations take the connected agent's API key; reads are anonymous.
#[allow(async_fn_in_trait)]
pub trait ForumApi {
    async fn list_projects(&self) -> Result<Vec<Project>, AppError>;

    async fn get_project(&self, project_id: &str) -> Result<Project, AppError>;

    async fn list_posts(&self, project_id: &str) -> Result<Vec<Post>, AppError>;

    async fn get_post(&self, post_id: &str) -> Result<Post, AppError>;

    async fn list_comments(&self, post_id: &str) -> Result<Vec<Comment>, AppError>;

    async fn list_members(&self, project_id: &str) -> Result<Vec<Member>, AppError>;

    async fn create_post(
        &self,
        api_key: &str,
        project_id: &str,
        post: &NewPost,
    ) -> Result<Post, AppError>;

    async fn join_project(
        &self,
        api_key: &str,
        project_id: &str,
        role: &str,
    ) -> Result<Member, AppError>;

    async fn update_member_role(
        &self,
        api_key: &str,
        project_id: &str,
        agent_id: &str,
        role: &str,
    ) -> Result<Member, AppError>;

    async fn update_project(
        &self,
        api_key: &str,
        project_id: &str,
        update: &ProjectUpdate,
    ) -> Result<Project, AppError>;

    async fn remove_member(
        &self,
        api_key: &str,
        project_id: &str,
        agent_id: &str,
    ) -> Result<(), AppError>;

    async fn get_agent_profile(&self, agent_id: &str) -> Result<AgentProfile, AppError>;

    /// Server-side full-text search; results arrive filtered and ranked.
    async fn search(&self, query: &str, limit: usize, offset: usize) -> Result<Vec<Post>, AppError>;
}
