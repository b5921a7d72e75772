//! In-memory Minibook server for controller tests.

use crate::error::AppError;
use crate::models::{
    Agent, AgentProfile, Comment, Member, NewPost, Post, PostStatus, PostType, Project, ProjectUpdate,
};
use crate::services::forum_api::ForumApi;
use crate::services::view_scope::ViewScope;
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

pub const VALID_KEY: &str = "mb_test_key";

pub fn at(minute: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 2, 2, 10, 0, 0).unwrap() + Duration::minutes(minute)
}

pub fn project(id: &str, name: &str, lead: Option<&str>) -> Project {
    Project {
        id: id.to_string(),
        name: name.to_string(),
        description: String::new(),
        primary_lead_agent_id: lead.map(String::from),
        primary_lead_name: None,
        created_at: at(0),
    }
}

pub fn post(id: &str, project_id: &str, minute: i64, status: PostStatus, tags: &[&str]) -> Post {
    Post {
        id: id.to_string(),
        project_id: project_id.to_string(),
        author_id: "a1".to_string(),
        author_name: "alice".to_string(),
        title: format!("Post {}", id),
        content: String::new(),
        post_type: PostType::Discussion,
        status,
        tags: tags.iter().map(|t| t.to_string()).collect(),
        mentions: Vec::new(),
        pinned: false,
        pin_order: None,
        github_ref: None,
        comment_count: 0,
        created_at: at(minute),
        updated_at: at(minute),
    }
}

pub fn comment(id: &str, post_id: &str, parent: Option<&str>, content: &str) -> Comment {
    Comment {
        id: id.to_string(),
        post_id: post_id.to_string(),
        parent_id: parent.map(String::from),
        author_id: "a2".to_string(),
        author_name: "bob".to_string(),
        content: content.to_string(),
        mentions: Vec::new(),
        created_at: at(1),
    }
}

pub fn member(agent_id: &str, role: &str) -> Member {
    Member {
        agent_id: agent_id.to_string(),
        agent_name: format!("agent-{}", agent_id),
        role: role.to_string(),
        joined_at: at(0),
        last_seen: None,
        online: None,
    }
}

pub fn agent_profile(id: &str, name: &str) -> AgentProfile {
    AgentProfile {
        agent: Agent {
            id: id.to_string(),
            name: name.to_string(),
            created_at: at(0),
            last_seen: None,
            online: false,
        },
        memberships: Vec::new(),
        recent_posts: Vec::new(),
        recent_comments: Vec::new(),
    }
}

#[derive(Default)]
pub struct FakeApi {
    pub projects: Mutex<Vec<Project>>,
    pub posts: Mutex<Vec<Post>>,
    pub comments: Mutex<Vec<Comment>>,
    pub members: Mutex<Vec<Member>>,
    pub profiles: Mutex<Vec<AgentProfile>>,
    /// Operations answering with a network error.
    pub failing: Mutex<HashSet<&'static str>>,
    /// Every call, in order, with its arguments.
    pub calls: Mutex<Vec<String>>,
    /// Closed on every call to simulate the view going away mid-request.
    pub close_on_call: Mutex<Option<ViewScope>>,
    /// Operations that suspend after being recorded until their gate opens.
    pub held: Mutex<HashMap<&'static str, Arc<Notify>>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_projects(self, projects: Vec<Project>) -> Self {
        *self.projects.lock().unwrap() = projects;
        self
    }

    pub fn with_posts(self, posts: Vec<Post>) -> Self {
        *self.posts.lock().unwrap() = posts;
        self
    }

    pub fn with_comments(self, comments: Vec<Comment>) -> Self {
        *self.comments.lock().unwrap() = comments;
        self
    }

    pub fn with_members(self, members: Vec<Member>) -> Self {
        *self.members.lock().unwrap() = members;
        self
    }

    pub fn with_profiles(self, profiles: Vec<AgentProfile>) -> Self {
        *self.profiles.lock().unwrap() = profiles;
        self
    }

    pub fn fail(&self, op: &'static str) {
        self.failing.lock().unwrap().insert(op);
    }

    pub fn close_scope_on_call(&self, scope: &ViewScope) {
        *self.close_on_call.lock().unwrap() = Some(scope.clone());
    }

    /// Suspend every later call of `op` until the returned gate is notified
    /// (one permit per call).
    pub fn hold(&self, op: &'static str) -> Arc<Notify> {
        self.held
            .lock()
            .unwrap()
            .entry(op)
            .or_insert_with(|| Arc::new(Notify::new()))
            .clone()
    }

    async fn pass(&self, op: &'static str) {
        let gate = self.held.lock().unwrap().get(op).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn mutation_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| {
                ["create_post", "join_project", "update_member_role", "update_project", "remove_member"]
                    .iter()
                    .any(|op| c.starts_with(op))
            })
            .count()
    }

    fn record(&self, op: &'static str, args: &str) -> Result<(), AppError> {
        self.calls.lock().unwrap().push(format!("{}({})", op, args));
        if let Some(scope) = self.close_on_call.lock().unwrap().as_ref() {
            scope.close();
        }
        if self.failing.lock().unwrap().contains(op) {
            return Err(AppError::network(format!("{} unavailable", op)));
        }
        Ok(())
    }

    fn check_key(api_key: &str) -> Result<(), AppError> {
        if api_key == VALID_KEY {
            Ok(())
        } else {
            Err(AppError::authentication_expired("Agent API key rejected"))
        }
    }

    fn missing(what: &str) -> AppError {
        AppError::api_full(format!("{} not found", what), 404, what)
    }
}

impl ForumApi for FakeApi {
    async fn list_projects(&self) -> Result<Vec<Project>, AppError> {
        self.record("list_projects", "")?;
        Ok(self.projects.lock().unwrap().clone())
    }

    async fn get_project(&self, project_id: &str) -> Result<Project, AppError> {
        self.record("get_project", project_id)?;
        self.projects
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == project_id)
            .cloned()
            .ok_or_else(|| Self::missing("Project"))
    }

    async fn list_posts(&self, project_id: &str) -> Result<Vec<Post>, AppError> {
        self.record("list_posts", project_id)?;
        Ok(self
            .posts
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.project_id == project_id)
            .cloned()
            .collect())
    }

    async fn get_post(&self, post_id: &str) -> Result<Post, AppError> {
        self.record("get_post", post_id)?;
        self.posts
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == post_id)
            .cloned()
            .ok_or_else(|| Self::missing("Post"))
    }

    async fn list_comments(&self, post_id: &str) -> Result<Vec<Comment>, AppError> {
        self.record("list_comments", post_id)?;
        Ok(self
            .comments
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect())
    }

    async fn list_members(&self, project_id: &str) -> Result<Vec<Member>, AppError> {
        self.record("list_members", project_id)?;
        Ok(self.members.lock().unwrap().clone())
    }

    async fn create_post(
        &self,
        api_key: &str,
        project_id: &str,
        draft: &NewPost,
    ) -> Result<Post, AppError> {
        self.record("create_post", project_id)?;
        Self::check_key(api_key)?;
        let mut posts = self.posts.lock().unwrap();
        let mut created = post(&format!("new-{}", posts.len()), project_id, 90, PostStatus::Open, &[]);
        created.title = draft.title.clone();
        created.content = draft.content.clone();
        created.post_type = draft.post_type;
        created.tags = draft.tags.clone();
        posts.push(created.clone());
        Ok(created)
    }

    async fn join_project(
        &self,
        api_key: &str,
        project_id: &str,
        role: &str,
    ) -> Result<Member, AppError> {
        self.record("join_project", &format!("{}, {}", project_id, role))?;
        Self::check_key(api_key)?;
        let joined = member("me", role);
        self.members.lock().unwrap().push(joined.clone());
        Ok(joined)
    }

    async fn update_member_role(
        &self,
        api_key: &str,
        project_id: &str,
        agent_id: &str,
        role: &str,
    ) -> Result<Member, AppError> {
        self.record("update_member_role", &format!("{}, {}, {}", project_id, agent_id, role))?;
        self.pass("update_member_role").await;
        Self::check_key(api_key)?;
        let mut members = self.members.lock().unwrap();
        let target = members
            .iter_mut()
            .find(|m| m.agent_id == agent_id)
            .ok_or_else(|| Self::missing("Member"))?;
        target.role = role.to_string();
        Ok(target.clone())
    }

    async fn update_project(
        &self,
        api_key: &str,
        project_id: &str,
        update: &ProjectUpdate,
    ) -> Result<Project, AppError> {
        let lead = update.primary_lead_agent_id.as_deref().unwrap_or("none");
        self.record("update_project", &format!("{}, {}", project_id, lead))?;
        self.pass("update_project").await;
        Self::check_key(api_key)?;
        let mut projects = self.projects.lock().unwrap();
        let target = projects
            .iter_mut()
            .find(|p| p.id == project_id)
            .ok_or_else(|| Self::missing("Project"))?;
        target.primary_lead_agent_id = update.primary_lead_agent_id.clone();
        Ok(target.clone())
    }

    async fn remove_member(
        &self,
        api_key: &str,
        project_id: &str,
        agent_id: &str,
    ) -> Result<(), AppError> {
        self.record("remove_member", &format!("{}, {}", project_id, agent_id))?;
        self.pass("remove_member").await;
        Self::check_key(api_key)?;
        let mut members = self.members.lock().unwrap();
        let before = members.len();
        members.retain(|m| m.agent_id != agent_id);
        if members.len() == before {
            return Err(Self::missing("Member"));
        }
        Ok(())
    }

    async fn get_agent_profile(&self, agent_id: &str) -> Result<AgentProfile, AppError> {
        self.record("get_agent_profile", agent_id)?;
        self.profiles
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.agent.id == agent_id)
            .cloned()
            .ok_or_else(|| Self::missing("Agent"))
    }

    async fn search(&self, query: &str, limit: usize, offset: usize) -> Result<Vec<Post>, AppError> {
        self.record("search", &format!("{}, {}, {}", query, limit, offset))?;
        let needle = query.to_lowercase();
        Ok(self
            .posts
            .lock()
            .unwrap()
            .iter()
            .filter(|p| {
                p.title.to_lowercase().contains(&needle) || p.content.to_lowercase().contains(&needle)
            })
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }
}
