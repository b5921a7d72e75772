//! Mock Minibook server for integration tests.
//!
//! Serves a small in-memory forum over the `/api/v1` routes the client uses,
//! on a random local port.

#![allow(dead_code)]

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{self, get, patch};
use axum::{Json, Router};
use minibook_lib::services::{ClientConfig, MinibookClient};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub const VALID_KEY: &str = "mb_valid_key";

type Reply = Result<Json<Value>, (StatusCode, Json<Value>)>;

#[derive(Default)]
pub struct Forum {
    pub projects: Vec<Value>,
    pub posts: Vec<Value>,
    pub comments: Vec<Value>,
    pub members: Vec<Value>,
    pub profiles: Vec<Value>,
    pub search_params: Vec<HashMap<String, String>>,
}

#[derive(Clone, Default)]
pub struct MockServer {
    pub forum: Arc<Mutex<Forum>>,
}

fn reject(status: StatusCode, detail: &str) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "detail": detail })))
}

fn authorize(headers: &HeaderMap) -> Result<(), (StatusCode, Json<Value>)> {
    let expected = format!("Bearer {}", VALID_KEY);
    match headers.get("authorization").and_then(|v| v.to_str().ok()) {
        Some(value) if value == expected => Ok(()),
        _ => Err(reject(StatusCode::UNAUTHORIZED, "Invalid API key")),
    }
}

pub fn project(id: &str, name: &str, lead: Option<&str>) -> Value {
    json!({
        "id": id,
        "name": name,
        "description": "",
        "primary_lead_agent_id": lead,
        "primary_lead_name": lead.map(|l| format!("agent-{}", l)),
        "created_at": "2026-01-01T00:00:00"
    })
}

pub fn post(id: &str, project_id: &str, minute: u32, status: &str, tags: &[&str]) -> Value {
    json!({
        "id": id,
        "project_id": project_id,
        "author_id": "a1",
        "author_name": "alice",
        "title": format!("Post {}", id),
        "content": format!("Body of {} for @alice", id),
        "type": "discussion",
        "status": status,
        "tags": tags,
        "mentions": ["alice"],
        "pinned": false,
        "comment_count": 0,
        "created_at": format!("2026-02-02T10:{:02}:00", minute),
        "updated_at": format!("2026-02-02T10:{:02}:00", minute)
    })
}

pub fn comment(id: &str, post_id: &str, parent: Option<&str>) -> Value {
    json!({
        "id": id,
        "post_id": post_id,
        "parent_id": parent,
        "author_id": "a2",
        "author_name": "bob",
        "content": format!("comment {}", id),
        "mentions": [],
        "created_at": "2026-02-02T11:00:00"
    })
}

pub fn member(agent_id: &str, role: &str) -> Value {
    json!({
        "agent_id": agent_id,
        "agent_name": format!("agent-{}", agent_id),
        "role": role,
        "joined_at": "2026-01-01T00:00:00",
        "last_seen": "2026-02-02T09:00:00Z",
        "online": true
    })
}

pub fn profile(agent_id: &str, memberships: Value) -> Value {
    json!({
        "agent": {
            "id": agent_id,
            "name": format!("agent-{}", agent_id),
            "created_at": "2026-01-01T00:00:00",
            "last_seen": "2026-02-02T09:00:00",
            "online": true
        },
        "memberships": memberships,
        "recent_posts": [
            {"id": "post-1", "project_id": "p1", "title": "Post post-1", "type": "discussion",
             "created_at": "2026-02-02T10:10:00"},
            {"id": "post-2", "project_id": "p1", "title": "Post post-2", "type": "review",
             "created_at": "2026-02-02T10:20:00"}
        ],
        "recent_comments": [
            {"id": "c1", "post_id": "post-1", "post_title": "Post post-1",
             "content_preview": "comment c1", "created_at": "2026-02-02T11:00:00"}
        ]
    })
}

impl MockServer {
    /// One project `p1` led by `a1`, three members and a few posts.
    pub fn seeded() -> Self {
        let server = Self::default();
        {
            let mut forum = server.forum.lock().unwrap();
            forum.projects = vec![project("p1", "minibook", Some("a1")), project("p2", "infra", None)];
            forum.members = vec![member("a1", "Lead"), member("a2", "Developer"), member("a3", "Tester")];
            forum.posts = vec![
                post("post-1", "p1", 10, "open", &["rust"]),
                post("post-2", "p1", 20, "resolved", &["rust", "ci"]),
                post("post-3", "p2", 30, "open", &[]),
            ];
            forum.comments = vec![
                comment("c1", "post-1", None),
                comment("c2", "post-1", Some("c1")),
                comment("c3", "post-1", Some("deleted")),
            ];
            forum.profiles = vec![profile(
                "a1",
                json!([
                    {"project_id": "p1", "project_name": "minibook", "role": "Lead", "is_primary_lead": true}
                ]),
            )];
        }
        server
    }

    /// Serve on a random port and return a client pointed at it.
    pub async fn start(&self) -> MinibookClient {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = router(self.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        MinibookClient::new(ClientConfig {
            base_url: format!("http://{}", addr),
            timeout_secs: 5,
        })
        .unwrap()
    }

    pub fn member_role(&self, agent_id: &str) -> Option<String> {
        let forum = self.forum.lock().unwrap();
        forum
            .members
            .iter()
            .find(|m| m["agent_id"] == agent_id)
            .map(|m| m["role"].as_str().unwrap_or_default().to_string())
    }
}

fn router(server: MockServer) -> Router {
    Router::new()
        .route("/api/v1/projects", get(list_projects))
        .route("/api/v1/projects/{id}", get(get_project).patch(update_project))
        .route("/api/v1/projects/{id}/posts", get(list_posts).post(create_post))
        .route("/api/v1/projects/{id}/join", routing::post(join_project))
        .route("/api/v1/projects/{id}/members", get(list_members))
        .route(
            "/api/v1/projects/{id}/members/{agent_id}",
            patch(update_member).delete(remove_member),
        )
        .route("/api/v1/posts/{id}", get(get_post))
        .route("/api/v1/posts/{id}/comments", get(list_comments))
        .route("/api/v1/agents/{id}/profile", get(get_agent_profile))
        .route("/api/v1/search", get(search))
        .with_state(server)
}

async fn list_projects(State(server): State<MockServer>) -> Reply {
    let projects = server.forum.lock().unwrap().projects.clone();
    Ok(Json(Value::from(projects)))
}

async fn get_project(State(server): State<MockServer>, Path(id): Path<String>) -> Reply {
    let forum = server.forum.lock().unwrap();
    forum
        .projects
        .iter()
        .find(|p| p["id"] == id.as_str())
        .cloned()
        .map(Json)
        .ok_or_else(|| reject(StatusCode::NOT_FOUND, "Project not found"))
}

async fn update_project(
    State(server): State<MockServer>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Reply {
    authorize(&headers)?;
    let mut forum = server.forum.lock().unwrap();
    let lead = body["primary_lead_agent_id"].clone();
    if let Some(agent) = lead.as_str() {
        if !forum.members.iter().any(|m| m["agent_id"] == agent) {
            return Err(reject(StatusCode::BAD_REQUEST, "Primary lead must be a member"));
        }
    }
    let project = forum
        .projects
        .iter_mut()
        .find(|p| p["id"] == id.as_str())
        .ok_or_else(|| reject(StatusCode::NOT_FOUND, "Project not found"))?;
    project["primary_lead_agent_id"] = lead.clone();
    project["primary_lead_name"] = lead
        .as_str()
        .map(|l| Value::from(format!("agent-{}", l)))
        .unwrap_or(Value::Null);
    Ok(Json(project.clone()))
}

async fn list_posts(State(server): State<MockServer>, Path(id): Path<String>) -> Reply {
    let forum = server.forum.lock().unwrap();
    let posts: Vec<Value> = forum
        .posts
        .iter()
        .filter(|p| p["project_id"] == id.as_str())
        .cloned()
        .collect();
    Ok(Json(Value::from(posts)))
}

async fn create_post(
    State(server): State<MockServer>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Reply {
    authorize(&headers)?;
    let mut forum = server.forum.lock().unwrap();
    let mut created = post(&format!("post-{}", forum.posts.len() + 1), &id, 50, "open", &[]);
    created["title"] = body["title"].clone();
    created["content"] = body["content"].clone();
    created["type"] = body["type"].clone();
    created["tags"] = body["tags"].clone();
    created["mentions"] = json!([]);
    forum.posts.push(created.clone());
    Ok(Json(created))
}

async fn join_project(
    State(server): State<MockServer>,
    Path(_id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Reply {
    authorize(&headers)?;
    let role = body["role"].as_str().unwrap_or("member");
    let joined = member("me", role);
    server.forum.lock().unwrap().members.push(joined.clone());
    Ok(Json(joined))
}

async fn list_members(State(server): State<MockServer>, Path(_id): Path<String>) -> Reply {
    let members = server.forum.lock().unwrap().members.clone();
    Ok(Json(Value::from(members)))
}

async fn update_member(
    State(server): State<MockServer>,
    Path((_id, agent_id)): Path<(String, String)>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Reply {
    authorize(&headers)?;
    let mut forum = server.forum.lock().unwrap();
    let target = forum
        .members
        .iter_mut()
        .find(|m| m["agent_id"] == agent_id.as_str())
        .ok_or_else(|| reject(StatusCode::NOT_FOUND, "Member not found"))?;
    target["role"] = body["role"].clone();
    Ok(Json(target.clone()))
}

async fn remove_member(
    State(server): State<MockServer>,
    Path((id, agent_id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<StatusCode, (StatusCode, Json<Value>)> {
    authorize(&headers)?;
    let mut forum = server.forum.lock().unwrap();
    let is_lead = forum
        .projects
        .iter()
        .any(|p| p["id"] == id.as_str() && p["primary_lead_agent_id"] == agent_id.as_str());
    if is_lead {
        return Err(reject(StatusCode::BAD_REQUEST, "Cannot remove the primary lead"));
    }
    let before = forum.members.len();
    forum.members.retain(|m| m["agent_id"] != agent_id.as_str());
    if forum.members.len() == before {
        return Err(reject(StatusCode::NOT_FOUND, "Member not found"));
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn get_post(State(server): State<MockServer>, Path(id): Path<String>) -> Reply {
    let forum = server.forum.lock().unwrap();
    forum
        .posts
        .iter()
        .find(|p| p["id"] == id.as_str())
        .cloned()
        .map(Json)
        .ok_or_else(|| reject(StatusCode::NOT_FOUND, "Post not found"))
}

async fn list_comments(State(server): State<MockServer>, Path(id): Path<String>) -> Reply {
    let forum = server.forum.lock().unwrap();
    let comments: Vec<Value> = forum
        .comments
        .iter()
        .filter(|c| c["post_id"] == id.as_str())
        .cloned()
        .collect();
    Ok(Json(Value::from(comments)))
}

async fn get_agent_profile(State(server): State<MockServer>, Path(id): Path<String>) -> Reply {
    let forum = server.forum.lock().unwrap();
    forum
        .profiles
        .iter()
        .find(|p| p["agent"]["id"] == id.as_str())
        .cloned()
        .map(Json)
        .ok_or_else(|| reject(StatusCode::NOT_FOUND, "Agent not found"))
}

async fn search(
    State(server): State<MockServer>,
    Query(params): Query<HashMap<String, String>>,
) -> Reply {
    let mut forum = server.forum.lock().unwrap();
    forum.search_params.push(params.clone());

    let needle = params.get("q").cloned().unwrap_or_default().to_lowercase();
    let limit: usize = params.get("limit").and_then(|v| v.parse().ok()).unwrap_or(20);
    let offset: usize = params.get("offset").and_then(|v| v.parse().ok()).unwrap_or(0);

    let hits: Vec<Value> = forum
        .posts
        .iter()
        .filter(|p| {
            p["title"]
                .as_str()
                .unwrap_or_default()
                .to_lowercase()
                .contains(&needle)
        })
        .skip(offset)
        .take(limit)
        .cloned()
        .collect();
    Ok(Json(Value::from(hits)))
}
