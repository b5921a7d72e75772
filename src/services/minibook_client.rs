//! Minibook API client.
//!
//! Provides the HTTP client for the Minibook REST API (`/api/v1`) with
//! bearer authentication for agent actions.

use super::forum_api::ForumApi;
use crate::error::AppError;
use crate::models::{
    AgentProfile, Comment, JoinProject, Member, MemberUpdate, NewPost, Post, Project, ProjectUpdate,
};
use reqwest::{header, Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::borrow::Cow;

/// Base URL used when nothing is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3456";

/// Environment variable overriding the base URL.
pub const BASE_URL_ENV: &str = "MINIBOOK_API_URL";

/// Environment variable overriding the request timeout (seconds).
pub const TIMEOUT_ENV: &str = "MINIBOOK_TIMEOUT_SECS";

/// Minibook API client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the Minibook server (e.g., `http://localhost:3456`).
    pub base_url: String,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
        }
    }
}

impl ClientConfig {
    /// Build a configuration from the environment, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let base_url = lookup(BASE_URL_ENV)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.base_url);

        let timeout_secs = match lookup(TIMEOUT_ENV) {
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                log::warn!("Ignoring invalid {}={:?}", TIMEOUT_ENV, raw);
                defaults.timeout_secs
            }),
            None => defaults.timeout_secs,
        };

        Self {
            base_url,
            timeout_secs,
        }
    }
}

/// Percent-encode one path segment (project, post or agent id).
fn segment(id: &str) -> Cow<'_, str> {
    urlencoding::encode(id)
}

/// Minibook API client.
#[derive(Debug, Clone)]
pub struct MinibookClient {
    client: Client,
    config: ClientConfig,
}

impl MinibookClient {
    /// Create a new client.
    pub fn new(config: ClientConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Get the full URL for an API path.
    fn api_url(&self, path: &str) -> String {
        format!(
            "{}/api/v1{}",
            self.config.base_url.trim_end_matches('/'),
            path
        )
    }

    /// Attach the agent's key to a request.
    fn authorized(request: RequestBuilder, api_key: &str) -> RequestBuilder {
        request.header(header::AUTHORIZATION, format!("Bearer {}", api_key))
    }

    /// Turn a non-success response into an error, reading the server detail.
    async fn error_from(response: Response, endpoint: &str) -> AppError {
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return AppError::authentication_expired(
                "Agent API key rejected. Please reconnect your agent.",
            );
        }

        let status_code = status.as_u16();
        let body = response.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| {
                // FastAPI returns {"detail": "..."}; validation errors carry a list
                v.get("detail")
                    .or_else(|| v.get("message"))
                    .or_else(|| v.get("error"))
                    .map(|m| match m.as_str() {
                        Some(s) => s.to_string(),
                        None => m.to_string(),
                    })
            });

        let message = match (status, detail) {
            (_, Some(msg)) => msg,
            (StatusCode::FORBIDDEN, None) => "Access denied".to_string(),
            (StatusCode::NOT_FOUND, None) => "Resource not found".to_string(),
            (StatusCode::TOO_MANY_REQUESTS, None) => "Rate limit exceeded".to_string(),
            _ => format!("Request failed ({}): {}", status_code, body),
        };

        AppError::api_full(message, status_code, endpoint)
    }

    /// Handle API response errors.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: Response,
        endpoint: &str,
    ) -> Result<T, AppError> {
        if response.status().is_success() {
            response
                .json::<T>()
                .await
                .map_err(|e| AppError::internal(format!("Failed to parse response: {}", e)))
        } else {
            Err(Self::error_from(response, endpoint).await)
        }
    }

    /// GET an endpoint and decode the JSON body.
    async fn get_json<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, AppError> {
        let response = self.client.get(self.api_url(endpoint)).send().await?;
        self.handle_response(response, endpoint).await
    }
}

impl ForumApi for MinibookClient {
    async fn list_projects(&self) -> Result<Vec<Project>, AppError> {
        self.get_json("/projects").await
    }

    async fn get_project(&self, project_id: &str) -> Result<Project, AppError> {
        self.get_json(&format!("/projects/{}", segment(project_id))).await
    }

    async fn list_posts(&self, project_id: &str) -> Result<Vec<Post>, AppError> {
        self.get_json(&format!("/projects/{}/posts", segment(project_id))).await
    }

    async fn get_post(&self, post_id: &str) -> Result<Post, AppError> {
        self.get_json(&format!("/posts/{}", segment(post_id))).await
    }

    async fn list_comments(&self, post_id: &str) -> Result<Vec<Comment>, AppError> {
        self.get_json(&format!("/posts/{}/comments", segment(post_id))).await
    }

    async fn list_members(&self, project_id: &str) -> Result<Vec<Member>, AppError> {
        self.get_json(&format!("/projects/{}/members", segment(project_id)))
            .await
    }

    async fn create_post(
        &self,
        api_key: &str,
        project_id: &str,
        post: &NewPost,
    ) -> Result<Post, AppError> {
        let endpoint = format!("/projects/{}/posts", segment(project_id));
        let request = self.client.post(self.api_url(&endpoint)).json(post);
        let response = Self::authorized(request, api_key).send().await?;
        self.handle_response(response, &endpoint).await
    }

    async fn join_project(
        &self,
        api_key: &str,
        project_id: &str,
        role: &str,
    ) -> Result<Member, AppError> {
        let endpoint = format!("/projects/{}/join", segment(project_id));
        let body = JoinProject {
            role: role.to_string(),
        };
        let request = self.client.post(self.api_url(&endpoint)).json(&body);
        let response = Self::authorized(request, api_key).send().await?;
        self.handle_response(response, &endpoint).await
    }

    async fn update_member_role(
        &self,
        api_key: &str,
        project_id: &str,
        agent_id: &str,
        role: &str,
    ) -> Result<Member, AppError> {
        let endpoint = format!("/projects/{}/members/{}", segment(project_id), segment(agent_id));
        let body = MemberUpdate {
            role: role.to_string(),
        };
        let request = self.client.patch(self.api_url(&endpoint)).json(&body);
        let response = Self::authorized(request, api_key).send().await?;
        self.handle_response(response, &endpoint).await
    }

    async fn update_project(
        &self,
        api_key: &str,
        project_id: &str,
        update: &ProjectUpdate,
    ) -> Result<Project, AppError> {
        let endpoint = format!("/projects/{}", segment(project_id));
        let request = self.client.patch(self.api_url(&endpoint)).json(update);
        let response = Self::authorized(request, api_key).send().await?;
        self.handle_response(response, &endpoint).await
    }

    async fn remove_member(
        &self,
        api_key: &str,
        project_id: &str,
        agent_id: &str,
    ) -> Result<(), AppError> {
        let endpoint = format!("/projects/{}/members/{}", segment(project_id), segment(agent_id));
        let request = self.client.delete(self.api_url(&endpoint));
        let response = Self::authorized(request, api_key).send().await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::error_from(response, &endpoint).await)
        }
    }

    async fn get_agent_profile(&self, agent_id: &str) -> Result<AgentProfile, AppError> {
        self.get_json(&format!("/agents/{}/profile", segment(agent_id)))
            .await
    }

    async fn search(&self, query: &str, limit: usize, offset: usize) -> Result<Vec<Post>, AppError> {
        let endpoint = "/search";
        let response = self
            .client
            .get(self.api_url(endpoint))
            .query(&[
                ("q", query.to_string()),
                ("limit", limit.to_string()),
                ("offset", offset.to_string()),
            ])
            .send()
            .await?;
        self.handle_response(response, endpoint).await
    }
}
