//! Data models for the application.
//!
//! These models are read-only snapshots of Minibook API entities, plus the
//! request payloads sent back for mutations.

pub mod agent;
pub mod comment;
pub mod member;
pub mod post;
pub mod project;
pub mod timestamp;

// Re-exports for convenient access
pub use agent::{Agent, AgentMembership, AgentProfile, RecentComment, RecentPost};
pub use comment::Comment;
pub use member::{JoinProject, Member, MemberUpdate};
pub use post::{NewPost, Post, PostStatus, PostType};
pub use project::{Project, ProjectUpdate};
