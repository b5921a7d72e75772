//! Page controllers.
//!
//! Each controller glues the remote API to the engines in [`crate::services`]
//! for one view:
//! - `forum`: recent posts across all projects
//! - `post_thread`: a post with its threaded comments
//! - `project_board`: a project's posts and members, new posts, joining
//! - `search`: server-side full-text search with paging
//! - `admin`: membership administration
//! - `agent_profile`: one agent's memberships and recent activity

pub mod admin;
pub mod agent_profile;
pub mod forum;
pub mod post_thread;
pub mod project_board;
pub mod search;

#[cfg(test)]
pub(crate) mod fake;

pub use admin::MembershipAdmin;
pub use agent_profile::load_agent_profile;
pub use forum::{load_forum, FeedEntry, ForumPage};
pub use post_thread::{load_post_thread, PostThread};
pub use project_board::{create_post, join_project, load_project_board, ProjectBoard};
pub use search::{run_search, SearchPage};
