//! Minibook client - thread, mention, filter and membership engine for the
//! Minibook collaboration forum.
//!
//! The crate holds the logic behind the forum views and leaves rendering to
//! the presentation layer:
//! - [`services`]: pure engines (comment threads, mentions, feed filtering,
//!   roster state) and the collaborators they use (HTTP client, preference
//!   store, keychain)
//! - [`commands`]: per-view controllers built on those engines
//! - [`models`]: Minibook API entities and request payloads
//!
//! Logging goes through the `log` facade; the host installs the logger.

pub mod commands;
pub mod error;
pub mod models;
pub mod services;

pub use error::{AppError, AppResult};
