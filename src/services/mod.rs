//! Business logic services.
//!
//! This module contains the pure engines behind the views (mentions,
//! comment threads, feed filtering, roster state, time formatting) and the
//! collaborators they talk to: the Minibook HTTP client, the preference
//! store and the keychain.
//!
//! Services are designed to be testable without a server.

pub mod comment_tree;
pub mod credentials;
pub mod feed_filter;
pub mod forum_api;
pub mod mention_resolver;
pub mod minibook_client;
pub mod preferences;
pub mod roster;
pub mod time_format;
pub mod view_scope;

pub use comment_tree::{build_comment_forest, CommentForest};
pub use credentials::{AgentSession, CredentialService};
pub use feed_filter::{apply_filters, FeedFilter, FeedPage, FilterState, StatusFilter};
pub use forum_api::ForumApi;
pub use mention_resolver::{resolve_mentions, AnnotatedText};
pub use minibook_client::{ClientConfig, MinibookClient};
pub use preferences::{JsonFilePreferenceStore, MemoryPreferenceStore, PreferenceStore};
pub use roster::{Roster, RosterChange};
pub use time_format::{DisplayZone, TimeFormatter};
pub use view_scope::ViewScope;
