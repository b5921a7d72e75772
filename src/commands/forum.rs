//! Forum feed: recent posts across every project.

use crate::models::{Post, Project};
use crate::services::feed_filter::{count_posts, FeedCounts, FeedFilter, FeedPage};
use crate::services::forum_api::ForumApi;
use crate::services::preferences::PreferenceStore;
use crate::services::view_scope::ViewScope;
use serde::Serialize;

/// A post with the name of the project it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedEntry {
    pub post: Post,
    pub project_name: String,
}

impl AsRef<Post> for FeedEntry {
    fn as_ref(&self) -> &Post {
        &self.post
    }
}

/// Everything the forum feed shows before filtering.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ForumSnapshot {
    pub projects: Vec<Project>,
    pub entries: Vec<FeedEntry>,
    pub counts: FeedCounts,
}

/// Load every project and its posts.
///
/// Post lists are fetched concurrently. A project whose posts fail to load
/// is skipped; if the project list itself fails the snapshot is empty.
pub async fn load_forum<A: ForumApi>(api: &A) -> ForumSnapshot {
    let projects = match api.list_projects().await {
        Ok(projects) => projects,
        Err(e) => {
            log::warn!("Failed to load projects: {}", e);
            return ForumSnapshot::default();
        }
    };

    let post_lists =
        futures::future::join_all(projects.iter().map(|p| api.list_posts(&p.id))).await;

    let mut entries = Vec::new();
    for (project, posts) in projects.iter().zip(post_lists) {
        match posts {
            Ok(posts) => entries.extend(posts.into_iter().map(|post| FeedEntry {
                post,
                project_name: project.name.clone(),
            })),
            Err(e) => log::warn!("Failed to load posts for {}: {}", project.id, e),
        }
    }

    let counts = count_posts(&entries);
    ForumSnapshot {
        projects,
        entries,
        counts,
    }
}

/// The mounted forum feed view.
pub struct ForumPage<S> {
    filter: FeedFilter<S>,
    snapshot: ForumSnapshot,
    loading: bool,
    scope: ViewScope,
}

impl<S: PreferenceStore> ForumPage<S> {
    pub fn mount(store: S, scope: ViewScope) -> Self {
        Self {
            filter: FeedFilter::mount(store),
            snapshot: ForumSnapshot::default(),
            loading: true,
            scope,
        }
    }

    /// Fetch the feed. A result arriving after the view closed is dropped.
    pub async fn refresh<A: ForumApi>(&mut self, api: &A) {
        self.loading = true;
        let snapshot = load_forum(api).await;

        let slot = &mut self.snapshot;
        let loading = &mut self.loading;
        self.scope.apply("forum feed", || {
            *slot = snapshot;
            *loading = false;
        });
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn filter(&self) -> &FeedFilter<S> {
        &self.filter
    }

    pub fn filter_mut(&mut self) -> &mut FeedFilter<S> {
        &mut self.filter
    }

    pub fn snapshot(&self) -> &ForumSnapshot {
        &self.snapshot
    }

    /// The filtered, sorted page currently shown.
    pub fn visible(&self) -> FeedPage<FeedEntry> {
        self.filter.view(&self.snapshot.entries)
    }

    pub fn close(&self) {
        self.scope.close();
    }
}
