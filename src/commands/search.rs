//! Full-text search across posts.
//!
//! Matching and ranking happen on the server; this view only pages through
//! the results and keeps the query in the URL.

use crate::error::AppError;
use crate::models::Post;
use crate::services::feed_filter::{FeedFilter, FeedPage, FilterState};
use crate::services::forum_api::ForumApi;
use crate::services::preferences::PreferenceStore;
use crate::services::view_scope::ViewScope;

/// Fetch one page of search results for the given filter state.
///
/// A blank query sends no request and yields an empty first page. Tag,
/// type and an explicit status narrow the page the server returned; whether
/// a next page exists is judged on the unfiltered page.
pub async fn run_search<A: ForumApi>(api: &A, state: &FilterState) -> Result<FeedPage<Post>, AppError> {
    let query = match state.query.as_deref().map(str::trim) {
        Some(q) if !q.is_empty() => q,
        _ => return Ok(FeedPage::from_server_page(Vec::new(), state)),
    };

    let posts = api.search(query, state.page_size, state.offset()).await?;

    let mut page = FeedPage::from_server_page(posts, state);
    page.items.retain(|post| state.matches(post));
    Ok(page)
}

/// The mounted search view.
pub struct SearchPage<S> {
    filter: FeedFilter<S>,
    results: FeedPage<Post>,
    error: Option<AppError>,
    scope: ViewScope,
}

impl<S: PreferenceStore> SearchPage<S> {
    /// Mount from the current URL query string (`q`, `tag`, `status`, `type`, `page`).
    ///
    /// Search shows every status unless the URL names one; the saved feed
    /// status is neither read nor written.
    pub fn mount(store: S, query_string: &str, scope: ViewScope) -> Self {
        let mut filter = FeedFilter::unsaved(store);
        filter.sync_from_url(query_string);
        let results = FeedPage::from_server_page(Vec::new(), filter.state());

        Self {
            filter,
            results,
            error: None,
            scope,
        }
    }

    pub fn filter(&self) -> &FeedFilter<S> {
        &self.filter
    }

    pub fn filter_mut(&mut self) -> &mut FeedFilter<S> {
        &mut self.filter
    }

    pub fn results(&self) -> &FeedPage<Post> {
        &self.results
    }

    /// The last search failure, shown in place of the results.
    pub fn error(&self) -> Option<&AppError> {
        self.error.as_ref()
    }

    /// URL query string for the current state.
    pub fn url(&self) -> String {
        self.filter.to_url()
    }

    /// Run the search for the current state.
    pub async fn search<A: ForumApi>(&mut self, api: &A) {
        let state = self.filter.state().clone();
        let outcome = run_search(api, &state).await;

        let results = &mut self.results;
        let error = &mut self.error;
        self.scope.apply("search results", || match outcome {
            Ok(page) => {
                *results = page;
                *error = None;
            }
            Err(e) => {
                log::warn!("Search for {:?} failed: {}", state.query, e);
                *results = FeedPage::from_server_page(Vec::new(), &state);
                *error = Some(e);
            }
        });
    }

    /// Submit a new query: back to page 1 and search.
    pub async fn submit<A: ForumApi>(&mut self, api: &A, query: &str) {
        self.filter.set_query(query);
        self.search(api).await;
    }

    pub async fn next_page<A: ForumApi>(&mut self, api: &A) {
        self.filter.next_page();
        self.search(api).await;
    }

    pub async fn prev_page<A: ForumApi>(&mut self, api: &A) {
        self.filter.prev_page();
        self.search(api).await;
    }

    pub async fn first_page<A: ForumApi>(&mut self, api: &A) {
        self.filter.first_page();
        self.search(api).await;
    }

    pub fn close(&self) {
        self.scope.close();
    }
}
