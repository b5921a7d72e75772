//! Filter, sort and paginate engine for post feeds.
//!
//! The axes combine with logical AND: tag, status, post type, free-text
//! query and page. The query itself is answered by the server's search endpoint; this
//! module never re-ranks a query result, it only filters and slices it.
//!
//! Only the status filter is persisted. Tag, query and page are transient
//! and reset whenever the user navigates away.

use super::preferences::{PreferenceStore, STATUS_FILTER_KEY};
use crate::models::{Post, PostStatus, PostType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Posts shown per page.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Status axis of the feed filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    Open,
    All,
    Resolved,
    Closed,
}

impl StatusFilter {
    /// Parse a stored or URL value, returning `None` for anything unknown.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "open" => Some(Self::Open),
            "all" => Some(Self::All),
            "resolved" => Some(Self::Resolved),
            "closed" => Some(Self::Closed),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::All => "all",
            Self::Resolved => "resolved",
            Self::Closed => "closed",
        }
    }

    /// Check a post status against this filter; `All` accepts everything.
    pub fn matches(&self, status: PostStatus) -> bool {
        match self {
            Self::All => true,
            Self::Open => status == PostStatus::Open,
            Self::Resolved => status == PostStatus::Resolved,
            Self::Closed => status == PostStatus::Closed,
        }
    }
}

impl std::fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Current filter selection of a feed view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterState {
    /// Single-select tag, exact match.
    pub tag: Option<String>,

    pub status: StatusFilter,

    /// Post type; `None` accepts every type.
    pub post_type: Option<PostType>,

    /// Free-text query sent to the search endpoint.
    pub query: Option<String>,

    /// 1-indexed page number.
    pub page: usize,

    pub page_size: usize,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            tag: None,
            status: StatusFilter::default(),
            post_type: None,
            query: None,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl FilterState {
    /// Offset of the first item on the current page.
    pub fn offset(&self) -> usize {
        (self.page.max(1) - 1).saturating_mul(self.page_size)
    }

    /// Whether a non-blank query is active.
    pub fn has_query(&self) -> bool {
        self.query.as_deref().is_some_and(|q| !q.trim().is_empty())
    }

    /// Tag, status and type check for a single post.
    pub fn matches(&self, post: &Post) -> bool {
        let tag_ok = self.tag.as_deref().map_or(true, |tag| post.has_tag(tag));
        let type_ok = self.post_type.map_or(true, |t| post.post_type == t);
        tag_ok && type_ok && self.status.matches(post.status)
    }

    /// Encode the non-default parts as a URL query string (`q`, `tag`, `status`, `type`, `page`).
    pub fn to_query_string(&self) -> String {
        let mut params: Vec<(&str, String)> = Vec::new();
        if let Some(q) = self.query.as_deref().filter(|q| !q.trim().is_empty()) {
            params.push(("q", q.to_string()));
        }
        if let Some(tag) = &self.tag {
            params.push(("tag", tag.clone()));
        }
        if self.status != StatusFilter::default() {
            params.push(("status", self.status.as_str().to_string()));
        }
        if let Some(post_type) = self.post_type {
            params.push(("type", post_type.to_string()));
        }
        if self.page > 1 {
            params.push(("page", self.page.to_string()));
        }

        params
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Decode a URL query string. Unknown keys and malformed values are ignored.
    pub fn from_query_string(query_string: &str) -> Self {
        let mut state = Self::default();
        for (key, value) in parse_query_pairs(query_string) {
            match key.as_str() {
                "q" if !value.trim().is_empty() => state.query = Some(value),
                "tag" if !value.is_empty() => state.tag = Some(value),
                "status" => {
                    if let Some(status) = StatusFilter::parse(&value) {
                        state.status = status;
                    }
                }
                "type" => state.post_type = PostType::parse(&value),
                "page" => {
                    if let Ok(page) = value.parse::<usize>() {
                        state.page = page.max(1);
                    }
                }
                _ => {}
            }
        }
        state
    }
}

fn parse_query_pairs(query_string: &str) -> Vec<(String, String)> {
    query_string
        .trim_start_matches('?')
        .split('&')
        .filter(|pair| !pair.is_empty())
        .filter_map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let value = value.replace('+', " ");
            let value = urlencoding::decode(&value).ok()?.into_owned();
            Some((key.to_string(), value))
        })
        .collect()
}

/// One page of a feed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedPage<T> {
    pub items: Vec<T>,

    pub page: usize,

    pub page_size: usize,

    pub has_next: bool,

    pub has_prev: bool,

    /// Number of matching items when known locally; `None` for server pages.
    pub total_matching: Option<usize>,

    /// An empty page past the first: offer a way back to page 1.
    pub offer_first_page: bool,
}

impl<T> FeedPage<T> {
    /// Wrap a page the server already sliced (`limit`/`offset`).
    ///
    /// There is no total count, so a full page is taken to mean more
    /// results may follow.
    pub fn from_server_page(items: Vec<T>, state: &FilterState) -> Self {
        let page = state.page.max(1);
        Self {
            has_next: state.page_size > 0 && items.len() == state.page_size,
            has_prev: page > 1,
            offer_first_page: items.is_empty() && page > 1,
            total_matching: None,
            page,
            page_size: state.page_size,
            items,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Sort newest first. Equal timestamps keep their input order.
pub fn sort_recent<T: AsRef<Post>>(items: &mut [T]) {
    items.sort_by(|a, b| b.as_ref().created_at.cmp(&a.as_ref().created_at));
}

/// Filter, order and slice a collection without touching the input.
///
/// With an active query the input is a server-ranked result and keeps its
/// order; otherwise matching posts are listed newest first.
pub fn apply_filters<T: AsRef<Post> + Clone>(items: &[T], state: &FilterState) -> FeedPage<T> {
    let mut matching: Vec<T> = items
        .iter()
        .filter(|item| state.matches(item.as_ref()))
        .cloned()
        .collect();

    if !state.has_query() {
        sort_recent(&mut matching);
    }

    let page = state.page.max(1);
    let total = matching.len();
    let start = state.offset().min(total);
    let end = start.saturating_add(state.page_size).min(total);
    let page_items: Vec<T> = matching.drain(start..end).collect();

    FeedPage {
        has_next: end < total,
        has_prev: page > 1,
        offer_first_page: page_items.is_empty() && page > 1,
        total_matching: Some(total),
        page,
        page_size: state.page_size,
        items: page_items,
    }
}

/// Counts over an unfiltered collection, for filter chips and headers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FeedCounts {
    pub total: usize,
    pub open: usize,
    pub resolved: usize,
    pub closed: usize,
    /// Posts per tag, ordered by tag.
    pub tags: BTreeMap<String, usize>,
}

impl FeedCounts {
    pub fn for_status(&self, status: StatusFilter) -> usize {
        match status {
            StatusFilter::All => self.total,
            StatusFilter::Open => self.open,
            StatusFilter::Resolved => self.resolved,
            StatusFilter::Closed => self.closed,
        }
    }
}

pub fn count_posts<T: AsRef<Post>>(items: &[T]) -> FeedCounts {
    let mut counts = FeedCounts::default();
    for item in items {
        let post = item.as_ref();
        counts.total += 1;
        match post.status {
            PostStatus::Open => counts.open += 1,
            PostStatus::Resolved => counts.resolved += 1,
            PostStatus::Closed => counts.closed += 1,
        }
        // A tag listed twice on one post still counts once.
        let mut seen: Vec<&str> = Vec::with_capacity(post.tags.len());
        for tag in &post.tags {
            if !seen.contains(&tag.as_str()) {
                seen.push(tag);
                *counts.tags.entry(tag.clone()).or_insert(0) += 1;
            }
        }
    }
    counts
}

/// Filter state of one mounted feed view, bound to the preference store.
#[derive(Debug)]
pub struct FeedFilter<S> {
    store: S,
    state: FilterState,
    /// Whether status changes are written back to the store.
    persist_status: bool,
}

impl<S: PreferenceStore> FeedFilter<S> {
    /// Mount a view: restore the saved status, everything else starts fresh.
    pub fn mount(store: S) -> Self {
        let status = store
            .get(STATUS_FILTER_KEY)
            .and_then(|saved| StatusFilter::parse(&saved))
            .unwrap_or_default();

        Self {
            store,
            state: FilterState {
                status,
                ..FilterState::default()
            },
            persist_status: true,
        }
    }

    /// Mount a view that ignores the saved status.
    ///
    /// Starts at [`StatusFilter::All`]; status changes stay local to the view.
    pub fn unsaved(store: S) -> Self {
        Self {
            store,
            state: FilterState {
                status: StatusFilter::All,
                ..FilterState::default()
            },
            persist_status: false,
        }
    }

    pub fn state(&self) -> &FilterState {
        &self.state
    }

    /// User-initiated status change; persisted immediately for saved views.
    pub fn set_status(&mut self, status: StatusFilter) {
        self.state.status = status;
        self.state.page = 1;
        if !self.persist_status {
            return;
        }
        if let Err(e) = self.store.set(STATUS_FILTER_KEY, status.as_str()) {
            log::warn!("Failed to persist status filter: {}", e);
        }
    }

    /// Select a tag. Selecting the active tag again clears it.
    pub fn set_tag(&mut self, tag: Option<&str>) {
        self.state.tag = match (tag, self.state.tag.as_deref()) {
            (Some(new), Some(current)) if new == current => None,
            (Some(new), _) => Some(new.to_string()),
            (None, _) => None,
        };
        self.state.page = 1;
    }

    /// Select a post type. Selecting the active type again clears it.
    pub fn set_post_type(&mut self, post_type: Option<PostType>) {
        self.state.post_type = match (post_type, self.state.post_type) {
            (Some(new), Some(current)) if new == current => None,
            (new, _) => new,
        };
        self.state.page = 1;
    }

    pub fn set_query(&mut self, query: &str) {
        let query = query.trim();
        self.state.query = (!query.is_empty()).then(|| query.to_string());
        self.state.page = 1;
    }

    pub fn set_page(&mut self, page: usize) {
        self.state.page = page.max(1);
    }

    pub fn next_page(&mut self) {
        self.state.page = self.state.page.saturating_add(1);
    }

    pub fn prev_page(&mut self) {
        self.state.page = self.state.page.saturating_sub(1).max(1);
    }

    pub fn first_page(&mut self) {
        self.state.page = 1;
    }

    /// Leave the view: drop the transient filters, keep the status.
    pub fn navigate(&mut self) {
        self.state.tag = None;
        self.state.post_type = None;
        self.state.query = None;
        self.state.page = 1;
    }

    /// Adopt the filters carried by a URL.
    ///
    /// A status in the URL applies to this view only and is not persisted.
    pub fn sync_from_url(&mut self, query_string: &str) {
        let from_url = FilterState::from_query_string(query_string);
        let has_status = parse_query_pairs(query_string)
            .iter()
            .any(|(k, v)| k == "status" && StatusFilter::parse(v).is_some());

        self.state.tag = from_url.tag;
        self.state.post_type = from_url.post_type;
        self.state.query = from_url.query;
        self.state.page = from_url.page;
        if has_status {
            self.state.status = from_url.status;
        }
    }

    pub fn to_url(&self) -> String {
        self.state.to_query_string()
    }

    /// Apply the current filters to a locally held collection.
    pub fn view<T: AsRef<Post> + Clone>(&self, items: &[T]) -> FeedPage<T> {
        apply_filters(items, &self.state)
    }
}
