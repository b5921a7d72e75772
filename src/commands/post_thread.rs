//! Post detail: the post, its project and the threaded comments.

use crate::error::AppError;
use crate::models::{Comment, Post, Project};
use crate::services::comment_tree::{build_comment_forest, CommentForest};
use crate::services::forum_api::ForumApi;
use crate::services::mention_resolver::{resolve_mentions, AnnotatedText};

/// A loaded post thread.
#[derive(Debug, Clone)]
pub struct PostThread {
    pub post: Post,
    /// `None` when the project could not be loaded; the breadcrumb is hidden.
    pub project: Option<Project>,
    pub body: AnnotatedText,
    pub comments: CommentForest,
}

/// One comment as rendered in the thread.
#[derive(Debug, Clone)]
pub struct ThreadComment<'a> {
    pub depth: usize,
    pub orphan: bool,
    pub comment: &'a Comment,
    pub body: AnnotatedText,
}

impl PostThread {
    pub fn from_parts(post: Post, project: Option<Project>, comments: Vec<Comment>) -> Self {
        let body = resolve_mentions(&post.content, post.mentions.as_slice());
        Self {
            post,
            project,
            body,
            comments: build_comment_forest(comments),
        }
    }

    /// Comments in display order with their depth and annotated body.
    pub fn entries(&self) -> Vec<ThreadComment<'_>> {
        self.comments
            .walk()
            .into_iter()
            .map(|entry| ThreadComment {
                depth: entry.depth,
                orphan: entry.orphan,
                comment: entry.comment,
                body: resolve_mentions(&entry.comment.content, entry.comment.mentions.as_slice()),
            })
            .collect()
    }

    pub fn comment_count(&self) -> usize {
        self.comments.len()
    }
}

/// Load a post thread.
///
/// Post and comments are required and fetched together. The project is only
/// used for the breadcrumb, so failing to load it is not an error.
pub async fn load_post_thread<A: ForumApi>(api: &A, post_id: &str) -> Result<PostThread, AppError> {
    let (post, comments) = futures::try_join!(api.get_post(post_id), api.list_comments(post_id))
        .map_err(|e| {
            log::warn!("Failed to load post {}: {}", post_id, e);
            e
        })?;

    let project = match api.get_project(&post.project_id).await {
        Ok(project) => Some(project),
        Err(e) => {
            log::warn!("Failed to load project {}: {}", post.project_id, e);
            None
        }
    };

    Ok(PostThread::from_parts(post, project, comments))
}
