//! Comment thread reconstruction.
//!
//! Comments arrive as a flat, creation-ordered list in which replies point
//! at their parent by id. The forest is an arena: nodes keep the input order
//! and hold the indices of their children, so building it and walking it
//! are both linear in the number of comments.
//!
//! Dangling references never fail the build. A comment whose parent is
//! missing, belongs to another post, is itself, or sits on a parent cycle is
//! shown at root level and flagged as an orphan.

use crate::models::Comment;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone)]
struct Node {
    comment: Comment,
    children: Vec<usize>,
    orphaned: bool,
}

/// Nested discussion for one post.
#[derive(Debug, Clone, Default)]
pub struct CommentForest {
    nodes: Vec<Node>,
    roots: Vec<usize>,
    by_id: HashMap<String, usize>,
}

/// Borrowed view of one comment in the forest.
#[derive(Debug, Clone, Copy)]
pub struct ThreadNode<'a> {
    forest: &'a CommentForest,
    index: usize,
}

impl<'a> ThreadNode<'a> {
    pub fn comment(&self) -> &'a Comment {
        &self.forest.nodes[self.index].comment
    }

    /// Direct replies, in creation order.
    pub fn children(&self) -> impl Iterator<Item = ThreadNode<'a>> + 'a {
        let forest = self.forest;
        forest.nodes[self.index]
            .children
            .iter()
            .map(move |&index| ThreadNode { forest, index })
    }

    /// True when the comment declared a parent that could not be attached.
    pub fn is_orphan(&self) -> bool {
        self.forest.nodes[self.index].orphaned
    }
}

/// One row of a depth-first walk, for indented rendering.
#[derive(Debug, Clone, Serialize)]
pub struct ThreadEntry<'a> {
    pub depth: usize,
    pub orphan: bool,
    pub comment: &'a Comment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    OnPath,
    Done,
}

/// Build the forest for one post's comments.
pub fn build_comment_forest(comments: Vec<Comment>) -> CommentForest {
    let mut by_id: HashMap<String, usize> = HashMap::with_capacity(comments.len());
    for (i, comment) in comments.iter().enumerate() {
        by_id.entry(comment.id.clone()).or_insert(i);
    }

    let mut parents: Vec<Option<usize>> = comments
        .iter()
        .enumerate()
        .map(|(i, comment)| {
            comment
                .parent_id
                .as_deref()
                .and_then(|pid| by_id.get(pid).copied())
                .filter(|&p| p != i && comments[p].post_id == comment.post_id)
        })
        .collect();

    break_cycles(&mut parents);

    let mut nodes: Vec<Node> = comments
        .into_iter()
        .zip(&parents)
        .map(|(comment, parent)| Node {
            orphaned: comment.parent_id.is_some() && parent.is_none(),
            comment,
            children: Vec::new(),
        })
        .collect();

    let mut roots = Vec::new();
    for (i, parent) in parents.iter().enumerate() {
        match parent {
            Some(p) => nodes[*p].children.push(i),
            None => roots.push(i),
        }
    }

    let orphans = nodes.iter().filter(|n| n.orphaned).count();
    if orphans > 0 {
        log::debug!("comment forest placed {} orphan(s) at root level", orphans);
    }

    CommentForest {
        nodes,
        roots,
        by_id,
    }
}

/// Detach the earliest comment of every parent cycle.
///
/// Each node has at most one parent, so every walk up the chain either ends
/// at a root, reaches an already settled node, or closes a loop on its own
/// path.
fn break_cycles(parents: &mut [Option<usize>]) {
    let mut marks = vec![Mark::Unvisited; parents.len()];
    let mut path = Vec::new();

    for start in 0..parents.len() {
        let mut cursor = Some(start);
        while let Some(node) = cursor {
            match marks[node] {
                Mark::Unvisited => {
                    marks[node] = Mark::OnPath;
                    path.push(node);
                    cursor = parents[node];
                }
                Mark::OnPath => {
                    if let Some(pos) = path.iter().rposition(|&n| n == node) {
                        if let Some(&earliest) = path[pos..].iter().min() {
                            parents[earliest] = None;
                        }
                    }
                    break;
                }
                Mark::Done => break,
            }
        }
        for node in path.drain(..) {
            marks[node] = Mark::Done;
        }
    }
}

impl CommentForest {
    /// Total number of comments in the forest.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Top-level comments (including orphans), in creation order.
    pub fn roots(&self) -> impl Iterator<Item = ThreadNode<'_>> {
        self.roots
            .iter()
            .map(move |&index| ThreadNode {
                forest: self,
                index,
            })
    }

    /// Look up a comment by id.
    pub fn get(&self, id: &str) -> Option<ThreadNode<'_>> {
        self.by_id.get(id).map(|&index| ThreadNode {
            forest: self,
            index,
        })
    }

    /// Comments whose declared parent could not be attached.
    pub fn orphans(&self) -> impl Iterator<Item = &Comment> {
        self.nodes
            .iter()
            .filter(|n| n.orphaned)
            .map(|n| &n.comment)
    }

    /// Pre-order walk of every thread with its nesting depth.
    pub fn walk(&self) -> Vec<ThreadEntry<'_>> {
        let mut entries = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<(usize, usize)> = self.roots.iter().rev().map(|&r| (r, 0)).collect();

        while let Some((index, depth)) = stack.pop() {
            let node = &self.nodes[index];
            entries.push(ThreadEntry {
                depth,
                orphan: node.orphaned,
                comment: &node.comment,
            });
            stack.extend(node.children.iter().rev().map(|&c| (c, depth + 1)));
        }

        entries
    }
}
