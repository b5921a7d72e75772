//! `@mention` resolution for post and comment bodies.
//!
//! Only handles the server already confirmed (the entity's `mentions` list)
//! become navigable references. Every other `@word` stays plain text, so
//! e-mail addresses, decorators in code snippets and unknown names are never
//! linked.

use serde::Serialize;
use std::collections::HashSet;

/// A piece of annotated text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Segment {
    /// Plain text, rendered as-is.
    Text(String),
    /// A confirmed mention; holds the handle without the `@`.
    Mention(String),
}

/// Location of a linked mention in the source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MentionSpan {
    pub handle: String,
    /// Byte offset of the `@`.
    pub start: usize,
    /// Byte offset just past the handle.
    pub end: usize,
}

/// Text split into plain and mention segments, ready for the renderer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnnotatedText {
    segments: Vec<Segment>,
    spans: Vec<MentionSpan>,
}

impl AnnotatedText {
    fn plain(text: &str) -> Self {
        let segments = if text.is_empty() {
            Vec::new()
        } else {
            vec![Segment::Text(text.to_string())]
        };
        Self {
            segments,
            spans: Vec::new(),
        }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn spans(&self) -> &[MentionSpan] {
        &self.spans
    }

    /// Distinct linked handles, in order of first appearance.
    pub fn handles(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.spans
            .iter()
            .map(|s| s.handle.as_str())
            .filter(|h| seen.insert(*h))
            .collect()
    }

    /// Rebuild the source text.
    pub fn plain_text(&self) -> String {
        self.segments
            .iter()
            .map(|segment| match segment {
                Segment::Text(text) => text.clone(),
                Segment::Mention(handle) => format!("@{}", handle),
            })
            .collect()
    }

    /// Rewrite linked mentions as Markdown links to `<link_base>/<handle>`.
    pub fn render_markdown_links(&self, link_base: &str) -> String {
        let base = link_base.trim_end_matches('/');
        self.segments
            .iter()
            .map(|segment| match segment {
                Segment::Text(text) => text.clone(),
                Segment::Mention(handle) => format!("[@{}]({}/{})", handle, base, handle),
            })
            .collect()
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Mark every `@handle` in `text` whose handle is in `handles`.
///
/// An `@` only starts a mention at the beginning of the text or after a
/// non-word character. The handle is the longest run of word characters
/// after it and must equal a confirmed handle exactly (case-sensitive).
pub fn resolve_mentions<S: AsRef<str>>(text: &str, handles: &[S]) -> AnnotatedText {
    let known: HashSet<&str> = handles
        .iter()
        .map(AsRef::as_ref)
        .filter(|h| !h.is_empty())
        .collect();

    if known.is_empty() {
        return AnnotatedText::plain(text);
    }

    let mut segments = Vec::new();
    let mut spans = Vec::new();
    let mut pending_from = 0;
    let mut prev: Option<char> = None;
    let mut chars = text.char_indices().peekable();

    while let Some((idx, ch)) = chars.next() {
        if ch == '@' && !prev.is_some_and(is_word_char) {
            let handle_start = idx + ch.len_utf8();
            let handle_end = text[handle_start..]
                .char_indices()
                .find(|(_, c)| !is_word_char(*c))
                .map(|(offset, _)| handle_start + offset)
                .unwrap_or(text.len());
            let candidate = &text[handle_start..handle_end];

            if known.contains(candidate) {
                if pending_from < idx {
                    segments.push(Segment::Text(text[pending_from..idx].to_string()));
                }
                segments.push(Segment::Mention(candidate.to_string()));
                spans.push(MentionSpan {
                    handle: candidate.to_string(),
                    start: idx,
                    end: handle_end,
                });
                pending_from = handle_end;

                while chars.peek().is_some_and(|(i, _)| *i < handle_end) {
                    chars.next();
                }
                prev = candidate.chars().last();
                continue;
            }
        }
        prev = Some(ch);
    }

    if pending_from < text.len() {
        segments.push(Segment::Text(text[pending_from..].to_string()));
    }

    AnnotatedText { segments, spans }
}
