//! Core document types.

use serde::Serialize;

/// Kind of a document block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    Prose,
    Code,
}

/// One contiguous span of a card's source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Block {
    pub kind: BlockKind,
    /// Verbatim content. Code blocks exclude their fence lines.
    pub content: String,
    /// Normalized language tag, code blocks only
    pub language: Option<String>,
    /// Byte offset of the first byte (the opening fence for code blocks)
    pub start_index: usize,
    /// Byte offset one past the last byte (after the closing fence)
    pub end_index: usize,
}

impl Block {
    pub(crate) fn prose(content: &str, start_index: usize) -> Self {
        Self {
            kind: BlockKind::Prose,
            content: content.to_string(),
            language: None,
            start_index,
            end_index: start_index + content.len(),
        }
    }

    pub const fn is_code(&self) -> bool {
        matches!(self.kind, BlockKind::Code)
    }

    /// Whether `pos` falls inside this block, both ends inclusive.
    pub const fn contains(&self, pos: usize) -> bool {
        pos >= self.start_index && pos <= self.end_index
    }
}

/// Where a cursor sits relative to the code blocks of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeContext {
    pub in_code: bool,
    pub language: Option<String>,
    /// Offset of the start of the cursor's line
    pub line_start: usize,
    /// Leading whitespace of the cursor's line, up to the cursor
    pub indent: String,
}

/// Line comment delimiters for a language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommentSyntax {
    pub prefix: &'static str,
    pub suffix: &'static str,
}

impl CommentSyntax {
    /// Wrap `body` as a comment.
    pub fn wrap(&self, body: &str) -> String {
        format!("{}{body}{}", self.prefix, self.suffix)
    }
}
