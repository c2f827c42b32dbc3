//! Prose/code block splitting.
//!
//! Fences are matched line by line: an opening line of three backticks plus
//! an optional word-character tag, and a closing line of exactly three
//! backticks. An opening fence without a closing line is left as prose.

use crate::offsets::{clamp_offset, leading_whitespace, line_start};

use super::normalize_language;
use super::types::{Block, BlockKind, CodeContext};

const FENCE: &str = "```";

/// Split `text` into ordered prose and code blocks.
///
/// Whitespace-only prose between or around fences is dropped.
///
/// # Example
///
/// ```
/// use clozewright::document::{parse_content, BlockKind};
///
/// let blocks = parse_content("```ts\nconst x = 1;\n```");
/// assert_eq!(blocks.len(), 1);
/// assert_eq!(blocks[0].kind, BlockKind::Code);
/// assert_eq!(blocks[0].language.as_deref(), Some("typescript"));
/// assert_eq!(blocks[0].content, "const x = 1;\n");
/// ```
pub fn parse_content(text: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut prose_start = 0;
    let mut line = 0;

    while line < text.len() {
        if let Some(code) = match_fence(text, line) {
            push_prose(text, prose_start, code.start_index, &mut blocks);
            prose_start = code.end_index;
            line = code.end_index;
            blocks.push(code);
        }
        match text[line..].find('\n') {
            Some(i) => line += i + 1,
            None => break,
        }
    }

    push_prose(text, prose_start, text.len(), &mut blocks);
    blocks
}

fn push_prose(text: &str, start: usize, end: usize, blocks: &mut Vec<Block>) {
    if start >= end {
        return;
    }
    let content = &text[start..end];
    if !content.trim().is_empty() {
        blocks.push(Block::prose(content, start));
    }
}

/// Try to match a complete fenced block whose opening line starts at `at`.
fn match_fence(text: &str, at: usize) -> Option<Block> {
    let after_ticks = text[at..].strip_prefix(FENCE)?;
    let tag_len = after_ticks
        .bytes()
        .take_while(|b| b.is_ascii_alphanumeric() || *b == b'_')
        .count();
    if after_ticks.as_bytes().get(tag_len) != Some(&b'\n') {
        return None;
    }
    let tag = &after_ticks[..tag_len];
    let content_start = at + FENCE.len() + tag_len + 1;

    let mut line = content_start;
    loop {
        if is_closing_fence(text, line) {
            return Some(Block {
                kind: BlockKind::Code,
                content: text[content_start..line].to_string(),
                language: Some(normalize_language(tag).to_string()),
                start_index: at,
                end_index: line + FENCE.len(),
            });
        }
        line += text[line..].find('\n')? + 1;
    }
}

fn is_closing_fence(text: &str, line: usize) -> bool {
    let Some(rest) = text[line..].strip_prefix(FENCE) else {
        return false;
    };
    rest.is_empty() || rest.starts_with('\n') || rest.starts_with('\r')
}

/// Describe the cursor's surroundings: inside which code block (if any), and
/// the start and indentation of its line.
pub fn detect_code_context(text: &str, cursor_position: usize) -> CodeContext {
    let pos = clamp_offset(text, cursor_position);
    let line_start = line_start(text, pos);
    let indent = leading_whitespace(&text[line_start..pos]).to_string();

    let code_block = parse_content(text)
        .into_iter()
        .find(|block| block.is_code() && block.contains(pos));

    match code_block {
        Some(block) => CodeContext {
            in_code: true,
            language: block.language,
            line_start,
            indent,
        },
        None => CodeContext {
            in_code: false,
            language: None,
            line_start,
            indent,
        },
    }
}
