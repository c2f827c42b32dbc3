//! Cloze marker parsing and manipulation.
//!
//! A cloze marker is `{{cN::content}}` or `{{cN::content::hint}}`. Markers are
//! found with a single forward scan; malformed markers simply do not match.
//!
//! # Example
//!
//! ```
//! use clozewright::cloze::{parse_clozes, wrap_with_cloze};
//!
//! let text = format!("Hello {}!", wrap_with_cloze("world", 1));
//! let clozes = parse_clozes(&text);
//! assert_eq!(clozes.len(), 1);
//! assert_eq!(clozes[0].content, "world");
//! assert_eq!((clozes[0].start_index, clozes[0].end_index), (6, 19));
//! ```

use serde::Serialize;

use crate::offsets::{clamp_offset, clamp_range};

const OPEN: &[u8] = b"{{c";
const SEPARATOR: &[u8] = b"::";
const CLOSE: &[u8] = b"}}";

/// One recognized cloze marker.
///
/// All offsets are byte offsets into the parsed text. `start_index..end_index`
/// covers the whole marker, `content_start_index..content_end_index` only the
/// content (never the hint).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClozeMatch {
    pub cloze_number: u32,
    pub content: String,
    pub hint: Option<String>,
    pub start_index: usize,
    pub end_index: usize,
    pub content_start_index: usize,
    pub content_end_index: usize,
}

/// Result of a cloze insertion: the new text and where the cursor goes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClozeEdit {
    pub new_text: String,
    pub new_cursor_position: usize,
}

/// Find every cloze marker in `text`, in order.
///
/// Content runs to the first `}}` (or to the first `::`, which starts the
/// hint). A candidate whose content would cross another `{{cN::` start is
/// rejected, and scanning resumes one byte after its opening brace.
pub fn parse_clozes(text: &str) -> Vec<ClozeMatch> {
    let bytes = text.as_bytes();
    let mut matches = Vec::new();
    let mut pos = 0;

    while let Some(found) = find_bytes(&bytes[pos..], OPEN) {
        let start = pos + found;
        match scan_cloze(text, start) {
            Some(cloze) => {
                pos = cloze.end_index;
                matches.push(cloze);
            }
            None => pos = start + 1,
        }
    }

    matches
}

fn scan_cloze(text: &str, start: usize) -> Option<ClozeMatch> {
    let bytes = text.as_bytes();
    let (cloze_number, content_start) = read_open(bytes, start)?;

    let mut i = content_start;
    while i < bytes.len() {
        let rest = &bytes[i..];
        if rest.starts_with(CLOSE) {
            return Some(ClozeMatch {
                cloze_number,
                content: text[content_start..i].to_string(),
                hint: None,
                start_index: start,
                end_index: i + CLOSE.len(),
                content_start_index: content_start,
                content_end_index: i,
            });
        }
        if rest.starts_with(SEPARATOR) {
            let hint_start = i + SEPARATOR.len();
            let hint_end = hint_start + find_bytes(&bytes[hint_start..], CLOSE)?;
            return Some(ClozeMatch {
                cloze_number,
                content: text[content_start..i].to_string(),
                hint: Some(text[hint_start..hint_end].to_string()),
                start_index: start,
                end_index: hint_end + CLOSE.len(),
                content_start_index: content_start,
                content_end_index: i,
            });
        }
        if read_open(bytes, i).is_some() {
            return None;
        }
        i += 1;
    }

    None
}

/// Parse `{{c<digits>::` at `at`, returning the number and the content start.
fn read_open(bytes: &[u8], at: usize) -> Option<(u32, usize)> {
    if !bytes.get(at..)?.starts_with(OPEN) {
        return None;
    }
    let digits_start = at + OPEN.len();
    let digits_len = bytes[digits_start..]
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .count();
    if digits_len == 0 {
        return None;
    }
    let digits_end = digits_start + digits_len;
    if !bytes[digits_end..].starts_with(SEPARATOR) {
        return None;
    }
    let number = std::str::from_utf8(&bytes[digits_start..digits_end])
        .ok()?
        .parse::<u32>()
        .ok()?;
    Some((number, digits_end + SEPARATOR.len()))
}

fn find_bytes(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// The first cloze whose marker contains `pos` (both ends inclusive).
pub fn is_inside_cloze(text: &str, pos: usize) -> Option<ClozeMatch> {
    parse_clozes(text)
        .into_iter()
        .find(|cloze| pos >= cloze.start_index && pos <= cloze.end_index)
}

/// Highest cloze number in `text`, or 0 when there are none.
pub fn max_cloze_number(text: &str) -> u32 {
    parse_clozes(text)
        .iter()
        .map(|cloze| cloze.cloze_number)
        .max()
        .unwrap_or(0)
}

/// The number a new cloze should get: one past the highest seen.
pub fn next_cloze_number(text: &str) -> u32 {
    max_cloze_number(text).saturating_add(1)
}

pub fn wrap_with_cloze(text: &str, cloze_number: u32) -> String {
    format!("{{{{c{cloze_number}::{text}}}}}")
}

pub fn wrap_with_cloze_hint(text: &str, cloze_number: u32, hint: &str) -> String {
    format!("{{{{c{cloze_number}::{text}::{hint}}}}}")
}

/// Wrap the selection in a cloze, or insert an empty one at the cursor.
///
/// With an empty selection the cursor lands inside the new marker, ready to
/// type; otherwise it lands right after the closing `}}`.
pub fn insert_cloze_at_selection(
    text: &str,
    selection_start: usize,
    selection_end: usize,
    cloze_number: u32,
) -> ClozeEdit {
    let (start, end) = clamp_range(text, selection_start, selection_end);
    let prefix = format!("{{{{c{cloze_number}::");
    let selected = &text[start..end];

    let mut new_text = String::with_capacity(text.len() + prefix.len() + CLOSE.len());
    new_text.push_str(&text[..start]);
    new_text.push_str(&prefix);
    new_text.push_str(selected);
    new_text.push_str("}}");
    new_text.push_str(&text[end..]);

    let new_cursor_position = if selected.is_empty() {
        start + prefix.len()
    } else {
        start + prefix.len() + selected.len() + CLOSE.len()
    };

    ClozeEdit {
        new_text,
        new_cursor_position,
    }
}

/// Add `::hint` to the cloze containing `cursor_position`.
///
/// Returns `None` when the cursor is not inside a cloze or the cloze already
/// carries a hint.
pub fn add_hint_to_cloze(text: &str, cursor_position: usize, hint: &str) -> Option<ClozeEdit> {
    let cursor_position = clamp_offset(text, cursor_position);
    let cloze = is_inside_cloze(text, cursor_position)?;
    if cloze.hint.is_some() {
        return None;
    }

    let split = cloze.content_end_index;
    let new_text = format!("{}::{hint}{}", &text[..split], &text[split..]);
    Some(ClozeEdit {
        new_text,
        new_cursor_position: split + SEPARATOR.len() + hint.len(),
    })
}
