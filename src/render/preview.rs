//! Cloze presentation for the interactive preview.
//!
//! A cloze's formatted content may open or close highlighter spans that
//! started outside it, so it cannot be wrapped in one element. Styles are
//! applied to each text run between tags instead; the tags themselves pass
//! through untouched and in order.

use std::fmt::Write as _;

use super::ClozeView;
use super::style::{BADGE_STYLE, CLOZE_STYLE, HIDDEN_STYLE, HINT_STYLE, REVEALED_STYLE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment<'a> {
    Tag(&'a str),
    Text(&'a str),
}

/// Split HTML into tags and the text runs between them.
fn segments(html: &str) -> impl Iterator<Item = Segment<'_>> {
    let mut rest = html;
    std::iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }
        let len = if rest.starts_with('<') {
            rest.find('>').map_or(rest.len(), |end| end + 1)
        } else {
            rest.find('<').unwrap_or(rest.len())
        };
        let (head, tail) = rest.split_at(len);
        rest = tail;
        Some(if head.starts_with('<') {
            Segment::Tag(head)
        } else {
            Segment::Text(head)
        })
    })
}

/// Wrap every text run of `html` in a span carrying `style`.
pub fn wrap_text_runs(html: &str, style: &str) -> String {
    let mut out = String::with_capacity(html.len() + 32);
    for segment in segments(html) {
        match segment {
            Segment::Tag(tag) => out.push_str(tag),
            Segment::Text(text) => {
                let _ = write!(out, r#"<span style="{style}">{text}</span>"#);
            }
        }
    }
    out
}

/// Only the tags of `html`.
pub fn tags_only(html: &str) -> String {
    segments(html)
        .filter_map(|segment| match segment {
            Segment::Tag(tag) => Some(tag),
            Segment::Text(_) => None,
        })
        .collect()
}

/// Only the text of `html`, still escaped.
pub fn text_only(html: &str) -> String {
    segments(html)
        .filter_map(|segment| match segment {
            Segment::Text(text) => Some(text),
            Segment::Tag(_) => None,
        })
        .collect()
}

/// Render one cloze for the preview.
pub fn cloze_html(number: u32, content: &str, hint: Option<&str>, view: ClozeView) -> String {
    let mut out = String::new();
    match view {
        ClozeView::Edit => {
            let _ = write!(out, r#"<span style="{BADGE_STYLE}">c{number}</span>"#);
            out.push_str(&wrap_text_runs(content, CLOZE_STYLE));
            if let Some(hint) = hint {
                let _ = write!(out, r#"<span style="{HINT_STYLE}">::</span>"#);
                out.push_str(&wrap_text_runs(hint, HINT_STYLE));
            }
        }
        ClozeView::Hidden { active } if active == number => {
            let label = hint.map(text_only).filter(|label| !label.trim().is_empty());
            let label = label.as_deref().unwrap_or("...");
            let _ = write!(out, r#"<span style="{HIDDEN_STYLE}">[{label}]</span>"#);
            out.push_str(&tags_only(content));
            out.push_str(&tags_only(hint.unwrap_or_default()));
        }
        ClozeView::Revealed { active } if active == number => {
            out.push_str(&wrap_text_runs(content, REVEALED_STYLE));
            out.push_str(&tags_only(hint.unwrap_or_default()));
        }
        ClozeView::Hidden { .. } | ClozeView::Revealed { .. } => {
            out.push_str(content);
            out.push_str(&tags_only(hint.unwrap_or_default()));
        }
    }
    out
}
