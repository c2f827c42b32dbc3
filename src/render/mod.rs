//! HTML rendering of card text.
//!
//! Each block is rendered on its own:
//!
//! 1. Cloze markers are [masked](mask::mask) so formatters cannot touch them.
//! 2. Code goes through the [`Highlighter`] (or is escaped as plain text);
//!    prose is escaped and [formatted](prose::format_prose).
//! 3. The formatted HTML is [unmasked](mask::unmask) and each cloze is
//!    either written back as literal `{{cN::...}}` text ([`RenderMode::Output`])
//!    or styled for the preview ([`RenderMode::Preview`]).
//!
//! A highlighter failure only degrades the block it happened in.

pub mod mask;
mod preview;
mod prose;
mod style;

use std::fmt::Write as _;

use html_escape::encode_quoted_attribute;

use crate::cloze::max_cloze_number;
use crate::document::{Block, BlockKind, PLAINTEXT, parse_content};
use crate::highlight::{DEFAULT_THEME, HighlightRequest, Highlighter};

use mask::{Piece, unmask};
use style::{CODE_STYLE, PRE_STYLE, WRAPPER_STYLE};

/// How clozes appear in the preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClozeView {
    /// Every cloze labelled with its number, hints visible
    #[default]
    Edit,
    /// The active cloze number is hidden behind `[...]` or its hint
    Hidden { active: u32 },
    /// The active cloze number is emphasised
    Revealed { active: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    Preview(ClozeView),
    /// Portable HTML with cloze markers kept as literal text
    Output,
}

#[derive(Clone, Copy)]
pub struct RenderOptions<'a> {
    /// `None` while the highlighter loads, or when it is unavailable
    pub highlighter: Option<&'a dyn Highlighter>,
    pub theme: &'a str,
    pub mode: RenderMode,
}

impl std::fmt::Debug for RenderOptions<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderOptions")
            .field("highlighter", &self.highlighter.is_some())
            .field("theme", &self.theme)
            .field("mode", &self.mode)
            .finish()
    }
}

impl<'a> RenderOptions<'a> {
    pub const fn new(mode: RenderMode, highlighter: Option<&'a dyn Highlighter>) -> Self {
        Self {
            highlighter,
            theme: DEFAULT_THEME,
            mode,
        }
    }

    #[must_use]
    pub const fn with_theme(mut self, theme: &'a str) -> Self {
        self.theme = theme;
        self
    }
}

/// Render card text to one self-contained HTML fragment.
pub fn render(text: &str, options: &RenderOptions<'_>) -> String {
    let mut html = String::with_capacity(text.len() * 2 + WRAPPER_STYLE.len());
    let _ = write!(html, r#"<div style="{WRAPPER_STYLE}">"#);
    for block in parse_content(text) {
        match block.kind {
            BlockKind::Code => html.push_str(&render_code(&block, options)),
            BlockKind::Prose => html.push_str(&render_prose(&block, options.mode)),
        }
    }
    html.push_str("</div>");
    html
}

/// Render for the on-screen preview with the default theme.
pub fn render_for_preview(
    text: &str,
    highlighter: Option<&dyn Highlighter>,
    view: ClozeView,
) -> String {
    render(text, &RenderOptions::new(RenderMode::Preview(view), highlighter))
}

/// Render portable HTML for the clipboard with the default theme.
pub fn render_for_output(text: &str, highlighter: Option<&dyn Highlighter>) -> String {
    render(text, &RenderOptions::new(RenderMode::Output, highlighter))
}

/// Highest cloze number in the card, or 0.
pub fn cloze_count(text: &str) -> u32 {
    max_cloze_number(text)
}

fn render_code(block: &Block, options: &RenderOptions<'_>) -> String {
    let masked = mask::mask(&block.content);
    let language = block.language.as_deref().unwrap_or(PLAINTEXT);

    let body = match options.highlighter {
        Some(highlighter) if language != PLAINTEXT => {
            let request = HighlightRequest {
                language,
                theme: options.theme,
            };
            highlighter
                .code_to_html(&masked, &request)
                .unwrap_or_else(|err| {
                    tracing::warn!(%err, language, "highlighting failed, rendering plain");
                    encode_quoted_attribute(&masked).into_owned()
                })
        }
        _ => encode_quoted_attribute(&masked).into_owned(),
    };

    format!(
        r#"<pre style="{PRE_STYLE}"><code style="{CODE_STYLE}">{}</code></pre>"#,
        restore_clozes(&body, options.mode)
    )
}

fn render_prose(block: &Block, mode: RenderMode) -> String {
    let masked = mask::mask(&block.content);
    let html = prose::format_prose(&encode_quoted_attribute(&masked));
    restore_clozes(&html, mode)
}

fn restore_clozes(html: &str, mode: RenderMode) -> String {
    let mut out = String::with_capacity(html.len());
    for piece in unmask(html) {
        match piece {
            Piece::Html(html) => out.push_str(&html),
            Piece::Cloze {
                number,
                content,
                hint,
            } => match mode {
                RenderMode::Output => {
                    let _ = write!(out, "{{{{c{number}::{content}");
                    if let Some(hint) = hint {
                        let _ = write!(out, "::{hint}");
                    }
                    out.push_str("}}");
                }
                RenderMode::Preview(view) => {
                    out.push_str(&preview::cloze_html(number, &content, hint.as_deref(), view));
                }
            },
        }
    }
    out
}
