//! Formatting for prose blocks.

use once_cell::sync::Lazy;
use regex::Regex;

use super::style::{HR_STYLE, INLINE_CODE_STYLE, PARAGRAPH_STYLE};

static BOLD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*([^*]+)\*\*").unwrap());
static ITALIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*([^*]+)\*").unwrap());
static INLINE_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"`([^`]+)`").unwrap());
static RULE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^---$").unwrap());

/// Format escaped prose as paragraphs.
///
/// Expects text that is already HTML-escaped. Supports `**bold**`,
/// `*italic*`, `` `code` ``, `---` rules, blank-line paragraph breaks and
/// single-newline line breaks.
pub fn format_prose(escaped: &str) -> String {
    let text = escaped.replace("\r\n", "\n");
    let text = text.trim_matches('\n');

    let text = BOLD.replace_all(text, r#"<strong style="font-weight: 700;">$1</strong>"#);
    let text = ITALIC.replace_all(&text, r#"<em style="font-style: italic;">$1</em>"#);
    let text = INLINE_CODE.replace_all(&text, format!(r#"<code style="{INLINE_CODE_STYLE}">$1</code>"#));
    let text = RULE.replace_all(&text, format!(r#"<hr style="{HR_STYLE}">"#));

    let text = text
        .replace("\n\n", &format!(r#"</p><p style="{PARAGRAPH_STYLE}">"#))
        .replace('\n', "<br>");

    format!(r#"<p style="{PARAGRAPH_STYLE}">{text}</p>"#)
}
