//! Card source splitting.
//!
//! This module handles:
//! - Splitting card text into prose and fenced code blocks
//! - Normalizing fence language tags
//! - Locating the cursor relative to code blocks
//! - Picking comment syntax for a language

mod parser;
mod types;

pub use parser::{detect_code_context, parse_content};
pub use types::{Block, BlockKind, CodeContext, CommentSyntax};

/// Language used for fences with no tag or an unrecognized one.
pub const PLAINTEXT: &str = "plaintext";

/// Fence tags we recognize, and the language each one means.
const LANGUAGE_ALIASES: &[(&str, &str)] = &[
    ("ts", "typescript"),
    ("typescript", "typescript"),
    ("tsx", "tsx"),
    ("react", "tsx"),
    ("js", "javascript"),
    ("javascript", "javascript"),
    ("jsx", "jsx"),
    ("css", "css"),
    ("scss", "scss"),
    ("html", "html"),
];

/// Map a fence tag to its canonical language name.
///
/// Lookup is case-insensitive and ignores surrounding whitespace. Anything
/// not in the table, including the empty tag, is [`PLAINTEXT`].
pub fn normalize_language(tag: &str) -> &'static str {
    let tag = tag.trim().to_ascii_lowercase();
    LANGUAGE_ALIASES
        .iter()
        .find(|(alias, _)| *alias == tag)
        .map_or(PLAINTEXT, |&(_, language)| language)
}

/// Comment delimiters for a normalized language.
///
/// No language means the cursor is in prose, where an HTML comment keeps the
/// cloze out of the rendered card.
pub fn comment_syntax(language: Option<&str>) -> CommentSyntax {
    const BLOCK: CommentSyntax = CommentSyntax {
        prefix: "/* ",
        suffix: " */",
    };
    const MARKUP: CommentSyntax = CommentSyntax {
        prefix: "<!-- ",
        suffix: " -->",
    };
    const LINE: CommentSyntax = CommentSyntax {
        prefix: "// ",
        suffix: "",
    };

    match language {
        Some("css" | "scss") => BLOCK,
        Some("html") | None => MARKUP,
        Some(_) => LINE,
    }
}
