//! Syntax highlighting for code blocks.
//!
//! Rendering only needs one capability: turn a code block into inline-styled
//! HTML, or fail. [`Highlighter`] is that seam; [`SyntectHighlighter`] is the
//! implementation used by default, built on syntect's Sublime Text syntax
//! definitions and themes.

mod loader;

use std::path::PathBuf;

use syntect::easy::HighlightLines;
use syntect::highlighting::ThemeSet;
use syntect::html::{IncludeBackground, styled_line_to_highlighted_html};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;
use thiserror::Error;

pub use loader::{HighlighterLoader, HighlighterState, LoadError, configure_shared, shared};

/// Theme used when none is configured. A light theme, since exported cards
/// are usually shown on a white background.
pub const DEFAULT_THEME: &str = "InspiredGitHub";

/// What to highlight a block as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighlightRequest<'a> {
    /// Normalized language name (see [`crate::document::normalize_language`])
    pub language: &'a str,
    pub theme: &'a str,
}

#[derive(Debug, Error)]
pub enum HighlightError {
    #[error("no syntax available for language `{0}`")]
    UnsupportedLanguage(String),

    #[error("unknown theme `{0}`")]
    UnknownTheme(String),

    #[error("highlighting failed: {0}")]
    Syntect(#[from] syntect::Error),
}

/// Turns source code into HTML.
///
/// Implementations return the highlighted body only: inline-styled markup
/// for the code's text, without a surrounding `<pre>` or `<code>`. All text
/// must come back HTML-escaped. Any text passed in, including characters
/// the language would consider invalid, must reach the output in order.
pub trait Highlighter {
    /// Highlight `code`.
    ///
    /// # Errors
    /// Returns an error when the language or theme is not available, or when
    /// the underlying engine fails.
    fn code_to_html(&self, code: &str, request: &HighlightRequest<'_>)
    -> Result<String, HighlightError>;
}

/// Extra syntax and theme folders to load alongside syntect's defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HighlightSource {
    /// Folder of `.sublime-syntax` files
    pub syntax_dir: Option<PathBuf>,
    /// Folder of `.tmTheme` files
    pub theme_dir: Option<PathBuf>,
}

/// syntect-backed highlighter.
#[derive(Debug)]
pub struct SyntectHighlighter {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
}

impl SyntectHighlighter {
    /// Load the bundled syntaxes and themes.
    pub fn load_defaults() -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
        }
    }

    /// Load the bundled syntaxes and themes plus any extra folders.
    ///
    /// # Errors
    /// Returns an error if an extra folder cannot be read or holds an
    /// invalid definition.
    pub fn load(source: &HighlightSource) -> Result<Self, LoadError> {
        let mut highlighter = Self::load_defaults();

        if let Some(dir) = &source.syntax_dir {
            let mut builder = highlighter.syntax_set.into_builder();
            builder
                .add_from_folder(dir, true)
                .map_err(|err| LoadError::Syntaxes {
                    path: dir.clone(),
                    message: err.to_string(),
                })?;
            highlighter.syntax_set = builder.build();
        }

        if let Some(dir) = &source.theme_dir {
            highlighter
                .theme_set
                .add_from_folder(dir)
                .map_err(|err| LoadError::Themes {
                    path: dir.clone(),
                    message: err.to_string(),
                })?;
        }

        tracing::debug!(
            syntaxes = highlighter.syntax_set.syntaxes().len(),
            themes = highlighter.theme_set.themes.len(),
            "highlighter loaded"
        );
        Ok(highlighter)
    }

    /// Names of the available themes.
    pub fn theme_names(&self) -> impl Iterator<Item = &str> {
        self.theme_set.themes.keys().map(String::as_str)
    }
}

/// syntect token to fall back on when no syntax is registered under the
/// language's own name. The bundled set has no TypeScript, JSX or SCSS
/// grammar, so those borrow the nearest one.
fn fallback_token(language: &str) -> Option<&'static str> {
    match language {
        "typescript" | "tsx" | "javascript" | "jsx" => Some("js"),
        "css" | "scss" => Some("css"),
        "html" => Some("html"),
        _ => None,
    }
}

impl Highlighter for SyntectHighlighter {
    fn code_to_html(
        &self,
        code: &str,
        request: &HighlightRequest<'_>,
    ) -> Result<String, HighlightError> {
        let syntax = self
            .syntax_set
            .find_syntax_by_token(request.language)
            .or_else(|| {
                fallback_token(request.language)
                    .and_then(|token| self.syntax_set.find_syntax_by_token(token))
            })
            .ok_or_else(|| HighlightError::UnsupportedLanguage(request.language.to_string()))?;
        let theme = self
            .theme_set
            .themes
            .get(request.theme)
            .ok_or_else(|| HighlightError::UnknownTheme(request.theme.to_string()))?;

        let mut highlighter = HighlightLines::new(syntax, theme);
        let mut html = String::with_capacity(code.len() * 4);
        for line in LinesWithEndings::from(code) {
            let regions = highlighter.highlight_line(line, &self.syntax_set)?;
            html.push_str(&styled_line_to_highlighted_html(
                &regions,
                IncludeBackground::No,
            )?);
        }
        Ok(html)
    }
}
