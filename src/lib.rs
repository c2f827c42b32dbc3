// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. cloze::ClozeMatch)
    clippy::module_name_repetitions
)]

//! # clozewright
//!
//! Core of a cloze flashcard editor for cards that mix prose and source code.
//!
//! Cards are plain text. Code goes in ```` ``` ```` fences with an optional
//! language tag, and clozes are marked `{{c1::hidden text::optional hint}}`.
//! The crate turns that text into self-contained HTML, either as an
//! on-screen preview or as portable output that keeps the cloze markers
//! for import into flashcard software.
//!
//! ## Modules
//!
//! - [`cloze`]: Cloze marker parsing and insertion
//! - [`document`]: Splitting cards into prose and code blocks
//! - [`editor`]: Pure keystroke transforms over text and selection
//! - [`render`]: HTML rendering and cloze masking
//! - [`highlight`]: Syntax highlighting and its background loader
//! - [`config`]: Saved command-line defaults
//! - [`watcher`]: File watching for live re-rendering

pub mod cloze;
pub mod config;
pub mod document;
pub mod editor;
pub mod highlight;
mod offsets;
pub mod render;
pub mod watcher;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::cloze::{ClozeMatch, parse_clozes};
    pub use crate::document::{Block, BlockKind, parse_content};
    pub use crate::editor::EditResult;
    pub use crate::highlight::{Highlighter, SyntectHighlighter};
    pub use crate::render::{ClozeView, RenderMode, RenderOptions, render};
}
