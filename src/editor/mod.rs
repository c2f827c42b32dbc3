//! Pure editing operations for card text.
//!
//! Editor keystrokes (Tab, Shift-Tab, Enter, closing brackets, cloze
//! hotkeys) map to functions computing the next text and selection. A thin
//! adapter outside this crate applies the result to a real widget, using
//! [`minimal_replacement`] to keep its undo history small.

mod diff;
mod transforms;

pub use diff::{Replacement, clamp_selection, minimal_replacement};
pub use transforms::{
    EditResult, add_cloze_hint, auto_dedent_closing, dedent_selection, indent_selection,
    insert_cloze_at_selection, insert_comment_cloze, insert_newline_with_indent,
    insert_next_cloze,
};
