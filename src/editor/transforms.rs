//! Keystroke transforms over `(text, selection)`.
//!
//! Every function takes the current text and selection and returns the text
//! and selection to apply next. Nothing here touches a live widget.

use serde::Serialize;

use crate::cloze::{self, next_cloze_number};
use crate::document::{comment_syntax, detect_code_context};
use crate::offsets::{clamp_range, leading_whitespace, line_end, line_start};

const INDENT: &str = "  ";
const OPENING_BRACKETS: [char; 3] = ['{', '(', '['];
const CLOSING_BRACKETS: [char; 3] = [']', '}', ')'];

/// Text plus the selection to place after an edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditResult {
    pub text: String,
    pub selection_start: usize,
    pub selection_end: usize,
}

impl EditResult {
    const fn with_cursor(text: String, cursor: usize) -> Self {
        Self {
            text,
            selection_start: cursor,
            selection_end: cursor,
        }
    }
}

fn splice(text: &str, start: usize, end: usize, replacement: &str) -> String {
    let mut out = String::with_capacity(text.len() - (end - start) + replacement.len());
    out.push_str(&text[..start]);
    out.push_str(replacement);
    out.push_str(&text[end..]);
    out
}

/// Indent by two spaces.
///
/// A collapsed selection inserts two spaces at the cursor. A range indents
/// every line it touches.
pub fn indent_selection(text: &str, selection_start: usize, selection_end: usize) -> EditResult {
    let (start, end) = clamp_range(text, selection_start, selection_end);
    if start == end {
        return EditResult::with_cursor(splice(text, start, end, INDENT), start + INDENT.len());
    }

    let line_start = line_start(text, start);
    let indented = text[line_start..end]
        .split('\n')
        .map(|line| format!("{INDENT}{line}"))
        .collect::<Vec<_>>()
        .join("\n");

    EditResult {
        text: splice(text, line_start, end, &indented),
        selection_start: start + INDENT.len(),
        selection_end: line_start + indented.len(),
    }
}

/// Remove up to two leading spaces from each selected line.
///
/// A collapsed selection dedents the whole current line. Lines with fewer
/// than two leading spaces are left alone.
pub fn dedent_selection(text: &str, selection_start: usize, selection_end: usize) -> EditResult {
    let (start, end) = clamp_range(text, selection_start, selection_end);
    let collapsed = start == end;
    let line_start = line_start(text, start);
    let span_end = if collapsed { line_end(text, start) } else { end };

    let selected = &text[line_start..span_end];
    let dedented = selected
        .split('\n')
        .map(|line| line.strip_prefix(INDENT).unwrap_or(line))
        .collect::<Vec<_>>()
        .join("\n");
    let removed = selected.len() - dedented.len();
    let first_line_removed = if selected.starts_with(INDENT) {
        INDENT.len()
    } else {
        0
    };

    let new_start = start.saturating_sub(first_line_removed).max(line_start);
    let new_end = if collapsed {
        new_start
    } else {
        end.saturating_sub(removed).max(line_start)
    };

    EditResult {
        text: splice(text, line_start, span_end, &dedented),
        selection_start: new_start,
        selection_end: new_end,
    }
}

/// Replace the selection with a newline that keeps the current indentation.
///
/// After an opening bracket the new line gets one extra indent level.
pub fn insert_newline_with_indent(
    text: &str,
    selection_start: usize,
    selection_end: usize,
) -> EditResult {
    let (start, end) = clamp_range(text, selection_start, selection_end);
    let line_start = line_start(text, start);
    let indent = leading_whitespace(&text[line_start..start]);

    let mut insertion = format!("\n{indent}");
    if text[..start]
        .chars()
        .next_back()
        .is_some_and(|c| OPENING_BRACKETS.contains(&c))
    {
        insertion.push_str(INDENT);
    }

    EditResult::with_cursor(splice(text, start, end, &insertion), start + insertion.len())
}

/// Type a closing bracket one indent level shallower.
///
/// Fires only when everything before the cursor on its line is whitespace at
/// least two characters wide; otherwise `None` and the caller types the key
/// normally. A range selection is also left to the caller.
pub fn auto_dedent_closing(
    text: &str,
    selection_start: usize,
    selection_end: usize,
    closing: char,
) -> Option<EditResult> {
    if !CLOSING_BRACKETS.contains(&closing) {
        return None;
    }
    let (start, end) = clamp_range(text, selection_start, selection_end);
    if start != end {
        return None;
    }

    let line_start = line_start(text, start);
    let before_cursor = &text[line_start..start];
    if before_cursor.chars().count() < 2 || !before_cursor.chars().all(char::is_whitespace) {
        return None;
    }

    let mut chars = before_cursor.chars();
    chars.next();
    chars.next();
    let mut replacement = chars.as_str().to_string();
    replacement.push(closing);

    Some(EditResult::with_cursor(
        splice(text, line_start, start, &replacement),
        line_start + replacement.len(),
    ))
}

/// Wrap the selection in cloze `cloze_number`, or insert an empty one.
pub fn insert_cloze_at_selection(
    text: &str,
    selection_start: usize,
    selection_end: usize,
    cloze_number: u32,
) -> EditResult {
    let edit = cloze::insert_cloze_at_selection(text, selection_start, selection_end, cloze_number);
    EditResult::with_cursor(edit.new_text, edit.new_cursor_position)
}

/// Like [`insert_cloze_at_selection`], numbered after the highest cloze.
pub fn insert_next_cloze(text: &str, selection_start: usize, selection_end: usize) -> EditResult {
    insert_cloze_at_selection(text, selection_start, selection_end, next_cloze_number(text))
}

/// Insert a comment line holding a new empty cloze above the cursor's line.
///
/// The comment syntax follows the language of the surrounding code block, or
/// an HTML comment in prose. The cursor lands inside the new cloze.
pub fn insert_comment_cloze(text: &str, cursor_position: usize) -> EditResult {
    let context = detect_code_context(text, cursor_position);
    let syntax = comment_syntax(context.language.as_deref());
    let marker_open = format!("{{{{c{}::", next_cloze_number(text));

    let comment_line = format!(
        "{}{}{marker_open}}}}}{}\n",
        context.indent, syntax.prefix, syntax.suffix
    );
    let cursor = context.line_start + context.indent.len() + syntax.prefix.len() + marker_open.len();

    EditResult::with_cursor(
        splice(text, context.line_start, context.line_start, &comment_line),
        cursor,
    )
}

/// Add a hint to the cloze under the cursor.
///
/// `None` when the cursor is outside every cloze or the cloze has a hint.
pub fn add_cloze_hint(text: &str, cursor_position: usize, hint: &str) -> Option<EditResult> {
    cloze::add_hint_to_cloze(text, cursor_position, hint)
        .map(|edit| EditResult::with_cursor(edit.new_text, edit.new_cursor_position))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cloze::parse_clozes;

    #[test]
    fn test_indent_collapsed_inserts_two_spaces() {
        let result = indent_selection("ab", 1, 1);
        assert_eq!(result.text, "a  b");
        assert_eq!((result.selection_start, result.selection_end), (3, 3));
    }

    #[test]
    fn test_indent_range_prefixes_every_touched_line() {
        let result = indent_selection("a\nbc\nd", 3, 6);
        assert_eq!(result.text, "a\n  bc\n  d");
        assert_eq!(result.selection_start, 5);
        assert_eq!(result.selection_end, 10);
    }

    #[test]
    fn test_dedent_whole_selection() {
        let result = dedent_selection("  a\n  b", 0, 7);
        assert_eq!(result.text, "a\nb");
        assert_eq!((result.selection_start, result.selection_end), (0, 3));
    }

    #[test]
    fn test_dedent_collapsed_dedents_current_line() {
        let text = "x\n    foo\ny";
        let result = dedent_selection(text, 8, 8);
        assert_eq!(result.text, "x\n  foo\ny");
        assert_eq!((result.selection_start, result.selection_end), (6, 6));
    }

    #[test]
    fn test_dedent_leaves_shallow_lines_alone() {
        let result = dedent_selection(" a\n  b\nc", 0, 8);
        assert_eq!(result.text, " a\nb\nc");
        assert_eq!(result.selection_start, 0);
        assert_eq!(result.selection_end, 6);
    }

    #[test]
    fn test_dedent_cursor_inside_indent_clamps_to_line_start() {
        let result = dedent_selection("a\n  b", 3, 3);
        assert_eq!(result.text, "a\nb");
        assert_eq!(result.selection_start, 2);
    }

    #[test]
    fn test_dedent_tab_indent_does_not_move_cursor() {
        let result = dedent_selection("\tx", 1, 1);
        assert_eq!(result.text, "\tx");
        assert_eq!(result.selection_start, 1);
    }

    #[test]
    fn test_newline_keeps_indent() {
        let result = insert_newline_with_indent("  foo", 5, 5);
        assert_eq!(result.text, "  foo\n  ");
        assert_eq!(result.selection_start, 8);
    }

    #[test]
    fn test_newline_after_open_brace_adds_indent() {
        let result = insert_newline_with_indent("if (x) {", 8, 8);
        assert_eq!(result.text, "if (x) {\n  ");
        assert_eq!(result.selection_start, 11);

        let result = insert_newline_with_indent("  call(", 7, 7);
        assert_eq!(result.text, "  call(\n    ");
    }

    #[test]
    fn test_newline_replaces_selection() {
        let result = insert_newline_with_indent("ab cd", 2, 3);
        assert_eq!(result.text, "ab\ncd");
        assert_eq!(result.selection_end, 3);
    }

    #[test]
    fn test_auto_dedent_closing_brace() {
        let result = auto_dedent_closing("{\n    ", 6, 6, '}').unwrap();
        assert_eq!(result.text, "{\n  }");
        assert_eq!(result.selection_start, 5);

        let result = auto_dedent_closing("  ", 2, 2, ']').unwrap();
        assert_eq!(result.text, "]");
        assert_eq!(result.selection_start, 1);
    }

    #[test]
    fn test_auto_dedent_ignores_other_keys_and_text() {
        assert!(auto_dedent_closing("    ", 4, 4, 'a').is_none());
        assert!(auto_dedent_closing("  x ", 4, 4, '}').is_none());
        assert!(auto_dedent_closing(" ", 1, 1, ')').is_none());
        assert!(auto_dedent_closing("", 0, 0, ')').is_none());
        assert!(auto_dedent_closing("    ", 1, 4, '}').is_none());
    }

    #[test]
    fn test_auto_dedent_keeps_text_after_cursor() {
        let result = auto_dedent_closing("    x", 4, 4, ')').unwrap();
        assert_eq!(result.text, "  )x");
        assert_eq!(result.selection_start, 3);
    }

    #[test]
    fn test_insert_cloze_wraps_selection() {
        let result = insert_cloze_at_selection("Hello world!", 6, 11, 1);
        assert_eq!(result.text, "Hello {{c1::world}}!");
        assert_eq!((result.selection_start, result.selection_end), (19, 19));
    }

    #[test]
    fn test_insert_next_cloze_continues_numbering() {
        let result = insert_next_cloze("{{c2::a}} b", 10, 11);
        assert_eq!(result.text, "{{c2::a}} {{c3::b}}");
    }

    #[test]
    fn test_comment_cloze_in_typescript() {
        let text = "```ts\n  const a = 1;\n```";
        let result = insert_comment_cloze(text, 8);
        assert_eq!(result.text, "```ts\n  // {{c1::}}\n  const a = 1;\n```");
        assert_eq!(result.selection_start, 17);
        assert_eq!(&result.text[..result.selection_start], "```ts\n  // {{c1::");
    }

    #[test]
    fn test_comment_cloze_in_css_uses_block_comment() {
        let text = "```css\na { color: red; }\n```";
        let result = insert_comment_cloze(text, 10);
        assert!(result.text.contains("/* {{c1::}} */\na {"));
    }

    #[test]
    fn test_comment_cloze_in_prose_uses_html_comment() {
        let text = "{{c4::x}}\nsome prose";
        let result = insert_comment_cloze(text, 12);
        assert_eq!(result.text, "{{c4::x}}\n<!-- {{c5::}} -->\nsome prose");
        let clozes = parse_clozes(&result.text);
        assert_eq!(clozes[1].content_start_index, result.selection_start);
    }

    #[test]
    fn test_add_cloze_hint() {
        let result = add_cloze_hint("{{c1::world}}", 8, "greeting").unwrap();
        assert_eq!(result.text, "{{c1::world::greeting}}");
        assert!(add_cloze_hint(&result.text, 8, "x").is_none());
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn indent_then_dedent_restores_text(
                text in "[a-z \n]{0,40}",
                a in 0..40usize,
                b in 0..40usize,
            ) {
                let (start, end) = clamp_range(&text, a, b);
                prop_assume!(start != end);
                let indented = indent_selection(&text, start, end);
                let restored = dedent_selection(
                    &indented.text,
                    indented.selection_start,
                    indented.selection_end,
                );
                prop_assert_eq!(restored.text, text);
            }

            #[test]
            fn selections_stay_in_bounds(
                text in "[a-z {}\n]{0,40}",
                a in 0..60usize,
                b in 0..60usize,
            ) {
                for result in [
                    indent_selection(&text, a, b),
                    dedent_selection(&text, a, b),
                    insert_newline_with_indent(&text, a, b),
                    insert_comment_cloze(&text, a),
                    insert_next_cloze(&text, a, b),
                ] {
                    prop_assert!(result.selection_start <= result.selection_end);
                    prop_assert!(result.selection_end <= result.text.len());
                }
            }
        }
    }
}
