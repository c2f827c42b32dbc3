//! Byte-offset helpers shared by the parsers and the edit transforms.
//!
//! Callers hand us offsets that came from somewhere else (a widget, a CLI
//! flag), so every public entry point runs them through [`clamp_offset`]
//! before slicing.

/// Clamp `pos` to `text.len()` and floor it to a char boundary.
pub fn clamp_offset(text: &str, pos: usize) -> usize {
    let mut pos = pos.min(text.len());
    while !text.is_char_boundary(pos) {
        pos -= 1;
    }
    pos
}

/// Clamp both ends of a selection and order them.
pub fn clamp_range(text: &str, start: usize, end: usize) -> (usize, usize) {
    let start = clamp_offset(text, start);
    let end = clamp_offset(text, end);
    (start.min(end), start.max(end))
}

/// Offset of the first byte of the line containing `pos`.
pub fn line_start(text: &str, pos: usize) -> usize {
    text[..pos].rfind('\n').map_or(0, |i| i + 1)
}

/// Offset of the `\n` ending the line containing `pos`, or `text.len()`.
pub fn line_end(text: &str, pos: usize) -> usize {
    text[pos..].find('\n').map_or(text.len(), |i| pos + i)
}

/// The leading whitespace run of `line`.
pub fn leading_whitespace(line: &str) -> &str {
    let end = line
        .char_indices()
        .find(|(_, c)| !c.is_whitespace())
        .map_or(line.len(), |(i, _)| i);
    &line[..end]
}
