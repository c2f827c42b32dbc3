//! Minimal replacement between two texts.
//!
//! An adapter applying an [`EditResult`](super::EditResult) to a live text
//! widget replaces only the span that changed, so the widget's undo history
//! records one small edit rather than a whole-document swap.

use serde::Serialize;

/// Replace `start..end` of the old text with `text` to obtain the new one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Replacement {
    pub start: usize,
    pub end: usize,
    pub text: String,
}

/// The smallest single-span replacement turning `current` into `next`.
///
/// Computed from the longest common prefix and suffix, on char boundaries.
/// Returns `None` when the texts are equal.
pub fn minimal_replacement(current: &str, next: &str) -> Option<Replacement> {
    if current == next {
        return None;
    }

    let prefix = current
        .char_indices()
        .zip(next.chars())
        .find(|((_, a), b)| a != b)
        .map_or_else(|| current.len().min(next.len()), |((i, _), _)| i);

    let max_suffix = (current.len() - prefix).min(next.len() - prefix);
    let suffix = current[prefix..]
        .chars()
        .rev()
        .zip(next[prefix..].chars().rev())
        .take_while(|(a, b)| a == b)
        .map(|(a, _)| a.len_utf8())
        .scan(0, |total, len| {
            *total += len;
            Some(*total)
        })
        .take_while(|total| *total <= max_suffix)
        .last()
        .unwrap_or(0);

    Some(Replacement {
        start: prefix,
        end: current.len() - suffix,
        text: next[prefix..next.len() - suffix].to_string(),
    })
}

/// Clamp a selection to `len` and order its ends.
pub fn clamp_selection(len: usize, start: usize, end: usize) -> (usize, usize) {
    let start = start.min(len);
    let end = end.min(len);
    (start.min(end), start.max(end))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(current: &str, replacement: &Replacement) -> String {
        format!(
            "{}{}{}",
            &current[..replacement.start],
            replacement.text,
            &current[replacement.end..]
        )
    }

    #[test]
    fn test_equal_texts_need_no_replacement() {
        assert_eq!(minimal_replacement("same", "same"), None);
    }

    #[test]
    fn test_insertion_in_middle() {
        let r = minimal_replacement("ab", "a  b").unwrap();
        assert_eq!((r.start, r.end, r.text.as_str()), (1, 1, "  "));
    }

    #[test]
    fn test_deletion_at_line_start() {
        let r = minimal_replacement("x\n  y", "x\ny").unwrap();
        assert_eq!(r.start, 2);
        assert_eq!(r.end, 4);
        assert_eq!(r.text, "");
    }

    #[test]
    fn test_repeated_characters_do_not_overlap() {
        let r = minimal_replacement("aaa", "aaaa").unwrap();
        assert_eq!(apply("aaa", &r), "aaaa");
        assert!(r.start <= r.end);
    }

    #[test]
    fn test_multibyte_boundaries() {
        let r = minimal_replacement("é1é", "é2é").unwrap();
        assert_eq!((r.start, r.end, r.text.as_str()), (2, 3, "2"));
    }

    #[test]
    fn test_clamp_selection() {
        assert_eq!(clamp_selection(5, 9, 2), (2, 5));
        assert_eq!(clamp_selection(5, 1, 3), (1, 3));
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn replacement_reproduces_next(current in "[ab é\n]{0,20}", next in "[ab é\n]{0,20}") {
                match minimal_replacement(&current, &next) {
                    None => prop_assert_eq!(&current, &next),
                    Some(r) => prop_assert_eq!(apply(&current, &r), next),
                }
            }
        }
    }
}
