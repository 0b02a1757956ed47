//! Line-number mapping from a chunk back to its source document
//!
//! Given an original document and a chunk derived from it, computes the
//! 1-based line span the chunk occupies. Exact substring search first; if
//! that fails, a line-by-line fallback matches lines against the chunk and
//! against sentence fragments of the chunk. The fallback is a known
//! approximation and can over-match on short lines.

use std::collections::BTreeMap;

/// Sentinel for "could not be determined"
pub const UNKNOWN_LINE: i64 = -1;

/// Line span of a chunk within its source document.
///
/// `start_line` and `end_line` are 1-based; both are [`UNKNOWN_LINE`] when
/// the chunk could not be located. `line_map` carries the original content
/// of each matched line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineSpan {
    pub start_line: i64,
    pub end_line: i64,
    pub line_numbers: Vec<i64>,
    pub line_map: BTreeMap<i64, String>,
}

impl LineSpan {
    fn not_found() -> Self {
        Self {
            start_line: UNKNOWN_LINE,
            end_line: UNKNOWN_LINE,
            line_numbers: Vec::new(),
            line_map: BTreeMap::new(),
        }
    }

    pub fn is_known(&self) -> bool {
        self.start_line != UNKNOWN_LINE
    }
}

fn count_newlines(text: &str) -> i64 {
    text.bytes().filter(|&b| b == b'\n').count() as i64
}

/// Locate `chunk` within `original` and return its 1-based line span.
///
/// Repeated chunk text resolves to the first occurrence. When
/// `include_whitespace` is false, whitespace-only lines are excluded from
/// fallback matching. Pure and deterministic for identical inputs.
pub fn locate_chunk(original: &str, chunk: &str, include_whitespace: bool) -> LineSpan {
    let chunk = chunk.trim();
    if chunk.is_empty() {
        return LineSpan::not_found();
    }

    let original_lines: Vec<&str> = original.lines().collect();
    let mut line_numbers = Vec::new();
    let mut line_map = BTreeMap::new();

    if let Some(start) = original.find(chunk) {
        // Exact hit: line numbers from newline counts around the match
        let start_line = count_newlines(&original[..start]) + 1;
        let end_line = count_newlines(&original[..start + chunk.len()]) + 1;

        for i in start_line..=end_line {
            line_numbers.push(i);
            let idx = (i - 1) as usize;
            if idx < original_lines.len() {
                line_map.insert(i, original_lines[idx].to_string());
            }
        }
    } else {
        // Fallback: line-by-line partial matching against the chunk and
        // against its sentence fragments
        let fragments: Vec<&str> = chunk
            .split('.')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();

        for (i, line) in original_lines.iter().enumerate() {
            let line_num = (i + 1) as i64;
            let stripped = line.trim();

            if stripped.is_empty() && !include_whitespace {
                continue;
            }

            if chunk.contains(stripped) || fragments.iter().any(|frag| line.contains(frag)) {
                line_numbers.push(line_num);
                line_map.insert(line_num, line.to_string());
            }
        }
    }

    match (line_numbers.first(), line_numbers.last()) {
        (Some(&first), Some(&last)) => LineSpan {
            start_line: first.min(last),
            end_line: last.max(first),
            line_numbers,
            line_map,
        },
        _ => LineSpan::not_found(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_line_exact_match() {
        let span = locate_chunk("a\nb\nc", "b", true);
        assert_eq!(span.start_line, 2);
        assert_eq!(span.end_line, 2);
        assert_eq!(span.line_numbers, vec![2]);
        assert_eq!(span.line_map.get(&2).map(String::as_str), Some("b"));
    }

    #[test]
    fn test_chunk_not_present() {
        let span = locate_chunk("a\nb\nc", "x", true);
        assert_eq!(span.start_line, UNKNOWN_LINE);
        assert_eq!(span.end_line, UNKNOWN_LINE);
        assert!(span.line_numbers.is_empty());
        assert!(span.line_map.is_empty());
        assert!(!span.is_known());
    }

    #[test]
    fn test_multi_line_chunk() {
        let span = locate_chunk("alpha\nbeta\ngamma\ndelta", "beta\ngamma", true);
        assert_eq!(span.start_line, 2);
        assert_eq!(span.end_line, 3);
        assert_eq!(span.line_numbers, vec![2, 3]);
        assert_eq!(span.line_map.get(&3).map(String::as_str), Some("gamma"));
    }

    #[test]
    fn test_duplicate_chunk_resolves_to_first_occurrence() {
        let span = locate_chunk("same\nother\nsame", "same", true);
        assert_eq!(span.start_line, 1);
        assert_eq!(span.end_line, 1);
    }

    #[test]
    fn test_empty_chunk() {
        let span = locate_chunk("a\nb", "   ", true);
        assert!(!span.is_known());
    }

    #[test]
    fn test_fallback_matches_line_contained_in_chunk() {
        // "beta. omega" is not an exact substring, but the line "beta"
        // appears inside the chunk text
        let span = locate_chunk("alpha\nbeta\ngamma", "beta. omega", true);
        assert_eq!(span.start_line, 2);
        assert_eq!(span.end_line, 2);
    }

    #[test]
    fn test_fallback_matches_fragment_contained_in_line() {
        // No line is contained in the chunk, but the fragment "gam" of
        // "gam. qq" appears inside the line "gamma ray"
        let span = locate_chunk("alpha one\nbeta two\ngamma ray", "gam. qq", true);
        assert_eq!(span.start_line, 3);
        assert_eq!(span.end_line, 3);
    }

    #[test]
    fn test_fallback_whitespace_line_flag() {
        // A blank line trims to the empty string, which is a substring of
        // any chunk, so it matches whenever whitespace lines are included
        let included = locate_chunk("alpha\n\nzzz", "qq", true);
        assert_eq!(included.start_line, 2);
        assert_eq!(included.end_line, 2);

        let excluded = locate_chunk("alpha\n\nzzz", "qq", false);
        assert!(!excluded.is_known());
    }

    #[test]
    fn test_fallback_min_max_span() {
        // Fragments hit lines 1 and 3; the span covers min..max
        let span = locate_chunk("red fox\nblue\ngreen fox", "fox. qq", false);
        assert_eq!(span.start_line, 1);
        assert_eq!(span.end_line, 3);
        assert_eq!(span.line_numbers, vec![1, 3]);
    }

    #[test]
    fn test_deterministic() {
        let a = locate_chunk("a\nb\nc", "b\nc", true);
        let b = locate_chunk("a\nb\nc", "b\nc", true);
        assert_eq!(a, b);
    }
}
