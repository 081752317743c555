//! Search — literal substring search over the document.
//!
//! Matching is byte-for-byte: no case folding, no patterns. A search always
//! scans the whole document from the first line, so the result does not
//! depend on where the cursor is.
//!
//! [`find_all`] returns every match in a row range, used by the renderer to
//! mark the matches of the last search on visible lines.

use std::ops::Range;

use crate::line_store::LineStore;
use crate::position::Position;

/// A match: where it starts and how many bytes it covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match {
    pub start: Position,
    pub len: usize,
}

/// First match of `pattern`, scanning rows from the top and each row from
/// the left. `None` for an empty pattern.
#[must_use]
pub fn find_first(store: &LineStore, pattern: &[u8]) -> Option<Match> {
    if pattern.is_empty() {
        return None;
    }
    store.iter().enumerate().find_map(|(row, line)| {
        find_in_line(line, pattern, 0).map(|col| Match {
            start: Position::new(row, col),
            len: pattern.len(),
        })
    })
}

/// Every non-overlapping match of `pattern` on `rows`, in document order.
#[must_use]
pub fn find_all(store: &LineStore, pattern: &[u8], rows: Range<usize>) -> Vec<Match> {
    let mut matches = Vec::new();
    if pattern.is_empty() {
        return matches;
    }
    for row in rows {
        let Some(line) = store.line(row) else {
            break;
        };
        let mut from = 0;
        while let Some(col) = find_in_line(line, pattern, from) {
            matches.push(Match {
                start: Position::new(row, col),
                len: pattern.len(),
            });
            from = col + pattern.len();
        }
    }
    matches
}

/// Byte offset of the first occurrence of `pattern` in `line` at or after
/// `from`.
#[must_use]
pub fn find_in_line(line: &[u8], pattern: &[u8], from: usize) -> Option<usize> {
    if pattern.is_empty() || from >= line.len() {
        return None;
    }
    line[from..]
        .windows(pattern.len())
        .position(|w| w == pattern)
        .map(|i| from + i)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn store(lines: &[&str]) -> LineStore {
        let mut s = LineStore::new(64, 64);
        s.load(lines);
        s
    }

    #[test]
    fn first_match_in_document_order() {
        let s = store(&["alpha", "beta gamma", "gamma"]);
        assert_eq!(
            find_first(&s, b"gamma"),
            Some(Match {
                start: Position::new(1, 5),
                len: 5
            })
        );
    }

    #[test]
    fn no_match() {
        let s = store(&["abc"]);
        assert_eq!(find_first(&s, b"xyz"), None);
        assert_eq!(find_first(&s, b""), None);
    }

    #[test]
    fn match_is_case_sensitive() {
        let s = store(&["Main", "main"]);
        assert_eq!(find_first(&s, b"main").map(|m| m.start), Some(Position::new(1, 0)));
    }

    #[test]
    fn pattern_longer_than_line() {
        assert_eq!(find_in_line(b"ab", b"abc", 0), None);
    }

    #[test]
    fn find_in_line_from_offset() {
        assert_eq!(find_in_line(b"abab", b"ab", 1), Some(2));
        assert_eq!(find_in_line(b"abab", b"ab", 4), None);
    }

    #[test]
    fn find_all_is_non_overlapping() {
        let s = store(&["aaaa", "xaax"]);
        let cols: Vec<(usize, usize)> = find_all(&s, b"aa", 0..2)
            .into_iter()
            .map(|m| (m.start.row, m.start.col))
            .collect();
        assert_eq!(cols, [(0, 0), (0, 2), (1, 1)]);
    }

    #[test]
    fn find_all_respects_range() {
        let s = store(&["x", "x", "x"]);
        assert_eq!(find_all(&s, b"x", 1..10).len(), 2);
    }
}
