//! Document positions.
//!
//! All coordinates are **0-indexed**. Row 0 is the first line, column 0 is the
//! first byte. Columns are byte offsets: the document is a byte/ASCII model
//! with no encoding awareness.
//!
//! Display layers (status line, search report) convert to 1-indexed for the
//! user; that conversion never belongs here.

use std::fmt;

/// A position in the document: (row, column), both 0-indexed.
///
/// # Ordering
///
/// Positions are ordered row first, then column, so
/// `Position { row: 0, col: 5 }` < `Position { row: 1, col: 0 }`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    /// The origin — row 0, column 0.
    pub const ZERO: Self = Self { row: 0, col: 0 };

    #[inline]
    #[must_use]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl Ord for Position {
    #[inline]
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.row.cmp(&other.row).then(self.col.cmp(&other.col))
    }
}

impl PartialOrd for Position {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pos({}:{})", self.row, self.col)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // 1-indexed, the way the status line reports it.
        write!(f, "Ln {}, Col {}", self.row + 1, self.col + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_is_row_major() {
        assert!(Position::new(0, 5) < Position::new(1, 0));
        assert!(Position::new(2, 1) < Position::new(2, 3));
        assert_eq!(Position::new(4, 4), Position::new(4, 4));
    }

    #[test]
    fn display_is_one_indexed() {
        assert_eq!(Position::new(6, 0).to_string(), "Ln 7, Col 1");
    }

    #[test]
    fn debug_is_compact() {
        assert_eq!(format!("{:?}", Position::ZERO), "Pos(0:0)");
    }
}
