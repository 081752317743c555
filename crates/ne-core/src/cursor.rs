//! Cursor — logical position plus the viewport it is seen through.
//!
//! The cursor is stored as `(top, screen_row, col)`: the first visible row,
//! the cursor's offset inside the window, and a byte column. The document row
//! is always derived as `top + screen_row`, so the two can never disagree.
//!
//! # Scrolling
//!
//! Every row change goes through [`scroll_check_up`](Cursor::scroll_check_up)
//! or [`scroll_check_down`](Cursor::scroll_check_down). Moving off the top or
//! bottom edge of the window scrolls `top` instead of letting `screen_row`
//! leave `0..height`.
//!
//! # Vertical movement
//!
//! Moving up or down keeps the numeric column only if the new line is long
//! enough; otherwise the cursor snaps to the end of that line. There is no
//! sticky column: after passing through a short line the cursor stays at the
//! shorter column.

use std::ops::Range;

use crate::line_store::LineStore;
use crate::position::Position;

/// Cursor and viewport over a [`LineStore`].
///
/// Holds no reference to the store; the store is passed to every method that
/// needs line lengths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    col: usize,
    top: usize,
    screen_row: usize,
    height: usize,
}

impl Cursor {
    /// A cursor at the origin with a window `height` rows tall (at least 1).
    #[must_use]
    pub const fn new(height: usize) -> Self {
        Self {
            col: 0,
            top: 0,
            screen_row: 0,
            height: if height == 0 { 1 } else { height },
        }
    }

    // -- Accessors ----------------------------------------------------------

    /// Document row of the cursor.
    #[inline]
    #[must_use]
    pub const fn row(&self) -> usize {
        self.top + self.screen_row
    }

    /// Byte column of the cursor.
    #[inline]
    #[must_use]
    pub const fn col(&self) -> usize {
        self.col
    }

    #[inline]
    #[must_use]
    pub const fn position(&self) -> Position {
        Position::new(self.row(), self.col)
    }

    /// First document row shown in the window.
    #[inline]
    #[must_use]
    pub const fn top(&self) -> usize {
        self.top
    }

    /// Cursor row inside the window, `0..height`.
    #[inline]
    #[must_use]
    pub const fn screen_row(&self) -> usize {
        self.screen_row
    }

    /// Window height in rows.
    #[inline]
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Cursor location on screen as `(screen_row, col)`.
    #[inline]
    #[must_use]
    pub const fn screen_position(&self) -> (usize, usize) {
        (self.screen_row, self.col)
    }

    /// Document rows currently visible, clipped to the real lines.
    #[must_use]
    pub fn visible_rows(&self, store: &LineStore) -> Range<usize> {
        let end = (self.top + self.height).min(store.line_count());
        self.top.min(end)..end
    }

    // -- Scrolling ----------------------------------------------------------

    /// Account for the row moving up by one: scroll when already at the top
    /// of the window.
    pub const fn scroll_check_up(&mut self) {
        if self.screen_row == 0 {
            self.top = self.top.saturating_sub(1);
        } else {
            self.screen_row -= 1;
        }
    }

    /// Account for the row moving down by one: scroll when already at the
    /// bottom of the window.
    pub const fn scroll_check_down(&mut self) {
        if self.screen_row + 1 >= self.height {
            self.top += 1;
        } else {
            self.screen_row += 1;
        }
    }

    // -- Movement -----------------------------------------------------------
    //
    // Each returns true when the cursor changed lines.

    /// One byte left. At column 0, wraps to the end of the previous line.
    pub fn move_left(&mut self, store: &LineStore) -> bool {
        if self.col > 0 {
            self.col -= 1;
            false
        } else if self.row() > 0 {
            self.scroll_check_up();
            self.col = store.line_len(self.row());
            true
        } else {
            false
        }
    }

    /// One byte right. At the end of a line, wraps to the start of the next.
    pub fn move_right(&mut self, store: &LineStore) -> bool {
        if self.col < store.line_len(self.row()) {
            self.col += 1;
            false
        } else if self.row() < store.last_row() {
            self.scroll_check_down();
            self.col = 0;
            true
        } else {
            false
        }
    }

    /// One line up, snapping the column to the new line's end if needed.
    pub fn move_up(&mut self, store: &LineStore) -> bool {
        if self.row() == 0 {
            return false;
        }
        self.scroll_check_up();
        self.col = self.col.min(store.line_len(self.row()));
        true
    }

    /// One line down, snapping the column to the new line's end if needed.
    pub fn move_down(&mut self, store: &LineStore) -> bool {
        if self.row() >= store.last_row() {
            return false;
        }
        self.scroll_check_down();
        self.col = self.col.min(store.line_len(self.row()));
        true
    }

    /// Set the column on the current line, clamped to its length.
    pub fn set_col(&mut self, col: usize, store: &LineStore) {
        self.col = col.min(store.line_len(self.row()));
    }

    // -- Direct positioning -------------------------------------------------

    /// Move to `(row, col)`, clamped to the document. A row already in the
    /// window only moves the cursor within it; any other row becomes the top
    /// of the window.
    pub fn jump_to(&mut self, row: usize, col: usize, store: &LineStore) {
        let row = row.min(store.last_row());
        if (self.top..self.top + self.height).contains(&row) {
            self.screen_row = row - self.top;
        } else {
            self.top = row;
            self.screen_row = 0;
        }
        self.col = col.min(store.line_len(row));
    }

    /// Place the cursor at window cell `(y, x)`, as for a mouse click.
    /// Clicks below the last line or outside the window are ignored.
    /// Returns true when the cursor was placed.
    pub fn place_on_screen(&mut self, y: usize, x: usize, store: &LineStore) -> bool {
        let row = self.top + y;
        if y >= self.height || row > store.last_row() {
            return false;
        }
        self.screen_row = y;
        self.col = x.min(store.line_len(row));
        true
    }

    /// Change the window height (at least 1) without moving the logical
    /// position. The cursor keeps its screen row when it still fits;
    /// otherwise it lands on the last visible row and `top` absorbs the rest.
    pub fn resize(&mut self, height: usize, store: &LineStore) {
        let row = self.row();
        self.height = height.max(1);
        self.screen_row = self.screen_row.min(self.height - 1);
        self.top = row - self.screen_row;
        self.clamp(store);
    }

    /// Pull the cursor back onto real text after the document shrank.
    pub fn clamp(&mut self, store: &LineStore) {
        let last = store.last_row();
        if self.row() > last {
            self.screen_row = self.screen_row.min(last);
            self.top = last - self.screen_row;
        }
        self.col = self.col.min(store.line_len(self.row()));
    }
}

impl Default for Cursor {
    fn default() -> Self {
        Self::new(1)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
