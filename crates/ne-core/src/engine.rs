//! Edit engine — every change to the document goes through here.
//!
//! `EditEngine` owns the [`LineStore`], the [`Cursor`] and the [`Clipboard`]
//! and exposes one method per keystroke-sized operation. Each method either
//! completes or returns an [`EditError`] with the document untouched, and
//! each leaves the cursor on real text (`col <= len(line[row])`).
//!
//! # Editing rules
//!
//! | Operation   | Effect |
//! |-------------|--------|
//! | insert char | printable bytes only; `(`, `{`, `"`, `'` always insert a pair and land between them |
//! | Tab         | `tab_width` spaces, never a tab byte |
//! | Backspace   | delete left; at column 0 join onto the previous line |
//! | Enter       | split at the cursor; between `{` and `}` open an indented body line |
//! | copy(n)     | `n` lines from the cursor row into the clipboard |
//! | paste       | clipboard lines inserted at the cursor row, then the clipboard is emptied |
//! | undo        | restore the cursor line to its content when the cursor arrived on it |
//!
//! # Enter states
//!
//! Enter runs in one of two states, chosen up front by [`EditEngine::enter_kind`]
//! and finished before the method returns:
//!
//! - **Plain** — one split. With `auto_indent`, the new line is indented by
//!   the brace depth.
//! - **Bracket expansion** — the cursor sits in `{|}`. Two splits put the `}`
//!   on its own line, the closing line is indented by its own depth, the body
//!   line by the depth inside the braces, and the cursor ends on the body.
//!
//! Indentation is recomputed from the top of the document on every Enter.

use tracing::trace;

use crate::classify::{self, TokenKind};
use crate::clipboard::Clipboard;
use crate::cursor::Cursor;
use crate::error::EditError;
use crate::line_store::{LineStore, LoadReport};
use crate::options::Options;
use crate::position::Position;
use crate::search;

/// Which Enter behavior applies at the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnterKind {
    Plain,
    BracketExpansion,
}

/// The cursor line as it was when the cursor arrived on it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct LineSnapshot {
    row: usize,
    text: Vec<u8>,
}

/// Document, cursor and clipboard with the editing operations over them.
#[derive(Debug, Clone)]
pub struct EditEngine {
    store: LineStore,
    cursor: Cursor,
    clipboard: Clipboard,
    snapshot: LineSnapshot,
    tab_width: usize,
    auto_indent: bool,
}

impl EditEngine {
    /// An empty document sized by `options`, seen through a window `height`
    /// rows tall.
    #[must_use]
    pub fn new(options: &Options, height: usize) -> Self {
        Self {
            store: LineStore::new(options.max_lines, options.line_len),
            cursor: Cursor::new(height),
            clipboard: Clipboard::new(),
            snapshot: LineSnapshot::default(),
            tab_width: options.tab_width.max(1),
            auto_indent: options.auto_indent,
        }
    }

    // -- Accessors ----------------------------------------------------------

    #[inline]
    #[must_use]
    pub const fn store(&self) -> &LineStore {
        &self.store
    }

    #[inline]
    #[must_use]
    pub const fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    #[inline]
    #[must_use]
    pub const fn clipboard(&self) -> &Clipboard {
        &self.clipboard
    }

    #[inline]
    #[must_use]
    pub const fn position(&self) -> Position {
        self.cursor.position()
    }

    #[inline]
    #[must_use]
    pub const fn tab_width(&self) -> usize {
        self.tab_width
    }

    /// Follow runtime option changes that affect editing.
    pub fn apply_options(&mut self, options: &Options) {
        self.tab_width = options.tab_width.max(1);
        self.auto_indent = options.auto_indent;
    }

    /// Visible rows with their text, top to bottom.
    pub fn visible_lines(&self) -> impl Iterator<Item = (usize, &[u8])> {
        self.cursor
            .visible_rows(&self.store)
            .filter_map(|row| self.store.line(row).map(|line| (row, line)))
    }

    /// Token kind of every byte on `row`.
    #[must_use]
    pub fn line_kinds(&self, row: usize) -> Vec<TokenKind> {
        self.store.line(row).map(classify::kinds).unwrap_or_default()
    }

    /// Net brace depth through `row`.
    #[must_use]
    pub fn brace_depth(&self, row: usize) -> usize {
        self.store.brace_depth(row)
    }

    // -- Document in/out ----------------------------------------------------

    /// Replace the document and put the cursor back at the origin.
    pub fn load<I>(&mut self, lines: I) -> LoadReport
    where
        I: IntoIterator,
        I::Item: AsRef<[u8]>,
    {
        let report = self.store.load(lines);
        self.cursor = Cursor::new(self.cursor.height());
        self.capture_snapshot();
        report
    }

    /// Every line, first to last.
    #[must_use]
    pub fn serialize(&self) -> Vec<Vec<u8>> {
        self.store.serialize()
    }

    // -- Cursor movement ----------------------------------------------------

    pub fn move_left(&mut self) {
        if self.cursor.move_left(&self.store) {
            self.capture_snapshot();
        }
    }

    pub fn move_right(&mut self) {
        if self.cursor.move_right(&self.store) {
            self.capture_snapshot();
        }
    }

    pub fn move_up(&mut self) {
        if self.cursor.move_up(&self.store) {
            self.capture_snapshot();
        }
    }

    pub fn move_down(&mut self) {
        if self.cursor.move_down(&self.store) {
            self.capture_snapshot();
        }
    }

    /// Place the cursor at window cell `(y, x)`. Returns false for a click
    /// below the last line.
    pub fn click(&mut self, y: usize, x: usize) -> bool {
        let placed = self.cursor.place_on_screen(y, x, &self.store);
        if placed {
            self.capture_snapshot();
        }
        placed
    }

    /// Change the window height, keeping the logical position.
    pub fn resize(&mut self, height: usize) {
        self.cursor.resize(height, &self.store);
    }

    // -- Character editing --------------------------------------------------

    /// Insert a printable byte at the cursor. Opening `(` and `{` and both
    /// quote characters insert their pair and leave the cursor between the
    /// two. Other bytes outside `0x20..=0x7E` are ignored.
    ///
    /// # Errors
    ///
    /// [`EditError::LineFull`] if the byte (or the pair) does not fit.
    pub fn insert_char(&mut self, ch: u8) -> Result<(), EditError> {
        if !is_printable(ch) {
            return Ok(());
        }
        let (row, col) = (self.cursor.row(), self.cursor.col());
        let inserted = match closing_pair(ch) {
            Some(close) => self.store.insert_bytes(row, col, &[ch, close]),
            None => self.store.insert_bytes(row, col, &[ch]),
        };
        inserted.map_err(refused)?;
        self.cursor.set_col(col + 1, &self.store);
        Ok(())
    }

    /// Insert `tab_width` spaces at the cursor.
    ///
    /// # Errors
    ///
    /// [`EditError::LineFull`] if the spaces do not all fit.
    pub fn tab(&mut self) -> Result<(), EditError> {
        let (row, col) = (self.cursor.row(), self.cursor.col());
        let spaces = vec![b' '; self.tab_width];
        self.store.insert_bytes(row, col, &spaces).map_err(refused)?;
        self.cursor.set_col(col + spaces.len(), &self.store);
        Ok(())
    }

    /// Delete the byte left of the cursor, or join the line onto the previous
    /// one at column 0. A no-op at the start of the document.
    ///
    /// # Errors
    ///
    /// [`EditError::JoinTooLong`] if the joined line would not fit.
    pub fn backspace(&mut self) -> Result<(), EditError> {
        let (row, col) = (self.cursor.row(), self.cursor.col());
        if col > 0 {
            self.store.remove_byte(row, col - 1);
            self.cursor.set_col(col - 1, &self.store);
        } else if row > 0 {
            let join_at = self.store.line_len(row - 1);
            self.store.join_with_next(row - 1).map_err(refused)?;
            self.cursor.scroll_check_up();
            self.cursor.set_col(join_at, &self.store);
            self.capture_snapshot();
        }
        Ok(())
    }

    // -- Line editing -------------------------------------------------------

    /// The Enter behavior that applies at the cursor right now.
    ///
    /// Bracket expansion needs the cursor between `{` and `}` and room for
    /// two more lines; without the room Enter falls back to a plain split.
    #[must_use]
    pub fn enter_kind(&self) -> EnterKind {
        let (row, col) = (self.cursor.row(), self.cursor.col());
        let between_braces = col > 0
            && self.store.byte_at(row, col - 1) == Some(b'{')
            && self.store.byte_at(row, col) == Some(b'}');
        if between_braces && self.store.free_lines() >= 2 {
            EnterKind::BracketExpansion
        } else {
            EnterKind::Plain
        }
    }

    /// Split the line at the cursor. See the module docs for the two states.
    ///
    /// # Errors
    ///
    /// [`EditError::DocumentFull`] if no line can be added.
    pub fn enter(&mut self) -> Result<(), EditError> {
        let (row, col) = (self.cursor.row(), self.cursor.col());
        match self.enter_kind() {
            EnterKind::BracketExpansion => {
                self.store.split_line_at(row, col).map_err(refused)?;
                self.store.split_line_at(row + 1, 0).map_err(refused)?;
                self.indent_row(row + 2);
                let indent = self.indent_row(row + 1);
                // Scroll as if landing on the closing line, then step back up
                // to the body so the `}` stays in view.
                self.cursor.scroll_check_down();
                self.cursor.scroll_check_down();
                self.cursor.scroll_check_up();
                self.cursor.set_col(indent, &self.store);
            }
            EnterKind::Plain => {
                self.store.split_line_at(row, col).map_err(refused)?;
                self.cursor.scroll_check_down();
                let indent = if self.auto_indent {
                    self.indent_row(row + 1)
                } else {
                    0
                };
                self.cursor.set_col(indent, &self.store);
            }
        }
        self.capture_snapshot();
        Ok(())
    }

    /// Prefix `row` with spaces for its brace depth, as many as fit.
    /// Returns the number inserted.
    fn indent_row(&mut self, row: usize) -> usize {
        let want = self.store.brace_depth(row) * self.tab_width;
        let width = want.min(self.store.free_bytes(row));
        if width > 0 {
            // Cannot fail: `width` was clamped to the free space.
            let _ = self.store.insert_bytes(row, 0, &vec![b' '; width]);
        }
        width
    }

    // -- Clipboard ----------------------------------------------------------

    /// Copy `count` lines starting at the cursor row (at least one, at most
    /// through the last line). Returns the number copied.
    pub fn copy(&mut self, count: usize) -> usize {
        let row = self.cursor.row();
        let end = (row + count.max(1)).min(self.store.line_count());
        let lines: Vec<Vec<u8>> = (row..end)
            .filter_map(|r| self.store.line(r).map(<[u8]>::to_vec))
            .collect();
        let copied = lines.len();
        self.clipboard.yank(lines);
        copied
    }

    /// Insert the clipboard lines at the cursor row, pushing the cursor line
    /// and everything below down, then empty the clipboard. Returns the
    /// number of lines pasted.
    ///
    /// # Errors
    ///
    /// [`EditError::ClipboardEmpty`], or a capacity error when the lines do
    /// not all fit (the clipboard is kept).
    pub fn paste(&mut self) -> Result<usize, EditError> {
        if self.clipboard.is_empty() {
            return Err(EditError::ClipboardEmpty);
        }
        let row = self.cursor.row();
        self.store
            .insert_lines_at(row, self.clipboard.lines())
            .map_err(refused)?;
        let pasted = self.clipboard.len();
        self.clipboard.clear();
        self.cursor.clamp(&self.store);
        self.capture_snapshot();
        Ok(pasted)
    }

    // -- Undo ---------------------------------------------------------------

    /// Restore the cursor line to its content when the cursor last arrived
    /// on it. One level, this line only.
    ///
    /// # Errors
    ///
    /// [`EditError::NothingToUndo`] if the snapshot belongs to another line.
    pub fn undo_line(&mut self) -> Result<(), EditError> {
        let row = self.cursor.row();
        if self.snapshot.row != row {
            return Err(EditError::NothingToUndo);
        }
        self.store.set_line(row, &self.snapshot.text)?;
        self.cursor.clamp(&self.store);
        Ok(())
    }

    fn capture_snapshot(&mut self) {
        let row = self.cursor.row();
        self.snapshot = LineSnapshot {
            row,
            text: self.store.line(row).map(<[u8]>::to_vec).unwrap_or_default(),
        };
    }

    // -- Search -------------------------------------------------------------

    /// Move the cursor to the first match of `query` in the document.
    ///
    /// # Errors
    ///
    /// [`EditError::EmptyQuery`] or [`EditError::NoMatch`]; the cursor stays.
    pub fn search_forward(&mut self, query: &[u8]) -> Result<Position, EditError> {
        if query.is_empty() {
            return Err(EditError::EmptyQuery);
        }
        let found = search::find_first(&self.store, query).ok_or_else(|| EditError::NoMatch {
            query: String::from_utf8_lossy(query).into_owned(),
        })?;
        let before = self.cursor.row();
        self.cursor
            .jump_to(found.start.row, found.start.col, &self.store);
        if self.cursor.row() != before {
            self.capture_snapshot();
        }
        Ok(found.start)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Printable ASCII, the only bytes typed into the document.
#[inline]
#[must_use]
pub const fn is_printable(b: u8) -> bool {
    matches!(b, 0x20..=0x7E)
}

const fn closing_pair(ch: u8) -> Option<u8> {
    match ch {
        b'(' => Some(b')'),
        b'{' => Some(b'}'),
        b'"' => Some(b'"'),
        b'\'' => Some(b'\''),
        _ => None,
    }
}

fn refused(err: EditError) -> EditError {
    trace!(%err, "edit refused");
    err
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
