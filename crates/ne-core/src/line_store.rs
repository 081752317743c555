//! Line store — the bounded grid of line buffers that holds the document.
//!
//! A `LineStore` is an ordered list of byte lines with two hard bounds:
//!
//! - **capacity** — the maximum number of lines (`maxlines`)
//! - **line size** — the size of one line buffer (`linelen`). A line holds at
//!   most `line_size - 1` bytes; the last slot mirrors the terminator a C line
//!   buffer reserves, which keeps saved files identical across variants.
//!
//! # Design choices
//!
//! - **Bytes, not chars.** The editor is an ASCII tool for small C files.
//!   Columns are byte offsets, and loading never decodes or converts.
//!
//! - **Refuse, never truncate.** Every mutation checks its bounds up front and
//!   returns an [`EditError`] from the capacity family without touching the
//!   lines. Callers that want "silently ignored" simply drop the error.
//!
//! - **At least one line.** An empty document is a single empty line, so the
//!   cursor always has a row to sit on. `last_row()` plays the role of the
//!   classic `totalLines` counter.

use crate::error::EditError;

/// Default document capacity in lines.
pub const DEFAULT_CAPACITY: usize = 1000;

/// Default line buffer size in bytes (a line holds one byte less).
pub const DEFAULT_LINE_SIZE: usize = 256;

/// Smallest usable line buffer: one byte of text plus the reserved slot.
pub const MIN_LINE_SIZE: usize = 2;

/// Outcome of [`LineStore::load`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadReport {
    /// Lines now in the store.
    pub lines: usize,
    /// Input lines that were longer than a line buffer and got split.
    pub split: usize,
    /// Lines that did not fit in the document and were dropped.
    pub dropped: usize,
}

/// The document text: a bounded list of bounded byte lines.
#[derive(Clone, PartialEq, Eq)]
pub struct LineStore {
    lines: Vec<Vec<u8>>,
    capacity: usize,
    line_size: usize,
}

impl LineStore {
    /// Create a store holding one empty line.
    ///
    /// `capacity` is raised to at least 1 and `line_size` to at least
    /// [`MIN_LINE_SIZE`].
    #[must_use]
    pub fn new(capacity: usize, line_size: usize) -> Self {
        Self {
            lines: vec![Vec::new()],
            capacity: capacity.max(1),
            line_size: line_size.max(MIN_LINE_SIZE),
        }
    }

    // -- Bounds -------------------------------------------------------------

    /// Maximum number of lines.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Size of one line buffer.
    #[inline]
    #[must_use]
    pub const fn line_size(&self) -> usize {
        self.line_size
    }

    /// Longest line the store accepts, in bytes.
    #[inline]
    #[must_use]
    pub const fn max_line_bytes(&self) -> usize {
        self.line_size - 1
    }

    /// Bytes that can still be inserted into `row`.
    #[must_use]
    pub fn free_bytes(&self, row: usize) -> usize {
        self.max_line_bytes().saturating_sub(self.line_len(row))
    }

    /// Lines that can still be inserted into the document.
    #[must_use]
    pub fn free_lines(&self) -> usize {
        self.capacity.saturating_sub(self.lines.len())
    }

    // -- Text access --------------------------------------------------------

    /// Number of real lines. Never zero.
    #[inline]
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Index of the last real line (the classic `totalLines`).
    #[inline]
    #[must_use]
    pub fn last_row(&self) -> usize {
        self.lines.len() - 1
    }

    /// True when the document is a single empty line.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.lines.len() == 1 && self.lines[0].is_empty()
    }

    /// The bytes of `row`, or `None` past the last line.
    #[inline]
    #[must_use]
    pub fn line(&self, row: usize) -> Option<&[u8]> {
        self.lines.get(row).map(Vec::as_slice)
    }

    /// Length of `row` in bytes. Rows past the end are logically empty.
    #[inline]
    #[must_use]
    pub fn line_len(&self, row: usize) -> usize {
        self.lines.get(row).map_or(0, Vec::len)
    }

    /// Byte at `(row, col)`, if any.
    #[inline]
    #[must_use]
    pub fn byte_at(&self, row: usize, col: usize) -> Option<u8> {
        self.lines.get(row).and_then(|l| l.get(col)).copied()
    }

    /// Iterate over all lines in document order.
    pub fn iter(&self) -> impl Iterator<Item = &[u8]> {
        self.lines.iter().map(Vec::as_slice)
    }

    /// Net count of `{` minus `}` bytes on rows `0..=through_row`, floored
    /// at zero. This is the nesting depth used for auto-indentation.
    #[must_use]
    pub fn brace_depth(&self, through_row: usize) -> usize {
        let end = through_row.min(self.last_row());
        let mut depth: isize = 0;
        for line in &self.lines[..=end] {
            for &b in line {
                match b {
                    b'{' => depth += 1,
                    b'}' => depth -= 1,
                    _ => {}
                }
            }
        }
        depth.max(0).unsigned_abs()
    }

    // -- Byte editing -------------------------------------------------------

    /// Insert `bytes` into `row` at `col`, shifting the rest of the line right.
    ///
    /// `col` past the end of the line is clamped to the end.
    ///
    /// # Errors
    ///
    /// [`EditError::LineFull`] if the line cannot take every byte.
    ///
    /// # Panics
    ///
    /// Panics if `row > last_row()`.
    pub fn insert_bytes(&mut self, row: usize, col: usize, bytes: &[u8]) -> Result<(), EditError> {
        let available = self.free_bytes(row);
        if bytes.len() > available {
            return Err(EditError::LineFull {
                row,
                needed: bytes.len(),
                available,
            });
        }
        let line = &mut self.lines[row];
        let col = col.min(line.len());
        line.splice(col..col, bytes.iter().copied());
        Ok(())
    }

    /// Remove the byte at `(row, col)`, shifting the rest of the line left.
    /// Returns the removed byte, or `None` if `col` is at or past the end.
    pub fn remove_byte(&mut self, row: usize, col: usize) -> Option<u8> {
        let line = self.lines.get_mut(row)?;
        (col < line.len()).then(|| line.remove(col))
    }

    /// Replace the content of `row`.
    ///
    /// # Errors
    ///
    /// [`EditError::LineFull`] if `bytes` is longer than a line.
    ///
    /// # Panics
    ///
    /// Panics if `row > last_row()`.
    pub fn set_line(&mut self, row: usize, bytes: &[u8]) -> Result<(), EditError> {
        let max = self.max_line_bytes();
        if bytes.len() > max {
            return Err(EditError::LineFull {
                row,
                needed: bytes.len(),
                available: max,
            });
        }
        let line = &mut self.lines[row];
        line.clear();
        line.extend_from_slice(bytes);
        Ok(())
    }

    // -- Line editing -------------------------------------------------------

    /// Insert an empty line after `row`, shifting everything below down.
    ///
    /// # Errors
    ///
    /// [`EditError::DocumentFull`] when the document is at capacity.
    pub fn insert_line_after(&mut self, row: usize) -> Result<(), EditError> {
        self.ensure_free_lines(1)?;
        let at = (row + 1).min(self.lines.len());
        self.lines.insert(at, Vec::new());
        Ok(())
    }

    /// Insert `new_lines` so the first of them becomes row `row`, shifting the
    /// old `row` and everything below it down. All-or-nothing.
    ///
    /// # Errors
    ///
    /// [`EditError::DocumentFull`] if the lines do not all fit, or
    /// [`EditError::LineFull`] if one of them is longer than a line.
    pub fn insert_lines_at(&mut self, row: usize, new_lines: &[Vec<u8>]) -> Result<(), EditError> {
        self.ensure_free_lines(new_lines.len())?;
        let max = self.max_line_bytes();
        if let Some(long) = new_lines.iter().find(|l| l.len() > max) {
            return Err(EditError::LineFull {
                row,
                needed: long.len(),
                available: max,
            });
        }
        let at = row.min(self.lines.len());
        self.lines.splice(at..at, new_lines.iter().cloned());
        Ok(())
    }

    /// Remove `row`, shifting everything below up. Removing the only line
    /// leaves a single empty line.
    pub fn remove_line(&mut self, row: usize) {
        if self.lines.len() == 1 {
            self.lines[0].clear();
        } else if row < self.lines.len() {
            self.lines.remove(row);
        }
    }

    /// Split `row` at `col`: row `row + 1` receives `line[col..]` and `row`
    /// keeps `line[..col]`.
    ///
    /// # Errors
    ///
    /// [`EditError::DocumentFull`] when the document is at capacity.
    ///
    /// # Panics
    ///
    /// Panics if `row > last_row()`.
    pub fn split_line_at(&mut self, row: usize, col: usize) -> Result<(), EditError> {
        self.ensure_free_lines(1)?;
        let line = &mut self.lines[row];
        let tail = line.split_off(col.min(line.len()));
        self.lines.insert(row + 1, tail);
        Ok(())
    }

    /// Append row `row + 1` onto `row` and remove row `row + 1`. A no-op on
    /// the last row.
    ///
    /// # Errors
    ///
    /// [`EditError::JoinTooLong`] if the joined line would not fit.
    pub fn join_with_next(&mut self, row: usize) -> Result<(), EditError> {
        if row >= self.last_row() {
            return Ok(());
        }
        let combined = self.lines[row].len() + self.lines[row + 1].len();
        if combined > self.max_line_bytes() {
            return Err(EditError::JoinTooLong { row, combined });
        }
        let next = self.lines.remove(row + 1);
        self.lines[row].extend_from_slice(&next);
        Ok(())
    }

    fn ensure_free_lines(&self, needed: usize) -> Result<(), EditError> {
        let available = self.free_lines();
        if needed > available {
            return Err(EditError::DocumentFull { needed, available });
        }
        Ok(())
    }

    // -- Whole-document access ----------------------------------------------

    /// Replace the whole document with `lines`.
    ///
    /// Input lines longer than a line buffer are split into several document
    /// lines at the buffer boundary. Lines beyond capacity are dropped. An
    /// empty input leaves a single empty line.
    pub fn load<I>(&mut self, lines: I) -> LoadReport
    where
        I: IntoIterator,
        I::Item: AsRef<[u8]>,
    {
        let max = self.max_line_bytes();
        let mut report = LoadReport::default();
        let mut out: Vec<Vec<u8>> = Vec::new();

        for line in lines {
            let line = line.as_ref();
            let pieces: Vec<&[u8]> = if line.is_empty() {
                vec![line]
            } else {
                line.chunks(max).collect()
            };
            if pieces.len() > 1 {
                report.split += 1;
            }
            for piece in pieces {
                if out.len() < self.capacity {
                    out.push(piece.to_vec());
                } else {
                    report.dropped += 1;
                }
            }
        }

        if out.is_empty() {
            out.push(Vec::new());
        }
        report.lines = out.len();
        self.lines = out;
        report
    }

    /// Copy of every line, row 0 through `last_row()`.
    #[must_use]
    pub fn serialize(&self) -> Vec<Vec<u8>> {
        self.lines.clone()
    }
}

impl Default for LineStore {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, DEFAULT_LINE_SIZE)
    }
}

impl std::fmt::Debug for LineStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineStore")
            .field("lines", &self.lines.len())
            .field("capacity", &self.capacity)
            .field("line_size", &self.line_size)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
