// SPDX-License-Identifier: MIT
//
// Frame — a grid of cells painted each tick, and the renderer that puts it
// on screen.
//
// The editor paints a whole frame from scratch on every repaint. The
// renderer keeps the previous frame and rewrites only the rows that differ,
// so a keystroke typically costs one or two rows of output. A size change
// or `force_redraw` clears the screen and writes everything.
//
// All output for one frame is collected in a Vec and written with a single
// call, wrapped in synchronized-output markers.

use std::io::{self, Write};

use crate::ansi;
use crate::cell::{Attr, Cell, Color};

// ─── Frame ───────────────────────────────────────────────────────────────────

/// A `width × height` grid of cells, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl Frame {
    /// A blank frame.
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::BLANK; usize::from(width) * usize::from(height)],
        }
    }

    #[inline]
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.width
    }

    #[inline]
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// Cells of row `y`.
    #[must_use]
    pub fn row(&self, y: u16) -> Option<&[Cell]> {
        if y >= self.height {
            return None;
        }
        let start = usize::from(y) * usize::from(self.width);
        Some(&self.cells[start..start + usize::from(self.width)])
    }

    /// Cell at `(x, y)`.
    #[must_use]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        self.row(y).and_then(|r| r.get(usize::from(x)))
    }

    /// Reset every cell to blank.
    pub fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    /// Set one cell. Out-of-bounds positions are ignored.
    pub fn set(&mut self, x: u16, y: u16, cell: Cell) {
        if x < self.width && y < self.height {
            let idx = usize::from(y) * usize::from(self.width) + usize::from(x);
            self.cells[idx] = cell;
        }
    }

    /// Paint `text` starting at `(x, y)` in one style, clipped at the right
    /// edge. Non-printable bytes are shown as `?`. Returns the column after
    /// the last painted cell.
    pub fn put_str(&mut self, x: u16, y: u16, text: &[u8], fg: Color, attr: Attr) -> u16 {
        let mut col = x;
        for &b in text {
            if col >= self.width {
                break;
            }
            self.set(col, y, Cell::new(printable(b), fg, attr));
            col += 1;
        }
        col
    }

    /// Fill row `y` from column `x` to the right edge.
    pub fn fill_from(&mut self, x: u16, y: u16, cell: Cell) {
        for col in x..self.width {
            self.set(col, y, cell);
        }
    }
}

/// Bytes the terminal can show as-is, with `?` for everything else.
/// Anything written with [`Frame::set`] must already be masked.
#[inline]
#[must_use]
pub const fn printable(b: u8) -> u8 {
    if b.is_ascii_graphic() || b == b' ' {
        b
    } else {
        b'?'
    }
}

// ─── Renderer ────────────────────────────────────────────────────────────────

/// Writes frames to the terminal, rewriting only changed rows.
#[derive(Debug, Default)]
pub struct Renderer {
    previous: Option<Frame>,
    out: Vec<u8>,
}

impl Renderer {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            previous: None,
            out: Vec::new(),
        }
    }

    /// Forget the previous frame so the next render repaints everything.
    pub fn force_redraw(&mut self) {
        self.previous = None;
    }

    /// Diff `frame` against the last one and write the changes to `w`,
    /// leaving the terminal cursor at `cursor` (shown) or hidden when `None`.
    /// Returns the number of rows rewritten.
    ///
    /// # Errors
    ///
    /// Propagates write errors from `w`.
    pub fn render(
        &mut self,
        frame: &Frame,
        cursor: Option<(u16, u16)>,
        w: &mut impl Write,
    ) -> io::Result<usize> {
        self.out.clear();
        let out = &mut self.out;
        ansi::begin_sync(out)?;
        ansi::cursor_hide(out)?;

        let previous = self
            .previous
            .as_ref()
            .filter(|p| p.width == frame.width && p.height == frame.height);
        if previous.is_none() {
            ansi::reset(out)?;
            ansi::clear_screen(out)?;
        }

        let mut rows = 0;
        for y in 0..frame.height {
            let row = frame.row(y).unwrap_or_default();
            if previous.and_then(|p| p.row(y)) == Some(row) {
                continue;
            }
            write_row(out, y, row)?;
            rows += 1;
        }

        ansi::reset(out)?;
        if let Some((x, y)) = cursor {
            ansi::cursor_to(out, x, y)?;
            ansi::cursor_show(out)?;
        }
        ansi::end_sync(out)?;

        w.write_all(&self.out)?;
        w.flush()?;

        match &mut self.previous {
            Some(p) if p.width == frame.width && p.height == frame.height => {
                p.cells.copy_from_slice(&frame.cells);
            }
            slot => *slot = Some(frame.clone()),
        }
        Ok(rows)
    }
}

fn write_row(out: &mut Vec<u8>, y: u16, row: &[Cell]) -> io::Result<()> {
    ansi::cursor_to(out, 0, y)?;
    let mut current: Option<Cell> = None;
    for cell in row {
        if !current.is_some_and(|c| c.same_style(cell)) {
            ansi::style(out, cell.fg, cell.attr)?;
            current = Some(*cell);
        }
        out.push(cell.ch);
    }
    Ok(())
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn row_text(f: &Frame, y: u16) -> String {
        f.row(y).unwrap().iter().map(|c| char::from(c.ch)).collect()
    }

    // ── Frame ───────────────────────────────────────────────────────

    #[test]
    fn new_frame_is_blank() {
        let f = Frame::new(4, 2);
        assert_eq!(row_text(&f, 1), "    ");
        assert!(f.row(2).is_none());
    }

    #[test]
    fn put_str_clips_at_edge() {
        let mut f = Frame::new(5, 1);
        let end = f.put_str(2, 0, b"hello", Color::Default, Attr::empty());
        assert_eq!(end, 5);
        assert_eq!(row_text(&f, 0), "  hel");
    }

    #[test]
    fn put_str_masks_control_bytes() {
        let mut f = Frame::new(4, 1);
        f.put_str(0, 0, b"a\rb\t", Color::Default, Attr::empty());
        assert_eq!(row_text(&f, 0), "a?b?");
    }

    #[test]
    fn set_out_of_bounds_is_ignored() {
        let mut f = Frame::new(2, 2);
        f.set(5, 5, Cell::new(b'x', Color::Red, Attr::empty()));
        assert_eq!(f, Frame::new(2, 2));
    }

    #[test]
    fn fill_from_paints_to_edge() {
        let mut f = Frame::new(4, 1);
        f.fill_from(1, 0, Cell::new(b'-', Color::Default, Attr::INVERSE));
        assert_eq!(row_text(&f, 0), " ---");
        assert_eq!(f.get(3, 0).unwrap().attr, Attr::INVERSE);
    }

    // ── Renderer ────────────────────────────────────────────────────

    #[test]
    fn first_render_writes_every_row() {
        let mut r = Renderer::new();
        let f = Frame::new(3, 4);
        let mut sink = Vec::new();
        assert_eq!(r.render(&f, None, &mut sink).unwrap(), 4);
        let text = String::from_utf8(sink).unwrap();
        assert!(text.contains("\x1b[2J"));
        assert!(text.starts_with("\x1b[?2026h"));
        assert!(text.ends_with("\x1b[?2026l"));
    }

    #[test]
    fn unchanged_rows_are_skipped() {
        let mut r = Renderer::new();
        let mut f = Frame::new(3, 4);
        r.render(&f, None, &mut Vec::new()).unwrap();

        f.put_str(0, 2, b"abc", Color::Cyan, Attr::empty());
        let mut sink = Vec::new();
        assert_eq!(r.render(&f, Some((1, 2)), &mut sink).unwrap(), 1);
        let text = String::from_utf8(sink).unwrap();
        assert!(text.contains("\x1b[3;1H\x1b[0;36mabc"));
        assert!(text.contains("\x1b[3;2H\x1b[?25h"));
        assert!(!text.contains("\x1b[2J"));
    }

    #[test]
    fn resize_forces_full_repaint() {
        let mut r = Renderer::new();
        r.render(&Frame::new(3, 2), None, &mut Vec::new()).unwrap();
        assert_eq!(r.render(&Frame::new(4, 3), None, &mut Vec::new()).unwrap(), 3);
        assert_eq!(r.render(&Frame::new(4, 3), None, &mut Vec::new()).unwrap(), 0);
    }

    #[test]
    fn force_redraw_repaints() {
        let mut r = Renderer::new();
        let f = Frame::new(2, 2);
        r.render(&f, None, &mut Vec::new()).unwrap();
        r.force_redraw();
        assert_eq!(r.render(&f, None, &mut Vec::new()).unwrap(), 2);
    }
}
