// SPDX-License-Identifier: MIT
//
// ANSI escape sequences.
//
// Stateless writers over any `impl Write`. Deciding when to emit them is the
// renderer's job; this module only knows the bytes.
//
// Positions are 0-indexed here and converted to the terminal's 1-indexed
// coordinates on output.

use std::io::{self, Write};

use crate::cell::{Attr, Color};

// ─── Cursor ──────────────────────────────────────────────────────────────────

/// Move the cursor to column `x`, row `y` (CUP).
#[inline]
pub fn cursor_to(w: &mut impl Write, x: u16, y: u16) -> io::Result<()> {
    write!(w, "\x1b[{};{}H", u32::from(y) + 1, u32::from(x) + 1)
}

/// Hide the cursor (DECTCEM reset).
#[inline]
pub fn cursor_hide(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25l")
}

/// Show the cursor (DECTCEM set).
#[inline]
pub fn cursor_show(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25h")
}

// ─── Screen ──────────────────────────────────────────────────────────────────

/// Clear the whole screen and home the cursor.
#[inline]
pub fn clear_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[2J\x1b[H")
}

/// Reset all SGR attributes.
#[inline]
pub fn reset(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[0m")
}

// ─── Style ───────────────────────────────────────────────────────────────────

/// Set the complete style for following text: resets first, then applies
/// the attributes and the foreground color in one SGR sequence.
pub fn style(w: &mut impl Write, fg: Color, attr: Attr) -> io::Result<()> {
    w.write_all(b"\x1b[0")?;
    if attr.contains(Attr::BOLD) {
        w.write_all(b";1")?;
    }
    if attr.contains(Attr::INVERSE) {
        w.write_all(b";7")?;
    }
    if fg != Color::Default {
        write!(w, ";{}", fg.fg_code())?;
    }
    w.write_all(b"m")
}

// ─── Synchronized Output ─────────────────────────────────────────────────────
//
// DEC mode 2026. Terminals that support it hold the frame until `end_sync`,
// so a repaint never shows half-drawn. Others ignore it.

#[inline]
pub fn begin_sync(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?2026h")
}

#[inline]
pub fn end_sync(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?2026l")
}

// ─── Alternate Screen ───────────────────────────────────────────────────────

#[inline]
pub fn enter_alt_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?1049h")
}

#[inline]
pub fn exit_alt_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?1049l")
}

// ─── Mouse ──────────────────────────────────────────────────────────────────

/// Report button presses and releases in SGR format (modes 1000 + 1006).
#[inline]
pub fn enable_mouse(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?1000h\x1b[?1006h")
}

#[inline]
pub fn disable_mouse(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?1006l\x1b[?1000l")
}

// ─── Tests ───────────────────────────────────────────────────────────────────
