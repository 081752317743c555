// SPDX-License-Identifier: MIT
//
// Cell — one character position on screen.
//
// The editor only ever shows ASCII, so a cell is a byte plus a foreground
// color and a couple of attributes. Colors are the eight basic ANSI colors
// and the terminal default; the user's palette decides how they look.

// ─── Color ───────────────────────────────────────────────────────────────────

/// Basic ANSI foreground colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Color {
    /// The terminal's own foreground (SGR 39).
    #[default]
    Default,
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
}

impl Color {
    /// SGR parameter selecting this color as foreground.
    #[must_use]
    pub const fn fg_code(self) -> u8 {
        match self {
            Self::Default => 39,
            Self::Black => 30,
            Self::Red => 31,
            Self::Green => 32,
            Self::Yellow => 33,
            Self::Blue => 34,
            Self::Magenta => 35,
            Self::Cyan => 36,
            Self::White => 37,
        }
    }
}

// ─── Attributes ──────────────────────────────────────────────────────────────

bitflags::bitflags! {
    /// Text attributes, mapped to SGR parameters.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Attr: u8 {
        /// SGR 1.
        const BOLD    = 1 << 0;
        /// SGR 7 — swap foreground and background.
        const INVERSE = 1 << 1;
    }
}

// ─── Cell ────────────────────────────────────────────────────────────────────

/// A styled byte at one screen position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    pub ch: u8,
    pub fg: Color,
    pub attr: Attr,
}

impl Cell {
    /// A blank cell in the default style.
    pub const BLANK: Self = Self {
        ch: b' ',
        fg: Color::Default,
        attr: Attr::empty(),
    };

    #[inline]
    #[must_use]
    pub const fn new(ch: u8, fg: Color, attr: Attr) -> Self {
        Self { ch, fg, attr }
    }

    /// True when `other` needs no SGR change after this cell.
    #[inline]
    #[must_use]
    pub fn same_style(self, other: &Self) -> bool {
        self.fg == other.fg && self.attr == other.attr
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::BLANK
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fg_codes() {
        assert_eq!(Color::Default.fg_code(), 39);
        assert_eq!(Color::Red.fg_code(), 31);
        assert_eq!(Color::Cyan.fg_code(), 36);
    }

    #[test]
    fn default_cell_is_blank() {
        assert_eq!(Cell::default(), Cell::BLANK);
        assert_eq!(Cell::BLANK.ch, b' ');
    }

    #[test]
    fn style_comparison_ignores_char() {
        let a = Cell::new(b'a', Color::Green, Attr::BOLD);
        let b = Cell::new(b'b', Color::Green, Attr::BOLD);
        let c = Cell::new(b'a', Color::Green, Attr::INVERSE);
        assert!(a.same_style(&b));
        assert!(!a.same_style(&c));
    }
}
