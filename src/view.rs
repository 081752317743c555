// SPDX-License-Identifier: MIT
//
// View — paints the editor state into a frame.
//
//   ┌──────────────────────────────┐
//   │ gutter │ text area           │  ← h - 1 rows
//   ├──────────────────────────────┤
//   │ status line (INVERSE)        │  ← 1 row, or the active prompt
//   └──────────────────────────────┘
//
// The text area shows the engine's visible rows starting at column 0 of
// each line; long lines are clipped at the right edge.

use ne_core::EditEngine;
use ne_core::classify::{self, TokenKind};
use ne_core::options::Options;
use ne_core::search;
use ne_term::cell::{Attr, Cell, Color};
use ne_term::frame::{Frame, printable};

/// Foreground color for a token kind.
pub const fn token_color(kind: TokenKind) -> Color {
    match kind {
        TokenKind::Plain => Color::Default,
        TokenKind::KeywordType => Color::Cyan,
        TokenKind::KeywordControl => Color::Magenta,
        TokenKind::String | TokenKind::Preprocessor => Color::Yellow,
        TokenKind::Comment => Color::Green,
        TokenKind::Semicolon => Color::Red,
    }
}

/// Columns taken by the line-number gutter, including its trailing space.
pub fn gutter_width(options: &Options, line_count: usize) -> u16 {
    if !options.number {
        return 0;
    }
    let digits = line_count.max(1).ilog10() + 1;
    u16::try_from(digits.max(3) + 1).unwrap_or(u16::MAX)
}

/// Paint the visible rows of `engine` into the top `height` rows of `frame`.
/// Occurrences of `highlight` are shown in inverse video.
///
/// Returns where the terminal cursor belongs, or `None` if it falls off the
/// right edge.
pub fn draw_text(
    frame: &mut Frame,
    engine: &EditEngine,
    options: &Options,
    highlight: &[u8],
    height: u16,
) -> Option<(u16, u16)> {
    let gutter = gutter_width(options, engine.store().line_count());

    for (y, (row, line)) in (0..height).zip(engine.visible_lines()) {
        if gutter > 0 {
            let label = format!("{:>w$} ", row + 1, w = usize::from(gutter - 1));
            frame.put_str(0, y, label.as_bytes(), Color::Blue, Attr::empty());
        }
        draw_line(frame, gutter, y, line, options, highlight);
    }

    let (screen_row, col) = engine.cursor().screen_position();
    let y = u16::try_from(screen_row).ok().filter(|&y| y < height)?;
    let x = u16::try_from(col)
        .ok()
        .and_then(|c| c.checked_add(gutter))
        .filter(|&x| x < frame.width())?;
    Some((x, y))
}

fn draw_line(frame: &mut Frame, x0: u16, y: u16, line: &[u8], options: &Options, highlight: &[u8]) {
    let kinds = if options.syntax {
        classify::kinds(line)
    } else {
        vec![TokenKind::Plain; line.len()]
    };
    let marked = match_mask(line, highlight);

    let mut x = x0;
    for (i, &b) in line.iter().enumerate() {
        if x >= frame.width() {
            break;
        }
        let ch = if !options.brackets && matches!(b, b'{' | b'}' | b'(' | b')') {
            b' '
        } else {
            printable(b)
        };
        let attr = if marked[i] { Attr::INVERSE } else { Attr::empty() };
        frame.set(x, y, Cell::new(ch, token_color(kinds[i]), attr));
        x += 1;
    }
}

/// Which bytes of `line` belong to a non-overlapping match of `pattern`.
fn match_mask(line: &[u8], pattern: &[u8]) -> Vec<bool> {
    let mut mask = vec![false; line.len()];
    if pattern.is_empty() {
        return mask;
    }
    let mut from = 0;
    while let Some(start) = search::find_in_line(line, pattern, from) {
        let end = start + pattern.len();
        mask[start..end].fill(true);
        from = end;
    }
    mask
}

/// Inverse-video status row: `left` from the left edge, `right` flush right.
/// `right` wins when both do not fit.
pub fn draw_status(frame: &mut Frame, y: u16, left: &str, right: &str, is_error: bool) {
    let fg = if is_error { Color::Red } else { Color::Default };
    frame.fill_from(0, y, Cell::new(b' ', Color::Default, Attr::INVERSE));

    let width = frame.width();
    let right_len = u16::try_from(right.len()).unwrap_or(u16::MAX).min(width);
    let right_x = width - right_len;

    let left = left.as_bytes();
    let left = &left[..left.len().min(usize::from(right_x.saturating_sub(1)))];
    frame.put_str(1, y, left, fg, Attr::INVERSE);
    frame.put_str(right_x, y, right.as_bytes(), Color::Default, Attr::INVERSE);
}

/// A one-line prompt. Returns the cursor position after the input.
pub fn draw_prompt(frame: &mut Frame, y: u16, label: &str, input: &[u8]) -> (u16, u16) {
    let x = frame.put_str(0, y, label.as_bytes(), Color::Default, Attr::BOLD);
    let x = frame.put_str(x, y, input, Color::Default, Attr::empty());
    (x.min(frame.width().saturating_sub(1)), y)
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn row_text(frame: &Frame, y: u16) -> String {
        frame
            .row(y)
            .unwrap()
            .iter()
            .map(|c| char::from(c.ch))
            .collect::<String>()
            .trim_end()
            .to_string()
    }

    fn engine_with(text: &[&str], height: usize) -> EditEngine {
        let mut e = EditEngine::new(&Options::default(), height);
        e.load(text.iter().map(|l| l.as_bytes()));
        e
    }

    #[test]
    fn colors_follow_token_kind() {
        let e = engine_with(&["int x; // c"], 3);
        let mut f = Frame::new(20, 3);
        draw_text(&mut f, &e, &Options::default(), b"", 2);
        let row = f.row(0).unwrap();
        assert_eq!(row[0].fg, Color::Cyan);
        assert_eq!(row[4].fg, Color::Default);
        assert_eq!(row[5].fg, Color::Red);
        assert_eq!(row[7].fg, Color::Green);
    }

    #[test]
    fn syntax_off_paints_plain() {
        let e = engine_with(&["return 0;"], 3);
        let opts = Options {
            syntax: false,
            ..Options::default()
        };
        let mut f = Frame::new(20, 3);
        draw_text(&mut f, &e, &opts, b"", 2);
        assert!(f.row(0).unwrap().iter().all(|c| c.fg == Color::Default));
    }

    #[test]
    fn gutter_shifts_text_and_cursor() {
        let mut e = engine_with(&["a", "b"], 3);
        e.move_down();
        let opts = Options {
            number: true,
            ..Options::default()
        };
        let mut f = Frame::new(20, 3);
        let cursor = draw_text(&mut f, &e, &opts, b"", 2);
        assert_eq!(row_text(&f, 0), "  1 a");
        assert_eq!(row_text(&f, 1), "  2 b");
        assert_eq!(cursor, Some((4, 1)));
    }

    #[test]
    fn gutter_grows_with_line_count() {
        let opts = Options {
            number: true,
            ..Options::default()
        };
        assert_eq!(gutter_width(&opts, 1), 4);
        assert_eq!(gutter_width(&opts, 999), 4);
        assert_eq!(gutter_width(&opts, 1000), 5);
        assert_eq!(gutter_width(&Options::default(), 1000), 0);
    }

    #[test]
    fn hidden_brackets_paint_as_blanks() {
        let e = engine_with(&["f() {}"], 2);
        let opts = Options {
            brackets: false,
            ..Options::default()
        };
        let mut f = Frame::new(10, 2);
        draw_text(&mut f, &e, &opts, b"", 1);
        assert_eq!(row_text(&f, 0), "f");
        assert_eq!(e.store().line(0), Some(&b"f() {}"[..]));
    }

    #[test]
    fn matches_are_inverse() {
        let e = engine_with(&["abab"], 2);
        let mut f = Frame::new(10, 2);
        draw_text(&mut f, &e, &Options::default(), b"ab", 1);
        let row = f.row(0).unwrap();
        assert!(row[..4].iter().all(|c| c.attr == Attr::INVERSE));
        assert_eq!(row[4].attr, Attr::empty());
    }

    #[test]
    fn control_bytes_are_masked() {
        let e = engine_with(&["int x;\r", "\tret\x1b[2J"], 3);
        let mut f = Frame::new(20, 3);
        draw_text(&mut f, &e, &Options::default(), b"", 2);
        assert_eq!(row_text(&f, 0), "int x;?");
        assert_eq!(row_text(&f, 1), "?ret?[2J");
        for y in 0..2 {
            assert!(f.row(y).unwrap().iter().all(|c| c.ch.is_ascii_graphic() || c.ch == b' '));
        }
        assert_eq!(e.store().line(0), Some(&b"int x;\r"[..]));
    }

    #[test]
    fn match_mask_is_non_overlapping() {
        assert_eq!(match_mask(b"aaa", b"aa"), vec![true, true, false]);
        assert_eq!(match_mask(b"abc", b""), vec![false; 3]);
    }

    #[test]
    fn cursor_past_right_edge_is_hidden() {
        let mut e = engine_with(&["0123456789"], 2);
        for _ in 0..10 {
            e.move_right();
        }
        let mut f = Frame::new(5, 2);
        assert_eq!(draw_text(&mut f, &e, &Options::default(), b"", 1), None);
    }

    #[test]
    fn status_places_both_sides() {
        let mut f = Frame::new(30, 1);
        draw_status(&mut f, 0, "hint", " a.c | Ln 1, Col 1 ", false);
        assert_eq!(row_text(&f, 0), " hint       a.c | Ln 1, Col 1");
        assert!(f.row(0).unwrap().iter().all(|c| c.attr == Attr::INVERSE));
    }

    #[test]
    fn status_left_is_cut_before_right() {
        let mut f = Frame::new(12, 1);
        draw_status(&mut f, 0, "a long message", " Ln 1 ", true);
        assert_eq!(row_text(&f, 0), " a lon Ln 1");
        assert_eq!(f.get(1, 0).unwrap().fg, Color::Red);
    }

    #[test]
    fn prompt_cursor_follows_input() {
        let mut f = Frame::new(20, 1);
        assert_eq!(draw_prompt(&mut f, 0, "Search: ", b"main"), (12, 0));
        assert_eq!(row_text(&f, 0), "Search: main");
    }
}
