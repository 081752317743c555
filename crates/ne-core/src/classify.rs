//! Lexical classifier — per-line token kinds for highlighting.
//!
//! This is a single left-to-right scan over one line's bytes. It knows a few
//! C lexical shapes and two keyword sets, and nothing else: no parse tree, no
//! state carried between lines. A string or comment left open at the end of
//! a line ends there.
//!
//! # Rules
//!
//! At each position the first matching rule wins:
//!
//! | Rule | Shape                                  | Kind               |
//! |------|----------------------------------------|--------------------|
//! | 1    | `#` at column 0, to end of line        | `Preprocessor`     |
//! | 2    | unescaped `"` to next unescaped `"`    | `String`           |
//! | 3    | `//` to end of line                    | `Comment`          |
//! | 4    | `;`                                    | `Semicolon`        |
//! | 5    | `[A-Za-z_][A-Za-z0-9_]*`               | keyword kind or `Plain` |
//! | 6    | any other byte                         | `Plain`            |
//!
//! Rule 1 only applies at column 0 and consumes the whole line.

/// What a span of bytes is, for coloring purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TokenKind {
    #[default]
    Plain,
    /// Type and memory keywords: `int`, `char`, `malloc`, ...
    KeywordType,
    /// Control-flow and storage keywords: `if`, `return`, `static`, ...
    KeywordControl,
    String,
    Comment,
    Preprocessor,
    Semicolon,
}

/// A classified run of bytes, `start..end` within the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub kind: TokenKind,
}

impl Span {
    const fn new(start: usize, end: usize, kind: TokenKind) -> Self {
        Self { start, end, kind }
    }

    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

const TYPE_KEYWORDS: &[&[u8]] = &[
    b"int", b"double", b"float", b"enum", b"char", b"short", b"long", b"malloc", b"free",
    b"calloc", b"realloc",
];

const CONTROL_KEYWORDS: &[&[u8]] = &[
    b"void", b"unsigned", b"signed", b"sizeof", b"typedef", b"struct", b"union", b"extern",
    b"static", b"const", b"if", b"else", b"switch", b"case", b"default", b"while", b"for", b"do",
    b"continue", b"break", b"return",
];

/// Keyword kind of an identifier, or `Plain` when it is not a keyword.
#[must_use]
pub fn keyword_kind(word: &[u8]) -> TokenKind {
    if TYPE_KEYWORDS.contains(&word) {
        TokenKind::KeywordType
    } else if CONTROL_KEYWORDS.contains(&word) {
        TokenKind::KeywordControl
    } else {
        TokenKind::Plain
    }
}

/// Split `line` into classified spans covering every byte, in order.
#[must_use]
pub fn classify(line: &[u8]) -> Vec<Span> {
    let mut spans = Vec::new();
    let len = line.len();

    if line.first() == Some(&b'#') {
        spans.push(Span::new(0, len, TokenKind::Preprocessor));
        return spans;
    }

    let mut i = 0;
    while i < len {
        let b = line[i];
        let span = if b == b'"' && !is_escaped(line, i) {
            let end = string_end(line, i + 1);
            Span::new(i, end, TokenKind::String)
        } else if b == b'/' && line.get(i + 1) == Some(&b'/') {
            Span::new(i, len, TokenKind::Comment)
        } else if b == b';' {
            Span::new(i, i + 1, TokenKind::Semicolon)
        } else if is_ident_start(b) {
            let end = line[i..]
                .iter()
                .position(|&c| !is_ident_continue(c))
                .map_or(len, |n| i + n);
            Span::new(i, end, keyword_kind(&line[i..end]))
        } else {
            Span::new(i, i + 1, TokenKind::Plain)
        };
        i = span.end;
        spans.push(span);
    }
    spans
}

/// Token kind of every byte in `line`.
#[must_use]
pub fn kinds(line: &[u8]) -> Vec<TokenKind> {
    let mut out = vec![TokenKind::Plain; line.len()];
    for span in classify(line) {
        out[span.start..span.end].fill(span.kind);
    }
    out
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

const fn is_ident_continue(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// True when the byte at `at` follows an odd run of backslashes.
fn is_escaped(line: &[u8], at: usize) -> bool {
    let run = line[..at].iter().rev().take_while(|&&c| c == b'\\').count();
    run % 2 == 1
}

/// End (exclusive) of a string whose body starts at `from`: just past the
/// closing quote, or the end of the line.
fn string_end(line: &[u8], from: usize) -> usize {
    let mut i = from;
    while i < line.len() {
        match line[i] {
            b'\\' => i += 2,
            b'"' => return i + 1,
            _ => i += 1,
        }
    }
    line.len()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
