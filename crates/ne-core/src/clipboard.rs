//! Clipboard — the single slot that copy fills and paste empties.
//!
//! The slot holds whole lines only. Copy captures a run of consecutive lines
//! without touching the document; paste inserts them as new lines and then
//! clears the slot, so each copy pastes once.

/// One-slot line clipboard.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Clipboard {
    lines: Vec<Vec<u8>>,
}

impl Clipboard {
    /// An empty clipboard.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Replace the content with `lines`.
    pub fn yank(&mut self, lines: Vec<Vec<u8>>) {
        self.lines = lines;
    }

    /// The stored lines, oldest first.
    #[must_use]
    pub fn lines(&self) -> &[Vec<u8>] {
        &self.lines
    }

    /// Number of stored lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// True when nothing is waiting to be pasted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Empty the slot.
    pub fn clear(&mut self) {
        self.lines.clear();
    }
}
