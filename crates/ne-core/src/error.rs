//! Error types for the editor core.
//!
//! Three families, one per concern:
//!
//! - [`EditError`] — an editing operation was refused. The document is left
//!   untouched whenever one of these is returned. Capacity refusals
//!   ([`EditError::is_capacity`]) are meant to be swallowed by the caller;
//!   the rest become status-line messages.
//! - [`PersistError`] — reading or writing a file failed.
//! - [`OptionError`] — a `set` directive named an unknown option or carried a
//!   bad value.
//!
//! `Display` output is written for the status line, so it stays short.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Why an editing operation did not change the document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    /// The line has no room for the bytes being inserted.
    #[error("line {row} is full ({needed} bytes needed, {available} free)")]
    LineFull {
        row: usize,
        needed: usize,
        available: usize,
    },

    /// The document has no room for the lines being inserted.
    #[error("document is full ({needed} lines needed, {available} free)")]
    DocumentFull { needed: usize, available: usize },

    /// Joining two lines would overflow the line buffer.
    #[error("cannot join line {row}: joined line would be {combined} bytes")]
    JoinTooLong { row: usize, combined: usize },

    /// Paste with nothing copied.
    #[error("Clipboard is empty.")]
    ClipboardEmpty,

    /// Search found nothing.
    #[error("No match found.")]
    NoMatch { query: String },

    /// Search with an empty query.
    #[error("Search cancelled.")]
    EmptyQuery,

    /// Undo requested but the snapshot belongs to another line.
    #[error("Nothing to undo on this line.")]
    NothingToUndo,
}

impl EditError {
    /// True for the capacity family: the edit simply did not fit.
    #[must_use]
    pub const fn is_capacity(&self) -> bool {
        matches!(
            self,
            Self::LineFull { .. } | Self::DocumentFull { .. } | Self::JoinTooLong { .. }
        )
    }
}

/// A file could not be read or written.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("{}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to save {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{}: is a directory", path.display())]
    IsDirectory { path: PathBuf },
}

/// A `set` directive could not be applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptionError {
    #[error("Unknown option: {0}")]
    Unknown(String),

    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: String, value: String },

    #[error("Not a boolean option: {0}")]
    NotBoolean(String),

    #[error("{0} can only be set at startup")]
    StartupOnly(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_family() {
        assert!(
            EditError::LineFull {
                row: 0,
                needed: 1,
                available: 0
            }
            .is_capacity()
        );
        assert!(
            EditError::DocumentFull {
                needed: 2,
                available: 1
            }
            .is_capacity()
        );
        assert!(EditError::JoinTooLong { row: 3, combined: 300 }.is_capacity());
        assert!(!EditError::ClipboardEmpty.is_capacity());
        assert!(!EditError::EmptyQuery.is_capacity());
    }

    #[test]
    fn status_messages() {
        assert_eq!(EditError::ClipboardEmpty.to_string(), "Clipboard is empty.");
        assert_eq!(
            EditError::NoMatch {
                query: "x".into()
            }
            .to_string(),
            "No match found."
        );
        assert_eq!(EditError::EmptyQuery.to_string(), "Search cancelled.");
    }

    #[test]
    fn persist_error_mentions_path() {
        let err = PersistError::Write {
            path: PathBuf::from("main.c"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        let msg = err.to_string();
        assert!(msg.contains("main.c"));
        assert!(msg.contains("denied"));
    }
}
