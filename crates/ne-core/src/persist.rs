//! Persistence — the document's on-disk form.
//!
//! The file format is plain bytes: one document line per `\n`-terminated text
//! line. Nothing is decoded or converted, so a `\r` before a `\n` stays in the
//! line as an ordinary byte.
//!
//! Reading reports a missing file as `Ok(None)`. The caller decides what a
//! missing file means; the editor starts an empty document bound to the path.

use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use tracing::debug;

use crate::error::PersistError;

/// Split raw file bytes into lines on `\n`. A trailing newline does not start
/// an extra line; a final line without one is kept.
#[must_use]
pub fn split_lines(bytes: &[u8]) -> Vec<&[u8]> {
    let mut lines: Vec<&[u8]> = bytes.split(|&b| b == b'\n').collect();
    if bytes.is_empty() || bytes.ends_with(b"\n") {
        lines.pop();
    }
    lines
}

/// Read `path` whole. `Ok(None)` when the file does not exist.
///
/// # Errors
///
/// [`PersistError::IsDirectory`] for a directory, [`PersistError::Read`] for
/// any other failure.
pub fn read_file(path: &Path) -> Result<Option<Vec<u8>>, PersistError> {
    if path.is_dir() {
        return Err(PersistError::IsDirectory {
            path: path.to_path_buf(),
        });
    }
    match fs::read(path) {
        Ok(bytes) => {
            debug!(path = %path.display(), bytes = bytes.len(), "read file");
            Ok(Some(bytes))
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(PersistError::Read {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Overwrite `path` with `lines`, each followed by `\n`. Returns the number
/// of lines written.
///
/// # Errors
///
/// [`PersistError::Write`] if the file cannot be created or written.
pub fn write_lines<L: AsRef<[u8]>>(path: &Path, lines: &[L]) -> Result<usize, PersistError> {
    let wrap = |source| PersistError::Write {
        path: path.to_path_buf(),
        source,
    };
    let file = fs::File::create(path).map_err(wrap)?;
    let mut out = BufWriter::new(file);
    for line in lines {
        out.write_all(line.as_ref()).map_err(wrap)?;
        out.write_all(b"\n").map_err(wrap)?;
    }
    out.flush().map_err(wrap)?;
    debug!(path = %path.display(), lines = lines.len(), "wrote file");
    Ok(lines.len())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
