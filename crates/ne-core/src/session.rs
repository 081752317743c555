//! Session — the edit engine bound to a file, shared behind one lock.
//!
//! The foreground key handler and the autosave worker both reach the document
//! through a [`SharedSession`]. Every access is one short critical section:
//!
//! - a keystroke is one [`with`](SharedSession::with) call;
//! - a save takes the write lock, copies the lines under the engine lock,
//!   releases the engine lock, then writes.
//!
//! The write lock is held from the copy to the end of the write, so the
//! last save to finish always wrote the newest copy. Lock order is write,
//! then engine. Nothing blocks on user input while holding
//! either lock.
//!
//! A poisoned lock is recovered rather than propagated: the engine never
//! leaves the document half-edited, so the data behind it is still valid.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, warn};

use crate::engine::EditEngine;
use crate::error::PersistError;
use crate::line_store::LoadReport;
use crate::options::Options;
use crate::persist;

/// How [`SharedSession::open`] found the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenReport {
    /// The file does not exist yet; the first save creates it.
    New,
    /// The file was read into the document.
    Loaded(LoadReport),
}

/// Outcome of a successful save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveReport {
    pub path: PathBuf,
    pub lines: usize,
}

#[derive(Debug)]
struct Inner {
    engine: Mutex<EditEngine>,
    path: PathBuf,
    write_lock: Mutex<()>,
}

/// Cloneable handle to the one editing session of the process.
#[derive(Debug, Clone)]
pub struct SharedSession {
    inner: Arc<Inner>,
}

impl SharedSession {
    /// Wrap an engine bound to `path`.
    #[must_use]
    pub fn new(engine: EditEngine, path: impl Into<PathBuf>) -> Self {
        Self {
            inner: Arc::new(Inner {
                engine: Mutex::new(engine),
                path: path.into(),
                write_lock: Mutex::new(()),
            }),
        }
    }

    /// Load `path` into a fresh engine. A missing file gives an empty
    /// document bound to the path.
    ///
    /// # Errors
    ///
    /// Any [`PersistError`] other than the file not existing.
    pub fn open(
        path: impl Into<PathBuf>,
        options: &Options,
        height: usize,
    ) -> Result<(Self, OpenReport), PersistError> {
        let path = path.into();
        let mut engine = EditEngine::new(options, height);
        let report = match persist::read_file(&path)? {
            Some(bytes) => {
                let report = engine.load(persist::split_lines(&bytes));
                if report.dropped > 0 {
                    warn!(
                        path = %path.display(),
                        kept = report.lines,
                        dropped = report.dropped,
                        "file longer than the document capacity"
                    );
                }
                debug!(path = %path.display(), lines = report.lines, split = report.split, "loaded");
                OpenReport::Loaded(report)
            }
            None => {
                debug!(path = %path.display(), "new file");
                OpenReport::New
            }
        };
        Ok((Self::new(engine, path), report))
    }

    /// File the session saves to.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    /// Run `f` with exclusive access to the engine. Keep `f` to one
    /// keystroke's worth of work.
    pub fn with<R>(&self, f: impl FnOnce(&mut EditEngine) -> R) -> R {
        f(&mut self.lock())
    }

    /// Write the document to the session's file.
    ///
    /// # Errors
    ///
    /// [`PersistError::Write`] if the file cannot be written.
    pub fn save(&self) -> Result<SaveReport, PersistError> {
        let _writing = self
            .inner
            .write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let lines = self.lock().serialize();
        let written = persist::write_lines(&self.inner.path, &lines)?;
        Ok(SaveReport {
            path: self.inner.path.clone(),
            lines: written,
        })
    }

    fn lock(&self) -> MutexGuard<'_, EditEngine> {
        self.inner
            .engine
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use std::thread;

    #[test]
    fn open_missing_file_is_new() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("new.c");
        let (session, report) = SharedSession::open(&path, &Options::default(), 10).unwrap();
        assert_eq!(report, OpenReport::New);
        assert!(session.with(|e| e.store().is_blank()));
        assert!(!path.exists());
        session.save().unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"\n");
    }

    #[test]
    fn open_loads_and_truncates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.c");
        fs::write(&path, "1\n2\n3\n4\n").unwrap();
        let options = Options {
            max_lines: 3,
            ..Options::default()
        };
        let (session, report) = SharedSession::open(&path, &options, 10).unwrap();
        let OpenReport::Loaded(load) = report else {
            panic!("expected a loaded file");
        };
        assert_eq!(load.lines, 3);
        assert_eq!(load.dropped, 1);
        assert_eq!(session.with(|e| e.store().line_count()), 3);
    }

    #[test]
    fn open_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(SharedSession::open(dir.path(), &Options::default(), 10).is_err());
    }

    #[test]
    fn save_writes_current_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.c");
        fs::write(&path, "int x\n").unwrap();
        let (session, _) = SharedSession::open(&path, &Options::default(), 10).unwrap();
        session.with(|e| {
            e.move_right();
            e.move_right();
            e.move_right();
            e.move_right();
            e.move_right();
            e.insert_char(b';')
        })
        .unwrap();
        let report = session.save().unwrap();
        assert_eq!(report.lines, 1);
        assert_eq!(fs::read_to_string(&path).unwrap(), "int x;\n");
    }

    #[test]
    fn queued_save_copies_after_waiting_for_writer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("q.c");
        let (session, _) = SharedSession::open(&path, &Options::default(), 10).unwrap();
        session.with(|e| e.insert_char(b'a')).unwrap();

        let writing = session.inner.write_lock.lock().unwrap();
        let saver = session.clone();
        let handle = thread::spawn(move || saver.save().unwrap());
        thread::sleep(std::time::Duration::from_millis(100));

        // The queued save must not hold the engine lock or an old copy.
        session.with(|e| e.insert_char(b'b')).unwrap();
        drop(writing);
        handle.join().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "ab\n");
    }

    #[test]
    fn clones_share_one_document() {
        let dir = tempfile::tempdir().unwrap();
        let (session, _) =
            SharedSession::open(dir.path().join("s.c"), &Options::default(), 10).unwrap();
        let other = session.clone();
        let handle = thread::spawn(move || {
            for _ in 0..100 {
                other.with(|e| e.insert_char(b'a')).unwrap();
            }
        });
        for _ in 0..100 {
            session.with(|e| e.insert_char(b'b')).unwrap();
        }
        handle.join().unwrap();
        assert_eq!(session.with(|e| e.store().line_len(0)), 200);
    }
}
