//! Autosave — a background worker that saves the session on a timer.
//!
//! The worker thread waits on its control channel with `recv_timeout(interval)`.
//! A timeout means "save now"; control messages can also force a save,
//! change the interval or stop the worker. Each save takes the session lock
//! only long enough to copy the lines.
//!
//! Results go back to the controller as [`AutosaveReport`]s on a channel, so
//! the foreground decides how to show them. An interval of zero parks the
//! worker until it is told to save, retimed or stopped.
//!
//! Tests drive the worker with [`Autosave::save_now`] instead of waiting for
//! wall-clock ticks.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, warn};

use crate::session::{SaveReport, SharedSession};

/// What one autosave pass did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutosaveReport {
    Saved(SaveReport),
    /// The save failed; the text is the status-line message.
    Failed(String),
}

#[derive(Debug)]
enum Control {
    SaveNow,
    SetInterval(Duration),
    Stop,
}

/// Handle to the autosave worker. Dropping it stops and joins the thread.
pub struct Autosave {
    tx: Sender<Control>,
    handle: Option<JoinHandle<()>>,
}

impl Autosave {
    /// Start the worker for `session`, saving every `interval`.
    ///
    /// Returns the handle and the receiver for save reports.
    ///
    /// # Panics
    ///
    /// Panics if the OS cannot spawn a new thread.
    #[must_use]
    pub fn spawn(session: SharedSession, interval: Duration) -> (Self, Receiver<AutosaveReport>) {
        let (tx, control) = mpsc::channel();
        let (report_tx, reports) = mpsc::channel();

        let handle = thread::Builder::new()
            .name("autosave".into())
            .spawn(move || worker_loop(&session, interval, &control, &report_tx))
            .expect("failed to spawn autosave thread");

        (
            Self {
                tx,
                handle: Some(handle),
            },
            reports,
        )
    }

    /// Save on the worker right away, without waiting for the timer.
    pub fn save_now(&self) {
        let _ = self.tx.send(Control::SaveNow);
    }

    /// Change the interval. The timer restarts from now; zero parks it.
    pub fn set_interval(&self, interval: Duration) {
        let _ = self.tx.send(Control::SetInterval(interval));
    }

    /// Stop the worker and wait for it. Idempotent.
    pub fn stop(&mut self) {
        let _ = self.tx.send(Control::Stop);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for Autosave {
    fn drop(&mut self) {
        self.stop();
    }
}

fn worker_loop(
    session: &SharedSession,
    mut interval: Duration,
    control: &Receiver<Control>,
    reports: &Sender<AutosaveReport>,
) {
    debug!(?interval, path = %session.path().display(), "autosave started");
    loop {
        let msg = if interval.is_zero() {
            control.recv().map_err(|_| RecvTimeoutError::Disconnected)
        } else {
            control.recv_timeout(interval)
        };
        match msg {
            Ok(Control::SaveNow) | Err(RecvTimeoutError::Timeout) => {
                let report = match session.save() {
                    Ok(saved) => {
                        debug!(lines = saved.lines, "autosaved");
                        AutosaveReport::Saved(saved)
                    }
                    Err(e) => {
                        warn!(error = %e, "autosave failed");
                        AutosaveReport::Failed(e.to_string())
                    }
                };
                // The controller may already be gone during shutdown.
                let _ = reports.send(report);
            }
            Ok(Control::SetInterval(d)) => interval = d,
            Ok(Control::Stop) | Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    debug!("autosave stopped");
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
