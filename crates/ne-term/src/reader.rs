// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Background stdin reader.
//
// A thread forwards raw input to the event loop as byte chunks over a
// channel. The loop then waits with `recv_timeout` and still gets its ticks
// for autosave reports and the escape timeout.
//
// On unix the thread never blocks in `read()`: it waits in `poll()` for at
// most WAKE_MS, reads only when stdin is ready, and checks the stop flag in
// between. Stopping therefore takes at most one wake interval.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

/// A keypress is a few bytes; a terminal paste can be much more.
const CHUNK: usize = 4096;

/// Longest the thread goes without looking at its stop flag.
const WAKE_MS: i32 = 50;

/// Handle to the reader thread. Dropping it stops the thread.
pub struct StdinReader {
    thread: Option<JoinHandle<()>>,
    stopping: Arc<AtomicBool>,
}

impl StdinReader {
    /// Start reading. Each message on the receiver is a non-empty chunk of
    /// raw input; the channel closes on EOF or after [`stop`](Self::stop).
    ///
    /// # Panics
    ///
    /// Panics if the OS cannot spawn a new thread.
    #[must_use]
    pub fn spawn() -> (Self, Receiver<Vec<u8>>) {
        let (chunks, rx) = mpsc::channel();
        let stopping = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stopping);

        let thread = thread::Builder::new()
            .name("stdin-reader".into())
            .spawn(move || forward_stdin(&chunks, &flag))
            .expect("failed to spawn stdin reader thread");

        (
            Self {
                thread: Some(thread),
                stopping,
            },
            rx,
        )
    }

    /// Signal the thread and join it. Idempotent.
    pub fn stop(&mut self) {
        self.stopping.store(true, Ordering::Relaxed);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for StdinReader {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Send chunks until EOF, a read error, a closed channel or the stop flag.
fn forward_stdin(chunks: &Sender<Vec<u8>>, stopping: &AtomicBool) {
    let mut buf = [0u8; CHUNK];
    while !stopping.load(Ordering::Relaxed) {
        let n = match next_chunk(&mut buf) {
            Some(0) => continue,
            Some(n) => n,
            None => break,
        };
        if chunks.send(buf[..n].to_vec()).is_err() {
            break;
        }
    }
}

/// Read what is available. `Some(0)` means nothing arrived within the wake
/// interval; `None` means stdin is finished.
#[cfg(unix)]
fn next_chunk(buf: &mut [u8]) -> Option<usize> {
    use std::os::unix::io::AsRawFd;

    let fd = std::io::stdin().as_raw_fd();
    let mut pfd = libc::pollfd {
        fd,
        events: libc::POLLIN,
        revents: 0,
    };
    if unsafe { libc::poll(&raw mut pfd, 1, WAKE_MS) } <= 0 {
        return Some(0);
    }
    let n = unsafe { libc::read(fd, buf.as_mut_ptr().cast(), buf.len()) };
    usize::try_from(n).ok().filter(|&n| n > 0)
}

/// Blocking fallback; `stop` waits for the next read to return.
#[cfg(not(unix))]
fn next_chunk(buf: &mut [u8]) -> Option<usize> {
    use std::io::Read;

    match std::io::stdin().lock().read(buf) {
        Ok(0) | Err(_) => None,
        Ok(n) => Some(n),
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
