// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Event loop — stdin bytes in, frames out.
//
// Each iteration waits on the reader channel with `recv_timeout`. Bytes are
// parsed into events and handed to the app; a timeout flushes a pending ESC
// and gives the app a tick for background work (autosave reports). The
// frame is repainted only when something changed.
//
// Resize arrives as SIGWINCH. The handler only sets an atomic flag; the loop
// picks it up on its next iteration, so a resize is seen within one tick.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Duration;

use crate::frame::{Frame, Renderer};
use crate::input::{Event, Parser};
use crate::reader::StdinReader;
use crate::terminal::{Size, Terminal};

// ─── SIGWINCH ────────────────────────────────────────────────────────────────

static SIGWINCH_RECEIVED: AtomicBool = AtomicBool::new(false);

#[cfg(unix)]
fn install_sigwinch_handler() {
    unsafe {
        let mut sa: libc::sigaction = std::mem::zeroed();
        sa.sa_sigaction = sigwinch_handler as *const () as usize;
        sa.sa_flags = libc::SA_RESTART;
        libc::sigemptyset(&raw mut sa.sa_mask);
        libc::sigaction(libc::SIGWINCH, &raw const sa, std::ptr::null_mut());
    }
}

#[cfg(unix)]
extern "C" fn sigwinch_handler(_sig: libc::c_int) {
    SIGWINCH_RECEIVED.store(true, Ordering::Relaxed);
}

#[cfg(not(unix))]
fn install_sigwinch_handler() {}

// ─── App ─────────────────────────────────────────────────────────────────────

/// What the app wants after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Continue,
    Quit,
}

/// An application driven by [`EventLoop`]. Only [`paint`](App::paint) is
/// required.
pub trait App {
    /// Handle one input event.
    fn on_event(&mut self, _event: &Event) -> Action {
        Action::Continue
    }

    /// The terminal changed size. Called before the next paint.
    fn on_resize(&mut self, _size: Size) {}

    /// Called once per loop iteration. Return `true` to request a repaint.
    fn on_tick(&mut self) -> bool {
        false
    }

    /// Draw the whole screen into `frame`, which arrives cleared.
    fn paint(&mut self, frame: &mut Frame);

    /// Where to show the terminal cursor after painting, or `None` to hide
    /// it.
    fn cursor(&self) -> Option<(u16, u16)> {
        None
    }
}

// ─── Config ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopConfig {
    /// Wait per iteration, in milliseconds. Also how long a lone ESC is
    /// held before it counts as the Escape key.
    pub tick_ms: u64,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self { tick_ms: 50 }
    }
}

// ─── EventLoop ───────────────────────────────────────────────────────────────

/// Owns the terminal, parser and renderer. [`run`](Self::run) returns when
/// the app quits or stdin closes.
pub struct EventLoop {
    terminal: Terminal,
    parser: Parser,
    renderer: Renderer,
    config: LoopConfig,
}

impl EventLoop {
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(LoopConfig::default())
    }

    #[must_use]
    pub fn with_config(config: LoopConfig) -> Self {
        Self {
            terminal: Terminal::new(),
            parser: Parser::new(),
            renderer: Renderer::new(),
            config,
        }
    }

    #[inline]
    #[must_use]
    pub const fn size(&self) -> Size {
        self.terminal.size()
    }

    /// Enter the terminal, run until quit, and restore the terminal even
    /// when the loop fails.
    ///
    /// # Errors
    ///
    /// Terminal setup, teardown and frame output errors.
    pub fn run(&mut self, app: &mut impl App) -> io::Result<()> {
        self.terminal.enter()?;
        install_sigwinch_handler();

        let (mut reader, rx) = StdinReader::spawn();
        let result = self.run_inner(app, &rx);

        reader.stop();
        self.terminal.leave()?;
        result
    }

    fn run_inner(&mut self, app: &mut impl App, rx: &Receiver<Vec<u8>>) -> io::Result<()> {
        let size = self.terminal.size();
        let mut frame = Frame::new(size.cols, size.rows);
        let mut dirty = true;
        let timeout = Duration::from_millis(self.config.tick_ms);

        loop {
            let events = match rx.recv_timeout(timeout) {
                Ok(bytes) => self.parser.advance(&bytes),
                Err(RecvTimeoutError::Timeout) if self.parser.has_pending() => {
                    self.parser.flush()
                }
                Err(RecvTimeoutError::Timeout) => Vec::new(),
                Err(RecvTimeoutError::Disconnected) => return Ok(()),
            };
            for event in &events {
                if app.on_event(event) == Action::Quit {
                    return Ok(());
                }
            }
            dirty |= !events.is_empty();

            if SIGWINCH_RECEIVED.swap(false, Ordering::Relaxed) {
                let size = self.terminal.refresh_size();
                frame = Frame::new(size.cols, size.rows);
                self.renderer.force_redraw();
                app.on_resize(size);
                dirty = true;
            }

            dirty |= app.on_tick();

            if dirty {
                frame.clear();
                app.paint(&mut frame);
                let mut stdout = io::stdout().lock();
                self.renderer.render(&frame, app.cursor(), &mut stdout)?;
                dirty = false;
            }
        }
    }
}

impl Default for EventLoop {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{KeyCode, KeyEvent};

    struct Minimal;
    impl App for Minimal {
        fn paint(&mut self, _frame: &mut Frame) {}
    }

    #[test]
    fn default_tick_is_fifty_ms() {
        assert_eq!(LoopConfig::default().tick_ms, 50);
    }

    #[test]
    fn app_defaults() {
        let mut app = Minimal;
        let event = Event::Key(KeyEvent::plain(KeyCode::Enter));
        assert_eq!(app.on_event(&event), Action::Continue);
        assert!(!app.on_tick());
        assert!(app.cursor().is_none());
        app.on_resize(Size { cols: 10, rows: 5 });
    }

    #[test]
    fn event_loop_has_a_size() {
        let ev = EventLoop::with_config(LoopConfig { tick_ms: 10 });
        assert!(ev.size().cols > 0);
        assert_eq!(ev.config.tick_ms, 10);
    }

    #[test]
    fn sigwinch_flag_swaps_clear() {
        SIGWINCH_RECEIVED.store(true, Ordering::Relaxed);
        assert!(SIGWINCH_RECEIVED.swap(false, Ordering::Relaxed));
        assert!(!SIGWINCH_RECEIVED.load(Ordering::Relaxed));
    }
}
