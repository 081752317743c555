// SPDX-License-Identifier: MIT
//
// Terminal control — raw mode, alternate screen, mouse clicks, and cleanup.
//
// Safety: termios (tcgetattr, tcsetattr), ioctl (TIOCGWINSZ), isatty and the
// raw fd write in the panic path are POSIX calls with no safe wrapper in std.
// Each unsafe block covers a single call.
#![allow(unsafe_code)]
//
// `Terminal::enter` puts the tty in raw mode, switches to the alternate
// screen and turns on SGR mouse click reports. `leave` undoes all of it in
// reverse, and so does `Drop`.
//
// A panic while in raw mode would leave the user's shell unusable, so the
// first `enter` installs a panic hook that writes a fixed restore sequence
// straight to fd 1 (the stdout lock may be held mid-frame), puts the saved
// termios back, and then runs the previous hook.

use std::io::{self, Write};
use std::sync::{Mutex, Once};

use crate::ansi;

// ─── Size ────────────────────────────────────────────────────────────────────

/// Terminal dimensions in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    pub cols: u16,
    pub rows: u16,
}

impl Size {
    /// Used when the size cannot be queried (pipes, tests).
    pub const FALLBACK: Self = Self { cols: 80, rows: 24 };
}

// ─── Queries ─────────────────────────────────────────────────────────────────

/// Current terminal size via `ioctl(TIOCGWINSZ)`, or `None` when stdout is
/// not a terminal.
#[cfg(unix)]
#[must_use]
pub fn get_size() -> Option<Size> {
    let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
    let result = unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &mut ws) };

    (result == 0 && ws.ws_col > 0 && ws.ws_row > 0).then_some(Size {
        cols: ws.ws_col,
        rows: ws.ws_row,
    })
}

#[cfg(not(unix))]
#[must_use]
pub fn get_size() -> Option<Size> {
    None
}

/// Whether stdin is a terminal.
#[cfg(unix)]
#[must_use]
pub fn is_tty() -> bool {
    unsafe { libc::isatty(libc::STDIN_FILENO) != 0 }
}

#[cfg(not(unix))]
#[must_use]
pub fn is_tty() -> bool {
    false
}

// ─── Panic Restore ───────────────────────────────────────────────────────────

/// Saved termios for the panic hook, which cannot reach the `Terminal`.
#[cfg(unix)]
static TERMIOS_BACKUP: Mutex<Option<libc::termios>> = Mutex::new(None);

#[cfg(unix)]
fn restore_saved_mode() {
    let saved = TERMIOS_BACKUP.lock().ok().and_then(|backup| *backup);
    if let Some(mode) = saved {
        let _ = apply_mode(&mode);
    }
}

/// End sync output, mouse off, SGR reset, cursor on, leave the alternate
/// screen. The alternate-screen exit goes last so the shell comes back clean.
#[rustfmt::skip]
const EMERGENCY_RESTORE: &[u8] = b"\
    \x1b[?2026l\
    \x1b[?1006l\x1b[?1000l\
    \x1b[0m\
    \x1b[?25h\
    \x1b[?1049l";

fn install_panic_hook() {
    static HOOK: Once = Once::new();
    HOOK.call_once(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            write_restore_sequence();
            #[cfg(unix)]
            restore_saved_mode();
            previous(info);
        }));
    });
}

/// Raw write to fd 1; the stdout lock may be held by a half-drawn frame.
fn write_restore_sequence() {
    #[cfg(unix)]
    {
        let seq = EMERGENCY_RESTORE;
        let _ = unsafe { libc::write(libc::STDOUT_FILENO, seq.as_ptr().cast(), seq.len()) };
    }

    #[cfg(not(unix))]
    {
        let mut out = io::stdout();
        let _ = out.write_all(EMERGENCY_RESTORE).and_then(|()| out.flush());
    }
}

// ─── Terminal ────────────────────────────────────────────────────────────────

/// The controlling terminal. Restored on drop.
pub struct Terminal {
    #[cfg(unix)]
    original_termios: Option<libc::termios>,
    size: Size,
    active: bool,
}

impl Terminal {
    /// A handle sized to the current terminal, or [`Size::FALLBACK`].
    /// Does not touch terminal modes until [`enter`](Self::enter).
    #[must_use]
    pub fn new() -> Self {
        Self {
            #[cfg(unix)]
            original_termios: None,
            size: get_size().unwrap_or(Size::FALLBACK),
            active: false,
        }
    }

    #[inline]
    #[must_use]
    pub const fn size(&self) -> Size {
        self.size
    }

    /// Re-query the size after a SIGWINCH. Keeps the old size if the query
    /// fails.
    pub fn refresh_size(&mut self) -> Size {
        if let Some(s) = get_size() {
            self.size = s;
        }
        self.size
    }

    #[inline]
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Raw mode, alternate screen, hidden cursor, cleared screen, mouse
    /// clicks on. Idempotent.
    ///
    /// # Errors
    ///
    /// Fails if termios cannot be changed or stdout cannot be written.
    pub fn enter(&mut self) -> io::Result<()> {
        if self.active {
            return Ok(());
        }
        install_panic_hook();
        self.enable_raw_mode()?;

        let stdout = io::stdout();
        let mut lock = stdout.lock();
        ansi::enter_alt_screen(&mut lock)?;
        ansi::cursor_hide(&mut lock)?;
        ansi::clear_screen(&mut lock)?;
        ansi::enable_mouse(&mut lock)?;
        lock.flush()?;

        self.active = true;
        Ok(())
    }

    /// Undo [`enter`](Self::enter). Idempotent.
    ///
    /// # Errors
    ///
    /// Fails if stdout cannot be written or termios cannot be restored.
    pub fn leave(&mut self) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }

        let stdout = io::stdout();
        let mut lock = stdout.lock();
        ansi::end_sync(&mut lock)?;
        ansi::disable_mouse(&mut lock)?;
        ansi::reset(&mut lock)?;
        ansi::cursor_show(&mut lock)?;
        ansi::exit_alt_screen(&mut lock)?;
        lock.flush()?;
        drop(lock);

        self.disable_raw_mode()?;
        self.active = false;
        Ok(())
    }

    // ── Raw Mode ────────────────────────────────────────────────────

    #[cfg(unix)]
    fn enable_raw_mode(&mut self) -> io::Result<()> {
        if !is_tty() {
            return Ok(());
        }
        let saved = read_mode()?;
        self.original_termios = Some(saved);
        if let Ok(mut backup) = TERMIOS_BACKUP.lock() {
            *backup = Some(saved);
        }
        apply_mode(&make_raw(saved))
    }

    #[cfg(not(unix))]
    fn enable_raw_mode(&mut self) -> io::Result<()> {
        Ok(())
    }

    #[cfg(unix)]
    fn disable_raw_mode(&mut self) -> io::Result<()> {
        let Some(saved) = self.original_termios.take() else {
            return Ok(());
        };
        apply_mode(&saved)?;
        if let Ok(mut backup) = TERMIOS_BACKUP.lock() {
            *backup = None;
        }
        Ok(())
    }

    #[cfg(not(unix))]
    fn disable_raw_mode(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// ─── termios ─────────────────────────────────────────────────────────────────

#[cfg(unix)]
fn stdin_fd() -> libc::c_int {
    use std::os::unix::io::AsRawFd;
    io::stdin().as_raw_fd()
}

#[cfg(unix)]
fn read_mode() -> io::Result<libc::termios> {
    let mut mode: libc::termios = unsafe { std::mem::zeroed() };
    if unsafe { libc::tcgetattr(stdin_fd(), &raw mut mode) } != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(mode)
}

/// `mode` with canonical input, echo, signal keys, flow control and output
/// processing off. Ctrl-C, Ctrl-Z, Ctrl-S and Ctrl-Q all arrive as bytes.
#[cfg(unix)]
fn make_raw(mut mode: libc::termios) -> libc::termios {
    unsafe { libc::cfmakeraw(&raw mut mode) };
    mode.c_cc[libc::VMIN] = 1;
    mode.c_cc[libc::VTIME] = 0;
    mode
}

#[cfg(unix)]
fn apply_mode(mode: &libc::termios) -> io::Result<()> {
    if unsafe { libc::tcsetattr(stdin_fd(), libc::TCSAFLUSH, mode) } != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

impl Default for Terminal {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        if self.active {
            let _ = self.leave();
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_terminal_is_inactive_with_a_size() {
        let term = Terminal::new();
        assert!(!term.is_active());
        assert!(term.size().cols > 0);
        assert!(term.size().rows > 0);
    }

    #[test]
    fn refresh_size_caches_result() {
        let mut term = Terminal::new();
        let s = term.refresh_size();
        assert_eq!(s, term.size());
    }

    #[test]
    fn leave_without_enter_is_noop() {
        let mut term = Terminal::new();
        term.leave().unwrap();
        assert!(!term.is_active());
    }

    #[cfg(unix)]
    #[test]
    fn raw_mode_turns_off_line_discipline() {
        let mut cooked: libc::termios = unsafe { std::mem::zeroed() };
        cooked.c_lflag = libc::ECHO | libc::ICANON | libc::ISIG | libc::IEXTEN;
        cooked.c_iflag = libc::IXON | libc::ICRNL;
        cooked.c_oflag = libc::OPOST;

        let raw = make_raw(cooked);
        assert_eq!(raw.c_lflag & (libc::ECHO | libc::ICANON | libc::ISIG), 0);
        assert_eq!(raw.c_iflag & (libc::IXON | libc::ICRNL), 0);
        assert_eq!(raw.c_oflag & libc::OPOST, 0);
        assert_eq!(raw.c_cc[libc::VMIN], 1);
    }

    #[test]
    fn emergency_restore_exits_alt_screen_last() {
        let s = std::str::from_utf8(EMERGENCY_RESTORE).unwrap();
        assert!(s.ends_with("\x1b[?1049l"));
        assert!(s.contains("\x1b[?1000l"), "mouse off");
        assert!(s.contains("\x1b[?25h"), "cursor on");
        assert!(s.starts_with("\x1b[?2026l"), "sync ended first");
    }
}
