// SPDX-License-Identifier: MIT
//
// ne — a quick terminal editor for C sources.
//
// This binary wires the two crates together:
//
//   ne-term → terminal control, input parsing, frame rendering, event loop
//   ne-core → line store, cursor, editing engine, options, autosave
//
// The Editor implements ne-term's App trait. Each keypress flows through:
//
//   stdin → parser → on_event → key dispatch → SharedSession::with(engine op)
//   paint → view::draw_text / draw_status → frame → row diff → terminal
//
// The document lives in a SharedSession so the autosave worker can save it
// between keystrokes. Every foreground operation takes the session lock for
// exactly one call.

mod view;

use std::env;
use std::path::PathBuf;
use std::process;
use std::sync::Once;
use std::sync::mpsc::Receiver;
use std::time::Duration;

use ne_core::autosave::{Autosave, AutosaveReport};
use ne_core::engine::is_printable;
use ne_core::session::OpenReport;
use ne_core::{EditEngine, EditError, Options, SharedSession};
use ne_term::event_loop::{Action, App, EventLoop};
use ne_term::frame::Frame;
use ne_term::input::{Event, KeyCode, KeyEvent, Modifiers, MouseButton, MouseEventKind};
use ne_term::terminal::Size;
use tracing::{debug, error, info};
use tracing_appender::non_blocking::WorkerGuard;

/// Shown in the status line when there is no message.
const HINT: &str =
    "Ctrl+S: save | Ctrl+Q: save & quit | Ctrl+F: find | Ctrl+C/V: copy/paste | Ctrl+Z: undo line | Ctrl+O: set";

const USAGE: &str = "\
usage: ne [--set DIRECTIVES]... [--] FILE

options:
  -s, --set DIRECTIVES   apply option directives, e.g. --set \"tw=2 number\"
  -h, --help             print this help
  -V, --version          print the version

environment:
  NE_OPTIONS             directives applied before --set
  NE_LOG                 enable logging with this filter (e.g. debug)
  NE_LOG_DIR             directory for ne.log (default: current directory)";

// ─── Prompt ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PromptKind {
    Search,
    CopyCount,
    Set,
}

impl PromptKind {
    const fn label(self) -> &'static str {
        match self {
            Self::Search => "Search: ",
            Self::CopyCount => "Lines to copy: ",
            Self::Set => "set ",
        }
    }
}

/// A one-line input on the bottom row. Keys go here until Enter or Escape.
#[derive(Debug)]
struct Prompt {
    kind: PromptKind,
    input: Vec<u8>,
}

// ─── Editor ─────────────────────────────────────────────────────────────────

struct Editor {
    session: SharedSession,
    options: Options,

    /// Periodic background saves. `None` only in tests.
    autosave: Option<Autosave>,
    reports: Option<Receiver<AutosaveReport>>,

    prompt: Option<Prompt>,

    /// Last submitted search query, highlighted in the text area.
    last_search: Vec<u8>,

    /// Bottom-line message. Cleared on the next keypress.
    message: Option<String>,
    message_is_error: bool,

    /// Set after a failed save-and-quit; the next quit key leaves anyway.
    quit_armed: bool,

    /// A quit key ended the session, saving or deliberately not saving.
    quit_done: bool,

    /// File name shown on the right of the status line.
    file_name: String,

    /// Rows available to the text area.
    text_height: u16,

    /// Where paint put the terminal cursor.
    cursor_screen: Option<(u16, u16)>,
}

impl Editor {
    fn new(session: SharedSession, options: Options, text_height: u16) -> Self {
        let file_name = session
            .path()
            .file_name()
            .map_or_else(|| session.path().display().to_string(), |n| n.to_string_lossy().into_owned());
        Self {
            session,
            options,
            autosave: None,
            reports: None,
            prompt: None,
            last_search: Vec::new(),
            message: None,
            message_is_error: false,
            quit_armed: false,
            quit_done: false,
            file_name,
            text_height,
            cursor_screen: None,
        }
    }

    /// Start the autosave worker at the configured interval. Zero parks it.
    fn start_autosave(&mut self) {
        let interval = Duration::from_secs(self.options.autosave_secs);
        let (autosave, reports) = Autosave::spawn(self.session.clone(), interval);
        self.autosave = Some(autosave);
        self.reports = Some(reports);
    }

    fn set_message(&mut self, msg: impl Into<String>) {
        self.message = Some(msg.into());
        self.message_is_error = false;
    }

    fn set_error(&mut self, msg: impl Into<String>) {
        self.message = Some(msg.into());
        self.message_is_error = true;
    }

    fn clear_message(&mut self) {
        self.message = None;
        self.message_is_error = false;
    }

    /// Report an edit outcome. Capacity refusals stay silent.
    fn report(&mut self, result: Result<(), EditError>) {
        match result {
            Err(e) if !e.is_capacity() => self.set_error(e.to_string()),
            _ => {}
        }
    }

    // ── Keys ────────────────────────────────────────────────────────────

    fn handle_key(&mut self, key: &KeyEvent) -> Action {
        if let Some(prompt) = self.prompt.take() {
            return self.handle_prompt(prompt, key);
        }

        let quit_armed = std::mem::take(&mut self.quit_armed);
        self.clear_message();

        if key.modifiers.contains(Modifiers::CTRL) {
            return match key.code {
                KeyCode::Char(b'q') => self.save_and_quit(quit_armed),
                KeyCode::Char(b's') => {
                    self.save();
                    Action::Continue
                }
                KeyCode::Char(b'c') => self.open_prompt(PromptKind::CopyCount),
                KeyCode::Char(b'v') => {
                    self.paste();
                    Action::Continue
                }
                KeyCode::Char(b'z') => {
                    let result = self.session.with(EditEngine::undo_line);
                    self.report(result);
                    Action::Continue
                }
                KeyCode::Char(b'f') => self.open_prompt(PromptKind::Search),
                KeyCode::Char(b'o') => self.open_prompt(PromptKind::Set),
                _ => Action::Continue,
            };
        }

        match key.code {
            KeyCode::F(10) => return self.save_and_quit(quit_armed),
            KeyCode::Up => self.session.with(EditEngine::move_up),
            KeyCode::Down => self.session.with(EditEngine::move_down),
            KeyCode::Left => self.session.with(EditEngine::move_left),
            KeyCode::Right => self.session.with(EditEngine::move_right),
            KeyCode::Enter => {
                let result = self.session.with(EditEngine::enter);
                self.report(result);
            }
            KeyCode::Backspace => {
                let result = self.session.with(EditEngine::backspace);
                self.report(result);
            }
            KeyCode::Tab => {
                let result = self.session.with(EditEngine::tab);
                self.report(result);
            }
            KeyCode::Char(ch) if key.modifiers.is_empty() && is_printable(ch) => {
                let result = self.session.with(|e| e.insert_char(ch));
                self.report(result);
            }
            _ => {}
        }
        Action::Continue
    }

    fn handle_click(&mut self, x: u16, y: u16) {
        if y >= self.text_height {
            return;
        }
        let gutter = self
            .session
            .with(|e| view::gutter_width(&self.options, e.store().line_count()));
        let Some(col) = x.checked_sub(gutter) else {
            return;
        };
        self.clear_message();
        self.session
            .with(|e| e.click(usize::from(y), usize::from(col)));
    }

    // ── Prompts ─────────────────────────────────────────────────────────

    fn open_prompt(&mut self, kind: PromptKind) -> Action {
        self.prompt = Some(Prompt {
            kind,
            input: Vec::new(),
        });
        Action::Continue
    }

    /// Keys while a prompt is open. The prompt was taken out of `self`;
    /// put it back unless the key ends it.
    fn handle_prompt(&mut self, mut prompt: Prompt, key: &KeyEvent) -> Action {
        let ctrl = key.modifiers.contains(Modifiers::CTRL);
        match key.code {
            KeyCode::Escape => return Action::Continue,
            KeyCode::Char(b'c' | b'q') if ctrl => return Action::Continue,
            KeyCode::Enter => {
                self.submit(prompt.kind, &prompt.input);
                return Action::Continue;
            }
            KeyCode::Backspace => {
                prompt.input.pop();
            }
            KeyCode::Char(ch) if !ctrl && is_printable(ch) => prompt.input.push(ch),
            _ => {}
        }
        self.prompt = Some(prompt);
        Action::Continue
    }

    fn submit(&mut self, kind: PromptKind, input: &[u8]) {
        match kind {
            PromptKind::Search => self.search(input),
            PromptKind::CopyCount => self.copy(input),
            PromptKind::Set => self.set_options(&String::from_utf8_lossy(input)),
        }
    }

    fn search(&mut self, query: &[u8]) {
        match self.session.with(|e| e.search_forward(query)) {
            Ok(pos) => {
                self.last_search = query.to_vec();
                self.set_message(format!("Found at line {}, column {}", pos.row + 1, pos.col + 1));
            }
            Err(EditError::EmptyQuery) => self.set_message(EditError::EmptyQuery.to_string()),
            Err(e) => {
                self.last_search.clear();
                self.set_error(e.to_string());
            }
        }
    }

    fn copy(&mut self, input: &[u8]) {
        let text = String::from_utf8_lossy(input);
        let text = text.trim();
        let count = if text.is_empty() {
            Ok(1)
        } else {
            text.parse::<usize>()
        };
        match count {
            Ok(count) => {
                let copied = self.session.with(|e| e.copy(count));
                self.set_message(format!("Copied {copied} line(s)."));
            }
            Err(_) => self.set_error(format!("Invalid line count: {text}")),
        }
    }

    fn paste(&mut self) {
        match self.session.with(EditEngine::paste) {
            Ok(n) => self.set_message(format!("Pasted {n} line(s).")),
            Err(e) => self.report(Err(e)),
        }
    }

    fn set_options(&mut self, args: &str) {
        let before = self.options.autosave_secs;
        match self.options.apply_str(args, false) {
            Ok(messages) => {
                let options = self.options.clone();
                self.session.with(|e| e.apply_options(&options));
                if options.autosave_secs != before {
                    if let Some(autosave) = &self.autosave {
                        autosave.set_interval(Duration::from_secs(options.autosave_secs));
                    }
                }
                debug!(args, "options set");
                if messages.is_empty() {
                    self.clear_message();
                } else {
                    self.set_message(messages.join("  "));
                }
            }
            Err(e) => self.set_error(e.to_string()),
        }
    }

    // ── Saving ──────────────────────────────────────────────────────────

    fn save(&mut self) -> bool {
        match self.session.save() {
            Ok(_) => {
                self.set_message("Saved to file.");
                true
            }
            Err(e) => {
                self.set_error(e.to_string());
                false
            }
        }
    }

    /// Save synchronously, then quit. When the save fails the editor stays
    /// open; pressing the quit key again leaves without saving.
    fn save_and_quit(&mut self, armed: bool) -> Action {
        if self.save() || armed {
            info!(path = %self.session.path().display(), "quit");
            self.quit_done = true;
            return Action::Quit;
        }
        let msg = format!(
            "{} (press again to quit without saving)",
            self.message.take().unwrap_or_default()
        );
        self.set_error(msg);
        self.quit_armed = true;
        Action::Continue
    }

    /// Runs once the event loop has returned. Stops the autosave worker and,
    /// unless a quit key already handled the exit, saves the document. Covers
    /// stdin closing (hangup, killed pane) and terminal failures.
    fn finish(&mut self) {
        self.autosave = None;
        if self.quit_done {
            return;
        }
        match self.session.save() {
            Ok(saved) => info!(path = %saved.path.display(), lines = saved.lines, "saved on exit"),
            Err(e) => {
                error!(error = %e, "exit save failed");
                eprintln!("ne: {e}");
            }
        }
    }

    fn drain_reports(&mut self) -> bool {
        let Some(reports) = &self.reports else {
            return false;
        };
        let mut latest = None;
        while let Ok(report) = reports.try_recv() {
            latest = Some(report);
        }
        match latest {
            Some(AutosaveReport::Saved(_)) => {
                self.set_message("the file is autosaved.");
                true
            }
            Some(AutosaveReport::Failed(msg)) => {
                self.set_error(msg);
                true
            }
            None => false,
        }
    }
}

// ─── App implementation ─────────────────────────────────────────────────────

impl App for Editor {
    fn on_event(&mut self, event: &Event) -> Action {
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Mouse(m) => {
                if m.kind == MouseEventKind::Press(MouseButton::Left) && self.prompt.is_none() {
                    self.handle_click(m.x, m.y);
                }
                Action::Continue
            }
        }
    }

    fn on_resize(&mut self, size: Size) {
        self.text_height = size.rows.saturating_sub(1).max(1);
        let height = usize::from(self.text_height);
        self.session.with(|e| e.resize(height));
    }

    fn on_tick(&mut self) -> bool {
        self.drain_reports()
    }

    fn paint(&mut self, frame: &mut Frame) {
        let h = frame.height();
        let text_height = if h < 2 { h } else { h - 1 };

        let (cursor, right) = self.session.with(|e| {
            let cursor = view::draw_text(frame, e, &self.options, &self.last_search, text_height);
            let pos = e.position();
            (cursor, format!(" {} | Ln {}, Col {} ", self.file_name, pos.row + 1, pos.col + 1))
        });
        self.cursor_screen = cursor;

        if h < 2 {
            return;
        }
        let bottom = h - 1;
        if let Some(prompt) = &self.prompt {
            self.cursor_screen = Some(view::draw_prompt(
                frame,
                bottom,
                prompt.kind.label(),
                &prompt.input,
            ));
        } else {
            let left = self.message.as_deref().unwrap_or(HINT);
            view::draw_status(frame, bottom, left, &right, self.message_is_error);
        }
    }

    fn cursor(&self) -> Option<(u16, u16)> {
        self.cursor_screen
    }
}

// ─── Command line ───────────────────────────────────────────────────────────

#[derive(Debug, PartialEq, Eq)]
enum Invocation {
    Edit { path: PathBuf, sets: Vec<String> },
    Help,
    Version,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Invocation, String> {
    let mut args = args.into_iter();
    let mut sets = Vec::new();
    let mut path = None;
    let mut only_files = false;

    while let Some(arg) = args.next() {
        if only_files || !arg.starts_with('-') || arg == "-" {
            if path.replace(PathBuf::from(&arg)).is_some() {
                return Err(format!("unexpected argument: {arg}"));
            }
            continue;
        }
        match arg.as_str() {
            "--" => only_files = true,
            "-h" | "--help" => return Ok(Invocation::Help),
            "-V" | "--version" => return Ok(Invocation::Version),
            "-s" | "--set" => {
                let value = args.next().ok_or_else(|| format!("{arg} needs a value"))?;
                sets.push(value);
            }
            _ => match arg.strip_prefix("--set=") {
                Some(value) => sets.push(value.to_string()),
                None => return Err(format!("unknown option: {arg}")),
            },
        }
    }

    let path = path.ok_or_else(|| "missing file name".to_string())?;
    Ok(Invocation::Edit { path, sets })
}

/// Defaults, then `NE_OPTIONS`, then each `--set` in order.
fn startup_options(env_options: Option<&str>, sets: &[String]) -> Result<Options, String> {
    let mut options = Options::default();
    for (source, args) in env_options
        .map(|v| ("NE_OPTIONS", v))
        .into_iter()
        .chain(sets.iter().map(|s| ("--set", s.as_str())))
    {
        options
            .apply_str(args, true)
            .map_err(|e| format!("{source}: {e}"))?;
    }
    Ok(options)
}

// ─── Logging ────────────────────────────────────────────────────────────────

/// File logging when `NE_LOG` is set. The guard flushes the writer on drop.
fn configure_logging() -> Option<WorkerGuard> {
    let filter = env::var("NE_LOG").ok()?;
    let dir = env::var_os("NE_LOG_DIR").map_or_else(|| PathBuf::from("."), PathBuf::from);

    let appender = tracing_appender::rolling::never(&dir, "ne.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .ok()?;
    Some(guard)
}

/// Log panics. The terminal's restore hook, installed later, runs first.
fn install_panic_hook() {
    static HOOK: Once = Once::new();
    HOOK.call_once(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            error!(%info, "panic");
            previous(info);
        }));
    });
}

// ─── Entry point ────────────────────────────────────────────────────────────

fn main() {
    let invocation = match parse_args(env::args().skip(1)) {
        Ok(inv) => inv,
        Err(msg) => {
            eprintln!("ne: {msg}\n\n{USAGE}");
            process::exit(2);
        }
    };
    let (path, sets) = match invocation {
        Invocation::Help => {
            println!("{USAGE}");
            return;
        }
        Invocation::Version => {
            println!("ne {}", env!("CARGO_PKG_VERSION"));
            return;
        }
        Invocation::Edit { path, sets } => (path, sets),
    };

    let options = startup_options(env::var("NE_OPTIONS").ok().as_deref(), &sets).unwrap_or_else(|e| {
        eprintln!("ne: {e}");
        process::exit(2);
    });

    let _log_guard = configure_logging();
    install_panic_hook();
    info!(path = %path.display(), "startup");

    let mut event_loop = EventLoop::new();
    let text_height = event_loop.size().rows.saturating_sub(1).max(1);

    let (session, opened) = SharedSession::open(&path, &options, usize::from(text_height))
        .unwrap_or_else(|e| {
            error!(error = %e, "open failed");
            eprintln!("ne: {e}");
            process::exit(1);
        });

    let mut editor = Editor::new(session, options, text_height);
    match opened {
        OpenReport::New => editor.set_message("New file"),
        OpenReport::Loaded(report) if report.dropped > 0 => {
            editor.set_error(format!("file truncated to {} lines", report.lines));
        }
        OpenReport::Loaded(_) => {}
    }
    editor.start_autosave();

    let result = event_loop.run(&mut editor);
    editor.finish();
    if let Err(e) = result {
        error!(error = %e, "terminal failure");
        eprintln!("ne: {e}");
        process::exit(1);
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use ne_core::Position;
    use ne_term::input::MouseEvent;
    use pretty_assertions::assert_eq;
    use std::fs;

    // ── Helpers ─────────────────────────────────────────────────────────

    fn press(ch: u8) -> Event {
        Event::Key(KeyEvent::plain(KeyCode::Char(ch)))
    }

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::plain(code))
    }

    fn ctrl(ch: u8) -> Event {
        Event::Key(KeyEvent::ctrl(ch))
    }

    fn click(x: u16, y: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind: MouseEventKind::Press(MouseButton::Left),
            x,
            y,
        })
    }

    fn typed(text: &str) -> Vec<Event> {
        text.bytes().map(press).collect()
    }

    fn feed(editor: &mut Editor, events: &[Event]) -> Action {
        let mut last = Action::Continue;
        for event in events {
            last = editor.on_event(event);
        }
        last
    }

    fn quiet_options() -> Options {
        Options {
            autosave_secs: 0,
            ..Options::default()
        }
    }

    fn editor_in(dir: &tempfile::TempDir, text: &str) -> Editor {
        let path = dir.path().join("main.c");
        if !text.is_empty() {
            fs::write(&path, text).unwrap();
        }
        let options = quiet_options();
        let (session, _) = SharedSession::open(&path, &options, 10).unwrap();
        Editor::new(session, options, 10)
    }

    fn lines(editor: &Editor) -> Vec<String> {
        editor.session.with(|e| {
            e.store()
                .iter()
                .map(|l| String::from_utf8_lossy(l).into_owned())
                .collect()
        })
    }

    fn position(editor: &Editor) -> Position {
        editor.session.with(|e| e.position())
    }

    fn status_row(editor: &mut Editor) -> String {
        let mut frame = Frame::new(100, 12);
        editor.paint(&mut frame);
        frame
            .row(11)
            .unwrap()
            .iter()
            .map(|c| char::from(c.ch))
            .collect::<String>()
            .trim()
            .to_string()
    }

    // ── Typing ──────────────────────────────────────────────────────────

    #[test]
    fn typing_pairs_and_indents() {
        let dir = tempfile::tempdir().unwrap();
        let mut e = editor_in(&dir, "");
        feed(&mut e, &typed("int main("));
        feed(&mut e, &[key(KeyCode::Right), press(b' '), press(b'{'), key(KeyCode::Enter)]);
        feed(&mut e, &typed("return 0;"));
        assert_eq!(lines(&e), ["int main() {", "    return 0;", "}"]);
        assert_eq!(position(&e), Position::new(1, 13));
    }

    #[test]
    fn tab_backspace_and_arrows() {
        let dir = tempfile::tempdir().unwrap();
        let mut e = editor_in(&dir, "ab\ncd\n");
        feed(&mut e, &[key(KeyCode::Down), key(KeyCode::Tab)]);
        assert_eq!(lines(&e), ["ab", "    cd"]);
        feed(&mut e, &[key(KeyCode::Left); 4]);
        feed(&mut e, &[key(KeyCode::Backspace)]);
        assert_eq!(lines(&e), ["ab    cd"]);
        assert_eq!(position(&e), Position::new(0, 2));
    }

    #[test]
    fn ctrl_and_alt_letters_do_not_insert() {
        let dir = tempfile::tempdir().unwrap();
        let mut e = editor_in(&dir, "");
        feed(
            &mut e,
            &[
                ctrl(b'k'),
                Event::Key(KeyEvent::new(KeyCode::Char(b'x'), Modifiers::ALT)),
            ],
        );
        assert_eq!(lines(&e), [""]);
    }

    #[test]
    fn full_line_refuses_silently() {
        let dir = tempfile::tempdir().unwrap();
        let mut e = editor_in(&dir, "");
        let long = "x".repeat(255);
        feed(&mut e, &typed(&long));
        feed(&mut e, &[press(b'y')]);
        assert_eq!(lines(&e), [long]);
        assert_eq!(e.message, None);
    }

    // ── Copy / paste / undo ─────────────────────────────────────────────

    #[test]
    fn copy_prompt_then_paste() {
        let dir = tempfile::tempdir().unwrap();
        let mut e = editor_in(&dir, "a\nb\nc\nd\ne\n");
        feed(&mut e, &[key(KeyCode::Down), key(KeyCode::Down), ctrl(b'c')]);
        assert!(e.prompt.is_some());
        feed(&mut e, &[press(b'2'), key(KeyCode::Enter)]);
        assert_eq!(e.message.as_deref(), Some("Copied 2 line(s)."));

        feed(&mut e, &[key(KeyCode::Up), key(KeyCode::Up), ctrl(b'v')]);
        assert_eq!(lines(&e), ["c", "d", "a", "b", "c", "d", "e"]);
        assert_eq!(e.message.as_deref(), Some("Pasted 2 line(s)."));

        feed(&mut e, &[ctrl(b'v')]);
        assert_eq!(e.message.as_deref(), Some("Clipboard is empty."));
        assert!(e.message_is_error);
    }

    #[test]
    fn copy_prompt_defaults_to_one_and_rejects_junk() {
        let dir = tempfile::tempdir().unwrap();
        let mut e = editor_in(&dir, "a\nb\n");
        feed(&mut e, &[ctrl(b'c'), key(KeyCode::Enter)]);
        assert_eq!(e.message.as_deref(), Some("Copied 1 line(s)."));
        feed(&mut e, &[ctrl(b'c'), press(b'x'), key(KeyCode::Enter)]);
        assert_eq!(e.message.as_deref(), Some("Invalid line count: x"));
    }

    #[test]
    fn undo_restores_the_line() {
        let dir = tempfile::tempdir().unwrap();
        let mut e = editor_in(&dir, "int x;\n");
        feed(&mut e, &typed("zz"));
        assert_eq!(lines(&e), ["zzint x;"]);
        feed(&mut e, &[ctrl(b'z')]);
        assert_eq!(lines(&e), ["int x;"]);
    }

    // ── Prompts ─────────────────────────────────────────────────────────

    #[test]
    fn search_prompt_moves_cursor_and_highlights() {
        let dir = tempfile::tempdir().unwrap();
        let mut e = editor_in(&dir, "a\nb\nint foo;\n");
        feed(&mut e, &[ctrl(b'f')]);
        feed(&mut e, &typed("foo"));
        feed(&mut e, &[key(KeyCode::Enter)]);
        assert_eq!(position(&e), Position::new(2, 4));
        assert_eq!(e.message.as_deref(), Some("Found at line 3, column 5"));
        assert_eq!(e.last_search, b"foo");
    }

    #[test]
    fn search_prompt_misses_and_cancels() {
        let dir = tempfile::tempdir().unwrap();
        let mut e = editor_in(&dir, "abc\n");
        feed(&mut e, &[ctrl(b'f'), press(b'q'), key(KeyCode::Enter)]);
        assert_eq!(e.message.as_deref(), Some("No match found."));
        feed(&mut e, &[ctrl(b'f'), key(KeyCode::Enter)]);
        assert_eq!(e.message.as_deref(), Some("Search cancelled."));
    }

    #[test]
    fn prompt_backspace_and_escape() {
        let dir = tempfile::tempdir().unwrap();
        let mut e = editor_in(&dir, "abc\n");
        feed(&mut e, &[ctrl(b'f'), press(b'x'), key(KeyCode::Backspace), press(b'c')]);
        assert_eq!(e.prompt.as_ref().unwrap().input, b"c");
        feed(&mut e, &[key(KeyCode::Escape)]);
        assert!(e.prompt.is_none());
        assert_eq!(lines(&e), ["abc"]);
    }

    #[test]
    fn set_prompt_changes_options() {
        let dir = tempfile::tempdir().unwrap();
        let mut e = editor_in(&dir, "");
        feed(&mut e, &[ctrl(b'o')]);
        feed(&mut e, &typed("tw=2 nu"));
        feed(&mut e, &[key(KeyCode::Enter), key(KeyCode::Tab)]);
        assert!(e.options.number);
        assert_eq!(lines(&e), ["  "]);

        feed(&mut e, &[ctrl(b'o')]);
        feed(&mut e, &typed("ml=5"));
        feed(&mut e, &[key(KeyCode::Enter)]);
        assert_eq!(e.message.as_deref(), Some("maxlines can only be set at startup"));

        feed(&mut e, &[ctrl(b'o')]);
        feed(&mut e, &typed("tw?"));
        feed(&mut e, &[key(KeyCode::Enter)]);
        assert_eq!(e.message.as_deref(), Some("tabwidth=2"));
    }

    // ── Mouse ───────────────────────────────────────────────────────────

    #[test]
    fn click_places_cursor_with_clamp() {
        let dir = tempfile::tempdir().unwrap();
        let mut e = editor_in(&dir, "abc\nde\n");
        feed(&mut e, &[click(50, 1)]);
        assert_eq!(position(&e), Position::new(1, 2));
        feed(&mut e, &[click(0, 5)]);
        assert_eq!(position(&e), Position::new(1, 2));
        feed(&mut e, &[click(1, 10)]);
        assert_eq!(position(&e), Position::new(1, 2));
    }

    #[test]
    fn click_accounts_for_gutter() {
        let dir = tempfile::tempdir().unwrap();
        let mut e = editor_in(&dir, "abcdef\n");
        e.set_options("number");
        feed(&mut e, &[click(6, 0)]);
        assert_eq!(position(&e), Position::new(0, 2));
        feed(&mut e, &[click(1, 0)]);
        assert_eq!(position(&e), Position::new(0, 2));
    }

    // ── Saving ──────────────────────────────────────────────────────────

    #[test]
    fn ctrl_s_saves() {
        let dir = tempfile::tempdir().unwrap();
        let mut e = editor_in(&dir, "");
        feed(&mut e, &typed("x;"));
        feed(&mut e, &[ctrl(b's')]);
        assert_eq!(e.message.as_deref(), Some("Saved to file."));
        assert_eq!(fs::read(dir.path().join("main.c")).unwrap(), b"x;\n");
    }

    #[test]
    fn quit_keys_save_first() {
        let dir = tempfile::tempdir().unwrap();
        let mut e = editor_in(&dir, "");
        feed(&mut e, &typed("a"));
        assert_eq!(feed(&mut e, &[ctrl(b'q')]), Action::Quit);
        assert_eq!(fs::read(dir.path().join("main.c")).unwrap(), b"a\n");

        let mut e = editor_in(&dir, "");
        assert_eq!(feed(&mut e, &[key(KeyCode::F(10))]), Action::Quit);
    }

    #[test]
    fn failed_quit_needs_a_second_press() {
        let dir = tempfile::tempdir().unwrap();
        let options = quiet_options();
        let (session, _) =
            SharedSession::open(dir.path().join("no/such/dir.c"), &options, 10).unwrap();
        let mut e = Editor::new(session, options, 10);

        assert_eq!(feed(&mut e, &[ctrl(b'q')]), Action::Continue);
        assert!(e.message_is_error);
        assert!(e.message.as_deref().unwrap().starts_with("Failed to save"));
        assert_eq!(feed(&mut e, &[ctrl(b'q')]), Action::Quit);
    }

    #[test]
    fn other_key_disarms_quit() {
        let dir = tempfile::tempdir().unwrap();
        let options = quiet_options();
        let (session, _) =
            SharedSession::open(dir.path().join("no/such/dir.c"), &options, 10).unwrap();
        let mut e = Editor::new(session, options, 10);
        feed(&mut e, &[ctrl(b'q'), key(KeyCode::Left)]);
        assert_eq!(feed(&mut e, &[ctrl(b'q')]), Action::Continue);
    }

    #[test]
    fn loop_ending_without_quit_saves_latest_text() {
        let dir = tempfile::tempdir().unwrap();
        let mut e = editor_in(&dir, "int x;\n");
        e.start_autosave();
        feed(&mut e, &typed("//"));

        // Stdin closed: the loop returns without any quit key.
        e.finish();
        assert!(e.autosave.is_none());
        assert_eq!(fs::read(dir.path().join("main.c")).unwrap(), b"//int x;\n");
    }

    #[test]
    fn finish_after_quit_key_does_not_save_again() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("main.c");
        let mut e = editor_in(&dir, "");
        feed(&mut e, &typed("a"));
        assert_eq!(feed(&mut e, &[ctrl(b'q')]), Action::Quit);

        fs::write(&path, "edited elsewhere\n").unwrap();
        e.finish();
        assert_eq!(fs::read_to_string(&path).unwrap(), "edited elsewhere\n");
    }

    #[test]
    fn autosave_report_reaches_status_line() {
        let dir = tempfile::tempdir().unwrap();
        let mut e = editor_in(&dir, "");
        e.start_autosave();
        feed(&mut e, &typed("k"));
        e.autosave.as_ref().unwrap().save_now();

        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        while !e.on_tick() {
            assert!(std::time::Instant::now() < deadline, "no autosave report");
            std::thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(e.message.as_deref(), Some("the file is autosaved."));
        assert_eq!(fs::read(dir.path().join("main.c")).unwrap(), b"k\n");
    }

    // ── Painting ────────────────────────────────────────────────────────

    #[test]
    fn status_shows_hint_then_message() {
        let dir = tempfile::tempdir().unwrap();
        let mut e = editor_in(&dir, "ab\n");
        assert!(status_row(&mut e).starts_with("Ctrl+S: save"));
        assert!(status_row(&mut e).ends_with("main.c | Ln 1, Col 1"));

        feed(&mut e, &[ctrl(b'v')]);
        assert!(status_row(&mut e).starts_with("Clipboard is empty."));
        feed(&mut e, &[key(KeyCode::Right)]);
        assert!(status_row(&mut e).starts_with("Ctrl+S: save"));
        assert!(status_row(&mut e).ends_with("Ln 1, Col 2"));
    }

    #[test]
    fn prompt_takes_the_bottom_row_and_cursor() {
        let dir = tempfile::tempdir().unwrap();
        let mut e = editor_in(&dir, "");
        feed(&mut e, &[ctrl(b'f'), press(b'a')]);
        assert_eq!(status_row(&mut e), "Search: a");
        assert_eq!(e.cursor(), Some((9, 11)));
    }

    #[test]
    fn resize_keeps_cursor_row() {
        let dir = tempfile::tempdir().unwrap();
        let text: String = (0..20).map(|i| format!("{i}\n")).collect();
        let mut e = editor_in(&dir, &text);
        feed(&mut e, &[key(KeyCode::Down); 8]);
        e.on_resize(Size { cols: 80, rows: 4 });
        assert_eq!(e.text_height, 3);
        assert_eq!(position(&e).row, 8);
        let (screen_row, _) = e.session.with(|en| en.cursor().screen_position());
        assert_eq!(screen_row, 2);
    }

    // ── Command line ────────────────────────────────────────────────────

    fn args(list: &[&str]) -> Result<Invocation, String> {
        parse_args(list.iter().map(ToString::to_string))
    }

    #[test]
    fn parse_file_and_sets() {
        assert_eq!(
            args(&["--set", "tw=2", "-s", "nu", "--set=ai", "x.c"]),
            Ok(Invocation::Edit {
                path: PathBuf::from("x.c"),
                sets: vec!["tw=2".into(), "nu".into(), "ai".into()],
            })
        );
        assert_eq!(
            args(&["--", "--weird.c"]),
            Ok(Invocation::Edit {
                path: PathBuf::from("--weird.c"),
                sets: vec![],
            })
        );
    }

    #[test]
    fn parse_help_version_and_errors() {
        assert_eq!(args(&["-h"]), Ok(Invocation::Help));
        assert_eq!(args(&["x.c", "--version"]), Ok(Invocation::Version));
        assert!(args(&[]).is_err());
        assert!(args(&["a.c", "b.c"]).is_err());
        assert!(args(&["--set"]).is_err());
        assert!(args(&["--bogus", "a.c"]).is_err());
    }

    #[test]
    fn option_sources_apply_in_order() {
        let opts = startup_options(Some("tw=8 nu"), &["tw=2".into(), "ml=50".into()]).unwrap();
        assert_eq!(opts.tab_width, 2);
        assert!(opts.number);
        assert_eq!(opts.max_lines, 50);

        let err = startup_options(Some("bogus"), &[]).unwrap_err();
        assert!(err.starts_with("NE_OPTIONS: "));
    }
}
