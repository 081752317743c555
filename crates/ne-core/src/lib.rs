//! # ne-core — Editing core for the `ne` C quick-editor
//!
//! Everything here is terminal-free and testable on its own:
//!
//! - **[`position`]** — `Position` (row, col), 0-indexed byte coordinates
//! - **[`line_store`]** — `LineStore`, the bounded grid of byte lines
//! - **[`cursor`]** — `Cursor` with its viewport (`top`, `screen_row`)
//! - **[`engine`]** — `EditEngine`: auto-pairing, Tab, Backspace, brace-aware Enter,
//!   copy/paste, one-line undo, search
//! - **[`classify`]** — per-line lexical classifier for C highlighting
//! - **[`clipboard`]**, **[`search`]** — the single copy slot and substring search
//! - **[`options`]** — option values and the `set` directive grammar
//! - **[`persist`]** — reading and writing the file
//! - **[`session`]** — the engine bound to a file behind one shared lock
//! - **[`autosave`]** — the periodic background save worker
//! - **[`error`]** — typed errors for edits, files and options

pub mod autosave;
pub mod classify;
pub mod clipboard;
pub mod cursor;
pub mod engine;
pub mod error;
pub mod line_store;
pub mod options;
pub mod persist;
pub mod position;
pub mod search;
pub mod session;

pub use engine::EditEngine;
pub use error::{EditError, OptionError, PersistError};
pub use options::Options;
pub use position::Position;
pub use session::SharedSession;
