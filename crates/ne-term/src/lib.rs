// SPDX-License-Identifier: MIT
//
// ne-term — the terminal layer for ne.
//
// Raw mode and the alternate screen via termios, ANSI output written by
// hand, a row-diffing renderer, and a parser for the keys and mouse clicks
// the editor understands. No TUI framework sits in between.

pub mod ansi;
pub mod cell;
pub mod event_loop;
pub mod frame;
pub mod input;
pub mod reader;
pub mod terminal;
