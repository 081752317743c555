//! Editor options — values and the `set` directive grammar.
//!
//! Options come from three places at startup (defaults, the `NE_OPTIONS`
//! environment variable, `--set` flags) and from the `Ctrl-O` prompt at
//! runtime. All of them speak the same directive grammar:
//!
//! | Syntax          | Effect                        |
//! |-----------------|-------------------------------|
//! | `option`        | Enable boolean / show numeric |
//! | `nooption`      | Disable boolean               |
//! | `option!`       | Toggle boolean                |
//! | `option?`       | Query current value           |
//! | `option=N`      | Assign numeric value          |
//! | (empty)         | Show changed options          |
//! | `all`           | Show all options              |
//!
//! # Option names
//!
//! | Full name    | Abbrev | Type    | Default |
//! |--------------|--------|---------|---------|
//! | `maxlines`   | `ml`   | integer | 1000    |
//! | `linelen`    | `ll`   | integer | 256     |
//! | `autosave`   | `as`   | integer | 5       |
//! | `tabwidth`   | `tw`   | integer | 4       |
//! | `autoindent` | `ai`   | bool    | false   |
//! | `number`     | `nu`   | bool    | false   |
//! | `syntax`     | `syn`  | bool    | true    |
//! | `brackets`   | `br`   | bool    | true    |
//!
//! `maxlines` and `linelen` size the document, so they are only accepted
//! before the file is loaded.

use crate::error::OptionError;
use crate::line_store::{DEFAULT_CAPACITY, DEFAULT_LINE_SIZE, MIN_LINE_SIZE};

/// Largest accepted `tabwidth`.
pub const MAX_TAB_WIDTH: usize = 16;

/// A parsed `set` directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetDirective {
    /// `option` — enable a boolean option.
    On(String),

    /// `nooption` — disable a boolean option.
    Off(String),

    /// `option!` — toggle a boolean option.
    Toggle(String),

    /// `option?` — query the current value.
    Query(String),

    /// `option=value` — assign a value.
    Assign(String, String),

    /// No arguments — show options that differ from their defaults.
    ShowChanged,

    /// `all` — show every option.
    ShowAll,
}

// ---------------------------------------------------------------------------
// Names
// ---------------------------------------------------------------------------

/// Full name of an option given its full name or abbreviation.
#[must_use]
pub fn canonical_name(name: &str) -> Option<&'static str> {
    Some(match name {
        "maxlines" | "ml" => "maxlines",
        "linelen" | "ll" => "linelen",
        "autosave" | "as" => "autosave",
        "tabwidth" | "tw" => "tabwidth",
        "autoindent" | "ai" => "autoindent",
        "number" | "nu" => "number",
        "syntax" | "syn" => "syntax",
        "brackets" | "br" => "brackets",
        _ => return None,
    })
}

/// Returns `true` if `name` is a known boolean option (full name or abbreviation).
#[must_use]
pub fn is_bool_option(name: &str) -> bool {
    matches!(
        canonical_name(name),
        Some("autoindent" | "number" | "syntax" | "brackets")
    )
}

/// Returns `true` if `name` is a known numeric option (full name or abbreviation).
#[must_use]
pub fn is_numeric_option(name: &str) -> bool {
    matches!(
        canonical_name(name),
        Some("maxlines" | "linelen" | "autosave" | "tabwidth")
    )
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse a directive string into directives. Arguments are separated by
/// whitespace; an empty string produces [`SetDirective::ShowChanged`].
#[must_use]
pub fn parse_set(args: &str) -> Vec<SetDirective> {
    let trimmed = args.trim();
    if trimmed.is_empty() {
        return vec![SetDirective::ShowChanged];
    }
    trimmed.split_whitespace().map(parse_set_arg).collect()
}

/// Parse a single argument into a directive.
#[must_use]
pub fn parse_set_arg(arg: &str) -> SetDirective {
    if arg == "all" {
        return SetDirective::ShowAll;
    }
    if let Some((name, value)) = arg.split_once('=') {
        return SetDirective::Assign(name.to_string(), value.to_string());
    }
    if let Some(name) = arg.strip_suffix('?') {
        return SetDirective::Query(name.to_string());
    }
    if let Some(name) = arg.strip_suffix('!') {
        return SetDirective::Toggle(name.to_string());
    }
    // `nonumber` is Off("number"); `number` itself must not become Off("mber").
    if let Some(name) = arg.strip_prefix("no") {
        if is_bool_option(name) {
            return SetDirective::Off(name.to_string());
        }
    }
    if is_numeric_option(arg) {
        return SetDirective::Query(arg.to_string());
    }
    SetDirective::On(arg.to_string())
}

/// Format a boolean option for display: `"name"` or `"noname"`.
#[must_use]
pub fn format_bool(name: &str, value: bool) -> String {
    if value {
        name.to_string()
    } else {
        format!("no{name}")
    }
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Every tunable of the editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Document capacity in lines.
    pub max_lines: usize,
    /// Line buffer size; a line holds one byte less.
    pub line_len: usize,
    /// Autosave interval in seconds. Zero disables autosave.
    pub autosave_secs: u64,
    /// Spaces per Tab and per nesting level.
    pub tab_width: usize,
    /// Indent by brace depth on every Enter, not only inside `{}`.
    pub auto_indent: bool,
    /// Show the line-number gutter.
    pub number: bool,
    /// Color tokens by kind.
    pub syntax: bool,
    /// Paint `{ } ( )`. Hiding them is a display switch only.
    pub brackets: bool,
}

impl Options {
    const ALL: [&'static str; 8] = [
        "maxlines",
        "linelen",
        "autosave",
        "tabwidth",
        "autoindent",
        "number",
        "syntax",
        "brackets",
    ];

    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_lines: DEFAULT_CAPACITY,
            line_len: DEFAULT_LINE_SIZE,
            autosave_secs: 5,
            tab_width: 4,
            auto_indent: false,
            number: false,
            syntax: true,
            brackets: true,
        }
    }

    /// Parse and apply a whole directive string. Stops at the first error.
    /// Returns the messages produced by queries, in order.
    ///
    /// # Errors
    ///
    /// The first [`OptionError`] encountered.
    pub fn apply_str(&mut self, args: &str, startup: bool) -> Result<Vec<String>, OptionError> {
        let mut messages = Vec::new();
        for directive in parse_set(args) {
            if let Some(msg) = self.apply(&directive, startup)? {
                messages.push(msg);
            }
        }
        Ok(messages)
    }

    /// Apply one directive. `startup` is false once the document is loaded,
    /// which locks the capacity options.
    ///
    /// Returns a message to show for queries, or `None` for assignments.
    ///
    /// # Errors
    ///
    /// [`OptionError`] for unknown names, booleans given values (or numbers
    /// given none), out-of-range values and locked capacity options.
    pub fn apply(
        &mut self,
        directive: &SetDirective,
        startup: bool,
    ) -> Result<Option<String>, OptionError> {
        match directive {
            SetDirective::ShowChanged => Ok(Some(self.describe(true))),
            SetDirective::ShowAll => Ok(Some(self.describe(false))),
            SetDirective::Query(name) => {
                let name = known(name)?;
                Ok(Some(self.format(name)))
            }
            SetDirective::On(name) => self.set_bool(name, |_| true),
            SetDirective::Off(name) => self.set_bool(name, |_| false),
            SetDirective::Toggle(name) => self.set_bool(name, |v| !v),
            SetDirective::Assign(name, value) => {
                let canonical = known(name)?;
                if !is_numeric_option(canonical) {
                    return Err(OptionError::InvalidValue {
                        name: canonical.to_string(),
                        value: value.clone(),
                    });
                }
                if !startup && matches!(canonical, "maxlines" | "linelen") {
                    return Err(OptionError::StartupOnly(canonical.to_string()));
                }
                self.set_numeric(canonical, value)?;
                Ok(None)
            }
        }
    }

    /// Current value of option `name` (a canonical name), formatted for the
    /// status line.
    #[must_use]
    pub fn format(&self, name: &str) -> String {
        match name {
            "maxlines" => format!("maxlines={}", self.max_lines),
            "linelen" => format!("linelen={}", self.line_len),
            "autosave" => format!("autosave={}", self.autosave_secs),
            "tabwidth" => format!("tabwidth={}", self.tab_width),
            "autoindent" => format_bool(name, self.auto_indent),
            "number" => format_bool(name, self.number),
            "syntax" => format_bool(name, self.syntax),
            "brackets" => format_bool(name, self.brackets),
            _ => String::new(),
        }
    }

    fn describe(&self, changed_only: bool) -> String {
        let defaults = Self::new();
        Self::ALL
            .iter()
            .map(|name| (self.format(name), defaults.format(name)))
            .filter(|(now, default)| !changed_only || now != default)
            .map(|(now, _)| now)
            .collect::<Vec<_>>()
            .join("  ")
    }

    fn bool_slot(&mut self, name: &str) -> Option<&mut bool> {
        match name {
            "autoindent" => Some(&mut self.auto_indent),
            "number" => Some(&mut self.number),
            "syntax" => Some(&mut self.syntax),
            "brackets" => Some(&mut self.brackets),
            _ => None,
        }
    }

    fn set_bool(
        &mut self,
        name: &str,
        f: impl FnOnce(bool) -> bool,
    ) -> Result<Option<String>, OptionError> {
        let canonical = known(name)?;
        let slot = self
            .bool_slot(canonical)
            .ok_or_else(|| OptionError::NotBoolean(canonical.to_string()))?;
        *slot = f(*slot);
        Ok(None)
    }

    fn set_numeric(&mut self, name: &'static str, value: &str) -> Result<(), OptionError> {
        let invalid = || OptionError::InvalidValue {
            name: name.to_string(),
            value: value.to_string(),
        };
        let n: u64 = value.parse().map_err(|_| invalid())?;
        let as_usize = usize::try_from(n).map_err(|_| invalid())?;
        match name {
            "maxlines" if as_usize >= 1 => self.max_lines = as_usize,
            "linelen" if as_usize >= MIN_LINE_SIZE => self.line_len = as_usize,
            "autosave" => self.autosave_secs = n,
            "tabwidth" if (1..=MAX_TAB_WIDTH).contains(&as_usize) => self.tab_width = as_usize,
            _ => return Err(invalid()),
        }
        Ok(())
    }
}

impl Default for Options {
    fn default() -> Self {
        Self::new()
    }
}

fn known(name: &str) -> Result<&'static str, OptionError> {
    canonical_name(name).ok_or_else(|| OptionError::Unknown(name.to_string()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
