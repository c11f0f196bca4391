//! Editor options and the `:set` syntax that changes them.
//!
//! | Syntax          | Effect                    |
//! |-----------------|---------------------------|
//! | `option`        | enable a boolean          |
//! | `nooption`      | disable a boolean         |
//! | `option!`       | toggle a boolean          |
//! | `option?`       | query (no change)         |
//! | `option=N`      | assign a number           |
//!
//! | Full name    | Abbrev | Type    | Default |
//! |--------------|--------|---------|---------|
//! | `expandtab`  | `et`   | bool    | false   |
//! | `tabstop`    | `ts`   | integer | 8       |
//! | `undolevels` | `ul`   | integer | 1000    |
//!
//! A challenge carries its options as a list of `:set` argument strings, or
//! directly as a serialized [`Options`] value.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum OptionError {
    #[error("Unknown option: {0}")]
    Unknown(String),

    #[error("Invalid argument: {name}={value}")]
    InvalidValue { name: String, value: String },

    #[error("Not a boolean option: {0}")]
    NotBoolean(String),
}

/// A parsed `:set` argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetDirective {
    On(String),
    Off(String),
    Toggle(String),
    Query(String),
    Assign(String, String),
}

// ---------------------------------------------------------------------------
// Names
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OptionName {
    ExpandTab,
    TabStop,
    UndoLevels,
}

impl OptionName {
    fn lookup(name: &str) -> Option<Self> {
        match name {
            "expandtab" | "et" => Some(Self::ExpandTab),
            "tabstop" | "ts" => Some(Self::TabStop),
            "undolevels" | "ul" => Some(Self::UndoLevels),
            _ => None,
        }
    }

    const fn full_name(self) -> &'static str {
        match self {
            Self::ExpandTab => "expandtab",
            Self::TabStop => "tabstop",
            Self::UndoLevels => "undolevels",
        }
    }

    const fn is_bool(self) -> bool {
        matches!(self, Self::ExpandTab)
    }
}

/// True for a boolean option name or abbreviation.
#[must_use]
pub fn is_bool_option(name: &str) -> bool {
    OptionName::lookup(name).is_some_and(OptionName::is_bool)
}

/// True for a numeric option name or abbreviation.
#[must_use]
pub fn is_numeric_option(name: &str) -> bool {
    OptionName::lookup(name).is_some_and(|opt| !opt.is_bool())
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Split `:set` arguments on whitespace and parse each one.
#[must_use]
pub fn parse_set(args: &str) -> Vec<SetDirective> {
    args.split_whitespace().map(parse_set_arg).collect()
}

/// Parse one `:set` argument.
#[must_use]
pub fn parse_set_arg(arg: &str) -> SetDirective {
    if let Some((name, value)) = arg.split_once('=') {
        return SetDirective::Assign(name.to_string(), value.to_string());
    }
    if let Some(name) = arg.strip_suffix('?') {
        return SetDirective::Query(name.to_string());
    }
    if let Some(name) = arg.strip_suffix('!') {
        return SetDirective::Toggle(name.to_string());
    }
    // `no` only negates a real boolean, so a future `notimeout` style name
    // is not split by accident.
    if let Some(name) = arg.strip_prefix("no") {
        if is_bool_option(name) {
            return SetDirective::Off(name.to_string());
        }
    }
    // A bare numeric name shows its value, as in Vim.
    if is_numeric_option(arg) {
        return SetDirective::Query(arg.to_string());
    }
    SetDirective::On(arg.to_string())
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Insert spaces for `Tab` in Insert mode.
    pub expandtab: bool,
    /// Display width of a tab, and the space count `expandtab` inserts.
    pub tabstop: usize,
    /// Maximum undo depth. Zero disables undo.
    pub undolevels: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            expandtab: false,
            tabstop: 8,
            undolevels: 1000,
        }
    }
}

impl Options {
    /// Apply `:set` arguments in order. Stops at the first bad argument;
    /// earlier arguments stay applied.
    pub fn apply(&mut self, args: &str) -> Result<(), OptionError> {
        for directive in parse_set(args) {
            self.apply_directive(directive)?;
        }
        Ok(())
    }

    fn apply_directive(&mut self, directive: SetDirective) -> Result<(), OptionError> {
        match directive {
            SetDirective::On(name) => self.set_bool(&name, |_| true),
            SetDirective::Off(name) => self.set_bool(&name, |_| false),
            SetDirective::Toggle(name) => self.set_bool(&name, |on| !on),
            SetDirective::Query(name) => self.show(&name).map(drop),
            SetDirective::Assign(name, value) => {
                let opt = lookup(&name)?;
                let invalid = || OptionError::InvalidValue {
                    name: name.clone(),
                    value: value.clone(),
                };
                let number: usize = value.parse().map_err(|_| invalid())?;
                match opt {
                    OptionName::ExpandTab => return Err(invalid()),
                    OptionName::TabStop if number == 0 => return Err(invalid()),
                    OptionName::TabStop => self.tabstop = number,
                    OptionName::UndoLevels => self.undolevels = number,
                }
                Ok(())
            }
        }
    }

    fn set_bool(&mut self, name: &str, f: impl FnOnce(bool) -> bool) -> Result<(), OptionError> {
        match lookup(name)? {
            OptionName::ExpandTab => {
                self.expandtab = f(self.expandtab);
                Ok(())
            }
            _ => Err(OptionError::NotBoolean(name.to_string())),
        }
    }

    /// The `:set option?` answer: `expandtab` / `noexpandtab` or `tabstop=8`.
    pub fn show(&self, name: &str) -> Result<String, OptionError> {
        let opt = lookup(name)?;
        Ok(match opt {
            OptionName::ExpandTab if self.expandtab => opt.full_name().to_string(),
            OptionName::ExpandTab => format!("no{}", opt.full_name()),
            OptionName::TabStop => format!("{}={}", opt.full_name(), self.tabstop),
            OptionName::UndoLevels => format!("{}={}", opt.full_name(), self.undolevels),
        })
    }

    /// What `Tab` inserts in Insert mode.
    #[must_use]
    pub fn tab_text(&self) -> String {
        if self.expandtab {
            " ".repeat(self.tabstop.max(1))
        } else {
            "\t".to_string()
        }
    }
}

fn lookup(name: &str) -> Result<OptionName, OptionError> {
    OptionName::lookup(name).ok_or_else(|| OptionError::Unknown(name.to_string()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- parse_set_arg ------------------------------------------------------

    #[test]
    fn parse_forms() {
        assert_eq!(parse_set_arg("expandtab"), SetDirective::On("expandtab".into()));
        assert_eq!(parse_set_arg("noet"), SetDirective::Off("et".into()));
        assert_eq!(parse_set_arg("et!"), SetDirective::Toggle("et".into()));
        assert_eq!(parse_set_arg("et?"), SetDirective::Query("et".into()));
        assert_eq!(
            parse_set_arg("ts=2"),
            SetDirective::Assign("ts".into(), "2".into())
        );
    }

    #[test]
    fn bare_numeric_is_query() {
        assert_eq!(parse_set_arg("tabstop"), SetDirective::Query("tabstop".into()));
        assert_eq!(parse_set_arg("ul"), SetDirective::Query("ul".into()));
    }

    #[test]
    fn no_prefix_needs_a_boolean() {
        assert_eq!(parse_set_arg("nofoo"), SetDirective::On("nofoo".into()));
        assert_eq!(parse_set_arg("nots"), SetDirective::On("nots".into()));
    }

    #[test]
    fn parse_multiple() {
        assert_eq!(
            parse_set("  et ts=4 "),
            vec![
                SetDirective::On("et".into()),
                SetDirective::Assign("ts".into(), "4".into()),
            ]
        );
        assert!(parse_set("").is_empty());
    }

    // -- Options::apply -----------------------------------------------------

    #[test]
    fn defaults() {
        let opts = Options::default();
        assert!(!opts.expandtab);
        assert_eq!(opts.tabstop, 8);
        assert_eq!(opts.undolevels, 1000);
    }

    #[test]
    fn apply_booleans_and_numbers() {
        let mut opts = Options::default();
        opts.apply("expandtab ts=2 ul=50").unwrap();
        assert!(opts.expandtab);
        assert_eq!(opts.tabstop, 2);
        assert_eq!(opts.undolevels, 50);
        opts.apply("et!").unwrap();
        assert!(!opts.expandtab);
        opts.apply("et").unwrap();
        opts.apply("noexpandtab").unwrap();
        assert!(!opts.expandtab);
    }

    #[test]
    fn apply_errors() {
        let mut opts = Options::default();
        assert_eq!(opts.apply("bogus"), Err(OptionError::Unknown("bogus".into())));
        assert_eq!(
            opts.apply("ts=abc"),
            Err(OptionError::InvalidValue {
                name: "ts".into(),
                value: "abc".into()
            })
        );
        assert_eq!(
            opts.apply("ts=0"),
            Err(OptionError::InvalidValue {
                name: "ts".into(),
                value: "0".into()
            })
        );
        assert_eq!(opts.apply("ts!"), Err(OptionError::NotBoolean("ts".into())));
        assert_eq!(opts, Options::default());
    }

    #[test]
    fn apply_keeps_earlier_arguments() {
        let mut opts = Options::default();
        assert!(opts.apply("et nope").is_err());
        assert!(opts.expandtab);
    }

    #[test]
    fn show_values() {
        let mut opts = Options::default();
        assert_eq!(opts.show("et").unwrap(), "noexpandtab");
        assert_eq!(opts.show("ts").unwrap(), "tabstop=8");
        opts.apply("et ul=3").unwrap();
        assert_eq!(opts.show("expandtab").unwrap(), "expandtab");
        assert_eq!(opts.show("undolevels").unwrap(), "undolevels=3");
        assert!(opts.show("zzz").is_err());
    }

    #[test]
    fn tab_text_follows_expandtab() {
        let mut opts = Options::default();
        assert_eq!(opts.tab_text(), "\t");
        opts.apply("et ts=4").unwrap();
        assert_eq!(opts.tab_text(), "    ");
    }

    #[test]
    fn error_messages() {
        assert_eq!(OptionError::Unknown("x".into()).to_string(), "Unknown option: x");
        assert_eq!(
            OptionError::NotBoolean("ts".into()).to_string(),
            "Not a boolean option: ts"
        );
    }
}
