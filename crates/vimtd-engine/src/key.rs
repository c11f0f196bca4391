//! Key tokens: what the host feeds the dispatcher.
//!
//! A host sends one token per key press: a single printable char (`"d"`,
//! `"é"`), a named key (`"Escape"`, `"Enter"`, `"Left"`), or a modified
//! key (`"ctrl+r"`). [`KeyEvent`] parses all of these via [`FromStr`].
//!
//! Scripts for tests and the headless runner use Vim's key notation instead:
//! `ihello<Esc>`, `<C-r>`, `<lt>` for a literal `<`. See [`parse_keys`].

use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyParseError {
    #[error("empty key token")]
    Empty,

    #[error("unknown key: {0}")]
    Unknown(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A Unicode character.
    Char(char),
    Enter,
    Tab,
    Backspace,
    Escape,
    Delete,
    Up,
    Down,
    Left,
    Right,
}

bitflags! {
    /// Modifier keys held with a key.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0000_0001;
        const ALT   = 0b0000_0010;
        const CTRL  = 0b0000_0100;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    #[must_use]
    pub const fn new(code: KeyCode, modifiers: Modifiers) -> Self {
        Self { code, modifiers }
    }

    /// An unmodified key.
    #[must_use]
    pub const fn plain(code: KeyCode) -> Self {
        Self::new(code, Modifiers::empty())
    }

    /// An unmodified character.
    #[must_use]
    pub const fn char(ch: char) -> Self {
        Self::plain(KeyCode::Char(ch))
    }

    /// `ctrl` plus a character. ASCII letters are stored lowercase so
    /// `<C-R>` and `<C-r>` compare equal.
    #[must_use]
    pub const fn ctrl(ch: char) -> Self {
        Self::new(KeyCode::Char(ch.to_ascii_lowercase()), Modifiers::CTRL)
    }

    /// The character this key types in Insert mode: an unmodified (or
    /// shift-only) `Char`.
    #[must_use]
    pub fn printable(self) -> Option<char> {
        match self.code {
            KeyCode::Char(ch)
                if (self.modifiers - Modifiers::SHIFT).is_empty() && !ch.is_control() =>
            {
                Some(ch)
            }
            _ => None,
        }
    }

    /// True for `ctrl+ch`.
    #[must_use]
    pub fn is_ctrl(self, ch: char) -> bool {
        self.modifiers == Modifiers::CTRL && self.code == KeyCode::Char(ch)
    }

    /// Escape, or `ctrl+c` which aborts the same way.
    #[must_use]
    pub fn is_abort(self) -> bool {
        self.code == KeyCode::Escape || self.is_ctrl('c')
    }
}

impl From<char> for KeyEvent {
    fn from(ch: char) -> Self {
        Self::char(ch)
    }
}

impl From<KeyCode> for KeyEvent {
    fn from(code: KeyCode) -> Self {
        Self::plain(code)
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

impl FromStr for KeyEvent {
    type Err = KeyParseError;

    /// One host token: `"x"`, `"Escape"`, `"ctrl+r"`, or a bracketed Vim
    /// name such as `"<C-r>"`.
    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let mut chars = token.chars();
        match (chars.next(), chars.next()) {
            (None, _) => Err(KeyParseError::Empty),
            (Some(ch), None) => Ok(Self::char(ch)),
            _ => {
                let name = token
                    .strip_prefix('<')
                    .and_then(|rest| rest.strip_suffix('>'))
                    .unwrap_or(token);
                parse_named(name)
            }
        }
    }
}

/// Parse a key name with optional modifier prefixes.
fn parse_named(name: &str) -> Result<KeyEvent, KeyParseError> {
    let unknown = || KeyParseError::Unknown(name.to_string());
    let lower = name.to_ascii_lowercase();

    for (prefix, modifier) in [
        ("ctrl+", Modifiers::CTRL),
        ("ctrl-", Modifiers::CTRL),
        ("c-", Modifiers::CTRL),
        ("alt+", Modifiers::ALT),
        ("a-", Modifiers::ALT),
        ("m-", Modifiers::ALT),
        ("shift+", Modifiers::SHIFT),
        ("s-", Modifiers::SHIFT),
    ] {
        if lower.starts_with(prefix) && name.len() > prefix.len() {
            // Prefixes are ASCII, so the byte offset is valid in `name`.
            let rest = &name[prefix.len()..];
            let mut chars = rest.chars();
            let inner = match (chars.next(), chars.next()) {
                (Some(ch), None) if modifier == Modifiers::CTRL => KeyEvent::ctrl(ch),
                (Some(ch), None) => KeyEvent::char(ch),
                _ => parse_named(rest).map_err(|_| unknown())?,
            };
            return Ok(KeyEvent::new(inner.code, inner.modifiers | modifier));
        }
    }

    let code = match lower.as_str() {
        "esc" | "escape" => KeyCode::Escape,
        "cr" | "enter" | "return" => KeyCode::Enter,
        "tab" => KeyCode::Tab,
        "bs" | "backspace" => KeyCode::Backspace,
        "del" | "delete" => KeyCode::Delete,
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "space" => KeyCode::Char(' '),
        "lt" => KeyCode::Char('<'),
        "bar" => KeyCode::Char('|'),
        "bslash" => KeyCode::Char('\\'),
        _ => return Err(unknown()),
    };
    Ok(KeyEvent::plain(code))
}

/// Parse a key script in Vim notation.
///
/// Plain characters stand for themselves. `<Name>` is a named or modified
/// key; a `<` that does not open such a name (no closing `>`, or blanks
/// before it) is a literal `<`. Unknown names are an error.
pub fn parse_keys(script: &str) -> Result<Vec<KeyEvent>, KeyParseError> {
    let mut keys = Vec::new();
    let mut rest = script;

    while let Some(ch) = rest.chars().next() {
        if ch == '<' {
            if let Some(close) = rest.find('>') {
                let name = &rest[1..close];
                if !name.is_empty() && !name.contains(|c: char| c.is_whitespace() || c == '<') {
                    keys.push(parse_named(name)?);
                    rest = &rest[close + 1..];
                    continue;
                }
            }
        }
        keys.push(KeyEvent::char(ch));
        rest = &rest[ch.len_utf8()..];
    }

    Ok(keys)
}

// ---------------------------------------------------------------------------
// Display (Vim notation)
// ---------------------------------------------------------------------------

impl fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self.code {
            KeyCode::Char('<') => "lt".to_string(),
            KeyCode::Char(' ') if !self.modifiers.is_empty() => "Space".to_string(),
            KeyCode::Char(ch) if self.modifiers.is_empty() => return write!(f, "{ch}"),
            KeyCode::Char(ch) => ch.to_string(),
            KeyCode::Enter => "CR".to_string(),
            KeyCode::Tab => "Tab".to_string(),
            KeyCode::Backspace => "BS".to_string(),
            KeyCode::Escape => "Esc".to_string(),
            KeyCode::Delete => "Del".to_string(),
            KeyCode::Up => "Up".to_string(),
            KeyCode::Down => "Down".to_string(),
            KeyCode::Left => "Left".to_string(),
            KeyCode::Right => "Right".to_string(),
        };
        f.write_str("<")?;
        for (flag, prefix) in [
            (Modifiers::CTRL, "C-"),
            (Modifiers::ALT, "M-"),
            (Modifiers::SHIFT, "S-"),
        ] {
            if self.modifiers.contains(flag) {
                f.write_str(prefix)?;
            }
        }
        write!(f, "{name}>")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn key(token: &str) -> KeyEvent {
        token.parse().unwrap()
    }

    // -- Host tokens --------------------------------------------------------

    #[test]
    fn single_chars() {
        assert_eq!(key("d"), KeyEvent::char('d'));
        assert_eq!(key("é"), KeyEvent::char('é'));
        assert_eq!(key("<"), KeyEvent::char('<'));
        assert_eq!(key(" "), KeyEvent::char(' '));
    }

    #[test]
    fn named_tokens() {
        assert_eq!(key("Escape"), KeyEvent::plain(KeyCode::Escape));
        assert_eq!(key("Esc"), KeyEvent::plain(KeyCode::Escape));
        assert_eq!(key("Backspace"), KeyEvent::plain(KeyCode::Backspace));
        assert_eq!(key("Enter"), KeyEvent::plain(KeyCode::Enter));
        assert_eq!(key("Tab"), KeyEvent::plain(KeyCode::Tab));
        assert_eq!(key("Delete"), KeyEvent::plain(KeyCode::Delete));
        assert_eq!(key("Left"), KeyEvent::plain(KeyCode::Left));
        assert_eq!(key("Down"), KeyEvent::plain(KeyCode::Down));
    }

    #[test]
    fn ctrl_tokens() {
        assert_eq!(key("ctrl+r"), KeyEvent::ctrl('r'));
        assert_eq!(key("ctrl+R"), KeyEvent::ctrl('r'));
        assert_eq!(key("<C-c>"), KeyEvent::ctrl('c'));
        assert!(key("ctrl+c").is_abort());
        assert!(key("Escape").is_abort());
        assert!(!key("c").is_abort());
    }

    #[test]
    fn modified_named_key() {
        let ev = key("shift+Tab");
        assert_eq!(ev.code, KeyCode::Tab);
        assert_eq!(ev.modifiers, Modifiers::SHIFT);
    }

    #[test]
    fn bad_tokens() {
        assert_eq!("".parse::<KeyEvent>(), Err(KeyParseError::Empty));
        assert_eq!(
            "Hyper".parse::<KeyEvent>(),
            Err(KeyParseError::Unknown("Hyper".into()))
        );
        assert_eq!(
            "ctrl+Nope".parse::<KeyEvent>(),
            Err(KeyParseError::Unknown("ctrl+Nope".into()))
        );
    }

    #[test]
    fn printable() {
        assert_eq!(KeyEvent::char('x').printable(), Some('x'));
        assert_eq!(
            KeyEvent::new(KeyCode::Char('X'), Modifiers::SHIFT).printable(),
            Some('X')
        );
        assert_eq!(KeyEvent::ctrl('x').printable(), None);
        assert_eq!(KeyEvent::plain(KeyCode::Enter).printable(), None);
    }

    // -- Scripts ------------------------------------------------------------

    #[test]
    fn script_plain_and_named() {
        let keys = parse_keys("ihi<Esc>").unwrap();
        assert_eq!(
            keys,
            vec![
                KeyEvent::char('i'),
                KeyEvent::char('h'),
                KeyEvent::char('i'),
                KeyEvent::plain(KeyCode::Escape),
            ]
        );
    }

    #[test]
    fn script_modifiers_and_lt() {
        let keys = parse_keys("u<C-r><lt>").unwrap();
        assert_eq!(
            keys,
            vec![KeyEvent::char('u'), KeyEvent::ctrl('r'), KeyEvent::char('<')]
        );
    }

    #[test]
    fn script_literal_angle_brackets() {
        let keys = parse_keys("a< b>").unwrap();
        assert_eq!(keys.len(), 5);
        assert_eq!(keys[1], KeyEvent::char('<'));
        assert_eq!(parse_keys("x<").unwrap().len(), 2);
    }

    #[test]
    fn script_unknown_name_is_error() {
        assert_eq!(
            parse_keys("i<Bogus>"),
            Err(KeyParseError::Unknown("Bogus".into()))
        );
    }

    #[test]
    fn script_unicode() {
        assert_eq!(parse_keys("ié").unwrap()[1], KeyEvent::char('é'));
    }

    // -- Display ------------------------------------------------------------

    #[test]
    fn display_round_trips_through_script() {
        let script = "dw<C-r><Esc><lt><CR><BS><Del><Left><Tab>x";
        let keys = parse_keys(script).unwrap();
        let shown: String = keys.iter().map(ToString::to_string).collect();
        assert_eq!(shown, script);
    }
}
