//! Registers: where yanked and deleted text lives until it is pasted.
//!
//! Every yank and delete writes the unnamed register. A `"x` prefix also
//! targets a named register `a`–`z`: lowercase overwrites, uppercase appends.
//!
//! Linewise text is stored **without** a trailing newline; several lines are
//! joined with `\n`. The kind, not a trailing break, tells paste to insert
//! whole lines.

use std::fmt;

/// How the text was captured. Decides how it pastes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegisterKind {
    /// Pastes inline at the cursor.
    #[default]
    Char,
    /// Pastes as whole lines above or below the cursor line.
    Line,
}

/// One register slot.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Register {
    content: String,
    kind: RegisterKind,
}

impl Register {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            content: String::new(),
            kind: RegisterKind::Char,
        }
    }

    /// Replace the content.
    pub fn set(&mut self, text: String, kind: RegisterKind) {
        self.content = text;
        self.kind = kind;
    }

    /// Append to the content. Anything linewise on either side makes the
    /// result linewise, joined by a line break.
    pub fn append(&mut self, text: &str, kind: RegisterKind) {
        if kind == RegisterKind::Line || self.kind == RegisterKind::Line {
            if !self.content.is_empty() {
                self.content.push('\n');
            }
            self.kind = RegisterKind::Line;
        }
        self.content.push_str(text);
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    #[must_use]
    pub const fn kind(&self) -> RegisterKind {
        self.kind
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// True when paste should insert whole lines: the text was captured
    /// linewise or spans a line break.
    #[must_use]
    pub fn pastes_linewise(&self) -> bool {
        self.kind == RegisterKind::Line || self.content.contains('\n')
    }
}

// ---------------------------------------------------------------------------
// Register file
// ---------------------------------------------------------------------------

/// The unnamed register plus `a`–`z`.
#[derive(Clone, PartialEq, Eq)]
pub struct RegisterFile {
    unnamed: Register,
    named: [Register; 26],
}

impl RegisterFile {
    #[must_use]
    pub fn new() -> Self {
        Self {
            unnamed: Register::new(),
            named: std::array::from_fn(|_| Register::new()),
        }
    }

    /// True for a name `"x` may select.
    #[must_use]
    pub const fn is_valid_name(name: char) -> bool {
        name.is_ascii_alphabetic() || name == '"'
    }

    /// Store text.
    ///
    /// - `None` or `'"'`: unnamed only.
    /// - `'a'..='z'`: overwrite the named register and the unnamed one.
    /// - `'A'..='Z'`: append to the named register; the unnamed one receives
    ///   the combined text.
    pub fn write(&mut self, name: Option<char>, text: String, kind: RegisterKind) {
        match name {
            Some(ch @ 'a'..='z') => {
                self.named[slot(ch)].set(text.clone(), kind);
                self.unnamed.set(text, kind);
            }
            Some(ch @ 'A'..='Z') => {
                let named = &mut self.named[slot(ch)];
                named.append(&text, kind);
                self.unnamed = named.clone();
            }
            _ => self.unnamed.set(text, kind),
        }
    }

    /// The register to paste from. Reads are case-insensitive; unknown
    /// names read the unnamed register.
    #[must_use]
    pub fn read(&self, name: Option<char>) -> &Register {
        match name {
            Some(ch) if ch.is_ascii_alphabetic() => &self.named[slot(ch)],
            _ => &self.unnamed,
        }
    }

    #[must_use]
    pub const fn unnamed(&self) -> &Register {
        &self.unnamed
    }
}

fn slot(name: char) -> usize {
    usize::from(name.to_ascii_lowercase() as u8 - b'a')
}

impl Default for RegisterFile {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RegisterFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        map.entry(&'"', &self.unnamed);
        for (name, reg) in ('a'..='z').zip(&self.named) {
            if !reg.is_empty() {
                map.entry(&name, reg);
            }
        }
        map.finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
