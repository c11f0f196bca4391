//! Editing modes as the outside world sees them.
//!
//! | Mode             | Cursor shape | Cursor limit        |
//! |------------------|--------------|---------------------|
//! | Normal           | Block        | `0..=line_len - 1`  |
//! | Insert           | Bar          | `0..=line_len`      |
//! | Visual           | Block        | `0..=line_len - 1`  |
//! | Operator-Pending | Underline    | `0..=line_len - 1`  |
//!
//! The dispatcher keeps a richer internal state (anchor, pending count);
//! [`Mode`] is the projection a renderer or a host reads.

use std::fmt;

use crate::operator::Operator;

/// The sub-mode of a visual selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VisualKind {
    /// `v`
    Char,
    /// `V`
    Line,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    #[default]
    Normal,
    Insert,
    Visual(VisualKind),
    /// An operator key was typed and waits for its motion or text object.
    OperatorPending(Operator),
}

impl Mode {
    /// Label for the status line.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::Insert => "INSERT",
            Self::Visual(VisualKind::Char) => "VISUAL",
            Self::Visual(VisualKind::Line) => "VISUAL LINE",
            Self::OperatorPending(_) => "OPERATOR-PENDING",
        }
    }

    #[must_use]
    pub const fn cursor_shape(self) -> CursorShape {
        match self {
            Self::Normal | Self::Visual(_) => CursorShape::Block,
            Self::Insert => CursorShape::Bar,
            Self::OperatorPending(_) => CursorShape::Underline,
        }
    }

    /// True when the cursor may sit after the last char of a line.
    #[inline]
    #[must_use]
    pub const fn cursor_past_end(self) -> bool {
        matches!(self, Self::Insert)
    }

    #[inline]
    #[must_use]
    pub const fn is_visual(self) -> bool {
        matches!(self, Self::Visual(_))
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Cursor shape a renderer should draw. Kept here so the engine does not
/// depend on any terminal crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CursorShape {
    Block,
    Bar,
    Underline,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_normal() {
        assert_eq!(Mode::default(), Mode::Normal);
    }

    #[test]
    fn display_names() {
        assert_eq!(Mode::Normal.to_string(), "NORMAL");
        assert_eq!(Mode::Insert.to_string(), "INSERT");
        assert_eq!(Mode::Visual(VisualKind::Char).to_string(), "VISUAL");
        assert_eq!(Mode::Visual(VisualKind::Line).to_string(), "VISUAL LINE");
        assert_eq!(
            Mode::OperatorPending(Operator::Delete).to_string(),
            "OPERATOR-PENDING"
        );
    }

    #[test]
    fn cursor_shapes() {
        assert_eq!(Mode::Normal.cursor_shape(), CursorShape::Block);
        assert_eq!(Mode::Insert.cursor_shape(), CursorShape::Bar);
        assert_eq!(
            Mode::Visual(VisualKind::Line).cursor_shape(),
            CursorShape::Block
        );
        assert_eq!(
            Mode::OperatorPending(Operator::Yank).cursor_shape(),
            CursorShape::Underline
        );
    }

    #[test]
    fn only_insert_goes_past_end() {
        assert!(Mode::Insert.cursor_past_end());
        assert!(!Mode::Normal.cursor_past_end());
        assert!(!Mode::Visual(VisualKind::Char).cursor_past_end());
        assert!(!Mode::OperatorPending(Operator::Change).cursor_past_end());
    }

    #[test]
    fn visual_predicate() {
        assert!(Mode::Visual(VisualKind::Char).is_visual());
        assert!(!Mode::Insert.is_visual());
    }
}
