//! Render snapshot: a read-only picture of an editor for presentation.
//!
//! [`Editor::snapshot`] copies out everything a renderer draws: the lines,
//! the cursor, the status line labels and the visual selection. Nothing in
//! the snapshot points back into the editor, so a renderer cannot change
//! editing state.

use unicode_width::UnicodeWidthChar;

use crate::editor::{Editor, State};
use crate::mode::{CursorShape, Mode, VisualKind};
use crate::position::Position;

/// A visual selection, normalized so `start <= end`. Both ends are
/// included. For a linewise span only the lines matter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisualSpan {
    pub start: Position,
    pub end: Position,
    pub linewise: bool,
}

impl VisualSpan {
    #[must_use]
    pub fn contains(&self, line: usize, col: usize) -> bool {
        if line < self.start.line || line > self.end.line {
            return false;
        }
        if self.linewise {
            return true;
        }
        let pos = Position::new(line, col);
        self.start <= pos && pos <= self.end
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderSnapshot {
    pub lines: Vec<String>,
    pub cursor: Position,
    pub mode: Mode,
    /// `NORMAL`, `INSERT`, `VISUAL`...
    pub mode_label: &'static str,
    /// Keys of the unfinished command as typed, e.g. `"ad` or `di`.
    pub pending_label: Option<String>,
    /// The count typed so far; `2*3` when both the operator and the motion
    /// carry one.
    pub count_label: Option<String>,
    pub message: Option<String>,
    pub cursor_shape: CursorShape,
    pub visual: Option<VisualSpan>,
}

impl RenderSnapshot {
    /// True when `(line, col)` is inside the visual selection.
    #[must_use]
    pub fn is_selected(&self, line: usize, col: usize) -> bool {
        self.visual.is_some_and(|span| span.contains(line, col))
    }

    /// Screen column of the cursor: tabs advance to the next multiple of
    /// `tabstop`, wide chars take two cells.
    #[must_use]
    pub fn cursor_display_col(&self, tabstop: usize) -> usize {
        let tabstop = tabstop.max(1);
        let Some(line) = self.lines.get(self.cursor.line) else {
            return 0;
        };
        line.chars().take(self.cursor.col).fold(0, |col, ch| {
            if ch == '\t' {
                col + tabstop - col % tabstop
            } else {
                col + ch.width().unwrap_or(0)
            }
        })
    }
}

impl Editor {
    /// Copy out the current state for drawing.
    #[must_use]
    pub fn snapshot(&self) -> RenderSnapshot {
        let mode = self.mode();
        RenderSnapshot {
            lines: self.buffer.lines().collect(),
            cursor: self.cursor.position(),
            mode,
            mode_label: mode.display_name(),
            pending_label: self.pending_label(),
            count_label: self.count_label(),
            message: self.message.clone(),
            cursor_shape: mode.cursor_shape(),
            visual: self.visual_span(),
        }
    }

    fn pending_label(&self) -> Option<String> {
        let mut keys = String::new();
        if let Some(name) = self.register {
            keys.push('"');
            keys.push(name);
        }
        if let State::OperatorPending { op, .. } = self.state {
            keys.push(op.key());
        }
        if let Some(prefix) = self.prefix {
            keys.push_str(&prefix.keys());
        }
        (!keys.is_empty()).then_some(keys)
    }

    fn count_label(&self) -> Option<String> {
        let op_count = match self.state {
            State::OperatorPending { count, .. } => count,
            _ => None,
        };
        match (op_count, self.count) {
            (Some(a), Some(b)) => Some(format!("{a}*{b}")),
            (Some(n), None) | (None, Some(n)) => Some(n.to_string()),
            (None, None) => None,
        }
    }

    fn visual_span(&self) -> Option<VisualSpan> {
        let State::Visual { kind, anchor } = self.state else {
            return None;
        };
        let cursor = self.cursor.position();
        let (start, end) = if anchor <= cursor {
            (anchor, cursor)
        } else {
            (cursor, anchor)
        };
        Some(VisualSpan {
            start,
            end,
            linewise: kind == VisualKind::Line,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn p(line: usize, col: usize) -> Position {
        Position::new(line, col)
    }

    fn snapshot_after(text: &str, script: &str) -> RenderSnapshot {
        let mut ed = Editor::new(text);
        ed.feed_keys(script).unwrap();
        ed.snapshot()
    }

    #[test]
    fn normal_snapshot() {
        let snap = snapshot_after("one\ntwo", "j");
        assert_eq!(snap.lines, vec!["one".to_string(), "two".to_string()]);
        assert_eq!(snap.cursor, p(1, 0));
        assert_eq!(snap.mode_label, "NORMAL");
        assert_eq!(snap.cursor_shape, CursorShape::Block);
        assert_eq!(snap.pending_label, None);
        assert_eq!(snap.count_label, None);
        assert_eq!(snap.visual, None);
    }

    #[test]
    fn insert_snapshot_has_bar_cursor() {
        let snap = snapshot_after("abc", "A");
        assert_eq!(snap.mode_label, "INSERT");
        assert_eq!(snap.cursor_shape, CursorShape::Bar);
        assert_eq!(snap.cursor, p(0, 3));
    }

    #[test]
    fn pending_and_count_labels() {
        let snap = snapshot_after("abc", "\"a2d3");
        assert_eq!(snap.mode_label, "OPERATOR-PENDING");
        assert_eq!(snap.pending_label.as_deref(), Some("\"ad"));
        assert_eq!(snap.count_label.as_deref(), Some("2*3"));

        let snap = snapshot_after("abc", "di");
        assert_eq!(snap.pending_label.as_deref(), Some("di"));

        let snap = snapshot_after("abc", "5");
        assert_eq!(snap.count_label.as_deref(), Some("5"));
        assert_eq!(snap.pending_label, None);
    }

    #[test]
    fn message_is_copied() {
        let snap = snapshot_after("abc", "u");
        assert_eq!(snap.message.as_deref(), Some("Already at oldest change"));
    }

    #[test]
    fn char_selection_is_normalized() {
        let snap = snapshot_after("hello\nworld", "jllvkh");
        let span = snap.visual.unwrap();
        assert_eq!(span.start, p(0, 1));
        assert_eq!(span.end, p(1, 2));
        assert!(!snap.is_selected(0, 0));
        assert!(snap.is_selected(0, 4));
        assert!(snap.is_selected(1, 2));
        assert!(!snap.is_selected(1, 3));
    }

    #[test]
    fn line_selection_covers_whole_lines() {
        let snap = snapshot_after("a\nbbb\nc", "Vj");
        assert_eq!(snap.mode_label, "VISUAL LINE");
        assert!(snap.is_selected(1, 2));
        assert!(snap.is_selected(0, 50));
        assert!(!snap.is_selected(2, 0));
    }

    #[test]
    fn display_col_expands_tabs_and_wide_chars() {
        let snap = snapshot_after("\tab", "$");
        assert_eq!(snap.cursor_display_col(8), 9);
        assert_eq!(snap.cursor_display_col(4), 5);

        let snap = snapshot_after("日本x", "$");
        assert_eq!(snap.cursor_display_col(8), 4);

        let snap = snapshot_after("a\tb", "$");
        assert_eq!(snap.cursor_display_col(4), 4);
    }
}
