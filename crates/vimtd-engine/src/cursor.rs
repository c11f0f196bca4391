//! Cursor: a position plus the sticky column used by vertical motions.
//!
//! The cursor does not know which mode the editor is in. Every method that
//! clamps takes `past_end: bool` instead:
//!
//! - `false` (Normal, Visual, Operator-Pending): the cursor sits ON a
//!   character, so the last valid column is `line_len - 1` (0 on an empty
//!   line).
//! - `true` (Insert): the cursor may sit in the slot after the last char.
//!
//! # Sticky column
//!
//! `j`/`k` remember the column they started from. Passing through a short
//! line clamps the visible column but a later long line snaps back to the
//! remembered one. Any horizontal placement resets it.

use crate::buffer::Buffer;
use crate::position::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    pos: Position,
    sticky_col: usize,
}

impl Cursor {
    /// A cursor at the origin.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pos: Position::ZERO,
            sticky_col: 0,
        }
    }

    /// A cursor at `pos`, unclamped, remembering `pos.col`.
    #[must_use]
    pub const fn at(pos: Position) -> Self {
        Self {
            pos,
            sticky_col: pos.col,
        }
    }

    // -- Accessors ----------------------------------------------------------

    #[inline]
    #[must_use]
    pub const fn position(&self) -> Position {
        self.pos
    }

    #[inline]
    #[must_use]
    pub const fn line(&self) -> usize {
        self.pos.line
    }

    #[inline]
    #[must_use]
    pub const fn col(&self) -> usize {
        self.pos.col
    }

    /// Desired column for vertical movement.
    #[inline]
    #[must_use]
    pub const fn sticky_col(&self) -> usize {
        self.sticky_col
    }

    // -- Placement ----------------------------------------------------------

    /// Move to `pos`, clamped, and reset the sticky column.
    pub fn set_position(&mut self, pos: Position, buf: &Buffer, past_end: bool) {
        self.pos = clamp(pos, buf, past_end);
        self.sticky_col = self.pos.col;
    }

    /// Move to `pos`, clamped, keeping the sticky column. Used for results
    /// of `j`/`k`, whose column already came from the sticky column.
    pub fn move_vertical(&mut self, pos: Position, buf: &Buffer, past_end: bool) {
        self.pos = clamp(pos, buf, past_end);
    }

    /// Re-establish the bounds invariant after the buffer changed or the
    /// mode switched. The sticky column follows the clamped column only when
    /// clamping actually moved the cursor.
    pub fn clamp(&mut self, buf: &Buffer, past_end: bool) {
        let clamped = clamp(self.pos, buf, past_end);
        if clamped != self.pos {
            self.pos = clamped;
            self.sticky_col = clamped.col;
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Maximum valid column on `line`.
///
/// - `past_end = false`: `line_len - 1`, or 0 for an empty line.
/// - `past_end = true`: `line_len`.
#[must_use]
pub fn max_col_for_line(buf: &Buffer, line: usize, past_end: bool) -> usize {
    if past_end {
        buf.line_len(line)
    } else {
        buf.last_col(line)
    }
}

/// Clamp a position into the buffer for the given cursor limit.
#[must_use]
pub fn clamp(pos: Position, buf: &Buffer, past_end: bool) -> Position {
    let line = pos.line.min(buf.last_line());
    Position::new(line, pos.col.min(max_col_for_line(buf, line, past_end)))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn p(line: usize, col: usize) -> Position {
        Position::new(line, col)
    }

    // "hello" / "world" / "hi" / "" / "end"
    fn sample_buffer() -> Buffer {
        Buffer::from_text("hello\nworld\nhi\n\nend")
    }

    #[test]
    fn new_and_at() {
        assert_eq!(Cursor::new().position(), Position::ZERO);
        assert_eq!(Cursor::default(), Cursor::new());
        let c = Cursor::at(p(2, 3));
        assert_eq!((c.line(), c.col(), c.sticky_col()), (2, 3, 3));
    }

    #[test]
    fn set_position_clamps_normal() {
        let buf = sample_buffer();
        let mut c = Cursor::new();
        c.set_position(p(0, 99), &buf, false);
        assert_eq!(c.position(), p(0, 4));
        assert_eq!(c.sticky_col(), 4);
    }

    #[test]
    fn set_position_clamps_insert() {
        let buf = sample_buffer();
        let mut c = Cursor::new();
        c.set_position(p(0, 99), &buf, true);
        assert_eq!(c.position(), p(0, 5));
    }

    #[test]
    fn set_position_clamps_line() {
        let buf = sample_buffer();
        let mut c = Cursor::new();
        c.set_position(p(40, 1), &buf, false);
        assert_eq!(c.position(), p(4, 1));
    }

    #[test]
    fn move_vertical_keeps_sticky() {
        let buf = sample_buffer();
        let mut c = Cursor::new();
        c.set_position(p(0, 4), &buf, false);
        c.move_vertical(p(2, 4), &buf, false);
        assert_eq!(c.position(), p(2, 1));
        assert_eq!(c.sticky_col(), 4);
        c.move_vertical(p(3, 4), &buf, false);
        assert_eq!(c.position(), p(3, 0));
        assert_eq!(c.sticky_col(), 4);
    }

    #[test]
    fn clamp_after_deletion() {
        let mut buf = sample_buffer();
        let mut c = Cursor::at(p(4, 2));
        buf.delete_lines(2, 4);
        c.clamp(&buf, false);
        assert_eq!(c.position(), p(1, 2));
        assert_eq!(c.sticky_col(), 2);
    }

    #[test]
    fn clamp_leaving_insert_pulls_back() {
        let buf = sample_buffer();
        let mut c = Cursor::new();
        c.set_position(p(1, 5), &buf, true);
        c.clamp(&buf, false);
        assert_eq!(c.position(), p(1, 4));
    }

    #[test]
    fn clamp_in_bounds_keeps_sticky() {
        let buf = sample_buffer();
        let mut c = Cursor::at(p(0, 2));
        c.move_vertical(p(2, 2), &buf, false);
        c.clamp(&buf, false);
        assert_eq!(c.position(), p(2, 1));
        assert_eq!(c.sticky_col(), 2);
    }

    #[test]
    fn max_col_per_limit() {
        let buf = sample_buffer();
        assert_eq!(max_col_for_line(&buf, 0, false), 4);
        assert_eq!(max_col_for_line(&buf, 0, true), 5);
        assert_eq!(max_col_for_line(&buf, 3, false), 0);
        assert_eq!(max_col_for_line(&buf, 3, true), 0);
    }

    #[test]
    fn empty_buffer_clamps_to_origin() {
        let buf = Buffer::new();
        assert_eq!(clamp(p(3, 3), &buf, false), Position::ZERO);
        assert_eq!(clamp(p(3, 3), &buf, true), Position::ZERO);
    }
}
