//! Text buffer: the challenge text as an ordered sequence of lines.
//!
//! A `Buffer` wraps a [`ropey::Rope`] and exposes a line-oriented API on top
//! of it. Every operation is total: out-of-range lines and columns are
//! clamped or ignored, never a panic and never an error.
//!
//! # Design choices
//!
//! - **ropey** gives O(log n) edits and line indexing, and its clones share
//!   structure, which keeps undo snapshots cheap to take.
//!
//! - **Only `\n` breaks lines.** The rope is built without ropey's Unicode
//!   line-break feature, so a `\r` is ordinary content and
//!   `Buffer::from_text(s).to_string() == s` for every input.
//!
//! - **At least one line.** An empty rope already reports one (empty) line,
//!   and the line-removal methods fall back to clearing the text instead of
//!   removing the last line.

use std::fmt;

use ropey::{Rope, RopeSlice};

use crate::position::Position;

// ---------------------------------------------------------------------------
// Buffer
// ---------------------------------------------------------------------------

/// A text buffer backed by a rope.
///
/// Columns are char offsets. `line_len` never counts the line's trailing
/// `\n`; positions may use `col == line_len` to address the slot after the
/// last character (insert-mode cursor, exclusive range ends).
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Buffer {
    rope: Rope,
}

impl Buffer {
    // -- Construction -------------------------------------------------------

    /// An empty buffer: one empty line.
    #[must_use]
    pub fn new() -> Self {
        Self { rope: Rope::new() }
    }

    #[must_use]
    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
        }
    }

    // -- Text access --------------------------------------------------------

    /// The underlying rope, for the char-index scans in `word` and
    /// `text_object`.
    #[inline]
    #[must_use]
    pub const fn rope(&self) -> &Rope {
        &self.rope
    }

    /// Number of lines. Never zero.
    #[inline]
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Index of the last line.
    #[inline]
    #[must_use]
    pub fn last_line(&self) -> usize {
        self.line_count() - 1
    }

    #[inline]
    #[must_use]
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    /// A line including its trailing `\n`, or `None` past the end.
    #[inline]
    #[must_use]
    pub fn line(&self, line: usize) -> Option<RopeSlice<'_>> {
        (line < self.line_count()).then(|| self.rope.line(line))
    }

    /// Char count of a line, excluding the line break. 0 for missing lines.
    #[must_use]
    pub fn line_len(&self, line: usize) -> usize {
        self.line(line).map_or(0, |slice| {
            let total = slice.len_chars();
            if total > 0 && slice.char(total - 1) == '\n' {
                total - 1
            } else {
                total
            }
        })
    }

    /// Last column a Normal-mode cursor may occupy: `line_len - 1`, or 0 on
    /// an empty line.
    #[inline]
    #[must_use]
    pub fn last_col(&self, line: usize) -> usize {
        self.line_len(line).saturating_sub(1)
    }

    /// A line's content as an owned string. Missing lines read as `""`.
    #[must_use]
    pub fn line_text(&self, line: usize) -> String {
        self.line(line).map_or_else(String::new, |slice| {
            let mut text = slice.to_string();
            if text.ends_with('\n') {
                text.pop();
            }
            text
        })
    }

    /// Every line's content, in order.
    pub fn lines(&self) -> impl Iterator<Item = String> + '_ {
        (0..self.line_count()).map(|line| self.line_text(line))
    }

    /// Column of the first non-blank char (`^`). On a blank line this is the
    /// last column, as in Vim.
    #[must_use]
    pub fn first_non_blank(&self, line: usize) -> usize {
        let leading = self.line(line).map_or(0, |slice| {
            slice
                .chars()
                .take_while(|ch| *ch != '\n' && ch.is_whitespace())
                .count()
        });
        leading.min(self.last_col(line))
    }

    /// The char at `pos`, or `None` when `pos` is past the line content.
    #[must_use]
    pub fn char_at(&self, pos: Position) -> Option<char> {
        if pos.col >= self.line_len(pos.line) {
            return None;
        }
        self.pos_to_char_idx(pos).map(|idx| self.rope.char(idx))
    }

    /// All text as a `String`.
    #[must_use]
    pub fn contents(&self) -> String {
        self.rope.to_string()
    }

    // -- Coordinate conversion ----------------------------------------------

    /// Absolute char index of `pos`.
    ///
    /// `None` when the line is missing or `col` exceeds the line's char count
    /// including its line break. `col == len` of the line is allowed.
    #[must_use]
    pub fn pos_to_char_idx(&self, pos: Position) -> Option<usize> {
        if pos.line >= self.line_count() {
            return None;
        }
        let line_start = self.rope.line_to_char(pos.line);
        if pos.col > self.rope.line(pos.line).len_chars() {
            return None;
        }
        Some(line_start + pos.col)
    }

    /// Position of an absolute char index. `len_chars()` maps to the slot
    /// after the last character.
    #[must_use]
    pub fn char_idx_to_pos(&self, char_idx: usize) -> Option<Position> {
        if char_idx > self.rope.len_chars() {
            return None;
        }
        let line = self.rope.char_to_line(char_idx);
        Some(Position::new(line, char_idx - self.rope.line_to_char(line)))
    }

    /// Clamp a position onto the buffer: line to the last line, column to
    /// `line_len` (the slot after the last char).
    #[must_use]
    pub fn clamp_position(&self, pos: Position) -> Position {
        let line = pos.line.min(self.last_line());
        Position::new(line, pos.col.min(self.line_len(line)))
    }

    fn clamped_idx(&self, pos: Position) -> usize {
        let pos = self.clamp_position(pos);
        self.rope.line_to_char(pos.line) + pos.col
    }

    // -- Line editing -------------------------------------------------------

    /// Replace a line's content. Missing lines are ignored.
    pub fn set_line(&mut self, line: usize, text: &str) {
        if line >= self.line_count() {
            return;
        }
        let start = self.rope.line_to_char(line);
        self.rope.remove(start..start + self.line_len(line));
        self.rope.insert(start, text);
    }

    /// Insert `text` as new line(s) before `line`. `line` is clamped to
    /// `line_count()`, which appends after the last line. A `text` holding
    /// `\n` inserts several lines.
    pub fn insert_line(&mut self, line: usize, text: &str) {
        let line = line.min(self.line_count());
        if line < self.line_count() {
            let at = self.rope.line_to_char(line);
            self.rope.insert(at, &format!("{text}\n"));
        } else {
            let at = self.rope.len_chars();
            self.rope.insert(at, &format!("\n{text}"));
        }
    }

    /// Remove one line and return its content. `line` is clamped to the last
    /// line; removing the only line leaves a single empty line.
    pub fn delete_line(&mut self, line: usize) -> String {
        let line = line.min(self.last_line());
        self.delete_lines(line, line)
    }

    /// Remove lines `first..=last` (clamped) and return their content joined
    /// with `\n`. The buffer keeps at least one line.
    pub fn delete_lines(&mut self, first: usize, last: usize) -> String {
        let last = last.min(self.last_line());
        let first = first.min(last);
        let text = self.lines_text(first, last);

        let start = self.rope.line_to_char(first);
        if last < self.last_line() {
            // Take the lines with their trailing breaks.
            let end = self.rope.line_to_char(last + 1);
            self.rope.remove(start..end);
        } else if first > 0 {
            // Through the end of the buffer: take the break before them.
            let end = self.rope.len_chars();
            self.rope.remove(start - 1..end);
        } else {
            self.rope = Rope::new();
        }
        text
    }

    /// Content of lines `first..=last` joined with `\n`, no trailing break.
    #[must_use]
    pub fn lines_text(&self, first: usize, last: usize) -> String {
        let last = last.min(self.last_line());
        let first = first.min(last);
        self.get_range(
            Position::new(first, 0),
            Position::new(last, self.line_len(last)),
        )
    }

    /// Break a line in two at `col` (clamped).
    pub fn split_line(&mut self, line: usize, col: usize) {
        if line >= self.line_count() {
            return;
        }
        let idx = self.clamped_idx(Position::new(line, col));
        self.rope.insert_char(idx, '\n');
    }

    /// Concatenate line `line + 1` onto `line` with no separator.
    pub fn join_lines(&mut self, line: usize) {
        if line + 1 >= self.line_count() {
            return;
        }
        let idx = self.rope.line_to_char(line) + self.line_len(line);
        self.rope.remove(idx..=idx);
    }

    // -- Char editing -------------------------------------------------------

    /// Insert text at `pos` (clamped).
    pub fn insert_at(&mut self, pos: Position, text: &str) {
        let idx = self.clamped_idx(pos);
        self.rope.insert(idx, text);
    }

    /// Insert one char at `pos` (clamped).
    pub fn insert_char(&mut self, pos: Position, ch: char) {
        let idx = self.clamped_idx(pos);
        self.rope.insert_char(idx, ch);
    }

    /// Delete up to `count` chars starting at `pos`, without crossing the
    /// line break. Returns what was removed.
    pub fn delete_at(&mut self, pos: Position, count: usize) -> String {
        let pos = self.clamp_position(pos);
        let end = pos.with_col((pos.col + count).min(self.line_len(pos.line)));
        self.delete_range(pos, end)
    }

    /// Text between two positions (any order, clamped). Line breaks inside
    /// the span come back as `\n`.
    #[must_use]
    pub fn get_range(&self, a: Position, b: Position) -> String {
        let (from, to) = self.span(a, b);
        self.rope.slice(from..to).to_string()
    }

    /// Remove the text between two positions (any order, clamped) and
    /// return it.
    pub fn delete_range(&mut self, a: Position, b: Position) -> String {
        let (from, to) = self.span(a, b);
        let removed = self.rope.slice(from..to).to_string();
        self.rope.remove(from..to);
        removed
    }

    fn span(&self, a: Position, b: Position) -> (usize, usize) {
        let a = self.clamped_idx(a);
        let b = self.clamped_idx(b);
        (a.min(b), a.max(b))
    }
}

impl fmt::Display for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for chunk in self.rope.chunks() {
            f.write_str(chunk)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Buffer")
            .field("lines", &self.line_count())
            .field("chars", &self.len_chars())
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn p(line: usize, col: usize) -> Position {
        Position::new(line, col)
    }

    // -- Construction & round trip ------------------------------------------

    #[test]
    fn empty_buffer_has_one_line() {
        let buf = Buffer::new();
        assert_eq!(buf.line_count(), 1);
        assert_eq!(buf.line_text(0), "");
        assert!(buf.is_empty());
    }

    #[test]
    fn round_trip_reconstructs_text() {
        for text in ["", "a", "hello\nworld", "a\n\nb\n", "tab\there", "crlf\r\nkept"] {
            assert_eq!(Buffer::from_text(text).to_string(), text);
        }
    }

    #[test]
    fn carriage_return_is_content() {
        let buf = Buffer::from_text("a\r\nb");
        assert_eq!(buf.line_count(), 2);
        assert_eq!(buf.line_len(0), 2);
    }

    // -- Reading ------------------------------------------------------------

    #[test]
    fn line_text_out_of_range_is_empty() {
        let buf = Buffer::from_text("one\ntwo");
        assert_eq!(buf.line_text(1), "two");
        assert_eq!(buf.line_text(7), "");
    }

    #[test]
    fn rune_counts_and_last_col() {
        let buf = Buffer::from_text("café\n\nxy");
        assert_eq!(buf.line_len(0), 4);
        assert_eq!(buf.last_col(0), 3);
        assert_eq!(buf.line_len(1), 0);
        assert_eq!(buf.last_col(1), 0);
        assert_eq!(buf.last_col(2), 1);
        assert_eq!(buf.line_len(9), 0);
    }

    #[test]
    fn first_non_blank() {
        let buf = Buffer::from_text("   indented\n\t x\n    \n");
        assert_eq!(buf.first_non_blank(0), 3);
        assert_eq!(buf.first_non_blank(1), 2);
        assert_eq!(buf.first_non_blank(2), 3);
        assert_eq!(buf.first_non_blank(3), 0);
    }

    #[test]
    fn char_at_stops_at_content() {
        let buf = Buffer::from_text("ab\ncd");
        assert_eq!(buf.char_at(p(0, 1)), Some('b'));
        assert_eq!(buf.char_at(p(0, 2)), None);
        assert_eq!(buf.char_at(p(1, 2)), None);
        assert_eq!(buf.char_at(p(4, 0)), None);
    }

    #[test]
    fn clamp_position() {
        let buf = Buffer::from_text("abc\nde");
        assert_eq!(buf.clamp_position(p(0, 10)), p(0, 3));
        assert_eq!(buf.clamp_position(p(5, 5)), p(1, 2));
    }

    // -- Line editing -------------------------------------------------------

    #[test]
    fn set_line_replaces_content() {
        let mut buf = Buffer::from_text("one\ntwo\nthree");
        buf.set_line(1, "TWO");
        assert_eq!(buf.to_string(), "one\nTWO\nthree");
        buf.set_line(9, "ignored");
        assert_eq!(buf.to_string(), "one\nTWO\nthree");
    }

    #[test]
    fn insert_line_clamps_and_appends() {
        let mut buf = Buffer::from_text("a\nb");
        buf.insert_line(1, "mid");
        assert_eq!(buf.to_string(), "a\nmid\nb");
        buf.insert_line(99, "end");
        assert_eq!(buf.to_string(), "a\nmid\nb\nend");
        buf.insert_line(0, "top");
        assert_eq!(buf.to_string(), "top\na\nmid\nb\nend");
    }

    #[test]
    fn delete_line_keeps_one_line() {
        let mut buf = Buffer::from_text("x\ny");
        assert_eq!(buf.delete_line(0), "x");
        assert_eq!(buf.delete_line(0), "y");
        assert_eq!(buf.line_count(), 1);
        assert_eq!(buf.delete_line(0), "");
        assert_eq!(buf.line_count(), 1);
        assert_eq!(buf.to_string(), "");
    }

    #[test]
    fn delete_last_line_takes_preceding_break() {
        let mut buf = Buffer::from_text("a\nb\nc");
        assert_eq!(buf.delete_line(2), "c");
        assert_eq!(buf.to_string(), "a\nb");
    }

    #[test]
    fn delete_line_clamps_index() {
        let mut buf = Buffer::from_text("a\nb");
        assert_eq!(buf.delete_line(40), "b");
        assert_eq!(buf.to_string(), "a");
    }

    #[test]
    fn delete_lines_joins_with_newline() {
        let mut buf = Buffer::from_text("1\n2\n3\n4");
        assert_eq!(buf.delete_lines(1, 2), "2\n3");
        assert_eq!(buf.to_string(), "1\n4");
    }

    #[test]
    fn repeated_deletion_never_empties_line_list() {
        let mut buf = Buffer::from_text("a\nb\nc\nd");
        for _ in 0..10 {
            buf.delete_line(0);
            assert!(buf.line_count() >= 1);
        }
    }

    #[test]
    fn split_and_join() {
        let mut buf = Buffer::from_text("helloworld");
        buf.split_line(0, 5);
        assert_eq!(buf.to_string(), "hello\nworld");
        buf.join_lines(0);
        assert_eq!(buf.to_string(), "helloworld");
        buf.split_line(0, 99);
        assert_eq!(buf.to_string(), "helloworld\n");
        buf.join_lines(1);
        assert_eq!(buf.to_string(), "helloworld\n");
    }

    // -- Char editing -------------------------------------------------------

    #[test]
    fn insert_at_clamps() {
        let mut buf = Buffer::from_text("ab");
        buf.insert_at(p(0, 1), "XY");
        assert_eq!(buf.to_string(), "aXYb");
        buf.insert_char(p(3, 40), '!');
        assert_eq!(buf.to_string(), "aXYb!");
    }

    #[test]
    fn delete_at_returns_removed_text() {
        let mut buf = Buffer::from_text("héllo\nnext");
        assert_eq!(buf.delete_at(p(0, 1), 2), "él");
        assert_eq!(buf.to_string(), "hlo\nnext");
        assert_eq!(buf.delete_at(p(0, 2), 10), "o");
        assert_eq!(buf.to_string(), "hl\nnext");
    }

    #[test]
    fn get_range_multi_line() {
        let buf = Buffer::from_text("first line\nmiddle\nlast line");
        assert_eq!(buf.get_range(p(0, 6), p(2, 4)), "line\nmiddle\nlast");
        assert_eq!(buf.get_range(p(2, 4), p(0, 6)), "line\nmiddle\nlast");
        assert_eq!(buf.get_range(p(1, 0), p(1, 3)), "mid");
    }

    #[test]
    fn delete_range_multi_line() {
        let mut buf = Buffer::from_text("first line\nmiddle\nlast line");
        assert_eq!(buf.delete_range(p(0, 6), p(2, 5)), "line\nmiddle\nlast ");
        assert_eq!(buf.to_string(), "first line");
    }

    #[test]
    fn clone_is_independent() {
        let buf = Buffer::from_text("keep");
        let mut copy = buf.clone();
        copy.insert_at(p(0, 0), "x");
        assert_eq!(buf.to_string(), "keep");
        assert_eq!(copy.to_string(), "xkeep");
        assert_ne!(buf, copy);
    }
}
