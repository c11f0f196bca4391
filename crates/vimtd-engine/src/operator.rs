//! Operators: the commands that change or copy text.
//!
//! Vim's grammar is `[count] operator [count] (motion | text-object)`. The
//! dispatcher turns the second half into a [`Range`]; this module applies
//! an [`Operator`] to it, and also hosts the single-key commands built on
//! the same primitives (`x`, `dd`, `p`, `J`, `r`, `o`...).
//!
//! Every command that mutates the buffer pushes an undo snapshot first.
//! Deletes and yanks write the register chosen with `"x`, or the unnamed
//! register.

use tracing::debug;

use crate::editor::{Editor, State};
use crate::motion::{self, Motion, MotionKind};
use crate::position::{Position, Range};
use crate::register::RegisterKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// `d`
    Delete,
    /// `c`
    Change,
    /// `y`
    Yank,
}

impl Operator {
    #[must_use]
    pub const fn from_key(key: char) -> Option<Self> {
        match key {
            'd' => Some(Self::Delete),
            'c' => Some(Self::Change),
            'y' => Some(Self::Yank),
            _ => None,
        }
    }

    #[must_use]
    pub const fn key(self) -> char {
        match self {
            Self::Delete => 'd',
            Self::Change => 'c',
            Self::Yank => 'y',
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Delete => "delete",
            Self::Change => "change",
            Self::Yank => "yank",
        }
    }
}

// ---------------------------------------------------------------------------
// Motion ranges
// ---------------------------------------------------------------------------

impl Editor {
    /// The span `op` + `motion` covers from the cursor, or `None` when the
    /// motion does not resolve or covers nothing.
    ///
    /// The two ends are ordered first. `w W e E` then use the target as the
    /// end boundary; every other characterwise motion takes one column past
    /// it, backward motions included. Word motions resolve with the past-end
    /// limit so `dw` on the last word reaches the end of the line.
    pub(crate) fn operator_range(
        &self,
        op: Operator,
        motion: Motion,
        count: Option<usize>,
    ) -> Option<Range> {
        let start = self.cursor.position();
        let kind = motion.kind();
        let past_end = kind == MotionKind::Exclusive;
        let target = motion::execute(&self.buffer, &self.cursor, motion, count, past_end)?;
        debug!(op = op.label(), ?motion, ?kind, %target, "operator motion");

        let (from, to) = if start <= target {
            (start, target)
        } else {
            (target, start)
        };
        match kind {
            MotionKind::Linewise => Some(Range::lines(from.line, to.line)),
            MotionKind::Inclusive => Some(Range::new(from, to.with_col(to.col + 1))),
            MotionKind::Exclusive => (from != to).then(|| Range::new(from, to)),
        }
    }
}

// ---------------------------------------------------------------------------
// Applying operators
// ---------------------------------------------------------------------------

impl Editor {
    /// Apply `op` to `range`.
    pub fn execute_operator(&mut self, op: Operator, range: Range) {
        debug!(op = op.label(), ?range, "apply operator");
        match (op, range.linewise) {
            (Operator::Delete, true) => self.delete_whole_lines(range.start.line, range.end.line),
            (Operator::Delete, false) => self.delete_chars(range),
            (Operator::Change, true) => self.change_whole_lines(range.start.line, range.end.line),
            (Operator::Change, false) => self.change_chars(range),
            (Operator::Yank, _) => self.yank_range(range),
        }
    }

    fn write_register(&mut self, text: String, kind: RegisterKind) {
        self.registers.write(self.register, text, kind);
    }

    fn delete_chars(&mut self, range: Range) {
        let text = self.buffer.get_range(range.start, range.end);
        if text.is_empty() {
            return;
        }
        self.record_undo();
        self.buffer.delete_range(range.start, range.end);
        self.write_register(text, RegisterKind::Char);
        self.cursor.set_position(range.start, &self.buffer, false);
    }

    fn delete_whole_lines(&mut self, first: usize, last: usize) {
        self.record_undo();
        let text = self.buffer.delete_lines(first, last);
        self.history.discard_if_unchanged(&self.buffer);
        self.write_register(text, RegisterKind::Line);

        let line = first.min(self.buffer.last_line());
        let col = self.buffer.first_non_blank(line);
        self.cursor
            .set_position(Position::new(line, col), &self.buffer, false);
    }

    /// Delete the range and start an insert session in its place. The
    /// snapshot covers the deletion and everything typed after it.
    fn change_chars(&mut self, range: Range) {
        self.record_undo();
        let text = self.buffer.delete_range(range.start, range.end);
        if !text.is_empty() {
            self.write_register(text, RegisterKind::Char);
        }
        self.cursor.set_position(range.start, &self.buffer, true);
        self.state = State::Insert;
    }

    /// Replace lines `first..=last` by one empty line and insert there.
    fn change_whole_lines(&mut self, first: usize, last: usize) {
        let last = last.min(self.buffer.last_line());
        let first = first.min(last);
        self.record_undo();

        let text = self.buffer.lines_text(first, last);
        if last > first {
            self.buffer.delete_lines(first + 1, last);
        }
        self.buffer.set_line(first, "");
        self.write_register(text, RegisterKind::Line);

        self.cursor
            .set_position(Position::new(first, 0), &self.buffer, true);
        self.state = State::Insert;
    }

    /// Copy `range` into the register. Buffer and cursor stay as they are.
    fn yank_range(&mut self, range: Range) {
        if range.linewise {
            let last = range.end.line.min(self.buffer.last_line());
            let first = range.start.line.min(last);
            let text = self.buffer.lines_text(first, last);
            self.write_register(text, RegisterKind::Line);

            let lines = last - first + 1;
            self.message = Some(if lines == 1 {
                "1 line yanked".to_string()
            } else {
                format!("{lines} lines yanked")
            });
        } else {
            let text = self.buffer.get_range(range.start, range.end);
            let chars = text.chars().count();
            self.write_register(text, RegisterKind::Char);

            self.message = Some(if chars == 1 {
                "1 character yanked".to_string()
            } else {
                format!("{chars} characters yanked")
            });
        }
    }

    /// Linewise range of `count` lines from the cursor line.
    fn count_lines(&self, count: usize) -> Range {
        let first = self.cursor.line();
        let last = (first + count.max(1) - 1).min(self.buffer.last_line());
        Range::lines(first, last)
    }

    /// Characterwise range from the cursor to the end of the line `count - 1`
    /// lines below.
    fn to_line_end(&self, count: usize) -> Range {
        let start = self.cursor.position();
        let line = (start.line + count.max(1) - 1).min(self.buffer.last_line());
        let end = Position::new(line, self.buffer.line_len(line));
        Range::new(start.with_col(start.col.min(self.buffer.line_len(start.line))), end)
    }
}

// ---------------------------------------------------------------------------
// Single-key commands
// ---------------------------------------------------------------------------

impl Editor {
    /// `x`: delete `count` chars under and after the cursor.
    pub fn delete_char(&mut self, count: usize) {
        let pos = self.cursor.position();
        let len = self.buffer.line_len(pos.line);
        if pos.col >= len {
            return;
        }
        let end = pos.with_col((pos.col + count.max(1)).min(len));
        self.delete_chars(Range::new(pos, end));
        self.cursor.clamp(&self.buffer, false);
    }

    /// `X`: delete `count` chars before the cursor.
    pub fn delete_char_before(&mut self, count: usize) {
        let pos = self.cursor.position();
        if pos.col == 0 {
            return;
        }
        let start = pos.with_col(pos.col.saturating_sub(count.max(1)));
        self.delete_chars(Range::new(start, pos));
    }

    /// `dd`
    pub fn delete_line(&mut self, count: usize) {
        let range = self.count_lines(count);
        self.execute_operator(Operator::Delete, range);
    }

    /// `cc` / `S`
    pub fn change_line(&mut self, count: usize) {
        let range = self.count_lines(count);
        self.execute_operator(Operator::Change, range);
    }

    /// `yy` / `Y`
    pub fn yank_line(&mut self, count: usize) {
        let range = self.count_lines(count);
        self.execute_operator(Operator::Yank, range);
    }

    /// `s`: change `count` chars under the cursor.
    pub fn substitute(&mut self, count: usize) {
        let pos = self.cursor.position();
        let len = self.buffer.line_len(pos.line);
        let start = pos.with_col(pos.col.min(len));
        let end = start.with_col((start.col + count.max(1)).min(len));
        self.execute_operator(Operator::Change, Range::new(start, end));
    }

    /// `D`
    pub fn delete_to_end(&mut self, count: usize) {
        let range = self.to_line_end(count);
        self.execute_operator(Operator::Delete, range);
        self.cursor.clamp(&self.buffer, false);
    }

    /// `C`
    pub fn change_to_end(&mut self, count: usize) {
        let range = self.to_line_end(count);
        self.execute_operator(Operator::Change, range);
    }

    /// `p` (after) / `P` (before), `count` times.
    ///
    /// Register text that is linewise or holds a line break goes in as whole
    /// lines below/above the cursor line, cursor on the first non-blank of
    /// the first new line. Anything else is inserted inline: after `p` the
    /// cursor lands just past the inserted text (clamped to the line), after
    /// `P` on its last char.
    pub fn paste(&mut self, after: bool, count: usize) {
        let reg = self.registers.read(self.register);
        if reg.is_empty() {
            debug!(register = ?self.register, "paste from empty register");
            return;
        }
        let linewise = reg.pastes_linewise();
        let text = reg.content().to_string();
        let count = count.max(1);
        self.record_undo();

        let pos = self.cursor.position();
        if linewise {
            let text = text.strip_suffix('\n').unwrap_or(&text);
            let block = vec![text; count].join("\n");
            let line = if after { pos.line + 1 } else { pos.line };
            self.buffer.insert_line(line, &block);
            let col = self.buffer.first_non_blank(line);
            self.cursor
                .set_position(Position::new(line, col), &self.buffer, false);
        } else {
            let text = text.repeat(count);
            let col = if after && self.buffer.line_len(pos.line) > 0 {
                pos.col + 1
            } else {
                pos.col
            };
            let at = pos.with_col(col);
            self.buffer.insert_at(at, &text);
            let len = text.chars().count();
            let land = if after { col + len } else { col + len - 1 };
            self.cursor
                .set_position(at.with_col(land), &self.buffer, false);
        }
    }

    /// `J`: join the `count` lines below into the cursor line.
    ///
    /// Leading blanks of each joined line are dropped and one space separates
    /// the parts unless nothing is left to join in.
    pub fn join_lines(&mut self, count: usize) {
        let line = self.cursor.line();
        if line >= self.buffer.last_line() {
            return;
        }
        self.record_undo();

        let mut join_col = 0;
        for _ in 0..count.max(1) {
            if line >= self.buffer.last_line() {
                break;
            }
            let left = self.buffer.line_text(line);
            let right_raw = self.buffer.line_text(line + 1);
            let right = right_raw.trim_start_matches([' ', '\t']);

            let sep = if right.is_empty() { "" } else { " " };

            join_col = left.chars().count();
            self.buffer.set_line(line, &format!("{left}{sep}{right}"));
            self.buffer.delete_line(line + 1);
        }

        self.cursor
            .set_position(Position::new(line, join_col), &self.buffer, false);
    }

    /// `r`: replace `count` chars with `ch`. Does nothing when fewer than
    /// `count` chars remain on the line.
    pub fn replace_chars(&mut self, ch: char, count: usize) {
        let pos = self.cursor.position();
        let count = count.max(1);
        if pos.col + count > self.buffer.line_len(pos.line) {
            debug!(count, "replace past end of line");
            return;
        }
        self.record_undo();
        self.buffer.delete_at(pos, count);
        let replacement: String = std::iter::repeat_n(ch, count).collect();
        self.buffer.insert_at(pos, &replacement);
        self.cursor
            .set_position(pos.with_col(pos.col + count - 1), &self.buffer, false);
    }

    /// `o` (below) / `O` (above): open an empty line and insert there.
    pub fn open_line(&mut self, below: bool) {
        self.record_undo();
        let line = if below {
            self.cursor.line() + 1
        } else {
            self.cursor.line()
        };
        self.buffer.insert_line(line, "");
        self.cursor
            .set_position(Position::new(line, 0), &self.buffer, true);
        self.state = State::Insert;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
