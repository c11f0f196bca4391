//! Motion engine: where a motion key takes the cursor.
//!
//! [`execute`] is pure: it reads the buffer and the cursor and returns a
//! target position, never mutating anything. `None` means the motion could
//! not resolve (a find with no match, `%` with no bracket, `k` on the first
//! line). The dispatcher applies the target to the cursor, or hands the
//! cursor..target span to an operator together with [`Motion::kind`].

use crate::buffer::Buffer;
use crate::cursor::{self, Cursor, max_col_for_line};
use crate::position::Position;
use crate::word;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// The four char-find motions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FindKind {
    /// `f`
    Forward,
    /// `F`
    Backward,
    /// `t`
    TillForward,
    /// `T`
    TillBackward,
}

impl FindKind {
    /// Map `f F t T` to a kind.
    #[must_use]
    pub const fn from_key(key: char) -> Option<Self> {
        match key {
            'f' => Some(Self::Forward),
            'F' => Some(Self::Backward),
            't' => Some(Self::TillForward),
            'T' => Some(Self::TillBackward),
            _ => None,
        }
    }

    /// Same find in the other direction, used by `,`.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Forward => Self::Backward,
            Self::Backward => Self::Forward,
            Self::TillForward => Self::TillBackward,
            Self::TillBackward => Self::TillForward,
        }
    }

    #[must_use]
    pub const fn key(self) -> char {
        match self {
            Self::Forward => 'f',
            Self::Backward => 'F',
            Self::TillForward => 't',
            Self::TillBackward => 'T',
        }
    }
}

/// How an operator treats the span a motion covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionKind {
    /// The raw target is already the end boundary: `w W e E`.
    Exclusive,
    /// Every other characterwise motion; the range is ordered and its end
    /// column bumped by one, whichever way the motion went.
    Inclusive,
    /// Whole lines (`j`, `k`, `gg`, `G`).
    Linewise,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    Left,
    Right,
    Up,
    Down,
    /// `0`
    LineStart,
    /// `$`
    LineEnd,
    /// `^`
    FirstNonBlank,
    WordForward,
    WordBackward,
    WordEnd,
    BigWordForward,
    BigWordBackward,
    BigWordEnd,
    /// `gg`; a count picks a 1-indexed line.
    FileStart,
    /// `G`; a count picks a 1-indexed line.
    FileEnd,
    /// `%`
    MatchBracket,
    Find { kind: FindKind, ch: char },
}

impl Motion {
    /// Motions bound to a single key. `0`, `g`, the find keys and `;` `,`
    /// need context and are resolved by the dispatcher.
    #[must_use]
    pub const fn from_key(key: char) -> Option<Self> {
        Some(match key {
            'h' => Self::Left,
            'l' | ' ' => Self::Right,
            'k' => Self::Up,
            'j' => Self::Down,
            '$' => Self::LineEnd,
            '^' => Self::FirstNonBlank,
            'w' => Self::WordForward,
            'b' => Self::WordBackward,
            'e' => Self::WordEnd,
            'W' => Self::BigWordForward,
            'B' => Self::BigWordBackward,
            'E' => Self::BigWordEnd,
            'G' => Self::FileEnd,
            '%' => Self::MatchBracket,
            _ => return None,
        })
    }

    #[must_use]
    pub const fn kind(self) -> MotionKind {
        match self {
            Self::Up | Self::Down | Self::FileStart | Self::FileEnd => MotionKind::Linewise,
            Self::WordForward | Self::BigWordForward | Self::WordEnd | Self::BigWordEnd => {
                MotionKind::Exclusive
            }
            Self::Left
            | Self::Right
            | Self::LineStart
            | Self::FirstNonBlank
            | Self::LineEnd
            | Self::WordBackward
            | Self::BigWordBackward
            | Self::MatchBracket
            | Self::Find { .. } => MotionKind::Inclusive,
        }
    }

    /// True for `j`/`k`, which keep the cursor's sticky column.
    #[must_use]
    pub const fn is_vertical(self) -> bool {
        matches!(self, Self::Up | Self::Down)
    }
}

// ---------------------------------------------------------------------------
// Execution
// ---------------------------------------------------------------------------

/// Resolve `motion` from the cursor. `count` is the typed count, if any
/// (`gg`/`G` treat an explicit count as a line number). The result is
/// clamped for the given cursor limit.
#[must_use]
pub fn execute(
    buf: &Buffer,
    cursor: &Cursor,
    motion: Motion,
    count: Option<usize>,
    past_end: bool,
) -> Option<Position> {
    let pos = cursor::clamp(cursor.position(), buf, past_end);
    let n = count.unwrap_or(1).max(1);
    let last_line = buf.last_line();

    let target = match motion {
        Motion::Left => {
            if pos.col == 0 {
                return None;
            }
            pos.with_col(pos.col.saturating_sub(n))
        }
        Motion::Right => {
            let max = max_col_for_line(buf, pos.line, past_end);
            if pos.col >= max {
                return None;
            }
            pos.with_col((pos.col + n).min(max))
        }
        Motion::Up => {
            if pos.line == 0 {
                return None;
            }
            vertical_target(buf, cursor, pos.line.saturating_sub(n), past_end)
        }
        Motion::Down => {
            if pos.line >= last_line {
                return None;
            }
            vertical_target(buf, cursor, (pos.line + n).min(last_line), past_end)
        }
        Motion::LineStart => pos.with_col(0),
        Motion::LineEnd => {
            let line = (pos.line + n - 1).min(last_line);
            Position::new(line, buf.last_col(line))
        }
        Motion::FirstNonBlank => pos.with_col(buf.first_non_blank(pos.line)),
        Motion::WordForward => repeat(n, pos, |p| word::word_forward(buf, p)),
        Motion::WordBackward => repeat(n, pos, |p| word::word_backward(buf, p)),
        Motion::WordEnd => repeat(n, pos, |p| word::word_end_forward(buf, p)),
        Motion::BigWordForward => repeat(n, pos, |p| word::big_word_forward(buf, p)),
        Motion::BigWordBackward => repeat(n, pos, |p| word::big_word_backward(buf, p)),
        Motion::BigWordEnd => repeat(n, pos, |p| word::big_word_end_forward(buf, p)),
        Motion::FileStart | Motion::FileEnd => {
            let line = count.map_or(
                if motion == Motion::FileStart { 0 } else { last_line },
                |c| c.saturating_sub(1).min(last_line),
            );
            Position::new(line, buf.first_non_blank(line))
        }
        Motion::MatchBracket => match_bracket(buf, pos)?,
        Motion::Find { kind, ch } => find(buf, pos, kind, ch, n)?,
    };

    Some(cursor::clamp(target, buf, past_end))
}

fn vertical_target(buf: &Buffer, cursor: &Cursor, line: usize, past_end: bool) -> Position {
    let max = max_col_for_line(buf, line, past_end);
    Position::new(line, cursor.sticky_col().min(max))
}

/// Apply a single-step motion `n` times, stopping early once it stalls.
fn repeat(n: usize, start: Position, step: impl Fn(Position) -> Position) -> Position {
    let mut pos = start;
    for _ in 0..n {
        let next = step(pos);
        if next == pos {
            break;
        }
        pos = next;
    }
    pos
}

// ---------------------------------------------------------------------------
// Char find
// ---------------------------------------------------------------------------

fn find(buf: &Buffer, pos: Position, kind: FindKind, ch: char, count: usize) -> Option<Position> {
    let col = match kind {
        FindKind::Forward => find_on_line_forward(buf, pos.line, pos.col, ch, count)?,
        FindKind::Backward => find_on_line_backward(buf, pos.line, pos.col, ch, count)?,
        FindKind::TillForward => {
            let target = find_on_line_forward(buf, pos.line, pos.col, ch, count)? - 1;
            // Adjacent match: nowhere to go.
            if target <= pos.col {
                return None;
            }
            target
        }
        FindKind::TillBackward => {
            let target = find_on_line_backward(buf, pos.line, pos.col, ch, count)? + 1;
            if target >= pos.col {
                return None;
            }
            target
        }
    };
    Some(pos.with_col(col))
}

/// Column of the `count`th `ch` after `from_col` on `line`.
#[must_use]
pub fn find_on_line_forward(
    buf: &Buffer,
    line: usize,
    from_col: usize,
    ch: char,
    count: usize,
) -> Option<usize> {
    let slice = buf.line(line)?;
    (from_col + 1..buf.line_len(line))
        .filter(|&i| slice.char(i) == ch)
        .nth(count.max(1) - 1)
}

/// Column of the `count`th `ch` before `from_col` on `line`.
#[must_use]
pub fn find_on_line_backward(
    buf: &Buffer,
    line: usize,
    from_col: usize,
    ch: char,
    count: usize,
) -> Option<usize> {
    let slice = buf.line(line)?;
    (0..from_col.min(buf.line_len(line)))
        .rev()
        .filter(|&i| slice.char(i) == ch)
        .nth(count.max(1) - 1)
}

// ---------------------------------------------------------------------------
// Bracket matching
// ---------------------------------------------------------------------------

const OPENERS: [char; 3] = ['(', '[', '{'];

/// `%`: the bracket balancing the one under the cursor. Off a bracket, the
/// nearest opener later on the line is used instead.
fn match_bracket(buf: &Buffer, pos: Position) -> Option<Position> {
    if let Some(found) = matching_bracket(buf, pos) {
        return Some(found);
    }
    let slice = buf.line(pos.line)?;
    let opener = (pos.col + 1..buf.line_len(pos.line)).find(|&i| OPENERS.contains(&slice.char(i)))?;
    matching_bracket(buf, pos.with_col(opener))
}

/// The partner of the bracket at `pos`, searching across lines with a depth
/// counter. `None` when `pos` is not on a bracket or it is unbalanced.
#[must_use]
pub fn matching_bracket(buf: &Buffer, pos: Position) -> Option<Position> {
    let ch = buf.char_at(pos)?;
    let (open, close, forward) = match ch {
        '(' => ('(', ')', true),
        '[' => ('[', ']', true),
        '{' => ('{', '}', true),
        ')' => ('(', ')', false),
        ']' => ('[', ']', false),
        '}' => ('{', '}', false),
        _ => return None,
    };

    let rope = buf.rope();
    let start = buf.pos_to_char_idx(pos)?;
    let mut depth = 0usize;

    let step = |i: usize, depth: &mut usize| -> bool {
        let c = rope.char(i);
        let (inward, outward) = if forward { (open, close) } else { (close, open) };
        if c == inward {
            *depth += 1;
        } else if c == outward {
            *depth -= 1;
        }
        *depth == 0
    };

    if forward {
        (start..rope.len_chars())
            .find(|&i| step(i, &mut depth))
            .and_then(|i| buf.char_idx_to_pos(i))
    } else {
        (0..=start)
            .rev()
            .find(|&i| step(i, &mut depth))
            .and_then(|i| buf.char_idx_to_pos(i))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
