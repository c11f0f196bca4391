//! Positions and operator ranges.
//!
//! Coordinates are **0-indexed** `(line, col)` pairs and `col` counts chars
//! (Unicode scalar values), never bytes. A challenge buffer like `"café"` has
//! `'é'` at column 3 and column 4 is the insert-mode slot after it.
//!
//! A [`Range`] is what motions and text objects hand to operators. It is
//! either characterwise (half-open `[start, end)`) or linewise (whole lines
//! `start.line..=end.line`, columns ignored).

use std::fmt;

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// A location in a buffer: line and char column, both 0-indexed.
///
/// Ordered line first, then column, so `Pos(0:9) < Pos(1:0)`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Position {
    pub line: usize,
    pub col: usize,
}

impl Position {
    /// Line 0, column 0.
    pub const ZERO: Self = Self { line: 0, col: 0 };

    #[inline]
    #[must_use]
    pub const fn new(line: usize, col: usize) -> Self {
        Self { line, col }
    }

    /// Same line, different column.
    #[inline]
    #[must_use]
    pub const fn with_col(self, col: usize) -> Self {
        Self {
            line: self.line,
            col,
        }
    }
}

impl Ord for Position {
    #[inline]
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.line
            .cmp(&other.line)
            .then(self.col.cmp(&other.col))
    }
}

impl PartialOrd for Position {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pos({}:{})", self.line, self.col)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Status lines count from 1.
        write!(f, "{}:{}", self.line + 1, self.col + 1)
    }
}

// ---------------------------------------------------------------------------
// Range
// ---------------------------------------------------------------------------

/// The target of an operator.
///
/// Always normalized so that `start <= end`. For characterwise ranges `end`
/// is exclusive; for linewise ranges only the line numbers matter and both
/// are inclusive.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Range {
    pub start: Position,
    pub end: Position,
    pub linewise: bool,
}

impl Range {
    /// Characterwise range. Panics in debug if `start > end`.
    #[inline]
    #[must_use]
    pub const fn new(start: Position, end: Position) -> Self {
        debug_assert!(
            start.line < end.line || (start.line == end.line && start.col <= end.col),
            "Range::new requires start <= end"
        );
        Self {
            start,
            end,
            linewise: false,
        }
    }

    /// Characterwise range from two positions in either order.
    #[inline]
    #[must_use]
    pub fn ordered(a: Position, b: Position) -> Self {
        if a <= b {
            Self::new(a, b)
        } else {
            Self::new(b, a)
        }
    }

    /// Linewise range covering lines `a..=b` (in either order).
    #[inline]
    #[must_use]
    pub const fn lines(a: usize, b: usize) -> Self {
        let (first, last) = if a <= b { (a, b) } else { (b, a) };
        Self {
            start: Position::new(first, 0),
            end: Position::new(last, 0),
            linewise: true,
        }
    }

    /// Zero-width characterwise range at `pos`.
    #[inline]
    #[must_use]
    pub const fn point(pos: Position) -> Self {
        Self {
            start: pos,
            end: pos,
            linewise: false,
        }
    }

    /// True for a characterwise range that covers nothing. Linewise ranges
    /// always cover at least one line.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        !self.linewise && self.start.line == self.end.line && self.start.col == self.end.col
    }

    /// True when `pos` falls inside the range, respecting linewise semantics.
    #[must_use]
    pub fn contains(self, pos: Position) -> bool {
        if self.linewise {
            pos.line >= self.start.line && pos.line <= self.end.line
        } else {
            pos >= self.start && pos < self.end
        }
    }

    /// Number of lines touched. A single-line range returns 1.
    #[inline]
    #[must_use]
    pub const fn line_span(self) -> usize {
        self.end.line - self.start.line + 1
    }
}

impl fmt::Debug for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.linewise {
            write!(f, "Lines({}..={})", self.start.line, self.end.line)
        } else {
            write!(
                f,
                "Range({}:{} .. {}:{})",
                self.start.line, self.start.col, self.end.line, self.end.col
            )
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
