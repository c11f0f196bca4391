//! Word motions: `w b e` and their WORD forms `W B E`.
//!
//! A **word** is a run of word characters (letters, digits, `_`) or a run of
//! other non-blank characters, so `foo.bar` holds three words. A **WORD** is
//! any run of non-blanks: `foo.bar` is one WORD.
//!
//! An empty line counts as a word of its own: `w` and `b` stop on it, `e`
//! passes over it.
//!
//! Every function here takes one step. Counts are applied by the motion
//! engine, which loops.

use crate::buffer::Buffer;
use crate::position::Position;

// ---------------------------------------------------------------------------
// Character classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    /// Letters, digits, underscore.
    Word,
    /// Non-blank, non-word characters.
    Punctuation,
    /// Whitespace inside a line.
    Blank,
    /// The line break.
    Newline,
}

impl CharClass {
    /// True for the classes that make up words.
    #[inline]
    #[must_use]
    pub const fn is_word_like(self) -> bool {
        matches!(self, Self::Word | Self::Punctuation)
    }
}

/// Class of `ch` for `w b e`.
#[must_use]
pub fn classify(ch: char) -> CharClass {
    if ch == '\n' {
        CharClass::Newline
    } else if ch.is_whitespace() {
        CharClass::Blank
    } else if ch.is_alphanumeric() || ch == '_' {
        CharClass::Word
    } else {
        CharClass::Punctuation
    }
}

/// Class of `ch` for `W B E`: punctuation merges into `Word`.
#[must_use]
pub fn classify_big(ch: char) -> CharClass {
    match classify(ch) {
        CharClass::Punctuation => CharClass::Word,
        class => class,
    }
}

/// The classifier for a word (`false`) or WORD (`true`) motion.
#[inline]
#[must_use]
pub fn classifier(big: bool) -> fn(char) -> CharClass {
    if big { classify_big } else { classify }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// `w`
#[must_use]
pub fn word_forward(buf: &Buffer, pos: Position) -> Position {
    forward_start(buf, pos, classify)
}

/// `b`
#[must_use]
pub fn word_backward(buf: &Buffer, pos: Position) -> Position {
    backward_start(buf, pos, classify)
}

/// `e`
#[must_use]
pub fn word_end_forward(buf: &Buffer, pos: Position) -> Position {
    forward_end(buf, pos, classify)
}

/// `W`
#[must_use]
pub fn big_word_forward(buf: &Buffer, pos: Position) -> Position {
    forward_start(buf, pos, classify_big)
}

/// `B`
#[must_use]
pub fn big_word_backward(buf: &Buffer, pos: Position) -> Position {
    backward_start(buf, pos, classify_big)
}

/// `E`
#[must_use]
pub fn big_word_end_forward(buf: &Buffer, pos: Position) -> Position {
    forward_end(buf, pos, classify_big)
}

// ---------------------------------------------------------------------------
// Core algorithms
// ---------------------------------------------------------------------------

/// Start of the next word.
///
/// 1. Skip the current run.
/// 2. Skip blanks and line breaks, stopping on an empty line.
/// 3. Land on the first char of the next run.
///
/// With no next word the result is the end of the buffer (the slot after the
/// last char), which an operator treats as "to the end".
fn forward_start(buf: &Buffer, pos: Position, classify_fn: fn(char) -> CharClass) -> Position {
    let rope = buf.rope();
    let total = rope.len_chars();

    let Some(start_idx) = buf.pos_to_char_idx(pos) else {
        return pos;
    };
    if start_idx >= total {
        return pos;
    }

    let mut idx = start_idx;
    let start_class = classify_fn(rope.char(idx));

    if start_class.is_word_like() {
        while idx < total && classify_fn(rope.char(idx)) == start_class {
            idx += 1;
        }
    }

    while idx < total {
        match classify_fn(rope.char(idx)) {
            CharClass::Word | CharClass::Punctuation => break,
            CharClass::Blank => idx += 1,
            CharClass::Newline => {
                idx += 1;
                // Next line is empty: it is the next word.
                if idx < total && rope.char(idx) == '\n' {
                    break;
                }
            }
        }
    }

    buf.char_idx_to_pos(idx.min(total)).unwrap_or(pos)
}

/// Start of the previous word.
///
/// 1. Step back one char.
/// 2. Skip blanks and line breaks backward, stopping on an empty line.
/// 3. Walk back to the start of the run.
fn backward_start(buf: &Buffer, pos: Position, classify_fn: fn(char) -> CharClass) -> Position {
    let rope = buf.rope();

    let Some(start_idx) = buf.pos_to_char_idx(pos) else {
        return pos;
    };
    if start_idx == 0 {
        return pos;
    }

    let mut idx = start_idx - 1;

    loop {
        match classify_fn(rope.char(idx)) {
            CharClass::Word | CharClass::Punctuation => break,
            CharClass::Newline => {
                let line = rope.char_to_line(idx);
                if buf.line_len(line) == 0 {
                    return Position::new(line, 0);
                }
                if idx == 0 {
                    return Position::ZERO;
                }
                idx -= 1;
            }
            CharClass::Blank => {
                if idx == 0 {
                    return Position::ZERO;
                }
                idx -= 1;
            }
        }
    }

    let word_class = classify_fn(rope.char(idx));
    while idx > 0 && classify_fn(rope.char(idx - 1)) == word_class {
        idx -= 1;
    }

    buf.char_idx_to_pos(idx).unwrap_or(pos)
}

/// End of the current or next word.
///
/// 1. Advance one char, off the current word end.
/// 2. Skip blanks and line breaks (empty lines included).
/// 3. Advance to the last char of the run.
///
/// With no later word the position is unchanged.
fn forward_end(buf: &Buffer, pos: Position, classify_fn: fn(char) -> CharClass) -> Position {
    let rope = buf.rope();
    let total = rope.len_chars();

    let Some(start_idx) = buf.pos_to_char_idx(pos) else {
        return pos;
    };
    let last = total.saturating_sub(1);
    if total == 0 || start_idx >= last {
        return pos;
    }

    let mut idx = start_idx + 1;
    while idx < total && !classify_fn(rope.char(idx)).is_word_like() {
        idx += 1;
    }
    if idx >= total {
        return pos;
    }

    let word_class = classify_fn(rope.char(idx));
    while idx < last && classify_fn(rope.char(idx + 1)) == word_class {
        idx += 1;
    }

    buf.char_idx_to_pos(idx).unwrap_or(pos)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
