//! Text objects: regions chosen by structure rather than by motion.
//!
//! Typed after an operator or in Visual mode as `i` (inner) or `a` (around)
//! plus an object key:
//!
//! | Keys                    | Object                             |
//! |-------------------------|------------------------------------|
//! | `w` / `W`               | word / WORD                        |
//! | `"` `'` `` ` ``         | quoted string on the cursor line   |
//! | `(` `)` `b`             | parenthesized block                |
//! | `[` `]`                 | square-bracketed block             |
//! | `{` `}` `B`             | braced block                       |
//! | `<` `>`                 | angle-bracketed block              |
//!
//! [`resolve`] returns a half-open characterwise [`Range`], or `None` when
//! there is no such object around the cursor.

use ropey::Rope;

use crate::buffer::Buffer;
use crate::position::{Position, Range};
use crate::word::{CharClass, classifier};

// ---------------------------------------------------------------------------
// Object kinds
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextObject {
    Word,
    BigWord,
    Quote(char),
    Bracket { open: char, close: char },
}

impl TextObject {
    /// The object selected by the key after `i`/`a`.
    #[must_use]
    pub const fn from_key(key: char) -> Option<Self> {
        Some(match key {
            'w' => Self::Word,
            'W' => Self::BigWord,
            '"' | '\'' | '`' => Self::Quote(key),
            '(' | ')' | 'b' => Self::Bracket {
                open: '(',
                close: ')',
            },
            '[' | ']' => Self::Bracket {
                open: '[',
                close: ']',
            },
            '{' | '}' | 'B' => Self::Bracket {
                open: '{',
                close: '}',
            },
            '<' | '>' => Self::Bracket {
                open: '<',
                close: '>',
            },
            _ => return None,
        })
    }
}

/// Find the range of `object` around `pos`.
#[must_use]
pub fn resolve(buf: &Buffer, pos: Position, object: TextObject, inner: bool) -> Option<Range> {
    match (object, inner) {
        (TextObject::Word, true) => inner_word(buf, pos, false),
        (TextObject::Word, false) => a_word(buf, pos, false),
        (TextObject::BigWord, true) => inner_word(buf, pos, true),
        (TextObject::BigWord, false) => a_word(buf, pos, true),
        (TextObject::Quote(quote), true) => inner_quote(buf, pos, quote),
        (TextObject::Quote(quote), false) => a_quote(buf, pos, quote),
        (TextObject::Bracket { open, close }, true) => inner_bracket(buf, pos, open, close),
        (TextObject::Bracket { open, close }, false) => a_bracket(buf, pos, open, close),
    }
}

/// Char index to position, mapping anything past the end to the slot after
/// the last char.
fn idx_to_pos(buf: &Buffer, idx: usize) -> Position {
    buf.char_idx_to_pos(idx.min(buf.len_chars()))
        .unwrap_or(Position::ZERO)
}

// ---------------------------------------------------------------------------
// Word objects
// ---------------------------------------------------------------------------

/// Char-index span of the run under `pos`: a word, a punctuation group or a
/// stretch of blanks. `None` on a line break or an empty line.
fn word_span(buf: &Buffer, pos: Position, big: bool) -> Option<(usize, usize)> {
    let classify = classifier(big);
    let rope = buf.rope();
    let total = rope.len_chars();
    let idx = buf.pos_to_char_idx(pos)?;
    if idx >= total {
        return None;
    }

    let class = classify(rope.char(idx));
    if class == CharClass::Newline {
        return None;
    }

    let mut start = idx;
    while start > 0 && classify(rope.char(start - 1)) == class {
        start -= 1;
    }
    let mut end = idx + 1;
    while end < total && classify(rope.char(end)) == class {
        end += 1;
    }
    Some((start, end))
}

/// `iw` / `iW`
fn inner_word(buf: &Buffer, pos: Position, big: bool) -> Option<Range> {
    let (start, end) = word_span(buf, pos, big)?;
    Some(Range::new(idx_to_pos(buf, start), idx_to_pos(buf, end)))
}

/// `aw` / `aW`: on a word, add the trailing blanks (or the leading ones when
/// nothing trails); on blanks, add the word that follows.
fn a_word(buf: &Buffer, pos: Position, big: bool) -> Option<Range> {
    let classify = classifier(big);
    let rope = buf.rope();
    let total = rope.len_chars();
    let (start, end) = word_span(buf, pos, big)?;
    let is_blank = |i: usize| classify(rope.char(i)) == CharClass::Blank;

    let (start, end) = if is_blank(start) {
        let mut new_end = end;
        if new_end < total {
            let next = classify(rope.char(new_end));
            if next.is_word_like() {
                while new_end < total && classify(rope.char(new_end)) == next {
                    new_end += 1;
                }
            }
        }
        (start, new_end)
    } else {
        let mut new_end = end;
        while new_end < total && is_blank(new_end) {
            new_end += 1;
        }
        if new_end > end {
            (start, new_end)
        } else {
            let mut new_start = start;
            while new_start > 0 && is_blank(new_start - 1) {
                new_start -= 1;
            }
            (new_start, end)
        }
    };

    Some(Range::new(idx_to_pos(buf, start), idx_to_pos(buf, end)))
}

// ---------------------------------------------------------------------------
// Quote objects
// ---------------------------------------------------------------------------

/// Columns of the quote pair for `pos`.
///
/// Quotes on the line pair up left to right (1st with 2nd, 3rd with 4th), so
/// a quote under the cursor closes a pair exactly when an odd number of
/// quotes precede it. The pair containing the cursor wins; failing that, the
/// next pair after it.
fn find_quote_pair(buf: &Buffer, pos: Position, quote: char) -> Option<(usize, usize)> {
    let quotes: Vec<usize> = buf
        .line_text(pos.line)
        .chars()
        .enumerate()
        .filter_map(|(i, ch)| (ch == quote).then_some(i))
        .collect();

    let pairs = || {
        quotes
            .chunks_exact(2)
            .map(|pair| (pair[0], pair[1]))
    };

    pairs()
        .find(|&(open, close)| (open..=close).contains(&pos.col))
        .or_else(|| pairs().find(|&(open, _)| open > pos.col))
}

/// `i"`: between the quotes. Empty quotes give an empty range.
fn inner_quote(buf: &Buffer, pos: Position, quote: char) -> Option<Range> {
    let (open, close) = find_quote_pair(buf, pos, quote)?;
    Some(Range::new(
        Position::new(pos.line, open + 1),
        Position::new(pos.line, close),
    ))
}

/// `a"`: the quotes included.
fn a_quote(buf: &Buffer, pos: Position, quote: char) -> Option<Range> {
    let (open, close) = find_quote_pair(buf, pos, quote)?;
    Some(Range::new(
        Position::new(pos.line, open),
        Position::new(pos.line, close + 1),
    ))
}

// ---------------------------------------------------------------------------
// Bracket objects
// ---------------------------------------------------------------------------

/// `i(` and friends: between the brackets. When the opener is the last char
/// on its line the range starts on the next line, so a multi-line block
/// keeps its opening line intact.
fn inner_bracket(buf: &Buffer, pos: Position, open: char, close: char) -> Option<Range> {
    let (open_idx, close_idx) = find_bracket_pair(buf, pos, open, close)?;
    let mut start = open_idx + 1;
    if start < close_idx && buf.rope().char(start) == '\n' {
        start += 1;
    }
    let start = idx_to_pos(buf, start.min(close_idx));
    Some(Range::new(start, idx_to_pos(buf, close_idx)))
}

/// `a(` and friends: the brackets included.
fn a_bracket(buf: &Buffer, pos: Position, open: char, close: char) -> Option<Range> {
    let (open_idx, close_idx) = find_bracket_pair(buf, pos, open, close)?;
    Some(Range::new(
        idx_to_pos(buf, open_idx),
        idx_to_pos(buf, close_idx + 1),
    ))
}

/// Char indices of the innermost `open`..`close` pair around `pos`, across
/// lines. A cursor on either bracket selects that bracket's pair.
fn find_bracket_pair(buf: &Buffer, pos: Position, open: char, close: char) -> Option<(usize, usize)> {
    let rope = buf.rope();
    let cursor_idx = buf.pos_to_char_idx(pos)?;
    if cursor_idx >= rope.len_chars() {
        return None;
    }

    let under = rope.char(cursor_idx);
    if under == open {
        return Some((cursor_idx, find_closing(rope, cursor_idx, open, close)?));
    }
    if under == close {
        return Some((find_opening(rope, cursor_idx, open, close)?, cursor_idx));
    }

    let open_idx = find_opening(rope, cursor_idx, open, close)?;
    let close_idx = find_closing(rope, open_idx, open, close)?;
    (cursor_idx < close_idx).then_some((open_idx, close_idx))
}

/// Nearest unmatched `open` before `start`.
fn find_opening(rope: &Rope, start: usize, open: char, close: char) -> Option<usize> {
    let mut depth = 0usize;
    for i in (0..start).rev() {
        let ch = rope.char(i);
        if ch == close {
            depth += 1;
        } else if ch == open {
            if depth == 0 {
                return Some(i);
            }
            depth -= 1;
        }
    }
    None
}

/// The `close` balancing the `open` at `start`.
fn find_closing(rope: &Rope, start: usize, open: char, close: char) -> Option<usize> {
    let mut depth = 0usize;
    for i in start + 1..rope.len_chars() {
        let ch = rope.char(i);
        if ch == open {
            depth += 1;
        } else if ch == close {
            if depth == 0 {
                return Some(i);
            }
            depth -= 1;
        }
    }
    None
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

    fn r(sl: usize, sc: usize, el: usize, ec: usize) -> Range {
        Range::new(p(sl, sc), p(el, ec))
    }

    fn obj(text: &str, at: Position, key: char, inner: bool) -> Option<Range> {
        let buf = Buffer::from_text(text);
        let object = TextObject::from_key(key)?;
        resolve(&buf, at, object, inner)
    }

    // -- Keys ---------------------------------------------------------------

    #[test]
    fn from_key_aliases() {
        let paren = TextObject::Bracket {
            open: '(',
            close: ')',
        };
        assert_eq!(TextObject::from_key('b'), Some(paren));
        assert_eq!(TextObject::from_key(')'), Some(paren));
        assert_eq!(
            TextObject::from_key('B'),
            Some(TextObject::Bracket {
                open: '{',
                close: '}'
            })
        );
        assert_eq!(TextObject::from_key('\''), Some(TextObject::Quote('\'')));
        assert_eq!(TextObject::from_key('z'), None);
    }

    // -- Words --------------------------------------------------------------

    #[test]
    fn iw_selects_run_under_cursor() {
        assert_eq!(obj("hello world", p(0, 2), 'w', true), Some(r(0, 0, 0, 5)));
        assert_eq!(obj("hello world", p(0, 6), 'w', true), Some(r(0, 6, 0, 11)));
        assert_eq!(obj("hello.world", p(0, 5), 'w', true), Some(r(0, 5, 0, 6)));
        assert_eq!(obj("foo_bar baz", p(0, 2), 'w', true), Some(r(0, 0, 0, 7)));
    }

    #[test]
    fn iw_on_blanks_selects_blanks() {
        assert_eq!(obj("hello   world", p(0, 6), 'w', true), Some(r(0, 5, 0, 8)));
    }

    #[test]
    fn iw_fails_on_empty_line() {
        assert_eq!(obj("hello\n\nworld", p(1, 0), 'w', true), None);
        assert_eq!(obj("", p(0, 0), 'w', true), None);
    }

    #[test]
    fn aw_trailing_then_leading_whitespace() {
        assert_eq!(obj("hello world", p(0, 2), 'w', false), Some(r(0, 0, 0, 6)));
        assert_eq!(obj("hello world", p(0, 7), 'w', false), Some(r(0, 5, 0, 11)));
        assert_eq!(obj("hello", p(0, 2), 'w', false), Some(r(0, 0, 0, 5)));
    }

    #[test]
    fn aw_stops_at_line_end() {
        assert_eq!(obj("one two\nthree", p(0, 5), 'w', false), Some(r(0, 3, 0, 7)));
    }

    #[test]
    fn aw_on_blanks_takes_next_word() {
        assert_eq!(obj("hello   world", p(0, 6), 'w', false), Some(r(0, 5, 0, 13)));
    }

    #[test]
    fn big_word_objects() {
        assert_eq!(obj("x=y+z next", p(0, 2), 'W', true), Some(r(0, 0, 0, 5)));
        assert_eq!(obj("hello.world next", p(0, 3), 'W', false), Some(r(0, 0, 0, 12)));
    }

    // -- Quotes -------------------------------------------------------------

    #[test]
    fn quote_inside_and_on_delimiters() {
        let text = "say \"hello\" now";
        assert_eq!(obj(text, p(0, 6), '"', true), Some(r(0, 5, 0, 10)));
        assert_eq!(obj(text, p(0, 4), '"', true), Some(r(0, 5, 0, 10)));
        assert_eq!(obj(text, p(0, 10), '"', true), Some(r(0, 5, 0, 10)));
        assert_eq!(obj(text, p(0, 6), '"', false), Some(r(0, 4, 0, 11)));
    }

    #[test]
    fn quote_searches_forward_from_before() {
        assert_eq!(obj("say \"hello world\"", p(0, 0), '"', true), Some(r(0, 5, 0, 16)));
    }

    #[test]
    fn quote_pairs_by_parity() {
        // Cursor between two pairs sits on the closer of the first.
        let text = "'a' + 'b'";
        assert_eq!(obj(text, p(0, 2), '\'', true), Some(r(0, 1, 0, 2)));
        assert_eq!(obj(text, p(0, 6), '\'', true), Some(r(0, 7, 0, 8)));
        assert_eq!(obj(text, p(0, 4), '\'', true), Some(r(0, 7, 0, 8)));
    }

    #[test]
    fn quote_empty_and_missing() {
        assert_eq!(obj("x = \"\"", p(0, 4), '"', true), Some(r(0, 5, 0, 5)));
        assert_eq!(obj("no quotes", p(0, 0), '"', true), None);
        assert_eq!(obj("lone \" quote", p(0, 0), '"', true), None);
        assert_eq!(obj("\"a\"\nb", p(1, 0), '"', true), None);
    }

    // -- Brackets -----------------------------------------------------------

    #[test]
    fn paren_inner_and_around() {
        let text = "call(a, b)";
        assert_eq!(obj(text, p(0, 6), '(', true), Some(r(0, 5, 0, 9)));
        assert_eq!(obj(text, p(0, 6), 'b', false), Some(r(0, 4, 0, 10)));
        assert_eq!(obj(text, p(0, 4), ')', true), Some(r(0, 5, 0, 9)));
        assert_eq!(obj(text, p(0, 9), '(', true), Some(r(0, 5, 0, 9)));
    }

    #[test]
    fn nested_brackets_choose_innermost() {
        let text = "f(g(x), y)";
        assert_eq!(obj(text, p(0, 4), '(', true), Some(r(0, 4, 0, 5)));
        assert_eq!(obj(text, p(0, 8), '(', true), Some(r(0, 2, 0, 9)));
    }

    #[test]
    fn multi_line_block_starts_after_opening_line() {
        let text = "fn main() {\n    body();\n}";
        assert_eq!(obj(text, p(1, 4), '{', true), Some(r(1, 0, 2, 0)));
        assert_eq!(obj(text, p(1, 4), 'B', false), Some(r(0, 10, 2, 1)));
    }

    #[test]
    fn empty_brackets_give_empty_range() {
        assert_eq!(obj("f()", p(0, 1), '(', true), Some(r(0, 2, 0, 2)));
    }

    #[test]
    fn brackets_missing() {
        assert_eq!(obj("plain", p(0, 2), '(', true), None);
        assert_eq!(obj("(open", p(0, 2), '(', true), None);
        assert_eq!(obj("a) b", p(0, 3), '(', true), None);
    }

    #[test]
    fn angle_and_square() {
        assert_eq!(obj("Vec<u8>", p(0, 5), '<', true), Some(r(0, 4, 0, 6)));
        assert_eq!(obj("xs[10]", p(0, 3), ']', false), Some(r(0, 2, 0, 6)));
    }
}
