//! The editor session and its key dispatcher.
//!
//! One [`Editor`] owns a buffer and everything needed to edit it: cursor,
//! mode state, count, registers and history. A host feeds it keys one at a
//! time and reads back a [`RenderSnapshot`](crate::render::RenderSnapshot)
//! or the final text.
//!
//! ```text
//! key ─► handle_key ─┬─ Insert ─────────────► insert / delete / split
//!                    └─ Normal │ Visual │ Op-pending
//!                          abort? prefix? count digit?
//!                          motion ─► move cursor, or range ─► operator
//!                          command ─► operator.rs single-key commands
//! ```
//!
//! State is two orthogonal parts: [`State`] (mode, plus the visual anchor or
//! the pending operator) and an optional [`Prefix`] for keys that need one
//! more key (`g`, `f`, `i`/`a` before an object, `r`, `"`). Every branch that
//! finishes a command goes through [`Editor::reset_pending`].
//!
//! Key handling never fails: input that means nothing in the current state
//! is logged at `warn` and dropped.

use tracing::{debug, trace, warn};

use crate::buffer::Buffer;
use crate::cursor::Cursor;
use crate::history::{History, Snapshot};
use crate::key::{KeyCode, KeyEvent, KeyParseError, parse_keys};
use crate::mode::{Mode, VisualKind};
use crate::motion::{self, FindKind, Motion};
use crate::operator::Operator;
use crate::options::{OptionError, Options};
use crate::position::{Position, Range};
use crate::register::RegisterFile;
use crate::text_object::{self, TextObject};

/// Mode plus the data that only exists in that mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum State {
    Normal,
    Insert,
    Visual { kind: VisualKind, anchor: Position },
    /// `count` is the count typed before the operator.
    OperatorPending { op: Operator, count: Option<usize> },
}

/// A key that must be followed by one more key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Prefix {
    /// `g`, waiting for the second `g`.
    G,
    /// `f F t T`, waiting for the target char.
    Find(FindKind),
    /// `i` / `a` after an operator or in Visual, waiting for the object key.
    TextObject { inner: bool },
    /// `r`, waiting for the replacement char.
    ReplaceChar,
    /// `"`, waiting for the register name.
    Register,
}

impl Prefix {
    pub(crate) fn keys(self) -> String {
        match self {
            Self::G => "g".to_string(),
            Self::Find(kind) => kind.key().to_string(),
            Self::TextObject { inner: true } => "i".to_string(),
            Self::TextObject { inner: false } => "a".to_string(),
            Self::ReplaceChar => "r".to_string(),
            Self::Register => "\"".to_string(),
        }
    }
}

pub struct Editor {
    pub(crate) buffer: Buffer,
    pub(crate) cursor: Cursor,
    pub(crate) state: State,
    pub(crate) prefix: Option<Prefix>,
    /// Count being typed. Unset means 1.
    pub(crate) count: Option<usize>,
    /// Register picked with `"x` for the next command.
    pub(crate) register: Option<char>,
    /// Last `f F t T` target, for `;` and `,`.
    pub(crate) last_find: Option<(FindKind, char)>,
    pub(crate) registers: RegisterFile,
    pub(crate) history: History,
    /// Status line text. Cleared by the next key.
    pub(crate) message: Option<String>,
    pub(crate) options: Options,
    keystrokes: usize,
}

impl Editor {
    /// An editor over `text` with default options.
    #[must_use]
    pub fn new(text: &str) -> Self {
        Self::with_options(text, Options::default())
    }

    #[must_use]
    pub fn with_options(text: &str, options: Options) -> Self {
        Self {
            buffer: Buffer::from_text(text),
            cursor: Cursor::new(),
            state: State::Normal,
            prefix: None,
            count: None,
            register: None,
            last_find: None,
            registers: RegisterFile::new(),
            history: History::new(options.undolevels),
            message: None,
            options,
            keystrokes: 0,
        }
    }

    // -- Accessors ----------------------------------------------------------

    #[must_use]
    pub const fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    /// Whole buffer text.
    #[must_use]
    pub fn text(&self) -> String {
        self.buffer.contents()
    }

    #[must_use]
    pub const fn cursor(&self) -> Position {
        self.cursor.position()
    }

    #[must_use]
    pub const fn mode(&self) -> Mode {
        match self.state {
            State::Normal => Mode::Normal,
            State::Insert => Mode::Insert,
            State::Visual { kind, .. } => Mode::Visual(kind),
            State::OperatorPending { op, .. } => Mode::OperatorPending(op),
        }
    }

    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Keys handled so far, including ones that did nothing.
    #[must_use]
    pub const fn keystrokes(&self) -> usize {
        self.keystrokes
    }

    #[must_use]
    pub const fn options(&self) -> &Options {
        &self.options
    }

    #[must_use]
    pub const fn registers(&self) -> &RegisterFile {
        &self.registers
    }

    #[must_use]
    pub const fn history(&self) -> &History {
        &self.history
    }

    /// The operator waiting for its motion, if any.
    #[must_use]
    pub const fn pending_operator(&self) -> Option<Operator> {
        match self.state {
            State::OperatorPending { op, .. } => Some(op),
            _ => None,
        }
    }

    /// The range a visual operator would act on right now.
    #[must_use]
    pub fn selection(&self) -> Option<Range> {
        let State::Visual { kind, anchor } = self.state else {
            return None;
        };
        let cursor = self.cursor.position();
        match kind {
            VisualKind::Line => Some(Range::lines(anchor.line, cursor.line)),
            VisualKind::Char => {
                let range = Range::ordered(anchor, cursor);
                let end = range.end;
                // On an empty line the selection covers its line break.
                let end = if end.col >= self.buffer.line_len(end.line)
                    && end.line < self.buffer.last_line()
                {
                    Position::new(end.line + 1, 0)
                } else {
                    end.with_col(end.col + 1)
                };
                Some(Range::new(range.start, end))
            }
        }
    }

    /// True while a command is incomplete: an operator waits for its
    /// motion, a prefix for its key, or a count or register for a command.
    #[must_use]
    pub const fn awaiting_input(&self) -> bool {
        self.prefix.is_some()
            || self.count.is_some()
            || self.register.is_some()
            || matches!(self.state, State::OperatorPending { .. })
    }

    /// Apply `:set` arguments. The undo depth follows `undolevels`.
    pub fn set_options(&mut self, args: &str) -> Result<(), OptionError> {
        let result = self.options.apply(args);
        self.history.set_limit(self.options.undolevels);
        result
    }

    // -- Input --------------------------------------------------------------

    /// Handle one key. Returns whether the command needs more input.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        self.keystrokes += 1;
        self.message = None;
        trace!(%key, mode = %self.mode(), "key");

        if self.state == State::Insert {
            self.handle_insert(key);
        } else {
            self.handle_command(key);
        }
        self.awaiting_input()
    }

    /// Parse one key token (`"w"`, `"Escape"`, `"ctrl+r"`) and handle it.
    pub fn feed_token(&mut self, token: &str) -> Result<bool, KeyParseError> {
        let key: KeyEvent = token.parse()?;
        Ok(self.handle_key(key))
    }

    /// Handle every key of a script in Vim notation (`"dwihi<Esc>"`). The
    /// script is parsed up front, so a bad script changes nothing.
    pub fn feed_keys(&mut self, script: &str) -> Result<bool, KeyParseError> {
        for key in parse_keys(script)? {
            self.handle_key(key);
        }
        Ok(self.awaiting_input())
    }

    // -- Shared plumbing ----------------------------------------------------

    /// Clear the operator, prefix, count and register of a finished or
    /// abandoned command. Visual and Insert state survive.
    pub(crate) fn reset_pending(&mut self) {
        if matches!(self.state, State::OperatorPending { .. }) {
            self.state = State::Normal;
        }
        self.prefix = None;
        self.count = None;
        self.register = None;
    }

    /// Push the current state as an undo step.
    pub(crate) fn record_undo(&mut self) {
        self.history.record(self.undo_state());
    }

    fn undo_state(&self) -> Snapshot {
        Snapshot::new(&self.buffer, self.cursor.position())
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.buffer = snapshot.buffer;
        self.cursor
            .set_position(snapshot.cursor, &self.buffer, false);
    }

    fn push_count_digit(&mut self, digit: usize) {
        let current = self.count.unwrap_or(0);
        self.count = Some(current.saturating_mul(10).saturating_add(digit));
    }

    /// Take the count for a motion. After an operator it multiplies the
    /// operator's own count.
    fn motion_count(&mut self) -> Option<usize> {
        let typed = self.count.take();
        match self.state {
            State::OperatorPending { count, .. } => merge_counts(count, typed),
            _ => typed,
        }
    }

    fn take_count(&mut self) -> usize {
        self.count.take().unwrap_or(1)
    }

    // -- Command states -----------------------------------------------------

    fn handle_command(&mut self, key: KeyEvent) {
        if key.is_abort() {
            if matches!(self.state, State::Visual { .. }) {
                self.state = State::Normal;
            }
            self.reset_pending();
            return;
        }

        if let Some(prefix) = self.prefix.take() {
            self.handle_prefix(prefix, key);
            return;
        }

        if key.is_ctrl('r') {
            if self.state == State::Normal {
                let count = self.take_count();
                self.redo(count);
            }
            self.reset_pending();
            return;
        }

        let Some(ch) = command_char(key) else {
            warn!(%key, mode = %self.mode(), "ignored key");
            self.reset_pending();
            return;
        };

        if ch.is_ascii_digit() && (ch != '0' || self.count.is_some()) {
            self.push_count_digit(digit_value(ch));
            return;
        }

        match self.state {
            State::Normal => self.normal_command(ch),
            State::Visual { kind, anchor } => self.visual_command(ch, kind, anchor),
            State::OperatorPending { op, count } => self.pending_command(ch, op, count),
            State::Insert => {}
        }
    }

    /// Keys that mean the same in Normal, Visual and Operator-Pending:
    /// motions, `g`, the find keys and `;` `,`. Returns false when `ch` is
    /// not one of them.
    fn motion_command(&mut self, ch: char) -> bool {
        let motion = if ch == '0' {
            Some(Motion::LineStart)
        } else {
            Motion::from_key(ch)
        };
        if let Some(motion) = motion {
            let count = self.motion_count();
            self.run_motion(motion, count);
            return true;
        }

        match ch {
            'g' => self.prefix = Some(Prefix::G),
            ';' | ',' => self.repeat_find(ch == ','),
            _ => match FindKind::from_key(ch) {
                Some(kind) => self.prefix = Some(Prefix::Find(kind)),
                None => return false,
            },
        }
        true
    }

    /// Move the cursor, or hand the span to the pending operator.
    fn run_motion(&mut self, motion: Motion, count: Option<usize>) {
        if let State::OperatorPending { op, .. } = self.state {
            self.state = State::Normal;
            match self.operator_range(op, motion, count) {
                Some(range) => self.execute_operator(op, range),
                None => debug!(?motion, op = op.label(), "motion did not resolve"),
            }
        } else if let Some(target) =
            motion::execute(&self.buffer, &self.cursor, motion, count, false)
        {
            if motion.is_vertical() {
                self.cursor.move_vertical(target, &self.buffer, false);
            } else {
                self.cursor.set_position(target, &self.buffer, false);
            }
        } else {
            debug!(?motion, "motion did not resolve");
        }
        self.reset_pending();
    }

    /// `;` / `,`. A repeated till that is already next to its char skips
    /// ahead to the following match.
    fn repeat_find(&mut self, reverse: bool) {
        let Some((kind, ch)) = self.last_find else {
            debug!("no find to repeat");
            self.reset_pending();
            return;
        };
        let kind = if reverse { kind.opposite() } else { kind };
        let mut count = self.motion_count();

        let pos = self.cursor.position();
        let adjacent = match kind {
            FindKind::TillForward => self.buffer.char_at(pos.with_col(pos.col + 1)) == Some(ch),
            FindKind::TillBackward => {
                pos.col > 0 && self.buffer.char_at(pos.with_col(pos.col - 1)) == Some(ch)
            }
            FindKind::Forward | FindKind::Backward => false,
        };
        if adjacent {
            count = Some(count.unwrap_or(1) + 1);
        }
        self.run_motion(Motion::Find { kind, ch }, count);
    }

    fn handle_prefix(&mut self, prefix: Prefix, key: KeyEvent) {
        let Some(ch) = key.printable() else {
            warn!(%key, prefix = %prefix.keys(), "prefix expects a character");
            self.reset_pending();
            return;
        };

        match prefix {
            Prefix::G if ch == 'g' => {
                let count = self.motion_count();
                self.run_motion(Motion::FileStart, count);
            }
            Prefix::G => {
                warn!(key = %ch, "unknown g command");
                self.reset_pending();
            }
            Prefix::Find(kind) => {
                self.last_find = Some((kind, ch));
                let count = self.motion_count();
                self.run_motion(Motion::Find { kind, ch }, count);
            }
            Prefix::ReplaceChar => {
                let count = self.take_count();
                self.replace_chars(ch, count);
                self.reset_pending();
            }
            Prefix::Register if RegisterFile::is_valid_name(ch) => self.register = Some(ch),
            Prefix::Register => {
                warn!(name = %ch, "invalid register name");
                self.reset_pending();
            }
            Prefix::TextObject { inner } => self.apply_text_object(ch, inner),
        }
    }

    fn apply_text_object(&mut self, ch: char, inner: bool) {
        let range = TextObject::from_key(ch)
            .and_then(|object| text_object::resolve(&self.buffer, self.cursor.position(), object, inner));

        match (self.state, range) {
            (State::OperatorPending { op, .. }, Some(range)) => {
                self.state = State::Normal;
                self.execute_operator(op, range);
            }
            (State::Visual { .. }, Some(range)) if !range.is_empty() => {
                self.select_range(range);
            }
            _ => debug!(key = %ch, inner, "text object did not resolve"),
        }
        self.reset_pending();
    }

    /// Make a characterwise selection of exactly `range`.
    fn select_range(&mut self, range: Range) {
        let end = range.end;
        let last = if end.col > 0 {
            end.with_col(end.col - 1)
        } else {
            let line = end.line.saturating_sub(1);
            Position::new(line, self.buffer.line_len(line))
        };
        self.state = State::Visual {
            kind: VisualKind::Char,
            anchor: range.start,
        };
        self.cursor.set_position(last, &self.buffer, false);
    }

    // -- Normal -------------------------------------------------------------

    fn normal_command(&mut self, ch: char) {
        if self.motion_command(ch) {
            return;
        }

        if let Some(op) = Operator::from_key(ch) {
            debug!(op = op.label(), count = ?self.count, "operator pending");
            self.state = State::OperatorPending {
                op,
                count: self.count.take(),
            };
            return;
        }

        let count = self.count.unwrap_or(1);
        let pos = self.cursor.position();
        match ch {
            'i' => self.begin_insert(pos),
            'a' => {
                let col = if self.buffer.line_len(pos.line) > 0 {
                    pos.col + 1
                } else {
                    0
                };
                self.begin_insert(pos.with_col(col));
            }
            'I' => self.begin_insert(pos.with_col(self.buffer.first_non_blank(pos.line))),
            'A' => self.begin_insert(pos.with_col(self.buffer.line_len(pos.line))),
            'o' => self.open_line(true),
            'O' => self.open_line(false),
            'x' => self.delete_char(count),
            'X' => self.delete_char_before(count),
            's' => self.substitute(count),
            'S' => self.change_line(count),
            'D' => self.delete_to_end(count),
            'C' => self.change_to_end(count),
            'Y' => self.yank_line(count),
            'p' => self.paste(true, count),
            'P' => self.paste(false, count),
            'J' => self.join_lines(count),
            'u' => self.undo(count),
            'v' => self.enter_visual(VisualKind::Char),
            'V' => self.enter_visual(VisualKind::Line),
            'r' | '"' => {
                let prefix = if ch == 'r' {
                    Prefix::ReplaceChar
                } else {
                    Prefix::Register
                };
                self.prefix = Some(prefix);
                return;
            }
            _ => warn!(key = %ch, "unknown normal command"),
        }
        self.reset_pending();
    }

    /// Enter Insert at `pos`. The snapshot taken here makes the whole
    /// session one undo step.
    fn begin_insert(&mut self, pos: Position) {
        self.record_undo();
        self.state = State::Insert;
        self.cursor.set_position(pos, &self.buffer, true);
    }

    fn enter_visual(&mut self, kind: VisualKind) {
        self.state = State::Visual {
            kind,
            anchor: self.cursor.position(),
        };
    }

    /// `u`, `count` times.
    pub fn undo(&mut self, count: usize) {
        for _ in 0..count.max(1) {
            let current = self.undo_state();
            match self.history.undo(current) {
                Some(previous) => self.restore(previous),
                None => {
                    self.message = Some("Already at oldest change".to_string());
                    break;
                }
            }
        }
    }

    /// `ctrl+r`, `count` times.
    pub fn redo(&mut self, count: usize) {
        for _ in 0..count.max(1) {
            let current = self.undo_state();
            match self.history.redo(current) {
                Some(next) => self.restore(next),
                None => {
                    self.message = Some("Already at newest change".to_string());
                    break;
                }
            }
        }
    }

    // -- Operator-Pending ---------------------------------------------------

    fn pending_command(&mut self, ch: char, op: Operator, op_count: Option<usize>) {
        if ch == op.key() {
            let count = merge_counts(op_count, self.count.take()).unwrap_or(1);
            self.state = State::Normal;
            match op {
                Operator::Delete => self.delete_line(count),
                Operator::Change => self.change_line(count),
                Operator::Yank => self.yank_line(count),
            }
            self.reset_pending();
            return;
        }

        if self.motion_command(ch) {
            return;
        }

        match ch {
            'i' | 'a' => self.prefix = Some(Prefix::TextObject { inner: ch == 'i' }),
            _ => {
                warn!(key = %ch, op = op.label(), "not a motion, operator cancelled");
                self.reset_pending();
            }
        }
    }

    // -- Visual -------------------------------------------------------------

    fn visual_command(&mut self, ch: char, kind: VisualKind, anchor: Position) {
        if self.motion_command(ch) {
            return;
        }

        match ch {
            'v' | 'V' => {
                let wanted = if ch == 'v' {
                    VisualKind::Char
                } else {
                    VisualKind::Line
                };
                self.state = if wanted == kind {
                    State::Normal
                } else {
                    State::Visual {
                        kind: wanted,
                        anchor,
                    }
                };
            }
            'o' => {
                let pos = self.cursor.position();
                self.cursor.set_position(anchor, &self.buffer, false);
                self.state = State::Visual { kind, anchor: pos };
            }
            'd' | 'x' => self.visual_operator(Operator::Delete),
            'c' | 's' => self.visual_operator(Operator::Change),
            'y' => self.visual_operator(Operator::Yank),
            'i' | 'a' => {
                self.prefix = Some(Prefix::TextObject { inner: ch == 'i' });
                return;
            }
            '"' => {
                self.prefix = Some(Prefix::Register);
                return;
            }
            _ => warn!(key = %ch, "unknown visual command"),
        }
        self.reset_pending();
    }

    fn visual_operator(&mut self, op: Operator) {
        if let Some(range) = self.selection() {
            self.state = State::Normal;
            self.execute_operator(op, range);
        }
    }

    // -- Insert -------------------------------------------------------------

    fn handle_insert(&mut self, key: KeyEvent) {
        if key.is_abort() {
            self.finish_insert();
            return;
        }

        let pos = self.cursor.position();
        match key.code {
            KeyCode::Char(_) => match key.printable() {
                Some(ch) => {
                    self.buffer.insert_char(pos, ch);
                    self.move_insert_cursor(pos.with_col(pos.col + 1));
                }
                None => warn!(%key, "ignored key in insert mode"),
            },
            KeyCode::Tab => {
                let text = self.options.tab_text();
                self.buffer.insert_at(pos, &text);
                self.move_insert_cursor(pos.with_col(pos.col + text.chars().count()));
            }
            KeyCode::Enter => {
                self.buffer.split_line(pos.line, pos.col);
                self.move_insert_cursor(Position::new(pos.line + 1, 0));
            }
            KeyCode::Backspace => {
                if pos.col > 0 {
                    let before = pos.with_col(pos.col - 1);
                    self.buffer.delete_at(before, 1);
                    self.move_insert_cursor(before);
                } else if pos.line > 0 {
                    let prev = pos.line - 1;
                    let col = self.buffer.line_len(prev);
                    self.buffer.join_lines(prev);
                    self.move_insert_cursor(Position::new(prev, col));
                }
            }
            KeyCode::Delete => {
                if pos.col < self.buffer.line_len(pos.line) {
                    self.buffer.delete_at(pos, 1);
                } else {
                    self.buffer.join_lines(pos.line);
                }
            }
            KeyCode::Left => self.move_insert_cursor(pos.with_col(pos.col.saturating_sub(1))),
            KeyCode::Right => self.move_insert_cursor(pos.with_col(pos.col + 1)),
            KeyCode::Up | KeyCode::Down => {
                let motion = if key.code == KeyCode::Up {
                    Motion::Up
                } else {
                    Motion::Down
                };
                if let Some(target) = motion::execute(&self.buffer, &self.cursor, motion, None, true)
                {
                    self.cursor.move_vertical(target, &self.buffer, true);
                }
            }
            KeyCode::Escape => {}
        }
    }

    fn move_insert_cursor(&mut self, pos: Position) {
        self.cursor.set_position(pos, &self.buffer, true);
    }

    /// Leave Insert: a session that changed nothing leaves no undo step, and
    /// the cursor steps back onto the last inserted char.
    fn finish_insert(&mut self) {
        self.history.discard_if_unchanged(&self.buffer);
        self.state = State::Normal;
        let pos = self.cursor.position();
        self.cursor
            .set_position(pos.with_col(pos.col.saturating_sub(1)), &self.buffer, false);
        self.reset_pending();
    }
}

impl std::fmt::Debug for Editor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Editor")
            .field("mode", &self.mode())
            .field("cursor", &self.cursor.position())
            .field("prefix", &self.prefix)
            .field("count", &self.count)
            .field("register", &self.register)
            .field("buffer", &self.buffer)
            .finish_non_exhaustive()
    }
}

/// Multiply two optional counts. `None` only when neither was typed.
const fn merge_counts(a: Option<usize>, b: Option<usize>) -> Option<usize> {
    match (a, b) {
        (None, None) => None,
        (Some(x), None) | (None, Some(x)) => Some(x),
        (Some(x), Some(y)) => Some(x.saturating_mul(y)),
    }
}

/// The command char a key stands for outside Insert. Arrows act as
/// `h j k l`.
fn command_char(key: KeyEvent) -> Option<char> {
    match key.code {
        KeyCode::Left => Some('h'),
        KeyCode::Right => Some('l'),
        KeyCode::Up => Some('k'),
        KeyCode::Down => Some('j'),
        _ => key.printable(),
    }
}

fn digit_value(ch: char) -> usize {
    ch.to_digit(10).map_or(0, |d| d as usize)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
