//! # vimtd-engine: modal editing engine for vimtd
//!
//! A Vim-style editor without a screen: feed it keys, read back text, a
//! cursor and a render snapshot.
//!
//! - **[`position`]**: `Position` (line, col) and `Range`, 0-indexed
//! - **[`buffer`]**: `Buffer` wrapping a rope, always at least one line
//! - **[`cursor`]**: cursor with sticky column and per-mode clamping
//! - **[`word`]**: word / WORD classification and boundary search
//! - **[`motion`]**: `h j k l w b e 0 ^ $ gg G f t %`... as pure functions
//! - **[`text_object`]**: `iw aw i" a( i{`...
//! - **[`operator`]**: delete / change / yank and the single-key commands
//! - **[`register`]**: unnamed and `a`-`z` registers
//! - **[`history`]**: snapshot undo/redo
//! - **[`options`]**: `expandtab`, `tabstop`, `undolevels` via `:set` syntax
//! - **[`key`]**: key events and Vim key-notation parsing
//! - **[`mode`]**: the mode a host sees
//! - **[`editor`]**: the session and its key dispatcher
//! - **[`render`]**: read-only snapshot for a renderer

pub mod buffer;
pub mod cursor;
pub mod editor;
pub mod history;
pub mod key;
pub mod mode;
pub mod motion;
pub mod operator;
pub mod options;
pub mod position;
pub mod register;
pub mod render;
pub mod text_object;
pub mod word;

pub use buffer::Buffer;
pub use editor::Editor;
pub use key::{KeyCode, KeyEvent, KeyParseError, Modifiers};
pub use mode::{CursorShape, Mode, VisualKind};
pub use operator::Operator;
pub use options::{OptionError, Options};
pub use position::{Position, Range};
pub use render::{RenderSnapshot, VisualSpan};
