//! Undo/redo history: whole-buffer snapshots.
//!
//! Every mutating command records a [`Snapshot`] of the state *before* it
//! runs. Undo swaps the current state for the newest snapshot and keeps the
//! current one for redo; redo is the mirror.
//!
//! ```text
//! history.record(editor_state_before);   // clears redo
//! // mutate the buffer
//! let prev = history.undo(current)?;     // current goes to the redo stack
//! ```
//!
//! An insert session (`i` ... `Esc`) records once on entry, so everything
//! typed undoes as one step.
//!
//! Snapshots clone the buffer. Rope clones share structure, but each step is
//! still O(buffer) in the worst case, which is fine for challenge-sized text
//! and is the scale limit of this design. `undolevels` caps the depth.

use crate::buffer::Buffer;
use crate::position::Position;

/// Editor state captured before a change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub buffer: Buffer,
    pub cursor: Position,
}

impl Snapshot {
    #[must_use]
    pub fn new(buffer: &Buffer, cursor: Position) -> Self {
        Self {
            buffer: buffer.clone(),
            cursor,
        }
    }
}

#[derive(Debug, Clone)]
pub struct History {
    undo_stack: Vec<Snapshot>,
    redo_stack: Vec<Snapshot>,
    limit: usize,
}

impl History {
    /// History keeping at most `limit` undo steps. Zero disables undo.
    #[must_use]
    pub const fn new(limit: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            limit,
        }
    }

    /// Push the state from before a change and drop the redo stack.
    pub fn record(&mut self, snapshot: Snapshot) {
        self.redo_stack.clear();
        if self.limit == 0 {
            return;
        }
        self.undo_stack.push(snapshot);
        self.trim();
    }

    /// Step back: returns the state to restore and keeps `current` for redo.
    /// `None` when there is nothing to undo.
    pub fn undo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let previous = self.undo_stack.pop()?;
        self.redo_stack.push(current);
        Some(previous)
    }

    /// Step forward again after an undo. `None` when there is nothing to redo.
    pub fn redo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let next = self.redo_stack.pop()?;
        self.undo_stack.push(current);
        Some(next)
    }

    /// Drop the newest undo step when it holds exactly `buffer`, i.e. the
    /// change it guarded turned out to change nothing. Returns whether a step
    /// was dropped.
    pub fn discard_if_unchanged(&mut self, buffer: &Buffer) -> bool {
        if self.undo_stack.last().is_some_and(|top| top.buffer == *buffer) {
            self.undo_stack.pop();
            true
        } else {
            false
        }
    }

    /// Change the depth cap, dropping the oldest steps if needed.
    pub fn set_limit(&mut self, limit: usize) {
        self.limit = limit;
        self.trim();
    }

    fn trim(&mut self) {
        if self.undo_stack.len() > self.limit {
            let excess = self.undo_stack.len() - self.limit;
            self.undo_stack.drain(..excess);
        }
    }

    #[must_use]
    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    #[must_use]
    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(1000)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(text: &str, line: usize, col: usize) -> Snapshot {
        Snapshot::new(&Buffer::from_text(text), Position::new(line, col))
    }

    #[test]
    fn empty_history_cannot_step() {
        let mut h = History::default();
        assert!(!h.can_undo());
        assert!(!h.can_redo());
        assert_eq!(h.undo(snap("x", 0, 0)), None);
        assert_eq!(h.redo(snap("x", 0, 0)), None);
    }

    #[test]
    fn undo_returns_previous_and_enables_redo() {
        let mut h = History::default();
        h.record(snap("before", 0, 0));
        let restored = h.undo(snap("after", 0, 3));
        assert_eq!(restored, Some(snap("before", 0, 0)));
        assert!(!h.can_undo());
        assert_eq!(h.redo_len(), 1);

        let again = h.redo(snap("before", 0, 0));
        assert_eq!(again, Some(snap("after", 0, 3)));
        assert_eq!(h.undo_len(), 1);
        assert!(!h.can_redo());
    }

    #[test]
    fn record_clears_redo() {
        let mut h = History::default();
        h.record(snap("a", 0, 0));
        h.undo(snap("b", 0, 0));
        assert!(h.can_redo());
        h.record(snap("a", 0, 0));
        assert!(!h.can_redo());
    }

    #[test]
    fn multiple_steps_unwind_in_order() {
        let mut h = History::default();
        h.record(snap("1", 0, 0));
        h.record(snap("2", 0, 0));
        assert_eq!(h.undo(snap("3", 0, 0)), Some(snap("2", 0, 0)));
        assert_eq!(h.undo(snap("2", 0, 0)), Some(snap("1", 0, 0)));
        assert_eq!(h.undo(snap("1", 0, 0)), None);
    }

    #[test]
    fn limit_drops_oldest() {
        let mut h = History::new(2);
        h.record(snap("1", 0, 0));
        h.record(snap("2", 0, 0));
        h.record(snap("3", 0, 0));
        assert_eq!(h.undo_len(), 2);
        assert_eq!(h.undo(snap("4", 0, 0)), Some(snap("3", 0, 0)));
        assert_eq!(h.undo(snap("3", 0, 0)), Some(snap("2", 0, 0)));
        assert_eq!(h.undo(snap("2", 0, 0)), None);
    }

    #[test]
    fn zero_limit_disables_undo() {
        let mut h = History::new(0);
        h.record(snap("1", 0, 0));
        assert!(!h.can_undo());
    }

    #[test]
    fn shrinking_limit_trims() {
        let mut h = History::default();
        for text in ["1", "2", "3"] {
            h.record(snap(text, 0, 0));
        }
        h.set_limit(1);
        assert_eq!(h.undo_len(), 1);
    }

    #[test]
    fn discard_only_when_unchanged() {
        let mut h = History::default();
        h.record(snap("same", 0, 0));
        assert!(!h.discard_if_unchanged(&Buffer::from_text("changed")));
        assert!(h.discard_if_unchanged(&Buffer::from_text("same")));
        assert!(!h.can_undo());
        assert!(!h.discard_if_unchanged(&Buffer::from_text("same")));
    }
}
