//! Bounded undo/redo history.
//!
//! Stores full snapshots of the tree and selection. When the undo stack is at capacity the
//! oldest entry is evicted. Recording a new entry clears the redo stack.

use crate::document::Document;
use crate::editor::selection::Selection;
use std::collections::VecDeque;

/// Snapshot for undo/redo
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Snapshot {
    pub(crate) document: Document,
    pub(crate) selection: Selection,
}

#[derive(Debug, Clone)]
pub(crate) struct History {
    undo_stack: VecDeque<Snapshot>,
    redo_stack: Vec<Snapshot>,
    capacity: usize,
}

impl History {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            undo_stack: VecDeque::with_capacity(capacity.min(64)),
            redo_stack: Vec::new(),
            capacity,
        }
    }

    /// Records the state before a mutation.
    pub(crate) fn record(&mut self, before: Snapshot) {
        self.redo_stack.clear();
        self.push_undo(before);
    }

    /// Steps back, saving `current` for redo.
    pub(crate) fn undo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let previous = self.undo_stack.pop_back()?;
        self.redo_stack.push(current);
        Some(previous)
    }

    /// Steps forward, saving `current` for undo.
    pub(crate) fn redo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let next = self.redo_stack.pop()?;
        self.push_undo(current);
        Some(next)
    }

    pub(crate) fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    pub(crate) fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub(crate) fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    fn push_undo(&mut self, snapshot: Snapshot) {
        if self.capacity == 0 {
            return;
        }
        while self.undo_stack.len() >= self.capacity {
            self.undo_stack.pop_front();
        }
        self.undo_stack.push_back(snapshot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{BlockKind, DocumentNode};

    fn snap(text: &str) -> Snapshot {
        Snapshot {
            document: Document::new(vec![DocumentNode::with_text(BlockKind::Paragraph, text)])
                .unwrap(),
            selection: Selection::default(),
        }
    }

    #[test]
    fn evicts_oldest_entry_at_capacity() {
        let mut history = History::new(2);
        history.record(snap("a"));
        history.record(snap("b"));
        history.record(snap("c"));
        assert_eq!(history.undo_depth(), 2);

        assert_eq!(history.undo(snap("d")), Some(snap("c")));
        assert_eq!(history.undo(snap("c")), Some(snap("b")));
        assert_eq!(history.undo(snap("b")), None);
    }

    #[test]
    fn record_clears_redo() {
        let mut history = History::new(10);
        history.record(snap("a"));
        history.undo(snap("b"));
        assert_eq!(history.redo_depth(), 1);
        history.record(snap("a"));
        assert_eq!(history.redo_depth(), 0);
    }

    #[test]
    fn redo_returns_undone_state() {
        let mut history = History::new(10);
        history.record(snap("a"));
        let previous = history.undo(snap("b")).unwrap();
        assert_eq!(previous, snap("a"));
        assert_eq!(history.redo(previous), Some(snap("b")));
        assert_eq!(history.undo_depth(), 1);
    }

    #[test]
    fn zero_capacity_disables_undo() {
        let mut history = History::new(0);
        history.record(snap("a"));
        assert_eq!(history.undo(snap("b")), None);
    }
}
