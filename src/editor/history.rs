//! Snapshot undo/redo history
//!
//! Each recorded step is the document as it was *before* a transaction.
//! The undo stack is bounded; when it overflows the oldest step is dropped.

use crate::document::Document;

/// Bounded undo/redo stacks of document snapshots.
#[derive(Debug, Clone)]
pub struct History {
    undo_stack: Vec<Document>,
    redo_stack: Vec<Document>,
    max_depth: usize,
}

impl History {
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_depth: max_depth.max(1),
        }
    }

    /// Record the state preceding a new edit.
    ///
    /// New edits invalidate the redo history.
    pub fn record(&mut self, before: Document) {
        self.undo_stack.push(before);
        self.trim();
        self.redo_stack.clear();
    }

    /// Step back. `current` becomes the redo target.
    pub fn undo(&mut self, current: &Document) -> Option<Document> {
        let previous = self.undo_stack.pop()?;
        self.redo_stack.push(current.clone());
        Some(previous)
    }

    /// Step forward again. `current` becomes the undo target.
    pub fn redo(&mut self, current: &Document) -> Option<Document> {
        let next = self.redo_stack.pop()?;
        self.undo_stack.push(current.clone());
        self.trim();
        Some(next)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Get the number of items in the undo stack.
    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    /// Get the number of items in the redo stack.
    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Change the bound, dropping the oldest steps if needed.
    pub fn set_max_depth(&mut self, max_depth: usize) {
        self.max_depth = max_depth.max(1);
        self.trim();
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    fn trim(&mut self) {
        if self.undo_stack.len() > self.max_depth {
            let excess = self.undo_stack.len() - self.max_depth;
            self.undo_stack.drain(..excess);
        }
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(100)
    }
}
