//! Bounded undo/redo stacks.

use std::collections::VecDeque;

/// Maximum number of undo (and redo) steps kept.
pub const HISTORY_LIMIT: usize = 50;

/// Past/future snapshot stacks. The oldest past snapshot is discarded once
/// the limit is reached.
#[derive(Debug, Clone)]
pub struct EditHistory<T> {
    past: VecDeque<T>,
    future: Vec<T>,
    limit: usize,
}

impl<T> Default for EditHistory<T> {
    fn default() -> Self {
        Self::with_limit(HISTORY_LIMIT)
    }
}

impl<T> EditHistory<T> {
    pub fn with_limit(limit: usize) -> Self {
        Self {
            past: VecDeque::new(),
            future: Vec::new(),
            limit: limit.max(1),
        }
    }

    /// Records the state as it was before an edit. Clears the redo stack.
    pub fn record(&mut self, before: T) {
        if self.past.len() == self.limit {
            self.past.pop_front();
        }
        self.past.push_back(before);
        self.future.clear();
    }

    /// Steps back: returns the previous state and stores `current` for redo.
    pub fn undo(&mut self, current: T) -> Option<T> {
        let previous = self.past.pop_back()?;
        self.future.push(current);
        if self.future.len() > self.limit {
            self.future.remove(0);
        }
        Some(previous)
    }

    /// Steps forward: returns the next state and stores `current` for undo.
    pub fn redo(&mut self, current: T) -> Option<T> {
        let next = self.future.pop()?;
        if self.past.len() == self.limit {
            self.past.pop_front();
        }
        self.past.push_back(current);
        Some(next)
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.past.len()
    }

    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
    }
}
