//! Undo/redo stacks.

use crate::commands::UndoEntry;
use crate::tree::DocumentTree;
use koginkit_settings::GridOption;

/// Manages undo and redo of [`UndoEntry`] values.
#[derive(Debug, Clone, Default)]
pub struct UndoManager {
    undo_stack: Vec<UndoEntry>,
    redo_stack: Vec<UndoEntry>,
    /// Oldest entries are dropped beyond this depth.
    max_depth: Option<usize>,
}

impl UndoManager {
    /// Unbounded history.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_depth(max_depth: usize) -> Self {
        Self {
            max_depth: Some(max_depth),
            ..Self::default()
        }
    }

    /// Records an already applied entry. Clears the redo stack.
    pub fn push(&mut self, entry: UndoEntry) {
        self.redo_stack.clear();
        self.undo_stack.push(entry);
        if let Some(max) = self.max_depth {
            if self.undo_stack.len() > max {
                self.undo_stack.remove(0);
            }
        }
    }

    /// Reverts the newest entry. Returns `false` when there is nothing to undo.
    pub fn undo(&mut self, tree: &mut DocumentTree, grid: &mut GridOption) -> bool {
        let Some(entry) = self.undo_stack.pop() else {
            return false;
        };
        tracing::debug!("Undo {}", entry.name());
        entry.undo(tree, grid);
        self.redo_stack.push(entry);
        true
    }

    pub fn redo(&mut self, tree: &mut DocumentTree, grid: &mut GridOption) -> bool {
        let Some(entry) = self.redo_stack.pop() else {
            return false;
        };
        tracing::debug!("Redo {}", entry.name());
        entry.apply(tree, grid);
        self.undo_stack.push(entry);
        true
    }

    /// Wraps the newest `count` entries into one [`UndoEntry::Sequence`].
    pub fn merge(&mut self, count: usize, label: &str) -> bool {
        if count == 0 || self.undo_stack.len() < count {
            return false;
        }
        let entries = self.undo_stack.split_off(self.undo_stack.len() - count);
        self.push(UndoEntry::Sequence {
            label: label.to_string(),
            entries,
        });
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    /// Label of the entry [`UndoManager::undo`] would revert.
    pub fn undo_label(&self) -> Option<&str> {
        self.undo_stack.last().map(UndoEntry::name)
    }

    pub fn redo_label(&self) -> Option<&str> {
        self.redo_stack.last().map(UndoEntry::name)
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}
