use super::Pattern;
use crate::commands::{Placement, UndoEntry};
use crate::tree::NodeId;
use koginkit_core::GridCoord;

impl Pattern {
    /// Adds pivots numbered after the existing ones.
    pub fn add_pivots(&mut self, positions: &[GridCoord]) -> Vec<NodeId> {
        if positions.is_empty() {
            return Vec::new();
        }
        let layer = self.tree.pivot_layer();
        let start = self.tree.children(layer).len();
        let first_index = self.tree.next_pivot_index();
        let items: Vec<Placement> = positions
            .iter()
            .enumerate()
            .map(|(n, position)| Placement {
                node: self.tree.create_pivot(*position, first_index + n as u32),
                parent: layer,
                index: start + n,
            })
            .collect();
        let nodes = items.iter().map(|p| p.node).collect();
        self.push(UndoEntry::PivotInsert { items });
        nodes
    }

    pub fn delete_pivots(&mut self, ids: &[NodeId]) -> bool {
        let pivots: Vec<NodeId> = ids
            .iter()
            .copied()
            .filter(|id| self.tree.is_pivot(*id))
            .collect();
        let items = Placement::capture(&self.tree, &pivots);
        if items.is_empty() {
            return false;
        }
        self.push(UndoEntry::PivotDelete { items });
        true
    }
}
