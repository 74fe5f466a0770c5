use super::Pattern;
use crate::commands::{
    reorder, ChildOrder, KeyChange, Placement, Relocation, Replacement, UndoEntry, Ungrouping, ZOrder,
};
use crate::template::Template;
use crate::tree::{Node, NodeId};
use koginkit_core::{Color, GridCoord};
use std::collections::{BTreeMap, HashSet};

/// Description of an item to create.
///
/// Top-level positions are absolute grid coordinates; children of a group
/// are relative to the group offset.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemSpec {
    Stitch {
        position: GridCoord,
        length: u32,
        color: Color,
    },
    Group {
        offset: GridCoord,
        children: Vec<ItemSpec>,
    },
}

impl ItemSpec {
    pub fn position(&self) -> GridCoord {
        match self {
            ItemSpec::Stitch { position, .. } => *position,
            ItemSpec::Group { offset, .. } => *offset,
        }
    }
}

impl Pattern {
    /// Creates a detached node for `spec` at `position`.
    fn build(&mut self, spec: &ItemSpec, position: GridCoord) -> Option<NodeId> {
        match spec {
            ItemSpec::Stitch { length, color, .. } => {
                if *length == 0 {
                    tracing::warn!("Skipping stitch of length 0 at {}", position);
                    return None;
                }
                let key = self.stitches.get(*length, *color).key;
                Some(self.tree.create_stitch(position, key))
            }
            ItemSpec::Group { children, .. } => {
                let group = self.tree.create_group(position);
                for child in children {
                    if let Some(node) = self.build(child, child.position()) {
                        self.tree.append(group, node);
                    }
                }
                Some(group)
            }
        }
    }

    /// Appends new items to `container` (the active layer by default).
    pub fn add_items(&mut self, specs: &[ItemSpec], container: Option<NodeId>) -> Vec<NodeId> {
        let container = container.unwrap_or_else(|| self.tree.active_layer());
        if !self.tree.is_group(container) {
            tracing::warn!("Cannot add items to {:?}", container);
            return Vec::new();
        }
        let base = self.tree.container_offset(container);
        let start = self.tree.children(container).len();
        let mut placements = Vec::new();
        for spec in specs {
            let position = spec.position() - base;
            if let Some(node) = self.build(spec, position) {
                placements.push(Placement {
                    node,
                    parent: container,
                    index: start + placements.len(),
                });
            }
        }
        if placements.is_empty() {
            return Vec::new();
        }
        let nodes = placements.iter().map(|p| p.node).collect();
        self.push(UndoEntry::Insert { items: placements });
        nodes
    }

    /// Places a template with its origin at `origin`.
    pub fn insert_template(&mut self, template: &Template, origin: GridCoord, color: Color) -> Vec<NodeId> {
        let specs = template.to_specs(origin, color);
        self.add_items(&specs, None)
    }

    fn editable(&self, ids: &[NodeId]) -> Vec<NodeId> {
        ids.iter()
            .copied()
            .filter(|id| {
                self.tree.is_attached(*id)
                    && !self.tree.is_layer(*id)
                    && !self.tree.is_pivot(*id)
            })
            .collect()
    }

    pub fn delete_items(&mut self, ids: &[NodeId]) -> bool {
        let items = Placement::capture(&self.tree, &self.editable(ids));
        if items.is_empty() {
            return false;
        }
        self.push(UndoEntry::Delete { items });
        true
    }

    /// Moves items by a grid delta. Pivots may be moved too.
    pub fn move_items(&mut self, ids: &[NodeId], dx: i32, dy: i32) -> bool {
        let mut seen = HashSet::new();
        let items: Vec<NodeId> = ids
            .iter()
            .copied()
            .filter(|id| self.tree.is_attached(*id) && !self.tree.is_layer(*id))
            .filter(|id| seen.insert(*id))
            .collect();
        if items.is_empty() || (dx == 0 && dy == 0) {
            return false;
        }
        self.push(UndoEntry::Move { items, dx, dy });
        true
    }

    /// Wraps items into a new group placed where the first item lives.
    pub fn group_items(&mut self, ids: &[NodeId]) -> Option<NodeId> {
        let selected = self.editable(ids);
        let first = *selected.first()?;
        let target = self.tree.parent(first)?;
        let placements = Placement::capture(&self.tree, &selected);
        let index = placements
            .iter()
            .filter(|p| p.parent == target)
            .map(|p| p.index)
            .min()?;

        let base = self.tree.container_offset(target);
        let local: Vec<GridCoord> = placements
            .iter()
            .map(|p| self.tree.absolute_position(p.node) - base)
            .collect();
        let corner = GridCoord::new(
            local.iter().map(|c| c.x).min()?,
            local.iter().map(|c| c.y).min()?,
        );

        let members = placements
            .iter()
            .zip(&local)
            .map(|(from, position)| Relocation {
                from: *from,
                old_position: self.tree.position(from.node),
                new_position: *position - corner,
            })
            .collect();
        let group = self.tree.create_group(corner);
        self.push(UndoEntry::Group {
            group,
            target: Placement {
                node: group,
                parent: target,
                index,
            },
            members,
        });
        Some(group)
    }

    /// Dissolves groups into their parents. Returns the released items,
    /// leaving out groups that were dissolved themselves.
    pub fn ungroup_items(&mut self, ids: &[NodeId]) -> Vec<NodeId> {
        let groups: Vec<NodeId> = self
            .editable(ids)
            .into_iter()
            .filter(|id| self.tree.is_group(*id))
            .collect();
        // Highest index first so earlier records keep their positions.
        let order: Vec<NodeId> = Placement::capture(&self.tree, &groups)
            .into_iter()
            .rev()
            .map(|p| p.node)
            .collect();

        // A nested selection changes the children of enclosing groups, so
        // each record is taken after the previous one has run.
        let mut records: Vec<Ungrouping> = Vec::new();
        for group in order {
            let Some(record) = Ungrouping::capture(&self.tree, group) else {
                continue;
            };
            record.apply(&mut self.tree);
            records.push(record);
        }
        if records.is_empty() {
            return Vec::new();
        }

        let mut seen = HashSet::new();
        let released = records
            .iter()
            .rev()
            .flat_map(|r| r.children.iter().copied())
            .filter(|id| !groups.contains(id) && seen.insert(*id))
            .collect();
        self.record(UndoEntry::Ungroup { groups: records });
        released
    }

    /// Moves items to the head of `layer`, keeping their absolute position.
    pub fn move_to_layer(&mut self, ids: &[NodeId], layer: NodeId) -> bool {
        if self.tree.layer_index(layer).is_none() {
            tracing::warn!("Target {:?} is not a layer", layer);
            return false;
        }
        let items: Vec<Relocation> = Placement::capture(&self.tree, &self.editable(ids))
            .into_iter()
            .map(|from| Relocation {
                from,
                old_position: self.tree.position(from.node),
                new_position: self.tree.absolute_position(from.node),
            })
            .collect();
        if items.is_empty() {
            return false;
        }
        self.push(UndoEntry::MoveToLayer { layer, items });
        true
    }

    /// Changes paint order among siblings.
    pub fn move_z(&mut self, ids: &[NodeId], mode: ZOrder) -> bool {
        let mut by_parent: BTreeMap<NodeId, Vec<NodeId>> = BTreeMap::new();
        for placement in Placement::capture(&self.tree, &self.editable(ids)) {
            by_parent.entry(placement.parent).or_default().push(placement.node);
        }
        let orders: Vec<ChildOrder> = by_parent
            .into_iter()
            .filter_map(|(parent, selected)| {
                let before = self.tree.children(parent).to_vec();
                let after = reorder(&before, &selected, mode);
                (before != after).then_some(ChildOrder {
                    parent,
                    before,
                    after,
                })
            })
            .collect();
        if orders.is_empty() {
            return false;
        }
        self.push(UndoEntry::MoveZ { mode, orders });
        true
    }

    /// Recolors stitches, descending into groups. Returns the number of
    /// stitches changed.
    pub fn set_color(&mut self, ids: &[NodeId], color: Color) -> usize {
        let mut changes = Vec::new();
        for id in self.editable(ids) {
            for node in self.tree.stitches_under(id) {
                let Some(Node::Stitch(stitch)) = self.tree.node(node) else {
                    continue;
                };
                let old_key = stitch.key;
                if let Some(new_key) = self.stitches.replace(&old_key, old_key.length, color) {
                    changes.push(KeyChange {
                        node,
                        old_key,
                        new_key,
                    });
                }
            }
        }
        let count = changes.len();
        if count > 0 {
            self.push(UndoEntry::Color { items: changes });
        }
        count
    }

    /// Swaps each item for a new one built from its spec, at the same
    /// index. Spec positions are absolute.
    pub fn replace_items(&mut self, replacements: &[(NodeId, ItemSpec)]) -> Vec<NodeId> {
        let mut items = Vec::new();
        for (old_node, spec) in replacements {
            if !self.editable(&[*old_node]).contains(old_node) {
                continue;
            }
            let (Some(parent), Some(index)) = (self.tree.parent(*old_node), self.tree.index_of(*old_node)) else {
                continue;
            };
            let position = spec.position() - self.tree.container_offset(parent);
            if let Some(new_node) = self.build(spec, position) {
                items.push(Replacement {
                    parent,
                    index,
                    old_node: *old_node,
                    new_node,
                });
            }
        }
        if items.is_empty() {
            return Vec::new();
        }
        let nodes = items.iter().map(|r| r.new_node).collect();
        self.push(UndoEntry::Replace { items });
        nodes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stitch(x: i32, y: i32, length: u32) -> ItemSpec {
        ItemSpec::Stitch {
            position: GridCoord::new(x, y),
            length,
            color: Color::BLACK,
        }
    }

    #[test]
    fn test_add_items_into_group_uses_local_coordinates() {
        let mut pattern = Pattern::new();
        let group = pattern.add_items(
            &[ItemSpec::Group {
                offset: GridCoord::new(10, 10),
                children: vec![stitch(0, 0, 1)],
            }],
            None,
        )[0];
        let added = pattern.add_items(&[stitch(12, 11, 2)], Some(group));
        assert_eq!(pattern.tree().position(added[0]), GridCoord::new(2, 1));
        assert_eq!(pattern.tree().absolute_position(added[0]), GridCoord::new(12, 11));
    }

    #[test]
    fn test_zero_length_is_skipped() {
        let mut pattern = Pattern::new();
        assert!(pattern.add_items(&[stitch(0, 0, 0)], None).is_empty());
        assert!(!pattern.history().can_undo());
    }

    #[test]
    fn test_group_corner_and_undo() {
        let mut pattern = Pattern::new();
        let layer = pattern.tree().active_layer();
        let ids = pattern.add_items(&[stitch(4, 2, 1), stitch(6, 5, 2), stitch(0, 0, 1)], None);
        let group = pattern.group_items(&ids[..2]).unwrap();
        assert_eq!(pattern.tree().position(group), GridCoord::new(4, 2));
        assert_eq!(pattern.tree().position(ids[1]), GridCoord::new(2, 3));
        assert_eq!(pattern.tree().children(layer), &[group, ids[2]]);

        pattern.undo();
        assert_eq!(pattern.tree().children(layer), ids.as_slice());
        assert_eq!(pattern.tree().position(ids[1]), GridCoord::new(6, 5));
    }

    #[test]
    fn test_move_to_layer_keeps_absolute_position() {
        let mut pattern = Pattern::new();
        let group = pattern.add_items(
            &[ItemSpec::Group {
                offset: GridCoord::new(3, 3),
                children: vec![stitch(1, 1, 1)],
            }],
            None,
        )[0];
        let inner = pattern.tree().children(group)[0];
        let other = pattern.add_layer(None);
        assert!(pattern.move_to_layer(&[inner], other));
        assert_eq!(pattern.tree().parent(inner), Some(other));
        assert_eq!(pattern.tree().position(inner), GridCoord::new(4, 4));
        pattern.undo();
        assert_eq!(pattern.tree().parent(inner), Some(group));
        assert_eq!(pattern.tree().position(inner), GridCoord::new(1, 1));
    }

    #[test]
    fn test_set_color_descends_into_groups() {
        let mut pattern = Pattern::new();
        let group = pattern.add_items(
            &[ItemSpec::Group {
                offset: GridCoord::ORIGIN,
                children: vec![stitch(0, 0, 1), stitch(2, 0, 1)],
            }],
            None,
        )[0];
        let red = Color::rgb(255, 0, 0);
        assert_eq!(pattern.set_color(&[group], red), 2);
        assert_eq!(pattern.set_color(&[group], red), 0);
        pattern.undo();
        let first = pattern.tree().children(group)[0];
        assert_eq!(pattern.tree().stitch(first).unwrap().key.color, Color::BLACK);
    }

    #[test]
    fn test_replace_items_round_trip() {
        let mut pattern = Pattern::new();
        let layer = pattern.tree().active_layer();
        let ids = pattern.add_items(&[stitch(0, 0, 1), stitch(5, 0, 1)], None);
        let new = pattern.replace_items(&[(ids[0], stitch(0, 0, 3))]);
        assert_eq!(pattern.tree().children(layer), &[new[0], ids[1]]);
        pattern.undo();
        assert_eq!(pattern.tree().children(layer), ids.as_slice());
        pattern.redo();
        assert_eq!(pattern.tree().children(layer), &[new[0], ids[1]]);
    }

    #[test]
    fn test_empty_selection_is_noop() {
        let mut pattern = Pattern::new();
        assert!(!pattern.delete_items(&[]));
        assert!(pattern.group_items(&[]).is_none());
        assert!(pattern.ungroup_items(&[]).is_empty());
        assert!(!pattern.move_z(&[], ZOrder::Front));
        assert!(!pattern.history().can_undo());
    }
}
