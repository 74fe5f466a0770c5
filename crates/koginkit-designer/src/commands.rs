//! Undo entries.
//!
//! Each entry records enough state to replay a mutation in both
//! directions. Entries only hold [`NodeId`]s; nodes removed from the tree
//! stay in the arena so they can be attached again.

use crate::stitch::GeometryKey;
use crate::tree::{DocumentTree, NodeId};
use koginkit_core::GridCoord;
use koginkit_settings::GridOption;
use std::fmt;

/// Where a node sits inside its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub node: NodeId,
    pub parent: NodeId,
    pub index: usize,
}

impl Placement {
    /// Current placements of `nodes`, sorted by parent and index. Detached
    /// nodes are skipped.
    pub fn capture(tree: &DocumentTree, nodes: &[NodeId]) -> Vec<Placement> {
        let mut placements: Vec<Placement> = nodes
            .iter()
            .filter_map(|node| {
                Some(Placement {
                    node: *node,
                    parent: tree.parent(*node)?,
                    index: tree.index_of(*node)?,
                })
            })
            .collect();
        placements.sort_by_key(|p| (p.parent, p.index));
        placements.dedup_by_key(|p| p.node);
        placements
    }
}

fn attach_all(tree: &mut DocumentTree, placements: &[Placement]) {
    for placement in placements {
        tree.attach(placement.parent, placement.index, placement.node);
    }
}

fn detach_all(tree: &mut DocumentTree, placements: &[Placement]) {
    for placement in placements.iter().rev() {
        tree.detach(placement.node);
    }
}

/// A node that changes container and position.
#[derive(Debug, Clone, PartialEq)]
pub struct Relocation {
    pub from: Placement,
    pub old_position: GridCoord,
    pub new_position: GridCoord,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ungrouping {
    pub group: NodeId,
    pub parent: NodeId,
    pub index: usize,
    pub offset: GridCoord,
    pub children: Vec<NodeId>,
}

impl Ungrouping {
    /// Captures the current state of `group`, or `None` when it is detached.
    pub fn capture(tree: &DocumentTree, group: NodeId) -> Option<Self> {
        Some(Self {
            group,
            parent: tree.parent(group)?,
            index: tree.index_of(group)?,
            offset: tree.position(group),
            children: tree.children(group).to_vec(),
        })
    }

    pub fn apply(&self, tree: &mut DocumentTree) {
        tree.detach(self.group);
        for (n, child) in self.children.iter().enumerate() {
            tree.translate(*child, self.offset.x, self.offset.y);
            tree.attach(self.parent, self.index + n, *child);
        }
    }

    pub fn undo(&self, tree: &mut DocumentTree) {
        for child in self.children.iter().rev() {
            tree.detach(*child);
        }
        for child in &self.children {
            tree.translate(*child, -self.offset.x, -self.offset.y);
            tree.append(self.group, *child);
        }
        tree.attach(self.parent, self.index, self.group);
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyChange {
    pub node: NodeId,
    pub old_key: GeometryKey,
    pub new_key: GeometryKey,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Replacement {
    pub parent: NodeId,
    pub index: usize,
    pub old_node: NodeId,
    pub new_node: NodeId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChildOrder {
    pub parent: NodeId,
    pub before: Vec<NodeId>,
    pub after: Vec<NodeId>,
}

/// Direction of a z-order change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZOrder {
    /// To the head of the child list.
    Front,
    /// To the tail of the child list.
    Back,
    /// One index toward the head.
    FrontStep,
    /// One index toward the tail.
    BackStep,
}

impl fmt::Display for ZOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ZOrder::Front => "front",
            ZOrder::Back => "back",
            ZOrder::FrontStep => "front-step",
            ZOrder::BackStep => "back-step",
        };
        write!(f, "{}", name)
    }
}

/// A recorded document mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum UndoEntry {
    Insert {
        items: Vec<Placement>,
    },
    Delete {
        items: Vec<Placement>,
    },
    Move {
        items: Vec<NodeId>,
        dx: i32,
        dy: i32,
    },
    MoveToLayer {
        layer: NodeId,
        items: Vec<Relocation>,
    },
    Group {
        group: NodeId,
        target: Placement,
        members: Vec<Relocation>,
    },
    Ungroup {
        /// Each record was captured after the previous ones ran.
        groups: Vec<Ungrouping>,
    },
    Color {
        items: Vec<KeyChange>,
    },
    Replace {
        items: Vec<Replacement>,
    },
    LayerAdd {
        layer: NodeId,
        index: usize,
        previous_active: NodeId,
    },
    LayerDelete {
        layer: NodeId,
        index: usize,
        active_before: NodeId,
        active_after: NodeId,
    },
    LayerRename {
        layer: NodeId,
        old_name: String,
        new_name: String,
    },
    CanvasResize {
        dx: i32,
        dy: i32,
        old_size: (u32, u32),
        new_size: (u32, u32),
    },
    MoveZ {
        mode: ZOrder,
        orders: Vec<ChildOrder>,
    },
    PivotInsert {
        items: Vec<Placement>,
    },
    PivotDelete {
        items: Vec<Placement>,
    },
    /// Several entries replayed as one.
    Sequence {
        label: String,
        entries: Vec<UndoEntry>,
    },
}

fn shift_canvas(tree: &mut DocumentTree, dx: i32, dy: i32) {
    if dx == 0 && dy == 0 {
        return;
    }
    let mut items: Vec<NodeId> = Vec::new();
    for layer in tree.layers() {
        items.extend_from_slice(tree.children(*layer));
    }
    items.extend_from_slice(tree.children(tree.pivot_layer()));
    for item in items {
        tree.translate(item, dx, dy);
    }
}

impl UndoEntry {
    /// Applies the mutation (also used for redo).
    pub fn apply(&self, tree: &mut DocumentTree, grid: &mut GridOption) {
        match self {
            UndoEntry::Insert { items } | UndoEntry::PivotInsert { items } => {
                attach_all(tree, items);
            }
            UndoEntry::Delete { items } | UndoEntry::PivotDelete { items } => {
                detach_all(tree, items);
            }
            UndoEntry::Move { items, dx, dy } => {
                for item in items {
                    tree.translate(*item, *dx, *dy);
                }
            }
            UndoEntry::MoveToLayer { layer, items } => {
                for item in items.iter().rev() {
                    tree.detach(item.from.node);
                }
                for (index, item) in items.iter().enumerate() {
                    tree.set_position(item.from.node, item.new_position);
                    tree.attach(*layer, index, item.from.node);
                }
            }
            UndoEntry::Group {
                group,
                target,
                members,
            } => {
                for member in members.iter().rev() {
                    tree.detach(member.from.node);
                }
                for member in members {
                    tree.set_position(member.from.node, member.new_position);
                    tree.append(*group, member.from.node);
                }
                tree.attach(target.parent, target.index, *group);
            }
            UndoEntry::Ungroup { groups } => {
                for record in groups {
                    record.apply(tree);
                }
            }
            UndoEntry::Color { items } => {
                for change in items {
                    set_key(tree, change.node, change.new_key);
                }
            }
            UndoEntry::Replace { items } => {
                for item in items {
                    tree.detach(item.old_node);
                    tree.attach(item.parent, item.index, item.new_node);
                }
            }
            UndoEntry::LayerAdd { layer, index, .. } => {
                tree.insert_layer(*index, *layer);
                tree.set_active_layer(*layer);
            }
            UndoEntry::LayerDelete {
                layer,
                active_after,
                ..
            } => {
                tree.remove_layer(*layer);
                tree.set_active_layer(*active_after);
            }
            UndoEntry::LayerRename {
                layer, new_name, ..
            } => {
                tree.set_layer_name(*layer, new_name);
            }
            UndoEntry::CanvasResize {
                dx, dy, new_size, ..
            } => {
                shift_canvas(tree, *dx, *dy);
                grid.hori_count = new_size.0;
                grid.vert_count = new_size.1;
            }
            UndoEntry::MoveZ { orders, .. } => {
                for order in orders {
                    tree.reorder_children(order.parent, order.after.clone());
                }
            }
            UndoEntry::Sequence { entries, .. } => {
                for entry in entries {
                    entry.apply(tree, grid);
                }
            }
        }
    }

    /// Reverts the mutation.
    pub fn undo(&self, tree: &mut DocumentTree, grid: &mut GridOption) {
        match self {
            UndoEntry::Insert { items } | UndoEntry::PivotInsert { items } => {
                detach_all(tree, items);
            }
            UndoEntry::Delete { items } | UndoEntry::PivotDelete { items } => {
                attach_all(tree, items);
            }
            UndoEntry::Move { items, dx, dy } => {
                for item in items {
                    tree.translate(*item, -dx, -dy);
                }
            }
            UndoEntry::MoveToLayer { items, .. } => {
                for item in items {
                    tree.detach(item.from.node);
                }
                for item in items {
                    tree.set_position(item.from.node, item.old_position);
                    tree.attach(item.from.parent, item.from.index, item.from.node);
                }
            }
            UndoEntry::Group { group, members, .. } => {
                tree.detach(*group);
                for member in members.iter().rev() {
                    tree.detach(member.from.node);
                }
                for member in members {
                    tree.set_position(member.from.node, member.old_position);
                    tree.attach(member.from.parent, member.from.index, member.from.node);
                }
            }
            UndoEntry::Ungroup { groups } => {
                for record in groups.iter().rev() {
                    record.undo(tree);
                }
            }
            UndoEntry::Color { items } => {
                for change in items.iter().rev() {
                    set_key(tree, change.node, change.old_key);
                }
            }
            UndoEntry::Replace { items } => {
                for item in items.iter().rev() {
                    tree.detach(item.new_node);
                    tree.attach(item.parent, item.index, item.old_node);
                }
            }
            UndoEntry::LayerAdd {
                layer,
                previous_active,
                ..
            } => {
                tree.remove_layer(*layer);
                tree.set_active_layer(*previous_active);
            }
            UndoEntry::LayerDelete {
                layer,
                index,
                active_before,
                ..
            } => {
                tree.insert_layer(*index, *layer);
                tree.set_active_layer(*active_before);
            }
            UndoEntry::LayerRename {
                layer, old_name, ..
            } => {
                tree.set_layer_name(*layer, old_name);
            }
            UndoEntry::CanvasResize {
                dx, dy, old_size, ..
            } => {
                shift_canvas(tree, -dx, -dy);
                grid.hori_count = old_size.0;
                grid.vert_count = old_size.1;
            }
            UndoEntry::MoveZ { orders, .. } => {
                for order in orders.iter().rev() {
                    tree.reorder_children(order.parent, order.before.clone());
                }
            }
            UndoEntry::Sequence { entries, .. } => {
                for entry in entries.iter().rev() {
                    entry.undo(tree, grid);
                }
            }
        }
    }

    /// Label for menus and logs.
    pub fn name(&self) -> &str {
        match self {
            UndoEntry::Insert { .. } => "Insert",
            UndoEntry::Delete { .. } => "Delete",
            UndoEntry::Move { .. } => "Move",
            UndoEntry::MoveToLayer { .. } => "Move to Layer",
            UndoEntry::Group { .. } => "Group",
            UndoEntry::Ungroup { .. } => "Ungroup",
            UndoEntry::Color { .. } => "Color",
            UndoEntry::Replace { .. } => "Replace",
            UndoEntry::LayerAdd { .. } => "Add Layer",
            UndoEntry::LayerDelete { .. } => "Delete Layer",
            UndoEntry::LayerRename { .. } => "Rename Layer",
            UndoEntry::CanvasResize { .. } => "Resize Canvas",
            UndoEntry::MoveZ { .. } => "Z Order",
            UndoEntry::PivotInsert { .. } => "Insert Pivot",
            UndoEntry::PivotDelete { .. } => "Delete Pivot",
            UndoEntry::Sequence { label, .. } => label,
        }
    }
}

fn set_key(tree: &mut DocumentTree, node: NodeId, key: GeometryKey) {
    if let Some(crate::tree::Node::Stitch(stitch)) = tree.node_mut(node) {
        stitch.key = key;
    }
}

/// Reorders `children` so the `selected` ones move as `mode` says.
pub fn reorder(children: &[NodeId], selected: &[NodeId], mode: ZOrder) -> Vec<NodeId> {
    let is_selected = |id: &NodeId| selected.contains(id);
    let mut order = children.to_vec();
    match mode {
        ZOrder::Front => {
            let (mut picked, rest): (Vec<NodeId>, Vec<NodeId>) =
                order.into_iter().partition(is_selected);
            picked.extend(rest);
            order = picked;
        }
        ZOrder::Back => {
            let (picked, mut rest): (Vec<NodeId>, Vec<NodeId>) =
                order.into_iter().partition(is_selected);
            rest.extend(picked);
            order = rest;
        }
        ZOrder::FrontStep => {
            for i in 1..order.len() {
                if is_selected(&order[i]) && !is_selected(&order[i - 1]) {
                    order.swap(i, i - 1);
                }
            }
        }
        ZOrder::BackStep => {
            for i in (0..order.len().saturating_sub(1)).rev() {
                if is_selected(&order[i]) && !is_selected(&order[i + 1]) {
                    order.swap(i, i + 1);
                }
            }
        }
    }
    order
}
