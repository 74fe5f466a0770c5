//! Document tree.
//!
//! Layers, groups, stitches and pivots live in an arena addressed by
//! [`NodeId`]. Removing a node only detaches it from its parent; the slot
//! stays allocated so undo entries can attach it again later.

use crate::stitch::GeometryKey;
use koginkit_core::{GridCoord, GridRect};

/// Name of the hidden layer that holds pivots.
pub const PIVOT_LAYER_NAME: &str = "__Pivot";

/// Stable handle of a node in a [`DocumentTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Flags carried by top-level groups acting as layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerState {
    pub visible: bool,
    pub locked: bool,
}

impl Default for LayerState {
    fn default() -> Self {
        Self {
            visible: true,
            locked: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Group {
    pub name: Option<String>,
    /// Offset relative to the parent, in grid cells. Always zero for layers.
    pub offset: GridCoord,
    pub children: Vec<NodeId>,
    /// Present when this group is a layer.
    pub layer: Option<LayerState>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stitch {
    pub position: GridCoord,
    pub key: GeometryKey,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pivot {
    pub position: GridCoord,
    pub index: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Group(Group),
    Stitch(Stitch),
    Pivot(Pivot),
}

impl Node {
    pub fn as_group(&self) -> Option<&Group> {
        match self {
            Node::Group(group) => Some(group),
            _ => None,
        }
    }

    pub fn as_stitch(&self) -> Option<&Stitch> {
        match self {
            Node::Stitch(stitch) => Some(stitch),
            _ => None,
        }
    }

    /// Stitch or pivot position, or group offset.
    pub fn position(&self) -> GridCoord {
        match self {
            Node::Group(group) => group.offset,
            Node::Stitch(stitch) => stitch.position,
            Node::Pivot(pivot) => pivot.position,
        }
    }

    fn set_position(&mut self, position: GridCoord) {
        match self {
            Node::Group(group) => group.offset = position,
            Node::Stitch(stitch) => stitch.position = position,
            Node::Pivot(pivot) => pivot.position = position,
        }
    }
}

#[derive(Debug, Clone)]
struct Slot {
    node: Node,
    parent: Option<NodeId>,
}

/// A stitch with its position resolved through every enclosing group.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedStitch {
    pub node: NodeId,
    pub layer: NodeId,
    pub position: GridCoord,
    pub key: GeometryKey,
    pub visible: bool,
}

/// Ordered user layers plus the pivot layer.
#[derive(Debug, Clone)]
pub struct DocumentTree {
    slots: Vec<Slot>,
    layers: Vec<NodeId>,
    pivot_layer: NodeId,
    active_layer: Option<NodeId>,
}

impl Default for DocumentTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentTree {
    /// A tree with a single empty layer named `Layer 1`.
    pub fn new() -> Self {
        let mut tree = Self::without_layers();
        let layer = tree.create_layer("Layer 1");
        tree.insert_layer(0, layer);
        tree.active_layer = Some(layer);
        tree
    }

    /// A tree with only the pivot layer; the caller must add a user layer.
    pub(crate) fn without_layers() -> Self {
        let pivot_layer = NodeId(0);
        let slots = vec![Slot {
            node: Node::Group(Group {
                name: Some(PIVOT_LAYER_NAME.to_string()),
                layer: Some(LayerState {
                    visible: false,
                    locked: false,
                }),
                ..Group::default()
            }),
            parent: None,
        }];
        Self {
            slots,
            layers: Vec::new(),
            pivot_layer,
            active_layer: None,
        }
    }

    // ----- nodes -----

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.slots.get(id.0).map(|slot| &slot.node)
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.slots.get_mut(id.0).map(|slot| &mut slot.node)
    }

    pub fn group(&self, id: NodeId) -> Option<&Group> {
        self.node(id).and_then(Node::as_group)
    }

    fn group_mut(&mut self, id: NodeId) -> Option<&mut Group> {
        match self.node_mut(id) {
            Some(Node::Group(group)) => Some(group),
            _ => None,
        }
    }

    pub fn stitch(&self, id: NodeId) -> Option<&Stitch> {
        self.node(id).and_then(Node::as_stitch)
    }

    pub fn is_group(&self, id: NodeId) -> bool {
        self.group(id).is_some()
    }

    pub fn is_stitch(&self, id: NodeId) -> bool {
        self.stitch(id).is_some()
    }

    pub fn is_pivot(&self, id: NodeId) -> bool {
        matches!(self.node(id), Some(Node::Pivot(_)))
    }

    pub fn is_layer(&self, id: NodeId) -> bool {
        self.group(id).map(|g| g.layer.is_some()).unwrap_or(false)
    }

    /// Allocates a detached node.
    pub fn create(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.slots.len());
        self.slots.push(Slot { node, parent: None });
        id
    }

    pub fn create_stitch(&mut self, position: GridCoord, key: GeometryKey) -> NodeId {
        self.create(Node::Stitch(Stitch { position, key }))
    }

    pub fn create_group(&mut self, offset: GridCoord) -> NodeId {
        self.create(Node::Group(Group {
            offset,
            ..Group::default()
        }))
    }

    pub fn create_pivot(&mut self, position: GridCoord, index: u32) -> NodeId {
        self.create(Node::Pivot(Pivot { position, index }))
    }

    pub fn create_layer(&mut self, name: &str) -> NodeId {
        self.create(Node::Group(Group {
            name: Some(name.to_string()),
            layer: Some(LayerState::default()),
            ..Group::default()
        }))
    }

    // ----- structure -----

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.slots.get(id.0).and_then(|slot| slot.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.group(id).map(|g| g.children.as_slice()).unwrap_or(&[])
    }

    /// Position of a node within its parent's children.
    pub fn index_of(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|c| *c == id)
    }

    pub fn is_attached(&self, id: NodeId) -> bool {
        self.parent(id).is_some()
    }

    /// Inserts `child` into `parent` at `index` (clamped to the end).
    pub fn attach(&mut self, parent: NodeId, index: usize, child: NodeId) {
        if self.parent(child).is_some() {
            self.detach(child);
        }
        let Some(group) = self.group_mut(parent) else {
            tracing::warn!("Cannot attach {:?} to non-group {:?}", child, parent);
            return;
        };
        let index = index.min(group.children.len());
        group.children.insert(index, child);
        if let Some(slot) = self.slots.get_mut(child.0) {
            slot.parent = Some(parent);
        }
    }

    pub fn append(&mut self, parent: NodeId, child: NodeId) {
        self.attach(parent, usize::MAX, child);
    }

    /// Removes `child` from its parent, returning where it was.
    pub fn detach(&mut self, child: NodeId) -> Option<(NodeId, usize)> {
        let parent = self.parent(child)?;
        let group = self.group_mut(parent)?;
        let index = group.children.iter().position(|c| *c == child)?;
        group.children.remove(index);
        if let Some(slot) = self.slots.get_mut(child.0) {
            slot.parent = None;
        }
        Some((parent, index))
    }

    /// Replaces the child order of `parent`. `order` must be a permutation
    /// of the current children.
    pub(crate) fn reorder_children(&mut self, parent: NodeId, order: Vec<NodeId>) {
        if let Some(group) = self.group_mut(parent) {
            debug_assert_eq!(group.children.len(), order.len());
            group.children = order;
        }
    }

    // ----- coordinates -----

    pub fn position(&self, id: NodeId) -> GridCoord {
        self.node(id).map(Node::position).unwrap_or_default()
    }

    pub fn set_position(&mut self, id: NodeId, position: GridCoord) {
        if let Some(node) = self.node_mut(id) {
            node.set_position(position);
        }
    }

    pub fn translate(&mut self, id: NodeId, dx: i32, dy: i32) {
        let position = self.position(id).offset(dx, dy);
        self.set_position(id, position);
    }

    /// Accumulated offset of every group enclosing `id`.
    pub fn parent_offset(&self, id: NodeId) -> GridCoord {
        let mut offset = GridCoord::ORIGIN;
        let mut current = self.parent(id);
        while let Some(parent) = current {
            if let Some(group) = self.group(parent) {
                if group.layer.is_none() {
                    offset = offset + group.offset;
                }
            }
            current = self.parent(parent);
        }
        offset
    }

    /// Offset of the coordinate system of a container's children.
    pub fn container_offset(&self, container: NodeId) -> GridCoord {
        match self.group(container) {
            Some(group) if group.layer.is_none() => group.offset + self.parent_offset(container),
            _ => GridCoord::ORIGIN,
        }
    }

    pub fn absolute_position(&self, id: NodeId) -> GridCoord {
        self.position(id) + self.parent_offset(id)
    }

    // ----- bounds -----

    /// Box of a group's contents in its own coordinates. Pivots are ignored
    /// and an empty group yields the unit box.
    pub fn group_bounds(&self, id: NodeId) -> GridRect {
        let mut rect: Option<GridRect> = None;
        for child in self.children(id) {
            let Some(child_rect) = self.item_bounds(*child) else {
                continue;
            };
            rect = Some(match rect {
                Some(r) => r.union(&child_rect),
                None => child_rect,
            });
        }
        rect.unwrap_or_else(GridRect::unit)
    }

    /// Box of an item in its parent's coordinates.
    pub fn item_bounds(&self, id: NodeId) -> Option<GridRect> {
        match self.node(id)? {
            Node::Stitch(stitch) => Some(GridRect::stitch(stitch.position, stitch.key.length)),
            Node::Group(group) => {
                let rect = self.group_bounds(id);
                Some(rect.translate(group.offset.x, group.offset.y))
            }
            Node::Pivot(_) => None,
        }
    }

    pub fn has_stitches(&self, id: NodeId) -> bool {
        match self.node(id) {
            Some(Node::Stitch(_)) => true,
            Some(Node::Group(group)) => group.children.iter().any(|c| self.has_stitches(*c)),
            _ => false,
        }
    }

    /// Union of every user layer holding at least one stitch, or `None` for
    /// a document without stitches.
    pub fn content_bounds(&self) -> Option<GridRect> {
        self.layers
            .iter()
            .filter(|layer| self.has_stitches(**layer))
            .map(|layer| self.group_bounds(*layer))
            .reduce(|a, b| a.union(&b))
    }

    // ----- layers -----

    pub fn layers(&self) -> &[NodeId] {
        &self.layers
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn layer_index(&self, layer: NodeId) -> Option<usize> {
        self.layers.iter().position(|l| *l == layer)
    }

    pub fn layer_by_name(&self, name: &str) -> Option<NodeId> {
        self.layers
            .iter()
            .copied()
            .find(|l| self.layer_name(*l) == Some(name))
    }

    pub fn layer_name(&self, layer: NodeId) -> Option<&str> {
        self.group(layer).and_then(|g| g.name.as_deref())
    }

    pub(crate) fn set_layer_name(&mut self, layer: NodeId, name: &str) {
        if let Some(group) = self.group_mut(layer) {
            group.name = Some(name.to_string());
        }
    }

    pub fn layer_state(&self, layer: NodeId) -> Option<LayerState> {
        self.group(layer).and_then(|g| g.layer)
    }

    pub(crate) fn set_layer_state(&mut self, layer: NodeId, state: LayerState) {
        if let Some(group) = self.group_mut(layer) {
            if group.layer.is_some() {
                group.layer = Some(state);
            }
        }
    }

    /// First unused `Layer <n>` name.
    pub fn next_layer_name(&self) -> String {
        (1..)
            .map(|n| format!("Layer {}", n))
            .find(|name| self.layer_by_name(name).is_none())
            .unwrap_or_else(|| "Layer".to_string())
    }

    pub(crate) fn insert_layer(&mut self, index: usize, layer: NodeId) {
        let index = index.min(self.layers.len());
        self.layers.insert(index, layer);
        if self.active_layer.is_none() {
            self.active_layer = Some(layer);
        }
    }

    pub(crate) fn remove_layer(&mut self, layer: NodeId) -> Option<usize> {
        let index = self.layer_index(layer)?;
        self.layers.remove(index);
        Some(index)
    }

    /// The layer receiving new items.
    pub fn active_layer(&self) -> NodeId {
        self.active_layer
            .filter(|l| self.layers.contains(l))
            .or_else(|| self.layers.first().copied())
            .unwrap_or(self.pivot_layer)
    }

    pub fn set_active_layer(&mut self, layer: NodeId) -> bool {
        if !self.layers.contains(&layer) {
            return false;
        }
        self.active_layer = Some(layer);
        true
    }

    /// The user layer containing `id`, if any.
    pub fn layer_of(&self, id: NodeId) -> Option<NodeId> {
        let mut current = Some(id);
        while let Some(node) = current {
            if self.layers.contains(&node) {
                return Some(node);
            }
            current = self.parent(node);
        }
        None
    }

    // ----- pivots -----

    pub fn pivot_layer(&self) -> NodeId {
        self.pivot_layer
    }

    /// Pivots ordered by their index.
    pub fn pivots(&self) -> Vec<(NodeId, Pivot)> {
        let mut pivots: Vec<(NodeId, Pivot)> = self
            .children(self.pivot_layer)
            .iter()
            .filter_map(|id| match self.node(*id) {
                Some(Node::Pivot(pivot)) => Some((*id, *pivot)),
                _ => None,
            })
            .collect();
        pivots.sort_by_key(|(_, pivot)| pivot.index);
        pivots
    }

    /// Index for a newly added pivot.
    pub fn next_pivot_index(&self) -> u32 {
        self.pivots()
            .iter()
            .map(|(_, p)| p.index)
            .max()
            .unwrap_or(0)
            + 1
    }

    // ----- traversal -----

    /// Every stitch under the user layers with absolute positions, in
    /// paint order.
    pub fn placed_stitches(&self) -> Vec<PlacedStitch> {
        let mut placed = Vec::new();
        for layer in &self.layers {
            let visible = self.layer_state(*layer).map(|s| s.visible).unwrap_or(true);
            self.collect_stitches(*layer, *layer, GridCoord::ORIGIN, visible, &mut placed);
        }
        placed
    }

    fn collect_stitches(
        &self,
        container: NodeId,
        layer: NodeId,
        offset: GridCoord,
        visible: bool,
        out: &mut Vec<PlacedStitch>,
    ) {
        for child in self.children(container) {
            match self.node(*child) {
                Some(Node::Stitch(stitch)) => out.push(PlacedStitch {
                    node: *child,
                    layer,
                    position: stitch.position + offset,
                    key: stitch.key,
                    visible,
                }),
                Some(Node::Group(group)) => {
                    let inner = offset + group.offset;
                    self.collect_stitches(*child, layer, inner, visible, out);
                }
                _ => {}
            }
        }
    }

    /// Every stitch node below `id`, including `id` itself.
    pub fn stitches_under(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(node) = stack.pop() {
            match self.node(node) {
                Some(Node::Stitch(_)) => out.push(node),
                Some(Node::Group(group)) => stack.extend(group.children.iter().rev()),
                _ => {}
            }
        }
        out
    }

    pub fn stitch_count(&self) -> usize {
        self.layers.iter().map(|l| self.stitches_under(*l).len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use koginkit_core::Color;

    fn key(length: u32) -> GeometryKey {
        GeometryKey::new(length, Color::BLACK)
    }

    #[test]
    fn test_new_tree_has_one_layer() {
        let tree = DocumentTree::new();
        assert_eq!(tree.layer_count(), 1);
        assert_eq!(tree.layer_name(tree.active_layer()), Some("Layer 1"));
        assert!(!tree.layers().contains(&tree.pivot_layer()));
        assert!(tree.content_bounds().is_none());
    }

    #[test]
    fn test_attach_detach() {
        let mut tree = DocumentTree::new();
        let layer = tree.active_layer();
        let a = tree.create_stitch(GridCoord::new(0, 0), key(1));
        let b = tree.create_stitch(GridCoord::new(1, 0), key(1));
        tree.append(layer, a);
        tree.attach(layer, 0, b);
        assert_eq!(tree.children(layer), &[b, a]);
        assert_eq!(tree.detach(b), Some((layer, 0)));
        assert_eq!(tree.index_of(a), Some(0));
        assert!(tree.parent(b).is_none());
    }

    #[test]
    fn test_nested_offsets_and_bounds() {
        let mut tree = DocumentTree::new();
        let layer = tree.active_layer();
        let outer = tree.create_group(GridCoord::new(10, 5));
        let inner = tree.create_group(GridCoord::new(2, 1));
        let stitch = tree.create_stitch(GridCoord::new(1, 0), key(3));
        tree.append(layer, outer);
        tree.append(outer, inner);
        tree.append(inner, stitch);

        assert_eq!(tree.parent_offset(stitch), GridCoord::new(12, 6));
        assert_eq!(tree.absolute_position(stitch), GridCoord::new(13, 6));
        assert_eq!(tree.content_bounds(), Some(GridRect::new(13, 6, 3, 1)));

        let placed = tree.placed_stitches();
        assert_eq!(placed.len(), 1);
        assert_eq!(placed[0].position, GridCoord::new(13, 6));
    }

    #[test]
    fn test_empty_group_is_unit_box() {
        let mut tree = DocumentTree::new();
        let layer = tree.active_layer();
        let group = tree.create_group(GridCoord::new(4, 4));
        tree.append(layer, group);
        assert_eq!(tree.group_bounds(group), GridRect::unit());
        assert_eq!(tree.item_bounds(group), Some(GridRect::new(4, 4, 1, 1)));
        assert!(tree.content_bounds().is_none());
    }

    #[test]
    fn test_next_names_and_pivot_indices() {
        let mut tree = DocumentTree::new();
        assert_eq!(tree.next_layer_name(), "Layer 2");
        assert_eq!(tree.next_pivot_index(), 1);
        let pivot_layer = tree.pivot_layer();
        let p = tree.create_pivot(GridCoord::new(0, 0), 4);
        tree.append(pivot_layer, p);
        assert_eq!(tree.next_pivot_index(), 5);
    }
}
