use super::Pattern;
use crate::commands::UndoEntry;
use crate::tree::NodeId;

impl Pattern {
    /// Adds a layer after the active one and activates it. Without a name
    /// the first free `Layer <n>` is used.
    pub fn add_layer(&mut self, name: Option<&str>) -> NodeId {
        let name = match name {
            Some(name) => name.to_string(),
            None => self.tree.next_layer_name(),
        };
        let previous_active = self.tree.active_layer();
        let index = self
            .tree
            .layer_index(previous_active)
            .map(|i| i + 1)
            .unwrap_or(self.tree.layer_count());
        let layer = self.tree.create_layer(&name);
        self.push(UndoEntry::LayerAdd {
            layer,
            index,
            previous_active,
        });
        layer
    }

    /// Removes a layer with its contents. The last remaining layer cannot be
    /// removed. Returns the former index.
    pub fn remove_layer(&mut self, layer: NodeId) -> Option<usize> {
        let index = self.tree.layer_index(layer)?;
        if self.tree.layer_count() <= 1 {
            tracing::warn!("Refusing to remove the last layer");
            return None;
        }
        let active_before = self.tree.active_layer();
        let active_after = if active_before == layer {
            let layers = self.tree.layers();
            layers
                .get(index + 1)
                .or_else(|| index.checked_sub(1).and_then(|i| layers.get(i)))
                .copied()
                .unwrap_or(active_before)
        } else {
            active_before
        };
        self.push(UndoEntry::LayerDelete {
            layer,
            index,
            active_before,
            active_after,
        });
        Some(index)
    }

    pub fn rename_layer(&mut self, layer: NodeId, name: &str) -> bool {
        let Some(old_name) = self.tree.layer_name(layer).map(str::to_string) else {
            return false;
        };
        if self.tree.layer_index(layer).is_none() || old_name == name {
            return false;
        }
        self.push(UndoEntry::LayerRename {
            layer,
            old_name,
            new_name: name.to_string(),
        });
        true
    }

    pub fn set_active_layer(&mut self, layer: NodeId) -> bool {
        self.tree.set_active_layer(layer)
    }

    pub fn set_layer_visible(&mut self, layer: NodeId, visible: bool) -> bool {
        self.update_layer_state(layer, |state| state.visible = visible)
    }

    pub fn set_layer_locked(&mut self, layer: NodeId, locked: bool) -> bool {
        self.update_layer_state(layer, |state| state.locked = locked)
    }

    fn update_layer_state(&mut self, layer: NodeId, update: impl FnOnce(&mut crate::tree::LayerState)) -> bool {
        if self.tree.layer_index(layer).is_none() {
            return false;
        }
        let Some(mut state) = self.tree.layer_state(layer) else {
            return false;
        };
        update(&mut state);
        self.tree.set_layer_state(layer, state);
        self.set_modified(true);
        true
    }
}
