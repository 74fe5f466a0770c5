use koginkit_core::{Color, GridCoord};
use koginkit_designer::{DocumentTree, ItemSpec, Node, NodeId, Pattern, ResizeAnchor, ZOrder};
use std::fmt::Write;

fn stitch(x: i32, y: i32, length: u32) -> ItemSpec {
    ItemSpec::Stitch {
        position: GridCoord::new(x, y),
        length,
        color: Color::BLACK,
    }
}

fn dump(tree: &DocumentTree, id: NodeId, depth: usize, out: &mut String) {
    let indent = " ".repeat(depth);
    match tree.node(id) {
        Some(Node::Group(group)) => {
            let _ = writeln!(out, "{}{:?} {:?} {:?}", indent, group.name, group.offset, group.layer);
            for child in &group.children {
                dump(tree, *child, depth + 1, out);
            }
        }
        Some(other) => {
            let _ = writeln!(out, "{}{:?}", indent, other);
        }
        None => {}
    }
}

/// Structure, positions, keys, active layer and canvas size.
fn snapshot(pattern: &Pattern) -> String {
    let tree = pattern.tree();
    let mut out = String::new();
    for layer in tree.layers() {
        dump(tree, *layer, 0, &mut out);
    }
    dump(tree, tree.pivot_layer(), 0, &mut out);
    let grid = &pattern.settings().view_grid;
    let _ = write!(
        out,
        "active={:?} size={}x{}",
        tree.active_layer(),
        grid.hori_count,
        grid.vert_count
    );
    out
}

/// Three loose stitches and a group of two, plus one pivot.
fn fixture() -> (Pattern, Vec<NodeId>) {
    let mut pattern = Pattern::new();
    let items = pattern.add_items(
        &[
            stitch(0, 0, 2),
            stitch(3, 0, 2),
            stitch(1, 2, 3),
            ItemSpec::Group {
                offset: GridCoord::new(5, 5),
                children: vec![stitch(0, 0, 1), stitch(1, 1, 1)],
            },
        ],
        None,
    );
    pattern.add_pivots(&[GridCoord::new(0, 0)]);
    pattern.clear_history();
    (pattern, items)
}

fn assert_inverse(pattern: &mut Pattern, mutate: impl FnOnce(&mut Pattern) -> bool) {
    let before = snapshot(pattern);
    assert!(mutate(pattern), "mutation should apply");
    let after = snapshot(pattern);
    assert_ne!(before, after);

    assert!(pattern.undo());
    assert_eq!(snapshot(pattern), before);
    assert!(pattern.redo());
    assert_eq!(snapshot(pattern), after);
    assert!(pattern.undo());
    assert_eq!(snapshot(pattern), before);
}

#[test]
fn test_insert_and_delete() {
    let (mut pattern, items) = fixture();
    assert_inverse(&mut pattern, |p| !p.add_items(&[stitch(9, 9, 4)], None).is_empty());
    assert_inverse(&mut pattern, |p| p.delete_items(&[items[1], items[3]]));
}

#[test]
fn test_move_and_move_to_layer() {
    let (mut pattern, items) = fixture();
    assert_inverse(&mut pattern, |p| p.move_items(&items, 2, -1));

    let first = pattern.tree().active_layer();
    let second = pattern.add_layer(None);
    pattern.set_active_layer(first);
    let group = items[3];
    let inner = pattern.tree().children(group)[1];
    assert_inverse(&mut pattern, |p| p.move_to_layer(&[items[0], inner], second));

    pattern.move_to_layer(&[inner], second);
    assert_eq!(pattern.tree().parent(inner), Some(second));
    assert_eq!(pattern.tree().absolute_position(inner), GridCoord::new(6, 6));
}

#[test]
fn test_group_and_ungroup() {
    let (mut pattern, items) = fixture();
    assert_inverse(&mut pattern, |p| p.group_items(&items[1..3]).is_some());
    assert_inverse(&mut pattern, |p| !p.ungroup_items(&[items[3]]).is_empty());
}

#[test]
fn test_ungroup_of_group_restores_layout() {
    let (mut pattern, items) = fixture();
    let before = snapshot(&pattern);
    let layer = pattern.tree().active_layer();

    let group = pattern.group_items(&items[1..3]).unwrap();
    assert_eq!(pattern.tree().position(group), GridCoord::new(1, 0));
    assert_eq!(pattern.tree().index_of(group), Some(1));
    assert_eq!(pattern.tree().position(items[1]), GridCoord::new(2, 0));

    let released = pattern.ungroup_items(&[group]);
    assert_eq!(released, vec![items[1], items[2]]);
    assert_eq!(pattern.tree().parent(items[1]), Some(layer));
    assert_eq!(snapshot(&pattern), before);
}

/// An outer group at (1, 1) holding a stitch and an inner group at (2, 2).
fn nested() -> (Pattern, NodeId, NodeId) {
    let mut pattern = Pattern::new();
    let outer = pattern.add_items(
        &[ItemSpec::Group {
            offset: GridCoord::new(1, 1),
            children: vec![
                ItemSpec::Group {
                    offset: GridCoord::new(2, 2),
                    children: vec![stitch(0, 0, 1), stitch(1, 0, 2)],
                },
                stitch(0, 0, 3),
            ],
        }],
        None,
    )[0];
    let inner = pattern.tree().children(outer)[0];
    pattern.clear_history();
    (pattern, outer, inner)
}

fn absolute_stitches(pattern: &Pattern) -> Vec<(i32, i32, u32)> {
    let mut placed: Vec<(i32, i32, u32)> = pattern
        .tree()
        .placed_stitches()
        .iter()
        .map(|s| (s.position.x, s.position.y, s.key.length))
        .collect();
    placed.sort();
    placed
}

#[test]
fn test_ungroup_nested_selection_keeps_stitches() {
    let (mut pattern, outer, inner) = nested();
    let layer = pattern.tree().active_layer();
    let before = absolute_stitches(&pattern);
    assert_eq!(before, vec![(1, 1, 3), (3, 3, 1), (4, 3, 2)]);

    let released = pattern.ungroup_items(&[outer, inner]);
    assert_eq!(released.len(), 3);
    assert!(released.iter().all(|id| pattern.tree().parent(*id) == Some(layer)));
    assert_eq!(pattern.tree().children(layer).len(), 3);
    assert_eq!(absolute_stitches(&pattern), before);
    assert_eq!(pattern.history().undo_count(), 1);
}

#[test]
fn test_ungroup_nested_selection_is_reversible() {
    let (mut pattern, outer, inner) = nested();
    assert_inverse(&mut pattern, |p| !p.ungroup_items(&[inner, outer]).is_empty());
    assert_eq!(pattern.tree().parent(inner), Some(outer));
}

#[test]
fn test_move_ignores_repeated_ids() {
    let (mut pattern, items) = fixture();
    assert!(pattern.move_items(&[items[0], items[1], items[0]], 1, 0));
    assert_eq!(pattern.tree().position(items[0]), GridCoord::new(1, 0));
    assert_eq!(pattern.tree().position(items[1]), GridCoord::new(4, 0));
    pattern.undo();
    assert_eq!(pattern.tree().position(items[0]), GridCoord::new(0, 0));
}

#[test]
fn test_color_replace_and_z_order() {
    let (mut pattern, items) = fixture();
    assert_inverse(&mut pattern, |p| p.set_color(&items, Color::rgb(200, 0, 0)) == 5);
    assert_inverse(&mut pattern, |p| {
        !p.replace_items(&[(items[0], stitch(0, 4, 6))]).is_empty()
    });
    assert_inverse(&mut pattern, |p| p.move_z(&[items[2]], ZOrder::Front));
    assert_inverse(&mut pattern, |p| p.move_z(&[items[0]], ZOrder::BackStep));
}

#[test]
fn test_layers_canvas_and_pivots() {
    let (mut pattern, _) = fixture();
    assert_inverse(&mut pattern, |p| {
        p.add_layer(Some("Border"));
        true
    });
    let second = pattern.add_layer(None);
    assert_inverse(&mut pattern, |p| p.remove_layer(second).is_some());
    assert_inverse(&mut pattern, |p| p.rename_layer(second, "Motif"));
    assert_inverse(&mut pattern, |p| p.resize_canvas(120, 60, ResizeAnchor::Center));
    assert_inverse(&mut pattern, |p| !p.add_pivots(&[GridCoord::new(4, 4)]).is_empty());
    let pivot = pattern.tree().pivots()[0].0;
    assert_inverse(&mut pattern, |p| p.delete_pivots(&[pivot]));
}

#[test]
fn test_merged_entries_undo_together() {
    let (mut pattern, items) = fixture();
    let before = snapshot(&pattern);
    pattern.move_items(&items, 1, 0);
    pattern.delete_items(&[items[0]]);
    assert!(pattern.merge_undo(2, "Move and delete"));
    assert_eq!(pattern.history().undo_label(), Some("Move and delete"));
    assert!(pattern.undo());
    assert_eq!(snapshot(&pattern), before);
    assert!(!pattern.history().can_undo());
}

#[test]
fn test_new_edit_clears_redo() {
    let (mut pattern, items) = fixture();
    pattern.move_items(&items, 1, 1);
    pattern.undo();
    assert!(pattern.history().can_redo());
    pattern.delete_items(&[items[0]]);
    assert!(!pattern.history().can_redo());
}
