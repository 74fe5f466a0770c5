use koginkit_core::{Color, GridCoord, RenderMode};
use koginkit_designer::{DocumentTree, ItemSpec, Node, NodeId, Pattern, ReadOptions, WriteOptions};
use proptest::prelude::*;

const PALETTE: [Color; 3] = [Color::BLACK, Color::rgb(255, 0, 0), Color::rgb(0, 0, 255)];

fn stitch(x: i32, y: i32, length: u32, color: Color) -> ItemSpec {
    ItemSpec::Stitch {
        position: GridCoord::new(x, y),
        length,
        color,
    }
}

/// Absolute position, length and color of every stitch, sorted.
fn stitch_set(pattern: &Pattern) -> Vec<(i32, i32, u32, String)> {
    let mut out: Vec<_> = pattern
        .tree()
        .placed_stitches()
        .into_iter()
        .map(|s| {
            (
                s.position.x,
                s.position.y,
                s.key.length,
                s.key.color.to_string(),
            )
        })
        .collect();
    out.sort();
    out
}

fn reload(pattern: &mut Pattern) -> Pattern {
    let svg = pattern.write(&WriteOptions::screen());
    assert!(!svg.is_empty());
    Pattern::from_svg(&svg).unwrap()
}

#[test]
fn test_layers_and_groups_survive() {
    let mut pattern = Pattern::new();
    let red = Color::rgb(200, 30, 30);
    pattern.add_items(
        &[
            stitch(0, 0, 2, Color::BLACK),
            ItemSpec::Group {
                offset: GridCoord::new(4, 6),
                children: vec![stitch(0, 0, 1, red), stitch(2, 1, 3, red)],
            },
        ],
        None,
    );
    let first = pattern.tree().active_layer();
    let second = pattern.add_layer(Some("Border"));
    pattern.add_items(&[stitch(10, 10, 5, Color::BLACK)], None);
    pattern.set_layer_visible(second, false);
    pattern.set_layer_locked(first, true);
    pattern.add_pivots(&[GridCoord::new(1, 1), GridCoord::new(9, 2)]);

    let loaded = reload(&mut pattern);
    let tree = loaded.tree();
    assert_eq!(stitch_set(&loaded), stitch_set(&pattern));
    assert_eq!(tree.layer_count(), 2);

    let layers = tree.layers();
    assert_eq!(tree.layer_name(layers[0]), Some("Layer 1"));
    assert_eq!(tree.layer_name(layers[1]), Some("Border"));
    assert!(tree.layer_state(layers[0]).unwrap().locked);
    assert!(!tree.layer_state(layers[1]).unwrap().visible);

    let group = tree.children(layers[0])[0];
    assert!(tree.is_group(group));
    assert_eq!(tree.position(group), GridCoord::new(4, 6));
    assert_eq!(tree.children(group).len(), 2);

    let pivots: Vec<GridCoord> = tree.pivots().iter().map(|(_, p)| p.position).collect();
    assert_eq!(pivots, vec![GridCoord::new(1, 1), GridCoord::new(9, 2)]);
    assert!(!loaded.is_modified());
    assert!(!loaded.history().can_undo());
}

#[test]
fn test_settings_and_metadata_survive() {
    let mut pattern = Pattern::new();
    pattern.add_items(&[stitch(0, 0, 3, Color::BLACK)], None);
    pattern.settings_mut().view_grid.grid_major_line_frequency = 8;
    pattern.set_render_mode(RenderMode::FillGrain, false);
    pattern.metadata_mut().title = "Hishi & co".to_string();
    pattern
        .metadata_mut()
        .extra
        .insert("origin".to_string(), serde_json::json!("museum"));

    let loaded = reload(&mut pattern);
    assert_eq!(loaded.settings().view_grid.grid_major_line_frequency, 8);
    assert_eq!(loaded.render_mode(), RenderMode::FillGrain);
    assert_eq!(loaded.metadata().title, "Hishi & co");
    assert_eq!(loaded.metadata().extra["origin"], "museum");
}

#[test]
fn test_keep_settings_ignores_option_block() {
    let mut source = Pattern::new();
    source.add_items(&[stitch(0, 0, 1, Color::BLACK)], None);
    source.settings_mut().view_grid.grid_major_line_frequency = 7;
    let svg = source.write(&WriteOptions::screen());

    let mut target = Pattern::new();
    let frequency = target.settings().view_grid.grid_major_line_frequency;
    target
        .read(&svg, &ReadOptions { keep_settings: true })
        .unwrap();
    assert_eq!(target.settings().view_grid.grid_major_line_frequency, frequency);
    assert_eq!(target.tree().stitch_count(), 1);
}

#[test]
fn test_second_write_is_identical() {
    let mut pattern = Pattern::new();
    pattern.add_items(
        &[
            stitch(3, 1, 2, Color::BLACK),
            stitch(0, 4, 4, Color::rgb(0, 90, 160)),
        ],
        None,
    );
    let svg = pattern.write(&WriteOptions::screen());
    let mut loaded = Pattern::from_svg(&svg).unwrap();
    *loaded.metadata_mut() = pattern.metadata().clone();
    assert_eq!(loaded.write(&WriteOptions::screen()), svg);
}

/// Order-independent form of an item: data blocks list groups before
/// stitch runs, so siblings are compared sorted.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum Shape {
    Stitch(i32, i32, u32, String),
    Group(i32, i32, Vec<Shape>),
}

fn shape(tree: &DocumentTree, id: NodeId) -> Option<Shape> {
    match tree.node(id)? {
        Node::Stitch(s) => Some(Shape::Stitch(
            s.position.x,
            s.position.y,
            s.key.length,
            s.key.color.to_string(),
        )),
        Node::Group(group) => {
            let mut children = shapes(tree, &group.children);
            children.sort();
            Some(Shape::Group(group.offset.x, group.offset.y, children))
        }
        Node::Pivot(_) => None,
    }
}

fn shapes(tree: &DocumentTree, ids: &[NodeId]) -> Vec<Shape> {
    ids.iter().filter_map(|id| shape(tree, *id)).collect()
}

/// Name, visibility, lock flag and sorted contents of every layer.
fn layer_layout(pattern: &Pattern) -> Vec<(Option<String>, bool, bool, Vec<Shape>)> {
    let tree = pattern.tree();
    tree.layers()
        .iter()
        .map(|layer| {
            let state = tree.layer_state(*layer).unwrap_or_default();
            let mut children = shapes(tree, tree.children(*layer));
            children.sort();
            (
                tree.layer_name(*layer).map(str::to_string),
                state.visible,
                state.locked,
                children,
            )
        })
        .collect()
}

fn pivot_positions(pattern: &Pattern) -> Vec<GridCoord> {
    pattern.tree().pivots().iter().map(|(_, p)| p.position).collect()
}

fn item_strategy() -> impl Strategy<Value = ItemSpec> {
    let leaf = (0i32..40, 0i32..30, 1u32..8, 0usize..PALETTE.len())
        .prop_map(|(x, y, length, color)| stitch(x, y, length, PALETTE[color]));
    leaf.prop_recursive(3, 24, 4, |inner| {
        (0i32..20, 0i32..20, prop::collection::vec(inner, 1..4)).prop_map(|(x, y, children)| {
            ItemSpec::Group {
                offset: GridCoord::new(x, y),
                children,
            }
        })
    })
}

/// Items plus visible and locked flags of one layer.
fn layer_strategy() -> impl Strategy<Value = (Vec<ItemSpec>, bool, bool)> {
    (prop::collection::vec(item_strategy(), 1..5), any::<bool>(), any::<bool>())
}

fn build(
    layers: &[(Vec<ItemSpec>, bool, bool)],
    pivots: &[(i32, i32)],
    mode: RenderMode,
    frequency: u32,
) -> Pattern {
    let mut pattern = Pattern::new();
    for (n, (items, visible, locked)) in layers.iter().enumerate() {
        let layer = if n == 0 {
            pattern.tree().active_layer()
        } else {
            pattern.add_layer(None)
        };
        pattern.add_items(items, Some(layer));
        pattern.set_layer_visible(layer, *visible);
        pattern.set_layer_locked(layer, *locked);
    }
    let pivots: Vec<GridCoord> = pivots.iter().map(|(x, y)| GridCoord::new(*x, *y)).collect();
    pattern.add_pivots(&pivots);
    pattern.settings_mut().view_grid.grid_major_line_frequency = frequency;
    pattern.set_render_mode(mode, false);
    pattern
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn test_random_stitches_round_trip(
        stitches in prop::collection::vec((0i32..60, 0i32..40, 1u32..8, 0u8..3), 1..30)
    ) {
        let mut pattern = Pattern::new();
        let specs: Vec<ItemSpec> = stitches
            .iter()
            .map(|(x, y, length, color)| stitch(*x, *y, *length, PALETTE[*color as usize]))
            .collect();
        pattern.add_items(&specs, None);

        let loaded = reload(&mut pattern);
        prop_assert_eq!(stitch_set(&loaded), stitch_set(&pattern));
        prop_assert_eq!(loaded.stitches().len(), pattern.stitches().len());
    }

    #[test]
    fn test_random_documents_round_trip(
        layers in prop::collection::vec(layer_strategy(), 1..4),
        pivots in prop::collection::vec((0i32..60, 0i32..40), 0..4),
        mode in prop::sample::select(RenderMode::ALL.to_vec()),
        frequency in 1u32..10,
    ) {
        let mut pattern = build(&layers, &pivots, mode, frequency);

        let loaded = reload(&mut pattern);
        prop_assert_eq!(layer_layout(&loaded), layer_layout(&pattern));
        prop_assert_eq!(pivot_positions(&loaded), pivot_positions(&pattern));
        prop_assert_eq!(stitch_set(&loaded), stitch_set(&pattern));
        prop_assert_eq!(loaded.settings(), pattern.settings());
        prop_assert_eq!(loaded.render_mode(), mode);
    }
}
