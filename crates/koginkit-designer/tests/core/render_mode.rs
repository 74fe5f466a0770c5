use koginkit_core::{Color, GridCoord, LineCap, RenderMode};
use koginkit_designer::{GeometryKey, ItemSpec, Pattern, StitchGeometry};
use std::collections::HashSet;

fn pattern_with_stitches() -> Pattern {
    let mut pattern = Pattern::new();
    let specs: Vec<ItemSpec> = [(0, 0, 1), (2, 0, 3), (0, 1, 5)]
        .into_iter()
        .map(|(x, y, length)| ItemSpec::Stitch {
            position: GridCoord::new(x, y),
            length,
            color: Color::rgb(0x20, 0x40, 0x80),
        })
        .collect();
    pattern.add_items(&specs, None);
    pattern
}

fn keys(pattern: &Pattern) -> HashSet<GeometryKey> {
    pattern.stitches().keys().copied().collect()
}

#[test]
fn test_same_mode_without_force_is_noop() {
    let mut pattern = pattern_with_stitches();
    let before = keys(&pattern);
    assert!(!pattern.set_render_mode(pattern.render_mode(), false));
    assert_eq!(keys(&pattern), before);
}

#[test]
fn test_mode_switch_regenerates_every_definition() {
    let mut pattern = pattern_with_stitches();
    let before = keys(&pattern);

    for mode in RenderMode::ALL {
        pattern.set_render_mode(mode, true);
        assert_eq!(keys(&pattern), before);
        assert_eq!(pattern.calculator().mode(), mode);
        for key in &before {
            let definition = pattern.stitches().definition(key).unwrap();
            let expected = pattern.calculator().calc(0, 0, key.length, true);
            assert_eq!((definition.start, definition.end), expected);
            assert_eq!(definition.line_cap, pattern.calculator().line_cap());
        }
    }
}

#[test]
fn test_line_caps_per_mode() {
    let mut pattern = pattern_with_stitches();
    pattern.set_render_mode(RenderMode::LineGrain, false);
    assert_eq!(pattern.calculator().line_cap(), LineCap::Butt);
    pattern.set_render_mode(RenderMode::OverWarp, false);
    assert_eq!(pattern.calculator().line_cap(), LineCap::Round);
}

#[test]
fn test_fill_grain_stroke_fills_cell() {
    let mut pattern = pattern_with_stitches();
    pattern.set_render_mode(RenderMode::FillGrain, false);
    let grid = &pattern.settings().view_grid;
    assert_eq!(
        pattern.calculator().stroke_width(),
        grid.grid_height - grid.grid_line_width
    );
}
