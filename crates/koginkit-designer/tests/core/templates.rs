use koginkit_core::{Color, GridCoord, GridRect};
use koginkit_designer::template::calculate_bbox;
use koginkit_designer::{CrossKind, ItemSpec, Pattern, Template, TemplateKind};

#[test]
fn test_insert_generated_template_as_group() {
    let mut pattern = Pattern::new();
    let template = Template::modoko(5, 1).unwrap();
    let origin = template.origin_for_pivot(0, GridCoord::new(10, 10));
    let red = Color::rgb(200, 0, 0);

    let ids = pattern.insert_template(&template, origin, red);
    assert_eq!(ids.len(), 1);
    assert!(pattern.tree().is_group(ids[0]));
    assert_eq!(pattern.tree().stitch_count(), template.defs.len());
    for stitch in pattern.tree().placed_stitches() {
        assert_eq!(stitch.key.color, red);
    }

    assert!(pattern.undo());
    assert_eq!(pattern.tree().stitch_count(), 0);
}

#[test]
fn test_single_template_places_loose_stitch() {
    let mut pattern = Pattern::new();
    let template = Template::single(3).unwrap();
    let origin = template.origin_for_pivot(1, GridCoord::new(5, 2));
    assert_eq!(origin, GridCoord::new(3, 2));

    let ids = pattern.insert_template(&template, origin, Color::BLACK);
    assert_eq!(ids.len(), 1);
    assert_eq!(pattern.tree().position(ids[0]), GridCoord::new(3, 2));
    assert_eq!(pattern.tree().stitch(ids[0]).unwrap().key.length, 3);
}

#[test]
fn test_copy_template_keeps_colors_and_layout() {
    let mut pattern = Pattern::new();
    let blue = Color::rgb(0, 0, 200);
    let ids = pattern.add_items(
        &[
            ItemSpec::Stitch {
                position: GridCoord::new(2, 1),
                length: 2,
                color: blue,
            },
            ItemSpec::Stitch {
                position: GridCoord::new(4, 3),
                length: 1,
                color: Color::BLACK,
            },
        ],
        None,
    );

    let template = Template::from_items(pattern.tree(), &ids).unwrap();
    assert_eq!(template.kind, TemplateKind::Copy);
    assert_eq!(template.bbox, GridRect::new(2, 1, 3, 3));
    assert_eq!(template.pivots[0].x, 2);
    assert_eq!(template.pivots[0].y, 1);

    let placed = pattern.insert_template(&template, GridCoord::new(10, 0), Color::rgb(255, 0, 0));
    let colors: Vec<Color> = placed
        .iter()
        .filter_map(|id| pattern.tree().stitch(*id))
        .map(|s| s.key.color)
        .collect();
    assert_eq!(colors, vec![blue, Color::BLACK]);
    assert_eq!(pattern.tree().position(placed[0]), GridCoord::new(12, 1));
}

#[test]
fn test_copy_of_one_stitch_is_single() {
    let mut pattern = Pattern::new();
    let ids = pattern.add_items(
        &[ItemSpec::Stitch {
            position: GridCoord::new(7, 7),
            length: 4,
            color: Color::BLACK,
        }],
        None,
    );
    let template = Template::from_items(pattern.tree(), &ids).unwrap();
    assert!(template.is_single());
    assert_eq!(template.single_length(), Some(4));
    assert!(Template::from_items(pattern.tree(), &[]).is_none());
}

#[test]
fn test_mirrors_flip_pivots() {
    let template = Template::single(3).unwrap();
    let mirrored = template.horizontal_mirror();
    assert_eq!(mirrored.pivots[0].x, -1);
    assert!(mirrored.pivots[0].right);
    assert_eq!(mirrored.pivots[1].x, -3);
    assert!(!mirrored.pivots[1].right);
    assert_eq!(mirrored.bbox, GridRect::new(-3, 0, 3, 1));

    let cross = Template::cross(CrossKind::V, 3, 1).unwrap();
    let flipped = cross.vertical_mirror();
    for (before, after) in cross.pivots.iter().zip(&flipped.pivots) {
        assert_eq!(after.x, before.x);
        assert_eq!(after.y, 2 * cross.bbox.y - before.y);
    }
    assert_eq!(calculate_bbox(&flipped.defs, 0, 0), flipped.bbox);
}
