use koginkit_core::{Color, GridCoord, GridRect};
use koginkit_designer::codec::{DataNode, PatternData, StitchRefs};
use koginkit_designer::{read_template, CodecError, ItemSpec, Pattern, ReadOptions, WriteOptions};

fn stitch(x: i32, y: i32, length: u32) -> ItemSpec {
    ItemSpec::Stitch {
        position: GridCoord::new(x, y),
        length,
        color: Color::BLACK,
    }
}

fn block<'a>(svg: &'a str, id: &str) -> &'a str {
    let open = format!("<foreignObject id=\"{}\" visibility=\"hidden\">\n", id);
    let start = svg.find(&open).expect("block present") + open.len();
    let end = svg[start..].find("</foreignObject>").expect("block closed");
    &svg[start..start + end]
}

#[test]
fn test_data_block_layout() {
    let mut pattern = Pattern::new();
    pattern.add_items(&[stitch(0, 0, 2), stitch(3, 0, 2)], None);
    let svg = pattern.write(&WriteOptions::screen());

    let data: PatternData = serde_json::from_str(block(&svg, "kogin-data")).unwrap();
    assert!(data.is_kogin());
    assert_eq!(data.bbox, Some([0, 0, 5, 1]));
    assert_eq!(data.pivots, Some(Vec::new()));

    let defs = data.defs.unwrap();
    assert_eq!(defs.single.len(), 1);
    assert_eq!(defs.single[0].length, 2);
    assert_eq!(defs.single[0].colors, vec!["#000000".to_string()]);

    let layers = data.data.unwrap();
    let DataNode::Group(layer) = &layers[0] else {
        panic!("top level must be a layer");
    };
    assert!(layer.layer);
    assert_eq!(layer.name.as_deref(), Some("Layer 1"));
    assert_eq!(
        layer.children,
        vec![DataNode::Stitches(StitchRefs {
            reference: "2-000000".to_string(),
            coords: vec![[0, 0], [3, 0]],
        })]
    );
}

#[test]
fn test_svg_shell() {
    let mut pattern = Pattern::new();
    pattern.add_items(&[stitch(1, 1, 3)], None);
    let svg = pattern.write(&WriteOptions::screen());
    assert!(svg.starts_with("<svg xmlns=\"http://www.w3.org/2000/svg\""));
    assert!(svg.contains("<defs>\n"));
    assert!(svg.contains("href=\"#3-000000\""));
    assert!(svg.ends_with("</svg>\n"));

    let options: serde_json::Value = serde_json::from_str(block(&svg, "kogin-option")).unwrap();
    assert!(options.is_object());
    let metadata: serde_json::Value = serde_json::from_str(block(&svg, "kogin-metadata")).unwrap();
    assert!(metadata.get("title").is_some());
}

#[test]
fn test_empty_pattern_exports_nothing() {
    let mut pattern = Pattern::new();
    assert_eq!(pattern.write(&WriteOptions::screen()), "");
    assert_eq!(pattern.write(&WriteOptions::print()), "");
}

#[test]
fn test_no_data_omits_blocks() {
    let mut pattern = Pattern::new();
    pattern.add_items(&[stitch(0, 0, 1)], None);
    let svg = pattern.write(&WriteOptions::screen().with_no_data(true));
    assert!(!svg.contains("kogin-data"));
    assert!(!svg.contains("kogin-option"));
}

#[test]
fn test_malformed_input_leaves_document() {
    let mut pattern = Pattern::new();
    let ids = pattern.add_items(&[stitch(0, 0, 1)], None);

    let err = pattern
        .read("<svg><g></svg>", &ReadOptions::default())
        .unwrap_err();
    assert!(matches!(err, CodecError::Xml(_)));

    let err = pattern
        .read(
            "<svg><foreignObject id=\"kogin-data\">[1,</foreignObject></svg>",
            &ReadOptions::default(),
        )
        .unwrap_err();
    assert!(matches!(err, CodecError::Json(_)));

    assert_eq!(pattern.tree().stitch_count(), 1);
    assert!(pattern.tree().is_attached(ids[0]));
}

#[test]
fn test_plain_svg_reads_as_empty_document() {
    let pattern = Pattern::from_svg("<svg xmlns=\"http://www.w3.org/2000/svg\"><rect/></svg>").unwrap();
    assert_eq!(pattern.tree().layer_count(), 1);
    assert_eq!(pattern.tree().stitch_count(), 0);
}

#[test]
fn test_template_from_written_file() {
    let mut pattern = Pattern::new();
    pattern.add_items(&[stitch(2, 2, 3), stitch(4, 3, 1)], None);
    pattern.add_pivots(&[GridCoord::new(2, 2)]);
    let svg = pattern.write(&WriteOptions::screen());

    let template = read_template(&svg).unwrap();
    assert!(template.valid);
    assert!(!template.no_pivots);
    assert_eq!(template.bbox, GridRect::new(2, 2, 3, 2));
    assert_eq!(template.pivots.len(), 1);
    assert_eq!((template.pivots[0].x, template.pivots[0].y), (2, 2));
    assert_eq!(template.metadata.as_ref().map(|m| m.title.as_str()), Some(""));
}
