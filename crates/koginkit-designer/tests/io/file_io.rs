use koginkit_core::{Color, GridCoord};
use koginkit_designer::{ItemSpec, Pattern};
use tempfile::TempDir;

fn sample() -> Pattern {
    let mut pattern = Pattern::new();
    pattern.add_items(
        &[
            ItemSpec::Stitch {
                position: GridCoord::new(0, 0),
                length: 3,
                color: Color::BLACK,
            },
            ItemSpec::Stitch {
                position: GridCoord::new(1, 1),
                length: 1,
                color: Color::rgb(180, 0, 0),
            },
        ],
        None,
    );
    pattern
}

#[test]
fn test_save_then_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("hishi.svg");
    let mut pattern = sample();
    pattern.save_to_file(&path).unwrap();
    assert!(path.exists());

    let mut loaded = Pattern::new();
    loaded.load_from_file(&path).unwrap();
    assert_eq!(loaded.tree().stitch_count(), 2);
    assert_eq!(loaded.file_name(), Some("hishi.svg"));
    assert!(!loaded.is_modified());
}

#[test]
fn test_load_invalid_file_reports_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.svg");
    std::fs::write(&path, "<svg><g></svg>").unwrap();

    let mut pattern = sample();
    let err = pattern.load_from_file(&path).unwrap_err();
    assert!(err.to_string().contains("broken.svg"));
    assert_eq!(pattern.tree().stitch_count(), 2);
}
