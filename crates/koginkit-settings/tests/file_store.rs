use koginkit_core::RenderMode;
use koginkit_settings::{DocumentSettings, JsonFileStore, KeyValueStore, SettingsManager};
use tempfile::TempDir;

#[test]
fn test_missing_file_opens_empty() {
    let dir = TempDir::new().unwrap();
    let store = JsonFileStore::open(dir.path().join("settings.json")).unwrap();
    assert!(store.get_item("view.viewMode").is_none());
}

#[test]
fn test_document_settings_survive_save() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("settings.json");

    let mut settings = DocumentSettings::default();
    settings.view.view_mode = RenderMode::OverGrain;
    settings.print_grid.grid_line_width = 0.3;
    settings.pdf.page_size = "B5".to_string();
    settings.bounds.use_output_bounds = true;

    let mut manager = SettingsManager::new(JsonFileStore::open(&path).unwrap());
    manager.store_document_settings(&settings);
    manager.storage().save().unwrap();

    let reopened = SettingsManager::new(JsonFileStore::open(&path).unwrap());
    assert_eq!(reopened.load_document_settings(), settings);
}

#[test]
fn test_corrupted_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("settings.json");
    std::fs::write(&path, "[1, 2, 3]").unwrap();
    assert!(JsonFileStore::open(&path).is_err());

    std::fs::write(&path, "{not json").unwrap();
    assert!(JsonFileStore::open(&path).is_err());
}
