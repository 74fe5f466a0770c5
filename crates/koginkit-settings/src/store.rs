//! Settings persistence.
//!
//! Settings are kept as flat string pairs (`"<prefix><key>" -> value`), so a
//! browser-style key/value store and a JSON file behave the same way. Values
//! are converted back to the type of the matching default when loaded.

use crate::error::{Result, SettingsError};
use crate::merge::merge_with_defaults;
use crate::metadata::Metadata;
use crate::options::{BoundsOption, DocumentSettings, GridOption, OutputOption, PdfOption, ViewOption};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Settings file name inside the configuration directory.
pub const SETTINGS_FILE_NAME: &str = "settings.json";

const PERMISSION_PREFIX: &str = "permission.";
const PERMISSION_KEY: &str = "agreed";

/// A flat string store.
pub trait KeyValueStore {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&mut self, key: &str, value: String);
    fn clear(&mut self);
}

/// In-memory store, used for tests and for sessions that never persist.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    items: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.get(key).cloned()
    }

    fn set_item(&mut self, key: &str, value: String) {
        self.items.insert(key.to_string(), value);
    }

    fn clear(&mut self) {
        self.items.clear();
    }
}

/// Store backed by a JSON object on disk.
///
/// Changes stay in memory until [`JsonFileStore::save`] is called.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    items: Map<String, Value>,
}

impl JsonFileStore {
    /// Default location: `<config dir>/koginkit/settings.json`.
    pub fn default_path() -> Result<PathBuf> {
        let dir = dirs::config_dir().ok_or(SettingsError::ConfigDirectory)?;
        Ok(dir.join("koginkit").join(SETTINGS_FILE_NAME))
    }

    /// Opens the store, starting empty when the file does not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let items = if path.exists() {
            let content = fs::read_to_string(&path).map_err(|source| SettingsError::File {
                path: path.clone(),
                source,
            })?;
            if content.trim().is_empty() {
                Map::new()
            } else {
                match serde_json::from_str::<Value>(&content)? {
                    Value::Object(map) => map,
                    other => {
                        return Err(SettingsError::Corrupted(format!(
                            "expected an object, found {}",
                            other
                        )))
                    }
                }
            }
        } else {
            Map::new()
        };
        tracing::debug!("Opened settings store {} ({} keys)", path.display(), items.len());
        Ok(Self { path, items })
    }

    pub fn open_default() -> Result<Self> {
        Self::open(Self::default_path()?)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes all items, creating the parent directory when needed.
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| SettingsError::File {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let content = serde_json::to_string(&self.items)?;
        fs::write(&self.path, content).map_err(|source| SettingsError::File {
            path: self.path.clone(),
            source,
        })?;
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get_item(&self, key: &str) -> Option<String> {
        match self.items.get(key)? {
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    fn set_item(&mut self, key: &str, value: String) {
        self.items.insert(key.to_string(), Value::String(value));
    }

    fn clear(&mut self) {
        self.items.clear();
    }
}

/// Converts a stored string into the JSON type of `default`.
///
/// Numbers containing a `.` parse as floats, others as integers; anything
/// unparsable yields the default.
pub fn coerce(value: &str, default: &Value) -> Value {
    match default {
        Value::Bool(_) => Value::Bool(value == "true"),
        Value::Number(n) => {
            let parsed = if value.contains('.') {
                value.trim().parse::<f64>().ok().and_then(|f| {
                    if f.fract() == 0.0 && !n.is_f64() {
                        Some(Number::from(f as i64))
                    } else {
                        Number::from_f64(f)
                    }
                })
            } else {
                value.trim().parse::<i64>().ok().map(Number::from)
            };
            parsed.map(Value::Number).unwrap_or_else(|| default.clone())
        }
        Value::Array(_) => match serde_json::from_str(value) {
            Ok(v @ Value::Array(_)) => v,
            _ => Value::Array(Vec::new()),
        },
        Value::Object(_) => match serde_json::from_str(value) {
            Ok(v @ Value::Object(_)) => v,
            _ => Value::Object(Map::new()),
        },
        Value::String(_) | Value::Null => Value::String(value.to_string()),
    }
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Loads and stores option groups through a [`KeyValueStore`].
#[derive(Debug)]
pub struct SettingsManager<S: KeyValueStore> {
    storage: S,
    store_allowed: bool,
}

impl<S: KeyValueStore> SettingsManager<S> {
    /// Wraps `storage`. Writing is allowed unless a previous session
    /// declined it.
    pub fn new(storage: S) -> Self {
        let store_allowed = storage
            .get_item(&format!("{}{}", PERMISSION_PREFIX, PERMISSION_KEY))
            .map(|state| state != "false")
            .unwrap_or(true);
        Self {
            storage,
            store_allowed,
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    pub fn into_inner(self) -> S {
        self.storage
    }

    pub fn is_store_allowed(&self) -> bool {
        self.store_allowed
    }

    /// Records whether settings may be written. The answer itself is
    /// always stored.
    pub fn set_store_allowed(&mut self, allowed: bool) {
        self.store_allowed = allowed;
        self.storage.set_item(
            &format!("{}{}", PERMISSION_PREFIX, PERMISSION_KEY),
            allowed.to_string(),
        );
    }

    pub fn has_setting(&self, prefix: &str, key: &str) -> bool {
        self.storage.get_item(&format!("{}{}", prefix, key)).is_some()
    }

    pub fn load_value(&self, prefix: &str, key: &str) -> Option<String> {
        self.storage.get_item(&format!("{}{}", prefix, key))
    }

    pub fn store_value(&mut self, prefix: &str, key: &str, value: &str) {
        if !self.store_allowed {
            return;
        }
        self.storage
            .set_item(&format!("{}{}", prefix, key), value.to_string());
    }

    /// Loads a group, taking each missing key from `defaults`.
    pub fn load<T>(&self, prefix: &str, defaults: &T) -> T
    where
        T: Serialize + DeserializeOwned + Clone,
    {
        let Ok(Value::Object(default_map)) = serde_json::to_value(defaults) else {
            return defaults.clone();
        };
        let mut loaded = Map::new();
        for (key, default) in &default_map {
            if let Some(stored) = self.load_value(prefix, key) {
                loaded.insert(key.clone(), coerce(&stored, default));
            }
        }
        merge_with_defaults(defaults, Some(&Value::Object(loaded)), defaults, &[])
    }

    /// Stores every key of a group.
    pub fn store<T: Serialize>(&mut self, prefix: &str, values: &T) {
        if !self.store_allowed {
            return;
        }
        let Ok(Value::Object(map)) = serde_json::to_value(values) else {
            tracing::warn!("Settings group '{}' is not an object", prefix);
            return;
        };
        for (key, value) in &map {
            self.storage
                .set_item(&format!("{}{}", prefix, key), stringify(value));
        }
    }

    /// Stores a single key of a group.
    pub fn store_part<T: Serialize>(&mut self, prefix: &str, values: &T, key: &str) {
        if let Ok(Value::Object(map)) = serde_json::to_value(values) {
            if let Some(value) = map.get(key) {
                let value = stringify(value);
                self.store_value(prefix, key, &value);
            }
        }
    }

    /// Loads every option group under its standard prefix.
    pub fn load_document_settings(&self) -> DocumentSettings {
        DocumentSettings {
            view: self.load("view.", &ViewOption::default()),
            image: self.load("image.", &OutputOption::for_display()),
            print: self.load("print.", &OutputOption::for_printing()),
            view_grid: self.load("view-grid.", &GridOption::for_view()),
            print_grid: self.load("print-grid.", &GridOption::for_printing()),
            bounds: self.load("bounds.", &BoundsOption::default()),
            pdf: self.load("pdf.", &PdfOption::default()),
        }
    }

    pub fn store_document_settings(&mut self, settings: &DocumentSettings) {
        self.store("view.", &settings.view);
        self.store("image.", &settings.image);
        self.store("print.", &settings.print);
        self.store("view-grid.", &settings.view_grid);
        self.store("print-grid.", &settings.print_grid);
        self.store("bounds.", &settings.bounds);
        self.store("pdf.", &settings.pdf);
    }

    /// Metadata defaults for new documents.
    pub fn load_metadata(&self) -> Metadata {
        self.load("metadata.", &Metadata::default())
    }

    pub fn store_metadata(&mut self, metadata: &Metadata) {
        self.store("metadata.", metadata);
    }
}
