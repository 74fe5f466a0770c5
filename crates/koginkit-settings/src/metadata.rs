//! Descriptive document metadata.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Free-form information about a pattern, written to the `kogin-metadata`
/// block. Keys the editor does not know about are preserved in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Metadata {
    pub title: String,
    #[serde(rename = "title-en")]
    pub title_en: String,
    #[serde(rename = "creationDate")]
    pub creation_date: String,
    pub author: String,
    pub license: String,
    pub keyword: String,
    pub description: String,
    pub version: String,
    pub copyright: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Metadata {
    /// Empty metadata stamped with the current local time.
    pub fn new() -> Self {
        Self {
            creation_date: Self::timestamp(),
            ..Self::default()
        }
    }

    /// Local time as `YYYY-MM-DD HH:MM`.
    pub fn timestamp() -> String {
        chrono::Local::now().format("%Y-%m-%d %H:%M").to_string()
    }

    /// Reads a metadata block.
    ///
    /// Known keys with a non-string value are dropped rather than failing the
    /// whole block.
    pub fn from_block(block: Option<&Value>) -> Self {
        let Some(Value::Object(map)) = block else {
            return Self::default();
        };
        let mut cleaned = Map::new();
        for (key, value) in map {
            let known = matches!(
                key.as_str(),
                "title"
                    | "title-en"
                    | "creationDate"
                    | "author"
                    | "license"
                    | "keyword"
                    | "description"
                    | "version"
                    | "copyright"
                    | "type"
            );
            if known && !value.is_string() {
                tracing::warn!("Ignoring metadata '{}' with non-string value", key);
                continue;
            }
            cleaned.insert(key.clone(), value.clone());
        }
        serde_json::from_value(Value::Object(cleaned)).unwrap_or_default()
    }

    pub fn to_block(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}
