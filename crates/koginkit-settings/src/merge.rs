//! Field-by-field merging of loosely typed JSON into option structs.
//!
//! Pattern files and the settings store may come from older or newer
//! releases, so an unknown key is ignored and a missing or mistyped key
//! takes its default instead of rejecting the whole group.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

fn same_kind(a: &Value, b: &Value) -> bool {
    matches!(
        (a, b),
        (Value::Null, Value::Null)
            | (Value::Bool(_), Value::Bool(_))
            | (Value::Number(_), Value::Number(_))
            | (Value::String(_), Value::String(_))
            | (Value::Array(_), Value::Array(_))
            | (Value::Object(_), Value::Object(_))
    )
}

fn object_of<T: Serialize>(value: &T) -> Option<Map<String, Value>> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

/// Builds a `T` from `incoming`, one field at a time.
///
/// Every key of `defaults` is taken from `incoming` when present with a
/// compatible type, otherwise from `defaults`. Keys listed in `keep` are
/// copied from `current` and never read from `incoming`.
pub fn merge_with_defaults<T>(current: &T, incoming: Option<&Value>, defaults: &T, keep: &[&str]) -> T
where
    T: Serialize + DeserializeOwned + Clone,
{
    let (Some(default_map), Some(current_map)) = (object_of(defaults), object_of(current)) else {
        return defaults.clone();
    };
    let incoming = incoming.and_then(Value::as_object);

    let mut merged = Map::new();
    for (key, default) in &default_map {
        let value = if keep.contains(&key.as_str()) {
            current_map.get(key).unwrap_or(default)
        } else {
            default
        };
        merged.insert(key.clone(), value.clone());
    }

    if let Some(incoming) = incoming {
        for (key, default) in &default_map {
            if keep.contains(&key.as_str()) {
                continue;
            }
            let Some(value) = incoming.get(key) else {
                continue;
            };
            if !same_kind(value, default) {
                tracing::warn!("Ignoring option '{}' with unexpected type: {}", key, value);
                continue;
            }
            let previous = merged.insert(key.clone(), value.clone());
            if serde_json::from_value::<T>(Value::Object(merged.clone())).is_err() {
                tracing::warn!("Ignoring invalid value for option '{}': {}", key, value);
                if let Some(previous) = previous {
                    merged.insert(key.clone(), previous);
                }
            }
        }
    }

    serde_json::from_value(Value::Object(merged)).unwrap_or_else(|_| defaults.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Sample {
        count: u32,
        ratio: f64,
        name: String,
        flag: bool,
    }

    fn defaults() -> Sample {
        Sample {
            count: 5,
            ratio: 0.5,
            name: "a".into(),
            flag: true,
        }
    }

    #[test]
    fn test_missing_input_gives_defaults() {
        let current = Sample {
            count: 9,
            ..defaults()
        };
        assert_eq!(merge_with_defaults(&current, None, &defaults(), &[]), defaults());
    }

    #[test]
    fn test_known_keys_are_copied() {
        let incoming = json!({ "count": 7, "name": "b", "unknown": 1 });
        let merged = merge_with_defaults(&defaults(), Some(&incoming), &defaults(), &[]);
        assert_eq!(merged.count, 7);
        assert_eq!(merged.name, "b");
        assert_eq!(merged.ratio, 0.5);
    }

    #[test]
    fn test_mistyped_keys_fall_back() {
        let incoming = json!({ "count": "seven", "flag": 0, "ratio": 2 });
        let merged = merge_with_defaults(&defaults(), Some(&incoming), &defaults(), &[]);
        assert_eq!(merged.count, 5);
        assert!(merged.flag);
        assert_eq!(merged.ratio, 2.0);
    }

    #[test]
    fn test_out_of_range_number_falls_back() {
        let incoming = json!({ "count": -3 });
        let merged = merge_with_defaults(&defaults(), Some(&incoming), &defaults(), &[]);
        assert_eq!(merged.count, 5);
    }

    #[test]
    fn test_kept_keys_come_from_current() {
        let current = Sample {
            flag: false,
            ..defaults()
        };
        let incoming = json!({ "flag": true });
        let merged = merge_with_defaults(&current, Some(&incoming), &defaults(), &["flag"]);
        assert!(!merged.flag);
    }
}
