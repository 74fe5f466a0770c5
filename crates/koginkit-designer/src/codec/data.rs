//! JSON schema of the `kogin-data` block.

use super::{CodecError, APP_ID};
use crate::stitch::GeometryKey;
use koginkit_core::GridRect;
use serde::{Deserialize, Deserializer, Serialize};

/// The drawable payload of a pattern file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternData {
    #[serde(default)]
    pub application: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<DataNode>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defs: Option<DefsData>,
    /// `[x, y]` per pivot, in pivot order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pivots: Option<Vec<Vec<i32>>>,
    /// `[x, y, width, height]` of the content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<[i32; 4]>,
}

impl PatternData {
    pub fn is_kogin(&self) -> bool {
        self.application == APP_ID
    }

    pub fn bbox_rect(&self) -> Option<GridRect> {
        self.bbox.map(GridRect::from_array)
    }

    /// Pivot coordinates, skipping entries without two values.
    pub fn pivot_coords(&self) -> Vec<(i32, i32)> {
        self.pivots
            .iter()
            .flatten()
            .filter_map(|p| match p.as_slice() {
                [x, y, ..] => Some((*x, *y)),
                _ => {
                    tracing::warn!("Ignoring pivot entry {:?}", p);
                    None
                }
            })
            .collect()
    }
}

/// A container or a run of stitches sharing one geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DataNode {
    Group(GroupData),
    Stitches(StitchRefs),
}

/// A layer when `layer` is set, otherwise a group with an offset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupData {
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub layer: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locked: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<i32>,
    pub children: Vec<DataNode>,
}

impl GroupData {
    pub fn layer(name: &str, visible: bool, locked: bool, children: Vec<DataNode>) -> Self {
        Self {
            layer: true,
            name: Some(name.to_string()),
            visible: Some(visible),
            locked: Some(locked),
            children,
            ..Self::default()
        }
    }

    pub fn group(x: i32, y: i32, children: Vec<DataNode>) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            children,
            ..Self::default()
        }
    }

    pub fn offset(&self) -> (i32, i32) {
        (self.x.unwrap_or(0), self.y.unwrap_or(0))
    }
}

/// Positions of every stitch using the geometry `reference`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StitchRefs {
    #[serde(rename = "ref")]
    pub reference: String,
    pub coords: Vec<[i32; 2]>,
}

impl StitchRefs {
    pub fn key(&self) -> Result<GeometryKey, CodecError> {
        parse_ref(&self.reference)
    }
}

/// Parses a `<length>-<hex>` geometry reference.
pub fn parse_ref(reference: &str) -> Result<GeometryKey, CodecError> {
    reference
        .parse::<GeometryKey>()
        .map_err(|_| CodecError::InvalidReference {
            id: reference.to_string(),
        })
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DefsData {
    #[serde(default)]
    pub single: Vec<SingleDef>,
}

/// Colors used with one stitch length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SingleDef {
    #[serde(deserialize_with = "number_or_string")]
    pub length: u32,
    pub colors: Vec<String>,
}

/// Older files wrote the length as a string.
fn number_or_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u32),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(text) => text.trim().parse().map_err(serde::de::Error::custom),
    }
}
