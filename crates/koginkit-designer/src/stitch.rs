//! Geometry definition interning.
//!
//! Every stitch of the same length and color shares one
//! [`GeometryDefinition`]. Definitions are created on first use and
//! regenerated in place when the render mode or grid metrics change, so
//! stitch instances only ever hold a [`GeometryKey`].

use crate::mode::{PositionCalculator, StitchGeometry};
use koginkit_core::{Color, Error, LineCap, Point};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

/// Identity of a shared stitch geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GeometryKey {
    pub length: u32,
    pub color: Color,
}

impl GeometryKey {
    pub fn new(length: u32, color: Color) -> Self {
        debug_assert!(length > 0, "stitch length must be positive");
        Self { length, color }
    }

    /// Textual id, `<length>-<hex color>`.
    pub fn id(&self) -> String {
        self.to_string()
    }

    pub fn parse_id(id: &str) -> koginkit_core::Result<Self> {
        id.parse()
    }
}

impl fmt::Display for GeometryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.length, self.color.hex_digits())
    }
}

impl FromStr for GeometryKey {
    type Err = Error;

    fn from_str(id: &str) -> koginkit_core::Result<Self> {
        let invalid = || Error::InvalidGeometryId { id: id.to_string() };
        let (length, color) = id.split_once('-').ok_or_else(invalid)?;
        let length: u32 = length.trim().parse().map_err(|_| invalid())?;
        if length == 0 {
            return Err(Error::InvalidLength { length: 0 });
        }
        let color: Color = format!("#{}", color).parse().map_err(|_| invalid())?;
        Ok(Self { length, color })
    }
}

/// Physical geometry of a stitch drawn at the origin cell.
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryDefinition {
    pub key: GeometryKey,
    pub start: Point,
    pub end: Point,
    pub stroke_width: f64,
    pub line_cap: LineCap,
}

impl GeometryDefinition {
    fn generate(key: GeometryKey, calculator: &PositionCalculator) -> Self {
        let (start, end) = calculator.calc(0, 0, key.length, true);
        Self {
            key,
            start,
            end,
            stroke_width: calculator.stroke_width(),
            line_cap: calculator.line_cap(),
        }
    }

    pub fn id(&self) -> String {
        self.key.id()
    }
}

/// Owns every geometry definition of a document and tracks which ones an
/// export actually references.
#[derive(Debug, Clone, Default)]
pub struct StitchTable {
    calculator: PositionCalculator,
    definitions: HashMap<GeometryKey, GeometryDefinition>,
    order: Vec<GeometryKey>,
    used: HashMap<GeometryKey, usize>,
    used_order: Vec<GeometryKey>,
}

impl StitchTable {
    pub fn new(calculator: PositionCalculator) -> Self {
        Self {
            calculator,
            ..Self::default()
        }
    }

    pub fn calculator(&self) -> &PositionCalculator {
        &self.calculator
    }

    /// Switches to another calculator and regenerates every definition.
    ///
    /// Returns `false` and changes nothing when the calculator is identical
    /// and `force` is not set.
    pub fn set_calculator(&mut self, calculator: PositionCalculator, force: bool) -> bool {
        if !force && calculator == self.calculator {
            return false;
        }
        self.calculator = calculator;
        for definition in self.definitions.values_mut() {
            *definition = GeometryDefinition::generate(definition.key, &self.calculator);
        }
        tracing::debug!(
            "Regenerated {} stitch definitions for {}",
            self.definitions.len(),
            self.calculator.mode()
        );
        true
    }

    /// Returns the definition for `(length, color)`, creating it on a miss.
    pub fn get(&mut self, length: u32, color: Color) -> &GeometryDefinition {
        let key = GeometryKey::new(length, color);
        self.intern(key)
    }

    /// Same as [`StitchTable::get`] for an already built key.
    pub fn intern(&mut self, key: GeometryKey) -> &GeometryDefinition {
        if !self.definitions.contains_key(&key) {
            self.order.push(key);
        }
        let calculator = &self.calculator;
        self.definitions
            .entry(key)
            .or_insert_with(|| GeometryDefinition::generate(key, calculator))
    }

    /// Parses a textual id and interns it.
    pub fn get_by_id(&mut self, id: &str) -> koginkit_core::Result<&GeometryDefinition> {
        let key: GeometryKey = id.parse()?;
        Ok(self.intern(key))
    }

    /// Looks up a definition without creating it.
    pub fn definition(&self, key: &GeometryKey) -> Option<&GeometryDefinition> {
        self.definitions.get(key)
    }

    pub fn contains(&self, key: &GeometryKey) -> bool {
        self.definitions.contains_key(key)
    }

    /// Returns the key if it is defined and counts one use of it.
    pub fn has(&mut self, length: u32, color: Color) -> Option<GeometryKey> {
        let key = GeometryKey { length, color };
        if !self.definitions.contains_key(&key) {
            return None;
        }
        let count = self.used.entry(key).or_insert(0);
        if *count == 0 {
            self.used_order.push(key);
        }
        *count += 1;
        Some(key)
    }

    pub fn clear_used(&mut self) {
        self.used.clear();
        self.used_order.clear();
    }

    /// Keys counted by [`StitchTable::has`], in first-use order.
    pub fn used_keys(&self) -> &[GeometryKey] {
        &self.used_order
    }

    pub fn used_count(&self, key: &GeometryKey) -> usize {
        self.used.get(key).copied().unwrap_or(0)
    }

    /// Used keys grouped by length (ascending), colors in first-use order.
    pub fn used_by_length(&self) -> Vec<(u32, Vec<Color>)> {
        let mut grouped: BTreeMap<u32, Vec<Color>> = BTreeMap::new();
        for key in &self.used_order {
            if self.used_count(key) > 0 {
                grouped.entry(key.length).or_default().push(key.color);
            }
        }
        grouped.into_iter().collect()
    }

    /// Key for a stitch changed to `(length, color)`, or `None` when nothing
    /// would change.
    pub fn replace(&mut self, current: &GeometryKey, length: u32, color: Color) -> Option<GeometryKey> {
        if current.length == length && current.color == color {
            return None;
        }
        Some(self.get(length, color).key)
    }

    /// Defined keys in creation order.
    pub fn keys(&self) -> impl Iterator<Item = &GeometryKey> {
        self.order.iter()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn clear(&mut self) {
        self.definitions.clear();
        self.order.clear();
        self.clear_used();
    }
}
