//! Coordinate and geometry value types.
//!
//! Two coordinate spaces coexist: the integer *grid* space where stitches
//! live, and the floating point *physical* space of the rendered canvas.

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A cell position on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GridCoord {
    pub x: i32,
    pub y: i32,
}

impl GridCoord {
    pub const ORIGIN: GridCoord = GridCoord { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns this coordinate shifted by `(dx, dy)`. Coordinates saturate
    /// at the `i32` range.
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x.saturating_add(dx), self.y.saturating_add(dy))
    }

    pub fn is_origin(&self) -> bool {
        self.x == 0 && self.y == 0
    }
}

impl std::ops::Add for GridCoord {
    type Output = GridCoord;

    fn add(self, rhs: GridCoord) -> GridCoord {
        self.offset(rhs.x, rhs.y)
    }
}

impl std::ops::Sub for GridCoord {
    type Output = GridCoord;

    fn sub(self, rhs: GridCoord) -> GridCoord {
        GridCoord::new(self.x.saturating_sub(rhs.x), self.y.saturating_sub(rhs.y))
    }
}

impl fmt::Display for GridCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// An axis-aligned rectangle in grid units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GridRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl GridRect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The rectangle covered by a stitch of `length` cells starting at `origin`.
    pub fn stitch(origin: GridCoord, length: u32) -> Self {
        Self::new(origin.x, origin.y, i32::try_from(length).unwrap_or(i32::MAX), 1)
    }

    /// The box reported for an empty group.
    pub const fn unit() -> Self {
        Self::new(0, 0, 1, 1)
    }

    pub fn right(&self) -> i32 {
        self.x.saturating_add(self.width)
    }

    pub fn bottom(&self) -> i32 {
        self.y.saturating_add(self.height)
    }

    pub fn translate(&self, dx: i32, dy: i32) -> Self {
        Self::new(
            self.x.saturating_add(dx),
            self.y.saturating_add(dy),
            self.width,
            self.height,
        )
    }

    /// Smallest rectangle containing both.
    pub fn union(&self, other: &GridRect) -> Self {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Self::new(x, y, right.saturating_sub(x), bottom.saturating_sub(y))
    }

    pub fn contains(&self, coord: GridCoord) -> bool {
        coord.x >= self.x && coord.x < self.right() && coord.y >= self.y && coord.y < self.bottom()
    }

    /// `[x, y, width, height]`, the layout used by pattern files.
    pub fn to_array(&self) -> [i32; 4] {
        [self.x, self.y, self.width, self.height]
    }

    pub fn from_array(values: [i32; 4]) -> Self {
        Self::new(values[0], values[1], values[2], values[3])
    }
}

/// A point on the rendered canvas.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// How a stitch is drawn between its grid cells.
///
/// Stored in pattern files as its integer value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum RenderMode {
    /// Thin line along the cell row, butt caps.
    LineGrain = 0,
    /// Line filling the cell height, butt caps.
    FillGrain = 1,
    /// Rounded stroke reaching slightly past the grid lines.
    OverGrain = 2,
    /// Rounded stroke between cell centers.
    #[default]
    OverWarp = 3,
}

impl RenderMode {
    pub const ALL: [RenderMode; 4] = [
        RenderMode::LineGrain,
        RenderMode::FillGrain,
        RenderMode::OverGrain,
        RenderMode::OverWarp,
    ];

    /// Butt-capped modes that stay within the stitch cells.
    pub fn is_grain_line(&self) -> bool {
        matches!(self, RenderMode::LineGrain | RenderMode::FillGrain)
    }
}

impl TryFrom<u8> for RenderMode {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(RenderMode::LineGrain),
            1 => Ok(RenderMode::FillGrain),
            2 => Ok(RenderMode::OverGrain),
            3 => Ok(RenderMode::OverWarp),
            other => Err(Error::UnknownRenderMode(other)),
        }
    }
}

impl From<RenderMode> for u8 {
    fn from(mode: RenderMode) -> u8 {
        mode as u8
    }
}

impl fmt::Display for RenderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RenderMode::LineGrain => "LineGrain",
            RenderMode::FillGrain => "FillGrain",
            RenderMode::OverGrain => "OverGrain",
            RenderMode::OverWarp => "OverWarp",
        };
        write!(f, "{}", name)
    }
}

/// SVG `stroke-linecap` values used by the render modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineCap {
    Butt,
    Round,
}

impl LineCap {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineCap::Butt => "butt",
            LineCap::Round => "round",
        }
    }
}

impl fmt::Display for LineCap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
