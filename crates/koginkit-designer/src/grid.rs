//! Grid coordinate system.
//!
//! Converts between integer grid cells and physical canvas units for a
//! given cell size. Cell dimensions are expected to be positive.

use koginkit_core::{GridCoord, Point};
use koginkit_settings::GridOption;

/// Cell size and grid line width in physical units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridMetrics {
    pub cell_width: f64,
    pub cell_height: f64,
    pub line_width: f64,
}

impl Default for GridMetrics {
    fn default() -> Self {
        Self::new(16.0, 16.0, 1.0)
    }
}

impl GridMetrics {
    pub fn new(cell_width: f64, cell_height: f64, line_width: f64) -> Self {
        debug_assert!(cell_width > 0.0 && cell_height > 0.0);
        Self {
            cell_width,
            cell_height,
            line_width,
        }
    }

    pub fn from_option(option: &GridOption) -> Self {
        Self::new(option.grid_width, option.grid_height, option.grid_line_width)
    }

    /// Top-left corner of a cell, floored to whole units.
    pub fn grid_to_physical(&self, x: i32, y: i32) -> Point {
        Point::new(
            (f64::from(x) * self.cell_width).floor(),
            (f64::from(y) * self.cell_height).floor(),
        )
    }

    pub fn coord_to_physical(&self, coord: GridCoord) -> Point {
        self.grid_to_physical(coord.x, coord.y)
    }

    /// The cell containing a physical point.
    pub fn physical_to_grid(&self, point: Point) -> GridCoord {
        GridCoord::new(
            (point.x / self.cell_width).floor() as i32,
            (point.y / self.cell_height).floor() as i32,
        )
    }

    /// Moves a point to the top-left corner of its cell.
    pub fn snap_to_grid(&self, point: Point) -> Point {
        self.coord_to_physical(self.physical_to_grid(point))
    }

    /// Shifts a cell corner to the cell center.
    pub fn to_center(&self, point: Point) -> Point {
        Point::new(
            point.x + self.cell_width / 2.0,
            point.y + self.cell_height / 2.0,
        )
    }

    pub fn grid_to_center(&self, x: i32, y: i32) -> Point {
        self.to_center(self.grid_to_physical(x, y))
    }

    /// Left edge of a cell at half its height.
    pub fn grid_to_vert_center(&self, x: i32, y: i32) -> Point {
        let point = self.grid_to_physical(x, y);
        Point::new(point.x, point.y + self.cell_height / 2.0)
    }

    /// Signed cell delta between the cells of two physical points.
    pub fn grid_distance(&self, from: Point, to: Point) -> (i32, i32) {
        let a = self.physical_to_grid(from);
        let b = self.physical_to_grid(to);
        (b.x - a.x, b.y - a.y)
    }

    /// Canvas size including the closing grid line.
    pub fn canvas_size(&self, hori_count: u32, vert_count: u32) -> (f64, f64) {
        (
            f64::from(hori_count) * self.cell_width + self.line_width,
            f64::from(vert_count) * self.cell_height + self.line_width,
        )
    }

    pub fn full_size(&self, hori_count: u32, vert_count: u32) -> (f64, f64) {
        (
            f64::from(hori_count) * self.cell_width,
            f64::from(vert_count) * self.cell_height,
        )
    }

    /// Radius of the marker drawn for a pivot.
    pub fn pivot_radius(&self) -> f64 {
        (self.cell_width / 2.0).min(self.cell_height / 2.0) * 2.0 - 4.0
    }
}
