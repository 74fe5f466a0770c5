//! Rendering-mode geometry.
//!
//! Each render mode places the two endpoints of a stitch differently
//! relative to its grid cells and draws it with its own stroke width and
//! line cap. [`PositionCalculator`] picks the implementation for a mode.

use crate::grid::GridMetrics;
use koginkit_core::{LineCap, Point, RenderMode};
use koginkit_settings::{GridOption, OutputOption};

/// Everything a calculator needs to know about the output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalcParams {
    pub mode: RenderMode,
    pub grid: GridMetrics,
    pub line_grain_line_width: f64,
    pub over_grain_line_width: f64,
    pub over_warp_line_width: f64,
    pub over_grain_offset_ratio: f64,
    pub over_warp_offset_ratio: f64,
}

impl CalcParams {
    pub fn new(mode: RenderMode, grid: &GridOption, output: &OutputOption) -> Self {
        Self {
            mode,
            grid: GridMetrics::from_option(grid),
            line_grain_line_width: output.line_grain_line_width,
            over_grain_line_width: output.over_grain_line_width,
            over_warp_line_width: output.over_warp_line_width,
            over_grain_offset_ratio: output.over_grain_offset_ratio,
            over_warp_offset_ratio: output.over_warp_offset_ratio,
        }
    }
}

impl Default for CalcParams {
    fn default() -> Self {
        Self::new(
            RenderMode::default(),
            &GridOption::for_view(),
            &OutputOption::for_display(),
        )
    }
}

/// Endpoint placement for one render mode.
pub trait StitchGeometry {
    fn mode(&self) -> RenderMode;

    fn line_cap(&self) -> LineCap;

    fn stroke_width(&self) -> f64;

    fn grid(&self) -> &GridMetrics;

    /// Start and end points of a stitch of `length` cells at `(x, y)`.
    ///
    /// `pixel_correction` moves the line half a unit down so one-unit
    /// strokes land on screen pixels; it must be off for physical output.
    fn calc(&self, x: i32, y: i32, length: u32, pixel_correction: bool) -> (Point, Point);
}

fn corrected(mut point: Point, pixel_correction: bool) -> Point {
    if pixel_correction {
        point.y += 0.5;
    }
    point
}

/// Thin line through the middle of the cell row.
#[derive(Debug, Clone, PartialEq)]
pub struct LineGrain {
    grid: GridMetrics,
    stroke_width: f64,
}

impl LineGrain {
    pub fn new(params: &CalcParams) -> Self {
        Self {
            grid: params.grid,
            stroke_width: params.line_grain_line_width,
        }
    }
}

impl StitchGeometry for LineGrain {
    fn mode(&self) -> RenderMode {
        RenderMode::LineGrain
    }

    fn line_cap(&self) -> LineCap {
        LineCap::Butt
    }

    fn stroke_width(&self) -> f64 {
        self.stroke_width
    }

    fn grid(&self) -> &GridMetrics {
        &self.grid
    }

    fn calc(&self, x: i32, y: i32, length: u32, pixel_correction: bool) -> (Point, Point) {
        grain_endpoints(&self.grid, x, y, length, pixel_correction)
    }
}

/// Same endpoints as [`LineGrain`], stroked to fill the cell height.
#[derive(Debug, Clone, PartialEq)]
pub struct FillGrain {
    grid: GridMetrics,
}

impl FillGrain {
    pub fn new(params: &CalcParams) -> Self {
        Self { grid: params.grid }
    }
}

impl StitchGeometry for FillGrain {
    fn mode(&self) -> RenderMode {
        RenderMode::FillGrain
    }

    fn line_cap(&self) -> LineCap {
        LineCap::Butt
    }

    fn stroke_width(&self) -> f64 {
        self.grid.cell_height - self.grid.line_width
    }

    fn grid(&self) -> &GridMetrics {
        &self.grid
    }

    fn calc(&self, x: i32, y: i32, length: u32, pixel_correction: bool) -> (Point, Point) {
        grain_endpoints(&self.grid, x, y, length, pixel_correction)
    }
}

fn grain_endpoints(
    grid: &GridMetrics,
    x: i32,
    y: i32,
    length: u32,
    pixel_correction: bool,
) -> (Point, Point) {
    let mut start = corrected(grid.grid_to_vert_center(x, y), pixel_correction);
    let mut end = start;
    start.x += grid.line_width;
    end.x += grid.cell_width * f64::from(length);
    (start, end)
}

/// Rounded stroke overshooting both grid lines.
#[derive(Debug, Clone, PartialEq)]
pub struct OverGrain {
    grid: GridMetrics,
    stroke_width: f64,
    offset: f64,
}

impl OverGrain {
    pub fn new(params: &CalcParams) -> Self {
        Self {
            grid: params.grid,
            stroke_width: params.over_grain_line_width,
            offset: params.over_grain_offset_ratio * params.grid.cell_width,
        }
    }
}

impl StitchGeometry for OverGrain {
    fn mode(&self) -> RenderMode {
        RenderMode::OverGrain
    }

    fn line_cap(&self) -> LineCap {
        LineCap::Round
    }

    fn stroke_width(&self) -> f64 {
        self.stroke_width
    }

    fn grid(&self) -> &GridMetrics {
        &self.grid
    }

    fn calc(&self, x: i32, y: i32, length: u32, pixel_correction: bool) -> (Point, Point) {
        let mut start = corrected(self.grid.grid_to_vert_center(x, y), pixel_correction);
        let mut end = self.grid.grid_to_vert_center(x.saturating_add_unsigned(length), y);
        end.y = start.y;
        start.x -= self.offset;
        end.x += self.offset + self.grid.line_width;
        (start, end)
    }
}

/// Rounded stroke between cell centers, pulled in from both ends.
#[derive(Debug, Clone, PartialEq)]
pub struct OverWarp {
    grid: GridMetrics,
    stroke_width: f64,
    offset: f64,
}

impl OverWarp {
    pub fn new(params: &CalcParams) -> Self {
        Self {
            grid: params.grid,
            stroke_width: params.over_warp_line_width,
            offset: params.over_warp_offset_ratio * params.grid.cell_width,
        }
    }
}

impl StitchGeometry for OverWarp {
    fn mode(&self) -> RenderMode {
        RenderMode::OverWarp
    }

    fn line_cap(&self) -> LineCap {
        LineCap::Round
    }

    fn stroke_width(&self) -> f64 {
        self.stroke_width
    }

    fn grid(&self) -> &GridMetrics {
        &self.grid
    }

    fn calc(&self, x: i32, y: i32, length: u32, pixel_correction: bool) -> (Point, Point) {
        let mut start = corrected(self.grid.grid_to_center(x, y), pixel_correction);
        let mut end = self.grid.grid_to_center(x.saturating_add_unsigned(length), y);
        end.y = start.y;
        start.x += self.offset;
        end.x += -self.offset + self.grid.line_width;
        (start, end)
    }
}

/// The calculator for one render mode.
#[derive(Debug, Clone, PartialEq)]
pub enum PositionCalculator {
    LineGrain(LineGrain),
    FillGrain(FillGrain),
    OverGrain(OverGrain),
    OverWarp(OverWarp),
}

impl PositionCalculator {
    pub fn choose(params: &CalcParams) -> Self {
        match params.mode {
            RenderMode::LineGrain => PositionCalculator::LineGrain(LineGrain::new(params)),
            RenderMode::FillGrain => PositionCalculator::FillGrain(FillGrain::new(params)),
            RenderMode::OverGrain => PositionCalculator::OverGrain(OverGrain::new(params)),
            RenderMode::OverWarp => PositionCalculator::OverWarp(OverWarp::new(params)),
        }
    }

    fn inner(&self) -> &dyn StitchGeometry {
        match self {
            PositionCalculator::LineGrain(c) => c,
            PositionCalculator::FillGrain(c) => c,
            PositionCalculator::OverGrain(c) => c,
            PositionCalculator::OverWarp(c) => c,
        }
    }
}

impl Default for PositionCalculator {
    fn default() -> Self {
        Self::choose(&CalcParams::default())
    }
}

impl StitchGeometry for PositionCalculator {
    fn mode(&self) -> RenderMode {
        self.inner().mode()
    }

    fn line_cap(&self) -> LineCap {
        self.inner().line_cap()
    }

    fn stroke_width(&self) -> f64 {
        self.inner().stroke_width()
    }

    fn grid(&self) -> &GridMetrics {
        self.inner().grid()
    }

    fn calc(&self, x: i32, y: i32, length: u32, pixel_correction: bool) -> (Point, Point) {
        self.inner().calc(x, y, length, pixel_correction)
    }
}
