//! # KoginKit Core
//!
//! Value types shared by every KoginKit crate:
//! - Grid coordinates and grid rectangles (integer cells)
//! - Physical points (floating point canvas units)
//! - RGBA colors with the `#rrggbb[aa]` notation used in pattern files
//! - Rendering modes and line caps
//! - Error types

pub mod color;
pub mod error;
pub mod types;

pub use color::Color;
pub use error::{Error, Result};
pub use types::{GridCoord, GridRect, LineCap, Point, RenderMode};
