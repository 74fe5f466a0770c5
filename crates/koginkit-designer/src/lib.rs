//! # KoginKit Designer
//!
//! Document model and file format of the KoginKit pattern editor. A pattern
//! is a set of straight stitches laid on an integer grid, organized in
//! layers and nested groups, and saved as a self-describing SVG image.
//!
//! ## Core Components
//!
//! - **Grid**: conversion between grid cells and physical units
//! - **Render modes**: endpoint placement, stroke width and line cap per mode
//! - **Stitch table**: one shared geometry definition per length and color
//! - **Document tree**: layers, groups, stitches and pivots in an arena
//! - **Undo engine**: reversible entries replayed by an undo manager
//! - **Normalizer**: removes covered stitches and joins overlapping ones
//! - **Templates**: generated motifs, copies of items and template files
//! - **Codec**: SVG container writer and reader
//!
//! ## Architecture
//!
//! ```text
//! Pattern (editable document)
//!   ├── DocumentTree (layers, groups, stitches, pivot layer)
//!   ├── StitchTable (geometry definitions)
//!   │     └── PositionCalculator (render mode geometry)
//!   ├── DocumentSettings (option groups)
//!   └── UndoManager (UndoEntry stack)
//!
//! codec
//!   ├── write: Pattern -> SVG + option/data/metadata blocks
//!   └── read:  SVG -> Pattern or Template
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use koginkit_designer::{ItemSpec, Pattern, WriteOptions};
//! use koginkit_core::{Color, GridCoord};
//!
//! let mut pattern = Pattern::new();
//! pattern.add_items(
//!     &[ItemSpec::Stitch { position: GridCoord::new(0, 0), length: 3, color: Color::BLACK }],
//!     None,
//! );
//! let svg = pattern.write(&WriteOptions::screen());
//! ```

pub mod codec;
pub mod commands;
pub mod grid;
pub mod history;
pub mod mode;
pub mod pattern;
pub mod stitch;
pub mod template;
pub mod tree;

pub use codec::{read_template, CodecError, ReadOptions, RenderOptions, WriteOptions};
pub use commands::{UndoEntry, ZOrder};
pub use grid::GridMetrics;
pub use history::UndoManager;
pub use mode::{CalcParams, PositionCalculator, StitchGeometry};
pub use pattern::{ItemSpec, Normalization, Pattern, RenderedStitch, ResizeAnchor};
pub use stitch::{GeometryDefinition, GeometryKey, StitchTable};
pub use template::{CrossKind, Template, TemplateItem, TemplateKind, TemplatePivot};
pub use tree::{DocumentTree, LayerState, Node, NodeId, PlacedStitch};
