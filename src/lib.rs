//! # KoginKit
//!
//! Editor core for kogin-zashi, the counted-thread embroidery of Tsugaru.
//! Patterns are odd-length straight stitches laid on a grid:
//! - Four render modes for stitch geometry on screen and on paper
//! - Layers, nested groups and pivots with full undo/redo
//! - Generated templates (diamonds, crosses) and copy/paste of items
//! - A self-describing SVG container that any SVG viewer can display
//!
//! ## Architecture
//!
//! KoginKit is organized as a workspace with multiple crates:
//!
//! 1. **koginkit-core** - Colors, grid coordinates, render modes, errors
//! 2. **koginkit-settings** - Option groups, metadata, settings store
//! 3. **koginkit-designer** - Document tree, undo engine, templates, SVG codec
//! 4. **koginkit** - Command line front end that integrates all crates

pub use koginkit_designer as designer;

pub use koginkit_core::{Color, GridCoord, GridRect, LineCap, Point, RenderMode};
pub use koginkit_designer::{
    read_template, CodecError, DocumentTree, ItemSpec, NodeId, Pattern, ReadOptions,
    ResizeAnchor, StitchTable, Template, UndoManager, WriteOptions, ZOrder,
};
pub use koginkit_settings::{DocumentSettings, Metadata, SettingsManager};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Output on stderr so SVG written to stdout stays clean
/// - RUST_LOG environment variable support
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
