//! Error handling for KoginKit value types
//!
//! Parsing of colors, geometry identifiers and render modes reports
//! through a single `thiserror` enum.

use thiserror::Error;

/// Errors raised while parsing core value types.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A color string is not `#rgb`, `#rrggbb` or `#rrggbbaa`.
    #[error("Invalid color: '{value}'")]
    InvalidColor {
        /// The rejected input.
        value: String,
    },

    /// A geometry identifier is not of the form `<length>-<hex color>`.
    #[error("Invalid geometry id: '{id}'")]
    InvalidGeometryId {
        /// The rejected identifier.
        id: String,
    },

    /// A stitch length must be a positive integer.
    #[error("Invalid stitch length: {length}")]
    InvalidLength {
        /// The rejected length.
        length: i64,
    },

    /// Render modes are numbered 0 to 3.
    #[error("Unknown render mode: {0}")]
    UnknownRenderMode(u8),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, Error>;
