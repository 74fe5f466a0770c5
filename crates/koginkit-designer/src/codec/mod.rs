//! SVG container codec.
//!
//! A pattern file is a regular SVG image of the pattern that additionally
//! carries the option groups, the drawable payload and the metadata as JSON
//! inside hidden `<foreignObject>` elements. Any SVG viewer shows the
//! rendering; [`Pattern::read`](crate::Pattern::read) restores the document
//! from the embedded blocks and ignores the drawing itself.

mod data;
mod reader;
mod svg;
mod writer;

pub use data::{DataNode, DefsData, GroupData, PatternData, SingleDef, StitchRefs};
pub use reader::{read_template, ReadOptions};
pub use writer::{RenderOptions, WriteOptions};

use thiserror::Error;

/// Value of the `application` field of the data block.
pub const APP_ID: &str = "kogin";
pub const DATA_ID: &str = "kogin-data";
pub const OPTION_ID: &str = "kogin-option";
pub const METADATA_ID: &str = "kogin-metadata";
pub const CLIP_ID: &str = "clip-path";

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Malformed XML: {0}")]
    Xml(String),

    #[error("Malformed JSON block: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid stitch reference: {id}")]
    InvalidReference { id: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<quick_xml::Error> for CodecError {
    fn from(err: quick_xml::Error) -> Self {
        CodecError::Xml(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for CodecError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        CodecError::Xml(err.to_string())
    }
}
