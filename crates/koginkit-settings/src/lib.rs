//! KoginKit Settings Crate
//!
//! Option groups that travel inside pattern files, document metadata, and
//! the key/value settings store used to remember them between sessions.

pub mod error;
pub mod merge;
pub mod metadata;
pub mod options;
pub mod store;

pub use error::{Result, SettingsError};
pub use merge::merge_with_defaults;
pub use metadata::Metadata;
pub use options::{BoundsOption, DocumentSettings, GridOption, OutputOption, PdfOption, ViewOption};
pub use store::{JsonFileStore, KeyValueStore, MemoryStore, SettingsManager};
