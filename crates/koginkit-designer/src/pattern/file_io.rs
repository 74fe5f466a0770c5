//! File save/load for patterns.

use super::Pattern;
use crate::codec::{ReadOptions, WriteOptions};
use anyhow::{bail, Context, Result};
use std::path::Path;

impl Pattern {
    /// Save the pattern as an SVG container.
    pub fn save_to_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let svg = self.write(&WriteOptions::screen().with_no_data(false));
        if svg.is_empty() {
            bail!("Pattern has no stitches to save");
        }
        std::fs::write(path.as_ref(), svg).context("Failed to write pattern file")?;

        // Update state
        if let Some(name) = path.as_ref().file_name() {
            self.set_file_name(name.to_string_lossy());
        }
        self.set_modified(false);
        Ok(())
    }

    /// Load a pattern file, replacing the current document.
    pub fn load_from_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let content =
            std::fs::read_to_string(path.as_ref()).context("Failed to read pattern file")?;
        self.read(&content, &ReadOptions::default())
            .with_context(|| format!("Failed to parse pattern file {}", path.as_ref().display()))?;

        if let Some(name) = path.as_ref().file_name() {
            self.set_file_name(name.to_string_lossy());
        }
        Ok(())
    }
}
