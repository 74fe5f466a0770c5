//! The editable pattern document.
//!
//! [`Pattern`] owns the document tree, the stitch definition table, the
//! option groups and the undo history. Every structural edit goes through
//! one of its methods: the change is captured as an [`UndoEntry`], applied
//! to the tree and pushed onto the history.

mod canvas;
mod file_io;
mod items;
mod layers;
mod normalize;
mod pivots;

pub use canvas::ResizeAnchor;
pub use items::ItemSpec;
pub use normalize::{Normalization, NORMALIZE_LABEL};

use crate::commands::UndoEntry;
use crate::history::UndoManager;
use crate::mode::{CalcParams, PositionCalculator, StitchGeometry};
use crate::stitch::StitchTable;
use crate::tree::{DocumentTree, PlacedStitch};
use koginkit_core::{Point, RenderMode};
use koginkit_settings::{DocumentSettings, Metadata};

/// A stitch with resolved grid and canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderedStitch {
    pub stitch: PlacedStitch,
    pub start: Point,
    pub end: Point,
}

#[derive(Debug, Clone)]
pub struct Pattern {
    pub(crate) tree: DocumentTree,
    pub(crate) stitches: StitchTable,
    pub(crate) settings: DocumentSettings,
    pub(crate) metadata: Metadata,
    history: UndoManager,
    modified: bool,
    file_name: Option<String>,
}

impl Default for Pattern {
    fn default() -> Self {
        Self::new()
    }
}

impl Pattern {
    pub fn new() -> Self {
        Self::with_settings(DocumentSettings::default(), Metadata::new())
    }

    /// A pattern using stored option groups and metadata defaults.
    pub fn with_settings(settings: DocumentSettings, metadata: Metadata) -> Self {
        let calculator = PositionCalculator::choose(&Self::calc_params(&settings));
        Self {
            tree: DocumentTree::new(),
            stitches: StitchTable::new(calculator),
            settings,
            metadata,
            history: UndoManager::new(),
            modified: false,
            file_name: None,
        }
    }

    pub(crate) fn calc_params(settings: &DocumentSettings) -> CalcParams {
        CalcParams::new(settings.view.view_mode, &settings.view_grid, &settings.image)
    }

    pub fn tree(&self) -> &DocumentTree {
        &self.tree
    }

    pub fn stitches(&self) -> &StitchTable {
        &self.stitches
    }

    pub fn settings(&self) -> &DocumentSettings {
        &self.settings
    }

    /// Option groups. Call [`Pattern::refresh_calculator`] after changing
    /// grid or output sizes.
    pub fn settings_mut(&mut self) -> &mut DocumentSettings {
        &mut self.settings
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn metadata_mut(&mut self) -> &mut Metadata {
        self.modified = true;
        &mut self.metadata
    }

    pub fn history(&self) -> &UndoManager {
        &self.history
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn set_modified(&mut self, modified: bool) {
        self.modified = modified;
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    pub fn set_file_name(&mut self, file_name: impl Into<String>) {
        self.file_name = Some(file_name.into());
    }

    /// Calculator of the current view mode and screen grid.
    pub fn calculator(&self) -> &PositionCalculator {
        self.stitches.calculator()
    }

    pub fn render_mode(&self) -> RenderMode {
        self.settings.view.view_mode
    }

    /// Switches the render mode, regenerating every stitch definition.
    ///
    /// Without `force`, switching to the current mode with unchanged grid
    /// metrics does nothing and returns `false`.
    pub fn set_render_mode(&mut self, mode: RenderMode, force: bool) -> bool {
        self.settings.view.view_mode = mode;
        self.refresh_calculator(force)
    }

    /// Rebuilds the calculator from the current option groups.
    pub fn refresh_calculator(&mut self, force: bool) -> bool {
        let calculator = PositionCalculator::choose(&Self::calc_params(&self.settings));
        self.stitches.set_calculator(calculator, force)
    }

    pub(crate) fn push(&mut self, entry: UndoEntry) {
        entry.apply(&mut self.tree, &mut self.settings.view_grid);
        self.record(entry);
    }

    /// Pushes an entry whose mutation has already been applied.
    pub(crate) fn record(&mut self, entry: UndoEntry) {
        tracing::debug!("Applied {}", entry.name());
        self.history.push(entry);
        self.modified = true;
    }

    pub fn undo(&mut self) -> bool {
        let done = self.history.undo(&mut self.tree, &mut self.settings.view_grid);
        if done {
            self.modified = true;
        }
        done
    }

    pub fn redo(&mut self) -> bool {
        let done = self.history.redo(&mut self.tree, &mut self.settings.view_grid);
        if done {
            self.modified = true;
        }
        done
    }

    /// Folds the newest `count` undo entries into one.
    pub fn merge_undo(&mut self, count: usize, label: &str) -> bool {
        self.history.merge(count, label)
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Resets to an empty document with one layer. Option groups are kept.
    pub fn clear(&mut self) {
        self.tree = DocumentTree::new();
        self.stitches.clear();
        self.history.clear();
        self.metadata = Metadata::new();
        self.modified = false;
        self.file_name = None;
    }

    /// Every stitch with absolute grid position and screen endpoints.
    pub fn placed_stitches(&self) -> Vec<RenderedStitch> {
        let calculator = self.calculator();
        self.tree
            .placed_stitches()
            .into_iter()
            .map(|stitch| {
                let (start, end) = calculator.calc(
                    stitch.position.x,
                    stitch.position.y,
                    stitch.key.length,
                    true,
                );
                RenderedStitch { stitch, start, end }
            })
            .collect()
    }
}
