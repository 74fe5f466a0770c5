//! Option groups stored with each pattern.
//!
//! Every group serializes with the camelCase keys used inside the
//! `kogin-option` block of a pattern file. Groups that exist in a screen and
//! a print flavour share one struct with two constructors.

use crate::merge::merge_with_defaults;
use koginkit_core::RenderMode;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Editor view state that is saved with the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ViewOption {
    pub view_mode: RenderMode,
    pub crosshair: bool,
    pub one_to_one: bool,
    pub one_to_two: bool,
    pub stitch_color: String,

    pub selection_color: String,
    pub cursor_color: String,
    pub overlay_stitch_color: String,
    pub pivot_color: String,

    pub open_from_toolbar: String,
    pub save_from_toolbar: String,
    pub ask_when_closing: bool,

    pub default_file_name: String,
    pub zoom_value: f64,
    pub auto_scroll_on_templates: bool,
}

impl ViewOption {
    /// Keys that describe the current session rather than the document.
    /// Loading a file leaves them untouched.
    pub const SESSION_KEYS: [&'static str; 6] = [
        "crosshair",
        "oneToOne",
        "oneToTwo",
        "openFromToolbar",
        "saveFromToolbar",
        "autoScrollOnTemplates",
    ];

    /// Keys never written to a pattern file.
    pub const UNSAVED_KEYS: [&'static str; 1] = ["defaultFileName"];
}

impl Default for ViewOption {
    fn default() -> Self {
        Self {
            view_mode: RenderMode::OverWarp,
            crosshair: true,
            one_to_one: false,
            one_to_two: false,
            stitch_color: "#000000".to_string(),
            selection_color: "#000000ff".to_string(),
            cursor_color: "#ff0000ff".to_string(),
            overlay_stitch_color: "#999999".to_string(),
            pivot_color: "#ff0000".to_string(),
            open_from_toolbar: "local".to_string(),
            save_from_toolbar: "local".to_string(),
            ask_when_closing: true,
            default_file_name: "pattern.svg".to_string(),
            zoom_value: 1.0,
            auto_scroll_on_templates: false,
        }
    }
}

/// Grid geometry and appearance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GridOption {
    pub show_grid: bool,
    /// Draw the grid above the stitches.
    pub over_grid: bool,

    pub hori_count: u32,
    pub vert_count: u32,

    pub grid_width: f64,
    pub grid_height: f64,

    pub grid_line_width: f64,
    pub grid_line_color: String,

    pub grid_major_line_color: String,
    pub grid_major_line_frequency: u32,

    pub grid_major_vert_offset: i32,
    pub grid_major_hori_offset: i32,
    pub show_grid_major_line: bool,
    pub show_grid_frame: bool,

    pub numbering_color: String,
}

impl Default for GridOption {
    fn default() -> Self {
        Self {
            show_grid: true,
            over_grid: false,
            hori_count: 100,
            vert_count: 50,
            grid_width: 16.0,
            grid_height: 16.0,
            grid_line_width: 1.0,
            grid_line_color: "#bbbbbb".to_string(),
            grid_major_line_color: "#000000".to_string(),
            grid_major_line_frequency: 5,
            grid_major_vert_offset: 1,
            grid_major_hori_offset: 1,
            show_grid_major_line: true,
            show_grid_frame: true,
            numbering_color: "#000000".to_string(),
        }
    }
}

impl GridOption {
    /// Translucent grid for the editing canvas and screen images.
    pub fn for_view() -> Self {
        Self {
            grid_line_color: "#00000020".to_string(),
            grid_major_line_color: "#00000050".to_string(),
            numbering_color: "#00000050".to_string(),
            ..Self::default()
        }
    }

    /// Millimetre-sized grid for printed output.
    pub fn for_printing() -> Self {
        Self {
            grid_width: 4.0,
            grid_height: 4.0,
            grid_line_width: 0.15,
            ..Self::default()
        }
    }
}

/// Image output settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OutputOption {
    /// Omit the embedded option, data and metadata blocks.
    pub no_data: bool,
    /// Also write `xlink:href` for older SVG consumers.
    pub use_x_link: bool,
    pub grid_number: bool,

    pub monochrome: bool,
    pub set_background: bool,
    pub background_color: String,

    pub stroke_width: f64,

    /// Margins in grid cells between the outermost stitch and the image edge.
    pub left_margin: i32,
    pub right_margin: i32,
    pub top_margin: i32,
    pub bottom_margin: i32,

    pub show_title: bool,
    pub show_copyright: bool,

    pub line_grain_line_width: f64,
    pub over_grain_line_width: f64,
    pub over_warp_line_width: f64,
    pub over_grain_offset_ratio: f64,
    pub over_warp_offset_ratio: f64,
}

impl Default for OutputOption {
    fn default() -> Self {
        Self {
            no_data: false,
            use_x_link: true,
            grid_number: false,
            monochrome: false,
            set_background: false,
            background_color: "#ffffff".to_string(),
            stroke_width: 16.0,
            left_margin: 1,
            right_margin: 1,
            top_margin: 1,
            bottom_margin: 1,
            show_title: false,
            show_copyright: false,
            line_grain_line_width: 8.0,
            over_grain_line_width: 8.0,
            over_warp_line_width: 8.0,
            over_grain_offset_ratio: 0.1,
            over_warp_offset_ratio: 0.1,
        }
    }
}

impl OutputOption {
    /// Screen images get an opaque background.
    pub fn for_display() -> Self {
        Self {
            set_background: true,
            ..Self::default()
        }
    }

    /// Line widths scaled to the printing grid.
    pub fn for_printing() -> Self {
        let half = GridOption::for_printing().grid_width / 2.0;
        Self {
            stroke_width: half,
            line_grain_line_width: half,
            over_grain_line_width: half,
            over_warp_line_width: half,
            ..Self::default()
        }
    }
}

/// Fixed output rectangle overriding the computed content bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BoundsOption {
    pub use_output_bounds: bool,
    pub bounds_left: i32,
    pub bounds_right: i32,
    pub bounds_top: i32,
    pub bounds_bottom: i32,
}

impl Default for BoundsOption {
    fn default() -> Self {
        Self {
            use_output_bounds: false,
            bounds_left: 5,
            bounds_right: 15,
            bounds_top: 5,
            bounds_bottom: 15,
        }
    }
}

/// Settings handed to the PDF exporter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PdfOption {
    pub use_output_bounds: bool,
    pub grid_number: bool,
    pub page_size: String,
    pub landscape: bool,
    pub left_margin: f64,
    pub right_margin: f64,
    pub top_margin: f64,
    pub bottom_margin: f64,
    pub multibyte_font: String,
}

impl Default for PdfOption {
    fn default() -> Self {
        Self {
            use_output_bounds: false,
            grid_number: true,
            page_size: "A4".to_string(),
            landscape: false,
            left_margin: 10.0,
            right_margin: 10.0,
            top_margin: 17.0,
            bottom_margin: 12.0,
            multibyte_font: String::new(),
        }
    }
}

/// All option groups owned by one document.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentSettings {
    pub view: ViewOption,
    /// Screen image output.
    pub image: OutputOption,
    /// Printed output.
    pub print: OutputOption,
    pub view_grid: GridOption,
    pub print_grid: GridOption,
    pub bounds: BoundsOption,
    pub pdf: PdfOption,
}

impl Default for DocumentSettings {
    fn default() -> Self {
        Self {
            view: ViewOption::default(),
            image: OutputOption::for_display(),
            print: OutputOption::for_printing(),
            view_grid: GridOption::for_view(),
            print_grid: GridOption::for_printing(),
            bounds: BoundsOption::default(),
            pdf: PdfOption::default(),
        }
    }
}

fn to_object<T: Serialize>(value: &T) -> Map<String, Value> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    }
}

impl DocumentSettings {
    /// Builds the `kogin-option` block.
    pub fn to_option_block(&self) -> Value {
        let mut view = to_object(&self.view);
        for key in ViewOption::UNSAVED_KEYS {
            view.remove(key);
        }

        let mut block = Map::new();
        block.insert("output-screen".into(), Value::Object(to_object(&self.image)));
        block.insert("output-print".into(), Value::Object(to_object(&self.print)));
        block.insert("grid-screen".into(), Value::Object(to_object(&self.view_grid)));
        block.insert("grid-print".into(), Value::Object(to_object(&self.print_grid)));
        block.insert("bounds".into(), Value::Object(to_object(&self.bounds)));
        block.insert("pdf-export".into(), Value::Object(to_object(&self.pdf)));
        block.insert("view".into(), Value::Object(view));
        Value::Object(block)
    }

    /// Replaces every group from a `kogin-option` block.
    ///
    /// Missing groups and missing or mistyped keys fall back to the group's
    /// defaults. Session keys of the view group keep their current values.
    pub fn apply_option_block(&mut self, block: Option<&Value>) {
        let group = |name: &str| block.and_then(|b| b.get(name));

        self.view = merge_with_defaults(
            &self.view,
            group("view"),
            &ViewOption::default(),
            &ViewOption::SESSION_KEYS,
        );
        self.image = merge_with_defaults(
            &self.image,
            group("output-screen"),
            &OutputOption::for_display(),
            &[],
        );
        self.print = merge_with_defaults(
            &self.print,
            group("output-print"),
            &OutputOption::for_printing(),
            &[],
        );
        self.view_grid = merge_with_defaults(
            &self.view_grid,
            group("grid-screen"),
            &GridOption::for_view(),
            &[],
        );
        self.print_grid = merge_with_defaults(
            &self.print_grid,
            group("grid-print"),
            &GridOption::for_printing(),
            &[],
        );
        self.bounds =
            merge_with_defaults(&self.bounds, group("bounds"), &BoundsOption::default(), &[]);
        self.pdf = merge_with_defaults(&self.pdf, group("pdf-export"), &PdfOption::default(), &[]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_view_keys_are_camel_case() {
        let value = serde_json::to_value(ViewOption::default()).unwrap();
        assert_eq!(value["viewMode"], json!(3));
        assert_eq!(value["oneToTwo"], json!(false));
        assert_eq!(value["defaultFileName"], json!("pattern.svg"));
    }

    #[test]
    fn test_output_option_x_link_key() {
        let value = serde_json::to_value(OutputOption::default()).unwrap();
        assert_eq!(value["useXLink"], json!(true));
        assert_eq!(value["overWarpOffsetRatio"], json!(0.1));
    }

    #[test]
    fn test_grid_variants() {
        let view = GridOption::for_view();
        assert_eq!(view.grid_line_color, "#00000020");
        assert_eq!(view.grid_width, 16.0);

        let print = GridOption::for_printing();
        assert_eq!(print.grid_width, 4.0);
        assert_eq!(print.grid_line_width, 0.15);
        assert_eq!(print.grid_line_color, "#bbbbbb");
    }

    #[test]
    fn test_output_variants() {
        assert!(OutputOption::for_display().set_background);
        let print = OutputOption::for_printing();
        assert_eq!(print.stroke_width, 2.0);
        assert_eq!(print.over_warp_line_width, 2.0);
        assert!(!print.set_background);
    }

    #[test]
    fn test_option_block_omits_default_file_name() {
        let block = DocumentSettings::default().to_option_block();
        assert!(block["view"].get("defaultFileName").is_none());
        assert!(block["view"].get("zoomValue").is_some());
        assert_eq!(block["grid-print"]["gridWidth"], json!(4.0));
    }

    #[test]
    fn test_apply_missing_block_restores_defaults() {
        let mut settings = DocumentSettings::default();
        settings.view_grid.hori_count = 12;
        settings.view.crosshair = false;
        settings.apply_option_block(None);
        assert_eq!(settings.view_grid.hori_count, 100);
        // session state survives
        assert!(!settings.view.crosshair);
    }

    #[test]
    fn test_apply_block_backfills_fields() {
        let mut settings = DocumentSettings::default();
        let block = json!({
            "grid-screen": { "horiCount": 40, "gridWidth": "wide" },
            "view": { "viewMode": 1, "crosshair": false },
        });
        settings.apply_option_block(Some(&block));
        assert_eq!(settings.view_grid.hori_count, 40);
        assert_eq!(settings.view_grid.grid_width, 16.0);
        assert_eq!(settings.view.view_mode, RenderMode::FillGrain);
        assert!(settings.view.crosshair);
        assert_eq!(settings.print_grid, GridOption::for_printing());
    }
}
