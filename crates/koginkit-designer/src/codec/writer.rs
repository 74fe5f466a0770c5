//! Pattern to SVG container.

use super::data::{DataNode, DefsData, GroupData, PatternData, SingleDef, StitchRefs};
use super::svg::{fixed, num, Element};
use super::{APP_ID, CLIP_ID, DATA_ID, METADATA_ID, OPTION_ID};
use crate::mode::{CalcParams, PositionCalculator, StitchGeometry};
use crate::pattern::Pattern;
use crate::stitch::{GeometryKey, StitchTable};
use crate::tree::{DocumentTree, Node, NodeId};
use koginkit_core::{Color, GridRect, LineCap, RenderMode};
use koginkit_settings::{BoundsOption, DocumentSettings, GridOption, Metadata, OutputOption};
use serde::Serialize;
use serde_json::Value;

const SVG_NS: &str = "http://www.w3.org/2000/svg";
const XLINK_NS: &str = "http://www.w3.org/1999/xlink";

/// Upper bound for grid and numbering loops.
const MAX_ITERATIONS: usize = 100_000;

/// What the caller asks for. `None` takes the value from the output group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteOptions {
    pub for_printing: bool,
    pub no_data: Option<bool>,
    pub grid_number: Option<bool>,
}

impl WriteOptions {
    /// Screen image with the embedded document blocks.
    pub fn screen() -> Self {
        Self::default()
    }

    pub fn print() -> Self {
        Self {
            for_printing: true,
            ..Self::default()
        }
    }

    pub fn with_grid_number(mut self, grid_number: bool) -> Self {
        self.grid_number = Some(grid_number);
        self
    }

    pub fn with_no_data(mut self, no_data: bool) -> Self {
        self.no_data = Some(no_data);
        self
    }
}

/// Settings resolved for one export.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub for_printing: bool,
    pub output: OutputOption,
    pub grid: GridOption,
    pub bounds: BoundsOption,
    pub mode: RenderMode,
    pub no_data: bool,
    pub grid_number: bool,
    pub stroke_width: f64,
    pub line_cap: LineCap,
    pub calculator: PositionCalculator,
    /// Font size of grid numbers; points when printing, pixels otherwise.
    pub numbering_size: f64,
    pub hori_margin: f64,
    pub vert_margin: f64,
}

impl RenderOptions {
    pub fn resolve(settings: &DocumentSettings, options: &WriteOptions) -> Self {
        let (output, grid) = if options.for_printing {
            (settings.print.clone(), settings.print_grid.clone())
        } else {
            (settings.image.clone(), settings.view_grid.clone())
        };
        let mode = settings.view.view_mode;
        let calculator = PositionCalculator::choose(&CalcParams::new(mode, &grid, &output));
        let (numbering_size, margin) = if options.for_printing {
            (9.0 * 25.4 / 72.0, 10.0)
        } else {
            (12.0, 30.0)
        };
        Self {
            for_printing: options.for_printing,
            no_data: options.no_data.unwrap_or(output.no_data),
            grid_number: options.grid_number.unwrap_or(output.grid_number),
            stroke_width: calculator.stroke_width(),
            line_cap: calculator.line_cap(),
            calculator,
            output,
            grid,
            bounds: settings.bounds.clone(),
            mode,
            numbering_size,
            hori_margin: margin,
            vert_margin: margin,
        }
    }

    fn unit(&self) -> &'static str {
        if self.for_printing {
            "mm"
        } else {
            ""
        }
    }

    /// Area in grid cells covered by the image, margins included.
    pub fn grid_rect(&self, content: Option<GridRect>) -> Option<GridRect> {
        let out = &self.output;
        if self.bounds.use_output_bounds {
            let b = &self.bounds;
            return Some(GridRect::new(
                b.bounds_left - out.left_margin,
                b.bounds_top - out.top_margin,
                b.bounds_right - b.bounds_left + out.right_margin + 1,
                b.bounds_bottom - b.bounds_top + out.bottom_margin + 1,
            ));
        }
        let content = content?;
        let extra_left = i32::from(self.mode == RenderMode::OverGrain);
        let extra_right = i32::from(matches!(
            self.mode,
            RenderMode::OverGrain | RenderMode::OverWarp
        ));
        let left = content.x - out.left_margin - extra_left;
        let top = content.y - out.top_margin;
        let right = content.right() + out.right_margin + extra_right;
        let bottom = content.bottom() + out.bottom_margin;
        Some(GridRect::new(left, top, right - left, bottom - top))
    }

    /// Physical `(x, y, width, height)` of a grid rectangle; the size
    /// includes one trailing grid line.
    pub fn total_size(&self, rect: &GridRect) -> (f64, f64, f64, f64) {
        let gw = self.grid.grid_width;
        let gh = self.grid.grid_height;
        let lw = self.grid.grid_line_width;
        (
            f64::from(rect.x) * gw,
            f64::from(rect.y) * gh,
            f64::from(rect.width) * gw + lw,
            f64::from(rect.height) * gh + lw,
        )
    }
}

/// Per-export state shared by the element writers.
struct Frame<'a> {
    op: &'a RenderOptions,
    offset_x: f64,
    offset_y: f64,
    width: f64,
    height: f64,
}

impl Pattern {
    /// Serializes the pattern into an SVG container.
    ///
    /// Returns an empty string when there is nothing to draw.
    pub fn write(&mut self, options: &WriteOptions) -> String {
        self.stitches.clear_used();
        let op = RenderOptions::resolve(&self.settings, options);

        let content = self.tree.content_bounds();
        let Some(rect) = op.grid_rect(content) else {
            tracing::debug!("Nothing to write");
            return String::new();
        };
        let (offset_x, offset_y, width, height) = op.total_size(&rect);
        if width == 0.0 && height == 0.0 {
            return String::new();
        }
        let frame = Frame {
            op: &op,
            offset_x,
            offset_y,
            width,
            height,
        };

        let (image_width, image_height) = if op.grid_number {
            (width + op.hori_margin * 2.0, height + op.vert_margin * 2.0)
        } else {
            (width, height)
        };
        let mut root = Element::new("svg").attr("xmlns", SVG_NS);
        if op.output.use_x_link {
            root.set("xmlns:xlink", XLINK_NS);
        }
        root.set(
            "viewBox",
            format!("0 0 {} {}", num(image_width), num(image_height)),
        );
        root.set("width", format!("{}{}", num(image_width), op.unit()));
        root.set("height", format!("{}{}", num(image_height), op.unit()));

        if op.output.set_background {
            root.push(
                Element::new("rect")
                    .attr("id", "background")
                    .attr("x", 0)
                    .attr("y", 0)
                    .attr("width", num(image_width))
                    .attr("height", num(image_height))
                    .attr("fill", &op.output.background_color),
            );
        }

        let grid = if op.grid.show_grid {
            write_grid(&frame)
        } else {
            None
        };
        let (under_grid, over_grid) = if op.grid.over_grid {
            (None, grid)
        } else {
            (grid, None)
        };

        let layers = write_layers(&self.tree, &mut self.stitches, &frame);
        let defs = write_defs(&self.stitches, &op);
        let clip = op.bounds.use_output_bounds.then(|| write_clip_path(&frame));
        let mut labels = Vec::new();
        if !op.for_printing {
            if op.output.show_title {
                labels.push(
                    Element::new("text")
                        .attr("x", 5)
                        .attr("y", 13)
                        .attr("font-size", 9)
                        .attr("fill", "#000000")
                        .text(&self.metadata.title),
                );
            }
            if op.output.show_copyright {
                labels.push(
                    Element::new("text")
                        .attr("x", num(width - 5.0))
                        .attr("y", num(height - 5.0))
                        .attr("font-size", 9)
                        .attr("text-anchor", "end")
                        .attr("fill", "#000000")
                        .text(&self.metadata.copyright),
                );
            }
        }

        if op.grid_number {
            let mut body = Element::new("g").attr(
                "transform",
                format!("translate({} {})", num(op.hori_margin), num(op.vert_margin)),
            );
            under_grid.into_iter().for_each(|g| body.push(g));
            body.push(layers);
            over_grid.into_iter().for_each(|g| body.push(g));
            labels.into_iter().for_each(|t| body.push(t));
            root.push(body);
            root.push(defs);
            clip.into_iter().for_each(|c| root.push(c));
            root.push(write_numbering(&frame));
        } else {
            under_grid.into_iter().for_each(|g| root.push(g));
            root.push(layers);
            root.push(defs);
            clip.into_iter().for_each(|c| root.push(c));
            over_grid.into_iter().for_each(|g| root.push(g));
            labels.into_iter().for_each(|t| root.push(t));
        }

        if !op.no_data {
            let bbox = content.unwrap_or(GridRect::new(0, 0, 0, 0));
            let data = self.pattern_data(bbox);
            root.push(foreign_object(
                OPTION_ID,
                pretty_json(&self.settings.to_option_block()),
            ));
            root.push(foreign_object(
                DATA_ID,
                serde_json::to_string(&data).unwrap_or_default(),
            ));
            root.push(foreign_object(METADATA_ID, metadata_json(&self.metadata)));
        }

        tracing::debug!(
            "Wrote {} stitches using {} definitions ({}x{}{})",
            self.tree.stitch_count(),
            self.stitches.used_keys().len(),
            num(image_width),
            num(image_height),
            op.unit()
        );
        self.stitches.clear_used();
        root.render()
    }

    /// The `kogin-data` payload. Usage counters must be filled by a layer
    /// pass first.
    fn pattern_data(&self, bbox: GridRect) -> PatternData {
        let data = self
            .tree
            .layers()
            .iter()
            .map(|layer| {
                let state = self.tree.layer_state(*layer).unwrap_or_default();
                DataNode::Group(GroupData::layer(
                    self.tree.layer_name(*layer).unwrap_or_default(),
                    state.visible,
                    state.locked,
                    children_data(&self.tree, *layer),
                ))
            })
            .collect();
        let single = self
            .stitches
            .used_by_length()
            .into_iter()
            .map(|(length, colors)| SingleDef {
                length,
                colors: colors.iter().map(Color::to_string).collect(),
            })
            .collect();
        let pivots = self
            .tree
            .pivots()
            .into_iter()
            .map(|(_, pivot)| vec![pivot.position.x, pivot.position.y])
            .collect();
        PatternData {
            application: APP_ID.to_string(),
            data: Some(data),
            defs: Some(DefsData { single }),
            pivots: Some(pivots),
            bbox: Some(bbox.to_array()),
        }
    }
}

/// Groups first, then stitch runs keyed by geometry in first-seen order.
fn children_data(tree: &DocumentTree, parent: NodeId) -> Vec<DataNode> {
    let mut items = Vec::new();
    let mut runs: Vec<(GeometryKey, Vec<[i32; 2]>)> = Vec::new();
    for child in tree.children(parent) {
        match tree.node(*child) {
            Some(Node::Group(group)) => items.push(DataNode::Group(GroupData::group(
                group.offset.x,
                group.offset.y,
                children_data(tree, *child),
            ))),
            Some(Node::Stitch(stitch)) => {
                let coord = [stitch.position.x, stitch.position.y];
                match runs.iter_mut().find(|(key, _)| *key == stitch.key) {
                    Some((_, coords)) => coords.push(coord),
                    None => runs.push((stitch.key, vec![coord])),
                }
            }
            _ => {}
        }
    }
    items.extend(runs.into_iter().map(|(key, coords)| {
        DataNode::Stitches(StitchRefs {
            reference: key.id(),
            coords,
        })
    }));
    items
}

fn write_layers(tree: &DocumentTree, table: &mut StitchTable, frame: &Frame) -> Element {
    let mut g = Element::new("g").attr("id", "layers");
    if frame.op.bounds.use_output_bounds {
        g.set("clip-path", format!("url(#{})", CLIP_ID));
    }
    for layer in tree.layers() {
        g.push(write_group(tree, table, frame, *layer));
    }
    g
}

fn write_group(tree: &DocumentTree, table: &mut StitchTable, frame: &Frame, id: NodeId) -> Element {
    let mut g = Element::new("g");
    let Some(group) = tree.group(id) else {
        return g;
    };
    let gw = frame.op.grid.grid_width;
    let gh = frame.op.grid.grid_height;

    if let Some(state) = group.layer {
        g.set("id", group.name.as_deref().unwrap_or_default());
        if !state.visible {
            g.set("visibility", "hidden");
        }
    } else {
        let x = (f64::from(group.offset.x) * gw).floor();
        let y = (f64::from(group.offset.y) * gh).floor();
        if x != 0.0 || y != 0.0 {
            g.set("transform", format!("translate({} {})", num(x), num(y)));
        }
    }

    for child in &group.children {
        match tree.node(*child) {
            Some(Node::Group(_)) => g.push(write_group(tree, table, frame, *child)),
            Some(Node::Stitch(stitch)) => {
                let Some(key) = table.has(stitch.key.length, stitch.key.color) else {
                    tracing::warn!("Skipping stitch with undefined geometry {}", stitch.key);
                    continue;
                };
                let href = format!("#{}", key.id());
                let x = (f64::from(stitch.position.x) * gw).floor();
                let y = (f64::from(stitch.position.y) * gh).floor();
                let mut element = Element::new("use");
                if frame.op.output.use_x_link {
                    element.set("xlink:href", &href);
                }
                element.set("href", &href);
                element.set("x", num(x - frame.offset_x));
                element.set("y", num(y - frame.offset_y));
                g.push(element);
            }
            _ => {}
        }
    }
    g
}

fn write_defs(table: &StitchTable, op: &RenderOptions) -> Element {
    let mut defs = Element::new("defs");
    for key in table.used_keys() {
        if table.used_count(key) == 0 {
            continue;
        }
        let (start, end) = match table.definition(key) {
            Some(definition) if !op.for_printing => (definition.start, definition.end),
            _ => op.calculator.calc(0, 0, key.length, false),
        };
        let stroke = if op.output.monochrome {
            Color::BLACK
        } else {
            key.color
        };
        let (rgb, alpha) = stroke.split_alpha();
        let mut line = Element::new("line")
            .attr("id", key.id())
            .attr("x1", num(start.x))
            .attr("y1", num(start.y))
            .attr("x2", num(end.x))
            .attr("y2", num(end.y))
            .attr("stroke", rgb);
        if let Some(alpha) = alpha {
            line.set("stroke-opacity", alpha);
        }
        line.set("stroke-width", num(op.stroke_width));
        line.set("stroke-linecap", op.line_cap);
        defs.push(line);
    }
    defs
}

fn write_clip_path(frame: &Frame) -> Element {
    let op = frame.op;
    let gw = op.grid.grid_width;
    let gh = op.grid.grid_height;
    let x = f64::from(op.output.left_margin) * gw;
    let y = f64::from(op.output.top_margin) * gh;
    let width = frame.width - f64::from(op.output.left_margin + op.output.right_margin) * gw;
    let height = frame.height - f64::from(op.output.top_margin + op.output.bottom_margin) * gh;

    let mut clip = Element::new("clipPath").attr("id", CLIP_ID);
    clip.push(
        Element::new("rect")
            .attr("x", num(x))
            .attr("y", num(y))
            .attr("width", num(width))
            .attr("height", num(height)),
    );
    let mut g = Element::new("g");
    g.push(clip);
    g
}

/// Colors with alpha are split into `#rrggbb` and an opacity value.
fn split_color(color: &str) -> (String, Option<String>) {
    match color.parse::<Color>() {
        Ok(color) => color.split_alpha(),
        Err(_) => (color.to_string(), None),
    }
}

fn grid_path(id: &str, d: &[String], stroke: &str, stroke_width: f64) -> Element {
    let (rgb, alpha) = split_color(stroke);
    let mut path = Element::new("path").attr("id", id).attr("stroke", rgb);
    if let Some(alpha) = alpha {
        path.set("opacity", alpha);
    }
    path.set("stroke-width", num(stroke_width));
    path.set("d", d.join(" "));
    path
}

/// Pen moves drawing parallel lines from `start` while `pos <= end`; the
/// trailing move is dropped.
fn line_run(mut commands: Vec<String>, start: f64, end: f64, step: f64, line: &str, advance: &str) -> Vec<String> {
    let mut pos = start;
    let mut iterations = 0;
    while pos <= end && iterations < MAX_ITERATIONS {
        commands.push(line.to_string());
        commands.push(advance.to_string());
        pos += step;
        iterations += 1;
    }
    commands.pop();
    commands
}

fn write_grid(frame: &Frame) -> Option<Element> {
    let grid = &frame.op.grid;
    let gw = grid.grid_width;
    let gh = grid.grid_height;
    let (width, height) = (frame.width, frame.height);
    if gw <= 0.0 || gh <= 0.0 || width <= 0.0 || height <= 0.0 {
        return None;
    }
    let lw = grid.grid_line_width;
    let start = lw / 2.0;
    let move_to = format!("M {},{}", num(start), num(start));

    let mut g = Element::new("g").attr("id", "grid");

    let vert = line_run(
        vec![move_to.clone()],
        0.0,
        width,
        gw,
        &format!("V {}", num(height)),
        &format!("m {},-{}", num(gw), num(height)),
    );
    g.push(grid_path("grid-vert-lines", &vert, &grid.grid_line_color, lw));

    let hori = line_run(
        vec![move_to.clone()],
        0.0,
        height,
        gh,
        &format!("H {}", num(width)),
        &format!("m -{},{}", num(width), num(gh)),
    );
    g.push(grid_path("grid-hori-lines", &hori, &grid.grid_line_color, lw));

    if grid.show_grid_frame {
        let frame_path = vec![
            move_to.clone(),
            format!("H {}", num(width - start)),
            format!("V {}", num(height - start)),
            format!("H {}", num(start)),
            format!("V {} z", num(start)),
        ];
        let mut path = grid_path("grid-frame", &frame_path, &grid.grid_major_line_color, lw);
        path.set("fill", "none");
        g.push(path);
    }

    if grid.show_grid_major_line && grid.grid_major_line_frequency > 0 {
        let frequency = f64::from(grid.grid_major_line_frequency);

        let hori_step = gw * frequency;
        let hori_start = start + gw * f64::from(grid.grid_major_hori_offset);
        let vert_major = line_run(
            vec![format!("M {},{}", num(hori_start), num(start))],
            hori_start,
            width,
            hori_step,
            &format!("V {}", num(height)),
            &format!("m {},-{}", num(hori_step), num(height)),
        );
        g.push(grid_path(
            "grid-vert-major-lines",
            &vert_major,
            &grid.grid_major_line_color,
            lw,
        ));

        let vert_step = gh * frequency;
        let vert_start = start + gh * f64::from(grid.grid_major_vert_offset);
        let hori_major = line_run(
            vec![format!("M {},{}", num(start), num(vert_start))],
            vert_start,
            height,
            vert_step,
            &format!("H {}", num(width)),
            &format!("m -{},{}", num(width), num(vert_step)),
        );
        g.push(grid_path(
            "grid-hori-major-lines",
            &hori_major,
            &grid.grid_major_line_color,
            lw,
        ));
    }
    Some(g)
}

/// Labels `1`, then every major line: `1, f, 2f, ...` with `f` the major
/// frequency. Positions advance with the labels.
fn numbering_steps(start: f64, limit: f64, cell: f64, frequency: u32) -> Vec<(f64, u32)> {
    let frequency = frequency.max(1);
    let first = frequency.saturating_sub(1).max(1);
    let mut steps = Vec::new();
    let mut number = 1u32;
    let mut pos = start;
    while pos < limit && steps.len() < MAX_ITERATIONS {
        steps.push((pos, number));
        let advance = if number == 1 { first } else { frequency };
        number += advance;
        pos += f64::from(advance) * cell;
    }
    steps
}

fn write_numbering(frame: &Frame) -> Element {
    let op = frame.op;
    let margin = if op.for_printing { 2.0 } else { 5.0 };
    let (color, alpha) = split_color(&op.grid.numbering_color);
    let unit = if op.for_printing { "pt" } else { "px" };

    let mut g = Element::new("g")
        .attr("id", "numbering")
        .attr("font-size", format!("{}{}", num(op.numbering_size), unit))
        .attr("fill", color);
    if let Some(alpha) = alpha {
        g.set("fill-opacity", alpha);
    }

    let coord = |value: f64| {
        if op.for_printing {
            fixed(value)
        } else {
            num(value)
        }
    };
    let text = |x: f64, y: f64, label: u32| {
        Element::new("text")
            .attr("x", coord(x))
            .attr("y", coord(y))
            .text(&label.to_string())
    };

    let gw = op.grid.grid_width;
    let gh = op.grid.grid_height;
    let frequency = op.grid.grid_major_line_frequency;

    let start_y = op.vert_margin + f64::from(op.output.top_margin) * gh + gh
        - (gh / 2.0 - op.numbering_size / 2.0) / 2.0;
    let left_x = op.hori_margin - margin - if op.for_printing { 1.0 } else { 0.0 };
    let right_x = op.hori_margin + frame.width + margin;
    let mut left = Element::new("g")
        .attr("id", "left-numbering")
        .attr("text-anchor", "end");
    let mut right = Element::new("g")
        .attr("id", "right-numbering")
        .attr("text-anchor", "start");
    for (y, label) in numbering_steps(start_y, frame.height + gh, gh, frequency) {
        left.push(text(left_x, y, label));
        right.push(text(right_x, y, label));
    }
    g.push(left);
    g.push(right);

    let start_x = op.hori_margin + f64::from(op.output.left_margin) * gw + gw;
    let top_y = op.vert_margin - margin;
    let bottom_y = op.vert_margin + frame.height + margin + op.numbering_size;
    let mut top = Element::new("g")
        .attr("id", "top-numbering")
        .attr("text-anchor", "middle");
    let mut bottom = Element::new("g")
        .attr("id", "bottom-numbering")
        .attr("text-anchor", "middle");
    for (x, label) in numbering_steps(start_x, frame.width + gw, gw, frequency) {
        top.push(text(x, top_y, label));
        bottom.push(text(x, bottom_y, label));
    }
    g.push(top);
    g.push(bottom);
    g
}

fn foreign_object(id: &str, json: String) -> Element {
    Element::new("foreignObject")
        .attr("id", id)
        .attr("visibility", "hidden")
        .text(&json)
}

/// JSON with one-space indentation.
fn pretty_json(value: &Value) -> String {
    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b" ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    if value.serialize(&mut serializer).is_err() {
        return String::new();
    }
    String::from_utf8(out).unwrap_or_default()
}

fn metadata_json(metadata: &Metadata) -> String {
    pretty_json(&metadata.to_block())
}
