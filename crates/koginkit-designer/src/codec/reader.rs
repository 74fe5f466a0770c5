//! SVG container to pattern or template.

use super::data::{DataNode, GroupData, PatternData};
use super::{CodecError, APP_ID, DATA_ID, METADATA_ID, OPTION_ID};
use crate::mode::PositionCalculator;
use crate::pattern::Pattern;
use crate::stitch::{GeometryKey, StitchTable};
use crate::template::{calculate_bbox, Template, TemplateItem, TemplatePivot};
use crate::tree::{DocumentTree, LayerState, NodeId};
use koginkit_core::{Color, GridCoord, GridRect};
use koginkit_settings::Metadata;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde_json::Value;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadOptions {
    /// Keep the current option groups instead of the file's.
    pub keep_settings: bool,
}

/// JSON blocks found in a container.
#[derive(Debug, Default)]
struct Blocks {
    option: Option<Value>,
    data: Option<Value>,
    metadata: Option<Value>,
}

fn element_id(e: &BytesStart) -> Result<Option<String>, CodecError> {
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == b"id" {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

/// Parses the whole document and collects the text of `foreignObject`
/// elements carrying one of the known ids.
fn parse_blocks(text: &str) -> Result<Blocks, CodecError> {
    let mut reader = Reader::from_str(text);
    reader.check_end_names(true);

    let mut stack: Vec<Vec<u8>> = Vec::new();
    let mut seen_root = false;
    // id and text of the foreignObject being read, with its depth
    let mut capture: Option<(String, String, usize)> = None;
    let mut blocks = Blocks::default();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                if stack.is_empty() && seen_root {
                    return Err(CodecError::Xml("multiple root elements".into()));
                }
                seen_root = true;
                if e.local_name().as_ref() == b"foreignObject" {
                    if let Some(id) = element_id(e)? {
                        capture = Some((id, String::new(), stack.len()));
                    }
                } else {
                    // validate attributes of every element
                    for attr in e.attributes() {
                        attr?;
                    }
                }
                stack.push(e.name().as_ref().to_vec());
            }
            Ok(Event::Empty(ref e)) => {
                if stack.is_empty() && seen_root {
                    return Err(CodecError::Xml("multiple root elements".into()));
                }
                seen_root = true;
                for attr in e.attributes() {
                    attr?;
                }
            }
            Ok(Event::End(ref e)) => {
                let Some(open) = stack.pop() else {
                    return Err(CodecError::Xml(format!(
                        "unexpected end tag at byte {}",
                        reader.buffer_position()
                    )));
                };
                if open != e.name().as_ref() {
                    return Err(CodecError::Xml(format!(
                        "mismatched end tag at byte {}",
                        reader.buffer_position()
                    )));
                }
                if capture.as_ref().is_some_and(|(_, _, depth)| *depth == stack.len()) {
                    if let Some((id, content, _)) = capture.take() {
                        store_block(&mut blocks, &id, &content)?;
                    }
                }
            }
            Ok(Event::Text(e)) => {
                if let Some((_, content, _)) = capture.as_mut() {
                    content.push_str(&e.unescape()?);
                }
            }
            Ok(Event::CData(e)) => {
                if let Some((_, content, _)) = capture.as_mut() {
                    content.push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(CodecError::Xml(format!(
                    "at byte {}: {}",
                    reader.buffer_position(),
                    e
                )));
            }
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(CodecError::Xml(format!(
            "unclosed element <{}>",
            String::from_utf8_lossy(open)
        )));
    }
    if !seen_root {
        return Err(CodecError::Xml("no root element".into()));
    }
    Ok(blocks)
}

fn store_block(blocks: &mut Blocks, id: &str, content: &str) -> Result<(), CodecError> {
    let slot = match id {
        OPTION_ID => &mut blocks.option,
        DATA_ID => &mut blocks.data,
        METADATA_ID => &mut blocks.metadata,
        _ => {
            tracing::debug!("Ignoring foreignObject '{}'", id);
            return Ok(());
        }
    };
    *slot = Some(serde_json::from_str(content)?);
    Ok(())
}

/// The drawable payload, or `None` when the data block belongs to another
/// application or is missing.
fn payload(data: Option<Value>) -> Result<Option<PatternData>, CodecError> {
    let Some(value) = data else {
        return Ok(None);
    };
    if value.get("application").and_then(Value::as_str) != Some(APP_ID) {
        tracing::warn!("Data block is not a kogin payload");
        return Ok(None);
    }
    Ok(Some(serde_json::from_value(value)?))
}

/// Receives a payload walk. Implemented by the live document reader and
/// by the template reader.
trait PayloadSink {
    fn define(&mut self, key: GeometryKey);

    /// Returns `false` to skip the layer's contents.
    fn enter_layer(&mut self, layer: &GroupData) -> bool;

    fn enter_group(&mut self, x: i32, y: i32);

    fn leave(&mut self);

    fn stitch(&mut self, key: GeometryKey, x: i32, y: i32);

    fn pivot(&mut self, x: i32, y: i32, index: u32);
}

fn walk(data: &PatternData, sink: &mut impl PayloadSink) -> Result<(), CodecError> {
    for def in data.defs.iter().flat_map(|defs| &defs.single) {
        if def.length == 0 {
            tracing::warn!("Ignoring definition with zero length");
            continue;
        }
        for color in &def.colors {
            match color.parse::<Color>() {
                Ok(color) => sink.define(GeometryKey::new(def.length, color)),
                Err(e) => tracing::warn!("Ignoring definition color '{}': {}", color, e),
            }
        }
    }

    let Some(nodes) = &data.data else {
        return Ok(());
    };
    walk_nodes(nodes, sink, true)?;
    for (index, (x, y)) in data.pivot_coords().into_iter().enumerate() {
        sink.pivot(x, y, index as u32);
    }
    Ok(())
}

fn walk_nodes(nodes: &[DataNode], sink: &mut impl PayloadSink, top: bool) -> Result<(), CodecError> {
    for node in nodes {
        match node {
            DataNode::Group(group) if top && group.layer => {
                if sink.enter_layer(group) {
                    walk_nodes(&group.children, sink, false)?;
                    sink.leave();
                }
            }
            DataNode::Group(group) => {
                let (x, y) = group.offset();
                sink.enter_group(x, y);
                walk_nodes(&group.children, sink, false)?;
                sink.leave();
            }
            DataNode::Stitches(refs) => {
                let key = refs.key()?;
                for [x, y] in &refs.coords {
                    sink.stitch(key, *x, *y);
                }
            }
        }
    }
    Ok(())
}

/// Rebuilds a document tree and definition table.
struct TreeSink {
    tree: DocumentTree,
    table: StitchTable,
    stack: Vec<NodeId>,
}

impl TreeSink {
    fn new(calculator: PositionCalculator) -> Self {
        Self {
            tree: DocumentTree::without_layers(),
            table: StitchTable::new(calculator),
            stack: Vec::new(),
        }
    }

    fn add_layer(&mut self, name: &str, state: LayerState) -> NodeId {
        let layer = self.tree.create_layer(name);
        self.tree.set_layer_state(layer, state);
        self.tree.insert_layer(self.tree.layer_count(), layer);
        layer
    }

    /// Current container; content outside any layer goes to a default one.
    fn container(&mut self) -> NodeId {
        if let Some(top) = self.stack.last() {
            return *top;
        }
        if let Some(layer) = self.tree.layers().last() {
            return *layer;
        }
        let name = self.tree.next_layer_name();
        self.add_layer(&name, LayerState::default())
    }

    fn finish(mut self) -> (DocumentTree, StitchTable) {
        if self.tree.layer_count() == 0 {
            let name = self.tree.next_layer_name();
            self.add_layer(&name, LayerState::default());
        }
        if let Some(first) = self.tree.layers().first().copied() {
            self.tree.set_active_layer(first);
        }
        (self.tree, self.table)
    }
}

impl PayloadSink for TreeSink {
    fn define(&mut self, key: GeometryKey) {
        self.table.intern(key);
    }

    fn enter_layer(&mut self, layer: &GroupData) -> bool {
        let state = LayerState {
            visible: layer.visible.unwrap_or(true),
            locked: layer.locked.unwrap_or(false),
        };
        let name = match &layer.name {
            Some(name) => name.clone(),
            None => self.tree.next_layer_name(),
        };
        let id = self.add_layer(&name, state);
        self.stack.push(id);
        true
    }

    fn enter_group(&mut self, x: i32, y: i32) {
        let parent = self.container();
        let group = self.tree.create_group(GridCoord::new(x, y));
        self.tree.append(parent, group);
        self.stack.push(group);
    }

    fn leave(&mut self) {
        self.stack.pop();
    }

    fn stitch(&mut self, key: GeometryKey, x: i32, y: i32) {
        self.table.intern(key);
        let parent = self.container();
        let stitch = self.tree.create_stitch(GridCoord::new(x, y), key);
        self.tree.append(parent, stitch);
    }

    fn pivot(&mut self, x: i32, y: i32, index: u32) {
        let pivot = self.tree.create_pivot(GridCoord::new(x, y), index);
        let layer = self.tree.pivot_layer();
        self.tree.append(layer, pivot);
    }
}

/// Collects nested template items; layers become groups at the origin.
#[derive(Default)]
struct TemplateSink {
    frames: Vec<(i32, i32, Vec<TemplateItem>)>,
    root: Vec<TemplateItem>,
    pivots: Vec<TemplatePivot>,
}

impl TemplateSink {
    fn items(&mut self) -> &mut Vec<TemplateItem> {
        match self.frames.last_mut() {
            Some((_, _, items)) => items,
            None => &mut self.root,
        }
    }
}

impl PayloadSink for TemplateSink {
    fn define(&mut self, _key: GeometryKey) {}

    fn enter_layer(&mut self, layer: &GroupData) -> bool {
        if !layer.visible.unwrap_or(true) {
            return false;
        }
        self.frames.push((0, 0, Vec::new()));
        true
    }

    fn enter_group(&mut self, x: i32, y: i32) {
        self.frames.push((x, y, Vec::new()));
    }

    fn leave(&mut self) {
        if let Some((x, y, items)) = self.frames.pop() {
            self.items().push(TemplateItem::Group { x, y, items });
        }
    }

    fn stitch(&mut self, key: GeometryKey, x: i32, y: i32) {
        self.items().push(TemplateItem::Stitch {
            x,
            y,
            length: key.length,
            color: Some(key.color),
        });
    }

    fn pivot(&mut self, x: i32, y: i32, _index: u32) {
        self.pivots.push(TemplatePivot::new(x, y, false));
    }
}

impl Pattern {
    /// Loads a container, replacing the document.
    ///
    /// The document is left untouched when the input fails to parse.
    pub fn read(&mut self, text: &str, options: &ReadOptions) -> Result<(), CodecError> {
        let blocks = parse_blocks(text)?;
        let data = payload(blocks.data)?;

        let mut settings = self.settings.clone();
        if !options.keep_settings {
            settings.apply_option_block(blocks.option.as_ref());
        }
        let calculator = PositionCalculator::choose(&Pattern::calc_params(&settings));

        let mut sink = TreeSink::new(calculator);
        if let Some(data) = &data {
            walk(data, &mut sink)?;
        }
        let (tree, table) = sink.finish();

        self.settings = settings;
        self.metadata = Metadata::from_block(blocks.metadata.as_ref());
        self.tree = tree;
        self.stitches = table;
        self.clear_history();
        self.set_modified(false);
        tracing::debug!(
            "Read {} layers, {} stitches, {} definitions",
            self.tree.layer_count(),
            self.tree.stitch_count(),
            self.stitches.len()
        );
        Ok(())
    }

    /// A new pattern loaded from a container.
    pub fn from_svg(text: &str) -> Result<Self, CodecError> {
        let mut pattern = Pattern::new();
        pattern.read(text, &ReadOptions::default())?;
        Ok(pattern)
    }
}

/// Reads a container as a template without building a document.
///
/// Hidden layers are skipped. Files without pivots get one at the corner
/// of the bounding box and `no_pivots` set.
pub fn read_template(text: &str) -> Result<Template, CodecError> {
    let blocks = parse_blocks(text)?;
    let data = payload(blocks.data)?;
    let mut template = Template {
        metadata: Some(Metadata::from_block(blocks.metadata.as_ref())),
        ..Template::default()
    };
    let Some(data) = data.filter(|d| d.data.is_some()) else {
        return Ok(template);
    };

    let mut sink = TemplateSink::default();
    walk(&data, &mut sink)?;

    template.bbox = data
        .bbox_rect()
        .unwrap_or_else(|| calculate_bbox(&sink.root, 0, 0));
    template.defs = sink.root;
    template.pivots = sink.pivots;
    if template.pivots.is_empty() {
        let GridRect { x, y, .. } = template.bbox;
        template.pivots.push(TemplatePivot::new(x, y, false));
        template.no_pivots = true;
    }
    template.valid = true;
    Ok(template)
}
