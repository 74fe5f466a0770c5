//! Stitch templates.
//!
//! A template is a reusable arrangement of stitches and groups with a set
//! of pivots the user can snap to while placing it. Templates come from
//! the generators below, from selected items, or from a pattern file.

use crate::pattern::ItemSpec;
use crate::tree::{DocumentTree, Node, NodeId};
use koginkit_core::{Color, GridCoord, GridRect};
use koginkit_settings::Metadata;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateKind {
    Single,
    Modoko,
    Katako,
    X,
    V,
    ReverseV,
    /// Taken from selected items.
    Copy,
    /// Read from a pattern file.
    File,
}

impl TemplateKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateKind::Single => "single",
            TemplateKind::Modoko => "modoko",
            TemplateKind::Katako => "katako",
            TemplateKind::X => "X",
            TemplateKind::V => "V",
            TemplateKind::ReverseV => "reverseV",
            TemplateKind::Copy => "copy",
            TemplateKind::File => "file",
        }
    }
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shape of a generated cross.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrossKind {
    X,
    V,
    ReverseV,
}

/// Snap point of a template. `right` marks pivots on the right edge of a
/// stitch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemplatePivot {
    pub x: i32,
    pub y: i32,
    pub right: bool,
}

impl TemplatePivot {
    pub fn new(x: i32, y: i32, right: bool) -> Self {
        Self { x, y, right }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TemplateItem {
    /// `color: None` takes the color chosen at placement.
    Stitch {
        x: i32,
        y: i32,
        length: u32,
        color: Option<Color>,
    },
    Group {
        x: i32,
        y: i32,
        items: Vec<TemplateItem>,
    },
}

impl TemplateItem {
    fn stitch(x: i32, y: i32, length: u32) -> Self {
        TemplateItem::Stitch {
            x,
            y,
            length,
            color: None,
        }
    }

    fn to_spec(&self, dx: i32, dy: i32, color: Color) -> ItemSpec {
        match self {
            TemplateItem::Stitch {
                x,
                y,
                length,
                color: own,
            } => ItemSpec::Stitch {
                position: GridCoord::new(x + dx, y + dy),
                length: *length,
                color: own.unwrap_or(color),
            },
            TemplateItem::Group { x, y, items } => ItemSpec::Group {
                offset: GridCoord::new(x + dx, y + dy),
                children: items.iter().map(|item| item.to_spec(0, 0, color)).collect(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    pub defs: Vec<TemplateItem>,
    pub pivots: Vec<TemplatePivot>,
    pub bbox: GridRect,
    pub kind: TemplateKind,
    pub size: u32,
    /// Place the items inside a new group.
    pub as_group: bool,
    /// False when a file carried no pattern payload.
    pub valid: bool,
    /// The source had no pivots; the single pivot is the box corner.
    pub no_pivots: bool,
    pub metadata: Option<Metadata>,
}

impl Default for Template {
    fn default() -> Self {
        Self {
            defs: Vec::new(),
            pivots: Vec::new(),
            bbox: GridRect::new(0, 0, 0, 0),
            kind: TemplateKind::File,
            size: 1,
            as_group: false,
            valid: false,
            no_pivots: false,
            metadata: None,
        }
    }
}

impl Template {
    fn generated(kind: TemplateKind, size: u32, defs: Vec<TemplateItem>, pivots: Vec<TemplatePivot>) -> Self {
        let bbox = calculate_bbox(&defs, 0, 0);
        Self {
            defs,
            pivots,
            bbox,
            kind,
            size,
            as_group: kind != TemplateKind::Single,
            valid: true,
            ..Self::default()
        }
    }

    /// One stitch of `length` cells.
    pub fn single(length: u32) -> Option<Self> {
        if length == 0 {
            return None;
        }
        let right = length as i32 - 1;
        Some(Self::generated(
            TemplateKind::Single,
            length,
            vec![TemplateItem::stitch(0, 0, length)],
            vec![TemplatePivot::new(0, 0, false), TemplatePivot::new(right, 0, true)],
        ))
    }

    /// Diamond of `rows` rows (odd, at least 3).
    pub fn modoko(rows: u32, step: i32) -> Option<Self> {
        let defs = match rows {
            3 => vec![
                TemplateItem::stitch(1, 0, 1),
                TemplateItem::stitch(0, 1, 3),
                TemplateItem::stitch(1, 2, 1),
            ],
            5 => vec![
                TemplateItem::stitch(2, 0, 1),
                TemplateItem::stitch(1, 1, 3),
                TemplateItem::stitch(0, 2, 5),
                TemplateItem::stitch(1, 3, 3),
                TemplateItem::stitch(2, 4, 1),
            ],
            r if r % 2 == 1 && r >= 7 && step > 0 => modoko_rows(r as i32, step),
            _ => return None,
        };
        let step = if rows <= 5 { 1 } else { step };
        Some(Self::generated(
            TemplateKind::Modoko,
            rows,
            defs,
            diamond_pivots(rows as i32, step),
        ))
    }

    /// Elongated diamond of `rows` rows (odd, at least 3).
    pub fn katako(rows: u32, step: i32) -> Option<Self> {
        let defs = match rows {
            3 => vec![
                TemplateItem::stitch(2, 0, 2),
                TemplateItem::stitch(0, 1, 6),
                TemplateItem::stitch(2, 2, 2),
            ],
            r if r % 2 == 1 && r >= 5 && step > 0 => katako_rows(r as i32, step),
            _ => return None,
        };
        let step = if rows == 3 { 2 } else { step };
        Some(Self::generated(
            TemplateKind::Katako,
            rows,
            defs,
            diamond_pivots(rows as i32, step),
        ))
    }

    /// Diagonal cross of `rows` rows (at least 2) around a center stitch.
    pub fn cross(kind: CrossKind, rows: u32, step: i32) -> Option<Self> {
        if rows < 2 || step <= 0 {
            return None;
        }
        let inner = rows as i32 - 2;
        let upper = kind != CrossKind::ReverseV;
        let lower = kind != CrossKind::V;

        let mut defs = vec![TemplateItem::stitch(0, 0, 3)];
        let mut offset = step;
        if upper {
            defs.push(TemplateItem::stitch(-offset, -1, 5));
        }
        if lower {
            defs.push(TemplateItem::stitch(-offset, 1, 5));
        }
        offset += step;
        for n in 0..inner {
            let row = 2 + n;
            if upper {
                defs.push(TemplateItem::stitch(-offset, -row, 3));
                defs.push(TemplateItem::stitch(offset, -row, 3));
            }
            if lower {
                defs.push(TemplateItem::stitch(-offset, row, 3));
                defs.push(TemplateItem::stitch(offset, row, 3));
            }
            offset += step;
        }

        let mut pivots = vec![TemplatePivot::new(0, 0, false), TemplatePivot::new(3, 0, true)];
        let edge = inner + 1;
        if upper {
            pivots.push(TemplatePivot::new(-edge, -edge, false));
            pivots.push(TemplatePivot::new(inner + 4, -edge, true));
        }
        if lower {
            pivots.push(TemplatePivot::new(-edge, edge, false));
            pivots.push(TemplatePivot::new(inner + 4, edge, true));
        }
        let kind = match kind {
            CrossKind::X => TemplateKind::X,
            CrossKind::V => TemplateKind::V,
            CrossKind::ReverseV => TemplateKind::ReverseV,
        };
        Some(Self::generated(kind, rows, defs, pivots))
    }

    /// Template made of existing items, with local coordinates kept.
    pub fn from_items(tree: &DocumentTree, ids: &[NodeId]) -> Option<Self> {
        let defs: Vec<TemplateItem> = ids
            .iter()
            .filter_map(|id| item_from_node(tree, *id))
            .collect();
        if defs.is_empty() {
            return None;
        }
        let single = defs.len() == 1 && matches!(defs[0], TemplateItem::Stitch { .. });
        if single {
            if let TemplateItem::Stitch { length, color, .. } = defs[0] {
                let mut template = Self::single(length)?;
                template.defs = vec![TemplateItem::Stitch {
                    x: 0,
                    y: 0,
                    length,
                    color,
                }];
                return Some(template);
            }
        }
        let bbox = calculate_bbox(&defs, 0, 0);
        Some(Self {
            defs,
            pivots: vec![TemplatePivot::new(bbox.x, bbox.y, false)],
            bbox,
            kind: TemplateKind::Copy,
            valid: true,
            ..Self::default()
        })
    }

    pub fn is_single(&self) -> bool {
        self.kind == TemplateKind::Single
    }

    pub fn single_length(&self) -> Option<u32> {
        match self.defs.as_slice() {
            [TemplateItem::Stitch { length, .. }] if self.is_single() => Some(*length),
            _ => None,
        }
    }

    /// Mirror image around the left edge of the bounding box.
    pub fn horizontal_mirror(&self) -> Self {
        let x = self.bbox.x;
        Self {
            defs: mirror_items_horizontally(&self.defs, x),
            pivots: self
                .pivots
                .iter()
                .map(|p| TemplatePivot::new(2 * x - p.x - 1, p.y, !p.right))
                .collect(),
            bbox: GridRect::new(x - self.bbox.width, self.bbox.y, self.bbox.width, self.bbox.height),
            ..self.clone()
        }
    }

    /// Mirror image around the top edge of the bounding box.
    pub fn vertical_mirror(&self) -> Self {
        let y = self.bbox.y;
        Self {
            defs: mirror_items_vertically(&self.defs, y),
            pivots: self
                .pivots
                .iter()
                .map(|p| TemplatePivot::new(p.x, 2 * y - p.y, p.right))
                .collect(),
            bbox: GridRect::new(self.bbox.x, y - self.bbox.height + 1, self.bbox.width, self.bbox.height),
            ..self.clone()
        }
    }

    /// Template origin that puts pivot `index` on `at`.
    pub fn origin_for_pivot(&self, index: usize, at: GridCoord) -> GridCoord {
        match self.pivots.get(index) {
            Some(pivot) => GridCoord::new(at.x - pivot.x, at.y - pivot.y),
            None => at,
        }
    }

    /// Items to insert with the template origin at `origin`. Stitches
    /// without a color take `color`.
    pub fn to_specs(&self, origin: GridCoord, color: Color) -> Vec<ItemSpec> {
        if self.as_group && self.defs.len() > 1 {
            vec![ItemSpec::Group {
                offset: origin,
                children: self.defs.iter().map(|d| d.to_spec(0, 0, color)).collect(),
            }]
        } else {
            self.defs
                .iter()
                .map(|d| d.to_spec(origin.x, origin.y, color))
                .collect()
        }
    }
}

fn modoko_rows(rows: i32, step: i32) -> Vec<TemplateItem> {
    let half = rows / 2;
    let mut defs = Vec::new();
    let mut offset = half * step;
    let mut offset_right = offset;
    let mut row = 0;
    let mut length = 1;
    while row < 3 {
        defs.push(TemplateItem::stitch(offset, row, length as u32));
        offset -= step;
        length += 2 * step;
        row += 1;
    }
    offset_right += step;
    while row < half {
        defs.push(TemplateItem::stitch(offset, row, 3));
        offset -= step;
        defs.push(TemplateItem::stitch(offset_right, row, 3));
        offset_right += step;
        row += 1;
    }
    while row < rows - 3 {
        defs.push(TemplateItem::stitch(offset, row, 3));
        offset += step;
        defs.push(TemplateItem::stitch(offset_right, row, 3));
        offset_right -= step;
        row += 1;
    }
    let mut length = 1 + 4 * step;
    while row < rows {
        defs.push(TemplateItem::stitch(offset, row, length as u32));
        offset += step;
        length -= 2 * step;
        row += 1;
    }
    defs
}

fn katako_rows(rows: i32, step: i32) -> Vec<TemplateItem> {
    let half = rows / 2;
    let mut defs = Vec::new();
    let mut offset = half * step;
    let mut offset_right = offset;
    defs.push(TemplateItem::stitch(offset, 0, 2));
    offset -= step;
    defs.push(TemplateItem::stitch(offset, 1, 6));
    offset -= step;
    offset_right += step;
    let mut row = 2;
    while row < half {
        defs.push(TemplateItem::stitch(offset, row, 4));
        offset -= step;
        defs.push(TemplateItem::stitch(offset_right, row, 4));
        offset_right += step;
        row += 1;
    }
    while row < rows - 2 {
        defs.push(TemplateItem::stitch(offset, row, 4));
        offset += step;
        defs.push(TemplateItem::stitch(offset_right, row, 4));
        offset_right -= step;
        row += 1;
    }
    defs.push(TemplateItem::stitch(offset, row, 6));
    offset += step;
    defs.push(TemplateItem::stitch(offset, row + 1, 2));
    defs
}

fn diamond_pivots(rows: i32, step: i32) -> Vec<TemplatePivot> {
    let half = rows / 2;
    vec![
        TemplatePivot::new(0, half, false),
        TemplatePivot::new(half * step, rows - 1, false),
        TemplatePivot::new(rows * step - 1, half, true),
        TemplatePivot::new(half * step, 0, false),
        // center
        TemplatePivot::new(half * step, half, false),
    ]
}

fn item_from_node(tree: &DocumentTree, id: NodeId) -> Option<TemplateItem> {
    match tree.node(id)? {
        Node::Stitch(stitch) => Some(TemplateItem::Stitch {
            x: stitch.position.x,
            y: stitch.position.y,
            length: stitch.key.length,
            color: Some(stitch.key.color),
        }),
        Node::Group(group) => Some(TemplateItem::Group {
            x: group.offset.x,
            y: group.offset.y,
            items: group
                .children
                .iter()
                .filter_map(|child| item_from_node(tree, *child))
                .collect(),
        }),
        Node::Pivot(_) => None,
    }
}

/// Bounding box of `defs` placed at `(x, y)`. Empty input yields a
/// zero-sized box at `(x, y)`.
pub fn calculate_bbox(defs: &[TemplateItem], x: i32, y: i32) -> GridRect {
    bbox_of(defs, x, y).unwrap_or_else(|| GridRect::new(x, y, 0, 0))
}

fn bbox_of(defs: &[TemplateItem], x: i32, y: i32) -> Option<GridRect> {
    defs.iter()
        .filter_map(|item| match item {
            TemplateItem::Stitch {
                x: sx,
                y: sy,
                length,
                ..
            } => Some(GridRect::new(sx + x, sy + y, *length as i32, 1)),
            TemplateItem::Group {
                x: gx,
                y: gy,
                items,
            } => bbox_of(items, gx + x, gy + y),
        })
        .reduce(|a, b| a.union(&b))
}

fn mirror_items_horizontally(defs: &[TemplateItem], x: i32) -> Vec<TemplateItem> {
    defs.iter()
        .map(|item| match item {
            TemplateItem::Stitch {
                x: sx,
                y,
                length,
                color,
            } => TemplateItem::Stitch {
                x: 2 * x - sx - *length as i32,
                y: *y,
                length: *length,
                color: *color,
            },
            TemplateItem::Group { x: gx, y, items } => TemplateItem::Group {
                x: 2 * x - gx,
                y: *y,
                items: mirror_items_horizontally(items, 0),
            },
        })
        .collect()
}

fn mirror_items_vertically(defs: &[TemplateItem], y: i32) -> Vec<TemplateItem> {
    defs.iter()
        .map(|item| match item {
            TemplateItem::Stitch {
                x,
                y: sy,
                length,
                color,
            } => TemplateItem::Stitch {
                x: *x,
                y: 2 * y - sy,
                length: *length,
                color: *color,
            },
            TemplateItem::Group { x, y: gy, items } => TemplateItem::Group {
                x: *x,
                y: 2 * y - gy,
                items: mirror_items_vertically(items, 0),
            },
        })
        .collect()
}
