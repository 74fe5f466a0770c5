use super::Pattern;
use crate::commands::UndoEntry;
use std::fmt;
use std::str::FromStr;

/// Corner or center that stays fixed when the canvas is resized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResizeAnchor {
    #[default]
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    Center,
}

impl ResizeAnchor {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResizeAnchor::TopLeft => "base-top-left",
            ResizeAnchor::TopRight => "base-top-right",
            ResizeAnchor::BottomLeft => "base-bottom-left",
            ResizeAnchor::BottomRight => "base-bottom-right",
            ResizeAnchor::Center => "base-center",
        }
    }

    /// Shift applied to the content when the canvas grows by `(dw, dh)`.
    pub fn shift(&self, dw: i32, dh: i32) -> (i32, i32) {
        match self {
            ResizeAnchor::TopLeft => (0, 0),
            ResizeAnchor::TopRight => (dw, 0),
            ResizeAnchor::BottomLeft => (0, dh),
            ResizeAnchor::BottomRight => (dw, dh),
            ResizeAnchor::Center => (ceil_half(dw), ceil_half(dh)),
        }
    }
}

fn ceil_half(value: i32) -> i32 {
    (f64::from(value) / 2.0).ceil() as i32
}

impl fmt::Display for ResizeAnchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResizeAnchor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim_start_matches("base-") {
            "top-left" => Ok(ResizeAnchor::TopLeft),
            "top-right" => Ok(ResizeAnchor::TopRight),
            "bottom-left" => Ok(ResizeAnchor::BottomLeft),
            "bottom-right" => Ok(ResizeAnchor::BottomRight),
            "center" => Ok(ResizeAnchor::Center),
            other => Err(format!("unknown resize anchor '{}'", other)),
        }
    }
}

impl Pattern {
    /// Changes the grid cell count of the screen grid, shifting every
    /// top-level item and pivot so the anchor stays put.
    pub fn resize_canvas(&mut self, width: u32, height: u32, anchor: ResizeAnchor) -> bool {
        let old_size = (
            self.settings.view_grid.hori_count,
            self.settings.view_grid.vert_count,
        );
        let new_size = (width, height);
        if old_size == new_size {
            return false;
        }
        let (dx, dy) = anchor.shift(
            width as i32 - old_size.0 as i32,
            height as i32 - old_size.1 as i32,
        );
        self.push(UndoEntry::CanvasResize {
            dx,
            dy,
            old_size,
            new_size,
        });
        true
    }
}
