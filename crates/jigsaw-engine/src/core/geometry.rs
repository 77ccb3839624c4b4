use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in puzzle-native units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    pub fn max_x(&self) -> f32 {
        self.x + self.width
    }

    pub fn max_y(&self) -> f32 {
        self.y + self.height
    }

    /// Smallest rectangle containing both.
    pub fn union(&self, other: &Rect) -> Rect {
        let min_x = self.x.min(other.x);
        let min_y = self.y.min(other.y);
        let max_x = self.max_x().max(other.max_x());
        let max_y = self.max_y().max(other.max_y());
        Rect::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }

    pub fn translated(&self, offset: Vec2) -> Rect {
        Rect::new(self.x + offset.x, self.y + offset.y, self.width, self.height)
    }
}

/// Board limits: the native puzzle extent expanded by a margin on every side.
/// Used both for scatter placement and for validating drag releases.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoardBounds {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl BoardBounds {
    /// Expand the native view box by `margin` × its extent on each axis, on both sides.
    pub fn from_view_box(view_box: &Rect, margin: f32) -> Self {
        let extra_x = view_box.width * margin;
        let extra_y = view_box.height * margin;
        let min_x = view_box.x - extra_x;
        let min_y = view_box.y - extra_y;
        Self {
            min_x,
            min_y,
            max_x: min_x + view_box.width + 2.0 * extra_x,
            max_y: min_y + view_box.height + 2.0 * extra_y,
        }
    }

    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f32 {
        self.max_y - self.min_y
    }

    /// Bounds pulled inward by `padding` on every side.
    pub fn shrunk(&self, padding: f32) -> Self {
        Self {
            min_x: self.min_x + padding,
            min_y: self.min_y + padding,
            max_x: self.max_x - padding,
            max_y: self.max_y - padding,
        }
    }

    /// Inclusive point containment.
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }

    /// Whether the rectangle lies entirely inside the bounds.
    pub fn contains_rect(&self, r: &Rect) -> bool {
        r.x >= self.min_x && r.max_x() <= self.max_x && r.y >= self.min_y && r.max_y() <= self.max_y
    }
}

/// Client-space rectangle of the render surface (CSS pixels).
///
/// The surface shows the whole board with `preserveAspectRatio="xMidYMid meet"`:
/// uniform scale to fit, centered on the unused axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self { left, top, width, height }
    }

    /// Map a client-space pointer position into puzzle-native units.
    /// Returns `None` while the surface has no usable size.
    pub fn map_client(&self, board: &BoardBounds, client_x: f32, client_y: f32) -> Option<Vec2> {
        let view_w = board.width();
        let view_h = board.height();
        if self.width <= 0.0 || self.height <= 0.0 || view_w <= 0.0 || view_h <= 0.0 {
            return None;
        }
        let scale = (self.width / view_w).min(self.height / view_h);
        let pad_x = (self.width - view_w * scale) * 0.5;
        let pad_y = (self.height - view_h * scale) * 0.5;
        let x = board.min_x + (client_x - self.left - pad_x) / scale;
        let y = board.min_y + (client_y - self.top - pad_y) / scale;
        if x.is_finite() && y.is_finite() {
            Some(Vec2::new(x, y))
        } else {
            None
        }
    }
}

/// Optional viewport: unattached surfaces report geometry as unavailable.
pub fn map_pointer(viewport: Option<&Viewport>, board: &BoardBounds, client: Vec2) -> Option<Vec2> {
    viewport.and_then(|vp| vp.map_client(board, client.x, client.y))
}
