use glam::Vec2;
use crate::api::types::{GroupId, PieceId};
use crate::core::geometry::Rect;

/// One puzzle piece.
///
/// Everything except `group` is fixed at load time. A piece's world position is
/// `base + group.offset`.
#[derive(Debug, Clone)]
pub struct Piece {
    /// Identity, 1..=N in sorted scan order.
    pub id: PieceId,
    /// Grid column (0-based).
    pub col: u32,
    /// Grid row (0-based).
    pub row: u32,
    /// Visual center when the owning group's offset is zero, in puzzle units.
    pub base: Vec2,
    /// Bounding box at zero offset, in puzzle units.
    pub bounds: Rect,
    /// Opaque index of the drawable this piece was built from.
    pub handle: usize,
    /// Group this piece currently belongs to.
    pub group: GroupId,
}

impl Piece {
    /// Create a piece whose bounding box is a point at `base`.
    /// The group id is a placeholder until the store assigns one.
    pub fn new(id: PieceId, base: Vec2) -> Self {
        Self {
            id,
            col: 0,
            row: 0,
            base,
            bounds: Rect::new(base.x, base.y, 0.0, 0.0),
            handle: 0,
            group: GroupId(0),
        }
    }

    // -- Builder pattern --

    pub fn with_grid(mut self, col: u32, row: u32) -> Self {
        self.col = col;
        self.row = row;
        self
    }

    pub fn with_bounds(mut self, bounds: Rect) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn with_handle(mut self, handle: usize) -> Self {
        self.handle = handle;
        self
    }

    /// World position given the owning group's offset.
    pub fn world(&self, offset: Vec2) -> Vec2 {
        self.base + offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_fields() {
        let p = Piece::new(PieceId(7), Vec2::new(10.0, 20.0))
            .with_grid(1, 1)
            .with_bounds(Rect::new(0.0, 0.0, 20.0, 40.0))
            .with_handle(3);
        assert_eq!(p.col, 1);
        assert_eq!(p.row, 1);
        assert_eq!(p.handle, 3);
        assert_eq!(p.bounds.width, 20.0);
    }

    #[test]
    fn world_adds_offset() {
        let p = Piece::new(PieceId(1), Vec2::new(5.0, 5.0));
        assert_eq!(p.world(Vec2::new(1.0, -2.0)), Vec2::new(6.0, 3.0));
    }
}
