use std::collections::BTreeSet;
use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use crate::api::session::PuzzleTuning;
use crate::api::types::PieceId;
use crate::core::geometry::{BoardBounds, Rect};

/// Reasons a puzzle manifest is rejected at load time.
#[derive(Debug, Error)]
pub enum DescriptorError {
    #[error("puzzle grid needs at least one column and one row (got {cols}x{rows})")]
    EmptyGrid { cols: u32, rows: u32 },
    #[error("a {cols}x{rows} grid does not hold {piece_count} pieces")]
    GridMismatch { cols: u32, rows: u32, piece_count: u32 },
    #[error("skip id {id} is outside 1..={piece_count}")]
    SkipOutOfRange { id: u32, piece_count: u32 },
    #[error("view box must have a positive size (got {width}x{height})")]
    InvalidViewBox { width: f32, height: f32 },
    #[error("expected {expected} piece shapes, got {actual}")]
    ShapeCount { expected: usize, actual: usize },
    #[error("manifest parse failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Static description of one puzzle: grid, skip list and native artwork extent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PuzzleDescriptor {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub cols: u32,
    pub rows: u32,
    pub piece_count: u32,
    /// Piece ids excluded from play.
    #[serde(default)]
    pub skip_ids: Vec<u32>,
    /// Native coordinate extent of the artwork.
    #[serde(default = "default_view_box")]
    pub view_box: Rect,
    #[serde(default)]
    pub image_src: Option<String>,
    #[serde(default)]
    pub paths_src: Option<String>,
}

fn default_view_box() -> Rect {
    Rect::new(0.0, 0.0, 1000.0, 1000.0)
}

impl PuzzleDescriptor {
    pub fn validate(&self) -> Result<(), DescriptorError> {
        if self.cols == 0 || self.rows == 0 {
            return Err(DescriptorError::EmptyGrid { cols: self.cols, rows: self.rows });
        }
        if self.cols.checked_mul(self.rows) != Some(self.piece_count) {
            return Err(DescriptorError::GridMismatch {
                cols: self.cols,
                rows: self.rows,
                piece_count: self.piece_count,
            });
        }
        if let Some(&id) = self.skip_ids.iter().find(|id| **id == 0 || **id > self.piece_count) {
            return Err(DescriptorError::SkipOutOfRange { id, piece_count: self.piece_count });
        }
        let vb = &self.view_box;
        if !(vb.width > 0.0 && vb.height > 0.0) {
            return Err(DescriptorError::InvalidViewBox { width: vb.width, height: vb.height });
        }
        Ok(())
    }

    pub fn is_skipped(&self, id: PieceId) -> bool {
        self.skip_ids.contains(&id.0)
    }

    /// Configured piece count minus distinct in-range skip ids.
    pub fn active_piece_count(&self) -> usize {
        let skipped: BTreeSet<u32> = self
            .skip_ids
            .iter()
            .copied()
            .filter(|id| (1..=self.piece_count).contains(id))
            .collect();
        self.piece_count as usize - skipped.len()
    }

    pub fn board_bounds(&self, margin: f32) -> BoardBounds {
        BoardBounds::from_view_box(&self.view_box, margin)
    }

    /// Native size of one grid cell.
    pub fn cell_size(&self) -> Vec2 {
        Vec2::new(
            self.view_box.width / self.cols.max(1) as f32,
            self.view_box.height / self.rows.max(1) as f32,
        )
    }
}

/// Geometry of one cut piece in native units, as produced by the asset layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PieceShape {
    pub bounds: Rect,
    #[serde(default)]
    pub visual_center: Option<[f32; 2]>,
}

impl PieceShape {
    pub fn new(bounds: Rect) -> Self {
        Self { bounds, visual_center: None }
    }

    /// Base position: the visual center when known, otherwise the bounds center.
    pub fn center(&self) -> Vec2 {
        match self.visual_center {
            Some([x, y]) => Vec2::new(x, y),
            None => self.bounds.center(),
        }
    }
}

/// Everything needed to load a puzzle, as one JSON document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PuzzleManifest {
    pub puzzle: PuzzleDescriptor,
    #[serde(default)]
    pub shapes: Vec<PieceShape>,
    #[serde(default)]
    pub tuning: Option<PuzzleTuning>,
}

impl PuzzleManifest {
    /// Parse a manifest from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, DescriptorError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn validate(&self) -> Result<(), DescriptorError> {
        self.puzzle.validate()?;
        let expected = self.puzzle.piece_count as usize;
        if self.shapes.len() != expected {
            return Err(DescriptorError::ShapeCount { expected, actual: self.shapes.len() });
        }
        Ok(())
    }
}

/// Grid column and row of a 1-based, row-major piece id.
pub fn grid_cell(id: PieceId, cols: u32) -> (u32, u32) {
    let idx = id.0.saturating_sub(1);
    let cols = cols.max(1);
    (idx % cols, idx / cols)
}

/// Number shapes 1..=N by scan position: top to bottom, then left to right by center.
/// The result is index-aligned with `shapes`.
pub fn assign_piece_ids(shapes: &[PieceShape]) -> Vec<PieceId> {
    let mut order: Vec<usize> = (0..shapes.len()).collect();
    order.sort_by(|a, b| {
        let (ca, cb) = (shapes[*a].center(), shapes[*b].center());
        ca.y.total_cmp(&cb.y).then(ca.x.total_cmp(&cb.x))
    });
    let mut ids = vec![PieceId(0); shapes.len()];
    for (rank, idx) in order.into_iter().enumerate() {
        ids[idx] = PieceId(rank as u32 + 1);
    }
    ids
}
