use std::f32::consts::TAU;
use glam::Vec2;
use crate::api::session::PuzzleTuning;
use crate::core::geometry::{BoardBounds, Rect};
use crate::core::store::PieceStore;
use super::rng::Rng;

/// Pick an offset for a group whose zero-offset bounding box is `bounds`.
///
/// Tries `attempts` polar samples (radius uniform in `[r_min, r_max]`, angle uniform)
/// and accepts the first whose translated box fits the board. Otherwise falls back to a
/// uniform offset inside the feasible band, which always terminates in bounds when the
/// box is smaller than the board.
pub fn scatter_offset(
    bounds: &Rect,
    board: &BoardBounds,
    r_min: f32,
    r_max: f32,
    attempts: u32,
    rng: &mut Rng,
) -> Vec2 {
    for _ in 0..attempts {
        let angle = rng.next_f32() * TAU;
        let r = rng.range(r_min, r_max);
        let offset = Vec2::new(r * angle.cos(), r * angle.sin());
        if board.contains_rect(&bounds.translated(offset)) {
            return offset;
        }
    }

    let min_dx = board.min_x - bounds.x;
    let max_dx = board.max_x - bounds.max_x();
    let min_dy = board.min_y - bounds.y;
    let max_dy = board.max_y - bounds.max_y();
    Vec2::new(
        min_dx + rng.next_f32() * (max_dx - min_dx).max(0.001),
        min_dy + rng.next_f32() * (max_dy - min_dy).max(0.001),
    )
}

/// Place every group independently at a random offset inside the board.
/// Overlap between pieces is allowed; there is no collision avoidance.
pub fn scatter_all_groups(
    store: &mut PieceStore,
    board: &BoardBounds,
    puzzle_size: Vec2,
    tuning: &PuzzleTuning,
    rng: &mut Rng,
) {
    let radius_base = puzzle_size.x.min(puzzle_size.y);
    let r_min = radius_base * tuning.scatter_radius_min;
    let r_max = radius_base * tuning.scatter_radius_max;

    for gid in store.group_ids() {
        let bounds = store
            .members(gid)
            .iter()
            .filter_map(|pid| store.piece(*pid).map(|p| p.bounds))
            .reduce(|a, b| a.union(&b));
        let Some(bounds) = bounds else {
            continue;
        };
        let offset = scatter_offset(&bounds, board, r_min, r_max, tuning.scatter_attempts, rng);
        if let Some(group) = store.group_mut(gid) {
            group.offset = offset;
        }
    }
}
