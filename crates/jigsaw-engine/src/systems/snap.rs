use crate::api::types::{GroupId, PieceId};
use crate::components::group::GroupPhase;
use crate::core::store::PieceStore;

/// Grid shape and piece size of the loaded puzzle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSpec {
    pub cols: u32,
    pub rows: u32,
    /// Native width of one grid cell.
    pub piece_width: f32,
    /// Native height of one grid cell.
    pub piece_height: f32,
}

impl GridSpec {
    /// Maximum per-axis misalignment that still snaps.
    pub fn snap_threshold(&self, tolerance_factor: f32) -> f32 {
        self.piece_width * tolerance_factor
    }
}

/// 4-connected grid neighbors of `id` in left, right, up, down order.
/// Ids are 1-based and laid out row-major; edge cells yield fewer neighbors.
pub fn grid_neighbors(id: PieceId, cols: u32, rows: u32) -> Vec<PieceId> {
    if cols == 0 || id.0 == 0 {
        return Vec::new();
    }
    let idx = id.0 - 1;
    let col = idx % cols;
    let row = idx / cols;
    let mut out = Vec::with_capacity(4);
    if col > 0 {
        out.push(PieceId(id.0 - 1));
    }
    if col + 1 < cols {
        out.push(PieceId(id.0 + 1));
    }
    if row > 0 {
        out.push(PieceId(id.0 - cols));
    }
    if row + 1 < rows {
        out.push(PieceId(id.0 + cols));
    }
    out
}

/// Find a neighboring group aligned with `moving` within `threshold` on both axes.
///
/// Members are scanned in ascending id order and neighbors in left/right/up/down order;
/// the first qualifying neighbor wins. Skip-listed neighbors are simply absent from the store,
/// and a neighbor whose group is being dragged does not qualify.
pub fn find_snap_target(store: &PieceStore, moving: GroupId, grid: &GridSpec, threshold: f32) -> Option<GroupId> {
    let group = store.group(moving)?;
    for pid in &group.members {
        let Some(piece) = store.piece(*pid) else {
            continue;
        };
        let pos = piece.world(group.offset);
        for nid in grid_neighbors(piece.id, grid.cols, grid.rows) {
            let Some(neighbor) = store.piece(nid) else {
                continue;
            };
            if neighbor.group == moving {
                continue;
            }
            // A group under the pointer is never absorbed mid-drag.
            if store.group(neighbor.group).map_or(true, |g| g.is_dragging()) {
                continue;
            }
            let Some(neighbor_pos) = store.world_position(nid) else {
                continue;
            };
            let expected = neighbor.base - piece.base;
            let actual = neighbor_pos - pos;
            let diff = (actual - expected).abs();
            if diff.x <= threshold && diff.y <= threshold {
                return Some(neighbor.group);
            }
        }
    }
    None
}

/// One merge performed while snapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeStep {
    pub anchor: GroupId,
    pub absorbed: GroupId,
    /// Member count of the anchor after the merge.
    pub size: usize,
}

/// Result of a snap pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapOutcome {
    /// Merges in the order they happened.
    pub merges: Vec<MergeStep>,
    /// The group that holds the moved pieces afterwards.
    pub group: GroupId,
}

impl SnapOutcome {
    pub fn merged(&self) -> bool {
        !self.merges.is_empty()
    }
}

/// Snap `moving` onto aligned neighbors, cascading until no further neighbor qualifies.
///
/// On each hit the frontier group's offset is set exactly to the anchor's offset (zero
/// residual misalignment), the anchor absorbs it, and the combined group becomes the new
/// frontier. A resting anchor inherits the frontier's tilt and settles it out; an anchor
/// already in motion keeps its own. Returns `None` if `moving` no longer exists.
pub fn snap_and_merge(store: &mut PieceStore, moving: GroupId, grid: &GridSpec, threshold: f32) -> Option<SnapOutcome> {
    if !store.contains_group(moving) {
        log::debug!("snap skipped: group {:?} no longer exists", moving);
        return None;
    }
    let mut frontier = moving;
    let mut merges = Vec::new();

    while let Some(anchor) = find_snap_target(store, frontier, grid, threshold) {
        let Some(anchor_offset) = store.group(anchor).map(|g| g.offset) else {
            break;
        };
        let Some(tilt) = store.group_mut(frontier).map(|g| {
            g.offset = anchor_offset;
            g.rotation.clone()
        }) else {
            break;
        };
        let Some(merged) = store.merge_groups(anchor, frontier) else {
            break;
        };
        if let Some(g) = store.group_mut(merged) {
            if matches!(g.phase, GroupPhase::Idle) {
                g.rotation = tilt;
                g.rotation.torque = 0.0;
                g.phase = GroupPhase::Settling;
            }
        }
        let size = store.group(merged).map(|g| g.len()).unwrap_or(0);
        log::debug!("group {:?} absorbed {:?} ({} pieces)", merged, frontier, size);
        merges.push(MergeStep {
            anchor: merged,
            absorbed: frontier,
            size,
        });
        frontier = merged;
    }

    debug_assert!(store.is_partition());
    Some(SnapOutcome { merges, group: frontier })
}

/// All `active_pieces` pieces are in a single group.
pub fn is_solved(store: &PieceStore, active_pieces: usize) -> bool {
    active_pieces > 0
        && store.group_count() == 1
        && store.groups().next().map(|g| g.len()) == Some(active_pieces)
}

/// Edge-triggered win detector: fires once per solve until reset.
#[derive(Debug, Clone, Default)]
pub struct WinLatch {
    fired: bool,
}

impl WinLatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true only on the first call with `solved == true` since the last reset.
    pub fn trigger(&mut self, solved: bool) -> bool {
        if solved && !self.fired {
            self.fired = true;
            true
        } else {
            false
        }
    }

    pub fn has_fired(&self) -> bool {
        self.fired
    }

    /// Make the latch eligible again (reshuffle or new puzzle).
    pub fn reset(&mut self) {
        self.fired = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use crate::components::piece::Piece;
    use crate::core::geometry::Rect;

    const W: f32 = 100.0;

    fn grid(cols: u32, rows: u32) -> GridSpec {
        GridSpec { cols, rows, piece_width: W, piece_height: W }
    }

    fn store(cols: u32, rows: u32, skip: &[u32]) -> PieceStore {
        PieceStore::with_pieces((0..cols * rows).filter(|i| !skip.contains(&(i + 1))).map(|i| {
            let (c, r) = (i % cols, i / cols);
            let bounds = Rect::new(c as f32 * W, r as f32 * W, W, W);
            Piece::new(PieceId(i + 1), bounds.center()).with_grid(c, r).with_bounds(bounds)
        }))
    }

    fn set_offset(store: &mut PieceStore, piece: u32, offset: Vec2) -> GroupId {
        let gid = store.group_of(PieceId(piece)).unwrap();
        store.group_mut(gid).unwrap().offset = offset;
        gid
    }

    #[test]
    fn neighbors_respect_edges() {
        // 5 x 6 grid, id 1 is the top-left corner.
        assert_eq!(grid_neighbors(PieceId(1), 5, 6), vec![PieceId(2), PieceId(6)]);
        assert_eq!(
            grid_neighbors(PieceId(7), 5, 6),
            vec![PieceId(6), PieceId(8), PieceId(2), PieceId(12)]
        );
        assert_eq!(grid_neighbors(PieceId(30), 5, 6), vec![PieceId(29), PieceId(25)]);
    }

    #[test]
    fn tolerance_boundary_is_inclusive() {
        let g = grid(2, 1);
        let threshold = g.snap_threshold(0.18);
        assert_eq!(threshold, 18.0);

        let mut s = store(2, 1, &[]);
        let mover = set_offset(&mut s, 2, Vec2::new(threshold, threshold));
        assert!(find_snap_target(&s, mover, &g, threshold).is_some());

        let mut s = store(2, 1, &[]);
        let mover = set_offset(&mut s, 2, Vec2::new(threshold + 0.01, 0.0));
        assert!(find_snap_target(&s, mover, &g, threshold).is_none());

        let mut s = store(2, 1, &[]);
        let mover = set_offset(&mut s, 2, Vec2::new(0.0, -(threshold + 0.01)));
        assert!(find_snap_target(&s, mover, &g, threshold).is_none());
    }

    #[test]
    fn merge_snaps_offset_exactly() {
        let g = grid(2, 1);
        let mut s = store(2, 1, &[]);
        let anchor = set_offset(&mut s, 1, Vec2::new(40.0, 40.0));
        let mover = set_offset(&mut s, 2, Vec2::new(45.0, 33.0));
        let outcome = snap_and_merge(&mut s, mover, &g, 18.0).unwrap();
        assert_eq!(outcome.group, anchor);
        assert_eq!(outcome.merges.len(), 1);
        let expected = s.piece(PieceId(2)).unwrap().base - s.piece(PieceId(1)).unwrap().base;
        let actual = s.world_position(PieceId(2)).unwrap() - s.world_position(PieceId(1)).unwrap();
        assert_eq!(actual, expected);
    }

    #[test]
    fn chained_merge_in_one_pass() {
        // A-B-C in a row; B and C already sit together at the same offset, A drops next to B.
        let g = grid(3, 1);
        let mut s = store(3, 1, &[]);
        let a = set_offset(&mut s, 1, Vec2::new(-200.0, 50.0));
        set_offset(&mut s, 2, Vec2::new(30.0, 30.0));
        set_offset(&mut s, 3, Vec2::new(35.0, 25.0));

        // Move A into alignment with B.
        s.group_mut(a).unwrap().offset = Vec2::new(31.0, 28.0);
        let outcome = snap_and_merge(&mut s, a, &g, 18.0).unwrap();

        assert_eq!(outcome.merges.len(), 2);
        assert_eq!(s.group_count(), 1);
        assert_eq!(s.members(outcome.group), vec![PieceId(1), PieceId(2), PieceId(3)]);
        assert!(s.is_partition());
    }

    #[test]
    fn skip_listed_neighbors_are_ignored() {
        let g = grid(3, 1);
        let mut s = store(3, 1, &[2]);
        // 1 and 3 are not grid neighbors, so even at identical offsets nothing snaps.
        let mover = set_offset(&mut s, 3, Vec2::ZERO);
        let outcome = snap_and_merge(&mut s, mover, &g, 18.0).unwrap();
        assert!(!outcome.merged());
        assert_eq!(s.group_count(), 2);
    }

    #[test]
    fn resting_anchor_takes_over_the_tilt() {
        let g = grid(2, 1);
        let mut s = store(2, 1, &[]);
        let anchor = s.group_of(PieceId(1)).unwrap();
        let mover = s.group_of(PieceId(2)).unwrap();
        {
            let m = s.group_mut(mover).unwrap();
            m.phase = GroupPhase::Settling;
            m.rotation.angle = 6.5;
            m.rotation.velocity = -20.0;
            m.rotation.boost_until_ms = Some(300.0);
        }
        snap_and_merge(&mut s, mover, &g, 18.0).unwrap();
        let merged = s.group(anchor).unwrap();
        assert_eq!(merged.phase, GroupPhase::Settling);
        assert_eq!(merged.rotation.angle, 6.5);
        assert_eq!(merged.rotation.velocity, -20.0);
        assert_eq!(merged.rotation.boost_until_ms, Some(300.0));
    }

    #[test]
    fn moving_anchor_keeps_its_own_tilt() {
        let g = grid(2, 1);
        let mut s = store(2, 1, &[]);
        let anchor = s.group_of(PieceId(1)).unwrap();
        s.group_mut(anchor).unwrap().phase = GroupPhase::Settling;
        s.group_mut(anchor).unwrap().rotation.angle = -2.0;
        let mover = s.group_of(PieceId(2)).unwrap();
        s.group_mut(mover).unwrap().rotation.angle = 9.0;
        snap_and_merge(&mut s, mover, &g, 18.0).unwrap();
        assert_eq!(s.group(anchor).unwrap().rotation.angle, -2.0);
    }

    #[test]
    fn held_neighbor_is_not_a_target() {
        let g = grid(2, 1);
        let mut s = store(2, 1, &[]);
        let held = s.group_of(PieceId(1)).unwrap();
        s.group_mut(held).unwrap().phase = GroupPhase::Dragging;
        let mover = s.group_of(PieceId(2)).unwrap();
        assert!(find_snap_target(&s, mover, &g, 18.0).is_none());
    }

    #[test]
    fn missing_group_is_skipped() {
        let g = grid(2, 1);
        let mut s = store(2, 1, &[]);
        assert!(snap_and_merge(&mut s, GroupId(404), &g, 18.0).is_none());
        assert_eq!(s.group_count(), 2);
    }

    #[test]
    fn solved_requires_one_full_group() {
        let g = grid(2, 2);
        let mut s = store(2, 2, &[]);
        assert!(!is_solved(&s, 4));
        let mover = s.group_of(PieceId(1)).unwrap();
        snap_and_merge(&mut s, mover, &g, 18.0);
        assert!(is_solved(&s, 4));
        assert!(!is_solved(&s, 5));
    }

    #[test]
    fn win_latch_fires_once_until_reset() {
        let mut latch = WinLatch::new();
        assert!(!latch.trigger(false));
        assert!(latch.trigger(true));
        assert!(!latch.trigger(true));
        assert!(latch.has_fired());
        latch.reset();
        assert!(latch.trigger(true));
    }
}
