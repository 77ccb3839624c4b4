use std::collections::{BTreeMap, BTreeSet};
use glam::Vec2;
use crate::api::types::{GroupId, PieceId, PuzzleStats};
use crate::components::group::Group;
use crate::components::piece::Piece;

/// Authoritative partition of active pieces into groups.
///
/// Invariant: every piece belongs to exactly one group and the groups' member sets
/// are disjoint and cover all pieces. Ordered maps keep iteration deterministic.
#[derive(Debug, Clone, Default)]
pub struct PieceStore {
    pieces: BTreeMap<PieceId, Piece>,
    groups: BTreeMap<GroupId, Group>,
    next_group: u32,
}

impl PieceStore {
    pub fn new() -> Self {
        Self {
            pieces: BTreeMap::new(),
            groups: BTreeMap::new(),
            next_group: 1,
        }
    }

    /// Build a store with one group per piece at zero offset.
    pub fn with_pieces(pieces: impl IntoIterator<Item = Piece>) -> Self {
        let mut store = Self::new();
        for piece in pieces {
            store.spawn(piece);
        }
        store
    }

    fn alloc_group_id(&mut self) -> GroupId {
        let id = GroupId(self.next_group);
        self.next_group += 1;
        id
    }

    /// Add a piece in its own group at zero offset. Replaces any piece with the same id.
    pub fn spawn(&mut self, mut piece: Piece) -> GroupId {
        if let Some(old) = self.pieces.get(&piece.id) {
            let stale = old.group;
            log::warn!("piece {:?} spawned twice; replacing", piece.id);
            self.detach(piece.id, stale);
        }
        let gid = self.alloc_group_id();
        piece.group = gid;
        self.groups.insert(gid, Group::singleton(gid, piece.id, Vec2::ZERO));
        self.pieces.insert(piece.id, piece);
        gid
    }

    fn detach(&mut self, piece: PieceId, group: GroupId) {
        let emptied = match self.groups.get_mut(&group) {
            Some(g) => {
                g.members.remove(&piece);
                g.members.is_empty()
            }
            None => false,
        };
        if emptied {
            self.groups.remove(&group);
        }
    }

    pub fn piece(&self, id: PieceId) -> Option<&Piece> {
        self.pieces.get(&id)
    }

    pub fn group(&self, id: GroupId) -> Option<&Group> {
        self.groups.get(&id)
    }

    pub fn group_mut(&mut self, id: GroupId) -> Option<&mut Group> {
        self.groups.get_mut(&id)
    }

    pub fn contains_group(&self, id: GroupId) -> bool {
        self.groups.contains_key(&id)
    }

    /// Group currently owning `piece`.
    pub fn group_of(&self, piece: PieceId) -> Option<GroupId> {
        self.pieces.get(&piece).map(|p| p.group)
    }

    pub fn pieces(&self) -> impl Iterator<Item = &Piece> {
        self.pieces.values()
    }

    pub fn groups(&self) -> impl Iterator<Item = &Group> {
        self.groups.values()
    }

    pub fn groups_mut(&mut self) -> impl Iterator<Item = &mut Group> {
        self.groups.values_mut()
    }

    pub fn group_ids(&self) -> Vec<GroupId> {
        self.groups.keys().copied().collect()
    }

    pub fn piece_count(&self) -> usize {
        self.pieces.len()
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    /// Members of a group in ascending id order.
    pub fn members(&self, id: GroupId) -> Vec<PieceId> {
        self.groups
            .get(&id)
            .map(|g| g.members.iter().copied().collect())
            .unwrap_or_default()
    }

    /// World position of a piece: base position plus its group's offset.
    pub fn world_position(&self, piece: PieceId) -> Option<Vec2> {
        let p = self.pieces.get(&piece)?;
        let g = self.groups.get(&p.group)?;
        Some(p.world(g.offset))
    }

    /// Mean of the members' base positions (offset not applied).
    pub fn group_base_center(&self, id: GroupId) -> Option<Vec2> {
        let group = self.groups.get(&id)?;
        let mut sum = Vec2::ZERO;
        let mut count = 0usize;
        for pid in &group.members {
            if let Some(p) = self.pieces.get(pid) {
                sum += p.base;
                count += 1;
            }
        }
        if count == 0 {
            None
        } else {
            Some(sum / count as f32)
        }
    }

    /// Reset the partition to one group per piece, preserving every piece's world position.
    /// Previous group ids become stale.
    pub fn create_singleton_groups(&mut self) {
        let mut groups = BTreeMap::new();
        let ids: Vec<PieceId> = self.pieces.keys().copied().collect();
        for pid in ids {
            let world = match self.world_position(pid) {
                Some(w) => w,
                None => {
                    log::warn!("piece {:?} had no group; resetting it to its base position", pid);
                    self.pieces.get(&pid).map(|p| p.base).unwrap_or(Vec2::ZERO)
                }
            };
            let gid = self.alloc_group_id();
            if let Some(piece) = self.pieces.get_mut(&pid) {
                piece.group = gid;
                groups.insert(gid, Group::singleton(gid, pid, world - piece.base));
            }
        }
        self.groups = groups;
    }

    /// Move every member of `moving` into `anchor` and delete `moving`.
    ///
    /// Returns the surviving group id. Merging a group with itself is a no-op that
    /// returns it unchanged; a missing id is logged and yields `None`.
    pub fn merge_groups(&mut self, anchor: GroupId, moving: GroupId) -> Option<GroupId> {
        if anchor == moving {
            return self.groups.contains_key(&anchor).then_some(anchor);
        }
        if !self.groups.contains_key(&anchor) {
            log::warn!("merge into missing group {:?} ignored", anchor);
            return None;
        }
        let moved = match self.groups.remove(&moving) {
            Some(g) => g,
            None => {
                log::warn!("merge of missing group {:?} ignored", moving);
                return None;
            }
        };
        for pid in &moved.members {
            if let Some(piece) = self.pieces.get_mut(pid) {
                piece.group = anchor;
            }
        }
        if let Some(target) = self.groups.get_mut(&anchor) {
            target.members.extend(moved.members);
        }
        Some(anchor)
    }

    pub fn stats(&self) -> PuzzleStats {
        PuzzleStats {
            pieces: self.pieces.len(),
            groups: self.groups.len(),
            largest_group: self.groups.values().map(Group::len).max().unwrap_or(0),
        }
    }

    /// Verify the partition invariant. Cheap enough for debug assertions and tests.
    pub fn is_partition(&self) -> bool {
        let mut seen = BTreeSet::new();
        for (gid, group) in &self.groups {
            if group.id != *gid || group.members.is_empty() {
                return false;
            }
            for pid in &group.members {
                if !seen.insert(*pid) {
                    return false;
                }
                match self.pieces.get(pid) {
                    Some(p) if p.group == *gid => {}
                    _ => return false,
                }
            }
        }
        seen.len() == self.pieces.len()
    }

    /// Drop every piece and group. Group ids keep counting up.
    pub fn clear(&mut self) {
        self.pieces.clear();
        self.groups.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_of(n: u32) -> PieceStore {
        PieceStore::with_pieces(
            (1..=n).map(|i| Piece::new(PieceId(i), Vec2::new(i as f32 * 10.0, 0.0))),
        )
    }

    #[test]
    fn spawn_creates_singletons() {
        let store = store_of(4);
        assert_eq!(store.piece_count(), 4);
        assert_eq!(store.group_count(), 4);
        assert!(store.is_partition());
    }

    #[test]
    fn merge_unions_members() {
        let mut store = store_of(3);
        let a = store.group_of(PieceId(1)).unwrap();
        let b = store.group_of(PieceId(2)).unwrap();
        assert_eq!(store.merge_groups(a, b), Some(a));
        assert_eq!(store.members(a), vec![PieceId(1), PieceId(2)]);
        assert!(!store.contains_group(b));
        assert_eq!(store.group_of(PieceId(2)), Some(a));
        assert!(store.is_partition());
    }

    #[test]
    fn merge_order_does_not_change_membership() {
        let mut left = store_of(4);
        let mut right = store_of(4);
        let (a1, b1) = (left.group_of(PieceId(1)).unwrap(), left.group_of(PieceId(3)).unwrap());
        left.merge_groups(a1, b1);
        let (a2, b2) = (right.group_of(PieceId(1)).unwrap(), right.group_of(PieceId(3)).unwrap());
        right.merge_groups(b2, a2);
        assert_eq!(left.members(a1), right.members(b2));
    }

    #[test]
    fn self_merge_is_noop() {
        let mut store = store_of(2);
        let a = store.group_of(PieceId(1)).unwrap();
        assert_eq!(store.merge_groups(a, a), Some(a));
        assert_eq!(store.group_count(), 2);
        assert!(store.is_partition());
    }

    #[test]
    fn merge_with_missing_group_is_ignored() {
        let mut store = store_of(2);
        let a = store.group_of(PieceId(1)).unwrap();
        assert_eq!(store.merge_groups(a, GroupId(999)), None);
        assert_eq!(store.merge_groups(GroupId(999), a), None);
        assert_eq!(store.group_count(), 2);
        assert!(store.is_partition());
    }

    #[test]
    fn singleton_reset_preserves_world_positions() {
        let mut store = store_of(3);
        let a = store.group_of(PieceId(1)).unwrap();
        let b = store.group_of(PieceId(2)).unwrap();
        store.group_mut(a).unwrap().offset = Vec2::new(5.0, 7.0);
        store.group_mut(b).unwrap().offset = Vec2::new(5.0, 7.0);
        store.merge_groups(a, b);
        let before: Vec<Vec2> = (1..=3).map(|i| store.world_position(PieceId(i)).unwrap()).collect();

        store.create_singleton_groups();

        let after: Vec<Vec2> = (1..=3).map(|i| store.world_position(PieceId(i)).unwrap()).collect();
        assert_eq!(before, after);
        assert_eq!(store.group_count(), 3);
        assert!(!store.contains_group(a), "old ids must not be reused");
        assert!(store.is_partition());
    }

    #[test]
    fn stats_report_largest_group() {
        let mut store = store_of(5);
        let a = store.group_of(PieceId(1)).unwrap();
        for i in 2..=3 {
            let g = store.group_of(PieceId(i)).unwrap();
            store.merge_groups(a, g);
        }
        let stats = store.stats();
        assert_eq!(stats.pieces, 5);
        assert_eq!(stats.groups, 3);
        assert_eq!(stats.largest_group, 3);
    }

    #[test]
    fn base_center_is_mean_of_members() {
        let mut store = store_of(2);
        let a = store.group_of(PieceId(1)).unwrap();
        let b = store.group_of(PieceId(2)).unwrap();
        store.merge_groups(a, b);
        assert_eq!(store.group_base_center(a), Some(Vec2::new(15.0, 0.0)));
    }
}
