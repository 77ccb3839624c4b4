use std::collections::BTreeSet;
use glam::Vec2;
use crate::api::types::{GroupId, PieceId};
use crate::extensions::tween::Tween;

/// Per-group tilt state driven by the rotation spring.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RotationState {
    /// Tilt in degrees.
    pub angle: f32,
    /// Angular velocity in degrees per second.
    pub velocity: f32,
    /// Drag-induced angular acceleration input (degrees per second squared).
    pub torque: f32,
    /// Host timestamp (ms) until which the release boost applies.
    pub boost_until_ms: Option<f64>,
}

impl RotationState {
    /// Zero the tilt exactly.
    pub fn settle(&mut self) {
        self.angle = 0.0;
        self.velocity = 0.0;
        self.torque = 0.0;
        self.boost_until_ms = None;
    }

    pub fn boost_active(&self, now_ms: f64) -> bool {
        matches!(self.boost_until_ms, Some(until) if now_ms < until)
    }
}

/// Motion phase of a group.
///
/// ```text
/// Idle ──pickup──▶ Dragging ──release (in bounds)──▶ Settling ──at rest──▶ Idle
///                      │                                 ▲
///                      └──release (out of bounds)──▶ Snapback ──landed──┘
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub enum GroupPhase {
    #[default]
    Idle,
    Dragging,
    Snapback(Tween),
    Settling,
}

/// A rigid cluster of pieces sharing one offset and one tilt.
#[derive(Debug, Clone)]
pub struct Group {
    pub id: GroupId,
    /// Translation applied to every member's base position.
    pub offset: Vec2,
    pub rotation: RotationState,
    pub phase: GroupPhase,
    /// Member piece ids; never empty while the group is in the store.
    pub members: BTreeSet<PieceId>,
}

impl Group {
    /// Group holding a single piece.
    pub fn singleton(id: GroupId, piece: PieceId, offset: Vec2) -> Self {
        let mut members = BTreeSet::new();
        members.insert(piece);
        Self {
            id,
            offset,
            rotation: RotationState::default(),
            phase: GroupPhase::Idle,
            members,
        }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn is_single(&self) -> bool {
        self.members.len() == 1
    }

    pub fn contains(&self, piece: PieceId) -> bool {
        self.members.contains(&piece)
    }

    /// Whether the animation loop still has work for this group.
    pub fn is_animating(&self) -> bool {
        !matches!(self.phase, GroupPhase::Idle)
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.phase, GroupPhase::Dragging)
    }

    /// Target of the in-flight snapback, if any.
    pub fn snapback_target(&self) -> Option<Vec2> {
        match &self.phase {
            GroupPhase::Snapback(tween) => Some(tween.to),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extensions::easing::Easing;

    #[test]
    fn singleton_starts_idle_and_level() {
        let g = Group::singleton(GroupId(1), PieceId(4), Vec2::new(3.0, 4.0));
        assert!(g.is_single());
        assert!(g.contains(PieceId(4)));
        assert!(!g.is_animating());
        assert_eq!(g.rotation, RotationState::default());
    }

    #[test]
    fn snapback_exposes_target() {
        let mut g = Group::singleton(GroupId(1), PieceId(1), Vec2::ZERO);
        g.phase = GroupPhase::Snapback(Tween::offset(Vec2::ONE, Vec2::ZERO, 0.2, Easing::CubicOut));
        assert!(g.is_animating());
        assert_eq!(g.snapback_target(), Some(Vec2::ZERO));
    }

    #[test]
    fn boost_window_is_exclusive_at_expiry() {
        let rot = RotationState {
            boost_until_ms: Some(150.0),
            ..Default::default()
        };
        assert!(rot.boost_active(149.0));
        assert!(!rot.boost_active(150.0));
    }
}
