use glam::Vec2;
use crate::api::session::PuzzleTuning;
use crate::api::types::GroupId;
use crate::components::group::GroupPhase;
use crate::core::geometry::BoardBounds;
use crate::core::store::PieceStore;
use crate::extensions::tween::Tween;

/// Ephemeral state of the one active drag gesture.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    pub group: GroupId,
    /// Pointer position minus group offset at grab time, in puzzle units.
    pub grab_offset: Vec2,
    /// Offset to roll back to if the release is out of bounds.
    pub last_good: Vec2,
    /// Client position of the previous pointer event.
    last_client: Vec2,
    /// Exponentially filtered client delta per event.
    velocity: Vec2,
    /// A move event arrived since the last animation frame.
    moved: bool,
}

/// What a release did to the dragged group.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReleaseOutcome {
    /// The group stays where it was dropped; it is settling and ready for snapping.
    Kept { group: GroupId },
    /// The drop was out of bounds; the group animates back to `to`.
    SnappingBack { group: GroupId, from: Vec2, to: Vec2 },
}

/// Angular acceleration induced by pointer motion.
///
/// A clamped linear combination of filtered velocity and its per-event change, with the
/// horizontal axis weighted more than the vertical. Slow motion yields zero so hand
/// jitter never nudges a held piece.
pub fn swing_torque(velocity: Vec2, accel: Vec2, tuning: &PuzzleTuning) -> f32 {
    if velocity.length() < tuning.torque_velocity_threshold {
        return 0.0;
    }
    let raw = velocity.x * tuning.torque_velocity_gain_x
        + velocity.y * tuning.torque_velocity_gain_y
        + accel.x * tuning.torque_accel_gain_x
        + accel.y * tuning.torque_accel_gain_y;
    raw.clamp(-tuning.max_torque, tuning.max_torque)
}

/// Every member's world center lies inside `inner`.
pub fn group_fits_within(store: &PieceStore, group: GroupId, inner: &BoardBounds) -> bool {
    let Some(g) = store.group(group) else {
        return false;
    };
    g.members.iter().all(|pid| match store.piece(*pid) {
        Some(p) => inner.contains(p.world(g.offset)),
        None => true,
    })
}

/// Turns pointer gestures into group motion and torque. At most one gesture is active.
#[derive(Debug, Clone, Default)]
pub struct DragController {
    active: Option<DragSession>,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_group(&self) -> Option<GroupId> {
        self.active.as_ref().map(|s| s.group)
    }

    pub fn is_dragging(&self) -> bool {
        self.active.is_some()
    }

    /// Acquire `group` at puzzle-space `pointer` (client-space `client`).
    ///
    /// Cancels any in-flight snapback and zeroes torque. If the group is caught mid-snapback
    /// at an invalid spot, the snapback target stays the rollback position.
    pub fn begin(
        &mut self,
        store: &mut PieceStore,
        group: GroupId,
        pointer: Vec2,
        client: Vec2,
        inner: &BoardBounds,
    ) -> bool {
        if let Some(current) = &self.active {
            log::warn!("pickup of {:?} ignored: {:?} is already being dragged", group, current.group);
            return false;
        }
        let fits = group_fits_within(store, group, inner);
        let Some(g) = store.group_mut(group) else {
            log::warn!("pickup of missing group {:?} ignored", group);
            return false;
        };
        let last_good = match g.snapback_target() {
            Some(target) if !fits => target,
            _ => g.offset,
        };
        g.phase = GroupPhase::Dragging;
        g.rotation.torque = 0.0;
        g.rotation.boost_until_ms = None;

        self.active = Some(DragSession {
            group,
            grab_offset: pointer - g.offset,
            last_good,
            last_client: client,
            velocity: Vec2::ZERO,
            moved: false,
        });
        true
    }

    fn feed_velocity(session: &mut DragSession, delta: Vec2, tuning: &PuzzleTuning) -> f32 {
        let w = tuning.velocity_smoothing;
        let previous = session.velocity;
        session.velocity = delta * w + previous * (1.0 - w);
        swing_torque(session.velocity, session.velocity - previous, tuning)
    }

    /// Apply a pointer move at puzzle-space `pointer` (client-space `client`).
    /// Returns the moved group, or `None` for a stale or missing session.
    pub fn update(
        &mut self,
        store: &mut PieceStore,
        pointer: Vec2,
        client: Vec2,
        tuning: &PuzzleTuning,
    ) -> Option<GroupId> {
        let session = self.active.as_mut()?;
        let Some(g) = store.group_mut(session.group) else {
            log::warn!("drag of vanished group {:?} dropped", session.group);
            self.active = None;
            return None;
        };
        let delta = client - session.last_client;
        session.last_client = client;
        session.moved = true;
        g.rotation.torque = Self::feed_velocity(session, delta, tuning);
        g.offset = pointer - session.grab_offset;
        Some(session.group)
    }

    /// Once per animation frame: a held-still pointer decays the swing input toward zero.
    pub fn frame(&mut self, store: &mut PieceStore, tuning: &PuzzleTuning) {
        let Some(session) = self.active.as_mut() else {
            return;
        };
        if session.moved {
            session.moved = false;
            return;
        }
        let torque = Self::feed_velocity(session, Vec2::ZERO, tuning);
        if let Some(g) = store.group_mut(session.group) {
            g.rotation.torque = torque;
        }
    }

    /// End the gesture (pointer-up or pointer-cancel).
    ///
    /// Marks the group settling with the release boost, and starts a snapback to the last
    /// good offset if any member's center is outside `inner`.
    pub fn release(
        &mut self,
        store: &mut PieceStore,
        inner: &BoardBounds,
        now_ms: f64,
        snapback_reference: f32,
        tuning: &PuzzleTuning,
    ) -> Option<ReleaseOutcome> {
        let session = self.active.take()?;
        let fits = group_fits_within(store, session.group, inner);
        let Some(g) = store.group_mut(session.group) else {
            log::warn!("release of vanished group {:?} ignored", session.group);
            return None;
        };
        g.rotation.torque = 0.0;
        g.rotation.boost_until_ms = Some(now_ms + tuning.release_boost_ms as f64);

        if fits {
            g.phase = GroupPhase::Settling;
            return Some(ReleaseOutcome::Kept { group: g.id });
        }

        let from = g.offset;
        let to = session.last_good;
        let duration = Tween::duration_for_distance(
            from.distance(to),
            snapback_reference,
            tuning.snapback_min_ms / 1000.0,
            tuning.snapback_max_ms / 1000.0,
        );
        g.phase = GroupPhase::Snapback(Tween::offset(from, to, duration, tuning.snapback_easing));
        Some(ReleaseOutcome::SnappingBack { group: g.id, from, to })
    }

    /// Forget the gesture without applying it. Used when the store is replaced.
    pub fn abandon(&mut self) -> Option<GroupId> {
        self.active.take().map(|s| s.group)
    }
}
