use crate::api::session::PuzzleTuning;
use crate::api::types::GroupId;
use crate::components::group::{Group, GroupPhase, RotationState};
use crate::core::store::PieceStore;
use crate::extensions::tween::TweenStep;

/// What the animation loop did this frame.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SimulationReport {
    /// Groups whose snapback reached its target this frame, in id order.
    pub landed: Vec<GroupId>,
    /// Groups that came to rest and left the loop this frame.
    pub settled: Vec<GroupId>,
    /// Groups that still need frames.
    pub active: usize,
}

/// One semi-implicit Euler step of the damped tilt spring:
/// `accel = torque − k·angle − c·velocity`, velocity first, then angle.
pub fn step_rotation(rot: &mut RotationState, dt: f32, now_ms: f64, tuning: &PuzzleTuning) {
    let (stiffness, damping) = if rot.boost_active(now_ms) {
        (
            tuning.stiffness * tuning.boost_stiffness_scale,
            tuning.damping * tuning.boost_damping_scale,
        )
    } else {
        (tuning.stiffness, tuning.damping)
    };

    let accel = rot.torque - stiffness * rot.angle - damping * rot.velocity;
    rot.velocity = (rot.velocity + accel * dt)
        .clamp(-tuning.max_angular_velocity, tuning.max_angular_velocity);
    rot.angle = (rot.angle + rot.velocity * dt).clamp(-tuning.max_angle, tuning.max_angle);
}

/// Tilt and angular velocity are both under the settle epsilons.
pub fn is_at_rest(rot: &RotationState, tuning: &PuzzleTuning) -> bool {
    rot.angle.abs() < tuning.settle_angle_epsilon
        && rot.velocity.abs() < tuning.settle_velocity_epsilon
}

/// Outcome of advancing a single group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupStep {
    /// Still needs frames.
    Active,
    /// The snapback landed this frame; the group is now settling.
    Landed,
    /// Came to rest and left the loop.
    Settled,
    /// Nothing to do.
    Idle,
}

/// Advance one group's snapback and tilt by `dt` seconds.
pub fn advance_group(group: &mut Group, dt: f32, now_ms: f64, tuning: &PuzzleTuning) -> GroupStep {
    let mut landed = false;
    match &mut group.phase {
        GroupPhase::Idle => return GroupStep::Idle,
        GroupPhase::Snapback(tween) => match tween.tick(dt) {
            TweenStep::Running(offset) => group.offset = offset,
            TweenStep::Finished(target) => {
                group.offset = target;
                landed = true;
            }
        },
        GroupPhase::Dragging | GroupPhase::Settling => {}
    }
    if landed {
        group.phase = GroupPhase::Settling;
    }

    step_rotation(&mut group.rotation, dt, now_ms, tuning);

    if landed {
        return GroupStep::Landed;
    }
    if matches!(group.phase, GroupPhase::Settling) && is_at_rest(&group.rotation, tuning) {
        group.rotation.settle();
        group.phase = GroupPhase::Idle;
        return GroupStep::Settled;
    }
    GroupStep::Active
}

/// Advance every animating group. Idle groups are not touched.
pub fn advance_all(store: &mut PieceStore, dt: f32, now_ms: f64, tuning: &PuzzleTuning) -> SimulationReport {
    let mut report = SimulationReport::default();
    for group in store.groups_mut() {
        match advance_group(group, dt, now_ms, tuning) {
            GroupStep::Active => report.active += 1,
            GroupStep::Landed => {
                report.landed.push(group.id);
                report.active += 1;
            }
            GroupStep::Settled => report.settled.push(group.id),
            GroupStep::Idle => {}
        }
    }
    for id in &report.settled {
        log::debug!("group {:?} settled", id);
    }
    report
}
