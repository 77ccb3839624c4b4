// extensions/tween.rs
//
// Positional tween for snapback: carries a group offset from the rejected release
// position back to its last valid one. Owned by the group's phase, not by a global map,
// so dropping the group drops the animation with it.

use glam::Vec2;
use super::easing::{ease_vec2, Easing};

/// Result of advancing a tween by one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TweenStep {
    /// Still animating; the value for this frame.
    Running(Vec2),
    /// Reached the end; the value is exactly the target.
    Finished(Vec2),
}

/// A single offset animation.
#[derive(Debug, Clone, PartialEq)]
pub struct Tween {
    pub from: Vec2,
    pub to: Vec2,
    /// Duration in seconds.
    pub duration: f32,
    /// Elapsed time in seconds.
    pub elapsed: f32,
    pub easing: Easing,
}

impl Tween {
    pub fn offset(from: Vec2, to: Vec2, duration: f32, easing: Easing) -> Self {
        Self {
            from,
            to,
            duration,
            elapsed: 0.0,
            easing,
        }
    }

    /// Duration grows with travel distance: `min + distance / reference × (max − min)`,
    /// clamped to `[min, max]`. `reference` is the distance that earns the full duration.
    pub fn duration_for_distance(distance: f32, reference: f32, min: f32, max: f32) -> f32 {
        if reference <= 0.0 {
            return max;
        }
        (min + (distance / reference) * (max - min)).clamp(min, max)
    }

    /// Normalized progress [0, 1].
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            1.0
        } else {
            (self.elapsed / self.duration).clamp(0.0, 1.0)
        }
    }

    pub fn is_complete(&self) -> bool {
        self.elapsed >= self.duration
    }

    /// Advance by `dt` seconds.
    pub fn tick(&mut self, dt: f32) -> TweenStep {
        self.elapsed += dt;
        if self.is_complete() {
            TweenStep::Finished(self.to)
        } else {
            TweenStep::Running(ease_vec2(self.from, self.to, self.progress(), self.easing))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tween_runs_then_finishes_on_target() {
        let mut t = Tween::offset(Vec2::ZERO, Vec2::new(100.0, 0.0), 0.2, Easing::Linear);
        match t.tick(0.1) {
            TweenStep::Running(v) => assert!((v.x - 50.0).abs() < 0.01),
            other => panic!("expected running, got {:?}", other),
        }
        assert_eq!(t.tick(0.15), TweenStep::Finished(Vec2::new(100.0, 0.0)));
    }

    #[test]
    fn cubic_out_leads_linear() {
        let mut t = Tween::offset(Vec2::ZERO, Vec2::new(100.0, 0.0), 1.0, Easing::CubicOut);
        if let TweenStep::Running(v) = t.tick(0.5) {
            assert!(v.x > 50.0);
        } else {
            panic!("tween should still be running");
        }
    }

    #[test]
    fn zero_duration_finishes_immediately() {
        let mut t = Tween::offset(Vec2::ONE, Vec2::ZERO, 0.0, Easing::CubicOut);
        assert_eq!(t.progress(), 1.0);
        assert_eq!(t.tick(0.0), TweenStep::Finished(Vec2::ZERO));
    }

    #[test]
    fn duration_scales_with_distance_and_clamps() {
        assert_eq!(Tween::duration_for_distance(0.0, 100.0, 0.18, 0.36), 0.18);
        assert!((Tween::duration_for_distance(50.0, 100.0, 0.18, 0.36) - 0.27).abs() < 1e-6);
        assert_eq!(Tween::duration_for_distance(1000.0, 100.0, 0.18, 0.36), 0.36);
    }
}
