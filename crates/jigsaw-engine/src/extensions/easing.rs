// extensions/easing.rs
//
// Progress curves for snapback travel. A snapback always decelerates into its
// target, so only ease-out shapes are offered.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Snapback progress curve, selectable from a manifest by snake_case name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    Linear,
    QuadOut,
    #[default]
    CubicOut,
    /// Exponential approach; most of the travel happens in the first third.
    ExpoOut,
}

impl Easing {
    /// Map elapsed fraction `t` to travelled fraction. Input outside [0, 1] is clamped.
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        let rest = 1.0 - t;
        match self {
            Easing::Linear => t,
            Easing::QuadOut => 1.0 - rest * rest,
            Easing::CubicOut => 1.0 - rest * rest * rest,
            Easing::ExpoOut if t >= 1.0 => 1.0,
            Easing::ExpoOut => 1.0 - 2f32.powf(-10.0 * t),
        }
    }
}

#[inline]
pub fn lerp_vec2(from: Vec2, to: Vec2, t: f32) -> Vec2 {
    from + (to - from) * t
}

/// Offset `t` of the way from `from` to `to` along `easing`.
pub fn ease_vec2(from: Vec2, to: Vec2, t: f32, easing: Easing) -> Vec2 {
    lerp_vec2(from, to, easing.apply(t))
}
