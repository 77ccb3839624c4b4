// extensions/mod.rs
//
// Positional animation helpers. Independent of the store: groups own their tweens
// through their motion phase.

pub mod easing;
pub mod tween;

pub use easing::{Easing, lerp_vec2, ease_vec2};
pub use tween::{Tween, TweenStep};
