//! Tween curves.

use serde::{Deserialize, Serialize};

/// Easing curves for time-based tweens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    /// Constant speed.
    Linear,
    /// Quadratic, accelerating.
    EaseInQuad,
    /// Quadratic, decelerating.
    EaseOutQuad,
    /// Quadratic, accelerating then decelerating.
    EaseInOutQuad,
    /// Cubic, decelerating.
    EaseOutCubic,
    /// Cubic, accelerating then decelerating.
    #[default]
    EaseInOutCubic,
}

impl Easing {
    /// Map linear progress in `[0, 1]` onto the curve.
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::EaseInQuad => t * t,
            Easing::EaseOutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::EaseInOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - 2.0 * (1.0 - t) * (1.0 - t)
                }
            }
            Easing::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
            Easing::EaseInOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
        }
    }
}
