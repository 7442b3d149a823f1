//! Guard rails run over a parsed deck config.

use swipedeck_core::{SwipeDeckConfig, SwipeDirection};
use thiserror::Error;

/// A setting the engine cannot run with.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigGuardRailError {
    /// NaN or infinite.
    #[error("{field} must be a finite number, got {value}")]
    NonFinite {
        /// Dotted path of the offending key.
        field: &'static str,
        /// The rejected value.
        value: f32,
    },
    /// Zero or below where a positive value is required.
    #[error("{field} must be greater than zero, got {value}")]
    NonPositive {
        /// Dotted path of the offending key.
        field: &'static str,
        /// The rejected value.
        value: f32,
    },
    /// Below zero.
    #[error("{field} must not be negative, got {value}")]
    Negative {
        /// Dotted path of the offending key.
        field: &'static str,
        /// The rejected value.
        value: f32,
    },
    /// A millisecond duration of zero.
    #[error("{field} must be at least 1 ms")]
    ZeroDuration {
        /// Dotted path of the offending key.
        field: &'static str,
    },
    /// `swipe.enabled_directions` is empty.
    #[error("at least one swipe direction must be enabled")]
    NoDirectionsEnabled,
}

/// A setting that is accepted but probably not what was meant.
#[derive(Debug, Clone)]
pub struct ConfigWarning {
    /// What looks wrong.
    pub message: String,
    /// How to fix it, when there is an obvious fix.
    pub hint: Option<String>,
}

/// Warnings collected by [`apply_guard_rails`].
#[derive(Debug, Default, Clone)]
pub struct ConfigWarnings {
    /// Warnings in the order they were found.
    pub items: Vec<ConfigWarning>,
}

impl ConfigWarnings {
    /// Record a warning without a hint.
    pub fn push<S: Into<String>>(&mut self, message: S) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: None,
        });
    }

    /// Record a warning with a suggested fix.
    pub fn push_with_hint<S: Into<String>, H: Into<String>>(
        &mut self,
        message: S,
        hint: H,
    ) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: Some(hint.into()),
        });
    }

    /// Whether nothing was flagged.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of warnings.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Warnings in the order they were found.
    pub fn iter(&self) -> impl Iterator<Item = &ConfigWarning> {
        self.items.iter()
    }
}

/// Reject configs the engine cannot run with and collect warnings for
/// questionable ones.
pub fn apply_guard_rails(
    config: &SwipeDeckConfig,
) -> Result<ConfigWarnings, ConfigGuardRailError> {
    let mut warnings = ConfigWarnings::default();

    check_numbers(config)?;

    if config.trajectory.tick_interval_ms == 0 {
        return Err(ConfigGuardRailError::ZeroDuration {
            field: "trajectory.tick_interval_ms",
        });
    }

    if config.swipe.enabled_directions.is_empty() {
        return Err(ConfigGuardRailError::NoDirectionsEnabled);
    }

    if config.swipe.is_enabled(SwipeDirection::Down) {
        warnings.push_with_hint(
            "Down is enabled but a downward drag never commits",
            "Down only drives the drag overlay; remove it from swipe.enabled_directions to silence this",
        );
    }

    for direction in &config.swipe.enabled_directions {
        if config.swipe.label(*direction).is_none() {
            warnings.push(format!(
                "{direction} is enabled but has no overlay label"
            ));
        }
    }

    if config.deck.refill_threshold == 0 {
        warnings.push_with_hint(
            "deck.refill_threshold is 0; the deck only refills once it is empty",
            "Use 1 or more so the next card is fetched before the last one is swiped",
        );
    }

    if config.deck.event_capacity == 0 {
        warnings.push("deck.event_capacity is 0; a capacity of 1 will be used");
    }

    if config.trajectory.offscreen_factor <= 1.0 {
        warnings.push_with_hint(
            format!(
                "trajectory.offscreen_factor is {}; committed cards may vanish while still visible",
                config.trajectory.offscreen_factor
            ),
            "Values above 1.0 let the card fully leave the viewport before removal",
        );
    }

    if config.trajectory.max_commit_ticks == 0 {
        warnings.push(
            "trajectory.max_commit_ticks is 0; committed cards are removed without an exit animation",
        );
    }

    if config.trajectory.cancel_duration_ms == 0 {
        warnings.push(
            "trajectory.cancel_duration_ms is 0; cancelled swipes snap back instantly",
        );
    }

    Ok(warnings)
}

fn check_numbers(config: &SwipeDeckConfig) -> Result<(), ConfigGuardRailError> {
    let gesture = &config.gesture;
    let trajectory = &config.trajectory;

    let positive = [
        ("gesture.swipe_threshold", gesture.swipe_threshold),
        ("gesture.rotation_divisor", gesture.rotation_divisor),
        ("trajectory.viewport.width", trajectory.viewport.width),
        ("trajectory.viewport.height", trajectory.viewport.height),
        ("trajectory.offscreen_factor", trajectory.offscreen_factor),
    ];
    let non_negative = [
        ("gesture.stack_spacing", gesture.stack_spacing),
        ("trajectory.velocity_multiplier", trajectory.velocity_multiplier),
        ("trajectory.decay_friction", trajectory.decay_friction),
        ("trajectory.min_velocity", trajectory.min_velocity),
        ("trajectory.step_speed", trajectory.step_speed),
    ];

    for (field, value) in positive.iter().chain(non_negative.iter()) {
        if !value.is_finite() {
            return Err(ConfigGuardRailError::NonFinite {
                field: *field,
                value: *value,
            });
        }
    }
    for (field, value) in positive {
        if value <= 0.0 {
            return Err(ConfigGuardRailError::NonPositive { field, value });
        }
    }
    for (field, value) in non_negative {
        if value < 0.0 {
            return Err(ConfigGuardRailError::Negative { field, value });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_pass_without_warnings() {
        let warnings = apply_guard_rails(&SwipeDeckConfig::default()).unwrap();
        assert!(warnings.is_empty(), "{warnings:?}");
    }

    #[test]
    fn zero_threshold_is_rejected() {
        let mut config = SwipeDeckConfig::default();
        config.gesture.swipe_threshold = 0.0;
        assert_eq!(
            apply_guard_rails(&config).unwrap_err(),
            ConfigGuardRailError::NonPositive {
                field: "gesture.swipe_threshold",
                value: 0.0
            }
        );
    }

    #[test]
    fn non_finite_numbers_are_rejected() {
        let mut config = SwipeDeckConfig::default();
        config.trajectory.step_speed = f32::INFINITY;
        assert!(matches!(
            apply_guard_rails(&config),
            Err(ConfigGuardRailError::NonFinite {
                field: "trajectory.step_speed",
                ..
            })
        ));
    }

    #[test]
    fn zero_tick_interval_is_rejected() {
        let mut config = SwipeDeckConfig::default();
        config.trajectory.tick_interval_ms = 0;
        assert!(matches!(
            apply_guard_rails(&config),
            Err(ConfigGuardRailError::ZeroDuration { .. })
        ));
    }

    #[test]
    fn empty_direction_set_is_rejected() {
        let mut config = SwipeDeckConfig::default();
        config.swipe.enabled_directions.clear();
        assert_eq!(
            apply_guard_rails(&config).unwrap_err(),
            ConfigGuardRailError::NoDirectionsEnabled
        );
    }

    #[test]
    fn enabling_down_warns_twice() {
        let mut config = SwipeDeckConfig::default();
        config.swipe.enabled_directions.insert(SwipeDirection::Down);
        let warnings = apply_guard_rails(&config).unwrap();
        assert_eq!(warnings.len(), 2);
        assert!(warnings.iter().any(|w| w.message.contains("never commits")));
        assert!(warnings.iter().any(|w| w.message.contains("no overlay label")));
    }

    #[test]
    fn eager_removal_and_late_refill_warn() {
        let mut config = SwipeDeckConfig::default();
        config.deck.refill_threshold = 0;
        config.trajectory.offscreen_factor = 0.8;
        let warnings = apply_guard_rails(&config).unwrap();
        assert_eq!(warnings.len(), 2);
        assert!(warnings.iter().all(|w| w.hint.is_some()));
    }
}
