//! Tunables for the deck engine.
//!
//! Every struct deserializes with `#[serde(default)]`, so a config file only
//! has to mention the values it overrides. Durations are plain milliseconds.

use std::collections::BTreeSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::animation::Easing;
use crate::types::{SwipeDirection, Viewport};

/// Top-level configuration consumed by [`DeckController`](crate::DeckController).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwipeDeckConfig {
    /// Directions, labels and the empty state.
    pub swipe: SwipeConfig,
    /// Refill and event channel sizing.
    pub deck: DeckConfig,
    /// Commit threshold and card layout.
    pub gesture: GestureConfig,
    /// Release animations.
    pub trajectory: TrajectoryConfig,
}

/// Which directions may commit, what to call them, and what to show once the
/// deck runs dry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwipeConfig {
    /// Directions allowed to commit. A geometrically valid swipe towards a
    /// direction outside this set bounces back instead.
    pub enabled_directions: BTreeSet<SwipeDirection>,
    /// Overlay text shown while a drag points in a direction. Display only.
    pub labels: DirectionLabels,
    /// What to show once the deck is empty.
    pub empty_state: EmptyStateConfig,
}

impl Default for SwipeConfig {
    fn default() -> Self {
        Self {
            enabled_directions: [
                SwipeDirection::Left,
                SwipeDirection::Right,
                SwipeDirection::Up,
            ]
            .into_iter()
            .collect(),
            labels: DirectionLabels::default(),
            empty_state: EmptyStateConfig::default(),
        }
    }
}

impl SwipeConfig {
    /// Whether `direction` may commit.
    pub fn is_enabled(&self, direction: SwipeDirection) -> bool {
        self.enabled_directions.contains(&direction)
    }

    /// Overlay label for `direction`, if one is configured.
    pub fn label(&self, direction: SwipeDirection) -> Option<&str> {
        self.labels.get(direction)
    }
}

/// Overlay text per direction. `None` shows no badge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectionLabels {
    /// Shown for leftward drags.
    pub left: Option<String>,
    /// Shown for rightward drags.
    pub right: Option<String>,
    /// Shown for upward drags.
    pub up: Option<String>,
    /// Shown for downward drags.
    pub down: Option<String>,
}

impl Default for DirectionLabels {
    fn default() -> Self {
        Self {
            left: Some("NOPE".to_string()),
            right: Some("LIKE".to_string()),
            up: Some("SUPER LIKE".to_string()),
            down: None,
        }
    }
}

impl DirectionLabels {
    /// Label for `direction`.
    pub fn get(&self, direction: SwipeDirection) -> Option<&str> {
        match direction {
            SwipeDirection::Left => self.left.as_deref(),
            SwipeDirection::Right => self.right.as_deref(),
            SwipeDirection::Up => self.up.as_deref(),
            SwipeDirection::Down => self.down.as_deref(),
        }
    }
}

/// Resource hints for the empty-state view. The engine never interprets the
/// resource strings; it only picks which one the renderer should use.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmptyStateConfig {
    /// Animation resource. Takes priority over `image` when both are set.
    pub animation: Option<String>,
    /// Still image resource.
    pub image: Option<String>,
}

impl EmptyStateConfig {
    /// Which resource the renderer should use.
    pub fn presentation(&self) -> EmptyStatePresentation {
        match (&self.animation, &self.image) {
            (Some(animation), _) => {
                EmptyStatePresentation::Animation(animation.clone())
            }
            (None, Some(image)) => EmptyStatePresentation::Image(image.clone()),
            (None, None) => EmptyStatePresentation::DefaultIcon,
        }
    }
}

/// What the empty deck shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmptyStatePresentation {
    /// Play this animation resource.
    Animation(String),
    /// Show this image resource.
    Image(String),
    /// Neither was configured.
    DefaultIcon,
}

/// Deck sizing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeckConfig {
    /// Request another item whenever the deck holds this many items or
    /// fewer after an eviction.
    pub refill_threshold: usize,
    /// Buffer size of the deck event broadcast channel.
    pub event_capacity: usize,
}

impl Default for DeckConfig {
    fn default() -> Self {
        Self {
            refill_threshold: 2,
            event_capacity: 64,
        }
    }
}

/// Drag thresholds and card layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Minimum displacement along an axis before a drag may commit.
    pub swipe_threshold: f32,
    /// Front card rotation in degrees is `offset.x / rotation_divisor`.
    pub rotation_divisor: f32,
    /// Vertical offset between stacked cards behind the front one.
    pub stack_spacing: f32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            swipe_threshold: 100.0,
            rotation_divisor: 60.0,
            stack_spacing: 8.0,
        }
    }
}

/// Timing and physics of release animations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrajectoryConfig {
    /// Duration of the bounce back to origin after a cancelled swipe.
    pub cancel_duration_ms: u64,
    /// Curve of the bounce back.
    pub cancel_easing: Easing,
    /// Cadence of the straight-line exit step.
    pub tick_interval_ms: u64,
    /// Initial exit velocity is the release offset times this factor.
    pub velocity_multiplier: f32,
    /// Exponential decay rate of the exit velocity, per second.
    pub decay_friction: f32,
    /// Velocity magnitude below which the decay contribution stops.
    pub min_velocity: f32,
    /// Distance travelled along the release direction each tick.
    pub step_speed: f32,
    /// A committed card is gone once it has moved this multiple of the
    /// viewport along either axis.
    pub offscreen_factor: f32,
    /// Upper bound on exit steps before the commit is forced through.
    pub max_commit_ticks: u32,
    /// Stage size until the host reports the real one.
    pub viewport: Viewport,
}

impl Default for TrajectoryConfig {
    fn default() -> Self {
        Self {
            cancel_duration_ms: 300,
            cancel_easing: Easing::EaseInOutCubic,
            tick_interval_ms: 16,
            velocity_multiplier: 8.0,
            decay_friction: 4.2,
            min_velocity: 0.1,
            step_speed: 25.0,
            offscreen_factor: 1.5,
            max_commit_ticks: 600,
            viewport: Viewport::default(),
        }
    }
}

impl TrajectoryConfig {
    /// `cancel_duration_ms` as a [`Duration`].
    pub fn cancel_duration(&self) -> Duration {
        Duration::from_millis(self.cancel_duration_ms)
    }

    /// `tick_interval_ms` as a [`Duration`], never zero.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }
}
