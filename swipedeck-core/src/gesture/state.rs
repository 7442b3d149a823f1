//! Per-card gesture state.

use crate::animation::Trajectory;
use crate::types::{Offset, SwipeDirection};

/// Lifecycle of the front card's gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GesturePhase {
    /// At rest at the origin.
    #[default]
    Idle,
    /// Following the pointer.
    Dragging,
    /// Released; the outcome is being classified.
    Resolving,
    /// Flying off-stage in the given direction.
    Committing(SwipeDirection),
    /// Easing back to the origin.
    Cancelling,
}

impl GesturePhase {
    /// Whether the card is at rest.
    pub fn is_idle(&self) -> bool {
        matches!(self, GesturePhase::Idle)
    }

    /// Whether a trajectory is driving the card.
    pub fn is_animating(&self) -> bool {
        matches!(
            self,
            GesturePhase::Committing(_) | GesturePhase::Cancelling
        )
    }
}

/// Per-card drag and animation state, keyed by item id in the controller.
#[derive(Debug, Clone, Default)]
pub struct GestureState {
    /// Displacement from the resting position.
    pub offset: Offset,
    /// Where the card is in its gesture lifecycle.
    pub phase: GesturePhase,
    /// Live overlay direction while dragging, final direction while
    /// committing.
    pub direction: Option<SwipeDirection>,
    pub(crate) trajectory: Option<Trajectory>,
}

impl GestureState {
    /// Idle at the origin.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop any in-flight motion and return to rest at the origin.
    pub fn reset(&mut self) {
        self.offset = Offset::ZERO;
        self.phase = GesturePhase::Idle;
        self.direction = None;
        self.trajectory = None;
    }
}
