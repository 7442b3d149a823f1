//! Applies pointer events to a card's gesture state.

use std::collections::BTreeSet;

use tracing::{trace, warn};

use super::resolver::{Outcome, classify, provisional_direction};
use super::state::{GesturePhase, GestureState};
use crate::error::{DeckError, Result};
use crate::types::{ItemId, Offset, SwipeDirection};

/// Accumulates pointer deltas for the front card and enforces the
/// `Idle -> Dragging -> Resolving` order. Out-of-order calls leave the state
/// untouched and report [`DeckError::InvalidGestureState`].
#[derive(Debug, Clone)]
pub struct DragTracker {
    threshold: f32,
    enabled: BTreeSet<SwipeDirection>,
}

impl DragTracker {
    /// Tracker committing past `threshold` in any of `enabled`.
    pub fn new(threshold: f32, enabled: BTreeSet<SwipeDirection>) -> Self {
        Self { threshold, enabled }
    }

    /// Distance a drag must exceed to commit.
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Directions that may commit.
    pub fn enabled(&self) -> &BTreeSet<SwipeDirection> {
        &self.enabled
    }

    /// `Idle -> Dragging`.
    pub fn on_drag_start(&self, id: ItemId, state: &mut GestureState) -> Result<()> {
        expect_phase(id, state, GesturePhase::Idle, "drag start")?;
        state.phase = GesturePhase::Dragging;
        state.direction = None;
        trace!(%id, "drag started");
        Ok(())
    }

    /// Apply one pointer movement and return the refreshed overlay direction.
    pub fn on_drag_delta(
        &self,
        id: ItemId,
        state: &mut GestureState,
        dx: f32,
        dy: f32,
    ) -> Result<Option<SwipeDirection>> {
        expect_phase(id, state, GesturePhase::Dragging, "drag delta")?;
        if !dx.is_finite() || !dy.is_finite() {
            warn!(%id, dx, dy, "ignoring non-finite drag delta");
            return Ok(state.direction);
        }
        state.offset += Offset::new(dx, dy);
        state.direction =
            provisional_direction(state.offset, self.threshold, &self.enabled);
        Ok(state.direction)
    }

    /// Finish the drag and classify where it was released.
    pub fn on_drag_end(&self, id: ItemId, state: &mut GestureState) -> Result<Outcome> {
        expect_phase(id, state, GesturePhase::Dragging, "drag end")?;
        state.phase = GesturePhase::Resolving;
        let outcome = classify(state.offset, self.threshold, &self.enabled);
        trace!(%id, x = state.offset.x, y = state.offset.y, ?outcome, "drag released");
        Ok(outcome)
    }
}

fn expect_phase(
    id: ItemId,
    state: &GestureState,
    expected: GesturePhase,
    operation: &'static str,
) -> Result<()> {
    if state.phase == expected {
        Ok(())
    } else {
        Err(DeckError::InvalidGestureState {
            id,
            phase: state.phase,
            operation,
        })
    }
}
