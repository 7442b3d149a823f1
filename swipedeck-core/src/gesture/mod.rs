//! Drag input: per-card state, the tracker that applies pointer events, and
//! release classification.

pub mod resolver;
pub mod state;
pub mod tracker;

pub use resolver::{Outcome, classify, geometric_direction, provisional_direction};
pub use state::{GesturePhase, GestureState};
pub use tracker::DragTracker;
