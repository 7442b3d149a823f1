//! Error types returned by the deck and its providers.

use thiserror::Error;

use crate::gesture::GesturePhase;
use crate::types::ItemId;

/// Errors from deck and gesture operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DeckError {
    /// Eviction was attempted on a deck with no items.
    #[error("cannot evict from an empty deck")]
    EmptyDeck,

    /// Input named a card that is not on top.
    #[error("item {id} is not the front of the deck")]
    NotFront {
        /// The card the input was aimed at.
        id: ItemId,
    },

    /// Input arrived in a phase that does not accept it.
    #[error("{operation} is not valid for item {id} in phase {phase:?}")]
    InvalidGestureState {
        /// The card the input was aimed at.
        id: ItemId,
        /// Phase the card was in.
        phase: GesturePhase,
        /// The rejected operation.
        operation: &'static str,
    },
}

impl DeckError {
    /// Stale or out-of-order pointer input. These are expected after
    /// eviction races and are dropped by callers rather than surfaced.
    pub fn is_stale_input(&self) -> bool {
        matches!(
            self,
            DeckError::NotFront { .. } | DeckError::InvalidGestureState { .. }
        )
    }
}

/// Failure reported by an [`ItemProvider`](crate::provider::ItemProvider).
/// The queue treats it exactly like "no item available".
#[derive(Error, Debug)]
pub enum ProviderError {
    /// The provider gave a reason.
    #[error("item provider failed: {0}")]
    Failed(String),

    /// Any other error bubbled up from the provider.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result alias for deck operations.
pub type Result<T> = std::result::Result<T, DeckError>;
