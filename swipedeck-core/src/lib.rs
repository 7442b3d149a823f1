//! # SwipeDeck Core
//!
//! Headless engine for a "swipe deck": a stack of cards whose front card
//! follows a pointer drag and is either flung away (commit) or eased back to
//! rest (cancel), after which the next card takes its place and the deck is
//! topped up from an asynchronous provider.
//!
//! ## Architecture
//!
//! - [`queue`]: the deck itself, with low-watermark refill and change events
//! - [`gesture`]: drag accumulation ([`DragTracker`]) and outcome
//!   classification ([`classify`])
//! - [`animation`]: tick-driven commit and cancel trajectories
//! - [`controller`]: [`DeckController`], which ties the above together and
//!   publishes a [`DeckView`] for rendering
//!
//! Rendering, item content and process wiring are left to the host. The host
//! forwards pointer events, calls [`DeckController::advance`] once per frame
//! and draws whatever the latest [`DeckView`] says.
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use swipedeck_core::{
//!     DeckController, ExhaustedProvider, ItemId, SwipeDeckConfig, SwipeItem,
//! };
//!
//! struct Profile {
//!     id: i64,
//!     name: String,
//! }
//!
//! impl SwipeItem for Profile {
//!     fn id(&self) -> ItemId {
//!         ItemId(self.id)
//!     }
//! }
//!
//! # async fn run() {
//! let profiles = vec![Profile { id: 1, name: "Alice".into() }];
//! let mut deck = DeckController::load(
//!     profiles,
//!     Arc::new(ExhaustedProvider),
//!     SwipeDeckConfig::default(),
//! )
//! .await
//! .with_on_swipe(|profile, direction| {
//!     println!("{} swiped {direction}", profile.name);
//! });
//!
//! deck.drag_start(ItemId(1)).ok();
//! deck.drag_delta(ItemId(1), 180.0, 0.0).ok();
//! deck.drag_end(ItemId(1)).ok();
//! while deck.advance(Duration::from_millis(16)).animating {}
//! # }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod animation;
pub mod config;
pub mod controller;
pub mod error;
pub mod gesture;
pub mod provider;
pub mod queue;
pub mod types;

pub use animation::{Easing, Trajectory, TrajectoryAnimator, TrajectoryStep};
pub use config::{
    DeckConfig, DirectionLabels, EmptyStateConfig, EmptyStatePresentation,
    GestureConfig, SwipeConfig, SwipeDeckConfig, TrajectoryConfig,
};
pub use controller::{
    CardView, DeckController, DeckView, GestureOverlay, TickReport,
};
pub use error::{DeckError, ProviderError, Result};
pub use gesture::{DragTracker, GesturePhase, GestureState, Outcome, classify};
pub use provider::{ExhaustedProvider, FnProvider, ItemProvider};
pub use queue::{DeckChange, DeckEvent, DeckSnapshot, ItemQueue};
pub use types::{ItemId, Offset, SwipeDirection, SwipeItem, Viewport};
