//! Orchestrates a single interactive deck.
//!
//! The controller owns the per-card [`GestureState`] table and is the only
//! writer of it: every input and tick call takes `&mut self`, so one card's
//! gesture is never touched from two places at once. Only the front card can
//! leave `Idle`, and a new drag is refused until the previous animation has
//! released the front card.
//!
//! Time is supplied by the caller through [`DeckController::advance`]. Each
//! call is a cancellation point: if the animating card has been evicted or
//! replaced since the last tick, its trajectory is dropped without further
//! motion or callbacks.
//!
//! The published [`DeckView`] follows the deck revision. Mutations made
//! outside the controller, such as a refill landing in the background, are
//! forwarded to [`DeckController::subscribe`] receivers by a task spawned on
//! the deck's runtime, and [`DeckController::view`] rebuilds on demand when
//! it finds the published view behind the deck.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, trace};

use crate::animation::{TrajectoryAnimator, TrajectoryStep};
use crate::config::{EmptyStatePresentation, SwipeDeckConfig};
use crate::error::{DeckError, Result};
use crate::gesture::{DragTracker, GesturePhase, GestureState, Outcome};
use crate::provider::ItemProvider;
use crate::queue::{DeckEvent, DeckSnapshot, ItemQueue};
use crate::types::{ItemId, Offset, SwipeDirection, SwipeItem, Viewport};

/// Receives each committed card and the direction it left in.
pub type SwipeCallback<T> = Box<dyn FnMut(&T, SwipeDirection) + Send>;
/// Runs when the user asks for new filters on an empty deck.
pub type ChangeFiltersCallback = Box<dyn FnMut() + Send>;

/// How one card should be drawn.
#[derive(Debug)]
pub struct CardView<T> {
    /// The item on this card.
    pub item: Arc<T>,
    /// Only the front card follows the pointer.
    pub is_front: bool,
    /// Drag or animation offset for the front card, stacking offset for the
    /// cards behind it.
    pub offset: Offset,
    /// Tilt in degrees, `offset.x / rotation_divisor` for the front card.
    pub rotation_deg: f32,
    /// Overlay direction, front card only.
    pub direction: Option<SwipeDirection>,
    /// Gesture phase, `Idle` for every card but the front.
    pub phase: GesturePhase,
}

impl<T> Clone for CardView<T> {
    fn clone(&self) -> Self {
        Self {
            item: Arc::clone(&self.item),
            is_front: self.is_front,
            offset: self.offset,
            rotation_deg: self.rotation_deg,
            direction: self.direction,
            phase: self.phase,
        }
    }
}

/// Read-only picture of the deck handed to the renderer. Cards are ordered
/// front first.
#[derive(Debug)]
pub struct DeckView<T> {
    /// Deck revision the view was built from.
    pub revision: u64,
    /// One entry per card in the deck.
    pub cards: Vec<CardView<T>>,
    /// Set only when the deck is empty.
    pub empty_state: Option<EmptyStatePresentation>,
}

impl<T> Clone for DeckView<T> {
    fn clone(&self) -> Self {
        Self {
            revision: self.revision,
            cards: self.cards.clone(),
            empty_state: self.empty_state.clone(),
        }
    }
}

impl<T> DeckView<T> {
    /// The card on top of the stack.
    pub fn front(&self) -> Option<&CardView<T>> {
        self.cards.first()
    }

    /// Number of cards drawn.
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Whether the empty state is showing instead of cards.
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

/// Direction badge drawn over the front card.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GestureOverlay {
    /// Direction the badge points at, if any.
    pub direction: Option<SwipeDirection>,
    /// Configured label for that direction.
    pub label: Option<String>,
}

/// What a single [`DeckController::advance`] call did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Card swiped away this tick, after `on_swipe` fired and it was evicted.
    pub committed: Option<(ItemId, SwipeDirection)>,
    /// Card that finished bouncing back this tick.
    pub settled: Option<ItemId>,
    /// Whether a trajectory is still running and wants another tick.
    pub animating: bool,
}

/// Drives one deck: pointer input in, card motion and swipe callbacks out.
pub struct DeckController<T> {
    queue: ItemQueue<T>,
    config: SwipeDeckConfig,
    tracker: DragTracker,
    animator: TrajectoryAnimator,
    gestures: HashMap<ItemId, GestureState>,
    view_tx: Arc<watch::Sender<DeckView<T>>>,
    forwarder: JoinHandle<()>,
    on_swipe: Option<SwipeCallback<T>>,
    on_change_filters: Option<ChangeFiltersCallback>,
}

impl<T> std::fmt::Debug for DeckController<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeckController")
            .field("queue", &self.queue)
            .field("gestures", &self.gestures.len())
            .field("view_revision", &self.view_tx.borrow().revision)
            .field("on_swipe", &self.on_swipe.is_some())
            .field("on_change_filters", &self.on_change_filters.is_some())
            .finish_non_exhaustive()
    }
}

impl<T> Drop for DeckController<T> {
    fn drop(&mut self) {
        self.forwarder.abort();
    }
}

impl<T> DeckController<T>
where
    T: SwipeItem + Send + Sync + 'static,
{
    /// Wrap an already loaded deck. The view forwarder is spawned on the
    /// runtime the deck was loaded on.
    pub fn new(queue: ItemQueue<T>, config: SwipeDeckConfig) -> Self {
        let tracker = DragTracker::new(
            config.gesture.swipe_threshold,
            config.swipe.enabled_directions.clone(),
        );
        let animator = TrajectoryAnimator::new(config.trajectory.clone());
        // Subscribe before the snapshot so no mutation falls in between.
        let events = queue.subscribe();
        let initial = build_view(&queue.snapshot(), &HashMap::new(), &config);
        let (view_tx, _) = watch::channel(initial);
        let view_tx = Arc::new(view_tx);
        let forwarder = spawn_view_forwarder(
            queue.runtime(),
            events,
            Arc::clone(&view_tx),
            config.clone(),
        );

        Self {
            queue,
            config,
            tracker,
            animator,
            gestures: HashMap::new(),
            view_tx,
            forwarder,
            on_swipe: None,
            on_change_filters: None,
        }
    }

    /// Load the deck through [`ItemQueue::load`] using `config.deck` and
    /// wrap it in a controller.
    pub async fn load(
        initial: Vec<T>,
        provider: Arc<dyn ItemProvider<T>>,
        config: SwipeDeckConfig,
    ) -> Self {
        let queue = ItemQueue::load(
            initial,
            provider,
            config.deck.refill_threshold,
            config.deck.event_capacity,
        )
        .await;
        Self::new(queue, config)
    }

    /// Called exactly once per committed card, before it leaves the deck.
    pub fn with_on_swipe<F>(mut self, f: F) -> Self
    where
        F: FnMut(&T, SwipeDirection) + Send + 'static,
    {
        self.on_swipe = Some(Box::new(f));
        self
    }

    /// Called when the user asks for new filters while the deck is empty.
    pub fn with_on_change_filters<F>(mut self, f: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        self.on_change_filters = Some(Box::new(f));
        self
    }

    /// The deck this controller drives.
    pub fn queue(&self) -> &ItemQueue<T> {
        &self.queue
    }

    /// Configuration the controller was built with.
    pub fn config(&self) -> &SwipeDeckConfig {
        &self.config
    }

    /// Gesture state of `id`, if it has left `Idle` since it became the
    /// front card.
    pub fn gesture(&self, id: ItemId) -> Option<&GestureState> {
        self.gestures.get(&id)
    }

    /// Whether a trajectory is running and wants more ticks.
    pub fn is_animating(&self) -> bool {
        self.gestures.values().any(|g| g.phase.is_animating())
    }

    /// The view of the current deck revision. If the deck changed since the
    /// last publication the view is rebuilt and republished first.
    pub fn view(&self) -> DeckView<T> {
        let current = self.view_tx.borrow().clone();
        if current.revision == self.queue.revision() {
            current
        } else {
            self.publish_view()
        }
    }

    /// Receive every published view, including those caused by background
    /// refills.
    pub fn subscribe(&self) -> watch::Receiver<DeckView<T>> {
        self.view_tx.subscribe()
    }

    /// Overlay state of the front card: live direction while dragging, the
    /// committed direction while it flies out.
    pub fn overlay(&self) -> GestureOverlay {
        let direction = self
            .queue
            .front_id()
            .and_then(|id| self.gestures.get(&id))
            .and_then(|g| g.direction);
        GestureOverlay {
            direction,
            label: direction
                .and_then(|d| self.config.swipe.label(d))
                .map(str::to_owned),
        }
    }

    /// Stage size used for commit trajectories planned from now on.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.animator.set_viewport(viewport);
    }

    /// Begin a drag on `id`, which must be the front card at rest.
    pub fn drag_start(&mut self, id: ItemId) -> Result<()> {
        self.prune_stale_gestures();
        self.ensure_front(id)?;
        let gesture = self.gestures.entry(id).or_default();
        self.tracker.on_drag_start(id, gesture)?;
        debug!(%id, "drag started");
        self.publish_view();
        Ok(())
    }

    /// Returns the provisional overlay direction after applying the delta.
    pub fn drag_delta(
        &mut self,
        id: ItemId,
        dx: f32,
        dy: f32,
    ) -> Result<Option<SwipeDirection>> {
        self.ensure_front(id)?;
        let gesture = gesture_mut(&mut self.gestures, id, "drag delta")?;
        let direction = self.tracker.on_drag_delta(id, gesture, dx, dy)?;
        self.publish_view();
        Ok(direction)
    }

    /// Release the drag. The returned outcome is the one actually animated:
    /// a commit released too close to the origin comes back as `Cancel`.
    pub fn drag_end(&mut self, id: ItemId) -> Result<Outcome> {
        self.ensure_front(id)?;
        let gesture = gesture_mut(&mut self.gestures, id, "drag end")?;
        let outcome = self.tracker.on_drag_end(id, gesture)?;
        let trajectory = self.animator.plan(outcome, gesture.offset);

        let effective = match trajectory.committed_direction() {
            Some(direction) => {
                gesture.phase = GesturePhase::Committing(direction);
                gesture.direction = Some(direction);
                Outcome::Commit(direction)
            }
            None => {
                gesture.phase = GesturePhase::Cancelling;
                Outcome::Cancel
            }
        };
        gesture.trajectory = Some(trajectory);
        debug!(
            %id,
            x = gesture.offset.x,
            y = gesture.offset.y,
            outcome = ?effective,
            "drag resolved"
        );
        self.publish_view();
        Ok(effective)
    }

    /// Advance the running trajectory, if any, by `dt`. Also republishes the
    /// view when the deck changed underneath (e.g. a refill landed).
    pub fn advance(&mut self, dt: Duration) -> TickReport {
        let mut report = TickReport::default();
        self.prune_stale_gestures();

        let Some(front_id) = self.queue.front_id() else {
            self.sync_view();
            return report;
        };
        let Some(gesture) = self.gestures.get_mut(&front_id) else {
            self.sync_view();
            return report;
        };
        let Some(trajectory) = gesture.trajectory.as_mut() else {
            self.sync_view();
            return report;
        };

        match trajectory.advance(dt, &mut gesture.offset) {
            TrajectoryStep::Running => {
                report.animating = true;
                self.publish_view();
            }
            TrajectoryStep::Settled => {
                trace!(id = %front_id, "bounce back settled");
                gesture.reset();
                report.settled = Some(front_id);
                self.publish_view();
            }
            TrajectoryStep::Offscreen { forced } => {
                let direction = trajectory.committed_direction();
                match direction {
                    Some(direction) => {
                        debug!(id = %front_id, %direction, forced, "card offscreen");
                        if self.finish_commit(front_id, direction) {
                            report.committed = Some((front_id, direction));
                        }
                    }
                    None => {
                        error!(id = %front_id, "cancel trajectory reported offscreen");
                        gesture.reset();
                        self.publish_view();
                    }
                }
            }
        }

        report
    }

    /// Remove the front card without a swipe notification, halting any
    /// trajectory it had in flight.
    pub fn skip_front(&mut self) -> Option<Arc<T>> {
        let id = self.queue.front_id()?;
        self.gestures.remove(&id);
        let evicted = self.guarded_evict(id);
        debug!(%id, "front card skipped");
        self.publish_view();
        evicted
    }

    /// Append items to the back of the deck and republish. Returns how many
    /// were new.
    pub fn append_many(&mut self, items: impl IntoIterator<Item = T>) -> usize {
        let appended = self.queue.append_many(items);
        self.publish_view();
        appended
    }

    /// Forward a "change filters" request. Only honoured on an empty deck;
    /// returns whether the callback ran.
    pub fn request_change_filters(&mut self) -> bool {
        if !self.queue.is_empty() {
            debug!("ignoring change-filters request while cards remain");
            return false;
        }
        match self.on_change_filters.as_mut() {
            Some(callback) => {
                callback();
                true
            }
            None => false,
        }
    }

    /// Steps, in order: `on_swipe`, eviction, discard of the gesture state,
    /// republish. Returns false if the card was no longer the front.
    fn finish_commit(&mut self, id: ItemId, direction: SwipeDirection) -> bool {
        // Out of the table before any callback so it is released no matter
        // how the callback behaves.
        let gesture = self.gestures.remove(&id);

        let Some(item) = self.queue.front().filter(|item| item.id() == id) else {
            debug!(%id, "card left the deck mid-flight; dropping commit");
            self.publish_view();
            return false;
        };

        if let Some(callback) = self.on_swipe.as_mut() {
            callback(item.as_ref(), direction);
        }
        self.guarded_evict(id);
        drop(gesture);
        self.publish_view();
        true
    }

    fn guarded_evict(&self, id: ItemId) -> Option<Arc<T>> {
        match self.queue.evict_front_if(id) {
            Ok(Some(item)) => Some(item),
            Ok(None) => {
                debug!(%id, "front changed before eviction");
                None
            }
            Err(DeckError::EmptyDeck) => {
                debug!(%id, "deck emptied before eviction");
                None
            }
            Err(err) => {
                error!(%id, error = %err, "evicting guarded front failed");
                None
            }
        }
    }

    fn ensure_front(&self, id: ItemId) -> Result<()> {
        if self.queue.front_id() == Some(id) {
            Ok(())
        } else {
            Err(DeckError::NotFront { id })
        }
    }

    /// Only the front card may own gesture state. Anything else belongs to a
    /// card that was evicted or replaced behind the controller's back.
    fn prune_stale_gestures(&mut self) {
        let front = self.queue.front_id();
        self.gestures.retain(|id, gesture| {
            let keep = Some(*id) == front;
            if !keep && gesture.phase.is_animating() {
                debug!(%id, phase = ?gesture.phase, "abandoning trajectory of departed card");
            }
            keep
        });
    }

    fn sync_view(&self) {
        let published = self.view_tx.borrow().revision;
        if self.queue.revision() != published {
            self.publish_view();
        }
    }

    /// Build and publish the view of the latest deck revision. The forwarder
    /// may publish concurrently, so a view older than the published one is
    /// discarded and rebuilt from a fresh snapshot.
    fn publish_view(&self) -> DeckView<T> {
        loop {
            let view =
                build_view(&self.queue.snapshot(), &self.gestures, &self.config);
            let mut accepted = false;
            self.view_tx.send_if_modified(|current| {
                accepted = view.revision >= current.revision;
                if accepted {
                    *current = view.clone();
                }
                accepted
            });
            if accepted {
                return view;
            }
        }
    }
}

/// Republishes the view for every deck mutation the controller did not make
/// itself. The front card keeps its drawn gesture while its id is unchanged.
fn spawn_view_forwarder<T>(
    runtime: &Handle,
    mut events: broadcast::Receiver<DeckEvent<T>>,
    view_tx: Arc<watch::Sender<DeckView<T>>>,
    config: SwipeDeckConfig,
) -> JoinHandle<()>
where
    T: SwipeItem + Send + Sync + 'static,
{
    runtime.spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => {
                    view_tx.send_if_modified(|current| {
                        if event.revision <= current.revision {
                            return false;
                        }
                        let snapshot = DeckSnapshot {
                            revision: event.revision,
                            items: event.items.clone(),
                        };
                        let gestures = carried_gesture(current, &snapshot);
                        *current = build_view(&snapshot, &gestures, &config);
                        trace!(revision = event.revision, "view forwarded");
                        true
                    });
                }
                // A later event carries the full deck again.
                Err(RecvError::Lagged(skipped)) => {
                    debug!(skipped, "view forwarder lagged");
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}

fn carried_gesture<T: SwipeItem>(
    view: &DeckView<T>,
    snapshot: &DeckSnapshot<T>,
) -> HashMap<ItemId, GestureState> {
    let mut gestures = HashMap::new();
    if let (Some(card), Some(front)) = (view.front(), snapshot.front())
        && card.item.id() == front.id()
    {
        gestures.insert(
            front.id(),
            GestureState {
                offset: card.offset,
                phase: card.phase,
                direction: card.direction,
                trajectory: None,
            },
        );
    }
    gestures
}

/// A card with no gesture entry is at rest, so input other than a drag start
/// is reported against `Idle`.
fn gesture_mut<'a>(
    gestures: &'a mut HashMap<ItemId, GestureState>,
    id: ItemId,
    operation: &'static str,
) -> Result<&'a mut GestureState> {
    gestures.get_mut(&id).ok_or(DeckError::InvalidGestureState {
        id,
        phase: GesturePhase::Idle,
        operation,
    })
}

fn build_view<T: SwipeItem>(
    snapshot: &DeckSnapshot<T>,
    gestures: &HashMap<ItemId, GestureState>,
    config: &SwipeDeckConfig,
) -> DeckView<T> {
    let spacing = config.gesture.stack_spacing;
    let divisor = config.gesture.rotation_divisor;

    let cards = snapshot
        .items
        .iter()
        .enumerate()
        .map(|(depth, item)| {
            if depth == 0 {
                let gesture = gestures.get(&item.id());
                let offset = gesture.map(|g| g.offset).unwrap_or_default();
                let rotation_deg = if divisor != 0.0 {
                    offset.x / divisor
                } else {
                    0.0
                };
                CardView {
                    item: Arc::clone(item),
                    is_front: true,
                    offset,
                    rotation_deg,
                    direction: gesture.and_then(|g| g.direction),
                    phase: gesture.map(|g| g.phase).unwrap_or_default(),
                }
            } else {
                CardView {
                    item: Arc::clone(item),
                    is_front: false,
                    offset: Offset::new(0.0, depth as f32 * spacing),
                    rotation_deg: 0.0,
                    direction: None,
                    phase: GesturePhase::Idle,
                }
            }
        })
        .collect::<Vec<_>>();

    let empty_state = cards
        .is_empty()
        .then(|| config.swipe.empty_state.presentation());

    DeckView {
        revision: snapshot.revision,
        cards,
        empty_state,
    }
}
