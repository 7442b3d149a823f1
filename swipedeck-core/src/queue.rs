//! The deck itself: an ordered FIFO of items with a low-watermark refill.
//!
//! `ItemQueue` is a cheap, cloneable handle. All mutations happen under one
//! lock and each one emits a [`DeckEvent`] carrying the full post-mutation
//! snapshot, so observers never see a size that disagrees with the contents.
//! Refill requests run on the tokio runtime the queue was loaded on and never
//! block the caller.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::{DeckError, Result};
use crate::provider::ItemProvider;
use crate::types::{ItemId, SwipeItem};

/// What changed in a single deck mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum DeckChange {
    /// Initial contents were installed.
    Loaded {
        /// Items present after the load.
        len: usize,
    },
    /// The front item was removed.
    Evicted {
        /// The item that left the deck.
        id: ItemId,
    },
    /// Items were added at the back.
    Appended {
        /// Ids in the order they were appended.
        ids: Vec<ItemId>,
    },
}

/// Notification emitted after every deck mutation.
#[derive(Debug)]
pub struct DeckEvent<T> {
    /// Revision the deck reached with this mutation.
    pub revision: u64,
    /// The mutation itself.
    pub change: DeckChange,
    /// Full deck contents after the mutation, front first.
    pub items: Vec<Arc<T>>,
}

impl<T> Clone for DeckEvent<T> {
    fn clone(&self) -> Self {
        Self {
            revision: self.revision,
            change: self.change.clone(),
            items: self.items.clone(),
        }
    }
}

/// Consistent read of the deck at one revision.
#[derive(Debug)]
pub struct DeckSnapshot<T> {
    /// Revision the snapshot was taken at.
    pub revision: u64,
    /// Deck contents, front first.
    pub items: Vec<Arc<T>>,
}

impl<T> Clone for DeckSnapshot<T> {
    fn clone(&self) -> Self {
        Self {
            revision: self.revision,
            items: self.items.clone(),
        }
    }
}

impl<T> DeckSnapshot<T> {
    /// Number of items in the snapshot.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the snapshot holds no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The item on top of the deck.
    pub fn front(&self) -> Option<&Arc<T>> {
        self.items.first()
    }
}

struct QueueState<T> {
    items: VecDeque<Arc<T>>,
    revision: u64,
}

struct Shared<T> {
    state: Mutex<QueueState<T>>,
    provider: Arc<dyn ItemProvider<T>>,
    refill_threshold: usize,
    refill_in_flight: AtomicBool,
    pending_refill: Mutex<Option<JoinHandle<()>>>,
    events: broadcast::Sender<DeckEvent<T>>,
    runtime: Handle,
}

/// Shared handle to the deck contents. Clones observe and mutate the same
/// deck.
pub struct ItemQueue<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for ItemQueue<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T> std::fmt::Debug for ItemQueue<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.shared.state.lock();
        f.debug_struct("ItemQueue")
            .field("len", &state.items.len())
            .field("revision", &state.revision)
            .field("refill_threshold", &self.shared.refill_threshold)
            .field(
                "refill_in_flight",
                &self.shared.refill_in_flight.load(Ordering::Acquire),
            )
            .finish()
    }
}

impl<T> ItemQueue<T>
where
    T: SwipeItem + Send + Sync + 'static,
{
    /// Build the deck. A non-empty `initial` seeds it directly; otherwise a
    /// single item is requested from the provider. A provider that yields
    /// nothing (or fails) leaves the deck empty.
    ///
    /// Must be called from within a tokio runtime; later refills are spawned
    /// on that runtime.
    pub async fn load(
        initial: Vec<T>,
        provider: Arc<dyn ItemProvider<T>>,
        refill_threshold: usize,
        event_capacity: usize,
    ) -> Self {
        let (events, _) = broadcast::channel(event_capacity.max(1));
        let shared = Arc::new(Shared {
            state: Mutex::new(QueueState {
                items: VecDeque::new(),
                revision: 0,
            }),
            provider,
            refill_threshold,
            refill_in_flight: AtomicBool::new(false),
            pending_refill: Mutex::new(None),
            events,
            runtime: Handle::current(),
        });

        let seed = if initial.is_empty() {
            match shared.provider.request_one().await {
                Ok(Some(item)) => vec![item],
                Ok(None) => {
                    debug!("provider had no initial item; deck starts empty");
                    Vec::new()
                }
                Err(err) => {
                    warn!(error = %err, "provider failed during initial load");
                    Vec::new()
                }
            }
        } else {
            initial
        };

        {
            let mut state = shared.state.lock();
            let mut seen = HashSet::with_capacity(seed.len());
            for item in seed {
                let id = item.id();
                if seen.insert(id) {
                    state.items.push_back(Arc::new(item));
                } else {
                    warn!(%id, "dropping duplicate item from initial load");
                }
            }
            let len = state.items.len();
            Self::publish(&shared, &mut state, DeckChange::Loaded { len });
        }

        Self { shared }
    }

    /// Number of items currently in the deck.
    pub fn len(&self) -> usize {
        self.shared.state.lock().items.len()
    }

    /// Whether the deck holds no items.
    pub fn is_empty(&self) -> bool {
        self.shared.state.lock().items.is_empty()
    }

    /// Counter bumped by every mutation.
    pub fn revision(&self) -> u64 {
        self.shared.state.lock().revision
    }

    /// The item on top of the deck.
    pub fn front(&self) -> Option<Arc<T>> {
        self.shared.state.lock().items.front().cloned()
    }

    /// Id of the item on top of the deck.
    pub fn front_id(&self) -> Option<ItemId> {
        self.shared.state.lock().items.front().map(|item| item.id())
    }

    /// Whether an item with `id` is anywhere in the deck.
    pub fn contains(&self, id: ItemId) -> bool {
        self.shared
            .state
            .lock()
            .items
            .iter()
            .any(|item| item.id() == id)
    }

    /// Contents and revision read under one lock.
    pub fn snapshot(&self) -> DeckSnapshot<T> {
        let state = self.shared.state.lock();
        DeckSnapshot {
            revision: state.revision,
            items: state.items.iter().cloned().collect(),
        }
    }

    /// A refill is requested once the deck holds this many items or fewer.
    pub fn refill_threshold(&self) -> usize {
        self.shared.refill_threshold
    }

    /// Whether a provider request is currently outstanding.
    pub fn refill_in_flight(&self) -> bool {
        self.shared.refill_in_flight.load(Ordering::Acquire)
    }

    /// Receive a [`DeckEvent`] for every later mutation.
    pub fn subscribe(&self) -> broadcast::Receiver<DeckEvent<T>> {
        self.shared.events.subscribe()
    }

    /// Runtime background work for this deck is spawned on.
    pub(crate) fn runtime(&self) -> &Handle {
        &self.shared.runtime
    }

    /// Remove and return the front item, then top the deck up if it has
    /// dropped to the refill threshold.
    pub fn evict_front(&self) -> Result<Arc<T>> {
        let evicted = {
            let mut state = self.shared.state.lock();
            let item = state.items.pop_front().ok_or(DeckError::EmptyDeck)?;
            let id = item.id();
            Self::publish(&self.shared, &mut state, DeckChange::Evicted { id });
            item
        };
        self.maybe_refill();
        Ok(evicted)
    }

    /// Evict the front only if it is still `id`. Returns `Ok(None)` when a
    /// different item (or nothing) is at the front.
    pub(crate) fn evict_front_if(&self, id: ItemId) -> Result<Option<Arc<T>>> {
        let evicted = {
            let mut state = self.shared.state.lock();
            match state.items.front() {
                None => return Err(DeckError::EmptyDeck),
                Some(front) if front.id() != id => return Ok(None),
                Some(_) => {}
            }
            let item = state.items.pop_front().ok_or(DeckError::EmptyDeck)?;
            Self::publish(&self.shared, &mut state, DeckChange::Evicted { id });
            item
        };
        self.maybe_refill();
        Ok(Some(evicted))
    }

    /// Append items to the back of the deck. Items whose id is already
    /// present are dropped. Returns how many were appended.
    pub fn append_many(&self, items: impl IntoIterator<Item = T>) -> usize {
        let mut state = self.shared.state.lock();
        Self::append_locked(&self.shared, &mut state, items)
    }

    /// Wait for the in-flight refill request, if any, to finish.
    pub async fn settle(&self) {
        let handle = self.shared.pending_refill.lock().take();
        if let Some(handle) = handle
            && let Err(err) = handle.await
        {
            warn!(error = %err, "refill task did not complete");
        }
    }

    fn append_locked(
        shared: &Shared<T>,
        state: &mut QueueState<T>,
        items: impl IntoIterator<Item = T>,
    ) -> usize {
        let mut present: HashSet<ItemId> =
            state.items.iter().map(|item| item.id()).collect();
        let mut ids = Vec::new();
        for item in items {
            let id = item.id();
            if present.insert(id) {
                state.items.push_back(Arc::new(item));
                ids.push(id);
            } else {
                warn!(%id, "dropping append of an item already in the deck");
            }
        }
        if ids.is_empty() {
            return 0;
        }
        let appended = ids.len();
        Self::publish(shared, state, DeckChange::Appended { ids });
        appended
    }

    fn publish(
        shared: &Shared<T>,
        state: &mut QueueState<T>,
        change: DeckChange,
    ) {
        state.revision += 1;
        let event = DeckEvent {
            revision: state.revision,
            change,
            items: state.items.iter().cloned().collect(),
        };
        debug!(
            revision = event.revision,
            len = event.items.len(),
            change = ?event.change,
            "deck changed"
        );
        // No subscribers is fine; the snapshot API still reflects the change.
        let _ = shared.events.send(event);
    }

    fn maybe_refill(&self) {
        let len = self.len();
        if len > self.shared.refill_threshold {
            return;
        }
        if self
            .shared
            .refill_in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!(len, "refill already in flight");
            return;
        }

        debug!(
            len,
            threshold = self.shared.refill_threshold,
            "deck low; requesting one item"
        );
        let shared = Arc::clone(&self.shared);
        let handle = self.shared.runtime.spawn(async move {
            let _in_flight = InFlightGuard(&shared.refill_in_flight);
            let outcome = shared.provider.request_one().await;
            match outcome {
                Ok(Some(item)) => {
                    let mut state = shared.state.lock();
                    Self::append_locked(&shared, &mut state, [item]);
                }
                Ok(None) => debug!("provider has no more items"),
                Err(err) => {
                    warn!(error = %err, "provider failed; deck not refilled")
                }
            }
        });
        *self.shared.pending_refill.lock() = Some(handle);
    }
}

/// Clears the in-flight flag when the refill task ends, including when the
/// provider panics or the task is cancelled.
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
