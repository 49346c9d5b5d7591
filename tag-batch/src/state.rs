use crate::aggregators::{rank_tags, visible_tags, AggregateTag};
use crate::types::{ItemOutcome, ItemResult, Result, TagBatchError, TagScore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::{watch, RwLock};
use tracing::{debug, info, warn};

/// Transitions accepted by [`BatchState::apply`].
#[derive(Debug, Clone)]
pub enum BatchAction {
    Reset,
    AppendOutcome(Option<ItemOutcome>),
    CompleteLoading,
    SelectIndex(usize),
    SetBlur(bool),
    EnableShowMore,
}

/// Visible state of one batch. Slots are filled in completion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchState {
    pub results: Vec<ItemOutcome>,
    pub current_index: usize,
    pub is_loading: bool,
    pub show_more: bool,
}

impl BatchState {
    pub fn new() -> Self {
        Self {
            results: Vec::new(),
            current_index: 0,
            is_loading: true,
            show_more: false,
        }
    }

    /// Single entry point for every transition.
    pub fn apply(&mut self, action: BatchAction) {
        match action {
            BatchAction::Reset => self.reset(),
            BatchAction::AppendOutcome(outcome) => self.append_outcome(outcome),
            BatchAction::CompleteLoading => self.complete_loading(),
            BatchAction::SelectIndex(index) => self.select_index(index),
            BatchAction::SetBlur(value) => self.set_blur(value),
            BatchAction::EnableShowMore => self.enable_show_more(),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// A missing outcome leaves the state untouched.
    pub fn append_outcome(&mut self, outcome: Option<ItemOutcome>) {
        if let Some(outcome) = outcome {
            self.results.push(outcome);
        }
    }

    pub fn complete_loading(&mut self) {
        self.is_loading = false;
    }

    /// Ignored when `index` is out of bounds or names a failed slot.
    pub fn select_index(&mut self, index: usize) {
        if self.results.get(index).is_some_and(ItemOutcome::is_ready) {
            self.current_index = index;
        }
    }

    /// Only the current slot, and only when it is Ready.
    pub fn set_blur(&mut self, value: bool) {
        let index = self.current_index;
        if let Some(result) = self.results.get_mut(index).and_then(ItemOutcome::as_ready_mut) {
            result.blur = value;
        }
    }

    /// One-way; nothing but a reset clears it.
    pub fn enable_show_more(&mut self) {
        self.show_more = true;
    }

    /// Points the selection at the first Ready slot, or 0 when there is none.
    pub fn select_initial(&mut self) {
        self.current_index = self.results.iter().position(ItemOutcome::is_ready).unwrap_or(0);
    }

    pub fn current(&self) -> Option<&ItemResult> {
        self.results.get(self.current_index).and_then(ItemOutcome::as_ready)
    }

    pub fn ready_results(&self) -> impl Iterator<Item = &ItemResult> {
        self.results.iter().filter_map(ItemOutcome::as_ready)
    }

    pub fn ready_count(&self) -> usize {
        self.ready_results().count()
    }

    /// Tags shown for `slot`, honouring the show-more flag. Empty for failed slots.
    pub fn visible_tags(&self, slot: usize) -> Vec<&TagScore> {
        self.results
            .get(slot)
            .and_then(ItemOutcome::as_ready)
            .map(|result| visible_tags(&result.general_tags, self.show_more))
            .unwrap_or_default()
    }

    /// Cross-item ranking. `None` unless more than one slot is Ready.
    pub fn aggregate(&self) -> Option<Vec<AggregateTag>> {
        if self.ready_count() > 1 {
            Some(rank_tags(self.ready_results()))
        } else {
            None
        }
    }
}

impl Default for BatchState {
    fn default() -> Self {
        Self::new()
    }
}

/// Copy of the store at one point in time, tagged with its batch generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSnapshot {
    pub generation: u64,
    pub expected: usize,
    pub state: BatchState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordStatus {
    Appended,
    /// The append filled the last slot and loading cleared.
    Completed,
    /// Came from a superseded batch and was dropped.
    Stale,
    /// The batch already had all its slots.
    Overflow,
}

/// Transitions a user may apply to the live batch through [`BatchStore::dispatch`].
///
/// Lifecycle transitions (reset, append, completion) are owned by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserAction {
    SelectIndex(usize),
    SetBlur(bool),
    EnableShowMore,
}

impl From<UserAction> for BatchAction {
    fn from(action: UserAction) -> Self {
        match action {
            UserAction::SelectIndex(index) => BatchAction::SelectIndex(index),
            UserAction::SetBlur(value) => BatchAction::SetBlur(value),
            UserAction::EnableShowMore => BatchAction::EnableShowMore,
        }
    }
}

/// Latest generation and whether it has finished loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LoadProgress {
    generation: u64,
    loaded: bool,
}

struct StoreInner {
    generation: u64,
    expected: usize,
    state: BatchState,
}

/// Shared, generation-guarded owner of the current [`BatchState`].
///
/// All transitions go through the write lock, one at a time.
#[derive(Clone)]
pub struct BatchStore {
    inner: Arc<RwLock<StoreInner>>,
    progress: Arc<watch::Sender<LoadProgress>>,
}

impl BatchStore {
    pub fn new() -> Self {
        let (progress, _) = watch::channel(LoadProgress {
            generation: 0,
            loaded: false,
        });
        Self {
            inner: Arc::new(RwLock::new(StoreInner {
                generation: 0,
                expected: 0,
                state: BatchState::new(),
            })),
            progress: Arc::new(progress),
        }
    }

    /// Resets the state for a batch of `expected` items and returns its generation.
    pub async fn begin(&self, expected: usize) -> u64 {
        let mut inner = self.inner.write().await;
        inner.generation += 1;
        inner.expected = expected;
        inner.state.apply(BatchAction::Reset);

        // wakes anyone still waiting on the previous generation
        self.progress.send_replace(LoadProgress {
            generation: inner.generation,
            loaded: false,
        });
        info!("Started batch generation {} with {} item(s)", inner.generation, expected);
        inner.generation
    }

    /// Discards the current batch. Lookups still in flight become stale.
    pub async fn reset(&self) -> u64 {
        self.begin(0).await
    }

    /// Appends a terminal outcome produced for batch `generation`.
    pub async fn record(&self, generation: u64, outcome: ItemOutcome) -> RecordStatus {
        let mut inner = self.inner.write().await;

        if generation != inner.generation {
            warn!(
                "Dropping completion from superseded batch {} (current is {})",
                generation, inner.generation
            );
            return RecordStatus::Stale;
        }
        // N slots at most, and nothing after loading cleared
        if inner.state.results.len() >= inner.expected || !inner.state.is_loading {
            warn!("Batch {} already holds {} result(s), dropping extra completion", generation, inner.expected);
            return RecordStatus::Overflow;
        }

        // slots are filled in arrival order, not request order
        inner.state.apply(BatchAction::AppendOutcome(Some(outcome)));
        debug!("Batch {}: {}/{} resolved", generation, inner.state.results.len(), inner.expected);

        if inner.state.results.len() == inner.expected {
            inner.state.apply(BatchAction::CompleteLoading);
            inner.state.select_initial();
            info!(
                "Batch {} finished: {} ready, {} failed",
                generation,
                inner.state.ready_count(),
                inner.expected - inner.state.ready_count()
            );
            self.progress.send_replace(LoadProgress {
                generation,
                loaded: true,
            });
            RecordStatus::Completed
        } else {
            RecordStatus::Appended
        }
    }

    /// Applies a user-driven transition to the current batch.
    pub async fn dispatch(&self, action: UserAction) {
        let mut inner = self.inner.write().await;
        inner.state.apply(action.into());
    }

    pub async fn generation(&self) -> u64 {
        self.inner.read().await.generation
    }

    pub async fn snapshot(&self) -> BatchSnapshot {
        let inner = self.inner.read().await;
        BatchSnapshot {
            generation: inner.generation,
            expected: inner.expected,
            state: inner.state.clone(),
        }
    }

    /// Waits until batch `generation` has finished loading.
    ///
    /// Fails with [`TagBatchError::Superseded`] once a newer batch or a reset
    /// replaces it, so callers never receive another batch's results.
    pub async fn wait_loaded(&self, generation: u64) -> Result<BatchSnapshot> {
        let mut receiver = self.progress.subscribe();
        receiver
            .wait_for(|progress| progress.generation != generation || progress.loaded)
            .await
            .map_err(|_| TagBatchError::General("Batch store closed".to_string()))?;

        // the lock decides; a newer batch may have begun since the wake-up
        let inner = self.inner.read().await;
        if inner.generation != generation {
            return Err(TagBatchError::Superseded {
                generation,
                current: inner.generation,
            });
        }
        Ok(BatchSnapshot {
            generation: inner.generation,
            expected: inner.expected,
            state: inner.state.clone(),
        })
    }
}

impl Default for BatchStore {
    fn default() -> Self {
        Self::new()
    }
}
