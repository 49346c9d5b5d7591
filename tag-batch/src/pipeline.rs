use crate::retry::{PollController, RetryPolicy};
use crate::state::{BatchSnapshot, BatchStore, RecordStatus};
use crate::traits::TagSource;
use crate::types::{ItemOutcome, Result, TagBatchError};
use futures::stream::StreamExt;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{debug, info, warn};

/// Terminal event emitted by one controller.
#[derive(Debug)]
struct Completion {
    generation: u64,
    id: String,
    outcome: ItemOutcome,
}

/// Fans out one [`PollController`] per identifier and feeds their terminal
/// outcomes, one at a time, into the [`BatchStore`].
pub struct BatchPipeline {
    controller: PollController,
    store: BatchStore,
    completion_sender: mpsc::UnboundedSender<Completion>,
}

impl BatchPipeline {
    /// Must be called from within a Tokio runtime.
    pub fn new(source: Arc<dyn TagSource>, policy: RetryPolicy) -> Self {
        // unbounded: a controller never waits on the store to finish its lookup
        let (completion_sender, completion_receiver) = mpsc::unbounded_channel();
        let store = BatchStore::new();

        Self::start_completion_worker(store.clone(), completion_receiver);

        Self {
            controller: PollController::new(source, policy),
            store,
            completion_sender,
        }
    }

    pub fn store(&self) -> &BatchStore {
        &self.store
    }

    /// Resets the store and launches every lookup without waiting on any of them.
    ///
    /// Duplicated identifiers are looked up independently. Controllers from an
    /// earlier batch keep running; their results are dropped on arrival.
    pub async fn start(&self, ids: Vec<String>) -> Result<u64> {
        if ids.is_empty() {
            return Err(TagBatchError::EmptyBatch);
        }

        // bumping the generation is what strands the previous batch's controllers
        let generation = self.store.begin(ids.len()).await;
        info!("Launching {} lookup(s) for batch {}", ids.len(), generation);

        for id in ids {
            let controller = self.controller.clone();
            let sender = self.completion_sender.clone();

            // detached; the store decides whether the outcome still counts
            tokio::spawn(async move {
                let outcome = controller.run(&id).await;
                if let Err(e) = sender.send(Completion { generation, id, outcome }) {
                    warn!("Failed to deliver completion: {}", e);
                }
            });
        }

        Ok(generation)
    }

    /// Starts a batch and waits until every identifier has resolved.
    ///
    /// Returns [`TagBatchError::Superseded`] when another batch starts on this
    /// pipeline before this one finishes loading.
    pub async fn run(&self, ids: Vec<String>) -> Result<BatchSnapshot> {
        let generation = self.start(ids).await?;
        self.store.wait_loaded(generation).await
    }

    /// Single consumer applying completions in arrival order.
    fn start_completion_worker(store: BatchStore, receiver: mpsc::UnboundedReceiver<Completion>) {
        tokio::spawn(async move {
            let completions = UnboundedReceiverStream::new(receiver);
            tokio::pin!(completions);

            // ends once every sender, the pipeline's included, is dropped
            while let Some(completion) = completions.next().await {
                let Completion { generation, id, outcome } = completion;
                match store.record(generation, outcome).await {
                    RecordStatus::Appended | RecordStatus::Completed => {
                        debug!("Recorded outcome for {} in batch {}", id, generation);
                    }
                    RecordStatus::Stale | RecordStatus::Overflow => {
                        debug!("Discarded outcome for {} from batch {}", id, generation);
                    }
                }
            }
        });
    }
}
