pub mod types;
pub mod classifier;
pub mod traits;
pub mod retry;
pub mod fetcher;
pub mod aggregators;
pub mod state;
pub mod pipeline;
pub mod aggregator;
pub mod digest;
pub mod utils;

pub use types::*;
pub use traits::TagSource;
pub use fetcher::Fetcher;
pub use retry::{Decision, PollController, RetryPolicy};
pub use state::{BatchAction, BatchSnapshot, BatchState, BatchStore, RecordStatus, UserAction};
pub use pipeline::BatchPipeline;
pub use aggregator::TagBatchAggregator;
pub use aggregators::{rank_tags, AggregateTag};
pub use digest::BatchDigest;
