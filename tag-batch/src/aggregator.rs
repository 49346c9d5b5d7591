use crate::fetcher::Fetcher;
use crate::pipeline::BatchPipeline;
use crate::retry::RetryPolicy;
use crate::state::{BatchSnapshot, BatchStore};
use crate::types::{FetchConfig, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Upload client plus batch engine, wired to one classification service.
pub struct TagBatchAggregator {
    fetcher: Arc<Fetcher>,
    pipeline: BatchPipeline,
}

impl TagBatchAggregator {
    pub fn new(config: FetchConfig) -> Result<Self> {
        let policy = RetryPolicy::from_config(&config);
        let fetcher = Arc::new(Fetcher::new(config)?);
        let pipeline = BatchPipeline::new(fetcher.clone(), policy);

        Ok(Self { fetcher, pipeline })
    }

    pub async fn upload<P: AsRef<Path>>(&self, files: &[P]) -> Result<Vec<String>> {
        self.fetcher.upload_bulk(files).await
    }

    pub async fn run_batch(&self, ids: Vec<String>) -> Result<BatchSnapshot> {
        self.pipeline.run(ids).await
    }

    pub async fn upload_and_run<P: AsRef<Path>>(&self, files: &[P]) -> Result<BatchSnapshot> {
        let ids = self.upload(files).await?;
        info!("Upload returned {} identifier(s)", ids.len());
        self.run_batch(ids).await
    }

    /// Access to the live store for selection, blur and show-more changes
    pub fn store(&self) -> &BatchStore {
        self.pipeline.store()
    }
}
