use crate::classifier::{classify, is_terminal_status};
use crate::traits::TagSource;
use crate::types::{AttemptOutcome, FailureReason, FetchConfig, ItemOutcome, ItemResult, TransportFailure};
use backoff::backoff::{Backoff, Constant};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Retry,
    Succeed,
    Fail(FailureReason),
}

/// Fixed-interval polling policy with a hard attempt cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    pub fn from_config(config: &FetchConfig) -> Self {
        Self::new(config.max_attempts, Duration::from_millis(config.retry_delay_ms))
    }

    /// Decides what follows attempt number `attempt` (1-based).
    pub fn decide(&self, attempt: u32, outcome: &AttemptOutcome) -> Decision {
        let failure = match outcome {
            AttemptOutcome::Ready(_) => return Decision::Succeed,
            AttemptOutcome::Failure(failure) => failure,
        };

        if Self::is_terminal(outcome) {
            return Decision::Fail(classify(failure));
        }
        if attempt >= self.max_attempts {
            Decision::Fail(classify(failure))
        } else {
            Decision::Retry
        }
    }
}

impl RetryPolicy {
    /// True for statuses that end polling on the attempt they arrive.
    pub fn is_terminal(outcome: &AttemptOutcome) -> bool {
        matches!(
            outcome,
            AttemptOutcome::Failure(TransportFailure::Status { code, .. }) if is_terminal_status(*code)
        )
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&FetchConfig::default())
    }
}

/// Drives one identifier's lookup until it reaches a terminal outcome.
#[derive(Clone)]
pub struct PollController {
    source: Arc<dyn TagSource>,
    policy: RetryPolicy,
}

impl PollController {
    pub fn new(source: Arc<dyn TagSource>, policy: RetryPolicy) -> Self {
        Self { source, policy }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Runs attempts strictly in sequence and returns exactly one terminal outcome.
    pub async fn run(&self, id: &str) -> ItemOutcome {
        let mut interval = Constant::new(self.policy.delay);
        let mut attempt = 0;

        loop {
            attempt += 1;
            debug!("Lookup attempt {} for {} via {}", attempt, id, self.source.source_name());

            let outcome = self.source.lookup(id).await;
            match (self.policy.decide(attempt, &outcome), outcome) {
                (Decision::Succeed, AttemptOutcome::Ready(payload)) => {
                    info!("Resolved {} after {} attempt(s)", id, attempt);
                    return ItemOutcome::Ready(ItemResult::from_payload(id, payload, attempt));
                }
                (Decision::Fail(reason), outcome) => {
                    // a terminal status is an answer, even on the last attempt
                    if RetryPolicy::is_terminal(&outcome) {
                        warn!("Lookup for {} failed permanently: {}", id, reason);
                    } else {
                        error!("Giving up on {} after {} attempts: {:?}", id, attempt, outcome);
                    }
                    return ItemOutcome::Failed(reason);
                }
                (_, outcome) => {
                    let delay = interval.next_backoff().unwrap_or(self.policy.delay);
                    match outcome {
                        AttemptOutcome::Failure(TransportFailure::Processing) => {
                            debug!("{} still processing, polling again in {:?}", id, delay);
                        }
                        other => {
                            warn!("Attempt {} failed for {}, retrying in {:?}: {:?}", attempt, id, delay, other);
                        }
                    }
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}
