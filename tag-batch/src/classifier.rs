use crate::types::{FailureReason, TransportFailure};

/// Statuses that end a lookup the first time they are seen.
pub fn is_terminal_status(code: u16) -> bool {
    matches!(code, 404 | 419 | 503)
}

/// Maps a failed attempt to the reason surfaced for that item.
///
/// 202 only reaches here once the attempt cap is spent, and then reads as an
/// unknown failure with the generic message.
pub fn classify(failure: &TransportFailure) -> FailureReason {
    match failure {
        TransportFailure::Status { code: 404, .. } => FailureReason::NotFound,
        TransportFailure::Status { code: 419, .. } => FailureReason::RateLimited,
        TransportFailure::Status { code: 503, .. } => FailureReason::Maintenance,
        TransportFailure::Status { message, .. } | TransportFailure::Malformed { message } => {
            FailureReason::unknown(message.as_deref())
        }
        TransportFailure::Network { .. } | TransportFailure::Processing => FailureReason::unknown(None),
    }
}
