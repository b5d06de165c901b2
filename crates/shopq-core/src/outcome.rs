use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure reported for a single fetch.
///
/// Provider implementations return these; the queue adds `Panicked` and
/// `Shutdown` for failures that happen around the provider call.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum ProviderError {
    #[error("upstream rejected the account credentials")]
    Unauthenticated,

    #[error("upstream rate limit hit")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("upstream request failed: {0}")]
    Upstream(String),

    #[error("provider task aborted: {0}")]
    Panicked(String),

    #[error("shop queue shut down before the request ran")]
    Shutdown,
}

/// Result of one request, delivered exactly once.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum FetchOutcome<R> {
    Success(R),
    /// Success marker for requests that produce no record.
    Acknowledged,
    Failure(ProviderError),
}

impl<R> FetchOutcome<R> {
    pub fn is_success(&self) -> bool {
        !matches!(self, FetchOutcome::Failure(_))
    }

    pub fn error(&self) -> Option<&ProviderError> {
        match self {
            FetchOutcome::Failure(err) => Some(err),
            _ => None,
        }
    }

    pub fn into_record(self) -> Option<R> {
        match self {
            FetchOutcome::Success(record) => Some(record),
            _ => None,
        }
    }
}

impl<R> From<Result<R, ProviderError>> for FetchOutcome<R> {
    fn from(result: Result<R, ProviderError>) -> Self {
        match result {
            Ok(record) => FetchOutcome::Success(record),
            Err(err) => FetchOutcome::Failure(err),
        }
    }
}
