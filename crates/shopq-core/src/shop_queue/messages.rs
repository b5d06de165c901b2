use crate::{FetchOutcome, Token};

/// What an enqueue call produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Enqueued<R> {
    /// Cache miss: the request is waiting for the worker.
    Queued(Token),
    /// Served inline (cache hit or queue disabled).
    Ready(FetchOutcome<R>),
}

impl<R> Enqueued<R> {
    pub fn is_queued(&self) -> bool {
        matches!(self, Enqueued::Queued(_))
    }

    pub fn token(&self) -> Option<Token> {
        match self {
            Enqueued::Queued(token) => Some(*token),
            Enqueued::Ready(_) => None,
        }
    }
}

/// Snapshot answer to "is my request done yet".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueStatus<R> {
    /// Still pending or running. `remaining` is a rough position; it is 0
    /// while the worker runs the request, and also for unknown tokens.
    Waiting { remaining: u64 },
    /// Finished. The result has been removed from the queue.
    Processed(FetchOutcome<R>),
}

impl<R> QueueStatus<R> {
    pub fn is_processed(&self) -> bool {
        matches!(self, QueueStatus::Processed(_))
    }
}
