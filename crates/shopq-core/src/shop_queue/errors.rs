use crate::Token;

#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error("shop queue is closed")]
    Closed,

    #[error("gave up waiting for queued request {token}")]
    TimedOut { token: Token },
}
