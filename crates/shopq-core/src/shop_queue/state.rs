use std::{
    collections::{HashMap, VecDeque},
    time::Duration,
};

use tokio::time::Instant;

use crate::{
    FetchOutcome, Payload, ProviderError, QueueItem, RequestKind, Subject, Token,
    shop_queue::messages::QueueStatus,
};

/// Pending queue and result store. Only touched under the queue's mutex.
#[derive(Debug)]
pub(crate) struct QueueState<R> {
    pending: VecDeque<QueueItem>,
    results: HashMap<Token, FetchOutcome<R>>,
    next_token: u64,
    closed_at: Option<Instant>,
}

impl<R> Default for QueueState<R> {
    fn default() -> Self {
        Self {
            pending: VecDeque::new(),
            results: HashMap::new(),
            next_token: 0,
            closed_at: None,
        }
    }
}

impl<R> QueueState<R> {
    pub(crate) fn push(&mut self, kind: RequestKind, subject: Subject, payload: Payload) -> Token {
        let token = Token::new(self.next_token);
        self.next_token += 1;

        self.pending.push_back(QueueItem {
            token,
            kind,
            subject,
            payload,
        });

        token
    }

    pub(crate) fn claim(&mut self) -> Option<QueueItem> {
        self.pending.pop_front()
    }

    pub(crate) fn complete(&mut self, token: Token, outcome: FetchOutcome<R>) {
        self.results.insert(token, outcome);
    }

    /// Drop an unclaimed result. Returns whether one was still stored.
    pub(crate) fn evict(&mut self, token: Token) -> bool {
        self.results.remove(&token).is_some()
    }

    /// Report on `token`, consuming its result if it is ready.
    pub(crate) fn take_status(&mut self, token: Token) -> QueueStatus<R> {
        if let Some(head) = self.pending.front() {
            if self.pending.iter().any(|item| item.token == token) {
                return QueueStatus::Waiting {
                    remaining: token.value() - head.token.value(),
                };
            }
        }

        match self.results.remove(&token) {
            Some(outcome) => QueueStatus::Processed(outcome),
            // claimed by the worker, or never issued
            None => QueueStatus::Waiting { remaining: 0 },
        }
    }

    /// Refuse further pushes and fail every pending item so waiting
    /// callers get an answer.
    pub(crate) fn close(&mut self) -> usize {
        self.closed_at.get_or_insert_with(Instant::now);
        let abandoned = self.pending.len();
        for item in self.pending.drain(..) {
            self.results
                .insert(item.token, FetchOutcome::Failure(ProviderError::Shutdown));
        }
        abandoned
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed_at.is_some()
    }

    /// Once closed there is no worker left to expire results; drop whatever
    /// is still uncollected `ttl` after closing.
    pub(crate) fn sweep_closed(&mut self, ttl: Duration) {
        let Some(closed_at) = self.closed_at else {
            return;
        };
        if !self.results.is_empty() && closed_at.elapsed() >= ttl {
            self.results.clear();
        }
    }

    pub(crate) fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub(crate) fn stored_results(&self) -> usize {
        self.results.len()
    }
}
