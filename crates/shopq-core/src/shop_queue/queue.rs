use std::{
    sync::{
        Arc, Mutex, MutexGuard,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use tokio::{sync::Notify, task::JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::{
    DataProvider, FetchOutcome, Payload, QueueConfig, RequestKind, Subject, Token,
    provider::{dispatch, is_cached},
    shop_queue::{
        errors::QueueError,
        messages::{Enqueued, QueueStatus},
        state::QueueState,
        worker::worker_loop,
    },
};

/// State shared between the queue handle and its worker task.
pub(crate) struct Shared<P: DataProvider> {
    pub(crate) provider: Arc<P>,
    pub(crate) config: QueueConfig,
    pub(crate) state: Mutex<QueueState<P::Record>>,
    pub(crate) in_flight: AtomicUsize,
    pub(crate) notify: Notify,
    pub(crate) shutdown: CancellationToken,
}

impl<P: DataProvider> Shared<P> {
    pub(crate) fn state(&self) -> MutexGuard<'_, QueueState<P::Record>> {
        // never held across an await; a poisoned guard is still consistent
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn swept_state(&self) -> MutexGuard<'_, QueueState<P::Record>> {
        let mut state = self.state();
        if let Some(ttl) = self.config.result_ttl() {
            state.sweep_closed(ttl);
        }
        state
    }
}

pub struct ShopQueue<P: DataProvider> {
    shared: Arc<Shared<P>>,
    worker: tokio::sync::Mutex<Option<JoinHandle<()>>>,
}

impl<P: DataProvider> std::fmt::Debug for ShopQueue<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopQueue")
            .field("config", &self.shared.config)
            .field("pending", &self.pending_len())
            .field("in_flight", &self.in_flight())
            .finish()
    }
}

impl<P: DataProvider> Drop for ShopQueue<P> {
    fn drop(&mut self) {
        self.shared.shutdown.cancel();
    }
}

impl<P: DataProvider> ShopQueue<P> {
    /// Create the queue and spawn its worker. Must be called from within a
    /// Tokio runtime.
    pub fn new(provider: P, config: QueueConfig) -> Self {
        Self::with_shared_provider(Arc::new(provider), config)
    }

    pub fn with_shared_provider(provider: Arc<P>, config: QueueConfig) -> Self {
        info!(
            enabled = config.enabled,
            poll_interval_ms = config.poll_interval_ms,
            "initializing shop queue"
        );

        let shared = Arc::new(Shared {
            provider,
            config,
            state: Mutex::new(QueueState::default()),
            in_flight: AtomicUsize::new(0),
            notify: Notify::new(),
            shutdown: CancellationToken::new(),
        });

        let worker = tokio::spawn(worker_loop(Arc::clone(&shared)));

        Self {
            shared,
            worker: tokio::sync::Mutex::new(Some(worker)),
        }
    }

    pub fn config(&self) -> &QueueConfig {
        &self.shared.config
    }

    pub fn provider(&self) -> &Arc<P> {
        &self.shared.provider
    }

    /// Queue a request, or serve it inline when the queue is disabled or
    /// the provider already has a fresh cached record.
    ///
    /// Queued requests return immediately; the worker picks them up in
    /// enqueue order.
    pub async fn enqueue(
        &self,
        kind: RequestKind,
        subject: Subject,
        payload: Payload,
    ) -> Result<Enqueued<P::Record>, QueueError> {
        let provider = &*self.shared.provider;

        if !self.shared.config.enabled || is_cached(provider, kind, &subject).await {
            debug!(%kind, %subject, "serving request without queuing");
            let outcome = dispatch(provider, kind, &subject, payload).await;
            return Ok(Enqueued::Ready(outcome));
        }

        let token = {
            let mut state = self.shared.state();
            if state.is_closed() {
                return Err(QueueError::Closed);
            }
            state.push(kind, subject.clone(), payload)
        };
        info!(%kind, %subject, %token, "added fetch to shop queue");

        self.shared.notify.notify_one();
        Ok(Enqueued::Queued(token))
    }

    pub async fn queue_item_shop(
        &self,
        subject: impl Into<Subject>,
    ) -> Result<Enqueued<P::Record>, QueueError> {
        self.enqueue(RequestKind::Shop, subject.into(), Payload::None)
            .await
    }

    pub async fn queue_collection(
        &self,
        subject: impl Into<Subject>,
    ) -> Result<Enqueued<P::Record>, QueueError> {
        self.enqueue(RequestKind::Collection, subject.into(), Payload::None)
            .await
    }

    pub async fn queue_night_market(
        &self,
        subject: impl Into<Subject>,
    ) -> Result<Enqueued<P::Record>, QueueError> {
        self.enqueue(RequestKind::NightMarket, subject.into(), Payload::None)
            .await
    }

    pub async fn queue_bundles(
        &self,
        subject: impl Into<Subject>,
    ) -> Result<Enqueued<P::Record>, QueueError> {
        self.enqueue(RequestKind::Bundles, subject.into(), Payload::None)
            .await
    }

    /// Queue a no-op that only waits `delay`. Used to load-test the queue.
    pub async fn queue_null(
        &self,
        subject: impl Into<Subject>,
        delay: Duration,
    ) -> Result<Enqueued<P::Record>, QueueError> {
        self.enqueue(RequestKind::Null, subject.into(), Payload::Delay(delay))
            .await
    }

    /// Check on a queued request without waiting.
    ///
    /// A `Processed` answer is handed out once; asking again for the same
    /// token reports `Waiting { remaining: 0 }`.
    pub fn status(&self, token: Token) -> QueueStatus<P::Record> {
        self.shared.swept_state().take_status(token)
    }

    /// Poll [`status`](Self::status) every `poll_interval` until the request
    /// is processed.
    pub async fn wait_for(&self, token: Token) -> Result<FetchOutcome<P::Record>, QueueError> {
        let poll = async {
            loop {
                match self.status(token) {
                    QueueStatus::Processed(outcome) => return outcome,
                    QueueStatus::Waiting { .. } => {
                        tokio::time::sleep(self.shared.config.poll_interval()).await;
                    }
                }
            }
        };

        match self.shared.config.wait_timeout() {
            Some(limit) => tokio::time::timeout(limit, poll)
                .await
                .map_err(|_| QueueError::TimedOut { token }),
            None => Ok(poll.await),
        }
    }

    /// Enqueue and wait for the result.
    pub async fn fetch(
        &self,
        kind: RequestKind,
        subject: impl Into<Subject>,
        payload: Payload,
    ) -> Result<FetchOutcome<P::Record>, QueueError> {
        match self.enqueue(kind, subject.into(), payload).await? {
            Enqueued::Ready(outcome) => Ok(outcome),
            Enqueued::Queued(token) => self.wait_for(token).await,
        }
    }

    pub fn pending_len(&self) -> usize {
        self.shared.state().pending_len()
    }

    /// Results finished but not yet collected.
    pub fn stored_results(&self) -> usize {
        self.shared.swept_state().stored_results()
    }

    /// Number of requests the worker is running right now (0 or 1).
    pub fn in_flight(&self) -> usize {
        self.shared.in_flight.load(Ordering::SeqCst)
    }

    /// Stop the worker once its current request finishes. Requests still
    /// pending are failed with [`ProviderError::Shutdown`].
    ///
    /// [`ProviderError::Shutdown`]: crate::ProviderError::Shutdown
    pub async fn shutdown(&self) {
        info!("shop queue shutdown initiated");

        self.shared.shutdown.cancel();

        if let Some(handle) = self.worker.lock().await.take() {
            if let Err(err) = handle.await {
                error!(error = %err, "shop queue worker ended abnormally");
            }
        }

        info!("shop queue shutdown complete");
    }
}
