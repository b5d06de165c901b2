use std::sync::{Arc, atomic::Ordering};

use futures_util::{FutureExt, StreamExt};
use tokio_util::time::DelayQueue;
use tracing::{debug, error, info, warn};

use crate::{
    DataProvider, FetchOutcome, ProviderError, QueueItem, Token, provider::dispatch,
    shop_queue::queue::Shared,
};

/// Drain the queue one request at a time until shutdown.
///
/// Sleeps on the enqueue notification when the queue is empty and evicts
/// results nobody collected within the configured TTL.
pub(crate) async fn worker_loop<P: DataProvider>(shared: Arc<Shared<P>>) {
    // closes the queue however the loop ends, panics included
    let _close = CloseOnExit(&shared);
    let mut expiry = DelayQueue::<Token>::new();

    info!("shop queue worker started");

    loop {
        evict_ready(&shared, &mut expiry);

        if shared.shutdown.is_cancelled() {
            break;
        }

        let next = shared.state().claim();
        if let Some(item) = next {
            let token = item.token;
            process(&shared, item).await;

            if let Some(ttl) = shared.config.result_ttl() {
                expiry.insert(token, ttl);
            }
            continue;
        }

        tokio::select! {
            biased;

            _ = shared.shutdown.cancelled() => break,

            _ = shared.notify.notified() => {}

            Some(expired) = expiry.next() => {
                evict(&shared, expired.into_inner());
            }
        }
    }
}

struct CloseOnExit<'a, P: DataProvider>(&'a Shared<P>);

impl<P: DataProvider> Drop for CloseOnExit<'_, P> {
    fn drop(&mut self) {
        let abandoned = self.0.state().close();
        if abandoned > 0 {
            warn!(abandoned, "shop queue stopped with pending requests");
        }

        if std::thread::panicking() {
            error!("shop queue worker panicked");
        } else {
            info!("shop queue worker exited");
        }
    }
}

async fn process<P: DataProvider>(shared: &Shared<P>, item: QueueItem) {
    let QueueItem {
        token,
        kind,
        subject,
        payload,
    } = item;

    info!(%kind, %subject, %token, "processing shop queue item");
    shared.in_flight.fetch_add(1, Ordering::SeqCst);

    // own task, so a panicking provider fails this item only
    let provider = Arc::clone(&shared.provider);
    let fetch_subject = subject.clone();
    let fetch =
        tokio::spawn(async move { dispatch(&*provider, kind, &fetch_subject, payload).await });

    let outcome = match fetch.await {
        Ok(outcome) => outcome,
        Err(join_err) => FetchOutcome::Failure(ProviderError::Panicked(join_err.to_string())),
    };

    if let Some(err) = outcome.error() {
        error!(%kind, %subject, %token, error = %err, "error processing shop queue item");
    }

    shared.state().complete(token, outcome);
    shared.in_flight.fetch_sub(1, Ordering::SeqCst);

    info!(%kind, %subject, %token, "finished processing shop queue item");
}

fn evict_ready<P: DataProvider>(shared: &Shared<P>, expiry: &mut DelayQueue<Token>) {
    while let Some(Some(expired)) = expiry.next().now_or_never() {
        evict(shared, expired.into_inner());
    }
}

fn evict<P: DataProvider>(shared: &Shared<P>, token: Token) {
    if shared.state().evict(token) {
        debug!(%token, "dropped uncollected shop queue result");
    }
}
