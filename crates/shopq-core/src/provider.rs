//! Upstream data provider contract.
//!
//! The queue never talks to the game service directly. Everything goes
//! through a [`DataProvider`], which also owns the record cache the queue
//! consults before deciding to queue a request.

use async_trait::async_trait;
use tracing::debug;

use crate::{CacheGate, FetchOutcome, Payload, ProviderError, RequestKind, Subject};

#[async_trait]
pub trait DataProvider: Send + Sync + 'static {
    /// Record handed back to callers on success.
    type Record: Send + 'static;

    async fn fetch_offers(&self, subject: &Subject) -> Result<Self::Record, ProviderError>;

    async fn fetch_collection(&self, subject: &Subject) -> Result<Self::Record, ProviderError>;

    async fn fetch_night_market(&self, subject: &Subject) -> Result<Self::Record, ProviderError>;

    async fn fetch_bundles(&self, subject: &Subject) -> Result<Self::Record, ProviderError>;

    /// Whether a fresh shop (or bundles) record is already cached.
    async fn shop_cached(&self, subject: &Subject, bundles: bool) -> bool;

    /// Whether a fresh collection record is already cached.
    async fn collection_cached(&self, subject: &Subject) -> bool;
}

/// Ask the provider's cache whether `kind` can be served without queuing.
pub async fn is_cached<P>(provider: &P, kind: RequestKind, subject: &Subject) -> bool
where
    P: DataProvider + ?Sized,
{
    match kind.cache_gate() {
        Some(CacheGate::Offers { bundles }) => provider.shop_cached(subject, bundles).await,
        Some(CacheGate::Collection) => provider.collection_cached(subject).await,
        None => false,
    }
}

/// Run one request against the provider.
///
/// Errors are returned as [`FetchOutcome::Failure`], never propagated.
pub async fn dispatch<P>(
    provider: &P,
    kind: RequestKind,
    subject: &Subject,
    payload: Payload,
) -> FetchOutcome<P::Record>
where
    P: DataProvider + ?Sized,
{
    let fetched = match kind {
        RequestKind::Shop => provider.fetch_offers(subject).await,
        RequestKind::Collection => provider.fetch_collection(subject).await,
        RequestKind::NightMarket => provider.fetch_night_market(subject).await,
        RequestKind::Bundles => provider.fetch_bundles(subject).await,
        RequestKind::Null => {
            let delay = payload.delay();
            debug!(%subject, delay_ms = delay.as_millis(), "running null operation");
            tokio::time::sleep(delay).await;
            return FetchOutcome::Acknowledged;
        }
    };

    fetched.into()
}
