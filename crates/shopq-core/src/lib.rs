//! Scheduling and deduplication for per-account storefront fetches.
//!
//! Requests for the item shop, collection, night market and bundles are
//! served from the provider's cache when possible, and otherwise run one at
//! a time through a [`ShopQueue`] so the upstream service's rate limits are
//! respected. Callers poll for their result by [`Token`].

pub mod config;
pub mod ids;
pub mod outcome;
pub mod provider;
pub mod request;
pub mod shop_queue;

pub use config::QueueConfig;
pub use ids::{Subject, Token};
pub use outcome::{FetchOutcome, ProviderError};
pub use provider::DataProvider;
pub use request::{CacheGate, Payload, QueueItem, RequestKind};
pub use shop_queue::{Enqueued, QueueError, QueueStatus, ShopQueue};
