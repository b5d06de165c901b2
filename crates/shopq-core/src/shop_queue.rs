//! Single-worker fetch queue.
//!
//! Cache misses are queued and run one at a time against the provider so
//! upstream rate limits are never exceeded. Callers get a [`Token`] back and
//! collect the result with [`ShopQueue::status`] or [`ShopQueue::wait_for`].
//!
//! [`Token`]: crate::Token

mod errors;
mod messages;
mod queue;
mod state;
mod worker;

pub use errors::QueueError;
pub use messages::{Enqueued, QueueStatus};
pub use queue::ShopQueue;
