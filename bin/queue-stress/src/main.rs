use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use async_trait::async_trait;
use clap::Parser;
use shopq_core::{
    DataProvider, Payload, ProviderError, QueueConfig, RequestKind, ShopQueue, Subject,
};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

/// Drive the shop queue with concurrent callers.
#[derive(Debug, Parser)]
#[command(name = "queue-stress")]
struct Args {
    /// Number of concurrent callers.
    #[arg(long, default_value_t = 50)]
    requests: usize,

    /// Delay of each null operation / simulated fetch, in milliseconds.
    #[arg(long, default_value_t = 20)]
    delay_ms: u64,

    /// Make every Nth simulated shop fetch fail (0 = never).
    #[arg(long, default_value_t = 0)]
    fail_every: usize,

    /// Send simulated shop fetches instead of null operations.
    #[arg(long)]
    shop: bool,

    /// Bypass the queue and serve every request inline.
    #[arg(long)]
    disable_queue: bool,
}

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();
}

/// Stands in for the game service: sleeps, then returns a fake offer list.
#[derive(Debug)]
struct SimulatedProvider {
    latency: Duration,
    fail_every: usize,
}

impl SimulatedProvider {
    async fn respond(&self, kind: RequestKind, subject: &Subject) -> Result<String, ProviderError> {
        tokio::time::sleep(self.latency).await;

        let index = subject
            .as_str()
            .rsplit('-')
            .next()
            .and_then(|n| n.parse::<usize>().ok())
            .unwrap_or(0);
        if self.fail_every > 0 && (index + 1) % self.fail_every == 0 {
            return Err(ProviderError::RateLimited {
                retry_after_secs: Some(1),
            });
        }

        Ok(format!("{kind} offers for {subject}"))
    }
}

#[async_trait]
impl DataProvider for SimulatedProvider {
    type Record = String;

    async fn fetch_offers(&self, subject: &Subject) -> Result<String, ProviderError> {
        self.respond(RequestKind::Shop, subject).await
    }

    async fn fetch_collection(&self, subject: &Subject) -> Result<String, ProviderError> {
        self.respond(RequestKind::Collection, subject).await
    }

    async fn fetch_night_market(&self, subject: &Subject) -> Result<String, ProviderError> {
        self.respond(RequestKind::NightMarket, subject).await
    }

    async fn fetch_bundles(&self, subject: &Subject) -> Result<String, ProviderError> {
        self.respond(RequestKind::Bundles, subject).await
    }

    async fn shop_cached(&self, _subject: &Subject, _bundles: bool) -> bool {
        false
    }

    async fn collection_cached(&self, _subject: &Subject) -> bool {
        false
    }
}

#[tokio::main]
async fn main() {
    init_tracing();
    let args = Args::parse();

    let mut config = QueueConfig::from_env();
    if args.disable_queue {
        config.enabled = false;
    }

    info!(
        requests = args.requests,
        delay_ms = args.delay_ms,
        enabled = config.enabled,
        "starting shop queue stress run"
    );

    let delay = Duration::from_millis(args.delay_ms);
    let provider = SimulatedProvider {
        latency: delay,
        fail_every: args.fail_every,
    };
    let queue = Arc::new(ShopQueue::new(provider, config));

    let (kind, payload) = if args.shop {
        (RequestKind::Shop, Payload::None)
    } else {
        (RequestKind::Null, Payload::Delay(delay))
    };

    let started = Instant::now();
    let callers: Vec<_> = (0..args.requests)
        .map(|i| {
            let queue = Arc::clone(&queue);
            tokio::spawn(async move { queue.fetch(kind, format!("user-{i}"), payload).await })
        })
        .collect();

    let (mut succeeded, mut failed) = (0usize, 0usize);
    for caller in callers {
        match caller.await {
            Ok(Ok(outcome)) if outcome.is_success() => succeeded += 1,
            Ok(Ok(outcome)) => {
                failed += 1;
                if let Some(err) = outcome.error() {
                    warn!(error = %err, "request failed");
                }
            }
            Ok(Err(err)) => {
                failed += 1;
                warn!(error = %err, "caller gave up");
            }
            Err(err) => {
                failed += 1;
                warn!(error = %err, "caller task aborted");
            }
        }
    }

    info!(
        succeeded,
        failed,
        elapsed_ms = started.elapsed().as_millis(),
        "stress run finished"
    );

    queue.shutdown().await;
}
