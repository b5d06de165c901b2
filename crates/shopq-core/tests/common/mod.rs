#![allow(dead_code)]

use std::{
    collections::HashSet,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use shopq_core::{DataProvider, ProviderError, RequestKind, Subject};

/// In-memory provider: every fetch sleeps `latency` and returns
/// `"<kind>:<subject>"`, unless the subject is scripted to fail or panic.
#[derive(Debug, Default)]
pub struct ScriptedProvider {
    pub latency: Duration,
    cached: Mutex<HashSet<(Subject, RequestKind)>>,
    failing: Mutex<HashSet<Subject>>,
    panicking: Mutex<HashSet<Subject>>,
    calls: Mutex<Vec<(RequestKind, Subject)>>,
    active: AtomicUsize,
    max_active: AtomicUsize,
}

impl ScriptedProvider {
    pub fn new(latency: Duration) -> Arc<Self> {
        Arc::new(Self {
            latency,
            ..Self::default()
        })
    }

    pub fn cache(&self, subject: &str, kind: RequestKind) {
        self.cached
            .lock()
            .unwrap()
            .insert((Subject::from(subject), kind));
    }

    pub fn fail_for(&self, subject: &str) {
        self.failing.lock().unwrap().insert(Subject::from(subject));
    }

    pub fn panic_for(&self, subject: &str) {
        self.panicking.lock().unwrap().insert(Subject::from(subject));
    }

    pub fn calls(&self) -> Vec<(RequestKind, Subject)> {
        self.calls.lock().unwrap().clone()
    }

    /// Highest number of fetches that were ever running at once.
    pub fn max_concurrent(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }

    async fn fetch(&self, kind: RequestKind, subject: &Subject) -> Result<String, ProviderError> {
        self.calls.lock().unwrap().push((kind, subject.clone()));
        let active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(active, Ordering::SeqCst);

        tokio::time::sleep(self.latency).await;
        self.active.fetch_sub(1, Ordering::SeqCst);

        if self.panicking.lock().unwrap().contains(subject) {
            panic!("provider blew up for {subject}");
        }
        if self.failing.lock().unwrap().contains(subject) {
            return Err(ProviderError::Upstream(format!("no storefront for {subject}")));
        }

        Ok(format!("{kind}:{subject}"))
    }

    fn is_cached(&self, subject: &Subject, kind: RequestKind) -> bool {
        self.cached
            .lock()
            .unwrap()
            .contains(&(subject.clone(), kind))
    }
}

#[async_trait]
impl DataProvider for ScriptedProvider {
    type Record = String;

    async fn fetch_offers(&self, subject: &Subject) -> Result<String, ProviderError> {
        self.fetch(RequestKind::Shop, subject).await
    }

    async fn fetch_collection(&self, subject: &Subject) -> Result<String, ProviderError> {
        self.fetch(RequestKind::Collection, subject).await
    }

    async fn fetch_night_market(&self, subject: &Subject) -> Result<String, ProviderError> {
        self.fetch(RequestKind::NightMarket, subject).await
    }

    async fn fetch_bundles(&self, subject: &Subject) -> Result<String, ProviderError> {
        self.fetch(RequestKind::Bundles, subject).await
    }

    async fn shop_cached(&self, subject: &Subject, bundles: bool) -> bool {
        if bundles {
            self.is_cached(subject, RequestKind::Bundles)
        } else {
            self.is_cached(subject, RequestKind::Shop)
                || self.is_cached(subject, RequestKind::NightMarket)
        }
    }

    async fn collection_cached(&self, subject: &Subject) -> bool {
        self.is_cached(subject, RequestKind::Collection)
    }
}
