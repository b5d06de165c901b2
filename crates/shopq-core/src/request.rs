use std::fmt::Display;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Subject, Token};

/// Upstream operations the shop queue can carry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum RequestKind {
    #[serde(rename = "sh")]
    Shop,
    #[serde(rename = "cl")]
    Collection,
    #[serde(rename = "nm")]
    NightMarket,
    #[serde(rename = "bu")]
    Bundles,
    /// Load-testing kind: no upstream call, just an artificial delay.
    #[serde(rename = "00")]
    Null,
}

/// Which cache freshness check guards a kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheGate {
    Offers { bundles: bool },
    Collection,
}

impl Display for RequestKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl RequestKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestKind::Shop => "sh",
            RequestKind::Collection => "cl",
            RequestKind::NightMarket => "nm",
            RequestKind::Bundles => "bu",
            RequestKind::Null => "00",
        }
    }

    pub fn cache_gate(&self) -> Option<CacheGate> {
        match self {
            RequestKind::Shop | RequestKind::NightMarket => {
                Some(CacheGate::Offers { bundles: false })
            }
            RequestKind::Bundles => Some(CacheGate::Offers { bundles: true }),
            RequestKind::Collection => Some(CacheGate::Collection),
            RequestKind::Null => None,
        }
    }
}

/// Kind-specific data carried alongside a request.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum Payload {
    #[default]
    None,
    Delay(Duration),
}

impl Payload {
    pub fn delay(&self) -> Duration {
        match self {
            Payload::None => Duration::ZERO,
            Payload::Delay(delay) => *delay,
        }
    }
}

/// A request waiting for the worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueItem {
    pub token: Token,
    pub kind: RequestKind,
    pub subject: Subject,
    pub payload: Payload,
}
