//! Per-domain in-process bus: topic registry, fan-out, and durability cache.
//!
//! One shared state struct per domain, with N named topics each getting
//! their own subscriber fan-out via `tokio::sync::broadcast`
//! and a `dashmap`-backed last-sample cache for `TransientLocal` durability.

use std::sync::Arc;

use dashmap::DashMap;
use genesis_types::TopicQos;
use once_cell::sync::Lazy;
use tokio::sync::broadcast;

use crate::error::TransportError;
use crate::sample::RawSample;

const CHANNEL_CAPACITY: usize = 1024;

pub(crate) struct TopicState {
    pub(crate) qos: TopicQos,
    pub(crate) tx: broadcast::Sender<RawSample>,
    pub(crate) durable_cache: DashMap<String, RawSample>,
    /// Claim set for competing-consumer dispatch on broadcast RPC requests
    ///: every subscriber sees
    /// a broadcast sample, but only the first to claim a given key acts on it.
    pub(crate) claims: DashMap<String, ()>,
}

pub(crate) struct DomainBus {
    pub(crate) domain_id: u32,
    topics: DashMap<String, Arc<TopicState>>,
}

impl DomainBus {
    fn new(domain_id: u32) -> Self {
        Self {
            domain_id,
            topics: DashMap::new(),
        }
    }

    pub(crate) fn declare_topic(
        &self,
        name: &str,
        qos: TopicQos,
    ) -> Result<Arc<TopicState>, TransportError> {
        if let Some(existing) = self.topics.get(name) {
            if existing.qos != qos {
                return Err(TransportError::TopicMismatch {
                    topic: name.to_string(),
                });
            }
            return Ok(existing.clone());
        }
        let (tx, _rx) = broadcast::channel(CHANNEL_CAPACITY);
        let state = Arc::new(TopicState {
            qos,
            tx,
            durable_cache: DashMap::new(),
            claims: DashMap::new(),
        });
        self.topics.insert(name.to_string(), state.clone());
        Ok(state)
    }
}

static DOMAINS: Lazy<DashMap<u32, Arc<DomainBus>>> = Lazy::new(DashMap::new);

pub(crate) fn domain_bus(domain_id: u32) -> Arc<DomainBus> {
    DOMAINS
        .entry(domain_id)
        .or_insert_with(|| Arc::new(DomainBus::new(domain_id)))
        .clone()
}
