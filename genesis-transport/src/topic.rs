//! Declared-topic handle returned by `Participant::declare_topic`.

use std::sync::Arc;

use genesis_types::{Durability, TopicQos};
use tokio::sync::broadcast;

use crate::bus::TopicState;
use crate::sample::RawSample;

/// A topic declared with a specific type and QoS.
#[derive(Clone)]
pub struct Topic {
    pub(crate) name: String,
    pub(crate) state: Arc<TopicState>,
}

impl Topic {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn qos(&self) -> &TopicQos {
        &self.state.qos
    }

    /// Type-erased subscription used by [`crate::socket`] to mirror a topic
    /// across a process boundary without knowing its sample type.
    pub(crate) fn raw_subscribe(&self) -> broadcast::Receiver<RawSample> {
        self.state.tx.subscribe()
    }

    /// Type-erased publish, used by [`crate::socket`] to re-inject samples
    /// received from a remote peer.
    pub(crate) fn raw_publish(&self, raw: RawSample) {
        if self.state.qos.durability == Durability::TransientLocal {
            let cache_key = raw.key.clone().unwrap_or_default();
            self.state.durable_cache.insert(cache_key, raw.clone());
        }
        let _ = self.state.tx.send(raw);
    }

    /// Claims `id` for exclusive handling, returning `true` only to the
    /// first caller. Every broadcast subscriber on a topic observes the same
    /// sample, so a request sent with an empty `target_endpoint_id` still
    /// reaches every matching `RpcServer`; this lets exactly one of them act
    /// on a given `correlation_id`.
    pub fn claim_once(&self, id: &str) -> bool {
        self.state.claims.insert(id.to_string(), ()).is_none()
    }
}
