//! Typed topic writers.

use std::marker::PhantomData;
use std::sync::Arc;

use genesis_types::TopicQos;
use serde::Serialize;

use crate::bus::TopicState;
use crate::error::TransportError;
use crate::sample::{InstanceState, RawSample};

/// Publishes typed samples onto one topic.
pub struct Writer<T> {
    topic_name: String,
    state: Arc<TopicState>,
    _marker: PhantomData<fn(T)>,
}

impl<T> Writer<T>
where
    T: Serialize,
{
    pub(crate) fn new(topic_name: String, state: Arc<TopicState>) -> Self {
        Self {
            topic_name,
            state,
            _marker: PhantomData,
        }
    }

    pub fn qos(&self) -> &TopicQos {
        &self.state.qos
    }

    /// Publishes one sample, optionally keyed for per-instance durability.
    pub fn publish(&self, key: Option<&str>, sample: &T) -> Result<(), TransportError> {
        let payload = serde_json::to_value(sample).map_err(TransportError::Encode)?;
        let raw = RawSample {
            key: key.map(str::to_string),
            instance_state: InstanceState::Alive,
            payload: Some(payload),
        };
        self.store_and_send(raw)
    }

    /// Disposes the instance identified by `key` (graceful shutdown / explicit removal).
    pub fn dispose(&self, key: Option<&str>) -> Result<(), TransportError> {
        self.notify_removed(key, InstanceState::NotAliveDisposed)
    }

    /// Marks the instance identified by `key` as having no writers (simulated
    /// writer crash).
    pub fn mark_no_writers(&self, key: Option<&str>) -> Result<(), TransportError> {
        self.notify_removed(key, InstanceState::NotAliveNoWriters)
    }

    fn notify_removed(&self, key: Option<&str>, state: InstanceState) -> Result<(), TransportError> {
        let raw = RawSample {
            key: key.map(str::to_string),
            instance_state: state,
            payload: None,
        };
        self.store_and_send(raw)
    }

    fn store_and_send(&self, raw: RawSample) -> Result<(), TransportError> {
        use genesis_types::Durability;
        if self.state.qos.durability == Durability::TransientLocal {
            let cache_key = raw.key.clone().unwrap_or_default();
            self.state.durable_cache.insert(cache_key, raw.clone());
        }
        // No matched readers is not an error: publication succeeds regardless
        // of subscriber count, matching pub/sub semantics.
        let _ = self.state.tx.send(raw);
        tracing::debug!(topic = %self.topic_name, "published sample");
        Ok(())
    }
}
