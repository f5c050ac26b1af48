//! Typed topic readers, including server-side content filtering.

use std::collections::VecDeque;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::broadcast;

use crate::bus::TopicState;
use crate::error::TransportError;
use crate::sample::{RawSample, Sample};

type Predicate = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// Subscribes to typed samples on one topic. `TransientLocal` topics replay
/// the last sample per key before delivering new publications.
pub struct Reader<T> {
    rx: broadcast::Receiver<RawSample>,
    predicate: Option<Predicate>,
    pending: VecDeque<RawSample>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Reader<T>
where
    T: DeserializeOwned,
{
    pub(crate) fn new(state: &Arc<TopicState>, predicate: Option<Predicate>) -> Self {
        let rx = state.tx.subscribe();
        let pending: VecDeque<RawSample> = state
            .durable_cache
            .iter()
            .map(|e| e.value().clone())
            .filter(|raw| predicate.as_ref().map_or(true, |p| matches_predicate(p, raw)))
            .collect();
        Self {
            rx,
            predicate,
            pending,
            _marker: PhantomData,
        }
    }

    /// Awaits the next sample matching this reader's predicate (if any),
    /// decoding it into `T`. Removal notifications are delivered without
    /// attempting to decode a payload.
    pub async fn recv(&mut self) -> Result<Sample<T>, TransportError> {
        loop {
            if let Some(raw) = self.pending.pop_front() {
                if let Some(sample) = self.decode(raw)? {
                    return Ok(sample);
                }
                continue;
            }
            match self.rx.recv().await {
                Ok(raw) => {
                    if let Some(p) = &self.predicate {
                        if !matches_predicate(p, &raw) {
                            continue;
                        }
                    }
                    if let Some(sample) = self.decode(raw)? {
                        return Ok(sample);
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "reader lagged behind writer, samples dropped");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => {
                    return Err(TransportError::TransportUnavailable(0));
                }
            }
        }
    }

    fn decode(&self, raw: RawSample) -> Result<Option<Sample<T>>, TransportError> {
        use crate::sample::InstanceState;
        match raw.instance_state {
            InstanceState::Alive => {
                let Some(payload) = raw.payload else {
                    return Ok(None);
                };
                let value: T = serde_json::from_value(payload).map_err(TransportError::Decode)?;
                Ok(Some(Sample::Alive { key: raw.key, value }))
            }
            state => Ok(Some(Sample::Removed { key: raw.key, state })),
        }
    }
}

fn matches_predicate(predicate: &Predicate, raw: &RawSample) -> bool {
    match &raw.payload {
        Some(payload) => predicate(payload),
        // Removal notifications always pass through so readers observe departures.
        None => true,
    }
}
