//! Capability registry: advertises this participant's own records and
//! maintains an eventually-consistent view of everyone else's.
//!
//! One background task per topic is the single writer into that topic's
//! [`CapabilityCache`]; it owns the `TransientLocal` reader, applies the
//! content-hash dedup, and fans the resulting `Added`/`Updated`/`Removed`
//! event out over a `tokio::sync::broadcast` channel.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use genesis_transport::{Participant, Sample};
use genesis_types::{AgentCapability, CapabilityEvent, FunctionCapability, Presence, TopicQos};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::cache::{content_hash, CapabilityCache, Upsert};
use crate::error::DiscoveryError;

const EVENT_CHANNEL_CAPACITY: usize = 256;

pub const PRESENCE_TOPIC: &str = "genesis/presence";
pub const AGENT_CAPABILITY_TOPIC: &str = "genesis/agent_capability";
pub const FUNCTION_CAPABILITY_TOPIC: &str = "genesis/function_capability";

/// A participant's view onto the shared capability catalog: it can
/// advertise its own agent/function records and observe everyone else's.
pub struct Discovery {
    presence_writer: genesis_transport::Writer<Presence>,
    agent_writer: genesis_transport::Writer<AgentCapability>,
    function_writer: genesis_transport::Writer<FunctionCapability>,
    agent_cache: Arc<CapabilityCache<AgentCapability>>,
    function_cache: Arc<CapabilityCache<FunctionCapability>>,
    agent_events: broadcast::Sender<CapabilityEvent<AgentCapability>>,
    function_events: broadcast::Sender<CapabilityEvent<FunctionCapability>>,
    /// Count of locally rejected malformed payloads, surfaced for
    /// diagnostics.
    pub rejected_count: Arc<AtomicU64>,
    _agent_task: JoinHandle<()>,
    _function_task: JoinHandle<()>,
}

impl Discovery {
    /// Declares the three discovery topics and starts the background
    /// cache-update tasks. Call once per participant.
    pub fn new(participant: &Participant) -> Result<Self, DiscoveryError> {
        let presence_topic = participant.declare_topic(PRESENCE_TOPIC, TopicQos::discovery("agent_id"))?;
        let agent_topic =
            participant.declare_topic(AGENT_CAPABILITY_TOPIC, TopicQos::discovery("agent_id"))?;
        let function_topic = participant
            .declare_topic(FUNCTION_CAPABILITY_TOPIC, TopicQos::discovery("function_id"))?;

        let presence_writer = participant.create_writer(&presence_topic);
        let agent_writer = participant.create_writer(&agent_topic);
        let function_writer = participant.create_writer(&function_topic);

        let agent_cache = Arc::new(CapabilityCache::new());
        let function_cache = Arc::new(CapabilityCache::new());
        let rejected_count = Arc::new(AtomicU64::new(0));

        let (agent_events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let (function_events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        let agent_reader: genesis_transport::Reader<AgentCapability> =
            participant.create_reader(&agent_topic);
        let function_reader: genesis_transport::Reader<FunctionCapability> =
            participant.create_reader(&function_topic);

        let _agent_task = spawn_cache_task(
            agent_reader,
            agent_cache.clone(),
            agent_events.clone(),
            rejected_count.clone(),
            |c: &AgentCapability| c.agent_id.to_string(),
            |_: &AgentCapability| true,
        );
        let _function_task = spawn_cache_task(
            function_reader,
            function_cache.clone(),
            function_events.clone(),
            rejected_count.clone(),
            |c: &FunctionCapability| c.function_id.clone(),
            FunctionCapability::has_plausible_schema,
        );

        Ok(Self {
            presence_writer,
            agent_writer,
            function_writer,
            agent_cache,
            function_cache,
            agent_events,
            function_events,
            rejected_count,
            _agent_task,
            _function_task,
        })
    }

    /// Publishes a presence announcement. Call once at startup.
    pub fn announce_presence(&self, presence: &Presence) -> Result<(), DiscoveryError> {
        self.presence_writer
            .publish(Some(&presence.agent_id.to_string()), presence)
            .map_err(Into::into)
    }

    /// Advertises (or republishes, if any field changed) this agent's
    /// capability record.
    pub fn advertise_agent(&self, capability: &AgentCapability) -> Result<(), DiscoveryError> {
        self.agent_writer
            .publish(Some(&capability.agent_id.to_string()), capability)
            .map_err(Into::into)
    }

    /// Advertises (or republishes) a function capability record.
    pub fn advertise_function(&self, capability: &FunctionCapability) -> Result<(), DiscoveryError> {
        self.function_writer
            .publish(Some(&capability.function_id), capability)
            .map_err(Into::into)
    }

    /// Disposes this agent's capability instance (graceful shutdown).
    pub fn withdraw_agent(&self, agent_id: &genesis_types::ParticipantId) -> Result<(), DiscoveryError> {
        self.agent_writer
            .dispose(Some(&agent_id.to_string()))
            .map_err(Into::into)
    }

    /// Disposes a function capability instance (graceful shutdown).
    pub fn withdraw_function(&self, function_id: &str) -> Result<(), DiscoveryError> {
        self.function_writer.dispose(Some(function_id)).map_err(Into::into)
    }

    /// Current known agent capability set.
    pub fn agents(&self) -> Vec<AgentCapability> {
        self.agent_cache.snapshot()
    }

    /// Current known function capability set.
    pub fn functions(&self) -> Vec<FunctionCapability> {
        self.function_cache.snapshot()
    }

    /// Subscribes to agent capability change events.
    pub fn subscribe_agents(&self) -> broadcast::Receiver<CapabilityEvent<AgentCapability>> {
        self.agent_events.subscribe()
    }

    /// Subscribes to function capability change events.
    pub fn subscribe_functions(&self) -> broadcast::Receiver<CapabilityEvent<FunctionCapability>> {
        self.function_events.subscribe()
    }
}

fn spawn_cache_task<T, K, V>(
    mut reader: genesis_transport::Reader<T>,
    cache: Arc<CapabilityCache<T>>,
    events: broadcast::Sender<CapabilityEvent<T>>,
    rejected_count: Arc<AtomicU64>,
    key_of: K,
    validate: V,
) -> JoinHandle<()>
where
    T: Clone + serde::Serialize + Send + Sync + 'static,
    K: Fn(&T) -> String + Send + 'static,
    V: Fn(&T) -> bool + Send + 'static,
{
    tokio::spawn(async move {
        loop {
            let sample = match reader.recv().await {
                Ok(sample) => sample,
                Err(genesis_transport::TransportError::Decode(e)) => {
                    rejected_count.fetch_add(1, Ordering::Relaxed);
                    tracing::warn!(error = %e, "rejected malformed capability payload");
                    continue;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "discovery reader closed");
                    return;
                }
            };
            match sample {
                Sample::Alive { key, value } => {
                    if !validate(&value) {
                        rejected_count.fetch_add(1, Ordering::Relaxed);
                        tracing::warn!("rejected capability with implausible schema");
                        continue;
                    }
                    let cache_key = key.unwrap_or_else(|| key_of(&value));
                    let hash = content_hash(&value);
                    let event = match cache.upsert(cache_key, value, hash) {
                        Upsert::Added(v) => Some(CapabilityEvent::Added(v)),
                        Upsert::Updated(v) => Some(CapabilityEvent::Updated(v)),
                        Upsert::Unchanged => None,
                    };
                    if let Some(event) = event {
                        let _ = events.send(event);
                    }
                }
                Sample::Removed { key, .. } => {
                    if let Some(key) = key {
                        if let Some(removed) = cache.remove(&key) {
                            let _ = events.send(CapabilityEvent::Removed(removed));
                        }
                    }
                }
            }
        }
    })
}
