//! Drives a [`GraphState`] from the live `genesis/topology` and
//! `genesis/event` streams.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use genesis_transport::{Participant, Sample};
use genesis_types::rpc::status;
use genesis_types::{ChainEvent, ChainEventType, MonitoringEvent, TopicQos, TopologyRecord};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::error::MonitoringError;
use crate::graph_state::GraphState;
use crate::publisher::{EVENT_TOPIC, TOPOLOGY_TOPIC};

/// Lower bound on how often the stale-chain sweep runs, regardless of how
/// short `chain_stale_timeout` is configured.
const MIN_SWEEP_INTERVAL: Duration = Duration::from_millis(50);

/// Owns the background tasks feeding one shared [`GraphState`]; dropping it
/// stops all three tasks.
pub struct GraphSubscriber {
    state: Arc<Mutex<GraphState>>,
    _topology_task: JoinHandle<()>,
    _event_task: JoinHandle<()>,
    _stale_sweep_task: JoinHandle<()>,
}

impl GraphSubscriber {
    pub fn new(participant: &Participant, graph_state: GraphState) -> Result<Self, MonitoringError> {
        let topology_topic = participant.declare_topic(TOPOLOGY_TOPIC, TopicQos::topology())?;
        let event_topic = participant.declare_topic(EVENT_TOPIC, TopicQos::events())?;
        let mut topology_reader = participant.create_reader::<TopologyRecord>(&topology_topic);
        let mut event_reader = participant.create_reader::<MonitoringEvent>(&event_topic);
        let event_writer = participant.create_writer::<MonitoringEvent>(&event_topic);

        let sweep_interval = (graph_state.chain_stale_timeout() / 4).max(MIN_SWEEP_INTERVAL);
        let state = Arc::new(Mutex::new(graph_state));

        let topology_state = state.clone();
        let topology_task = tokio::spawn(async move {
            loop {
                match topology_reader.recv().await {
                    Ok(Sample::Alive { value, .. }) => {
                        topology_state.lock().unwrap().apply_topology(&value);
                    }
                    Ok(Sample::Removed { key: Some(key), .. }) => {
                        topology_state.lock().unwrap().remove_element(&key);
                    }
                    Ok(Sample::Removed { key: None, .. }) => {}
                    Err(e) => {
                        tracing::warn!(error = %e, "topology reader closed");
                        return;
                    }
                }
            }
        });

        let event_state = state.clone();
        let event_task = tokio::spawn(async move {
            loop {
                match event_reader.recv().await {
                    Ok(Sample::Alive { value: MonitoringEvent::Chain(event), .. }) => {
                        event_state.lock().unwrap().apply_chain_event(&event);
                    }
                    Ok(Sample::Alive {.. }) => {}
                    Ok(Sample::Removed {.. }) => {}
                    Err(e) => {
                        tracing::warn!(error = %e, "event reader closed");
                        return;
                    }
                }
            }
        });

        let sweep_state = state.clone();
        let stale_sweep_task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(sweep_interval);
            loop {
                ticker.tick().await;
                let now = Utc::now();
                let stale = sweep_state.lock().unwrap().stale_chain_records(now);
                for (call_id, chain) in stale {
                    let event = MonitoringEvent::Chain(ChainEvent {
                        event_id: Uuid::new_v4(),
                        chain_id: chain.chain_id,
                        call_id,
                        parent_call_id: Some(call_id),
                        source_id: chain.source_id,
                        target_id: chain.target_id,
                        event_type: ChainEventType::Error,
                        status: status::CHAIN_ABANDONED,
                        timestamp: now,
                    });
                    if event_writer.publish(None, &event).is_err() {
                        return;
                    }
                }
            }
        });

        Ok(Self {
            state,
            _topology_task: topology_task,
            _event_task: event_task,
            _stale_sweep_task: stale_sweep_task,
        })
    }

    /// Runs `f` against the current graph state under its lock.
    pub fn with_state<R>(&self, f: impl FnOnce(&GraphState) -> R) -> R {
        f(&self.state.lock().unwrap())
    }
}
