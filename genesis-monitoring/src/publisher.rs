//! Publishes to the two monitoring topics.
//!
//! `stamp_and_publish` plays an envelope role: the caller builds the event's
//! content, and this publisher fills in the fields every sample needs
//! (`event_id`/`timestamp`) before it goes out.

use chrono::Utc;
use genesis_transport::Participant;
use genesis_types::{
    ChainEvent, ChainEventType, GraphEdge, GraphNode, LifecycleEvent, MonitoringEvent, NodeState,
    Severity, TopicQos, TopologyRecord,
};
use serde_json::Value;
use uuid::Uuid;

use crate::error::MonitoringError;

pub const TOPOLOGY_TOPIC: &str = "genesis/topology";
pub const EVENT_TOPIC: &str = "genesis/event";

pub struct MonitoringPublisher {
    topology_writer: genesis_transport::Writer<TopologyRecord>,
    event_writer: genesis_transport::Writer<MonitoringEvent>,
}

impl MonitoringPublisher {
    pub fn new(participant: &Participant) -> Result<Self, MonitoringError> {
        let topology_topic = participant.declare_topic(TOPOLOGY_TOPIC, TopicQos::topology())?;
        let event_topic = participant.declare_topic(EVENT_TOPIC, TopicQos::events())?;
        Ok(Self {
            topology_writer: participant.create_writer(&topology_topic),
            event_writer: participant.create_writer(&event_topic),
        })
    }

    pub fn publish_node(&self, node: &GraphNode) -> Result<(), MonitoringError> {
        let record = TopologyRecord::from_node(node, Utc::now());
        self.topology_writer
            .publish(Some(&record.element_id), &record)
            .map_err(Into::into)
    }

    pub fn publish_edge(&self, edge: &GraphEdge) -> Result<(), MonitoringError> {
        let record = TopologyRecord::from_edge(edge, Utc::now());
        self.topology_writer
            .publish(Some(&record.element_id), &record)
            .map_err(Into::into)
    }

    /// Disposes a node or edge's topology instance.
    pub fn retire_element(&self, element_id: &str) -> Result<(), MonitoringError> {
        self.topology_writer.dispose(Some(element_id)).map_err(Into::into)
    }

    pub fn emit_chain_start(&self, chain_id: Uuid, call_id: Uuid, source_id: &str, target_id: &str) -> Result<(), MonitoringError> {
        self.emit_chain(chain_id, call_id, None, source_id, target_id, ChainEventType::Start, 0)
    }

    pub fn emit_chain_complete(
        &self,
        chain_id: Uuid,
        call_id: Uuid,
        parent_call_id: Uuid,
        source_id: &str,
        target_id: &str,
        status: i32,
    ) -> Result<(), MonitoringError> {
        self.emit_chain(
            chain_id,
            call_id,
            Some(parent_call_id),
            source_id,
            target_id,
            ChainEventType::Complete,
            status,
        )
    }

    pub fn emit_chain_error(
        &self,
        chain_id: Uuid,
        call_id: Uuid,
        parent_call_id: Uuid,
        source_id: &str,
        target_id: &str,
        status: i32,
    ) -> Result<(), MonitoringError> {
        self.emit_chain(
            chain_id,
            call_id,
            Some(parent_call_id),
            source_id,
            target_id,
            ChainEventType::Error,
            status,
        )
    }

    fn emit_chain(
        &self,
        chain_id: Uuid,
        call_id: Uuid,
        parent_call_id: Option<Uuid>,
        source_id: &str,
        target_id: &str,
        event_type: ChainEventType,
        status: i32,
    ) -> Result<(), MonitoringError> {
        let event = MonitoringEvent::Chain(ChainEvent {
            event_id: Uuid::new_v4(),
            chain_id,
            call_id,
            parent_call_id,
            source_id: source_id.to_string(),
            target_id: target_id.to_string(),
            event_type,
            status,
            timestamp: Utc::now(),
        });
        self.event_writer.publish(None, &event).map_err(Into::into)
    }

    pub fn emit_lifecycle(&self, component_id: &str, state: NodeState) -> Result<(), MonitoringError> {
        let event = MonitoringEvent::Lifecycle(LifecycleEvent {
            event_id: Uuid::new_v4(),
            component_id: component_id.to_string(),
            state,
            timestamp: Utc::now(),
        });
        self.event_writer.publish(None, &event).map_err(Into::into)
    }

    pub fn emit_general(
        &self,
        component_id: &str,
        severity: Severity,
        message: &str,
        payload: Value,
    ) -> Result<(), MonitoringError> {
        let event = MonitoringEvent::General {
            event_id: Uuid::new_v4(),
            component_id: component_id.to_string(),
            severity,
            message: message.to_string(),
            payload,
            timestamp: Utc::now(),
        };
        self.event_writer.publish(None, &event).map_err(Into::into)
    }
}
