//! Volatile chain/lifecycle/general events.
//!
//! Tagged enum plus envelope fields (IDs, timestamps) injected at publish
//! time, turned from an LLM-streaming event vocabulary into GENESIS's
//! chain/lifecycle vocabulary.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::ids::{CallId, ChainId};

/// `event_type` on a chain event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChainEventType {
    Start,
    Complete,
    Error,
}

/// One hop of a chain: exactly one `Start` pairs with at most one
/// `Complete`/`Error` sharing the same `call_id`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChainEvent {
    pub event_id: Uuid,
    pub chain_id: ChainId,
    pub call_id: CallId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_call_id: Option<CallId>,
    pub source_id: String,
    pub target_id: String,
    pub event_type: ChainEventType,
    pub status: i32,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Lifecycle annotation matching a `GraphNode` state transition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LifecycleEvent {
    pub event_id: Uuid,
    pub component_id: String,
    pub state: crate::graph::NodeState,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Severity for a `General` event; mirrors typical `tracing` levels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Debug,
    Info,
    Warn,
    Error,
}

/// The `genesis/event` payload discriminator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MonitoringEvent {
    Chain(ChainEvent),
    Lifecycle(LifecycleEvent),
    General {
        event_id: Uuid,
        component_id: String,
        severity: Severity,
        message: String,
        #[serde(default)]
        payload: Value,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl MonitoringEvent {
    pub fn timestamp(&self) -> chrono::DateTime<chrono::Utc> {
        match self {
            MonitoringEvent::Chain(c) => c.timestamp,
            MonitoringEvent::Lifecycle(l) => l.timestamp,
            MonitoringEvent::General { timestamp, .. } => *timestamp,
        }
    }
}
