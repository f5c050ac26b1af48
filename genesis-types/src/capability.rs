//! Agent and Function capability records.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ids::ParticipantId;

/// `agent_type` on an agent capability record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentKind {
    General,
    Specialist,
}

/// Presence announcement. Lighter
/// than an [`AgentCapability`] record: just enough to know an agent is up.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Presence {
    pub agent_id: ParticipantId,
    pub display_name: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Durable agent capability record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AgentCapability {
    pub agent_id: ParticipantId,
    pub service_endpoint: String,
    pub display_name: String,
    pub agent_type: AgentKind,
    #[serde(default)]
    pub specializations: Vec<String>,
    #[serde(default, rename = "capabilities")]
    pub capability_tags: Vec<String>,
    #[serde(default)]
    pub classification_tags: Vec<String>,
    #[serde(default)]
    pub default_capable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_info: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performance_metrics: Option<Value>,
}

/// Durable function capability record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FunctionCapability {
    pub function_id: String,
    pub name: String,
    pub description: String,
    pub parameter_schema: Value,
    pub provider_service_id: ParticipantId,
    pub service_endpoint: String,
}

impl FunctionCapability {
    /// Full JSON Schema validation is out of scope; this checks only that
    /// the value is a JSON object, the minimum shape a schema needs.
    pub fn has_plausible_schema(&self) -> bool {
        self.parameter_schema.is_object()
    }
}

/// Discovery change notification.
#[derive(Clone, Debug, PartialEq)]
pub enum CapabilityEvent<T> {
    Added(T),
    Updated(T),
    Removed(T),
}

impl<T> CapabilityEvent<T> {
    pub fn record(&self) -> &T {
        match self {
            CapabilityEvent::Added(r) | CapabilityEvent::Updated(r) | CapabilityEvent::Removed(r) => r,
        }
    }
}
