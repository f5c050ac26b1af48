//! RPC payload shapes for the three channels.
//!
//! Three independent request/reply pairs, each carrying
//! `correlation_id`/`target_endpoint_id` so replies route back to the right
//! caller regardless of how many are in flight at once.

use serde::{Deserialize, Serialize};

use crate::ids::{CallId, ChainId, CorrelationId, ParticipantId};

/// Interface → Agent request.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InterfaceAgentRequest {
    pub correlation_id: CorrelationId,
    pub target_endpoint_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

/// Interface → Agent reply.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InterfaceAgentReply {
    pub correlation_id: CorrelationId,
    pub status: i32,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

/// Agent → Agent request: same shape as Interface→Agent plus propagated
/// `chain_id`/parent `call_id`/hop count embedded in `metadata`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AgentAgentRequest {
    pub correlation_id: CorrelationId,
    pub target_endpoint_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
    pub message: String,
    pub chain_id: ChainId,
    pub parent_call_id: CallId,
    pub hop_count: u32,
}

/// Agent → Agent reply.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AgentAgentReply {
    pub correlation_id: CorrelationId,
    pub status: i32,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

/// Agent → Function request. No `conversation_id`: function-side
/// correlation is chain events only.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FunctionRequest {
    pub correlation_id: CorrelationId,
    pub target_endpoint_id: String,
    pub function_name: String,
    pub arguments_json: String,
}

/// Agent → Function reply.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FunctionReply {
    pub correlation_id: CorrelationId,
    pub status: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_json: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

/// Accessor for the `correlation_id` every request/reply payload carries.
pub trait Correlated {
    fn correlation_id(&self) -> CorrelationId;
}

macro_rules! impl_correlated {
    ($($ty:ty),+ $(,)?) => {
        $(impl Correlated for $ty {
            fn correlation_id(&self) -> CorrelationId {
                self.correlation_id
            }
        })+
    };
}

impl_correlated!(
    InterfaceAgentRequest,
    InterfaceAgentReply,
    AgentAgentRequest,
    AgentAgentReply,
    FunctionRequest,
    FunctionReply,
);

/// Business-level status code conventions shared by all three reply shapes.
pub mod status {
    pub const OK: i32 = 0;
    pub const BUSINESS_ERROR: i32 = 1;
    pub const TOOL_LOOP_EXCEEDED: i32 = 2;
    pub const MAX_HOPS_EXCEEDED: i32 = 3;
    pub const NO_PROVIDER: i32 = 4;
    pub const SHUTTING_DOWN: i32 = 5;
    pub const CHAIN_ABANDONED: i32 = 6;
}

/// Who a targeted filter predicate should match: any instance, or one pinned
/// by `service_endpoint`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Target {
    Broadcast,
    Instance(String),
}

impl Target {
    pub fn endpoint_id(&self) -> &str {
        match self {
            Target::Broadcast => "",
            Target::Instance(id) => id,
        }
    }

    pub fn matches(&self, target_endpoint_id: &str, own_endpoint_id: &str) -> bool {
        target_endpoint_id.is_empty() || target_endpoint_id == own_endpoint_id
            || matches!(self, Target::Instance(id) if id == own_endpoint_id)
    }
}

/// Identity of the participant issuing or receiving an RPC, used by callers
/// that need to stamp a reply's `correlation_id` back.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Endpoint {
    pub participant_id: ParticipantId,
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn interface_agent_request_roundtrip() {
        let req = InterfaceAgentRequest {
            correlation_id: Uuid::nil(),
            target_endpoint_id: "agent-1".to_string(),
            conversation_id: Some("conv-1".to_string()),
            message: "hello".to_string(),
            metadata: None,
        };
        let json = serde_json::to_string(&req).unwrap();
        let parsed: InterfaceAgentRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.message, "hello");
        assert_eq!(parsed.target_endpoint_id, "agent-1");
    }

    #[test]
    fn target_matches_broadcast_and_pinned() {
        let broadcast = Target::Broadcast;
        assert!(broadcast.matches("", "svc-1"));
        assert!(broadcast.matches("svc-1", "svc-1"));
        assert!(!broadcast.matches("svc-2", "svc-1"));

        let pinned = Target::Instance("svc-1".to_string());
        assert!(pinned.matches("svc-1", "svc-1"));
    }

    #[test]
    fn function_reply_business_error_roundtrip() {
        let reply = FunctionReply {
            correlation_id: Uuid::nil(),
            status: status::BUSINESS_ERROR,
            result_json: None,
            error_message: Some("division by zero".to_string()),
        };
        let json = serde_json::to_string(&reply).unwrap();
        assert!(json.contains("\"status\":1"));
        let parsed: FunctionReply = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.error_message.as_deref(), Some("division by zero"));
    }
}
