//! Tool binding vocabulary for the Unified Tool Router.
//!
//! A name, description, and JSON schema, with a `kind`/`target` tag added
//! so a binding can point at a remote function, a remote agent, or a local
//! method.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ids::ParticipantId;

/// What a tool name is bound to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    Function,
    Agent,
    Local,
}

/// Concrete dispatch target for a bound tool.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ToolTarget {
    Function {
        function_id: String,
        provider_service_id: ParticipantId,
        service_endpoint: String,
    },
    Agent {
        agent_id: ParticipantId,
        service_endpoint: String,
    },
    Local {
        tool_name: String,
    },
}

impl ToolTarget {
    pub fn kind(&self) -> ToolKind {
        match self {
            ToolTarget::Function {.. } => ToolKind::Function,
            ToolTarget::Agent {.. } => ToolKind::Agent,
            ToolTarget::Local {.. } => ToolKind::Local,
        }
    }
}

/// JSON Schema + description presented to the LLM for one tool name.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolSchema {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// One entry of the router's binding map.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolBinding {
    pub name: String,
    pub target: ToolTarget,
    pub schema: ToolSchema,
}
