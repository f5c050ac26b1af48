//! Wire data model shared by every GENESIS crate.
//!
//! Nothing in this crate talks to a transport or holds runtime state; it is
//! the `serde`-derived vocabulary the rest of the workspace exchanges over
//! the bus.

pub mod capability;
pub mod graph;
pub mod ids;
pub mod monitoring;
pub mod qos;
pub mod rpc;
pub mod tool;

pub use capability::{AgentCapability, AgentKind, CapabilityEvent, FunctionCapability, Presence};
pub use graph::{ElementKind, EdgeType, GraphEdge, GraphNode, NodeState, NodeType, TopologyRecord};
pub use ids::{CallId, ChainId, CorrelationId, ElementId, ParticipantId, Role};
pub use monitoring::{ChainEvent, ChainEventType, LifecycleEvent, MonitoringEvent, Severity};
pub use qos::{Durability, History, Keying, Liveliness, Reliability, TopicQos};
pub use rpc::{
    AgentAgentReply, AgentAgentRequest, Correlated, FunctionReply, FunctionRequest,
    InterfaceAgentReply, InterfaceAgentRequest, Target,
};
pub use tool::{ToolBinding, ToolKind, ToolSchema, ToolTarget};
