//! Stable identifiers.

use uuid::Uuid;

/// Identifier for a participant process, generated once per run.
pub type ParticipantId = Uuid;

/// Correlates an RPC request with its reply.
pub type CorrelationId = Uuid;

/// Identifies a single end-to-end request chain.
pub type ChainId = Uuid;

/// Identifies one hop within a chain.
pub type CallId = Uuid;

/// Identifies a topology element (node or edge) on the durable topology stream.
pub type ElementId = String;

/// Participant role.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Interface,
    Agent,
    Service,
    Viewer,
}
