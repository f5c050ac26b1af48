//! Durable topology records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `node_type`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    Interface,
    PrimaryAgent,
    SpecialistAgent,
    Service,
    Function,
}

/// Node lifecycle state. Transitions are monotonic except `Ready` <-> `Busy`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeState {
    Discovering,
    Ready,
    Busy,
    Failed,
    Departed,
}

impl NodeState {
    /// Returns whether `self -> next` is an allowed transition; monotonic
    /// except Ready<->Busy.
    pub fn can_transition_to(self, next: NodeState) -> bool {
        use NodeState::*;
        match (self, next) {
            (a, b) if a == b => true,
            (Ready, Busy) | (Busy, Ready) => true,
            (Discovering, Ready) => true,
            (Discovering | Ready | Busy, Failed) => true,
            (Discovering | Ready | Busy | Failed, Departed) => true,
            _ => false,
        }
    }
}

/// Durable graph node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub node_id: String,
    pub node_type: NodeType,
    pub display_name: String,
    pub state: NodeState,
    #[serde(default)]
    pub metadata: Value,
}

/// `edge_type`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeType {
    Discovers,
    RpcRequest,
    HostsFunction,
    ExplicitConnection,
}

/// Durable graph edge, uniqueness keyed by `(source, target, edge_type)`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub source_id: String,
    pub target_id: String,
    pub edge_type: EdgeType,
    #[serde(default)]
    pub metadata: Value,
}

impl GraphEdge {
    pub fn key(&self) -> (String, String, EdgeType) {
        (self.source_id.clone(), self.target_id.clone(), self.edge_type)
    }
}

/// Discriminates a [`TopologyRecord`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    Node,
    Edge,
}

/// The actual `genesis/topology` wire sample: one flat record for either a
/// node or an edge, keyed by `element_id`. `GraphNode`/
/// `GraphEdge` are the strongly-typed view a consumer reconstructs from a
/// stream of these; see [`TopologyRecord::from_node`]/[`from_edge`] and
/// their inverses.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TopologyRecord {
    pub element_id: String,
    pub kind: ElementKind,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<NodeState>,
    #[serde(default)]
    pub metadata_json: Value,
}

impl TopologyRecord {
    pub fn from_node(node: &GraphNode, timestamp: DateTime<Utc>) -> Self {
        Self {
            element_id: node.node_id.clone(),
            kind: ElementKind::Node,
            timestamp,
            component_name: Some(node.display_name.clone()),
            component_type: Some(format!("{:?}", node.node_type)),
            state: Some(node.state),
            metadata_json: node.metadata.clone(),
        }
    }

    /// Edges have no independent identity in the original model beyond
    /// `(source, target, edge_type)`; this is the `element_id` GENESIS uses
    /// on the wire for that composite key.
    pub fn edge_element_id(edge: &GraphEdge) -> String {
        format!("{}->{}:{:?}", edge.source_id, edge.target_id, edge.edge_type)
    }

    pub fn from_edge(edge: &GraphEdge, timestamp: DateTime<Utc>) -> Self {
        Self {
            element_id: Self::edge_element_id(edge),
            kind: ElementKind::Edge,
            timestamp,
            component_name: None,
            component_type: Some(format!("{:?}", edge.edge_type)),
            state: None,
            metadata_json: edge.metadata.clone(),
        }
    }

    /// Reconstructs a [`GraphNode`] if this record is a `Node` kind sample.
    pub fn as_node(&self) -> Option<GraphNode> {
        if self.kind != ElementKind::Node {
            return None;
        }
        Some(GraphNode {
            node_id: self.element_id.clone(),
            node_type: parse_node_type(self.component_type.as_deref()?)?,
            display_name: self.component_name.clone().unwrap_or_default(),
            state: self.state?,
            metadata: self.metadata_json.clone(),
        })
    }

    /// Reconstructs a [`GraphEdge`] if this record is an `Edge` kind sample,
    /// parsing `source->target:edge_type` back out of `element_id`.
    pub fn as_edge(&self) -> Option<GraphEdge> {
        if self.kind != ElementKind::Edge {
            return None;
        }
        let (endpoints, edge_type_str) = self.element_id.rsplit_once(':')?;
        let (source_id, target_id) = endpoints.split_once("->")?;
        Some(GraphEdge {
            source_id: source_id.to_string(),
            target_id: target_id.to_string(),
            edge_type: parse_edge_type(edge_type_str)?,
            metadata: self.metadata_json.clone(),
        })
    }
}

fn parse_edge_type(s: &str) -> Option<EdgeType> {
    match s {
        "Discovers" => Some(EdgeType::Discovers),
        "RpcRequest" => Some(EdgeType::RpcRequest),
        "HostsFunction" => Some(EdgeType::HostsFunction),
        "ExplicitConnection" => Some(EdgeType::ExplicitConnection),
        _ => None,
    }
}

fn parse_node_type(s: &str) -> Option<NodeType> {
    match s {
        "Interface" => Some(NodeType::Interface),
        "PrimaryAgent" => Some(NodeType::PrimaryAgent),
        "SpecialistAgent" => Some(NodeType::SpecialistAgent),
        "Service" => Some(NodeType::Service),
        "Function" => Some(NodeType::Function),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topology_record_roundtrips_a_node() {
        let node = GraphNode {
            node_id: "agent-1".to_string(),
            node_type: NodeType::PrimaryAgent,
            display_name: "primary".to_string(),
            state: NodeState::Ready,
            metadata: serde_json::json!({}),
        };
        let record = TopologyRecord::from_node(&node, Utc::now());
        assert_eq!(record.kind, ElementKind::Node);
        assert_eq!(record.as_node(), Some(node));
    }

    #[test]
    fn edge_element_id_encodes_the_composite_key() {
        let edge = GraphEdge {
            source_id: "a".to_string(),
            target_id: "b".to_string(),
            edge_type: EdgeType::RpcRequest,
            metadata: serde_json::json!({}),
        };
        let record = TopologyRecord::from_edge(&edge, Utc::now());
        assert_eq!(record.kind, ElementKind::Edge);
        assert_eq!(record.element_id, "a->b:RpcRequest");
        assert_eq!(record.as_edge(), Some(edge));
    }

    #[test]
    fn state_transitions_are_monotonic_except_ready_busy() {
        assert!(NodeState::Ready.can_transition_to(NodeState::Busy));
        assert!(NodeState::Busy.can_transition_to(NodeState::Ready));
        assert!(NodeState::Discovering.can_transition_to(NodeState::Ready));
        assert!(!NodeState::Ready.can_transition_to(NodeState::Discovering));
        assert!(!NodeState::Departed.can_transition_to(NodeState::Ready));
        assert!(NodeState::Busy.can_transition_to(NodeState::Departed));
    }

    #[test]
    fn edge_key_ignores_metadata() {
        let a = GraphEdge {
            source_id: "x".into(),
            target_id: "y".into(),
            edge_type: EdgeType::Discovers,
            metadata: serde_json::json!({"a": 1}),
        };
        let b = GraphEdge {
            metadata: serde_json::json!({"a": 2}),
            ..a.clone()
        };
        assert_eq!(a.key(), b.key());
    }
}
