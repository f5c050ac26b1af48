//! In-memory reconstruction of the topology/chain streams.
//!
//! A viewer (or any consumer) folds the `genesis/topology` and `genesis/event`
//! streams into this, much like folding an envelope stream into UI state; here
//! the fold target is a live graph plus a table of in-flight chains instead of
//! a transcript.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use genesis_types::{ChainEvent, ChainEventType, EdgeType, GraphEdge, GraphNode, TopologyRecord};

/// One chain hop still awaiting its `Complete`/`Error`.
#[derive(Clone, Debug)]
pub struct OpenChain {
    pub chain_id: genesis_types::ChainId,
    pub source_id: String,
    pub target_id: String,
    pub started_at: DateTime<Utc>,
}

/// Folds `genesis/topology` and `genesis/event` samples into a live view of
/// the graph and its in-flight chains.
pub struct GraphState {
    nodes: HashMap<String, GraphNode>,
    edges: HashMap<(String, String, EdgeType), GraphEdge>,
    edge_seen_at: HashMap<(String, String, EdgeType), DateTime<Utc>>,
    open_chains: HashMap<genesis_types::CallId, OpenChain>,
    chain_stale_timeout: Duration,
    edge_orphan_grace: Duration,
}

impl GraphState {
    pub fn new(chain_stale_timeout: Duration, edge_orphan_grace: Duration) -> Self {
        Self {
            nodes: HashMap::new(),
            edges: HashMap::new(),
            edge_seen_at: HashMap::new(),
            open_chains: HashMap::new(),
            chain_stale_timeout,
            edge_orphan_grace,
        }
    }

    /// Applies one `genesis/topology` sample: an `Alive` record upserts the
    /// node or edge, a `Removed` notification retires it.
    pub fn apply_topology(&mut self, record: &TopologyRecord) {
        if let Some(node) = record.as_node() {
            self.nodes.insert(node.node_id.clone(), node);
        } else if let Some(edge) = record.as_edge() {
            let key = edge.key();
            self.edge_seen_at.insert(key.clone(), record.timestamp);
            self.edges.insert(key, edge);
        }
    }

    pub fn remove_element(&mut self, element_id: &str) {
        if self.nodes.remove(element_id).is_some() {
            return;
        }
        self.edges.retain(|key, _| {
            TopologyRecord::edge_element_id(&GraphEdge {
                source_id: key.0.clone(),
                target_id: key.1.clone(),
                edge_type: key.2,
                metadata: serde_json::Value::Null,
            }) != element_id
        });
        self.edge_seen_at.retain(|key, _| {
            TopologyRecord::edge_element_id(&GraphEdge {
                source_id: key.0.clone(),
                target_id: key.1.clone(),
                edge_type: key.2,
                metadata: serde_json::Value::Null,
            }) != element_id
        });
    }

    /// Applies a chain event, tracking `Start` as open and clearing on
    /// `Complete`/`Error`.
    pub fn apply_chain_event(&mut self, event: &ChainEvent) {
        match event.event_type {
            ChainEventType::Start => {
                self.open_chains.insert(
                    event.call_id,
                    OpenChain {
                        chain_id: event.chain_id,
                        source_id: event.source_id.clone(),
                        target_id: event.target_id.clone(),
                        started_at: event.timestamp,
                    },
                );
            }
            ChainEventType::Complete | ChainEventType::Error => {
                self.open_chains.remove(&event.call_id);
            }
        }
    }

    pub fn node(&self, node_id: &str) -> Option<&GraphNode> {
        self.nodes.get(node_id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.nodes.values()
    }

    pub fn edges(&self) -> impl Iterator<Item = &GraphEdge> {
        self.edges.values()
    }

    pub fn open_chains(&self) -> impl Iterator<Item = &OpenChain> {
        self.open_chains.values()
    }

    /// Hops whose `Start` has sat open longer than `chain_stale_timeout`
    /// without a terminal event.
    pub fn stale_chains(&self, now: DateTime<Utc>) -> Vec<genesis_types::CallId> {
        self.stale_chain_records(now).into_iter().map(|(call_id, _)| call_id).collect()
    }

    /// Same as [`Self::stale_chains`] but keeps the `OpenChain` each call_id
    /// belongs to, for a caller that needs to emit a synthetic abandonment
    /// event carrying the right `chain_id`/source/target.
    pub fn stale_chain_records(&self, now: DateTime<Utc>) -> Vec<(genesis_types::CallId, OpenChain)> {
        self.open_chains
            .iter()
            .filter(|(_, chain)| {
                now.signed_duration_since(chain.started_at)
                    .to_std()
                    .map(|elapsed| elapsed > self.chain_stale_timeout)
                    .unwrap_or(false)
            })
            .map(|(call_id, chain)| (*call_id, chain.clone()))
            .collect()
    }

    pub fn chain_stale_timeout(&self) -> Duration {
        self.chain_stale_timeout
    }

    /// Edges whose endpoint node departed more than `edge_orphan_grace` ago
    /// and are therefore safe to prune.
    pub fn orphaned_edges(&self, now: DateTime<Utc>) -> Vec<(String, String, EdgeType)> {
        self.edges
            .keys()
            .filter(|key| {
                let endpoints_missing =
                    !self.nodes.contains_key(&key.0) || !self.nodes.contains_key(&key.1);
                if !endpoints_missing {
                    return false;
                }
                self.edge_seen_at
                    .get(key)
                    .map(|seen_at| {
                        now.signed_duration_since(*seen_at)
                            .to_std()
                            .map(|elapsed| elapsed > self.edge_orphan_grace)
                            .unwrap_or(false)
                    })
                    .unwrap_or(true)
            })
            .cloned()
            .collect()
    }

    pub fn prune_orphaned_edges(&mut self, now: DateTime<Utc>) {
        for key in self.orphaned_edges(now) {
            self.edges.remove(&key);
            self.edge_seen_at.remove(&key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use genesis_types::{NodeState, NodeType};

    fn node(id: &str) -> GraphNode {
        GraphNode {
            node_id: id.to_string(),
            node_type: NodeType::SpecialistAgent,
            display_name: id.to_string(),
            state: NodeState::Ready,
            metadata: serde_json::json!({}),
        }
    }

    #[test]
    fn topology_stream_reconstructs_nodes_and_edges() {
        let mut state = GraphState::new(Duration::from_secs(60), Duration::from_secs(30));
        let now = Utc::now();
        state.apply_topology(&TopologyRecord::from_node(&node("a"), now));
        let edge = GraphEdge {
            source_id: "a".into(),
            target_id: "b".into(),
            edge_type: EdgeType::RpcRequest,
            metadata: serde_json::json!({}),
        };
        state.apply_topology(&TopologyRecord::from_edge(&edge, now));
        assert!(state.node("a").is_some());
        assert_eq!(state.edges().count(), 1);
    }

    #[test]
    fn complete_event_closes_the_open_chain() {
        let mut state = GraphState::new(Duration::from_secs(60), Duration::from_secs(30));
        let chain_id = uuid::Uuid::new_v4();
        let call_id = uuid::Uuid::new_v4();
        let now = Utc::now();
        state.apply_chain_event(&ChainEvent {
            event_id: uuid::Uuid::new_v4(),
            chain_id,
            call_id,
            parent_call_id: None,
            source_id: "a".into(),
            target_id: "b".into(),
            event_type: ChainEventType::Start,
            status: 0,
            timestamp: now,
        });
        assert_eq!(state.open_chains().count(), 1);
        state.apply_chain_event(&ChainEvent {
            event_id: uuid::Uuid::new_v4(),
            chain_id,
            call_id,
            parent_call_id: Some(call_id),
            source_id: "a".into(),
            target_id: "b".into(),
            event_type: ChainEventType::Complete,
            status: 0,
            timestamp: now,
        });
        assert_eq!(state.open_chains().count(), 0);
    }

    #[test]
    fn stale_chain_is_detected_after_timeout() {
        let mut state = GraphState::new(Duration::from_millis(1), Duration::from_secs(30));
        let call_id = uuid::Uuid::new_v4();
        let started_at = Utc::now() - chrono::Duration::seconds(5);
        state.apply_chain_event(&ChainEvent {
            event_id: uuid::Uuid::new_v4(),
            chain_id: uuid::Uuid::new_v4(),
            call_id,
            parent_call_id: None,
            source_id: "a".into(),
            target_id: "b".into(),
            event_type: ChainEventType::Start,
            status: 0,
            timestamp: started_at,
        });
        let stale = state.stale_chains(Utc::now());
        assert_eq!(stale, vec![call_id]);
    }

    #[test]
    fn edge_with_departed_endpoint_survives_grace_then_prunes() {
        let mut state = GraphState::new(Duration::from_secs(60), Duration::from_millis(1));
        let edge = GraphEdge {
            source_id: "a".into(),
            target_id: "b".into(),
            edge_type: EdgeType::Discovers,
            metadata: serde_json::json!({}),
        };
        let seen_at = Utc::now() - chrono::Duration::seconds(1);
        state.apply_topology(&TopologyRecord::from_edge(&edge, seen_at));
        // neither endpoint node is present: both "a" and "b" are missing.
        assert_eq!(state.orphaned_edges(Utc::now()).len(), 1);
        state.prune_orphaned_edges(Utc::now());
        assert_eq!(state.edges().count(), 0);
    }
}
