//! Topology and chain-activity monitoring for GENESIS.
//!
//! [`MonitoringPublisher`] is the write side every participant uses to keep
//! `genesis/topology`/`genesis/event` current; [`GraphState`] is the read
//! side a viewer or test harness folds that stream into.

pub mod error;
pub mod graph_state;
pub mod publisher;
pub mod subscriber;

pub use error::MonitoringError;
pub use graph_state::{GraphState, OpenChain};
pub use publisher::{MonitoringPublisher, EVENT_TOPIC, TOPOLOGY_TOPIC};
pub use subscriber::GraphSubscriber;
