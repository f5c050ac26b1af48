//! Agent-level error taxonomy: wraps every layer it composes.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error(transparent)]
    Transport(#[from] genesis_transport::TransportError),
    #[error(transparent)]
    Discovery(#[from] genesis_discovery::DiscoveryError),
    #[error(transparent)]
    Rpc(#[from] genesis_rpc::RpcError),
    #[error(transparent)]
    Router(#[from] genesis_router::RouterError),
    #[error(transparent)]
    Monitoring(#[from] genesis_monitoring::MonitoringError),
}
