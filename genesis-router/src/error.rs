//! Router error taxonomy.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RouterError {
    #[error(transparent)]
    Transport(#[from] genesis_transport::TransportError),
    #[error(transparent)]
    Rpc(#[from] genesis_rpc::RpcError),
    #[error(transparent)]
    Discovery(#[from] genesis_discovery::DiscoveryError),
    #[error(transparent)]
    Monitoring(#[from] genesis_monitoring::MonitoringError),
    #[error("no tool bound to name: {0}")]
    UnknownTool(String),
    #[error("tool loop exceeded {0} rounds")]
    ToolLoopExceeded(u32),
    #[error("reasoning model failed: {0}")]
    ReasoningFailed(String),
    #[error("local tool {name} failed: {message}")]
    LocalToolFailed { name: String, message: String },
}
