//! RPC error taxonomy.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RpcError {
    #[error(transparent)]
    Transport(#[from] genesis_transport::TransportError),
    #[error("no reply received before timeout")]
    RpcTimeout,
    #[error("no matching replier was discovered")]
    RpcNoProvider,
    #[error("request failed schema validation: {0}")]
    RpcInvalidRequest(String),
    #[error("business error {code}: {message}")]
    RpcBusinessError { code: i32, message: String },
    #[error("replier is busy and cannot accept more concurrent requests")]
    RpcBusy,
    #[error("replier is shutting down")]
    RpcShuttingDown,
    #[error("max_hops exceeded for this call chain")]
    MaxHopsExceeded,
}
