//! Discovery error taxonomy.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error(transparent)]
    Transport(#[from] genesis_transport::TransportError),
    #[error("capability rejected: {reason}")]
    CapabilityRejected { reason: String },
}
