//! Monitoring error taxonomy.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MonitoringError {
    #[error(transparent)]
    Transport(#[from] genesis_transport::TransportError),
}
