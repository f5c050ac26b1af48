//! Transport error taxonomy.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("domain {0} is unavailable")]
    TransportUnavailable(u32),
    #[error("topic {topic} already declared with a different type or QoS")]
    TopicMismatch { topic: String },
    #[error("topic {0} was not declared")]
    UnknownTopic(String),
    #[error("failed to encode sample: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("failed to decode sample: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("socket bridge connection failed: {0}")]
    ConnectionFailed(String),
}
