//! Wire sample envelope exchanged on the in-process/over-socket bus.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Instance liveliness as observed by a reader.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstanceState {
    Alive,
    NotAliveDisposed,
    NotAliveNoWriters,
}

/// Raw, type-erased sample as it travels through a topic's broadcast channel,
/// durability cache, and (see [`crate::socket`]) the cross-process relay.
/// `payload` is `None` for disposal/no-writers notifications, which carry no
/// data, only the instance transition.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RawSample {
    pub key: Option<String>,
    pub instance_state: InstanceState,
    pub payload: Option<Value>,
}

/// Typed sample handed back to a reader.
#[derive(Clone, Debug)]
pub enum Sample<T> {
    Alive { key: Option<String>, value: T },
    Removed { key: Option<String>, state: InstanceState },
}

impl<T> Sample<T> {
    pub fn key(&self) -> Option<&str> {
        match self {
            Sample::Alive { key, .. } | Sample::Removed { key, .. } => key.as_deref(),
        }
    }
}
