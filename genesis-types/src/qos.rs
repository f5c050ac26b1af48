//! Quality-of-service declarations for transport topics.

use std::time::Duration;

/// Whether late joiners receive the last sample per key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Durability {
    #[default]
    Volatile,
    TransientLocal,
}

/// In-order, no-loss delivery guarantee between a matched writer/reader pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Reliability {
    BestEffort,
    #[default]
    Reliable,
}

/// How many historical samples per instance a reader retains.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum History {
    KeepLast(usize),
    KeepAll,
}

impl Default for History {
    fn default() -> Self {
        History::KeepLast(1)
    }
}

/// Liveliness assertion model and lease duration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Liveliness {
    Automatic { lease: Duration },
    ManualByTopic { lease: Duration },
}

impl Default for Liveliness {
    fn default() -> Self {
        Liveliness::Automatic {
            lease: Duration::from_secs(10),
        }
    }
}

impl Liveliness {
    pub fn lease(&self) -> Duration {
        match self {
            Liveliness::Automatic { lease } | Liveliness::ManualByTopic { lease } => *lease,
        }
    }
}

/// Which fields of a sample identify its instance for per-key durability.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Keying {
    pub fields: Vec<String>,
}

impl Keying {
    pub fn by(field: impl Into<String>) -> Self {
        Self {
            fields: vec![field.into()],
        }
    }
}

/// Full QoS profile for one declared topic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TopicQos {
    pub durability: Durability,
    pub reliability: Reliability,
    pub history: History,
    pub liveliness: Liveliness,
    pub keying: Keying,
}

impl TopicQos {
    /// QoS used by the three discovery topics.
    pub fn discovery(key_field: impl Into<String>) -> Self {
        Self {
            durability: Durability::TransientLocal,
            reliability: Reliability::Reliable,
            history: History::KeepLast(1),
            liveliness: Liveliness::default(),
            keying: Keying::by(key_field),
        }
    }

    /// QoS used by the RPC request/reply topics.
    pub fn rpc() -> Self {
        Self {
            durability: Durability::Volatile,
            reliability: Reliability::Reliable,
            history: History::KeepLast(32),
            liveliness: Liveliness::default(),
            keying: Keying::default(),
        }
    }

    /// QoS used by `genesis/topology`.
    pub fn topology() -> Self {
        Self {
            durability: Durability::TransientLocal,
            reliability: Reliability::Reliable,
            history: History::KeepLast(1),
            liveliness: Liveliness::default(),
            keying: Keying::by("element_id"),
        }
    }

    /// QoS used by `genesis/event`.
    pub fn events() -> Self {
        Self {
            durability: Durability::Volatile,
            reliability: Reliability::Reliable,
            history: History::KeepLast(256),
            liveliness: Liveliness::default(),
            keying: Keying::default(),
        }
    }
}
