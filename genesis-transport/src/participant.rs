//! Participant: a process joined to one domain.

use std::sync::Arc;

use genesis_types::{ParticipantId, Role, TopicQos};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::bus::{domain_bus, DomainBus};
use crate::error::TransportError;
use crate::reader::Reader;
use crate::topic::Topic;
use crate::writer::Writer;

/// A process on the bus. Created once per run via [`create_participant`].
pub struct Participant {
    pub id: ParticipantId,
    pub name: String,
    pub role: Role,
    domain: Arc<DomainBus>,
}

impl Participant {
    /// Declares (or re-attaches to an already-declared) topic with the given
    /// QoS. Returns `TopicMismatch` if the topic exists with different QoS.
    pub fn declare_topic(&self, name: &str, qos: TopicQos) -> Result<Topic, TransportError> {
        let state = self.domain.declare_topic(name, qos)?;
        Ok(Topic {
            name: name.to_string(),
            state,
        })
    }

    pub fn create_writer<T: Serialize>(&self, topic: &Topic) -> Writer<T> {
        Writer::new(topic.name.clone(), topic.state.clone())
    }

    pub fn create_reader<T: DeserializeOwned>(&self, topic: &Topic) -> Reader<T> {
        Reader::new(&topic.state, None)
    }

    /// Server-side content-filtered reader.
    /// `predicate` runs against the sample's JSON payload before it is decoded
    /// into `T`, so non-matching samples never cross into this reader's queue.
    pub fn create_filtered_reader<T, F>(&self, topic: &Topic, predicate: F) -> Reader<T>
    where
        T: DeserializeOwned,
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Reader::new(&topic.state, Some(std::sync::Arc::new(predicate)))
    }

    pub fn domain_id(&self) -> u32 {
        self.domain.domain_id
    }
}

/// Joins (creating if necessary) the in-process bus for `domain_id`
///. Generating a new id per call
/// satisfies "generated once per run".
pub fn create_participant(
    domain_id: u32,
    name: impl Into<String>,
    role: Role,
) -> Result<Participant, TransportError> {
    Ok(Participant {
        id: uuid::Uuid::new_v4(),
        name: name.into(),
        role,
        domain: domain_bus(domain_id),
    })
}
