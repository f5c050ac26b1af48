//! Request/reply topic pairs that stamp and match on `correlation_id`.
//!
//! This crate only pairs a writer on the request topic with a
//! correlation-filtered reader on the reply topic (and the inverse for a
//! replier); the pending-call table, timeout, and cancellation policy live
//! in `genesis-rpc`, which owns that responsibility.

use genesis_types::Correlated;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::participant::Participant;
use crate::reader::Reader;
use crate::topic::Topic;
use crate::writer::Writer;

/// Client side of a request/reply channel: publishes requests, and can open
/// a reply reader filtered to one outstanding `correlation_id`.
pub struct Requester<Req, Rep> {
    request_writer: Writer<Req>,
    reply_topic: Topic,
    _marker: std::marker::PhantomData<fn() -> Rep>,
}

impl<Req, Rep> Requester<Req, Rep>
where
    Req: Serialize,
    Rep: DeserializeOwned + Correlated + Send + 'static,
{
    pub fn new(participant: &Participant, request_topic: &Topic, reply_topic: &Topic) -> Self {
        Self {
            request_writer: participant.create_writer(request_topic),
            reply_topic: reply_topic.clone(),
            _marker: std::marker::PhantomData,
        }
    }

    pub fn publish(&self, key: Option<&str>, request: &Req) -> Result<(), crate::error::TransportError> {
        self.request_writer.publish(key, request)
    }

    /// Opens a reader that only yields replies whose `correlation_id` equals
    /// `correlation_id`. The caller is expected to read at most one matching
    /// reply, then drop the reader.
    pub fn reply_reader(&self, participant: &Participant, correlation_id: uuid::Uuid) -> Reader<Rep> {
        participant.create_filtered_reader(&self.reply_topic, move |payload| {
            payload
                .get("correlation_id")
                .and_then(|v| v.as_str())
                .and_then(|s| s.parse::<uuid::Uuid>().ok())
                == Some(correlation_id)
        })
    }
}

/// Server side: receives requests on the request topic (optionally filtered
/// to this service's own `target_endpoint_id`) and publishes replies.
pub struct Replier<Req, Rep> {
    pub request_reader: Reader<Req>,
    reply_writer: Writer<Rep>,
}

impl<Req, Rep> Replier<Req, Rep>
where
    Req: DeserializeOwned,
    Rep: Serialize,
{
    pub fn new(request_reader: Reader<Req>, participant: &Participant, reply_topic: &Topic) -> Self {
        Self {
            request_reader,
            reply_writer: participant.create_writer(reply_topic),
        }
    }

    pub fn reply(&self, reply: &Rep) -> Result<(), crate::error::TransportError> {
        self.reply_writer.publish(None, reply)
    }
}
