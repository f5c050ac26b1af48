//! Generic correlated RPC server half: a content-filtered reader on the
//! request topic plus a writer on the reply topic.

use genesis_transport::{Participant, Reader, Sample, Topic};
use genesis_types::{Correlated, Target};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::RpcError;

/// Server half of one correlated request/reply channel, already filtered to
/// this service's own `target_endpoint_id` (or broadcast requests).
pub struct RpcServer<Req, Rep> {
    request_reader: Reader<Req>,
    request_topic: Topic,
    reply_writer: genesis_transport::Writer<Rep>,
}

impl<Req, Rep> RpcServer<Req, Rep>
where
    Req: DeserializeOwned + Correlated + Send + Sync + 'static,
    Rep: Serialize,
{
    /// `own_endpoint_id` is this service instance's `service_endpoint`; the
    /// reader only yields requests addressed to it or broadcast
    /// (empty `target_endpoint_id`).
    pub fn new(
        participant: &Participant,
        request_topic: &Topic,
        reply_topic: &Topic,
        own_endpoint_id: impl Into<String>,
    ) -> Self {
        let own_endpoint_id = own_endpoint_id.into();
        let request_reader = participant.create_filtered_reader(request_topic, move |payload: &Value| {
            let target = payload
                .get("target_endpoint_id")
                .and_then(|v| v.as_str())
                .unwrap_or("");
            Target::Broadcast.matches(target, &own_endpoint_id)
        });
        let reply_writer = participant.create_writer(reply_topic);
        Self {
            request_reader,
            request_topic: request_topic.clone(),
            reply_writer,
        }
    }

    /// Awaits the next request addressed to this instance. Removal
    /// notifications on the request topic (there are none by construction,
    /// requests are never disposed) are skipped, as is a broadcast request
    /// some other instance has already claimed.
    pub async fn recv(&mut self) -> Result<Req, RpcError> {
        loop {
            match self.request_reader.recv().await? {
                Sample::Alive { value, .. } => {
                    if self.request_topic.claim_once(&value.correlation_id().to_string()) {
                        return Ok(value);
                    }
                }
                Sample::Removed {.. } => continue,
            }
        }
    }

    pub fn reply(&self, reply: &Rep) -> Result<(), RpcError> {
        self.reply_writer.publish(None, reply).map_err(Into::into)
    }
}
