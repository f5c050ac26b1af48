//! Interface role: a thin
//! client sending requests to a primary agent and awaiting its reply.

use std::time::Duration;

use genesis_rpc::{InterfaceAgentChannel, RpcClient, RpcError};
use genesis_transport::Participant;
use genesis_types::{InterfaceAgentReply, InterfaceAgentRequest};
use uuid::Uuid;

use crate::error::AgentError;

pub struct InterfaceClient {
    client: RpcClient<InterfaceAgentRequest, InterfaceAgentReply>,
}

impl InterfaceClient {
    pub fn new(participant: &Participant) -> Result<Self, AgentError> {
        Ok(Self {
            client: InterfaceAgentChannel::client(participant)?,
        })
    }

    /// Sends one message to `target_endpoint_id` (empty string broadcasts to
    /// any primary agent) and awaits its reply within `timeout`.
    pub async fn send(
        &self,
        target_endpoint_id: &str,
        message: impl Into<String>,
        conversation_id: Option<String>,
        timeout: Duration,
    ) -> Result<InterfaceAgentReply, RpcError> {
        let correlation_id = Uuid::new_v4();
        let request = InterfaceAgentRequest {
            correlation_id,
            target_endpoint_id: target_endpoint_id.to_string(),
            conversation_id,
            message: message.into(),
            metadata: None,
        };
        self.client.call(target_endpoint_id, correlation_id, &request, timeout).await
    }
}
