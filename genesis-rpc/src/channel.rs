//! The three named RPC channels.

use genesis_transport::{Participant, TransportError};
use genesis_types::{
    AgentAgentReply, AgentAgentRequest, FunctionReply, FunctionRequest, InterfaceAgentReply,
    InterfaceAgentRequest, TopicQos,
};

use crate::client::RpcClient;
use crate::server::RpcServer;

pub const INTERFACE_AGENT_REQUEST_TOPIC: &str = "genesis/interface_agent_request";
pub const INTERFACE_AGENT_REPLY_TOPIC: &str = "genesis/interface_agent_reply";
pub const AGENT_AGENT_REQUEST_TOPIC: &str = "genesis/agent_agent_request";
pub const AGENT_AGENT_REPLY_TOPIC: &str = "genesis/agent_agent_reply";
pub const FUNCTION_REQUEST_TOPIC: &str = "genesis/function_request";
pub const FUNCTION_REPLY_TOPIC: &str = "genesis/function_reply";

/// Interface → Agent RPC channel.
pub struct InterfaceAgentChannel;

impl InterfaceAgentChannel {
    pub fn client(
        participant: &Participant,
    ) -> Result<RpcClient<InterfaceAgentRequest, InterfaceAgentReply>, TransportError> {
        let req = participant.declare_topic(INTERFACE_AGENT_REQUEST_TOPIC, TopicQos::rpc())?;
        let rep = participant.declare_topic(INTERFACE_AGENT_REPLY_TOPIC, TopicQos::rpc())?;
        Ok(RpcClient::new(participant, &req, &rep))
    }

    pub fn server(
        participant: &Participant,
        own_endpoint_id: impl Into<String>,
    ) -> Result<RpcServer<InterfaceAgentRequest, InterfaceAgentReply>, TransportError> {
        let req = participant.declare_topic(INTERFACE_AGENT_REQUEST_TOPIC, TopicQos::rpc())?;
        let rep = participant.declare_topic(INTERFACE_AGENT_REPLY_TOPIC, TopicQos::rpc())?;
        Ok(RpcServer::new(participant, &req, &rep, own_endpoint_id))
    }
}

/// Agent → Agent RPC channel.
pub struct AgentAgentChannel;

impl AgentAgentChannel {
    pub fn client(
        participant: &Participant,
    ) -> Result<RpcClient<AgentAgentRequest, AgentAgentReply>, TransportError> {
        let req = participant.declare_topic(AGENT_AGENT_REQUEST_TOPIC, TopicQos::rpc())?;
        let rep = participant.declare_topic(AGENT_AGENT_REPLY_TOPIC, TopicQos::rpc())?;
        Ok(RpcClient::new(participant, &req, &rep))
    }

    pub fn server(
        participant: &Participant,
        own_endpoint_id: impl Into<String>,
    ) -> Result<RpcServer<AgentAgentRequest, AgentAgentReply>, TransportError> {
        let req = participant.declare_topic(AGENT_AGENT_REQUEST_TOPIC, TopicQos::rpc())?;
        let rep = participant.declare_topic(AGENT_AGENT_REPLY_TOPIC, TopicQos::rpc())?;
        Ok(RpcServer::new(participant, &req, &rep, own_endpoint_id))
    }
}

/// Agent → Function RPC channel.
pub struct FunctionChannel;

impl FunctionChannel {
    pub fn client(
        participant: &Participant,
    ) -> Result<RpcClient<FunctionRequest, FunctionReply>, TransportError> {
        let req = participant.declare_topic(FUNCTION_REQUEST_TOPIC, TopicQos::rpc())?;
        let rep = participant.declare_topic(FUNCTION_REPLY_TOPIC, TopicQos::rpc())?;
        Ok(RpcClient::new(participant, &req, &rep))
    }

    pub fn server(
        participant: &Participant,
        own_endpoint_id: impl Into<String>,
    ) -> Result<RpcServer<FunctionRequest, FunctionReply>, TransportError> {
        let req = participant.declare_topic(FUNCTION_REQUEST_TOPIC, TopicQos::rpc())?;
        let rep = participant.declare_topic(FUNCTION_REPLY_TOPIC, TopicQos::rpc())?;
        Ok(RpcServer::new(participant, &req, &rep, own_endpoint_id))
    }
}
