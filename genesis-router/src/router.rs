//! The Unified Tool Router's bounded reasoning loop.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use genesis_rpc::{next_hop, wait_for_service, AgentAgentChannel, FunctionChannel, RpcClient, RpcError};
use genesis_transport::Participant;
use genesis_types::rpc::status;
use genesis_types::{
    AgentAgentReply, AgentAgentRequest, EdgeType, FunctionReply, FunctionRequest, GraphEdge,
    GraphNode, NodeState, NodeType, ParticipantId, ToolBinding, ToolSchema, ToolTarget,
};
use uuid::Uuid;

use crate::binding::build_bindings;
use crate::error::RouterError;
use crate::local::LocalTool;
use crate::reasoning::{Message, ReasoningModel, ReasoningStep, ToolCall};

/// Composes Discovery's current snapshot with the agent's own local methods,
/// dispatches tool calls to the right channel, and runs the bounded
/// reasoning loop.
pub struct ToolRouter {
    discovery: Arc<genesis_discovery::Discovery>,
    monitoring: Arc<genesis_monitoring::MonitoringPublisher>,
    locals: Vec<Arc<dyn LocalTool>>,
    function_client: RpcClient<FunctionRequest, FunctionReply>,
    agent_client: RpcClient<AgentAgentRequest, AgentAgentReply>,
    own_agent_id: ParticipantId,
    own_endpoint_id: String,
    own_node_type: NodeType,
    own_display_name: String,
    rpc_timeout: Duration,
    max_tool_rounds: u32,
    max_hops: u32,
}

impl ToolRouter {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        participant: &Participant,
        discovery: Arc<genesis_discovery::Discovery>,
        monitoring: Arc<genesis_monitoring::MonitoringPublisher>,
        locals: Vec<Arc<dyn LocalTool>>,
        own_agent_id: ParticipantId,
        own_endpoint_id: impl Into<String>,
        own_node_type: NodeType,
        own_display_name: impl Into<String>,
        rpc_timeout: Duration,
        max_tool_rounds: u32,
        max_hops: u32,
    ) -> Result<Self, RouterError> {
        Ok(Self {
            discovery,
            monitoring,
            locals,
            function_client: FunctionChannel::client(participant)?,
            agent_client: AgentAgentChannel::client(participant)?,
            own_agent_id,
            own_endpoint_id: own_endpoint_id.into(),
            own_node_type,
            own_display_name: own_display_name.into(),
            rpc_timeout,
            max_tool_rounds,
            max_hops,
        })
    }

    /// Publishes this node's Busy/Ready pairing: `Busy` while a round's
    /// outgoing calls are in flight, `Ready` once they all close. Errors are
    /// swallowed like every other monitoring publish in this router: a
    /// dropped topology sample must never fail the call it describes.
    fn set_node_state(&self, state: NodeState) {
        let _ = self.monitoring.publish_node(&GraphNode {
            node_id: self.own_endpoint_id.clone(),
            node_type: self.own_node_type,
            display_name: self.own_display_name.clone(),
            state,
            metadata: serde_json::json!({}),
        });
    }

    /// Runs the bounded reasoning loop for one inbound request.
    /// `chain_id` is the end-to-end chain this
    /// request belongs to; every tool call emits a matching Start/Complete
    /// (or Error) chain event pair under it. `hop_count` is how many
    /// agent-to-agent hops already led to this invocation (0 for a request
    /// originating at the interface); it is threaded into any further
    /// agent delegation so `max_hops` bounds the whole chain, not just one
    /// hop.
    pub async fn run(
        &self,
        model: &dyn ReasoningModel,
        conversation_id: Option<String>,
        chain_id: Uuid,
        hop_count: u32,
        initial_message: &str,
    ) -> Result<String, RouterError> {
        let mut messages = vec![Message::user(initial_message)];

        for _round in 0..self.max_tool_rounds {
            let functions = self.discovery.functions();
            let agents: Vec<_> = self
                .discovery
                .agents()
                .into_iter()
                .filter(|a| a.agent_id != self.own_agent_id)
                .collect();
            let bindings = build_bindings(&functions, &agents, &self.locals);
            let schemas: Vec<ToolSchema> = bindings.values().map(|b| b.schema.clone()).collect();

            match model.next_step(&messages, &schemas).await? {
                ReasoningStep::FinalAnswer(answer) => return Ok(answer),
                ReasoningStep::ToolCalls(calls) if calls.is_empty() => continue,
                ReasoningStep::ToolCalls(calls) => {
                    let outcomes = self
                        .dispatch_round(&bindings, calls, conversation_id.clone(), chain_id, hop_count)
                        .await;
                    for (name, outcome) in outcomes {
                        let text = match outcome {
                            Ok(result) => result,
                            Err(e) => format!("error calling {name}: {e}"),
                        };
                        messages.push(Message::tool_result(text));
                    }
                }
            }
        }

        Err(RouterError::ToolLoopExceeded(self.max_tool_rounds))
    }

    /// Dispatches every tool call from one round concurrently.
    async fn dispatch_round(
        &self,
        bindings: &HashMap<String, ToolBinding>,
        calls: Vec<ToolCall>,
        conversation_id: Option<String>,
        chain_id: Uuid,
        hop_count: u32,
    ) -> Vec<(String, Result<String, RouterError>)> {
        if calls.is_empty() {
            return Vec::new();
        }
        self.set_node_state(NodeState::Busy);

        let futures = calls.into_iter().map(|call| {
            let conversation_id = conversation_id.clone();
            match bindings.get(&call.name).cloned() {
                Some(binding) => {
                    Either::Dispatch(self.dispatch_one(binding, call, conversation_id, chain_id, hop_count))
                }
                None => Either::Unknown(call.name),
            }
        });
        let results = join_all(futures.map(|e| async move {
            match e {
                Either::Dispatch(fut) => fut.await,
                Either::Unknown(name) => (name.clone(), Err(RouterError::UnknownTool(name))),
            }
        }))
            .await;

        self.set_node_state(NodeState::Ready);
        results
    }

    /// Dispatches one call and emits its Start/Complete/Error chain event
    /// pair.
    async fn dispatch_one(
        &self,
        binding: ToolBinding,
        call: ToolCall,
        conversation_id: Option<String>,
        chain_id: Uuid,
        hop_count: u32,
    ) -> (String, Result<String, RouterError>) {
        let name = binding.name.clone();
        let call_id = call.call_id;
        let target_id = target_endpoint(&binding.target, &self.own_endpoint_id);

        let _ = self
            .monitoring
            .emit_chain_start(chain_id, call_id, &self.own_endpoint_id, &target_id);

        let outcome = match &binding.target {
            ToolTarget::Function { function_id, service_endpoint, .. } => {
                if wait_for_service(|| self.discovery.functions().iter().any(|f| &f.function_id == function_id), Duration::ZERO)
                    .await
                    .is_err()
                {
                    Err(RpcError::RpcNoProvider.into())
                } else {
                    call_function(&self.function_client, function_id, service_endpoint, &call, self.rpc_timeout).await
                }
            }
            ToolTarget::Agent { service_endpoint, .. } => {
                if wait_for_service(|| self.discovery.agents().iter().any(|a| &a.service_endpoint == service_endpoint), Duration::ZERO)
                    .await
                    .is_err()
                {
                    Err(RpcError::RpcNoProvider.into())
                } else {
                    let _ = self.monitoring.publish_edge(&GraphEdge {
                        source_id: self.own_endpoint_id.clone(),
                        target_id: service_endpoint.clone(),
                        edge_type: EdgeType::RpcRequest,
                        metadata: serde_json::json!({}),
                    });
                    call_agent(
                        &self.agent_client,
                        service_endpoint,
                        &call,
                        conversation_id,
                        chain_id,
                        hop_count,
                        self.max_hops,
                        self.rpc_timeout,
                    )
                        .await
                }
            }
            ToolTarget::Local { tool_name } => call_local(&self.locals, tool_name, &call).await,
        };

        match &outcome {
            Ok(_) => {
                let _ = self.monitoring.emit_chain_complete(
                    chain_id,
                    call_id,
                    call_id,
                    &self.own_endpoint_id,
                    &target_id,
                    status::OK,
                );
            }
            Err(e) => {
                let code = match e {
                    RouterError::Rpc(RpcError::RpcNoProvider) => status::NO_PROVIDER,
                    RouterError::Rpc(RpcError::MaxHopsExceeded) => status::MAX_HOPS_EXCEEDED,
                    _ => status::BUSINESS_ERROR,
                };
                let _ = self.monitoring.emit_chain_error(
                    chain_id,
                    call_id,
                    call_id,
                    &self.own_endpoint_id,
                    &target_id,
                    code,
                );
            }
        }
        (name, outcome)
    }
}

/// Distinguishes a resolvable binding from a name the LLM hallucinated;
/// keeps [`ToolRouter::dispatch_round`]'s `join_all` call monomorphic over
/// one future type.
enum Either<F> {
    Dispatch(F),
    Unknown(String),
}

fn target_endpoint(target: &ToolTarget, own_endpoint_id: &str) -> String {
    match target {
        ToolTarget::Function { service_endpoint, .. } => service_endpoint.clone(),
        ToolTarget::Agent { service_endpoint, .. } => service_endpoint.clone(),
        ToolTarget::Local { .. } => own_endpoint_id.to_string(),
    }
}

async fn call_function(
    client: &RpcClient<FunctionRequest, FunctionReply>,
    function_id: &str,
    service_endpoint: &str,
    call: &ToolCall,
    timeout: Duration,
) -> Result<String, RouterError> {
    let request = FunctionRequest {
        correlation_id: Uuid::new_v4(),
        target_endpoint_id: service_endpoint.to_string(),
        function_name: function_id.to_string(),
        arguments_json: call.arguments.to_string(),
    };
    let reply = client
        .call(service_endpoint, request.correlation_id, &request, timeout)
        .await?;
    if reply.status == status::OK {
        Ok(reply.result_json.unwrap_or_default())
    } else {
        Err(RpcError::RpcBusinessError {
            code: reply.status,
            message: reply.error_message.unwrap_or_default(),
        }
            .into())
    }
}

async fn call_agent(
    client: &RpcClient<AgentAgentRequest, AgentAgentReply>,
    service_endpoint: &str,
    call: &ToolCall,
    conversation_id: Option<String>,
    chain_id: Uuid,
    hop_count: u32,
    max_hops: u32,
    timeout: Duration,
) -> Result<String, RouterError> {
    let message = call
        .arguments
        .get("message")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();
    let mut request = AgentAgentRequest {
        correlation_id: Uuid::new_v4(),
        target_endpoint_id: service_endpoint.to_string(),
        conversation_id,
        message,
        chain_id,
        parent_call_id: call.call_id,
        hop_count,
    };
    request.hop_count = next_hop(&request, max_hops)?;
    let reply = client
        .call(service_endpoint, request.correlation_id, &request, timeout)
        .await?;
    if reply.status == status::OK {
        Ok(reply.message)
    } else {
        Err(RpcError::RpcBusinessError {
            code: reply.status,
            message: reply.error_message.unwrap_or(reply.message),
        }
            .into())
    }
}

async fn call_local(
    locals: &[Arc<dyn LocalTool>],
    tool_name: &str,
    call: &ToolCall,
) -> Result<String, RouterError> {
    let tool = locals
        .iter()
        .find(|t| t.name() == tool_name)
        .ok_or_else(|| RouterError::UnknownTool(tool_name.to_string()))?;
    tool.call(call.arguments.clone()).await
}
