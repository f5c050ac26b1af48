//! Primary/Specialist Agent role: composes independently-testable pieces
//! (transport, discovery, router, monitoring) around one runtime.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use genesis_discovery::Discovery;
use genesis_monitoring::MonitoringPublisher;
use genesis_router::{LocalTool, ReasoningModel, RouterError, ToolRouter};
use genesis_rpc::{AgentAgentChannel, InterfaceAgentChannel, RpcError};
use genesis_transport::Participant;
use genesis_types::rpc::status;
use genesis_types::{
    AgentAgentReply, AgentAgentRequest, AgentCapability, CapabilityEvent, EdgeType, GraphEdge, GraphNode,
    InterfaceAgentReply, InterfaceAgentRequest, NodeState, NodeType, Presence,
};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::error::AgentError;

/// An agent process: advertises itself on Discovery, publishes its node on
/// the topology stream, and answers either Interface↔Agent requests
/// (a primary agent) or Agent↔Agent requests (a specialist), driving its
/// [`ToolRouter`]'s bounded reasoning loop for each one.
pub struct Agent {
    participant: Participant,
    discovery: Arc<Discovery>,
    monitoring: Arc<MonitoringPublisher>,
    router: ToolRouter,
    model: Arc<dyn ReasoningModel>,
    capability: AgentCapability,
    node_type: NodeType,
    /// Set by [`Self::withdraw`]; `run_primary`/`run_specialist` reject any
    /// request received afterward with `status::SHUTTING_DOWN` instead of
    /// running it through the router.
    draining: Arc<AtomicBool>,
    /// Whether a request is currently being routed, so `withdraw` knows
    /// when it is safe to stop waiting.
    processing: Arc<AtomicBool>,
    drain_timeout: Duration,
    /// Only set for a primary agent: publishes a `Discovers` edge each time
    /// its Discovery cache gains or refreshes a capability.
    _discovers_task: Option<JoinHandle<()>>,
}

impl Agent {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        participant: Participant,
        capability: AgentCapability,
        node_type: NodeType,
        locals: Vec<Arc<dyn LocalTool>>,
        model: Arc<dyn ReasoningModel>,
        rpc_timeout: Duration,
        max_tool_rounds: u32,
        max_hops: u32,
        drain_timeout: Duration,
    ) -> Result<Self, AgentError> {
        let discovery = Arc::new(Discovery::new(&participant)?);
        let monitoring = Arc::new(MonitoringPublisher::new(&participant)?);
        let router = ToolRouter::new(
            &participant,
            discovery.clone(),
            monitoring.clone(),
            locals,
            participant.id,
            capability.service_endpoint.clone(),
            node_type,
            capability.display_name.clone(),
            rpc_timeout,
            max_tool_rounds,
            max_hops,
        )?;

        monitoring.publish_node(&GraphNode {
            node_id: capability.service_endpoint.clone(),
            node_type,
            display_name: capability.display_name.clone(),
            state: NodeState::Discovering,
            metadata: serde_json::json!({}),
        })?;
        discovery.announce_presence(&Presence {
            agent_id: capability.agent_id,
            display_name: capability.display_name.clone(),
            timestamp: Utc::now(),
        })?;
        discovery.advertise_agent(&capability)?;
        monitoring.publish_node(&GraphNode {
            node_id: capability.service_endpoint.clone(),
            node_type,
            display_name: capability.display_name.clone(),
            state: NodeState::Ready,
            metadata: serde_json::json!({}),
        })?;
        monitoring.emit_lifecycle(&capability.service_endpoint, NodeState::Ready)?;

        let discovers_task = (node_type == NodeType::PrimaryAgent)
            .then(|| spawn_discovers_task(discovery.clone(), monitoring.clone(), capability.service_endpoint.clone()));

        Ok(Self {
            participant,
            discovery,
            monitoring,
            router,
            model,
            capability,
            node_type,
            draining: Arc::new(AtomicBool::new(false)),
            processing: Arc::new(AtomicBool::new(false)),
            drain_timeout,
            _discovers_task: discovers_task,
        })
    }

    pub fn capability(&self) -> &AgentCapability {
        &self.capability
    }

    /// Serves Interface→Agent requests. This agent is acting
    /// as the primary entry point for an end-to-end chain: `hop_count`
    /// always starts at 0 here.
    pub async fn run_primary(self: Arc<Self>) -> Result<(), AgentError> {
        let mut server = InterfaceAgentChannel::server(&self.participant, self.capability.service_endpoint.clone())?;
        loop {
            let request = server.recv().await?;
            if self.draining.load(Ordering::Acquire) {
                server.reply(&InterfaceAgentReply {
                    correlation_id: request.correlation_id,
                    status: status::SHUTTING_DOWN,
                    message: String::new(),
                    error_message: Some("agent is draining".to_string()),
                })?;
                continue;
            }
            self.processing.store(true, Ordering::Release);
            let reply = self.handle_interface_request(request).await;
            self.processing.store(false, Ordering::Release);
            server.reply(&reply)?;
        }
    }

    /// Serves Agent→Agent requests: this agent is a
    /// specialist another agent delegates to.
    pub async fn run_specialist(self: Arc<Self>) -> Result<(), AgentError> {
        let mut server = AgentAgentChannel::server(&self.participant, self.capability.service_endpoint.clone())?;
        loop {
            let request = server.recv().await?;
            if self.draining.load(Ordering::Acquire) {
                server.reply(&AgentAgentReply {
                    correlation_id: request.correlation_id,
                    status: status::SHUTTING_DOWN,
                    message: String::new(),
                    error_message: Some("agent is draining".to_string()),
                })?;
                continue;
            }
            self.processing.store(true, Ordering::Release);
            let reply = self.handle_agent_request(request).await;
            self.processing.store(false, Ordering::Release);
            server.reply(&reply)?;
        }
    }

    async fn handle_interface_request(&self, request: InterfaceAgentRequest) -> InterfaceAgentReply {
        let chain_id = Uuid::new_v4();
        let call_id = Uuid::new_v4();
        let source = "interface";
        let target = &self.capability.service_endpoint;

        let _ = self.monitoring.emit_chain_start(chain_id, call_id, source, target);
        let result = self
            .router
            .run(self.model.as_ref(), request.conversation_id.clone(), chain_id, 0, &request.message)
            .await;

        match result {
            Ok(message) => {
                let _ = self
                    .monitoring
                    .emit_chain_complete(chain_id, call_id, call_id, source, target, status::OK);
                InterfaceAgentReply {
                    correlation_id: request.correlation_id,
                    status: status::OK,
                    message,
                    error_message: None,
                }
            }
            Err(e) => {
                let code = status_for_router_error(&e);
                let _ = self
                    .monitoring
                    .emit_chain_error(chain_id, call_id, call_id, source, target, code);
                InterfaceAgentReply {
                    correlation_id: request.correlation_id,
                    status: code,
                    message: String::new(),
                    error_message: Some(error_message_for(code, &e)),
                }
            }
        }
    }

    async fn handle_agent_request(&self, request: AgentAgentRequest) -> AgentAgentReply {
        let source = "agent";
        let target = &self.capability.service_endpoint;
        let call_id = request.parent_call_id;

        let _ = self
            .monitoring
            .emit_chain_start(request.chain_id, call_id, source, target);
        let result = self
            .router
            .run(
                self.model.as_ref(),
                request.conversation_id.clone(),
                request.chain_id,
                request.hop_count,
                &request.message,
            )
                .await;

        match result {
            Ok(message) => {
                let _ = self.monitoring.emit_chain_complete(
                    request.chain_id,
                    call_id,
                    call_id,
                    source,
                    target,
                    status::OK,
                );
                AgentAgentReply {
                    correlation_id: request.correlation_id,
                    status: status::OK,
                    message,
                    error_message: None,
                }
            }
            Err(e) => {
                let code = status_for_router_error(&e);
                let _ = self
                    .monitoring
                    .emit_chain_error(request.chain_id, call_id, call_id, source, target, code);
                AgentAgentReply {
                    correlation_id: request.correlation_id,
                    status: code,
                    message: String::new(),
                    error_message: Some(error_message_for(code, &e)),
                }
            }
        }
    }

    /// Graceful shutdown: stops accepting new requests, waits up to
    /// `drain_timeout` for a request already in flight to finish, then
    /// withdraws this agent's capability and presence and marks its node
    /// `Departed`.
    pub async fn withdraw(&self) -> Result<(), AgentError> {
        self.draining.store(true, Ordering::Release);
        let deadline = tokio::time::Instant::now() + self.drain_timeout;
        while self.processing.load(Ordering::Acquire) && tokio::time::Instant::now() < deadline {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        self.discovery.withdraw_agent(&self.capability.agent_id)?;
        self.monitoring.publish_node(&GraphNode {
            node_id: self.capability.service_endpoint.clone(),
            node_type: self.node_type,
            display_name: self.capability.display_name.clone(),
            state: NodeState::Departed,
            metadata: serde_json::json!({}),
        })?;
        self.monitoring
            .emit_lifecycle(&self.capability.service_endpoint, NodeState::Departed)?;
        self.monitoring.retire_element(&self.capability.service_endpoint)?;
        Ok(())
    }
}

/// Publishes a `Discovers` edge from `own_endpoint` every time the Discovery
/// cache gains or refreshes an agent or function capability. Runs for the
/// lifetime of the `Agent`; exits once both capability channels close.
fn spawn_discovers_task(
    discovery: Arc<Discovery>,
    monitoring: Arc<MonitoringPublisher>,
    own_endpoint: String,
) -> JoinHandle<()> {
    use tokio::sync::broadcast::error::RecvError;

    let mut agents = discovery.subscribe_agents();
    let mut functions = discovery.subscribe_functions();
    tokio::spawn(async move {
        loop {
            tokio::select! {
                res = agents.recv() => {
                    match res {
                        Ok(CapabilityEvent::Added(c)) | Ok(CapabilityEvent::Updated(c)) => {
                            let _ = monitoring.publish_edge(&GraphEdge {
                                source_id: own_endpoint.clone(),
                                target_id: c.service_endpoint.clone(),
                                edge_type: EdgeType::Discovers,
                                metadata: serde_json::json!({}),
                            });
                        }
                        Ok(CapabilityEvent::Removed(_)) => {}
                        Err(RecvError::Lagged(skipped)) => {
                            tracing::warn!(skipped, "discovers-edge task lagged behind agent capability events");
                        }
                        Err(RecvError::Closed) => return,
                    }
                }
                res = functions.recv() => {
                    match res {
                        Ok(CapabilityEvent::Added(c)) | Ok(CapabilityEvent::Updated(c)) => {
                            let _ = monitoring.publish_edge(&GraphEdge {
                                source_id: own_endpoint.clone(),
                                target_id: c.function_id.clone(),
                                edge_type: EdgeType::Discovers,
                                metadata: serde_json::json!({}),
                            });
                        }
                        Ok(CapabilityEvent::Removed(_)) => {}
                        Err(RecvError::Lagged(skipped)) => {
                            tracing::warn!(skipped, "discovers-edge task lagged behind function capability events");
                        }
                        Err(RecvError::Closed) => return,
                    }
                }
            }
        }
    })
}

/// Maps a router failure onto the reply status taxonomy.
fn status_for_router_error(e: &RouterError) -> i32 {
    match e {
        RouterError::ToolLoopExceeded(_) => status::TOOL_LOOP_EXCEEDED,
        RouterError::Rpc(RpcError::MaxHopsExceeded) => status::MAX_HOPS_EXCEEDED,
        RouterError::Rpc(RpcError::RpcNoProvider) => status::NO_PROVIDER,
        _ => status::BUSINESS_ERROR,
    }
}

/// `error_message` carries the canonical status name alongside the router's
/// own message, so a caller can match on it directly  instead of
/// parsing a human-readable sentence.
fn error_message_for(code: i32, e: &RouterError) -> String {
    let name = match code {
        status::TOOL_LOOP_EXCEEDED => "ToolLoopExceeded",
        status::MAX_HOPS_EXCEEDED => "MaxHopsExceeded",
        status::NO_PROVIDER => "NoProvider",
        _ => "BusinessError",
    };
    format!("{name}: {e}")
}
