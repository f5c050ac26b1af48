//! Function/Service role: advertises one or more named functions and
//! answers Agent→Function RPC calls for them.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use genesis_discovery::Discovery;
use genesis_monitoring::MonitoringPublisher;
use genesis_rpc::{FunctionChannel, RpcServer};
use genesis_transport::Participant;
use genesis_types::rpc::status;
use genesis_types::{
    EdgeType, FunctionCapability, FunctionReply, FunctionRequest, GraphEdge, GraphNode, NodeState, NodeType,
};
use serde_json::Value;

use crate::error::AgentError;

/// A single function this service exposes. `handler` is synchronous and
/// infallible-in-shape: business failures are reported as `Err(message)`,
/// which becomes a reply with a non-zero status rather than an RPC error.
pub struct FunctionDef {
    pub function_id: String,
    pub name: String,
    pub description: String,
    pub parameter_schema: Value,
    pub handler: Arc<dyn Fn(Value) -> Result<Value, String> + Send + Sync>,
}

/// Hosts a fixed set of [`FunctionDef`]s behind one `service_endpoint`,
/// answering broadcast or instance-targeted Agent→Function requests.
pub struct FunctionService {
    discovery: Discovery,
    monitoring: MonitoringPublisher,
    server: RpcServer<FunctionRequest, FunctionReply>,
    functions: HashMap<String, FunctionDef>,
    service_endpoint: String,
    draining: Arc<AtomicBool>,
    processing: Arc<AtomicBool>,
    drain_timeout: Duration,
}

impl FunctionService {
    pub fn new(
        participant: &Participant,
        service_endpoint: impl Into<String>,
        functions: Vec<FunctionDef>,
        drain_timeout: Duration,
    ) -> Result<Self, AgentError> {
        let service_endpoint = service_endpoint.into();
        let discovery = Discovery::new(participant)?;
        let monitoring = MonitoringPublisher::new(participant)?;
        let server = FunctionChannel::server(participant, service_endpoint.clone())?;

        monitoring.publish_node(&GraphNode {
            node_id: service_endpoint.clone(),
            node_type: NodeType::Service,
            display_name: service_endpoint.clone(),
            state: NodeState::Ready,
            metadata: serde_json::json!({}),
        })?;

        let mut map = HashMap::with_capacity(functions.len());
        for def in functions {
            discovery.advertise_function(&FunctionCapability {
                function_id: def.function_id.clone(),
                name: def.name.clone(),
                description: def.description.clone(),
                parameter_schema: def.parameter_schema.clone(),
                provider_service_id: participant.id,
                service_endpoint: service_endpoint.clone(),
            })?;
            monitoring.publish_edge(&GraphEdge {
                source_id: service_endpoint.clone(),
                target_id: def.function_id.clone(),
                edge_type: EdgeType::HostsFunction,
                metadata: serde_json::json!({}),
            })?;
            map.insert(def.function_id.clone(), def);
        }

        Ok(Self {
            discovery,
            monitoring,
            server,
            functions: map,
            service_endpoint,
            draining: Arc::new(AtomicBool::new(false)),
            processing: Arc::new(AtomicBool::new(false)),
            drain_timeout,
        })
    }

    /// Serves requests until the process is torn down. Never returns `Ok`;
    /// an `Err` means the request reader itself failed (transport shutdown).
    pub async fn run(mut self) -> Result<(), AgentError> {
        loop {
            let request = self.server.recv().await?;
            if self.draining.load(Ordering::Acquire) {
                self.server.reply(&FunctionReply {
                    correlation_id: request.correlation_id,
                    status: status::SHUTTING_DOWN,
                    result_json: None,
                    error_message: Some("service is draining".to_string()),
                })?;
                continue;
            }
            self.processing.store(true, Ordering::Release);
            let reply = self.handle(request);
            self.processing.store(false, Ordering::Release);
            self.server.reply(&reply)?;
        }
    }

    fn handle(&self, request: FunctionRequest) -> FunctionReply {
        let Some(def) = self.functions.get(&request.function_name) else {
            return FunctionReply {
                correlation_id: request.correlation_id,
                status: status::NO_PROVIDER,
                result_json: None,
                error_message: Some(format!("no such function: {}", request.function_name)),
            };
        };
        let arguments: Value = match serde_json::from_str(&request.arguments_json) {
            Ok(v) => v,
            Err(e) => {
                return FunctionReply {
                    correlation_id: request.correlation_id,
                    status: status::BUSINESS_ERROR,
                    result_json: None,
                    error_message: Some(format!("invalid arguments_json: {e}")),
                }
            }
        };
        match (def.handler)(arguments) {
            Ok(result) => FunctionReply {
                correlation_id: request.correlation_id,
                status: status::OK,
                result_json: Some(result.to_string()),
                error_message: None,
            },
            Err(message) => FunctionReply {
                correlation_id: request.correlation_id,
                status: status::BUSINESS_ERROR,
                result_json: None,
                error_message: Some(message),
            },
        }
    }

    /// Graceful shutdown: stops accepting new requests, waits up to
    /// `drain_timeout` for a request already in flight to finish, then
    /// withdraws every function and retires this service's node.
    pub async fn withdraw(&self) -> Result<(), AgentError> {
        self.draining.store(true, Ordering::Release);
        let deadline = tokio::time::Instant::now() + self.drain_timeout;
        while self.processing.load(Ordering::Acquire) && tokio::time::Instant::now() < deadline {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        for function_id in self.functions.keys() {
            self.discovery.withdraw_function(function_id)?;
        }
        self.monitoring.retire_element(&self.service_endpoint)?;
        Ok(())
    }
}
