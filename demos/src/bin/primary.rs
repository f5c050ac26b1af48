//! Primary agent demo: serves Interface→Agent requests, delegating to
//! whichever Function/Agent tool the request seems to call for.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use demos::reasoning::KeywordReasoningModel;
use demos::{bridge, init_logging, DEFAULT_DOMAIN_ID};
use genesis_agent::Agent;
use genesis_transport::create_participant;
use genesis_types::{AgentCapability, AgentKind, NodeType, Role};
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "primary", about = "Primary agent routing requests to functions and specialists")]
struct Args {
    #[arg(long, default_value_t = DEFAULT_DOMAIN_ID)]
    domain_id: u32,

    #[arg(long, default_value = "primary-1")]
    endpoint: String,

    #[arg(long, default_value = "Primary")]
    display_name: String,

    #[arg(long, value_name = "HOST:PORT")]
    listen: Option<String>,

    #[arg(long, value_name = "HOST:PORT")]
    peer: Option<String>,

    #[arg(long, default_value_t = 10)]
    rpc_timeout_secs: u64,

    #[arg(long, default_value_t = 4)]
    max_tool_rounds: u32,

    #[arg(long, default_value_t = 4)]
    max_hops: u32,

    #[arg(long, default_value_t = 5)]
    drain_timeout_secs: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();
    let args = Args::parse();

    let participant = create_participant(args.domain_id, &args.endpoint, Role::Agent)?;
    if let Some(addr) = &args.listen {
        bridge::bridge_listen(&participant, addr);
    }
    if let Some(addr) = &args.peer {
        bridge::bridge_connect(&participant, addr);
    }

    let capability = AgentCapability {
        agent_id: Uuid::new_v4(),
        service_endpoint: args.endpoint.clone(),
        display_name: args.display_name.clone(),
        agent_type: AgentKind::General,
        specializations: vec![],
        capability_tags: vec![],
        classification_tags: vec![],
        default_capable: true,
        model_info: None,
        performance_metrics: None,
    };

    let agent = Arc::new(Agent::new(
        participant,
        capability,
        NodeType::PrimaryAgent,
        vec![],
        Arc::new(KeywordReasoningModel),
        Duration::from_secs(args.rpc_timeout_secs),
        args.max_tool_rounds,
        args.max_hops,
        Duration::from_secs(args.drain_timeout_secs),
    )?);
    tracing::info!(endpoint = %args.endpoint, domain_id = args.domain_id, "primary agent ready");
    agent.run_primary().await?;
    Ok(())
}
