//! Specialist agent demo: answers Agent→Agent delegations under the
//! "weather" specialization.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use clap::Parser;
use demos::{bridge, init_logging, DEFAULT_DOMAIN_ID};
use genesis_agent::Agent;
use genesis_router::{Message, ReasoningModel, ReasoningStep, RouterError};
use genesis_transport::create_participant;
use genesis_types::{AgentCapability, AgentKind, NodeType, Role, ToolSchema};
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "weather", about = "Specialist agent answering weather questions")]
struct Args {
    #[arg(long, default_value_t = DEFAULT_DOMAIN_ID)]
    domain_id: u32,

    #[arg(long, default_value = "weather-svc")]
    endpoint: String,

    #[arg(long, default_value = "Weatherbot")]
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

/// Answers immediately with a canned forecast for whatever city name
/// appears in the delegated message; no further tool calls are ever issued.
struct CannedWeatherModel;

#[async_trait]
impl ReasoningModel for CannedWeatherModel {
    async fn next_step(&self, messages: &[Message], _tools: &[ToolSchema]) -> Result<ReasoningStep, RouterError> {
        let question = messages.first().map(|m| m.content.as_str()).unwrap_or_default();
        let city = question
            .split_whitespace()
            .last()
            .unwrap_or("your area")
            .trim_matches(|c: char| !c.is_alphanumeric());
        Ok(ReasoningStep::FinalAnswer(format!(
            "{city} is currently sunny and 21C"
        )))
    }
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
        agent_type: AgentKind::Specialist,
        specializations: vec!["weather".to_string()],
        capability_tags: vec![],
        classification_tags: vec![],
        default_capable: false,
        model_info: None,
        performance_metrics: None,
    };

    let agent = Arc::new(Agent::new(
        participant,
        capability,
        NodeType::SpecialistAgent,
        vec![],
        Arc::new(CannedWeatherModel),
        Duration::from_secs(args.rpc_timeout_secs),
        args.max_tool_rounds,
        args.max_hops,
        Duration::from_secs(args.drain_timeout_secs),
    )?);
    tracing::info!(endpoint = %args.endpoint, domain_id = args.domain_id, "weather specialist ready");
    agent.run_specialist().await?;
    Ok(())
}
