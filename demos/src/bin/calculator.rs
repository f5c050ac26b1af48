//! Function service demo: advertises `add` and `multiply`, answers
//! Agent→Function RPC calls for them.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use demos::{bridge, init_logging, DEFAULT_DOMAIN_ID};
use genesis_agent::{FunctionDef, FunctionService};
use genesis_transport::create_participant;
use genesis_types::Role;
use serde_json::json;

#[derive(Parser, Debug)]
#[command(name = "calculator", about = "Function service exposing add/multiply")]
struct Args {
    #[arg(long, default_value_t = DEFAULT_DOMAIN_ID)]
    domain_id: u32,

    /// Service endpoint ID this instance advertises under.
    #[arg(long, default_value = "calc-1")]
    endpoint: String,

    /// Start a bridge server at this address for other demo processes to join.
    #[arg(long, value_name = "HOST:PORT")]
    listen: Option<String>,

    /// Join a bridge server started elsewhere with `--listen`.
    #[arg(long, value_name = "HOST:PORT")]
    peer: Option<String>,

    #[arg(long, default_value_t = 5)]
    drain_timeout_secs: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();
    let args = Args::parse();

    let participant = create_participant(args.domain_id, &args.endpoint, Role::Service)?;
    if let Some(addr) = &args.listen {
        bridge::bridge_listen(&participant, addr);
    }
    if let Some(addr) = &args.peer {
        bridge::bridge_connect(&participant, addr);
    }

    let functions = vec![
        FunctionDef {
            function_id: format!("{}-add", args.endpoint),
            name: "add".to_string(),
            description: "adds two integers".to_string(),
            parameter_schema: json!({
                "type": "object",
                "properties": { "a": {"type": "integer"}, "b": {"type": "integer"} },
                "required": ["a", "b"],
            }),
            handler: Arc::new(|arguments: serde_json::Value| {
                let a = arguments.get("a").and_then(|v| v.as_i64()).ok_or("missing a")?;
                let b = arguments.get("b").and_then(|v| v.as_i64()).ok_or("missing b")?;
                Ok(json!(a + b))
            }),
        },
        FunctionDef {
            function_id: format!("{}-multiply", args.endpoint),
            name: "multiply".to_string(),
            description: "multiplies two integers".to_string(),
            parameter_schema: json!({
                "type": "object",
                "properties": { "a": {"type": "integer"}, "b": {"type": "integer"} },
                "required": ["a", "b"],
            }),
            handler: Arc::new(|arguments: serde_json::Value| {
                let a = arguments.get("a").and_then(|v| v.as_i64()).ok_or("missing a")?;
                let b = arguments.get("b").and_then(|v| v.as_i64()).ok_or("missing b")?;
                Ok(json!(a * b))
            }),
        },
    ];

    let service = FunctionService::new(
        &participant,
        args.endpoint.clone(),
        functions,
        Duration::from_secs(args.drain_timeout_secs),
    )?;
    tracing::info!(endpoint = %args.endpoint, domain_id = args.domain_id, "calculator function service ready");
    service.run().await?;
    Ok(())
}
