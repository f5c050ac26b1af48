//! Interface demo: sends one message to a primary agent and prints its
//! reply.

use std::time::Duration;

use clap::Parser;
use demos::{bridge, init_logging, DEFAULT_DOMAIN_ID};
use genesis_agent::InterfaceClient;
use genesis_transport::create_participant;
use genesis_types::Role;

#[derive(Parser, Debug)]
#[command(name = "interface", about = "Send one message to a primary agent and print its reply")]
struct Args {
    #[arg(long, default_value_t = DEFAULT_DOMAIN_ID)]
    domain_id: u32,

    /// Target primary agent's service endpoint; empty string broadcasts to any.
    #[arg(long, default_value = "primary-1")]
    target: String,

    /// The message to send.
    message: String,

    #[arg(long, value_name = "HOST:PORT")]
    peer: Option<String>,

    #[arg(long, default_value_t = 10)]
    timeout_secs: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();
    let args = Args::parse();

    let participant = create_participant(args.domain_id, "interface", Role::Interface)?;
    if let Some(addr) = &args.peer {
        bridge::bridge_connect(&participant, addr);
        // Give the bridge a moment to pull in the target's discovery/topology
        // records before sending; the request itself does not depend on
        // discovery, but a bare-metal bridge connection needs to finish its
        // WebSocket handshake first.
        tokio::time::sleep(Duration::from_millis(200)).await;
    }

    let client = InterfaceClient::new(&participant)?;
    let reply = client
        .send(&args.target, args.message.clone(), None, Duration::from_secs(args.timeout_secs))
        .await?;

    if reply.status == 0 {
        println!("{}", reply.message);
    } else {
        eprintln!(
            "error (status {}): {}",
            reply.status,
            reply.error_message.unwrap_or_default()
        );
        std::process::exit(1);
    }
    Ok(())
}
