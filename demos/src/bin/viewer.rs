//! Topology viewer demo: a pure observer that prints the live node/edge/open
//! chain set every second.

use std::time::Duration;

use clap::Parser;
use demos::{bridge, init_logging, DEFAULT_DOMAIN_ID};
use genesis_monitoring::{GraphState, GraphSubscriber};
use genesis_transport::create_participant;
use genesis_types::Role;

#[derive(Parser, Debug)]
#[command(name = "viewer", about = "Print the live GENESIS topology")]
struct Args {
    #[arg(long, default_value_t = DEFAULT_DOMAIN_ID)]
    domain_id: u32,

    #[arg(long, value_name = "HOST:PORT")]
    peer: Option<String>,

    #[arg(long, default_value_t = 1)]
    refresh_secs: u64,

    #[arg(long, default_value_t = 60)]
    chain_stale_secs: u64,

    #[arg(long, default_value_t = 30)]
    edge_orphan_grace_secs: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();
    let args = Args::parse();

    let participant = create_participant(args.domain_id, "viewer", Role::Viewer)?;
    if let Some(addr) = &args.peer {
        bridge::bridge_connect(&participant, addr);
    }

    let state = GraphState::new(
        Duration::from_secs(args.chain_stale_secs),
        Duration::from_secs(args.edge_orphan_grace_secs),
    );
    let subscriber = GraphSubscriber::new(&participant, state)?;

    let mut interval = tokio::time::interval(Duration::from_secs(args.refresh_secs));
    loop {
        interval.tick().await;
        subscriber.with_state(|state| {
            println!("--- nodes ---");
            for node in state.nodes() {
                println!("{:?}\t{}\t{:?}", node.node_type, node.node_id, node.state);
            }
            println!("--- edges ---");
            for edge in state.edges() {
                println!("{} -> {}\t{:?}", edge.source_id, edge.target_id, edge.edge_type);
            }
            println!("--- open chains ---");
            for chain in state.open_chains() {
                println!("{} -> {} (chain {})", chain.source_id, chain.target_id, chain.chain_id);
            }
        });
    }
}
