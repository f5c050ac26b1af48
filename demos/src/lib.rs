//! Shared wiring for the `demos` binaries: console logging and the
//! cross-process socket bridge.
//!
//! Each binary is a separate OS process, so a shared `domain_id` alone does
//! not connect them: `genesis-transport`'s bus lives in one process's
//! memory. [`bridge_listen`]/[`bridge_connect`] mirror every well-known
//! GENESIS topic over `genesis_transport::socket`, one TCP port per topic,
//! so that running one binary with `--listen` and the rest with
//! `--peer <that address>` reconstructs a single shared domain across
//! processes.

pub mod bridge;
pub mod reasoning;

use tracing_subscriber::EnvFilter;

pub const DEFAULT_DOMAIN_ID: u32 = 4242;

/// Console logging for a demo process: plain `tracing_subscriber::fmt` to
/// stderr, unlike `cli`'s file-or-sink logging, since a demo's whole point
/// is to be watched run.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
