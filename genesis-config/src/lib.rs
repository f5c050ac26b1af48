//! Configuration loading: domain id,
//! RPC/router timeouts and bounds, and monitoring grace periods, assembled
//! from (in increasing priority) built-in defaults, an optional
//! `genesis.toml`, a project `.env`, and the process environment.
//!
//! [`dotenv`] parses a project `.env` file without overwriting anything
//! already set; `load` applies the same "apply only what's missing"
//! precedence but returns a typed [`GenesisConfig`] instead of mutating
//! `std::env`, since GENESIS's keys are a small fixed set
//! rather than an arbitrary passthrough table.

mod dotenv;

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read.env: {0}")]
    DotenvRead(std::io::Error),
    #[error("read genesis.toml: {0}")]
    TomlRead(std::io::Error),
    #[error("parse genesis.toml: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("legacy per-instance RPC topic naming is not supported; use unified naming")]
    LegacyNamingUnsupported,
}

/// Runtime configuration for one GENESIS participant process.
#[derive(Clone, Debug, PartialEq)]
pub struct GenesisConfig {
    pub domain_id: u32,
    pub rpc_timeout: Duration,
    pub max_tool_rounds: u32,
    pub max_hops: u32,
    pub chain_stale_timeout: Duration,
    pub edge_orphan_grace: Duration,
    pub drain_timeout: Duration,
}

impl Default for GenesisConfig {
    fn default() -> Self {
        Self {
            domain_id: 0,
            rpc_timeout: Duration::from_secs(10),
            max_tool_rounds: 8,
            max_hops: 6,
            chain_stale_timeout: Duration::from_secs(60),
            edge_orphan_grace: Duration::from_secs(30),
            drain_timeout: Duration::from_secs(5),
        }
    }
}

#[derive(Default, Deserialize)]
struct TomlFile {
    domain_id: Option<u32>,
    rpc_timeout_ms: Option<u64>,
    max_tool_rounds: Option<u32>,
    max_hops: Option<u32>,
    chain_stale_timeout_ms: Option<u64>,
    edge_orphan_grace_ms: Option<u64>,
    drain_timeout_ms: Option<u64>,
    rpc_topic_naming: Option<String>,
}

fn read_toml_file(dir: Option<&Path>) -> Result<TomlFile, ConfigError> {
    let dir = dir
        .map(Path::to_path_buf)
        .or_else(|| std::env::current_dir().ok());
    let Some(path) = dir.map(|d| d.join("genesis.toml")) else {
        return Ok(TomlFile::default());
    };
    if !path.exists() {
        return Ok(TomlFile::default());
    }
    let content = std::fs::read_to_string(&path).map_err(ConfigError::TomlRead)?;
    Ok(toml::from_str(&content)?)
}

fn env_or<T: std::str::FromStr>(key: &str, env: &std::collections::HashMap<String, String>, fallback: T) -> T {
    std::env::var(key)
        .ok()
        .or_else(|| env.get(key).cloned())
        .and_then(|v| v.parse().ok())
        .unwrap_or(fallback)
}

/// Loads configuration with precedence: process env > project `.env` >
/// `genesis.toml` > built-in default, for each field independently.
/// `override_dir` controls where `.env`/`genesis.toml` are looked up
/// (defaults to the current directory); pass `Some(dir)` in tests or when
/// a participant's working directory shouldn't be the process cwd.
pub fn load(override_dir: Option<&Path>) -> Result<GenesisConfig, ConfigError> {
    let dotenv_map = dotenv::load_env_map(override_dir).map_err(ConfigError::DotenvRead)?;
    let toml_file = read_toml_file(override_dir)?;
    let defaults = GenesisConfig::default();

    let naming = std::env::var("GENESIS_RPC_TOPIC_NAMING")
        .ok()
        .or_else(|| dotenv_map.get("GENESIS_RPC_TOPIC_NAMING").cloned())
        .or(toml_file.rpc_topic_naming);
    if naming.as_deref() == Some("legacy") {
        return Err(ConfigError::LegacyNamingUnsupported);
    }

    Ok(GenesisConfig {
        domain_id: env_or(
            "GENESIS_DOMAIN_ID",
            &dotenv_map,
            toml_file.domain_id.unwrap_or(defaults.domain_id),
        ),
        rpc_timeout: Duration::from_millis(env_or(
            "GENESIS_RPC_TIMEOUT_MS",
            &dotenv_map,
            toml_file
                .rpc_timeout_ms
                .unwrap_or(defaults.rpc_timeout.as_millis() as u64),
        )),
        max_tool_rounds: env_or(
            "GENESIS_MAX_TOOL_ROUNDS",
            &dotenv_map,
            toml_file.max_tool_rounds.unwrap_or(defaults.max_tool_rounds),
        ),
        max_hops: env_or(
            "GENESIS_MAX_HOPS",
            &dotenv_map,
            toml_file.max_hops.unwrap_or(defaults.max_hops),
        ),
        chain_stale_timeout: Duration::from_millis(env_or(
            "GENESIS_CHAIN_STALE_TIMEOUT_MS",
            &dotenv_map,
            toml_file
                .chain_stale_timeout_ms
                .unwrap_or(defaults.chain_stale_timeout.as_millis() as u64),
        )),
        edge_orphan_grace: Duration::from_millis(env_or(
            "GENESIS_EDGE_ORPHAN_GRACE_MS",
            &dotenv_map,
            toml_file
                .edge_orphan_grace_ms
                .unwrap_or(defaults.edge_orphan_grace.as_millis() as u64),
        )),
        drain_timeout: Duration::from_millis(env_or(
            "GENESIS_DRAIN_TIMEOUT_MS",
            &dotenv_map,
            toml_file
                .drain_timeout_ms
                .unwrap_or(defaults.drain_timeout.as_millis() as u64),
        )),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Tests mutate process env; serialize them so they don't race each other.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn defaults_when_nothing_configured() {
        let _guard = ENV_LOCK.lock().unwrap();
        let dir = std::env::temp_dir().join(format!("genesis-config-test-a-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let cfg = load(Some(&dir)).unwrap();
        assert_eq!(cfg, GenesisConfig::default());
        let _ = std::fs::remove_dir(&dir);
    }

    #[test]
    fn toml_file_overrides_defaults_but_not_env() {
        let _guard = ENV_LOCK.lock().unwrap();
        let dir = std::env::temp_dir().join(format!("genesis-config-test-b-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("genesis.toml"), "max_hops = 3\n").unwrap();

        std::env::remove_var("GENESIS_MAX_HOPS");
        let cfg = load(Some(&dir)).unwrap();
        assert_eq!(cfg.max_hops, 3);

        std::env::set_var("GENESIS_MAX_HOPS", "9");
        let cfg = load(Some(&dir)).unwrap();
        assert_eq!(cfg.max_hops, 9);
        std::env::remove_var("GENESIS_MAX_HOPS");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn legacy_rpc_topic_naming_is_rejected() {
        let _guard = ENV_LOCK.lock().unwrap();
        let dir = std::env::temp_dir().join(format!("genesis-config-test-c-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::env::set_var("GENESIS_RPC_TOPIC_NAMING", "legacy");
        let result = load(Some(&dir));
        std::env::remove_var("GENESIS_RPC_TOPIC_NAMING");
        let _ = std::fs::remove_dir_all(&dir);
        assert!(matches!(result, Err(ConfigError::LegacyNamingUnsupported)));
    }
}
