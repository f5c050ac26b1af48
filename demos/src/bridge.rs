//! Mirrors every well-known GENESIS topic over a WebSocket, one TCP port per
//! topic, so two demo processes on different hosts (or just different ports
//! on one host) see the same bus.
//!
//! Grounded on `genesis_transport::socket`'s `serve_topic`/`connect_topic`,
//! which already relay one topic independently of its sample type; this
//! module just applies that to the fixed list of topics the rest of the
//! workspace declares.

use genesis_discovery::{AGENT_CAPABILITY_TOPIC, FUNCTION_CAPABILITY_TOPIC, PRESENCE_TOPIC};
use genesis_monitoring::{EVENT_TOPIC, TOPOLOGY_TOPIC};
use genesis_rpc::{
    AGENT_AGENT_REPLY_TOPIC, AGENT_AGENT_REQUEST_TOPIC, FUNCTION_REPLY_TOPIC, FUNCTION_REQUEST_TOPIC,
    INTERFACE_AGENT_REPLY_TOPIC, INTERFACE_AGENT_REQUEST_TOPIC,
};
use genesis_transport::socket::{connect_topic, serve_topic};
use genesis_transport::Participant;
use genesis_types::TopicQos;

fn presence_qos() -> TopicQos {
    TopicQos::discovery("agent_id")
}

fn agent_capability_qos() -> TopicQos {
    TopicQos::discovery("agent_id")
}

fn function_capability_qos() -> TopicQos {
    TopicQos::discovery("function_id")
}

/// `(topic name, QoS)` in a fixed order; a topic's port is `base_port + its
/// index here, so both sides of a bridge must agree on this list.
const WELL_KNOWN_TOPICS: &[(&str, fn() -> TopicQos)] = &[
    (PRESENCE_TOPIC, presence_qos),
    (AGENT_CAPABILITY_TOPIC, agent_capability_qos),
    (FUNCTION_CAPABILITY_TOPIC, function_capability_qos),
    (INTERFACE_AGENT_REQUEST_TOPIC, TopicQos::rpc),
    (INTERFACE_AGENT_REPLY_TOPIC, TopicQos::rpc),
    (AGENT_AGENT_REQUEST_TOPIC, TopicQos::rpc),
    (AGENT_AGENT_REPLY_TOPIC, TopicQos::rpc),
    (FUNCTION_REQUEST_TOPIC, TopicQos::rpc),
    (FUNCTION_REPLY_TOPIC, TopicQos::rpc),
    (TOPOLOGY_TOPIC, TopicQos::topology),
    (EVENT_TOPIC, TopicQos::events),
];

fn split_host_port(addr: &str) -> (String, u16) {
    let addr = addr.trim_start_matches("ws://").trim_start_matches("http://");
    let (host, port) = addr.rsplit_once(':').expect("address must be host:port");
    (host.to_string(), port.parse().expect("port must be numeric"))
}

/// Starts a bridge server: binds one TCP listener per well-known topic,
/// starting at `base_addr`'s port, and relays this participant's samples to
/// any peer that connects. Runs in the background; the returned tasks keep
/// running for the life of the process even if dropped.
pub fn bridge_listen(participant: &Participant, base_addr: &str) {
    let (host, base_port) = split_host_port(base_addr);
    for (i, (name, qos)) in WELL_KNOWN_TOPICS.iter().enumerate() {
        let topic = participant
            .declare_topic(name, qos())
            .expect("well-known topic QoS must match across every participant");
        let addr = format!("{host}:{}", base_port + i as u16);
        let topic_name = (*name).to_string();
        tokio::spawn(async move {
            if let Err(e) = serve_topic(&addr, topic).await {
                tracing::error!(topic = %topic_name, error = %e, "bridge listener exited");
            }
        });
    }
}

/// Connects to a peer started with [`bridge_listen`], relaying every
/// well-known topic in both directions.
pub fn bridge_connect(participant: &Participant, base_url: &str) {
    let (host, base_port) = split_host_port(base_url);
    for (i, (name, qos)) in WELL_KNOWN_TOPICS.iter().enumerate() {
        let topic = participant
            .declare_topic(name, qos())
            .expect("well-known topic QoS must match across every participant");
        let url = format!("ws://{host}:{}", base_port + i as u16);
        let topic_name = (*name).to_string();
        tokio::spawn(async move {
            if let Err(e) = connect_topic(&url, topic).await {
                tracing::error!(topic = %topic_name, error = %e, "bridge connection closed");
            }
        });
    }
}
