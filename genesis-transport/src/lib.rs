//! Transport Substrate: typed publish/subscribe and
//! request/reply over named topics with per-topic QoS.
//!
//! Backed by an in-process bus (`tokio::sync::broadcast` fan-out + a
//! `dashmap` durability cache) shared by many participants in the same
//! process or, via [`socket`], across a TCP/WebSocket boundary.

mod bus;
mod error;
mod participant;
mod reader;
mod reqreply;
mod sample;
pub mod socket;
mod topic;
mod writer;

pub use error::TransportError;
pub use participant::{create_participant, Participant};
pub use reader::Reader;
pub use reqreply::{Replier, Requester};
pub use sample::{InstanceState, Sample};
pub use socket::{connect_topic, serve_topic};
pub use topic::Topic;
pub use writer::Writer;

#[cfg(test)]
mod tests {
    use super::*;
    use genesis_types::{Role, TopicQos};

    #[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
    struct Ping {
        n: u32,
    }

    #[tokio::test]
    async fn reliable_volatile_delivers_in_order() {
        let p1 = create_participant(0, "writer", Role::Service).unwrap();
        let p2 = create_participant(0, "reader", Role::Service).unwrap();
        let topic = p1.declare_topic("test/ping", TopicQos::rpc()).unwrap();
        let writer: Writer<Ping> = p1.create_writer(&topic);
        let mut reader: Reader<Ping> = p2.create_reader(&topic);

        writer.publish(None, &Ping { n: 1 }).unwrap();
        writer.publish(None, &Ping { n: 2 }).unwrap();

        let Sample::Alive { value, .. } = reader.recv().await.unwrap() else {
            panic!("expected alive sample");
        };
        assert_eq!(value.n, 1);
        let Sample::Alive { value, .. } = reader.recv().await.unwrap() else {
            panic!("expected alive sample");
        };
        assert_eq!(value.n, 2);
    }

    #[tokio::test]
    async fn transient_local_replays_last_sample_per_key_to_late_joiner() {
        let p1 = create_participant(1, "writer", Role::Agent).unwrap();
        let topic = p1
            .declare_topic("test/presence", TopicQos::discovery("agent_id"))
            .unwrap();
        let writer: Writer<Ping> = p1.create_writer(&topic);
        writer.publish(Some("a"), &Ping { n: 1 }).unwrap();
        writer.publish(Some("b"), &Ping { n: 2 }).unwrap();
        writer.publish(Some("a"), &Ping { n: 3 }).unwrap();

        // Late joiner: only the last sample per key should replay (a=3, b=2).
        let p2 = create_participant(1, "late_reader", Role::Viewer).unwrap();
        let mut reader: Reader<Ping> = p2.create_reader(&topic);
        let mut seen = std::collections::HashMap::new();
        for _ in 0..2 {
            if let Sample::Alive { key, value } = reader.recv().await.unwrap() {
                seen.insert(key.unwrap(), value.n);
            }
        }
        assert_eq!(seen.get("a"), Some(&3));
        assert_eq!(seen.get("b"), Some(&2));
    }

    #[tokio::test]
    async fn dispose_notifies_existing_readers() {
        let p1 = create_participant(2, "writer", Role::Agent).unwrap();
        let topic = p1
            .declare_topic("test/presence2", TopicQos::discovery("agent_id"))
            .unwrap();
        let writer: Writer<Ping> = p1.create_writer(&topic);
        let p2 = create_participant(2, "reader", Role::Viewer).unwrap();
        let mut reader: Reader<Ping> = p2.create_reader(&topic);

        writer.publish(Some("a"), &Ping { n: 7 }).unwrap();
        writer.dispose(Some("a")).unwrap();

        let _ = reader.recv().await.unwrap();
        match reader.recv().await.unwrap() {
            Sample::Removed { key, state } => {
                assert_eq!(key.as_deref(), Some("a"));
                assert_eq!(state, InstanceState::NotAliveDisposed);
            }
            _ => panic!("expected removal notification"),
        }
    }

    #[tokio::test]
    async fn filtered_reader_only_sees_matching_target() {
        #[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
        struct Req {
            target_endpoint_id: String,
            n: u32,
        }
        let p1 = create_participant(3, "writer", Role::Interface).unwrap();
        let topic = p1.declare_topic("test/req", TopicQos::rpc()).unwrap();
        let writer: Writer<Req> = p1.create_writer(&topic);

        let p2 = create_participant(3, "svc", Role::Service).unwrap();
        let mut reader: Reader<Req> = p2.create_filtered_reader(&topic, |v| {
            let target = v.get("target_endpoint_id").and_then(|t| t.as_str()).unwrap_or("");
            target.is_empty() || target == "svc-1"
        });

        writer
            .publish(
                None,
                &Req {
                    target_endpoint_id: "svc-2".to_string(),
                    n: 1,
                },
            )
                .unwrap();
        writer
            .publish(
                None,
                &Req {
                    target_endpoint_id: "svc-1".to_string(),
                    n: 2,
                },
            )
                .unwrap();

        let Sample::Alive { value, .. } = reader.recv().await.unwrap() else {
            panic!("expected alive sample");
        };
        assert_eq!(value.n, 2);
    }
}
