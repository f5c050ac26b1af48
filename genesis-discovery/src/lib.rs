//! Discovery & Capability Registry: advertises this
//! participant's agent/function records and maintains an
//! eventually-consistent view of everyone else's, fed by `genesis-transport`'s
//! `TransientLocal` topics.

mod cache;
mod discovery;
mod error;

pub use discovery::{
    Discovery, AGENT_CAPABILITY_TOPIC, FUNCTION_CAPABILITY_TOPIC, PRESENCE_TOPIC,
};
pub use error::DiscoveryError;

#[cfg(test)]
mod tests {
    use genesis_transport::create_participant;
    use genesis_types::{AgentKind, FunctionCapability, Role};

    use super::*;

    fn sample_agent(id: genesis_types::ParticipantId) -> genesis_types::AgentCapability {
        genesis_types::AgentCapability {
            agent_id: id,
            service_endpoint: "local://agent".to_string(),
            display_name: "calc-agent".to_string(),
            agent_type: AgentKind::Specialist,
            specializations: vec!["math".to_string()],
            capability_tags: vec!["calculator".to_string()],
            classification_tags: vec![],
            default_capable: false,
            model_info: None,
            performance_metrics: None,
        }
    }

    #[tokio::test]
    async fn advertise_then_late_subscriber_sees_current_set() {
        let writer_participant = create_participant(100, "writer", Role::Agent).unwrap();
        let writer_discovery = Discovery::new(&writer_participant).unwrap();
        let agent = sample_agent(uuid::Uuid::new_v4());
        writer_discovery.advertise_agent(&agent).unwrap();

        // Give the writer's own cache task a moment to observe its own publish.
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert_eq!(writer_discovery.agents().len(), 1);

        let late_participant = create_participant(100, "late", Role::Viewer).unwrap();
        let late_discovery = Discovery::new(&late_participant).unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert_eq!(late_discovery.agents(), vec![agent]);
    }

    #[tokio::test]
    async fn republish_unchanged_does_not_emit_updated() {
        let participant = create_participant(101, "writer", Role::Agent).unwrap();
        let discovery = Discovery::new(&participant).unwrap();
        let mut events = discovery.subscribe_agents();
        let agent = sample_agent(uuid::Uuid::new_v4());

        discovery.advertise_agent(&agent).unwrap();
        let first = events.recv().await.unwrap();
        assert!(matches!(first, genesis_types::CapabilityEvent::Added(_)));

        discovery.advertise_agent(&agent).unwrap();
        // Second publish is a byte-identical republish; no further event
        // should be dispatched. Publish a distinguishable change after it to
        // prove the channel is still alive and ordered.
        let mut changed = agent.clone();
        changed.display_name = "calc-agent-v2".to_string();
        discovery.advertise_agent(&changed).unwrap();

        let next = events.recv().await.unwrap();
        match next {
            genesis_types::CapabilityEvent::Updated(record) => {
                assert_eq!(record.display_name, "calc-agent-v2");
            }
            other => panic!("expected Updated, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn withdraw_emits_removed() {
        let participant = create_participant(102, "writer", Role::Service).unwrap();
        let discovery = Discovery::new(&participant).unwrap();
        let mut events = discovery.subscribe_functions();
        let function = FunctionCapability {
            function_id: "add".to_string(),
            name: "add".to_string(),
            description: "adds two numbers".to_string(),
            parameter_schema: serde_json::json!({"type": "object"}),
            provider_service_id: participant.id,
            service_endpoint: "local://calc".to_string(),
        };
        discovery.advertise_function(&function).unwrap();
        let _ = events.recv().await.unwrap();

        discovery.withdraw_function("add").unwrap();
        let removed = events.recv().await.unwrap();
        assert!(matches!(removed, genesis_types::CapabilityEvent::Removed(_)));
        assert!(discovery.functions().is_empty());
    }
}
