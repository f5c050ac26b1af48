//! Unified Tool Router: turns a Discovery snapshot plus an
//! agent's own local methods into one tool list for an LLM, dispatches
//! calls to the right channel, and runs the bounded reasoning loop.

pub mod binding;
pub mod error;
pub mod local;
pub mod reasoning;
pub mod router;

pub use binding::build_bindings;
pub use error::RouterError;
pub use local::LocalTool;
pub use reasoning::{Message, MockReasoningModel, ReasoningModel, ReasoningStep, ToolCall};
pub use router::ToolRouter;

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use genesis_discovery::Discovery;
    use genesis_monitoring::MonitoringPublisher;
    use genesis_transport::create_participant;
    use genesis_types::{NodeType, Role, ToolSchema};
    use serde_json::Value;
    use uuid::Uuid;

    use super::*;

    struct EchoTool;

    #[async_trait]
    impl LocalTool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }

        fn schema(&self) -> ToolSchema {
            ToolSchema {
                name: "echo".to_string(),
                description: "echoes its input".to_string(),
                parameters: serde_json::json!({"type": "object"}),
            }
        }

        async fn call(&self, arguments: Value) -> Result<String, RouterError> {
            Ok(format!("echo:{arguments}"))
        }
    }

    struct AlwaysCallAgainTool;

    #[async_trait]
    impl LocalTool for AlwaysCallAgainTool {
        fn name(&self) -> &str {
            "nag"
        }

        fn schema(&self) -> ToolSchema {
            ToolSchema {
                name: "nag".to_string(),
                description: "always asks to be called again".to_string(),
                parameters: serde_json::json!({"type": "object"}),
            }
        }

        async fn call(&self, _arguments: Value) -> Result<String, RouterError> {
            Ok("call me again".to_string())
        }
    }

    fn router_with_locals(domain_id: u32, locals: Vec<Arc<dyn LocalTool>>, max_tool_rounds: u32) -> ToolRouter {
        let participant = create_participant(domain_id, "primary", Role::Agent).unwrap();
        let discovery = Arc::new(Discovery::new(&participant).unwrap());
        let monitoring = Arc::new(MonitoringPublisher::new(&participant).unwrap());
        ToolRouter::new(
            &participant,
            discovery,
            monitoring,
            locals,
            Uuid::new_v4(),
            "primary-1",
            NodeType::PrimaryAgent,
            "Primary",
            Duration::from_secs(1),
            max_tool_rounds,
            4,
        )
            .unwrap()
    }

    #[tokio::test]
    async fn local_tool_dispatch_feeds_result_back_to_model() {
        let router = router_with_locals(400, vec![Arc::new(EchoTool)], 4);
        let model = MockReasoningModel::new(vec![
            ReasoningStep::ToolCalls(vec![ToolCall {
                call_id: Uuid::new_v4(),
                name: "echo".to_string(),
                arguments: serde_json::json!({"n": 1}),
            }]),
            ReasoningStep::FinalAnswer("done".to_string()),
        ]);

        let chain_id = Uuid::new_v4();
        let result = router.run(&model, None, chain_id, 0, "hello").await.unwrap();
        assert_eq!(result, "done");
    }

    #[tokio::test]
    async fn loop_bound_is_enforced_after_max_rounds() {
        let router = router_with_locals(401, vec![Arc::new(AlwaysCallAgainTool)], 4);
        let model = MockReasoningModel::repeating(ReasoningStep::ToolCalls(vec![ToolCall {
            call_id: Uuid::new_v4(),
            name: "nag".to_string(),
            arguments: serde_json::json!({}),
        }]));

        let chain_id = Uuid::new_v4();
        let result = router.run(&model, None, chain_id, 0, "start").await;
        assert!(matches!(result, Err(RouterError::ToolLoopExceeded(4))));
    }

    #[tokio::test]
    async fn unresolvable_tool_name_is_reported_without_panicking() {
        let router = router_with_locals(402, vec![], 2);
        let model = MockReasoningModel::new(vec![
            ReasoningStep::ToolCalls(vec![ToolCall {
                call_id: Uuid::new_v4(),
                name: "does_not_exist".to_string(),
                arguments: serde_json::json!({}),
            }]),
            ReasoningStep::FinalAnswer("recovered".to_string()),
        ]);

        let chain_id = Uuid::new_v4();
        let result = router.run(&model, None, chain_id, 0, "hello").await.unwrap();
        assert_eq!(result, "recovered");
    }
}
