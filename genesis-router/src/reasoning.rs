//! The pluggable LLM seam.
//!
//! Kept as a narrow trait so a real provider adapter can be dropped in
//! without touching [`crate::router::ToolRouter`]; [`MockReasoningModel`]
//! scripts a fixed sequence of steps for tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use genesis_types::ToolSchema;
use serde_json::Value;
use uuid::Uuid;

use crate::error::RouterError;

#[derive(Clone, Debug, PartialEq)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user".to_string(), content: content.into() }
    }

    pub fn tool_result(content: impl Into<String>) -> Self {
        Self { role: "tool".to_string(), content: content.into() }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ToolCall {
    pub call_id: Uuid,
    pub name: String,
    pub arguments: Value,
}

/// What the model produces for one reasoning round.
#[derive(Clone, Debug, PartialEq)]
pub enum ReasoningStep {
    ToolCalls(Vec<ToolCall>),
    FinalAnswer(String),
}

#[async_trait]
pub trait ReasoningModel: Send + Sync {
    async fn next_step(
        &self,
        messages: &[Message],
        tools: &[ToolSchema],
    ) -> Result<ReasoningStep, RouterError>;
}

/// Scripted model for tests: replays a fixed sequence of steps, repeating
/// the last one once the script is exhausted.
pub struct MockReasoningModel {
    script: Vec<ReasoningStep>,
    cursor: AtomicUsize,
}

impl MockReasoningModel {
    pub fn new(script: Vec<ReasoningStep>) -> Self {
        assert!(!script.is_empty(), "mock reasoning model needs at least one step");
        Self { script, cursor: AtomicUsize::new(0) }
    }

    pub fn repeating(step: ReasoningStep) -> Self {
        Self::new(vec![step])
    }
}

#[async_trait]
impl ReasoningModel for MockReasoningModel {
    async fn next_step(
        &self,
        _messages: &[Message],
        _tools: &[ToolSchema],
    ) -> Result<ReasoningStep, RouterError> {
        let i = self.cursor.fetch_add(1, Ordering::SeqCst);
        let step = self
            .script
            .get(i)
            .or_else(|| self.script.last())
            .cloned()
            .expect("non-empty script");
        Ok(step)
    }
}
