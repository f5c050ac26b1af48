//! A small rule-based [`ReasoningModel`] for the demo binaries.
//!
//! GENESIS treats LLM provider adapters as out of scope ; the
//! primary agent demo still needs *something* behind the `ReasoningModel`
//! seam to pick a tool, so this reads the inbound message for a couple of
//! keywords/numbers instead of calling out to a real model. It is not meant
//! to generalize past the two demo tools (`add`, `get_weather_info`).

use async_trait::async_trait;
use genesis_router::{Message, ReasoningModel, ReasoningStep, RouterError, ToolCall};
use genesis_types::ToolSchema;
use serde_json::json;
use uuid::Uuid;

pub struct KeywordReasoningModel;

#[async_trait]
impl ReasoningModel for KeywordReasoningModel {
    async fn next_step(&self, messages: &[Message], tools: &[ToolSchema]) -> Result<ReasoningStep, RouterError> {
        // Exactly one prior round means we already dispatched a tool call;
        // the last message is its result, so report it as the final answer.
        if messages.len() > 1 {
            let result = messages.last().map(|m| m.content.clone()).unwrap_or_default();
            return Ok(ReasoningStep::FinalAnswer(result));
        }

        let text = messages.first().map(|m| m.content.as_str()).unwrap_or_default();
        let lower = text.to_lowercase();

        if lower.contains("weather") {
            if let Some(tool) = tools.iter().find(|t| t.name.contains("weather")) {
                return Ok(ReasoningStep::ToolCalls(vec![ToolCall {
                    call_id: Uuid::new_v4(),
                    name: tool.name.clone(),
                    arguments: json!({ "message": text }),
                }]));
            }
        }

        if let Some((a, b)) = extract_two_numbers(text) {
            if let Some(tool) = tools.iter().find(|t| t.name == "add") {
                return Ok(ReasoningStep::ToolCalls(vec![ToolCall {
                    call_id: Uuid::new_v4(),
                    name: tool.name.clone(),
                    arguments: json!({ "a": a, "b": b }),
                }]));
            }
        }

        Ok(ReasoningStep::FinalAnswer(format!(
            "no matching tool for: {text}"
        )))
    }
}

fn extract_two_numbers(text: &str) -> Option<(i64, i64)> {
    let mut numbers = text
        .split(|c: char| !c.is_ascii_digit() && c != '-')
        .filter_map(|tok| tok.parse::<i64>().ok());
    let a = numbers.next()?;
    let b = numbers.next()?;
    Some((a, b))
}
