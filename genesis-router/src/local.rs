//! Local method tools: a name, a schema for the LLM, and an async call.
//!
//! GENESIS has no tool-marker macro to introspect a method's parameter
//! types, so a `LocalTool` declares its own [`ToolSchema`] rather than
//! deriving one.

use async_trait::async_trait;
use genesis_types::ToolSchema;
use serde_json::Value;

use crate::error::RouterError;

/// One locally-invoked tool, dispatched in-process instead of over RPC.
#[async_trait]
pub trait LocalTool: Send + Sync {
    fn name(&self) -> &str;

    fn schema(&self) -> ToolSchema;

    async fn call(&self, arguments: Value) -> Result<String, RouterError>;
}
