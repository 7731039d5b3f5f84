//! Tool plugin surface
//!
//! A host framework invokes a tool with a JSON object of parameters and
//! renders the messages it yields, in order.

mod chat;
mod params;

pub use chat::PowerdrillChatTool;
pub use params::{ChatParameters, REQUIRED_PARAMS};

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::dispatch::ToolMessage;
use crate::error::Result;

/// Messages produced by one invocation, consumed lazily by the host
pub type ToolMessages = Box<dyn Iterator<Item = ToolMessage> + Send>;

/// A tool that a host can invoke
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name as registered with the host
    fn name(&self) -> &'static str;

    /// Human-readable description
    fn description(&self) -> &'static str;

    /// JSON Schema for invocation parameters
    fn input_schema(&self) -> Value;

    /// Run the tool.
    ///
    /// Bad parameters come back as a single error message; failures past
    /// that point are returned as `Err` and yield no messages.
    async fn invoke(&self, params: Value) -> Result<ToolMessages>;

    /// Full definition for registration with the host
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: self.input_schema(),
        }
    }
}

/// Tool definition as published to the host
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}
