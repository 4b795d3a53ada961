//! Tools exposed by an external tool server.
//!
//! A tool server (for example an MCP server running as a child process)
//! owns its own lifecycle. This crate only consumes the descriptors it
//! lists, turning each into a non-strict [`FunctionTool`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::Result;

use super::{FunctionTool, Tool};

/// A tool as listed by a tool server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    /// Tool name.
    pub name: String,
    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,
    /// JSON schema of the tool's input.
    #[serde(alias = "inputSchema")]
    pub input_schema: Value,
}

impl From<ToolDescriptor> for FunctionTool {
    fn from(descriptor: ToolDescriptor) -> Self {
        // Server schemas are rarely written for strict mode.
        Self {
            name: descriptor.name,
            description: descriptor.description.unwrap_or_default(),
            params_json_schema: descriptor.input_schema,
            strict_json_schema: false,
        }
    }
}

/// An external process or service that exposes tools over a session.
#[async_trait]
pub trait ToolServer: Send + Sync {
    /// A readable name for the server.
    fn name(&self) -> &str;

    /// Open the session.
    async fn connect(&mut self) -> Result<()>;

    /// Close the session and release its resources.
    async fn cleanup(&mut self) -> Result<()>;

    /// List the tools the server currently exposes.
    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>>;
}

/// List a connected server's tools as function tools.
///
/// # Errors
///
/// Propagates the server's `list_tools` error unchanged.
pub async fn tools_from_server(server: &dyn ToolServer) -> Result<Vec<Tool>> {
    let descriptors = server.list_tools().await?;
    debug!(server = server.name(), count = descriptors.len(), "Listed server tools");
    Ok(descriptors
        .into_iter()
        .map(|d| Tool::Function(d.into()))
        .collect())
}
