//! Tool implementations for the MCP server.

mod batch;
mod guide;
mod page;
mod reference;
mod server_info;

pub use batch::RenderBatchTool;
pub use guide::{StoryboardSchemaTool, WorkflowGuideTool};
pub use page::{GeneratePageTool, RegeneratePageTool};
pub use reference::{
    CreateCharacterReferenceTool, CreateSceneReferenceTool, GetReferenceTool, ListCharactersTool,
    ListScenesTool, UpdateCharacterReferenceTool,
};
pub use server_info::ServerInfoTool;

use crate::{McpError, McpResult, ServiceContext};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Trait for MCP tools.
#[async_trait]
pub trait McpTool: Send + Sync {
    /// Returns the tool name.
    fn name(&self) -> &str;

    /// Returns the tool description for the calling agent.
    fn description(&self) -> &str;

    /// Returns the input schema as JSON Schema.
    fn input_schema(&self) -> Value;

    /// Executes the tool with the given input.
    async fn execute(&self, input: Value) -> McpResult<Value>;
}

/// Registry for managing MCP tools.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn McpTool>>,
}

impl ToolRegistry {
    /// Creates an empty tool registry.
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Creates a registry carrying the full tool surface over one pipeline.
    pub fn standard(context: Arc<ServiceContext>) -> Self {
        let mut registry = Self::new();

        // Orientation tools
        registry.register(Arc::new(WorkflowGuideTool));
        registry.register(Arc::new(StoryboardSchemaTool));
        registry.register(Arc::new(ServerInfoTool::new(context.clone())));

        // Reference management
        registry.register(Arc::new(CreateCharacterReferenceTool::new(context.clone())));
        registry.register(Arc::new(CreateSceneReferenceTool::new(context.clone())));
        registry.register(Arc::new(UpdateCharacterReferenceTool::new(context.clone())));
        registry.register(Arc::new(GetReferenceTool::new(context.clone())));
        registry.register(Arc::new(ListCharactersTool::new(context.clone())));
        registry.register(Arc::new(ListScenesTool::new(context.clone())));

        // Page generation
        registry.register(Arc::new(GeneratePageTool::new(context.clone())));
        registry.register(Arc::new(RegeneratePageTool::new(context.clone())));
        registry.register(Arc::new(RenderBatchTool::new(context)));

        tracing::info!("tool registry initialized with {} tools", registry.len());
        registry
    }

    /// Registers a tool.
    pub fn register(&mut self, tool: Arc<dyn McpTool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    /// Gets a tool by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn McpTool>> {
        self.tools.get(name).cloned()
    }

    /// Lists all registered tools.
    pub fn list(&self) -> Vec<Arc<dyn McpTool>> {
        let mut tools: Vec<_> = self.tools.values().cloned().collect();
        tools.sort_by(|a, b| a.name().cmp(b.name()));
        tools
    }

    /// Executes a tool by name.
    pub async fn execute(&self, name: &str, input: Value) -> McpResult<Value> {
        let tool = self
            .get(name)
            .ok_or_else(|| McpError::ToolNotFound(name.to_string()))?;

        tool.execute(input).await
    }

    /// Gets the number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Returns true if no tools are registered.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

/// Pull a required string field out of a tool input.
pub(crate) fn required_str<'a>(input: &'a Value, field: &str) -> McpResult<&'a str> {
    input
        .get(field)
        .and_then(|v| v.as_str())
        .ok_or_else(|| McpError::InvalidInput(format!("Missing '{field}' field")))
}

/// Pull an optional string field, falling back to a default.
pub(crate) fn str_or<'a>(input: &'a Value, field: &str, default: &'a str) -> &'a str {
    input.get(field).and_then(|v| v.as_str()).unwrap_or(default)
}

/// Parse a serde-renamed enum value (image size, aspect ratio) from a string
/// field.
pub(crate) fn parse_enum_field<T: serde::de::DeserializeOwned + Default>(
    input: &Value,
    field: &str,
) -> McpResult<T> {
    match input.get(field).and_then(|v| v.as_str()) {
        Some(text) => serde_json::from_value(Value::String(text.to_string()))
            .map_err(|_| McpError::InvalidInput(format!("Unrecognized {field}: '{text}'"))),
        None => Ok(T::default()),
    }
}
