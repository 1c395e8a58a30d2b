//! Server info tool.

use crate::tools::McpTool;
use crate::{McpResult, ServiceContext};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::Arc;

/// Reports server version and the configured render backend.
pub struct ServerInfoTool {
    context: Arc<ServiceContext>,
}

impl ServerInfoTool {
    /// Tool over the shared pipeline.
    pub fn new(context: Arc<ServiceContext>) -> Self {
        Self { context }
    }
}

#[async_trait]
impl McpTool for ServerInfoTool {
    fn name(&self) -> &str {
        "server_info"
    }

    fn description(&self) -> &str {
        "Get server version and render backend information"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {}
        })
    }

    async fn execute(&self, _input: Value) -> McpResult<Value> {
        Ok(json!({
            "name": "hokusai",
            "version": env!("CARGO_PKG_VERSION"),
            "provider": self.context.driver().provider_name(),
            "model": self.context.driver().model_name(),
            "timestamp": chrono::Utc::now().to_rfc3339()
        }))
    }
}
