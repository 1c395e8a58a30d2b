//! Model Context Protocol (MCP) server for Hokusai.
//!
//! Exposes the comic pipeline as synchronous request/response tools an LLM
//! agent can call: reference management, storyboard validation and page
//! generation, and bounded-concurrency batch rendering.
//!
//! # Usage
//!
//! ```no_run
//! use hokusai_mcp::{McpServer, ServiceContext, ToolRegistry};
//! use hokusai_models::GeminiImageClient;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let driver = Arc::new(GeminiImageClient::from_env()?);
//!     let context = Arc::new(ServiceContext::new("./data", driver, Duration::from_secs(120)).await?);
//!
//!     let server = McpServer::builder()
//!         .name("hokusai")
//!         .version(env!("CARGO_PKG_VERSION"))
//!         .tools(ToolRegistry::standard(context))
//!         .build()?;
//!     server.run_stdio().await?;
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod context;
mod error;
mod server;
pub mod tools;

pub use context::{DEFAULT_STYLE, ServiceContext};
pub use error::{McpError, McpResult};
pub use server::{McpServer, McpServerBuilder};
pub use tools::{
    CreateCharacterReferenceTool, CreateSceneReferenceTool, GeneratePageTool, GetReferenceTool,
    ListCharactersTool, ListScenesTool, McpTool, RegeneratePageTool, RenderBatchTool,
    ServerInfoTool, StoryboardSchemaTool, ToolRegistry, UpdateCharacterReferenceTool,
    WorkflowGuideTool,
};
