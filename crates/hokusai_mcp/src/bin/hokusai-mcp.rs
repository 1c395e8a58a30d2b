//! Hokusai MCP server binary.

use anyhow::Result;
use hokusai_interface::RenderDriver;
use hokusai_mcp::{McpServer, ServiceContext, ToolRegistry};
use hokusai_models::GeminiImageClient;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{self, EnvFilter};

const DEFAULT_DATA_DIR: &str = "./data";
const DEFAULT_CALL_TIMEOUT_SECS: u64 = 120;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    let _ = dotenvy::dotenv();

    // Stdout is the MCP transport, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("Starting Hokusai MCP server");

    let data_dir =
        std::env::var("HOKUSAI_DATA_DIR").unwrap_or_else(|_| DEFAULT_DATA_DIR.to_string());
    let call_timeout = std::env::var("HOKUSAI_RENDER_TIMEOUT_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_CALL_TIMEOUT_SECS);

    let driver = Arc::new(GeminiImageClient::from_env()?);
    tracing::info!(
        data_dir = %data_dir,
        model = driver.model_name(),
        "Pipeline configuration loaded"
    );

    let context = Arc::new(
        ServiceContext::new(&data_dir, driver, Duration::from_secs(call_timeout)).await?,
    );

    let server = McpServer::builder()
        .name("hokusai")
        .version(env!("CARGO_PKG_VERSION"))
        .tools(ToolRegistry::standard(context))
        .build()?;

    tracing::info!("Server ready, listening on stdio");
    server.run_stdio().await?;

    Ok(())
}
