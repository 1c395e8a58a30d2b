//! Batch rendering tool.

use crate::tools::{McpTool, parse_enum_field, str_or};
use crate::{DEFAULT_STYLE, McpError, McpResult, ServiceContext};
use async_trait::async_trait;
use hokusai_core::{AspectRatio, ImageSize, RenderTarget};
use serde_json::{Value, json};
use std::sync::Arc;

const DEFAULT_CONCURRENCY: usize = 2;

/// Renders many stored pages with a bounded number of calls in flight.
pub struct RenderBatchTool {
    context: Arc<ServiceContext>,
}

impl RenderBatchTool {
    /// Tool over the shared pipeline.
    pub fn new(context: Arc<ServiceContext>) -> Self {
        Self { context }
    }
}

#[async_trait]
impl McpTool for RenderBatchTool {
    fn name(&self) -> &str {
        "render_batch"
    }

    fn description(&self) -> &str {
        "Render a batch of stored pages concurrently - each page fails or succeeds on its own; re-submit only the failed page numbers"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "page_numbers": {
                    "type": "array",
                    "items": {"type": "integer"},
                    "description": "Page numbers of previously stored records, in the order results should be reported"
                },
                "concurrency_limit": {
                    "type": "integer",
                    "description": "Maximum render calls in flight; keep small (2-4), the backend is rate-limited",
                    "default": DEFAULT_CONCURRENCY,
                    "minimum": 1
                },
                "image_size": {
                    "type": "string",
                    "enum": ["1K", "2K", "4K"],
                    "default": "2K"
                },
                "aspect_ratio": {
                    "type": "string",
                    "enum": ["1:1", "16:9", "9:16", "3:4", "4:3", "3:2", "2:3", "21:9"],
                    "default": "3:4"
                },
                "style": {
                    "type": "string",
                    "default": DEFAULT_STYLE
                }
            },
            "required": ["page_numbers"]
        })
    }

    #[tracing::instrument(skip(self, input))]
    async fn execute(&self, input: Value) -> McpResult<Value> {
        let page_numbers: Vec<u32> = input
            .get("page_numbers")
            .and_then(|v| v.as_array())
            .map(|items| {
                items
                    .iter()
                    .filter_map(|v| v.as_u64().and_then(|n| u32::try_from(n).ok()))
                    .collect()
            })
            .filter(|numbers: &Vec<u32>| !numbers.is_empty())
            .ok_or_else(|| {
                McpError::InvalidInput("'page_numbers' must be a non-empty array".to_string())
            })?;
        let limit = input
            .get("concurrency_limit")
            .and_then(|v| v.as_u64())
            .map(|v| v as usize)
            .unwrap_or(DEFAULT_CONCURRENCY);
        let style = str_or(&input, "style", DEFAULT_STYLE);
        let size: ImageSize = parse_enum_field(&input, "image_size")?;
        let aspect: AspectRatio = parse_enum_field(&input, "aspect_ratio")?;

        // Pages that fail to load or compose never reach the orchestrator;
        // their failures are merged back in submission order below.
        let mut requests = Vec::new();
        let mut unbuilt: Vec<(u32, String)> = Vec::new();
        for &page_number in &page_numbers {
            let composed = match self.context.store().load(page_number).await {
                Ok(page) => self
                    .context
                    .builder()
                    .build_page_request(&page, style, size, aspect),
                Err(e) => Err(e),
            };
            match composed {
                Ok(request) => requests.push(request),
                Err(e) => unbuilt.push((page_number, e.to_string())),
            }
        }

        let result = self
            .context
            .orchestrator()
            .run(requests, limit)
            .await
            .map_err(|e| McpError::InvalidInput(e.to_string()))?;
        self.context
            .registry()
            .flush_usage()
            .await
            .map_err(|e| McpError::ToolExecutionFailed(e.to_string()))?;

        let mut failed: Vec<(RenderTarget, String)> = unbuilt
            .into_iter()
            .map(|(n, reason)| (RenderTarget::page(n), reason))
            .chain(result.failed.iter().cloned())
            .collect();
        let position = |target: &RenderTarget| {
            page_numbers
                .iter()
                .position(|&n| n == target.page_number)
                .unwrap_or(usize::MAX)
        };
        failed.sort_by_key(|(target, _)| position(target));

        let summary = format!(
            "Rendered {} of {} pages ({} failed)",
            result.succeeded.len(),
            page_numbers.len(),
            failed.len()
        );
        Ok(json!({
            "success": failed.is_empty(),
            "summary": summary,
            "succeeded": result
                .succeeded
                .iter()
                .map(|(target, location)| json!({
                    "page_number": target.page_number,
                    "artifact_location": location
                }))
                .collect::<Vec<_>>(),
            "failed": failed
                .iter()
                .map(|(target, reason)| json!({
                    "page_number": target.page_number,
                    "reason": reason
                }))
                .collect::<Vec<_>>(),
            "total_attempted": result.total_attempted
        }))
    }
}
