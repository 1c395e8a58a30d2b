//! Page generation tools.

use crate::tools::{McpTool, parse_enum_field, required_str, str_or};
use crate::{DEFAULT_STYLE, McpError, McpResult, ServiceContext};
use async_trait::async_trait;
use hokusai_core::{AspectRatio, ImageSize, Page, Panel};
use serde_json::{Value, json};
use std::sync::Arc;

const SIZE_SCHEMA: [&str; 3] = ["1K", "2K", "4K"];
const ASPECT_SCHEMA: [&str; 8] = ["1:1", "16:9", "9:16", "3:4", "4:3", "3:2", "2:3", "21:9"];

/// Validate, persist, and render one page in a single call.
async fn render_stored_page(
    context: &ServiceContext,
    page: &Page,
    style: &str,
    size: ImageSize,
    aspect: AspectRatio,
) -> McpResult<Value> {
    let request = context
        .builder()
        .build_page_request(page, style, size, aspect)
        .map_err(|e| McpError::ToolExecutionFailed(e.to_string()))?;
    let result = context
        .orchestrator()
        .run(vec![request], 1)
        .await
        .map_err(|e| McpError::ToolExecutionFailed(e.to_string()))?;
    context
        .registry()
        .flush_usage()
        .await
        .map_err(|e| McpError::ToolExecutionFailed(e.to_string()))?;

    if let Some((_, location)) = result.succeeded.first() {
        Ok(json!({
            "success": true,
            "page_number": page.page_number,
            "panels_count": page.panels.len(),
            "artifact_location": location,
            "message": format!("Page {} rendered", page.page_number)
        }))
    } else {
        let reason = result
            .failed
            .first()
            .map(|(_, reason)| reason.clone())
            .unwrap_or_else(|| "render produced no outcome".to_string());
        Ok(json!({
            "success": false,
            "page_number": page.page_number,
            "reason": reason
        }))
    }
}

/// Parses, validates, persists, and renders a storyboard page.
pub struct GeneratePageTool {
    context: Arc<ServiceContext>,
}

impl GeneratePageTool {
    /// Tool over the shared pipeline.
    pub fn new(context: Arc<ServiceContext>) -> Self {
        Self { context }
    }
}

#[async_trait]
impl McpTool for GeneratePageTool {
    fn name(&self) -> &str {
        "generate_page"
    }

    fn description(&self) -> &str {
        "Generate one comic page from a storyboard JSON record - the record is validated, stored, and rendered with every referenced character and scene sheet attached"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "page_json": {
                    "type": "string",
                    "description": "Storyboard page record as a JSON string (see get_storyboard_schema)"
                },
                "source_text": {
                    "type": "string",
                    "description": "Optional source text the page was derived from; quoted lines are checked against dialogues"
                },
                "image_size": {
                    "type": "string",
                    "enum": SIZE_SCHEMA,
                    "default": "2K"
                },
                "aspect_ratio": {
                    "type": "string",
                    "enum": ASPECT_SCHEMA,
                    "default": "3:4"
                },
                "style": {
                    "type": "string",
                    "default": DEFAULT_STYLE
                }
            },
            "required": ["page_json"]
        })
    }

    #[tracing::instrument(skip(self, input))]
    async fn execute(&self, input: Value) -> McpResult<Value> {
        let page_json = required_str(&input, "page_json")?;
        let source_text = str_or(&input, "source_text", "");
        let style = str_or(&input, "style", DEFAULT_STYLE);
        let size: ImageSize = parse_enum_field(&input, "image_size")?;
        let aspect: AspectRatio = parse_enum_field(&input, "aspect_ratio")?;

        let page = Page::parse(page_json).map_err(|e| McpError::InvalidInput(e.to_string()))?;

        let report = self
            .context
            .validator()
            .validate(&page, source_text, self.context.registry());
        if !report.valid {
            return Ok(json!({
                "success": false,
                "page_number": page.page_number,
                "errors": report.errors,
                "warnings": report.warnings,
                "message": "Storyboard failed validation; fix the errors and resubmit"
            }));
        }

        self.context
            .store()
            .save(&page)
            .await
            .map_err(|e| McpError::ToolExecutionFailed(e.to_string()))?;

        let mut result = render_stored_page(&self.context, &page, style, size, aspect).await?;
        if let Some(object) = result.as_object_mut() {
            object.insert("warnings".to_string(), json!(report.warnings));
        }
        Ok(result)
    }
}

/// Re-renders a stored page, optionally replacing one panel first.
pub struct RegeneratePageTool {
    context: Arc<ServiceContext>,
}

impl RegeneratePageTool {
    /// Tool over the shared pipeline.
    pub fn new(context: Arc<ServiceContext>) -> Self {
        Self { context }
    }
}

#[async_trait]
impl McpTool for RegeneratePageTool {
    fn name(&self) -> &str {
        "regenerate_page"
    }

    fn description(&self) -> &str {
        "Re-render a stored page - optionally replace one panel of the record first; the new artifact overwrites the old one"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "page_number": {
                    "type": "integer",
                    "description": "Page number of a previously generated page"
                },
                "panel": {
                    "type": "object",
                    "description": "Optional replacement panel; its panel_number picks the slot to replace"
                },
                "image_size": {
                    "type": "string",
                    "enum": SIZE_SCHEMA,
                    "default": "2K"
                },
                "aspect_ratio": {
                    "type": "string",
                    "enum": ASPECT_SCHEMA,
                    "default": "3:4"
                },
                "style": {
                    "type": "string",
                    "default": DEFAULT_STYLE
                }
            },
            "required": ["page_number"]
        })
    }

    #[tracing::instrument(skip(self, input))]
    async fn execute(&self, input: Value) -> McpResult<Value> {
        let page_number = input
            .get("page_number")
            .and_then(|v| v.as_u64())
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(|| McpError::InvalidInput("Missing 'page_number' field".to_string()))?;
        let style = str_or(&input, "style", DEFAULT_STYLE);
        let size: ImageSize = parse_enum_field(&input, "image_size")?;
        let aspect: AspectRatio = parse_enum_field(&input, "aspect_ratio")?;

        let mut page = self
            .context
            .store()
            .load(page_number)
            .await
            .map_err(|e| McpError::InvalidInput(e.to_string()))?;

        if let Some(panel_value) = input.get("panel") {
            let panel: Panel = serde_json::from_value(panel_value.clone())
                .map_err(|e| McpError::InvalidInput(format!("Bad replacement panel: {e}")))?;
            page.replace_panel(panel)
                .map_err(|e| McpError::InvalidInput(e.to_string()))?;
            page.verify()
                .map_err(|e| McpError::InvalidInput(e.to_string()))?;
            self.context
                .store()
                .save(&page)
                .await
                .map_err(|e| McpError::ToolExecutionFailed(e.to_string()))?;
        }

        render_stored_page(&self.context, &page, style, size, aspect).await
    }
}
