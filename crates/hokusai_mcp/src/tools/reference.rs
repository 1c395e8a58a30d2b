//! Reference management tools.

use crate::tools::{McpTool, required_str, str_or};
use crate::{DEFAULT_STYLE, McpError, McpResult, ServiceContext};
use async_trait::async_trait;
use hokusai_registry::{Reference, ReferenceKind};
use serde_json::{Value, json};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

fn visual_features(input: &Value) -> BTreeMap<String, String> {
    input
        .get("visual_features")
        .and_then(|v| v.as_object())
        .map(|map| {
            map.iter()
                .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                .collect()
        })
        .unwrap_or_default()
}

fn tags(input: &Value) -> BTreeSet<String> {
    input
        .get("tags")
        .and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

/// Creates (or refreshes) a character reference sheet.
pub struct CreateCharacterReferenceTool {
    context: Arc<ServiceContext>,
}

impl CreateCharacterReferenceTool {
    /// Tool over the shared pipeline.
    pub fn new(context: Arc<ServiceContext>) -> Self {
        Self { context }
    }
}

#[async_trait]
impl McpTool for CreateCharacterReferenceTool {
    fn name(&self) -> &str {
        "create_character_reference"
    }

    fn description(&self) -> &str {
        "Create a character reference sheet - one per recurring character, reused across every render for visual consistency"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "character_name": {
                    "type": "string",
                    "description": "Character name; the id is derived from it"
                },
                "description": {
                    "type": "string",
                    "description": "Detailed appearance: hair, clothing, age, build"
                },
                "visual_features": {
                    "type": "object",
                    "description": "Optional structured traits (hair_color, clothing, age_range, ...)",
                    "additionalProperties": {"type": "string"}
                },
                "style": {
                    "type": "string",
                    "description": "Art style",
                    "default": DEFAULT_STYLE
                }
            },
            "required": ["character_name", "description"]
        })
    }

    async fn execute(&self, input: Value) -> McpResult<Value> {
        let name = required_str(&input, "character_name")?;
        let description = required_str(&input, "description")?;
        let style = str_or(&input, "style", DEFAULT_STYLE);

        let reference = self
            .context
            .registry()
            .create_or_update_character(name, description, visual_features(&input), style)
            .await
            .map_err(|e| McpError::ToolExecutionFailed(e.to_string()))?;

        Ok(json!({
            "success": true,
            "character_id": reference.id,
            "character_name": reference.display_name,
            "artifact_location": reference.artifact_location,
            "message": format!("Reference sheet for '{}' is ready; use id '{}' in storyboards", reference.display_name, reference.id)
        }))
    }
}

/// Creates (or refreshes) a scene reference.
pub struct CreateSceneReferenceTool {
    context: Arc<ServiceContext>,
}

impl CreateSceneReferenceTool {
    /// Tool over the shared pipeline.
    pub fn new(context: Arc<ServiceContext>) -> Self {
        Self { context }
    }
}

#[async_trait]
impl McpTool for CreateSceneReferenceTool {
    fn name(&self) -> &str {
        "create_scene_reference"
    }

    fn description(&self) -> &str {
        "Create a scene reference image for an important recurring location"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "scene_name": {
                    "type": "string",
                    "description": "Scene name; the id is derived from it"
                },
                "description": {
                    "type": "string",
                    "description": "Environment, lighting, and mood"
                },
                "tags": {
                    "type": "array",
                    "items": {"type": "string"},
                    "description": "Optional descriptive tags (city, night, ...)"
                },
                "style": {
                    "type": "string",
                    "description": "Art style",
                    "default": DEFAULT_STYLE
                }
            },
            "required": ["scene_name", "description"]
        })
    }

    async fn execute(&self, input: Value) -> McpResult<Value> {
        let name = required_str(&input, "scene_name")?;
        let description = required_str(&input, "description")?;
        let style = str_or(&input, "style", DEFAULT_STYLE);

        let reference = self
            .context
            .registry()
            .create_or_update_scene(name, description, tags(&input), style)
            .await
            .map_err(|e| McpError::ToolExecutionFailed(e.to_string()))?;

        Ok(json!({
            "success": true,
            "scene_id": reference.id,
            "scene_name": reference.display_name,
            "artifact_location": reference.artifact_location,
            "message": format!("Scene reference '{}' is ready; use id '{}' as background_ref", reference.display_name, reference.id)
        }))
    }
}

/// Regenerates an existing character's reference sheet from a new description.
pub struct UpdateCharacterReferenceTool {
    context: Arc<ServiceContext>,
}

impl UpdateCharacterReferenceTool {
    /// Tool over the shared pipeline.
    pub fn new(context: Arc<ServiceContext>) -> Self {
        Self { context }
    }
}

#[async_trait]
impl McpTool for UpdateCharacterReferenceTool {
    fn name(&self) -> &str {
        "update_character_reference"
    }

    fn description(&self) -> &str {
        "Regenerate a character's reference sheet from a new description - the id and usage history are preserved, so existing storyboards stay valid"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "character_id": {
                    "type": "string",
                    "description": "Character id (see list_characters)"
                },
                "new_description": {
                    "type": "string",
                    "description": "Replacement appearance description"
                },
                "visual_features": {
                    "type": "object",
                    "description": "Optional replacement structured traits",
                    "additionalProperties": {"type": "string"}
                },
                "style": {
                    "type": "string",
                    "description": "Art style",
                    "default": DEFAULT_STYLE
                }
            },
            "required": ["character_id", "new_description"]
        })
    }

    async fn execute(&self, input: Value) -> McpResult<Value> {
        let id = required_str(&input, "character_id")?;
        let description = required_str(&input, "new_description")?;
        let style = str_or(&input, "style", DEFAULT_STYLE);

        let existing = self
            .context
            .registry()
            .get(id)
            .map_err(|e| McpError::InvalidInput(e.to_string()))?;
        let Reference::Character(character) = existing else {
            return Err(McpError::InvalidInput(format!(
                "'{id}' is a scene reference, not a character"
            )));
        };

        let updated = self
            .context
            .registry()
            .create_or_update_character(
                &character.display_name,
                description,
                visual_features(&input),
                style,
            )
            .await
            .map_err(|e| McpError::ToolExecutionFailed(e.to_string()))?;

        Ok(json!({
            "success": true,
            "character_id": updated.id,
            "usage_count": updated.usage_count,
            "artifact_location": updated.artifact_location,
            "message": format!("Reference sheet for '{}' regenerated", updated.display_name)
        }))
    }
}

/// Fetches one reference record by id.
pub struct GetReferenceTool {
    context: Arc<ServiceContext>,
}

impl GetReferenceTool {
    /// Tool over the shared pipeline.
    pub fn new(context: Arc<ServiceContext>) -> Self {
        Self { context }
    }
}

#[async_trait]
impl McpTool for GetReferenceTool {
    fn name(&self) -> &str {
        "get_reference"
    }

    fn description(&self) -> &str {
        "Get one reference record (character or scene) by id"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "reference_id": {
                    "type": "string",
                    "description": "Reference id (char_* or scene_*)"
                }
            },
            "required": ["reference_id"]
        })
    }

    async fn execute(&self, input: Value) -> McpResult<Value> {
        let id = required_str(&input, "reference_id")?;
        let reference = self
            .context
            .registry()
            .get(id)
            .map_err(|e| McpError::InvalidInput(e.to_string()))?;
        serde_json::to_value(&reference)
            .map_err(|e| McpError::ToolExecutionFailed(e.to_string()))
    }
}

fn list_references(context: &ServiceContext, kind: ReferenceKind) -> McpResult<Value> {
    let references = context.registry().list(kind);
    let records: Vec<Value> = references
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<_, _>>()
        .map_err(|e| McpError::ToolExecutionFailed(e.to_string()))?;
    Ok(json!({
        "count": records.len(),
        "references": records
    }))
}

/// Lists every character reference, ordered by id.
pub struct ListCharactersTool {
    context: Arc<ServiceContext>,
}

impl ListCharactersTool {
    /// Tool over the shared pipeline.
    pub fn new(context: Arc<ServiceContext>) -> Self {
        Self { context }
    }
}

#[async_trait]
impl McpTool for ListCharactersTool {
    fn name(&self) -> &str {
        "list_characters"
    }

    fn description(&self) -> &str {
        "List every character reference with its id, description, and usage count"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {}
        })
    }

    async fn execute(&self, _input: Value) -> McpResult<Value> {
        list_references(&self.context, ReferenceKind::Character)
    }
}

/// Lists every scene reference, ordered by id.
pub struct ListScenesTool {
    context: Arc<ServiceContext>,
}

impl ListScenesTool {
    /// Tool over the shared pipeline.
    pub fn new(context: Arc<ServiceContext>) -> Self {
        Self { context }
    }
}

#[async_trait]
impl McpTool for ListScenesTool {
    fn name(&self) -> &str {
        "list_scenes"
    }

    fn description(&self) -> &str {
        "List every scene reference with its id, description, and tags"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {}
        })
    }

    async fn execute(&self, _input: Value) -> McpResult<Value> {
        list_references(&self.context, ReferenceKind::Scene)
    }
}
