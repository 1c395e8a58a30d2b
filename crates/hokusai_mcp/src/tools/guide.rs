//! Orientation tools: workflow guide and storyboard schema.

use crate::tools::McpTool;
use crate::McpResult;
use async_trait::async_trait;
use serde_json::{Value, json};

const WORKFLOW_GUIDE: &str = r#"Hokusai comic generation workflow

1. Call get_storyboard_schema to learn the page record format.
2. Create a character reference for every recurring character with
   create_character_reference. The reference sheet is reused on every
   render of that character, which is what keeps their appearance
   consistent across pages. Use list_characters to see what exists.
3. Create scene references for important recurring locations with
   create_scene_reference (optional; unreferenced backgrounds are drawn
   from the panel's background text alone).
4. Write one storyboard JSON record per page. Panel numbers must run
   1..N with no gaps. Every character placement must carry the
   character_id returned at creation time.
5. Call generate_page with the storyboard JSON. The page is validated
   first; structural errors are returned instead of rendering. Warnings
   (for example dialogue that does not cover a quoted line of the source
   text) are advisory and do not block rendering.
6. For many pages, save each record first and call render_batch with the
   page numbers and a small concurrency limit (2-4). Failed pages are
   reported individually; re-submit only those numbers.
7. If one page needs a fix, call regenerate_page. It re-renders from the
   stored record, optionally replacing a single panel first.

Unsatisfied with a character's look? update_character_reference
regenerates the sheet while keeping the id, so existing storyboards
stay valid."#;

/// Returns the workflow guide. Read this first.
pub struct WorkflowGuideTool;

#[async_trait]
impl McpTool for WorkflowGuideTool {
    fn name(&self) -> &str {
        "get_workflow_guide"
    }

    fn description(&self) -> &str {
        "Get the comic generation workflow guide - read this before anything else; it explains the order of operations and how visual consistency works"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {}
        })
    }

    async fn execute(&self, _input: Value) -> McpResult<Value> {
        Ok(json!({ "guide": WORKFLOW_GUIDE }))
    }
}

/// Returns the storyboard record schema with a worked example.
pub struct StoryboardSchemaTool;

#[async_trait]
impl McpTool for StoryboardSchemaTool {
    fn name(&self) -> &str {
        "get_storyboard_schema"
    }

    fn description(&self) -> &str {
        "Get the JSON schema and an example for storyboard page records - use this to format pages for generate_page"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {}
        })
    }

    async fn execute(&self, _input: Value) -> McpResult<Value> {
        Ok(json!({
            "schema": {
                "page_number": "positive integer, globally unique",
                "panels": [{
                    "panel_number": "1-based, dense: panels must be numbered 1..N in order",
                    "description": "natural-language render instruction for the frame, required and non-empty",
                    "background": "background scene description",
                    "background_ref": "optional scene reference id (scene_*)",
                    "camera_angle": "one of: wide, medium, close-up, extreme-close-up, birds-eye, low-angle, high-angle, eye-level, establishing - or free text",
                    "characters": [{
                        "character_id": "registry id returned by create_character_reference (char_*)",
                        "character_name": "display name",
                        "position": {"x": "0.0-1.0", "y": "0.0-1.0", "scale": "> 0"},
                        "action": "what the character is doing",
                        "expression": "optional facial expression"
                    }],
                    "dialogues": [{
                        "speaker": "character name",
                        "text": "spoken line, non-empty",
                        "position": "optional bubble box {x, y, width, height} all 0.0-1.0",
                        "emotion": "optional delivery note"
                    }],
                    "sound_effects": ["optional onomatopoeia strings"]
                }],
                "page_notes": "optional free-form notes"
            },
            "example": {
                "page_number": 1,
                "panels": [{
                    "panel_number": 1,
                    "description": "Kenta bursts through the schoolyard gate, bag swinging",
                    "background": "schoolyard at dawn",
                    "camera_angle": "wide",
                    "characters": [{
                        "character_id": "char_kenta",
                        "character_name": "Kenta",
                        "position": {"x": 0.4, "y": 0.6, "scale": 1.0},
                        "action": "running",
                        "expression": "panicked"
                    }],
                    "dialogues": [{
                        "speaker": "Kenta",
                        "text": "I'm late again!"
                    }],
                    "sound_effects": ["DASH"]
                }]
            },
            "formatting_notes": [
                "Escape quotes inside dialogue text",
                "No trailing commas (one repair pass is attempted, do not rely on it)",
                "Double quotes only, matched brackets"
            ]
        }))
    }
}
