use async_trait::async_trait;
use hokusai_core::{AspectRatio, ImageSize};
use hokusai_error::HokusaiResult;
use hokusai_interface::RenderDriver;
use hokusai_mcp::{ServiceContext, ToolRegistry};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

struct StubDriver;

#[async_trait]
impl RenderDriver for StubDriver {
    async fn render(
        &self,
        instruction: &str,
        _reference_artifacts: &[String],
        _size_hint: ImageSize,
        _aspect_ratio: AspectRatio,
    ) -> HokusaiResult<Vec<u8>> {
        Ok(format!("rendered: {instruction}").into_bytes())
    }

    fn provider_name(&self) -> &'static str {
        "stub"
    }

    fn model_name(&self) -> &str {
        "stub-model"
    }
}

async fn tool_surface(dir: &std::path::Path) -> (ToolRegistry, Arc<ServiceContext>) {
    let context = Arc::new(
        ServiceContext::new(dir, Arc::new(StubDriver), Duration::from_secs(5))
            .await
            .unwrap(),
    );
    (ToolRegistry::standard(context.clone()), context)
}

fn storyboard(page_number: u32, character_id: &str) -> String {
    json!({
        "page_number": page_number,
        "panels": [
            {
                "panel_number": 1,
                "characters": [{
                    "character_id": character_id,
                    "character_name": "Kenta",
                    "position": {"x": 0.4, "y": 0.6, "scale": 1.0},
                    "action": "running"
                }],
                "dialogues": [{"speaker": "Kenta", "text": "I'm late again!"}],
                "background": "schoolyard at dawn",
                "camera_angle": "wide",
                "description": "Kenta bursts through the schoolyard gate"
            }
        ]
    })
    .to_string()
}

#[tokio::test]
async fn create_list_and_get_references() {
    let dir = tempfile::tempdir().unwrap();
    let (tools, _context) = tool_surface(dir.path()).await;

    let created = tools
        .execute(
            "create_character_reference",
            json!({"character_name": "Kenta", "description": "a ten-year-old boy"}),
        )
        .await
        .unwrap();
    assert_eq!(created["success"], true);
    assert_eq!(created["character_id"], "char_kenta");

    let listed = tools
        .execute("list_characters", json!({}))
        .await
        .unwrap();
    assert_eq!(listed["count"], 1);
    assert_eq!(listed["references"][0]["id"], "char_kenta");

    let fetched = tools
        .execute("get_reference", json!({"reference_id": "char_kenta"}))
        .await
        .unwrap();
    assert_eq!(fetched["display_name"], "Kenta");
}

#[tokio::test]
async fn generate_page_renders_and_persists() {
    let dir = tempfile::tempdir().unwrap();
    let (tools, context) = tool_surface(dir.path()).await;

    tools
        .execute(
            "create_character_reference",
            json!({"character_name": "Kenta", "description": "a ten-year-old boy"}),
        )
        .await
        .unwrap();

    let result = tools
        .execute(
            "generate_page",
            json!({"page_json": storyboard(1, "char_kenta")}),
        )
        .await
        .unwrap();
    assert_eq!(result["success"], true);
    assert_eq!(result["page_number"], 1);

    let stored = context.store().load(1).await.unwrap();
    assert!(stored.is_rendered());
    assert_eq!(
        context.registry().get("char_kenta").unwrap().usage_count(),
        1
    );
}

#[tokio::test]
async fn generate_page_reports_validation_errors_in_band() {
    let dir = tempfile::tempdir().unwrap();
    let (tools, context) = tool_surface(dir.path()).await;

    let result = tools
        .execute(
            "generate_page",
            json!({"page_json": storyboard(1, "char_nobody")}),
        )
        .await
        .unwrap();
    assert_eq!(result["success"], false);
    assert!(!result["errors"].as_array().unwrap().is_empty());

    // Invalid storyboards are never persisted
    assert!(context.store().load(1).await.is_err());
}

#[tokio::test]
async fn render_batch_isolates_missing_pages() {
    let dir = tempfile::tempdir().unwrap();
    let (tools, _context) = tool_surface(dir.path()).await;

    tools
        .execute(
            "create_character_reference",
            json!({"character_name": "Kenta", "description": "a boy"}),
        )
        .await
        .unwrap();
    tools
        .execute(
            "generate_page",
            json!({"page_json": storyboard(3, "char_kenta")}),
        )
        .await
        .unwrap();

    let result = tools
        .execute(
            "render_batch",
            json!({"page_numbers": [3, 9], "concurrency_limit": 2}),
        )
        .await
        .unwrap();
    assert_eq!(result["success"], false);
    assert_eq!(result["succeeded"][0]["page_number"], 3);
    assert_eq!(result["failed"][0]["page_number"], 9);
    assert_eq!(result["total_attempted"], 1);
    assert!(
        result["summary"]
            .as_str()
            .unwrap()
            .contains("Rendered 1 of 2")
    );
}

#[tokio::test]
async fn regenerate_page_replaces_one_panel() {
    let dir = tempfile::tempdir().unwrap();
    let (tools, context) = tool_surface(dir.path()).await;

    tools
        .execute(
            "create_character_reference",
            json!({"character_name": "Kenta", "description": "a boy"}),
        )
        .await
        .unwrap();
    tools
        .execute(
            "generate_page",
            json!({"page_json": storyboard(2, "char_kenta")}),
        )
        .await
        .unwrap();

    let result = tools
        .execute(
            "regenerate_page",
            json!({
                "page_number": 2,
                "panel": {
                    "panel_number": 1,
                    "characters": [],
                    "dialogues": [],
                    "background": "empty schoolyard",
                    "camera_angle": "establishing",
                    "description": "The schoolyard, suddenly empty"
                }
            }),
        )
        .await
        .unwrap();
    assert_eq!(result["success"], true);

    let stored = context.store().load(2).await.unwrap();
    assert_eq!(stored.panels[0].description, "The schoolyard, suddenly empty");
}

#[tokio::test]
async fn guide_tools_answer_without_input() {
    let dir = tempfile::tempdir().unwrap();
    let (tools, _context) = tool_surface(dir.path()).await;

    let guide = tools.execute("get_workflow_guide", json!({})).await.unwrap();
    assert!(guide["guide"].as_str().unwrap().contains("workflow"));

    let schema = tools
        .execute("get_storyboard_schema", json!({}))
        .await
        .unwrap();
    assert_eq!(schema["example"]["page_number"], 1);

    let info = tools.execute("server_info", json!({})).await.unwrap();
    assert_eq!(info["provider"], "stub");
}
