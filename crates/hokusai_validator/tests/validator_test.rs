use async_trait::async_trait;
use hokusai_core::{AspectRatio, ImageSize, Page};
use hokusai_error::HokusaiResult;
use hokusai_interface::RenderDriver;
use hokusai_registry::ReferenceRegistry;
use hokusai_storage::DataLayout;
use hokusai_validator::StoryboardValidator;
use std::collections::BTreeMap;
use std::sync::Arc;

struct StubDriver;

#[async_trait]
impl RenderDriver for StubDriver {
    async fn render(
        &self,
        _instruction: &str,
        _reference_artifacts: &[String],
        _size_hint: ImageSize,
        _aspect_ratio: AspectRatio,
    ) -> HokusaiResult<Vec<u8>> {
        Ok(b"stub".to_vec())
    }

    fn provider_name(&self) -> &'static str {
        "stub"
    }

    fn model_name(&self) -> &str {
        "stub-model"
    }
}

async fn registry_with_kenta(dir: &std::path::Path) -> ReferenceRegistry {
    let registry = ReferenceRegistry::open(DataLayout::new(dir), Arc::new(StubDriver))
        .await
        .unwrap();
    registry
        .create_or_update_character("Kenta", "a boy", BTreeMap::new(), "manga")
        .await
        .unwrap();
    registry
}

fn sample_page(character_id: &str, dialogue_text: &str) -> Page {
    let raw = serde_json::json!({
        "page_number": 1,
        "panels": [
            {
                "panel_number": 1,
                "characters": [
                    {
                        "character_id": character_id,
                        "character_name": "Kenta",
                        "position": {"x": 0.5, "y": 0.6, "scale": 1.0},
                        "action": "waving"
                    }
                ],
                "dialogues": [
                    {"speaker": "Kenta", "text": dialogue_text}
                ],
                "background": "schoolyard",
                "camera_angle": "medium",
                "description": "Kenta waves from the schoolyard gate"
            }
        ]
    });
    Page::from_value(raw).unwrap()
}

#[tokio::test]
async fn clean_page_is_valid() {
    let dir = tempfile::tempdir().unwrap();
    let registry = registry_with_kenta(dir.path()).await;
    let page = sample_page("char_kenta", "Over here!");

    let report = StoryboardValidator::new().validate(&page, r#""Over here!" he called."#, &registry);
    assert!(report.valid);
    assert!(report.errors.is_empty());
    assert!(report.warnings.is_empty());
    assert_eq!(report.panels_count, 1);
    assert_eq!(report.dialogues_count, 1);
}

#[tokio::test]
async fn unknown_reference_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let registry = registry_with_kenta(dir.path()).await;
    let page = sample_page("char_stranger", "Over here!");

    let report = StoryboardValidator::new().validate(&page, "", &registry);
    assert!(!report.valid);
    assert!(report.errors.iter().any(|e| e.contains("char_stranger")));
}

#[tokio::test]
async fn empty_dialogue_text_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let registry = registry_with_kenta(dir.path()).await;
    let page = sample_page("char_kenta", "   ");

    let report = StoryboardValidator::new().validate(&page, "", &registry);
    assert!(!report.valid);
    assert!(report.errors.iter().any(|e| e.contains("empty text")));
}

#[tokio::test]
async fn unmatched_quote_warns_but_stays_valid() {
    let dir = tempfile::tempdir().unwrap();
    let registry = registry_with_kenta(dir.path()).await;
    let page = sample_page("char_kenta", "Over here!");

    let source = r#""Over here!" he called. "Wait for me," she answered."#;
    let report = StoryboardValidator::new().validate(&page, source, &registry);
    assert!(report.valid);
    assert_eq!(report.warnings.len(), 1);
    assert!(report.warnings[0].contains("Wait for me"));
}

#[tokio::test]
async fn off_panel_speaker_warns() {
    let dir = tempfile::tempdir().unwrap();
    let registry = registry_with_kenta(dir.path()).await;
    let mut page = sample_page("char_kenta", "Over here!");
    page.panels[0].dialogues[0].speaker = "Narrator".to_string();

    let report = StoryboardValidator::new().validate(&page, "", &registry);
    assert!(report.valid);
    assert!(report.warnings.iter().any(|w| w.contains("Narrator")));
}
