//! Render request composition.

use hokusai_core::{AspectRatio, ImageSize, Page, Panel, RenderRequest, RenderTarget};
use hokusai_error::HokusaiResult;
use hokusai_registry::ReferenceRegistry;
use std::fmt::Write as _;
use std::sync::Arc;

/// Composes [`RenderRequest`] values from storyboard content.
///
/// Every reference id is resolved through the registry; an unresolved id is a
/// hard failure, because rendering without the reference artifact would
/// silently lose visual consistency. Usage counts are bumped once per resolved
/// occurrence, and only after every id in the request has resolved, so a
/// failed build leaves all counts untouched. Composition itself performs no
/// I/O.
pub struct RequestBuilder {
    registry: Arc<ReferenceRegistry>,
}

impl RequestBuilder {
    /// A builder resolving ids against the given registry.
    pub fn new(registry: Arc<ReferenceRegistry>) -> Self {
        Self { registry }
    }

    /// Compose a request for one panel from an explicit instruction and
    /// reference id lists.
    #[tracing::instrument(skip(self, instruction, character_ids, scene_ids))]
    pub fn build_panel_request(
        &self,
        page_number: u32,
        panel_number: u32,
        instruction: &str,
        character_ids: &[String],
        scene_ids: &[String],
        size_hint: ImageSize,
        aspect_ratio: AspectRatio,
    ) -> HokusaiResult<RenderRequest> {
        let character_artifacts = self.resolve_all(character_ids)?;
        let scene_artifacts = self.resolve_all(scene_ids)?;
        self.record_all(character_ids.iter().chain(scene_ids))?;

        Ok(RenderRequest {
            target: RenderTarget::panel(page_number, panel_number),
            instruction: instruction.to_string(),
            character_artifacts,
            scene_artifacts,
            size_hint,
            aspect_ratio,
        })
    }

    /// Compose a single whole-page request from a parsed page.
    ///
    /// The instruction concatenates every panel's camera framing,
    /// description, dialogue, and sound effects under a style header, so the
    /// backend renders the full page as one image. Reference artifacts are
    /// attached once per distinct id; usage is still counted per panel
    /// occurrence.
    #[tracing::instrument(skip(self, page, style), fields(page = page.page_number))]
    pub fn build_page_request(
        &self,
        page: &Page,
        style: &str,
        size_hint: ImageSize,
        aspect_ratio: AspectRatio,
    ) -> HokusaiResult<RenderRequest> {
        let mut character_artifacts = Vec::new();
        let mut scene_artifacts = Vec::new();
        let mut occurrences = Vec::new();

        for panel in &page.panels {
            for placement in &panel.characters {
                let reference = self.registry.get(&placement.character_id)?;
                push_unique(&mut character_artifacts, reference.artifact_location());
                occurrences.push(&placement.character_id);
            }
            if let Some(background_ref) = &panel.background_ref {
                let reference = self.registry.get(background_ref)?;
                push_unique(&mut scene_artifacts, reference.artifact_location());
                occurrences.push(background_ref);
            }
        }
        self.record_all(occurrences)?;

        Ok(RenderRequest {
            target: RenderTarget::page(page.page_number),
            instruction: page_instruction(page, style),
            character_artifacts,
            scene_artifacts,
            size_hint,
            aspect_ratio,
        })
    }

    fn resolve_all(&self, ids: &[String]) -> HokusaiResult<Vec<String>> {
        let mut artifacts = Vec::with_capacity(ids.len());
        for id in ids {
            let reference = self.registry.get(id)?;
            artifacts.push(reference.artifact_location().to_string());
        }
        Ok(artifacts)
    }

    // Only called once every id in the request has resolved.
    fn record_all<I, S>(&self, ids: I) -> HokusaiResult<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for id in ids {
            self.registry.record_usage(id.as_ref())?;
        }
        Ok(())
    }
}

fn push_unique(artifacts: &mut Vec<String>, location: &str) {
    if !artifacts.iter().any(|a| a == location) {
        artifacts.push(location.to_string());
    }
}

fn page_instruction(page: &Page, style: &str) -> String {
    let mut text = format!(
        "{style}-style comic page with {} panels.\n",
        page.panels.len()
    );
    text.push_str("Requirements:\n");
    text.push_str("1. Render all dialogue, captions, and sound-effect lettering legibly.\n");
    text.push_str(
        "2. Lay out speech bubbles and captions left to right, top to bottom, in reading order.\n",
    );
    for panel in &page.panels {
        text.push_str(&panel_line(panel));
        text.push('\n');
    }
    if let Some(notes) = &page.page_notes {
        if !notes.trim().is_empty() {
            let _ = write!(text, "Page notes: {notes}");
        }
    }
    text
}

fn panel_line(panel: &Panel) -> String {
    let mut line = format!("{} shot. ", panel.camera_angle);
    let _ = write!(line, "Panel {}: {}", panel.panel_number, panel.description);
    if !panel.dialogues.is_empty() {
        line.push_str(", dialogue:");
        for dialogue in &panel.dialogues {
            let _ = write!(line, " {} says: '{}'", dialogue.speaker, dialogue.text);
        }
    }
    if !panel.sound_effects.is_empty() {
        let _ = write!(
            line,
            ", sound-effect lettering: {}",
            panel.sound_effects.join(" ")
        );
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use hokusai_core::{CameraAngle, Dialogue};
    use serde_json::Map;

    fn panel(n: u32, description: &str) -> Panel {
        Panel {
            panel_number: n,
            characters: Vec::new(),
            dialogues: vec![Dialogue {
                speaker: "Aya".to_string(),
                text: "Hold on!".to_string(),
                position: None,
                emotion: None,
            }],
            background: "rooftop".to_string(),
            background_ref: None,
            camera_angle: CameraAngle::Wide,
            sound_effects: vec!["WHOOSH".to_string()],
            description: description.to_string(),
            extra: Map::new(),
        }
    }

    #[test]
    fn page_instruction_covers_every_panel() {
        let page = Page {
            page_number: 2,
            panels: vec![panel(1, "Aya leaps between rooftops"), panel(2, "She lands hard")],
            page_notes: Some("rain throughout".to_string()),
            rendered_artifact_location: None,
            extra: Map::new(),
        };

        let text = page_instruction(&page, "manga");
        assert!(text.starts_with("manga-style comic page with 2 panels."));
        assert!(text.contains("Panel 1: Aya leaps between rooftops"));
        assert!(text.contains("Panel 2: She lands hard"));
        assert!(text.contains("Aya says: 'Hold on!'"));
        assert!(text.contains("sound-effect lettering: WHOOSH"));
        assert!(text.contains("Page notes: rain throughout"));
    }

    #[test]
    fn duplicate_artifacts_attach_once() {
        let mut artifacts = Vec::new();
        push_unique(&mut artifacts, "refs/a.jpg");
        push_unique(&mut artifacts, "refs/b.jpg");
        push_unique(&mut artifacts, "refs/a.jpg");
        assert_eq!(artifacts, vec!["refs/a.jpg", "refs/b.jpg"]);
    }
}
