//! Page validation against source text and the reference registry.

use crate::speech::{QuoteHeuristic, SpeechMatcher};
use hokusai_core::Page;
use hokusai_registry::ReferenceRegistry;
use serde::Serialize;

/// Outcome of validating one page.
///
/// `errors` are violations the caller must fix before rendering; `warnings`
/// are advisory and never affect `valid`.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    /// True iff the error list is empty
    pub valid: bool,
    /// Violations that must be fixed, in detection order
    pub errors: Vec<String>,
    /// Advisory findings, in detection order
    pub warnings: Vec<String>,
    /// Total dialogue lines across all panels
    pub dialogues_count: usize,
    /// Number of panels on the page
    pub panels_count: usize,
}

/// Checks a page against its source text and the reference registry.
pub struct StoryboardValidator {
    matcher: Box<dyn SpeechMatcher>,
}

impl Default for StoryboardValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl StoryboardValidator {
    /// A validator with the default quote heuristic.
    pub fn new() -> Self {
        Self {
            matcher: Box::new(QuoteHeuristic),
        }
    }

    /// A validator with a caller-supplied speech matcher.
    pub fn with_matcher(matcher: Box<dyn SpeechMatcher>) -> Self {
        Self { matcher }
    }

    /// Validate a page against the source text it was derived from.
    ///
    /// Structural violations, empty dialogue text, and unresolved reference
    /// ids are errors. Source-text speech coverage and off-panel speakers
    /// are warnings.
    #[tracing::instrument(skip(self, page, source_text, registry), fields(page = page.page_number))]
    pub fn validate(
        &self,
        page: &Page,
        source_text: &str,
        registry: &ReferenceRegistry,
    ) -> ValidationReport {
        let mut errors = page.structural_issues();
        let mut warnings = Vec::new();
        let mut dialogues_count = 0;

        for panel in &page.panels {
            for placement in &panel.characters {
                if !registry.contains(&placement.character_id) {
                    errors.push(format!(
                        "panel {}: unknown character reference '{}'",
                        panel.panel_number, placement.character_id
                    ));
                }
            }
            if let Some(background_ref) = &panel.background_ref {
                if !registry.contains(background_ref) {
                    errors.push(format!(
                        "panel {}: unknown scene reference '{}'",
                        panel.panel_number, background_ref
                    ));
                }
            }

            for dialogue in &panel.dialogues {
                dialogues_count += 1;
                if dialogue.text.trim().is_empty() {
                    errors.push(format!(
                        "panel {}: dialogue by '{}' has empty text",
                        panel.panel_number, dialogue.speaker
                    ));
                }
                let speaker = dialogue.speaker.trim();
                let on_panel = panel
                    .characters
                    .iter()
                    .any(|p| p.character_name.eq_ignore_ascii_case(speaker));
                if !speaker.is_empty() && !on_panel {
                    warnings.push(format!(
                        "panel {}: speaker '{}' is not placed in the panel",
                        panel.panel_number, speaker
                    ));
                }
            }
        }

        for span in self.matcher.quoted_spans(source_text) {
            let covered = page
                .panels
                .iter()
                .flat_map(|panel| &panel.dialogues)
                .any(|dialogue| self.matcher.covers(&span, &dialogue.text));
            if !covered {
                warnings.push(format!(
                    "quoted speech not found in any dialogue: \"{span}\""
                ));
            }
        }

        let valid = errors.is_empty();
        if !valid {
            tracing::warn!(
                errors = errors.len(),
                warnings = warnings.len(),
                "page failed validation"
            );
        }
        ValidationReport {
            valid,
            errors,
            warnings,
            dialogues_count,
            panels_count: page.panels.len(),
        }
    }
}
