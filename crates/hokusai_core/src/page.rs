//! Page parsing, invariant enforcement, and lossless serialization.

use crate::Panel;
use hokusai_error::{HokusaiResult, SchemaError, SchemaErrorKind};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::OnceLock;

/// An ordered sequence of panels rendered together as one output artifact.
///
/// A page is *unvalidated* until it passes the validator, and *rendered* once
/// `rendered_artifact_location` is set. Field names here are the wire contract
/// other tooling depends on; unrecognized fields round-trip through `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Positive, globally unique page number
    pub page_number: u32,
    /// Panels in reading order, non-empty
    pub panels: Vec<Panel>,
    /// Free-form notes attached to the page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_notes: Option<String>,
    /// Location of the rendered page artifact, once rendered
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rendered_artifact_location: Option<String>,
    /// Unrecognized fields, preserved for forward compatibility
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Page {
    /// Parse a page from JSON text, enforcing the schema invariants.
    ///
    /// Storyboard generators occasionally emit near-JSON with trailing commas;
    /// one repair pass is attempted before the record is rejected.
    pub fn parse(text: &str) -> HokusaiResult<Self> {
        let value: Value = match serde_json::from_str(text) {
            Ok(v) => v,
            Err(first) => {
                let repaired = repair_json(text);
                serde_json::from_str(&repaired)
                    .map_err(|_| SchemaError::new(SchemaErrorKind::JsonParse(first.to_string())))?
            }
        };
        Self::from_value(value)
    }

    /// Build a page from an already-parsed JSON value, enforcing invariants.
    pub fn from_value(value: Value) -> HokusaiResult<Self> {
        let page: Page = serde_json::from_value(value).map_err(schema_error_from_serde)?;
        page.verify()?;
        Ok(page)
    }

    /// Serialize the page back to a JSON value. Lossless for all fields,
    /// recognized or not.
    pub fn to_value(&self) -> HokusaiResult<Value> {
        serde_json::to_value(self)
            .map_err(|e| SchemaError::new(SchemaErrorKind::JsonParse(e.to_string())).into())
    }

    /// Check the structural invariants, failing on the first violation.
    pub fn verify(&self) -> HokusaiResult<()> {
        match self.violations().into_iter().next() {
            Some(kind) => Err(SchemaError::new(kind).into()),
            None => Ok(()),
        }
    }

    /// Collect every structural violation as a human-readable string.
    ///
    /// The validator reports all of them at once rather than stopping at the
    /// first, so callers can fix a whole record in one pass.
    pub fn structural_issues(&self) -> Vec<String> {
        self.violations().iter().map(|k| k.to_string()).collect()
    }

    fn violations(&self) -> Vec<SchemaErrorKind> {
        let mut found = Vec::new();

        if self.page_number == 0 {
            found.push(SchemaErrorKind::InvalidPageNumber(0));
        }
        if self.panels.is_empty() {
            found.push(SchemaErrorKind::EmptyPanels(self.page_number));
            return found;
        }

        // Panel numbers must be exactly 1..=N in order
        for (index, panel) in self.panels.iter().enumerate() {
            let expected = index as u32 + 1;
            if panel.panel_number != expected {
                found.push(SchemaErrorKind::PanelNumbering {
                    page: self.page_number,
                    detail: format!(
                        "expected panel {} at position {}, found panel {}",
                        expected, index, panel.panel_number
                    ),
                });
            }
        }

        for panel in &self.panels {
            if panel.description.trim().is_empty() {
                found.push(SchemaErrorKind::EmptyDescription(panel.panel_number));
            }
            for placement in &panel.characters {
                if !placement.position.in_domain() {
                    let field = format!(
                        "panels[{}].characters[{}].position",
                        panel.panel_number, placement.character_id
                    );
                    found.push(SchemaErrorKind::OutOfRange {
                        field,
                        value: out_of_domain_value(placement.position.x, placement.position.y)
                            .unwrap_or(placement.position.scale),
                    });
                }
            }
            for (i, dialogue) in panel.dialogues.iter().enumerate() {
                if let Some(bubble) = &dialogue.position {
                    if !bubble.in_domain() {
                        let field =
                            format!("panels[{}].dialogues[{}].position", panel.panel_number, i);
                        found.push(SchemaErrorKind::OutOfRange {
                            field,
                            value: out_of_domain_value(bubble.x, bubble.y)
                                .or(out_of_domain_value(bubble.width, bubble.height))
                                .unwrap_or(bubble.x),
                        });
                    }
                }
            }
        }

        found
    }

    /// Look up a panel by its 1-based number.
    pub fn panel(&self, panel_number: u32) -> Option<&Panel> {
        self.panels.iter().find(|p| p.panel_number == panel_number)
    }

    /// Replace one panel in place, keyed by its panel number.
    ///
    /// The page number and all other panels are unaffected. Fails with a
    /// numbering violation if no panel with that number exists.
    pub fn replace_panel(&mut self, panel: Panel) -> HokusaiResult<()> {
        let slot = self
            .panels
            .iter_mut()
            .find(|p| p.panel_number == panel.panel_number);
        match slot {
            Some(existing) => {
                *existing = panel;
                Ok(())
            }
            None => Err(SchemaError::new(SchemaErrorKind::PanelNumbering {
                page: self.page_number,
                detail: format!("no panel {} to replace", panel.panel_number),
            })
            .into()),
        }
    }

    /// True once a rendered artifact has been committed for this page.
    pub fn is_rendered(&self) -> bool {
        self.rendered_artifact_location.is_some()
    }
}

fn out_of_domain_value(a: f64, b: f64) -> Option<f64> {
    if !(0.0..=1.0).contains(&a) {
        Some(a)
    } else if !(0.0..=1.0).contains(&b) {
        Some(b)
    } else {
        None
    }
}

fn schema_error_from_serde(err: serde_json::Error) -> SchemaError {
    let message = err.to_string();
    // serde_json reports absent fields as "missing field `name`"
    if let Some(rest) = message.strip_prefix("missing field `") {
        if let Some(field) = rest.split('`').next() {
            return SchemaError::new(SchemaErrorKind::MissingField(field.to_string()));
        }
    }
    SchemaError::new(SchemaErrorKind::JsonParse(message))
}

/// Strip trailing commas before closing brackets, the most common defect in
/// generator-emitted JSON. Anything more ambitious risks corrupting dialogue
/// text, so one conservative pass is all that is attempted.
pub fn repair_json(text: &str) -> String {
    static TRAILING_COMMA: OnceLock<regex::Regex> = OnceLock::new();
    let re = TRAILING_COMMA.get_or_init(|| {
        regex::Regex::new(r",\s*([}\]])").unwrap_or_else(|_| unreachable!("static pattern"))
    });
    re.replace_all(text, "$1").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repair_strips_trailing_commas() {
        let broken = r#"{"page_number": 1, "panels": [{"a": 1,},],}"#;
        let fixed = repair_json(broken);
        assert!(serde_json::from_str::<Value>(&fixed).is_ok());
    }

    #[test]
    fn missing_field_is_identified() {
        let text = r#"{"page_number": 1, "panels": [{"panel_number": 1,
            "background": "street", "camera_angle": "wide"}]}"#;
        let err = Page::parse(text).unwrap_err();
        assert!(err.to_string().contains("description"));
    }
}
