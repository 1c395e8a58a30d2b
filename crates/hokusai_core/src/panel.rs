//! Panel types: one illustrated frame within a page.

use crate::{CameraAngle, Dialogue, Placement};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A character's appearance within one panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterPlacement {
    /// Registry id of the character reference (e.g., `char_miko`)
    pub character_id: String,
    /// Display name of the character
    pub character_name: String,
    /// Where and how large the character appears in the panel
    pub position: Placement,
    /// What the character is doing (e.g., "walking", "crouching")
    pub action: String,
    /// Facial expression, if specified
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,
}

/// One illustrated frame within a page.
///
/// `description` is the natural-language render instruction for this frame and
/// must be non-empty. Fields this schema version does not recognize are kept
/// in `extra` and written back out unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Panel {
    /// 1-based panel number, dense and unique within the page
    pub panel_number: u32,
    /// Characters appearing in this panel, in draw order
    #[serde(default)]
    pub characters: Vec<CharacterPlacement>,
    /// Dialogue lines, in reading order
    #[serde(default)]
    pub dialogues: Vec<Dialogue>,
    /// Background scene description
    pub background: String,
    /// Registry id of a scene reference backing the background, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_ref: Option<String>,
    /// Camera framing for this panel
    pub camera_angle: CameraAngle,
    /// Onomatopoeia and other lettered sound effects
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sound_effects: Vec<String>,
    /// Natural-language render instruction, must be non-empty
    pub description: String,
    /// Unrecognized fields, preserved for forward compatibility
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
