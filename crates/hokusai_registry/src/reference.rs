//! Reference record types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// The two kinds of visual references the registry manages.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ReferenceKind {
    /// A character reference sheet
    Character,
    /// A scene/environment reference
    Scene,
}

impl ReferenceKind {
    /// The id prefix for this kind (`char_` or `scene_`).
    pub fn prefix(&self) -> &'static str {
        match self {
            ReferenceKind::Character => "char_",
            ReferenceKind::Scene => "scene_",
        }
    }
}

/// A character's visual identity: descriptive fields plus the generated
/// reference-sheet artifact reused across renders for consistency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterReference {
    /// Deterministic id derived from the display name (e.g., `char_kenta`)
    pub id: String,
    /// Human-chosen character name
    pub display_name: String,
    /// Appearance description used to generate the reference sheet
    pub description: String,
    /// Structured visual traits (hair color, clothing, age range, ...)
    #[serde(default)]
    pub visual_features: BTreeMap<String, String>,
    /// Art style the reference was generated in
    pub style_tag: String,
    /// How many render-request constructions have consumed this reference
    #[serde(default)]
    pub usage_count: u64,
    /// Storage location of the reference-sheet artifact
    pub artifact_location: String,
    /// When the reference was first created
    pub created_at: DateTime<Utc>,
    /// When descriptive fields or the artifact were last replaced
    pub updated_at: DateTime<Utc>,
}

/// A scene's visual identity, same shape as a character reference but with
/// free-form tags instead of visual features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneReference {
    /// Deterministic id derived from the display name (e.g., `scene_harbor`)
    pub id: String,
    /// Human-chosen scene name
    pub display_name: String,
    /// Environment description used to generate the reference
    pub description: String,
    /// Unordered descriptive tags (e.g., "city", "night")
    #[serde(default)]
    pub tags: BTreeSet<String>,
    /// Art style the reference was generated in
    pub style_tag: String,
    /// How many render-request constructions have consumed this reference
    #[serde(default)]
    pub usage_count: u64,
    /// Storage location of the reference artifact
    pub artifact_location: String,
    /// When the reference was first created
    pub created_at: DateTime<Utc>,
    /// When descriptive fields or the artifact were last replaced
    pub updated_at: DateTime<Utc>,
}

/// Either kind of reference, as returned by registry lookups.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Reference {
    /// A character reference
    Character(CharacterReference),
    /// A scene reference
    Scene(SceneReference),
}

impl Reference {
    /// The reference id.
    pub fn id(&self) -> &str {
        match self {
            Reference::Character(c) => &c.id,
            Reference::Scene(s) => &s.id,
        }
    }

    /// The human-chosen name.
    pub fn display_name(&self) -> &str {
        match self {
            Reference::Character(c) => &c.display_name,
            Reference::Scene(s) => &s.display_name,
        }
    }

    /// Which kind of reference this is.
    pub fn kind(&self) -> ReferenceKind {
        match self {
            Reference::Character(_) => ReferenceKind::Character,
            Reference::Scene(_) => ReferenceKind::Scene,
        }
    }

    /// Current usage count.
    pub fn usage_count(&self) -> u64 {
        match self {
            Reference::Character(c) => c.usage_count,
            Reference::Scene(s) => s.usage_count,
        }
    }

    /// Storage location of the reference artifact.
    pub fn artifact_location(&self) -> &str {
        match self {
            Reference::Character(c) => &c.artifact_location,
            Reference::Scene(s) => &s.artifact_location,
        }
    }
}
