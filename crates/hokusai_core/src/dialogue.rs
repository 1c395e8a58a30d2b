//! Dialogue lines within a panel.

use crate::BubbleBox;
use serde::{Deserialize, Serialize};

/// One line of speech in a panel.
///
/// The `speaker` does not have to match a character placed in the panel:
/// off-panel and narration speech is legal, and the validator reports a
/// mismatch as a warning rather than an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dialogue {
    /// Name of the speaking character (or narrator)
    pub speaker: String,
    /// The spoken text, must be non-empty
    pub text: String,
    /// Bubble placement, normalized to the panel
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<BubbleBox>,
    /// Emotional register (e.g., "angry", "joyful")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emotion: Option<String>,
}
