//! Camera framing for a panel.

use serde::{Deserialize, Serialize};

/// Camera angle for a panel.
///
/// The set is open: storyboard generators may emit framings beyond the known
/// variants, which round-trip through [`CameraAngle::Other`] untouched.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    Serialize,
    Deserialize,
)]
#[serde(from = "String", into = "String")]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum CameraAngle {
    /// Establishing-distance framing of the whole scene
    Wide,
    /// Waist-up framing
    Medium,
    /// Face or detail framing
    #[strum(serialize = "close-up")]
    CloseUp,
    /// Extreme detail framing
    #[strum(serialize = "extreme-close-up")]
    ExtremeCloseUp,
    /// Overhead framing
    #[strum(serialize = "birds-eye")]
    BirdsEye,
    /// Camera below subject, looking up
    #[strum(serialize = "low-angle")]
    LowAngle,
    /// Camera above subject, looking down
    #[strum(serialize = "high-angle")]
    HighAngle,
    /// Neutral eye-level framing
    #[strum(serialize = "eye-level")]
    EyeLevel,
    /// Scene-setting framing, typically opening a page
    Establishing,
    /// Any framing outside the known set, preserved verbatim
    #[strum(default, to_string = "{0}")]
    Other(String),
}

impl From<String> for CameraAngle {
    fn from(s: String) -> Self {
        // EnumString with a default variant cannot fail
        s.parse().unwrap_or(CameraAngle::Other(s))
    }
}

impl From<CameraAngle> for String {
    fn from(angle: CameraAngle) -> Self {
        angle.to_string()
    }
}
