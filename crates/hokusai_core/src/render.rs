//! Render request types passed to the image-generation backend.

use serde::{Deserialize, Serialize};

/// Output resolution hint for the image backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ImageSize {
    /// 1K output
    #[serde(rename = "1K")]
    K1,
    /// 2K output
    #[default]
    #[serde(rename = "2K")]
    K2,
    /// 4K output
    #[serde(rename = "4K")]
    K4,
}

impl std::fmt::Display for ImageSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            ImageSize::K1 => "1K",
            ImageSize::K2 => "2K",
            ImageSize::K4 => "4K",
        };
        write!(f, "{text}")
    }
}

/// Aspect ratio for a rendered artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AspectRatio {
    /// 1:1
    #[serde(rename = "1:1")]
    Square,
    /// 16:9, the scene-reference default
    #[serde(rename = "16:9")]
    Wide,
    /// 9:16
    #[serde(rename = "9:16")]
    Tall,
    /// 3:4, the page default
    #[default]
    #[serde(rename = "3:4")]
    Portrait,
    /// 4:3
    #[serde(rename = "4:3")]
    Landscape,
    /// 3:2
    #[serde(rename = "3:2")]
    Photo,
    /// 2:3
    #[serde(rename = "2:3")]
    PhotoPortrait,
    /// 21:9
    #[serde(rename = "21:9")]
    Cinematic,
}

impl std::fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            AspectRatio::Square => "1:1",
            AspectRatio::Wide => "16:9",
            AspectRatio::Tall => "9:16",
            AspectRatio::Portrait => "3:4",
            AspectRatio::Landscape => "4:3",
            AspectRatio::Photo => "3:2",
            AspectRatio::PhotoPortrait => "2:3",
            AspectRatio::Cinematic => "21:9",
        };
        write!(f, "{text}")
    }
}

/// What a render request will produce: a whole page, or one panel of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RenderTarget {
    /// Page number the artifact belongs to
    pub page_number: u32,
    /// Panel number for panel-granular renders; `None` renders the whole page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub panel_number: Option<u32>,
}

impl RenderTarget {
    /// Target a whole page.
    pub fn page(page_number: u32) -> Self {
        Self {
            page_number,
            panel_number: None,
        }
    }

    /// Target one panel of a page.
    pub fn panel(page_number: u32, panel_number: u32) -> Self {
        Self {
            page_number,
            panel_number: Some(panel_number),
        }
    }
}

impl std::fmt::Display for RenderTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.panel_number {
            Some(panel) => write!(f, "page {}, panel {}", self.page_number, panel),
            None => write!(f, "page {}", self.page_number),
        }
    }
}

/// A composed instruction plus reference artifacts for one render call.
///
/// Produced by the request builder, consumed by the batch orchestrator. The
/// artifact lists carry storage locations; the backend client loads them when
/// the call is dispatched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderRequest {
    /// Page/panel the artifact will be committed against
    pub target: RenderTarget,
    /// Natural-language render instruction
    pub instruction: String,
    /// Character reference artifact locations, in attachment order
    pub character_artifacts: Vec<String>,
    /// Scene reference artifact locations, in attachment order
    pub scene_artifacts: Vec<String>,
    /// Output resolution hint
    pub size_hint: ImageSize,
    /// Output aspect ratio
    pub aspect_ratio: AspectRatio,
}

impl RenderRequest {
    /// All reference artifact locations, characters first, in order.
    pub fn reference_artifacts(&self) -> impl Iterator<Item = &str> {
        self.character_artifacts
            .iter()
            .chain(self.scene_artifacts.iter())
            .map(String::as_str)
    }
}
