//! Normalized coordinate types for panel composition.

use serde::{Deserialize, Serialize};

/// Placement of a character within a panel.
///
/// `x` and `y` are normalized to `[0, 1]` relative to the panel; `scale` is a
/// positive multiplier on the character's nominal size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    /// Horizontal position, 0.0 = left edge, 1.0 = right edge
    pub x: f64,
    /// Vertical position, 0.0 = top edge, 1.0 = bottom edge
    pub y: f64,
    /// Size multiplier, must be greater than zero
    pub scale: f64,
}

impl Placement {
    /// Check that coordinates are inside their declared domains.
    pub fn in_domain(&self) -> bool {
        (0.0..=1.0).contains(&self.x) && (0.0..=1.0).contains(&self.y) && self.scale > 0.0
    }
}

/// Speech bubble bounding box, normalized to the panel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BubbleBox {
    /// Horizontal position of the bubble
    pub x: f64,
    /// Vertical position of the bubble
    pub y: f64,
    /// Bubble width
    pub width: f64,
    /// Bubble height
    pub height: f64,
}

impl BubbleBox {
    /// Check that all fields are inside `[0, 1]`.
    pub fn in_domain(&self) -> bool {
        [self.x, self.y, self.width, self.height]
            .iter()
            .all(|v| (0.0..=1.0).contains(v))
    }
}
