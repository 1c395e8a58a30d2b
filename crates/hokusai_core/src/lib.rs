//! Core storyboard data types for the Hokusai rendering library.
//!
//! This crate defines the page/panel/dialogue schema that external storyboard
//! generators produce and the rest of the workspace consumes. Parsing enforces
//! the structural invariants (dense panel numbering, non-empty descriptions,
//! normalized coordinate domains); serialization is lossless, including fields
//! this version of the schema does not recognize.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod camera;
mod dialogue;
mod geometry;
mod page;
mod panel;
mod render;

pub use camera::CameraAngle;
pub use dialogue::Dialogue;
pub use geometry::{BubbleBox, Placement};
pub use page::{Page, repair_json};
pub use panel::{CharacterPlacement, Panel};
pub use render::{AspectRatio, ImageSize, RenderRequest, RenderTarget};
