//! Trait definitions for Hokusai render backends.
//!
//! The render collaborator is the only suspension point in the pipeline: all
//! in-process work (validation, request building, registry lookups) stays
//! synchronous, and external image generation happens behind [`RenderDriver`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use async_trait::async_trait;
use hokusai_core::{AspectRatio, ImageSize};
use hokusai_error::HokusaiResult;

/// Core trait every image-generation backend implements.
///
/// Backends make no determinism guarantee across identical calls; visual
/// consistency comes only from the shared reference artifacts, which is why
/// the registry, not the backend, is the source of truth for identity.
#[async_trait]
pub trait RenderDriver: Send + Sync {
    /// Generate one image from an instruction and ordered reference artifacts.
    ///
    /// `reference_artifacts` are storage locations of previously generated
    /// reference images; the backend loads and attaches them to the call.
    /// Returns the raw artifact bytes.
    async fn render(
        &self,
        instruction: &str,
        reference_artifacts: &[String],
        size_hint: ImageSize,
        aspect_ratio: AspectRatio,
    ) -> HokusaiResult<Vec<u8>>;

    /// Provider name (e.g., "gemini").
    fn provider_name(&self) -> &'static str;

    /// Model identifier (e.g., "gemini-3-pro-image-preview").
    fn model_name(&self) -> &str;
}
