//! Gemini image-generation backend for Hokusai.
//!
//! [`GeminiImageClient`] implements [`hokusai_interface::RenderDriver`]
//! against the `generateContent` REST endpoint, attaching reference artifacts
//! as inline base64 image parts. Consistency across renders comes entirely
//! from those shared references; the API offers no determinism guarantee for
//! identical calls.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod gemini;

pub use gemini::GeminiImageClient;
