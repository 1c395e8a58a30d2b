//! Character and scene reference registry for Hokusai.
//!
//! The registry is the single source of truth mapping human-chosen names to
//! reference identities and their generated artifacts. Identity is a pure
//! function of kind and name, so two resolutions of the same name always
//! agree, even under concurrent creation; writes to the same id are
//! serialized through a per-id lock while reads of other ids proceed freely.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod reference;
mod registry;

pub use reference::{CharacterReference, Reference, ReferenceKind, SceneReference};
pub use registry::{ReferenceRegistry, derive_id};
