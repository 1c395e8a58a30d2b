//! Storyboard validation for Hokusai.
//!
//! The validator checks a parsed page against the source text it was derived
//! from and against the reference registry. Structural problems (panel
//! numbering, empty dialogue text, unresolved references, out-of-domain
//! coordinates) are errors; text-coverage checks are advisory warnings only,
//! because extracting quoted speech from free text is a similarity heuristic,
//! not a proof. A page with warnings and no errors is still valid.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod speech;
mod validator;

pub use speech::{QuoteHeuristic, SpeechMatcher};
pub use validator::{StoryboardValidator, ValidationReport};
