//! Top-level error wrapper types.

use crate::{BatchError, RegistryError, RenderError, SchemaError, StorageError};

/// This is the foundation error enum. Every failure state in the core is
/// representable as data; nothing here should crash the host process.
///
/// # Examples
///
/// ```
/// use hokusai_error::{HokusaiError, SchemaError, SchemaErrorKind};
///
/// let schema_err = SchemaError::new(SchemaErrorKind::EmptyPanels(1));
/// let err: HokusaiError = schema_err.into();
/// assert!(format!("{}", err).contains("Schema Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum HokusaiErrorKind {
    /// Malformed storyboard structure, fatal to that record only
    #[from(SchemaError)]
    Schema(SchemaError),
    /// Unresolved or corrupt reference, fatal to that render request only
    #[from(RegistryError)]
    Registry(RegistryError),
    /// External render call failed or timed out
    #[from(RenderError)]
    Render(RenderError),
    /// Batch orchestrator misuse, rejected before dispatch
    #[from(BatchError)]
    Batch(BatchError),
    /// Filesystem persistence failure
    #[from(StorageError)]
    Storage(StorageError),
}

/// Hokusai error with kind discrimination.
///
/// # Examples
///
/// ```
/// use hokusai_error::{HokusaiResult, RegistryError, RegistryErrorKind};
///
/// fn might_fail() -> HokusaiResult<()> {
///     Err(RegistryError::new(RegistryErrorKind::NotFound("char_aya".to_string())))?
/// }
///
/// match might_fail() {
///     Ok(_) => println!("Success"),
///     Err(e) => println!("Error: {}", e),
/// }
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Hokusai Error: {}", _0)]
pub struct HokusaiError(Box<HokusaiErrorKind>);

impl HokusaiError {
    /// Create a new error from a kind.
    pub fn new(kind: HokusaiErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &HokusaiErrorKind {
        &self.0
    }
}

// Generic From implementation for any type that converts to HokusaiErrorKind
impl<T> From<T> for HokusaiError
where
    T: Into<HokusaiErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Hokusai operations.
pub type HokusaiResult<T> = std::result::Result<T, HokusaiError>;
