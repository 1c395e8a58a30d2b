//! Reference registry error types.

/// Kinds of reference registry errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum RegistryErrorKind {
    /// No reference exists for the given id
    #[display("Reference not found: {}", _0)]
    NotFound(String),
    /// No reference exists for the given display name
    #[display("No reference named '{}'", _0)]
    NameNotFound(String),
    /// Reference name produced an empty id after slugging
    #[display("Invalid reference name: '{}'", _0)]
    InvalidName(String),
    /// A persisted reference record could not be read back
    #[display("Corrupt reference record: {}", _0)]
    CorruptRecord(String),
}

/// Registry error with location tracking.
///
/// # Examples
///
/// ```
/// use hokusai_error::{RegistryError, RegistryErrorKind};
///
/// let err = RegistryError::new(RegistryErrorKind::NotFound("scene_harbor".to_string()));
/// assert!(format!("{}", err).contains("not found"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Registry Error: {} at line {} in {}", kind, line, file)]
pub struct RegistryError {
    /// The kind of error that occurred
    pub kind: RegistryErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl RegistryError {
    /// Create a new registry error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: RegistryErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
