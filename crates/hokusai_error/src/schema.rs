//! Storyboard schema error types.

/// Kinds of schema violations in a storyboard record.
#[derive(Debug, Clone, PartialEq, derive_more::Display)]
pub enum SchemaErrorKind {
    /// A required field is absent from the record
    #[display("Missing required field: {}", _0)]
    MissingField(String),
    /// The record is not parseable JSON, even after repair
    #[display("Unparseable storyboard record: {}", _0)]
    JsonParse(String),
    /// Page number must be a positive integer
    #[display("Invalid page number: {}", _0)]
    InvalidPageNumber(i64),
    /// A page must contain at least one panel
    #[display("Page {} has no panels", _0)]
    EmptyPanels(u32),
    /// Panel numbers must form a dense 1..N sequence
    #[display("Panel numbering broken on page {}: {}", page, detail)]
    PanelNumbering {
        /// Page number the violation occurred on
        page: u32,
        /// Human-readable description of the gap or duplicate
        detail: String,
    },
    /// Panel descriptions drive image generation and must be non-empty
    #[display("Panel {} has an empty description", _0)]
    EmptyDescription(u32),
    /// A numeric field is outside its declared domain
    #[display("Field '{}' out of range: {}", field, value)]
    OutOfRange {
        /// Name of the offending field
        field: String,
        /// The rejected value
        value: f64,
    },
}

/// Schema error with location tracking.
///
/// # Examples
///
/// ```
/// use hokusai_error::{SchemaError, SchemaErrorKind};
///
/// let err = SchemaError::new(SchemaErrorKind::EmptyPanels(3));
/// assert!(format!("{}", err).contains("no panels"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Schema Error: {} at line {} in {}", kind, line, file)]
pub struct SchemaError {
    /// The kind of error that occurred
    pub kind: SchemaErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl SchemaError {
    /// Create a new schema error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: SchemaErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
