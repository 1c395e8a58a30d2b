//! Batch orchestration error types.

/// Kinds of batch orchestration errors.
///
/// Per-item render failures are not errors at this level; they are collected
/// in the batch result. Only misuse of the orchestrator itself is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum BatchErrorKind {
    /// Concurrency limit must be a positive integer
    #[display("Invalid concurrency limit: {}", _0)]
    InvalidConcurrencyLimit(usize),
}

/// Batch error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Batch Error: {} at line {} in {}", kind, line, file)]
pub struct BatchError {
    /// The kind of error that occurred
    pub kind: BatchErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl BatchError {
    /// Create a new batch error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: BatchErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
