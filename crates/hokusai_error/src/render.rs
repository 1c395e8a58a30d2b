//! Render backend error types.

/// Kinds of render backend failures.
///
/// These cover one external image-generation call. A render failure is always
/// scoped to a single request and reported as data by the batch orchestrator,
/// never propagated as a process-level fault.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum RenderErrorKind {
    /// API key not found in environment
    #[display("GEMINI_API_KEY environment variable not set")]
    MissingApiKey,
    /// Failed to construct the HTTP client
    #[display("Failed to create render client: {}", _0)]
    ClientCreation(String),
    /// The HTTP request itself failed (connection, TLS, etc.)
    #[display("Render request failed: {}", _0)]
    Request(String),
    /// HTTP error with status code and message
    #[display("HTTP {} error: {}", status_code, message)]
    HttpError {
        /// HTTP status code
        status_code: u16,
        /// Error message
        message: String,
    },
    /// The external call did not complete within the configured timeout
    #[display("Render call timed out after {}s", _0)]
    Timeout(u64),
    /// The backend responded but no image data was present
    #[display("No image data in render response: {}", _0)]
    NoImage(String),
    /// Base64 decoding of returned image data failed
    #[display("Base64 decode error: {}", _0)]
    Base64Decode(String),
}

impl RenderErrorKind {
    /// Check if re-submitting the request is likely to succeed.
    ///
    /// The orchestrator never retries on its own; this informs the caller's
    /// re-submission decision.
    pub fn is_retryable(&self) -> bool {
        match self {
            RenderErrorKind::HttpError { status_code, .. } => {
                matches!(*status_code, 408 | 429 | 500 | 502 | 503 | 504)
            }
            RenderErrorKind::Timeout(_) => true,
            RenderErrorKind::Request(_) => true,
            _ => false,
        }
    }
}

/// Render error with location tracking.
///
/// # Examples
///
/// ```
/// use hokusai_error::{RenderError, RenderErrorKind};
///
/// let err = RenderError::new(RenderErrorKind::HttpError {
///     status_code: 429,
///     message: "rate limited".to_string(),
/// });
/// assert!(err.kind.is_retryable());
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Render Error: {} at line {} in {}", kind, line, file)]
pub struct RenderError {
    /// The kind of error that occurred
    pub kind: RenderErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl RenderError {
    /// Create a new render error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: RenderErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
