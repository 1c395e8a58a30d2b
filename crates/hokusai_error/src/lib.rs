//! Error types for the Hokusai library.
//!
//! This crate provides the foundation error types used throughout the Hokusai ecosystem.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern for clean error handling:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! # Examples
//!
//! ```
//! use hokusai_error::{HokusaiResult, RegistryError, RegistryErrorKind};
//!
//! fn resolve() -> HokusaiResult<String> {
//!     Err(RegistryError::new(RegistryErrorKind::NotFound("char_miko".to_string())))?
//! }
//!
//! match resolve() {
//!     Ok(id) => println!("Resolved: {}", id),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod batch;
mod error;
mod registry;
mod render;
mod schema;
mod storage;

pub use batch::{BatchError, BatchErrorKind};
pub use error::{HokusaiError, HokusaiErrorKind, HokusaiResult};
pub use registry::{RegistryError, RegistryErrorKind};
pub use render::{RenderError, RenderErrorKind};
pub use schema::{SchemaError, SchemaErrorKind};
pub use storage::{StorageError, StorageErrorKind};
