//! Filesystem persistence for Hokusai storyboard records and artifacts.
//!
//! Everything on disk is keyed by stable identifiers: reference artifacts by
//! their deterministic registry id, page records and artifacts by zero-padded
//! page number. Writes go through a temp-file-plus-rename path so concurrent
//! readers never observe a partially written record.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod fs;
mod layout;
mod page_store;

pub use fs::{ensure_dir, read_bytes, read_to_string, write_atomic};
pub use layout::DataLayout;
pub use page_store::PageStore;
