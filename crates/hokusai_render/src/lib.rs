//! Render pipeline for Hokusai: request composition and batch dispatch.
//!
//! [`RequestBuilder`] turns validated storyboard content into
//! [`hokusai_core::RenderRequest`] values by resolving reference ids through
//! the registry. [`BatchOrchestrator`] dispatches a batch of requests against
//! the render backend with a bounded number of calls in flight, commits
//! successful artifacts to the page store, and reports per-item outcomes in
//! submission order.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod builder;
mod orchestrator;

pub use builder::RequestBuilder;
pub use orchestrator::{BatchOrchestrator, BatchResult, CancelFlag};
