//! Persistent store for page records and rendered artifacts.

use crate::{DataLayout, fs};
use hokusai_core::{Page, RenderTarget};
use hokusai_error::{HokusaiResult, SchemaError, SchemaErrorKind};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Persists page records and rendered artifacts, keyed by page number.
///
/// Writes to the same page number are serialized through a per-page lock;
/// different pages may be written concurrently without coordination. Pages are
/// never deleted by the core.
pub struct PageStore {
    layout: DataLayout,
    locks: Mutex<HashMap<u32, Arc<tokio::sync::Mutex<()>>>>,
}

impl std::fmt::Debug for PageStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageStore")
            .field("root", &self.layout.root())
            .finish_non_exhaustive()
    }
}

impl PageStore {
    /// Create a store over the given layout.
    pub fn new(layout: DataLayout) -> Self {
        Self {
            layout,
            locks: Mutex::new(HashMap::new()),
        }
    }

    fn page_lock(&self, page_number: u32) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().unwrap();
        locks.entry(page_number).or_default().clone()
    }

    /// Persist a page record at its zero-padded location.
    #[tracing::instrument(skip(self, page), fields(page = page.page_number))]
    pub async fn save(&self, page: &Page) -> HokusaiResult<()> {
        let value = page.to_value()?;
        let bytes = serde_json::to_vec_pretty(&value)
            .map_err(|e| SchemaError::new(SchemaErrorKind::JsonParse(e.to_string())))?;

        let lock = self.page_lock(page.page_number);
        let _guard = lock.lock().await;
        fs::write_atomic(&self.layout.page_record(page.page_number), &bytes).await?;

        tracing::info!(page = page.page_number, "Saved page record");
        Ok(())
    }

    /// Load a page record by number.
    pub async fn load(&self, page_number: u32) -> HokusaiResult<Page> {
        let text = fs::read_to_string(&self.layout.page_record(page_number)).await?;
        Page::parse(&text)
    }

    /// List stored page numbers in ascending order.
    pub async fn list(&self) -> HokusaiResult<Vec<u32>> {
        let dir = self.layout.page_dir();
        if !tokio::fs::try_exists(&dir).await.unwrap_or(false) {
            return Ok(Vec::new());
        }

        let mut numbers = Vec::new();
        let mut entries = tokio::fs::read_dir(&dir).await.map_err(|e| {
            hokusai_error::StorageError::new(hokusai_error::StorageErrorKind::FileRead(format!(
                "{}: {}",
                dir.display(),
                e
            )))
        })?;
        while let Some(entry) = entries.next_entry().await.map_err(|e| {
            hokusai_error::StorageError::new(hokusai_error::StorageErrorKind::FileRead(format!(
                "{}: {}",
                dir.display(),
                e
            )))
        })? {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if let Some(stem) = name.strip_prefix("page_").and_then(|s| s.strip_suffix(".json")) {
                if let Ok(number) = stem.parse::<u32>() {
                    numbers.push(number);
                }
            }
        }
        numbers.sort_unstable();
        Ok(numbers)
    }

    /// Commit a rendered artifact for a page or panel target.
    ///
    /// For whole-page targets the page record's `rendered_artifact_location`
    /// is updated in the same per-page critical section. Returns the artifact
    /// location.
    #[tracing::instrument(skip(self, bytes), fields(target = %target, size = bytes.len()))]
    pub async fn set_rendered(&self, target: RenderTarget, bytes: &[u8]) -> HokusaiResult<String> {
        let path = match target.panel_number {
            Some(panel) => self.layout.panel_artifact(target.page_number, panel),
            None => self.layout.page_artifact(target.page_number),
        };

        let lock = self.page_lock(target.page_number);
        let _guard = lock.lock().await;

        fs::write_atomic(&path, bytes).await?;
        let location = path.display().to_string();

        // Whole-page renders mark the record as rendered, when one exists
        if target.panel_number.is_none() {
            let record_path = self.layout.page_record(target.page_number);
            if tokio::fs::try_exists(&record_path).await.unwrap_or(false) {
                let text = fs::read_to_string(&record_path).await?;
                let mut page = Page::parse(&text)?;
                page.rendered_artifact_location = Some(location.clone());
                let bytes = serde_json::to_vec_pretty(&page.to_value()?)
                    .map_err(|e| SchemaError::new(SchemaErrorKind::JsonParse(e.to_string())))?;
                fs::write_atomic(&record_path, &bytes).await?;
            }
        }

        tracing::info!(target = %target, location = %location, "Committed rendered artifact");
        Ok(location)
    }

    /// The layout this store writes through.
    pub fn layout(&self) -> &DataLayout {
        &self.layout
    }
}
