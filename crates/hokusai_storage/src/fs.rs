//! Atomic filesystem primitives.

use hokusai_error::{HokusaiResult, StorageError, StorageErrorKind};
use std::path::Path;

/// Create a directory and its parents if absent.
pub async fn ensure_dir(path: &Path) -> HokusaiResult<()> {
    tokio::fs::create_dir_all(path).await.map_err(|e| {
        StorageError::new(StorageErrorKind::DirectoryCreation(format!(
            "{}: {}",
            path.display(),
            e
        )))
        .into()
    })
}

/// Write a file atomically via temp file + rename.
///
/// Concurrent readers of the destination see either the previous content or
/// the new content, never a partial write. The temp path appends `.tmp` to
/// the full file name, so sibling targets that differ only in extension
/// (`page_001.json` vs `page_001.jpg`) never share a temp file.
#[tracing::instrument(skip(data), fields(size = data.len()))]
pub async fn write_atomic(path: &Path, data: &[u8]) -> HokusaiResult<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent).await?;
    }

    let mut temp_name = path.as_os_str().to_owned();
    temp_name.push(".tmp");
    let temp_path = std::path::PathBuf::from(temp_name);
    tokio::fs::write(&temp_path, data).await.map_err(|e| {
        StorageError::new(StorageErrorKind::FileWrite(format!(
            "{}: {}",
            temp_path.display(),
            e
        )))
    })?;

    tokio::fs::rename(&temp_path, path).await.map_err(|e| {
        StorageError::new(StorageErrorKind::FileWrite(format!(
            "rename {} to {}: {}",
            temp_path.display(),
            path.display(),
            e
        )))
    })?;

    tracing::debug!(path = %path.display(), "Wrote file");
    Ok(())
}

/// Read a file's bytes, mapping absence to `StorageErrorKind::NotFound`.
pub async fn read_bytes(path: &Path) -> HokusaiResult<Vec<u8>> {
    tokio::fs::read(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            StorageError::new(StorageErrorKind::NotFound(path.display().to_string())).into()
        } else {
            StorageError::new(StorageErrorKind::FileRead(format!(
                "{}: {}",
                path.display(),
                e
            )))
            .into()
        }
    })
}

/// Read a file as UTF-8 text, mapping absence to `StorageErrorKind::NotFound`.
pub async fn read_to_string(path: &Path) -> HokusaiResult<String> {
    tokio::fs::read_to_string(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            StorageError::new(StorageErrorKind::NotFound(path.display().to_string())).into()
        } else {
            StorageError::new(StorageErrorKind::FileRead(format!(
                "{}: {}",
                path.display(),
                e
            )))
            .into()
        }
    })
}
