//! On-disk layout of references and pages.

use std::path::{Path, PathBuf};

/// Resolves stable storage locations under a project data root.
///
/// # Layout
///
/// ```text
/// {root}/
/// ├── references/
/// │   ├── characters/
/// │   │   ├── char_kenta.json
/// │   │   └── char_kenta.jpg
/// │   └── scenes/
/// │       ├── scene_harbor.json
/// │       └── scene_harbor.jpg
/// └── pages/
///     ├── page_001.json
///     ├── page_001.jpg
///     └── page_001_panel_02.jpg
/// ```
///
/// All keys survive process restarts; nothing here depends on in-memory
/// identity.
#[derive(Debug, Clone)]
pub struct DataLayout {
    root: PathBuf,
}

impl DataLayout {
    /// Create a layout rooted at the given directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The data root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding character reference records and artifacts.
    pub fn character_dir(&self) -> PathBuf {
        self.root.join("references").join("characters")
    }

    /// Directory holding scene reference records and artifacts.
    pub fn scene_dir(&self) -> PathBuf {
        self.root.join("references").join("scenes")
    }

    /// Directory holding page records and artifacts.
    pub fn page_dir(&self) -> PathBuf {
        self.root.join("pages")
    }

    /// Record path for a character reference id.
    pub fn character_record(&self, id: &str) -> PathBuf {
        self.character_dir().join(format!("{id}.json"))
    }

    /// Artifact path for a character reference id.
    pub fn character_artifact(&self, id: &str) -> PathBuf {
        self.character_dir().join(format!("{id}.jpg"))
    }

    /// Record path for a scene reference id.
    pub fn scene_record(&self, id: &str) -> PathBuf {
        self.scene_dir().join(format!("{id}.json"))
    }

    /// Artifact path for a scene reference id.
    pub fn scene_artifact(&self, id: &str) -> PathBuf {
        self.scene_dir().join(format!("{id}.jpg"))
    }

    /// Record path for a page number, zero-padded.
    pub fn page_record(&self, page_number: u32) -> PathBuf {
        self.page_dir().join(format!("page_{page_number:03}.json"))
    }

    /// Artifact path for a whole-page render.
    pub fn page_artifact(&self, page_number: u32) -> PathBuf {
        self.page_dir().join(format!("page_{page_number:03}.jpg"))
    }

    /// Artifact path for a single-panel render.
    pub fn panel_artifact(&self, page_number: u32, panel_number: u32) -> PathBuf {
        self.page_dir()
            .join(format!("page_{page_number:03}_panel_{panel_number:02}.jpg"))
    }
}
