//! The reference registry: deterministic identity, artifact generation, and
//! usage accounting.

use crate::{CharacterReference, Reference, ReferenceKind, SceneReference};
use chrono::Utc;
use hokusai_core::{AspectRatio, ImageSize};
use hokusai_error::{
    HokusaiResult, RegistryError, RegistryErrorKind, SchemaError, SchemaErrorKind,
};
use hokusai_interface::RenderDriver;
use hokusai_storage::{DataLayout, ensure_dir, read_to_string, write_atomic};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;
use std::sync::{Arc, Mutex, RwLock};

/// Derive the registry id for a kind and display name.
///
/// Identity is a pure function of `(kind, name)`: lowercase, whitespace
/// collapsed to underscores, prefixed by the kind. Calling this twice with the
/// same inputs always yields the same id, which is what makes name resolution
/// stable under concurrency without locking.
pub fn derive_id(kind: ReferenceKind, name: &str) -> HokusaiResult<String> {
    let slug: String = name
        .trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_");
    if slug.is_empty() {
        return Err(RegistryError::new(RegistryErrorKind::InvalidName(name.to_string())).into());
    }
    Ok(format!("{}{}", kind.prefix(), slug))
}

/// Single source of truth for character and scene references.
///
/// References accumulate for the lifetime of a project and are never deleted
/// by the core. Updates to the same id are serialized; the previous artifact
/// stays readable until the replacement is committed (temp file + rename).
pub struct ReferenceRegistry {
    layout: DataLayout,
    driver: Arc<dyn RenderDriver>,
    characters: RwLock<HashMap<String, CharacterReference>>,
    scenes: RwLock<HashMap<String, SceneReference>>,
    write_locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
    /// Ids whose usage counts have not been flushed to disk yet
    dirty: Mutex<BTreeSet<String>>,
}

impl std::fmt::Debug for ReferenceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReferenceRegistry")
            .field("root", &self.layout.root())
            .field("characters", &self.characters.read().unwrap().len())
            .field("scenes", &self.scenes.read().unwrap().len())
            .finish_non_exhaustive()
    }
}

impl ReferenceRegistry {
    /// Open a registry over the given layout, reloading persisted references.
    ///
    /// Corrupt records are skipped with a warning rather than failing the
    /// whole startup.
    #[tracing::instrument(skip(layout, driver), fields(root = %layout.root().display()))]
    pub async fn open(layout: DataLayout, driver: Arc<dyn RenderDriver>) -> HokusaiResult<Self> {
        ensure_dir(&layout.character_dir()).await?;
        ensure_dir(&layout.scene_dir()).await?;

        let characters = load_records::<CharacterReference>(&layout.character_dir()).await?;
        let scenes = load_records::<SceneReference>(&layout.scene_dir()).await?;
        tracing::info!(
            characters = characters.len(),
            scenes = scenes.len(),
            "Loaded reference registry"
        );

        Ok(Self {
            layout,
            driver,
            characters: RwLock::new(characters),
            scenes: RwLock::new(scenes),
            write_locks: Mutex::new(HashMap::new()),
            dirty: Mutex::new(BTreeSet::new()),
        })
    }

    fn id_lock(&self, id: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.write_locks.lock().unwrap();
        locks.entry(id.to_string()).or_default().clone()
    }

    /// Create a character reference, or update it in place if the id exists.
    ///
    /// A fresh reference-sheet artifact is rendered either way. On update the
    /// id, usage count, and creation time are preserved; descriptive fields
    /// replace the prior values and the artifact is swapped atomically.
    #[tracing::instrument(skip(self, description, visual_features))]
    pub async fn create_or_update_character(
        &self,
        name: &str,
        description: &str,
        visual_features: BTreeMap<String, String>,
        style_tag: &str,
    ) -> HokusaiResult<CharacterReference> {
        let id = derive_id(ReferenceKind::Character, name)?;
        let lock = self.id_lock(&id);
        let _guard = lock.lock().await;

        let instruction = character_sheet_instruction(name, description, style_tag);
        let bytes = self
            .driver
            .render(&instruction, &[], ImageSize::K2, AspectRatio::Portrait)
            .await?;

        let artifact_path = self.layout.character_artifact(&id);
        write_atomic(&artifact_path, &bytes).await?;
        let artifact_location = artifact_path.display().to_string();

        let now = Utc::now();
        let record = {
            let mut characters = self.characters.write().unwrap();
            let record = match characters.remove(&id) {
                Some(prior) => CharacterReference {
                    id: id.clone(),
                    display_name: name.to_string(),
                    description: description.to_string(),
                    visual_features,
                    style_tag: style_tag.to_string(),
                    usage_count: prior.usage_count,
                    artifact_location,
                    created_at: prior.created_at,
                    updated_at: now,
                },
                None => CharacterReference {
                    id: id.clone(),
                    display_name: name.to_string(),
                    description: description.to_string(),
                    visual_features,
                    style_tag: style_tag.to_string(),
                    usage_count: 0,
                    artifact_location,
                    created_at: now,
                    updated_at: now,
                },
            };
            characters.insert(id.clone(), record.clone());
            record
        };

        self.persist_character(&record).await?;
        tracing::info!(id = %id, "Character reference committed");
        Ok(record)
    }

    /// Create a scene reference, or update it in place if the id exists.
    #[tracing::instrument(skip(self, description, tags))]
    pub async fn create_or_update_scene(
        &self,
        name: &str,
        description: &str,
        tags: BTreeSet<String>,
        style_tag: &str,
    ) -> HokusaiResult<SceneReference> {
        let id = derive_id(ReferenceKind::Scene, name)?;
        let lock = self.id_lock(&id);
        let _guard = lock.lock().await;

        let instruction = scene_sheet_instruction(name, description, style_tag);
        let bytes = self
            .driver
            .render(&instruction, &[], ImageSize::K2, AspectRatio::Wide)
            .await?;

        let artifact_path = self.layout.scene_artifact(&id);
        write_atomic(&artifact_path, &bytes).await?;
        let artifact_location = artifact_path.display().to_string();

        let now = Utc::now();
        let record = {
            let mut scenes = self.scenes.write().unwrap();
            let record = match scenes.remove(&id) {
                Some(prior) => SceneReference {
                    id: id.clone(),
                    display_name: name.to_string(),
                    description: description.to_string(),
                    tags,
                    style_tag: style_tag.to_string(),
                    usage_count: prior.usage_count,
                    artifact_location,
                    created_at: prior.created_at,
                    updated_at: now,
                },
                None => SceneReference {
                    id: id.clone(),
                    display_name: name.to_string(),
                    description: description.to_string(),
                    tags,
                    style_tag: style_tag.to_string(),
                    usage_count: 0,
                    artifact_location,
                    created_at: now,
                    updated_at: now,
                },
            };
            scenes.insert(id.clone(), record.clone());
            record
        };

        self.persist_scene(&record).await?;
        tracing::info!(id = %id, "Scene reference committed");
        Ok(record)
    }

    /// Look up a reference by id.
    pub fn get(&self, id: &str) -> HokusaiResult<Reference> {
        if let Some(character) = self.characters.read().unwrap().get(id) {
            return Ok(Reference::Character(character.clone()));
        }
        if let Some(scene) = self.scenes.read().unwrap().get(id) {
            return Ok(Reference::Scene(scene.clone()));
        }
        Err(RegistryError::new(RegistryErrorKind::NotFound(id.to_string())).into())
    }

    /// Look up a reference by kind and display name.
    pub fn get_by_name(&self, kind: ReferenceKind, name: &str) -> HokusaiResult<Reference> {
        let id = derive_id(kind, name)?;
        self.get(&id)
            .map_err(|_| RegistryError::new(RegistryErrorKind::NameNotFound(name.to_string())).into())
    }

    /// Whether a reference with this id exists.
    pub fn contains(&self, id: &str) -> bool {
        self.characters.read().unwrap().contains_key(id)
            || self.scenes.read().unwrap().contains_key(id)
    }

    /// List references of one kind, ordered by id.
    pub fn list(&self, kind: ReferenceKind) -> Vec<Reference> {
        let mut refs: Vec<Reference> = match kind {
            ReferenceKind::Character => self
                .characters
                .read()
                .unwrap()
                .values()
                .cloned()
                .map(Reference::Character)
                .collect(),
            ReferenceKind::Scene => self
                .scenes
                .read()
                .unwrap()
                .values()
                .cloned()
                .map(Reference::Scene)
                .collect(),
        };
        refs.sort_by(|a, b| a.id().cmp(b.id()));
        refs
    }

    /// Record one consumption of a reference by render-request construction.
    ///
    /// Increments are in-memory and monotonic; call [`flush_usage`] to persist
    /// accumulated counts. Returns the new count.
    ///
    /// [`flush_usage`]: ReferenceRegistry::flush_usage
    pub fn record_usage(&self, id: &str) -> HokusaiResult<u64> {
        let count = {
            if let Some(character) = self.characters.write().unwrap().get_mut(id) {
                character.usage_count += 1;
                Some(character.usage_count)
            } else if let Some(scene) = self.scenes.write().unwrap().get_mut(id) {
                scene.usage_count += 1;
                Some(scene.usage_count)
            } else {
                None
            }
        };
        match count {
            Some(count) => {
                self.dirty.lock().unwrap().insert(id.to_string());
                Ok(count)
            }
            None => Err(RegistryError::new(RegistryErrorKind::NotFound(id.to_string())).into()),
        }
    }

    /// Persist usage counts accumulated since the last flush.
    pub async fn flush_usage(&self) -> HokusaiResult<()> {
        let pending: Vec<String> = std::mem::take(&mut *self.dirty.lock().unwrap())
            .into_iter()
            .collect();
        for id in pending {
            let lock = self.id_lock(&id);
            let _guard = lock.lock().await;
            let character = self.characters.read().unwrap().get(&id).cloned();
            if let Some(record) = character {
                self.persist_character(&record).await?;
                continue;
            }
            let scene = self.scenes.read().unwrap().get(&id).cloned();
            if let Some(record) = scene {
                self.persist_scene(&record).await?;
            }
        }
        Ok(())
    }

    async fn persist_character(&self, record: &CharacterReference) -> HokusaiResult<()> {
        let bytes = serde_json::to_vec_pretty(record)
            .map_err(|e| SchemaError::new(SchemaErrorKind::JsonParse(e.to_string())))?;
        write_atomic(&self.layout.character_record(&record.id), &bytes).await
    }

    async fn persist_scene(&self, record: &SceneReference) -> HokusaiResult<()> {
        let bytes = serde_json::to_vec_pretty(record)
            .map_err(|e| SchemaError::new(SchemaErrorKind::JsonParse(e.to_string())))?;
        write_atomic(&self.layout.scene_record(&record.id), &bytes).await
    }
}

async fn load_records<T: serde::de::DeserializeOwned>(
    dir: &Path,
) -> HokusaiResult<HashMap<String, T>>
where
    T: HasId,
{
    let mut records = HashMap::new();
    let mut entries = tokio::fs::read_dir(dir).await.map_err(|e| {
        hokusai_error::StorageError::new(hokusai_error::StorageErrorKind::FileRead(format!(
            "{}: {}",
            dir.display(),
            e
        )))
    })?;
    while let Some(entry) = entries.next_entry().await.map_err(|e| {
        hokusai_error::StorageError::new(hokusai_error::StorageErrorKind::FileRead(e.to_string()))
    })? {
        let path = entry.path();
        if path.extension().is_none_or(|ext| ext != "json") {
            continue;
        }
        match read_to_string(&path).await {
            Ok(text) => match serde_json::from_str::<T>(&text) {
                Ok(record) => {
                    records.insert(record.record_id().to_string(), record);
                }
                Err(e) => {
                    let err = RegistryError::new(RegistryErrorKind::CorruptRecord(format!(
                        "{}: {}",
                        path.display(),
                        e
                    )));
                    tracing::warn!(%err, "Skipping corrupt reference record");
                }
            },
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable reference record");
            }
        }
    }
    Ok(records)
}

/// Internal helper for keying loaded records by id.
trait HasId {
    fn record_id(&self) -> &str;
}

impl HasId for CharacterReference {
    fn record_id(&self) -> &str {
        &self.id
    }
}

impl HasId for SceneReference {
    fn record_id(&self) -> &str {
        &self.id
    }
}

fn character_sheet_instruction(name: &str, description: &str, style: &str) -> String {
    format!(
        "Generate a {style} comic character reference sheet.\n\n\
         Character: {name}\n\
         Appearance: {description}\n\n\
         Requirements:\n\
         1. Full-body front view showing the complete outfit and features\n\
         2. Plain background (solid color or gradient)\n\
         3. Clean silhouette, suitable for reuse as a visual reference\n\
         4. Neutral, calm expression for consistency"
    )
}

fn scene_sheet_instruction(name: &str, description: &str, style: &str) -> String {
    format!(
        "Generate a {style} comic scene reference image.\n\n\
         Scene: {name}\n\
         Description: {description}\n\n\
         Requirements:\n\
         1. Wide view showing the full environment\n\
         2. No characters, environment and architecture only\n\
         3. Coherent palette and natural lighting\n\
         4. Suitable for reuse as a background reference"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_is_pure_and_prefixed() {
        let a = derive_id(ReferenceKind::Character, "Miko Tanaka").unwrap();
        let b = derive_id(ReferenceKind::Character, "Miko Tanaka").unwrap();
        assert_eq!(a, b);
        assert_eq!(a, "char_miko_tanaka");
        assert_eq!(
            derive_id(ReferenceKind::Scene, "  Harbor  Market ").unwrap(),
            "scene_harbor_market"
        );
    }

    #[test]
    fn empty_name_is_rejected() {
        assert!(derive_id(ReferenceKind::Character, "   ").is_err());
    }
}
