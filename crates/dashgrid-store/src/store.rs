//! Layout stores.
//!
//! [`LayoutStore`] is the caller-side persistence seam: the compactor never
//! sees it. Two backends ship here: [`MemoryStore`] for tests and embedding,
//! and [`JsonFileStore`], one pretty-printed JSON document per key.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Result, StoreError};
use crate::snapshot::{LayoutSnapshot, StoreKey};

/// Key-value persistence for layout snapshots.
pub trait LayoutStore {
    /// Load the snapshot saved under `key`, if any.
    fn load(&self, key: &StoreKey) -> Result<Option<LayoutSnapshot>>;

    /// Save `snapshot` under `key`, replacing any previous one.
    fn save(&mut self, key: &StoreKey, snapshot: &LayoutSnapshot) -> Result<()>;

    /// Forget `key`; returns whether anything was removed.
    fn remove(&mut self, key: &StoreKey) -> Result<bool>;
}

impl<S: LayoutStore + ?Sized> LayoutStore for &mut S {
    fn load(&self, key: &StoreKey) -> Result<Option<LayoutSnapshot>> {
        (**self).load(key)
    }

    fn save(&mut self, key: &StoreKey, snapshot: &LayoutSnapshot) -> Result<()> {
        (**self).save(key, snapshot)
    }

    fn remove(&mut self, key: &StoreKey) -> Result<bool> {
        (**self).remove(key)
    }
}

/// In-process store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<StoreKey, LayoutSnapshot>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl LayoutStore for MemoryStore {
    fn load(&self, key: &StoreKey) -> Result<Option<LayoutSnapshot>> {
        Ok(self.entries.get(key).cloned())
    }

    fn save(&mut self, key: &StoreKey, snapshot: &LayoutSnapshot) -> Result<()> {
        self.entries.insert(key.clone(), snapshot.clone());
        Ok(())
    }

    fn remove(&mut self, key: &StoreKey) -> Result<bool> {
        Ok(self.entries.remove(key).is_some())
    }
}

/// One JSON file per key under a root directory.
///
/// Writes go to a hidden temp file in the same directory and are renamed into
/// place, so a crash never leaves a half-written snapshot behind.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the document holding `key`.
    #[must_use]
    pub fn path_for(&self, key: &StoreKey) -> PathBuf {
        self.root.join(format!("{}.json", key.file_stem()))
    }
}

impl LayoutStore for JsonFileStore {
    fn load(&self, key: &StoreKey) -> Result<Option<LayoutSnapshot>> {
        let path = self.path_for(key);
        if !path.exists() {
            debug!(key = %key, path = %path.display(), "no saved layout");
            return Ok(None);
        }
        let raw = fs::read_to_string(&path)?;
        let snapshot: LayoutSnapshot = serde_json::from_str(&raw)?;
        snapshot.validate()?;
        let expected = key.to_string();
        if snapshot.key != expected {
            return Err(StoreError::KeyMismatch {
                path,
                expected,
                found: snapshot.key,
            });
        }
        debug!(
            key = %key,
            items = snapshot.items.len(),
            columns = snapshot.columns,
            "loaded layout"
        );
        Ok(Some(snapshot))
    }

    fn save(&mut self, key: &StoreKey, snapshot: &LayoutSnapshot) -> Result<()> {
        fs::create_dir_all(&self.root)?;
        let path = self.path_for(key);
        let tmp = self.root.join(format!(".{}.json.tmp", key.file_stem()));
        let mut json = serde_json::to_string_pretty(snapshot)?;
        json.push('\n');
        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(json.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &path)?;
        debug!(key = %key, path = %path.display(), "saved layout");
        Ok(())
    }

    fn remove(&mut self, key: &StoreKey) -> Result<bool> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(path)?;
        Ok(true)
    }
}
