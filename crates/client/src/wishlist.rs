//! Wishlisted product ids, persisted through a key-value store.
//!
//! Persistence happens only at [`Wishlist::load`] and [`Wishlist::save`];
//! toggling is purely in memory. Each wishlist lives under its own scope
//! (for example one per account) so several can share a store.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use tempfile::NamedTempFile;

use atelier_core::ProductId;

/// Errors from a [`KeyValueStore`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// String values under string keys.
pub trait KeyValueStore: Send + Sync {
    /// The value under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backing storage cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backing storage cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// Process-local store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

/// Store backed by a single JSON object on disk.
///
/// A missing file reads as empty. Every `set` writes a sibling temporary
/// file and renames it over the target, so readers never see a partial write.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    lock: RwLock<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: RwLock::new(()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, StoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) if text.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let _guard = self.lock.read().unwrap_or_else(PoisonError::into_inner);
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let _guard = self.lock.write().unwrap_or_else(PoisonError::into_inner);
        let mut entries = self.read_all()?;
        entries.insert(key.to_owned(), value.to_owned());
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut file = NamedTempFile::new_in(dir)?;
        file.write_all(serde_json::to_string_pretty(&entries)?.as_bytes())?;
        file.as_file().sync_all()?;
        file.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}

/// A set of wishlisted products for one scope.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Wishlist {
    scope: String,
    ids: BTreeSet<ProductId>,
}

impl Wishlist {
    /// An empty wishlist for `scope`.
    pub fn new(scope: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            ids: BTreeSet::new(),
        }
    }

    /// Read the wishlist for `scope`; absent means empty.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the store fails or the stored value is not
    /// a JSON list of ids.
    pub fn load(store: &dyn KeyValueStore, scope: &str) -> Result<Self, StoreError> {
        let ids = match store.get(&storage_key(scope))? {
            Some(raw) => serde_json::from_str(&raw)?,
            None => BTreeSet::new(),
        };
        Ok(Self {
            scope: scope.to_owned(),
            ids,
        })
    }

    /// Write the wishlist back to `store`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the store fails.
    pub fn save(&self, store: &dyn KeyValueStore) -> Result<(), StoreError> {
        store.set(&storage_key(&self.scope), &serde_json::to_string(&self.ids)?)
    }

    /// Add or remove `id`; returns whether it is now wishlisted.
    pub fn toggle(&mut self, id: ProductId) -> bool {
        if self.ids.remove(&id) {
            false
        } else {
            self.ids.insert(id);
            true
        }
    }

    #[must_use]
    pub fn contains(&self, id: ProductId) -> bool {
        self.ids.contains(&id)
    }

    /// Ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = ProductId> + '_ {
        self.ids.iter().copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    #[must_use]
    pub fn scope(&self) -> &str {
        &self.scope
    }
}

fn storage_key(scope: &str) -> String {
    format!("wishlist:{scope}")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_reports_membership() {
        let mut wishlist = Wishlist::new("guest");
        assert!(wishlist.toggle(ProductId::new(3)));
        assert!(wishlist.contains(ProductId::new(3)));
        assert!(!wishlist.toggle(ProductId::new(3)));
        assert!(wishlist.is_empty());
    }

    #[test]
    fn test_memory_store_round_trip_is_scoped() {
        let store = MemoryStore::new();
        let mut ada = Wishlist::load(&store, "ada").unwrap();
        ada.toggle(ProductId::new(2));
        ada.toggle(ProductId::new(1));
        ada.save(&store).unwrap();

        let reloaded = Wishlist::load(&store, "ada").unwrap();
        assert_eq!(reloaded.ids().collect::<Vec<_>>(), vec![ProductId::new(1), ProductId::new(2)]);
        assert!(Wishlist::load(&store, "bob").unwrap().is_empty());
    }

    #[test]
    fn test_unsaved_changes_are_not_persisted() {
        let store = MemoryStore::new();
        let mut wishlist = Wishlist::load(&store, "ada").unwrap();
        wishlist.toggle(ProductId::new(9));
        assert!(Wishlist::load(&store, "ada").unwrap().is_empty());
    }

    #[test]
    fn test_json_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wishlist.json");
        let store = JsonFileStore::new(&path);
        assert!(Wishlist::load(&store, "ada").unwrap().is_empty());

        let mut wishlist = Wishlist::new("ada");
        wishlist.toggle(ProductId::new(5));
        wishlist.save(&store).unwrap();

        let other = JsonFileStore::new(&path);
        assert!(Wishlist::load(&other, "ada").unwrap().contains(ProductId::new(5)));

        // Writes replace the file whole and leave no temporaries behind.
        let mut other_list = Wishlist::new("bob");
        other_list.toggle(ProductId::new(9));
        other_list.save(&store).unwrap();
        let files: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(files.len(), 1);
        let text = std::fs::read_to_string(&path).unwrap();
        let entries: BTreeMap<String, String> = serde_json::from_str(&text).unwrap();
        assert_eq!(entries.len(), 2);

        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(
            Wishlist::load(&store, "ada"),
            Err(StoreError::Json(_))
        ));
    }
}
