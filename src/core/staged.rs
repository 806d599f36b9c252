//! Staged items - catalog identifiers queued for the portable kit
//!
//! The list lives in a [`KeyValueStore`] under one fixed key as a JSON array
//! of strings. It is read once on load and the whole array is written back
//! on every change.

use crate::core::store::{KeyValueStore, StoreError};

/// Store key holding the staged identifiers
pub const STAGED_KEY: &str = "staged_isos";

/// Ordered, duplicate-free list of staged identifiers
#[derive(Debug)]
pub struct StagedItems<S: KeyValueStore> {
    store: S,
    items: Vec<String>,
}

impl<S: KeyValueStore> StagedItems<S> {
    /// Read the staged list from `store`
    ///
    /// A missing or malformed value is treated as an empty list.
    pub fn load(store: S) -> Result<Self, StoreError> {
        let items = match store.get(STAGED_KEY)? {
            Some(raw) => serde_json::from_str::<Vec<String>>(&raw).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "discarding malformed staged list");
                Vec::new()
            }),
            None => Vec::new(),
        };
        Ok(Self { store, items })
    }

    pub fn list(&self) -> &[String] {
        &self.items
    }

    pub fn contains(&self, id: &str) -> bool {
        self.items.iter().any(|i| i == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Add an identifier; returns false if it was already staged
    pub fn stage(&mut self, id: &str) -> Result<bool, StoreError> {
        if self.contains(id) {
            return Ok(false);
        }
        self.items.push(id.to_string());
        self.persist()?;
        Ok(true)
    }

    /// Remove an identifier; returns false if it was not staged
    pub fn unstage(&mut self, id: &str) -> Result<bool, StoreError> {
        let before = self.items.len();
        self.items.retain(|i| i != id);
        if self.items.len() == before {
            return Ok(false);
        }
        self.persist()?;
        Ok(true)
    }

    /// Stage the identifier if absent, otherwise unstage it.
    /// Returns whether it is staged afterwards.
    pub fn toggle(&mut self, id: &str) -> Result<bool, StoreError> {
        if self.contains(id) {
            self.unstage(id)?;
            Ok(false)
        } else {
            self.stage(id)?;
            Ok(true)
        }
    }

    /// Remove everything; returns how many identifiers were dropped
    pub fn clear(&mut self) -> Result<usize, StoreError> {
        let count = self.items.len();
        self.items.clear();
        self.persist()?;
        Ok(count)
    }

    /// Give the store back, e.g. to inspect it in tests
    pub fn into_store(self) -> S {
        self.store
    }

    fn persist(&mut self) -> Result<(), StoreError> {
        let encoded = serde_json::to_string(&self.items)?;
        self.store.set(STAGED_KEY, encoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::MemoryStore;

    #[test]
    fn test_load_empty_store() {
        let staged = StagedItems::load(MemoryStore::new()).unwrap();
        assert!(staged.is_empty());
    }

    #[test]
    fn test_load_existing_list() {
        let mut store = MemoryStore::new();
        store.set(STAGED_KEY, r#"["win11-24h2","hirens-pe"]"#.to_string()).unwrap();

        let staged = StagedItems::load(store).unwrap();
        assert_eq!(staged.list(), &["win11-24h2".to_string(), "hirens-pe".to_string()]);
    }

    #[test]
    fn test_malformed_value_is_empty() {
        let mut store = MemoryStore::new();
        store.set(STAGED_KEY, "{not json".to_string()).unwrap();

        let staged = StagedItems::load(store).unwrap();
        assert!(staged.is_empty());
    }

    #[test]
    fn test_stage_writes_json_array() {
        let mut staged = StagedItems::load(MemoryStore::new()).unwrap();
        assert!(staged.stage("iso-a").unwrap());
        assert!(staged.stage("iso-b").unwrap());
        assert!(!staged.stage("iso-a").unwrap());

        let store = staged.into_store();
        assert_eq!(
            store.get(STAGED_KEY).unwrap().as_deref(),
            Some(r#"["iso-a","iso-b"]"#)
        );
    }

    #[test]
    fn test_unstage_and_toggle() {
        let mut staged = StagedItems::load(MemoryStore::new()).unwrap();
        staged.stage("iso-a").unwrap();

        assert!(!staged.unstage("iso-z").unwrap());
        assert!(staged.unstage("iso-a").unwrap());
        assert!(staged.is_empty());

        assert!(staged.toggle("iso-c").unwrap());
        assert!(staged.contains("iso-c"));
        assert!(!staged.toggle("iso-c").unwrap());
        assert!(!staged.contains("iso-c"));
    }

    #[test]
    fn test_clear_overwrites_store() {
        let mut staged = StagedItems::load(MemoryStore::new()).unwrap();
        staged.stage("a").unwrap();
        staged.stage("b").unwrap();

        assert_eq!(staged.clear().unwrap(), 2);
        let store = staged.into_store();
        assert_eq!(store.get(STAGED_KEY).unwrap().as_deref(), Some("[]"));
    }
}
