//! Favorites store - an ordered, duplicate-free set of listing ids,
//! persisted to durable client storage after every mutation.

use crate::storage::KeyValueStore;
use std::collections::HashSet;
use tracing::warn;

pub const FAVORITES_KEY: &str = "nestview.favorites";

/// Ordered favorites set over a key-value store. Insertion order is kept
/// alongside a hash set for O(1) membership.
pub struct FavoritesStore<S: KeyValueStore> {
    storage: S,
    ordered: Vec<String>,
    members: HashSet<String>,
}

impl<S: KeyValueStore> FavoritesStore<S> {
    /// Load the persisted set; absence or a parse failure yields an empty
    /// set without failing initialization.
    pub fn load(storage: S) -> Self {
        let ordered: Vec<String> = match storage.get(FAVORITES_KEY) {
            Some(raw) => match serde_json::from_str(&raw) {
                Ok(ids) => ids,
                Err(e) => {
                    warn!("persisted favorites are corrupt, starting empty: {}", e);
                    Vec::new()
                }
            },
            None => Vec::new(),
        };

        let mut members = HashSet::with_capacity(ordered.len());
        let ordered: Vec<String> = ordered
            .into_iter()
            .filter(|id| members.insert(id.clone()))
            .collect();

        Self {
            storage,
            ordered,
            members,
        }
    }

    /// Flip membership of `id`, returning the new membership state.
    /// Calling twice restores both the set and its persisted form.
    pub fn toggle(&mut self, id: &str) -> bool {
        let now_member = if self.members.contains(id) {
            self.remove_unchecked(id);
            false
        } else {
            self.insert_unchecked(id);
            true
        };
        self.persist();
        now_member
    }

    /// Explicit insert; returns whether the set changed. Persists only on
    /// change.
    pub fn add(&mut self, id: &str) -> bool {
        if self.members.contains(id) {
            return false;
        }
        self.insert_unchecked(id);
        self.persist();
        true
    }

    /// Explicit removal; returns whether the set changed.
    pub fn remove(&mut self, id: &str) -> bool {
        if !self.members.contains(id) {
            return false;
        }
        self.remove_unchecked(id);
        self.persist();
        true
    }

    pub fn is_favorite(&self, id: &str) -> bool {
        self.members.contains(id)
    }

    pub fn count(&self) -> usize {
        self.ordered.len()
    }

    /// Favorited ids in the order they were added.
    pub fn ids(&self) -> &[String] {
        &self.ordered
    }

    pub fn clear_all(&mut self) {
        self.ordered.clear();
        self.members.clear();
        self.persist();
    }

    fn insert_unchecked(&mut self, id: &str) {
        self.ordered.push(id.to_string());
        self.members.insert(id.to_string());
    }

    fn remove_unchecked(&mut self, id: &str) {
        self.ordered.retain(|existing| existing != id);
        self.members.remove(id);
    }

    /// Serialize the full set after every mutation. A write failure is
    /// logged; the in-memory effect stands either way.
    fn persist(&mut self) {
        let json = match serde_json::to_string(&self.ordered) {
            Ok(json) => json,
            Err(e) => {
                warn!("failed to serialize favorites: {}", e);
                return;
            }
        };
        if let Err(e) = self.storage.set(FAVORITES_KEY, &json) {
            warn!("failed to persist favorites: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn test_toggle_flips_membership() {
        let mut favorites = FavoritesStore::load(MemoryStore::new());

        assert!(favorites.toggle("a"));
        assert!(favorites.is_favorite("a"));
        assert_eq!(favorites.count(), 1);

        assert!(!favorites.toggle("a"));
        assert!(!favorites.is_favorite("a"));
        assert_eq!(favorites.count(), 0);
    }

    #[test]
    fn test_double_toggle_restores_persisted_form() {
        let mut store = MemoryStore::new();
        store.set(FAVORITES_KEY, "[\"a\",\"b\"]").unwrap();

        let mut favorites = FavoritesStore::load(store);
        let before = favorites.storage.get(FAVORITES_KEY);

        favorites.toggle("c");
        favorites.toggle("c");

        assert_eq!(favorites.storage.get(FAVORITES_KEY), before);
        assert_eq!(favorites.ids(), ["a", "b"]);
    }

    #[test]
    fn test_persistence_roundtrip() {
        let mut favorites = FavoritesStore::load(MemoryStore::new());
        favorites.toggle("b");
        favorites.toggle("a");
        favorites.toggle("c");

        let serialized = favorites.storage.get(FAVORITES_KEY).unwrap();
        let mut fresh_store = MemoryStore::new();
        fresh_store.set(FAVORITES_KEY, &serialized).unwrap();

        let reloaded = FavoritesStore::load(fresh_store);
        assert_eq!(reloaded.ids(), ["b", "a", "c"]);
        assert!(reloaded.is_favorite("a"));
        assert!(!reloaded.is_favorite("z"));
    }

    #[test]
    fn test_corrupt_persisted_set_loads_empty() {
        let mut store = MemoryStore::new();
        store.set(FAVORITES_KEY, "not json at all").unwrap();

        let favorites = FavoritesStore::load(store);
        assert_eq!(favorites.count(), 0);
    }

    #[test]
    fn test_persisted_duplicates_collapse() {
        let mut store = MemoryStore::new();
        store.set(FAVORITES_KEY, "[\"a\",\"b\",\"a\"]").unwrap();

        let favorites = FavoritesStore::load(store);
        assert_eq!(favorites.ids(), ["a", "b"]);
    }

    #[test]
    fn test_add_and_remove_are_idempotent() {
        let mut favorites = FavoritesStore::load(MemoryStore::new());

        assert!(favorites.add("a"));
        assert!(!favorites.add("a"));
        assert_eq!(favorites.count(), 1);

        assert!(favorites.remove("a"));
        assert!(!favorites.remove("a"));
        assert_eq!(favorites.count(), 0);
    }

    #[test]
    fn test_clear_all_persists_empty_set() {
        let mut favorites = FavoritesStore::load(MemoryStore::new());
        favorites.toggle("a");
        favorites.toggle("b");

        favorites.clear_all();
        assert_eq!(favorites.count(), 0);
        assert_eq!(
            favorites.storage.get(FAVORITES_KEY).as_deref(),
            Some("[]")
        );
    }

    #[test]
    fn test_insertion_order_is_kept() {
        let mut favorites = FavoritesStore::load(MemoryStore::new());
        favorites.toggle("c");
        favorites.toggle("a");
        favorites.toggle("b");
        favorites.toggle("a"); // remove
        favorites.toggle("a"); // re-add, goes to the back

        assert_eq!(favorites.ids(), ["c", "b", "a"]);
    }
}
