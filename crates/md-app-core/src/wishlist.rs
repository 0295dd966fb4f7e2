use anyhow::Result;
use md_api_types::{Movie, MovieId};
use md_storage::{Scope, ScopedStorage, keys};
use tracing::debug;

/// Saved movies for this storage profile, written through on every change.
///
/// The list is not scoped by signed-in identity: everyone sharing the
/// profile shares one wishlist.
pub struct WishlistStore {
    storage: ScopedStorage,
    entries: Vec<Movie>,
}

impl WishlistStore {
    pub fn new(storage: ScopedStorage) -> Result<Self> {
        let entries = storage.read_json_or_default(Scope::Durable, keys::WISHLIST)?;
        Ok(Self { storage, entries })
    }

    /// Adds `movie` if absent, removes it otherwise. Returns whether it is
    /// now in the list. On a storage error nothing changes.
    pub fn toggle(&mut self, movie: Movie) -> Result<bool> {
        let mut next = self.entries.clone();
        let added = match next.iter().position(|m| m.id == movie.id) {
            Some(index) => {
                next.remove(index);
                false
            }
            None => {
                next.push(movie);
                true
            }
        };

        self.storage.write_json(Scope::Durable, keys::WISHLIST, &next)?;
        self.entries = next;
        debug!(added, size = self.entries.len(), "wishlist updated");
        Ok(added)
    }

    pub fn contains(&self, movie_id: MovieId) -> bool {
        self.entries.iter().any(|m| m.id == movie_id)
    }

    pub fn get(&self, movie_id: MovieId) -> Option<&Movie> {
        self.entries.iter().find(|m| m.id == movie_id)
    }

    pub fn entries(&self) -> &[Movie] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use anyhow::anyhow;
    use md_storage::{InMemoryStore, KeyValueStore};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    pub(crate) fn movie(id: MovieId) -> Movie {
        Movie {
            id,
            title: format!("movie-{id}"),
            original_title: None,
            poster_path: format!("/{id}.jpg"),
            backdrop_path: None,
            overview: None,
            vote_average: None,
            release_date: None,
        }
    }

    fn ids(store: &WishlistStore) -> Vec<MovieId> {
        store.entries().iter().map(|m| m.id).collect()
    }

    #[test]
    fn toggle_twice_restores_order() -> Result<()> {
        let mut wishlist = WishlistStore::new(ScopedStorage::in_memory())?;
        for id in [1, 2, 3] {
            assert!(wishlist.toggle(movie(id))?);
        }

        assert!(!wishlist.toggle(movie(2))?);
        assert!(!wishlist.contains(2));
        assert_eq!(ids(&wishlist), vec![1, 3]);

        assert!(wishlist.toggle(movie(2))?);
        assert!(wishlist.contains(2));
        assert_eq!(ids(&wishlist), vec![1, 3, 2]);

        assert!(!wishlist.toggle(movie(2))?);
        assert_eq!(ids(&wishlist), vec![1, 3]);
        Ok(())
    }

    #[test]
    fn toggle_writes_through() -> Result<()> {
        let storage = ScopedStorage::in_memory();
        let mut wishlist = WishlistStore::new(storage.clone())?;
        wishlist.toggle(movie(42))?;

        let reloaded = WishlistStore::new(storage.with_fresh_session())?;
        assert_eq!(ids(&reloaded), vec![42]);
        assert_eq!(reloaded.get(42).map(|m| m.title.as_str()), Some("movie-42"));
        Ok(())
    }

    #[test]
    fn corrupted_wishlist_starts_empty() -> Result<()> {
        let storage = ScopedStorage::in_memory();
        storage.set(Scope::Durable, keys::WISHLIST, "[{\"id\":")?;

        let mut wishlist = WishlistStore::new(storage.clone())?;
        assert!(wishlist.is_empty());
        wishlist.toggle(movie(7))?;
        assert_eq!(wishlist.len(), 1);
        Ok(())
    }

    #[derive(Default)]
    struct FlakyStore {
        inner: InMemoryStore,
        failing: AtomicBool,
    }

    impl KeyValueStore for FlakyStore {
        fn get(&self, key: &str) -> Result<Option<String>> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<()> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(anyhow!("quota exceeded"));
            }
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> Result<()> {
            self.inner.remove(key)
        }
    }

    #[test]
    fn failed_write_leaves_list_unchanged() -> Result<()> {
        let durable = Arc::new(FlakyStore::default());
        let storage = ScopedStorage::new(durable.clone(), Arc::new(InMemoryStore::new()));
        let mut wishlist = WishlistStore::new(storage.clone())?;
        wishlist.toggle(movie(1))?;

        durable.failing.store(true, Ordering::SeqCst);
        assert!(wishlist.toggle(movie(2)).is_err());
        assert!(wishlist.toggle(movie(1)).is_err());
        assert_eq!(ids(&wishlist), vec![1]);

        let persisted = WishlistStore::new(storage)?;
        assert_eq!(ids(&persisted), vec![1]);
        Ok(())
    }
}
