//! Automatic persistence of the note collection.

use super::{Storage, StorageResult};
use crate::notes::NoteCollection;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Default auto-save interval in seconds.
pub const DEFAULT_AUTOSAVE_INTERVAL_SECS: u64 = 30;

/// Key the whole collection is persisted under.
pub const COLLECTION_KEY: &str = "layernote-data";

/// Saves the collection when it is dirty and enough time has passed.
pub struct AutoSaveManager<S: Storage> {
    storage: Arc<S>,
    interval: Duration,
    last_save: Option<Instant>,
    dirty: bool,
}

impl<S: Storage> AutoSaveManager<S> {
    /// Create a new auto-save manager with the given storage backend.
    pub fn new(storage: Arc<S>) -> Self {
        Self {
            storage,
            interval: Duration::from_secs(DEFAULT_AUTOSAVE_INTERVAL_SECS),
            last_save: None,
            dirty: false,
        }
    }

    /// Set the auto-save interval.
    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    /// Get the auto-save interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Mark the collection as having unsaved changes.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Check if the collection has unsaved changes.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Check if enough time has passed for an auto-save.
    pub fn should_save(&self) -> bool {
        if !self.dirty {
            return false;
        }

        match self.last_save {
            Some(last) => last.elapsed() >= self.interval,
            None => true,
        }
    }

    /// Save the collection if needed (dirty + interval elapsed).
    /// Returns true if a save was performed.
    pub async fn maybe_save(&mut self, collection: &NoteCollection) -> StorageResult<bool> {
        if !self.should_save() {
            return Ok(false);
        }

        self.save(collection).await?;
        Ok(true)
    }

    /// Force save the collection immediately.
    pub async fn save(&mut self, collection: &NoteCollection) -> StorageResult<()> {
        self.storage.save(COLLECTION_KEY, collection).await?;
        self.last_save = Some(Instant::now());
        self.dirty = false;
        Ok(())
    }

    /// Load the persisted collection.
    pub async fn load(&mut self) -> StorageResult<NoteCollection> {
        let collection = self.storage.load(COLLECTION_KEY).await?;
        self.dirty = false;
        self.last_save = Some(Instant::now());
        Ok(collection)
    }

    /// Load the persisted collection, or seed a starter note on first run.
    pub async fn load_or_bootstrap(&mut self) -> NoteCollection {
        match self.load().await {
            Ok(collection) => collection,
            Err(_) => NoteCollection::with_initial_note(),
        }
    }

    /// Get a reference to the storage backend.
    pub fn storage(&self) -> &Arc<S> {
        &self.storage
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notes::Note;
    use crate::storage::MemoryStorage;

    fn block_on<F: std::future::Future>(f: F) -> F::Output {
        use std::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};

        fn dummy_raw_waker() -> RawWaker {
            fn no_op(_: *const ()) {}
            fn clone(_: *const ()) -> RawWaker {
                dummy_raw_waker()
            }
            static VTABLE: RawWakerVTable = RawWakerVTable::new(clone, no_op, no_op, no_op);
            RawWaker::new(std::ptr::null(), &VTABLE)
        }

        let waker = unsafe { Waker::from_raw(dummy_raw_waker()) };
        let mut cx = Context::from_waker(&waker);
        let mut f = std::pin::pin!(f);

        loop {
            match f.as_mut().poll(&mut cx) {
                Poll::Ready(result) => return result,
                Poll::Pending => {}
            }
        }
    }

    #[test]
    fn test_dirty_flag_lifecycle() {
        let storage = Arc::new(MemoryStorage::new());
        let mut manager = AutoSaveManager::new(storage);

        assert!(!manager.is_dirty());
        assert!(!manager.should_save());

        manager.mark_dirty();
        assert!(manager.is_dirty());
        // Dirty with no previous save: save right away
        assert!(manager.should_save());

        let collection = NoteCollection::new();
        block_on(manager.save(&collection)).unwrap();
        assert!(!manager.is_dirty());
    }

    #[test]
    fn test_maybe_save_respects_interval() {
        let storage = Arc::new(MemoryStorage::new());
        let mut manager = AutoSaveManager::new(storage);
        let collection = NoteCollection::new();

        manager.mark_dirty();
        assert!(block_on(manager.maybe_save(&collection)).unwrap());

        // Saved moments ago and clean again: nothing to do
        assert!(!block_on(manager.maybe_save(&collection)).unwrap());

        // Dirty again but the interval has not elapsed
        manager.mark_dirty();
        assert!(!block_on(manager.maybe_save(&collection)).unwrap());

        manager.set_interval(Duration::ZERO);
        assert!(block_on(manager.maybe_save(&collection)).unwrap());
    }

    #[test]
    fn test_save_and_reload() {
        let storage = Arc::new(MemoryStorage::new());
        let mut manager = AutoSaveManager::new(Arc::clone(&storage));

        let mut collection = NoteCollection::new();
        collection.add_note(Note::new("journal"));
        manager.mark_dirty();
        block_on(manager.save(&collection)).unwrap();

        let mut other = AutoSaveManager::new(storage);
        let loaded = block_on(other.load()).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.notes[0].title, "journal");
    }

    #[test]
    fn test_bootstrap_on_first_run() {
        let storage = Arc::new(MemoryStorage::new());
        let mut manager = AutoSaveManager::new(storage);

        let collection = block_on(manager.load_or_bootstrap());
        assert_eq!(collection.len(), 1);
        assert!(collection.current_note().is_some());
    }
}
