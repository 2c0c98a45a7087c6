//! In-memory storage implementation.

use super::{BoxFuture, Storage, StorageError, StorageResult};
use crate::notes::NoteCollection;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory storage for testing and ephemeral use.
#[derive(Default)]
pub struct MemoryStorage {
    collections: RwLock<HashMap<String, NoteCollection>>,
}

impl MemoryStorage {
    /// Create a new empty memory storage.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn save(&self, id: &str, collection: &NoteCollection) -> BoxFuture<'_, StorageResult<()>> {
        let id = id.to_string();
        let collection = collection.clone();
        Box::pin(async move {
            let mut stored = self
                .collections
                .write()
                .map_err(|e| StorageError::Other(format!("lock error: {}", e)))?;
            stored.insert(id, collection);
            Ok(())
        })
    }

    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<NoteCollection>> {
        let id = id.to_string();
        Box::pin(async move {
            let stored = self
                .collections
                .read()
                .map_err(|e| StorageError::Other(format!("lock error: {}", e)))?;
            stored
                .get(&id)
                .cloned()
                .ok_or(StorageError::NotFound(id))
        })
    }

    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<()>> {
        let id = id.to_string();
        Box::pin(async move {
            let mut stored = self
                .collections
                .write()
                .map_err(|e| StorageError::Other(format!("lock error: {}", e)))?;
            stored.remove(&id);
            Ok(())
        })
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        Box::pin(async move {
            let stored = self
                .collections
                .read()
                .map_err(|e| StorageError::Other(format!("lock error: {}", e)))?;
            Ok(stored.keys().cloned().collect())
        })
    }

    fn exists(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>> {
        let id = id.to_string();
        Box::pin(async move {
            let stored = self
                .collections
                .read()
                .map_err(|e| StorageError::Other(format!("lock error: {}", e)))?;
            Ok(stored.contains_key(&id))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notes::Note;

    fn block_on<F: std::future::Future>(f: F) -> F::Output {
        // Simple blocking executor for tests
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
    fn test_save_and_load() {
        let storage = MemoryStorage::new();
        let mut collection = NoteCollection::new();
        let note = Note::new("groceries");
        let id = note.id.clone();
        collection.add_note(note);
        collection.set_current(Some(id.clone()));

        block_on(storage.save("notes", &collection)).unwrap();
        let loaded = block_on(storage.load("notes")).unwrap();

        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.current_note_id.as_deref(), Some(id.as_str()));
    }

    #[test]
    fn test_not_found() {
        let storage = MemoryStorage::new();
        let result = block_on(storage.load("nonexistent"));

        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_exists_and_delete() {
        let storage = MemoryStorage::new();
        let collection = NoteCollection::new();

        assert!(!block_on(storage.exists("notes")).unwrap());
        block_on(storage.save("notes", &collection)).unwrap();
        assert!(block_on(storage.exists("notes")).unwrap());

        block_on(storage.delete("notes")).unwrap();
        assert!(!block_on(storage.exists("notes")).unwrap());
    }

    #[test]
    fn test_list() {
        let storage = MemoryStorage::new();
        let collection = NoteCollection::new();

        block_on(storage.save("a", &collection)).unwrap();
        block_on(storage.save("b", &collection)).unwrap();

        let list = block_on(storage.list()).unwrap();
        assert_eq!(list.len(), 2);
        assert!(list.contains(&"a".to_string()));
        assert!(list.contains(&"b".to_string()));
    }
}
