//! Storage abstraction for persisting the note collection.

mod autosave;
mod memory;

#[cfg(not(target_arch = "wasm32"))]
mod file;

pub use autosave::{AutoSaveManager, COLLECTION_KEY, DEFAULT_AUTOSAVE_INTERVAL_SECS};
pub use memory::MemoryStorage;

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStorage;

use crate::notes::NoteCollection;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("collection not found: {0}")]
    NotFound(String),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("io error: {0}")]
    Io(String),
    #[error("storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Boxed future for async operations.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Trait for note-collection storage backends.
///
/// Implementations can keep collections in memory or as JSON files on disk;
/// the interface is async so a browser/IndexedDB backend fits the same shape.
pub trait Storage: Send + Sync {
    /// Save a collection under a key.
    fn save(&self, id: &str, collection: &NoteCollection) -> BoxFuture<'_, StorageResult<()>>;

    /// Load a collection.
    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<NoteCollection>>;

    /// Delete a collection.
    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<()>>;

    /// List all stored collection keys.
    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>>;

    /// Check if a collection exists.
    fn exists(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>>;
}
