//! LayerNote Core Library
//!
//! Platform-agnostic canvas engine and note collection for the LayerNote
//! notebook: per-note scenes of strokes, text, and images with snapshot
//! undo history, JSON persistence, and tagged note management.

pub mod editor;
pub mod history;
pub mod input;
pub mod loader;
pub mod notes;
pub mod scene;
pub mod shapes;
pub mod storage;
pub mod tools;

pub use editor::Editor;
pub use history::{History, MAX_HISTORY};
pub use input::{KeyEvent, Modifiers, MouseButton, PointerEvent, Shortcut};
pub use loader::{ImagePlacement, LoadError, LoadTicket, LoadedImage};
pub use notes::{Note, NoteCollection};
pub use scene::Scene;
pub use storage::{AutoSaveManager, MemoryStorage, Storage, StorageError};
pub use tools::{ToolKind, ToolManager, PEN_STROKE_WIDTH};

#[cfg(not(target_arch = "wasm32"))]
pub use storage::FileStorage;
