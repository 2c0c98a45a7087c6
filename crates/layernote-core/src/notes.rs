//! The note collection: titled pages with free-form tags and a persisted
//! canvas snapshot each.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// A single note page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    /// Unique identifier.
    pub id: String,
    /// Page title.
    pub title: String,
    /// Free-form tags, in the order the user added them.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Serialized canvas scene; empty means a blank page.
    #[serde(default)]
    pub canvas_data: String,
    /// Creation time, milliseconds since the Unix epoch.
    pub created_at: u64,
    /// Last modification time, milliseconds since the Unix epoch.
    pub updated_at: u64,
}

impl Note {
    /// Create a new blank note.
    pub fn new(title: impl Into<String>) -> Self {
        let now = now_millis();
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            tags: Vec::new(),
            canvas_data: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    fn touch(&mut self) {
        self.updated_at = now_millis();
    }
}

/// An ordered collection of notes with a current selection and tag filters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NoteCollection {
    /// Notes in user-defined order.
    pub notes: Vec<Note>,
    /// The note currently open in the editor.
    pub current_note_id: Option<String>,
    /// Active tag filters. Session state, not persisted.
    #[serde(skip)]
    selected_tags: Vec<String>,
}

impl NoteCollection {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a collection holding one starter note, already selected.
    /// Used on first run, when nothing has been persisted yet.
    pub fn with_initial_note() -> Self {
        let note = Note::new("My first note");
        let id = note.id.clone();
        Self {
            notes: vec![note],
            current_note_id: Some(id),
            selected_tags: Vec::new(),
        }
    }

    /// Append a note.
    pub fn add_note(&mut self, note: Note) {
        self.notes.push(note);
    }

    /// Look up a note by id.
    pub fn get(&self, id: &str) -> Option<&Note> {
        self.notes.iter().find(|note| note.id == id)
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut Note> {
        self.notes.iter_mut().find(|note| note.id == id)
    }

    /// The currently selected note.
    pub fn current_note(&self) -> Option<&Note> {
        self.current_note_id
            .as_deref()
            .and_then(|id| self.get(id))
    }

    /// Select a note (or none).
    pub fn set_current(&mut self, id: Option<String>) {
        self.current_note_id = id;
    }

    /// Rename a note. Returns false if the id is unknown.
    pub fn rename(&mut self, id: &str, title: impl Into<String>) -> bool {
        let Some(note) = self.get_mut(id) else {
            return false;
        };
        note.title = title.into();
        note.touch();
        true
    }

    /// Store a note's serialized canvas scene. Returns false if the id is
    /// unknown.
    pub fn set_canvas_data(&mut self, id: &str, data: impl Into<String>) -> bool {
        let Some(note) = self.get_mut(id) else {
            return false;
        };
        note.canvas_data = data.into();
        note.touch();
        true
    }

    /// Delete a note. If it was the current one, the first remaining note
    /// becomes current.
    pub fn delete_note(&mut self, id: &str) {
        self.notes.retain(|note| note.id != id);
        if self.current_note_id.as_deref() == Some(id) {
            self.current_note_id = self.notes.first().map(|note| note.id.clone());
        }
    }

    /// Move a note from one position to another. Out-of-range indices are
    /// ignored.
    pub fn move_note(&mut self, from: usize, to: usize) {
        if from >= self.notes.len() || to >= self.notes.len() {
            return;
        }
        let note = self.notes.remove(from);
        self.notes.insert(to, note);
    }

    /// Add a tag to a note. Duplicate tags are ignored.
    pub fn add_tag(&mut self, id: &str, tag: impl Into<String>) -> bool {
        let tag = tag.into();
        let Some(note) = self.get_mut(id) else {
            return false;
        };
        if !note.tags.contains(&tag) {
            note.tags.push(tag);
            note.touch();
        }
        true
    }

    /// Remove a tag from a note.
    pub fn remove_tag(&mut self, id: &str, tag: &str) -> bool {
        let Some(note) = self.get_mut(id) else {
            return false;
        };
        note.tags.retain(|t| t != tag);
        note.touch();
        true
    }

    /// All tags across the collection, sorted and deduplicated.
    pub fn all_tags(&self) -> Vec<String> {
        self.notes
            .iter()
            .flat_map(|note| note.tags.iter().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Toggle a tag filter on or off.
    pub fn toggle_tag_filter(&mut self, tag: &str) {
        if let Some(pos) = self.selected_tags.iter().position(|t| t == tag) {
            self.selected_tags.remove(pos);
        } else {
            self.selected_tags.push(tag.to_string());
        }
    }

    /// Drop all tag filters.
    pub fn clear_tag_filters(&mut self) {
        self.selected_tags.clear();
    }

    /// The active tag filters.
    pub fn selected_tags(&self) -> &[String] {
        &self.selected_tags
    }

    /// Notes visible under the active filters: a note matches when it
    /// carries any selected tag; with no filters, every note is visible.
    pub fn filtered_notes(&self) -> Vec<&Note> {
        if self.selected_tags.is_empty() {
            return self.notes.iter().collect();
        }
        self.notes
            .iter()
            .filter(|note| self.selected_tags.iter().any(|tag| note.tags.contains(tag)))
            .collect()
    }

    /// Number of notes.
    pub fn len(&self) -> usize {
        self.notes.len()
    }

    /// Whether the collection holds no notes.
    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Serialize the collection to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize a collection from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
