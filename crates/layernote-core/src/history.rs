//! Snapshot history for undo/redo.

/// Maximum number of history entries to keep.
pub const MAX_HISTORY: usize = 50;

/// An ordered sequence of scene snapshots with a cursor into it.
///
/// The entry at the cursor always matches the scene's current state once a
/// mutation has settled. `suppressed` is raised while an undo/redo reload is
/// in flight so the reload itself is not recorded as a new entry.
#[derive(Debug, Clone, Default)]
pub struct History {
    entries: Vec<String>,
    cursor: usize,
    suppressed: bool,
}

impl History {
    /// Create an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all entries and lower the suppression flag. Called on every note
    /// switch; history is never shared across notes.
    pub fn reset(&mut self) {
        self.entries.clear();
        self.cursor = 0;
        self.suppressed = false;
    }

    /// Record a snapshot as the new current entry. Entries past the cursor
    /// (a previously undone tail) are discarded first. Returns false when
    /// recording is suppressed.
    pub fn record(&mut self, snapshot: &str) -> bool {
        if self.suppressed {
            return false;
        }

        if !self.entries.is_empty() {
            self.entries.truncate(self.cursor + 1);
        }
        self.entries.push(snapshot.to_string());
        self.cursor = self.entries.len() - 1;

        if self.entries.len() > MAX_HISTORY {
            self.entries.remove(0);
            self.cursor -= 1;
        }

        true
    }

    /// Move the cursor one entry back and return the snapshot to restore.
    /// Returns None at the start of history.
    pub fn step_back(&mut self) -> Option<String> {
        if self.cursor == 0 || self.entries.is_empty() {
            return None;
        }
        self.cursor -= 1;
        Some(self.entries[self.cursor].clone())
    }

    /// Move the cursor one entry forward and return the snapshot to restore.
    /// Returns None at the end of history.
    pub fn step_forward(&mut self) -> Option<String> {
        if self.entries.is_empty() || self.cursor >= self.entries.len() - 1 {
            return None;
        }
        self.cursor += 1;
        Some(self.entries[self.cursor].clone())
    }

    /// Raise or lower the reentrancy guard around a history-driven reload.
    pub fn set_suppressed(&mut self, suppressed: bool) {
        self.suppressed = suppressed;
    }

    /// Whether recording is currently suppressed.
    pub fn is_suppressed(&self) -> bool {
        self.suppressed
    }

    /// Whether an undo step is available.
    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    /// Whether a redo step is available.
    pub fn can_redo(&self) -> bool {
        !self.entries.is_empty() && self.cursor < self.entries.len() - 1
    }

    /// The snapshot at the cursor, if any.
    pub fn current(&self) -> Option<&str> {
        self.entries.get(self.cursor).map(String::as_str)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the history holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Current cursor position.
    pub fn cursor(&self) -> usize {
        self.cursor
    }
}
