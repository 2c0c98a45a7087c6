//! Canvas editor runtime: routes pointer/keyboard events through the active
//! tool into scene mutations, records history, and reports snapshots to the
//! owning note store.

use crate::history::History;
use crate::input::{KeyEvent, Modifiers, MouseButton, PointerEvent, Shortcut};
use crate::loader::{ImagePlacement, LoadTicket, LoadedImage};
use crate::scene::Scene;
use crate::shapes::{Image, SerializableColor, Shape, ShapeId, ShapeTrait, Text};
use crate::tools::{ToolKind, ToolManager};
use kurbo::{Affine, Point};

/// Hit-test slop for selecting and erasing, in page units.
const HIT_TOLERANCE: f64 = 4.0;

/// Radius around a selection corner that grabs the resize handle.
const HANDLE_RADIUS: f64 = 8.0;

/// Where picker uploads land when no drop point is known.
const DEFAULT_IMAGE_POSITION: Point = Point::new(100.0, 100.0);

/// Drag gesture tracked by the select tool between pointer-down and -up.
#[derive(Debug, Clone, Copy, Default)]
enum DragState {
    #[default]
    None,
    /// Moving the current selection.
    Move { last: Point, moved: bool },
    /// Resizing one object around the corner opposite the grabbed handle.
    Resize {
        id: ShapeId,
        anchor: Point,
        last: Point,
        moved: bool,
    },
}

/// The per-note canvas editor.
///
/// Owns the scene, the tool state machine, and the snapshot history. Every
/// committed mutation produces exactly one history entry and one change
/// notification; undo/redo reload the scene under suppression so the reload
/// itself is never recorded.
pub struct Editor {
    scene: Scene,
    tools: ToolManager,
    history: History,
    selection: Vec<ShapeId>,
    editing: Option<ShapeId>,
    editing_dirty: bool,
    drag: DragState,
    active_note: Option<String>,
    /// Bumped on every note switch; image decodes carry the value they were
    /// issued under and are dropped when it no longer matches.
    load_generation: u64,
    on_change: Option<Box<dyn FnMut(&str)>>,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

impl Editor {
    /// Create an editor over a blank scene.
    pub fn new() -> Self {
        let mut editor = Self {
            scene: Scene::new(),
            tools: ToolManager::new(),
            history: History::new(),
            selection: Vec::new(),
            editing: None,
            editing_dirty: false,
            drag: DragState::None,
            active_note: None,
            load_generation: 0,
            on_change: None,
        };
        editor.seed_history();
        editor
    }

    /// Register the observer invoked with the serialized scene after every
    /// committed mutation (and after undo/redo).
    pub fn set_on_change(&mut self, on_change: impl FnMut(&str) + 'static) {
        self.on_change = Some(Box::new(on_change));
    }

    /// Switch the active note: the scene is fully discarded, history is
    /// reset, and the note's persisted snapshot (empty string = blank page)
    /// is loaded. In-flight image decodes for the previous note become stale.
    pub fn set_active_note(&mut self, note_id: &str, initial_snapshot: &str) {
        self.active_note = Some(note_id.to_string());
        self.load_generation = self.load_generation.wrapping_add(1);
        self.tools.cancel();
        self.selection.clear();
        self.editing = None;
        self.editing_dirty = false;
        self.drag = DragState::None;
        self.history.reset();
        self.scene.load_snapshot(initial_snapshot);
        self.seed_history();
    }

    /// The id of the note this editor currently shows.
    pub fn active_note(&self) -> Option<&str> {
        self.active_note.as_deref()
    }

    /// Set the current tool. Never mutates the scene.
    pub fn set_tool(&mut self, tool: ToolKind) {
        self.tools.set_tool(tool);
    }

    /// The current tool.
    pub fn current_tool(&self) -> ToolKind {
        self.tools.current_tool
    }

    /// Set the pen color for subsequent strokes.
    pub fn set_pen_color(&mut self, color: SerializableColor) {
        self.tools.set_pen_color(color);
    }

    /// The live scene.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// The undo history.
    pub fn history(&self) -> &History {
        &self.history
    }

    /// The tool manager (for live stroke previews and tool queries).
    pub fn tools(&self) -> &ToolManager {
        &self.tools
    }

    /// Currently selected object ids.
    pub fn selection(&self) -> &[ShapeId] {
        &self.selection
    }

    /// The text object currently being edited, if any.
    pub fn editing_text(&self) -> Option<ShapeId> {
        self.editing
    }

    /// Serialize the current scene.
    pub fn snapshot(&self) -> String {
        self.scene.to_snapshot().unwrap_or_else(|err| {
            log::error!("failed to serialize scene: {err}");
            String::new()
        })
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // --- Pointer events ---

    /// Dispatch a pointer event to the active tool.
    pub fn handle_pointer_event(&mut self, event: PointerEvent, modifiers: Modifiers) {
        match event {
            PointerEvent::Down { position, button } => {
                self.on_pointer_down(position, button, modifiers);
            }
            PointerEvent::Move { position } => self.on_pointer_move(position),
            PointerEvent::Up { position, button } => self.on_pointer_up(position, button),
        }
    }

    pub fn on_pointer_down(&mut self, position: Point, button: MouseButton, modifiers: Modifiers) {
        if button != MouseButton::Left {
            return;
        }

        // A click anywhere ends text editing first
        if self.editing.is_some() {
            self.commit_text_editing();
        }

        match self.tools.current_tool {
            ToolKind::Select => self.select_pointer_down(position, modifiers),
            ToolKind::Pen => self.tools.begin(position),
            ToolKind::Eraser => self.erase_at(position),
            ToolKind::Text => self.place_text_at(position),
            ToolKind::Image => {}
        }
    }

    pub fn on_pointer_move(&mut self, position: Point) {
        match self.tools.current_tool {
            ToolKind::Pen => {
                if self.tools.is_active() {
                    self.tools.update(position);
                }
            }
            ToolKind::Select => self.select_pointer_move(position),
            _ => {}
        }
    }

    pub fn on_pointer_up(&mut self, position: Point, button: MouseButton) {
        if button != MouseButton::Left {
            return;
        }

        match self.tools.current_tool {
            ToolKind::Pen => {
                if let Some(stroke) = self.tools.end(position) {
                    self.scene.add_object(stroke);
                    self.committed();
                }
            }
            ToolKind::Select => {
                let changed = matches!(
                    self.drag,
                    DragState::Move { moved: true, .. } | DragState::Resize { moved: true, .. }
                );
                self.drag = DragState::None;
                if changed {
                    self.committed();
                }
            }
            _ => {}
        }
    }

    // --- Keyboard events ---

    /// Dispatch a keyboard event. Key releases are ignored.
    pub fn handle_key_event(&mut self, event: KeyEvent, modifiers: Modifiers) {
        if let KeyEvent::Pressed(key) = event {
            self.on_key_down(&key, modifiers);
        }
    }

    pub fn on_key_down(&mut self, key: &str, modifiers: Modifiers) {
        if self.editing.is_some() {
            // Chords are suppressed while a text object is mid-edit
            if !modifiers.command() {
                self.text_editing_key(key);
            }
            return;
        }

        match Shortcut::resolve(key, modifiers) {
            Some(Shortcut::Undo) => self.undo(),
            Some(Shortcut::Redo) => self.redo(),
            Some(Shortcut::DeleteSelection) => self.delete_selection(),
            None => {}
        }
    }

    // --- History ---

    /// Step back one history entry. No-op at the start of history.
    pub fn undo(&mut self) {
        let Some(snapshot) = self.history.step_back() else {
            return;
        };
        self.restore(&snapshot);
    }

    /// Step forward one history entry. No-op at the end of history.
    pub fn redo(&mut self) {
        let Some(snapshot) = self.history.step_forward() else {
            return;
        };
        self.restore(&snapshot);
    }

    /// Remove every selected object and clear the selection.
    pub fn delete_selection(&mut self) {
        if self.selection.is_empty() {
            return;
        }
        let ids: Vec<ShapeId> = self.selection.drain(..).collect();
        self.scene.remove_objects(&ids);
        self.committed();
    }

    // --- Image ingest ---

    /// Capture a ticket for an image load started now. The ticket pins the
    /// current note generation so a decode finishing after a note switch
    /// cannot touch the newly active scene.
    pub fn begin_image_load(&self, placement: ImagePlacement) -> LoadTicket {
        LoadTicket {
            generation: self.load_generation,
            placement,
        }
    }

    /// Insert a decoded image, scaled to the insertion bound and sent to the
    /// back of the paint order. Stale tickets are dropped silently.
    pub fn complete_image_load(&mut self, ticket: LoadTicket, loaded: LoadedImage) {
        if ticket.generation != self.load_generation {
            log::debug!("dropping image decode that finished after a note switch");
            return;
        }

        let mut image = Image::new(
            Point::ZERO,
            &loaded.data,
            loaded.width,
            loaded.height,
            loaded.format,
        )
        .fit_within(Image::MAX_INSERT_DIMENSION);

        image.position = match ticket.placement {
            ImagePlacement::Default => DEFAULT_IMAGE_POSITION,
            // A dropped image lands centered under the cursor
            ImagePlacement::At(point) => Point::new(
                point.x - image.width() / 2.0,
                point.y - image.height() / 2.0,
            ),
        };

        self.scene.add_object(Shape::Image(image));
        self.committed();
    }

    // --- Internals ---

    fn select_pointer_down(&mut self, position: Point, modifiers: Modifiers) {
        if let [id] = self.selection[..] {
            if let Some(anchor) = self.handle_anchor(id, position) {
                self.drag = DragState::Resize {
                    id,
                    anchor,
                    last: position,
                    moved: false,
                };
                return;
            }
        }

        match self.scene.top_object_at(position, HIT_TOLERANCE) {
            Some(id) => {
                if modifiers.shift {
                    if !self.selection.contains(&id) {
                        self.selection.push(id);
                    }
                } else if !self.selection.contains(&id) {
                    self.selection.clear();
                    self.selection.push(id);
                }
                self.drag = DragState::Move {
                    last: position,
                    moved: false,
                };
            }
            None => {
                self.selection.clear();
                self.drag = DragState::None;
            }
        }
    }

    fn select_pointer_move(&mut self, position: Point) {
        match self.drag {
            DragState::Move { last, .. } => {
                let delta = position - last;
                let affine = Affine::translate(delta);
                for &id in &self.selection {
                    if let Some(shape) = self.scene.get_mut(id) {
                        shape.transform(affine);
                    }
                }
                self.drag = DragState::Move {
                    last: position,
                    moved: true,
                };
            }
            DragState::Resize {
                id, anchor, last, ..
            } => {
                let from = (last - anchor).hypot();
                let to = (position - anchor).hypot();
                if from > f64::EPSILON && to > f64::EPSILON {
                    let factor = to / from;
                    let affine = Affine::translate(anchor.to_vec2())
                        * Affine::scale(factor)
                        * Affine::translate(-anchor.to_vec2());
                    if let Some(shape) = self.scene.get_mut(id) {
                        shape.transform(affine);
                    }
                }
                self.drag = DragState::Resize {
                    id,
                    anchor,
                    last: position,
                    moved: true,
                };
            }
            DragState::None => {}
        }
    }

    /// If `position` grabs a corner handle of the shape's bounds, return the
    /// opposite corner as the resize anchor.
    fn handle_anchor(&self, id: ShapeId, position: Point) -> Option<Point> {
        let bounds = self.scene.get(id)?.bounds();
        let corners = [
            (Point::new(bounds.x0, bounds.y0), Point::new(bounds.x1, bounds.y1)),
            (Point::new(bounds.x1, bounds.y0), Point::new(bounds.x0, bounds.y1)),
            (Point::new(bounds.x1, bounds.y1), Point::new(bounds.x0, bounds.y0)),
            (Point::new(bounds.x0, bounds.y1), Point::new(bounds.x1, bounds.y0)),
        ];
        corners
            .into_iter()
            .find(|(corner, _)| (position - *corner).hypot() <= HANDLE_RADIUS)
            .map(|(_, anchor)| anchor)
    }

    fn erase_at(&mut self, position: Point) {
        let Some(id) = self.scene.top_object_at(position, HIT_TOLERANCE) else {
            return;
        };
        self.selection.retain(|&selected| selected != id);
        self.scene.remove_objects(&[id]);
        self.committed();
    }

    fn place_text_at(&mut self, position: Point) {
        // Clicking an existing object with the text tool does nothing
        if self.scene.top_object_at(position, HIT_TOLERANCE).is_some() {
            return;
        }

        let text = Text::new(position, Text::PLACEHOLDER.to_string());
        let id = text.id();
        self.scene.add_object(Shape::Text(text));
        self.selection.clear();
        self.selection.push(id);
        self.editing = Some(id);
        self.editing_dirty = false;
        self.committed();
    }

    fn text_editing_key(&mut self, key: &str) {
        let Some(id) = self.editing else { return };

        match key {
            "Enter" | "Escape" => self.commit_text_editing(),
            "Backspace" => {
                if let Some(text) = self.scene.get_mut(id).and_then(Shape::as_text_mut) {
                    text.content.pop();
                }
                self.editing_dirty = true;
            }
            _ => {
                let mut chars = key.chars();
                if let (Some(c), None) = (chars.next(), chars.next()) {
                    if let Some(text) = self.scene.get_mut(id).and_then(Shape::as_text_mut) {
                        // The first keystroke replaces the placeholder
                        if !self.editing_dirty && text.content == Text::PLACEHOLDER {
                            text.content.clear();
                        }
                        text.content.push(c);
                    }
                    self.editing_dirty = true;
                }
            }
        }
    }

    /// Leave text editing mode. An emptied text object is removed; an edited
    /// one commits a single mutation.
    fn commit_text_editing(&mut self) {
        let Some(id) = self.editing.take() else { return };
        let dirty = std::mem::take(&mut self.editing_dirty);

        let emptied = self
            .scene
            .get(id)
            .and_then(Shape::as_text)
            .is_some_and(|text| text.content().is_empty());

        if emptied {
            self.selection.retain(|&selected| selected != id);
            self.scene.remove_objects(&[id]);
            self.committed();
        } else if dirty {
            self.committed();
        }
    }

    /// One committed mutation: serialize, record, notify. Recording is a
    /// no-op while a history-driven reload is in flight.
    fn committed(&mut self) {
        let snapshot = match self.scene.to_snapshot() {
            Ok(snapshot) => snapshot,
            Err(err) => {
                log::error!("failed to serialize scene: {err}");
                return;
            }
        };
        self.history.record(&snapshot);
        if let Some(on_change) = &mut self.on_change {
            on_change(&snapshot);
        }
    }

    fn restore(&mut self, snapshot: &str) {
        self.history.set_suppressed(true);
        self.scene.load_snapshot(snapshot);
        self.selection.clear();
        self.editing = None;
        self.editing_dirty = false;
        self.drag = DragState::None;
        self.committed();
        self.history.set_suppressed(false);
    }

    /// Record the freshly loaded scene as history entry zero, without
    /// notifying the observer: loading is not a user mutation.
    fn seed_history(&mut self) {
        match self.scene.to_snapshot() {
            Ok(snapshot) => {
                self.history.record(&snapshot);
            }
            Err(err) => log::error!("failed to serialize scene: {err}"),
        }
    }
}
