//! Scene graph for a single note page.

use crate::shapes::{SerializableColor, Shape, ShapeId};
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Persisted form of a scene. Objects are stored back-to-front so
/// serialization is deterministic and paint order survives the round trip.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SceneSnapshot {
    #[serde(default = "SerializableColor::transparent")]
    background: SerializableColor,
    objects: Vec<Shape>,
}

/// The live scene of one note page: an ordered set of drawable objects
/// plus a background setting.
#[derive(Debug, Clone)]
pub struct Scene {
    /// All objects, keyed by id.
    objects: HashMap<ShapeId, Shape>,
    /// Paint order (back to front).
    z_order: Vec<ShapeId>,
    /// Page background.
    background: SerializableColor,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// Create an empty scene.
    pub fn new() -> Self {
        Self {
            objects: HashMap::new(),
            z_order: Vec::new(),
            background: SerializableColor::transparent(),
        }
    }

    /// Remove all objects and reset the background.
    pub fn clear(&mut self) {
        self.objects.clear();
        self.z_order.clear();
        self.background = SerializableColor::transparent();
    }

    /// Add an object to the scene. New objects paint on top, except images,
    /// which are sent to the back so they never cover ink or text.
    pub fn add_object(&mut self, shape: Shape) {
        let id = shape.id();
        let is_image = shape.is_image();
        self.z_order.push(id);
        self.objects.insert(id, shape);
        if is_image {
            self.send_to_back(id);
        }
    }

    /// Remove the given objects. Ids not present in the scene are ignored.
    pub fn remove_objects(&mut self, ids: &[ShapeId]) {
        for id in ids {
            if self.objects.remove(id).is_some() {
                self.z_order.retain(|zid| zid != id);
            }
        }
    }

    fn send_to_back(&mut self, id: ShapeId) {
        self.z_order.retain(|&zid| zid != id);
        self.z_order.insert(0, id);
    }

    /// Get an object by id.
    pub fn get(&self, id: ShapeId) -> Option<&Shape> {
        self.objects.get(&id)
    }

    /// Get a mutable reference to an object by id.
    pub fn get_mut(&mut self, id: ShapeId) -> Option<&mut Shape> {
        self.objects.get_mut(&id)
    }

    /// Objects in paint order (back to front).
    pub fn objects_ordered(&self) -> impl Iterator<Item = &Shape> {
        self.z_order.iter().filter_map(|id| self.objects.get(id))
    }

    /// The page background.
    pub fn background(&self) -> SerializableColor {
        self.background
    }

    /// Find objects at a point, front to back (selection priority).
    pub fn objects_at_point(&self, point: Point, tolerance: f64) -> Vec<ShapeId> {
        self.z_order
            .iter()
            .rev()
            .filter_map(|&id| {
                self.objects
                    .get(&id)
                    .filter(|s| s.hit_test(point, tolerance))
                    .map(|_| id)
            })
            .collect()
    }

    /// The frontmost object at a point, if any.
    pub fn top_object_at(&self, point: Point, tolerance: f64) -> Option<ShapeId> {
        self.z_order
            .iter()
            .rev()
            .find(|&&id| {
                self.objects
                    .get(&id)
                    .is_some_and(|s| s.hit_test(point, tolerance))
            })
            .copied()
    }

    /// Check if the scene is empty.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Get the number of objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Serialize the scene to a snapshot string.
    pub fn to_snapshot(&self) -> Result<String, serde_json::Error> {
        let snapshot = SceneSnapshot {
            background: self.background,
            objects: self.objects_ordered().cloned().collect(),
        };
        serde_json::to_string(&snapshot)
    }

    /// Replace the scene with the contents of a snapshot string. An empty
    /// string means a blank scene. Malformed input is logged and leaves a
    /// clean empty scene; it never tears down the session.
    pub fn load_snapshot(&mut self, data: &str) {
        self.clear();
        if data.is_empty() {
            return;
        }

        match serde_json::from_str::<SceneSnapshot>(data) {
            Ok(snapshot) => {
                self.background = snapshot.background;
                for shape in snapshot.objects {
                    let id = shape.id();
                    self.z_order.push(id);
                    self.objects.insert(id, shape);
                }
            }
            Err(err) => {
                log::warn!("discarding malformed scene snapshot: {err}");
                self.clear();
            }
        }
    }
}
