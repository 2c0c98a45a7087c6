//! Tool system for the note canvas.

use crate::shapes::{SerializableColor, Shape, ShapeStyle, Stroke};
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Pen stroke width. The pen draws at one fixed width; only its color varies.
pub const PEN_STROKE_WIDTH: f64 = 3.0;

/// Tolerance used when simplifying a finished stroke.
const STROKE_SIMPLIFY_TOLERANCE: f64 = 0.5;

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ToolKind {
    #[default]
    Select,
    Pen,
    Eraser,
    Text,
    /// Image insertion happens through the upload/drop path, not pointer
    /// gestures; the variant exists so the toolbar can highlight it.
    Image,
}

/// State of a tool interaction.
#[derive(Debug, Clone, Default)]
pub enum ToolState {
    /// Tool is idle, waiting for interaction.
    #[default]
    Idle,
    /// Tool is actively being used (pointer held down).
    Active {
        /// Starting point of the interaction.
        start: Point,
        /// Current point of the interaction.
        current: Point,
    },
}

/// Manages the current tool and its gesture state.
#[derive(Debug, Clone)]
pub struct ToolManager {
    /// Currently selected tool.
    pub current_tool: ToolKind,
    /// Current state of the tool.
    pub state: ToolState,
    /// Accumulated points for the in-progress pen stroke.
    stroke_points: Vec<Point>,
    /// Color applied to new pen strokes.
    pen_color: SerializableColor,
}

impl Default for ToolManager {
    fn default() -> Self {
        Self {
            current_tool: ToolKind::default(),
            state: ToolState::default(),
            stroke_points: Vec::new(),
            pen_color: SerializableColor::ink(),
        }
    }
}

impl ToolManager {
    /// Create a new tool manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the current tool. Cancels any in-flight gesture; switching tools
    /// never mutates the scene.
    pub fn set_tool(&mut self, tool: ToolKind) {
        self.current_tool = tool;
        self.cancel();
    }

    /// Set the pen color for subsequent strokes.
    pub fn set_pen_color(&mut self, color: SerializableColor) {
        self.pen_color = color;
    }

    /// The current pen color.
    pub fn pen_color(&self) -> SerializableColor {
        self.pen_color
    }

    /// Begin a tool interaction.
    pub fn begin(&mut self, point: Point) {
        if self.current_tool == ToolKind::Pen {
            self.stroke_points.clear();
            self.stroke_points.push(point);
        }

        self.state = ToolState::Active {
            start: point,
            current: point,
        };
    }

    /// Update the current interaction.
    pub fn update(&mut self, point: Point) {
        if let ToolState::Active { current, .. } = &mut self.state {
            *current = point;
            if self.current_tool == ToolKind::Pen {
                self.stroke_points.push(point);
            }
        }
    }

    /// End the current interaction, returning the finished stroke when the
    /// pen was drawing. Other tools produce their objects elsewhere.
    pub fn end(&mut self, point: Point) -> Option<Shape> {
        if !matches!(self.state, ToolState::Active { .. }) {
            return None;
        }

        let shape = if self.current_tool == ToolKind::Pen {
            if self.stroke_points.last() != Some(&point) {
                self.stroke_points.push(point);
            }
            self.finish_stroke()
        } else {
            None
        };

        self.state = ToolState::Idle;
        self.stroke_points.clear();
        shape
    }

    /// Cancel the current interaction.
    pub fn cancel(&mut self) {
        self.state = ToolState::Idle;
        self.stroke_points.clear();
    }

    /// Check if a tool interaction is active.
    pub fn is_active(&self) -> bool {
        matches!(self.state, ToolState::Active { .. })
    }

    /// The in-progress stroke, for live rendering while the pen is down.
    pub fn preview_stroke(&self) -> Option<Stroke> {
        if self.current_tool != ToolKind::Pen || self.stroke_points.len() < 2 {
            return None;
        }
        let mut stroke = Stroke::from_points(self.stroke_points.clone());
        stroke.style = self.stroke_style();
        Some(stroke)
    }

    fn finish_stroke(&self) -> Option<Shape> {
        if self.stroke_points.len() < 2 {
            return None;
        }
        let mut stroke = Stroke::from_points(self.stroke_points.clone());
        stroke.style = self.stroke_style();
        stroke.simplify(STROKE_SIMPLIFY_TOLERANCE);
        Some(Shape::Stroke(stroke))
    }

    fn stroke_style(&self) -> ShapeStyle {
        ShapeStyle {
            stroke_color: self.pen_color,
            stroke_width: PEN_STROKE_WIDTH,
            opacity: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_selection() {
        let mut tm = ToolManager::new();
        assert_eq!(tm.current_tool, ToolKind::Select);

        tm.set_tool(ToolKind::Pen);
        assert_eq!(tm.current_tool, ToolKind::Pen);
    }

    #[test]
    fn test_pen_interaction() {
        let mut tm = ToolManager::new();
        tm.set_tool(ToolKind::Pen);

        assert!(!tm.is_active());

        tm.begin(Point::new(0.0, 0.0));
        assert!(tm.is_active());

        tm.update(Point::new(50.0, 50.0));
        assert!(tm.preview_stroke().is_some());

        let shape = tm.end(Point::new(100.0, 100.0));
        assert!(!tm.is_active());

        let Some(Shape::Stroke(stroke)) = shape else {
            panic!("pen should produce a stroke");
        };
        assert!(stroke.len() >= 2);
        assert!((stroke.style.stroke_width - PEN_STROKE_WIDTH).abs() < f64::EPSILON);
    }

    #[test]
    fn test_pen_uses_current_color() {
        let mut tm = ToolManager::new();
        tm.set_tool(ToolKind::Pen);
        let red = SerializableColor::new(0xEF, 0x44, 0x44, 255);
        tm.set_pen_color(red);

        tm.begin(Point::new(0.0, 0.0));
        let shape = tm.end(Point::new(10.0, 0.0));

        assert_eq!(shape.unwrap().style().stroke_color, red);
    }

    #[test]
    fn test_switching_tools_cancels_gesture() {
        let mut tm = ToolManager::new();
        tm.set_tool(ToolKind::Pen);
        tm.begin(Point::new(0.0, 0.0));
        assert!(tm.is_active());

        tm.set_tool(ToolKind::Eraser);
        assert!(!tm.is_active());
        assert!(tm.end(Point::new(10.0, 10.0)).is_none());
    }

    #[test]
    fn test_select_produces_no_shape() {
        let mut tm = ToolManager::new();
        tm.set_tool(ToolKind::Select);

        tm.begin(Point::new(0.0, 0.0));
        assert!(tm.end(Point::new(100.0, 100.0)).is_none());
    }

    #[test]
    fn test_tap_without_drag_produces_no_stroke() {
        let mut tm = ToolManager::new();
        tm.set_tool(ToolKind::Pen);

        tm.begin(Point::new(5.0, 5.0));
        // Pointer released without moving: a single point is not a stroke
        assert!(tm.end(Point::new(5.0, 5.0)).is_none());
    }
}
