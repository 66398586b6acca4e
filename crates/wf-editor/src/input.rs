//! Input abstraction layer.
//!
//! Normalizes pointer and palette-drop events into a unified `InputEvent`
//! enum consumed by tools. Hosts report positions in display pixels; the
//! `CanvasTransform` maps them into the active screen's logical space.

use wf_core::geometry::{self, sanitize_scale};
use wf_core::model::ComponentKind;

/// A normalized input event.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Pointer pressed (mouse down, touch start).
    PointerDown { x: f32, y: f32 },

    /// Pointer moved.
    PointerMove { x: f32, y: f32 },

    /// Pointer released.
    PointerUp { x: f32, y: f32 },

    /// A palette component released over the canvas.
    Drop { x: f32, y: f32, kind: ComponentKind },
}

impl InputEvent {
    pub fn from_pointer_down(x: f32, y: f32) -> Self {
        Self::PointerDown { x, y }
    }

    pub fn from_pointer_move(x: f32, y: f32) -> Self {
        Self::PointerMove { x, y }
    }

    pub fn from_pointer_up(x: f32, y: f32) -> Self {
        Self::PointerUp { x, y }
    }

    /// Build a drop from the palette's type token. Unknown tokens yield `None`.
    pub fn from_drop(x: f32, y: f32, token: &str) -> Option<Self> {
        let kind = ComponentKind::parse(token)?;
        Some(Self::Drop { x, y, kind })
    }

    pub fn position(&self) -> (f32, f32) {
        match self {
            Self::PointerDown { x, y }
            | Self::PointerMove { x, y }
            | Self::PointerUp { x, y }
            | Self::Drop { x, y, .. } => (*x, *y),
        }
    }

    /// The same event with its position replaced.
    pub fn with_position(&self, x: f32, y: f32) -> Self {
        match self {
            Self::PointerDown { .. } => Self::PointerDown { x, y },
            Self::PointerMove { .. } => Self::PointerMove { x, y },
            Self::PointerUp { .. } => Self::PointerUp { x, y },
            Self::Drop { kind, .. } => Self::Drop { x, y, kind: *kind },
        }
    }
}

/// Where the canvas sits in display space and how much it is scaled down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasTransform {
    pub left: f32,
    pub top: f32,
    pub scale: f32,
}

impl Default for CanvasTransform {
    fn default() -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            scale: 1.0,
        }
    }
}

impl CanvasTransform {
    /// A degenerate scale is replaced with 1.
    pub fn new(left: f32, top: f32, scale: f32) -> Self {
        Self {
            left,
            top,
            scale: sanitize_scale(scale),
        }
    }

    pub fn to_logical(&self, x: f32, y: f32) -> (f32, f32) {
        geometry::to_logical((x, y), (self.left, self.top), self.scale)
    }

    /// Map an event reported in display pixels into logical coordinates.
    pub fn apply(&self, event: &InputEvent) -> InputEvent {
        let (x, y) = event.position();
        let (lx, ly) = self.to_logical(x, y);
        event.with_position(lx, ly)
    }
}
