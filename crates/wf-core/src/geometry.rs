//! Geometry engine: grid snapping, bounds clamping, resize, and
//! scale-aware pointer conversion.
//!
//! Every function here works in screen-local *logical* coordinates. Pointer
//! positions reported by the host are in display pixels of a canvas that
//! may be scaled down to fit; callers convert them with [`to_logical`]
//! before touching anything else in this module.

use serde::{Deserialize, Serialize};

/// Grid pitch in logical pixels. Snapped values are multiples of this.
pub const GRID_SIZE: f32 = 16.0;
/// Smallest width an element may be resized to.
pub const MIN_WIDTH: f32 = 60.0;
/// Smallest height an element may be resized to.
pub const MIN_HEIGHT: f32 = 40.0;
/// Offset applied per consecutive paste.
pub const PASTE_OFFSET_STEP: f32 = 16.0;
/// Largest canvas side, in logical pixels, a screen may be given.
pub const MAX_CANVAS_SIDE: u32 = 8192;

/// The logical size of a screen's canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasSize {
    pub width: f32,
    pub height: f32,
}

impl CanvasSize {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

impl Default for CanvasSize {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
        }
    }
}

/// Axis-aligned box in screen-local coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x && px <= self.right() && py >= self.y && py <= self.bottom()
    }

    /// True when the box lies completely inside `[0, w] × [0, h]`.
    pub fn fits_in(&self, canvas: CanvasSize) -> bool {
        self.x >= 0.0
            && self.y >= 0.0
            && self.right() <= canvas.width
            && self.bottom() <= canvas.height
    }
}

// ─── Snapping ────────────────────────────────────────────────────────────

/// Round to the nearest grid line. Halves round up.
pub fn snap(value: f32) -> f32 {
    (value / GRID_SIZE + 0.5).floor() * GRID_SIZE
}

/// Snap a size, never returning zero and never less than `min`.
pub fn snap_dimension(value: f32, min: f32) -> f32 {
    let snapped = snap(value);
    let base = if snapped == 0.0 { GRID_SIZE } else { snapped };
    base.max(min)
}

/// Snap a size and keep it inside `[min, max]`.
///
/// If the snapped size overshoots `max`, the largest grid multiple not above
/// `max` is used instead. When `max` itself is below `min` (a canvas smaller
/// than the minimum component size) the raw value is clamped into `[0, max]`
/// without snapping.
pub fn snap_dimension_within(value: f32, min: f32, max: f32) -> f32 {
    if !max.is_finite() || max <= 0.0 {
        let limit = if max.is_nan() { 0.0 } else { max };
        return value.min(limit).max(0.0);
    }
    if max < min {
        return value.min(max).max(0.0);
    }
    let mut candidate = snap_dimension(value, min);
    if candidate > max {
        let snapped_max = (max / GRID_SIZE).floor() * GRID_SIZE;
        candidate = if snapped_max >= min {
            snapped_max
        } else {
            value.min(max).max(min)
        };
    }
    candidate.min(max).max(min)
}

// ─── Clamping ────────────────────────────────────────────────────────────

/// Clamp a top-left corner so a `width × height` box stays on the canvas,
/// then snap it to the grid.
///
/// Snapping can push a clamped coordinate past the far edge by up to one
/// grid step, so the snapped value is clamped a second time.
pub fn clamp_position(canvas: CanvasSize, x: f32, y: f32, width: f32, height: f32) -> (f32, f32) {
    let max_x = (canvas.width - width).max(0.0);
    let max_y = (canvas.height - height).max(0.0);
    let clamped_x = x.max(0.0).min(max_x);
    let clamped_y = y.max(0.0).min(max_y);
    let snapped_x = snap(clamped_x).max(0.0).min(max_x);
    let snapped_y = snap(clamped_y).max(0.0).min(max_y);
    (snapped_x, snapped_y)
}

/// Fit an arbitrary box onto the canvas: size it, place it, shrink it to
/// the space left at that position, and place it again.
///
/// Used when a screen shrinks and when pasting.
pub fn fit_within(canvas: CanvasSize, rect: Rect) -> Rect {
    let width = snap_dimension_within(rect.width, MIN_WIDTH, canvas.width);
    let height = snap_dimension_within(rect.height, MIN_HEIGHT, canvas.height);
    settle(canvas, rect.x, rect.y, width, height)
}

/// Size a freshly dropped component and centre it on the drop point.
pub fn place_centered(canvas: CanvasSize, x: f32, y: f32, width: f32, height: f32) -> Rect {
    let width = snap_dimension_within(width, MIN_WIDTH, canvas.width);
    let height = snap_dimension_within(height, MIN_HEIGHT, canvas.height);
    let (px, py) = clamp_position(canvas, x - width / 2.0, y - height / 2.0, width, height);
    Rect::new(px, py, width, height)
}

/// Move a box so its top-left corner lands at `(x, y)`, clamped and snapped.
pub fn move_to(canvas: CanvasSize, rect: Rect, x: f32, y: f32) -> Rect {
    let (px, py) = clamp_position(canvas, x, y, rect.width, rect.height);
    Rect::new(px, py, rect.width, rect.height)
}

fn settle(canvas: CanvasSize, x: f32, y: f32, width: f32, height: f32) -> Rect {
    let (px, py) = clamp_position(canvas, x, y, width, height);
    let width = snap_dimension_within(width, MIN_WIDTH, canvas.width - px);
    let height = snap_dimension_within(height, MIN_HEIGHT, canvas.height - py);
    let (fx, fy) = clamp_position(canvas, px, py, width, height);
    Rect::new(fx, fy, width, height)
}

// ─── Resize ──────────────────────────────────────────────────────────────

/// One of the eight compass handles around a selected element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeHandle {
    N,
    Ne,
    E,
    Se,
    S,
    Sw,
    W,
    Nw,
}

/// Which edges a handle drags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HandleEdges {
    pub north: bool,
    pub south: bool,
    pub east: bool,
    pub west: bool,
}

impl ResizeHandle {
    pub const ALL: [ResizeHandle; 8] = [
        ResizeHandle::N,
        ResizeHandle::Ne,
        ResizeHandle::E,
        ResizeHandle::Se,
        ResizeHandle::S,
        ResizeHandle::Sw,
        ResizeHandle::W,
        ResizeHandle::Nw,
    ];

    pub fn edges(self) -> HandleEdges {
        let name = self.as_str();
        HandleEdges {
            north: name.contains('n'),
            south: name.contains('s'),
            east: name.contains('e'),
            west: name.contains('w'),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ResizeHandle::N => "n",
            ResizeHandle::Ne => "ne",
            ResizeHandle::E => "e",
            ResizeHandle::Se => "se",
            ResizeHandle::S => "s",
            ResizeHandle::Sw => "sw",
            ResizeHandle::W => "w",
            ResizeHandle::Nw => "nw",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|h| h.as_str() == s)
    }

    /// Where this handle sits on a box's outline.
    pub fn anchor(self, rect: Rect) -> (f32, f32) {
        let e = self.edges();
        let x = if e.west {
            rect.x
        } else if e.east {
            rect.right()
        } else {
            rect.x + rect.width / 2.0
        };
        let y = if e.north {
            rect.y
        } else if e.south {
            rect.bottom()
        } else {
            rect.y + rect.height / 2.0
        };
        (x, y)
    }
}

/// Resize `start` by dragging `handle` to the pointer position.
///
/// Only the edges named by the handle move. Edges are snapped first and
/// the size is derived afterwards, so a size that was valid before snapping
/// cannot turn invalid once snapped.
pub fn resize(
    canvas: CanvasSize,
    start: Rect,
    handle: ResizeHandle,
    pointer_x: f32,
    pointer_y: f32,
) -> Rect {
    let edges = handle.edges();
    let (cw, ch) = (canvas.width, canvas.height);

    let mut left = start.x;
    let mut top = start.y;
    let mut right = left + start.width;
    let mut bottom = top + start.height;

    if edges.east {
        right = (left + MIN_WIDTH).max(pointer_x);
    }
    if edges.south {
        bottom = (top + MIN_HEIGHT).max(pointer_y);
    }
    if edges.west {
        left = (right - MIN_WIDTH).min(pointer_x);
    }
    if edges.north {
        top = (bottom - MIN_HEIGHT).min(pointer_y);
    }

    left = left.max(0.0);
    top = top.max(0.0);
    right = right.min(cw);
    bottom = bottom.min(ch);

    left = snap(left);
    top = snap(top);
    right = snap(right);
    bottom = snap(bottom);

    // Slide the dragged edge back out if snapping collapsed the box.
    if right - left < MIN_WIDTH {
        if edges.west {
            left = right - MIN_WIDTH;
        } else {
            right = left + MIN_WIDTH;
        }
    }
    if bottom - top < MIN_HEIGHT {
        if edges.north {
            top = bottom - MIN_HEIGHT;
        } else {
            bottom = top + MIN_HEIGHT;
        }
    }

    left = left.min(cw - MIN_WIDTH).max(0.0);
    top = top.min(ch - MIN_HEIGHT).max(0.0);
    right = right.max(left + MIN_WIDTH).min(cw);
    bottom = bottom.max(top + MIN_HEIGHT).min(ch);

    let width = snap_dimension_within(right - left, MIN_WIDTH, cw);
    let height = snap_dimension_within(bottom - top, MIN_HEIGHT, ch);
    settle(canvas, left, top, width, height)
}

// ─── Scale ───────────────────────────────────────────────────────────────

/// Replace a non-finite or non-positive display scale with identity.
pub fn sanitize_scale(scale: f32) -> f32 {
    if scale.is_finite() && scale > 0.0 {
        scale
    } else {
        1.0
    }
}

/// Convert a pointer position in display pixels to logical canvas
/// coordinates. `origin` is the canvas's top-left corner in the same
/// display space.
pub fn to_logical(pointer: (f32, f32), origin: (f32, f32), scale: f32) -> (f32, f32) {
    let scale = sanitize_scale(scale);
    ((pointer.0 - origin.0) / scale, (pointer.1 - origin.1) / scale)
}

/// Scale factor that fits a canvas into the available area without ever
/// enlarging it.
pub fn display_scale(canvas: CanvasSize, available_width: f32, available_height: f32) -> f32 {
    if canvas.width <= 0.0 || canvas.height <= 0.0 {
        return 1.0;
    }
    let raw = 1.0_f32
        .min(available_width / canvas.width)
        .min(available_height / canvas.height);
    sanitize_scale(raw)
}
