//! Hit testing: point → element / resize handle lookup.
//!
//! Walks a screen's elements in reverse paint order (front-to-back) to
//! find which element is at a given logical (x, y) position.

use wf_core::geometry::{Rect, ResizeHandle};
use wf_core::id::ElementId;
use wf_core::model::Screen;

/// How far (logical px) from a handle's anchor a pointer may land and
/// still grab it.
pub const HANDLE_TOLERANCE: f32 = 8.0;

/// Find the topmost element at position (px, py).
/// Returns `None` if only the canvas background is hit.
pub fn hit_test(screen: &Screen, px: f32, py: f32) -> Option<ElementId> {
    // Last painted = topmost
    screen
        .elements
        .iter()
        .rev()
        .find(|el| el.geometry.contains(px, py))
        .map(|el| el.id)
}

/// Find the resize handle of `rect` under (px, py), if any.
///
/// Corners win over edge midpoints when a small box puts them within
/// tolerance of each other.
pub fn hit_handle(rect: Rect, px: f32, py: f32, tolerance: f32) -> Option<ResizeHandle> {
    const PRIORITY: [ResizeHandle; 8] = [
        ResizeHandle::Nw,
        ResizeHandle::Ne,
        ResizeHandle::Se,
        ResizeHandle::Sw,
        ResizeHandle::N,
        ResizeHandle::E,
        ResizeHandle::S,
        ResizeHandle::W,
    ];
    PRIORITY.into_iter().find(|handle| {
        let (ax, ay) = handle.anchor(rect);
        (px - ax).abs() <= tolerance && (py - ay).abs() <= tolerance
    })
}
