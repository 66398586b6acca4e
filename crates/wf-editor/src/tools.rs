//! Tool system for canvas interactions.
//!
//! Each tool translates input events into `EditMutation` commands that are
//! applied via the `EditorEngine`. Events reach tools already converted to
//! logical canvas coordinates.
//!
//! | Gesture | Result |
//! |---------|--------|
//! | Press on element | select it, start a move drag |
//! | Press on a handle of the selection | start a resize drag |
//! | Press on background | clear the selection |
//! | Palette drop | place a new component centred on the drop point |

use crate::engine::EditMutation;
use crate::input::InputEvent;
use wf_core::geometry::{Rect, ResizeHandle};
use wf_core::id::ElementId;

/// What lies under the pointer, resolved by the engine before dispatch.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CanvasHit {
    /// Topmost element under the pointer and its current geometry.
    pub element: Option<(ElementId, Rect)>,
    /// A resize handle of the selected element, with that element's geometry.
    pub handle: Option<(ElementId, ResizeHandle, Rect)>,
}

impl CanvasHit {
    pub const NONE: CanvasHit = CanvasHit {
        element: None,
        handle: None,
    };
}

/// Trait for tools that handle input and produce mutations.
pub trait Tool {
    /// Handle an input event, returning zero or more mutations.
    fn handle(&mut self, event: &InputEvent, hit: CanvasHit) -> Vec<EditMutation>;

    /// Abandon any gesture in progress (e.g. the active screen changed).
    fn reset(&mut self);
}

// ─── Select Tool ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
enum Drag {
    /// Pointer offset from the element's top-left, kept for the whole drag
    /// so the element doesn't jump under the cursor.
    Move {
        id: ElementId,
        offset_x: f32,
        offset_y: f32,
    },
    /// Resizes are always computed from the geometry at drag start.
    Resize {
        id: ElementId,
        handle: ResizeHandle,
        start: Rect,
    },
}

#[derive(Debug, Default)]
pub struct SelectTool {
    drag: Option<Drag>,
}

impl SelectTool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Handle currently being dragged, if a resize is in progress.
    pub fn active_handle(&self) -> Option<ResizeHandle> {
        match self.drag {
            Some(Drag::Resize { handle, .. }) => Some(handle),
            _ => None,
        }
    }
}

impl Tool for SelectTool {
    fn handle(&mut self, event: &InputEvent, hit: CanvasHit) -> Vec<EditMutation> {
        match *event {
            InputEvent::PointerDown { x, y } => {
                if let Some((id, handle, start)) = hit.handle {
                    self.drag = Some(Drag::Resize { id, handle, start });
                    return vec![];
                }
                if let Some((id, rect)) = hit.element {
                    self.drag = Some(Drag::Move {
                        id,
                        offset_x: x - rect.x,
                        offset_y: y - rect.y,
                    });
                    return vec![EditMutation::Select { id: Some(id) }];
                }
                self.drag = None;
                vec![EditMutation::Select { id: None }]
            }
            InputEvent::PointerMove { x, y } => match self.drag {
                Some(Drag::Move {
                    id,
                    offset_x,
                    offset_y,
                }) => vec![EditMutation::MoveElement {
                    id,
                    x: x - offset_x,
                    y: y - offset_y,
                }],
                Some(Drag::Resize { id, handle, start }) => vec![EditMutation::ResizeElement {
                    id,
                    handle,
                    start,
                    x,
                    y,
                }],
                None => vec![],
            },
            InputEvent::PointerUp { .. } => {
                self.drag = None;
                vec![]
            }
            InputEvent::Drop { x, y, kind } => {
                self.drag = None;
                vec![EditMutation::AddElement { kind, x, y }]
            }
        }
    }

    fn reset(&mut self) {
        self.drag = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use wf_core::model::ComponentKind;

    fn el_hit(rect: Rect) -> (ElementId, CanvasHit) {
        let id = ElementId::intern("tool-el");
        (
            id,
            CanvasHit {
                element: Some((id, rect)),
                handle: None,
            },
        )
    }

    #[test]
    fn press_drag_release_moves_with_offset() {
        let mut tool = SelectTool::new();
        let (id, hit) = el_hit(Rect::new(100.0, 100.0, 144.0, 48.0));

        let down = tool.handle(&InputEvent::from_pointer_down(110.0, 120.0), hit);
        assert_eq!(down, vec![EditMutation::Select { id: Some(id) }]);

        let moved = tool.handle(&InputEvent::from_pointer_move(210.0, 220.0), CanvasHit::NONE);
        assert_eq!(
            moved,
            vec![EditMutation::MoveElement {
                id,
                x: 200.0,
                y: 200.0
            }]
        );

        tool.handle(&InputEvent::from_pointer_up(210.0, 220.0), CanvasHit::NONE);
        assert!(!tool.is_dragging());
        assert!(
            tool.handle(&InputEvent::from_pointer_move(300.0, 300.0), CanvasHit::NONE)
                .is_empty()
        );
    }

    #[test]
    fn handle_press_starts_resize_from_start_geometry() {
        let mut tool = SelectTool::new();
        let id = ElementId::intern("tool-resize");
        let start = Rect::new(320.0, 320.0, 160.0, 96.0);
        let hit = CanvasHit {
            element: Some((id, start)),
            handle: Some((id, ResizeHandle::Se, start)),
        };
        assert!(tool.handle(&InputEvent::from_pointer_down(480.0, 416.0), hit).is_empty());
        assert_eq!(tool.active_handle(), Some(ResizeHandle::Se));

        let out = tool.handle(&InputEvent::from_pointer_move(600.0, 500.0), CanvasHit::NONE);
        assert_eq!(
            out,
            vec![EditMutation::ResizeElement {
                id,
                handle: ResizeHandle::Se,
                start,
                x: 600.0,
                y: 500.0
            }]
        );
    }

    #[test]
    fn background_press_clears_selection() {
        let mut tool = SelectTool::new();
        let out = tool.handle(&InputEvent::from_pointer_down(5.0, 5.0), CanvasHit::NONE);
        assert_eq!(out, vec![EditMutation::Select { id: None }]);
    }

    #[test]
    fn drop_places_component() {
        let mut tool = SelectTool::new();
        let ev = InputEvent::from_drop(100.0, 100.0, "button").unwrap();
        assert_eq!(
            tool.handle(&ev, CanvasHit::NONE),
            vec![EditMutation::AddElement {
                kind: ComponentKind::Button,
                x: 100.0,
                y: 100.0
            }]
        );
    }
}
