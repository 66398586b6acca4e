//! Editor engine: the authoring-side state of a wireframe project.
//!
//! Owns the `ScreenGraph` (single source of truth for screens, elements,
//! links and hotspots) plus the editor-only state around it: which screen
//! is active, which element is selected, the clipboard, and the canvas
//! transform used to turn display-space pointer positions into logical
//! coordinates.
//!
//! Canvas input flows `InputEvent → CanvasTransform → SelectTool →
//! EditMutation → apply_mutation`; command-style edits (rename, link,
//! paste) call straight into the engine.

use crate::clipboard::Clipboard;
use crate::input::{CanvasTransform, InputEvent};
use crate::tools::{CanvasHit, SelectTool, Tool};
use wf_core::error::EditResult;
use wf_core::geometry::{Rect, ResizeHandle};
use wf_core::id::{ElementId, ScreenId};
use wf_core::model::{ComponentKind, Element, Screen, SizePreset};
use wf_core::ScreenGraph;
use wf_render::hit::{HANDLE_TOLERANCE, hit_handle, hit_test};

/// A single canvas edit, produced by tools and applied by the engine.
/// Positions are logical coordinates on the active screen.
#[derive(Debug, Clone, PartialEq)]
pub enum EditMutation {
    Select {
        id: Option<ElementId>,
    },
    AddElement {
        kind: ComponentKind,
        x: f32,
        y: f32,
    },
    MoveElement {
        id: ElementId,
        x: f32,
        y: f32,
    },
    /// Resize from the geometry captured when the drag began.
    ResizeElement {
        id: ElementId,
        handle: ResizeHandle,
        start: Rect,
        x: f32,
        y: f32,
    },
    RemoveElement {
        id: ElementId,
    },
    SetField {
        id: ElementId,
        field: String,
        value: String,
    },
    SetLink {
        id: ElementId,
        target: Option<ScreenId>,
    },
}

pub struct EditorEngine {
    /// Screens, elements, links and hotspots.
    pub graph: ScreenGraph,

    active: ScreenId,
    selected: Option<ElementId>,
    tool: SelectTool,
    clipboard: Clipboard,
    transform: CanvasTransform,
}

impl Default for EditorEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorEngine {
    /// A project with one empty `Screen 1`, active.
    pub fn new() -> Self {
        let graph = ScreenGraph::new();
        let active = graph
            .screen_ids()
            .first()
            .copied()
            .unwrap_or_else(ScreenId::generate);
        Self {
            graph,
            active,
            selected: None,
            tool: SelectTool::new(),
            clipboard: Clipboard::new(),
            transform: CanvasTransform::default(),
        }
    }

    // ─── Screens ─────────────────────────────────────────────────────────

    pub fn active_screen_id(&self) -> ScreenId {
        self.active
    }

    pub fn active_screen(&self) -> Option<&Screen> {
        self.graph.screen(self.active)
    }

    /// Switch the active screen. Clears the selection.
    pub fn set_active_screen(&mut self, id: ScreenId) -> bool {
        if !self.graph.contains(id) || id == self.active {
            return false;
        }
        self.active = id;
        self.selected = None;
        self.tool.reset();
        true
    }

    /// Create a screen and make it active.
    pub fn create_screen(&mut self, name: &str) -> ScreenId {
        let id = self.graph.create_screen(name);
        self.set_active_screen(id);
        id
    }

    /// Duplicate a screen and make the copy active.
    pub fn duplicate_screen(&mut self, id: ScreenId, name: Option<&str>) -> Option<ScreenId> {
        let copy = self.graph.duplicate_screen(id, name)?;
        self.set_active_screen(copy);
        Some(copy)
    }

    /// Delete a screen. If it was active, its fallback becomes active.
    pub fn delete_screen(&mut self, id: ScreenId) -> EditResult<ScreenId> {
        let fallback = self.graph.delete_screen(id)?;
        self.clipboard.forget_target(id);
        if self.active == id {
            self.set_active_screen(fallback);
        }
        Ok(self.active)
    }

    pub fn rename_screen(&mut self, id: ScreenId, name: &str) -> bool {
        self.graph.rename_screen(id, name)
    }

    /// Resize the active screen's canvas.
    pub fn set_canvas_size(
        &mut self,
        width: u32,
        height: u32,
        preset: Option<SizePreset>,
    ) -> EditResult<()> {
        self.graph.set_canvas_size(self.active, width, height, preset)
    }

    // ─── Canvas input ────────────────────────────────────────────────────

    pub fn transform(&self) -> CanvasTransform {
        self.transform
    }

    pub fn set_transform(&mut self, transform: CanvasTransform) {
        self.transform = transform;
    }

    /// Feed a display-space input event. Returns true if anything changed.
    pub fn handle_input(&mut self, event: &InputEvent) -> bool {
        let event = self.transform.apply(event);
        let hit = match event {
            InputEvent::PointerDown { x, y } => self.hit_at(x, y),
            _ => CanvasHit::NONE,
        };
        let mutations = self.tool.handle(&event, hit);
        let mut changed = false;
        for m in mutations {
            changed |= self.apply_mutation(m);
        }
        changed
    }

    fn hit_at(&self, x: f32, y: f32) -> CanvasHit {
        let Some(screen) = self.active_screen() else {
            return CanvasHit::NONE;
        };
        let handle = self
            .selected
            .and_then(|id| screen.element(id))
            .and_then(|el| {
                hit_handle(el.geometry, x, y, HANDLE_TOLERANCE).map(|h| (el.id, h, el.geometry))
            });
        let element = hit_test(screen, x, y)
            .and_then(|id| screen.element(id))
            .map(|el| (el.id, el.geometry));
        CanvasHit { element, handle }
    }

    /// Apply a mutation to the active screen. Returns true if it changed
    /// anything.
    pub fn apply_mutation(&mut self, mutation: EditMutation) -> bool {
        match mutation {
            EditMutation::Select { id } => self.select(id),
            EditMutation::AddElement { kind, x, y } => {
                match self.graph.add_element(self.active, kind, x, y) {
                    Some(id) => {
                        self.selected = Some(id);
                        true
                    }
                    None => false,
                }
            }
            EditMutation::MoveElement { id, x, y } => {
                self.owned_by_active(id) && self.graph.move_element(id, x, y)
            }
            EditMutation::ResizeElement {
                id,
                handle,
                start,
                x,
                y,
            } => self.owned_by_active(id) && self.graph.resize_element(id, start, handle, x, y),
            EditMutation::RemoveElement { id } => self.remove_element(id),
            EditMutation::SetField { id, field, value } => {
                match self.graph.set_element_field(id, &field, &value) {
                    Ok(changed) => changed,
                    Err(err) => {
                        log::debug!("field edit rejected: {err}");
                        false
                    }
                }
            }
            EditMutation::SetLink { id, target } => self.graph.set_link(id, target),
        }
    }

    // ─── Selection ───────────────────────────────────────────────────────

    pub fn selected(&self) -> Option<ElementId> {
        self.selected
    }

    pub fn selected_element(&self) -> Option<&Element> {
        self.graph.element(self.selected?)
    }

    /// Select an element on the active screen, or clear with `None`.
    pub fn select(&mut self, id: Option<ElementId>) -> bool {
        let id = id.filter(|id| self.owned_by_active(*id));
        let changed = self.selected != id;
        self.selected = id;
        changed
    }

    /// Selection-bar caption, e.g. `Button -> Checkout`.
    pub fn selection_caption(&self) -> Option<String> {
        let el = self.selected_element()?;
        let target = el
            .target_screen
            .and_then(|t| self.graph.screen(t))
            .map(|s| s.name.as_str());
        Some(el.caption(target))
    }

    /// Edit a content field of the selected element.
    pub fn set_selected_field(&mut self, field: &str, value: &str) -> EditResult<bool> {
        let Some(id) = self.selected else {
            return Ok(false);
        };
        self.graph.set_element_field(id, field, value)
    }

    /// Link the selected element, or clear its link with `None`.
    pub fn set_selected_link(&mut self, target: Option<ScreenId>) -> bool {
        match self.selected {
            Some(id) => self.graph.set_link(id, target),
            None => false,
        }
    }

    pub fn delete_selected(&mut self) -> bool {
        match self.selected {
            Some(id) => self.remove_element(id),
            None => false,
        }
    }

    fn remove_element(&mut self, id: ElementId) -> bool {
        let removed = self.graph.remove_element(id).is_some();
        if removed && self.selected == Some(id) {
            self.selected = None;
        }
        removed
    }

    // ─── Clipboard ───────────────────────────────────────────────────────

    pub fn clipboard(&self) -> &Clipboard {
        &self.clipboard
    }

    pub fn copy_selected(&mut self) -> bool {
        let Some(el) = self.selected_element() else {
            return false;
        };
        let el = el.clone();
        self.clipboard.copy(&el);
        true
    }

    /// Paste onto the active screen and select the result.
    pub fn paste(&mut self) -> Option<ElementId> {
        let item = self.clipboard.next_paste()?;
        let id = self.graph.insert_element(self.active, item)?;
        if let Some(placed) = self.graph.element(id) {
            let placed = placed.clone();
            self.clipboard.commit_paste(&placed);
        }
        self.selected = Some(id);
        Some(id)
    }

    /// Copy then paste the selection in one step.
    pub fn duplicate_selected(&mut self) -> Option<ElementId> {
        if !self.copy_selected() {
            return None;
        }
        self.paste()
    }

    fn owned_by_active(&self, id: ElementId) -> bool {
        self.graph.element_screen(id) == Some(self.active)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use wf_core::error::EditError;
    use wf_core::geometry::GRID_SIZE;

    fn drop(engine: &mut EditorEngine, token: &str, x: f32, y: f32) -> ElementId {
        let ev = InputEvent::from_drop(x, y, token).unwrap();
        assert!(engine.handle_input(&ev));
        engine.selected().unwrap()
    }

    #[test]
    fn drop_button_at_scenario_point() {
        let mut engine = EditorEngine::new();
        let id = drop(&mut engine, "button", 100.0, 100.0);
        let g = engine.graph.element(id).unwrap().geometry;
        assert_eq!(g, Rect::new(32.0, 80.0, 144.0, 48.0));
    }

    #[test]
    fn drag_moves_in_logical_space() {
        let mut engine = EditorEngine::new();
        engine.set_transform(CanvasTransform::new(100.0, 50.0, 0.5));
        // Display (150, 100) → logical (100, 100).
        let id = drop(&mut engine, "button", 150.0, 100.0);
        assert_eq!(engine.graph.element(id).unwrap().geometry.x, 32.0);

        // Grab at logical (40, 90), release at (240, 290).
        engine.handle_input(&InputEvent::from_pointer_down(120.0, 95.0));
        engine.handle_input(&InputEvent::from_pointer_move(220.0, 195.0));
        engine.handle_input(&InputEvent::from_pointer_up(220.0, 195.0));

        let g = engine.graph.element(id).unwrap().geometry;
        assert_eq!((g.x, g.y), (240.0, 288.0));
        assert_eq!(g.x % GRID_SIZE, 0.0);
    }

    #[test]
    fn resize_via_handle() {
        let mut engine = EditorEngine::new();
        let id = drop(&mut engine, "card", 400.0, 300.0);
        let start = engine.graph.element(id).unwrap().geometry;
        let (hx, hy) = ResizeHandle::Se.anchor(start);
        engine.handle_input(&InputEvent::from_pointer_down(hx, hy));
        engine.handle_input(&InputEvent::from_pointer_move(5000.0, 5000.0));
        let g = engine.graph.element(id).unwrap().geometry;
        assert_eq!(g.right(), 1280.0);
        assert_eq!(g.bottom(), 720.0);
        assert_eq!((g.x, g.y), (start.x, start.y));
    }

    #[test]
    fn background_click_clears_selection() {
        let mut engine = EditorEngine::new();
        drop(&mut engine, "button", 100.0, 100.0);
        engine.handle_input(&InputEvent::from_pointer_down(1000.0, 600.0));
        assert_eq!(engine.selected(), None);
    }

    #[test]
    fn deleting_active_screen_activates_fallback() {
        let mut engine = EditorEngine::new();
        let first = engine.active_screen_id();
        let second = engine.create_screen("Checkout");
        assert_eq!(engine.active_screen_id(), second);
        assert_eq!(engine.delete_screen(second), Ok(first));
        assert_eq!(engine.active_screen_id(), first);
        assert_eq!(engine.delete_screen(first), Err(EditError::LastScreen));
    }

    #[test]
    fn caption_names_link_target() {
        let mut engine = EditorEngine::new();
        let home = engine.active_screen_id();
        let checkout = engine.create_screen("Checkout");
        engine.set_active_screen(home);
        drop(&mut engine, "button", 100.0, 100.0);
        assert_eq!(engine.selection_caption().unwrap(), "Button selected");
        assert!(engine.set_selected_link(Some(checkout)));
        assert_eq!(engine.selection_caption().unwrap(), "Button -> Checkout");
    }

    #[test]
    fn paste_cascades_and_strips_deleted_links() {
        let mut engine = EditorEngine::new();
        let home = engine.active_screen_id();
        let other = engine.create_screen("Other");
        engine.set_active_screen(home);
        let src = drop(&mut engine, "button", 100.0, 100.0);
        engine.set_selected_link(Some(other));
        assert!(engine.copy_selected());

        let first = engine.paste().unwrap();
        let second = engine.paste().unwrap();
        let g0 = engine.graph.element(src).unwrap().geometry;
        let g1 = engine.graph.element(first).unwrap().geometry;
        let g2 = engine.graph.element(second).unwrap().geometry;
        assert_eq!((g1.x - g0.x, g1.y - g0.y), (16.0, 16.0));
        assert_eq!((g2.x - g1.x, g2.y - g1.y), (32.0, 32.0));
        assert_eq!(engine.graph.element(first).unwrap().target_screen, Some(other));
        assert_ne!(
            engine.graph.element(first).unwrap().hotspot_id,
            engine.graph.element(src).unwrap().hotspot_id
        );

        engine.delete_screen(other).unwrap();
        let third = engine.paste().unwrap();
        assert_eq!(engine.graph.element(third).unwrap().target_screen, None);
    }

    #[test]
    fn delete_selected_releases_selection() {
        let mut engine = EditorEngine::new();
        let id = drop(&mut engine, "image", 300.0, 300.0);
        assert!(engine.delete_selected());
        assert_eq!(engine.selected(), None);
        assert!(engine.graph.element(id).is_none());
    }

    #[test]
    fn selection_is_scoped_to_active_screen() {
        let mut engine = EditorEngine::new();
        let home = engine.active_screen_id();
        let id = drop(&mut engine, "button", 100.0, 100.0);
        engine.create_screen("Other");
        assert_eq!(engine.selected(), None);
        assert!(!engine.select(Some(id)));
        engine.set_active_screen(home);
        assert!(engine.select(Some(id)));
    }

    #[test]
    fn field_edits_go_through_selection() {
        let mut engine = EditorEngine::new();
        drop(&mut engine, "slider", 300.0, 300.0);
        assert_eq!(engine.set_selected_field("value", "80"), Ok(true));
        assert!(matches!(
            engine.set_selected_field("value", "eighty"),
            Err(EditError::InvalidFieldValue { .. })
        ));
    }
}
