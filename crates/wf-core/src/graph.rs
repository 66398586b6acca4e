//! Screen & link graph.
//!
//! Screens are the nodes of a directed graph; every hotspot link is an edge
//! from the screen holding the element to the screen it navigates to,
//! weighted by the element's id. Edges are rebuilt from element state after
//! each link change so the two views never disagree.
//!
//! Link integrity is eager: deleting a screen clears the target (and
//! releases the hotspot) of every element that pointed at it before the
//! call returns.

use crate::error::{EditError, EditResult};
use crate::geometry::{self, Rect, ResizeHandle};
use crate::hotspot::HotspotRegistry;
use crate::id::{ElementId, HotspotId, ScreenId};
use crate::model::{ComponentKind, Element, Screen, SizePreset};
use petgraph::Direction;
use petgraph::graph::NodeIndex;
use petgraph::stable_graph::StableDiGraph;
use petgraph::visit::{Bfs, EdgeRef};
use std::collections::HashMap;

/// All screens of a project, their elements, and the links between them.
#[derive(Debug, Clone)]
pub struct ScreenGraph {
    /// Screen nodes; edges are hotspot links labelled by element id.
    graph: StableDiGraph<Screen, ElementId>,

    /// Index from ScreenId → NodeIndex for fast lookup.
    id_index: HashMap<ScreenId, NodeIndex>,

    /// Creation order, used for listings and delete fallback.
    order: Vec<ScreenId>,

    /// Which screen currently owns each element.
    element_index: HashMap<ElementId, ScreenId>,

    hotspots: HotspotRegistry,

    /// Number used for the next suggested `Screen N` name.
    screen_counter: u32,
}

impl Default for ScreenGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl ScreenGraph {
    /// Create a project holding a single empty `Screen 1`.
    #[must_use]
    pub fn new() -> Self {
        let mut sg = Self {
            graph: StableDiGraph::new(),
            id_index: HashMap::new(),
            order: Vec::new(),
            element_index: HashMap::new(),
            hotspots: HotspotRegistry::new(),
            screen_counter: 1,
        };
        sg.create_screen("");
        sg
    }

    // ─── Screens ─────────────────────────────────────────────────────────

    /// Name offered for the next new screen.
    pub fn suggested_screen_name(&self) -> String {
        format!("Screen {}", self.screen_counter)
    }

    /// Add a screen at the default size. A blank name falls back to the
    /// suggested `Screen N`.
    pub fn create_screen(&mut self, name: &str) -> ScreenId {
        let name = match name.trim() {
            "" => self.suggested_screen_name(),
            trimmed => trimmed.to_string(),
        };
        let id = ScreenId::generate();
        let idx = self.graph.add_node(Screen::new(id, name));
        self.id_index.insert(id, idx);
        self.order.push(id);
        self.screen_counter += 1;
        log::debug!("screen {id} created");
        id
    }

    pub fn screen(&self, id: ScreenId) -> Option<&Screen> {
        self.id_index.get(&id).map(|idx| &self.graph[*idx])
    }

    pub fn contains(&self, id: ScreenId) -> bool {
        self.id_index.contains_key(&id)
    }

    /// Screens in creation order.
    pub fn screens(&self) -> impl Iterator<Item = &Screen> {
        self.order
            .iter()
            .filter_map(|id| self.id_index.get(id))
            .map(|idx| &self.graph[*idx])
    }

    pub fn screen_ids(&self) -> &[ScreenId] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Returns true if the name changed.
    pub fn rename_screen(&mut self, id: ScreenId, name: &str) -> bool {
        let name = name.trim();
        let Some(screen) = self.screen_mut(id) else {
            return false;
        };
        if name.is_empty() || screen.name == name {
            return false;
        }
        screen.name = name.to_string();
        true
    }

    /// Resize a screen's canvas and pull every element back inside it.
    ///
    /// Without an explicit preset the matching fixed preset is used, else
    /// `Custom`.
    pub fn set_canvas_size(
        &mut self,
        id: ScreenId,
        width: u32,
        height: u32,
        preset: Option<SizePreset>,
    ) -> EditResult<()> {
        let side_ok = |v: u32| (1..=geometry::MAX_CANVAS_SIDE).contains(&v);
        if !side_ok(width) || !side_ok(height) {
            return Err(EditError::InvalidCanvasSize { width, height });
        }
        let screen = self.screen_mut(id).ok_or(EditError::ScreenNotFound(id))?;
        screen.width = width;
        screen.height = height;
        screen.preset = preset
            .or_else(|| SizePreset::matching(width, height))
            .unwrap_or(SizePreset::Custom);
        Self::enforce_bounds(screen);
        Ok(())
    }

    /// Delete a screen. Returns the screen that should become active in its
    /// place (the next one in creation order, else the previous one).
    ///
    /// # Errors
    /// `LastScreen` when it is the only screen; `ScreenNotFound` for a stale id.
    pub fn delete_screen(&mut self, id: ScreenId) -> EditResult<ScreenId> {
        let idx = *self.id_index.get(&id).ok_or(EditError::ScreenNotFound(id))?;
        let pos = self
            .order
            .iter()
            .position(|s| *s == id)
            .ok_or(EditError::ScreenNotFound(id))?;
        let fallback = self
            .order
            .get(pos + 1)
            .or_else(|| pos.checked_sub(1).and_then(|p| self.order.get(p)))
            .copied()
            .ok_or(EditError::LastScreen)?;

        let removed = self
            .graph
            .remove_node(idx)
            .ok_or(EditError::ScreenNotFound(id))?;
        self.id_index.remove(&id);
        self.order.remove(pos);
        for el in &removed.elements {
            self.element_index.remove(&el.id);
            self.hotspots.release_element(el.id);
        }
        self.clear_links_to(id);
        log::debug!("screen {id} deleted, fallback {fallback}");
        Ok(fallback)
    }

    /// Copy a screen with all its elements. Elements get new ids and new
    /// hotspots; link targets are preserved.
    pub fn duplicate_screen(&mut self, id: ScreenId, name: Option<&str>) -> Option<ScreenId> {
        let source = self.screen(id)?.clone();
        let name = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("{} copy", source.name));

        let new_id = self.create_screen(&name);
        let new_idx = *self.id_index.get(&new_id)?;

        let mut copies = Vec::with_capacity(source.elements.len());
        for el in &source.elements {
            let mut copy = el.duplicate();
            let exists = copy.target_screen.is_some_and(|t| self.id_index.contains_key(&t));
            self.hotspots.refresh_metadata(new_id, &mut copy, exists);
            self.element_index.insert(copy.id, new_id);
            copies.push(copy);
        }

        let screen = &mut self.graph[new_idx];
        screen.width = source.width;
        screen.height = source.height;
        screen.preset = source.preset;
        screen.elements = copies;
        self.rebuild_links(new_idx);
        Some(new_id)
    }

    // ─── Elements ────────────────────────────────────────────────────────

    /// Drop a component centred on `(x, y)` (logical coordinates).
    pub fn add_element(
        &mut self,
        screen_id: ScreenId,
        kind: ComponentKind,
        x: f32,
        y: f32,
    ) -> Option<ElementId> {
        let screen = self.screen_mut(screen_id)?;
        let (w, h) = kind.default_size();
        let rect = geometry::place_centered(screen.canvas_size(), x, y, w, h);
        let element = Element::new(kind, rect);
        let id = element.id;
        screen.elements.push(element);
        self.element_index.insert(id, screen_id);
        Some(id)
    }

    /// Place an existing element (e.g. from the clipboard) onto a screen,
    /// fitted to its canvas. Any hotspot it carried is discarded; a valid
    /// link gets a fresh one.
    pub fn insert_element(&mut self, screen_id: ScreenId, mut element: Element) -> Option<ElementId> {
        let idx = *self.id_index.get(&screen_id)?;
        if self.element_index.contains_key(&element.id) {
            element.id = ElementId::generate();
        }
        element.hotspot_id = None;
        element.geometry = geometry::fit_within(self.graph[idx].canvas_size(), element.geometry);
        let exists = element
            .target_screen
            .is_some_and(|t| self.id_index.contains_key(&t));
        self.hotspots.refresh_metadata(screen_id, &mut element, exists);

        let id = element.id;
        self.graph[idx].elements.push(element);
        self.element_index.insert(id, screen_id);
        self.rebuild_links(idx);
        Some(id)
    }

    pub fn element(&self, id: ElementId) -> Option<&Element> {
        let (idx, pos) = self.locate(id)?;
        self.graph[idx].elements.get(pos)
    }

    /// Screen currently owning the element.
    pub fn element_screen(&self, id: ElementId) -> Option<ScreenId> {
        self.element_index.get(&id).copied()
    }

    /// Move an element so its top-left lands at `(x, y)`, clamped and snapped.
    pub fn move_element(&mut self, id: ElementId, x: f32, y: f32) -> bool {
        let Some((idx, pos)) = self.locate(id) else {
            return false;
        };
        let screen = &mut self.graph[idx];
        let canvas = screen.canvas_size();
        let el = &mut screen.elements[pos];
        let next = geometry::move_to(canvas, el.geometry, x, y);
        let changed = next != el.geometry;
        el.geometry = next;
        changed
    }

    /// Resize an element from its geometry at drag start.
    pub fn resize_element(
        &mut self,
        id: ElementId,
        start: Rect,
        handle: ResizeHandle,
        pointer_x: f32,
        pointer_y: f32,
    ) -> bool {
        let Some((idx, pos)) = self.locate(id) else {
            return false;
        };
        let screen = &mut self.graph[idx];
        let canvas = screen.canvas_size();
        let el = &mut screen.elements[pos];
        let next = geometry::resize(canvas, start, handle, pointer_x, pointer_y);
        let changed = next != el.geometry;
        el.geometry = next;
        changed
    }

    /// Remove an element, releasing its hotspot.
    pub fn remove_element(&mut self, id: ElementId) -> Option<Element> {
        let (idx, pos) = self.locate(id)?;
        let mut removed = self.graph[idx].elements.remove(pos);
        self.element_index.remove(&id);
        self.hotspots.release(&mut removed);
        self.rebuild_links(idx);
        Some(removed)
    }

    /// Edit a content field. The hotspot id is untouched; only its derived
    /// name is refreshed.
    pub fn set_element_field(&mut self, id: ElementId, field: &str, value: &str) -> EditResult<bool> {
        let (idx, pos) = self.locate(id).ok_or(EditError::ElementNotFound(id))?;
        let screen_id = self.graph[idx].id;
        let target_exists = self.graph[idx].elements[pos]
            .target_screen
            .is_some_and(|t| self.id_index.contains_key(&t));

        let el = &mut self.graph[idx].elements[pos];
        let changed = el.set_field(field, value)?;
        if changed && el.target_screen.is_some() {
            self.hotspots.refresh_metadata(screen_id, el, target_exists);
        }
        Ok(changed)
    }

    /// Link an element to a screen, or clear the link with `None`.
    /// A target that does not exist is treated as `None`.
    pub fn set_link(&mut self, id: ElementId, target: Option<ScreenId>) -> bool {
        let Some((idx, pos)) = self.locate(id) else {
            return false;
        };
        let target = target.filter(|t| self.id_index.contains_key(t));
        let screen_id = self.graph[idx].id;

        let el = &mut self.graph[idx].elements[pos];
        let changed = el.target_screen != target;
        el.target_screen = target;
        self.hotspots
            .refresh_metadata(screen_id, el, target.is_some());
        if changed {
            self.rebuild_links(idx);
        }
        changed
    }

    // ─── Hotspots & links ────────────────────────────────────────────────

    pub fn hotspots(&self) -> &HotspotRegistry {
        &self.hotspots
    }

    /// The element a hotspot currently belongs to.
    pub fn hotspot_element(&self, hotspot: HotspotId) -> Option<&Element> {
        let h = self.hotspots.get(hotspot)?;
        self.element(h.element_id)
    }

    /// `(source screen, element)` pairs linking into `screen`.
    pub fn incoming_links(&self, screen: ScreenId) -> Vec<(ScreenId, ElementId)> {
        let Some(&idx) = self.id_index.get(&screen) else {
            return Vec::new();
        };
        let mut links: Vec<(ScreenId, ElementId)> = self
            .graph
            .edges_directed(idx, Direction::Incoming)
            .map(|e| (self.graph[e.source()].id, *e.weight()))
            .collect();
        links.sort();
        links
    }

    /// Screens a preview visitor can reach from `start` by following links,
    /// including `start` itself.
    pub fn reachable_from(&self, start: ScreenId) -> Vec<ScreenId> {
        let Some(&idx) = self.id_index.get(&start) else {
            return Vec::new();
        };
        let mut bfs = Bfs::new(&self.graph, idx);
        let mut found = Vec::new();
        while let Some(n) = bfs.next(&self.graph) {
            found.push(self.graph[n].id);
        }
        found
    }

    // ─── Internals ───────────────────────────────────────────────────────

    fn screen_mut(&mut self, id: ScreenId) -> Option<&mut Screen> {
        let idx = *self.id_index.get(&id)?;
        self.graph.node_weight_mut(idx)
    }

    fn locate(&self, id: ElementId) -> Option<(NodeIndex, usize)> {
        let screen = self.element_index.get(&id)?;
        let idx = *self.id_index.get(screen)?;
        let pos = self.graph[idx].elements.iter().position(|e| e.id == id)?;
        Some((idx, pos))
    }

    /// Re-fit every element after the canvas changed size.
    fn enforce_bounds(screen: &mut Screen) {
        let canvas = screen.canvas_size();
        for el in &mut screen.elements {
            el.geometry = geometry::fit_within(canvas, el.geometry);
        }
    }

    fn clear_links_to(&mut self, target: ScreenId) {
        let indices: Vec<NodeIndex> = self.graph.node_indices().collect();
        for idx in indices {
            let mut touched = false;
            for el in &mut self.graph[idx].elements {
                if el.target_screen == Some(target) {
                    el.target_screen = None;
                    self.hotspots.release(el);
                    touched = true;
                }
            }
            if touched {
                self.rebuild_links(idx);
            }
        }
    }

    /// Replace a screen's outgoing edges with one per linked element.
    fn rebuild_links(&mut self, idx: NodeIndex) {
        let stale: Vec<_> = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .map(|e| e.id())
            .collect();
        for edge in stale {
            self.graph.remove_edge(edge);
        }
        let links: Vec<(ElementId, NodeIndex)> = self.graph[idx]
            .elements
            .iter()
            .filter_map(|el| {
                let target = el.target_screen?;
                Some((el.id, *self.id_index.get(&target)?))
            })
            .collect();
        for (element, target) in links {
            self.graph.add_edge(idx, target, element);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{GRID_SIZE, MIN_HEIGHT, MIN_WIDTH};
    use pretty_assertions::assert_eq;

    fn first(sg: &ScreenGraph) -> ScreenId {
        sg.screen_ids()[0]
    }

    #[test]
    fn new_project_has_one_screen() {
        let sg = ScreenGraph::new();
        assert_eq!(sg.len(), 1);
        assert_eq!(sg.screens().next().unwrap().name, "Screen 1");
        assert_eq!(sg.suggested_screen_name(), "Screen 2");
    }

    #[test]
    fn blank_name_uses_suggestion() {
        let mut sg = ScreenGraph::new();
        let id = sg.create_screen("   ");
        assert_eq!(sg.screen(id).unwrap().name, "Screen 2");
        let named = sg.create_screen("  Checkout ");
        assert_eq!(sg.screen(named).unwrap().name, "Checkout");
    }

    #[test]
    fn deleting_last_screen_is_rejected() {
        let mut sg = ScreenGraph::new();
        let only = first(&sg);
        assert_eq!(sg.delete_screen(only), Err(EditError::LastScreen));
        assert_eq!(sg.len(), 1);
    }

    #[test]
    fn delete_falls_back_to_next_then_previous() {
        let mut sg = ScreenGraph::new();
        let a = first(&sg);
        let b = sg.create_screen("B");
        let c = sg.create_screen("C");
        assert_eq!(sg.delete_screen(b), Ok(c));
        assert_eq!(sg.delete_screen(c), Ok(a));
    }

    #[test]
    fn delete_clears_links_and_hotspots() {
        let mut sg = ScreenGraph::new();
        let a = first(&sg);
        let b = sg.create_screen("B");
        let btn = sg.add_element(a, ComponentKind::Button, 100.0, 100.0).unwrap();
        assert!(sg.set_link(btn, Some(b)));
        assert!(sg.element(btn).unwrap().hotspot_id.is_some());
        assert_eq!(sg.incoming_links(b).len(), 1);

        sg.delete_screen(b).unwrap();
        let el = sg.element(btn).unwrap();
        assert_eq!(el.target_screen, None);
        assert_eq!(el.hotspot_id, None);
        assert!(sg.hotspots().is_empty());
    }

    #[test]
    fn link_to_missing_screen_is_no_link() {
        let mut sg = ScreenGraph::new();
        let a = first(&sg);
        let btn = sg.add_element(a, ComponentKind::Button, 100.0, 100.0).unwrap();
        assert!(!sg.set_link(btn, Some(ScreenId::intern("screen-nowhere"))));
        assert_eq!(sg.element(btn).unwrap().target_screen, None);
    }

    #[test]
    fn editing_label_keeps_hotspot() {
        let mut sg = ScreenGraph::new();
        let a = first(&sg);
        let b = sg.create_screen("B");
        let btn = sg.add_element(a, ComponentKind::Button, 100.0, 100.0).unwrap();
        sg.set_link(btn, Some(b));
        let before = sg.element(btn).unwrap().hotspot_id;

        assert_eq!(sg.set_element_field(btn, "label", "Continue"), Ok(true));
        let hs = sg.element(btn).unwrap().hotspot_id;
        assert_eq!(hs, before);
        assert_eq!(sg.hotspots().get(hs.unwrap()).unwrap().name, "Continue");
    }

    #[test]
    fn duplicate_screen_gets_new_hotspots() {
        let mut sg = ScreenGraph::new();
        let a = first(&sg);
        let b = sg.create_screen("B");
        sg.set_canvas_size(a, 375, 667, None).unwrap();
        let btn = sg.add_element(a, ComponentKind::Button, 100.0, 100.0).unwrap();
        sg.set_link(btn, Some(b));

        let copy = sg.duplicate_screen(a, None).unwrap();
        let dup = sg.screen(copy).unwrap();
        assert_eq!(dup.name, "Screen 1 copy");
        assert_eq!((dup.width, dup.height), (375, 667));
        assert_eq!(dup.preset, SizePreset::Phone);
        let dup_el = &dup.elements[0];
        assert_ne!(dup_el.id, btn);
        assert_eq!(dup_el.target_screen, Some(b));
        assert!(dup_el.hotspot_id.is_some());
        assert_ne!(dup_el.hotspot_id, sg.element(btn).unwrap().hotspot_id);
        assert_eq!(sg.hotspots().len(), 2);
        assert_eq!(sg.incoming_links(b).len(), 2);
    }

    #[test]
    fn shrinking_canvas_pulls_elements_inside() {
        let mut sg = ScreenGraph::new();
        let a = first(&sg);
        let card = sg.add_element(a, ComponentKind::Card, 1200.0, 650.0).unwrap();
        sg.set_canvas_size(a, 375, 667, None).unwrap();

        let g = sg.element(card).unwrap().geometry;
        assert!(g.x >= 0.0 && g.y >= 0.0);
        assert!(g.right() <= 375.0 && g.bottom() <= 667.0);
        assert!(g.width >= MIN_WIDTH && g.height >= MIN_HEIGHT);
        assert_eq!(sg.screen(a).unwrap().preset, SizePreset::Phone);
    }

    #[test]
    fn custom_size_and_zero_rejected() {
        let mut sg = ScreenGraph::new();
        let a = first(&sg);
        sg.set_canvas_size(a, 800, 600, None).unwrap();
        assert_eq!(sg.screen(a).unwrap().preset, SizePreset::Custom);
        assert_eq!(
            sg.set_canvas_size(a, 0, 600, None),
            Err(EditError::InvalidCanvasSize {
                width: 0,
                height: 600
            })
        );
    }

    #[test]
    fn move_and_resize_stay_in_bounds_and_on_grid() {
        let mut sg = ScreenGraph::new();
        let a = first(&sg);
        let el = sg.add_element(a, ComponentKind::Image, 400.0, 300.0).unwrap();
        let moves = [(-50.0, -50.0), (5000.0, 5000.0), (333.3, 177.7), (1279.0, 0.0)];
        for (x, y) in moves {
            sg.move_element(el, x, y);
            let g = sg.element(el).unwrap().geometry;
            assert!(g.fits_in(sg.screen(a).unwrap().canvas_size()), "{g:?}");
            assert_eq!(g.x % GRID_SIZE, 0.0);
            assert_eq!(g.y % GRID_SIZE, 0.0);
        }
        let start = sg.element(el).unwrap().geometry;
        sg.resize_element(el, start, ResizeHandle::Sw, -400.0, 9000.0);
        let g = sg.element(el).unwrap().geometry;
        assert!(g.fits_in(sg.screen(a).unwrap().canvas_size()), "{g:?}");
        assert_eq!(g.x, 0.0);
        assert_eq!(g.bottom(), 720.0);
    }

    #[test]
    fn remove_element_releases_hotspot() {
        let mut sg = ScreenGraph::new();
        let a = first(&sg);
        let b = sg.create_screen("B");
        let btn = sg.add_element(a, ComponentKind::Button, 100.0, 100.0).unwrap();
        sg.set_link(btn, Some(b));
        assert!(sg.remove_element(btn).is_some());
        assert!(sg.hotspots().is_empty());
        assert!(sg.incoming_links(b).is_empty());
        assert!(sg.element(btn).is_none());
    }

    #[test]
    fn reachability_follows_links() {
        let mut sg = ScreenGraph::new();
        let a = first(&sg);
        let b = sg.create_screen("B");
        let c = sg.create_screen("C");
        let _orphan = sg.create_screen("D");
        let ab = sg.add_element(a, ComponentKind::Button, 100.0, 100.0).unwrap();
        let bc = sg.add_element(b, ComponentKind::Card, 300.0, 300.0).unwrap();
        sg.set_link(ab, Some(b));
        sg.set_link(bc, Some(c));

        let mut reach = sg.reachable_from(a);
        reach.sort();
        let mut expected = vec![a, b, c];
        expected.sort();
        assert_eq!(reach, expected);
    }

    #[test]
    fn rename_trims_and_ignores_blank() {
        let mut sg = ScreenGraph::new();
        let a = first(&sg);
        assert!(sg.rename_screen(a, " Home "));
        assert!(!sg.rename_screen(a, "Home"));
        assert!(!sg.rename_screen(a, "   "));
        assert_eq!(sg.screen(a).unwrap().name, "Home");
    }
}
