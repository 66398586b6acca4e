//! Preview controller: the clickable prototype and its recording loop.
//!
//! The preview shows one screen at a time as a list of `PreviewItem`s, one
//! per linked element. Pointer activity over the preview is attributed to a
//! hotspot, handed to the `InteractionRecorder`, and every sample the
//! recorder keeps is folded into the `SessionTracker`. Clicking a hotspot
//! navigates to its target screen.
//!
//! Items cache their hotspot id. A cached id that no longer resolves is
//! dropped and looked up again through the registry, never through the
//! rendered tree.

use crate::recorder::{InteractionRecorder, RecorderConfig};
use crate::rollup::{HotspotRollup, ScreenTotals, hotspot_rollups, screen_totals};
use crate::session::{PreviewMode, SessionSummary, SessionTracker};
use serde::Serialize;
use wf_core::ScreenGraph;
use wf_core::geometry::Rect;
use wf_core::id::{ElementId, HotspotId, ScreenId};

/// A hotspot-bearing item rendered in the preview.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewItem {
    pub element_id: ElementId,
    pub source_screen_id: ScreenId,
    pub target_screen_id: Option<ScreenId>,
    pub label: String,
    pub geometry: Rect,
    /// Cached attribution; may go stale after edits.
    pub hotspot_id: Option<HotspotId>,
}

/// Where an interaction is attributed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HotspotInfo {
    pub hotspot_id: HotspotId,
    pub target_screen_id: ScreenId,
}

/// Resolve (and cache) the hotspot behind a preview item.
///
/// Lookup order: the cached id, then the registry entry of the authoring
/// element, then any hotspot on the source screen linking to the same
/// target (ties broken by label).
pub fn resolve_hotspot_info(graph: &ScreenGraph, item: &mut PreviewItem) -> Option<HotspotInfo> {
    let registry = graph.hotspots();

    if let Some(cached) = item.hotspot_id {
        if let Some(h) = registry.get(cached) {
            return Some(HotspotInfo {
                hotspot_id: h.id,
                target_screen_id: h.target_screen_id,
            });
        }
        log::trace!("stale cached hotspot {cached} on {}", item.element_id);
        item.hotspot_id = None;
    }

    let found = registry
        .hotspot_for_element(item.element_id)
        .and_then(|id| registry.get(id))
        .or_else(|| {
            let target = item.target_screen_id?;
            let candidates = registry.linking(item.source_screen_id, target);
            match candidates.len() {
                0 => None,
                1 => candidates.first().copied(),
                _ => candidates
                    .iter()
                    .find(|h| h.name == item.label)
                    .or_else(|| candidates.first())
                    .copied(),
            }
        })?;

    item.hotspot_id = Some(found.id);
    Some(HotspotInfo {
        hotspot_id: found.id,
        target_screen_id: found.target_screen_id,
    })
}

/// Preview window state plus the analytics it produces.
#[derive(Debug, Default)]
pub struct PreviewController {
    open: bool,
    screen: Option<ScreenId>,
    items: Vec<PreviewItem>,
    recorder: InteractionRecorder,
    sessions: SessionTracker,
}

impl PreviewController {
    pub fn new(config: RecorderConfig) -> Self {
        Self {
            recorder: InteractionRecorder::new(config),
            ..Self::default()
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn mode(&self) -> PreviewMode {
        self.sessions.mode()
    }

    /// Screen currently shown in the preview.
    pub fn current_screen(&self) -> Option<ScreenId> {
        self.screen
    }

    pub fn items(&self) -> &[PreviewItem] {
        &self.items
    }

    pub fn recorder(&self) -> &InteractionRecorder {
        &self.recorder
    }

    pub fn sessions(&self) -> &SessionTracker {
        &self.sessions
    }

    /// New recorder settings; the preview, its session and history stay.
    pub fn set_recorder_config(&mut self, config: RecorderConfig) {
        self.recorder.set_config(config);
    }

    /// Open the preview on `start` in `Preview` mode.
    pub fn open(&mut self, graph: &ScreenGraph, start: ScreenId, now: u64) -> bool {
        if !graph.contains(start) {
            return false;
        }
        self.open = true;
        self.sessions.set_mode(PreviewMode::Preview, now);
        self.show_screen(graph, start)
    }

    /// Close the preview, finalizing the active session.
    pub fn close(&mut self, now: u64) -> Option<u64> {
        if !self.open {
            return None;
        }
        self.open = false;
        self.screen = None;
        self.items.clear();
        self.sessions.finalize(now)
    }

    /// Switch sub-mode. Returns the id of a session this finalized.
    pub fn set_mode(&mut self, mode: PreviewMode, now: u64) -> Option<u64> {
        self.sessions.set_mode(mode, now)
    }

    /// Show a screen, rebuilding its preview items.
    pub fn show_screen(&mut self, graph: &ScreenGraph, id: ScreenId) -> bool {
        let Some(screen) = graph.screen(id) else {
            return false;
        };
        self.items = screen
            .elements
            .iter()
            .filter(|el| el.target_screen.is_some())
            .map(|el| PreviewItem {
                element_id: el.id,
                source_screen_id: id,
                target_screen_id: el.target_screen,
                label: el.label(),
                geometry: el.geometry,
                hotspot_id: el.hotspot_id,
            })
            .collect();
        if self.screen != Some(id) {
            self.sessions.clear_hover();
        }
        self.screen = Some(id);
        true
    }

    /// Index of the topmost item under (x, y).
    fn item_at(&self, x: f32, y: f32) -> Option<usize> {
        self.items.iter().rposition(|item| item.geometry.contains(x, y))
    }

    fn attribute(&mut self, graph: &ScreenGraph, x: f32, y: f32) -> Option<HotspotInfo> {
        let idx = self.item_at(x, y)?;
        resolve_hotspot_info(graph, &mut self.items[idx])
    }

    fn recording(&self) -> Option<ScreenId> {
        if self.open && self.sessions.mode() == PreviewMode::Preview {
            self.screen
        } else {
            None
        }
    }

    /// Pointer moved over the preview (screen-local logical coordinates).
    /// Returns true if a sample was recorded.
    pub fn pointer_move(&mut self, graph: &ScreenGraph, x: f32, y: f32, timestamp: u64) -> bool {
        let Some(screen) = self.recording() else {
            return false;
        };
        let hotspot = self.attribute(graph, x, y).map(|h| h.hotspot_id);
        match self.recorder.record_move(screen, x, y, timestamp, hotspot) {
            Some(sample) => self.sessions.on_move(screen, &sample),
            None => false,
        }
    }

    /// Click in the preview. Records it and, on a hotspot whose target still
    /// exists, navigates there. Returns the screen navigated to.
    pub fn click(&mut self, graph: &ScreenGraph, x: f32, y: f32, timestamp: u64) -> Option<ScreenId> {
        let screen = self.recording()?;
        let info = self.attribute(graph, x, y);
        let sample = self
            .recorder
            .record_click(screen, x, y, timestamp, info.map(|h| h.hotspot_id));
        self.sessions.on_click(screen, &sample);

        let target = info?.target_screen_id;
        if self.show_screen(graph, target) {
            log::debug!("preview navigated {screen} -> {target}");
            Some(target)
        } else {
            None
        }
    }

    /// Drop everything recorded for a deleted screen.
    pub fn forget_screen(&mut self, graph: &ScreenGraph, id: ScreenId) {
        self.recorder.clear_screen(id);
        self.sessions.forget_screen(id);
        if self.screen == Some(id) {
            self.screen = graph.screen_ids().first().copied();
            match self.screen {
                Some(next) => {
                    self.show_screen(graph, next);
                }
                None => self.items.clear(),
            }
        }
    }

    // ─── Analysis views ──────────────────────────────────────────────────

    pub fn summaries_for_screen(&self, screen: ScreenId) -> Vec<SessionSummary> {
        self.sessions.summaries_for_screen(screen)
    }

    pub fn hotspot_rollups(&self, graph: &ScreenGraph, screen: ScreenId) -> Vec<HotspotRollup> {
        hotspot_rollups(&self.summaries_for_screen(screen), graph.hotspots())
    }

    pub fn screen_totals(&self, screen: ScreenId) -> ScreenTotals {
        screen_totals(&self.summaries_for_screen(screen))
    }

    /// Move samples for the heatmap of `screen`.
    pub fn heatmap_points(&self, screen: ScreenId) -> Vec<(f32, f32)> {
        self.recorder.move_points(screen)
    }
}
