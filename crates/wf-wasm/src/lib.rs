//! WASM bridge for Wireframe Flow: exposes the editor, preview and
//! analytics engine to the JavaScript view layer.
//!
//! Compiled via `wasm-pack build --target web`. The view layer owns the DOM;
//! everything it needs comes back from here as JSON strings or RGBA bytes.
//!
//! Expensive refreshes (canvas rescale, heatmap, analytics panel) are queued
//! on a `FrameScheduler` and run when the host calls `tick()` from its
//! animation-frame callback.

use serde::Serialize;
use wasm_bindgen::prelude::*;
use wf_analytics::{PreviewController, PreviewMode, RecorderConfig};
use wf_core::geometry::display_scale;
use wf_core::id::{ElementId, ScreenId};
use wf_core::model::{Element, SizePreset};
use wf_editor::{CanvasTransform, EditorEngine, FrameScheduler, InputEvent};
use wf_render::{HeatmapConfig, HeatmapImage, HeatmapRenderer};

/// Deferred refreshes, at most one pending each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Deferred {
    Rescale,
    Heatmap,
    AnalyticsPanel,
}

/// Everything the deferred jobs read and write.
struct CanvasState {
    editor: EditorEngine,
    preview: PreviewController,
    heatmap: HeatmapRenderer,
    heatmap_image: Option<HeatmapImage>,
    analytics_json: String,
    /// Space the host gives the editor canvas, display px.
    available: (f32, f32),
    /// Canvas top-left in display px.
    origin: (f32, f32),
    preview_transform: CanvasTransform,
}

impl CanvasState {
    fn rescale(&mut self) {
        let Some(screen) = self.editor.active_screen() else {
            return;
        };
        let scale = display_scale(screen.canvas_size(), self.available.0, self.available.1);
        self.editor
            .set_transform(CanvasTransform::new(self.origin.0, self.origin.1, scale));
    }

    /// Screen the analysis views describe: the preview's, else the editor's.
    fn analysis_screen(&self) -> ScreenId {
        self.preview
            .current_screen()
            .unwrap_or_else(|| self.editor.active_screen_id())
    }

    fn render_heatmap(&mut self) {
        let id = self.analysis_screen();
        let Some(screen) = self.editor.graph.screen(id) else {
            self.heatmap_image = None;
            return;
        };
        let points = self.preview.heatmap_points(id);
        self.heatmap_image = Some(self.heatmap.render(screen.width, screen.height, points));
    }

    fn refresh_analytics(&mut self) {
        let id = self.analysis_screen();
        let (buffered_moves, buffered_clicks) = self.preview.recorder().counts(id);
        let panel = serde_json::json!({
            "screenId": id,
            "bufferedMoves": buffered_moves,
            "bufferedClicks": buffered_clicks,
            "totals": self.preview.screen_totals(id),
            "sessions": self.preview.summaries_for_screen(id),
            "hotspots": self.preview.hotspot_rollups(&self.editor.graph, id),
        });
        self.analytics_json = panel.to_string();
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ScreenEntry<'a> {
    id: ScreenId,
    name: &'a str,
    width: u32,
    height: u32,
    preset: &'static str,
    size_label: String,
    active: bool,
}

/// The main WASM-facing controller.
#[wasm_bindgen]
pub struct WireframeCanvas {
    state: CanvasState,
    scheduler: FrameScheduler<Deferred, CanvasState>,
}

#[wasm_bindgen]
impl WireframeCanvas {
    /// Create a controller for an editor area of the given size.
    #[wasm_bindgen(constructor)]
    pub fn new(available_width: f32, available_height: f32) -> Self {
        console_error_panic_hook_setup();
        let mut canvas = Self {
            state: CanvasState {
                editor: EditorEngine::new(),
                preview: PreviewController::new(RecorderConfig::default()),
                heatmap: HeatmapRenderer::new(HeatmapConfig::default()),
                heatmap_image: None,
                analytics_json: "{}".to_string(),
                available: (available_width, available_height),
                origin: (0.0, 0.0),
                preview_transform: CanvasTransform::default(),
            },
            scheduler: FrameScheduler::new(),
        };
        canvas.state.rescale();
        canvas
    }

    /// Replace recorder and heatmap settings from JSON. Missing keys keep
    /// their defaults. Returns false on malformed JSON.
    ///
    /// Recorded samples, sessions and an open preview are kept; buffers
    /// shrink to the new caps.
    pub fn configure(&mut self, recorder_json: &str, heatmap_json: &str) -> bool {
        let recorder: Result<RecorderConfig, _> = serde_json::from_str(recorder_json);
        let heatmap: Result<HeatmapConfig, _> = serde_json::from_str(heatmap_json);
        match (recorder, heatmap) {
            (Ok(recorder), Ok(heatmap)) => {
                self.state.preview.set_recorder_config(recorder);
                self.state.heatmap = HeatmapRenderer::new(heatmap);
                self.queue_analysis();
                true
            }
            (Err(e), _) | (_, Err(e)) => {
                log::debug!("configure rejected: {e}");
                false
            }
        }
    }

    /// Run queued refreshes. Call once per animation frame.
    pub fn tick(&mut self) -> u32 {
        self.scheduler.run_pending(&mut self.state) as u32
    }

    // ─── Layout ──────────────────────────────────────────────────────────

    /// The editor area changed size. The rescale is cancelled and re-queued.
    pub fn set_available_size(&mut self, width: f32, height: f32) {
        self.state.available = (width, height);
        self.scheduler.reschedule(Deferred::Rescale, CanvasState::rescale);
    }

    /// Where the canvas's top-left sits in display px.
    pub fn set_canvas_origin(&mut self, left: f32, top: f32) {
        self.state.origin = (left, top);
        self.scheduler.reschedule(Deferred::Rescale, CanvasState::rescale);
    }

    pub fn display_scale(&self) -> f32 {
        self.state.editor.transform().scale
    }

    // ─── Editor input ────────────────────────────────────────────────────

    pub fn handle_pointer_down(&mut self, x: f32, y: f32) -> bool {
        self.state.editor.handle_input(&InputEvent::from_pointer_down(x, y))
    }

    pub fn handle_pointer_move(&mut self, x: f32, y: f32) -> bool {
        self.state.editor.handle_input(&InputEvent::from_pointer_move(x, y))
    }

    pub fn handle_pointer_up(&mut self, x: f32, y: f32) -> bool {
        self.state.editor.handle_input(&InputEvent::from_pointer_up(x, y))
    }

    /// A palette item was dropped. `kind` is a component token such as
    /// `radio-group`; unknown tokens are ignored.
    pub fn handle_drop(&mut self, x: f32, y: f32, kind: &str) -> bool {
        match InputEvent::from_drop(x, y, kind) {
            Some(event) => self.state.editor.handle_input(&event),
            None => false,
        }
    }

    // ─── Screens ─────────────────────────────────────────────────────────

    /// `[{id, name, width, height, preset, sizeLabel, active}]`
    pub fn screens_json(&self) -> String {
        let active = self.state.editor.active_screen_id();
        let entries: Vec<ScreenEntry<'_>> = self
            .state
            .editor
            .graph
            .screens()
            .map(|s| ScreenEntry {
                id: s.id,
                name: &s.name,
                width: s.width,
                height: s.height,
                preset: s.preset.key(),
                size_label: s.size_label(),
                active: s.id == active,
            })
            .collect();
        to_json(&entries)
    }

    /// Elements of the active screen, in paint order.
    pub fn active_screen_json(&self) -> String {
        match self.state.editor.active_screen() {
            Some(screen) => to_json(&screen.elements),
            None => "[]".to_string(),
        }
    }

    pub fn active_screen_id(&self) -> String {
        self.state.editor.active_screen_id().to_string()
    }

    pub fn suggested_screen_name(&self) -> String {
        self.state.editor.graph.suggested_screen_name()
    }

    pub fn create_screen(&mut self, name: &str) -> String {
        let id = self.state.editor.create_screen(name);
        self.scheduler.reschedule(Deferred::Rescale, CanvasState::rescale);
        self.queue_analysis();
        id.to_string()
    }

    /// Returns the new screen id, or `""` if the source doesn't exist.
    pub fn duplicate_screen(&mut self, id: &str, name: &str) -> String {
        let name = Some(name).filter(|n| !n.trim().is_empty());
        match self.state.editor.duplicate_screen(ScreenId::intern(id), name) {
            Some(copy) => {
                self.scheduler.reschedule(Deferred::Rescale, CanvasState::rescale);
                self.queue_analysis();
                copy.to_string()
            }
            None => String::new(),
        }
    }

    /// `{"ok":true,"active":"<id>"}` or `{"ok":false,"error":"..."}`.
    pub fn delete_screen(&mut self, id: &str) -> String {
        let id = ScreenId::intern(id);
        match self.state.editor.delete_screen(id) {
            Ok(active) => {
                self.state.preview.forget_screen(&self.state.editor.graph, id);
                self.scheduler.reschedule(Deferred::Rescale, CanvasState::rescale);
                self.queue_analysis();
                serde_json::json!({ "ok": true, "active": active }).to_string()
            }
            Err(e) => serde_json::json!({ "ok": false, "error": e.to_string() }).to_string(),
        }
    }

    pub fn rename_screen(&mut self, id: &str, name: &str) -> bool {
        let renamed = self.state.editor.rename_screen(ScreenId::intern(id), name);
        self.analysis_changed(renamed)
    }

    pub fn set_active_screen(&mut self, id: &str) -> bool {
        let changed = self.state.editor.set_active_screen(ScreenId::intern(id));
        if changed {
            self.scheduler.reschedule(Deferred::Rescale, CanvasState::rescale);
        }
        self.analysis_changed(changed)
    }

    /// Resize the active screen. `preset` is a picker key (`"375x667"`,
    /// `"custom"`) or empty to infer it.
    pub fn set_canvas_size(&mut self, width: u32, height: u32, preset: &str) -> bool {
        let preset = SizePreset::from_key(preset);
        match self.state.editor.set_canvas_size(width, height, preset) {
            Ok(()) => {
                self.scheduler.reschedule(Deferred::Rescale, CanvasState::rescale);
                self.queue_analysis();
                true
            }
            Err(e) => {
                log::debug!("canvas size rejected: {e}");
                false
            }
        }
    }

    /// Ids of screens reachable from `id` through links.
    pub fn reachable_screens_json(&self, id: &str) -> String {
        to_json(&self.state.editor.graph.reachable_from(ScreenId::intern(id)))
    }

    // ─── Selection & properties ──────────────────────────────────────────

    pub fn selected_id(&self) -> String {
        self.state
            .editor
            .selected()
            .map(|id| id.to_string())
            .unwrap_or_default()
    }

    pub fn select_by_id(&mut self, id: &str) -> bool {
        let id = Some(id).filter(|s| !s.is_empty()).map(ElementId::intern);
        self.state.editor.select(id)
    }

    /// The selected element as JSON, or `{}`.
    pub fn selected_element_json(&self) -> String {
        self.state
            .editor
            .selected_element()
            .map(to_json::<Element>)
            .unwrap_or_else(|| "{}".to_string())
    }

    pub fn selection_caption(&self) -> String {
        self.state.editor.selection_caption().unwrap_or_default()
    }

    /// Set a content field on the selection. Returns false when the field is
    /// unknown, the value is invalid, or nothing changed.
    pub fn set_field(&mut self, field: &str, value: &str) -> bool {
        match self.state.editor.set_selected_field(field, value) {
            Ok(changed) => self.analysis_changed(changed),
            Err(e) => {
                log::debug!("field edit rejected: {e}");
                false
            }
        }
    }

    /// Link the selection to a screen; an empty id clears the link.
    pub fn set_link(&mut self, target: &str) -> bool {
        let target = Some(target).filter(|s| !s.is_empty()).map(ScreenId::intern);
        let linked = self.state.editor.set_selected_link(target);
        self.analysis_changed(linked)
    }

    pub fn delete_selected(&mut self) -> bool {
        let deleted = self.state.editor.delete_selected();
        self.analysis_changed(deleted)
    }

    pub fn copy_selected(&mut self) -> bool {
        self.state.editor.copy_selected()
    }

    /// Returns the pasted element id, or `""`.
    pub fn paste(&mut self) -> String {
        let pasted = self.state.editor.paste();
        self.analysis_changed(pasted.is_some());
        pasted.map(|id| id.to_string()).unwrap_or_default()
    }

    pub fn duplicate_selected(&mut self) -> String {
        let copy = self.state.editor.duplicate_selected();
        self.analysis_changed(copy.is_some());
        copy.map(|id| id.to_string()).unwrap_or_default()
    }

    // ─── Preview ─────────────────────────────────────────────────────────

    /// Open the preview on the active screen.
    pub fn open_preview(&mut self, now: f64) -> bool {
        let start = self.state.editor.active_screen_id();
        let opened = self
            .state
            .preview
            .open(&self.state.editor.graph, start, timestamp(now));
        self.queue_analysis();
        opened
    }

    /// Close the preview, finalizing the session.
    pub fn close_preview(&mut self, now: f64) {
        self.state.preview.close(timestamp(now));
        self.queue_analysis();
    }

    /// `"preview"` or `"analysis"`.
    pub fn set_preview_mode(&mut self, mode: &str, now: f64) -> bool {
        let mode = match mode {
            "preview" => PreviewMode::Preview,
            "analysis" => PreviewMode::Analysis,
            _ => return false,
        };
        self.state.preview.set_mode(mode, timestamp(now));
        self.queue_analysis();
        true
    }

    pub fn set_preview_transform(&mut self, left: f32, top: f32, scale: f32) {
        self.state.preview_transform = CanvasTransform::new(left, top, scale);
    }

    pub fn preview_screen_id(&self) -> String {
        self.state
            .preview
            .current_screen()
            .map(|id| id.to_string())
            .unwrap_or_default()
    }

    /// Pointer moved over the preview (display px). True if recorded.
    pub fn preview_move(&mut self, x: f32, y: f32, now: f64) -> bool {
        let (lx, ly) = self.state.preview_transform.to_logical(x, y);
        let recorded =
            self.state
                .preview
                .pointer_move(&self.state.editor.graph, lx, ly, timestamp(now));
        if recorded {
            self.queue_analysis();
        }
        recorded
    }

    /// Click in the preview (display px). Returns the screen navigated to,
    /// or `""`.
    pub fn preview_click(&mut self, x: f32, y: f32, now: f64) -> String {
        let (lx, ly) = self.state.preview_transform.to_logical(x, y);
        let target = self
            .state
            .preview
            .click(&self.state.editor.graph, lx, ly, timestamp(now));
        self.queue_analysis();
        target.map(|id| id.to_string()).unwrap_or_default()
    }

    // ─── Analysis output ─────────────────────────────────────────────────

    /// Analytics panel JSON as of the last `tick()`.
    pub fn analytics_json(&self) -> String {
        self.state.analytics_json.clone()
    }

    pub fn heatmap_width(&self) -> u32 {
        self.state.heatmap_image.as_ref().map_or(0, |img| img.width)
    }

    pub fn heatmap_height(&self) -> u32 {
        self.state.heatmap_image.as_ref().map_or(0, |img| img.height)
    }

    /// RGBA8 heatmap overlay as of the last `tick()`, row-major.
    pub fn heatmap_rgba(&self) -> Vec<u8> {
        self.state
            .heatmap_image
            .as_ref()
            .map(|img| img.rgba.clone())
            .unwrap_or_default()
    }
}

impl WireframeCanvas {
    fn queue_analysis(&mut self) {
        self.scheduler
            .schedule_coalesced(Deferred::Heatmap, CanvasState::render_heatmap);
        self.scheduler
            .schedule_coalesced(Deferred::AnalyticsPanel, CanvasState::refresh_analytics);
    }

    /// Queue the analysis views after an edit that may move the analysed
    /// screen or touch hotspot metadata. Passes `changed` through.
    fn analysis_changed(&mut self, changed: bool) -> bool {
        if changed {
            self.queue_analysis();
        }
        changed
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| {
        log::debug!("serialization failed: {e}");
        "null".to_string()
    })
}

/// Host clocks report fractional milliseconds.
fn timestamp(now: f64) -> u64 {
    if now.is_finite() && now > 0.0 {
        now as u64
    } else {
        0
    }
}

// ─── Panic hook for WASM debugging ───────────────────────────────────────

fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("Wireframe WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn rescale_runs_on_tick() {
        let mut canvas = WireframeCanvas::new(2560.0, 1440.0);
        assert_eq!(canvas.display_scale(), 1.0);
        canvas.set_available_size(640.0, 720.0);
        canvas.set_available_size(640.0, 360.0);
        assert_eq!(canvas.tick(), 1);
        assert_eq!(canvas.display_scale(), 0.5);
    }

    #[test]
    fn deleting_last_screen_reports_error() {
        let mut canvas = WireframeCanvas::new(1280.0, 720.0);
        let id = canvas.active_screen_id();
        let out: serde_json::Value = serde_json::from_str(&canvas.delete_screen(&id)).unwrap();
        assert_eq!(out["ok"], false);
    }

    #[test]
    fn preview_session_feeds_panel_and_heatmap() {
        let mut canvas = WireframeCanvas::new(1280.0, 720.0);
        let home = canvas.active_screen_id();
        let next = canvas.create_screen("Next");
        canvas.set_active_screen(&home);
        assert!(canvas.handle_drop(100.0, 100.0, "button"));
        assert!(canvas.set_link(&next));

        assert!(canvas.open_preview(0.0));
        assert!(canvas.preview_move(50.0, 90.0, 10.0));
        assert_eq!(canvas.preview_click(50.0, 90.0, 20.0), next);
        assert!(canvas.set_preview_mode("analysis", 30.0));
        // Analysis follows the preview, which is now on `next`.
        canvas.tick();
        let panel: serde_json::Value = serde_json::from_str(&canvas.analytics_json()).unwrap();
        assert_eq!(panel["screenId"], next.as_str());
        assert_eq!(canvas.heatmap_width(), 1280);
        assert_eq!(canvas.heatmap_rgba().len(), 1280 * 720 * 4);
    }

    fn panel(canvas: &WireframeCanvas) -> serde_json::Value {
        serde_json::from_str(&canvas.analytics_json()).unwrap()
    }

    #[test]
    fn screen_edits_after_preview_refresh_the_panel() {
        let mut canvas = WireframeCanvas::new(1280.0, 720.0);
        let home = canvas.active_screen_id();
        assert!(canvas.open_preview(0.0));
        canvas.preview_click(300.0, 300.0, 10.0);
        canvas.close_preview(20.0);
        canvas.tick();
        assert_eq!(panel(&canvas)["screenId"], home.as_str());

        let other = canvas.create_screen("Other");
        canvas.tick();
        canvas.tick();
        canvas.tick();
        assert_eq!(panel(&canvas)["screenId"], other.as_str());

        assert!(canvas.set_active_screen(&home));
        canvas.tick();
        assert_eq!(panel(&canvas)["screenId"], home.as_str());
        assert_eq!(panel(&canvas)["totals"]["clicks"], 1);

        assert!(canvas.set_canvas_size(640, 480, ""));
        canvas.tick();
        assert_eq!(canvas.heatmap_width(), 640);
    }

    #[test]
    fn relabelling_a_hotspot_renames_its_rollup() {
        let mut canvas = WireframeCanvas::new(1280.0, 720.0);
        let home = canvas.active_screen_id();
        let next = canvas.create_screen("Next");
        canvas.set_active_screen(&home);
        canvas.handle_drop(100.0, 100.0, "button");
        canvas.set_link(&next);
        canvas.open_preview(0.0);
        canvas.preview_move(50.0, 90.0, 10.0);
        canvas.close_preview(20.0);
        canvas.tick();
        assert_eq!(panel(&canvas)["hotspots"][0]["name"], "Button");
        let hotspot = panel(&canvas)["hotspots"][0]["hotspotId"].clone();

        assert!(canvas.set_field("label", "Buy"));
        canvas.tick();
        assert_eq!(panel(&canvas)["hotspots"][0]["name"], "Buy");

        // A released hotspot keeps its history under its id.
        assert!(canvas.delete_selected());
        canvas.tick();
        let p = panel(&canvas);
        assert_eq!(p["hotspots"][0]["name"], hotspot);
        assert_eq!(p["hotspots"][0]["targetScreenId"], serde_json::Value::Null);
    }

    #[test]
    fn configure_keeps_the_open_preview_and_its_session() {
        let mut canvas = WireframeCanvas::new(1280.0, 720.0);
        assert!(canvas.open_preview(0.0));
        for i in 0..4 {
            assert!(canvas.preview_move(100.0 + i as f32 * 50.0, 300.0, i as f64 * 100.0));
        }
        assert!(canvas.configure(r#"{"max_moves": 2}"#, "{}"));
        assert!(!canvas.configure("{", "{}"));

        assert!(!canvas.preview_screen_id().is_empty());
        assert!(canvas.preview_move(500.0, 300.0, 1000.0));
        canvas.tick();
        let p = panel(&canvas);
        assert_eq!(p["bufferedMoves"], 2);
        assert_eq!(p["totals"]["moves"], 5);
        assert_eq!(p["sessions"].as_array().unwrap().len(), 1);
    }
}
