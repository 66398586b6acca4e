//! Session aggregator.
//!
//! A session is one continuous span of preview usage:
//!
//! ```text
//! no session ──first recorded sample (mode = Preview)──▶ active
//! active ──preview closed / Preview → Analysis──▶ finalized
//! ```
//!
//! While active, every recorded sample is folded into a per-screen
//! accumulator. Finalizing turns each non-empty accumulator into a
//! `SessionSummary` appended to that screen's history; screens that saw no
//! activity get no row.

use crate::recorder::InteractionSample;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use wf_core::id::{HotspotId, ScreenId};

/// Preview sub-mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreviewMode {
    /// Simulated usage; interactions are recorded.
    #[default]
    Preview,
    /// Read-only inspection of what was recorded.
    Analysis,
}

/// Per-screen accumulator for the active session.
#[derive(Debug, Clone, Default)]
struct ScreenStats {
    moves: u32,
    clicks: u32,
    hotspot_clicks: u32,
    /// Hover *entries*: counted on transitions into a hotspot only.
    hotspot_hovers: u32,
    unique_hotspots: BTreeSet<HotspotId>,
    hover_by_hotspot: BTreeMap<HotspotId, u32>,
    click_by_hotspot: BTreeMap<HotspotId, u32>,
    /// Hotspot under the last recorded move on this screen, during the
    /// current visit.
    last_hover: Option<HotspotId>,
}

impl ScreenStats {
    fn is_empty(&self) -> bool {
        self.moves == 0 && self.clicks == 0
    }

    fn record_move(&mut self, hotspot: Option<HotspotId>) {
        self.moves += 1;
        if let Some(h) = hotspot
            && self.last_hover != Some(h)
        {
            self.hotspot_hovers += 1;
            *self.hover_by_hotspot.entry(h).or_default() += 1;
            self.unique_hotspots.insert(h);
        }
        self.last_hover = hotspot;
    }

    fn record_click(&mut self, hotspot: Option<HotspotId>) {
        self.clicks += 1;
        if let Some(h) = hotspot {
            self.hotspot_clicks += 1;
            *self.click_by_hotspot.entry(h).or_default() += 1;
            self.unique_hotspots.insert(h);
        }
    }
}

#[derive(Debug, Clone)]
struct ActiveSession {
    id: u64,
    start_time: u64,
    last_activity: u64,
    per_screen: HashMap<ScreenId, ScreenStats>,
}

impl ActiveSession {
    fn summary(&self, screen_id: ScreenId, end_time: u64, in_progress: bool) -> Option<SessionSummary> {
        let stats = self.per_screen.get(&screen_id).filter(|s| !s.is_empty())?;
        Some(SessionSummary {
            session_id: self.id,
            screen_id,
            start_time: self.start_time,
            end_time,
            duration_ms: self.last_activity.saturating_sub(self.start_time),
            moves: stats.moves,
            clicks: stats.clicks,
            hotspot_clicks: stats.hotspot_clicks,
            hotspot_hovers: stats.hotspot_hovers,
            unique_hotspots: stats.unique_hotspots.len(),
            hover_by_hotspot: stats.hover_by_hotspot.clone(),
            click_by_hotspot: stats.click_by_hotspot.clone(),
            in_progress,
        })
    }
}

/// One session's activity on one screen.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub session_id: u64,
    pub screen_id: ScreenId,
    pub start_time: u64,
    pub end_time: u64,
    /// Last activity minus start, across the whole session.
    pub duration_ms: u64,
    pub moves: u32,
    pub clicks: u32,
    pub hotspot_clicks: u32,
    pub hotspot_hovers: u32,
    pub unique_hotspots: usize,
    pub hover_by_hotspot: BTreeMap<HotspotId, u32>,
    pub click_by_hotspot: BTreeMap<HotspotId, u32>,
    /// True for the synthesized row of the still-running session.
    pub in_progress: bool,
}

#[derive(Debug, Clone)]
pub struct SessionTracker {
    mode: PreviewMode,
    active: Option<ActiveSession>,
    next_session_id: u64,
    history: HashMap<ScreenId, Vec<SessionSummary>>,
}

impl Default for SessionTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionTracker {
    pub fn new() -> Self {
        Self {
            mode: PreviewMode::Preview,
            active: None,
            next_session_id: 1,
            history: HashMap::new(),
        }
    }

    pub fn mode(&self) -> PreviewMode {
        self.mode
    }

    /// Switch sub-mode. Leaving `Preview` for `Analysis` finalizes the
    /// active session; its id is returned.
    pub fn set_mode(&mut self, mode: PreviewMode, now: u64) -> Option<u64> {
        let previous = std::mem::replace(&mut self.mode, mode);
        if previous == PreviewMode::Preview && mode == PreviewMode::Analysis {
            return self.finalize(now);
        }
        None
    }

    pub fn active_session_id(&self) -> Option<u64> {
        self.active.as_ref().map(|s| s.id)
    }

    /// Fold a recorded move into the active session, starting one if
    /// needed. Ignored outside `Preview` mode.
    pub fn on_move(&mut self, screen: ScreenId, sample: &InteractionSample) -> bool {
        let Some(session) = self.session_for(sample.timestamp) else {
            return false;
        };
        session.per_screen.entry(screen).or_default().record_move(sample.hotspot_id);
        true
    }

    /// Fold a recorded click into the active session, starting one if
    /// needed. Ignored outside `Preview` mode.
    pub fn on_click(&mut self, screen: ScreenId, sample: &InteractionSample) -> bool {
        let Some(session) = self.session_for(sample.timestamp) else {
            return false;
        };
        session.per_screen.entry(screen).or_default().record_click(sample.hotspot_id);
        true
    }

    /// The pointer left whatever it hovered: the preview moved to another
    /// screen. The next move onto a hotspot counts as a fresh entry.
    pub fn clear_hover(&mut self) {
        if let Some(active) = self.active.as_mut() {
            for stats in active.per_screen.values_mut() {
                stats.last_hover = None;
            }
        }
    }

    fn session_for(&mut self, timestamp: u64) -> Option<&mut ActiveSession> {
        if self.mode != PreviewMode::Preview {
            return None;
        }
        let next_id = &mut self.next_session_id;
        let session = self.active.get_or_insert_with(|| {
            let id = *next_id;
            *next_id += 1;
            log::debug!("session {id} started");
            ActiveSession {
                id,
                start_time: timestamp,
                last_activity: timestamp,
                per_screen: HashMap::new(),
            }
        });
        session.last_activity = session.last_activity.max(timestamp);
        Some(session)
    }

    /// Close the active session, writing one summary per touched screen.
    /// Returns the finalized session id, or `None` if nothing was active.
    pub fn finalize(&mut self, now: u64) -> Option<u64> {
        let session = self.active.take()?;
        let end_time = now.max(session.last_activity);
        let mut screens: Vec<ScreenId> = session.per_screen.keys().copied().collect();
        screens.sort();
        let mut rows = 0usize;
        for screen in screens {
            if let Some(summary) = session.summary(screen, end_time, false) {
                self.history.entry(screen).or_default().push(summary);
                rows += 1;
            }
        }
        log::debug!("session {} finalized ({rows} screen rows)", session.id);
        Some(session.id)
    }

    /// Finalized rows for a screen, oldest first.
    pub fn history(&self, screen: ScreenId) -> &[SessionSummary] {
        self.history.get(&screen).map_or(&[], Vec::as_slice)
    }

    /// Finalized rows plus, if the active session touched this screen, an
    /// `in_progress` row for it.
    pub fn summaries_for_screen(&self, screen: ScreenId) -> Vec<SessionSummary> {
        let mut rows = self.history(screen).to_vec();
        if let Some(active) = &self.active
            && let Some(live) = active.summary(screen, active.last_activity, true)
        {
            rows.push(live);
        }
        rows
    }

    /// Drop all recorded history for a screen that no longer exists.
    pub fn forget_screen(&mut self, screen: ScreenId) {
        self.history.remove(&screen);
        if let Some(active) = self.active.as_mut() {
            active.per_screen.remove(&screen);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample(t: u64, hotspot: Option<&str>) -> InteractionSample {
        InteractionSample {
            x: 0.0,
            y: 0.0,
            timestamp: t,
            hotspot_id: hotspot.map(HotspotId::intern),
        }
    }

    fn screen() -> ScreenId {
        ScreenId::intern("sess-screen")
    }

    #[test]
    fn session_starts_lazily() {
        let mut tracker = SessionTracker::new();
        assert_eq!(tracker.active_session_id(), None);
        assert_eq!(tracker.finalize(10), None);
        tracker.on_move(screen(), &sample(5, None));
        assert_eq!(tracker.active_session_id(), Some(1));
    }

    #[test]
    fn hover_entries_count_transitions_only() {
        let mut tracker = SessionTracker::new();
        let s = screen();
        for (t, h) in [
            (0, Some("hotspot-1")),
            (50, Some("hotspot-1")),
            (100, None),
            (150, Some("hotspot-1")),
            (200, Some("hotspot-1")),
            (250, None),
            (300, Some("hotspot-1")),
        ] {
            tracker.on_move(s, &sample(t, h));
        }
        tracker.on_click(s, &sample(350, Some("hotspot-1")));
        tracker.on_click(s, &sample(400, Some("hotspot-1")));
        tracker.set_mode(PreviewMode::Analysis, 1000);

        let rows = tracker.history(s);
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.hotspot_hovers, 3);
        assert_eq!(row.hotspot_clicks, 2);
        assert_eq!(row.clicks, 2);
        assert_eq!(row.moves, 7);
        assert_eq!(row.unique_hotspots, 1);
        assert_eq!(row.duration_ms, 400);
        assert_eq!(row.end_time, 1000);
        assert!(!row.in_progress);
    }

    #[test]
    fn hover_restarts_after_leaving_the_screen() {
        let mut tracker = SessionTracker::new();
        let s = screen();
        tracker.on_move(s, &sample(0, Some("hotspot-1")));
        tracker.clear_hover();
        tracker.on_move(s, &sample(100, Some("hotspot-1")));
        // Still there: no new entry.
        tracker.on_move(s, &sample(150, Some("hotspot-1")));

        let rows = tracker.summaries_for_screen(s);
        assert_eq!(rows[0].hotspot_hovers, 2);
        assert_eq!(rows[0].hover_by_hotspot[&HotspotId::intern("hotspot-1")], 2);
        assert_eq!(rows[0].unique_hotspots, 1);
    }

    #[test]
    fn untouched_screens_get_no_row() {
        let mut tracker = SessionTracker::new();
        let other = ScreenId::intern("sess-untouched");
        tracker.on_click(screen(), &sample(0, None));
        tracker.finalize(10);
        assert_eq!(tracker.history(screen()).len(), 1);
        assert!(tracker.history(other).is_empty());
    }

    #[test]
    fn analysis_mode_records_nothing() {
        let mut tracker = SessionTracker::new();
        tracker.set_mode(PreviewMode::Analysis, 0);
        assert!(!tracker.on_click(screen(), &sample(1, None)));
        assert_eq!(tracker.active_session_id(), None);
    }

    #[test]
    fn live_row_is_flagged_in_progress() {
        let mut tracker = SessionTracker::new();
        tracker.on_click(screen(), &sample(0, None));
        tracker.finalize(5);
        tracker.on_move(screen(), &sample(10, None));
        tracker.on_move(screen(), &sample(70, None));

        let rows = tracker.summaries_for_screen(screen());
        assert_eq!(rows.len(), 2);
        assert!(!rows[0].in_progress);
        assert!(rows[1].in_progress);
        assert_eq!(rows[1].session_id, 2);
        assert_eq!(rows[1].duration_ms, 60);
        // The live row is synthesized, not stored.
        assert_eq!(tracker.history(screen()).len(), 1);
    }

    #[test]
    fn switching_back_to_preview_does_not_finalize() {
        let mut tracker = SessionTracker::new();
        tracker.set_mode(PreviewMode::Analysis, 0);
        assert_eq!(tracker.set_mode(PreviewMode::Preview, 1), None);
        tracker.on_move(screen(), &sample(2, None));
        assert_eq!(tracker.set_mode(PreviewMode::Analysis, 3), Some(1));
    }

    #[test]
    fn summary_serializes_camel_case() {
        let mut tracker = SessionTracker::new();
        tracker.on_click(screen(), &sample(0, Some("hotspot-7")));
        let rows = tracker.summaries_for_screen(screen());
        let json = serde_json::to_value(&rows[0]).unwrap();
        assert_eq!(json["hotspotClicks"], 1);
        assert_eq!(json["inProgress"], true);
        assert_eq!(json["clickByHotspot"]["hotspot-7"], 1);
    }
}
