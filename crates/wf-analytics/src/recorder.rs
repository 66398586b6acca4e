//! Interaction recorder: bounded per-screen buffers of preview samples.
//!
//! Moves are down-sampled before they are stored. A move is kept when the
//! hovered hotspot changed since the last kept move on that screen, or when
//! both enough time has passed *and* the pointer travelled far enough.
//! Hotspot transitions therefore always survive, however fast the pointer.
//!
//! Buffers are FIFO rings: once full, the oldest sample is evicted.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use wf_core::id::{HotspotId, ScreenId};

/// One recorded pointer position, in screen-local logical coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionSample {
    pub x: f32,
    pub y: f32,
    /// Host clock, milliseconds.
    pub timestamp: u64,
    pub hotspot_id: Option<HotspotId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecorderConfig {
    /// Moves kept per screen.
    pub max_moves: usize,
    /// Clicks kept per screen.
    pub max_clicks: usize,
    /// Minimum time between two kept moves on the same hotspot.
    pub min_move_interval_ms: u64,
    /// Minimum distance (logical px) between two kept moves on the same hotspot.
    pub min_move_distance: f32,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            max_moves: 1200,
            max_clicks: 400,
            min_move_interval_ms: 40,
            min_move_distance: 12.0,
        }
    }
}

/// Recorded samples for one screen.
#[derive(Debug, Clone, Default)]
pub struct ScreenBuffers {
    moves: VecDeque<InteractionSample>,
    clicks: VecDeque<InteractionSample>,
}

impl ScreenBuffers {
    /// Oldest first.
    pub fn moves(&self) -> impl Iterator<Item = &InteractionSample> {
        self.moves.iter()
    }

    /// Oldest first.
    pub fn clicks(&self) -> impl Iterator<Item = &InteractionSample> {
        self.clicks.iter()
    }

    pub fn move_count(&self) -> usize {
        self.moves.len()
    }

    pub fn click_count(&self) -> usize {
        self.clicks.len()
    }

    pub fn last_move(&self) -> Option<&InteractionSample> {
        self.moves.back()
    }
}

fn trim_front(buf: &mut VecDeque<InteractionSample>, cap: usize) {
    let excess = buf.len().saturating_sub(cap);
    buf.drain(..excess);
}

fn push_capped(buf: &mut VecDeque<InteractionSample>, sample: InteractionSample, cap: usize) {
    if cap == 0 {
        return;
    }
    while buf.len() >= cap {
        buf.pop_front();
        log::trace!("evicted oldest sample (cap {cap})");
    }
    buf.push_back(sample);
}

#[derive(Debug, Clone, Default)]
pub struct InteractionRecorder {
    config: RecorderConfig,
    buffers: HashMap<ScreenId, ScreenBuffers>,
}

impl InteractionRecorder {
    pub fn new(config: RecorderConfig) -> Self {
        Self {
            config,
            buffers: HashMap::new(),
        }
    }

    pub fn config(&self) -> &RecorderConfig {
        &self.config
    }

    /// Swap settings in place. Buffers above the new caps drop their
    /// oldest samples.
    pub fn set_config(&mut self, config: RecorderConfig) {
        for buffers in self.buffers.values_mut() {
            trim_front(&mut buffers.moves, config.max_moves);
            trim_front(&mut buffers.clicks, config.max_clicks);
        }
        self.config = config;
    }

    /// Record a pointer move. Returns the sample if it was kept.
    pub fn record_move(
        &mut self,
        screen: ScreenId,
        x: f32,
        y: f32,
        timestamp: u64,
        hotspot_id: Option<HotspotId>,
    ) -> Option<InteractionSample> {
        let sample = InteractionSample {
            x,
            y,
            timestamp,
            hotspot_id,
        };
        let buffers = self.buffers.entry(screen).or_default();
        if !Self::keep_move(&self.config, buffers.last_move(), &sample) {
            return None;
        }
        push_capped(&mut buffers.moves, sample, self.config.max_moves);
        Some(sample)
    }

    /// Record a click. Clicks are never down-sampled.
    pub fn record_click(
        &mut self,
        screen: ScreenId,
        x: f32,
        y: f32,
        timestamp: u64,
        hotspot_id: Option<HotspotId>,
    ) -> InteractionSample {
        let sample = InteractionSample {
            x,
            y,
            timestamp,
            hotspot_id,
        };
        let buffers = self.buffers.entry(screen).or_default();
        push_capped(&mut buffers.clicks, sample, self.config.max_clicks);
        sample
    }

    fn keep_move(
        config: &RecorderConfig,
        last: Option<&InteractionSample>,
        next: &InteractionSample,
    ) -> bool {
        let Some(last) = last else {
            return true;
        };
        if last.hotspot_id != next.hotspot_id {
            return true;
        }
        let elapsed = next.timestamp.saturating_sub(last.timestamp);
        let distance = (next.x - last.x).hypot(next.y - last.y);
        elapsed >= config.min_move_interval_ms && distance > config.min_move_distance
    }

    pub fn buffers(&self, screen: ScreenId) -> Option<&ScreenBuffers> {
        self.buffers.get(&screen)
    }

    /// Kept move positions for a screen, oldest first (heatmap input).
    pub fn move_points(&self, screen: ScreenId) -> Vec<(f32, f32)> {
        self.buffers
            .get(&screen)
            .map(|b| b.moves.iter().map(|s| (s.x, s.y)).collect())
            .unwrap_or_default()
    }

    /// `(moves, clicks)` currently buffered for a screen.
    pub fn counts(&self, screen: ScreenId) -> (usize, usize) {
        self.buffers
            .get(&screen)
            .map_or((0, 0), |b| (b.move_count(), b.click_count()))
    }

    pub fn clear_screen(&mut self, screen: ScreenId) {
        self.buffers.remove(&screen);
    }
}
