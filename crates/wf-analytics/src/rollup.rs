//! Cross-session rollups for the analysis panel.

use crate::session::SessionSummary;
use serde::Serialize;
use std::collections::BTreeMap;
use wf_core::hotspot::HotspotRegistry;
use wf_core::id::{HotspotId, ScreenId};

/// One row of the per-hotspot table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HotspotRollup {
    pub hotspot_id: HotspotId,
    /// Current label, or the id if the hotspot has since been released.
    pub name: String,
    pub target_screen_id: Option<ScreenId>,
    pub clicks: u32,
    pub hovers: u32,
    /// Sessions in which this hotspot saw any hover or click.
    pub unique_sessions: usize,
    /// `round(unique_sessions / sessions × 100)`.
    pub coverage_percent: u32,
}

/// Screen-level totals across sessions.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenTotals {
    pub sessions: usize,
    pub moves: u64,
    pub clicks: u64,
    pub hotspot_clicks: u64,
    pub hotspot_hovers: u64,
    pub average_duration_ms: u64,
    pub average_duration: String,
}

#[derive(Default)]
struct Tally {
    clicks: u32,
    hovers: u32,
    sessions: usize,
}

/// Sum per-hotspot activity over `summaries` (one screen's rows, finalized
/// and in-progress). Sorted by clicks, then hovers, descending.
pub fn hotspot_rollups(
    summaries: &[SessionSummary],
    hotspots: &HotspotRegistry,
) -> Vec<HotspotRollup> {
    let mut tally: BTreeMap<HotspotId, Tally> = BTreeMap::new();
    for row in summaries {
        let touched = row
            .hover_by_hotspot
            .keys()
            .chain(row.click_by_hotspot.keys());
        let mut seen = Vec::new();
        for id in touched {
            if !seen.contains(id) {
                seen.push(*id);
                tally.entry(*id).or_default().sessions += 1;
            }
        }
        for (id, n) in &row.hover_by_hotspot {
            tally.entry(*id).or_default().hovers += n;
        }
        for (id, n) in &row.click_by_hotspot {
            tally.entry(*id).or_default().clicks += n;
        }
    }

    let total = summaries.len();
    let mut rows: Vec<HotspotRollup> = tally
        .into_iter()
        .map(|(id, t)| {
            let current = hotspots.get(id);
            HotspotRollup {
                hotspot_id: id,
                name: current.map_or_else(|| id.to_string(), |h| h.name.clone()),
                target_screen_id: current.map(|h| h.target_screen_id),
                clicks: t.clicks,
                hovers: t.hovers,
                unique_sessions: t.sessions,
                coverage_percent: coverage(t.sessions, total),
            }
        })
        .collect();
    rows.sort_by(|a, b| {
        b.clicks
            .cmp(&a.clicks)
            .then(b.hovers.cmp(&a.hovers))
            .then(a.hotspot_id.cmp(&b.hotspot_id))
    });
    rows
}

fn coverage(sessions: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (sessions as f64 / total as f64 * 100.0).round() as u32
}

pub fn screen_totals(summaries: &[SessionSummary]) -> ScreenTotals {
    let sum = |f: fn(&SessionSummary) -> u32| summaries.iter().map(|r| u64::from(f(r))).sum::<u64>();
    let average_duration_ms = if summaries.is_empty() {
        0
    } else {
        summaries.iter().map(|r| r.duration_ms).sum::<u64>() / summaries.len() as u64
    };
    ScreenTotals {
        sessions: summaries.len(),
        moves: sum(|r| r.moves),
        clicks: sum(|r| r.clicks),
        hotspot_clicks: sum(|r| r.hotspot_clicks),
        hotspot_hovers: sum(|r| r.hotspot_hovers),
        average_duration_ms,
        average_duration: format_duration(average_duration_ms),
    }
}

/// `"0.0s"`, `"12.4s"`, `"3m 05s"`.
pub fn format_duration(ms: u64) -> String {
    if ms < 60_000 {
        return format!("{:.1}s", ms as f64 / 1000.0);
    }
    let secs = ms / 1000;
    format!("{}m {:02}s", secs / 60, secs % 60)
}
