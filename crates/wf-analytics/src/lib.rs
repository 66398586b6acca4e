pub mod preview;
pub mod recorder;
pub mod rollup;
pub mod session;

pub use preview::{HotspotInfo, PreviewController, PreviewItem, resolve_hotspot_info};
pub use recorder::{InteractionRecorder, InteractionSample, RecorderConfig};
pub use rollup::{HotspotRollup, ScreenTotals, format_duration, hotspot_rollups, screen_totals};
pub use session::{PreviewMode, SessionSummary, SessionTracker};
