pub mod heatmap;
pub mod hit;

pub use heatmap::{HeatmapConfig, HeatmapImage, HeatmapRenderer};
pub use hit::{HANDLE_TOLERANCE, hit_handle, hit_test};
