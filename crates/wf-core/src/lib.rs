pub mod error;
pub mod geometry;
pub mod graph;
pub mod hotspot;
pub mod id;
pub mod model;

pub use error::{EditError, EditResult};
pub use geometry::{CanvasSize, GRID_SIZE, MIN_HEIGHT, MIN_WIDTH, Rect, ResizeHandle};
pub use graph::ScreenGraph;
pub use hotspot::{Hotspot, HotspotRegistry};
pub use id::{ElementId, HotspotId, ScreenId};
pub use model::*;
