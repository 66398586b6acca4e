pub mod clipboard;
pub mod engine;
pub mod input;
pub mod scheduler;
pub mod tools;

pub use engine::{EditMutation, EditorEngine};
pub use input::{CanvasTransform, InputEvent};
pub use scheduler::FrameScheduler;
