//! Rejection reasons for editing operations.
//!
//! Nothing in the core is fatal. Operations that can be refused report the
//! reason here; everything else is a silent no-op that returns `bool`/`Option`.

use crate::id::{ElementId, ScreenId};
use thiserror::Error;

/// Result type for editing operations that may be rejected.
pub type EditResult<T> = Result<T, EditError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    /// The project must always keep at least one screen.
    #[error("Keep at least one screen in the project")]
    LastScreen,

    #[error("Screen not found: {0}")]
    ScreenNotFound(ScreenId),

    #[error("Element not found: {0}")]
    ElementNotFound(ElementId),

    /// Canvas dimensions must both lie in `1..=MAX_CANVAS_SIDE`.
    #[error("Invalid canvas size: {width}x{height}")]
    InvalidCanvasSize { width: u32, height: u32 },

    /// The property id is not editable on this component type.
    #[error("Unknown field `{field}` for {kind}")]
    UnknownField { kind: &'static str, field: String },

    #[error("Invalid value for `{field}`: {value:?}")]
    InvalidFieldValue { field: String, value: String },
}
