//! Error handling for StageKit.
//!
//! Interaction-layer rejections (an out-of-bounds candidate transform, a
//! resize below the minimum box) are ordinary values, not errors; the types
//! here cover genuine caller mistakes such as referencing a missing entity.
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// StageKit error type.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StageError {
    /// No shape or layer exists with the given id.
    #[error("No entity with id {id}")]
    UnknownEntity {
        /// The id that was looked up.
        id: u64,
    },

    /// An operation that needs a selection was invoked with none.
    #[error("Selection is empty")]
    EmptySelection,

    /// A drag gesture was started while another one was still live.
    /// Gestures are mutually exclusive sessions.
    #[error("Another gesture is already in progress")]
    GestureInProgress,

    /// An animation definition carries parameters the engine cannot use.
    #[error("Invalid animation definition: {reason}")]
    InvalidDefinition {
        /// Why the definition was rejected.
        reason: String,
    },

    /// A shape id was attached to a layer it does not belong to.
    #[error("Shape {shape_id} is not a child of layer {layer_id}")]
    NotAChild {
        /// The shape id.
        shape_id: u64,
        /// The layer id.
        layer_id: u64,
    },
}

/// Convenience result type for StageKit operations.
pub type Result<T> = std::result::Result<T, StageError>;
