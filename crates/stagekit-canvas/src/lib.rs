//! # StageKit Canvas
//!
//! The interactive design surface: shapes and layers, pan/zoom view
//! transform, anchor-based resize/rotate gestures for single shapes and
//! multi-selections, and the editor session that ties them to the
//! animation timeline.
//!
//! The crate is renderer-agnostic. It owns geometry and interaction
//! state and emits partial [`model::AttrPatch`] updates through
//! [`session::SessionDelegate`]; drawing and event plumbing belong to the
//! host.

pub mod anchor;
pub mod model;
pub mod multi_select;
pub mod selection;
pub mod session;
pub mod transform;
pub mod viewport;

pub use anchor::{resize_cursor, AnchorKind, Corner, DragState, ResizeCursor, Side};
pub use model::{AttrPatch, Layer, Shape, ShapeCommon, StarAttrs};
pub use multi_select::{
    group_resize, group_rotate, selection_bounds, BoundingBox, MemberStart,
    MultiSelectionTransformController,
};
pub use selection::Selection;
pub use session::{EditorSession, NullDelegate, SessionDelegate};
pub use transform::{corner_resize, rotate_to, side_resize, ShapeSnapshot, ShapeTransformController};
pub use viewport::ViewTransform;
