//! Anchor interaction: the pointer-drag state machine shared by every
//! draggable handle.
//!
//! One machine serves side-resize, corner-resize, and rotation handles.
//! Drags are mutually exclusive sessions: while `Dragging`, the session is
//! the sole writer of in-progress geometry. `cancel` must be reachable
//! from any state and is hooked by the host to window-level `pointerup`,
//! `blur`, and `mouseleave`, so cleanup happens even when the terminating
//! event never fires over the canvas element.

use stagekit_core::Point;
use tracing::{debug, warn};

/// A side-resize anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

impl Side {
    /// Outward normal angle in the shape's local frame, degrees. Screen
    /// space is y-down, so `Bottom` points at +90.
    fn normal_deg(self) -> f64 {
        match self {
            Side::Right => 0.0,
            Side::Bottom => 90.0,
            Side::Left => 180.0,
            Side::Top => 270.0,
        }
    }
}

/// A corner anchor, used both for corner resize and for the rotation
/// handles that sit outside each corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomRight,
    BottomLeft,
}

impl Corner {
    /// Local-frame direction signs from the center toward this corner.
    pub fn signs(self) -> (f64, f64) {
        match self {
            Corner::TopLeft => (-1.0, -1.0),
            Corner::TopRight => (1.0, -1.0),
            Corner::BottomRight => (1.0, 1.0),
            Corner::BottomLeft => (-1.0, 1.0),
        }
    }

    pub fn opposite(self) -> Corner {
        match self {
            Corner::TopLeft => Corner::BottomRight,
            Corner::TopRight => Corner::BottomLeft,
            Corner::BottomRight => Corner::TopLeft,
            Corner::BottomLeft => Corner::TopRight,
        }
    }
}

/// Every draggable handle attached to a selection, plus the body itself
/// (drag-to-move).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorKind {
    Side(Side),
    Corner(Corner),
    Rotate(Corner),
    Body,
}

/// The four standard resize cursors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeCursor {
    EwResize,
    NwseResize,
    NsResize,
    NeswResize,
}

impl ResizeCursor {
    /// The CSS cursor name the host should apply.
    pub fn css(self) -> &'static str {
        match self {
            ResizeCursor::EwResize => "ew-resize",
            ResizeCursor::NwseResize => "nwse-resize",
            ResizeCursor::NsResize => "ns-resize",
            ResizeCursor::NeswResize => "nesw-resize",
        }
    }
}

/// Picks the cursor for a side anchor on a shape rotated by
/// `rotation_deg`: the anchor's perpendicular screen angle is bucketed
/// into four 45-degree ranges (wrapping at 180).
pub fn resize_cursor(side: Side, rotation_deg: f64) -> ResizeCursor {
    let angle = (side.normal_deg() + rotation_deg).rem_euclid(180.0);
    if angle < 22.5 {
        ResizeCursor::EwResize
    } else if angle < 67.5 {
        ResizeCursor::NwseResize
    } else if angle < 112.5 {
        ResizeCursor::NsResize
    } else if angle < 157.5 {
        ResizeCursor::NeswResize
    } else {
        ResizeCursor::EwResize
    }
}

/// Converts a screen-space delta into an entity's rotated local frame.
///
/// This is what makes side anchors behave correctly on rotated shapes:
/// the drag is measured along the shape's own axes.
pub fn to_local_frame(delta: Point, rotation_rad: f64) -> Point {
    let cos = rotation_rad.cos();
    let sin = rotation_rad.sin();
    Point::new(
        delta.x * cos + delta.y * sin,
        -delta.x * sin + delta.y * cos,
    )
}

/// Pointer movement since the last update and since drag start.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragDelta {
    pub step: Point,
    pub total: Point,
}

/// A live drag with its captured start state.
#[derive(Debug, Clone)]
pub struct DragSession<S> {
    pub anchor: AnchorKind,
    pub start_pointer: Point,
    pub last_pointer: Point,
    /// Entity state captured at `begin`; all outputs are computed from
    /// this plus the total delta, so repeated moves never accumulate
    /// drift.
    pub start: S,
}

/// The `Idle -> Dragging -> Idle` machine.
#[derive(Debug, Clone)]
pub enum DragState<S> {
    Idle,
    Dragging(DragSession<S>),
}

// Manual impl: `Idle` needs no `S: Default` bound.
impl<S> Default for DragState<S> {
    fn default() -> Self {
        DragState::Idle
    }
}

impl<S> DragState<S> {
    pub fn is_dragging(&self) -> bool {
        matches!(self, DragState::Dragging(_))
    }

    /// Starts a drag, capturing the pointer and entity start state.
    ///
    /// Gestures are mutually exclusive; a `begin` while already dragging
    /// means a release event was lost, so the stale session is discarded.
    pub fn begin(&mut self, anchor: AnchorKind, pointer: Point, start: S) {
        if self.is_dragging() {
            warn!(?anchor, "drag began while another session was active; discarding stale session");
        }
        *self = DragState::Dragging(DragSession {
            anchor,
            start_pointer: pointer,
            last_pointer: pointer,
            start,
        });
    }

    /// Advances the drag to a new pointer position. Returns `None` (and
    /// logs) when no session is active.
    pub fn update(&mut self, pointer: Point) -> Option<DragDelta> {
        match self {
            DragState::Idle => {
                warn!("drag move with no active session");
                None
            }
            DragState::Dragging(session) => {
                let step = pointer - session.last_pointer;
                session.last_pointer = pointer;
                Some(DragDelta {
                    step,
                    total: pointer - session.start_pointer,
                })
            }
        }
    }

    pub fn session(&self) -> Option<&DragSession<S>> {
        match self {
            DragState::Idle => None,
            DragState::Dragging(session) => Some(session),
        }
    }

    /// Completes the drag, returning the session.
    pub fn end(&mut self) -> Option<DragSession<S>> {
        match std::mem::take(self) {
            DragState::Idle => None,
            DragState::Dragging(session) => Some(session),
        }
    }

    /// Aborts from any state. Always leaves the machine `Idle`; safe to
    /// call redundantly on `blur`/`mouseleave` after a normal release.
    pub fn cancel(&mut self) {
        if self.is_dragging() {
            debug!("drag session cancelled");
        }
        *self = DragState::Idle;
    }
}
