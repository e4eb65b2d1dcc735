//! Single-selection transform: side resize, corner resize, and rotation
//! for one shape or layer.
//!
//! All math runs on an immutable snapshot captured at drag start plus the
//! total pointer delta, and emits [`AttrPatch`] values; output positions
//! and rotations are absolute, so repeated moves cannot accumulate drift.

use crate::anchor::{to_local_frame, AnchorKind, Corner, DragState, Side};
use crate::model::{AttrPatch, Layer, Shape};
use crate::viewport::ViewTransform;
use stagekit_core::constants::MIN_SHAPE_SIZE;
use stagekit_core::{normalize_rad, Point};

/// Geometry of the entity under transform, captured at drag start.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeSnapshot {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub rotation: f64,
}

impl ShapeSnapshot {
    pub fn center(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

impl From<&Shape> for ShapeSnapshot {
    fn from(shape: &Shape) -> Self {
        let c = shape.common();
        ShapeSnapshot {
            x: c.x,
            y: c.y,
            width: c.width,
            height: c.height,
            rotation: c.rotation,
        }
    }
}

impl From<&Layer> for ShapeSnapshot {
    fn from(layer: &Layer) -> Self {
        ShapeSnapshot {
            x: layer.x,
            y: layer.y,
            width: layer.width,
            height: layer.height,
            rotation: layer.rotation,
        }
    }
}

/// Resizes along one side, keeping the opposite edge's world position
/// fixed. A drag past the minimum silently stops shrinking rather than
/// erroring, so interaction never freezes.
///
/// `local_delta` is the pointer delta already expressed in the shape's
/// rotated local frame.
pub fn side_resize(start: &ShapeSnapshot, side: Side, local_delta: Point, min_size: f64) -> AttrPatch {
    let theta = start.rotation.to_radians();
    let center = start.center();
    let rot = |x: f64, y: f64| Point::new(x, y).rotated(theta);

    let (new_center, patch) = match side {
        Side::Right => {
            let new_w = (start.width + local_delta.x).max(min_size);
            let fixed = center + rot(-start.width / 2.0, 0.0);
            (
                fixed + rot(new_w / 2.0, 0.0),
                AttrPatch {
                    width: Some(new_w),
                    ..Default::default()
                },
            )
        }
        Side::Left => {
            let new_w = (start.width - local_delta.x).max(min_size);
            let fixed = center + rot(start.width / 2.0, 0.0);
            (
                fixed + rot(-new_w / 2.0, 0.0),
                AttrPatch {
                    width: Some(new_w),
                    ..Default::default()
                },
            )
        }
        Side::Bottom => {
            let new_h = (start.height + local_delta.y).max(min_size);
            let fixed = center + rot(0.0, -start.height / 2.0);
            (
                fixed + rot(0.0, new_h / 2.0),
                AttrPatch {
                    height: Some(new_h),
                    ..Default::default()
                },
            )
        }
        Side::Top => {
            let new_h = (start.height - local_delta.y).max(min_size);
            let fixed = center + rot(0.0, start.height / 2.0);
            (
                fixed + rot(0.0, -new_h / 2.0),
                AttrPatch {
                    height: Some(new_h),
                    ..Default::default()
                },
            )
        }
    };

    AttrPatch {
        x: Some(new_center.x),
        y: Some(new_center.y),
        ..patch
    }
}

/// Resizes from a corner, keeping the opposite corner's world position
/// fixed. Unlike side resize, a candidate box below the minimum in either
/// dimension is rejected outright (`None`): the previous box stands.
pub fn corner_resize(
    start: &ShapeSnapshot,
    corner: Corner,
    local_delta: Point,
    min_size: f64,
) -> Option<AttrPatch> {
    let (sx, sy) = corner.signs();
    let new_w = start.width + sx * local_delta.x;
    let new_h = start.height + sy * local_delta.y;
    if new_w < min_size || new_h < min_size {
        return None;
    }

    let theta = start.rotation.to_radians();
    let rot = |x: f64, y: f64| Point::new(x, y).rotated(theta);
    let (ox, oy) = corner.opposite().signs();
    let fixed = start.center() + rot(ox * start.width / 2.0, oy * start.height / 2.0);
    let new_center = fixed + rot(sx * new_w / 2.0, sy * new_h / 2.0);

    Some(AttrPatch {
        x: Some(new_center.x),
        y: Some(new_center.y),
        width: Some(new_w),
        height: Some(new_h),
        ..Default::default()
    })
}

/// Absolute rotation from a rotation-handle drag.
///
/// The pointer-angle delta is normalized into (-PI, PI] before use, so a
/// drag crossing the +-180 degree ray moves by its small signed amount
/// instead of jumping by ~360.
pub fn rotate_to(start: &ShapeSnapshot, start_pointer_angle: f64, pointer_angle: f64) -> AttrPatch {
    let delta = normalize_rad(pointer_angle - start_pointer_angle);
    AttrPatch::rotation(start.rotation + delta.to_degrees())
}

#[derive(Debug, Clone, Copy)]
struct TransformStart {
    snapshot: ShapeSnapshot,
    /// Pointer angle around the shape center at drag start; only
    /// meaningful for rotation anchors.
    pointer_angle: f64,
}

/// Drives resize and rotate gestures for a single selected entity.
#[derive(Debug)]
pub struct ShapeTransformController {
    drag: DragState<TransformStart>,
    min_size: f64,
}

impl Default for ShapeTransformController {
    fn default() -> Self {
        Self::new()
    }
}

impl ShapeTransformController {
    pub fn new() -> Self {
        Self {
            drag: DragState::Idle,
            min_size: MIN_SHAPE_SIZE,
        }
    }

    /// A controller for entities with a larger minimum (layers).
    pub fn with_min_size(min_size: f64) -> Self {
        Self {
            drag: DragState::Idle,
            min_size,
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_dragging()
    }

    /// Captures the start of a gesture on `snapshot` at the given screen
    /// pointer.
    pub fn begin(
        &mut self,
        anchor: AnchorKind,
        pointer_screen: Point,
        snapshot: ShapeSnapshot,
        view: &ViewTransform,
    ) {
        let pointer_world = view.screen_to_world(pointer_screen);
        let pointer_angle = (pointer_world - snapshot.center()).angle();
        self.drag.begin(
            anchor,
            pointer_screen,
            TransformStart {
                snapshot,
                pointer_angle,
            },
        );
    }

    /// Advances the gesture. Returns the patch for this step, or `None`
    /// when there is no session or the candidate was rejected.
    pub fn drag_move(&mut self, pointer_screen: Point, view: &ViewTransform) -> Option<AttrPatch> {
        let delta = self.drag.update(pointer_screen)?;
        let session = self.drag.session()?;
        let start = session.start;
        let snapshot = start.snapshot;

        match session.anchor {
            AnchorKind::Side(side) => {
                let world = view.screen_delta_to_world(delta.total);
                let local = to_local_frame(world, snapshot.rotation.to_radians());
                Some(side_resize(&snapshot, side, local, self.min_size))
            }
            AnchorKind::Corner(corner) => {
                let world = view.screen_delta_to_world(delta.total);
                let local = to_local_frame(world, snapshot.rotation.to_radians());
                corner_resize(&snapshot, corner, local, self.min_size)
            }
            AnchorKind::Rotate(_) => {
                let pointer_world = view.screen_to_world(pointer_screen);
                let angle = (pointer_world - snapshot.center()).angle();
                Some(rotate_to(&snapshot, start.pointer_angle, angle))
            }
            AnchorKind::Body => {
                let world = view.screen_delta_to_world(delta.total);
                Some(AttrPatch::position(snapshot.x + world.x, snapshot.y + world.y))
            }
        }
    }

    /// Ends the gesture. Returns whether one was active.
    pub fn end(&mut self) -> bool {
        self.drag.end().is_some()
    }

    /// Aborts the gesture from any state (window blur, pointer leave).
    pub fn cancel(&mut self) {
        self.drag.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stagekit_core::rect_corners;

    const EPS: f64 = 1e-9;

    fn snapshot(x: f64, y: f64, w: f64, h: f64, rotation: f64) -> ShapeSnapshot {
        ShapeSnapshot {
            x,
            y,
            width: w,
            height: h,
            rotation,
        }
    }

    /// Midpoint of the given side's edge in world space.
    fn edge_center(s: &ShapeSnapshot, side: Side) -> Point {
        let theta = s.rotation.to_radians();
        let v = match side {
            Side::Right => Point::new(s.width / 2.0, 0.0),
            Side::Left => Point::new(-s.width / 2.0, 0.0),
            Side::Bottom => Point::new(0.0, s.height / 2.0),
            Side::Top => Point::new(0.0, -s.height / 2.0),
        };
        s.center() + v.rotated(theta)
    }

    fn applied(s: &ShapeSnapshot, patch: &AttrPatch) -> ShapeSnapshot {
        ShapeSnapshot {
            x: patch.x.unwrap_or(s.x),
            y: patch.y.unwrap_or(s.y),
            width: patch.width.unwrap_or(s.width),
            height: patch.height.unwrap_or(s.height),
            rotation: patch.rotation.unwrap_or(s.rotation),
        }
    }

    #[test]
    fn right_drag_extends_width_and_keeps_left_edge() {
        // 100x100 rect centered at (100, 100); +20 on the right anchor.
        let s = snapshot(100.0, 100.0, 100.0, 100.0, 0.0);
        let patch = side_resize(&s, Side::Right, Point::new(20.0, 0.0), MIN_SHAPE_SIZE);
        assert_eq!(patch.width, Some(120.0));
        assert_eq!(patch.x, Some(110.0));
        assert_eq!(patch.y, Some(100.0));
    }

    #[test]
    fn side_resize_fixes_opposite_edge_at_any_rotation() {
        for rotation in [0.0, 45.0, 90.0, 180.0, 270.0] {
            for (side, opposite) in [
                (Side::Right, Side::Left),
                (Side::Left, Side::Right),
                (Side::Top, Side::Bottom),
                (Side::Bottom, Side::Top),
            ] {
                let s = snapshot(37.0, -12.0, 80.0, 50.0, rotation);
                let before = edge_center(&s, opposite);
                let patch = side_resize(&s, side, Point::new(13.0, -7.0), MIN_SHAPE_SIZE);
                let after = edge_center(&applied(&s, &patch), opposite);
                assert!(
                    after.distance_to(&before) < 1e-9,
                    "rotation {rotation}, side {side:?}: opposite edge moved {}",
                    after.distance_to(&before)
                );
            }
        }
    }

    #[test]
    fn side_resize_clamps_at_minimum_silently() {
        let s = snapshot(0.0, 0.0, 20.0, 20.0, 0.0);
        let patch = side_resize(&s, Side::Right, Point::new(-100.0, 0.0), MIN_SHAPE_SIZE);
        assert_eq!(patch.width, Some(MIN_SHAPE_SIZE));
        // Left edge still fixed at -10.
        let after = applied(&s, &patch);
        assert!((after.x - (-10.0 + MIN_SHAPE_SIZE / 2.0)).abs() < EPS);
    }

    #[test]
    fn corner_resize_keeps_opposite_corner_fixed() {
        let s = snapshot(10.0, 20.0, 60.0, 40.0, 30.0);
        let patch = corner_resize(&s, Corner::BottomRight, Point::new(12.0, 8.0), MIN_SHAPE_SIZE)
            .expect("valid candidate");
        let after = applied(&s, &patch);

        let before_tl = rect_corners(s.center(), s.width, s.height, s.rotation.to_radians())[0];
        let after_tl =
            rect_corners(after.center(), after.width, after.height, after.rotation.to_radians())[0];
        assert!(after_tl.distance_to(&before_tl) < 1e-9);
        assert!((after.width - 72.0).abs() < EPS);
        assert!((after.height - 48.0).abs() < EPS);
    }

    #[test]
    fn corner_resize_rejects_sub_minimum_candidate() {
        let s = snapshot(0.0, 0.0, 20.0, 20.0, 0.0);
        let rejected = corner_resize(&s, Corner::BottomRight, Point::new(-18.0, 0.0), MIN_SHAPE_SIZE);
        assert!(rejected.is_none());
    }

    #[test]
    fn rotation_is_absolute_and_wrap_safe() {
        let s = snapshot(0.0, 0.0, 40.0, 40.0, 10.0);
        // Pointer sweeps 170 deg -> -170 deg across the seam: a +20 move.
        let start_angle = 170.0f64.to_radians();
        let patch = rotate_to(&s, start_angle, (-170.0f64).to_radians());
        let rotation = patch.rotation.unwrap();
        assert!(
            (rotation - 30.0).abs() < 1e-9,
            "expected 10 + 20 = 30, got {rotation}"
        );
    }

    #[test]
    fn controller_resize_through_screen_space_scale() {
        // At stage scale 2, a 40px screen drag is a 20-unit world resize.
        let view = ViewTransform::new(2.0, 0.0, 0.0);
        let shape = Shape::rect(1, 100.0, 100.0, 100.0, 100.0);
        let mut ctl = ShapeTransformController::new();

        ctl.begin(
            AnchorKind::Side(Side::Right),
            Point::new(300.0, 200.0),
            ShapeSnapshot::from(&shape),
            &view,
        );
        let patch = ctl.drag_move(Point::new(340.0, 200.0), &view).unwrap();
        assert_eq!(patch.width, Some(120.0));
        assert_eq!(patch.x, Some(110.0));
        assert!(ctl.end());
    }

    #[test]
    fn controller_rotation_crossing_the_seam() {
        let view = ViewTransform::default();
        let shape = Shape::rect(1, 0.0, 0.0, 100.0, 100.0);
        let mut ctl = ShapeTransformController::new();

        // Start just above the negative x axis (pointer angle ~170 deg).
        let start = Point::new(-100.0, 17.6);
        ctl.begin(
            AnchorKind::Rotate(Corner::TopRight),
            start,
            ShapeSnapshot::from(&shape),
            &view,
        );
        // Move just below it (pointer angle ~-170 deg).
        let patch = ctl.drag_move(Point::new(-100.0, -17.6), &view).unwrap();
        let rotation = patch.rotation.unwrap();
        assert!(
            rotation > 0.0 && rotation < 25.0,
            "expected a small positive delta, got {rotation}"
        );
    }

    #[test]
    fn drag_move_without_begin_is_none() {
        let view = ViewTransform::default();
        let mut ctl = ShapeTransformController::new();
        assert!(ctl.drag_move(Point::new(1.0, 1.0), &view).is_none());
    }
}
