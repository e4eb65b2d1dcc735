//! Multi-selection transform: union bounding box over rotated members,
//! with bbox-level resize/rotate gestures mapped back onto each member
//! while preserving relative layout.
//!
//! The bounding box is derived, never stored: it is recomputed from the
//! members' current geometry when a gesture begins, since they may have
//! changed since the last frame. Candidate transforms that would push any
//! part of the selection outside the stage are rejected atomically: the
//! whole batch is dropped, never a subset.

use crate::anchor::{AnchorKind, DragState, Side};
use crate::model::{AttrPatch, Shape};
use crate::transform::ShapeSnapshot;
use crate::viewport::ViewTransform;
use stagekit_core::constants::MIN_SHAPE_SIZE;
use stagekit_core::{normalize_rad, rect_corners, rotate_around, Bounds, Point};

/// The derived box around a selection. `x, y` is the min corner; the
/// rotation field exists for the data contract and is zero for derived
/// union boxes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub rotation: f64,
}

impl BoundingBox {
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }
}

/// Union bounding box of the given shapes' rotated corners. `None` for an
/// empty selection.
pub fn selection_bounds<'a>(shapes: impl IntoIterator<Item = &'a Shape>) -> Option<BoundingBox> {
    let mut acc: Option<Bounds> = None;
    for shape in shapes {
        let b = shape.axis_aligned_bounds();
        acc = Some(match acc {
            Some(u) => u.union(&b),
            None => b,
        });
    }
    acc.map(|b| BoundingBox {
        x: b.min_x,
        y: b.min_y,
        width: b.width(),
        height: b.height(),
        rotation: 0.0,
    })
}

/// One member's geometry captured at gesture start.
#[derive(Debug, Clone, Copy)]
pub struct MemberStart {
    pub id: u64,
    pub snapshot: ShapeSnapshot,
}

fn member_patch_bounds(snapshot: &ShapeSnapshot, patch: &AttrPatch) -> Bounds {
    let center = Point::new(
        patch.x.unwrap_or(snapshot.x),
        patch.y.unwrap_or(snapshot.y),
    );
    let width = patch.width.unwrap_or(snapshot.width);
    let height = patch.height.unwrap_or(snapshot.height);
    let rotation = patch.rotation.unwrap_or(snapshot.rotation);
    Bounds::from_points(rect_corners(center, width, height, rotation.to_radians()))
        .expect("four corners are never empty")
}

/// Rejects the whole batch unless every member's candidate bounds stay
/// inside the stage.
fn check_stage(
    members: &[MemberStart],
    patches: Vec<(u64, AttrPatch)>,
    stage: &Bounds,
) -> Option<Vec<(u64, AttrPatch)>> {
    for (member, (_, patch)) in members.iter().zip(patches.iter()) {
        if !stage.contains(&member_patch_bounds(&member.snapshot, patch)) {
            return None;
        }
    }
    Some(patches)
}

/// The candidate bbox produced by dragging one of its side/corner anchors.
/// The opposite edge (or corner) stays fixed; dimensions clamp at
/// `min_size`.
fn candidate_bbox(bbox: &BoundingBox, anchor: AnchorKind, delta: Point, min_size: f64) -> BoundingBox {
    // Which axes the anchor drives, and whether each grows away from the
    // min corner.
    let (x_grows, y_grows) = match anchor {
        AnchorKind::Side(Side::Right) => (Some(true), None),
        AnchorKind::Side(Side::Left) => (Some(false), None),
        AnchorKind::Side(Side::Bottom) => (None, Some(true)),
        AnchorKind::Side(Side::Top) => (None, Some(false)),
        AnchorKind::Corner(corner) => {
            let (sx, sy) = corner.signs();
            (Some(sx > 0.0), Some(sy > 0.0))
        }
        AnchorKind::Rotate(_) | AnchorKind::Body => (None, None),
    };

    let mut new = *bbox;
    match x_grows {
        Some(true) => new.width = (bbox.width + delta.x).max(min_size),
        Some(false) => {
            new.width = (bbox.width - delta.x).max(min_size);
            new.x = bbox.x + bbox.width - new.width;
        }
        None => {}
    }
    match y_grows {
        Some(true) => new.height = (bbox.height + delta.y).max(min_size),
        Some(false) => {
            new.height = (bbox.height - delta.y).max(min_size);
            new.y = bbox.y + bbox.height - new.height;
        }
        None => {}
    }
    new
}

/// Maps a bbox resize back onto every member: positions move by their
/// fraction of the old box, dimensions scale by the box's scale factors.
/// Returns `None` when the candidate would leave the stage.
pub fn group_resize(
    bbox: &BoundingBox,
    members: &[MemberStart],
    anchor: AnchorKind,
    world_delta: Point,
    min_size: f64,
    stage: &Bounds,
) -> Option<Vec<(u64, AttrPatch)>> {
    if bbox.width <= f64::EPSILON || bbox.height <= f64::EPSILON {
        return None;
    }
    let new_bbox = candidate_bbox(bbox, anchor, world_delta, min_size);
    let scale_x = new_bbox.width / bbox.width;
    let scale_y = new_bbox.height / bbox.height;

    let patches = members
        .iter()
        .map(|m| {
            let s = &m.snapshot;
            let rel_x = (s.x - bbox.x) / bbox.width;
            let rel_y = (s.y - bbox.y) / bbox.height;
            let patch = AttrPatch {
                x: Some(new_bbox.x + rel_x * new_bbox.width),
                y: Some(new_bbox.y + rel_y * new_bbox.height),
                width: Some(s.width * scale_x),
                height: Some(s.height * scale_y),
                ..Default::default()
            };
            (m.id, patch)
        })
        .collect();

    check_stage(members, patches, stage)
}

/// Rotates the whole group rigidly: member positions orbit the group
/// center by `delta_rad` and each member's own rotation advances by the
/// same amount. Returns `None` when the candidate would leave the stage.
pub fn group_rotate(
    group_center: Point,
    members: &[MemberStart],
    delta_rad: f64,
    stage: &Bounds,
) -> Option<Vec<(u64, AttrPatch)>> {
    let delta_deg = delta_rad.to_degrees();
    let patches = members
        .iter()
        .map(|m| {
            let s = &m.snapshot;
            let center = rotate_around(group_center, s.center(), delta_rad);
            let patch = AttrPatch {
                x: Some(center.x),
                y: Some(center.y),
                rotation: Some(s.rotation + delta_deg),
                ..Default::default()
            };
            (m.id, patch)
        })
        .collect();

    check_stage(members, patches, stage)
}

#[derive(Debug, Clone)]
struct GroupStart {
    bbox: BoundingBox,
    members: Vec<MemberStart>,
    pointer_angle: f64,
}

/// Drives bbox-level gestures over a multi-selection.
#[derive(Debug)]
pub struct MultiSelectionTransformController {
    drag: DragState<GroupStart>,
    min_size: f64,
}

impl Default for MultiSelectionTransformController {
    fn default() -> Self {
        Self::new()
    }
}

impl MultiSelectionTransformController {
    pub fn new() -> Self {
        Self {
            drag: DragState::Idle,
            min_size: MIN_SHAPE_SIZE,
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_dragging()
    }

    /// Begins a gesture over the current members. The union bbox is
    /// derived here, from current geometry, on every gesture.
    pub fn begin<'a>(
        &mut self,
        anchor: AnchorKind,
        pointer_screen: Point,
        shapes: impl IntoIterator<Item = &'a Shape>,
        view: &ViewTransform,
    ) -> bool {
        let shapes: Vec<&Shape> = shapes.into_iter().collect();
        let Some(bbox) = selection_bounds(shapes.iter().copied()) else {
            return false;
        };
        let members = shapes
            .iter()
            .map(|s| MemberStart {
                id: s.id(),
                snapshot: ShapeSnapshot::from(*s),
            })
            .collect();
        let pointer_world = view.screen_to_world(pointer_screen);
        let pointer_angle = (pointer_world - bbox.center()).angle();
        self.drag.begin(
            anchor,
            pointer_screen,
            GroupStart {
                bbox,
                members,
                pointer_angle,
            },
        );
        true
    }

    /// Advances the gesture, producing one patch per member, or `None`
    /// when idle or when the candidate was rejected at the stage bounds.
    pub fn drag_move(
        &mut self,
        pointer_screen: Point,
        view: &ViewTransform,
        stage: &Bounds,
    ) -> Option<Vec<(u64, AttrPatch)>> {
        let delta = self.drag.update(pointer_screen)?;
        let session = self.drag.session()?;
        let start = &session.start;

        match session.anchor {
            AnchorKind::Side(_) | AnchorKind::Corner(_) => {
                let world = view.screen_delta_to_world(delta.total);
                group_resize(
                    &start.bbox,
                    &start.members,
                    session.anchor,
                    world,
                    self.min_size,
                    stage,
                )
            }
            AnchorKind::Rotate(_) => {
                let pointer_world = view.screen_to_world(pointer_screen);
                let angle = (pointer_world - start.bbox.center()).angle();
                let delta_rad = normalize_rad(angle - start.pointer_angle);
                group_rotate(start.bbox.center(), &start.members, delta_rad, stage)
            }
            AnchorKind::Body => {
                let world = view.screen_delta_to_world(delta.total);
                let patches = start
                    .members
                    .iter()
                    .map(|m| {
                        let s = &m.snapshot;
                        (m.id, AttrPatch::position(s.x + world.x, s.y + world.y))
                    })
                    .collect();
                check_stage(&start.members, patches, stage)
            }
        }
    }

    pub fn end(&mut self) -> bool {
        self.drag.end().is_some()
    }

    pub fn cancel(&mut self) {
        self.drag.cancel();
    }
}
