//! End-to-end editor session flows: pointer events in, patches and
//! selection notifications out, timeline scrubbing against the same
//! session.

use stagekit_canvas::{
    AnchorKind, AttrPatch, EditorSession, SessionDelegate, Shape, Side,
};
use stagekit_core::{Bounds, Point, StageError};
use stagekit_timeline::{AnimationDefinition, Direction, Repeat};
use uuid::Uuid;

/// Records every delegate notification for assertions.
#[derive(Default)]
struct Recorder {
    changes: Vec<(u64, AttrPatch)>,
    selections: Vec<Vec<u64>>,
    animation_events: Vec<(Uuid, bool)>,
}

impl SessionDelegate for Recorder {
    fn on_change(&mut self, id: u64, patch: &AttrPatch) {
        self.changes.push((id, patch.clone()));
    }

    fn on_select(&mut self, ids: &[u64]) {
        self.selections.push(ids.to_vec());
    }

    fn on_animation_change(&mut self, id: Uuid, def: Option<&AnimationDefinition>) {
        self.animation_events.push((id, def.is_some()));
    }
}

fn wide_stage() -> Bounds {
    Bounds::new(-10_000.0, -10_000.0, 10_000.0, 10_000.0)
}

fn session() -> EditorSession<Recorder> {
    EditorSession::new(wide_stage(), Recorder::default())
}

#[test]
fn click_select_and_side_resize_round_trip() {
    let mut session = session();
    let id = session.add_shape(|id| Shape::rect(id, 100.0, 100.0, 100.0, 100.0));

    // Click inside the shape, then drag its right anchor by +20px.
    session.select_at(Point::new(100.0, 100.0), false);
    assert_eq!(session.selection().ids(), &[id]);

    session
        .begin_anchor_drag(AnchorKind::Side(Side::Right), Point::new(150.0, 100.0))
        .expect("selection is non-empty");
    session.pointer_move(Point::new(170.0, 100.0));
    session.release_pointer();

    let shape = session.shape(id).unwrap();
    assert_eq!(shape.common().width, 120.0);
    assert_eq!(shape.common().x, 110.0);
    assert_eq!(shape.common().y, 100.0);

    let rec = session.delegate();
    assert_eq!(rec.selections.last().unwrap(), &vec![id]);
    let (changed_id, last) = rec.changes.last().unwrap();
    assert_eq!(*changed_id, id);
    assert_eq!(last.width, Some(120.0));
}

#[test]
fn marquee_then_group_resize_scales_both_members() {
    let mut session = session();
    let a = session.add_shape(|id| Shape::rect(id, 50.0, 25.0, 100.0, 50.0));
    let b = session.add_shape(|id| Shape::rect(id, 150.0, 75.0, 100.0, 50.0));

    session.select_in_rect(Point::new(-10.0, -10.0), Point::new(210.0, 110.0));
    assert_eq!(session.selection().ids(), &[a, b]);

    let bbox = session.selection_bbox().unwrap();
    assert_eq!((bbox.x, bbox.y, bbox.width, bbox.height), (0.0, 0.0, 200.0, 100.0));

    // Drag the group's bottom anchor by +50: scaleY = 1.5.
    session
        .begin_anchor_drag(AnchorKind::Side(Side::Bottom), Point::new(100.0, 100.0))
        .unwrap();
    session.pointer_move(Point::new(100.0, 150.0));
    session.release_pointer();

    let sa = session.shape(a).unwrap().common();
    assert!((sa.height - 75.0).abs() < 1e-9);
    assert!((sa.y - 37.5).abs() < 1e-9);
    let sb = session.shape(b).unwrap().common();
    assert!((sb.height - 75.0).abs() < 1e-9);
    assert!((sb.y - 112.5).abs() < 1e-9);
}

#[test]
fn out_of_stage_resize_keeps_last_valid_geometry() {
    let mut session = EditorSession::new(Bounds::new(0.0, 0.0, 400.0, 300.0), Recorder::default());
    let id = session.add_shape(|id| Shape::rect(id, 300.0, 150.0, 100.0, 100.0));
    session.select_at(Point::new(300.0, 150.0), false);

    session
        .begin_anchor_drag(AnchorKind::Side(Side::Right), Point::new(350.0, 150.0))
        .unwrap();
    // +40 still fits (right edge at 390), +80 would cross x = 400.
    session.pointer_move(Point::new(390.0, 150.0));
    session.pointer_move(Point::new(430.0, 150.0));
    session.release_pointer();

    let shape = session.shape(id).unwrap().common();
    assert_eq!(shape.width, 140.0, "stays at the last in-stage candidate");
}

#[test]
fn layer_resize_stops_at_stage_edge() {
    let mut session = EditorSession::new(Bounds::new(0.0, 0.0, 400.0, 300.0), Recorder::default());
    let layer_id = session.add_layer(200.0, 150.0, 100.0, 100.0);

    session
        .begin_layer_drag(layer_id, AnchorKind::Side(Side::Right), Point::new(250.0, 150.0))
        .unwrap();
    // +40 still fits (right edge at 290), the second move would cross x = 400.
    session.pointer_move(Point::new(290.0, 150.0));
    session.pointer_move(Point::new(900.0, 150.0));
    session.release_pointer();

    let layer = session.layer(layer_id).unwrap();
    assert_eq!(layer.width, 140.0, "stays at the last in-stage candidate");
    assert!(layer.x + layer.width / 2.0 <= 400.0, "right edge inside the stage");
}

#[test]
fn gestures_are_mutually_exclusive() {
    let mut session = session();
    let id = session.add_shape(|id| Shape::rect(id, 100.0, 100.0, 100.0, 100.0));
    let layer_id = session.add_layer(400.0, 400.0, 100.0, 100.0);
    session.select_at(Point::new(100.0, 100.0), false);

    session
        .begin_anchor_drag(AnchorKind::Side(Side::Right), Point::new(150.0, 100.0))
        .unwrap();

    // No second gesture may begin while the first is live.
    assert_eq!(
        session.begin_layer_drag(layer_id, AnchorKind::Side(Side::Right), Point::new(450.0, 400.0)),
        Err(StageError::GestureInProgress)
    );
    assert_eq!(
        session.begin_move_drag(Point::new(100.0, 100.0)),
        Err(StageError::GestureInProgress)
    );

    // The original gesture is unaffected by the rejected begins.
    session.pointer_move(Point::new(170.0, 100.0));
    assert_eq!(session.shape(id).unwrap().common().width, 120.0);
    session.release_pointer();

    // After release a new gesture may begin again.
    assert!(session.begin_move_drag(Point::new(100.0, 100.0)).is_ok());
}

#[test]
fn release_pointer_is_a_guaranteed_cleanup_path() {
    let mut session = session();
    let id = session.add_shape(|id| Shape::rect(id, 0.0, 0.0, 100.0, 100.0));
    session.select_at(Point::ZERO, false);

    session
        .begin_anchor_drag(AnchorKind::Side(Side::Right), Point::new(50.0, 0.0))
        .unwrap();
    assert!(session.is_interacting());

    // Window blur: no pointerup ever arrives.
    session.release_pointer();
    assert!(!session.is_interacting());
    // Redundant cleanup (mouseleave after blur) stays a no-op.
    session.release_pointer();

    // Moves after release change nothing.
    session.pointer_move(Point::new(500.0, 0.0));
    assert_eq!(session.shape(id).unwrap().common().width, 100.0);
}

#[test]
fn body_drag_moves_whole_selection() {
    let mut session = session();
    let a = session.add_shape(|id| Shape::rect(id, 0.0, 0.0, 20.0, 20.0));
    let b = session.add_shape(|id| Shape::rect(id, 100.0, 0.0, 20.0, 20.0));
    session.select_all();

    session.begin_move_drag(Point::new(10.0, 10.0)).unwrap();
    session.pointer_move(Point::new(25.0, 4.0));
    session.release_pointer();

    let sa = session.shape(a).unwrap().common();
    assert_eq!((sa.x, sa.y), (15.0, -6.0));
    let sb = session.shape(b).unwrap().common();
    assert_eq!((sb.x, sb.y), (115.0, -6.0));
}

#[test]
fn gestures_respect_view_zoom() {
    let mut session = session();
    let id = session.add_shape(|id| Shape::rect(id, 100.0, 100.0, 100.0, 100.0));
    session.zoom_view_at(Point::ZERO, 2.0);
    session.select_at(Point::new(200.0, 200.0), false);
    assert_eq!(session.selection().ids(), &[id]);

    // A 40px screen drag at scale 2 is a 20-unit world resize.
    session
        .begin_anchor_drag(AnchorKind::Side(Side::Right), Point::new(300.0, 200.0))
        .unwrap();
    session.pointer_move(Point::new(340.0, 200.0));
    session.release_pointer();

    assert_eq!(session.shape(id).unwrap().common().width, 120.0);
}

#[test]
fn scrub_drives_animation_states_without_touching_the_model() {
    let mut session = session();
    let id = session.add_shape(|id| Shape::rect(id, 0.0, 0.0, 50.0, 50.0));
    session.set_timeline_width(600.0);
    session.set_timeline_duration(5.0);

    session
        .upsert_animation(
            AnimationDefinition::spin(id, 2.0, 360.0, Direction::Clockwise)
                .with_repeat(Repeat::Infinite),
        )
        .unwrap();

    // Pixel 120 of 600 at zoom 1 is t = 1.0: half a clockwise cycle.
    let states = session.scrub_to_pixel(120.0);
    let state = states.get(&id).expect("animated shape has a state");
    assert!((state.rotation - 180.0).abs() < 1e-9);

    // The authored model is untouched by seeking.
    assert_eq!(session.shape(id).unwrap().common().rotation, 0.0);

    // One full cycle later the state repeats.
    let again = session.seek(3.0);
    assert!((again[&id].rotation - 180.0).abs() < 1e-9);
}

#[test]
fn animations_require_an_existing_shape_and_die_with_it() {
    let mut session = session();
    let id = session.add_shape(|id| Shape::rect(id, 0.0, 0.0, 50.0, 50.0));

    let missing = AnimationDefinition::spin(999, 2.0, 360.0, Direction::Clockwise);
    assert!(session.upsert_animation(missing).is_err());

    let def = AnimationDefinition::spin(id, 2.0, 360.0, Direction::Clockwise);
    let anim_id = def.id;
    session.upsert_animation(def).unwrap();
    assert_eq!(session.animations().count(), 1);

    session.remove_shape(id).unwrap();
    assert_eq!(session.animations().count(), 0, "orphaned animation removed");
    let rec = session.delegate();
    assert_eq!(rec.animation_events.last().unwrap(), &(anim_id, false));
}

#[test]
fn removing_a_selected_shape_updates_the_selection() {
    let mut session = session();
    let a = session.add_shape(|id| Shape::rect(id, 0.0, 0.0, 20.0, 20.0));
    let b = session.add_shape(|id| Shape::rect(id, 100.0, 0.0, 20.0, 20.0));
    session.select_all();

    session.remove_shape(a).unwrap();
    assert_eq!(session.selection().ids(), &[b]);
    assert!(session.shape(a).is_none());
    assert!(session.begin_anchor_drag(AnchorKind::Side(Side::Top), Point::ZERO).is_ok());
}

#[test]
fn hit_test_prefers_topmost_shape() {
    let mut session = session();
    let below = session.add_shape(|id| Shape::rect(id, 0.0, 0.0, 100.0, 100.0));
    let above = session.add_shape(|id| Shape::rect(id, 20.0, 0.0, 100.0, 100.0));

    assert_eq!(session.hit_test(Point::new(25.0, 0.0)), Some(above));
    assert_eq!(session.hit_test(Point::new(-45.0, 0.0)), Some(below));
    assert_eq!(session.hit_test(Point::new(500.0, 500.0)), None);
}
