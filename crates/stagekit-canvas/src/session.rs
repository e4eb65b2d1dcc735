//! The editor session: one explicit context object tying the document
//! model, selection, view transform, transform controllers, and the
//! animation timeline together.
//!
//! The session owns all interaction state. The host wires pointer events
//! in and receives every mutation back through [`SessionDelegate`] as
//! `(entity_id, AttrPatch)` pairs; nothing reaches into the model behind
//! the delegate's back. `release_pointer` is the single cleanup path and
//! must be hooked to window-level `pointerup`, `blur`, and `mouseleave`.

use std::collections::HashMap;

use stagekit_core::constants::MIN_LAYER_SIZE;
use stagekit_core::{Bounds, Point, Result, StageError};
use stagekit_timeline::{AnimatedState, AnimationDefinition, AnimationEngine, TimelineScrubber};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::anchor::{AnchorKind, DragState};
use crate::model::{AttrPatch, Layer, Shape};
use crate::multi_select::{selection_bounds, BoundingBox, MultiSelectionTransformController};
use crate::selection::Selection;
use crate::transform::{ShapeSnapshot, ShapeTransformController};
use crate::viewport::ViewTransform;

/// Host callbacks. Every model mutation and selection change flows out
/// through these, so the host's store stays the source of truth for
/// persistence and undo.
pub trait SessionDelegate {
    /// A partial attribute update for one shape or layer.
    fn on_change(&mut self, id: u64, patch: &AttrPatch) {
        let _ = (id, patch);
    }

    /// The selected id set changed.
    fn on_select(&mut self, ids: &[u64]) {
        let _ = ids;
    }

    /// An animation definition was added, replaced, or removed.
    fn on_animation_change(&mut self, id: Uuid, def: Option<&AnimationDefinition>) {
        let _ = (id, def);
    }
}

/// A delegate that ignores everything, for headless use and tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullDelegate;

impl SessionDelegate for NullDelegate {}

/// Timeline scrubber width used until the host reports a real one.
const DEFAULT_SCRUBBER_WIDTH: f64 = 600.0;

pub struct EditorSession<D: SessionDelegate> {
    shapes: HashMap<u64, Shape>,
    /// Shape ids bottom to top.
    draw_order: Vec<u64>,
    layers: HashMap<u64, Layer>,
    selection: Selection,
    view: ViewTransform,
    stage: Bounds,
    shape_ctl: ShapeTransformController,
    layer_ctl: ShapeTransformController,
    group_ctl: MultiSelectionTransformController,
    /// Body drag: snapshots of every selected shape at drag start.
    move_drag: DragState<Vec<(u64, ShapeSnapshot)>>,
    /// The layer the layer controller is currently driving.
    dragged_layer: Option<u64>,
    scrubber: TimelineScrubber,
    engine: AnimationEngine,
    delegate: D,
    next_id: u64,
}

impl<D: SessionDelegate> EditorSession<D> {
    pub fn new(stage: Bounds, delegate: D) -> Self {
        Self {
            shapes: HashMap::new(),
            draw_order: Vec::new(),
            layers: HashMap::new(),
            selection: Selection::new(),
            view: ViewTransform::default(),
            stage,
            shape_ctl: ShapeTransformController::new(),
            layer_ctl: ShapeTransformController::with_min_size(MIN_LAYER_SIZE),
            group_ctl: MultiSelectionTransformController::new(),
            move_drag: DragState::Idle,
            dragged_layer: None,
            scrubber: TimelineScrubber::new(
                DEFAULT_SCRUBBER_WIDTH,
                stagekit_core::constants::DEFAULT_LAYER_DURATION,
            ),
            engine: AnimationEngine::new(),
            delegate,
            next_id: 1,
        }
    }

    pub fn stage(&self) -> &Bounds {
        &self.stage
    }

    pub fn view(&self) -> &ViewTransform {
        &self.view
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn scrubber(&self) -> &TimelineScrubber {
        &self.scrubber
    }

    pub fn delegate(&self) -> &D {
        &self.delegate
    }

    pub fn delegate_mut(&mut self) -> &mut D {
        &mut self.delegate
    }

    fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    // ---- document -------------------------------------------------------

    /// Inserts a shape at the top of the draw order, assigning it a fresh
    /// id. Returns the id.
    pub fn add_shape(&mut self, build: impl FnOnce(u64) -> Shape) -> u64 {
        let id = self.allocate_id();
        let shape = build(id);
        debug_assert_eq!(shape.id(), id);
        info!(id, "shape added");
        self.shapes.insert(id, shape);
        self.draw_order.push(id);
        id
    }

    pub fn add_layer(&mut self, x: f64, y: f64, width: f64, height: f64) -> u64 {
        let id = self.allocate_id();
        self.layers.insert(id, Layer::new(id, x, y, width, height));
        id
    }

    /// Removes a shape, its selection membership, layer membership, and
    /// every animation targeting it.
    pub fn remove_shape(&mut self, id: u64) -> Result<Shape> {
        let shape = self
            .shapes
            .remove(&id)
            .ok_or(StageError::UnknownEntity { id })?;
        self.draw_order.retain(|&s| s != id);
        for layer in self.layers.values_mut() {
            layer.children.retain(|&s| s != id);
        }
        let orphaned: Vec<Uuid> = self
            .engine
            .definitions()
            .filter(|d| d.shape_id == id)
            .map(|d| d.id)
            .collect();
        for anim_id in orphaned {
            self.engine.remove(anim_id);
            self.delegate.on_animation_change(anim_id, None);
        }
        if self.selection.remove(id) {
            self.delegate.on_select(self.selection.ids());
        }
        info!(id, "shape removed");
        Ok(shape)
    }

    pub fn shape(&self, id: u64) -> Option<&Shape> {
        self.shapes.get(&id)
    }

    pub fn layer(&self, id: u64) -> Option<&Layer> {
        self.layers.get(&id)
    }

    pub fn shapes(&self) -> impl Iterator<Item = &Shape> {
        self.draw_order.iter().filter_map(|id| self.shapes.get(id))
    }

    /// Moves a shape into a layer's child list. A shape belongs to at most
    /// one layer, so it is detached from any previous one first.
    pub fn attach_to_layer(&mut self, shape_id: u64, layer_id: u64) -> Result<()> {
        if !self.shapes.contains_key(&shape_id) {
            return Err(StageError::UnknownEntity { id: shape_id });
        }
        if !self.layers.contains_key(&layer_id) {
            return Err(StageError::UnknownEntity { id: layer_id });
        }
        for layer in self.layers.values_mut() {
            layer.children.retain(|&s| s != shape_id);
        }
        if let Some(layer) = self.layers.get_mut(&layer_id) {
            layer.children.push(shape_id);
        }
        Ok(())
    }

    pub fn detach_from_layer(&mut self, shape_id: u64, layer_id: u64) -> Result<()> {
        let layer = self
            .layers
            .get_mut(&layer_id)
            .ok_or(StageError::UnknownEntity { id: layer_id })?;
        let before = layer.children.len();
        layer.children.retain(|&s| s != shape_id);
        if layer.children.len() == before {
            return Err(StageError::NotAChild { shape_id, layer_id });
        }
        Ok(())
    }

    /// Applies a patch to a shape or layer directly (property panel edits),
    /// bypassing gesture state but still notifying the delegate.
    pub fn apply_patch(&mut self, id: u64, patch: &AttrPatch) -> Result<()> {
        if let Some(shape) = self.shapes.get_mut(&id) {
            shape.apply_patch(patch);
        } else if let Some(layer) = self.layers.get_mut(&id) {
            layer.apply_patch(patch);
        } else {
            return Err(StageError::UnknownEntity { id });
        }
        self.delegate.on_change(id, patch);
        Ok(())
    }

    // ---- selection ------------------------------------------------------

    /// Topmost shape containing the world point, if any.
    pub fn hit_test(&self, world: Point) -> Option<u64> {
        self.draw_order
            .iter()
            .rev()
            .filter_map(|id| self.shapes.get(id))
            .find(|s| s.contains_point(world))
            .map(|s| s.id())
    }

    /// Click selection. A plain click replaces the selection; `additive`
    /// (shift) toggles membership. Clicking empty stage clears.
    pub fn select_at(&mut self, pointer_screen: Point, additive: bool) {
        let world = self.view.screen_to_world(pointer_screen);
        let changed = match self.hit_test(world) {
            Some(id) if additive => self.selection.toggle(id),
            Some(id) => self.selection.select(id),
            None if additive => false,
            None => self.selection.clear(),
        };
        if changed {
            self.delegate.on_select(self.selection.ids());
        }
    }

    /// Marquee selection over a screen-space rectangle.
    pub fn select_in_rect(&mut self, screen_a: Point, screen_b: Point) {
        let a = self.view.screen_to_world(screen_a);
        let b = self.view.screen_to_world(screen_b);
        let marquee = Bounds::new(a.x.min(b.x), a.y.min(b.y), a.x.max(b.x), a.y.max(b.y));
        let bounds: Vec<(u64, Bounds)> = self
            .draw_order
            .iter()
            .filter_map(|id| self.shapes.get(id))
            .map(|s| (s.id(), s.axis_aligned_bounds()))
            .collect();
        if self
            .selection
            .select_in_rect(&marquee, bounds.iter().map(|(id, b)| (*id, b)))
        {
            self.delegate.on_select(self.selection.ids());
        }
    }

    pub fn select_all(&mut self) {
        if self.selection.select_all(self.draw_order.iter().copied()) {
            self.delegate.on_select(self.selection.ids());
        }
    }

    pub fn clear_selection(&mut self) {
        if self.selection.clear() {
            self.delegate.on_select(self.selection.ids());
        }
    }

    /// The selection's derived bounding box, from current geometry.
    pub fn selection_bbox(&self) -> Option<BoundingBox> {
        selection_bounds(
            self.selection
                .ids()
                .iter()
                .filter_map(|id| self.shapes.get(id)),
        )
    }

    // ---- gestures -------------------------------------------------------

    // Gestures are mutually exclusive across all controllers, not just
    // within one: a begin while any drag is live is rejected.
    fn ensure_idle(&self) -> Result<()> {
        if self.is_interacting() {
            warn!("gesture began while another drag was live; rejecting");
            return Err(StageError::GestureInProgress);
        }
        Ok(())
    }

    /// Starts an anchor gesture on the current selection: the single-shape
    /// controller for one shape, the group controller for several.
    pub fn begin_anchor_drag(&mut self, anchor: AnchorKind, pointer_screen: Point) -> Result<()> {
        self.ensure_idle()?;
        if self.selection.is_empty() {
            return Err(StageError::EmptySelection);
        }
        if self.selection.is_single() {
            let id = self.selection.ids()[0];
            let shape = self
                .shapes
                .get(&id)
                .ok_or(StageError::UnknownEntity { id })?;
            self.shape_ctl
                .begin(anchor, pointer_screen, ShapeSnapshot::from(shape), &self.view);
        } else {
            let members = self
                .selection
                .ids()
                .iter()
                .filter_map(|id| self.shapes.get(id));
            self.group_ctl
                .begin(anchor, pointer_screen, members, &self.view);
        }
        Ok(())
    }

    /// Starts an anchor gesture on a layer's own frame.
    pub fn begin_layer_drag(
        &mut self,
        layer_id: u64,
        anchor: AnchorKind,
        pointer_screen: Point,
    ) -> Result<()> {
        self.ensure_idle()?;
        let layer = self
            .layers
            .get(&layer_id)
            .ok_or(StageError::UnknownEntity { id: layer_id })?;
        self.layer_ctl
            .begin(anchor, pointer_screen, ShapeSnapshot::from(layer), &self.view);
        // Remember which layer the controller is driving.
        self.dragged_layer = Some(layer_id);
        Ok(())
    }

    /// Starts a body drag that moves every selected shape together.
    pub fn begin_move_drag(&mut self, pointer_screen: Point) -> Result<()> {
        self.ensure_idle()?;
        if self.selection.is_empty() {
            return Err(StageError::EmptySelection);
        }
        let starts: Vec<(u64, ShapeSnapshot)> = self
            .selection
            .ids()
            .iter()
            .filter_map(|id| self.shapes.get(id))
            .filter(|s| s.common().draggable)
            .map(|s| (s.id(), ShapeSnapshot::from(s)))
            .collect();
        if starts.is_empty() {
            return Err(StageError::EmptySelection);
        }
        self.move_drag.begin(AnchorKind::Body, pointer_screen, starts);
        Ok(())
    }

    /// Routes a pointer move to whichever gesture is live. Patches are
    /// validated against the stage, applied, and forwarded to the
    /// delegate; an out-of-stage candidate is silently dropped and the
    /// last applied geometry stands.
    pub fn pointer_move(&mut self, pointer_screen: Point) {
        if self.shape_ctl.is_dragging() {
            let id = match self.selection.ids().first() {
                Some(&id) => id,
                None => {
                    warn!("anchor drag live with empty selection; cancelling");
                    self.shape_ctl.cancel();
                    return;
                }
            };
            if let Some(patch) = self.shape_ctl.drag_move(pointer_screen, &self.view) {
                self.apply_if_in_stage(id, patch);
            }
        } else if self.group_ctl.is_dragging() {
            if let Some(patches) = self.group_ctl.drag_move(pointer_screen, &self.view, &self.stage)
            {
                for (id, patch) in patches {
                    self.apply_to_shape(id, &patch);
                }
            }
        } else if self.layer_ctl.is_dragging() {
            let Some(layer_id) = self.dragged_layer else {
                warn!("layer drag live with no layer recorded; cancelling");
                self.layer_ctl.cancel();
                return;
            };
            if let Some(patch) = self.layer_ctl.drag_move(pointer_screen, &self.view) {
                self.apply_layer_if_in_stage(layer_id, patch);
            }
        } else if self.move_drag.is_dragging() {
            self.move_pointer(pointer_screen);
        }
    }

    fn move_pointer(&mut self, pointer_screen: Point) {
        let Some(delta) = self.move_drag.update(pointer_screen) else {
            return;
        };
        let world = self.view.screen_delta_to_world(delta.total);
        let Some(session) = self.move_drag.session() else {
            return;
        };
        let patches: Vec<(u64, AttrPatch)> = session
            .start
            .iter()
            .map(|(id, s)| (*id, AttrPatch::position(s.x + world.x, s.y + world.y)))
            .collect();
        // Moving is all-or-nothing too: stop at the stage edge as a group.
        let all_inside = session.start.iter().zip(patches.iter()).all(|((_, s), (_, p))| {
            let moved = ShapeSnapshot {
                x: p.x.unwrap_or(s.x),
                y: p.y.unwrap_or(s.y),
                ..*s
            };
            self.stage.contains(&snapshot_bounds(&moved))
        });
        if !all_inside {
            return;
        }
        for (id, patch) in patches {
            self.apply_to_shape(id, &patch);
        }
    }

    /// Ends whatever gesture is live. This is the guaranteed cleanup path:
    /// hook it to window `pointerup`, `blur`, and `mouseleave`; calling it
    /// with nothing live is a no-op.
    pub fn release_pointer(&mut self) {
        self.shape_ctl.cancel();
        self.group_ctl.cancel();
        self.layer_ctl.cancel();
        self.move_drag.cancel();
        self.dragged_layer = None;
        debug!("pointer released; all gestures idle");
    }

    pub fn is_interacting(&self) -> bool {
        self.shape_ctl.is_dragging()
            || self.group_ctl.is_dragging()
            || self.layer_ctl.is_dragging()
            || self.move_drag.is_dragging()
    }

    fn apply_if_in_stage(&mut self, id: u64, patch: AttrPatch) {
        let Some(shape) = self.shapes.get(&id) else {
            return;
        };
        let candidate = patched(ShapeSnapshot::from(shape), &patch);
        if !self.stage.contains(&snapshot_bounds(&candidate)) {
            return;
        }
        self.apply_to_shape(id, &patch);
    }

    // Layers obey the same silent-discard policy as shapes.
    fn apply_layer_if_in_stage(&mut self, id: u64, patch: AttrPatch) {
        let Some(layer) = self.layers.get(&id) else {
            return;
        };
        let candidate = patched(ShapeSnapshot::from(layer), &patch);
        if !self.stage.contains(&snapshot_bounds(&candidate)) {
            return;
        }
        if let Some(layer) = self.layers.get_mut(&id) {
            layer.apply_patch(&patch);
            self.delegate.on_change(id, &patch);
        }
    }

    fn apply_to_shape(&mut self, id: u64, patch: &AttrPatch) {
        if let Some(shape) = self.shapes.get_mut(&id) {
            shape.apply_patch(patch);
            self.delegate.on_change(id, patch);
        }
    }

    // ---- view -----------------------------------------------------------

    pub fn pan_view(&mut self, world_dx: f64, world_dy: f64) {
        self.view.pan_by(world_dx, world_dy);
    }

    pub fn zoom_view_at(&mut self, pointer_screen: Point, new_scale: f64) {
        self.view.zoom_at(pointer_screen, new_scale);
    }

    // ---- timeline -------------------------------------------------------

    pub fn animations(&self) -> impl Iterator<Item = &AnimationDefinition> {
        self.engine.definitions()
    }

    /// Adds or replaces an animation. The target shape must exist.
    pub fn upsert_animation(&mut self, def: AnimationDefinition) -> Result<()> {
        if !self.shapes.contains_key(&def.shape_id) {
            return Err(StageError::UnknownEntity { id: def.shape_id });
        }
        if def.duration <= 0.0 {
            return Err(StageError::InvalidDefinition {
                reason: "duration must be positive".into(),
            });
        }
        let id = def.id;
        self.engine.upsert(def);
        let def = self.engine.definition(id);
        self.delegate.on_animation_change(id, def);
        Ok(())
    }

    pub fn remove_animation(&mut self, id: Uuid) -> Option<AnimationDefinition> {
        let removed = self.engine.remove(id);
        if removed.is_some() {
            self.delegate.on_animation_change(id, None);
        }
        removed
    }

    /// Scrubs the playhead to a scrubber pixel and evaluates every
    /// animation at that time. Pure with respect to the document: the
    /// returned states are render-time overlays, never written back into
    /// shape attributes.
    pub fn scrub_to_pixel(&mut self, pixel_x: f64) -> HashMap<u64, AnimatedState> {
        let t = self.scrubber.scrub_to(pixel_x);
        self.engine.seek_all(t)
    }

    pub fn seek(&self, t: f64) -> HashMap<u64, AnimatedState> {
        self.engine.seek_all(t)
    }

    pub fn zoom_timeline_at(&mut self, pixel_x: f64, new_zoom: f64) {
        self.scrubber.zoom_at(pixel_x, new_zoom);
    }

    pub fn pan_timeline(&mut self, delta_px: f64) {
        self.scrubber.pan_by(delta_px);
    }

    pub fn set_timeline_width(&mut self, width_px: f64) {
        self.scrubber.set_width(width_px);
    }

    pub fn set_timeline_duration(&mut self, total_duration: f64) {
        self.scrubber.set_total_duration(total_duration);
    }
}

fn patched(s: ShapeSnapshot, patch: &AttrPatch) -> ShapeSnapshot {
    ShapeSnapshot {
        x: patch.x.unwrap_or(s.x),
        y: patch.y.unwrap_or(s.y),
        width: patch.width.unwrap_or(s.width),
        height: patch.height.unwrap_or(s.height),
        rotation: patch.rotation.unwrap_or(s.rotation),
    }
}

fn snapshot_bounds(s: &ShapeSnapshot) -> Bounds {
    Bounds::from_points(stagekit_core::rect_corners(
        s.center(),
        s.width,
        s.height,
        s.rotation.to_radians(),
    ))
    .expect("four corners are never empty")
}
