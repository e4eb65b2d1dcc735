//! The document model: shapes, layers, and attribute patches.
//!
//! Coordinate convention: a shape's `x, y` is its **center** and rotation
//! is about that center, stored in degrees and unbounded. Layer-local
//! coordinates are taken relative to the layer's center.
//!
//! Mutation flows exclusively through [`AttrPatch`] values: the transform
//! controllers emit partial patches and the host (or the editor session)
//! applies them. No controller ever holds a mutable reference to a shape.

use serde::{Deserialize, Serialize};
use stagekit_core::constants::{MIN_LAYER_SIZE, MIN_SHAPE_SIZE};
use stagekit_core::{rect_corners, rotate_around, Bounds, Point};

/// Shared attributes every shape kind carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeCommon {
    pub id: u64,
    /// Center X.
    pub x: f64,
    /// Center Y.
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Rotation about the center, degrees, unbounded.
    #[serde(default)]
    pub rotation: f64,
    #[serde(default)]
    pub fill: String,
    #[serde(default = "default_true")]
    pub draggable: bool,
}

fn default_true() -> bool {
    true
}

/// Star-specific attributes on top of the common set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StarAttrs {
    pub num_points: u32,
    pub inner_radius: f64,
    pub outer_radius: f64,
}

/// A drawable primitive on the design surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Shape {
    Rect { common: ShapeCommon },
    Ellipse { common: ShapeCommon },
    Star { common: ShapeCommon, star: StarAttrs },
}

impl Shape {
    /// Creates a rectangle centered at `(x, y)`. Dimensions are clamped to
    /// the shape minimum.
    pub fn rect(id: u64, x: f64, y: f64, width: f64, height: f64) -> Shape {
        Shape::Rect {
            common: ShapeCommon::sized(id, x, y, width, height),
        }
    }

    /// Creates an ellipse centered at `(x, y)`.
    pub fn ellipse(id: u64, x: f64, y: f64, width: f64, height: f64) -> Shape {
        Shape::Ellipse {
            common: ShapeCommon::sized(id, x, y, width, height),
        }
    }

    /// Creates a star centered at `(x, y)`. Its box is twice the outer
    /// radius per side.
    pub fn star(id: u64, x: f64, y: f64, num_points: u32, inner_radius: f64, outer_radius: f64) -> Shape {
        let side = (outer_radius * 2.0).max(MIN_SHAPE_SIZE);
        Shape::Star {
            common: ShapeCommon::sized(id, x, y, side, side),
            star: StarAttrs {
                num_points,
                inner_radius,
                outer_radius,
            },
        }
    }

    pub fn common(&self) -> &ShapeCommon {
        match self {
            Shape::Rect { common } => common,
            Shape::Ellipse { common } => common,
            Shape::Star { common, .. } => common,
        }
    }

    pub fn common_mut(&mut self) -> &mut ShapeCommon {
        match self {
            Shape::Rect { common } => common,
            Shape::Ellipse { common } => common,
            Shape::Star { common, .. } => common,
        }
    }

    pub fn id(&self) -> u64 {
        self.common().id
    }

    pub fn center(&self) -> Point {
        let c = self.common();
        Point::new(c.x, c.y)
    }

    pub fn rotation(&self) -> f64 {
        self.common().rotation
    }

    /// The four corners of the shape's box after rotation.
    pub fn rotated_corners(&self) -> [Point; 4] {
        let c = self.common();
        rect_corners(self.center(), c.width, c.height, c.rotation.to_radians())
    }

    /// Axis-aligned bounds of the rotated box. Used for hit tests,
    /// marquee intersection, and multi-select bbox derivation.
    pub fn axis_aligned_bounds(&self) -> Bounds {
        Bounds::from_points(self.rotated_corners()).expect("four corners are never empty")
    }

    /// Whether a world-space point falls inside the shape, testing in the
    /// shape's rotated local frame.
    pub fn contains_point(&self, p: Point) -> bool {
        let c = self.common();
        let local = rotate_around(self.center(), p, -c.rotation.to_radians()) - self.center();
        let hw = c.width / 2.0;
        let hh = c.height / 2.0;
        match self {
            Shape::Rect { .. } => local.x.abs() <= hw && local.y.abs() <= hh,
            Shape::Ellipse { .. } => {
                let nx = local.x / hw;
                let ny = local.y / hh;
                nx * nx + ny * ny <= 1.0
            }
            // The box is a close-enough hit region for a star.
            Shape::Star { .. } => local.x.abs() <= hw && local.y.abs() <= hh,
        }
    }

    /// Applies a partial attribute patch, clamping dimensions to the
    /// shape minimum.
    pub fn apply_patch(&mut self, patch: &AttrPatch) {
        self.common_mut().apply_patch(patch, MIN_SHAPE_SIZE);
    }
}

impl ShapeCommon {
    fn sized(id: u64, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            id,
            x,
            y,
            width: width.max(MIN_SHAPE_SIZE),
            height: height.max(MIN_SHAPE_SIZE),
            rotation: 0.0,
            fill: String::new(),
            draggable: true,
        }
    }

    fn apply_patch(&mut self, patch: &AttrPatch, min_size: f64) {
        if let Some(x) = patch.x {
            self.x = x;
        }
        if let Some(y) = patch.y {
            self.y = y;
        }
        if let Some(width) = patch.width {
            self.width = width.max(min_size);
        }
        if let Some(height) = patch.height {
            self.height = height.max(min_size);
        }
        if let Some(rotation) = patch.rotation {
            self.rotation = rotation;
        }
        if let Some(ref fill) = patch.fill {
            self.fill = fill.clone();
        }
        if let Some(draggable) = patch.draggable {
            self.draggable = draggable;
        }
    }
}

/// A rectangular container for shapes. Shares the center-based coordinate
/// convention; its minimum size is larger than a free shape's.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub id: u64,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub rotation: f64,
    /// Child shape ids in draw order. A shape belongs to at most one layer.
    #[serde(default)]
    pub children: Vec<u64>,
    #[serde(default = "default_true")]
    pub show_border: bool,
    /// Timeline length for this layer's animations, seconds.
    pub duration: f64,
}

impl Layer {
    pub fn new(id: u64, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            id,
            x,
            y,
            width: width.max(MIN_LAYER_SIZE),
            height: height.max(MIN_LAYER_SIZE),
            rotation: 0.0,
            children: Vec::new(),
            show_border: true,
            duration: stagekit_core::constants::DEFAULT_LAYER_DURATION,
        }
    }

    pub fn center(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn rotated_corners(&self) -> [Point; 4] {
        rect_corners(self.center(), self.width, self.height, self.rotation.to_radians())
    }

    pub fn axis_aligned_bounds(&self) -> Bounds {
        Bounds::from_points(self.rotated_corners()).expect("four corners are never empty")
    }

    /// Converts a world point into this layer's local frame: relative to
    /// the layer center, with the layer's rotation removed.
    pub fn to_local(&self, world: Point) -> Point {
        rotate_around(self.center(), world, -self.rotation.to_radians()) - self.center()
    }

    /// Inverse of [`Self::to_local`].
    pub fn to_world(&self, local: Point) -> Point {
        rotate_around(self.center(), local + self.center(), self.rotation.to_radians())
    }

    pub fn apply_patch(&mut self, patch: &AttrPatch) {
        if let Some(x) = patch.x {
            self.x = x;
        }
        if let Some(y) = patch.y {
            self.y = y;
        }
        if let Some(width) = patch.width {
            self.width = width.max(MIN_LAYER_SIZE);
        }
        if let Some(height) = patch.height {
            self.height = height.max(MIN_LAYER_SIZE);
        }
        if let Some(rotation) = patch.rotation {
            self.rotation = rotation;
        }
    }
}

/// A partial attribute update, the only mutation currency of the editor.
///
/// Controllers emit patches; the host's `on_change` receives
/// `(entity_id, patch)` once per completed gesture step and never a full
/// object replace.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AttrPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub draggable: Option<bool>,
}

impl AttrPatch {
    pub fn is_empty(&self) -> bool {
        *self == AttrPatch::default()
    }

    pub fn position(x: f64, y: f64) -> Self {
        AttrPatch {
            x: Some(x),
            y: Some(y),
            ..Default::default()
        }
    }

    pub fn rotation(rotation: f64) -> Self {
        AttrPatch {
            rotation: Some(rotation),
            ..Default::default()
        }
    }

    /// Folds `other` over `self`; later values win per field.
    pub fn merged(&self, other: &AttrPatch) -> AttrPatch {
        AttrPatch {
            x: other.x.or(self.x),
            y: other.y.or(self.y),
            width: other.width.or(self.width),
            height: other.height.or(self.height),
            rotation: other.rotation.or(self.rotation),
            fill: other.fill.clone().or_else(|| self.fill.clone()),
            draggable: other.draggable.or(self.draggable),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimensions_clamp_to_minimum() {
        let shape = Shape::rect(1, 0.0, 0.0, 1.0, -3.0);
        assert_eq!(shape.common().width, MIN_SHAPE_SIZE);
        assert_eq!(shape.common().height, MIN_SHAPE_SIZE);

        let layer = Layer::new(2, 0.0, 0.0, 10.0, 10.0);
        assert_eq!(layer.width, MIN_LAYER_SIZE);
        assert_eq!(layer.height, MIN_LAYER_SIZE);
    }

    #[test]
    fn patch_cannot_shrink_below_minimum() {
        let mut shape = Shape::rect(1, 0.0, 0.0, 100.0, 100.0);
        shape.apply_patch(&AttrPatch {
            width: Some(0.1),
            ..Default::default()
        });
        assert_eq!(shape.common().width, MIN_SHAPE_SIZE);
        assert_eq!(shape.common().height, 100.0);
    }

    #[test]
    fn axis_aligned_bounds_of_unrotated_rect() {
        let shape = Shape::rect(1, 100.0, 50.0, 40.0, 20.0);
        let b = shape.axis_aligned_bounds();
        assert_eq!(b, Bounds::new(80.0, 40.0, 120.0, 60.0));
    }

    #[test]
    fn rotated_bounds_grow() {
        let mut shape = Shape::rect(1, 0.0, 0.0, 10.0, 10.0);
        shape.common_mut().rotation = 45.0;
        let b = shape.axis_aligned_bounds();
        assert!((b.width() - 10.0 * std::f64::consts::SQRT_2).abs() < 1e-9);
    }

    #[test]
    fn contains_point_respects_rotation() {
        let mut shape = Shape::rect(1, 0.0, 0.0, 40.0, 10.0);
        shape.common_mut().rotation = 90.0;
        // After rotating the wide rect upright, a point above center is
        // inside and a point far to the right is not.
        assert!(shape.contains_point(Point::new(0.0, 15.0)));
        assert!(!shape.contains_point(Point::new(15.0, 0.0)));
    }

    #[test]
    fn ellipse_excludes_box_corner() {
        let shape = Shape::ellipse(1, 0.0, 0.0, 20.0, 20.0);
        assert!(shape.contains_point(Point::new(0.0, 9.9)));
        assert!(!shape.contains_point(Point::new(9.0, 9.0)));
    }

    #[test]
    fn layer_local_round_trip() {
        let mut layer = Layer::new(1, 200.0, 100.0, 100.0, 80.0);
        layer.rotation = 30.0;
        let world = Point::new(231.0, 77.5);
        let back = layer.to_world(layer.to_local(world));
        assert!(back.distance_to(&world) < 1e-9);
    }

    #[test]
    fn patch_merge_prefers_later_values() {
        let a = AttrPatch::position(1.0, 2.0);
        let b = AttrPatch {
            x: Some(9.0),
            rotation: Some(45.0),
            ..Default::default()
        };
        let m = a.merged(&b);
        assert_eq!(m.x, Some(9.0));
        assert_eq!(m.y, Some(2.0));
        assert_eq!(m.rotation, Some(45.0));
    }
}
