//! Stage view transform: world to screen under pan and zoom.
//!
//! Pure conversions, independent of any rendering library. Screen space is
//! y-down; `screen = (world + translate) * scale` and the inverse exactly
//! undoes it.

use serde::{Deserialize, Serialize};
use stagekit_core::constants::{MAX_VIEW_SCALE, MIN_VIEW_SCALE};
use stagekit_core::Point;

/// The stage's pan/zoom state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewTransform {
    pub scale: f64,
    pub translate_x: f64,
    pub translate_y: f64,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            scale: 1.0,
            translate_x: 0.0,
            translate_y: 0.0,
        }
    }
}

impl ViewTransform {
    pub fn new(scale: f64, translate_x: f64, translate_y: f64) -> Self {
        Self {
            scale: scale.clamp(MIN_VIEW_SCALE, MAX_VIEW_SCALE),
            translate_x,
            translate_y,
        }
    }

    pub fn world_to_screen(&self, p: Point) -> Point {
        Point::new(
            (p.x + self.translate_x) * self.scale,
            (p.y + self.translate_y) * self.scale,
        )
    }

    pub fn screen_to_world(&self, p: Point) -> Point {
        Point::new(
            p.x / self.scale - self.translate_x,
            p.y / self.scale - self.translate_y,
        )
    }

    /// A screen-space pixel delta expressed in world units.
    pub fn screen_delta_to_world(&self, delta: Point) -> Point {
        delta / self.scale
    }

    pub fn pan_by(&mut self, world_dx: f64, world_dy: f64) {
        self.translate_x += world_dx;
        self.translate_y += world_dy;
    }

    pub fn set_scale(&mut self, scale: f64) {
        self.scale = scale.clamp(MIN_VIEW_SCALE, MAX_VIEW_SCALE);
    }

    /// Zooms so the world point under `screen_point` stays put.
    pub fn zoom_at(&mut self, screen_point: Point, new_scale: f64) {
        let new_scale = new_scale.clamp(MIN_VIEW_SCALE, MAX_VIEW_SCALE);
        let anchor = self.screen_to_world(screen_point);
        self.scale = new_scale;
        self.translate_x = screen_point.x / new_scale - anchor.x;
        self.translate_y = screen_point.y / new_scale - anchor.y;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn screen_round_trip_is_exact_inverse() {
        let view = ViewTransform::new(2.5, 40.0, -12.0);
        let p = Point::new(123.0, -7.5);
        let back = view.screen_to_world(view.world_to_screen(p));
        assert!(back.distance_to(&p) < 1e-9);
    }

    #[test]
    fn identity_transform_is_a_no_op() {
        let view = ViewTransform::default();
        let p = Point::new(10.0, 20.0);
        assert_eq!(view.world_to_screen(p), p);
    }

    #[test]
    fn scale_is_clamped() {
        let view = ViewTransform::new(100.0, 0.0, 0.0);
        assert_eq!(view.scale, MAX_VIEW_SCALE);
        let view = ViewTransform::new(0.0, 0.0, 0.0);
        assert_eq!(view.scale, MIN_VIEW_SCALE);
    }

    #[test]
    fn zoom_at_keeps_pointer_world_position() {
        let mut view = ViewTransform::new(1.0, 15.0, 30.0);
        let pointer = Point::new(300.0, 200.0);
        let before = view.screen_to_world(pointer);
        view.zoom_at(pointer, 3.0);
        let after = view.screen_to_world(pointer);
        assert!(after.distance_to(&before) < 1e-9);
    }

    #[test]
    fn screen_delta_scales_down_with_zoom() {
        let view = ViewTransform::new(2.0, 0.0, 0.0);
        let d = view.screen_delta_to_world(Point::new(10.0, -4.0));
        assert_eq!(d, Point::new(5.0, -2.0));
    }
}
