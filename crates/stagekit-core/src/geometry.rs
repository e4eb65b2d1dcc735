//! 2D geometry primitives.
//!
//! Screen convention throughout: x grows right, y grows down, angles in
//! radians grow clockwise. Rotations are stored on entities in degrees and
//! converted at the point of use.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Neg, Sub};

/// A 2D point (or vector) with X and Y coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Creates a new point with the given X and Y coordinates.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    /// Calculates the distance to another point.
    pub fn distance_to(&self, other: &Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    /// Length of this point treated as a vector from the origin.
    pub fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Angle of this point treated as a vector from the origin, via `atan2`.
    pub fn angle(&self) -> f64 {
        self.y.atan2(self.x)
    }

    /// Rotates this point treated as a vector by `angle_rad` around the origin.
    pub fn rotated(&self, angle_rad: f64) -> Point {
        rotate_around(Point::ZERO, *self, angle_rad)
    }
}

impl Add for Point {
    type Output = Point;
    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;
    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point {
    type Output = Point;
    fn mul(self, rhs: f64) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

impl Div<f64> for Point {
    type Output = Point;
    fn div(self, rhs: f64) -> Point {
        Point::new(self.x / rhs, self.y / rhs)
    }
}

impl Neg for Point {
    type Output = Point;
    fn neg(self) -> Point {
        Point::new(-self.x, -self.y)
    }
}

/// Rotates `point` around `pivot` by `angle_rad`.
///
/// This is the single primitive behind every rotated-corner computation:
/// the offset from the pivot is re-expressed in polar form and its angle
/// advanced by `angle_rad`.
pub fn rotate_around(pivot: Point, point: Point, angle_rad: f64) -> Point {
    let offset = point - pivot;
    let distance = offset.length();
    if distance < f64::EPSILON {
        return pivot;
    }
    let angle = angle_rad + offset.y.atan2(offset.x);
    Point::new(
        pivot.x + distance * angle.cos(),
        pivot.y + distance * angle.sin(),
    )
}

/// The four corners of a centered rectangle after rotation, in order
/// top-left, top-right, bottom-right, bottom-left.
pub fn rect_corners(center: Point, width: f64, height: f64, rotation_rad: f64) -> [Point; 4] {
    let hw = width / 2.0;
    let hh = height / 2.0;
    [
        rotate_around(center, Point::new(center.x - hw, center.y - hh), rotation_rad),
        rotate_around(center, Point::new(center.x + hw, center.y - hh), rotation_rad),
        rotate_around(center, Point::new(center.x + hw, center.y + hh), rotation_rad),
        rotate_around(center, Point::new(center.x - hw, center.y + hh), rotation_rad),
    ]
}

/// Normalizes an angle in degrees into (-180, 180].
///
/// All angle differences must pass through this before use; otherwise a
/// drag crossing the +-180 boundary produces a ~360 degree jump.
pub fn normalize_deg(angle: f64) -> f64 {
    let r = angle.rem_euclid(360.0);
    if r > 180.0 {
        r - 360.0
    } else {
        r
    }
}

/// Normalizes an angle in radians into (-PI, PI].
pub fn normalize_rad(angle: f64) -> f64 {
    let r = angle.rem_euclid(std::f64::consts::TAU);
    if r > std::f64::consts::PI {
        r - std::f64::consts::TAU
    } else {
        r
    }
}

/// An axis-aligned bounding rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// The tightest bounds enclosing all given points. `None` when empty.
    pub fn from_points(points: impl IntoIterator<Item = Point>) -> Option<Bounds> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut b = Bounds::new(first.x, first.y, first.x, first.y);
        for p in iter {
            b.min_x = b.min_x.min(p.x);
            b.min_y = b.min_y.min(p.y);
            b.max_x = b.max_x.max(p.x);
            b.max_y = b.max_y.max(p.y);
        }
        Some(b)
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    /// The smallest bounds enclosing both `self` and `other`.
    pub fn union(&self, other: &Bounds) -> Bounds {
        Bounds::new(
            self.min_x.min(other.min_x),
            self.min_y.min(other.min_y),
            self.max_x.max(other.max_x),
            self.max_y.max(other.max_y),
        )
    }

    pub fn contains_point(&self, p: Point) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }

    /// Whether `other` lies entirely inside `self`.
    pub fn contains(&self, other: &Bounds) -> bool {
        other.min_x >= self.min_x
            && other.min_y >= self.min_y
            && other.max_x <= self.max_x
            && other.max_y <= self.max_y
    }

    pub fn intersects(&self, other: &Bounds) -> bool {
        self.min_x < other.max_x
            && self.max_x > other.min_x
            && self.min_y < other.max_y
            && self.max_y > other.min_y
    }
}
