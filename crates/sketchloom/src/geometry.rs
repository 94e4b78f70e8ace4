//! Core geometry types for sketchloom.
//!
//! ## Rust Lesson #3: Structs & Derives
//!
//! `#[derive(...)]` auto-generates common functionality:
//! - `Copy` = points are small stack values, passed around by value
//! - `PartialEq` = exact comparison; use [`Point::approx_eq`] for tolerance
//! - `Serialize`/`Deserialize` = points can appear in configs and JSON output

use std::ops::{Add, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

/// Magnitude below which a vector has no usable direction.
pub const DIRECTION_EPSILON: f64 = 1e-9;

/// A 2D point (or vector) with x,y coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// A 3D point. Planar sketches produce `z = 0`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// A line segment defined by two endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

/// Anything that can be stored in a [`crate::path::Path`].
///
/// The accumulator only needs to know how far apart two consecutive
/// points are, so 2D and 3D paths share one implementation.
pub trait PathPoint: Copy {
    fn distance_to(&self, other: &Self) -> f64;
}

// ============================================================================
// IMPLEMENTATIONS
// ============================================================================

impl Point {
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Unit vector pointing at `angle` radians.
    #[inline]
    pub fn from_angle(angle: f64) -> Self {
        Self::new(angle.cos(), angle.sin())
    }

    /// Distance to another point.
    #[inline]
    pub fn distance(&self, other: Point) -> f64 {
        (*self - other).length()
    }

    #[inline]
    pub fn length(&self) -> f64 {
        self.length_squared().sqrt()
    }

    #[inline]
    pub fn length_squared(&self) -> f64 {
        self.x * self.x + self.y * self.y
    }

    #[inline]
    pub fn dot(&self, other: Point) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// z-component of the 3D cross product. Positive when `other` lies
    /// counter-clockwise of `self` (in a y-up frame).
    #[inline]
    pub fn cross(&self, other: Point) -> f64 {
        self.x * other.y - self.y * other.x
    }

    /// The vector rotated 90 degrees: `(-y, x)`.
    #[inline]
    pub fn perpendicular(&self) -> Point {
        Point::new(-self.y, self.x)
    }

    /// Unit vector in the same direction, or `None` when the magnitude
    /// is at or below `min_length`.
    ///
    /// ## Rust Lesson #12: Option instead of NaN
    ///
    /// Dividing by a near-zero length would silently produce NaN or
    /// huge values. Returning `Option` forces the caller to decide what a
    /// degenerate direction means.
    #[inline]
    pub fn normalized(&self, min_length: f64) -> Option<Point> {
        let len = self.length();
        if len > min_length {
            Some(Point::new(self.x / len, self.y / len))
        } else {
            None
        }
    }

    /// Rotate about the origin by `angle` radians.
    #[inline]
    pub fn rotate(&self, angle: f64) -> Point {
        let (sin, cos) = angle.sin_cos();
        Point::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }

    /// Rotate about `center` by `angle` radians.
    #[inline]
    pub fn rotate_about(&self, center: Point, angle: f64) -> Point {
        (*self - center).rotate(angle) + center
    }

    /// Scale the offset from `center` by `factor`.
    #[inline]
    pub fn scale_about(&self, center: Point, factor: f64) -> Point {
        (*self - center) * factor + center
    }

    /// Positional equality within a tolerance.
    #[inline]
    pub fn approx_eq(&self, other: Point, tolerance: f64) -> bool {
        self.distance(other) <= tolerance
    }
}

impl Add for Point {
    type Output = Point;
    #[inline]
    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;
    #[inline]
    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point {
    type Output = Point;
    #[inline]
    fn mul(self, rhs: f64) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Point {
    type Output = Point;
    #[inline]
    fn neg(self) -> Point {
        Point::new(-self.x, -self.y)
    }
}

impl Point3 {
    #[inline]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Drop the z coordinate.
    #[inline]
    pub fn xy(&self) -> Point {
        Point::new(self.x, self.y)
    }

    #[inline]
    pub fn distance(&self, other: Point3) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    #[inline]
    pub fn scale(&self, factor: f64) -> Point3 {
        Point3::new(self.x * factor, self.y * factor, self.z * factor)
    }

    /// Rotate about the x axis.
    #[inline]
    pub fn rotate_x(&self, angle: f64) -> Point3 {
        let (sin, cos) = angle.sin_cos();
        Point3::new(self.x, self.y * cos - self.z * sin, self.y * sin + self.z * cos)
    }

    /// Rotate about the y axis.
    #[inline]
    pub fn rotate_y(&self, angle: f64) -> Point3 {
        let (sin, cos) = angle.sin_cos();
        Point3::new(self.x * cos + self.z * sin, self.y, -self.x * sin + self.z * cos)
    }

    /// Rotate about the z axis.
    #[inline]
    pub fn rotate_z(&self, angle: f64) -> Point3 {
        let (sin, cos) = angle.sin_cos();
        Point3::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos, self.z)
    }

    #[inline]
    pub fn approx_eq(&self, other: Point3, tolerance: f64) -> bool {
        self.distance(other) <= tolerance
    }
}

impl From<Point> for Point3 {
    #[inline]
    fn from(p: Point) -> Self {
        Point3::new(p.x, p.y, 0.0)
    }
}

impl PathPoint for Point {
    #[inline]
    fn distance_to(&self, other: &Self) -> f64 {
        self.distance(*other)
    }
}

impl PathPoint for Point3 {
    #[inline]
    fn distance_to(&self, other: &Self) -> f64 {
        self.distance(*other)
    }
}

impl Line {
    #[inline]
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    #[inline]
    pub fn from_points(start: Point, end: Point) -> Self {
        Self::new(start.x, start.y, end.x, end.y)
    }

    #[inline]
    pub fn start(&self) -> Point {
        Point::new(self.x1, self.y1)
    }

    #[inline]
    pub fn end(&self) -> Point {
        Point::new(self.x2, self.y2)
    }

    /// Length of the line segment.
    #[inline]
    pub fn length(&self) -> f64 {
        self.start().distance(self.end())
    }
}

/// Re-map `value` from `[start1, stop1]` to `[start2, stop2]` (unclamped).
#[inline]
pub fn map_range(value: f64, start1: f64, stop1: f64, start2: f64, stop2: f64) -> f64 {
    start2 + (stop2 - start2) * ((value - start1) / (stop1 - start1))
}
