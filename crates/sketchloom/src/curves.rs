//! Explicit parametric curves.
//!
//! Two families, both pure functions of their progress variable:
//!
//! - [`LissajousCurve`]: `x = A·sin(a·t + δ)`, `y = B·sin(b·t)`,
//!   `z = C·sin(c·t + φ)`, with an optional wave displaced along the normal.
//! - [`PolarCurve`]: `r(θ) = scale·(base + Σ Aᵢ·sin(fᵢ·θ + pᵢ))`, where
//!   `base = min_gap + Σ|Aᵢ|` keeps the radius positive.

use std::f64::consts::TAU;

use crate::error::{Result, SketchError};
use crate::geometry::{map_range, Point, Point3};

/// Tangents at or below this magnitude have no usable normal.
pub const MIN_TANGENT_LENGTH: f64 = 1e-4;

/// Waves shallower than this are not applied.
pub const MIN_WAVE_DEPTH: f64 = 0.1;

/// One sinusoidal term: `amplitude·sin(frequency·t + phase)`.
///
/// Phase is in radians.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Harmonic {
    pub amplitude: f64,
    pub frequency: f64,
    pub phase: f64,
}

impl Harmonic {
    pub fn new(amplitude: f64, frequency: f64, phase: f64) -> Self {
        Self { amplitude, frequency, phase }
    }

    /// Value at `t`.
    #[inline]
    pub fn evaluate(&self, t: f64) -> f64 {
        self.amplitude * (self.frequency * t + self.phase).sin()
    }

    /// Derivative with respect to `t`.
    #[inline]
    pub fn derivative(&self, t: f64) -> f64 {
        self.amplitude * self.frequency * (self.frequency * t + self.phase).cos()
    }
}

/// Displacement along the curve normal: `depth·sin(frequency·t)`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Wave {
    pub depth: f64,
    pub frequency: f64,
}

impl Wave {
    pub fn is_active(&self) -> bool {
        self.depth.abs() > MIN_WAVE_DEPTH
    }

    #[inline]
    pub fn offset(&self, t: f64) -> f64 {
        self.depth * (self.frequency * t).sin()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LissajousCurve {
    pub x: Harmonic,
    pub y: Harmonic,
    pub z: Harmonic,
    pub wave: Wave,
}

impl LissajousCurve {
    /// Undisplaced point at `t`.
    #[inline]
    pub fn point(&self, t: f64) -> Point3 {
        Point3::new(self.x.evaluate(t), self.y.evaluate(t), self.z.evaluate(t))
    }

    /// Planar tangent `(dx/dt, dy/dt)`.
    #[inline]
    pub fn tangent(&self, t: f64) -> Point {
        Point::new(self.x.derivative(t), self.y.derivative(t))
    }

    /// Unit normal: the tangent turned 90 degrees.
    pub fn normal(&self, t: f64) -> Result<Point> {
        let normal = self.tangent(t).perpendicular();
        normal
            .normalized(MIN_TANGENT_LENGTH)
            .ok_or(SketchError::DegenerateDirection { magnitude: normal.length() })
    }

    /// Point at `t` with the wave applied.
    ///
    /// Where the normal is degenerate the undisplaced point is returned.
    pub fn displaced(&self, t: f64) -> Point3 {
        let base = self.point(t);
        if !self.wave.is_active() {
            return base;
        }

        match self.normal(t) {
            Ok(normal) => {
                let offset = normal * self.wave.offset(t);
                Point3::new(base.x + offset.x, base.y + offset.y, base.z)
            }
            Err(err) => {
                tracing::trace!(t, %err, "skipping wave displacement");
                base
            }
        }
    }

    /// `steps + 1` points with `t` swept uniformly over `[0, 2π·cycles]`,
    /// both ends included.
    pub fn sample(&self, steps: usize, cycles: f64) -> Vec<Point3> {
        let steps = steps.max(1);
        let t_max = TAU * cycles;
        (0..=steps)
            .map(|i| self.displaced(map_range(i as f64, 0.0, steps as f64, 0.0, t_max)))
            .collect()
    }

    /// Short segments across the curve, centered on it.
    ///
    /// `count` lines at `t = i·t_max/count`; each endpoint carries the
    /// curve's z at its center. Points with a degenerate normal get no line.
    pub fn perpendicular_lines(&self, count: usize, length: f64, cycles: f64) -> Vec<(Point3, Point3)> {
        let count = count.max(1);
        let t_max = TAU * cycles;
        let half = length / 2.0;

        (0..count)
            .filter_map(|i| {
                let t = map_range(i as f64, 0.0, count as f64, 0.0, t_max);
                let normal = self.normal(t).ok()?;
                let center = self.point(t);
                let reach = normal * half;
                Some((
                    Point3::new(center.x + reach.x, center.y + reach.y, center.z),
                    Point3::new(center.x - reach.x, center.y - reach.y, center.z),
                ))
            })
            .collect()
    }
}

/// Polar multi-harmonic curve.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PolarCurve {
    pub scale: f64,
    /// Radius left over when every term is at its minimum (before scaling)
    pub min_gap: f64,
    pub harmonics: Vec<Harmonic>,
}

impl PolarCurve {
    /// Unscaled base radius: `max(0, min_gap) + Σ|Aᵢ|`.
    pub fn base_radius(&self) -> f64 {
        self.min_gap.max(0.0) + self.harmonics.iter().map(|h| h.amplitude.abs()).sum::<f64>()
    }

    /// Scaled radius at `theta`.
    pub fn radius(&self, theta: f64) -> f64 {
        let wobble: f64 = self.harmonics.iter().map(|h| h.evaluate(theta)).sum();
        (self.base_radius() + wobble) * self.scale
    }

    pub fn point(&self, theta: f64) -> Point {
        Point::from_angle(theta) * self.radius(theta)
    }

    /// `num_points + 1` points with θ over `[0, 2π·cycles]`.
    pub fn sample(&self, num_points: usize, cycles: f64) -> Vec<Point> {
        let num_points = num_points.max(1);
        let theta_max = TAU * cycles;
        (0..=num_points)
            .map(|i| self.point(map_range(i as f64, 0.0, num_points as f64, 0.0, theta_max)))
            .collect()
    }
}
