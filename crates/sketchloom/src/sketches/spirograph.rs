//! Polar spirograph: a radius made of up to three sine terms.
//!
//! The base radius is `max(0, min_gap_radius) + Σ|Aᵢ|`, so the curve never
//! passes through the center.

use serde::{Deserialize, Serialize};

use crate::curves::{Harmonic, PolarCurve};
use crate::drawing::{DrawLayer, Drawing, Stroke};
use crate::geometry::{Point, Point3};
use crate::params::{parameter_set, ParamSpec};
use crate::path::{accumulate, Accumulation, Path};
use crate::transform::View;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpirographParams {
    pub scale_factor: f64,
    pub min_gap_radius: f64,

    pub a1: f64,
    pub f1: f64,
    pub p1_degrees: f64,

    pub a2: f64,
    pub f2: f64,
    pub p2_degrees: f64,

    pub a3: f64,
    pub f3: f64,
    pub p3_degrees: f64,

    pub theta_max_cycles: f64,
    pub num_points: usize,
    pub line_width: f64,
}

impl Default for SpirographParams {
    fn default() -> Self {
        Self {
            scale_factor: 100.0,
            min_gap_radius: 0.1,
            a1: 1.0,
            f1: 5.0,
            p1_degrees: 0.0,
            a2: 1.0,
            f2: 12.0,
            p2_degrees: 90.0,
            a3: 0.0,
            f3: 19.0,
            p3_degrees: 45.0,
            theta_max_cycles: 10.0,
            num_points: 2000,
            line_width: 1.0,
        }
    }
}

const SPIROGRAPH_PARAMS: &[ParamSpec] = &[
    ParamSpec::number("scale_factor", "Scale Factor", 1.0, 300.0, 1.0),
    ParamSpec::number("min_gap_radius", "Min Gap Radius", 0.0, 2.0, 0.01),
    ParamSpec::number("a1", "Term 1 Amplitude", -2.0, 2.0, 0.01),
    ParamSpec::number("f1", "Term 1 Frequency", 0.0, 20.0, 0.1),
    ParamSpec::number("p1_degrees", "Term 1 Phase (deg)", 0.0, 360.0, 1.0),
    ParamSpec::number("a2", "Term 2 Amplitude", -2.0, 2.0, 0.01),
    ParamSpec::number("f2", "Term 2 Frequency", 0.0, 20.0, 0.1),
    ParamSpec::number("p2_degrees", "Term 2 Phase (deg)", 0.0, 360.0, 1.0),
    ParamSpec::number("a3", "Term 3 Amplitude", -2.0, 2.0, 0.01),
    ParamSpec::number("f3", "Term 3 Frequency", 0.0, 20.0, 0.1),
    ParamSpec::number("p3_degrees", "Term 3 Phase (deg)", 0.0, 360.0, 1.0),
    ParamSpec::number("theta_max_cycles", "Theta Cycles", 1.0, 50.0, 1.0),
    ParamSpec::number("num_points", "Points", 100.0, 5000.0, 100.0),
    ParamSpec::number("line_width", "Line Width", 0.1, 5.0, 0.1),
];

parameter_set!(SpirographParams, "spirograph", SPIROGRAPH_PARAMS, [
    scale_factor, min_gap_radius,
    a1, f1, p1_degrees,
    a2, f2, p2_degrees,
    a3, f3, p3_degrees,
    theta_max_cycles, num_points, line_width,
]);

impl SpirographParams {
    pub fn curve(&self) -> PolarCurve {
        PolarCurve {
            scale: self.scale_factor,
            min_gap: self.min_gap_radius,
            harmonics: vec![
                Harmonic::new(self.a1, self.f1, self.p1_degrees.to_radians()),
                Harmonic::new(self.a2, self.f2, self.p2_degrees.to_radians()),
                Harmonic::new(self.a3, self.f3, self.p3_degrees.to_radians()),
            ],
        }
    }
}

#[derive(Debug, Clone)]
pub struct PolarSpirographSketch {
    params: SpirographParams,
    path: Path<Point>,
}

impl PolarSpirographSketch {
    pub fn new(params: SpirographParams) -> Self {
        let mut sketch = Self { params, path: Path::new() };
        sketch.regenerate();
        sketch
    }

    pub fn params(&self) -> &SpirographParams {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut SpirographParams {
        &mut self.params
    }

    pub fn path(&self) -> &Path<Point> {
        &self.path
    }

    pub fn regenerate(&mut self) -> Accumulation {
        let curve = self.params.curve();
        let samples = curve.sample(self.params.num_points, self.params.theta_max_cycles);
        let outcome = accumulate(&mut self.path, samples.len(), |i| Ok(samples[i]));
        tracing::debug!(
            base_radius = curve.base_radius(),
            points = self.path.len(),
            "spirograph regenerated"
        );
        outcome
    }

    pub fn drawing(&self) -> Drawing {
        let points = self.path.points().iter().copied().map(Point3::from).collect();
        let mut drawing = Drawing::new(View::default());
        drawing.push_layer(
            DrawLayer::new("curve", 1.0)
                .with_stroke_width(self.params.line_width)
                .with_stroke(Stroke::Polyline(points)),
        );
        drawing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn single_term_starts_at_scaled_radius() {
        let params = SpirographParams {
            min_gap_radius: 0.0,
            a1: 1.0,
            f1: 5.0,
            p1_degrees: 0.0,
            a2: 0.0,
            a3: 0.0,
            scale_factor: 10.0,
            ..Default::default()
        };
        let sketch = PolarSpirographSketch::new(params);
        let first = sketch.path().points()[0];
        assert_abs_diff_eq!(first.x, 10.0, epsilon = 1e-12);
        assert_abs_diff_eq!(first.y, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn radius_never_below_min_gap() {
        let params = SpirographParams::default();
        let min = params.min_gap_radius * params.scale_factor;
        let sketch = PolarSpirographSketch::new(params);
        for p in sketch.path().points() {
            assert!(p.length() >= min - 1e-9);
        }
    }

    #[test]
    fn negative_gap_is_treated_as_zero() {
        let curve = SpirographParams { min_gap_radius: -1.0, ..Default::default() }.curve();
        assert_abs_diff_eq!(curve.base_radius(), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn path_is_deduplicated() {
        // Far more samples than the curve has room for at this scale
        let params = SpirographParams { scale_factor: 1.0, num_points: 5000, ..Default::default() };
        let sketch = PolarSpirographSketch::new(params);
        assert!(sketch.path().len() < 5001);
        assert_eq!(sketch.drawing().point_count(), sketch.path().len());
    }
}
