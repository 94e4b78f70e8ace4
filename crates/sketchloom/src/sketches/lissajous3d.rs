//! 3D Lissajous curve viewed through a rotatable camera.

use serde::{Deserialize, Serialize};

use crate::curves::{Harmonic, LissajousCurve, Wave};
use crate::drawing::{DrawLayer, Drawing, Stroke};
use crate::geometry::Point3;
use crate::params::{parameter_set, ParamSpec};
use crate::path::{accumulate, Accumulation, Path};
use crate::transform::View;

/// Fewer sample steps than this would not form a curve.
pub const MIN_STEPS: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Lissajous3dParams {
    pub amplitude_x: f64,
    pub amplitude_y: f64,
    pub amplitude_z: f64,
    pub freq_x: f64,
    pub freq_y: f64,
    pub freq_z: f64,
    /// X phase, degrees
    pub delta_degrees: f64,
    /// Z phase, degrees
    pub phi_z_degrees: f64,
    pub scale_factor: f64,
    pub num_points: usize,
    pub line_width: f64,
    /// Number of full 2π turns of t
    pub t_cycles: f64,
    pub rot_x: f64,
    pub rot_y: f64,
    pub rot_z: f64,
}

impl Default for Lissajous3dParams {
    fn default() -> Self {
        Self {
            amplitude_x: 200.0,
            amplitude_y: 200.0,
            amplitude_z: 200.0,
            freq_x: 3.0,
            freq_y: 4.0,
            freq_z: 5.0,
            delta_degrees: 90.0,
            phi_z_degrees: 0.0,
            scale_factor: 1.0,
            num_points: 1000,
            line_width: 1.0,
            t_cycles: 1.0,
            rot_x: 0.0,
            rot_y: 0.0,
            rot_z: 0.0,
        }
    }
}

const LISSAJOUS3D_PARAMS: &[ParamSpec] = &[
    ParamSpec::number("amplitude_x", "X Amplitude (A)", 10.0, 500.0, 1.0),
    ParamSpec::number("amplitude_y", "Y Amplitude (B)", 10.0, 500.0, 1.0),
    ParamSpec::number("amplitude_z", "Z Amplitude (C)", 10.0, 500.0, 1.0),
    ParamSpec::number("freq_x", "X Frequency (a)", 0.1, 10.0, 0.1),
    ParamSpec::number("freq_y", "Y Frequency (b)", 0.1, 10.0, 0.1),
    ParamSpec::number("freq_z", "Z Frequency (c)", 0.1, 10.0, 0.1),
    ParamSpec::number("delta_degrees", "X Phase (deg)", 0.0, 360.0, 1.0),
    ParamSpec::number("phi_z_degrees", "Z Phase (deg)", 0.0, 360.0, 1.0),
    ParamSpec::number("scale_factor", "Scale Factor", 0.1, 5.0, 0.1),
    ParamSpec::number("num_points", "Points (Resolution)", 100.0, 5000.0, 100.0),
    ParamSpec::number("line_width", "Line Width", 0.1, 5.0, 0.1),
    ParamSpec::number("t_cycles", "T Cycles (x 2π)", 0.1, 10.0, 0.1),
    ParamSpec::number("rot_x", "X Rotation", 0.0, 360.0, 1.0),
    ParamSpec::number("rot_y", "Y Rotation", 0.0, 360.0, 1.0),
    ParamSpec::number("rot_z", "Z Rotation", 0.0, 360.0, 1.0),
];

parameter_set!(Lissajous3dParams, "lissajous3d", LISSAJOUS3D_PARAMS, [
    amplitude_x, amplitude_y, amplitude_z,
    freq_x, freq_y, freq_z,
    delta_degrees, phi_z_degrees,
    scale_factor, num_points, line_width, t_cycles,
    rot_x, rot_y, rot_z,
]);

impl Lissajous3dParams {
    pub fn curve(&self) -> LissajousCurve {
        LissajousCurve {
            x: Harmonic::new(self.amplitude_x, self.freq_x, self.delta_degrees.to_radians()),
            y: Harmonic::new(self.amplitude_y, self.freq_y, 0.0),
            z: Harmonic::new(self.amplitude_z, self.freq_z, self.phi_z_degrees.to_radians()),
            wave: Wave::default(),
        }
    }

    pub fn steps(&self) -> usize {
        self.num_points.max(MIN_STEPS)
    }

    pub fn view(&self) -> View {
        View::new(self.rot_x, self.rot_y, self.rot_z, self.scale_factor)
    }
}

#[derive(Debug, Clone)]
pub struct Lissajous3dSketch {
    params: Lissajous3dParams,
    path: Path<Point3>,
    last: Accumulation,
}

impl Lissajous3dSketch {
    pub fn new(params: Lissajous3dParams) -> Self {
        let mut sketch = Self { params, path: Path::new(), last: Accumulation::complete(0) };
        sketch.regenerate();
        sketch
    }

    pub fn params(&self) -> &Lissajous3dParams {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut Lissajous3dParams {
        &mut self.params
    }

    pub fn path(&self) -> &Path<Point3> {
        &self.path
    }

    /// Resample the whole curve.
    pub fn regenerate(&mut self) -> Accumulation {
        let samples = self.params.curve().sample(self.params.steps(), self.params.t_cycles);
        self.last = accumulate(&mut self.path, samples.len(), |i| Ok(samples[i]));
        tracing::debug!(points = self.path.len(), "lissajous3d regenerated");
        self.last.clone()
    }

    pub fn last_pass(&self) -> &Accumulation {
        &self.last
    }

    pub fn drawing(&self) -> Drawing {
        let mut drawing = Drawing::new(self.params.view());
        drawing.push_layer(
            DrawLayer::new("curve", 1.0)
                .with_stroke_width(self.params.line_width)
                .with_stroke(Stroke::Polyline(self.path.points().to_vec())),
        );
        drawing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn default_curve_starts_on_x_axis() {
        let sketch = Lissajous3dSketch::new(Lissajous3dParams::default());
        let first = sketch.path().points()[0];
        assert_abs_diff_eq!(first.x, 200.0, epsilon = 1e-9);
        assert_abs_diff_eq!(first.y, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(first.z, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn tiny_point_counts_are_raised() {
        let sketch = Lissajous3dSketch::new(Lissajous3dParams { num_points: 1, ..Default::default() });
        assert_eq!(sketch.last_pass().requested, MIN_STEPS + 1);
        assert!(sketch.last_pass().is_complete());
    }

    #[test]
    fn view_carries_rotation_and_scale() {
        let params = Lissajous3dParams { rot_y: 90.0, scale_factor: 2.0, ..Default::default() };
        let drawing = Lissajous3dSketch::new(params).drawing().project();
        let Stroke::Polyline(points) = &drawing.layers[0].strokes[0] else {
            panic!("expected a polyline");
        };
        // Start point (200, 0, 0) turns onto -z, leaving x ≈ 0
        assert_abs_diff_eq!(points[0].x, 0.0, epsilon = 1e-9);
    }
}
