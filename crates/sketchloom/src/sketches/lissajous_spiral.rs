//! Lissajous spiral: one Lissajous curve repeated many times.
//!
//! The base curve (optionally wave-displaced and z-modulated) is built once,
//! in curve or perpendicular-line form, and then stamped out:
//!
//! 1. Offset cycles: nested copies scaled by the triangular
//!    [`DuplicateSchedule`], restarting from `scale_factor` every cycle.
//! 2. Plain duplicates: `num_duplicates` copies at `scale_factor`, fanned
//!    out by rotation or placed along a spiral.
//!
//! Both use the same [`Placement`] for duplicate `i`.

use serde::{Deserialize, Serialize};

use crate::curves::{Harmonic, LissajousCurve, Wave};
use crate::drawing::{DrawLayer, Drawing, Stroke};
use crate::geometry::Point3;
use crate::params::{choice_field, parameter_set, ParamSpec};
use crate::transform::{DuplicateSchedule, Placement, Similarity, View};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawMode {
    #[default]
    Curve,
    PerpendicularLines,
}

choice_field!(DrawMode, [DrawMode::Curve, DrawMode::PerpendicularLines]);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LissajousSpiralParams {
    pub amplitude_x: f64,
    pub amplitude_y: f64,
    pub freq_x: f64,
    pub freq_y: f64,
    pub delta_degrees: f64,

    pub amplitude_z: f64,
    pub freq_z: f64,
    pub phase_z_degrees: f64,

    pub enable_3d_view: bool,
    pub view_rot_x: f64,
    pub view_rot_y: f64,
    pub zoom: f64,

    pub num_points: usize,
    pub line_width: f64,
    pub t_cycles: f64,

    pub draw_mode: DrawMode,
    pub line_density: usize,
    pub perp_line_length: f64,

    pub num_duplicates: usize,
    pub rotation_step_degrees: f64,
    pub base_rotation_degrees: f64,
    pub use_spiral_repetition: bool,
    pub spiral_total_degrees: f64,
    /// Spiral reach as a multiple of `max(amplitude_x, amplitude_y)`
    pub spiral_amplitude: f64,

    pub offset_cycle_count: usize,
    /// 0 disables offset cycles
    pub number_of_offset_cycles: usize,
    pub initial_scale_offset: f64,
    pub scale_decay: f64,

    pub wave_depth: f64,
    pub wave_freq: f64,

    pub scale_factor: f64,
}

impl Default for LissajousSpiralParams {
    fn default() -> Self {
        Self {
            amplitude_x: 200.0,
            amplitude_y: 200.0,
            freq_x: 3.0,
            freq_y: 4.0,
            delta_degrees: 90.0,
            amplitude_z: 0.0,
            freq_z: 1.0,
            phase_z_degrees: 0.0,
            enable_3d_view: false,
            view_rot_x: 0.0,
            view_rot_y: 0.0,
            zoom: 1.0,
            num_points: 1000,
            line_width: 1.0,
            t_cycles: 1.0,
            draw_mode: DrawMode::Curve,
            line_density: 500,
            perp_line_length: 10.0,
            num_duplicates: 1,
            rotation_step_degrees: 5.0,
            base_rotation_degrees: 0.0,
            use_spiral_repetition: false,
            spiral_total_degrees: 360.0,
            spiral_amplitude: 1.0,
            offset_cycle_count: 20,
            number_of_offset_cycles: 1,
            initial_scale_offset: 1.1,
            scale_decay: 0.95,
            wave_depth: 0.0,
            wave_freq: 5.0,
            scale_factor: 1.0,
        }
    }
}

const SPIRAL_PARAMS: &[ParamSpec] = &[
    ParamSpec::number("amplitude_x", "Amplitude X (A)", 10.0, 500.0, 1.0),
    ParamSpec::number("amplitude_y", "Amplitude Y (B)", 10.0, 500.0, 1.0),
    ParamSpec::number("freq_x", "Frequency X (a)", 0.1, 20.0, 0.01),
    ParamSpec::number("freq_y", "Frequency Y (b)", 0.1, 20.0, 0.01),
    ParamSpec::number("delta_degrees", "Phase (deg)", 0.0, 360.0, 1.0),
    ParamSpec::number("amplitude_z", "Amplitude Z", 0.0, 500.0, 1.0),
    ParamSpec::number("freq_z", "Frequency Z", 0.1, 20.0, 0.01),
    ParamSpec::number("phase_z_degrees", "Phase Z (deg)", 0.0, 360.0, 1.0),
    ParamSpec::toggle("enable_3d_view", "3D View"),
    ParamSpec::number("view_rot_x", "View X Rotation", -180.0, 180.0, 1.0),
    ParamSpec::number("view_rot_y", "View Y Rotation", -180.0, 180.0, 1.0),
    ParamSpec::number("zoom", "Zoom", 0.1, 5.0, 0.1),
    ParamSpec::number("num_points", "Points", 100.0, 5000.0, 100.0),
    ParamSpec::number("line_width", "Line Width", 0.1, 5.0, 0.1),
    ParamSpec::number("t_cycles", "T Cycles (x 2π)", 0.1, 20.0, 0.1),
    ParamSpec::choice("draw_mode", "Draw Mode", &["Curve", "Perpendicular Lines"]),
    ParamSpec::number("line_density", "Line Density", 10.0, 5000.0, 10.0),
    ParamSpec::number("perp_line_length", "Line Length", 1.0, 100.0, 0.1),
    ParamSpec::number("num_duplicates", "Duplicates", 1.0, 100.0, 1.0),
    ParamSpec::number("rotation_step_degrees", "Rotation Step (deg)", -180.0, 180.0, 0.1),
    ParamSpec::number("base_rotation_degrees", "Base Rotation (deg)", 0.0, 360.0, 1.0),
    ParamSpec::toggle("use_spiral_repetition", "Spiral Repetition"),
    ParamSpec::number("spiral_total_degrees", "Spiral Total (deg)", 0.0, 3600.0, 1.0),
    ParamSpec::number("spiral_amplitude", "Spiral Amplitude", 0.0, 5.0, 0.1),
    ParamSpec::number("offset_cycle_count", "Offset Cycle Steps", 2.0, 100.0, 1.0),
    ParamSpec::number("number_of_offset_cycles", "Offset Cycles", 0.0, 10.0, 1.0),
    ParamSpec::number("initial_scale_offset", "Initial Scale Offset", 1.0, 2.0, 0.01),
    ParamSpec::number("scale_decay", "Scale Decay", 0.01, 1.0, 0.01),
    ParamSpec::number("wave_depth", "Wave Depth", -50.0, 50.0, 1.0),
    ParamSpec::number("wave_freq", "Wave Frequency", 0.0, 50.0, 0.1),
    ParamSpec::number("scale_factor", "Scale Factor", 0.1, 5.0, 0.01),
];

parameter_set!(LissajousSpiralParams, "lissajous_spiral", SPIRAL_PARAMS, [
    amplitude_x, amplitude_y, freq_x, freq_y, delta_degrees,
    amplitude_z, freq_z, phase_z_degrees,
    enable_3d_view, view_rot_x, view_rot_y, zoom,
    num_points, line_width, t_cycles,
    draw_mode, line_density, perp_line_length,
    num_duplicates, rotation_step_degrees, base_rotation_degrees,
    use_spiral_repetition, spiral_total_degrees, spiral_amplitude,
    offset_cycle_count, number_of_offset_cycles, initial_scale_offset, scale_decay,
    wave_depth, wave_freq, scale_factor,
]);

impl LissajousSpiralParams {
    pub fn curve(&self) -> LissajousCurve {
        LissajousCurve {
            x: Harmonic::new(self.amplitude_x, self.freq_x, self.delta_degrees.to_radians()),
            y: Harmonic::new(self.amplitude_y, self.freq_y, 0.0),
            z: Harmonic::new(self.amplitude_z, self.freq_z, self.phase_z_degrees.to_radians()),
            wave: Wave { depth: self.wave_depth, frequency: self.wave_freq },
        }
    }

    /// Depth is kept only when viewing in 3D with a positive z amplitude.
    pub fn keeps_depth(&self) -> bool {
        self.enable_3d_view && self.amplitude_z > 0.0
    }

    pub fn placement(&self) -> Placement {
        if self.use_spiral_repetition {
            Placement::Spiral {
                base_deg: self.base_rotation_degrees,
                total_deg: self.spiral_total_degrees,
                radius: self.spiral_amplitude * self.amplitude_x.max(self.amplitude_y),
                count: self.num_duplicates,
            }
        } else {
            Placement::Rotation {
                base_deg: self.base_rotation_degrees,
                step_deg: self.rotation_step_degrees,
            }
        }
    }

    pub fn schedule(&self) -> Option<DuplicateSchedule> {
        (self.number_of_offset_cycles > 0).then(|| DuplicateSchedule {
            cycle_count: self.offset_cycle_count,
            num_cycles: self.number_of_offset_cycles,
            initial_scale_offset: self.initial_scale_offset,
            scale_decay: self.scale_decay,
            base_scale: self.scale_factor,
            reset_each_cycle: true,
        })
    }

    pub fn view(&self) -> View {
        if self.enable_3d_view {
            View::new(self.view_rot_x, self.view_rot_y, 0.0, self.zoom)
        } else {
            View::default()
        }
    }

    /// One unscaled, unrotated copy of the curve.
    pub fn base_stroke(&self) -> Stroke {
        let curve = self.curve();
        let flatten = |p: Point3| if self.keeps_depth() { p } else { Point3::new(p.x, p.y, 0.0) };

        match self.draw_mode {
            DrawMode::Curve => Stroke::Polyline(
                curve
                    .sample(self.num_points, self.t_cycles)
                    .into_iter()
                    .map(flatten)
                    .collect(),
            ),
            DrawMode::PerpendicularLines => Stroke::Segments(
                curve
                    .perpendicular_lines(self.line_density, self.perp_line_length, self.t_cycles)
                    .into_iter()
                    .map(|(a, b)| (flatten(a), flatten(b)))
                    .collect(),
            ),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LissajousSpiralSketch {
    params: LissajousSpiralParams,
}

impl LissajousSpiralSketch {
    pub fn new(params: LissajousSpiralParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &LissajousSpiralParams {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut LissajousSpiralParams {
        &mut self.params
    }

    /// Transforms of every offset-cycle copy, in draw order.
    pub fn offset_copies(&self) -> Vec<Similarity> {
        let placement = self.params.placement();
        self.params
            .schedule()
            .map(|schedule| {
                schedule
                    .steps()
                    .into_iter()
                    .map(|step| placement.similarity(step.index, step.total_scale))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Transforms of the plain duplicates. A single duplicate is just the
    /// base rotation.
    pub fn duplicate_copies(&self) -> Vec<Similarity> {
        let params = &self.params;
        if params.num_duplicates > 1 {
            let placement = params.placement();
            (0..params.num_duplicates)
                .map(|i| placement.similarity(i, params.scale_factor))
                .collect()
        } else {
            vec![Similarity::identity()
                .scaled(params.scale_factor)
                .rotated(params.base_rotation_degrees.to_radians())]
        }
    }

    pub fn drawing(&self) -> Drawing {
        let base = self.params.base_stroke();
        let stamp = |copies: Vec<Similarity>, name: &str| {
            copies.into_iter().fold(
                DrawLayer::new(name, 1.0).with_stroke_width(self.params.line_width),
                |layer, copy| layer.with_stroke(base.map(|p| copy.apply3(p))),
            )
        };

        let mut drawing = Drawing::new(self.params.view());
        drawing.push_layer(stamp(self.offset_copies(), "offset_cycles"));
        drawing.push_layer(stamp(self.duplicate_copies(), "duplicates"));
        tracing::debug!(strokes = drawing.stroke_count(), points = drawing.point_count(), "lissajous spiral drawn");
        drawing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn default_draws_offset_cycle_and_single_curve() {
        let sketch = LissajousSpiralSketch::new(LissajousSpiralParams::default());
        let drawing = sketch.drawing();
        assert_eq!(drawing.layers.len(), 2);
        assert_eq!(drawing.layers[0].strokes.len(), 20);
        assert_eq!(drawing.layers[1].strokes.len(), 1);
        // num_points + 1 samples per curve
        assert_eq!(drawing.layers[1].strokes[0].point_count(), 1001);
    }

    #[test]
    fn disabling_offset_cycles_leaves_duplicates() {
        let params = LissajousSpiralParams { number_of_offset_cycles: 0, num_duplicates: 6, ..Default::default() };
        let drawing = LissajousSpiralSketch::new(params).drawing();
        assert_eq!(drawing.layers.len(), 1);
        assert_eq!(drawing.layers[0].name, "duplicates");
        assert_eq!(drawing.layers[0].strokes.len(), 6);
    }

    #[test]
    fn cycles_restart_from_base_scale() {
        let params = LissajousSpiralParams { number_of_offset_cycles: 2, ..Default::default() };
        let sketch = LissajousSpiralSketch::new(params);
        let copies = sketch.offset_copies();
        assert_eq!(copies.len(), 40);
        assert_abs_diff_eq!(copies[0].scale, copies[20].scale, epsilon = 1e-12);
        assert_abs_diff_eq!(copies[0].scale, 1.1, epsilon = 1e-12);
    }

    #[test]
    fn rotation_fan_steps_by_index() {
        let params = LissajousSpiralParams {
            number_of_offset_cycles: 0,
            num_duplicates: 3,
            base_rotation_degrees: 10.0,
            rotation_step_degrees: 5.0,
            ..Default::default()
        };
        let copies = LissajousSpiralSketch::new(params).duplicate_copies();
        assert_abs_diff_eq!(copies[2].rotation, 20.0_f64.to_radians(), epsilon = 1e-12);
    }

    #[test]
    fn depth_needs_3d_view_and_positive_amplitude() {
        let mut params = LissajousSpiralParams { amplitude_z: 50.0, ..Default::default() };
        let Stroke::Polyline(points) = params.base_stroke() else { panic!("expected curve") };
        assert!(points.iter().all(|p| p.z == 0.0));

        params.enable_3d_view = true;
        let Stroke::Polyline(points) = params.base_stroke() else { panic!("expected curve") };
        assert!(points.iter().any(|p| p.z.abs() > 1.0));
    }

    #[test]
    fn perpendicular_lines_mode() {
        let params = LissajousSpiralParams {
            draw_mode: DrawMode::PerpendicularLines,
            line_density: 50,
            ..Default::default()
        };
        let Stroke::Segments(lines) = params.base_stroke() else { panic!("expected segments") };
        assert!(!lines.is_empty() && lines.len() <= 50);
        for (a, b) in lines {
            assert_abs_diff_eq!(a.distance(b), 10.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn spiral_placement_spreads_copies() {
        let params = LissajousSpiralParams {
            number_of_offset_cycles: 0,
            num_duplicates: 4,
            use_spiral_repetition: true,
            ..Default::default()
        };
        let copies = LissajousSpiralSketch::new(params).duplicate_copies();
        assert_abs_diff_eq!(copies[0].translation.length(), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(copies[2].translation.length(), 100.0, epsilon = 1e-9);
    }
}
