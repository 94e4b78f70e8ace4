//! Interpolated moiré: a jittered ring of points, nested copies of it and
//! offset layers of the whole pattern.
//!
//! The base ring has `n` points at evenly spaced angles, each at its own
//! random distance from the center. Every layer draws:
//!
//! 1. the ring itself, at the layer's point count (custom counts come from
//!    the [`RandomField`] cache);
//! 2. `cycle_count · number_of_cycles` duplicates of the base ring, scaled by
//!    the running [`DuplicateSchedule`] product and jittered radially by the
//!    cached fluctuation factors.
//!
//! Each piece is either a closed Catmull-Rom curve or, in radial-line mode,
//! a set of short lines pointing inward from points resampled along that
//! curve. Layers are built around the origin and then placed with a
//! [`Similarity`].

use std::borrow::Cow;
use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

use crate::drawing::{DrawLayer, Drawing, Stroke};
use crate::field::RandomField;
use crate::geometry::{map_range, Point, Point3};
use crate::params::{choice_field, parameter_set, ParamSpec};
use crate::spline::resample_closed;
use crate::transform::{DuplicateSchedule, Similarity, View};

/// Smallest ring that still forms a closed curve.
pub const MIN_POINTS: usize = 3;

/// Opacity of each layer when layering is on.
pub const LAYER_ALPHA: f64 = 150.0 / 255.0;

/// Per-layer center shift along both axes.
pub const LAYER_CENTER_STEP: f64 = 10.0;

/// Points this close to the center have no radial direction.
const MIN_DIRECTION_SQUARED: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoireDrawMode {
    #[default]
    Curves,
    RadialLines,
}

choice_field!(MoireDrawMode, [MoireDrawMode::Curves, MoireDrawMode::RadialLines]);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoireParams {
    /// Points in the base ring
    pub n: usize,
    /// Added to every random distance before scaling
    pub offset: f64,
    pub radius_scale: f64,

    pub cycle_count: usize,
    pub number_of_cycles: usize,
    pub initial_scale_offset: f64,
    pub scale_decay: f64,
    pub fluctuation_amount: f64,

    pub draw_mode: MoireDrawMode,
    /// Radial line length, in `radius_scale` units
    pub radial_line_length_units: f64,
    pub segments_per_curve: usize,
    /// Extra rotation of radial lines per duplicate index
    pub line_rotation_degrees: f64,

    pub enable_moire_effect: bool,
    pub num_layers: usize,
    pub layer_rotation_offset: f64,
    pub layer_scale_offset: f64,
    pub layer_point_offset: i32,

    /// Fixed seed for the random field; drawn from entropy when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for MoireParams {
    fn default() -> Self {
        Self {
            n: 7,
            offset: 2.0,
            radius_scale: 50.0,
            cycle_count: 100,
            number_of_cycles: 1,
            initial_scale_offset: 1.1,
            scale_decay: 0.9,
            fluctuation_amount: 0.1,
            draw_mode: MoireDrawMode::Curves,
            radial_line_length_units: 0.05,
            segments_per_curve: 100,
            line_rotation_degrees: 15.0,
            enable_moire_effect: true,
            num_layers: 2,
            layer_rotation_offset: 3.0,
            layer_scale_offset: 0.02,
            layer_point_offset: 0,
            seed: None,
        }
    }
}

const MOIRE_PARAMS: &[ParamSpec] = &[
    ParamSpec::number("n", "Points", 3.0, 50.0, 1.0),
    ParamSpec::number("offset", "Radius Offset", 0.0, 10.0, 0.1),
    ParamSpec::number("radius_scale", "Radius Scale", 1.0, 200.0, 1.0),
    ParamSpec::number("cycle_count", "Cycle Count", 2.0, 300.0, 1.0),
    ParamSpec::number("number_of_cycles", "Cycles", 1.0, 10.0, 1.0),
    ParamSpec::number("initial_scale_offset", "Initial Scale Offset", 1.01, 2.0, 0.01),
    ParamSpec::number("scale_decay", "Scale Decay", 0.01, 0.99, 0.01),
    ParamSpec::number("fluctuation_amount", "Fluctuation", 0.0, 2.0, 0.01),
    ParamSpec::choice("draw_mode", "Draw Mode", &["Curves", "Radial Lines"]),
    ParamSpec::number("radial_line_length_units", "Radial Line Length", 0.01, 2.0, 0.01),
    ParamSpec::number("segments_per_curve", "Lines per Curve", 5.0, 1000.0, 5.0),
    ParamSpec::number("line_rotation_degrees", "Line Rotation (deg)", -180.0, 180.0, 0.5),
    ParamSpec::toggle("enable_moire_effect", "Moiré Layers"),
    ParamSpec::number("num_layers", "Layers", 1.0, 10.0, 1.0),
    ParamSpec::number("layer_rotation_offset", "Layer Rotation (deg)", -45.0, 45.0, 0.1),
    ParamSpec::number("layer_scale_offset", "Layer Scale", -0.5, 0.5, 0.001),
    ParamSpec::number("layer_point_offset", "Layer Point Offset", -10.0, 10.0, 1.0),
];

parameter_set!(MoireParams, "moire", MOIRE_PARAMS, [
    n, offset, radius_scale,
    cycle_count, number_of_cycles, initial_scale_offset, scale_decay, fluctuation_amount,
    draw_mode, radial_line_length_units, segments_per_curve, line_rotation_degrees,
    enable_moire_effect, num_layers, layer_rotation_offset, layer_scale_offset, layer_point_offset,
]);

/// One overlaid copy of the pattern, derived from its index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layer {
    pub index: usize,
    pub rotation_degrees: f64,
    pub scale: f64,
    pub point_count: usize,
    pub center_offset: Point,
    pub alpha: f64,
}

impl Layer {
    pub fn similarity(&self) -> Similarity {
        Similarity::identity()
            .scaled(self.scale)
            .rotated(self.rotation_degrees.to_radians())
            .translated(self.center_offset)
    }
}

impl MoireParams {
    /// Copy with every value the math depends on pulled into its legal
    /// range.
    pub fn clamped(&self) -> Self {
        let clamped = Self {
            n: self.n.max(MIN_POINTS),
            cycle_count: self.cycle_count.max(2),
            number_of_cycles: self.number_of_cycles.max(1),
            initial_scale_offset: self.initial_scale_offset.max(1.01),
            scale_decay: self.scale_decay.clamp(0.01, 0.99),
            fluctuation_amount: self.fluctuation_amount.max(0.0),
            radial_line_length_units: self.radial_line_length_units.max(0.01),
            segments_per_curve: self.segments_per_curve.max(5),
            num_layers: self.num_layers.max(1),
            ..self.clone()
        };
        if clamped != *self {
            tracing::debug!("moire parameters clamped");
        }
        clamped
    }

    pub fn schedule(&self) -> DuplicateSchedule {
        DuplicateSchedule {
            cycle_count: self.cycle_count,
            num_cycles: self.number_of_cycles.max(1),
            initial_scale_offset: self.initial_scale_offset,
            scale_decay: self.scale_decay,
            base_scale: 1.0,
            reset_each_cycle: false,
        }
    }

    pub fn is_layered(&self) -> bool {
        self.enable_moire_effect && self.num_layers > 1
    }

    pub fn layer(&self, index: usize) -> Layer {
        let count = self.n as i64 + index as i64 * self.layer_point_offset as i64;
        Layer {
            index,
            rotation_degrees: index as f64 * self.layer_rotation_offset,
            scale: 1.0 + index as f64 * self.layer_scale_offset,
            point_count: count.max(MIN_POINTS as i64) as usize,
            center_offset: Point::new(index as f64, index as f64) * LAYER_CENTER_STEP,
            alpha: LAYER_ALPHA,
        }
    }

    /// Layers to draw. Without layering this is a single untransformed,
    /// fully opaque layer.
    pub fn layers(&self) -> Vec<Layer> {
        if !self.is_layered() {
            return vec![Layer { alpha: 1.0, point_count: self.n.max(MIN_POINTS), ..self.layer(0) }];
        }
        (0..self.num_layers).map(|i| self.layer(i)).collect()
    }

    fn radial_length(&self) -> f64 {
        self.radial_line_length_units * self.radius_scale
    }
}

/// Ring points around the origin for the given random distances.
pub fn ring_points(distances: &[f64], offset: f64, radius_scale: f64) -> Vec<Point> {
    let count = distances.len() as f64;
    distances
        .iter()
        .enumerate()
        .map(|(i, d)| Point::from_angle(map_range(i as f64, 0.0, count, 0.0, TAU)) * ((d + offset) * radius_scale))
        .collect()
}

/// `point` scaled by `scale` and pushed out along its radius by `push`.
fn fluctuated(point: Point, scale: f64, push: f64) -> Point {
    let scaled = point * scale;
    if point.length_squared() <= MIN_DIRECTION_SQUARED {
        return scaled;
    }
    match point.normalized(0.0) {
        Some(dir) => scaled + dir * push,
        None => scaled,
    }
}

/// Lines of `length` from each sample toward the center, turned by
/// `rotation` radians.
fn radial_lines(samples: &[Point], length: f64, rotation: f64) -> Vec<(Point, Point)> {
    samples
        .iter()
        .filter_map(|&q| {
            let inward = -q;
            if inward.length_squared() < MIN_DIRECTION_SQUARED {
                return None;
            }
            let dir = inward.normalized(0.0)?.rotate(rotation);
            Some((q, q + dir * length))
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct MoireSketch {
    params: MoireParams,
    field: RandomField,
}

impl MoireSketch {
    pub fn new(params: MoireParams) -> Self {
        let mut sketch = Self { params, field: RandomField::default() };
        sketch.regenerate();
        sketch
    }

    pub fn params(&self) -> &MoireParams {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut MoireParams {
        &mut self.params
    }

    pub fn field(&self) -> &RandomField {
        &self.field
    }

    /// Fix the seed used by the next [`MoireSketch::regenerate`].
    pub fn set_seed(&mut self, seed: Option<u64>) {
        self.params.seed = seed;
    }

    /// Draw a new random field and drop every cached custom ring.
    pub fn regenerate(&mut self) {
        let params = self.params.clamped();
        let duplicates = params.schedule().total_duplicates();
        self.field.regenerate(params.seed, params.n, duplicates, params.n);
        self.prepare_layers(&params);
        tracing::info!(n = params.n, duplicates, layers = params.layers().len(), "moire pattern regenerated");
    }

    /// Follow a parameter change without re-rolling the pattern.
    ///
    /// The baseline is resized to the current point count. Fluctuation rows
    /// keep their size until the next regenerate, so new duplicates or
    /// points get no jitter.
    pub fn refresh(&mut self) {
        let params = self.params.clamped();
        self.field.resize_baseline(params.n);
        self.prepare_layers(&params);
    }

    fn prepare_layers(&mut self, params: &MoireParams) {
        if !params.enable_moire_effect || params.layer_point_offset == 0 {
            return;
        }
        for layer in params.layers() {
            if layer.point_count != params.n {
                self.field.custom_distances(layer.point_count);
            }
        }
    }

    fn distances(&self, count: usize) -> Cow<'_, [f64]> {
        let baseline = self.field.baseline();
        if count == baseline.len() {
            return Cow::Borrowed(baseline);
        }
        match self.field.cached_distances(count) {
            Some(cached) => Cow::Borrowed(cached),
            None => Cow::Owned(RandomField::custom_baseline(count)),
        }
    }

    /// Base ring with `count` points, around the origin.
    pub fn ring(&self, count: usize) -> Vec<Point> {
        ring_points(&self.distances(count), self.params.offset, self.params.radius_scale)
    }

    /// Strokes of one layer before its similarity is applied.
    fn layer_strokes(&self, params: &MoireParams, layer: &Layer) -> Vec<Stroke<Point>> {
        let base_ring = ring_points(self.field.baseline(), params.offset, params.radius_scale);
        let own_ring = if layer.point_count == base_ring.len() {
            base_ring.clone()
        } else {
            self.ring(layer.point_count)
        };

        let piece = |ring: Vec<Point>, rotation: f64| match params.draw_mode {
            MoireDrawMode::Curves => Stroke::Spline { points: ring, closed: true },
            MoireDrawMode::RadialLines => Stroke::Segments(radial_lines(
                &resample_closed(&ring, params.segments_per_curve),
                params.radial_length(),
                rotation,
            )),
        };

        let mut strokes = vec![piece(own_ring, 0.0)];
        for step in params.schedule().steps() {
            let anchors = base_ring
                .iter()
                .enumerate()
                .map(|(i, &p)| {
                    let push = self.field.fluctuation(step.index, i) * params.fluctuation_amount * params.radius_scale;
                    fluctuated(p, step.total_scale, push)
                })
                .collect();
            let rotation = (params.line_rotation_degrees * step.index as f64).to_radians();
            strokes.push(piece(anchors, rotation));
        }
        strokes
    }

    pub fn drawing(&self) -> Drawing {
        let params = self.params.clamped();
        let mut drawing = Drawing::new(View::default());
        if self.field.baseline().len() < MIN_POINTS {
            return drawing;
        }

        for layer in params.layers() {
            let placement = layer.similarity();
            let draw_layer = self
                .layer_strokes(&params, &layer)
                .into_iter()
                .fold(DrawLayer::new(format!("layer_{}", layer.index), layer.alpha), |acc, stroke| {
                    acc.with_stroke(stroke.map(|p| Point3::from(placement.apply(p))))
                });
            drawing.push_layer(draw_layer);
        }
        drawing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn seeded(params: MoireParams) -> MoireSketch {
        MoireSketch::new(MoireParams { seed: Some(42), ..params })
    }

    fn single_layer() -> MoireParams {
        MoireParams { enable_moire_effect: false, ..Default::default() }
    }

    #[test]
    fn seeded_patterns_repeat() {
        let a = seeded(MoireParams::default()).drawing();
        let b = seeded(MoireParams::default()).drawing();
        assert_eq!(a, b);
    }

    #[test]
    fn default_stroke_counts() {
        let drawing = seeded(MoireParams::default()).drawing();
        assert_eq!(drawing.layers.len(), 2);
        for layer in &drawing.layers {
            assert_eq!(layer.strokes.len(), 101);
            assert_abs_diff_eq!(layer.opacity, LAYER_ALPHA, epsilon = 1e-12);
        }

        let single = seeded(single_layer()).drawing();
        assert_eq!(single.layers.len(), 1);
        assert_eq!(single.layers[0].opacity, 1.0);
    }

    #[test]
    fn layer_point_offset_leaves_base_ring_alone() {
        let plain = seeded(MoireParams::default());
        let offset = seeded(MoireParams { layer_point_offset: 3, ..Default::default() });
        assert_eq!(plain.field().baseline(), offset.field().baseline());
        assert_eq!(offset.field().cached_counts(), 1);

        let drawing = offset.drawing();
        let Stroke::Spline { points, closed } = &drawing.layers[1].strokes[0] else {
            panic!("expected a spline");
        };
        assert!(*closed);
        assert_eq!(points.len(), 10);
    }

    #[test]
    fn layers_derive_from_index() {
        let layer = MoireParams::default().layer(1);
        assert_abs_diff_eq!(layer.rotation_degrees, 3.0);
        assert_abs_diff_eq!(layer.scale, 1.02);
        assert_eq!(layer.center_offset, Point::new(10.0, 10.0));

        let shrinking = MoireParams { layer_point_offset: -5, ..Default::default() };
        assert_eq!(shrinking.layer(1).point_count, MIN_POINTS);
    }

    #[test]
    fn duplicates_scale_the_base_ring() {
        let sketch = seeded(MoireParams { fluctuation_amount: 0.0, ..single_layer() });
        let ring = sketch.ring(7);
        let drawing = sketch.drawing();
        let Stroke::Spline { points, .. } = &drawing.layers[0].strokes[1] else {
            panic!("expected a spline");
        };
        for (scaled, p) in points.iter().zip(&ring) {
            assert!(scaled.xy().approx_eq(*p * 1.1, 1e-9));
        }
    }

    #[test]
    fn radial_lines_point_inward() {
        let params = MoireParams { draw_mode: MoireDrawMode::RadialLines, ..single_layer() };
        let drawing = seeded(params).drawing();
        let lines = &drawing.layers[0].strokes;
        let Stroke::Segments(first) = &lines[0] else { panic!("expected segments") };
        assert_eq!(first.len(), 100);
        for (start, end) in first {
            assert_abs_diff_eq!(start.distance(*end), 2.5, epsilon = 1e-9);
            assert!(end.xy().length() < start.xy().length());
        }

        // Duplicate 1 turns its lines by one rotation step
        let Stroke::Segments(turned) = &lines[2] else { panic!("expected segments") };
        for (start, end) in turned {
            let (line, inward) = (end.xy() - start.xy(), -start.xy());
            let angle = inward.cross(line).atan2(inward.dot(line));
            assert_abs_diff_eq!(angle, 15.0_f64.to_radians(), epsilon = 1e-9);
        }
    }

    #[test]
    fn refresh_keeps_existing_distances() {
        let mut sketch = seeded(MoireParams::default());
        let before = sketch.field().baseline().to_vec();
        sketch.params_mut().n = 12;
        sketch.refresh();
        assert_eq!(sketch.field().baseline().len(), 12);
        assert_eq!(&sketch.field().baseline()[..7], before.as_slice());
    }

    #[test]
    fn clamping_fixes_broken_values() {
        let params = MoireParams {
            n: 1,
            cycle_count: 0,
            number_of_cycles: 0,
            initial_scale_offset: 0.5,
            scale_decay: 5.0,
            fluctuation_amount: -1.0,
            segments_per_curve: 0,
            num_layers: 0,
            ..Default::default()
        }
        .clamped();
        assert_eq!(params.n, 3);
        assert_eq!(params.cycle_count, 2);
        assert_eq!(params.number_of_cycles, 1);
        assert_eq!(params.initial_scale_offset, 1.01);
        assert_eq!(params.scale_decay, 0.99);
        assert_eq!(params.fluctuation_amount, 0.0);
        assert_eq!(params.segments_per_curve, 5);
        assert_eq!(params.num_layers, 1);
    }
}
