//! Generative cycloid: a two-wheel linkage drawing on a turning canvas.
//!
//! The mechanism is solved once per step (see [`crate::linkage`]). Before the
//! pen position enters the path it is rotated by the canvas angle
//! `time · canvas_wheel_speed`: in the plane (by `−α`), or, with
//! `use_3d_canvas_rotation`, about the x axis into depth.
//!
//! ## State machine
//!
//! ```text
//!   restart ──> RUNNING ──(step == max_steps)──> FINISHED
//!                  │
//!          (linkage fails)
//!                  v
//!               FROZEN  ──restart──> RUNNING
//! ```
//!
//! A frozen simulation keeps its last valid pose for display.

use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

use crate::drawing::{DrawLayer, Drawing, Stroke};
use crate::error::SketchError;
use crate::geometry::{Point, Point3};
use crate::linkage::{Linkage, LinkagePose, RootChoice, Wheel};
use crate::params::{choice_field, parameter_set, ParamSpec};
use crate::path::{accumulate, Accumulation, GenerationMode, Path};
use crate::transform::View;

/// Simulation time added per step.
pub const TIME_STEP: f64 = 1.0;

/// Segments used to draw guide circles.
const GUIDE_SEGMENTS: usize = 64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CycloidParams {
    pub wheel1_speed: f64,
    pub wheel2_speed: f64,
    pub canvas_wheel_speed: f64,

    pub wheel1_radius: f64,
    pub wheel2_radius: f64,
    pub wheel1_attachment: f64,
    pub wheel2_attachment: f64,

    pub wheel1_x: f64,
    pub wheel1_y: f64,
    pub wheel2_x: f64,
    pub wheel2_y: f64,

    pub rod1_length: f64,
    pub rod2_length: f64,
    /// Pen position along B→D; above 1 the pen extends past the joint
    pub pen_rod_ratio: f64,

    pub max_steps: usize,
    pub mode: GenerationMode,
    pub use_3d_canvas_rotation: bool,
    /// Draw wheels, rods and joints (planar incremental runs only)
    pub show_guides: bool,

    /// Camera rotation in degrees
    pub view_rot_x: f64,
    pub view_rot_y: f64,
}

impl Default for CycloidParams {
    fn default() -> Self {
        Self {
            wheel1_speed: 0.02,
            wheel2_speed: 0.05,
            canvas_wheel_speed: 0.005,
            wheel1_radius: 100.0,
            wheel2_radius: 80.0,
            wheel1_attachment: 60.0,
            wheel2_attachment: 50.0,
            wheel1_x: -150.0,
            wheel1_y: 0.0,
            wheel2_x: 150.0,
            wheel2_y: 0.0,
            rod1_length: 250.0,
            rod2_length: 250.0,
            pen_rod_ratio: 1.3,
            max_steps: 2000,
            mode: GenerationMode::Incremental,
            use_3d_canvas_rotation: false,
            show_guides: true,
            view_rot_x: 0.3_f64.to_degrees(),
            view_rot_y: (-0.4_f64).to_degrees(),
        }
    }
}

choice_field!(GenerationMode, [GenerationMode::Incremental, GenerationMode::Full]);

const CYCLOID_PARAMS: &[ParamSpec] = &[
    ParamSpec::number("max_steps", "Simulation Steps", 100.0, 5000.0, 100.0),
    ParamSpec::choice("mode", "Generation", &["Incremental", "Full"]),
    ParamSpec::toggle("use_3d_canvas_rotation", "3D Canvas Rotation"),
    ParamSpec::number("wheel1_speed", "Wheel 1 Speed", 0.0, 0.1, 0.001),
    ParamSpec::number("wheel2_speed", "Wheel 2 Speed", 0.0, 0.1, 0.001),
    ParamSpec::number("canvas_wheel_speed", "Canvas Rot Speed", 0.0, 0.05, 0.001),
    ParamSpec::number("wheel1_attachment", "Wheel 1 Attach Dist", 0.0, 100.0, 1.0),
    ParamSpec::number("wheel2_attachment", "Wheel 2 Attach Dist", 0.0, 100.0, 1.0),
    ParamSpec::number("wheel1_radius", "Wheel 1 Radius", 10.0, 200.0, 1.0),
    ParamSpec::number("wheel2_radius", "Wheel 2 Radius", 10.0, 200.0, 1.0),
    ParamSpec::number("wheel1_x", "Wheel 1 X", -400.0, 400.0, 1.0),
    ParamSpec::number("wheel1_y", "Wheel 1 Y", -400.0, 400.0, 1.0),
    ParamSpec::number("wheel2_x", "Wheel 2 X", -400.0, 400.0, 1.0),
    ParamSpec::number("wheel2_y", "Wheel 2 Y", -400.0, 400.0, 1.0),
    ParamSpec::number("rod1_length", "Rod 1 Length", 50.0, 400.0, 1.0),
    ParamSpec::number("rod2_length", "Rod 2 Length", 50.0, 400.0, 1.0),
    ParamSpec::number("pen_rod_ratio", "Pen Rod Ratio", 0.0, 2.0, 0.1),
    ParamSpec::toggle("show_guides", "Show Guides"),
    ParamSpec::number("view_rot_x", "View X Rotation", -180.0, 180.0, 1.0),
    ParamSpec::number("view_rot_y", "View Y Rotation", -180.0, 180.0, 1.0),
];

parameter_set!(CycloidParams, "cycloid", CYCLOID_PARAMS, [
    max_steps, mode, use_3d_canvas_rotation,
    wheel1_speed, wheel2_speed, canvas_wheel_speed,
    wheel1_attachment, wheel2_attachment, wheel1_radius, wheel2_radius,
    wheel1_x, wheel1_y, wheel2_x, wheel2_y,
    rod1_length, rod2_length, pen_rod_ratio,
    show_guides, view_rot_x, view_rot_y,
]);

impl CycloidParams {
    pub fn linkage(&self) -> Linkage {
        Linkage {
            first: Wheel {
                center: Point::new(self.wheel1_x, self.wheel1_y),
                radius: self.wheel1_radius,
                attachment: self.wheel1_attachment,
                speed: self.wheel1_speed,
            },
            second: Wheel {
                center: Point::new(self.wheel2_x, self.wheel2_y),
                radius: self.wheel2_radius,
                attachment: self.wheel2_attachment,
                speed: self.wheel2_speed,
            },
            first_rod: self.rod1_length,
            second_rod: self.rod2_length,
            pen_ratio: self.pen_rod_ratio,
            root: RootChoice::PositiveCross,
        }
    }

    /// Where the pen lands on the turning canvas at `time`.
    pub fn canvas_point(&self, pen: Point, time: f64) -> Point3 {
        let angle = time * self.canvas_wheel_speed;
        if self.use_3d_canvas_rotation {
            let (sin, cos) = angle.sin_cos();
            Point3::new(pen.x, pen.y * cos, pen.y * sin)
        } else {
            Point3::from(pen.rotate(-angle))
        }
    }

    pub fn view(&self) -> View {
        View::new(self.view_rot_x, self.view_rot_y, 0.0, 1.0)
    }
}

/// Progress of one simulation run.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SimulationState {
    pub time: f64,
    pub step: usize,
    /// Last successfully solved pose
    pub pose: Option<LinkagePose>,
    /// Set when the linkage failed; cleared only by a restart
    pub error: Option<SketchError>,
}

impl SimulationState {
    pub fn joint(&self) -> Option<Point> {
        self.pose.map(|pose| pose.joint)
    }

    pub fn pen(&self) -> Option<Point> {
        self.pose.map(|pose| pose.pen)
    }

    pub fn is_frozen(&self) -> bool {
        self.error.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct CycloidSketch {
    params: CycloidParams,
    state: SimulationState,
    path: Path<Point3>,
}

impl CycloidSketch {
    pub fn new(params: CycloidParams) -> Self {
        let mut sketch = Self { params, state: SimulationState::default(), path: Path::new() };
        sketch.restart();
        sketch
    }

    pub fn params(&self) -> &CycloidParams {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut CycloidParams {
        &mut self.params
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn path(&self) -> &Path<Point3> {
        &self.path
    }

    /// Reset time and path, then compute the first point (incremental) or
    /// the whole path (full).
    pub fn restart(&mut self) {
        self.state = SimulationState::default();
        self.path.clear();

        match self.params.mode {
            GenerationMode::Full => {
                self.run_full();
            }
            GenerationMode::Incremental => match self.params.linkage().solve(0.0) {
                Ok(pose) => {
                    self.path.push(self.params.canvas_point(pose.pen, 0.0));
                    self.state.pose = Some(pose);
                }
                Err(err) => {
                    tracing::warn!(%err, "initial configuration is invalid");
                    self.state.error = Some(err);
                }
            },
        }
        tracing::info!(mode = ?self.params.mode, points = self.path.len(), "cycloid restarted");
    }

    /// Still advancing: not frozen and below `max_steps`.
    pub fn is_running(&self) -> bool {
        !self.state.is_frozen() && self.state.step < self.params.max_steps
    }

    /// Solve the next step and append the pen position.
    ///
    /// Returns false when nothing happened: finished, frozen, or frozen by
    /// this very step.
    pub fn advance(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }

        let time = self.state.time;
        match self.params.linkage().solve(time) {
            Ok(pose) => {
                self.path.push(self.params.canvas_point(pose.pen, time));
                self.state.pose = Some(pose);
                self.state.time += TIME_STEP;
                self.state.step += 1;
                true
            }
            Err(err) => {
                if let SketchError::LinkageUnsolvable { distance, .. } = err {
                    tracing::warn!(step = self.state.step, distance, "rods cannot connect; simulation frozen");
                }
                self.state.error = Some(err);
                false
            }
        }
    }

    /// Advance up to `steps` times. Returns how many steps were taken.
    pub fn advance_by(&mut self, steps: usize) -> usize {
        (0..steps).take_while(|_| self.advance()).count()
    }

    /// Run from the current state until finished or frozen.
    pub fn materialize(&mut self) -> Accumulation {
        while self.advance() {}
        self.summary()
    }

    fn summary(&self) -> Accumulation {
        Accumulation {
            requested: self.params.max_steps,
            evaluated: self.state.step,
            accepted: self.path.len(),
            error: self.state.error.clone(),
        }
    }

    fn run_full(&mut self) -> Accumulation {
        let params = self.params.clone();
        let linkage = params.linkage();
        let mut last_pose = None;

        let outcome = accumulate(&mut self.path, params.max_steps, |index| {
            let time = index as f64 * TIME_STEP;
            let pose = linkage.solve(time)?;
            last_pose = Some(pose);
            Ok(params.canvas_point(pose.pen, time))
        });

        self.state = SimulationState {
            time: outcome.evaluated as f64 * TIME_STEP,
            step: outcome.evaluated,
            pose: last_pose,
            error: outcome.error.clone(),
        };

        match &outcome.error {
            Some(err) => tracing::warn!(step = outcome.evaluated, %err, "linkage error during full calculation"),
            None => tracing::info!(points = outcome.accepted, "full path calculated"),
        }
        outcome
    }

    pub fn drawing(&self) -> Drawing {
        let mut drawing = Drawing::new(self.params.view());

        let show_guides = self.params.show_guides
            && self.params.mode == GenerationMode::Incremental
            && !self.params.use_3d_canvas_rotation;
        if show_guides {
            drawing.push_layer(self.guides());
        }

        if self.path.len() > 1 {
            drawing.push_layer(
                DrawLayer::new("path", 1.0).with_stroke(Stroke::Spline {
                    points: self.path.points().to_vec(),
                    closed: false,
                }),
            );
        }
        drawing
    }

    /// Wheels, attachment points, rods, joint and pen at the last solved time.
    fn guides(&self) -> DrawLayer {
        let params = &self.params;
        let linkage = params.linkage();
        let shown_time = (self.state.time - TIME_STEP).max(0.0);
        let a = linkage.first.attachment_at(shown_time);
        let b = linkage.second.attachment_at(shown_time);

        let mut layer = DrawLayer::new("guides", 0.6)
            .with_stroke(circle(linkage.first.center, linkage.first.radius))
            .with_stroke(circle(linkage.second.center, linkage.second.radius))
            .with_stroke(circle(a, 5.0))
            .with_stroke(circle(b, 5.0));

        if let Some(pose) = self.state.pose {
            let joint = Point3::from(pose.joint);
            let mut rods = vec![(Point3::from(a), joint), (Point3::from(b), joint)];
            if params.pen_rod_ratio > 1.0 || params.pen_rod_ratio < 0.0 {
                rods.push((joint, Point3::from(pose.pen)));
            }
            layer = layer
                .with_stroke(Stroke::Segments(rods))
                .with_stroke(circle(pose.joint, 4.0))
                .with_stroke(circle(pose.pen, 3.5));
        }
        layer
    }
}

fn circle(center: Point, radius: f64) -> Stroke {
    Stroke::Polyline(
        (0..=GUIDE_SEGMENTS)
            .map(|i| Point3::from(center + Point::from_angle(TAU * i as f64 / GUIDE_SEGMENTS as f64) * radius))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ParameterSet;
    use approx::assert_abs_diff_eq;

    fn short_run(mode: GenerationMode) -> CycloidParams {
        CycloidParams { max_steps: 400, mode, ..Default::default() }
    }

    #[test]
    fn restart_stores_first_point() {
        let sketch = CycloidSketch::new(CycloidParams::default());
        assert_eq!(sketch.path().len(), 1);
        assert_eq!(sketch.state().step, 0);
        assert!(sketch.is_running());
        assert!(sketch.state().pen().is_some());
    }

    #[test]
    fn incremental_matches_full() {
        let mut incremental = CycloidSketch::new(short_run(GenerationMode::Incremental));
        let steps = incremental.advance_by(10_000);
        assert_eq!(steps, 400);

        let full = CycloidSketch::new(short_run(GenerationMode::Full));
        assert_eq!(incremental.path().points(), full.path().points());
        assert_eq!(incremental.state().step, full.state().step);
    }

    #[test]
    fn incremental_matches_full_in_3d() {
        let mut params = short_run(GenerationMode::Incremental);
        params.use_3d_canvas_rotation = true;
        let mut incremental = CycloidSketch::new(params.clone());
        incremental.materialize();

        params.mode = GenerationMode::Full;
        let full = CycloidSketch::new(params);
        assert_eq!(incremental.path().points(), full.path().points());
        assert!(full.path().points().iter().any(|p| p.z.abs() > 1.0));
    }

    #[test]
    fn consecutive_points_are_spaced() {
        let mut sketch = CycloidSketch::new(CycloidParams::default());
        sketch.materialize();
        for pair in sketch.path().points().windows(2) {
            assert!(pair[0].distance(pair[1]) > 0.1);
        }
    }

    #[test]
    fn max_steps_is_a_soft_stop() {
        let mut sketch = CycloidSketch::new(CycloidParams { max_steps: 100, ..Default::default() });
        let outcome = sketch.materialize();
        assert!(outcome.is_complete());
        assert_eq!(sketch.state().step, 100);
        assert!(!sketch.advance());
        assert!(!sketch.state().is_frozen());
    }

    #[test]
    fn unsolvable_linkage_freezes() {
        // Rods reach at t = 0 but not once the attachments swing apart
        let params = CycloidParams { rod1_length: 150.0, rod2_length: 150.0, ..Default::default() };
        let mut sketch = CycloidSketch::new(params);
        assert!(sketch.is_running());

        let outcome = sketch.materialize();
        let frozen_at = sketch.state().step;
        assert!(frozen_at > 0);
        assert!(frozen_at < 2000);
        assert!(matches!(outcome.error, Some(SketchError::LinkageUnsolvable { .. })));
        assert_eq!(outcome.shortfall(), 2000 - frozen_at);

        // Frozen stays frozen and keeps the last pose
        assert!(!sketch.advance());
        assert_eq!(sketch.state().step, frozen_at);
        assert!(sketch.state().joint().is_some());

        sketch.restart();
        assert_eq!(sketch.state().step, 0);
        assert!(!sketch.state().is_frozen());
        assert_eq!(sketch.path().len(), 1);
    }

    #[test]
    fn full_mode_reports_same_freeze() {
        let broken = CycloidParams { rod1_length: 150.0, rod2_length: 150.0, ..Default::default() };
        let mut incremental = CycloidSketch::new(broken.clone());
        incremental.materialize();

        let full = CycloidSketch::new(CycloidParams { mode: GenerationMode::Full, ..broken });
        assert_eq!(full.state().step, incremental.state().step);
        assert_eq!(full.path().points(), incremental.path().points());
        assert!(full.state().is_frozen());
    }

    #[test]
    fn impossible_start_freezes_immediately() {
        let params = CycloidParams { rod1_length: 50.0, rod2_length: 50.0, ..Default::default() };
        let sketch = CycloidSketch::new(params);
        assert!(sketch.path().is_empty());
        assert!(sketch.state().is_frozen());
        assert!(!sketch.is_running());
    }

    #[test]
    fn planar_canvas_rotates_backwards() {
        let params = CycloidParams { canvas_wheel_speed: 0.01, ..Default::default() };
        let p = params.canvas_point(Point::new(100.0, 0.0), 50.0);
        // α = 0.5, rotated by −α
        assert_abs_diff_eq!(p.x, 100.0 * 0.5_f64.cos(), epsilon = 1e-9);
        assert_abs_diff_eq!(p.y, -100.0 * 0.5_f64.sin(), epsilon = 1e-9);
        assert_eq!(p.z, 0.0);
    }

    #[test]
    fn guides_only_for_planar_incremental() {
        let sketch = CycloidSketch::new(CycloidParams::default());
        let names: Vec<_> = sketch.drawing().layers.iter().map(|l| l.name.clone()).collect();
        assert_eq!(names, vec!["guides"]);

        let mut sketch = CycloidSketch::new(short_run(GenerationMode::Full));
        sketch.materialize();
        let names: Vec<_> = sketch.drawing().layers.iter().map(|l| l.name.clone()).collect();
        assert_eq!(names, vec!["path"]);
    }

    #[test]
    fn params_are_reachable_by_name() {
        let mut params = CycloidParams::default();
        params.set_from_str("mode", "full").unwrap();
        assert_eq!(params.mode, GenerationMode::Full);
        params.nudge("rod1_length", 500).unwrap();
        assert_eq!(params.rod1_length, 400.0);
        for spec in params.specs() {
            assert!(params.get(spec.name).is_some(), "{}", spec.name);
        }
    }
}
