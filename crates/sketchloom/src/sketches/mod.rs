//! The five sketches and a single enum to drive any of them.
//!
//! Controllers (the TUI, the `render` command, recipes) only see [`Sketch`]:
//! they change parameters by name, trigger regeneration, step the cycloid
//! and read back a [`Drawing`].

pub mod cycloid;
pub mod lissajous3d;
pub mod lissajous_spiral;
pub mod moire;
pub mod spirograph;

pub use cycloid::{CycloidParams, CycloidSketch, SimulationState};
pub use lissajous3d::{Lissajous3dParams, Lissajous3dSketch};
pub use lissajous_spiral::{DrawMode, LissajousSpiralParams, LissajousSpiralSketch};
pub use moire::{Layer, MoireDrawMode, MoireParams, MoireSketch};
pub use spirograph::{PolarSpirographSketch, SpirographParams};

use crate::config::SketchConfig;
use crate::drawing::Drawing;
use crate::error::{Result, SketchError};
use crate::params::{ParamValue, ParameterSet};
use crate::path::{Accumulation, GenerationMode};
use crate::transform::View;

/// Available sketch types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SketchKind {
    Cycloid,
    Lissajous3d,
    LissajousSpiral,
    Spirograph,
    Moire,
}

impl SketchKind {
    /// Get all available sketches.
    pub fn all() -> &'static [SketchKind] {
        &[
            SketchKind::Cycloid,
            SketchKind::Lissajous3d,
            SketchKind::LissajousSpiral,
            SketchKind::Spirograph,
            SketchKind::Moire,
        ]
    }

    /// Get the sketch name as used on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            SketchKind::Cycloid => "cycloid",
            SketchKind::Lissajous3d => "lissajous3d",
            SketchKind::LissajousSpiral => "lissajous-spiral",
            SketchKind::Spirograph => "spirograph",
            SketchKind::Moire => "moire",
        }
    }

    /// Parse sketch from string.
    pub fn from_name(name: &str) -> Option<SketchKind> {
        match name.to_lowercase().replace('_', "-").as_str() {
            "cycloid" | "linkage" | "drawing-machine" => Some(SketchKind::Cycloid),
            "lissajous3d" | "lissajous-3d" | "3d" => Some(SketchKind::Lissajous3d),
            "lissajous-spiral" | "lissajous" | "spiral" => Some(SketchKind::LissajousSpiral),
            "spirograph" | "polar" | "polar-spirograph" => Some(SketchKind::Spirograph),
            "moire" | "moiré" | "interpolated-moire" => Some(SketchKind::Moire),
            _ => None,
        }
    }

    /// Like [`SketchKind::from_name`], with an error naming the input.
    pub fn parse(name: &str) -> Result<SketchKind> {
        SketchKind::from_name(name).ok_or_else(|| SketchError::UnknownSketch(name.to_string()))
    }

    pub fn description(&self) -> &'static str {
        match self {
            SketchKind::Cycloid => "Two-wheel drawing machine; pen on a pair of linked rods",
            SketchKind::Lissajous3d => "Lissajous curve in three dimensions with a rotatable view",
            SketchKind::LissajousSpiral => "Lissajous curve repeated as rotated, spiraled and nested copies",
            SketchKind::Spirograph => "Polar curve whose radius is a sum of three sine terms",
            SketchKind::Moire => "Jittered point ring with nested copies and overlaid layers",
        }
    }

    /// Prefix of exported file names.
    pub fn export_prefix(&self) -> &'static str {
        match self {
            SketchKind::Cycloid => "GenerativeCycloid",
            SketchKind::Lissajous3d => "Lissajous3D",
            SketchKind::LissajousSpiral => "LissajousSpiral",
            SketchKind::Spirograph => "Spirograph",
            SketchKind::Moire => "InterpolatedMoire",
        }
    }
}

/// Whether the last generation step succeeded.
#[derive(Debug, Clone, PartialEq)]
pub enum SketchStatus {
    /// Cycloid still advancing
    Running { step: usize, max_steps: usize },
    /// Cycloid reached `max_steps`
    Finished,
    /// Cycloid linkage failed; the last valid pose is kept
    Frozen { step: usize, error: SketchError },
    /// Sketch computes its whole drawing at once
    Static,
}

impl SketchStatus {
    pub fn is_frozen(&self) -> bool {
        matches!(self, SketchStatus::Frozen { .. })
    }

    /// Short text for status lines.
    pub fn label(&self) -> String {
        match self {
            SketchStatus::Running { step, max_steps } => format!("running {}/{}", step, max_steps),
            SketchStatus::Finished => "finished".to_string(),
            SketchStatus::Frozen { step, error } => format!("frozen at step {}: {}", step, error),
            SketchStatus::Static => "ready".to_string(),
        }
    }
}

/// Any sketch, behind one interface.
#[derive(Debug, Clone)]
pub enum Sketch {
    Cycloid(CycloidSketch),
    Lissajous3d(Lissajous3dSketch),
    LissajousSpiral(LissajousSpiralSketch),
    Spirograph(PolarSpirographSketch),
    Moire(MoireSketch),
}

impl Sketch {
    /// A sketch of `kind` with default parameters.
    pub fn new(kind: SketchKind) -> Self {
        Sketch::from_config(SketchConfig::default_for(kind))
    }

    pub fn from_config(config: SketchConfig) -> Self {
        match config {
            SketchConfig::Cycloid(params) => Sketch::Cycloid(CycloidSketch::new(params)),
            SketchConfig::Lissajous3d(params) => Sketch::Lissajous3d(Lissajous3dSketch::new(params)),
            SketchConfig::LissajousSpiral(params) => Sketch::LissajousSpiral(LissajousSpiralSketch::new(params)),
            SketchConfig::Spirograph(params) => Sketch::Spirograph(PolarSpirographSketch::new(params)),
            SketchConfig::Moire(params) => Sketch::Moire(MoireSketch::new(params)),
        }
    }

    /// Current parameters as a config.
    pub fn config(&self) -> SketchConfig {
        match self {
            Sketch::Cycloid(s) => SketchConfig::Cycloid(s.params().clone()),
            Sketch::Lissajous3d(s) => SketchConfig::Lissajous3d(s.params().clone()),
            Sketch::LissajousSpiral(s) => SketchConfig::LissajousSpiral(s.params().clone()),
            Sketch::Spirograph(s) => SketchConfig::Spirograph(s.params().clone()),
            Sketch::Moire(s) => SketchConfig::Moire(s.params().clone()),
        }
    }

    pub fn kind(&self) -> SketchKind {
        match self {
            Sketch::Cycloid(_) => SketchKind::Cycloid,
            Sketch::Lissajous3d(_) => SketchKind::Lissajous3d,
            Sketch::LissajousSpiral(_) => SketchKind::LissajousSpiral,
            Sketch::Spirograph(_) => SketchKind::Spirograph,
            Sketch::Moire(_) => SketchKind::Moire,
        }
    }

    pub fn params(&self) -> &dyn ParameterSet {
        match self {
            Sketch::Cycloid(s) => s.params(),
            Sketch::Lissajous3d(s) => s.params(),
            Sketch::LissajousSpiral(s) => s.params(),
            Sketch::Spirograph(s) => s.params(),
            Sketch::Moire(s) => s.params(),
        }
    }

    /// Raw parameter access. Call [`Sketch::refresh`] after changing
    /// anything through it.
    pub fn params_mut(&mut self) -> &mut dyn ParameterSet {
        match self {
            Sketch::Cycloid(s) => s.params_mut(),
            Sketch::Lissajous3d(s) => s.params_mut(),
            Sketch::LissajousSpiral(s) => s.params_mut(),
            Sketch::Spirograph(s) => s.params_mut(),
            Sketch::Moire(s) => s.params_mut(),
        }
    }

    /// Parse and assign one parameter, then refresh.
    pub fn set_param(&mut self, name: &str, raw: &str) -> Result<()> {
        self.params_mut().set_from_str(name, raw)?;
        self.refresh();
        Ok(())
    }

    /// Move one parameter by `steps` increments, then refresh.
    pub fn nudge(&mut self, name: &str, steps: i32) -> Result<ParamValue> {
        let value = self.params_mut().nudge(name, steps)?;
        self.refresh();
        Ok(value)
    }

    /// Start over: restart the simulation, resample curves, or re-roll the
    /// moiré random field.
    pub fn regenerate(&mut self) {
        match self {
            Sketch::Cycloid(s) => s.restart(),
            Sketch::Lissajous3d(s) => {
                s.regenerate();
            }
            Sketch::LissajousSpiral(_) => {}
            Sketch::Spirograph(s) => {
                s.regenerate();
            }
            Sketch::Moire(s) => s.regenerate(),
        }
    }

    /// Follow a parameter change.
    ///
    /// Same as [`Sketch::regenerate`] except for the moiré, which keeps its
    /// random field.
    pub fn refresh(&mut self) {
        match self {
            Sketch::Moire(s) => s.refresh(),
            other => other.regenerate(),
        }
    }

    /// Advance an incremental cycloid by up to `steps`. Returns the steps
    /// taken; always 0 for other sketches.
    pub fn advance(&mut self, steps: usize) -> usize {
        match self {
            Sketch::Cycloid(s) if s.params().mode == GenerationMode::Incremental => s.advance_by(steps),
            _ => 0,
        }
    }

    /// Make sure the whole drawing is computed, as an export needs.
    pub fn materialize(&mut self) -> Accumulation {
        match self {
            Sketch::Cycloid(s) => s.materialize(),
            Sketch::Lissajous3d(s) => s.last_pass().clone(),
            Sketch::Spirograph(s) => Accumulation::complete(s.path().len()),
            Sketch::LissajousSpiral(_) | Sketch::Moire(_) => Accumulation::complete(self.drawing().point_count()),
        }
    }

    pub fn status(&self) -> SketchStatus {
        match self {
            Sketch::Cycloid(s) => {
                let state = s.state();
                match &state.error {
                    Some(error) => SketchStatus::Frozen { step: state.step, error: error.clone() },
                    None if s.is_running() => SketchStatus::Running { step: state.step, max_steps: s.params().max_steps },
                    None => SketchStatus::Finished,
                }
            }
            _ => SketchStatus::Static,
        }
    }

    pub fn drawing(&self) -> Drawing {
        match self {
            Sketch::Cycloid(s) => s.drawing(),
            Sketch::Lissajous3d(s) => s.drawing(),
            Sketch::LissajousSpiral(s) => s.drawing(),
            Sketch::Spirograph(s) => s.drawing(),
            Sketch::Moire(s) => s.drawing(),
        }
    }

    /// Camera the drawing is seen through.
    pub fn view(&self) -> View {
        match self {
            Sketch::Cycloid(s) => s.params().view(),
            Sketch::Lissajous3d(s) => s.params().view(),
            Sketch::LissajousSpiral(s) => s.params().view(),
            Sketch::Spirograph(_) | Sketch::Moire(_) => View::default(),
        }
    }

    /// Point the camera. Returns false when this sketch has no camera
    /// (planar sketches, or the Lissajous spiral with its 3D view off).
    ///
    /// The cycloid keeps only the x/y rotation; the Lissajous spiral keeps
    /// x/y rotation and zoom.
    pub fn set_view(&mut self, view: View) -> bool {
        match self {
            Sketch::Cycloid(s) => {
                let params = s.params_mut();
                params.view_rot_x = view.rot_x;
                params.view_rot_y = view.rot_y;
                true
            }
            Sketch::Lissajous3d(s) => {
                let params = s.params_mut();
                params.rot_x = view.rot_x;
                params.rot_y = view.rot_y;
                params.rot_z = view.rot_z;
                params.scale_factor = view.scale;
                true
            }
            Sketch::LissajousSpiral(s) if s.params().enable_3d_view => {
                let params = s.params_mut();
                params.view_rot_x = view.rot_x;
                params.view_rot_y = view.rot_y;
                params.zoom = view.scale;
                true
            }
            _ => false,
        }
    }

    /// Fix the random seed of sketches that use one. Takes effect on the
    /// next regenerate.
    pub fn set_seed(&mut self, seed: Option<u64>) -> bool {
        match self {
            Sketch::Moire(s) => {
                s.set_seed(seed);
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::ViewPreset;

    #[test]
    fn names_round_trip() {
        for kind in SketchKind::all() {
            assert_eq!(SketchKind::from_name(kind.name()), Some(*kind));
        }
        assert_eq!(SketchKind::from_name("Lissajous_Spiral"), Some(SketchKind::LissajousSpiral));
        assert_eq!(SketchKind::from_name("polar"), Some(SketchKind::Spirograph));
        assert!(matches!(SketchKind::parse("nope"), Err(SketchError::UnknownSketch(_))));
    }

    #[test]
    fn every_sketch_draws_by_default() {
        for kind in SketchKind::all() {
            let mut sketch = Sketch::new(*kind);
            sketch.set_seed(Some(1));
            sketch.regenerate();
            sketch.materialize();
            let drawing = sketch.drawing();
            assert!(drawing.point_count() > 0, "{} drew nothing", kind.name());
            assert_eq!(sketch.kind(), *kind);
        }
    }

    #[test]
    fn every_spec_has_a_field() {
        for kind in SketchKind::all() {
            let sketch = Sketch::new(*kind);
            for spec in sketch.params().specs() {
                assert!(sketch.params().get(spec.name).is_some(), "{}: {}", kind.name(), spec.name);
            }
        }
    }

    #[test]
    fn set_param_refreshes() {
        let mut sketch = Sketch::new(SketchKind::Spirograph);
        let before = sketch.drawing().point_count();
        sketch.set_param("num_points", "500").unwrap();
        assert!(sketch.drawing().point_count() < before);
        assert!(sketch.set_param("bogus", "1").is_err());
    }

    #[test]
    fn cycloid_status_tracks_simulation() {
        let mut sketch = Sketch::new(SketchKind::Cycloid);
        assert!(matches!(sketch.status(), SketchStatus::Running { step: 0, .. }));
        assert_eq!(sketch.advance(10), 10);
        assert!(matches!(sketch.status(), SketchStatus::Running { step: 10, .. }));
        sketch.materialize();
        assert_eq!(sketch.status(), SketchStatus::Finished);
        assert_eq!(Sketch::new(SketchKind::Moire).status(), SketchStatus::Static);
    }

    #[test]
    fn frozen_cycloid_reports_error() {
        let mut sketch = Sketch::new(SketchKind::Cycloid);
        sketch.set_param("rod1_length", "150").unwrap();
        sketch.set_param("rod2_length", "150").unwrap();
        sketch.materialize();
        assert!(sketch.status().is_frozen());
        assert!(sketch.status().label().starts_with("frozen"));
    }

    #[test]
    fn views_map_to_parameters() {
        let mut sketch = Sketch::new(SketchKind::Lissajous3d);
        let view = ViewPreset::Top.apply(sketch.view());
        assert!(sketch.set_view(view));
        assert_eq!(sketch.view(), view);

        let mut flat = Sketch::new(SketchKind::Spirograph);
        assert!(!flat.set_view(view));
        assert!(flat.view().is_identity());

        let mut spiral = Sketch::new(SketchKind::LissajousSpiral);
        assert!(!spiral.set_view(view));
        spiral.set_param("enable_3d_view", "on").unwrap();
        assert!(spiral.set_view(view));
    }
}
