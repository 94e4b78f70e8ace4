//! Serializable sketch configuration.
//!
//! A config names the sketch and carries its parameters:
//!
//! ```yaml
//! sketch: moire
//! params:
//!   n: 12
//!   draw_mode: radial_lines
//!   seed: 7
//! ```
//!
//! Every parameter struct is `#[serde(default)]`, so `params` only needs the
//! values that differ from the defaults.

use serde::{Deserialize, Serialize};

use crate::sketches::{
    CycloidParams, Lissajous3dParams, LissajousSpiralParams, MoireParams, SketchKind, SpirographParams,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "sketch", content = "params", rename_all = "snake_case")]
pub enum SketchConfig {
    Cycloid(CycloidParams),
    Lissajous3d(Lissajous3dParams),
    LissajousSpiral(LissajousSpiralParams),
    Spirograph(SpirographParams),
    Moire(MoireParams),
}

impl SketchConfig {
    pub fn kind(&self) -> SketchKind {
        match self {
            SketchConfig::Cycloid(_) => SketchKind::Cycloid,
            SketchConfig::Lissajous3d(_) => SketchKind::Lissajous3d,
            SketchConfig::LissajousSpiral(_) => SketchKind::LissajousSpiral,
            SketchConfig::Spirograph(_) => SketchKind::Spirograph,
            SketchConfig::Moire(_) => SketchKind::Moire,
        }
    }

    /// Default parameters for `kind`.
    pub fn default_for(kind: SketchKind) -> Self {
        match kind {
            SketchKind::Cycloid => SketchConfig::Cycloid(CycloidParams::default()),
            SketchKind::Lissajous3d => SketchConfig::Lissajous3d(Lissajous3dParams::default()),
            SketchKind::LissajousSpiral => SketchConfig::LissajousSpiral(LissajousSpiralParams::default()),
            SketchKind::Spirograph => SketchConfig::Spirograph(SpirographParams::default()),
            SketchKind::Moire => SketchConfig::Moire(MoireParams::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::GenerationMode;
    use crate::sketches::MoireDrawMode;

    #[test]
    fn partial_params_fill_in_defaults() {
        let yaml = "sketch: moire\nparams:\n  n: 12\n  draw_mode: radial_lines\n  seed: 7\n";
        let config: SketchConfig = serde_yaml::from_str(yaml).unwrap();
        match config {
            SketchConfig::Moire(params) => {
                assert_eq!(params.n, 12);
                assert_eq!(params.draw_mode, MoireDrawMode::RadialLines);
                assert_eq!(params.seed, Some(7));
                assert_eq!(params.radius_scale, MoireParams::default().radius_scale);
            }
            other => panic!("wrong sketch: {:?}", other.kind()),
        }
    }

    #[test]
    fn empty_params_are_defaults() {
        let config: SketchConfig = serde_yaml::from_str("sketch: cycloid\nparams: {}\n").unwrap();
        assert_eq!(config, SketchConfig::default_for(SketchKind::Cycloid));
    }

    #[test]
    fn snake_case_tags() {
        let config: SketchConfig =
            serde_yaml::from_str("sketch: lissajous_spiral\nparams:\n  num_duplicates: 12\n").unwrap();
        assert_eq!(config.kind(), SketchKind::LissajousSpiral);

        let yaml = serde_yaml::to_string(&SketchConfig::default_for(SketchKind::Lissajous3d)).unwrap();
        assert!(yaml.starts_with("sketch: lissajous3d"));
    }

    #[test]
    fn modes_deserialize_by_name() {
        let yaml = "sketch: cycloid\nparams:\n  mode: full\n  max_steps: 50\n";
        match serde_yaml::from_str::<SketchConfig>(yaml).unwrap() {
            SketchConfig::Cycloid(params) => {
                assert_eq!(params.mode, GenerationMode::Full);
                assert_eq!(params.max_steps, 50);
            }
            other => panic!("wrong sketch: {:?}", other.kind()),
        }
    }

    #[test]
    fn unknown_sketch_is_rejected() {
        assert!(serde_yaml::from_str::<SketchConfig>("sketch: teapot\nparams: {}\n").is_err());
    }
}
