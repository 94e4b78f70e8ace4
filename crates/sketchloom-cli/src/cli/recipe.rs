//! Sketch recipe system for declarative layer composition.
//!
//! Recipes are YAML files that place several sketches on one canvas.
//! Each layer names a sketch, its parameters, where it sits and how it is
//! stroked.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use sketchloom::{Drawing, Point, Sketch, SketchConfig, SketchKind};

use super::common::{flag_value, layers_to_svg, read_file, write_output};
use super::error::{CliError, CliResult};

/// A complete recipe defining a layered composition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipe {
    /// Recipe name/title
    pub name: String,

    /// Optional description
    #[serde(default)]
    pub description: Option<String>,

    /// Canvas configuration
    pub canvas: Canvas,

    /// Default style applied to all layers (can be overridden)
    #[serde(default)]
    pub defaults: LayerStyle,

    /// Ordered list of sketch layers (rendered bottom to top)
    pub layers: Vec<Layer>,
}

/// Canvas/output configuration, in drawing units.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Canvas {
    pub width: f64,

    pub height: f64,

    /// Background color (default: white)
    #[serde(default = "default_background")]
    pub background: String,
}

fn default_background() -> String {
    "white".to_string()
}

/// A single sketch layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Layer {
    /// Layer name (for identification)
    pub name: String,

    /// Sketch type (e.g., "moire", "spirograph")
    pub sketch: String,

    /// Sketch parameters; anything left out keeps its default
    #[serde(default)]
    pub params: serde_yaml::Value,

    /// Position of the sketch origin relative to the canvas center
    #[serde(default)]
    pub offset: [f64; 2],

    /// Random seed, for sketches that use one
    #[serde(default)]
    pub seed: Option<u64>,

    /// Layer style (merged with defaults)
    #[serde(default)]
    pub style: LayerStyle,

    /// Whether this layer is enabled
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

/// Style properties for a layer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LayerStyle {
    /// Stroke color
    #[serde(default)]
    pub color: Option<String>,

    /// Stroke width multiplier
    #[serde(default)]
    pub stroke_width: Option<f64>,

    /// Opacity (0.0 to 1.0)
    #[serde(default)]
    pub opacity: Option<f64>,
}

impl LayerStyle {
    /// Merge this style with defaults, preferring self's values.
    pub fn merge_with(&self, defaults: &LayerStyle) -> LayerStyle {
        LayerStyle {
            color: self.color.clone().or_else(|| defaults.color.clone()),
            stroke_width: self.stroke_width.or(defaults.stroke_width),
            opacity: self.opacity.or(defaults.opacity),
        }
    }

    pub fn color_or(&self, fallback: &str) -> String {
        self.color.clone().unwrap_or_else(|| fallback.to_string())
    }

    pub fn stroke_width_or(&self, fallback: f64) -> f64 {
        self.stroke_width.unwrap_or(fallback)
    }

    pub fn opacity_or(&self, fallback: f64) -> f64 {
        self.opacity.unwrap_or(fallback)
    }
}

impl Layer {
    /// The sketch config this layer describes.
    pub fn config(&self, kind: SketchKind) -> CliResult<SketchConfig> {
        let params = match &self.params {
            serde_yaml::Value::Null => serde_yaml::Value::Mapping(serde_yaml::Mapping::new()),
            other => other.clone(),
        };

        // Config tags are the snake_case form of the sketch name
        let mut tagged = serde_yaml::Mapping::new();
        tagged.insert("sketch".into(), kind.name().replace('-', "_").into());
        tagged.insert("params".into(), params);

        Ok(serde_yaml::from_value(serde_yaml::Value::Mapping(tagged))?)
    }
}

/// Result of rendering a recipe.
pub struct RenderedRecipe {
    pub layers: Vec<RenderedLayer>,
    pub canvas: Canvas,
    pub name: String,
}

/// A rendered layer: the sketch drawing, already placed on the canvas.
pub struct RenderedLayer {
    pub name: String,
    pub drawing: Drawing<Point>,
    pub style: LayerStyle,
}

impl Recipe {
    /// Load a recipe from a YAML file.
    pub fn load(path: &str) -> CliResult<Self> {
        Self::parse(&read_file(path)?)
    }

    pub fn parse(content: &str) -> CliResult<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Generate every enabled layer.
    ///
    /// Layers naming an unknown sketch are skipped with a warning; bad
    /// parameters are an error.
    pub fn render(&self) -> CliResult<RenderedRecipe> {
        let center = Point::new(self.canvas.width / 2.0, self.canvas.height / 2.0);
        let mut rendered_layers = Vec::new();

        for layer in &self.layers {
            if !layer.enabled {
                continue;
            }

            let Some(kind) = SketchKind::from_name(&layer.sketch) else {
                warn!(sketch = %layer.sketch, layer = %layer.name, "unknown sketch, skipping layer");
                continue;
            };

            let mut sketch = Sketch::from_config(layer.config(kind)?);
            if layer.seed.is_some() && !sketch.set_seed(layer.seed) {
                warn!(layer = %layer.name, "seed ignored, sketch has no random field");
            }
            sketch.regenerate();
            sketch.materialize();

            let mut drawing = sketch.drawing().project();
            drawing.translate(center + Point::new(layer.offset[0], layer.offset[1]));

            rendered_layers.push(RenderedLayer {
                name: layer.name.clone(),
                drawing,
                style: layer.style.merge_with(&self.defaults),
            });
        }

        Ok(RenderedRecipe {
            layers: rendered_layers,
            canvas: self.canvas.clone(),
            name: self.name.clone(),
        })
    }
}

impl RenderedRecipe {
    pub fn point_count(&self) -> usize {
        self.layers.iter().map(|l| l.drawing.point_count()).sum()
    }

    /// Export to SVG string.
    pub fn to_svg(&self) -> String {
        let mut svg = format!(
            r##"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg"
     width="{:.2}" height="{:.2}"
     viewBox="0 0 {:.2} {:.2}">
  <title>{}</title>
  <rect width="100%" height="100%" fill="{}"/>
"##,
            self.canvas.width, self.canvas.height,
            self.canvas.width, self.canvas.height,
            self.name,
            self.canvas.background
        );

        for layer in &self.layers {
            let color = layer.style.color_or("black");
            let stroke_width = layer.style.stroke_width_or(1.0);
            let opacity = layer.style.opacity_or(1.0);

            svg.push_str(&format!(
                "<g id=\"{}\" opacity=\"{}\">\n",
                layer.name, opacity
            ));
            svg.push_str(&layers_to_svg(&layer.drawing, &color, stroke_width));
            svg.push_str("</g>\n");
        }

        svg.push_str("</svg>\n");
        svg
    }
}

/// Execute the recipe command.
pub fn cmd_recipe(args: &[String]) -> CliResult {
    if args.is_empty() {
        print_usage();
        return Ok(());
    }

    let mut recipe_path: Option<&str> = None;
    let mut output_path = "output.svg";

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "-o" | "--output" => output_path = flag_value(args, &mut i, "--output")?,
            "-h" | "--help" => {
                print_usage();
                return Ok(());
            }
            "--example" => {
                print!("{}", EXAMPLE_RECIPE);
                return Ok(());
            }
            arg if !arg.starts_with('-') => recipe_path = Some(arg),
            other => return Err(CliError::usage(format!("unknown option '{}'", other))),
        }
        i += 1;
    }

    let Some(recipe_path) = recipe_path else {
        print_usage();
        return Err(CliError::usage("no recipe file specified"));
    };

    let recipe = Recipe::load(recipe_path)?;
    info!(
        recipe = %recipe.name,
        width = recipe.canvas.width,
        height = recipe.canvas.height,
        layers = recipe.layers.len(),
        "loaded recipe"
    );

    let rendered = recipe.render()?;
    info!(
        points = rendered.point_count(),
        layers = rendered.layers.len(),
        "generated recipe"
    );

    write_output(output_path, rendered.to_svg().as_bytes())?;
    if output_path != "-" {
        eprintln!("Wrote: {}", output_path);
    }
    Ok(())
}

fn print_usage() {
    eprintln!("sketchloom recipe - Render layered sketch compositions from YAML");
    eprintln!();
    eprintln!("USAGE:");
    eprintln!("    sketchloom recipe <recipe.yaml> [OPTIONS]");
    eprintln!();
    eprintln!("OPTIONS:");
    eprintln!("    -o, --output <file>    Output SVG file (- for stdout, default: output.svg)");
    eprintln!("    --example              Print an example recipe YAML");
    eprintln!("    -h, --help             Show this help");
    eprintln!();
    eprintln!("EXAMPLE:");
    eprintln!("    sketchloom recipe my_design.yaml -o my_design.svg");
}

const EXAMPLE_RECIPE: &str = r##"# Example sketchloom recipe
name: "Layered Sketch Demo"
description: "A moire ring over a spirograph, with a Lissajous accent"

canvas:
  width: 800
  height: 800
  background: "white"

defaults:
  color: "#333333"
  stroke_width: 0.5
  opacity: 1.0

layers:
  - name: spirograph_base
    sketch: spirograph
    params:
      scale_factor: 120
      f2: 7
    style:
      color: "#999999"
      opacity: 0.6

  - name: moire_rings
    sketch: moire
    seed: 42
    params:
      n: 80
      radius_scale: 40
      num_layers: 2
    style:
      color: "#1d3557"
      stroke_width: 0.75

  - name: lissajous_accent
    sketch: lissajous-spiral
    offset: [0, 0]
    params:
      num_duplicates: 8
      number_of_offset_cycles: 0
    style:
      color: "#e63946"
"##;
