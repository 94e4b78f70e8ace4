//! Render command: regenerate one sketch and export it.

use sketchloom::{Sketch, SketchConfig, SketchKind};
use tracing::{info, warn};

use super::common::{
    drawing_to_json, drawing_to_svg, encode_png, flag_value, load_config, parse_assignment, parse_number,
    render_to_image, timestamped_filename, write_output, OutputFormat,
};
use super::error::{CliError, CliResult};

const DEFAULT_PNG_WIDTH: u32 = 2400;
const DEFAULT_PNG_HEIGHT: u32 = 2400;

/// Execute the render command.
pub fn cmd_render(args: &[String]) -> CliResult {
    let mut sketch_name: Option<&str> = None;
    let mut config_path: Option<&str> = None;
    let mut assignments: Vec<&str> = Vec::new();
    let mut output_path: Option<String> = None;
    let mut format = OutputFormat::Svg;
    let mut seed: Option<u64> = None;
    let mut width = DEFAULT_PNG_WIDTH;
    let mut height = DEFAULT_PNG_HEIGHT;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "-c" | "--config" => config_path = Some(flag_value(args, &mut i, "--config")?),
            "--set" => assignments.push(flag_value(args, &mut i, "--set")?),
            "-o" | "--output" => output_path = Some(flag_value(args, &mut i, "--output")?.to_string()),
            "-f" | "--format" => {
                let name = flag_value(args, &mut i, "--format")?;
                format = OutputFormat::from_name(name)
                    .ok_or_else(|| CliError::usage(format!("unknown format '{}' (svg, json, png)", name)))?;
            }
            "--seed" => seed = Some(parse_number(flag_value(args, &mut i, "--seed")?, "--seed")?),
            "--width" => width = parse_number(flag_value(args, &mut i, "--width")?, "--width")?,
            "--height" => height = parse_number(flag_value(args, &mut i, "--height")?, "--height")?,
            "-h" | "--help" => {
                print_usage();
                return Ok(());
            }
            arg if !arg.starts_with('-') => {
                if sketch_name.is_none() {
                    sketch_name = Some(arg);
                }
            }
            other => return Err(CliError::usage(format!("unknown option '{}'", other))),
        }
        i += 1;
    }

    let config = match (sketch_name, config_path) {
        (_, Some(path)) => {
            let config = load_config(path)?;
            if let Some(name) = sketch_name {
                let kind = SketchKind::parse(name)?;
                if kind != config.kind() {
                    return Err(CliError::usage(format!(
                        "{} holds a {} config, not {}",
                        path,
                        config.kind().name(),
                        kind.name()
                    )));
                }
            }
            config
        }
        (Some(name), None) => SketchConfig::default_for(SketchKind::parse(name)?),
        (None, None) => {
            print_usage();
            return Err(CliError::usage("no sketch given"));
        }
    };

    let kind = config.kind();
    let mut sketch = Sketch::from_config(config);
    for raw in assignments {
        let (name, value) = parse_assignment(raw)?;
        sketch.set_param(name, value)?;
    }
    if seed.is_some() && !sketch.set_seed(seed) {
        warn!(sketch = kind.name(), "--seed ignored, sketch has no random field");
    }

    sketch.regenerate();
    let outcome = sketch.materialize();
    if let Some(error) = &outcome.error {
        warn!(shortfall = outcome.shortfall(), %error, "drawing is incomplete");
    }

    let drawing = sketch.drawing().project();
    info!(
        sketch = kind.name(),
        points = drawing.point_count(),
        strokes = drawing.stroke_count(),
        "rendered"
    );

    let bytes = match format {
        OutputFormat::Svg => drawing_to_svg(&drawing, kind.export_prefix()).into_bytes(),
        OutputFormat::Json => drawing_to_json(kind, &drawing)?.into_bytes(),
        OutputFormat::Png => encode_png(&render_to_image(&drawing, width, height, 1.0)?)?,
    };

    let output_path = output_path.unwrap_or_else(|| timestamped_filename(kind, format.extension()));
    write_output(&output_path, &bytes)?;
    if output_path != "-" {
        eprintln!("Wrote: {}", output_path);
    }
    Ok(())
}

fn print_usage() {
    eprintln!("Usage: sketchloom render <sketch> [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -c, --config <file>    Sketch config (.yaml, .yml or .json)");
    eprintln!("  --set <name=value>     Override one parameter (repeatable)");
    eprintln!("  -o, --output <file>    Output file (- for stdout, default: timestamped)");
    eprintln!("  -f, --format <fmt>     Output format: svg, json, png (default: svg)");
    eprintln!("  --seed <n>             Fix the random seed (moire)");
    eprintln!("  --width <px>           PNG width (default: {})", DEFAULT_PNG_WIDTH);
    eprintln!("  --height <px>          PNG height (default: {})", DEFAULT_PNG_HEIGHT);
    eprintln!();
    eprintln!("Sketches: {}", SketchKind::all().iter().map(|k| k.name()).collect::<Vec<_>>().join(", "));
}
