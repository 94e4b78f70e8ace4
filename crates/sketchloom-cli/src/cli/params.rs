//! `sketches` and `params` commands: what can be drawn and how to tune it.

use sketchloom::{ParamKind, ParameterSet, Sketch, SketchConfig, SketchKind};

use super::error::{CliError, CliResult};

/// List available sketches.
pub fn cmd_sketches() {
    println!("Available sketches:");
    for kind in SketchKind::all() {
        println!("  {:<18} {}", kind.name(), kind.description());
    }
}

/// List the parameters of one sketch, or dump its default config.
pub fn cmd_params(args: &[String]) -> CliResult {
    let mut sketch_name: Option<&str> = None;
    let mut as_yaml = false;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--yaml" => as_yaml = true,
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

    let Some(name) = sketch_name else {
        print_usage();
        return Err(CliError::usage("no sketch given"));
    };
    let kind = SketchKind::parse(name)?;
    let config = SketchConfig::default_for(kind);

    if as_yaml {
        print!("{}", serde_yaml::to_string(&config)?);
        return Ok(());
    }

    let sketch = Sketch::from_config(config);
    let params: &dyn ParameterSet = sketch.params();

    println!("{} parameters:", kind.name());
    for spec in params.specs() {
        let current = params.get(spec.name).map(|v| spec.format(v)).unwrap_or_default();
        let kind_label = match spec.kind {
            ParamKind::Number { .. } => "number",
            ParamKind::Toggle => "toggle",
            ParamKind::Choice(_) => "choice",
        };
        println!(
            "  {:<28} {:<7} {:<26} default {:<10} {}",
            spec.name,
            kind_label,
            spec.range_label(),
            current,
            spec.label
        );
    }
    Ok(())
}

fn print_usage() {
    eprintln!("Usage: sketchloom params <sketch> [--yaml]");
    eprintln!();
    eprintln!("Lists the tunable parameters of a sketch with their ranges and defaults.");
    eprintln!("With --yaml, prints the default config in the format render -c accepts.");
}
