//! Benchmark command implementation.

use std::time::{Duration, Instant};

use sketchloom::{Sketch, SketchKind};

use super::common::{flag_value, parse_number};
use super::error::{CliError, CliResult};

const DEFAULT_ITERATIONS: usize = 10;

/// Execute the benchmark command.
pub fn cmd_benchmark(args: &[String]) -> CliResult {
    let mut sketch_name: Option<&str> = None;
    let mut iterations = DEFAULT_ITERATIONS;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "-n" | "--iterations" => {
                iterations = parse_number(flag_value(args, &mut i, "--iterations")?, "--iterations")?;
            }
            "-h" | "--help" => {
                print_usage();
                return Ok(());
            }
            name if !name.starts_with('-') => {
                if sketch_name.is_none() {
                    sketch_name = Some(name);
                }
            }
            other => return Err(CliError::usage(format!("unknown option '{}'", other))),
        }
        i += 1;
    }

    let Some(sketch_name) = sketch_name else {
        print_usage();
        return Err(CliError::usage("no sketch given"));
    };
    let kind = SketchKind::parse(sketch_name)?;
    let iterations = iterations.max(1);

    println!("Running '{}' x{}...", kind.name(), iterations);

    let mut total = Duration::ZERO;
    let mut fastest = Duration::MAX;
    let mut points = 0;
    let mut strokes = 0;

    for _ in 0..iterations {
        let start = Instant::now();
        let mut sketch = Sketch::new(kind);
        sketch.materialize();
        let drawing = sketch.drawing().project();
        let elapsed = start.elapsed();

        total += elapsed;
        fastest = fastest.min(elapsed);
        points = drawing.point_count();
        strokes = drawing.stroke_count();
    }

    let avg_ms = total.as_secs_f64() * 1000.0 / iterations as f64;

    println!();
    println!("═══════════════════════════════════════════════");
    println!("  SKETCH BENCHMARK: {}", kind.name().to_uppercase());
    println!("═══════════════════════════════════════════════");
    println!("  Iterations: {}", iterations);
    println!("  Points: {}", points);
    println!("  Strokes: {}", strokes);
    println!("  Total: {:?}", total);
    println!("  Avg (ms): {:.3}", avg_ms);
    println!("  Best (ms): {:.3}", fastest.as_secs_f64() * 1000.0);
    println!("═══════════════════════════════════════════════");
    Ok(())
}

fn print_usage() {
    eprintln!("Usage: sketchloom benchmark <sketch> [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -n, --iterations <n>    Full regenerations to time (default: {})", DEFAULT_ITERATIONS);
    eprintln!();
    eprintln!("Times building a sketch from defaults through to a projected drawing.");
}
