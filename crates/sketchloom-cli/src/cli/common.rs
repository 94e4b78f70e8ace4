//! Common utilities shared across CLI commands.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use image::{DynamicImage, RgbaImage};
use resvg::usvg;
use serde::Serialize;
use tiny_skia::Pixmap;

use sketchloom::spline::{self, FLATTEN_TOLERANCE};
use sketchloom::{Drawing, Point, SketchConfig, SketchKind, Stroke};

use super::error::{CliError, CliResult};

/// Space left around the drawing bounds in exported SVG.
pub const SVG_MARGIN: f64 = 20.0;

/// Padding (in pixels) around rasterized previews.
const IMAGE_PADDING: f64 = 20.0;

/// Stroke width (in pixels) of a layer with `stroke_width = 1` in previews.
const PREVIEW_STROKE_PX: f64 = 1.5;

/// Output format for exported drawings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputFormat {
    Svg,
    Json,
    Png,
}

impl OutputFormat {
    pub fn from_name(name: &str) -> Option<OutputFormat> {
        match name.to_lowercase().as_str() {
            "svg" => Some(OutputFormat::Svg),
            "json" => Some(OutputFormat::Json),
            "png" => Some(OutputFormat::Png),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Svg => "svg",
            OutputFormat::Json => "json",
            OutputFormat::Png => "png",
        }
    }
}

/// Take the value following a flag, advancing the cursor.
pub fn flag_value<'a>(args: &'a [String], i: &mut usize, flag: &str) -> CliResult<&'a str> {
    *i += 1;
    args.get(*i)
        .map(String::as_str)
        .ok_or_else(|| CliError::usage(format!("{} expects a value", flag)))
}

/// Parse a numeric flag value.
pub fn parse_number<T: std::str::FromStr>(raw: &str, flag: &str) -> CliResult<T> {
    raw.parse()
        .map_err(|_| CliError::usage(format!("{} expects a number, got '{}'", flag, raw)))
}

/// Split `name=value` from `--set`.
pub fn parse_assignment(raw: &str) -> CliResult<(&str, &str)> {
    match raw.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => Ok((name.trim(), value.trim())),
        _ => Err(CliError::usage(format!("--set expects name=value, got '{}'", raw))),
    }
}

fn fmt_point(p: Point) -> String {
    format!("{:.2},{:.2}", p.x, p.y)
}

/// Emit one `<g>` per drawing layer.
///
/// Layer widths are multiplied by `width_scale`, which lets previews keep a
/// constant pixel width whatever the zoom.
pub fn layers_to_svg(drawing: &Drawing<Point>, color: &str, width_scale: f64) -> String {
    let mut svg = String::new();

    for layer in &drawing.layers {
        svg.push_str(&format!(
            r#"<g id="{}" stroke="{}" stroke-width="{}" stroke-opacity="{:.3}" fill="none" stroke-linecap="round">
"#,
            layer.name,
            color,
            layer.stroke_width * width_scale,
            layer.opacity
        ));

        for stroke in &layer.strokes {
            match stroke {
                Stroke::Polyline(points) => {
                    if points.len() < 2 {
                        continue;
                    }
                    let points: String = points.iter().map(|&p| fmt_point(p)).collect::<Vec<_>>().join(" ");
                    svg.push_str(&format!("  <polyline points=\"{}\"/>\n", points));
                }
                Stroke::Spline { points, closed } => {
                    let spans = spline::to_cubic_beziers(points, *closed);
                    let Some(first) = spans.first() else {
                        continue;
                    };
                    let mut d = format!("M{:.2},{:.2}", first.from.x, first.from.y);
                    for span in &spans {
                        d.push_str(&format!(
                            " C{:.2},{:.2} {:.2},{:.2} {:.2},{:.2}",
                            span.ctrl1.x, span.ctrl1.y, span.ctrl2.x, span.ctrl2.y, span.to.x, span.to.y
                        ));
                    }
                    if *closed {
                        d.push_str(" Z");
                    }
                    svg.push_str(&format!("  <path d=\"{}\"/>\n", d));
                }
                Stroke::Segments(_) => {
                    for line in stroke.lines() {
                        svg.push_str(&format!(
                            "  <line x1=\"{:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\"/>\n",
                            line.x1, line.y1, line.x2, line.y2
                        ));
                    }
                }
            }
        }

        svg.push_str("</g>\n");
    }

    svg
}

/// Standalone SVG document with the viewBox fitted to the drawing.
pub fn drawing_to_svg(drawing: &Drawing<Point>, title: &str) -> String {
    let (min, max) = drawing
        .bounds()
        .unwrap_or((Point::new(-100.0, -100.0), Point::new(100.0, 100.0)));
    let x = min.x - SVG_MARGIN;
    let y = min.y - SVG_MARGIN;
    let width = max.x - min.x + SVG_MARGIN * 2.0;
    let height = max.y - min.y + SVG_MARGIN * 2.0;

    let mut svg = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" viewBox="{:.2} {:.2} {:.2} {:.2}">
<title>{}</title>
<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="white"/>
"#,
        x, y, width, height, title, x, y, width, height
    );
    svg.push_str(&layers_to_svg(drawing, "black", 1.0));
    svg.push_str("</svg>\n");
    svg
}

/// A point in JSON output.
#[derive(Serialize)]
struct JsonPoint {
    x: f64,
    y: f64,
}

/// A line in JSON output.
#[derive(Serialize)]
struct JsonLine {
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
}

#[derive(Serialize)]
struct JsonLayer<'a> {
    name: &'a str,
    opacity: f64,
    polylines: Vec<Vec<JsonPoint>>,
    lines: Vec<JsonLine>,
}

#[derive(Serialize)]
struct JsonDrawing<'a> {
    sketch: &'a str,
    layers: Vec<JsonLayer<'a>>,
}

/// JSON document for a projected drawing. Splines are flattened.
pub fn drawing_to_json(kind: SketchKind, drawing: &Drawing<Point>) -> CliResult<String> {
    let layers = drawing
        .layers
        .iter()
        .map(|layer| {
            let mut polylines = Vec::new();
            let mut lines = Vec::new();
            for stroke in &layer.strokes {
                match stroke {
                    Stroke::Segments(_) => lines.extend(stroke.lines().into_iter().map(|l| JsonLine {
                        x1: l.x1,
                        y1: l.y1,
                        x2: l.x2,
                        y2: l.y2,
                    })),
                    _ => polylines.extend(stroke.polylines(FLATTEN_TOLERANCE).into_iter().map(|points| {
                        points.into_iter().map(|p| JsonPoint { x: p.x, y: p.y }).collect()
                    })),
                }
            }
            JsonLayer { name: &layer.name, opacity: layer.opacity, polylines, lines }
        })
        .collect();

    let output = JsonDrawing { sketch: kind.name(), layers };
    Ok(serde_json::to_string_pretty(&output)?)
}

/// Rasterize a drawing with resvg, fitted to `width × height` and zoomed
/// about its center.
pub fn render_to_image(drawing: &Drawing<Point>, width: u32, height: u32, zoom: f64) -> CliResult<DynamicImage> {
    let mut svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}">
<rect width="100%" height="100%" fill="white"/>
"#,
        width, height, width, height
    );

    if let Some((min, max)) = drawing.bounds() {
        let content_width = (max.x - min.x).max(1e-9);
        let content_height = (max.y - min.y).max(1e-9);
        let scale_x = (width as f64 - IMAGE_PADDING * 2.0) / content_width;
        let scale_y = (height as f64 - IMAGE_PADDING * 2.0) / content_height;
        let scale = scale_x.min(scale_y).max(1e-9) * zoom;

        let translate_x = width as f64 / 2.0 - (min.x + max.x) / 2.0 * scale;
        let translate_y = height as f64 / 2.0 - (min.y + max.y) / 2.0 * scale;

        svg.push_str(&format!(
            "<g transform=\"translate({}, {}) scale({})\">\n",
            translate_x, translate_y, scale
        ));
        svg.push_str(&layers_to_svg(drawing, "black", PREVIEW_STROKE_PX / scale));
        svg.push_str("</g>\n");
    }
    svg.push_str("</svg>");

    let options = usvg::Options::default();
    let tree = usvg::Tree::from_str(&svg, &options).map_err(|e| CliError::Raster(e.to_string()))?;

    let mut pixmap = Pixmap::new(width, height)
        .ok_or_else(|| CliError::Raster(format!("cannot allocate a {}x{} pixmap", width, height)))?;

    resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());

    let rgba = RgbaImage::from_raw(width, height, pixmap.take())
        .ok_or_else(|| CliError::Raster("pixel buffer size mismatch".to_string()))?;

    Ok(DynamicImage::ImageRgba8(rgba))
}

/// Encode an image as PNG bytes.
pub fn encode_png(image: &DynamicImage) -> CliResult<Vec<u8>> {
    let mut bytes = Vec::new();
    image
        .write_to(&mut io::Cursor::new(&mut bytes), image::ImageFormat::Png)
        .map_err(|e| CliError::Raster(e.to_string()))?;
    Ok(bytes)
}

/// `<SketchName>_<YYYYMMDD_HHMMSS>.<ext>` in local time.
pub fn timestamped_filename(kind: SketchKind, extension: &str) -> String {
    let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    format!("{}_{}.{}", kind.export_prefix(), stamp, extension)
}

pub fn read_file(path: &str) -> CliResult<String> {
    fs::read_to_string(path).map_err(|source| CliError::Read { path: PathBuf::from(path), source })
}

/// Load a sketch config; `.json` files are JSON, anything else YAML.
pub fn load_config(path: &str) -> CliResult<SketchConfig> {
    let content = read_file(path)?;
    if path.to_lowercase().ends_with(".json") {
        Ok(serde_json::from_str(&content)?)
    } else {
        Ok(serde_yaml::from_str(&content)?)
    }
}

/// Write to a file, or to stdout when `path` is `-`.
pub fn write_output(path: &str, bytes: &[u8]) -> CliResult {
    let result = if path == "-" {
        let mut stdout = io::stdout().lock();
        stdout.write_all(bytes).and_then(|_| stdout.flush())
    } else {
        fs::write(path, bytes)
    };
    result.map_err(|source| CliError::Write { path: PathBuf::from(path), source })
}

/// Install the stderr log subscriber. `RUST_LOG` wins unless `verbose`.
pub fn init_logging(verbose: bool) {
    let filter = if verbose {
        tracing_subscriber::EnvFilter::new("debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}
