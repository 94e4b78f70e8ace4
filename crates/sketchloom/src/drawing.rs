//! What a sketch hands to the renderer.
//!
//! A [`Drawing`] is a list of named layers, each holding strokes. Sketches
//! build drawings in 3D (`Point3`, with `z = 0` for planar output) together
//! with the [`View`] to look at them through; [`Drawing::project`] turns that
//! into planar geometry ready for SVG or a raster preview.

use crate::geometry::{Line, Point, Point3};
use crate::spline::{self, FLATTEN_TOLERANCE};
use crate::transform::View;

/// One drawn element.
#[derive(Debug, Clone, PartialEq)]
pub enum Stroke<P = Point3> {
    /// Straight segments through every point
    Polyline(Vec<P>),
    /// Catmull-Rom curve through every point
    Spline { points: Vec<P>, closed: bool },
    /// Independent line segments
    Segments(Vec<(P, P)>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrawLayer<P = Point3> {
    pub name: String,
    /// 0.0 (invisible) to 1.0
    pub opacity: f64,
    /// Suggested line width in drawing units
    pub stroke_width: f64,
    pub strokes: Vec<Stroke<P>>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Drawing<P = Point3> {
    pub layers: Vec<DrawLayer<P>>,
    pub view: View,
}

impl<P: Copy> Stroke<P> {
    /// Apply `f` to every point.
    pub fn map<Q>(&self, mut f: impl FnMut(P) -> Q) -> Stroke<Q> {
        match self {
            Stroke::Polyline(points) => Stroke::Polyline(points.iter().map(|&p| f(p)).collect()),
            Stroke::Spline { points, closed } => Stroke::Spline {
                points: points.iter().map(|&p| f(p)).collect(),
                closed: *closed,
            },
            Stroke::Segments(segments) => {
                Stroke::Segments(segments.iter().map(|&(a, b)| (f(a), f(b))).collect())
            }
        }
    }

    pub fn point_count(&self) -> usize {
        match self {
            Stroke::Polyline(points) | Stroke::Spline { points, .. } => points.len(),
            Stroke::Segments(segments) => segments.len() * 2,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.point_count() == 0
    }
}

impl Stroke<Point> {
    /// Segments as [`Line`]s. Empty for other stroke kinds.
    pub fn lines(&self) -> Vec<Line> {
        match self {
            Stroke::Segments(segments) => segments.iter().map(|&(a, b)| Line::from_points(a, b)).collect(),
            _ => Vec::new(),
        }
    }

    /// The stroke as polylines, with splines flattened.
    pub fn polylines(&self, tolerance: f64) -> Vec<Vec<Point>> {
        match self {
            Stroke::Polyline(points) => vec![points.clone()],
            Stroke::Spline { points, closed } => vec![spline::flatten(points, *closed, tolerance)],
            Stroke::Segments(segments) => segments.iter().map(|&(a, b)| vec![a, b]).collect(),
        }
    }
}

impl<P> DrawLayer<P> {
    pub fn new(name: impl Into<String>, opacity: f64) -> Self {
        Self { name: name.into(), opacity, stroke_width: 1.0, strokes: Vec::new() }
    }

    pub fn with_stroke_width(mut self, width: f64) -> Self {
        self.stroke_width = width;
        self
    }

    pub fn with_stroke(mut self, stroke: Stroke<P>) -> Self {
        self.strokes.push(stroke);
        self
    }
}

impl<P: Copy> Drawing<P> {
    pub fn new(view: View) -> Self {
        Self { layers: Vec::new(), view }
    }

    /// Append a layer, skipping it when it has no strokes.
    pub fn push_layer(&mut self, layer: DrawLayer<P>) {
        if !layer.strokes.is_empty() {
            self.layers.push(layer);
        }
    }

    /// Total number of stored points across every stroke.
    pub fn point_count(&self) -> usize {
        self.layers
            .iter()
            .flat_map(|layer| layer.strokes.iter())
            .map(Stroke::point_count)
            .sum()
    }

    pub fn stroke_count(&self) -> usize {
        self.layers.iter().map(|layer| layer.strokes.len()).sum()
    }
}

impl Drawing<Point3> {
    /// Look through [`Drawing::view`] and drop depth.
    ///
    /// The projection is linear, so projecting spline control points gives
    /// the projection of the spline.
    pub fn project(&self) -> Drawing<Point> {
        let view = self.view;
        Drawing {
            layers: self
                .layers
                .iter()
                .map(|layer| DrawLayer {
                    name: layer.name.clone(),
                    opacity: layer.opacity,
                    stroke_width: layer.stroke_width,
                    strokes: layer.strokes.iter().map(|s| s.map(|p| view.project(p))).collect(),
                })
                .collect(),
            view: View::default(),
        }
    }
}

impl Drawing<Point> {
    /// Axis-aligned bounds `(min, max)` of the drawn geometry, or `None`
    /// for an empty drawing.
    pub fn bounds(&self) -> Option<(Point, Point)> {
        let mut bounds: Option<(Point, Point)> = None;
        for stroke in self.layers.iter().flat_map(|layer| layer.strokes.iter()) {
            for polyline in stroke.polylines(FLATTEN_TOLERANCE) {
                for p in polyline {
                    bounds = Some(match bounds {
                        None => (p, p),
                        Some((min, max)) => (
                            Point::new(min.x.min(p.x), min.y.min(p.y)),
                            Point::new(max.x.max(p.x), max.y.max(p.y)),
                        ),
                    });
                }
            }
        }
        bounds
    }

    /// Shift every point by `offset`.
    pub fn translate(&mut self, offset: Point) {
        for layer in &mut self.layers {
            for stroke in &mut layer.strokes {
                *stroke = stroke.map(|p| p + offset);
            }
        }
    }
}
