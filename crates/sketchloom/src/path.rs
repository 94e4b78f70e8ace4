//! Path accumulation.
//!
//! A [`Path`] is an insertion-ordered point sequence with a minimum-distance
//! rule: a point closer than [`MIN_POINT_DISTANCE`] to the last stored point
//! is dropped. The first point is always stored.
//!
//! Paths are grown one point per step (incremental mode) or rebuilt in one
//! call with [`accumulate`] (full mode). Both go through [`Path::push`], so
//! for the same generator they produce the same sequence.

use serde::{Deserialize, Serialize};

use crate::error::SketchError;
use crate::geometry::PathPoint;

/// Consecutive stored points are always further apart than this.
pub const MIN_POINT_DISTANCE: f64 = 0.1;

/// How a sketch builds its path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationMode {
    /// One point per `advance()` call
    #[default]
    Incremental,
    /// The whole path in a single call
    Full,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Path<P> {
    points: Vec<P>,
}

impl<P: PathPoint> Path<P> {
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }

    /// Append `point` unless it is within [`MIN_POINT_DISTANCE`] of the
    /// last stored point. Returns whether the point was stored.
    pub fn push(&mut self, point: P) -> bool {
        if let Some(last) = self.points.last() {
            if last.distance_to(&point) <= MIN_POINT_DISTANCE {
                return false;
            }
        }
        self.points.push(point);
        true
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn points(&self) -> &[P] {
        &self.points
    }

    pub fn last(&self) -> Option<&P> {
        self.points.last()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn into_points(self) -> Vec<P> {
        self.points
    }
}

impl<P: PathPoint> Default for Path<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: PathPoint> FromIterator<P> for Path<P> {
    fn from_iter<I: IntoIterator<Item = P>>(iter: I) -> Self {
        let mut path = Path::new();
        for point in iter {
            path.push(point);
        }
        path
    }
}

/// Outcome of a full-mode pass.
///
/// A generator failure stops the pass early; the partial path is kept and
/// the failure is reported here rather than returned as an error.
#[derive(Debug, Clone, PartialEq)]
pub struct Accumulation {
    /// Points the pass was asked for
    pub requested: usize,
    /// Points the generator produced before stopping
    pub evaluated: usize,
    /// Points that survived the minimum-distance rule
    pub accepted: usize,
    /// Why the pass stopped early, if it did
    pub error: Option<SketchError>,
}

impl Accumulation {
    /// A pass that produced and kept all `count` points.
    pub fn complete(count: usize) -> Self {
        Self { requested: count, evaluated: count, accepted: count, error: None }
    }

    pub fn is_complete(&self) -> bool {
        self.error.is_none() && self.evaluated >= self.requested
    }

    /// How many requested points were never evaluated.
    pub fn shortfall(&self) -> usize {
        self.requested.saturating_sub(self.evaluated)
    }
}

/// Clear `path` and fill it from `generator(0..count)`, stopping at the
/// first error.
pub fn accumulate<P, F>(path: &mut Path<P>, count: usize, mut generator: F) -> Accumulation
where
    P: PathPoint,
    F: FnMut(usize) -> Result<P, SketchError>,
{
    path.clear();

    let mut outcome = Accumulation { requested: count, evaluated: 0, accepted: 0, error: None };
    for index in 0..count {
        match generator(index) {
            Ok(point) => {
                outcome.evaluated += 1;
                if path.push(point) {
                    outcome.accepted += 1;
                }
            }
            Err(err) => {
                outcome.error = Some(err);
                break;
            }
        }
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Point, Point3};

    #[test]
    fn first_point_always_stored() {
        let mut path = Path::new();
        assert!(path.push(Point::new(0.0, 0.0)));
        assert_eq!(path.len(), 1);
    }

    #[test]
    fn near_duplicates_are_dropped() {
        let mut path = Path::new();
        path.push(Point3::new(0.0, 0.0, 0.0));
        assert!(!path.push(Point3::new(0.05, 0.0, 0.0)));
        assert!(!path.push(Point3::new(0.0, 0.0, 0.1)));
        assert!(path.push(Point3::new(0.0, 0.0, 0.11)));
        assert_eq!(path.len(), 2);
    }

    #[test]
    fn consecutive_points_respect_threshold() {
        // A slow spiral produces plenty of sub-threshold steps
        let path: Path<Point> = (0..2000)
            .map(|i| {
                let t = i as f64 * 0.01;
                Point::new(t.cos() * t, t.sin() * t)
            })
            .collect();

        for pair in path.points().windows(2) {
            assert!(pair[0].distance(pair[1]) > MIN_POINT_DISTANCE);
        }
    }

    #[test]
    fn accumulate_reports_shortfall() {
        let mut path = Path::new();
        path.push(Point::new(99.0, 99.0));

        let outcome = accumulate(&mut path, 10, |i| {
            if i < 4 {
                Ok(Point::new(i as f64, 0.0))
            } else {
                Err(SketchError::LinkageUnsolvable { distance: 10.0, r1: 1.0, r2: 1.0 })
            }
        });

        assert_eq!(path.len(), 4);
        assert_eq!(path.points()[0], Point::new(0.0, 0.0));
        assert_eq!(outcome.evaluated, 4);
        assert_eq!(outcome.accepted, 4);
        assert_eq!(outcome.shortfall(), 6);
        assert!(!outcome.is_complete());
    }

    #[test]
    fn accumulate_complete_pass() {
        let mut path = Path::new();
        let outcome = accumulate(&mut path, 5, |i| Ok(Point::new(0.0, i as f64 * 0.05)));
        assert!(outcome.is_complete());
        assert_eq!(outcome.evaluated, 5);
        // Points 0.05 apart collapse: 0.0, 0.15 (0.1 is not strictly further)
        assert_eq!(outcome.accepted, path.len());
        assert!(path.len() < 5);
    }
}
