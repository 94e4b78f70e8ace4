//! Catmull-Rom splines.
//!
//! Sketches describe smooth curves as Catmull-Rom control chains (the
//! cycloid path, the moiré rings). This module evaluates them directly,
//! resamples closed rings, and converts chains to cubic Béziers so the
//! SVG writer can emit `C` commands and lyon_geom can flatten them.
//!
//! ## Curve Flattening
//!
//! Each span `p1 → p2` with neighbours `p0`, `p3` is the cubic Bézier
//! with control points `p1 + (p2 − p0)/6` and `p2 − (p3 − p1)/6`.
//! lyon_geom then approximates it with line segments within a tolerance.

use lyon_geom::{point, CubicBezierSegment};

use crate::geometry::Point;

/// Default flattening tolerance in drawing units.
pub const FLATTEN_TOLERANCE: f64 = 0.05;

/// Uniform Catmull-Rom interpolation between `p1` (t = 0) and `p2` (t = 1).
#[inline]
pub fn catmull_rom(p0: f64, p1: f64, p2: f64, p3: f64, t: f64) -> f64 {
    let t2 = t * t;
    let t3 = t2 * t;
    let f1 = -0.5 * t3 + t2 - 0.5 * t;
    let f2 = 1.5 * t3 - 2.5 * t2 + 1.0;
    let f3 = -1.5 * t3 + 2.0 * t2 + 0.5 * t;
    let f4 = 0.5 * t3 - 0.5 * t2;
    p0 * f1 + p1 * f2 + p2 * f3 + p3 * f4
}

/// [`catmull_rom`] on both coordinates.
#[inline]
pub fn catmull_rom_point(p0: Point, p1: Point, p2: Point, p3: Point, t: f64) -> Point {
    Point::new(
        catmull_rom(p0.x, p1.x, p2.x, p3.x, t),
        catmull_rom(p0.y, p1.y, p2.y, p3.y, t),
    )
}

/// Sample a closed ring at `samples` evenly spaced parameters.
///
/// Sample `j` sits at `u = j·n/samples`; its span is `floor(u) mod n` and
/// it is interpolated from ring indices `span−1, span, span+1, span+2`
/// (all mod n).
pub fn resample_closed(ring: &[Point], samples: usize) -> Vec<Point> {
    let n = ring.len();
    if n == 0 {
        return Vec::new();
    }

    (0..samples)
        .map(|j| {
            let u = j as f64 * n as f64 / samples as f64;
            let span = (u.floor() as usize) % n;
            let local = u - u.floor();

            let p0 = ring[(span + n - 1) % n];
            let p1 = ring[span];
            let p2 = ring[(span + 1) % n];
            let p3 = ring[(span + 2) % n];
            catmull_rom_point(p0, p1, p2, p3, local)
        })
        .collect()
}

/// Convert a Catmull-Rom chain to cubic Bézier spans.
///
/// Open chains pass through every point, using the end points as their own
/// phantom neighbours. Closed chains wrap around and end where they start.
pub fn to_cubic_beziers(points: &[Point], closed: bool) -> Vec<CubicBezierSegment<f64>> {
    let n = points.len();
    if n < 2 {
        return Vec::new();
    }

    let at = |i: isize| -> Point {
        if closed {
            points[i.rem_euclid(n as isize) as usize]
        } else {
            points[i.clamp(0, n as isize - 1) as usize]
        }
    };

    let spans = if closed { n } else { n - 1 };
    (0..spans as isize)
        .map(|i| {
            let (p0, p1, p2, p3) = (at(i - 1), at(i), at(i + 1), at(i + 2));
            let c1 = p1 + (p2 - p0) * (1.0 / 6.0);
            let c2 = p2 - (p3 - p1) * (1.0 / 6.0);
            CubicBezierSegment {
                from: point(p1.x, p1.y),
                ctrl1: point(c1.x, c1.y),
                ctrl2: point(c2.x, c2.y),
                to: point(p2.x, p2.y),
            }
        })
        .collect()
}

/// Flatten a Catmull-Rom chain into a polyline.
pub fn flatten(points: &[Point], closed: bool, tolerance: f64) -> Vec<Point> {
    let spans = to_cubic_beziers(points, closed);
    let Some(first) = spans.first() else {
        return points.to_vec();
    };

    let mut out = vec![Point::new(first.from.x, first.from.y)];
    for span in &spans {
        span.for_each_flattened(tolerance, &mut |segment| {
            out.push(Point::new(segment.to.x, segment.to.y));
        });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn square() -> Vec<Point> {
        vec![
            Point::new(1.0, 0.0),
            Point::new(0.0, 1.0),
            Point::new(-1.0, 0.0),
            Point::new(0.0, -1.0),
        ]
    }

    #[test]
    fn weights_interpolate_endpoints() {
        assert_abs_diff_eq!(catmull_rom(5.0, 1.0, 2.0, 9.0, 0.0), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(catmull_rom(5.0, 1.0, 2.0, 9.0, 1.0), 2.0, epsilon = 1e-12);
        // Collinear, evenly spaced controls give linear motion
        assert_abs_diff_eq!(catmull_rom(0.0, 1.0, 2.0, 3.0, 0.25), 1.25, epsilon = 1e-12);
    }

    #[test]
    fn resample_hits_ring_points_at_whole_parameters() {
        let ring = square();
        let samples = resample_closed(&ring, 8);
        assert_eq!(samples.len(), 8);
        for (i, p) in ring.iter().enumerate() {
            assert!(samples[i * 2].approx_eq(*p, 1e-12));
        }
    }

    #[test]
    fn resample_uses_wrapping_window() {
        let ring = square();
        let samples = resample_closed(&ring, 8);
        // Last sample is halfway along the span 3 -> 0, using 2, 3, 0, 1
        let expected = catmull_rom_point(ring[2], ring[3], ring[0], ring[1], 0.5);
        assert!(samples[7].approx_eq(expected, 1e-12));
    }

    #[test]
    fn bezier_spans_match_catmull_rom() {
        let ring = square();
        let spans = to_cubic_beziers(&ring, true);
        assert_eq!(spans.len(), 4);

        for (i, span) in spans.iter().enumerate() {
            let n = ring.len();
            let expected = catmull_rom_point(ring[(i + n - 1) % n], ring[i], ring[(i + 1) % n], ring[(i + 2) % n], 0.3);
            let actual = span.sample(0.3);
            assert_abs_diff_eq!(actual.x, expected.x, epsilon = 1e-9);
            assert_abs_diff_eq!(actual.y, expected.y, epsilon = 1e-9);
        }
    }

    #[test]
    fn open_chain_passes_through_ends() {
        let chain = vec![Point::new(0.0, 0.0), Point::new(10.0, 5.0), Point::new(20.0, 0.0)];
        let spans = to_cubic_beziers(&chain, false);
        assert_eq!(spans.len(), 2);

        let flat = flatten(&chain, false, FLATTEN_TOLERANCE);
        assert!(flat[0].approx_eq(chain[0], 1e-12));
        assert!(flat[flat.len() - 1].approx_eq(chain[2], 1e-9));
        assert!(flat.len() > chain.len());
    }
}
