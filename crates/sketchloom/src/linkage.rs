//! Two-bar linkage solving.
//!
//! Two wheels turn at their own speeds. A rod of fixed length hangs off an
//! attachment point on each wheel; the rods meet at the joint `D`, which is
//! an intersection of two circles. The pen sits on the line from the second
//! attachment `B` through `D`, at `B + ratio·(D − B)` (ratio > 1 extends
//! past the joint).
//!
//! ```text
//!         D (joint)
//!        / \
//!  rod1 /   \ rod2
//!      /     \
//!     A       B
//!   (wheel1) (wheel2)
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{Result, SketchError};
use crate::geometry::{Point, DIRECTION_EPSILON};

/// Circles this close to exact tangency meet at their tangency point.
pub const TANGENCY_TOLERANCE: f64 = 1e-4;

/// Below this squared half-chord the two roots are treated as one.
const HEIGHT_EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub center: Point,
    pub radius: f64,
}

impl Circle {
    pub fn new(center: Point, radius: f64) -> Self {
        Self { center, radius }
    }
}

/// Which of the two intersection roots to take.
///
/// The sign is that of `(B − A) × (candidate − A)`, where `A` and `B` are the
/// first and second circle centers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RootChoice {
    #[default]
    PositiveCross,
    NegativeCross,
}

/// Intersect two circles, choosing one root by `choice`.
///
/// Fails with [`SketchError::LinkageUnsolvable`] when the circles are
/// separated, nested, or share a center, unless they are within
/// [`TANGENCY_TOLERANCE`] of touching, in which case the tangency point
/// is returned.
pub fn intersect_circles(first: Circle, second: Circle, choice: RootChoice) -> Result<Point> {
    let delta = second.center - first.center;
    let distance = delta.length();
    let (r1, r2) = (first.radius, second.radius);
    let unsolvable = || SketchError::LinkageUnsolvable { distance, r1, r2 };

    if distance < DIRECTION_EPSILON {
        return Err(unsolvable());
    }

    let toward_second = delta * (1.0 / distance);
    let outer = r1 + r2;
    let inner = (r1 - r2).abs();

    if distance > outer || distance < inner {
        if (distance - outer).abs() < TANGENCY_TOLERANCE {
            return Ok(first.center + toward_second * r1);
        }
        if (distance - inner).abs() < TANGENCY_TOLERANCE {
            // Internal tangency: the contact lies on the far side of the
            // smaller circle, seen from the larger one.
            let side = if r1 >= r2 { 1.0 } else { -1.0 };
            return Ok(first.center + toward_second * (r1 * side));
        }
        return Err(unsolvable());
    }

    let along = (r1 * r1 - r2 * r2 + distance * distance) / (2.0 * distance);
    let height_sq = r1 * r1 - along * along;
    let height = if height_sq > HEIGHT_EPSILON { height_sq.sqrt() } else { 0.0 };

    let chord_mid = first.center + toward_second * along;
    let perp = delta.perpendicular().normalized(DIRECTION_EPSILON).ok_or_else(unsolvable)?;

    let root_a = chord_mid + perp * height;
    let root_b = chord_mid - perp * height;

    let cross = delta.cross(root_a - first.center);
    let take_a = match choice {
        RootChoice::PositiveCross => cross >= 0.0,
        RootChoice::NegativeCross => cross <= 0.0,
    };

    Ok(if take_a { root_a } else { root_b })
}

/// A driving wheel with a rod attached off-center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wheel {
    pub center: Point,
    /// Drawn radius. Only used for guides, never for solving.
    pub radius: f64,
    /// Distance of the rod attachment from the center
    pub attachment: f64,
    /// Radians per unit of time
    pub speed: f64,
}

impl Wheel {
    /// Attachment position at `time`.
    pub fn attachment_at(&self, time: f64) -> Point {
        self.center + Point::from_angle(time * self.speed) * self.attachment
    }
}

/// The full mechanism: two wheels, two rods, a pen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Linkage {
    pub first: Wheel,
    pub second: Wheel,
    pub first_rod: f64,
    pub second_rod: f64,
    /// Pen position along B→D; 1.0 puts the pen on the joint
    pub pen_ratio: f64,
    pub root: RootChoice,
}

/// Every solved position of the mechanism at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkagePose {
    pub attachment_a: Point,
    pub attachment_b: Point,
    pub joint: Point,
    pub pen: Point,
}

impl Linkage {
    /// Solve the mechanism at `time`.
    pub fn solve(&self, time: f64) -> Result<LinkagePose> {
        let attachment_a = self.first.attachment_at(time);
        let attachment_b = self.second.attachment_at(time);

        let joint = intersect_circles(
            Circle::new(attachment_a, self.first_rod),
            Circle::new(attachment_b, self.second_rod),
            self.root,
        )?;
        let pen = attachment_b + (joint - attachment_b) * self.pen_ratio;

        Ok(LinkagePose { attachment_a, attachment_b, joint, pen })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn circle(x: f64, y: f64, r: f64) -> Circle {
        Circle::new(Point::new(x, y), r)
    }

    #[test]
    fn roots_lie_on_both_circles() {
        let cases = [
            (circle(0.0, 0.0, 5.0), circle(6.0, 0.0, 4.0)),
            (circle(-150.0, 10.0, 250.0), circle(150.0, -20.0, 250.0)),
            (circle(1.0, 1.0, 3.0), circle(2.0, 2.5, 2.5)),
            (circle(0.0, 0.0, 10.0), circle(0.0, 7.0, 4.0)),
        ];

        for (a, b) in cases {
            for choice in [RootChoice::PositiveCross, RootChoice::NegativeCross] {
                let p = intersect_circles(a, b, choice).unwrap();
                assert_abs_diff_eq!(p.distance(a.center), a.radius, epsilon = 1e-4);
                assert_abs_diff_eq!(p.distance(b.center), b.radius, epsilon = 1e-4);
            }
        }
    }

    #[test]
    fn root_choice_picks_cross_sign() {
        let a = circle(0.0, 0.0, 5.0);
        let b = circle(8.0, 0.0, 5.0);
        let delta = b.center - a.center;

        let pos = intersect_circles(a, b, RootChoice::PositiveCross).unwrap();
        let neg = intersect_circles(a, b, RootChoice::NegativeCross).unwrap();

        assert!(delta.cross(pos - a.center) > 0.0);
        assert!(delta.cross(neg - a.center) < 0.0);
        assert_abs_diff_eq!(pos.x, 4.0, epsilon = 1e-9);
        assert_abs_diff_eq!(pos.y, 3.0, epsilon = 1e-9);
    }

    #[test]
    fn separated_circles_fail() {
        let result = intersect_circles(circle(0.0, 0.0, 1.0), circle(5.0, 0.0, 1.0), RootChoice::default());
        assert!(matches!(result, Err(SketchError::LinkageUnsolvable { .. })));
    }

    #[test]
    fn nested_circles_fail() {
        let result = intersect_circles(circle(0.0, 0.0, 10.0), circle(1.0, 0.0, 2.0), RootChoice::default());
        assert!(matches!(result, Err(SketchError::LinkageUnsolvable { .. })));
    }

    #[test]
    fn coincident_centers_fail() {
        let result = intersect_circles(circle(3.0, 3.0, 2.0), circle(3.0, 3.0, 2.0), RootChoice::default());
        assert!(matches!(result, Err(SketchError::LinkageUnsolvable { .. })));
    }

    #[test]
    fn external_tangency_within_tolerance() {
        let p = intersect_circles(circle(0.0, 0.0, 2.0), circle(5.00005, 0.0, 3.0), RootChoice::default()).unwrap();
        assert_abs_diff_eq!(p.x, 2.0, epsilon = 1e-9);
        assert_abs_diff_eq!(p.y, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn internal_tangency_lands_on_both_circles() {
        // Small circle inside the big one, touching on the far side
        let p = intersect_circles(circle(0.0, 0.0, 2.0), circle(2.99995, 0.0, 5.0), RootChoice::default()).unwrap();
        assert_abs_diff_eq!(p.x, -2.0, epsilon = 1e-9);

        let q = intersect_circles(circle(0.0, 0.0, 5.0), circle(2.99995, 0.0, 2.0), RootChoice::default()).unwrap();
        assert_abs_diff_eq!(q.x, 5.0, epsilon = 1e-9);
    }

    fn default_linkage() -> Linkage {
        Linkage {
            first: Wheel { center: Point::new(-150.0, 0.0), radius: 100.0, attachment: 60.0, speed: 0.02 },
            second: Wheel { center: Point::new(150.0, 0.0), radius: 80.0, attachment: 50.0, speed: 0.05 },
            first_rod: 250.0,
            second_rod: 250.0,
            pen_ratio: 1.3,
            root: RootChoice::PositiveCross,
        }
    }

    #[test]
    fn pen_extends_past_joint() {
        let pose = default_linkage().solve(0.0).unwrap();
        assert_eq!(pose.attachment_a, Point::new(-90.0, 0.0));
        assert_eq!(pose.attachment_b, Point::new(200.0, 0.0));

        let rod = pose.joint - pose.attachment_b;
        let pen = pose.pen - pose.attachment_b;
        assert_abs_diff_eq!(pen.x, rod.x * 1.3, epsilon = 1e-9);
        assert_abs_diff_eq!(pen.y, rod.y * 1.3, epsilon = 1e-9);
        assert_abs_diff_eq!(pose.joint.distance(pose.attachment_a), 250.0, epsilon = 1e-6);
    }

    #[test]
    fn short_rods_cannot_connect() {
        let mut linkage = default_linkage();
        linkage.first_rod = 50.0;
        linkage.second_rod = 50.0;
        assert!(linkage.solve(0.0).is_err());
    }
}
