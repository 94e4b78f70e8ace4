//! Transform/layer engine.
//!
//! - [`Similarity`]: scale about a center, rotate about it, then translate.
//!   Used for moiré layers and duplicate placement.
//! - [`DuplicateSchedule`]: the shrink-then-grow scale sequence for nested
//!   duplicate copies.
//! - [`Placement`]: where each plain duplicate goes (rotation fan or spiral).
//! - [`View`]: Euler rotation plus orthographic projection for 3D output.

use serde::{Deserialize, Serialize};

use crate::geometry::{map_range, Point, Point3};

/// Duplicates whose accumulated scale drops to this are skipped.
pub const MIN_DUPLICATE_SCALE: f64 = 1e-6;

/// Smallest relative growth per duplicate step.
pub const MIN_RELATIVE_OFFSET: f64 = 0.01;

// ============================================================================
// SIMILARITY
// ============================================================================

/// A uniform scale and rotation about `center`, followed by a translation.
///
/// Angles and ratios of distances are preserved, so a layer stays the same
/// shape as its base pattern.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Similarity {
    pub center: Point,
    pub scale: f64,
    /// Radians
    pub rotation: f64,
    pub translation: Point,
}

impl Default for Similarity {
    fn default() -> Self {
        Self::identity()
    }
}

impl Similarity {
    pub fn identity() -> Self {
        Self { center: Point::default(), scale: 1.0, rotation: 0.0, translation: Point::default() }
    }

    pub fn with_center(mut self, center: Point) -> Self {
        self.center = center;
        self
    }

    pub fn scaled(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    pub fn rotated(mut self, rotation: f64) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn translated(mut self, translation: Point) -> Self {
        self.translation = translation;
        self
    }

    #[inline]
    pub fn apply(&self, p: Point) -> Point {
        p.scale_about(self.center, self.scale)
            .rotate_about(self.center, self.rotation)
            + self.translation
    }

    /// Apply in the xy plane; z scales with the rest.
    #[inline]
    pub fn apply3(&self, p: Point3) -> Point3 {
        let xy = self.apply(p.xy());
        Point3::new(xy.x, xy.y, p.z * self.scale)
    }

    pub fn apply_all(&self, points: &[Point]) -> Vec<Point> {
        points.iter().map(|&p| self.apply(p)).collect()
    }
}

// ============================================================================
// DUPLICATE SCHEDULE
// ============================================================================

/// Multiplicative scale schedule for nested duplicates.
///
/// Within a cycle of `cycle_count` steps the per-step multiplier is
/// `1 + max(0.01, initial_scale_offset − 1)·decay^e`, with the exponent
/// `e` counting up for the first half and back down for the second half.
/// The running product is the scale of each drawn copy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DuplicateSchedule {
    pub cycle_count: usize,
    pub num_cycles: usize,
    pub initial_scale_offset: f64,
    pub scale_decay: f64,
    /// Scale the running product starts from
    pub base_scale: f64,
    /// Restart the product at `base_scale` for every cycle
    pub reset_each_cycle: bool,
}

/// One drawn duplicate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DuplicateStep {
    /// Index across all cycles: `cycle·cycle_count + step`
    pub index: usize,
    pub cycle: usize,
    pub step: usize,
    pub total_scale: f64,
}

impl DuplicateSchedule {
    /// Cycle length, never below 2.
    pub fn effective_cycle_count(&self) -> usize {
        self.cycle_count.max(2)
    }

    pub fn total_duplicates(&self) -> usize {
        self.effective_cycle_count() * self.num_cycles
    }

    /// Decay exponent for step `d` within a cycle.
    pub fn exponent(&self, d: usize) -> usize {
        let count = self.effective_cycle_count();
        let half = count / 2;
        let d = d % count;
        if d < half { d } else { count - 1 - d }
    }

    /// Scale multiplier applied at step `d` within a cycle.
    pub fn multiplier(&self, d: usize) -> f64 {
        let relative = (self.initial_scale_offset - 1.0).max(MIN_RELATIVE_OFFSET);
        1.0 + relative * self.scale_decay.powi(self.exponent(d) as i32)
    }

    /// Every duplicate that should be drawn, in order.
    ///
    /// Steps whose running scale is at or below [`MIN_DUPLICATE_SCALE`]
    /// are left out; the product carries on through them.
    pub fn steps(&self) -> Vec<DuplicateStep> {
        let count = self.effective_cycle_count();
        let mut steps = Vec::with_capacity(self.total_duplicates());
        let mut total = self.base_scale;

        for cycle in 0..self.num_cycles {
            if self.reset_each_cycle {
                total = self.base_scale;
            }
            for step in 0..count {
                total *= self.multiplier(step);
                if total <= MIN_DUPLICATE_SCALE {
                    continue;
                }
                steps.push(DuplicateStep { index: cycle * count + step, cycle, step, total_scale: total });
            }
        }
        steps
    }
}

// ============================================================================
// PLACEMENT
// ============================================================================

/// How plain (unscaled) duplicates are arranged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Placement {
    /// Copy `i` is rotated by `base + i·step` degrees.
    Rotation { base_deg: f64, step_deg: f64 },
    /// Copy `i` moves out along a spiral: angle and radius grow linearly
    /// with `i/count` up to `total_deg` and `radius`. Every copy keeps the
    /// base rotation.
    Spiral { base_deg: f64, total_deg: f64, radius: f64, count: usize },
}

impl Placement {
    /// Transform for duplicate `index`, with the copy itself scaled by `scale`.
    pub fn similarity(&self, index: usize, scale: f64) -> Similarity {
        match *self {
            Placement::Rotation { base_deg, step_deg } => Similarity::identity()
                .scaled(scale)
                .rotated((base_deg + index as f64 * step_deg).to_radians()),
            Placement::Spiral { base_deg, total_deg, radius, count } => {
                let count = count.max(1) as f64;
                let angle = map_range(index as f64, 0.0, count, 0.0, total_deg.to_radians());
                let distance = map_range(index as f64, 0.0, count, 0.0, radius);
                Similarity::identity()
                    .scaled(scale)
                    .rotated(base_deg.to_radians())
                    .translated(Point::from_angle(angle) * distance)
            }
        }
    }
}

// ============================================================================
// VIEW
// ============================================================================

/// Camera for 3D output: rotate about X, then Y, then Z, then scale, and
/// project orthographically onto the xy plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct View {
    /// Degrees
    pub rot_x: f64,
    /// Degrees
    pub rot_y: f64,
    /// Degrees
    pub rot_z: f64,
    pub scale: f64,
}

impl Default for View {
    fn default() -> Self {
        Self { rot_x: 0.0, rot_y: 0.0, rot_z: 0.0, scale: 1.0 }
    }
}

impl View {
    pub fn new(rot_x: f64, rot_y: f64, rot_z: f64, scale: f64) -> Self {
        Self { rot_x, rot_y, rot_z, scale }
    }

    /// Rotated and scaled, still in 3D.
    pub fn transform(&self, p: Point3) -> Point3 {
        p.rotate_x(self.rot_x.to_radians())
            .rotate_y(self.rot_y.to_radians())
            .rotate_z(self.rot_z.to_radians())
            .scale(self.scale)
    }

    /// Orthographic projection onto the screen plane.
    pub fn project(&self, p: Point3) -> Point {
        self.transform(p).xy()
    }

    pub fn is_identity(&self) -> bool {
        *self == View::default()
    }
}

/// Fixed camera orientations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewPreset {
    Front,
    Back,
    Left,
    Right,
    Top,
    Bottom,
    /// Front, with the zoom back at 1
    Reset,
}

impl ViewPreset {
    pub fn all() -> &'static [ViewPreset] {
        &[
            ViewPreset::Front,
            ViewPreset::Back,
            ViewPreset::Left,
            ViewPreset::Right,
            ViewPreset::Top,
            ViewPreset::Bottom,
            ViewPreset::Reset,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            ViewPreset::Front => "front",
            ViewPreset::Back => "back",
            ViewPreset::Left => "left",
            ViewPreset::Right => "right",
            ViewPreset::Top => "top",
            ViewPreset::Bottom => "bottom",
            ViewPreset::Reset => "reset",
        }
    }

    pub fn from_name(name: &str) -> Option<ViewPreset> {
        let name = name.to_lowercase();
        ViewPreset::all().iter().copied().find(|p| p.name() == name)
    }

    /// `(rot_x, rot_y)` in degrees.
    pub fn angles(&self) -> (f64, f64) {
        match self {
            ViewPreset::Front | ViewPreset::Reset => (0.0, 0.0),
            ViewPreset::Back => (0.0, 180.0),
            ViewPreset::Left => (0.0, -90.0),
            ViewPreset::Right => (0.0, 90.0),
            ViewPreset::Top => (-90.0, 0.0),
            ViewPreset::Bottom => (90.0, 0.0),
        }
    }

    /// Apply to `view`, keeping its z rotation and (except for
    /// [`ViewPreset::Reset`]) its scale.
    pub fn apply(&self, view: View) -> View {
        let (rot_x, rot_y) = self.angles();
        let scale = if *self == ViewPreset::Reset { 1.0 } else { view.scale };
        View { rot_x, rot_y, scale, ..view }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn spec_schedule() -> DuplicateSchedule {
        DuplicateSchedule {
            cycle_count: 20,
            num_cycles: 1,
            initial_scale_offset: 1.1,
            scale_decay: 0.9,
            base_scale: 1.0,
            reset_each_cycle: false,
        }
    }

    #[test]
    fn schedule_is_symmetric() {
        let schedule = spec_schedule();
        assert_abs_diff_eq!(schedule.multiplier(0), schedule.multiplier(19), epsilon = 1e-15);
        assert!(schedule.multiplier(10) <= schedule.multiplier(9));
        assert_abs_diff_eq!(schedule.multiplier(0), 1.1, epsilon = 1e-12);
        for d in 0..10 {
            assert_abs_diff_eq!(schedule.multiplier(d), schedule.multiplier(19 - d), epsilon = 1e-15);
        }
    }

    #[test]
    fn odd_cycle_has_single_peak() {
        let schedule = DuplicateSchedule { cycle_count: 5, ..spec_schedule() };
        let exponents: Vec<_> = (0..5).map(|d| schedule.exponent(d)).collect();
        assert_eq!(exponents, vec![0, 1, 2, 1, 0]);
    }

    #[test]
    fn cycle_count_never_below_two() {
        let schedule = DuplicateSchedule { cycle_count: 0, ..spec_schedule() };
        assert_eq!(schedule.effective_cycle_count(), 2);
        assert_eq!(schedule.steps().len(), 2);
    }

    #[test]
    fn relative_offset_has_floor() {
        let schedule = DuplicateSchedule { initial_scale_offset: 0.5, ..spec_schedule() };
        assert_abs_diff_eq!(schedule.multiplier(0), 1.01, epsilon = 1e-12);
    }

    #[test]
    fn running_product_carries_across_cycles() {
        let running = DuplicateSchedule { num_cycles: 2, ..spec_schedule() };
        let steps = running.steps();
        assert_eq!(steps.len(), 40);
        assert!(steps[20].total_scale > steps[19].total_scale);
        assert_abs_diff_eq!(
            steps[20].total_scale,
            steps[19].total_scale * running.multiplier(0),
            epsilon = 1e-12
        );

        let reset = DuplicateSchedule { reset_each_cycle: true, ..running };
        let steps = reset.steps();
        assert_abs_diff_eq!(steps[20].total_scale, steps[0].total_scale, epsilon = 1e-12);
        assert_eq!(steps[25].index, 25);
        assert_eq!(steps[25].cycle, 1);
    }

    #[test]
    fn negligible_scales_are_skipped_without_reset() {
        let schedule = DuplicateSchedule { base_scale: 1e-7, cycle_count: 4, ..spec_schedule() };
        let steps = schedule.steps();
        // 1e-7 · 1.1 · 1.09 · ... stays far below the threshold
        assert!(steps.is_empty());

        let negative = DuplicateSchedule { base_scale: -1.0, ..spec_schedule() };
        assert!(negative.steps().is_empty());
    }

    #[test]
    fn similarity_preserves_shape() {
        let sim = Similarity::identity()
            .with_center(Point::new(5.0, -2.0))
            .scaled(1.7)
            .rotated(0.4)
            .translated(Point::new(10.0, 10.0));

        let a = Point::new(1.0, 1.0);
        let b = Point::new(4.0, 3.0);
        let c = Point::new(-2.0, 6.0);
        let (ta, tb, tc) = (sim.apply(a), sim.apply(b), sim.apply(c));

        assert_abs_diff_eq!(ta.distance(tb) / a.distance(b), 1.7, epsilon = 1e-12);
        assert_abs_diff_eq!(tb.distance(tc) / b.distance(c), 1.7, epsilon = 1e-12);

        let angle = |p: Point, q: Point, r: Point| {
            let (u, v) = (q - p, r - p);
            u.cross(v).atan2(u.dot(v))
        };
        assert_abs_diff_eq!(angle(a, b, c), angle(ta, tb, tc), epsilon = 1e-12);
    }

    #[test]
    fn similarity_order_is_scale_rotate_translate() {
        let sim = Similarity::identity().scaled(2.0).rotated(std::f64::consts::FRAC_PI_2).translated(Point::new(1.0, 0.0));
        let p = sim.apply(Point::new(1.0, 0.0));
        assert!(p.approx_eq(Point::new(1.0, 2.0), 1e-12));
    }

    #[test]
    fn spiral_placement_starts_at_origin() {
        let placement = Placement::Spiral { base_deg: 0.0, total_deg: 360.0, radius: 200.0, count: 4 };
        let first = placement.similarity(0, 1.0);
        assert!(first.translation.approx_eq(Point::default(), 1e-12));
        let second = placement.similarity(1, 1.0);
        assert!(second.translation.approx_eq(Point::new(0.0, 50.0), 1e-9));
    }

    #[test]
    fn front_view_is_identity_projection() {
        let view = ViewPreset::Front.apply(View::default());
        let p = view.project(Point3::new(3.0, 4.0, 5.0));
        assert!(p.approx_eq(Point::new(3.0, 4.0), 1e-12));
    }

    #[test]
    fn reset_restores_zoom() {
        let zoomed = View::new(10.0, 20.0, 0.0, 3.0);
        assert_eq!(ViewPreset::Reset.apply(zoomed), View::default());
        assert_eq!(ViewPreset::Top.apply(zoomed).scale, 3.0);
        assert_eq!(ViewPreset::from_name("Bottom"), Some(ViewPreset::Bottom));
    }

    #[test]
    fn side_view_shows_depth() {
        let view = ViewPreset::Right.apply(View::default());
        let p = view.project(Point3::new(0.0, 4.0, 5.0));
        // Rotating +90 degrees about y brings z onto x
        assert!(p.approx_eq(Point::new(5.0, 4.0), 1e-9));
    }
}
