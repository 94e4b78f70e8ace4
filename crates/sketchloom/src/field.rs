//! Cached random values for moiré rings.
//!
//! A [`RandomField`] holds three things:
//!
//! - the baseline radial distance of every ring point, drawn from the live
//!   generator;
//! - one fluctuation factor per (duplicate, point) pair, also from the live
//!   generator;
//! - a cache of baselines for other point counts, each drawn from its own
//!   generator keyed by the count.
//!
//! The live generator is only touched by [`RandomField::regenerate`] and
//! [`RandomField::resize_baseline`]. Custom counts never read from it, so
//! asking for a layer with a different point count cannot change what the
//! base ring looks like.
//!
//! ## Rust Lesson #13: `entry()` API
//!
//! `HashMap::entry(key).or_insert_with(|| ...)` looks the key up once and
//! only runs the closure on a miss. It is the idiomatic memoization pattern.

use std::collections::HashMap;

use crate::rng::Rng;

/// Baseline radial distances are drawn from `[MIN, MAX)`.
pub const BASELINE_MIN: f64 = 1.0;
pub const BASELINE_MAX: f64 = 7.0;

#[derive(Debug, Clone)]
pub struct RandomField {
    rng: Rng,
    baseline: Vec<f64>,
    fluctuations: Vec<Vec<f64>>,
    custom: HashMap<usize, Vec<f64>>,
}

impl Default for RandomField {
    fn default() -> Self {
        Self {
            rng: Rng::default(),
            baseline: Vec::new(),
            fluctuations: Vec::new(),
            custom: HashMap::new(),
        }
    }
}

fn draw_baseline(rng: &mut Rng, count: usize) -> Vec<f64> {
    (0..count).map(|_| rng.next_range(BASELINE_MIN, BASELINE_MAX)).collect()
}

impl RandomField {
    /// A freshly generated field; see [`RandomField::regenerate`].
    pub fn new(seed: Option<u64>, points: usize, duplicates: usize, row_len: usize) -> Self {
        let mut field = Self::default();
        field.regenerate(seed, points, duplicates, row_len);
        field
    }

    /// Reseed the live generator (from entropy when `seed` is `None`), draw
    /// a new baseline of `points` values and `duplicates` rows of
    /// `row_len` fluctuation factors, and drop every cached custom count.
    pub fn regenerate(&mut self, seed: Option<u64>, points: usize, duplicates: usize, row_len: usize) {
        self.rng = match seed {
            Some(seed) => Rng::new(seed),
            None => Rng::from_entropy(),
        };
        self.baseline = draw_baseline(&mut self.rng, points);
        self.fluctuations = (0..duplicates)
            .map(|_| (0..row_len).map(|_| self.rng.next_signed()).collect())
            .collect();
        self.custom.clear();

        tracing::debug!(points, duplicates, row_len, seeded = seed.is_some(), "regenerated random field");
    }

    /// Grow or shrink the baseline to `points` values.
    ///
    /// Existing values are kept; new ones come from the live generator.
    pub fn resize_baseline(&mut self, points: usize) {
        if points <= self.baseline.len() {
            self.baseline.truncate(points);
            return;
        }
        let extra = points - self.baseline.len();
        let more = draw_baseline(&mut self.rng, extra);
        self.baseline.extend(more);
    }

    pub fn baseline(&self) -> &[f64] {
        &self.baseline
    }

    pub fn duplicate_rows(&self) -> usize {
        self.fluctuations.len()
    }

    /// Fluctuation factor for point `index` of duplicate `duplicate`, in
    /// `[-1, 1)`. Zero when either index is out of range.
    pub fn fluctuation(&self, duplicate: usize, index: usize) -> f64 {
        self.fluctuations
            .get(duplicate)
            .and_then(|row| row.get(index))
            .copied()
            .unwrap_or(0.0)
    }

    /// Baseline distances for a ring of `count` points.
    ///
    /// Generated once per count from [`Rng::for_point_count`] and cached
    /// until the next regenerate.
    pub fn custom_distances(&mut self, count: usize) -> &[f64] {
        self.custom.entry(count).or_insert_with(|| {
            tracing::trace!(count, "generating custom point count");
            Self::custom_baseline(count)
        })
    }

    /// Cached distances for `count`, if [`RandomField::custom_distances`]
    /// has already produced them.
    pub fn cached_distances(&self, count: usize) -> Option<&[f64]> {
        self.custom.get(&count).map(Vec::as_slice)
    }

    /// The distances a custom ring of `count` points always gets.
    pub fn custom_baseline(count: usize) -> Vec<f64> {
        draw_baseline(&mut Rng::for_point_count(count), count)
    }

    /// Number of cached custom counts.
    pub fn cached_counts(&self) -> usize {
        self.custom.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_regenerate_is_reproducible() {
        let a = RandomField::new(Some(7), 12, 4, 30);
        let b = RandomField::new(Some(7), 12, 4, 30);
        assert_eq!(a.baseline(), b.baseline());
        for d in 0..4 {
            for i in 0..30 {
                assert_eq!(a.fluctuation(d, i), b.fluctuation(d, i));
            }
        }
    }

    #[test]
    fn values_stay_in_range() {
        let field = RandomField::new(Some(3), 100, 5, 100);
        assert!(field.baseline().iter().all(|v| (BASELINE_MIN..BASELINE_MAX).contains(v)));
        for d in 0..5 {
            for i in 0..100 {
                assert!((-1.0..1.0).contains(&field.fluctuation(d, i)));
            }
        }
    }

    #[test]
    fn out_of_range_fluctuation_is_zero() {
        let field = RandomField::new(Some(1), 6, 2, 6);
        assert_eq!(field.fluctuation(2, 0), 0.0);
        assert_eq!(field.fluctuation(0, 6), 0.0);
    }

    #[test]
    fn custom_counts_are_idempotent() {
        let mut field = RandomField::new(Some(11), 8, 2, 8);
        let first = field.custom_distances(9).to_vec();
        let second = field.custom_distances(9).to_vec();
        assert_eq!(first, second);
        assert_eq!(first.len(), 9);
        assert_eq!(field.cached_counts(), 1);

        // Same count from a differently seeded field gives the same shape
        let mut other = RandomField::new(Some(999), 8, 2, 8);
        assert_eq!(other.custom_distances(9), first.as_slice());
    }

    #[test]
    fn custom_counts_leave_live_stream_alone() {
        let mut touched = RandomField::new(Some(5), 8, 2, 8);
        let mut untouched = RandomField::new(Some(5), 8, 2, 8);

        touched.custom_distances(13);
        touched.custom_distances(21);

        touched.resize_baseline(20);
        untouched.resize_baseline(20);
        assert_eq!(touched.baseline(), untouched.baseline());
    }

    #[test]
    fn resize_keeps_existing_values() {
        let mut field = RandomField::new(Some(2), 5, 0, 0);
        let before = field.baseline().to_vec();
        field.resize_baseline(8);
        assert_eq!(&field.baseline()[..5], before.as_slice());
        field.resize_baseline(3);
        assert_eq!(field.baseline(), &before[..3]);
    }

    #[test]
    fn cached_lookup_matches_generated() {
        let mut field = RandomField::new(Some(8), 6, 1, 6);
        assert!(field.cached_distances(10).is_none());
        let generated = field.custom_distances(10).to_vec();
        assert_eq!(field.cached_distances(10), Some(generated.as_slice()));
        assert_eq!(RandomField::custom_baseline(10), generated);
    }

    #[test]
    fn regenerate_clears_custom_cache() {
        let mut field = RandomField::new(Some(4), 6, 1, 6);
        field.custom_distances(10);
        field.regenerate(Some(4), 6, 1, 6);
        assert_eq!(field.cached_counts(), 0);
    }
}
