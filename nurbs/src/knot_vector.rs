use crate::{NurbsError, Result};
use ordered_float::OrderedFloat;
use std::collections::BTreeMap;
use std::ops::Range;

/// Non-decreasing sequence of knots.
///
/// A knot vector is never edited in place: insertion, merging and extraction
/// all return a new vector.
#[derive(Clone, Debug, PartialEq)]
pub struct KnotVector(Vec<f64>);

impl std::ops::Deref for KnotVector {
    type Target = [f64];
    fn deref(&self) -> &[f64] {
        &self.0
    }
}

impl KnotVector {
    pub fn new(knots: Vec<f64>) -> Result<Self> {
        if knots.is_empty() {
            return Err(NurbsError::knot_vector("no knots"));
        }
        if let Some(i) = knots.iter().position(|k| !k.is_finite()) {
            return Err(NurbsError::knot_vector(format!(
                "knot {i} is not finite"
            )));
        }
        if let Some(i) = knots.windows(2).position(|w| w[1] < w[0]) {
            return Err(NurbsError::knot_vector(format!(
                "knots decrease at index {} ({} < {})",
                i + 1,
                knots[i + 1],
                knots[i]
            )));
        }
        Ok(Self(knots))
    }

    /// Builds a clamped knot vector on `[lo, hi]`, with `order` copies of
    /// each end and `interior` evenly spaced knots between them.
    pub fn clamped(order: usize, lo: f64, hi: f64, interior: usize) -> Result<Self> {
        if order == 0 {
            return Err(NurbsError::order(order, "must be at least 1"));
        }
        if !(lo < hi) {
            return Err(NurbsError::knot_vector(format!(
                "empty parameter range [{lo}, {hi}]"
            )));
        }
        let step = (hi - lo) / (interior + 1) as f64;
        let mut knots = Vec::with_capacity(2 * order + interior);
        knots.extend(std::iter::repeat(lo).take(order));
        knots.extend((1..=interior).map(|i| lo + step * i as f64));
        knots.extend(std::iter::repeat(hi).take(order));
        Self::new(knots)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Number of control points implied by this knot vector at `order`
    pub fn control_count(&self, order: usize) -> usize {
        self.0.len().saturating_sub(order)
    }

    /// Valid parameter range `[knots[order - 1], knots[n]]`.
    ///
    /// The caller must have checked that there are at least `order` control
    /// points.
    pub(crate) fn domain(&self, order: usize) -> (f64, f64) {
        (self.0[order - 1], self.0[self.control_count(order)])
    }

    /// Finds the span `i` such that `knots[i] <= t < knots[i + 1]`, clamped
    /// to the valid spans `order - 1 ..= n - 1`.  The upper end of the domain
    /// belongs to the last non-empty span.
    pub(crate) fn find_span(&self, order: usize, t: f64) -> usize {
        let k = &self.0;
        let n = self.control_count(order);
        if t >= k[n] {
            let mut span = n - 1;
            while span > order - 1 && k[span] >= k[n] {
                span -= 1;
            }
            return span;
        }
        if t <= k[order - 1] {
            return order - 1;
        }
        // k[lo] <= t < k[hi]
        let (mut lo, mut hi) = (order - 1, n);
        while hi - lo > 1 {
            let mid = (lo + hi) / 2;
            if t < k[mid] {
                hi = mid;
            } else {
                lo = mid;
            }
        }
        lo
    }

    pub fn multiplicity(&self, t: f64) -> usize {
        self.0.iter().filter(|&&k| k == t).count()
    }

    /// Returns a copy with enough copies of `t` inserted that it appears at
    /// least `mult` times.
    pub fn with_multiplicity(&self, t: f64, mult: usize) -> Self {
        let missing = mult.saturating_sub(self.multiplicity(t));
        let at = self.0.partition_point(|&k| k <= t);
        let mut knots = Vec::with_capacity(self.0.len() + missing);
        knots.extend_from_slice(&self.0[..at]);
        knots.extend(std::iter::repeat(t).take(missing));
        knots.extend_from_slice(&self.0[at..]);
        Self(knots)
    }

    /// Multiset union of two knot vectors: every value keeps the larger of
    /// its two multiplicities.
    pub fn merge(&self, other: &KnotVector) -> Self {
        let mut counts: BTreeMap<OrderedFloat<f64>, (usize, usize)> = BTreeMap::new();
        for &k in self.0.iter() {
            counts.entry(OrderedFloat(k)).or_default().0 += 1;
        }
        for &k in other.0.iter() {
            counts.entry(OrderedFloat(k)).or_default().1 += 1;
        }
        let knots = counts
            .into_iter()
            .flat_map(|(k, (a, b))| std::iter::repeat(k.0).take(a.max(b)))
            .collect();
        Self(knots)
    }

    /// Copies out the knots in `range`.
    ///
    /// # Panics
    /// If `range` is empty or out of bounds
    pub(crate) fn extract(&self, range: Range<usize>) -> Self {
        assert!(!range.is_empty());
        Self(self.0[range].to_vec())
    }

    /// Affinely remaps the knots onto `[0, 1]`
    pub fn normalized(&self) -> Self {
        let lo = self.0[0];
        let span = self.0[self.0.len() - 1] - lo;
        if span == 0.0 {
            return self.clone();
        }
        Self(self.0.iter().map(|k| (k - lo) / span).collect())
    }

    /// Checks that `new` is a refinement of `self`: every new knot lies
    /// within `[self[0], self[last]]` and the old knots appear in `new` as a
    /// subsequence (counting multiplicity).
    pub fn check_refinement(&self, new: &KnotVector) -> Result<()> {
        let (lo, hi) = (self.0[0], self.0[self.0.len() - 1]);
        if let Some(t) = new.0.iter().find(|&&t| t < lo || t > hi) {
            return Err(NurbsError::refinement(format!(
                "knot {t} lies outside [{lo}, {hi}]"
            )));
        }
        let mut remaining = new.0.iter();
        for (i, &k) in self.0.iter().enumerate() {
            if !remaining.any(|&t| t == k) {
                return Err(NurbsError::refinement(format!(
                    "old knot {k} (index {i}) is missing from the new knot vector"
                )));
            }
        }
        Ok(())
    }

    /// Smallest knot strictly greater than `t`
    pub fn next_distinct(&self, t: f64) -> Option<f64> {
        self.0.iter().copied().find(|&k| k > t)
    }

    /// Largest knot strictly less than `t`
    pub fn prev_distinct(&self, t: f64) -> Option<f64> {
        self.0.iter().rev().copied().find(|&k| k < t)
    }

    /// Parameter at which to subdivide: the middle knot, or the middle of the
    /// domain if the middle knot sits on one of its ends.
    pub(crate) fn split_value(&self, order: usize) -> f64 {
        let (lo, hi) = self.domain(order);
        let mid = self.0[(self.0.len() - 1) / 2];
        if mid > lo && mid < hi {
            mid
        } else {
            (lo + hi) / 2.0
        }
    }
}
