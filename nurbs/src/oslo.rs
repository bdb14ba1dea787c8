//! Knot refinement matrices, built with the Lyche–Mørken "Oslo" algorithm.
//!
//! Given an order `k`, an old knot vector `tau` and a refinement `t` of it,
//! new control point `j` is the blossom of the old spline evaluated at the
//! interior knots `t[j + 1] .. t[j + k - 1]`.  Those knots that coincide with
//! a run of old knots `tau[mu' + 1 ..]` collapse onto old control point
//! `mu'` directly, so only the `v` remaining knots need a de Boor-style
//! recurrence, and the row has at most `v + 1` non-zero entries.
use crate::{KnotVector, NurbsError, Result, VecF};
use log::{debug, trace};
use smallvec::SmallVec;

/// One row of a [`RefinementMatrix`]: new control point `i` is
/// `sum(coeffs[k] * old[offset + k])`.
#[derive(Clone, Debug, PartialEq)]
pub struct OsloRow {
    pub offset: usize,
    pub coeffs: VecF,
}

impl OsloRow {
    pub fn len(&self) -> usize {
        self.coeffs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coeffs.is_empty()
    }
}

/// Banded sparse matrix mapping old control points onto the control points
/// of a refined knot vector.  There is one row per new control point.
#[derive(Clone, Debug, PartialEq)]
pub struct RefinementMatrix {
    pub(crate) rows: Vec<OsloRow>,
}

impl RefinementMatrix {
    /// Builds the matrix taking control points on `old` to control points on
    /// `new`, for splines of the given `order`.
    ///
    /// Fails with [`NurbsError::InvalidKnotRefinement`] if `new` is not a
    /// refinement of `old`; nothing is computed in that case.
    pub fn build(order: usize, old: &KnotVector, new: &KnotVector) -> Result<Self> {
        if order == 0 {
            return Err(NurbsError::order(order, "must be at least 1"));
        }
        if old.control_count(order) < order {
            return Err(NurbsError::order(
                order,
                format!("needs at least {} knots, got {}", 2 * order, old.len()),
            ));
        }
        old.check_refinement(new)?;

        let tau = old.as_slice();
        let t = new.as_slice();
        let k = order;
        let n = old.control_count(k);
        let m = new.control_count(k);

        // Out-of-range indices only arise for unclamped starts; they read the
        // first knot, and their coefficients are dropped below.
        let knot = |i: isize| tau[i.clamp(0, tau.len() as isize - 1) as usize];

        let mut rows = Vec::with_capacity(m);
        let mut mu = 0;
        let mut x: SmallVec<[f64; 8]> = SmallVec::new();
        let mut ah: VecF = SmallVec::new();
        for j in 0..m {
            while mu + 1 < n && tau[mu + 1] <= t[j] {
                mu += 1;
            }

            // Walk back over new knots that repeat the old knot at mu
            let mut muprime = mu;
            let mut i = j + 1;
            while i < j + k && muprime > 0 && t[i] == tau[muprime] {
                i += 1;
                muprime -= 1;
            }

            // New knots in the window that don't land on tau[muprime + 1 ..]
            x.clear();
            let mut ih = muprime + 1;
            for p in 1..k {
                if ih < tau.len() && t[j + p] == tau[ih] {
                    ih += 1;
                } else {
                    x.push(t[j + p]);
                }
            }
            let v = x.len();

            // ah[q] is the weight of old control point base + q
            let base = muprime as isize - v as isize;
            ah.clear();
            ah.resize(v + 1, 0.0);
            ah[v] = 1.0;
            for r in (1..=v).rev() {
                let xr = x[r - 1];
                let mut carry = 0.0;
                for q in r..=v {
                    let i = base + q as isize;
                    let d1 = xr - knot(i);
                    let d2 = knot(i + (k - r) as isize) - xr;
                    let w = ah[q];
                    // Knots landing exactly on an old knot pass their weight
                    // through whole, so unchanged knots give exact identity rows
                    let (lo, hi) = if d1 + d2 == 0.0 || d2 == 0.0 {
                        (0.0, w)
                    } else if d1 == 0.0 {
                        (w, 0.0)
                    } else {
                        let beta = w / (d1 + d2);
                        (d2 * beta, d1 * beta)
                    };
                    ah[q - 1] = carry + lo;
                    carry = hi;
                }
                ah[v] = carry;
            }

            // Trim to the non-zero support
            let mut start = (-base).max(0) as usize;
            let mut end = v + 1;
            while start + 1 < end && ah[start] == 0.0 {
                start += 1;
            }
            while end - 1 > start && ah[end - 1] == 0.0 {
                end -= 1;
            }
            let offset = (base + start as isize) as usize;
            trace!("oslo row {j}: mu = {mu}, muprime = {muprime}, v = {v}, offset = {offset}");
            rows.push(OsloRow {
                offset,
                coeffs: ah[start..end].iter().copied().collect(),
            });
        }
        debug!(
            "built {}x{} refinement matrix (order {k}, {} new knots)",
            m,
            n,
            new.len() - old.len()
        );
        Ok(Self { rows })
    }

    /// Number of rows, i.e. new control points
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[OsloRow] {
        &self.rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kv(knots: &[f64]) -> KnotVector {
        KnotVector::new(knots.to_vec()).unwrap()
    }

    fn dense(m: &RefinementMatrix, n: usize) -> Vec<Vec<f64>> {
        m.rows()
            .iter()
            .map(|row| {
                let mut out = vec![0.0; n];
                for (k, c) in row.coeffs.iter().enumerate() {
                    out[row.offset + k] = *c;
                }
                out
            })
            .collect()
    }

    #[test]
    fn quadratic_midpoint_insertion() {
        let old = kv(&[0.0, 0.0, 0.0, 1.0, 1.0, 1.0]);
        let new = kv(&[0.0, 0.0, 0.0, 0.5, 1.0, 1.0, 1.0]);
        let m = RefinementMatrix::build(3, &old, &new).unwrap();
        assert_eq!(
            dense(&m, 3),
            vec![
                vec![1.0, 0.0, 0.0],
                vec![0.5, 0.5, 0.0],
                vec![0.0, 0.5, 0.5],
                vec![0.0, 0.0, 1.0],
            ]
        );
        assert_eq!(m.rows()[3].offset, 2);
        assert_eq!(m.rows()[3].len(), 1);
    }

    #[test]
    fn full_multiplicity_insertion() {
        let old = kv(&[0.0, 0.0, 0.0, 1.0, 1.0, 1.0]);
        let new = old.with_multiplicity(0.5, 3);
        let m = RefinementMatrix::build(3, &old, &new).unwrap();
        assert_eq!(m.len(), 6);
        // The shared row is the curve point at 0.5
        assert_eq!(m.rows()[2].offset, 0);
        assert_eq!(m.rows()[2].coeffs.as_slice(), &[0.25, 0.5, 0.25]);
        assert_eq!(m.rows()[3].coeffs.as_slice(), &[0.25, 0.5, 0.25]);
    }

    #[test]
    fn identity_on_unchanged_knots() {
        let knots = kv(&[0.0, 0.0, 0.0, 0.0, 0.5, 1.0, 1.0, 1.0, 1.0]);
        let m = RefinementMatrix::build(4, &knots, &knots).unwrap();
        assert_eq!(m.len(), 5);
        for (i, row) in m.rows().iter().enumerate() {
            assert_eq!(row.offset, i);
            assert_eq!(row.coeffs.as_slice(), &[1.0]);
        }
    }

    #[test]
    fn rows_are_affine() {
        let old = kv(&[0.0, 0.0, 0.0, 0.0, 0.4, 1.0, 1.0, 1.0, 1.0]);
        let new = kv(&[
            0.0, 0.0, 0.0, 0.0, 0.1, 0.4, 0.4, 0.7, 0.8, 1.0, 1.0, 1.0, 1.0,
        ]);
        let m = RefinementMatrix::build(4, &old, &new).unwrap();
        assert_eq!(m.len(), 9);
        for row in m.rows() {
            let sum: f64 = row.coeffs.iter().sum();
            assert!((sum - 1.0).abs() < 1e-12, "row sums to {sum}");
            assert!(row.offset + row.len() <= 5);
            assert!(row.len() <= 4);
        }
    }

    #[test]
    fn rejects_non_refinement() {
        let old = kv(&[0.0, 0.0, 0.5, 1.0, 1.0]);
        let new = kv(&[0.0, 0.0, 0.25, 1.0, 1.0]);
        assert!(matches!(
            RefinementMatrix::build(2, &old, &new),
            Err(NurbsError::InvalidKnotRefinement { .. })
        ));

        let new = kv(&[0.0, 0.0, 0.5, 1.0, 1.0, 1.5]);
        assert!(matches!(
            RefinementMatrix::build(2, &old, &new),
            Err(NurbsError::InvalidKnotRefinement { .. })
        ));
    }
}
