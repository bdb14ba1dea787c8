use crate::VecF;
use smallvec::smallvec;

/// Computes the `order` non-vanishing basis functions at `t`, for the span
/// `span` returned by `KnotVector::find_span`.
///
/// Element `r` of the result weights control point `span - (order - 1) + r`.
/// Spans of zero length contribute nothing rather than dividing by zero.
///
/// Algorithm A2.2
pub(crate) fn basis_funs(knots: &[f64], order: usize, span: usize, t: f64) -> VecF {
    let mut N: VecF = smallvec![0.0; order];
    let mut left: VecF = smallvec![0.0; order];
    let mut right: VecF = smallvec![0.0; order];
    N[0] = 1.0;
    for j in 1..order {
        left[j] = t - knots[span + 1 - j];
        right[j] = knots[span + j] - t;
        let mut saved = 0.0;
        for r in 0..j {
            let denom = right[r + 1] + left[j - r];
            let temp = if denom == 0.0 { 0.0 } else { N[r] / denom };
            N[r] = saved + right[r + 1] * temp;
            saved = left[j - r] * temp;
        }
        N[j] = saved;
    }
    N
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partition_of_unity() {
        let knots = [0.0, 0.0, 0.0, 0.0, 0.3, 0.7, 1.0, 1.0, 1.0, 1.0];
        for (span, t) in [(3, 0.1), (4, 0.5), (5, 0.9)] {
            let N = basis_funs(&knots, 4, span, t);
            let sum: f64 = N.iter().sum();
            assert!((sum - 1.0).abs() < 1e-12);
            assert!(N.iter().all(|&b| b >= 0.0));
        }
    }

    #[test]
    fn quadratic_bezier() {
        let knots = [0.0, 0.0, 0.0, 1.0, 1.0, 1.0];
        let N = basis_funs(&knots, 3, 2, 0.5);
        assert_eq!(N.as_slice(), &[0.25, 0.5, 0.25]);
    }
}
