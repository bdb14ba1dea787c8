//! Differentiation of curves and surfaces.
//!
//! The derivative of an order `k` spline is an order `k - 1` spline on the
//! same knots minus one at each end, with control points
//! `(k - 1) (p[i + 1] - p[i]) / (knots[i + k] - knots[i + 1])`.  Rational
//! splines are differentiated in homogeneous space: the result holds
//! `(d(wP), dw)`, which the normal evaluator and [`Curve::derivatives`] turn into
//! Euclidean tangents with the quotient rule.
use crate::{Curve, Direction, KnotVector, NurbsError, Result, Surface};
use log::debug;

/// Value of every coordinate of a derivative control point whose knot span
/// has zero length (a repeated knot, i.e. a possible cusp).
pub const DEGENERATE_SPAN_DERIVATIVE: f64 = 0.0;

/// Differences `count` points read at `stride` from `src`, writing packed
/// derivative points at `dst_stride` into `dst`.
#[allow(clippy::too_many_arguments)]
fn diff_line(
    knots: &[f64],
    order: usize,
    coords: usize,
    count: usize,
    src: &[f64],
    stride: usize,
    dst: &mut [f64],
    dst_stride: usize,
) {
    let scale = (order - 1) as f64;
    for i in 0..count - 1 {
        let span = knots[i + order] - knots[i + 1];
        let out = &mut dst[i * dst_stride..i * dst_stride + coords];
        if span == 0.0 {
            out.fill(DEGENERATE_SPAN_DERIVATIVE);
            continue;
        }
        let (a, b) = (i * stride, (i + 1) * stride);
        for (c, o) in out.iter_mut().enumerate() {
            *o = scale * (src[b + c] - src[a + c]) / span;
        }
    }
}

fn trimmed(knots: &KnotVector, order: usize) -> Result<KnotVector> {
    if order < 2 {
        return Err(NurbsError::order(order, "cannot differentiate below order 1"));
    }
    Ok(knots.extract(1..knots.len() - 1))
}

impl Curve {
    /// Returns the derivative curve, one order lower
    pub fn derivative(&self) -> Result<Curve> {
        let k = self.order();
        let knots = trimmed(self.knots(), k)?;
        let c = self.point_type().coords();
        let n = self.point_count();
        let mut points = vec![0.0; (n - 1) * c];
        diff_line(self.knots(), k, c, n, self.points(), c, &mut points, c);
        debug!("differentiated order {k} curve with {n} control points");
        Curve::new(k - 1, knots, self.point_type(), points)
    }
}

impl Surface {
    /// Returns the partial derivative surface in direction `dir`: `Row`
    /// differentiates every row along `u`, `Col` every column along `v`.
    pub fn derivative(&self, dir: Direction) -> Result<Surface> {
        let k = self.order(dir);
        let knots = trimmed(self.knots(dir), k)?;
        let c = self.point_type().coords();
        let (rows, cols) = (self.rows(), self.cols());
        let mesh = match dir {
            Direction::Row => {
                let mut mesh = vec![0.0; rows * (cols - 1) * c];
                for r in 0..rows {
                    diff_line(
                        self.knots(dir),
                        k,
                        c,
                        cols,
                        &self.mesh()[r * cols * c..],
                        c,
                        &mut mesh[r * (cols - 1) * c..],
                        c,
                    );
                }
                mesh
            }
            Direction::Col => {
                let stride = cols * c;
                let mut mesh = vec![0.0; (rows - 1) * stride];
                for col in 0..cols {
                    diff_line(
                        self.knots(dir),
                        k,
                        c,
                        rows,
                        &self.mesh()[col * c..],
                        stride,
                        &mut mesh[col * c..],
                        stride,
                    );
                }
                mesh
            }
        };
        debug!("differentiated {:?} direction of {}x{} surface", dir, rows, cols);
        self.with_direction(dir, k - 1, knots, mesh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{surface::tests::trough, PointType};
    use nalgebra_glm::DVec3;

    #[test]
    fn cubic_hermite_tangent() {
        let c = Curve::new(
            4,
            KnotVector::clamped(4, 0.0, 2.0, 1).unwrap(),
            PointType::E3,
            vec![
                0.0, 0.0, 0.0, 1.0, 1.0, 0.0, 2.0, 1.0, 1.0, 3.0, 0.0, 1.0, 4.0, 0.0, 0.0,
            ],
        )
        .unwrap();
        let d = c.derivative().unwrap();
        assert_eq!(d.order(), 3);
        assert_eq!(d.point_count(), 4);
        assert_eq!(d.knots().as_slice(), &[0.0, 0.0, 0.0, 1.0, 2.0, 2.0, 2.0]);
        // End tangent of a clamped cubic is 3 (p1 - p0) / (t4 - t1)
        assert_eq!(d.control_point(0), &[3.0, 3.0, 0.0]);
    }

    #[test]
    fn repeated_knot_is_zero() {
        let c = Curve::new(
            2,
            KnotVector::new(vec![0.0, 0.0, 0.5, 0.5, 1.0, 1.0]).unwrap(),
            PointType::E2,
            vec![0.0, 0.0, 1.0, 1.0, 1.0, 1.0, 3.0, 0.0],
        )
        .unwrap();
        let d = c.derivative().unwrap();
        assert_eq!(d.control_point(0), &[2.0, 2.0]);
        assert_eq!(
            d.control_point(1),
            &[DEGENERATE_SPAN_DERIVATIVE, DEGENERATE_SPAN_DERIVATIVE]
        );
        assert_eq!(d.control_point(2), &[4.0, -2.0]);
    }

    #[test]
    fn order_one_has_no_derivative() {
        let c = Curve::new(
            1,
            KnotVector::new(vec![0.0, 1.0]).unwrap(),
            PointType::E2,
            vec![1.0, 2.0],
        )
        .unwrap();
        assert!(matches!(
            c.derivative(),
            Err(NurbsError::InvalidOrder { order: 1, .. })
        ));
    }

    #[test]
    fn surface_partials() {
        let s = trough();
        let su = s.derivative(Direction::Row).unwrap();
        let sv = s.derivative(Direction::Col).unwrap();
        assert_eq!((su.rows(), su.cols()), (2, 2));
        assert_eq!((sv.rows(), sv.cols()), (1, 3));
        for (u, v) in [(0.0, 0.0), (0.25, 0.75), (0.6, 1.0)] {
            let du = PointType::E3.homogeneous(&su.eval(u, v).unwrap());
            let dv = PointType::E3.homogeneous(&sv.eval(u, v).unwrap());
            assert!((du - DVec3::new(1.0, 0.0, 4.0 - 8.0 * u)).norm() < 1e-12);
            assert!((dv - DVec3::new(0.0, 1.0, 0.0)).norm() < 1e-12);
        }
    }
}
