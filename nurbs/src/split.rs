//! Subdivision of curves and surfaces into two independent pieces.
//!
//! The split parameter is inserted until its multiplicity equals the order,
//! which makes the refined spline fall apart into two clamped splines that
//! share no control points.
use crate::{Curve, Direction, KnotVector, NurbsError, Result, Surface};
use log::debug;

fn check_interior(t: f64, (lo, hi): (f64, f64)) -> Result<()> {
    if t > lo && t < hi {
        Ok(())
    } else {
        Err(NurbsError::ParameterOutOfRange { t, lo, hi })
    }
}

/// Inserts `t` to full multiplicity, returning the new knots and the number
/// of control points that end up on the left of the cut.
fn cut_knots(knots: &KnotVector, order: usize, t: f64) -> (KnotVector, usize) {
    let knots = knots.with_multiplicity(t, order);
    let s = knots.partition_point(|&k| k < t);
    (knots, s)
}

impl Curve {
    /// Splits the curve at its middle knot, or the middle of the domain when
    /// the middle knot is one of its ends
    pub fn split(&self) -> Result<(Curve, Curve)> {
        self.split_at(self.knots().split_value(self.order()))
    }

    /// Splits the curve at `t`, which must lie strictly inside the domain.
    /// The first piece covers `[lo, t]` and the second `[t, hi]`.
    pub fn split_at(&self, t: f64) -> Result<(Curve, Curve)> {
        check_interior(t, self.domain())?;
        let k = self.order();
        let (knots, s) = cut_knots(self.knots(), k, t);
        let refined = self.refine(&knots)?;
        let (a, b) = refined.points().split_at(s * self.point_type().coords());
        debug!("split curve at {t} into {} + {} control points", s, refined.point_count() - s);
        Ok((
            Curve::new(k, knots.extract(0..s + k), self.point_type(), a.to_vec())?,
            Curve::new(k, knots.extract(s..knots.len()), self.point_type(), b.to_vec())?,
        ))
    }
}

impl Surface {
    /// Splits the surface at the middle knot of direction `dir`
    pub fn split(&self, dir: Direction) -> Result<(Surface, Surface)> {
        let t = self.knots(dir).split_value(self.order(dir));
        self.split_at(dir, t)
    }

    /// Splits the surface at parameter `t` of direction `dir`: `Row` cuts
    /// every row at `u = t`, `Col` cuts every column at `v = t`.
    pub fn split_at(&self, dir: Direction, t: f64) -> Result<(Surface, Surface)> {
        check_interior(t, self.domain(dir))?;
        let k = self.order(dir);
        let (knots, s) = cut_knots(self.knots(dir), k, t);
        let refined = self.refine(dir, &knots)?;
        let c = self.point_type().coords();

        let (left, right) = match dir {
            Direction::Row => {
                let row_len = refined.cols() * c;
                let mut left = Vec::with_capacity(refined.rows() * s * c);
                let mut right = Vec::with_capacity(refined.rows() * (row_len - s * c));
                for row in refined.mesh().chunks_exact(row_len) {
                    let (a, b) = row.split_at(s * c);
                    left.extend_from_slice(a);
                    right.extend_from_slice(b);
                }
                (left, right)
            }
            Direction::Col => {
                let (a, b) = refined.mesh().split_at(s * refined.cols() * c);
                (a.to_vec(), b.to_vec())
            }
        };
        debug!("split {:?} direction of {}x{} surface at {t}", dir, self.rows(), self.cols());
        Ok((
            self.with_direction(dir, k, knots.extract(0..s + k), left)?,
            self.with_direction(dir, k, knots.extract(s..knots.len()), right)?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{surface::tests::trough, PointType};

    fn parabola() -> Curve {
        Curve::new(
            3,
            KnotVector::clamped(3, 0.0, 1.0, 0).unwrap(),
            PointType::E2,
            vec![0.0, 0.0, 1.0, 2.0, 2.0, 0.0],
        )
        .unwrap()
    }

    #[test]
    fn de_casteljau_halves() {
        let (a, b) = parabola().split().unwrap();
        assert_eq!(a.knots().as_slice(), &[0.0, 0.0, 0.0, 0.5, 0.5, 0.5]);
        assert_eq!(b.knots().as_slice(), &[0.5, 0.5, 0.5, 1.0, 1.0, 1.0]);
        assert_eq!(a.points(), &[0.0, 0.0, 0.5, 1.0, 1.0, 1.0]);
        assert_eq!(b.points(), &[1.0, 1.0, 1.5, 1.0, 2.0, 0.0]);
    }

    #[test]
    fn pieces_trace_the_parent() {
        let c = parabola();
        let (a, b) = c.split_at(0.3).unwrap();
        assert_eq!(a.domain(), (0.0, 0.3));
        assert_eq!(b.domain(), (0.3, 1.0));
        for t in [0.0, 0.1, 0.3] {
            assert!((a.point(t).unwrap() - c.point(t).unwrap()).norm() < 1e-12);
        }
        for t in [0.3, 0.65, 1.0] {
            assert!((b.point(t).unwrap() - c.point(t).unwrap()).norm() < 1e-12);
        }
        assert!(c.split_at(1.0).is_err());
    }

    #[test]
    fn surface_halves() {
        let s = trough();
        let (a, b) = s.split(Direction::Row).unwrap();
        assert_eq!((a.rows(), a.cols()), (2, 3));
        assert_eq!((b.rows(), b.cols()), (2, 3));
        assert!((a.point(0.25, 0.5).unwrap() - s.point(0.25, 0.5).unwrap()).norm() < 1e-12);
        assert!((b.point(0.75, 0.5).unwrap() - s.point(0.75, 0.5).unwrap()).norm() < 1e-12);

        let (a, b) = s.split(Direction::Col).unwrap();
        assert_eq!((a.rows(), a.cols()), (2, 3));
        assert_eq!(a.domain(Direction::Col), (0.0, 0.5));
        assert_eq!(b.domain(Direction::Col), (0.5, 1.0));
        assert!((b.point(0.4, 0.9).unwrap() - s.point(0.4, 0.9).unwrap()).norm() < 1e-12);
    }
}
