//! Flatness test for adaptive subdivision.
//!
//! A patch is flat when every row and every column of its control mesh stays
//! within `epsilon` of its chord, and its four corners are within `epsilon`
//! of a common plane.  The first check catches curvature along either
//! parametric direction, the second catches twist.
use crate::{Direction, Surface, Tolerances};
use log::trace;
use nalgebra_glm as glm;
use nalgebra_glm::DVec3;

/// Result of [`classify`]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Flatness {
    Flat,
    /// Not flat yet; subdivide the given direction next
    SplitAlong(Direction),
}

/// Maximum distance from the points of a control polygon to the line through
/// its first point and the last point that is distinct from it.  A polygon
/// whose points all coincide has deviation 0.
pub fn chord_deviation(points: &[DVec3], coincident: f64) -> f64 {
    let Some((first, rest)) = points.split_first() else {
        return 0.0;
    };
    let Some(end) = rest
        .iter()
        .rev()
        .find(|p| glm::distance(*p, first) > coincident)
    else {
        return 0.0;
    };
    let dir = glm::normalize(&(end - first));
    rest.iter()
        .map(|p| glm::length(&glm::cross(&(p - first), &dir)))
        .fold(0.0, f64::max)
}

/// Decides whether `srf` is flat to within `epsilon` (a length in model
/// units), or which direction to split next.
pub fn classify(srf: &Surface, epsilon: f64, tol: &Tolerances) -> Flatness {
    let pt = srf.point_type();
    let (rows, cols) = (srf.rows(), srf.cols());
    let point = |r: usize, c: usize| pt.euclidean(srf.control_point(r, c));

    let mut line = Vec::with_capacity(rows.max(cols));
    let mut max_row = 0.0f64;
    for r in 0..rows {
        line.clear();
        line.extend((0..cols).map(|c| point(r, c)));
        max_row = max_row.max(chord_deviation(&line, tol.coincident));
    }
    let mut max_col = 0.0f64;
    for c in 0..cols {
        line.clear();
        line.extend((0..rows).map(|r| point(r, c)));
        max_col = max_col.max(chord_deviation(&line, tol.coincident));
    }
    let worse = if max_row >= max_col {
        Direction::Row
    } else {
        Direction::Col
    };
    if max_row.max(max_col) > epsilon {
        trace!("not flat: row deviation {max_row}, column deviation {max_col}");
        return Flatness::SplitAlong(worse);
    }

    // Distance from the last corner to the plane through the other three
    let p00 = point(0, 0);
    let p01 = point(0, cols - 1);
    let p10 = point(rows - 1, 0);
    let p11 = point(rows - 1, cols - 1);
    let n = glm::cross(&(p01 - p00), &(p10 - p00));
    let mag = glm::length(&n);
    if mag < tol.degenerate_plane {
        trace!("flat: corner triangle is degenerate");
        return Flatness::Flat;
    }
    let dist = glm::dot(&(p11 - p00), &n).abs() / mag;
    if dist > epsilon {
        trace!("not flat: corner twist {dist}");
        Flatness::SplitAlong(worse)
    } else {
        Flatness::Flat
    }
}

impl Surface {
    /// Flatness test with default [`Tolerances`]
    pub fn flatness(&self, epsilon: f64) -> Flatness {
        classify(self, epsilon, &Tolerances::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{surface::tests::trough, KnotVector, PointType};

    fn bilinear(points: [[f64; 3]; 4]) -> Surface {
        Surface::new(
            2,
            2,
            KnotVector::clamped(2, 0.0, 1.0, 0).unwrap(),
            KnotVector::clamped(2, 0.0, 1.0, 0).unwrap(),
            PointType::E3,
            points.concat(),
        )
        .unwrap()
    }

    #[test]
    fn chord() {
        let pts = [
            DVec3::new(0.0, 0.0, 0.0),
            DVec3::new(1.0, 2.0, 0.0),
            DVec3::new(2.0, 0.0, 0.0),
        ];
        assert_eq!(chord_deviation(&pts, 1e-12), 2.0);

        // Closed polygon: the chord runs to the last point that differs
        let pts = [
            DVec3::new(0.0, 0.0, 0.0),
            DVec3::new(1.0, 1.0, 0.0),
            DVec3::new(2.0, 0.0, 0.0),
            DVec3::new(0.0, 0.0, 0.0),
        ];
        assert_eq!(chord_deviation(&pts, 1e-12), 1.0);

        assert_eq!(chord_deviation(&[DVec3::zeros(); 3], 1e-12), 0.0);
        assert_eq!(chord_deviation(&[], 1e-12), 0.0);
    }

    #[test]
    fn curved_rows_split_rows() {
        let s = trough();
        assert_eq!(s.flatness(0.1), Flatness::SplitAlong(Direction::Row));
        assert_eq!(s.flatness(2.5), Flatness::Flat);
    }

    #[test]
    fn twisted_patch() {
        let s = bilinear([
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [1.0, 1.0, 1.0],
        ]);
        assert_eq!(s.flatness(0.5), Flatness::SplitAlong(Direction::Row));
        assert_eq!(s.flatness(1.5), Flatness::Flat);
    }

    #[test]
    fn collapsed_corner_is_flat() {
        // Three corners on one line leave no plane to measure against
        let s = bilinear([
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
        ]);
        assert_eq!(s.flatness(1e-9), Flatness::Flat);
    }

    #[test]
    fn rational_points_are_projected() {
        // The same unit square, with every point scaled by weight 2
        let s = Surface::new(
            2,
            2,
            KnotVector::clamped(2, 0.0, 1.0, 0).unwrap(),
            KnotVector::clamped(2, 0.0, 1.0, 0).unwrap(),
            PointType::P4,
            vec![
                0.0, 0.0, 0.0, 2.0, 2.0, 0.0, 0.0, 2.0, 0.0, 2.0, 0.0, 2.0, 2.0, 2.0, 0.0, 2.0,
            ],
        )
        .unwrap();
        assert_eq!(s.flatness(1e-9), Flatness::Flat);
    }
}
