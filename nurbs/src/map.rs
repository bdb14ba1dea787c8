use crate::{PointType, RefinementMatrix};

impl RefinementMatrix {
    /// Applies the matrix to one line of control points.
    ///
    /// Old point `i` starts at `old[i * old_stride]` and new point `i` is
    /// written to `new[i * new_stride]`; strides are counted in `f64`s, so a
    /// column of a row-major mesh is mapped by passing the row length as the
    /// stride.  Every coordinate is combined alike, weights included, since
    /// refinement is linear in homogeneous space.
    ///
    /// # Panics
    /// If either slice is too short for the matrix and strides
    pub fn apply(
        &self,
        old: &[f64],
        old_stride: usize,
        new: &mut [f64],
        new_stride: usize,
        point_type: PointType,
    ) {
        let coords = point_type.coords();
        for (i, row) in self.rows.iter().enumerate() {
            let dst = &mut new[i * new_stride..i * new_stride + coords];
            dst.fill(0.0);
            for (k, &c) in row.coeffs.iter().enumerate() {
                let at = (row.offset + k) * old_stride;
                for (d, s) in dst.iter_mut().zip(&old[at..at + coords]) {
                    *d += c * s;
                }
            }
        }
    }

    /// Maps a packed line of control points to a new packed line
    pub fn map(&self, old: &[f64], point_type: PointType) -> Vec<f64> {
        let coords = point_type.coords();
        let mut new = vec![0.0; self.len() * coords];
        self.apply(old, coords, &mut new, coords, point_type);
        new
    }
}

#[cfg(test)]
mod tests {
    use crate::{KnotVector, PointType, RefinementMatrix};

    #[test]
    fn strided_column() {
        let old = KnotVector::new(vec![0.0, 0.0, 1.0, 1.0]).unwrap();
        let new = KnotVector::new(vec![0.0, 0.0, 0.25, 1.0, 1.0]).unwrap();
        let m = RefinementMatrix::build(2, &old, &new).unwrap();

        // Two rows of two (x, y, w) points; map the second column
        let mesh = [0.0, 0.0, 1.0, 4.0, 0.0, 2.0, 0.0, 4.0, 1.0, 8.0, 8.0, 2.0];
        let mut out = vec![f64::NAN; 3 * 6];
        m.apply(&mesh[3..], 6, &mut out[3..], 6, PointType::P3);
        assert_eq!(&out[3..6], &[4.0, 0.0, 2.0]);
        assert_eq!(&out[9..12], &[5.0, 2.0, 2.0]);
        assert_eq!(&out[15..18], &[8.0, 8.0, 2.0]);
        assert!(out[0].is_nan());
    }

    #[test]
    fn packed_line() {
        let old = KnotVector::new(vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0]).unwrap();
        let new = old.with_multiplicity(0.5, 1);
        let m = RefinementMatrix::build(3, &old, &new).unwrap();
        let pts = m.map(&[0.0, 0.0, 2.0, 4.0, 4.0, 0.0], PointType::E2);
        assert_eq!(pts, vec![0.0, 0.0, 1.0, 2.0, 3.0, 2.0, 4.0, 0.0]);
    }
}
