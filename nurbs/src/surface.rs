use crate::{
    basis::basis_funs,
    curve::{bounds, check_order, check_param},
    KnotVector, NurbsError, PointType, RefinementMatrix, Result, VecF,
};
use log::debug;
use nalgebra_glm::DVec3;
use smallvec::smallvec;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Parametric direction of a surface.
///
/// A row of the control mesh has fixed `v` and runs along `u`, so `Row` is
/// the `u` direction and `Col` is the `v` direction.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Row,
    Col,
}

/// Tensor-product B-spline or NURBS surface.
///
/// The mesh is stored row-major: `rows` rows of `cols` points, where `cols`
/// is the number of control points implied by the `u` knots and `rows` the
/// number implied by the `v` knots.
#[derive(Clone, Debug, PartialEq)]
pub struct Surface {
    u_order: usize,
    v_order: usize,
    u_knots: KnotVector,
    v_knots: KnotVector,
    point_type: PointType,
    rows: usize,
    cols: usize,
    mesh: Vec<f64>,
}

impl Surface {
    pub fn new(
        u_order: usize,
        v_order: usize,
        u_knots: KnotVector,
        v_knots: KnotVector,
        point_type: PointType,
        mesh: Vec<f64>,
    ) -> Result<Self> {
        check_order(u_order, &u_knots)?;
        check_order(v_order, &v_knots)?;
        let cols = u_knots.control_count(u_order);
        let rows = v_knots.control_count(v_order);
        let expected = rows * cols * point_type.coords();
        if mesh.len() != expected {
            return Err(NurbsError::MeshSize {
                expected,
                actual: mesh.len(),
            });
        }
        Ok(Self {
            u_order,
            v_order,
            u_knots,
            v_knots,
            point_type,
            rows,
            cols,
            mesh,
        })
    }

    pub fn order(&self, dir: Direction) -> usize {
        match dir {
            Direction::Row => self.u_order,
            Direction::Col => self.v_order,
        }
    }
    pub fn knots(&self, dir: Direction) -> &KnotVector {
        match dir {
            Direction::Row => &self.u_knots,
            Direction::Col => &self.v_knots,
        }
    }
    pub fn domain(&self, dir: Direction) -> (f64, f64) {
        self.knots(dir).domain(self.order(dir))
    }
    pub fn point_type(&self) -> PointType {
        self.point_type
    }
    pub fn rows(&self) -> usize {
        self.rows
    }
    pub fn cols(&self) -> usize {
        self.cols
    }
    pub fn mesh(&self) -> &[f64] {
        &self.mesh
    }
    pub fn control_point(&self, row: usize, col: usize) -> &[f64] {
        let c = self.point_type.coords();
        let at = (row * self.cols + col) * c;
        &self.mesh[at..at + c]
    }

    /// Builds a surface sharing this one's point type, replacing the knots,
    /// order and mesh along one direction.
    pub(crate) fn with_direction(
        &self,
        dir: Direction,
        order: usize,
        knots: KnotVector,
        mesh: Vec<f64>,
    ) -> Result<Surface> {
        match dir {
            Direction::Row => Surface::new(
                order,
                self.v_order,
                knots,
                self.v_knots.clone(),
                self.point_type,
                mesh,
            ),
            Direction::Col => Surface::new(
                self.u_order,
                order,
                self.u_knots.clone(),
                knots,
                self.point_type,
                mesh,
            ),
        }
    }

    /// Evaluates the surface at `(u, v)`, in homogeneous coordinates
    pub fn eval(&self, u: f64, v: f64) -> Result<VecF> {
        check_param(u, self.domain(Direction::Row))?;
        check_param(v, self.domain(Direction::Col))?;
        let (ku, kv) = (self.u_order, self.v_order);
        let uspan = self.u_knots.find_span(ku, u);
        let vspan = self.v_knots.find_span(kv, v);
        let Nu = basis_funs(&self.u_knots, ku, uspan, u);
        let Nv = basis_funs(&self.v_knots, kv, vspan, v);

        let mut out: VecF = smallvec![0.0; self.point_type.coords()];
        for (r, bv) in Nv.iter().enumerate() {
            let row = vspan + 1 - kv + r;
            for (s, bu) in Nu.iter().enumerate() {
                let b = bv * bu;
                for (o, p) in out.iter_mut().zip(self.control_point(row, uspan + 1 - ku + s)) {
                    *o += b * p;
                }
            }
        }
        Ok(out)
    }

    /// Evaluates the surface at `(u, v)` and projects it into Euclidean space
    pub fn point(&self, u: f64, v: f64) -> Result<DVec3> {
        Ok(self.point_type.euclidean(&self.eval(u, v)?))
    }

    /// Re-expresses the surface on a refined knot vector in one direction,
    /// applying the refinement matrix to every row (for `Row`) or every
    /// column (for `Col`).
    pub fn refine(&self, dir: Direction, new_knots: &KnotVector) -> Result<Surface> {
        let order = self.order(dir);
        let matrix = RefinementMatrix::build(order, self.knots(dir), new_knots)?;
        let c = self.point_type.coords();
        let pt = self.point_type;

        let mesh = match dir {
            Direction::Row => {
                let (old_len, new_len) = (self.cols * c, matrix.len() * c);
                let mut mesh = vec![0.0; self.rows * new_len];
                #[cfg(feature = "rayon")]
                let pairs = mesh
                    .par_chunks_mut(new_len)
                    .zip(self.mesh.par_chunks(old_len));
                #[cfg(not(feature = "rayon"))]
                let pairs = mesh.chunks_mut(new_len).zip(self.mesh.chunks(old_len));
                pairs.for_each(|(dst, src)| matrix.apply(src, c, dst, c, pt));
                mesh
            }
            Direction::Col => {
                let stride = self.cols * c;
                let mut mesh = vec![0.0; matrix.len() * stride];
                // Columns interleave in the mesh, so each one is mapped into
                // its own buffer and scattered back afterwards
                #[cfg(feature = "rayon")]
                {
                    let columns: Vec<Vec<f64>> = (0..self.cols)
                        .into_par_iter()
                        .map(|col| {
                            let mut out = vec![0.0; matrix.len() * c];
                            matrix.apply(&self.mesh[col * c..], stride, &mut out, c, pt);
                            out
                        })
                        .collect();
                    for (col, column) in columns.iter().enumerate() {
                        for (i, p) in column.chunks_exact(c).enumerate() {
                            let at = i * stride + col * c;
                            mesh[at..at + c].copy_from_slice(p);
                        }
                    }
                }
                #[cfg(not(feature = "rayon"))]
                for col in 0..self.cols {
                    matrix.apply(
                        &self.mesh[col * c..],
                        stride,
                        &mut mesh[col * c..],
                        stride,
                        pt,
                    );
                }
                mesh
            }
        };
        debug!(
            "refined {:?} direction of {}x{} surface to {} control points",
            dir,
            self.rows,
            self.cols,
            matrix.len()
        );
        self.with_direction(dir, order, new_knots.clone(), mesh)
    }

    /// Axis-aligned bounds of the Euclidean control points, which contain
    /// the whole surface.
    pub fn bounds(&self) -> (DVec3, DVec3) {
        bounds(&self.mesh, self.point_type)
    }
}
