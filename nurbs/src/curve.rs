use crate::{basis::basis_funs, KnotVector, NurbsError, PointType, RefinementMatrix, Result, VecF};
use log::debug;
use nalgebra_glm::DVec3;
use smallvec::smallvec;

/// B-spline or NURBS curve: an order, a knot vector, and a packed line of
/// control points.
#[derive(Clone, Debug, PartialEq)]
pub struct Curve {
    order: usize,
    knots: KnotVector,
    point_type: PointType,
    points: Vec<f64>,
}

impl Curve {
    /// Builds a curve, checking that there are `knots.len() - order`
    /// control points and at least `order` of them.
    pub fn new(
        order: usize,
        knots: KnotVector,
        point_type: PointType,
        points: Vec<f64>,
    ) -> Result<Self> {
        check_order(order, &knots)?;
        let expected = knots.control_count(order) * point_type.coords();
        if points.len() != expected {
            return Err(NurbsError::MeshSize {
                expected,
                actual: points.len(),
            });
        }
        Ok(Self {
            order,
            knots,
            point_type,
            points,
        })
    }

    pub fn order(&self) -> usize {
        self.order
    }
    pub fn knots(&self) -> &KnotVector {
        &self.knots
    }
    pub fn point_type(&self) -> PointType {
        self.point_type
    }
    pub fn points(&self) -> &[f64] {
        &self.points
    }
    pub fn point_count(&self) -> usize {
        self.knots.control_count(self.order)
    }
    pub fn control_point(&self, i: usize) -> &[f64] {
        let c = self.point_type.coords();
        &self.points[i * c..(i + 1) * c]
    }

    pub fn domain(&self) -> (f64, f64) {
        self.knots.domain(self.order)
    }

    /// Evaluates the curve at `t`, in homogeneous coordinates
    pub fn eval(&self, t: f64) -> Result<VecF> {
        check_param(t, self.domain())?;
        let k = self.order;
        let span = self.knots.find_span(k, t);
        let N = basis_funs(&self.knots, k, span, t);
        let mut out: VecF = smallvec![0.0; self.point_type.coords()];
        for (r, b) in N.iter().enumerate() {
            for (o, p) in out.iter_mut().zip(self.control_point(span + 1 - k + r)) {
                *o += b * p;
            }
        }
        Ok(out)
    }

    /// Evaluates the curve at `t` and projects it into Euclidean space
    pub fn point(&self, t: f64) -> Result<DVec3> {
        Ok(self.point_type.euclidean(&self.eval(t)?))
    }

    /// Computes the Euclidean derivatives of order `0..=d` at `t`, by
    /// evaluating the differentiated homogeneous curves and (for rational
    /// curves) applying the quotient rule.
    ///
    /// Algorithm A4.2
    pub fn derivatives(&self, t: f64, d: usize) -> Result<Vec<DVec3>> {
        let pt = self.point_type;
        let mut derivatives: Vec<VecF> = vec![self.eval(t)?];
        let mut curve = self.clone();
        for _ in 0..d {
            if curve.order == 1 {
                derivatives.push(smallvec![0.0; pt.coords()]);
            } else {
                curve = curve.derivative()?;
                derivatives.push(curve.eval(t)?);
            }
        }
        if !pt.is_rational() {
            return Ok(derivatives.iter().map(|h| pt.homogeneous(h)).collect());
        }

        let w0 = pt.weight(&derivatives[0]);
        let mut CK = vec![DVec3::zeros(); d + 1];
        for k in 0..=d {
            let mut v = pt.homogeneous(&derivatives[k]);
            for i in 1..=k {
                let b = num_integer::binomial(k, i);
                v -= b as f64 * pt.weight(&derivatives[i]) * CK[k - i];
            }
            CK[k] = v / w0;
        }
        Ok(CK)
    }

    /// Euclidean first derivative at `t`
    pub fn tangent(&self, t: f64) -> Result<DVec3> {
        Ok(self.derivatives(t, 1)?[1])
    }

    /// Re-expresses the curve on `new_knots`, which must refine the current
    /// knot vector.  The shape is unchanged.
    pub fn refine(&self, new_knots: &KnotVector) -> Result<Curve> {
        let matrix = RefinementMatrix::build(self.order, &self.knots, new_knots)?;
        debug!(
            "refining curve from {} to {} control points",
            self.point_count(),
            matrix.len()
        );
        Ok(Curve {
            order: self.order,
            knots: new_knots.clone(),
            point_type: self.point_type,
            points: matrix.map(&self.points, self.point_type),
        })
    }

    /// Axis-aligned bounds of the Euclidean control points, which contain
    /// the whole curve.
    pub fn bounds(&self) -> (DVec3, DVec3) {
        bounds(&self.points, self.point_type)
    }
}

pub(crate) fn check_order(order: usize, knots: &KnotVector) -> Result<()> {
    if order == 0 {
        return Err(NurbsError::order(order, "must be at least 1"));
    }
    if knots.control_count(order) < order {
        return Err(NurbsError::order(
            order,
            format!("needs at least {} knots, got {}", 2 * order, knots.len()),
        ));
    }
    Ok(())
}

pub(crate) fn check_param(t: f64, (lo, hi): (f64, f64)) -> Result<()> {
    if t >= lo && t <= hi {
        Ok(())
    } else {
        Err(NurbsError::ParameterOutOfRange { t, lo, hi })
    }
}

pub(crate) fn bounds(points: &[f64], point_type: PointType) -> (DVec3, DVec3) {
    let mut lo = DVec3::repeat(f64::INFINITY);
    let mut hi = DVec3::repeat(f64::NEG_INFINITY);
    for p in points.chunks_exact(point_type.coords()) {
        let p = point_type.euclidean(p);
        lo = lo.inf(&p);
        hi = hi.sup(&p);
    }
    (lo, hi)
}
