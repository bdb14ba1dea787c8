//! Unit surface normals.
//!
//! Directions of order 2 or less are piecewise linear, so their tangent is
//! taken as a finite difference to the next distinct knot (the previous one
//! at the end of the domain), which is exact and skips zero-length steps.
//! Higher orders use the derivative surface from [`Surface::derivative`],
//! converted from homogeneous to Euclidean space with the quotient rule when
//! the surface is rational.
use crate::{Direction, NurbsError, Result, Surface, Tolerances};
use log::debug;
use nalgebra_glm as glm;
use nalgebra_glm::DVec3;

fn linear_tangent(srf: &Surface, dir: Direction, u: f64, v: f64) -> Result<DVec3> {
    let (t, knots) = match dir {
        Direction::Row => (u, srf.knots(Direction::Row)),
        Direction::Col => (v, srf.knots(Direction::Col)),
    };
    let at = |t: f64| match dir {
        Direction::Row => srf.point(t, v),
        Direction::Col => srf.point(u, t),
    };
    let (_, hi) = srf.domain(dir);
    let p = at(t)?;
    if let Some(next) = knots.next_distinct(t).filter(|&n| n <= hi) {
        Ok(at(next)? - p)
    } else if let Some(prev) = knots.prev_distinct(t) {
        Ok(p - at(prev)?)
    } else {
        Err(NurbsError::DegenerateNormal { u, v })
    }
}

fn derivative_tangent(srf: &Surface, dir: Direction, u: f64, v: f64) -> Result<DVec3> {
    let pt = srf.point_type();
    let dh = srf.derivative(dir)?.eval(u, v)?;
    if !pt.is_rational() {
        return Ok(pt.homogeneous(&dh));
    }
    // d(P / w) = (dP - (P / w) dw) / w
    let h = srf.eval(u, v)?;
    let w = pt.weight(&h);
    Ok((pt.homogeneous(&dh) - pt.homogeneous(&h) * (pt.weight(&dh) / w)) / w)
}

fn unit_normal(su: DVec3, sv: DVec3, u: f64, v: f64, tol: &Tolerances) -> Result<DVec3> {
    let n = glm::cross(&su, &sv);
    let mag = glm::length(&n);
    if !mag.is_finite() || mag <= tol.degenerate_normal * glm::length(&su) * glm::length(&sv) {
        debug!("degenerate normal at ({u}, {v})");
        return Err(NurbsError::DegenerateNormal { u, v });
    }
    Ok(n / mag)
}

/// Unit normal `Su x Sv` at `(u, v)`, picking the tangent evaluation for
/// each direction by its order.
pub fn normal(srf: &Surface, u: f64, v: f64, tol: &Tolerances) -> Result<DVec3> {
    let tangent = |dir: Direction| {
        if srf.order(dir) <= 2 {
            linear_tangent(srf, dir, u, v)
        } else {
            derivative_tangent(srf, dir, u, v)
        }
    };
    let su = tangent(Direction::Row)?;
    let sv = tangent(Direction::Col)?;
    unit_normal(su, sv, u, v, tol)
}

/// Unit normal at `(u, v)` from the derivative surfaces in both directions,
/// whatever the orders.
pub fn normal_from_derivatives(srf: &Surface, u: f64, v: f64, tol: &Tolerances) -> Result<DVec3> {
    let su = derivative_tangent(srf, Direction::Row, u, v)?;
    let sv = derivative_tangent(srf, Direction::Col, u, v)?;
    unit_normal(su, sv, u, v, tol)
}

impl Surface {
    /// Unit normal with default [`Tolerances`]
    pub fn normal(&self, u: f64, v: f64) -> Result<DVec3> {
        normal(self, u, v, &Tolerances::default())
    }
}
