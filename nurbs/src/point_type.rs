use crate::{NurbsError, Result};
use nalgebra_glm::DVec3;

/// Layout of a single control point.
///
/// Points are stored as `coords` consecutive `f64` values.  When the point
/// type is rational, the last value is the weight and the others are kept
/// premultiplied (homogeneous), so refinement and differentiation act on all
/// coordinates alike and only [`PointType::euclidean`] divides.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct PointType {
    coords: usize,
    rational: bool,
}

impl PointType {
    /// Plain 2D point `(x, y)`
    pub const E2: Self = Self {
        coords: 2,
        rational: false,
    };
    /// Plain 3D point `(x, y, z)`
    pub const E3: Self = Self {
        coords: 3,
        rational: false,
    };
    /// Homogeneous 2D point `(wx, wy, w)`
    pub const P3: Self = Self {
        coords: 3,
        rational: true,
    };
    /// Homogeneous 3D point `(wx, wy, wz, w)`
    pub const P4: Self = Self {
        coords: 4,
        rational: true,
    };

    pub fn new(coords: usize, rational: bool) -> Result<Self> {
        if coords == 0 || (rational && coords < 2) {
            return Err(NurbsError::InvalidPointType { coords });
        }
        Ok(Self { coords, rational })
    }

    pub fn coords(&self) -> usize {
        self.coords
    }

    pub fn is_rational(&self) -> bool {
        self.rational
    }

    /// Number of non-weight coordinates
    pub fn spatial(&self) -> usize {
        self.coords - self.rational as usize
    }

    pub fn weight(&self, p: &[f64]) -> f64 {
        if self.rational {
            p[self.coords - 1]
        } else {
            1.0
        }
    }

    /// Spatial part of `p` without dividing by the weight.  Axes beyond
    /// [`PointType::spatial`] are zero, and extra axes are dropped.
    pub fn homogeneous(&self, p: &[f64]) -> DVec3 {
        let n = self.spatial();
        let get = |i: usize| if i < n { p[i] } else { 0.0 };
        DVec3::new(get(0), get(1), get(2))
    }

    /// Projects `p` into Euclidean space
    pub fn euclidean(&self, p: &[f64]) -> DVec3 {
        self.homogeneous(p) / self.weight(p)
    }
}
