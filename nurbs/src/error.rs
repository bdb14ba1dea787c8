use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum NurbsError {
    /// The new knot vector is not a superset of the old one
    #[error("invalid knot refinement: {reason}")]
    InvalidKnotRefinement { reason: String },

    /// The tangent plane collapsed, so there is no normal to report
    #[error("degenerate normal at (u, v) = ({u}, {v})")]
    DegenerateNormal { u: f64, v: f64 },

    #[error("invalid knot vector: {reason}")]
    InvalidKnotVector { reason: String },

    #[error("invalid order {order}: {reason}")]
    InvalidOrder { order: usize, reason: String },

    #[error("invalid point type: {coords} coordinates")]
    InvalidPointType { coords: usize },

    #[error("control mesh has {actual} values, expected {expected}")]
    MeshSize { expected: usize, actual: usize },

    #[error("parameter {t} is outside the domain [{lo}, {hi}]")]
    ParameterOutOfRange { t: f64, lo: f64, hi: f64 },
}

impl NurbsError {
    pub(crate) fn knot_vector(reason: impl Into<String>) -> Self {
        Self::InvalidKnotVector {
            reason: reason.into(),
        }
    }

    pub(crate) fn refinement(reason: impl Into<String>) -> Self {
        Self::InvalidKnotRefinement {
            reason: reason.into(),
        }
    }

    pub(crate) fn order(order: usize, reason: impl Into<String>) -> Self {
        Self::InvalidOrder {
            order,
            reason: reason.into(),
        }
    }
}

pub type Result<T, E = NurbsError> = std::result::Result<T, E>;
