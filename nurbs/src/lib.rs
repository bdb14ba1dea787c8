#![allow(clippy::needless_range_loop)]
// The basis and derivative code follows the published B-spline algorithms,
// which use single-character names like `N` everywhere, so we're matching
// their convention.
#![allow(non_snake_case)]

mod basis;
mod config;
mod curve;
mod diff;
mod error;
mod knot_vector;
mod map;
mod oslo;
mod point_type;
mod split;
mod surface;

pub mod flat;
pub mod norm;

use smallvec::SmallVec;
type VecF = SmallVec<[f64; 8]>;

pub use crate::config::Tolerances;
pub use crate::curve::Curve;
pub use crate::diff::DEGENERATE_SPAN_DERIVATIVE;
pub use crate::error::{NurbsError, Result};
pub use crate::flat::Flatness;
pub use crate::knot_vector::KnotVector;
pub use crate::oslo::{OsloRow, RefinementMatrix};
pub use crate::point_type::PointType;
pub use crate::surface::{Direction, Surface};
