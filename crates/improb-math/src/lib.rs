//! improb numeric kernels: tagged numbers, LP, vertex enumeration, subsets.

pub mod math;

pub use math::field::{snap_number, snap_rational, Field, PIVOT_EPSILON};
pub use math::number::{rational_to_f64, Number, NumberError, NumberKind};
pub use math::polytope::{HRep, HRow, PolytopeError, Vertices};
pub use math::root::{bisect_decreasing, Bisection};
pub use math::simplex::{LinearProgram, LpError, LpOutcome, Relation};
pub use math::subsets;

pub use num::rational::BigRational;
