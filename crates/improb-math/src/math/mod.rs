//! Numeric kernels.

pub mod field;
pub mod number;
pub mod polytope;
pub mod root;
pub mod simplex;
pub mod subsets;
