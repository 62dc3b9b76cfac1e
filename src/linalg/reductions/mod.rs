//! Reductions over the elements of a matrix.

mod norm_l2;

pub use norm_l2::norm_l2;
