//! `bidiag` reduces dense real and complex matrices to bidiagonal form.
//!
//! Given an $m\times n$ matrix $A$, the reduction computes unitary matrices $Q$ and $P$ such that
//! $$Q^H A P = B,$$
//! where $B$ is upper bidiagonal if $m \geq n$ and lower bidiagonal otherwise. $Q$ and $P$ are
//! never formed explicitly: they are stored as products of Householder reflectors in the
//! entries of $A$ that the reduction zeroes out, together with their scalar factors.
//!
//! The crate is organized in layers:
//! - [`mat`]: lightweight strided matrix views,
//! - [`linalg::matmul`], [`linalg::householder`], [`linalg::reductions`]: primitive operators,
//! - [`linalg::bidiag`]: the blocked reduction, its unblocked fallback, and the reconstruction of
//! the unitary factors,
//! - [`lapack`]: a LAPACK-style surface working on column-major slices with a leading dimension,
//! with argument validation and workspace size queries.
//!
//! # Example
//! ```
//! use bidiag::lapack::{gebrd, gebrd_work_size};
//! use bidiag::linalg::bidiag::BidiagParams;
//!
//! let (m, n) = (4usize, 3usize);
//! let mut a: Vec<f64> = (0..m * n).map(|k| (k as f64).sin()).collect();
//!
//! let params = BidiagParams::default();
//! let lwork = gebrd_work_size::<f64, _>(m as isize, n as isize, m as isize, &params).unwrap();
//!
//! let mut d = vec![0.0; n];
//! let mut e = vec![0.0; n - 1];
//! let mut tauq = vec![0.0; n];
//! let mut taup = vec![0.0; n];
//! let mut work = vec![0.0; lwork];
//!
//! gebrd(
//!     m as isize, n as isize, &mut a, m as isize,
//!     &mut d, &mut e, &mut tauq, &mut taup, &mut work, &params,
//! )
//! .unwrap();
//! ```

#![allow(clippy::type_complexity)]
#![allow(clippy::too_many_arguments)]
#![allow(non_snake_case)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![cfg_attr(not(feature = "std"), no_std)]

use equator::{assert, debug_assert};

extern crate alloc;

pub mod entity;
pub mod lapack;
pub mod linalg;
pub mod mat;

pub use dyn_stack;
pub use reborrow;

pub use entity::{c32, c64, ComplexField, RealField};
pub use mat::{Mat, MatMut, MatRef};

/// Whether a matrix should be implicitly conjugated when read or not.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Conj {
    /// Do conjugate.
    Yes,
    /// Do not conjugate.
    No,
}

impl Conj {
    /// Combine `self` and `other` to create a new conjugation object.
    #[inline]
    pub fn compose(self, other: Conj) -> Conj {
        if self == other {
            Conj::No
        } else {
            Conj::Yes
        }
    }

    #[inline(always)]
    pub(crate) fn apply<E: ComplexField>(self, value: E) -> E {
        match self {
            Conj::Yes => value.conj(),
            Conj::No => value,
        }
    }
}

/// Parallelism strategy forwarded to the matrix multiplication kernels.
///
/// The reduction itself is sequential; only the matrix products it issues may use more than one
/// thread.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Parallelism {
    /// No parallelism.
    ///
    /// The code is executed sequentially on the same thread that calls a function
    /// and passes this argument.
    None,
    /// Rayon parallelism. Only avaialble with the `rayon` feature.
    ///
    /// The contained value represents a hint about the number of threads an implementation should
    /// use, but there is no way to guarantee how many or which threads will be used.
    ///
    /// A value of `0` treated as equivalent to `rayon::current_num_threads()`.
    #[cfg(feature = "rayon")]
    #[cfg_attr(docsrs, doc(cfg(feature = "rayon")))]
    Rayon(usize),
}

impl Default for Parallelism {
    #[inline]
    fn default() -> Self {
        Parallelism::None
    }
}

#[cfg(feature = "perf-warn")]
#[macro_export]
#[doc(hidden)]
macro_rules! __perf_warn {
    ($name: ident) => {{
        #[inline(always)]
        #[allow(non_snake_case)]
        fn $name() -> &'static ::core::sync::atomic::AtomicBool {
            static $name: ::core::sync::atomic::AtomicBool =
                ::core::sync::atomic::AtomicBool::new(false);
            &$name
        }
        ::core::matches!(
            $name().compare_exchange(
                false,
                true,
                ::core::sync::atomic::Ordering::Relaxed,
                ::core::sync::atomic::Ordering::Relaxed,
            ),
            Ok(_)
        )
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{assert, debug_assert};

    #[test]
    fn conj_compose() {
        assert!(Conj::Yes.compose(Conj::Yes) == Conj::No);
        assert!(Conj::No.compose(Conj::Yes) == Conj::Yes);
        assert!(Conj::No.compose(Conj::No) == Conj::No);
        debug_assert!(Conj::Yes.apply(c64::new(1.0, 2.0)) == c64::new(1.0, -2.0));
    }
}
