//! Linear algebra module.
//!
//! Contains the primitive operators ([`matmul`], [`householder`], [`reductions`]) and the
//! bidiagonal reduction built on top of them ([`bidiag`]).
//!
//! # Memory allocation
//! Most algorithms defer memory allocation to the user. Algorithms that need temporary space
//! for intermediate computations ask for it by taking a [`stack: PodStack`](dyn_stack::PodStack)
//! parameter. A [`PodStack`] is a thin wrapper over a slice of memory bytes, which may come from
//! any valid source (heap allocation, fixed-size array on the stack, etc.). The functions taking
//! a [`PodStack`] parameter have a corresponding function with a similar name ending in `_req`
//! that returns the memory requirements of the algorithm. For example:
//! [`bidiag::bidiag_in_place`] and [`bidiag::bidiag_in_place_req`].
//!
//! The memory stack may be reused in user-code to avoid repeated allocations, and it is also
//! possible to compute the sum ([`dyn_stack::StackReq::all_of`]) or union
//! ([`dyn_stack::StackReq::any_of`]) of multiple requirements, in order to optimally combine them
//! into a single allocation. The simplest way to allocate the memory is through
//! [`dyn_stack::GlobalPodBuffer::new`].

use crate::{
    mat::{self, MatMut},
    ComplexField,
};
use dyn_stack::{PodStack, SizeOverflow, StackReq};

pub mod bidiag;
pub mod householder;
pub mod matmul;
pub mod reductions;

/// Returns the stack requirements for creating a temporary `nrows × ncols` matrix.
///
/// The matrix is packed in column-major order, with no padding between columns, so that a
/// workspace measured in elements maps one-to-one onto the stack.
#[inline]
pub fn temp_mat_req<E: ComplexField>(nrows: usize, ncols: usize) -> Result<StackReq, SizeOverflow> {
    let len = nrows.checked_mul(ncols).ok_or(SizeOverflow)?;
    StackReq::try_new::<E>(len)
}

/// Creates a temporary matrix of untouched values, from the given memory stack.
#[track_caller]
#[inline]
pub fn temp_mat_uninit<E: ComplexField>(
    nrows: usize,
    ncols: usize,
    stack: PodStack<'_>,
) -> (MatMut<'_, E>, PodStack<'_>) {
    let (data, stack) = stack.make_raw::<E>(nrows * ncols);
    (mat::from_column_major_slice_mut(data, nrows, ncols), stack)
}

/// Creates a temporary matrix of zero values, from the given memory stack.
#[track_caller]
#[inline]
pub fn temp_mat_zeroed<E: ComplexField>(
    nrows: usize,
    ncols: usize,
    stack: PodStack<'_>,
) -> (MatMut<'_, E>, PodStack<'_>) {
    let (mut mat, stack) = temp_mat_uninit::<E>(nrows, ncols, stack);
    mat.fill_zero();
    (mat, stack)
}
