//! Strided matrix views and the owning column-major matrix.
//!
//! [`MatRef`] and [`MatMut`] describe a matrix by a pointer to its first element, its dimensions,
//! and the distance (in elements) between two consecutive rows and two consecutive columns. A
//! column-major matrix with leading dimension `lda` has a row stride of `1` and a column stride
//! of `lda`; a row-major one has them swapped. Transposing a view only swaps the strides.

use crate::{assert, ComplexField};
use core::marker::PhantomData;

mod matmut;
mod matown;
mod matref;

pub use matmut::MatMut;
pub use matown::Mat;
pub use matref::MatRef;

pub(crate) struct MatImpl<E> {
    pub(crate) ptr: *mut E,
    pub(crate) nrows: usize,
    pub(crate) ncols: usize,
    pub(crate) row_stride: isize,
    pub(crate) col_stride: isize,
}

impl<E> Clone for MatImpl<E> {
    #[inline(always)]
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for MatImpl<E> {}

impl<E> MatImpl<E> {
    #[inline(always)]
    pub(crate) fn ptr_at(self, row: usize, col: usize) -> *mut E {
        self.ptr
            .wrapping_offset(row as isize * self.row_stride)
            .wrapping_offset(col as isize * self.col_stride)
    }
}

#[inline]
fn required_len(nrows: usize, ncols: usize, inner: usize, outer_stride: usize) -> usize {
    if nrows == 0 || ncols == 0 {
        0
    } else {
        (outer_stride * (ncols - 1)) + inner
    }
}

/// Creates a `MatRef` from a pointer to the matrix data, dimensions, and strides.
///
/// # Safety
/// Every element addressed by `ptr + i * row_stride + j * col_stride` for `i < nrows` and
/// `j < ncols` must be valid for reads for the lifetime `'a`, and must not be mutated through
/// another pointer during that lifetime.
#[inline(always)]
pub unsafe fn from_raw_parts<'a, E: ComplexField>(
    ptr: *const E,
    nrows: usize,
    ncols: usize,
    row_stride: isize,
    col_stride: isize,
) -> MatRef<'a, E> {
    MatRef {
        inner: MatImpl {
            ptr: ptr as *mut E,
            nrows,
            ncols,
            row_stride,
            col_stride,
        },
        __marker: PhantomData,
    }
}

/// Creates a `MatMut` from a pointer to the matrix data, dimensions, and strides.
///
/// # Safety
/// Every element addressed by `ptr + i * row_stride + j * col_stride` for `i < nrows` and
/// `j < ncols` must be valid for reads and writes for the lifetime `'a`, must not be accessed
/// through another pointer during that lifetime, and no two such elements may alias.
#[inline(always)]
pub unsafe fn from_raw_parts_mut<'a, E: ComplexField>(
    ptr: *mut E,
    nrows: usize,
    ncols: usize,
    row_stride: isize,
    col_stride: isize,
) -> MatMut<'a, E> {
    MatMut {
        inner: MatImpl {
            ptr,
            nrows,
            ncols,
            row_stride,
            col_stride,
        },
        __marker: PhantomData,
    }
}

/// Creates a `MatRef` over column-major data with the given leading dimension.
///
/// # Panics
/// Panics if `col_stride < nrows` while the matrix is not empty, or if `slice` is too short.
#[track_caller]
#[inline]
pub fn from_column_major_slice_with_stride<E: ComplexField>(
    slice: &[E],
    nrows: usize,
    ncols: usize,
    col_stride: usize,
) -> MatRef<'_, E> {
    if nrows > 0 && ncols > 0 {
        assert!(col_stride >= nrows);
    }
    assert!(slice.len() >= required_len(nrows, ncols, nrows, col_stride));
    unsafe { from_raw_parts(slice.as_ptr(), nrows, ncols, 1, col_stride as isize) }
}

/// Mutable version of [`from_column_major_slice_with_stride`].
#[track_caller]
#[inline]
pub fn from_column_major_slice_with_stride_mut<E: ComplexField>(
    slice: &mut [E],
    nrows: usize,
    ncols: usize,
    col_stride: usize,
) -> MatMut<'_, E> {
    if nrows > 0 && ncols > 0 {
        assert!(col_stride >= nrows);
    }
    assert!(slice.len() >= required_len(nrows, ncols, nrows, col_stride));
    unsafe { from_raw_parts_mut(slice.as_mut_ptr(), nrows, ncols, 1, col_stride as isize) }
}

/// Creates a `MatRef` over packed column-major data.
#[track_caller]
#[inline]
pub fn from_column_major_slice<E: ComplexField>(
    slice: &[E],
    nrows: usize,
    ncols: usize,
) -> MatRef<'_, E> {
    from_column_major_slice_with_stride(slice, nrows, ncols, nrows)
}

/// Creates a `MatMut` over packed column-major data.
#[track_caller]
#[inline]
pub fn from_column_major_slice_mut<E: ComplexField>(
    slice: &mut [E],
    nrows: usize,
    ncols: usize,
) -> MatMut<'_, E> {
    from_column_major_slice_with_stride_mut(slice, nrows, ncols, nrows)
}

/// Creates a `MatRef` over row-major data with the given leading dimension.
#[track_caller]
#[inline]
pub fn from_row_major_slice_with_stride<E: ComplexField>(
    slice: &[E],
    nrows: usize,
    ncols: usize,
    row_stride: usize,
) -> MatRef<'_, E> {
    from_column_major_slice_with_stride(slice, ncols, nrows, row_stride).transpose()
}

/// Mutable version of [`from_row_major_slice_with_stride`].
#[track_caller]
#[inline]
pub fn from_row_major_slice_with_stride_mut<E: ComplexField>(
    slice: &mut [E],
    nrows: usize,
    ncols: usize,
    row_stride: usize,
) -> MatMut<'_, E> {
    from_column_major_slice_with_stride_mut(slice, ncols, nrows, row_stride).transpose_mut()
}

/// Creates a `MatMut` over packed row-major data.
#[track_caller]
#[inline]
pub fn from_row_major_slice_mut<E: ComplexField>(
    slice: &mut [E],
    nrows: usize,
    ncols: usize,
) -> MatMut<'_, E> {
    from_row_major_slice_with_stride_mut(slice, nrows, ncols, ncols)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert;
    use reborrow::*;

    #[test]
    fn column_major_with_leading_dimension() {
        let data: Vec<f64> = (0..12).map(|x| x as f64).collect();
        let a = from_column_major_slice_with_stride(&data, 3, 3, 4);
        assert!(a.read(0, 0) == 0.0);
        assert!(a.read(2, 0) == 2.0);
        assert!(a.read(0, 1) == 4.0);
        assert!(a.read(1, 2) == 9.0);

        let at = a.transpose();
        assert!(at.read(2, 1) == 9.0);
    }

    #[test]
    fn row_major_view_matches_column_major_transpose() {
        let mut data: Vec<f64> = (0..6).map(|x| x as f64).collect();
        let mut a = from_row_major_slice_mut(&mut data, 2, 3);
        assert!(a.read(1, 0) == 3.0);
        assert!(a.rb().row_stride() == 3);
        a.write(1, 2, -1.0);
        assert!(data[5] == -1.0);
    }

    #[test]
    fn split_views_are_disjoint() {
        let mut m = Mat::<f64>::from_fn(4, 5, |i, j| (i + 10 * j) as f64);
        let (tl, tr, bl, br) = m.as_mut().split_at_mut(1, 2);
        assert!(tl.nrows() == 1);
        assert!(tl.ncols() == 2);
        assert!(tr.read(0, 0) == 20.0);
        assert!(bl.read(2, 1) == 13.0);
        assert!(br.read(2, 2) == 43.0);
    }

    #[test]
    fn empty_views() {
        let data: Vec<f64> = Vec::new();
        let a = from_column_major_slice(&data, 0, 5);
        assert!(a.ncols() == 5);
        let (left, right) = a.split_at_col(5);
        assert!(left.ncols() == 5);
        assert!(right.ncols() == 0);
    }
}
