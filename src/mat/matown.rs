use super::*;
use alloc::vec::Vec;

/// Heap allocated column-major matrix.
///
/// Mostly used to hold inputs and reference results; the routines of this crate operate on
/// [`MatRef`] and [`MatMut`] views.
#[derive(Clone)]
pub struct Mat<E> {
    data: Vec<E>,
    nrows: usize,
    ncols: usize,
}

impl<E: ComplexField> Mat<E> {
    /// Returns a new matrix with dimensions `(0, 0)`.
    #[inline]
    pub fn new() -> Self {
        Self {
            data: Vec::new(),
            nrows: 0,
            ncols: 0,
        }
    }

    /// Returns a new matrix with dimensions `(nrows, ncols)`, filled with the provided function.
    #[inline]
    pub fn from_fn(nrows: usize, ncols: usize, mut f: impl FnMut(usize, usize) -> E) -> Self {
        let mut data = Vec::with_capacity(nrows * ncols);
        for j in 0..ncols {
            for i in 0..nrows {
                data.push(f(i, j));
            }
        }
        Self { data, nrows, ncols }
    }

    /// Returns a new matrix with dimensions `(nrows, ncols)`, filled with zeros.
    #[inline]
    pub fn zeros(nrows: usize, ncols: usize) -> Self {
        Self::from_fn(nrows, ncols, |_, _| E::zero())
    }

    /// Returns a new matrix with dimensions `(nrows, ncols)`, filled with zeros, except the main
    /// diagonal which is filled with ones.
    #[inline]
    pub fn identity(nrows: usize, ncols: usize) -> Self {
        Self::from_fn(nrows, ncols, |i, j| if i == j { E::one() } else { E::zero() })
    }

    /// Returns the number of rows of the matrix.
    #[inline(always)]
    pub fn nrows(&self) -> usize {
        self.nrows
    }

    /// Returns the number of columns of the matrix.
    #[inline(always)]
    pub fn ncols(&self) -> usize {
        self.ncols
    }

    /// Returns the column-major storage of the matrix.
    #[inline(always)]
    pub fn as_slice(&self) -> &[E] {
        &self.data
    }

    /// Returns the column-major storage of the matrix.
    #[inline(always)]
    pub fn as_slice_mut(&mut self) -> &mut [E] {
        &mut self.data
    }

    /// Returns a view over the matrix.
    #[inline]
    pub fn as_ref(&self) -> MatRef<'_, E> {
        from_column_major_slice(&self.data, self.nrows, self.ncols)
    }

    /// Returns a mutable view over the matrix.
    #[inline]
    pub fn as_mut(&mut self) -> MatMut<'_, E> {
        let (nrows, ncols) = (self.nrows, self.ncols);
        from_column_major_slice_mut(&mut self.data, nrows, ncols)
    }

    /// Reads the value of the element at the given indices, with bound checks.
    #[inline(always)]
    #[track_caller]
    pub fn read(&self, row: usize, col: usize) -> E {
        self.as_ref().read(row, col)
    }

    /// Writes the value to the element at the given indices, with bound checks.
    #[inline(always)]
    #[track_caller]
    pub fn write(&mut self, row: usize, col: usize, value: E) {
        self.as_mut().write(row, col, value)
    }

    /// Returns the transpose of the matrix as a new owning matrix.
    #[inline]
    pub fn transpose(&self) -> Self {
        self.as_ref().transpose().to_owned()
    }

    /// Returns the conjugate transpose of the matrix as a new owning matrix.
    #[inline]
    pub fn adjoint(&self) -> Self {
        let this = self.as_ref();
        Self::from_fn(self.ncols, self.nrows, |i, j| this.read(j, i).conj())
    }
}

impl<E: ComplexField> Default for Mat<E> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<E: ComplexField> core::fmt::Debug for Mat<E> {
    #[inline]
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Debug::fmt(&self.as_ref(), f)
    }
}
