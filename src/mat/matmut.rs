use super::*;
use crate::{assert, debug_assert};
use reborrow::*;

/// Mutable view over a matrix, similar to a mutable reference to a 2D strided [prim@slice].
///
/// # Note
///
/// Unlike a slice, a `MatMut` cannot be copied. To use it twice, reborrow it with
/// [`ReborrowMut::rb_mut`], or get an immutable view with [`Reborrow::rb`].
/// ```
/// use bidiag::{Mat, MatMut, MatRef};
/// use reborrow::*;
///
/// fn takes_matmut(view: MatMut<'_, f64>) {}
/// fn takes_matref(view: MatRef<'_, f64>) {}
///
/// let mut matrix = Mat::<f64>::zeros(2, 2);
/// let mut view = matrix.as_mut();
///
/// takes_matmut(view.rb_mut());
/// takes_matmut(view.rb_mut());
/// takes_matref(view.rb());
/// takes_matmut(view);
/// ```
pub struct MatMut<'a, E> {
    pub(super) inner: MatImpl<E>,
    pub(super) __marker: PhantomData<&'a mut E>,
}

unsafe impl<E: Sync> Sync for MatMut<'_, E> {}
unsafe impl<E: Send> Send for MatMut<'_, E> {}

impl<'short, E> Reborrow<'short> for MatMut<'_, E> {
    type Target = MatRef<'short, E>;

    #[inline]
    fn rb(&'short self) -> Self::Target {
        MatRef {
            inner: self.inner,
            __marker: PhantomData,
        }
    }
}

impl<'short, E> ReborrowMut<'short> for MatMut<'_, E> {
    type Target = MatMut<'short, E>;

    #[inline]
    fn rb_mut(&'short mut self) -> Self::Target {
        MatMut {
            inner: self.inner,
            __marker: PhantomData,
        }
    }
}

impl<'a, E> IntoConst for MatMut<'a, E> {
    type Target = MatRef<'a, E>;

    #[inline]
    fn into_const(self) -> Self::Target {
        MatRef {
            inner: self.inner,
            __marker: PhantomData,
        }
    }
}

impl<'a, E: ComplexField> MatMut<'a, E> {
    /// Returns the number of rows of the matrix.
    #[inline(always)]
    pub fn nrows(&self) -> usize {
        self.inner.nrows
    }

    /// Returns the number of columns of the matrix.
    #[inline(always)]
    pub fn ncols(&self) -> usize {
        self.inner.ncols
    }

    /// Returns the offset between the first elements of two successive rows in the matrix.
    #[inline(always)]
    pub fn row_stride(&self) -> isize {
        self.inner.row_stride
    }

    /// Returns the offset between the first elements of two successive columns in the matrix.
    #[inline(always)]
    pub fn col_stride(&self) -> isize {
        self.inner.col_stride
    }

    /// Returns a mutable pointer to the matrix data.
    #[inline(always)]
    pub fn as_ptr_mut(self) -> *mut E {
        self.inner.ptr
    }

    /// Reads the value of the element at the given indices, with bound checks.
    #[inline(always)]
    #[track_caller]
    pub fn read(&self, row: usize, col: usize) -> E {
        self.rb().read(row, col)
    }

    /// Writes the value to the element at the given indices, with bound checks.
    #[inline(always)]
    #[track_caller]
    pub fn write(&mut self, row: usize, col: usize, value: E) {
        assert!(all(row < self.nrows(), col < self.ncols()));
        unsafe { self.write_unchecked(row, col, value) };
    }

    /// Writes the value to the element at the given indices.
    ///
    /// # Safety
    /// `row < self.nrows()` and `col < self.ncols()`.
    #[inline(always)]
    #[track_caller]
    pub unsafe fn write_unchecked(&mut self, row: usize, col: usize, value: E) {
        debug_assert!(all(row < self.nrows(), col < self.ncols()));
        *self.inner.ptr_at(row, col) = value;
    }

    /// Returns the transpose of `self`.
    #[inline(always)]
    #[must_use]
    pub fn transpose_mut(self) -> Self {
        unsafe { self.into_const().transpose().const_cast() }
    }

    /// Returns a view over the submatrix starting at indices `(row_start, col_start)`, and with
    /// dimensions `(nrows, ncols)`.
    #[track_caller]
    #[inline(always)]
    pub fn submatrix_mut(
        self,
        row_start: usize,
        col_start: usize,
        nrows: usize,
        ncols: usize,
    ) -> Self {
        unsafe {
            self.into_const()
                .submatrix(row_start, col_start, nrows, ncols)
                .const_cast()
        }
    }

    /// Returns a view over the rows `row_start..row_start + nrows`.
    #[track_caller]
    #[inline(always)]
    pub fn subrows_mut(self, row_start: usize, nrows: usize) -> Self {
        unsafe { self.into_const().subrows(row_start, nrows).const_cast() }
    }

    /// Returns a view over the columns `col_start..col_start + ncols`.
    #[track_caller]
    #[inline(always)]
    pub fn subcols_mut(self, col_start: usize, ncols: usize) -> Self {
        unsafe { self.into_const().subcols(col_start, ncols).const_cast() }
    }

    /// Splits the matrix horizontally at the given row into two parts.
    #[track_caller]
    #[inline(always)]
    pub fn split_at_row_mut(self, row: usize) -> (Self, Self) {
        let (top, bot) = self.into_const().split_at_row(row);
        unsafe { (top.const_cast(), bot.const_cast()) }
    }

    /// Splits the matrix vertically at the given column into two parts.
    #[track_caller]
    #[inline(always)]
    pub fn split_at_col_mut(self, col: usize) -> (Self, Self) {
        let (left, right) = self.into_const().split_at_col(col);
        unsafe { (left.const_cast(), right.const_cast()) }
    }

    /// Splits the matrix into four corner parts in the following order: top left, top right,
    /// bottom left, bottom right.
    #[track_caller]
    #[inline(always)]
    pub fn split_at_mut(self, row: usize, col: usize) -> (Self, Self, Self, Self) {
        let (top_left, top_right, bot_left, bot_right) = self.into_const().split_at(row, col);
        unsafe {
            (
                top_left.const_cast(),
                top_right.const_cast(),
                bot_left.const_cast(),
                bot_right.const_cast(),
            )
        }
    }

    /// Returns a view over the column at the given index, as an `nrows × 1` matrix.
    #[track_caller]
    #[inline(always)]
    pub fn col_mut(self, col: usize) -> Self {
        unsafe { self.into_const().col(col).const_cast() }
    }

    /// Returns a view over the row at the given index, as a `1 × ncols` matrix.
    #[track_caller]
    #[inline(always)]
    pub fn row_mut(self, row: usize) -> Self {
        unsafe { self.into_const().row(row).const_cast() }
    }

    /// Fills the elements of `self` with `constant`.
    #[inline]
    pub fn fill(&mut self, constant: E) {
        let (m, n) = (self.nrows(), self.ncols());
        for j in 0..n {
            for i in 0..m {
                unsafe { self.write_unchecked(i, j, constant) };
            }
        }
    }

    /// Fills the elements of `self` with zeros.
    #[inline]
    pub fn fill_zero(&mut self) {
        self.fill(E::zero())
    }

    /// Copies the values from `other` into `self`.
    #[track_caller]
    #[inline]
    pub fn copy_from(&mut self, other: MatRef<'_, E>) {
        assert!(all(self.nrows() == other.nrows(), self.ncols() == other.ncols()));
        let (m, n) = (self.nrows(), self.ncols());
        for j in 0..n {
            for i in 0..m {
                unsafe { self.write_unchecked(i, j, other.read_unchecked(i, j)) };
            }
        }
    }

    /// Replaces every element by its complex conjugate. Does nothing for real scalars.
    #[inline]
    pub fn conjugate_in_place(&mut self) {
        if E::IS_REAL {
            return;
        }
        let (m, n) = (self.nrows(), self.ncols());
        for j in 0..n {
            for i in 0..m {
                unsafe {
                    let value = (*self).rb().read_unchecked(i, j).conj();
                    self.write_unchecked(i, j, value);
                }
            }
        }
    }
}

impl<E: ComplexField> core::fmt::Debug for MatMut<'_, E> {
    #[inline]
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Debug::fmt(&self.rb(), f)
    }
}
