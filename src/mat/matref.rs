use super::*;
use crate::{assert, debug_assert};
use reborrow::*;

/// Immutable view over a matrix, similar to an immutable reference to a 2D strided [prim@slice].
pub struct MatRef<'a, E> {
    pub(super) inner: MatImpl<E>,
    pub(super) __marker: PhantomData<&'a E>,
}

impl<E> Clone for MatRef<'_, E> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for MatRef<'_, E> {}

unsafe impl<E: Sync> Sync for MatRef<'_, E> {}
unsafe impl<E: Sync> Send for MatRef<'_, E> {}

impl<'short, E> Reborrow<'short> for MatRef<'_, E> {
    type Target = MatRef<'short, E>;

    #[inline]
    fn rb(&'short self) -> Self::Target {
        *self
    }
}

impl<'short, E> ReborrowMut<'short> for MatRef<'_, E> {
    type Target = MatRef<'short, E>;

    #[inline]
    fn rb_mut(&'short mut self) -> Self::Target {
        *self
    }
}

impl<E> IntoConst for MatRef<'_, E> {
    type Target = Self;

    #[inline]
    fn into_const(self) -> Self::Target {
        self
    }
}

impl<'a, E: ComplexField> MatRef<'a, E> {
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

    /// Returns a pointer to the matrix data.
    #[inline(always)]
    pub fn as_ptr(self) -> *const E {
        self.inner.ptr
    }

    /// Returns a pointer to the element at the given indices, without bound checks.
    #[inline(always)]
    pub fn ptr_at(self, row: usize, col: usize) -> *const E {
        self.inner.ptr_at(row, col)
    }

    /// Reads the value of the element at the given indices, with bound checks.
    #[inline(always)]
    #[track_caller]
    pub fn read(&self, row: usize, col: usize) -> E {
        assert!(all(row < self.nrows(), col < self.ncols()));
        unsafe { self.read_unchecked(row, col) }
    }

    /// Reads the value of the element at the given indices.
    ///
    /// # Safety
    /// `row < self.nrows()` and `col < self.ncols()`.
    #[inline(always)]
    #[track_caller]
    pub unsafe fn read_unchecked(&self, row: usize, col: usize) -> E {
        debug_assert!(all(row < self.nrows(), col < self.ncols()));
        *self.inner.ptr_at(row, col)
    }

    /// Returns the transpose of `self`.
    #[inline(always)]
    #[must_use]
    pub fn transpose(self) -> Self {
        unsafe {
            from_raw_parts(
                self.as_ptr(),
                self.ncols(),
                self.nrows(),
                self.col_stride(),
                self.row_stride(),
            )
        }
    }

    /// Returns a view over the submatrix starting at indices `(row_start, col_start)`, and with
    /// dimensions `(nrows, ncols)`.
    #[track_caller]
    #[inline(always)]
    pub fn submatrix(self, row_start: usize, col_start: usize, nrows: usize, ncols: usize) -> Self {
        assert!(all(row_start <= self.nrows(), col_start <= self.ncols()));
        assert!(all(
            nrows <= self.nrows() - row_start,
            ncols <= self.ncols() - col_start,
        ));
        unsafe {
            from_raw_parts(
                self.inner.ptr_at(row_start, col_start),
                nrows,
                ncols,
                self.row_stride(),
                self.col_stride(),
            )
        }
    }

    /// Returns a view over the rows `row_start..row_start + nrows`.
    #[track_caller]
    #[inline(always)]
    pub fn subrows(self, row_start: usize, nrows: usize) -> Self {
        let ncols = self.ncols();
        self.submatrix(row_start, 0, nrows, ncols)
    }

    /// Returns a view over the columns `col_start..col_start + ncols`.
    #[track_caller]
    #[inline(always)]
    pub fn subcols(self, col_start: usize, ncols: usize) -> Self {
        let nrows = self.nrows();
        self.submatrix(0, col_start, nrows, ncols)
    }

    /// Splits the matrix horizontally at the given row into two parts.
    #[track_caller]
    #[inline(always)]
    pub fn split_at_row(self, row: usize) -> (Self, Self) {
        assert!(row <= self.nrows());
        let nrows = self.nrows();
        (self.subrows(0, row), self.subrows(row, nrows - row))
    }

    /// Splits the matrix vertically at the given column into two parts.
    #[track_caller]
    #[inline(always)]
    pub fn split_at_col(self, col: usize) -> (Self, Self) {
        assert!(col <= self.ncols());
        let ncols = self.ncols();
        (self.subcols(0, col), self.subcols(col, ncols - col))
    }

    /// Splits the matrix into four corner parts in the following order: top left, top right,
    /// bottom left, bottom right.
    #[track_caller]
    #[inline(always)]
    pub fn split_at(self, row: usize, col: usize) -> (Self, Self, Self, Self) {
        let (top, bot) = self.split_at_row(row);
        let (top_left, top_right) = top.split_at_col(col);
        let (bot_left, bot_right) = bot.split_at_col(col);
        (top_left, top_right, bot_left, bot_right)
    }

    /// Returns a view over the column at the given index, as an `nrows × 1` matrix.
    #[track_caller]
    #[inline(always)]
    pub fn col(self, col: usize) -> Self {
        assert!(col < self.ncols());
        let nrows = self.nrows();
        self.submatrix(0, col, nrows, 1)
    }

    /// Returns a view over the row at the given index, as a `1 × ncols` matrix.
    #[track_caller]
    #[inline(always)]
    pub fn row(self, row: usize) -> Self {
        assert!(row < self.nrows());
        let ncols = self.ncols();
        self.submatrix(row, 0, 1, ncols)
    }

    /// Returns an owning column-major copy of the data.
    #[inline]
    pub fn to_owned(&self) -> Mat<E> {
        let this = *self;
        Mat::from_fn(this.nrows(), this.ncols(), |i, j| unsafe {
            this.read_unchecked(i, j)
        })
    }

    /// Returns `true` if the elements of each column are contiguous.
    #[inline]
    pub fn is_col_major(&self) -> bool {
        self.row_stride() == 1 || self.nrows() <= 1
    }

    /// Reinterprets the view as mutable.
    ///
    /// # Safety
    /// The caller must hold exclusive access to the viewed elements for the lifetime `'a`.
    #[inline(always)]
    pub unsafe fn const_cast(self) -> MatMut<'a, E> {
        from_raw_parts_mut(
            self.inner.ptr,
            self.nrows(),
            self.ncols(),
            self.row_stride(),
            self.col_stride(),
        )
    }
}

impl<E: ComplexField> core::fmt::Debug for MatRef<'_, E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        struct Row<'a, E: ComplexField>(MatRef<'a, E>, usize);

        impl<E: ComplexField> core::fmt::Debug for Row<'_, E> {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                let mat = self.0;
                let i = self.1;
                f.debug_list()
                    .entries((0..mat.ncols()).map(|j| mat.read(i, j)))
                    .finish()
            }
        }

        let this = *self;
        f.debug_list()
            .entries((0..this.nrows()).map(|i| Row(this, i)))
            .finish()
    }
}
