//! Reduction of a general matrix to bidiagonal form.
//!
//! For an $m \times n$ matrix $A$, the reduction computes unitary $Q$ ($m \times m$) and $P$
//! ($n \times n$) such that $Q^H A P = B$ is real bidiagonal: upper bidiagonal when $m \ge n$,
//! lower bidiagonal otherwise.
//!
//! $Q$ and $P$ are products of Householder reflections (see [`householder`](super::householder))
//! $$Q = H_0 H_1 \dots H_{k-1}, \quad P = G_0 G_1 \dots G_{l-1},$$
//! with $H_i = I - \tau^Q_i v_i v_i^H$ and $G_i = I - \tau^P_i u_i u_i^H$. On exit, the matrix
//! holds the diagonal and off-diagonal of $B$, and the reflectors in the entries that the
//! reduction annihilates:
//!
//! - if $m \ge n$: $v_i$ has its unit entry at row $i$ and its tail stored in `a[i+1.., i]`,
//! $u_i$ has its unit entry at column $i + 1$ and the conjugate of its tail stored in
//! `a[i, i+2..]`. `tauq` holds $n$ factors and `taup` holds $n - 1$ factors followed by a zero.
//! - if $m < n$: $v_i$ has its unit entry at row $i + 1$ and its tail stored in `a[i+2.., i]`,
//! $u_i$ has its unit entry at column $i$ and the conjugate of its tail stored in
//! `a[i, i+1..]`. `taup` holds $m$ factors and `tauq` holds $m - 1$ factors followed by a zero.
//!
//! The reduction processes the matrix in panels of `block_size` columns and rows: each panel is
//! reduced while accumulating two low-rank correction matrices $X$ and $Y$, and the trailing
//! matrix is then updated with two matrix products. Once fewer than `crossover` columns (or
//! rows) remain, the unblocked algorithm finishes the reduction. The block sizes are chosen by
//! [`compute_plan`], following a [`BidiagTuning`] oracle.
//!
//! The factors can be turned into explicit matrices, or applied to other matrices, with the
//! functions in [`reconstruct`].

use crate::{
    assert,
    linalg::matmul::{matmul, matmul_with_conj},
    mat, ComplexField, Conj, MatMut, Parallelism,
};
use dyn_stack::{PodStack, SizeOverflow, StackReq};
use reborrow::*;

pub mod panel;
pub mod reconstruct;
pub mod unblocked;

/// Block size oracle for the bidiagonal reduction of an `nrows × ncols` matrix.
pub trait BidiagTuning {
    /// Preferred number of rows and columns reduced per panel.
    fn block_size(&self, nrows: usize, ncols: usize) -> usize;
    /// Smallest block size worth using when the workspace is too small for the preferred one.
    fn min_block_size(&self, nrows: usize, ncols: usize) -> usize;
    /// Size of the trailing matrix below which the unblocked algorithm is used.
    fn crossover(&self, nrows: usize, ncols: usize) -> usize;
}

/// Fixed block sizes, independent of the matrix dimensions.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BidiagParams {
    /// Preferred panel size.
    pub block_size: usize,
    /// Smallest acceptable panel size.
    pub min_block_size: usize,
    /// Crossover point to the unblocked algorithm.
    pub crossover: usize,
}

impl Default for BidiagParams {
    #[inline]
    fn default() -> Self {
        Self {
            block_size: 32,
            min_block_size: 2,
            crossover: 128,
        }
    }
}

impl BidiagTuning for BidiagParams {
    #[inline]
    fn block_size(&self, _nrows: usize, _ncols: usize) -> usize {
        self.block_size
    }
    #[inline]
    fn min_block_size(&self, _nrows: usize, _ncols: usize) -> usize {
        self.min_block_size
    }
    #[inline]
    fn crossover(&self, _nrows: usize, _ncols: usize) -> usize {
        self.crossover
    }
}

/// Block sizes selected for one reduction.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BlockPlan {
    nrows: usize,
    ncols: usize,
    block_size: usize,
    crossover: usize,
    optimal_workspace: usize,
}

impl BlockPlan {
    /// Number of rows of the matrix this plan was computed for.
    #[inline]
    pub fn nrows(&self) -> usize {
        self.nrows
    }

    /// Number of columns of the matrix this plan was computed for.
    #[inline]
    pub fn ncols(&self) -> usize {
        self.ncols
    }

    /// Number of rows and columns reduced per panel.
    #[inline]
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// The blocked loop runs while more than `crossover` rows and columns remain.
    #[inline]
    pub fn crossover(&self) -> usize {
        self.crossover
    }

    /// Workspace length, in scalars, that lets the reduction use the preferred block size.
    #[inline]
    pub fn optimal_workspace(&self) -> usize {
        self.optimal_workspace
    }

    /// Returns `true` if at least one panel is reduced with the blocked algorithm.
    #[inline]
    pub fn is_blocked(&self) -> bool {
        self.crossover < Ord::min(self.nrows, self.ncols)
    }

    /// Workspace length, in scalars, needed to run this plan.
    #[inline]
    pub fn required_workspace(&self) -> usize {
        let unblocked = Ord::max(self.nrows, self.ncols);
        if self.is_blocked() {
            Ord::max(
                unblocked,
                (self.nrows.saturating_add(self.ncols)).saturating_mul(self.block_size),
            )
        } else {
            unblocked
        }
    }
}

/// Chooses the block sizes for the reduction of an `nrows × ncols` matrix.
///
/// `workspace_len` is the length of the workspace the caller can provide, or `None` if it will
/// be sized from the returned plan. If it is too short for the preferred block size, a smaller
/// block size is used, down to [`BidiagTuning::min_block_size`], below which blocking is
/// disabled.
pub fn compute_plan<T: BidiagTuning + ?Sized>(
    nrows: usize,
    ncols: usize,
    workspace_len: Option<usize>,
    tuning: &T,
) -> BlockPlan {
    let m = nrows;
    let n = ncols;
    let size = Ord::min(m, n);
    let sum = m.saturating_add(n);

    let mut block_size = Ord::max(1, tuning.block_size(m, n));
    let mut crossover = size;
    let mut optimal_workspace = Ord::max(m, n);

    if block_size > 1 && block_size < size {
        crossover = Ord::max(block_size, tuning.crossover(m, n));
        if crossover < size {
            optimal_workspace = sum.saturating_mul(block_size);

            if let Some(lwork) = workspace_len {
                if lwork < optimal_workspace {
                    let min_block_size = Ord::max(1, tuning.min_block_size(m, n));
                    if lwork >= sum.saturating_mul(min_block_size) {
                        block_size = lwork / sum;

                        #[cfg(feature = "perf-warn")]
                        if crate::__perf_warn!(BIDIAG_BLOCK_WARN) {
                            log::warn!(target: "bidiag_perf", "Bidiagonal reduction workspace too small for the preferred block size. Reducing the block size to {block_size}.");
                        }
                    } else {
                        block_size = 1;
                        crossover = size;

                        #[cfg(feature = "perf-warn")]
                        if crate::__perf_warn!(BIDIAG_BLOCK_WARN) {
                            log::warn!(target: "bidiag_perf", "Bidiagonal reduction workspace too small for blocking. Falling back to the unblocked algorithm.");
                        }
                    }
                }
            }
        }
    }

    BlockPlan {
        nrows: m,
        ncols: n,
        block_size,
        crossover,
        optimal_workspace,
    }
}

/// Computes the size and alignment of the workspace required by [`bidiag_in_place`].
pub fn bidiag_in_place_req<E: ComplexField>(
    nrows: usize,
    ncols: usize,
    plan: &BlockPlan,
) -> Result<StackReq, SizeOverflow> {
    assert!(all(plan.nrows() == nrows, plan.ncols() == ncols));
    let len = plan.required_workspace();
    // saturated
    if len == usize::MAX {
        return Err(SizeOverflow);
    }
    StackReq::try_new::<E>(len)
}

/// Reduces `a` to bidiagonal form in place, following the block sizes of `plan`.
///
/// `d` and `e` receive the diagonal and off-diagonal of the bidiagonal matrix, and `tauq` and
/// `taup` the factors of the left and right reflectors. See the [module level
/// documentation](self) for the layout of the output.
///
/// # Panics
///
/// - Panics if `plan` was computed for different dimensions.
/// - Panics if `d`, `tauq` or `taup` do not have `min(nrows, ncols)` elements, or if `e` does not
/// have `min(nrows, ncols) - 1` elements (or zero, for an empty matrix).
/// - Panics if the stack is smaller than [`bidiag_in_place_req`].
#[track_caller]
pub fn bidiag_in_place<E: ComplexField>(
    a: MatMut<'_, E>,
    d: &mut [E::Real],
    e: &mut [E::Real],
    tauq: &mut [E],
    taup: &mut [E],
    plan: &BlockPlan,
    parallelism: Parallelism,
    stack: PodStack<'_>,
) {
    assert!(all(plan.nrows() == a.nrows(), plan.ncols() == a.ncols()));

    #[cfg(feature = "perf-warn")]
    if a.row_stride().unsigned_abs() != 1 && crate::__perf_warn!(BIDIAG_WARN) {
        if a.col_stride().unsigned_abs() == 1 {
            log::warn!(target: "bidiag_perf", "Bidiagonal reduction prefers column-major matrix. Found row-major matrix.");
        } else {
            log::warn!(target: "bidiag_perf", "Bidiagonal reduction prefers column-major matrix. Found matrix with generic strides.");
        }
    }

    let (work, _) = stack.make_raw::<E>(plan.required_workspace());
    bidiag_in_place_with_workspace(a, d, e, tauq, taup, plan, work, parallelism);
}

/// Same as [`bidiag_in_place`], with the workspace given as a slice of at least
/// `plan.required_workspace()` scalars.
#[track_caller]
pub(crate) fn bidiag_in_place_with_workspace<E: ComplexField>(
    mut a: MatMut<'_, E>,
    d: &mut [E::Real],
    e: &mut [E::Real],
    tauq: &mut [E],
    taup: &mut [E],
    plan: &BlockPlan,
    work: &mut [E],
    parallelism: Parallelism,
) {
    let m = a.nrows();
    let n = a.ncols();
    let size = Ord::min(m, n);

    assert!(all(
        d.len() == size,
        e.len() == size.saturating_sub(1),
        tauq.len() == size,
        taup.len() == size,
        work.len() >= plan.required_workspace(),
    ));

    if size == 0 {
        return;
    }

    let nb = plan.block_size();
    let nx = plan.crossover();
    let one = E::one();

    let mut i = 0;
    while i + nx < size {
        // x is m × nb and y is n × nb, both laid out back to back in the workspace
        let (x_work, y_work) = work.split_at_mut(m * nb);
        let mut x = mat::from_column_major_slice_mut(x_work, m, nb).subrows_mut(0, m - i);
        let mut y =
            mat::from_column_major_slice_mut(&mut y_work[..n * nb], n, nb).subrows_mut(0, n - i);

        let mut a_panel = a.rb_mut().submatrix_mut(i, i, m - i, n - i);
        panel::bidiag_panel_in_place(
            a_panel.rb_mut(),
            &mut d[i..i + nb],
            &mut e[i..i + nb],
            &mut tauq[i..i + nb],
            &mut taup[i..i + nb],
            x.rb_mut(),
            y.rb_mut(),
            parallelism,
        );

        // a22 -= v * y^H + x * u
        let (_, a12, a21, mut a22) = a_panel.split_at_mut(nb, nb);
        matmul_with_conj(
            a22.rb_mut(),
            a21.rb(),
            Conj::No,
            y.rb().subrows(nb, n - i - nb).transpose(),
            Conj::Yes,
            Some(one),
            -one,
            parallelism,
        );
        matmul(
            a22.rb_mut(),
            x.rb().subrows(nb, m - i - nb),
            a12.rb(),
            Some(one),
            -one,
            parallelism,
        );

        for j in i..i + nb {
            a.write(j, j, E::from_real(d[j]));
            if m >= n {
                a.write(j, j + 1, E::from_real(e[j]));
            } else {
                a.write(j + 1, j, E::from_real(e[j]));
            }
        }

        i += nb;
    }

    let tail = Ord::max(m - i, n - i);
    unblocked::bidiag_unblocked_in_place(
        a.submatrix_mut(i, i, m - i, n - i),
        &mut d[i..],
        &mut e[i..],
        &mut tauq[i..],
        &mut taup[i..],
        mat::from_column_major_slice_mut(&mut work[..tail], tail, 1),
        parallelism,
    );
}
