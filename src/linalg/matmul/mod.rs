//! Matrix multiplication.

use crate::{assert, ComplexField, Conj, MatMut, MatRef, Parallelism};
use reborrow::*;

const GEMM_THRESHOLD: usize = 16 * 16 * 16;

#[inline]
fn gemm_parallelism(parallelism: Parallelism) -> gemm::Parallelism {
    match parallelism {
        Parallelism::None => gemm::Parallelism::None,
        #[cfg(feature = "rayon")]
        Parallelism::Rayon(0) => gemm::Parallelism::Rayon(rayon::current_num_threads()),
        #[cfg(feature = "rayon")]
        Parallelism::Rayon(n_threads) => gemm::Parallelism::Rayon(n_threads),
    }
}

fn matmul_naive<E: ComplexField>(
    mut acc: MatMut<'_, E>,
    lhs: MatRef<'_, E>,
    conj_lhs: Conj,
    rhs: MatRef<'_, E>,
    conj_rhs: Conj,
    alpha: Option<E>,
    beta: E,
) {
    let m = acc.nrows();
    let n = acc.ncols();
    let k = lhs.ncols();

    for j in 0..n {
        for i in 0..m {
            let mut dot = E::zero();
            for depth in 0..k {
                let (l, r) = unsafe { (lhs.read_unchecked(i, depth), rhs.read_unchecked(depth, j)) };
                dot = dot + conj_lhs.apply(l) * conj_rhs.apply(r);
            }
            let value = match alpha {
                Some(alpha) => alpha * unsafe { acc.rb().read_unchecked(i, j) } + beta * dot,
                None => beta * dot,
            };
            unsafe { acc.write_unchecked(i, j, value) };
        }
    }
}

/// Computes the matrix product `[alpha * acc] + beta * lhs * rhs` (while optionally conjugating
/// either or both of the input matrices) and stores the result in `acc`.
///
/// Performs the operation:
/// - `acc = beta * Op_lhs(lhs) * Op_rhs(rhs)` if `alpha` is `None` (in this case, the preexisting
/// values in `acc` are not read),
/// - `acc = alpha * acc + beta * Op_lhs(lhs) * Op_rhs(rhs)` if `alpha` is `Some(_)`,
///
/// `Op_lhs` is the identity if `conj_lhs` is `Conj::No`, and the conjugation operation if it is
/// `Conj::Yes`.
/// `Op_rhs` is the identity if `conj_rhs` is `Conj::No`, and the conjugation operation if it is
/// `Conj::Yes`.
///
/// Small products are evaluated directly, larger ones are forwarded to the [`gemm`] crate.
///
/// # Panics
///
/// Panics if the matrix dimensions are not compatible for matrix multiplication.
/// i.e.
///  - `acc.nrows() == lhs.nrows()`
///  - `acc.ncols() == rhs.ncols()`
///  - `lhs.ncols() == rhs.nrows()`
///
/// # Example
///
/// ```
/// use bidiag::{linalg::matmul::matmul_with_conj, Conj, Mat, Parallelism};
///
/// let lhs = Mat::from_fn(2, 2, |i, j| (i + 2 * j) as f64);
/// let rhs = Mat::from_fn(2, 2, |i, j| (4 + i + 2 * j) as f64);
///
/// let mut acc = Mat::<f64>::zeros(2, 2);
/// matmul_with_conj(
///     acc.as_mut(),
///     lhs.as_ref(),
///     Conj::No,
///     rhs.as_ref(),
///     Conj::No,
///     None,
///     2.5,
///     Parallelism::None,
/// );
///
/// let target = 2.5 * (lhs.read(1, 0) * rhs.read(0, 1) + lhs.read(1, 1) * rhs.read(1, 1));
/// assert!((acc.read(1, 1) - target).abs() < 1e-10);
/// ```
#[track_caller]
pub fn matmul_with_conj<E: ComplexField>(
    mut acc: MatMut<'_, E>,
    lhs: MatRef<'_, E>,
    conj_lhs: Conj,
    rhs: MatRef<'_, E>,
    conj_rhs: Conj,
    alpha: Option<E>,
    beta: E,
    parallelism: Parallelism,
) {
    assert!(all(
        acc.nrows() == lhs.nrows(),
        acc.ncols() == rhs.ncols(),
        lhs.ncols() == rhs.nrows(),
    ));

    let m = acc.nrows();
    let n = acc.ncols();
    let k = lhs.ncols();

    if m == 0 || n == 0 {
        return;
    }

    let small = match m.checked_mul(n).and_then(|mn| mn.checked_mul(k)) {
        Some(mnk) => mnk <= GEMM_THRESHOLD,
        None => false,
    };

    if k == 0 || small {
        matmul_naive(acc, lhs, conj_lhs, rhs, conj_rhs, alpha, beta);
        return;
    }

    let acc_rs = acc.row_stride();
    let acc_cs = acc.col_stride();
    unsafe {
        gemm::gemm(
            m,
            n,
            k,
            acc.rb_mut().as_ptr_mut(),
            acc_cs,
            acc_rs,
            alpha.is_some(),
            lhs.as_ptr(),
            lhs.col_stride(),
            lhs.row_stride(),
            rhs.as_ptr(),
            rhs.col_stride(),
            rhs.row_stride(),
            alpha.unwrap_or(E::zero()),
            beta,
            false,
            conj_lhs == Conj::Yes,
            conj_rhs == Conj::Yes,
            gemm_parallelism(parallelism),
        )
    };
}

/// Computes the matrix product `[alpha * acc] + beta * lhs * rhs` and
/// stores the result in `acc`.
///
/// Performs the operation:
/// - `acc = beta * lhs * rhs` if `alpha` is `None` (in this case, the preexisting values in `acc`
///   are not read),
/// - `acc = alpha * acc + beta * lhs * rhs` if `alpha` is `Some(_)`,
///
/// # Panics
///
/// Panics if the matrix dimensions are not compatible for matrix multiplication.
/// i.e.
///  - `acc.nrows() == lhs.nrows()`
///  - `acc.ncols() == rhs.ncols()`
///  - `lhs.ncols() == rhs.nrows()`
#[track_caller]
#[inline]
pub fn matmul<E: ComplexField>(
    acc: MatMut<'_, E>,
    lhs: MatRef<'_, E>,
    rhs: MatRef<'_, E>,
    alpha: Option<E>,
    beta: E,
    parallelism: Parallelism,
) {
    matmul_with_conj(acc, lhs, Conj::No, rhs, Conj::No, alpha, beta, parallelism)
}
