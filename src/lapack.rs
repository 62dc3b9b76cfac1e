//! LAPACK-style entry points, working on column-major slices with a leading dimension.
//!
//! Dimensions are taken as signed integers, and invalid arguments are reported with the
//! position of the offending argument, as `xGEBRD` does. Unlike the reference routine, the
//! workspace size query is a separate function, [`gebrd_work_size`], rather than a call with
//! `LWORK = -1`.

use crate::{
    linalg::bidiag::{bidiag_in_place_with_workspace, compute_plan, BidiagTuning},
    mat, ComplexField, Parallelism, RealField,
};

/// Error returned by the LAPACK-style routines.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LapackError {
    /// The argument at the 1-based `position` of `routine` had an illegal value.
    IllegalArgument {
        routine: &'static str,
        position: i32,
    },
}

impl LapackError {
    /// Returns the LAPACK `INFO` code of the error.
    #[inline]
    pub fn info(&self) -> i32 {
        match *self {
            LapackError::IllegalArgument { position, .. } => -position,
        }
    }
}

impl core::fmt::Display for LapackError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match *self {
            LapackError::IllegalArgument { routine, position } => write!(
                f,
                "** On entry to {routine} parameter number {position} had an illegal value"
            ),
        }
    }
}

#[cfg(feature = "std")]
#[cfg_attr(docsrs, doc(cfg(feature = "std")))]
impl std::error::Error for LapackError {}

/// Reports an illegal argument to `routine`, and returns the matching error.
#[cold]
pub fn report_illegal_argument(routine: &'static str, position: i32) -> LapackError {
    let err = LapackError::IllegalArgument { routine, position };
    log::error!(target: "bidiag", "{err}");
    err
}

fn gebrd_name<E: ComplexField>() -> &'static str {
    let single = core::mem::size_of::<E::Real>() == core::mem::size_of::<f32>();
    match (E::IS_REAL, single) {
        (true, true) => "SGEBRD",
        (true, false) => "DGEBRD",
        (false, true) => "CGEBRD",
        (false, false) => "ZGEBRD",
    }
}

fn check_dims(routine: &'static str, m: isize, n: isize, lda: isize) -> Result<(), LapackError> {
    if m < 0 {
        return Err(report_illegal_argument(routine, 1));
    }
    if n < 0 {
        return Err(report_illegal_argument(routine, 2));
    }
    if lda < Ord::max(1, m) {
        return Err(report_illegal_argument(routine, 4));
    }
    Ok(())
}

/// Returns the workspace length with which [`gebrd`] reduces an `m × n` matrix with the
/// preferred block size of `tuning`.
pub fn gebrd_work_size<E: ComplexField, T: BidiagTuning + ?Sized>(
    m: isize,
    n: isize,
    lda: isize,
    tuning: &T,
) -> Result<usize, LapackError> {
    check_dims(gebrd_name::<E>(), m, n, lda)?;
    let m = m as usize;
    let n = n as usize;
    let block_size = Ord::max(1, tuning.block_size(m, n));
    Ok(Ord::max(1, (m.saturating_add(n)).saturating_mul(block_size)))
}

/// Reduces the `m × n` matrix stored in `a` with leading dimension `lda` to bidiagonal form.
///
/// On success, the diagonal and off-diagonal of the bidiagonal matrix are stored in `d` and
/// `e`, the reflectors in `a`, `tauq` and `taup` (see [`linalg::bidiag`](crate::linalg::bidiag)
/// for the layout), and the optimal workspace length is returned and stored in `work[0]`.
///
/// The workspace length must be at least `max(1, m, n)`. Shorter workspaces than the one
/// returned by [`gebrd_work_size`] reduce the block size.
///
/// # Errors
///
/// Returns [`LapackError::IllegalArgument`] without touching any buffer if an argument is
/// invalid. The positions follow `xGEBRD`: `m` (1), `n` (2), `a` (3), `lda` (4), `d` (5),
/// `e` (6), `tauq` (7), `taup` (8), `work` (10).
pub fn gebrd<E: ComplexField, T: BidiagTuning + ?Sized>(
    m: isize,
    n: isize,
    a: &mut [E],
    lda: isize,
    d: &mut [E::Real],
    e: &mut [E::Real],
    tauq: &mut [E],
    taup: &mut [E],
    work: &mut [E],
    tuning: &T,
) -> Result<usize, LapackError> {
    let routine = gebrd_name::<E>();

    check_dims(routine, m, n, lda)?;
    let m = m as usize;
    let n = n as usize;
    let lda = lda as usize;
    let size = Ord::min(m, n);

    if work.len() < Ord::max(1, Ord::max(m, n)) {
        return Err(report_illegal_argument(routine, 10));
    }

    if size > 0 {
        let required = lda
            .checked_mul(n - 1)
            .and_then(|len| len.checked_add(m));
        if required.map_or(true, |required| a.len() < required) {
            return Err(report_illegal_argument(routine, 3));
        }
    }
    if d.len() < size {
        return Err(report_illegal_argument(routine, 5));
    }
    if e.len() < size.saturating_sub(1) {
        return Err(report_illegal_argument(routine, 6));
    }
    if tauq.len() < size {
        return Err(report_illegal_argument(routine, 7));
    }
    if taup.len() < size {
        return Err(report_illegal_argument(routine, 8));
    }

    if size == 0 {
        work[0] = E::one();
        return Ok(1);
    }

    let plan = compute_plan(m, n, Some(work.len()), tuning);
    let a = mat::from_column_major_slice_with_stride_mut(a, m, n, lda);

    bidiag_in_place_with_workspace(
        a,
        &mut d[..size],
        &mut e[..size - 1],
        &mut tauq[..size],
        &mut taup[..size],
        &plan,
        work,
        Parallelism::None,
    );

    let optimal = plan.optimal_workspace();
    work[0] = E::from_real(E::Real::from_f64(optimal as f64));
    Ok(optimal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        assert, c64,
        linalg::bidiag::{bidiag_in_place, bidiag_in_place_req, BidiagParams},
        Mat,
    };
    use alloc::{format, vec, vec::Vec};
    use assert_approx_eq::assert_approx_eq;
    use rand::prelude::*;

    fn random(rng: &mut StdRng, len: usize) -> Vec<f64> {
        (0..len).map(|_| rng.gen::<f64>() - 0.5).collect()
    }

    #[test]
    fn error_codes() {
        let params = BidiagParams::default();
        let mut a = vec![1.0f64; 12];
        let mut d = vec![7.0; 3];
        let mut e = vec![7.0; 2];
        let mut tauq = vec![7.0; 3];
        let mut taup = vec![7.0; 3];
        let mut work = vec![7.0; 64];

        let before = (a.clone(), work.clone());

        let mut call = |m: isize,
                        n: isize,
                        a_len: usize,
                        lda: isize,
                        d_len: usize,
                        e_len: usize,
                        q_len: usize,
                        p_len: usize,
                        w_len: usize| {
            gebrd::<f64, _>(
                m,
                n,
                &mut a[..a_len],
                lda,
                &mut d[..d_len],
                &mut e[..e_len],
                &mut tauq[..q_len],
                &mut taup[..p_len],
                &mut work[..w_len],
                &params,
            )
            .map_err(|err| err.info())
        };

        assert!(call(-1, 3, 12, 4, 3, 2, 3, 3, 64) == Err(-1));
        assert!(call(4, -1, 12, 4, 3, 2, 3, 3, 64) == Err(-2));
        assert!(call(4, 3, 12, 3, 3, 2, 3, 3, 64) == Err(-4));
        assert!(call(0, 3, 12, 0, 3, 2, 3, 3, 64) == Err(-4));
        assert!(call(4, 3, 12, 4, 3, 2, 3, 3, 3) == Err(-10));
        assert!(call(4, 3, 11, 4, 3, 2, 3, 3, 64) == Err(-3));
        assert!(call(4, 3, 12, 4, 2, 2, 3, 3, 64) == Err(-5));
        assert!(call(4, 3, 12, 4, 3, 1, 3, 3, 64) == Err(-6));
        assert!(call(4, 3, 12, 4, 3, 2, 2, 3, 64) == Err(-7));
        assert!(call(4, 3, 12, 4, 3, 2, 3, 2, 64) == Err(-8));
        // lower positions are reported first
        assert!(call(-1, -1, 0, 0, 0, 0, 0, 0, 0) == Err(-1));
        assert!(call(4, 3, 0, 4, 0, 0, 0, 0, 0) == Err(-10));

        assert!(a == before.0);
        assert!(work == before.1);
        assert!(d.iter().chain(&e).chain(&tauq).chain(&taup).all(|&x| x == 7.0));
    }

    #[test]
    fn error_display() {
        let err = LapackError::IllegalArgument {
            routine: "ZGEBRD",
            position: 4,
        };
        assert!(err.info() == -4);
        assert!(
            format!("{err}") == "** On entry to ZGEBRD parameter number 4 had an illegal value"
        );

        let err = gebrd_work_size::<c64, _>(-3, 2, 1, &BidiagParams::default()).unwrap_err();
        assert!(err == LapackError::IllegalArgument { routine: "ZGEBRD", position: 1 });
        let err = gebrd_work_size::<f32, _>(3, 2, 2, &BidiagParams::default()).unwrap_err();
        assert!(err == LapackError::IllegalArgument { routine: "SGEBRD", position: 4 });
    }

    #[test]
    fn quick_return() {
        let params = BidiagParams::default();
        for (m, n) in [(0isize, 5isize), (5, 0), (0, 0)] {
            let mut a = vec![3.0f64; 5];
            let mut work = vec![9.0; 5];
            let info = gebrd::<f64, _>(
                m,
                n,
                &mut a,
                Ord::max(1, m),
                &mut [],
                &mut [],
                &mut [],
                &mut [],
                &mut work,
                &params,
            );
            assert!(info == Ok(1));
            assert!(work[0] == 1.0);
            assert!(work[1..].iter().all(|&x| x == 9.0));
            assert!(a.iter().all(|&x| x == 3.0));
        }
    }

    #[test]
    fn work_size_query() {
        let params = BidiagParams::default();
        for (m, n) in [(0, 0), (1, 1), (7, 300), (300, 7), (200, 200), (1000, 500)] {
            let lda = Ord::max(1, m) as isize;
            let lwork = gebrd_work_size::<f64, _>(m as isize, n as isize, lda, &params).unwrap();
            assert!(lwork >= Ord::max(1, Ord::max(m, n)));
            assert!(lwork == Ord::max(1, (m + n) * 32));

            let plan = compute_plan(m, n, Some(lwork), &params);
            assert!(plan.block_size() == 32);
            assert!(plan.is_blocked() == (Ord::min(m, n) > 128));
        }
    }

    fn random_scalar<E: ComplexField>(rng: &mut StdRng) -> E {
        E::from_parts(
            E::Real::from_f64(rng.gen::<f64>() - 0.5),
            E::Real::from_f64(rng.gen::<f64>() - 0.5),
        )
    }

    fn check_matches_native<E: ComplexField>(
        rng: &mut StdRng,
        m: usize,
        n: usize,
        routine: &'static str,
    ) {
        let params = BidiagParams::default();
        let lda = m + 3;
        let a_orig: Vec<E> = (0..lda * n).map(|_| random_scalar(rng)).collect();

        let lwork =
            gebrd_work_size::<E, _>(m as isize, n as isize, lda as isize, &params).unwrap();
        let size = Ord::min(m, n);

        let mut a = a_orig.clone();
        let mut d = vec![E::Real::zero(); size];
        let mut e = vec![E::Real::zero(); size - 1];
        let mut tauq = vec![E::zero(); size];
        let mut taup = vec![E::zero(); size];
        let mut work = vec![E::zero(); lwork];

        let err = gebrd::<E, _>(
            m as isize,
            n as isize,
            &mut a,
            lda as isize - 4,
            &mut d,
            &mut e,
            &mut tauq,
            &mut taup,
            &mut work,
            &params,
        )
        .unwrap_err();
        assert!(err == LapackError::IllegalArgument { routine, position: 4 });

        let optimal = gebrd::<E, _>(
            m as isize,
            n as isize,
            &mut a,
            lda as isize,
            &mut d,
            &mut e,
            &mut tauq,
            &mut taup,
            &mut work,
            &params,
        )
        .unwrap();
        let plan = compute_plan(m, n, Some(lwork), &params);
        assert!(optimal == plan.optimal_workspace());
        assert!(work[0] == E::from_real(E::Real::from_f64(optimal as f64)));

        // padding rows are left alone
        for j in 0..n {
            for i in m..lda {
                assert!(a[i + j * lda] == a_orig[i + j * lda]);
            }
        }

        let mut native = Mat::from_fn(m, n, |i, j| a_orig[i + j * lda]);
        let mut d_native = vec![E::Real::zero(); size];
        let mut e_native = vec![E::Real::zero(); size - 1];
        let mut tauq_native = vec![E::zero(); size];
        let mut taup_native = vec![E::zero(); size];
        bidiag_in_place(
            native.as_mut(),
            &mut d_native,
            &mut e_native,
            &mut tauq_native,
            &mut taup_native,
            &plan,
            Parallelism::None,
            dyn_stack::PodStack::new(&mut dyn_stack::GlobalPodBuffer::new(
                bidiag_in_place_req::<E>(m, n, &plan).unwrap(),
            )),
        );

        let tol = E::Real::from_f64(1e-10);
        let close = |lhs: E, rhs: E| ComplexField::abs(lhs - rhs) < tol;
        for i in 0..size {
            assert!(close(E::from_real(d[i]), E::from_real(d_native[i])));
            assert!(close(tauq[i], tauq_native[i]));
            assert!(close(taup[i], taup_native[i]));
        }
        for i in 0..size - 1 {
            assert!(close(E::from_real(e[i]), E::from_real(e_native[i])));
        }
        for j in 0..n {
            for i in 0..m {
                assert!(close(a[i + j * lda], native.read(i, j)));
            }
        }
    }

    #[test]
    fn matches_native_api() {
        let rng = &mut StdRng::seed_from_u64(0);
        for (m, n) in [(200, 150), (150, 200), (20, 10)] {
            check_matches_native::<f64>(rng, m, n, "DGEBRD");
        }
    }

    #[test]
    fn matches_native_api_complex() {
        let rng = &mut StdRng::seed_from_u64(2);
        for (m, n) in [(180, 140), (140, 180), (10, 20)] {
            check_matches_native::<c64>(rng, m, n, "ZGEBRD");
        }
    }

    #[test]
    fn short_workspace_still_reduces() {
        let rng = &mut StdRng::seed_from_u64(1);
        let params = BidiagParams::default();
        let (m, n) = (300, 260);
        let a_orig = random(rng, m * n);

        let mut reduce = |lwork: usize| {
            let mut a = a_orig.clone();
            let mut d = vec![0.0; n];
            let mut e = vec![0.0; n - 1];
            let mut tauq = vec![0.0; n];
            let mut taup = vec![0.0; n];
            let mut work = vec![0.0; lwork];
            let optimal = gebrd::<f64, _>(
                m as isize,
                n as isize,
                &mut a,
                m as isize,
                &mut d,
                &mut e,
                &mut tauq,
                &mut taup,
                &mut work,
                &params,
            )
            .unwrap();
            (optimal, d, e)
        };

        let (optimal, d_full, e_full) = reduce((m + n) * 32);
        assert!(optimal == (m + n) * 32);

        // a smaller block size, and no blocking at all
        for lwork in [(m + n) * 5, m] {
            let (optimal_short, d, e) = reduce(lwork);
            assert!(optimal_short == optimal);
            for i in 0..n {
                assert_approx_eq!(d[i], d_full[i], 1e-10);
            }
            for i in 0..n - 1 {
                assert_approx_eq!(e[i], e_full[i], 1e-10);
            }
        }
    }
}
