//! Householder reflections.
//!
//! A Householder reflection is linear transformation that describes a reflection about a
//! hyperplane that crosses the origin of the space.
//!
//! The reflections in this module follow the LAPACK convention: they are written as
//! $$H = I - \tau v v^H,$$
//! where $v_0 = 1$ and $\tau$ is a scalar (complex for complex matrices). Only $v_{1\dots}$, the
//! *essential* part of the vector, is stored. $H$ is unitary but not hermitian in general, so
//! applying $H^H$ amounts to applying the reflection with $\bar\tau$.
//!
//! A reflection with $\tau = 0$ is the identity.

use crate::{
    assert,
    linalg::{matmul::matmul_with_conj, reductions::norm_l2},
    ComplexField, Conj, MatMut, MatRef, Parallelism, RealField,
};
use reborrow::*;

/// Maximum number of times a tiny vector is scaled up before the reflection is computed anyway.
const MAX_RESCALE_STEPS: usize = 20;

/// `sqrt(x^2 + y^2 + z^2)` without intermediate overflow.
#[inline]
fn hypot3<T: RealField>(x: T, y: T, z: T) -> T {
    let x = x.abs();
    let y = y.abs();
    let z = z.abs();
    let w = x.max(y).max(z);
    if w == T::zero() {
        // also propagates the sum when one of the values is infinite
        x + y + z
    } else {
        let x = x / w;
        let y = y / w;
        let z = z / w;
        w * (x * x + y * y + z * z).sqrt()
    }
}

#[inline]
fn scale_in_place<E: ComplexField>(mut vector: MatMut<'_, E>, factor: E) {
    for j in 0..vector.ncols() {
        for i in 0..vector.nrows() {
            unsafe {
                let value = vector.rb().read_unchecked(i, j) * factor;
                vector.write_unchecked(i, j, value);
            }
        }
    }
}

/// Computes the Householder reflection $H = I - \tau v v^H$ such that
/// $$H^H \begin{pmatrix}\alpha \\ x\end{pmatrix} = \begin{pmatrix}\beta \\ 0\end{pmatrix},$$
/// with $\beta$ real. $\alpha$ is given by `head` and $x$ by `essential`, which is overwritten
/// with $v_{1\dots}$. Returns $(\tau, \beta)$.
///
/// If $x = 0$ and $\alpha$ is real, $\tau = 0$ and $H$ is the identity. Otherwise
/// $1 \le \operatorname{Re}(\tau) \le 2$ and $|\tau - 1| \le 1$.
///
/// When $|\beta|$ would fall below `min_positive / epsilon`, the input is scaled up (at most
/// twenty times) before the reflection is computed, and $\beta$ is scaled back afterwards.
///
/// # Panics
///
/// Panics if `essential` is not a column vector.
#[track_caller]
pub fn make_householder_in_place<E: ComplexField>(
    mut essential: MatMut<'_, E>,
    head: E,
) -> (E, E::Real) {
    assert!(essential.ncols() == 1);

    let zero = E::Real::zero();
    let one = E::Real::one();

    let mut tail_norm = norm_l2(essential.rb());
    let mut alpha = head;

    if tail_norm == zero && alpha.imag() == zero {
        return (E::zero(), alpha.real());
    }

    let safe_min = E::Real::min_positive() / E::Real::epsilon();
    let safe_min_inv = one / safe_min;

    let mut beta = -hypot3(alpha.real(), alpha.imag(), tail_norm).copysign(alpha.real());

    let mut rescale_steps = 0;
    if beta.abs() < safe_min {
        // beta may be inaccurate, scale x and recompute it
        loop {
            rescale_steps += 1;
            scale_in_place(essential.rb_mut(), E::from_real(safe_min_inv));
            beta = beta * safe_min_inv;
            alpha = alpha.scale_real(safe_min_inv);
            if !(beta.abs() < safe_min && rescale_steps < MAX_RESCALE_STEPS) {
                break;
            }
        }
        tail_norm = norm_l2(essential.rb());
        beta = -hypot3(alpha.real(), alpha.imag(), tail_norm).copysign(alpha.real());
    }

    let tau = E::from_parts((beta - alpha.real()) / beta, -alpha.imag() / beta);
    scale_in_place(essential, (alpha - E::from_real(beta)).inv());

    for _ in 0..rescale_steps {
        beta = beta * safe_min;
    }

    (tau, beta)
}

/// Computes $H M$ and stores the result in `matrix`, where $H = I - \tau v v^H$, $v_0 = 1$ and
/// $v_{1\dots}$ is `essential`.
///
/// To apply $H^H$ instead, pass `tau.conj()`. `scratch` must be a column with at least
/// `matrix.ncols()` rows; its contents are overwritten.
///
/// # Panics
///
/// Panics if `essential` is not a column of `matrix.nrows() - 1` rows, or if `scratch` is too
/// short.
#[track_caller]
pub fn apply_householder_on_the_left_in_place<E: ComplexField>(
    matrix: MatMut<'_, E>,
    tau: E,
    essential: MatRef<'_, E>,
    scratch: MatMut<'_, E>,
    parallelism: Parallelism,
) {
    let m = matrix.nrows();
    let n = matrix.ncols();
    assert!(all(
        m >= 1,
        essential.ncols() == 1,
        essential.nrows() == m - 1,
        scratch.ncols() == 1,
        scratch.nrows() >= n,
    ));

    if tau == E::zero() || n == 0 {
        return;
    }

    let (mut first, mut rest) = matrix.split_at_row_mut(1);
    // w = v^H M, stored as a row
    let mut w = scratch.subrows_mut(0, n).transpose_mut();
    w.copy_from(first.rb());
    matmul_with_conj(
        w.rb_mut(),
        essential.transpose(),
        Conj::Yes,
        rest.rb(),
        Conj::No,
        Some(E::one()),
        E::one(),
        parallelism,
    );

    for j in 0..n {
        let value = first.read(0, j) - tau * w.read(0, j);
        first.write(0, j, value);
    }
    matmul_with_conj(
        rest.rb_mut(),
        essential,
        Conj::No,
        w.rb(),
        Conj::No,
        Some(E::one()),
        -tau,
        parallelism,
    );
}

/// Computes $M H$ and stores the result in `matrix`, where $H = I - \tau v v^H$, $v_0 = 1$ and
/// $v_{1\dots}$ is `essential`.
///
/// `scratch` must be a column with at least `matrix.nrows()` rows; its contents are overwritten.
///
/// # Panics
///
/// Panics if `essential` is not a column of `matrix.ncols() - 1` rows, or if `scratch` is too
/// short.
#[track_caller]
pub fn apply_householder_on_the_right_in_place<E: ComplexField>(
    matrix: MatMut<'_, E>,
    tau: E,
    essential: MatRef<'_, E>,
    scratch: MatMut<'_, E>,
    parallelism: Parallelism,
) {
    let m = matrix.nrows();
    let n = matrix.ncols();
    assert!(all(
        n >= 1,
        essential.ncols() == 1,
        essential.nrows() == n - 1,
        scratch.ncols() == 1,
        scratch.nrows() >= m,
    ));

    if tau == E::zero() || m == 0 {
        return;
    }

    let (mut first, mut rest) = matrix.split_at_col_mut(1);
    // w = M v
    let mut w = scratch.subrows_mut(0, m);
    w.copy_from(first.rb());
    matmul_with_conj(
        w.rb_mut(),
        rest.rb(),
        Conj::No,
        essential,
        Conj::No,
        Some(E::one()),
        E::one(),
        parallelism,
    );

    for i in 0..m {
        let value = first.read(i, 0) - tau * w.read(i, 0);
        first.write(i, 0, value);
    }
    matmul_with_conj(
        rest.rb_mut(),
        w.rb(),
        Conj::No,
        essential.transpose(),
        Conj::Yes,
        Some(E::one()),
        -tau,
        parallelism,
    );
}
