use crate::{
    assert,
    linalg::{
        householder::{
            apply_householder_on_the_left_in_place, apply_householder_on_the_right_in_place,
        },
        temp_mat_req, temp_mat_uninit,
    },
    ComplexField, Conj, MatMut, MatRef, Parallelism,
};
use dyn_stack::{PodStack, SizeOverflow, StackReq};
use reborrow::*;

/// Computes the size and alignment of the workspace required to apply $Q$ or $Q^H$ to a matrix
/// with `rhs_ncols` columns.
pub fn apply_q_on_the_left_in_place_req<E: ComplexField>(
    rhs_ncols: usize,
) -> Result<StackReq, SizeOverflow> {
    temp_mat_req::<E>(rhs_ncols, 1)
}

/// Computes the size and alignment of the workspace required to apply $P$ or $P^H$ to a matrix
/// with `rhs_nrows` rows, given the factors of a matrix with `ncols` columns.
pub fn apply_p_on_the_right_in_place_req<E: ComplexField>(
    ncols: usize,
    rhs_nrows: usize,
) -> Result<StackReq, SizeOverflow> {
    StackReq::try_all_of([temp_mat_req::<E>(ncols, 1)?, temp_mat_req::<E>(rhs_nrows, 1)?])
}

/// Computes the size and alignment of the workspace required by [`form_q`], for the factors
/// of a matrix with `nrows` rows.
pub fn form_q_req<E: ComplexField>(nrows: usize) -> Result<StackReq, SizeOverflow> {
    apply_q_on_the_left_in_place_req::<E>(nrows)
}

/// Computes the size and alignment of the workspace required by [`form_p`], for the factors
/// of a matrix with `ncols` columns.
pub fn form_p_req<E: ComplexField>(ncols: usize) -> Result<StackReq, SizeOverflow> {
    apply_p_on_the_right_in_place_req::<E>(ncols, ncols)
}

/// Computes $Q M$ (or $Q^H M$ if `conj == Conj::Yes`) and stores the result in `mat`, where $Q$
/// is the left unitary factor described by `factors` and `tauq`, as returned by
/// [`bidiag_in_place`](super::bidiag_in_place).
#[track_caller]
pub fn apply_q_on_the_left_in_place<E: ComplexField>(
    factors: MatRef<'_, E>,
    tauq: &[E],
    conj: Conj,
    mut mat: MatMut<'_, E>,
    parallelism: Parallelism,
    stack: PodStack<'_>,
) {
    let m = factors.nrows();
    let n = factors.ncols();
    let size = Ord::min(m, n);
    assert!(all(tauq.len() == size, mat.nrows() == m));

    // number of reflectors, and offset of the first row they act on
    let (count, offset) = if m >= n { (n, 0) } else { (m.saturating_sub(1), 1) };

    let (mut scratch, _) = temp_mat_uninit::<E>(mat.ncols(), 1, stack);

    let mut apply = |j: usize| {
        let start = j + offset;
        let tau = match conj {
            Conj::Yes => tauq[j].conj(),
            Conj::No => tauq[j],
        };
        apply_householder_on_the_left_in_place(
            mat.rb_mut().subrows_mut(start, m - start),
            tau,
            factors.col(j).subrows(start + 1, m - start - 1),
            scratch.rb_mut(),
            parallelism,
        );
    };

    match conj {
        // Q M = H(0) (H(1) (... M))
        Conj::No => (0..count).rev().for_each(&mut apply),
        // Q^H M = H(k-1)^H (... (H(0)^H M))
        Conj::Yes => (0..count).for_each(&mut apply),
    }
}

/// Computes $M P$ (or $M P^H$ if `conj == Conj::Yes`) and stores the result in `mat`, where $P$
/// is the right unitary factor described by `factors` and `taup`, as returned by
/// [`bidiag_in_place`](super::bidiag_in_place).
#[track_caller]
pub fn apply_p_on_the_right_in_place<E: ComplexField>(
    factors: MatRef<'_, E>,
    taup: &[E],
    conj: Conj,
    mut mat: MatMut<'_, E>,
    parallelism: Parallelism,
    stack: PodStack<'_>,
) {
    let m = factors.nrows();
    let n = factors.ncols();
    let size = Ord::min(m, n);
    assert!(all(taup.len() == size, mat.ncols() == n));

    let (count, offset) = if m >= n { (n.saturating_sub(1), 1) } else { (m, 0) };

    let (mut essential, stack) = temp_mat_uninit::<E>(n, 1, stack);
    let (mut scratch, _) = temp_mat_uninit::<E>(mat.nrows(), 1, stack);

    let mut apply = |j: usize| {
        let start = j + offset;
        let len = n - start - 1;
        let tau = match conj {
            Conj::Yes => taup[j].conj(),
            Conj::No => taup[j],
        };

        // the rows of the factors hold the conjugated reflectors
        let mut essential = essential.rb_mut().subrows_mut(0, len);
        essential.copy_from(factors.row(j).subcols(start + 1, len).transpose());
        essential.conjugate_in_place();

        apply_householder_on_the_right_in_place(
            mat.rb_mut().subcols_mut(start, n - start),
            tau,
            essential.rb(),
            scratch.rb_mut(),
            parallelism,
        );
    };

    match conj {
        // M P = ((M G(0)) G(1)) ...
        Conj::No => (0..count).for_each(&mut apply),
        // M P^H = ((M G(k-1)^H) ...) G(0)^H
        Conj::Yes => (0..count).rev().for_each(&mut apply),
    }
}

/// Computes the `nrows × nrows` unitary matrix $Q$ from the factors of the bidiagonal reduction
/// of an `nrows × ncols` matrix, and stores it in `q`.
#[track_caller]
pub fn form_q<E: ComplexField>(
    factors: MatRef<'_, E>,
    tauq: &[E],
    mut q: MatMut<'_, E>,
    parallelism: Parallelism,
    stack: PodStack<'_>,
) {
    let m = factors.nrows();
    assert!(all(q.nrows() == m, q.ncols() == m));

    q.fill_zero();
    for i in 0..m {
        q.write(i, i, E::one());
    }
    apply_q_on_the_left_in_place(factors, tauq, Conj::No, q, parallelism, stack);
}

/// Computes the `ncols × ncols` unitary matrix $P$ from the factors of the bidiagonal reduction
/// of an `nrows × ncols` matrix, and stores it in `p`.
#[track_caller]
pub fn form_p<E: ComplexField>(
    factors: MatRef<'_, E>,
    taup: &[E],
    mut p: MatMut<'_, E>,
    parallelism: Parallelism,
    stack: PodStack<'_>,
) {
    let n = factors.ncols();
    assert!(all(p.nrows() == n, p.ncols() == n));

    p.fill_zero();
    for i in 0..n {
        p.write(i, i, E::one());
    }
    apply_p_on_the_right_in_place(factors, taup, Conj::No, p, parallelism, stack);
}
