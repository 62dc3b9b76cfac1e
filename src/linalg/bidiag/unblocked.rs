use crate::{
    assert,
    linalg::householder::{
        apply_householder_on_the_left_in_place, apply_householder_on_the_right_in_place,
        make_householder_in_place,
    },
    ComplexField, MatMut, Parallelism,
};
use reborrow::*;

/// Reduces `a` to bidiagonal form one reflector at a time, applying each reflector to the
/// trailing matrix as soon as it is generated.
///
/// On exit, `d` and `e` hold the diagonal and off-diagonal of the bidiagonal matrix, which is
/// upper bidiagonal if `a.nrows() >= a.ncols()` and lower bidiagonal otherwise. They are also
/// written back on the corresponding diagonals of `a`. The remaining entries of `a` and the
/// factors in `tauq` and `taup` describe the reflectors, as documented in [`super`].
///
/// `scratch` is a column with at least `max(a.nrows(), a.ncols())` rows.
#[track_caller]
pub fn bidiag_unblocked_in_place<E: ComplexField>(
    mut a: MatMut<'_, E>,
    d: &mut [E::Real],
    e: &mut [E::Real],
    tauq: &mut [E],
    taup: &mut [E],
    mut scratch: MatMut<'_, E>,
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
        scratch.ncols() == 1,
        scratch.nrows() >= Ord::max(m, n),
    ));

    if m >= n {
        for i in 0..n {
            let a_cur = a.rb_mut().submatrix_mut(i, i, m - i, n - i);
            let (a_col, mut a_right) = a_cur.split_at_col_mut(1);
            let (mut a_head, mut a_essential) = a_col.split_at_row_mut(1);

            // H(i) annihilates a[i+1.., i]
            let (tau, beta) = make_householder_in_place(a_essential.rb_mut(), a_head.read(0, 0));
            tauq[i] = tau;
            d[i] = beta;

            apply_householder_on_the_left_in_place(
                a_right.rb_mut(),
                tau.conj(),
                a_essential.rb(),
                scratch.rb_mut(),
                parallelism,
            );
            a_head.write(0, 0, E::from_real(beta));

            if i + 1 < n {
                // G(i) annihilates a[i, i+2..]
                let (mut a_row, a_next) = a_right.split_at_row_mut(1);
                a_row.conjugate_in_place();
                let (mut row_head, mut row_essential) = a_row.split_at_col_mut(1);

                let (tau, beta) = make_householder_in_place(
                    row_essential.rb_mut().transpose_mut(),
                    row_head.read(0, 0),
                );
                taup[i] = tau;
                e[i] = beta;

                apply_householder_on_the_right_in_place(
                    a_next,
                    tau,
                    row_essential.rb().transpose(),
                    scratch.rb_mut(),
                    parallelism,
                );
                row_essential.conjugate_in_place();
                row_head.write(0, 0, E::from_real(beta));
            } else {
                taup[i] = E::zero();
            }
        }
    } else {
        for i in 0..m {
            let a_cur = a.rb_mut().submatrix_mut(i, i, m - i, n - i);
            let (mut a_row, mut a_below) = a_cur.split_at_row_mut(1);

            // G(i) annihilates a[i, i+1..]
            a_row.conjugate_in_place();
            let (mut row_head, mut row_essential) = a_row.split_at_col_mut(1);
            let (tau, beta) = make_householder_in_place(
                row_essential.rb_mut().transpose_mut(),
                row_head.read(0, 0),
            );
            taup[i] = tau;
            d[i] = beta;

            apply_householder_on_the_right_in_place(
                a_below.rb_mut(),
                tau,
                row_essential.rb().transpose(),
                scratch.rb_mut(),
                parallelism,
            );
            row_essential.conjugate_in_place();
            row_head.write(0, 0, E::from_real(beta));

            if i + 1 < m {
                // H(i) annihilates a[i+2.., i]
                let (a_col, a_next) = a_below.split_at_col_mut(1);
                let (mut col_head, mut col_essential) = a_col.split_at_row_mut(1);

                let (tau, beta) =
                    make_householder_in_place(col_essential.rb_mut(), col_head.read(0, 0));
                tauq[i] = tau;
                e[i] = beta;

                apply_householder_on_the_left_in_place(
                    a_next,
                    tau.conj(),
                    col_essential.rb(),
                    scratch.rb_mut(),
                    parallelism,
                );
                col_head.write(0, 0, E::from_real(beta));
            } else {
                tauq[i] = E::zero();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{assert, c64, Mat};
    use alloc::vec;

    #[test]
    fn single_column() {
        let mut a = Mat::from_fn(2, 1, |i, _| [3.0f64, 4.0][i]);
        let mut d = [0.0];
        let mut tauq = [0.0];
        let mut taup = [7.0];
        let mut scratch = Mat::<f64>::zeros(2, 1);
        bidiag_unblocked_in_place(
            a.as_mut(),
            &mut d,
            &mut [],
            &mut tauq,
            &mut taup,
            scratch.as_mut(),
            Parallelism::None,
        );

        assert!((d[0] + 5.0).abs() < 1e-14);
        assert!((tauq[0] - 1.6).abs() < 1e-14);
        assert!(taup[0] == 0.0);
        assert!(a.read(0, 0) == d[0]);
        assert!((a.read(1, 0) - 0.5).abs() < 1e-14);
    }

    #[test]
    fn single_row() {
        let mut a = Mat::from_fn(1, 2, |_, j| [3.0f64, 4.0][j]);
        let mut d = [0.0];
        let mut tauq = [7.0];
        let mut taup = [0.0];
        let mut scratch = Mat::<f64>::zeros(2, 1);
        bidiag_unblocked_in_place(
            a.as_mut(),
            &mut d,
            &mut [],
            &mut tauq,
            &mut taup,
            scratch.as_mut(),
            Parallelism::None,
        );

        assert!((d[0] + 5.0).abs() < 1e-14);
        assert!((taup[0] - 1.6).abs() < 1e-14);
        assert!(tauq[0] == 0.0);
        assert!(a.read(0, 0) == d[0]);
        assert!((a.read(0, 1) - 0.5).abs() < 1e-14);
    }

    #[test]
    fn diagonals_are_written_back() {
        for (m, n) in [(6, 4), (4, 6)] {
            let mut a = Mat::from_fn(m, n, |i, j| {
                c64::new((i + 2 * j) as f64 * 0.25 - 1.0, (i * j) as f64 * 0.125)
            });
            let size = Ord::min(m, n);
            let mut d = vec![0.0; size];
            let mut e = vec![0.0; size - 1];
            let mut tauq = vec![c64::new(0.0, 0.0); size];
            let mut taup = vec![c64::new(0.0, 0.0); size];
            let mut scratch = Mat::<c64>::zeros(Ord::max(m, n), 1);
            bidiag_unblocked_in_place(
                a.as_mut(),
                &mut d,
                &mut e,
                &mut tauq,
                &mut taup,
                scratch.as_mut(),
                Parallelism::None,
            );

            for i in 0..size {
                assert!(a.read(i, i) == c64::new(d[i], 0.0));
            }
            for i in 0..size - 1 {
                let stored = if m >= n { a.read(i, i + 1) } else { a.read(i + 1, i) };
                assert!(stored == c64::new(e[i], 0.0));
            }
            if m >= n {
                assert!(taup[size - 1] == c64::new(0.0, 0.0));
            } else {
                assert!(tauq[size - 1] == c64::new(0.0, 0.0));
            }
        }
    }
}
