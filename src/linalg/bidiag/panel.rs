use crate::{
    assert,
    linalg::{
        householder::make_householder_in_place,
        matmul::{matmul, matmul_with_conj},
    },
    ComplexField, Conj, MatMut, Parallelism,
};
use reborrow::*;

#[inline]
fn scale_in_place<E: ComplexField>(mut mat: MatMut<'_, E>, factor: E) {
    for j in 0..mat.ncols() {
        for i in 0..mat.nrows() {
            let value = mat.read(i, j) * factor;
            mat.write(i, j, value);
        }
    }
}

/// Reduces the first `nb = d.len()` rows and columns of `a` to bidiagonal form, without
/// updating the rest of the matrix.
///
/// Returns the matrices `x` (`a.nrows() × nb`) and `y` (`a.ncols() × nb`) such that the
/// trailing block is brought up to date by
/// $$A_{22} := A_{22} - V_2 Y_2^H - X_2 U_2,$$
/// where $V$ and $U$ hold the left and right reflectors computed by this function, stored in the
/// leading columns and rows of `a`, and the subscript $2$ denotes the rows past `nb`.
///
/// The diagonal and off-diagonal entries of the processed block are left holding the unit
/// entries of the reflectors, so that the caller can use the panel in the update directly. It is
/// up to the caller to write back `d` and `e` afterwards. The leading rows of `x` and `y` are
/// used as scratch space.
#[track_caller]
pub fn bidiag_panel_in_place<E: ComplexField>(
    mut a: MatMut<'_, E>,
    d: &mut [E::Real],
    e: &mut [E::Real],
    tauq: &mut [E],
    taup: &mut [E],
    mut x: MatMut<'_, E>,
    mut y: MatMut<'_, E>,
    parallelism: Parallelism,
) {
    let m = a.nrows();
    let n = a.ncols();
    let nb = d.len();

    assert!(all(
        nb <= Ord::min(m, n),
        e.len() == nb,
        tauq.len() == nb,
        taup.len() == nb,
        x.nrows() == m,
        x.ncols() >= nb,
        y.nrows() == n,
        y.ncols() >= nb,
    ));

    let one = E::one();

    if m >= n {
        for i in 0..nb {
            let (a_left, a_right) = a.rb_mut().split_at_col_mut(i);
            let (a_col, mut a_rest) = a_right.split_at_col_mut(1);
            let (a_col_top, mut a_col_bot) = a_col.split_at_row_mut(i);

            let (x_left, x_right) = x.rb_mut().split_at_col_mut(i);
            let x_col = x_right.col_mut(0);
            let (y_left, y_right) = y.rb_mut().split_at_col_mut(i);
            let y_col = y_right.col_mut(0);

            // bring a[i.., i] up to date
            matmul_with_conj(
                a_col_bot.rb_mut(),
                a_left.rb().subrows(i, m - i),
                Conj::No,
                y_left.rb().row(i).transpose(),
                Conj::Yes,
                Some(one),
                -one,
                parallelism,
            );
            matmul(
                a_col_bot.rb_mut(),
                x_left.rb().subrows(i, m - i),
                a_col_top.rb(),
                Some(one),
                -one,
                parallelism,
            );

            let (mut a_head, mut a_essential) = a_col_bot.rb_mut().split_at_row_mut(1);
            let (tau, beta) = make_householder_in_place(a_essential.rb_mut(), a_head.read(0, 0));
            tauq[i] = tau;
            d[i] = beta;

            if i + 1 == n {
                taup[i] = E::zero();
                continue;
            }

            a_head.write(0, 0, one);
            let v = a_col_bot.rb();

            // y[i+1.., i]
            let (mut y_top, y_bot) = y_col.split_at_row_mut(i);
            let (_, mut y_bot) = y_bot.split_at_row_mut(1);

            matmul_with_conj(
                y_bot.rb_mut(),
                a_rest.rb().subrows(i, m - i).transpose(),
                Conj::Yes,
                v,
                Conj::No,
                None,
                one,
                parallelism,
            );
            matmul_with_conj(
                y_top.rb_mut(),
                a_left.rb().subrows(i, m - i).transpose(),
                Conj::Yes,
                v,
                Conj::No,
                None,
                one,
                parallelism,
            );
            matmul(
                y_bot.rb_mut(),
                y_left.rb().subrows(i + 1, n - i - 1),
                y_top.rb(),
                Some(one),
                -one,
                parallelism,
            );
            matmul_with_conj(
                y_top.rb_mut(),
                x_left.rb().subrows(i, m - i).transpose(),
                Conj::Yes,
                v,
                Conj::No,
                None,
                one,
                parallelism,
            );
            matmul_with_conj(
                y_bot.rb_mut(),
                a_rest.rb().subrows(0, i).transpose(),
                Conj::Yes,
                y_top.rb(),
                Conj::No,
                Some(one),
                -one,
                parallelism,
            );
            scale_in_place(y_bot.rb_mut(), tau);

            // bring a[i, i+1..] up to date
            let (a_rest_top, a_rest_bot) = a_rest.rb_mut().split_at_row_mut(i);
            let (mut a_row, a_next) = a_rest_bot.split_at_row_mut(1);

            a_row.conjugate_in_place();
            matmul_with_conj(
                a_row.rb_mut(),
                a_left.rb().row(i),
                Conj::Yes,
                y_left.rb().subrows(i + 1, n - i - 1).transpose(),
                Conj::No,
                Some(one),
                -one,
                parallelism,
            );
            matmul_with_conj(
                a_row.rb_mut(),
                v.subrows(0, 1),
                Conj::Yes,
                y_bot.rb().transpose(),
                Conj::No,
                Some(one),
                -one,
                parallelism,
            );
            matmul_with_conj(
                a_row.rb_mut(),
                x_left.rb().row(i),
                Conj::Yes,
                a_rest_top.rb(),
                Conj::Yes,
                Some(one),
                -one,
                parallelism,
            );

            let (mut row_head, mut row_essential) = a_row.rb_mut().split_at_col_mut(1);
            let (tau, beta) = make_householder_in_place(
                row_essential.rb_mut().transpose_mut(),
                row_head.read(0, 0),
            );
            taup[i] = tau;
            e[i] = beta;
            row_head.write(0, 0, one);

            // x[i+1.., i]
            let u = a_row.rb().transpose();
            let (x_top, mut x_bot) = x_col.split_at_row_mut(i + 1);
            let (mut x_top, mut x_last) = x_top.split_at_row_mut(i);

            matmul(x_bot.rb_mut(), a_next.rb(), u, None, one, parallelism);
            matmul_with_conj(
                x_top.rb_mut(),
                y_left.rb().subrows(i + 1, n - i - 1).transpose(),
                Conj::Yes,
                u,
                Conj::No,
                None,
                one,
                parallelism,
            );
            matmul_with_conj(
                x_last.rb_mut(),
                y_bot.rb().transpose(),
                Conj::Yes,
                u,
                Conj::No,
                None,
                one,
                parallelism,
            );
            matmul(
                x_bot.rb_mut(),
                a_left.rb().subrows(i + 1, m - i - 1),
                x_top.rb(),
                Some(one),
                -one,
                parallelism,
            );
            matmul(
                x_bot.rb_mut(),
                v.subrows(1, m - i - 1),
                x_last.rb(),
                Some(one),
                -one,
                parallelism,
            );
            matmul(x_top.rb_mut(), a_rest_top.rb(), u, None, one, parallelism);
            matmul(
                x_bot.rb_mut(),
                x_left.rb().subrows(i + 1, m - i - 1),
                x_top.rb(),
                Some(one),
                -one,
                parallelism,
            );
            scale_in_place(x_bot.rb_mut(), tau);

            a_row.conjugate_in_place();
        }
    } else {
        for i in 0..nb {
            let (a_left, a_right) = a.rb_mut().split_at_col_mut(i);
            let (a_right_top, a_right_bot) = a_right.split_at_row_mut(i);
            let (mut a_row, mut a_below) = a_right_bot.split_at_row_mut(1);

            let (x_left, x_right) = x.rb_mut().split_at_col_mut(i);
            let x_col = x_right.col_mut(0);
            let (y_left, y_right) = y.rb_mut().split_at_col_mut(i);
            let y_col = y_right.col_mut(0);

            // bring a[i, i..] up to date
            a_row.conjugate_in_place();
            matmul_with_conj(
                a_row.rb_mut(),
                a_left.rb().row(i),
                Conj::Yes,
                y_left.rb().subrows(i, n - i).transpose(),
                Conj::No,
                Some(one),
                -one,
                parallelism,
            );
            matmul_with_conj(
                a_row.rb_mut(),
                x_left.rb().row(i),
                Conj::Yes,
                a_right_top.rb(),
                Conj::Yes,
                Some(one),
                -one,
                parallelism,
            );

            let (mut row_head, mut row_essential) = a_row.rb_mut().split_at_col_mut(1);
            let (tau, beta) = make_householder_in_place(
                row_essential.rb_mut().transpose_mut(),
                row_head.read(0, 0),
            );
            taup[i] = tau;
            d[i] = beta;

            if i + 1 == m {
                a_row.conjugate_in_place();
                tauq[i] = E::zero();
                continue;
            }

            row_head.write(0, 0, one);

            // x[i+1.., i]
            let u = a_row.rb().transpose();
            let (mut x_top, x_bot) = x_col.split_at_row_mut(i);
            let (_, mut x_bot) = x_bot.split_at_row_mut(1);

            matmul(x_bot.rb_mut(), a_below.rb(), u, None, one, parallelism);
            matmul_with_conj(
                x_top.rb_mut(),
                y_left.rb().subrows(i, n - i).transpose(),
                Conj::Yes,
                u,
                Conj::No,
                None,
                one,
                parallelism,
            );
            matmul(
                x_bot.rb_mut(),
                a_left.rb().subrows(i + 1, m - i - 1),
                x_top.rb(),
                Some(one),
                -one,
                parallelism,
            );
            matmul(x_top.rb_mut(), a_right_top.rb(), u, None, one, parallelism);
            matmul(
                x_bot.rb_mut(),
                x_left.rb().subrows(i + 1, m - i - 1),
                x_top.rb(),
                Some(one),
                -one,
                parallelism,
            );
            scale_in_place(x_bot.rb_mut(), tau);

            a_row.conjugate_in_place();

            // bring a[i+1.., i] up to date
            let (mut a_col, a_next) = a_below.rb_mut().split_at_col_mut(1);
            matmul_with_conj(
                a_col.rb_mut(),
                a_left.rb().subrows(i + 1, m - i - 1),
                Conj::No,
                y_left.rb().row(i).transpose(),
                Conj::Yes,
                Some(one),
                -one,
                parallelism,
            );
            matmul(
                a_col.rb_mut(),
                x_left.rb().subrows(i + 1, m - i - 1),
                a_right_top.rb().col(0),
                Some(one),
                -one,
                parallelism,
            );
            matmul(
                a_col.rb_mut(),
                x_bot.rb(),
                a_row.rb().subcols(0, 1),
                Some(one),
                -one,
                parallelism,
            );

            let (mut col_head, mut col_essential) = a_col.rb_mut().split_at_row_mut(1);
            let (tau, beta) =
                make_householder_in_place(col_essential.rb_mut(), col_head.read(0, 0));
            tauq[i] = tau;
            e[i] = beta;
            col_head.write(0, 0, one);

            // y[i+1.., i]
            let w = a_col.rb();
            let (mut y_top, y_bot) = y_col.split_at_row_mut(i);
            let (mut y_mid, mut y_bot) = y_bot.split_at_row_mut(1);

            matmul_with_conj(
                y_bot.rb_mut(),
                a_next.rb().transpose(),
                Conj::Yes,
                w,
                Conj::No,
                None,
                one,
                parallelism,
            );
            matmul_with_conj(
                y_top.rb_mut(),
                a_left.rb().subrows(i + 1, m - i - 1).transpose(),
                Conj::Yes,
                w,
                Conj::No,
                None,
                one,
                parallelism,
            );
            matmul(
                y_bot.rb_mut(),
                y_left.rb().subrows(i + 1, n - i - 1),
                y_top.rb(),
                Some(one),
                -one,
                parallelism,
            );
            matmul_with_conj(
                y_top.rb_mut(),
                x_left.rb().subrows(i + 1, m - i - 1).transpose(),
                Conj::Yes,
                w,
                Conj::No,
                None,
                one,
                parallelism,
            );
            matmul_with_conj(
                y_mid.rb_mut(),
                x_bot.rb().transpose(),
                Conj::Yes,
                w,
                Conj::No,
                None,
                one,
                parallelism,
            );
            matmul_with_conj(
                y_bot.rb_mut(),
                a_right_top.rb().subcols(1, n - i - 1).transpose(),
                Conj::Yes,
                y_top.rb(),
                Conj::No,
                Some(one),
                -one,
                parallelism,
            );
            matmul_with_conj(
                y_bot.rb_mut(),
                a_row.rb().subcols(1, n - i - 1).transpose(),
                Conj::Yes,
                y_mid.rb(),
                Conj::No,
                Some(one),
                -one,
                parallelism,
            );
            scale_in_place(y_bot.rb_mut(), tau);
        }
    }
}
