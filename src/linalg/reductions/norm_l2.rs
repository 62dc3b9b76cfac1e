use crate::{mat::MatRef, ComplexField, RealField};

/// Returns the Frobenius norm of `mat`, i.e. the euclidean norm of its elements seen as one
/// vector.
///
/// Three sums are accumulated at once: one of the plain squares, and two of the squares after
/// scaling by `sqrt(min_positive)` and its inverse. The result is read from whichever of them
/// neither overflowed nor underflowed, so the norm is accurate over the whole exponent range.
pub fn norm_l2<E: ComplexField>(mut mat: MatRef<'_, E>) -> E::Real {
    if mat.ncols() > 1 && mat.col_stride().unsigned_abs() < mat.row_stride().unsigned_abs() {
        mat = mat.transpose();
    }

    let zero = E::Real::zero();
    let one = E::Real::one();

    if mat.nrows() == 0 || mat.ncols() == 0 {
        return zero;
    }

    let to_small = E::Real::min_positive_sqrt();
    let to_big = E::Real::min_positive_sqrt_inv();

    let mut acc_small = zero;
    let mut acc = zero;
    let mut acc_big = zero;

    for j in 0..mat.ncols() {
        for i in 0..mat.nrows() {
            let val = unsafe { mat.read_unchecked(i, j) };
            acc_small = acc_small + val.scale_real(to_small).abs2();
            acc = acc + val.abs2();
            acc_big = acc_big + val.scale_real(to_big).abs2();
        }
    }

    if acc_small >= one {
        acc_small.sqrt() * to_big
    } else if acc_big <= one {
        acc_big.sqrt() * to_small
    } else {
        acc.sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{assert, c64, Mat};

    #[test]
    fn test_norm_l2() {
        let relative_err = |a: f64, b: f64| (a - b).abs() / f64::max(a.abs(), b.abs());

        for (m, n) in [(9, 10), (1023, 5), (42, 1)] {
            for factor in [0.0, 1.0, 1e30, 1e250, 1e-30, 1e-250] {
                let mat = Mat::from_fn(m, n, |i, j| factor * ((i + j) as f64));
                let mut target = 0.0;
                for j in 0..n {
                    for i in 0..m {
                        target = f64::hypot(mat.read(i, j), target);
                    }
                }

                if factor == 0.0 {
                    assert!(norm_l2(mat.as_ref()) == target);
                } else {
                    assert!(relative_err(norm_l2(mat.as_ref()), target) < 1e-14);
                }
                assert!(norm_l2(mat.as_ref().transpose()) == norm_l2(mat.as_ref()));
            }
        }
    }

    #[test]
    fn complex_and_empty() {
        let mat = Mat::from_fn(2, 1, |i, _| if i == 0 { c64::new(3.0, 4.0) } else { c64::new(0.0, 12.0) });
        assert!((norm_l2(mat.as_ref()) - 13.0).abs() < 1e-14);
        assert!(norm_l2(Mat::<f64>::zeros(0, 3).as_ref()) == 0.0);
    }
}
