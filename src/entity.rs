//! Scalar traits used by every routine in the crate.
//!
//! Routines are generic over [`ComplexField`], which is implemented for `f32`, `f64`, [`c32`]
//! and [`c64`]. The associated [`ComplexField::Real`] type is the type of the bidiagonal
//! entries, norms and tolerances.

use core::fmt::Debug;
use core::ops::{Add, Div, Mul, Neg, Sub};
use num_complex::Complex;

/// Single precision complex number.
#[allow(non_camel_case_types)]
pub type c32 = Complex<f32>;
/// Double precision complex number.
#[allow(non_camel_case_types)]
pub type c64 = Complex<f64>;

/// Field of real or complex scalars.
pub trait ComplexField:
    Copy
    + Debug
    + PartialEq
    + Send
    + Sync
    + bytemuck::Pod
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
    + 'static
{
    /// Type of the real and imaginary parts.
    type Real: RealField;

    /// `true` if the imaginary part is always zero.
    const IS_REAL: bool;

    fn zero() -> Self;
    fn one() -> Self;

    fn from_real(re: Self::Real) -> Self;
    /// Builds a value from its real and imaginary parts. The imaginary part is dropped for real
    /// types.
    fn from_parts(re: Self::Real, im: Self::Real) -> Self;

    fn real(self) -> Self::Real;
    fn imag(self) -> Self::Real;
    fn conj(self) -> Self;

    /// Squared modulus.
    fn abs2(self) -> Self::Real;
    /// Modulus, computed without intermediate overflow.
    fn abs(self) -> Self::Real;

    fn scale_real(self, factor: Self::Real) -> Self;
    fn inv(self) -> Self;
}

/// Field of real scalars.
pub trait RealField: ComplexField<Real = Self> + PartialOrd {
    fn sqrt(self) -> Self;

    /// Distance from one to the next larger representable value.
    fn epsilon() -> Self;
    /// Smallest positive normal value.
    fn min_positive() -> Self;
    /// `sqrt(min_positive())`.
    fn min_positive_sqrt() -> Self;
    /// `1 / sqrt(min_positive())`.
    fn min_positive_sqrt_inv() -> Self;

    fn from_f64(value: f64) -> Self;

    /// `|self|` with the sign of `sign`.
    #[inline]
    fn copysign(self, sign: Self) -> Self {
        let magnitude = self.abs();
        if sign < Self::zero() {
            -magnitude
        } else {
            magnitude
        }
    }

    #[inline]
    fn max(self, other: Self) -> Self {
        if self >= other {
            self
        } else {
            other
        }
    }
}

macro_rules! impl_real {
    ($ty: ty) => {
        impl ComplexField for $ty {
            type Real = $ty;
            const IS_REAL: bool = true;

            #[inline(always)]
            fn zero() -> Self {
                0.0
            }
            #[inline(always)]
            fn one() -> Self {
                1.0
            }
            #[inline(always)]
            fn from_real(re: Self::Real) -> Self {
                re
            }
            #[inline(always)]
            fn from_parts(re: Self::Real, _im: Self::Real) -> Self {
                re
            }
            #[inline(always)]
            fn real(self) -> Self::Real {
                self
            }
            #[inline(always)]
            fn imag(self) -> Self::Real {
                0.0
            }
            #[inline(always)]
            fn conj(self) -> Self {
                self
            }
            #[inline(always)]
            fn abs2(self) -> Self::Real {
                self * self
            }
            #[inline(always)]
            fn abs(self) -> Self::Real {
                <$ty as num_traits::Float>::abs(self)
            }
            #[inline(always)]
            fn scale_real(self, factor: Self::Real) -> Self {
                self * factor
            }
            #[inline(always)]
            fn inv(self) -> Self {
                1.0 / self
            }
        }

        impl RealField for $ty {
            #[inline(always)]
            fn sqrt(self) -> Self {
                <$ty as num_traits::Float>::sqrt(self)
            }
            #[inline(always)]
            fn epsilon() -> Self {
                <$ty>::EPSILON
            }
            #[inline(always)]
            fn min_positive() -> Self {
                <$ty>::MIN_POSITIVE
            }
            #[inline(always)]
            fn min_positive_sqrt() -> Self {
                <$ty as num_traits::Float>::sqrt(<$ty>::MIN_POSITIVE)
            }
            #[inline(always)]
            fn min_positive_sqrt_inv() -> Self {
                1.0 / <$ty as num_traits::Float>::sqrt(<$ty>::MIN_POSITIVE)
            }
            #[inline(always)]
            fn from_f64(value: f64) -> Self {
                value as $ty
            }
        }
    };
}

macro_rules! impl_complex {
    ($real: ty) => {
        impl ComplexField for Complex<$real> {
            type Real = $real;
            const IS_REAL: bool = false;

            #[inline(always)]
            fn zero() -> Self {
                Complex::new(0.0, 0.0)
            }
            #[inline(always)]
            fn one() -> Self {
                Complex::new(1.0, 0.0)
            }
            #[inline(always)]
            fn from_real(re: Self::Real) -> Self {
                Complex::new(re, 0.0)
            }
            #[inline(always)]
            fn from_parts(re: Self::Real, im: Self::Real) -> Self {
                Complex::new(re, im)
            }
            #[inline(always)]
            fn real(self) -> Self::Real {
                self.re
            }
            #[inline(always)]
            fn imag(self) -> Self::Real {
                self.im
            }
            #[inline(always)]
            fn conj(self) -> Self {
                Complex::new(self.re, -self.im)
            }
            #[inline(always)]
            fn abs2(self) -> Self::Real {
                self.re * self.re + self.im * self.im
            }
            #[inline(always)]
            fn abs(self) -> Self::Real {
                <$real as num_traits::Float>::hypot(self.re, self.im)
            }
            #[inline(always)]
            fn scale_real(self, factor: Self::Real) -> Self {
                Complex::new(self.re * factor, self.im * factor)
            }
            #[inline(always)]
            fn inv(self) -> Self {
                // scaled so that |self|^2 cannot overflow
                let scale = <$real as num_traits::Float>::max(
                    <$real as num_traits::Float>::abs(self.re),
                    <$real as num_traits::Float>::abs(self.im),
                );
                let re = self.re / scale;
                let im = self.im / scale;
                let denom = scale * (re * re + im * im);
                Complex::new(re / denom, -im / denom)
            }
        }
    };
}

impl_real!(f32);
impl_real!(f64);
impl_complex!(f32);
impl_complex!(f64);

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn complex_inverse() {
        let z = c64::new(3.0, -4.0);
        let inv = ComplexField::inv(z);
        let one = z * inv;
        assert_approx_eq!(one.re, 1.0);
        assert_approx_eq!(one.im, 0.0);

        let huge = c64::new(1e300, 1e300);
        let inv = ComplexField::inv(huge);
        assert_approx_eq!(inv.re * 1e300, 0.5);
        assert_approx_eq!(inv.im * 1e300, -0.5);
    }

    #[test]
    fn modulus_does_not_overflow() {
        let z = c64::new(1e200, 1e200);
        assert_approx_eq!(ComplexField::abs(z) / 1e200, core::f64::consts::SQRT_2);
        assert_eq!(ComplexField::abs(-2.5_f32), 2.5);
    }

    #[test]
    fn copysign() {
        assert_eq!(RealField::copysign(3.0_f64, -1.0), -3.0);
        assert_eq!(RealField::copysign(-3.0_f64, 0.0), 3.0);
    }
}
