//! Scalar helpers shared by the decomposition kernels.
//!
//! Every convergence and negligibility test in the crate is phrased in terms
//! of [`relative_accuracy`]; rotations are built with [`hypot`].

use crate::traits::FloatScalar;

/// `sqrt(a² + b²)` without intermediate overflow or underflow.
///
/// ```
/// use densedecomp::numeric::hypot;
/// assert_eq!(hypot(3.0_f64, 4.0), 5.0);
/// assert!((hypot(1e200_f64, 1e200) - 1e200 * 2.0_f64.sqrt()).abs() < 1e186);
/// ```
#[inline]
pub fn hypot<T: FloatScalar>(a: T, b: T) -> T {
    a.hypot(b)
}

/// Relative accuracy of the scalar type: the gap between 1 and the next
/// representable value (`2^-52` for `f64`, `2^-23` for `f32`).
#[inline]
pub fn relative_accuracy<T: FloatScalar>() -> T {
    T::epsilon()
}

/// Smallest value that is still safely invertible after scaling by
/// [`relative_accuracy`]; used as the absolute floor of the SVD
/// negligibility test.
#[inline]
pub fn tiny<T: FloatScalar>() -> T {
    T::min_positive_value() / T::epsilon()
}

/// Literal `x` in the scalar type. Every `f64` literal is representable (up
/// to rounding) in `f32` and `f64`; anything else yields NaN.
#[inline]
pub(crate) fn constant<T: FloatScalar>(x: f64) -> T {
    T::from(x).unwrap_or_else(T::nan)
}

/// `|a|` carrying the sign of `b`.
#[inline]
pub(crate) fn with_sign_of<T: FloatScalar>(a: T, b: T) -> T {
    if b < T::zero() {
        -a.abs()
    } else {
        a.abs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hypot_basic() {
        assert_eq!(hypot(3.0_f64, -4.0), 5.0);
        assert_eq!(hypot(0.0_f64, 0.0), 0.0);
    }

    #[test]
    fn hypot_no_overflow() {
        let big = f64::MAX / 2.0;
        let h = hypot(big, big);
        assert!(h.is_finite());
        assert!((h / big - 2.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn hypot_no_underflow() {
        let small = f64::MIN_POSITIVE * 4.0;
        assert!(hypot(small, small) > 0.0);
    }

    #[test]
    fn accuracy_constants() {
        assert_eq!(relative_accuracy::<f64>(), 2.0_f64.powi(-52));
        assert_eq!(relative_accuracy::<f32>(), 2.0_f32.powi(-23));
        assert!(tiny::<f64>() > 0.0);
        assert!(tiny::<f64>() < 1e-290);
    }

    #[test]
    fn literal_conversion() {
        assert_eq!(constant::<f64>(0.964), 0.964);
        assert_eq!(constant::<f32>(-0.4375), -0.4375_f32);
    }

    #[test]
    fn sign_transfer() {
        assert_eq!(with_sign_of(3.0_f64, -1.0), -3.0);
        assert_eq!(with_sign_of(-3.0_f64, 2.0), 3.0);
        assert_eq!(with_sign_of(-3.0_f64, 0.0), 3.0);
    }
}
