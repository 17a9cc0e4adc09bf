use alloc::vec;

use crate::linalg::g;
use crate::traits::{FloatScalar, MatrixMut};
use crate::Matrix;

/// Reduce a square matrix to upper Hessenberg form via Householder similarity
/// transforms: `Vᵀ A V = H`.
///
/// On return:
/// - `h` is overwritten with the upper Hessenberg matrix H (entries below the
///   first sub-diagonal are exactly zero)
/// - `v` holds the accumulated orthogonal transform V
///
/// Columns are scaled by the sum of their absolute values before each
/// reflector is formed.
pub fn orthes<T: FloatScalar>(h: &mut impl MatrixMut<T>, v: &mut impl MatrixMut<T>) {
    let n = h.nrows();
    assert_eq!(n, h.ncols(), "Hessenberg reduction requires a square matrix");
    assert!(v.nrows() == n && v.ncols() == n, "v must match the matrix order");

    let mut ort = vec![T::zero(); n];
    let high = n.saturating_sub(1);

    for m in 1..high {
        let mut scale = T::zero();
        for i in m..=high {
            scale = scale + g(h, i, m - 1).abs();
        }
        if scale == T::zero() {
            continue;
        }

        let mut hh = T::zero();
        for i in (m..=high).rev() {
            ort[i] = g(h, i, m - 1) / scale;
            hh = hh + ort[i] * ort[i];
        }
        let mut gg = hh.sqrt();
        if ort[m] > T::zero() {
            gg = -gg;
        }
        hh = hh - ort[m] * gg;
        ort[m] = ort[m] - gg;

        // H = (I - u uᵀ / hh) H (I - u uᵀ / hh)
        for j in m..n {
            let mut f = T::zero();
            for i in (m..=high).rev() {
                f = f + ort[i] * g(h, i, j);
            }
            f = f / hh;
            for i in m..=high {
                *h.get_mut(i, j) = g(h, i, j) - f * ort[i];
            }
        }
        for i in 0..=high {
            let row = h.row_as_mut_slice(i, m);
            let mut f = T::zero();
            for (x, &u) in row.iter().zip(&ort[m..]).rev() {
                f = f + u * *x;
            }
            f = f / hh;
            for (x, &u) in row.iter_mut().zip(&ort[m..]) {
                *x = *x - f * u;
            }
        }
        ort[m] = scale * ort[m];
        *h.get_mut(m, m - 1) = scale * gg;
    }

    // Accumulate the transformations, last reflector first.
    for i in 0..n {
        for j in 0..n {
            *v.get_mut(i, j) = if i == j { T::one() } else { T::zero() };
        }
    }
    for m in (1..high).rev() {
        let sub = g(h, m, m - 1);
        if sub == T::zero() {
            continue;
        }
        for i in (m + 1)..=high {
            ort[i] = g(h, i, m - 1);
        }
        for j in m..=high {
            let mut s = T::zero();
            for i in m..=high {
                s = s + ort[i] * g(v, i, j);
            }
            // Double division avoids underflow.
            s = (s / ort[m]) / sub;
            for i in m..=high {
                *v.get_mut(i, j) = g(v, i, j) + s * ort[i];
            }
        }
    }

    for i in 2..n {
        for j in 0..(i - 1) {
            *h.get_mut(i, j) = T::zero();
        }
    }
}

impl<T: FloatScalar> Matrix<T> {
    /// Upper Hessenberg form `H` and orthogonal `V` with `A = V H Vᵀ`.
    ///
    /// Panics if the matrix is not square.
    ///
    /// ```
    /// use densedecomp::Matrix;
    /// let a = Matrix::from_rows(3, 3, &[1.0_f64, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 10.0]);
    /// let (h, v) = a.hessenberg();
    /// assert_eq!(h[(2, 0)], 0.0);
    /// let back = &(&v * &h) * &v.transpose();
    /// assert!((back[(2, 2)] - 10.0).abs() < 1e-12);
    /// ```
    pub fn hessenberg(&self) -> (Matrix<T>, Matrix<T>) {
        let n = self.nrows();
        let mut h = self.clone();
        let mut v = Matrix::zeros(n, n, T::zero());
        orthes(&mut h, &mut v);
        (h, v)
    }
}
